/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Canonical structured field keys and value-format helpers.

use crate::address::HubAddr;
use crate::message::Message;

pub const NONE: &str = "none";
pub const REASON_POISON: &str = "poison";
pub const REASON_QUEUE_CLOSED: &str = "queue_closed";
pub const REASON_INTERRUPTED: &str = "interrupted";
pub const REASON_ROUTER_GONE: &str = "router_gone";
pub const REASON_ROUTER_STOPPED: &str = "router_stopped";
pub const REASON_INVALID_THREAD_NAME: &str = "invalid_thread_name";
pub const DEFAULT_WORKER_THREAD: &str = "unknown-thread";

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WorkerContext {
    pub port: String,
    pub worker_thread: String,
}

impl WorkerContext {
    pub fn with_current_thread(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            worker_thread: current_thread_name_or_default(),
        }
    }
}

pub fn thread_name_or_default(thread_name: Option<&str>) -> String {
    thread_name.unwrap_or(DEFAULT_WORKER_THREAD).to_string()
}

pub fn current_thread_name_or_default() -> String {
    thread_name_or_default(std::thread::current().name())
}

/// Message fields formatted once for a burst of log events.
pub struct FormattedMessageFields {
    pub msg_kind: &'static str,
    pub msg_type: String,
    pub src: String,
    pub dst: String,
}

impl FormattedMessageFields {
    pub fn from_message(message: &Message) -> Self {
        Self {
            msg_kind: message.kind().as_str(),
            msg_type: format_message_type(message),
            src: format_optional_addr(message.source()),
            dst: format_destination(message),
        }
    }
}

pub fn format_message_type(message: &Message) -> String {
    match message {
        Message::Platform { message, .. } => message.message_type().to_string(),
        Message::Protocol { message, .. } => message.protocol().to_string(),
        Message::Custom { .. } | Message::Poison { .. } => NONE.to_string(),
    }
}

pub fn format_destination(message: &Message) -> String {
    match message {
        Message::Custom { destination, .. } => destination.id.to_string(),
        Message::Poison { target } => target
            .map(|target| target.to_string())
            .unwrap_or_else(|| "all".to_string()),
        _ => format_optional_addr(message.destination()),
    }
}

pub fn format_optional_addr(addr: Option<&HubAddr>) -> String {
    addr.map(HubAddr::to_string)
        .unwrap_or_else(|| NONE.to_string())
}
