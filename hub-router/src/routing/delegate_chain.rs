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

//! Ordered sub-dispatch of a port's traffic to delegate handlers.

use crate::data_plane::processor::panic_message;
use crate::error::ErrorEvent;
use crate::handler::{PortHandler, Reply};
use crate::message::{CustomPayload, PortId};
use crate::observability::events;
use crate::platform::{MessageBody, PlatformMessage};
use crate::port::Port;
use crate::protocol::ProtocolMessage;
use crate::routing::filter::DelegateFilter;
use anyhow::anyhow;
use parking_lot::RwLock;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, warn};

const COMPONENT: &str = "delegate_chain";

#[derive(Clone)]
struct DelegateEntry {
    filter: DelegateFilter,
    port: Port,
    handler: Arc<dyn PortHandler>,
}

/// Base handler plus append-only list of filtered delegates. First match wins.
pub(crate) struct DelegateChain {
    base: Arc<dyn PortHandler>,
    delegates: RwLock<Arc<Vec<DelegateEntry>>>,
}

impl DelegateChain {
    pub(crate) fn new(base: Arc<dyn PortHandler>) -> Self {
        Self {
            base,
            delegates: RwLock::new(Arc::new(Vec::new())),
        }
    }

    /// Appends a delegate. Dispatches already in flight keep their snapshot.
    pub(crate) fn add(&self, filter: DelegateFilter, port: Port, handler: Arc<dyn PortHandler>) {
        let mut delegates = self.delegates.write();
        let mut next = delegates.as_ref().clone();
        next.push(DelegateEntry {
            filter,
            port,
            handler,
        });
        *delegates = Arc::new(next);
    }

    fn snapshot(&self) -> Arc<Vec<DelegateEntry>> {
        self.delegates.read().clone()
    }

    /// Hands a platform message to the first matching delegate or the base handler
    /// and turns its outcome into replies.
    ///
    /// Failures never escape: they become error replies unless the copy was snooped
    /// or the handling port cannot originate traffic.
    pub(crate) fn dispatch_platform(
        &self,
        base_port: &Port,
        message: &PlatformMessage,
        snooped: bool,
    ) {
        let delegates = self.snapshot();
        let (port, handler) = delegates
            .iter()
            .find(|entry| entry.filter.accepts_platform(message.message_type()))
            .map(|entry| (&entry.port, &entry.handler))
            .unwrap_or((base_port, &self.base));
        let replies_allowed = !snooped && !port.is_listener_only();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| handler.recv_platform(port, message)))
            .unwrap_or_else(|payload| {
                Err(anyhow!("handler panicked: {}", panic_message(payload.as_ref())))
            });

        match outcome {
            Ok(reply) if replies_allowed => respond(port, message, reply),
            Ok(_) => {}
            Err(err) => {
                debug!(
                    event = events::CHAIN_HANDLER_FAILED,
                    component = COMPONENT,
                    port = port.name(),
                    msg_type = message.message_type(),
                    snooped,
                    err = format!("{err:#}").as_str(),
                    "platform handler failed"
                );
                if replies_allowed {
                    report_failure(port, message, &err);
                }
            }
        }
    }

    pub(crate) fn dispatch_protocol(
        &self,
        base_port: &Port,
        message: &ProtocolMessage,
    ) -> anyhow::Result<()> {
        let delegates = self.snapshot();
        match delegates
            .iter()
            .find(|entry| entry.filter.accepts_protocol(message))
        {
            Some(entry) => entry.handler.recv_protocol(&entry.port, message),
            None => self.base.recv_protocol(base_port, message),
        }
    }

    /// Custom messages go to the delegate whose port is `destination`, or to the base
    /// handler when `destination` is the base port itself.
    pub(crate) fn dispatch_custom(
        &self,
        base_port: &Port,
        destination: PortId,
        payload: &CustomPayload,
    ) -> anyhow::Result<()> {
        if destination == base_port.id() {
            return self.base.recv_custom(base_port, payload);
        }

        let delegates = self.snapshot();
        match delegates.iter().find(|entry| entry.port.id() == destination) {
            Some(entry) => entry.handler.recv_custom(&entry.port, payload),
            None => {
                warn!(
                    event = events::CHAIN_CUSTOM_NO_TARGET,
                    component = COMPONENT,
                    port = base_port.name(),
                    dst = %destination,
                    "custom message target is not part of this port; dropping"
                );
                Ok(())
            }
        }
    }
}

fn respond(port: &Port, request: &PlatformMessage, reply: Reply) {
    let result = match reply {
        Reply::Handled => Ok(()),
        Reply::None if request.is_response_required() => port.reply(request, MessageBody::empty()),
        Reply::None => Ok(()),
        Reply::Body(body) => port.reply(request, body),
        Reply::Message(message) => port.send_message(message),
        Reply::Other(_) => {
            warn!(
                event = events::CHAIN_UNRECOGNIZED_REPLY,
                component = COMPONENT,
                port = port.name(),
                msg_type = request.message_type(),
                "handler returned an unrecognized reply; sending an empty reply"
            );
            port.reply(request, MessageBody::empty())
        }
    };

    if let Err(err) = result {
        warn!(
            event = events::CHAIN_REPLY_FAILED,
            component = COMPONENT,
            port = port.name(),
            msg_type = request.message_type(),
            err = %err,
            "unable to send reply"
        );
    }
}

/// Requests get a correlated error reply; other non-error messages get an
/// uncorrelated error notification. Errors are never answered with errors.
fn report_failure(port: &Port, message: &PlatformMessage, err: &anyhow::Error) {
    let ErrorEvent { code, message: text } = ErrorEvent::from_handler_error(err);
    let result = if message.is_request() {
        port.error_reply(message, code, text)
    } else if !message.is_error() {
        port.error(message, code, text)
    } else {
        Ok(())
    };

    if let Err(err) = result {
        warn!(
            event = events::CHAIN_REPLY_FAILED,
            component = COMPONENT,
            port = port.name(),
            msg_type = message.message_type(),
            err = %err,
            "unable to report handler failure"
        );
    }
}
