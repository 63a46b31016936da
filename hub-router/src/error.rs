/********************************************************************************
 * Copyright (c) 2024 Contributors to the Eclipse Foundation
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

//! Router failure types.

use thiserror::Error;

/// Error code used when a handler failure carries no [`ErrorEvent`].
pub const DEFAULT_ERROR_CODE: &str = "Exception";

/// Structural failures surfaced to the caller of a router or port operation.
///
/// Every variant except [`RouterError::Interrupted`] indicates a wiring bug rather
/// than a runtime condition.
#[derive(Debug, Error)]
pub enum RouterError {
    #[error("port {port} does not support {operation}")]
    Unsupported {
        port: String,
        operation: &'static str,
    },
    #[error("message processor for {0} already started")]
    ProcessorAlreadyStarted(String),
    #[error("address-bound port requires a service or protocol address")]
    MissingAddress,
    #[error("port {port} has no {kind} address")]
    NoAddress { port: String, kind: &'static str },
    #[error("address {0} is already owned by another port")]
    AddressInUse(String),
    #[error("queue for {0} is closed")]
    Interrupted(String),
    #[error("router has been shut down")]
    RouterShutDown,
    #[error("port {0} is no longer attached to its parent")]
    PortClosed(String),
    #[error("unable to spawn worker {name}: {source}")]
    WorkerSpawn {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Failure reported by a handler that should be turned into an error reply
/// with a specific code.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("{code}: {message}")]
pub struct ErrorEvent {
    pub code: String,
    pub message: String,
}

impl ErrorEvent {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Extracts code and message from an arbitrary handler failure.
    pub fn from_handler_error(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<ErrorEvent>() {
            Some(event) => event.clone(),
            None => Self::new(DEFAULT_ERROR_CODE, format!("{err:#}")),
        }
    }
}
