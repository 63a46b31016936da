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

//! Application-facing handler contracts.
//!
//! A handler is invoked on the worker thread of the port it is attached to, one
//! message at a time. Returning an error never stops the port: for platform
//! messages the failure is turned into an error reply (requests) or an error
//! notification (everything else), for other message kinds it is logged and
//! the message is dropped.

use crate::message::CustomPayload;
use crate::platform::{MessageBody, PlatformMessage};
use crate::port::Port;
use crate::protocol::ProtocolMessage;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// What a handler wants done after processing a platform message.
pub enum Reply {
    /// The handler took care of any response itself.
    Handled,
    /// Nothing to say. An empty reply is still sent if the message was a request.
    None,
    /// Reply to the message with this body.
    Body(MessageBody),
    /// Send this fully addressed message as-is.
    Message(PlatformMessage),
    /// A value the router does not know how to send. Logged and replaced with an
    /// empty reply.
    Other(Box<dyn Any + Send>),
}

impl fmt::Debug for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Handled => f.write_str("Handled"),
            Reply::None => f.write_str("None"),
            Reply::Body(body) => f.debug_tuple("Body").field(body).finish(),
            Reply::Message(message) => f.debug_tuple("Message").field(message).finish(),
            Reply::Other(_) => f.write_str("Other(..)"),
        }
    }
}

impl From<MessageBody> for Reply {
    fn from(body: MessageBody) -> Self {
        Reply::Body(body)
    }
}

/// Receives the traffic routed to a port.
pub trait PortHandler: Send + Sync {
    fn recv_platform(&self, port: &Port, message: &PlatformMessage) -> anyhow::Result<Reply>;

    fn recv_protocol(&self, _port: &Port, _message: &ProtocolMessage) -> anyhow::Result<()> {
        Ok(())
    }

    fn recv_custom(&self, _port: &Port, _payload: &CustomPayload) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Receives copies of all non-forwarded traffic that passes through the router.
///
/// The interest checks run on the dispatcher thread before a copy is queued, so
/// they must be cheap and must not block.
pub trait SnoopingPortHandler: PortHandler {
    fn is_interested_in_platform(&self, _message: &PlatformMessage) -> bool {
        true
    }

    fn is_interested_in_protocol(&self, _message: &ProtocolMessage) -> bool {
        true
    }
}

/// A handler that only ignores.
pub(crate) struct NoopHandler;

impl PortHandler for NoopHandler {
    fn recv_platform(&self, _port: &Port, _message: &PlatformMessage) -> anyhow::Result<Reply> {
        Ok(Reply::Handled)
    }
}

/// Presents a snooping handler as the base of a delegate chain.
pub(crate) struct SnoopingBase(pub(crate) Arc<dyn SnoopingPortHandler>);

impl PortHandler for SnoopingBase {
    fn recv_platform(&self, port: &Port, message: &PlatformMessage) -> anyhow::Result<Reply> {
        self.0.recv_platform(port, message)
    }

    fn recv_protocol(&self, port: &Port, message: &ProtocolMessage) -> anyhow::Result<()> {
        self.0.recv_protocol(port, message)
    }

    fn recv_custom(&self, port: &Port, payload: &CustomPayload) -> anyhow::Result<()> {
        self.0.recv_custom(port, payload)
    }
}

struct FnHandler<F>(F);

impl<F> PortHandler for FnHandler<F>
where
    F: Fn(&Port, &PlatformMessage) -> anyhow::Result<Reply> + Send + Sync,
{
    fn recv_platform(&self, port: &Port, message: &PlatformMessage) -> anyhow::Result<Reply> {
        (self.0)(port, message)
    }
}

/// Wraps a closure as a platform-only handler.
pub fn platform_handler<F>(handler: F) -> Arc<dyn PortHandler>
where
    F: Fn(&Port, &PlatformMessage) -> anyhow::Result<Reply> + Send + Sync + 'static,
{
    Arc::new(FnHandler(handler))
}
