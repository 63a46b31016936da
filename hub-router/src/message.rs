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

//! Router message envelope.

use crate::address::HubAddr;
use crate::platform::PlatformMessage;
use crate::protocol::ProtocolMessage;
use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Identity token of a port. Unique for the lifetime of the process.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct PortId(u64);

impl PortId {
    pub(crate) fn next() -> Self {
        static NEXT_PORT_ID: AtomicU64 = AtomicU64::new(1);
        Self(NEXT_PORT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "port-{}", self.0)
    }
}

/// Reference to a port as a custom-message destination.
///
/// `owner` is the registered port whose queue receives the message, `id` the port
/// (owner itself or one of its delegates) whose handler must process it.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct PortRef {
    pub id: PortId,
    pub owner: PortId,
}

/// Same-process payload carried by a custom message.
pub type CustomPayload = Arc<dyn Any + Send + Sync>;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MessageKind {
    Platform,
    Protocol,
    Custom,
    Poison,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Platform => "platform",
            MessageKind::Protocol => "protocol",
            MessageKind::Custom => "custom",
            MessageKind::Poison => "poison",
        }
    }
}

/// Everything that travels through the router.
///
/// Created once by the router or by a port operation and never mutated.
#[derive(Clone)]
pub enum Message {
    Platform {
        message: Arc<PlatformMessage>,
        forwarded: bool,
    },
    Protocol {
        message: Arc<ProtocolMessage>,
        forwarded: bool,
    },
    Custom {
        destination: PortRef,
        payload: CustomPayload,
    },
    /// Termination signal. `target: None` stops every port and the dispatcher.
    Poison { target: Option<PortId> },
}

impl Message {
    pub fn platform(message: PlatformMessage) -> Self {
        Message::Platform {
            message: Arc::new(message),
            forwarded: false,
        }
    }

    pub fn protocol(message: ProtocolMessage) -> Self {
        Message::Protocol {
            message: Arc::new(message),
            forwarded: false,
        }
    }

    pub(crate) fn forwarded_platform(message: PlatformMessage) -> Self {
        Message::Platform {
            message: Arc::new(message),
            forwarded: true,
        }
    }

    pub(crate) fn forwarded_protocol(message: ProtocolMessage) -> Self {
        Message::Protocol {
            message: Arc::new(message),
            forwarded: true,
        }
    }

    pub fn kind(&self) -> MessageKind {
        match self {
            Message::Platform { .. } => MessageKind::Platform,
            Message::Protocol { .. } => MessageKind::Protocol,
            Message::Custom { .. } => MessageKind::Custom,
            Message::Poison { .. } => MessageKind::Poison,
        }
    }

    pub fn source(&self) -> Option<&HubAddr> {
        match self {
            Message::Platform { message, .. } => Some(message.source()),
            Message::Protocol { message, .. } => Some(message.source()),
            Message::Custom { .. } | Message::Poison { .. } => None,
        }
    }

    /// Address destination, `None` for custom and poison messages.
    pub fn destination(&self) -> Option<&HubAddr> {
        match self {
            Message::Platform { message, .. } => Some(message.destination()),
            Message::Protocol { message, .. } => Some(message.destination()),
            Message::Custom { .. } | Message::Poison { .. } => None,
        }
    }

    pub fn is_forwarded(&self) -> bool {
        match self {
            Message::Platform { forwarded, .. } | Message::Protocol { forwarded, .. } => {
                *forwarded
            }
            Message::Custom { .. } | Message::Poison { .. } => false,
        }
    }

    /// Returns `true` when this is a termination signal for the consumer `id`.
    pub(crate) fn is_poison_for(&self, id: PortId) -> bool {
        match self {
            Message::Poison { target } => target.map_or(true, |target| target == id),
            _ => false,
        }
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Platform { message, forwarded } => f
                .debug_struct("Platform")
                .field("type", &message.message_type())
                .field("src", &message.source().to_string())
                .field("dst", &message.destination().to_string())
                .field("forwarded", forwarded)
                .finish(),
            Message::Protocol { message, forwarded } => f
                .debug_struct("Protocol")
                .field("protocol", &message.protocol())
                .field("src", &message.source().to_string())
                .field("dst", &message.destination().to_string())
                .field("forwarded", forwarded)
                .finish(),
            Message::Custom { destination, .. } => f
                .debug_struct("Custom")
                .field("destination", destination)
                .finish_non_exhaustive(),
            Message::Poison { target } => f.debug_struct("Poison").field("target", target).finish(),
        }
    }
}

/// One queued unit of work for a port: the message, the address it was routed by and
/// whether this is a snooped (non-authoritative) copy.
#[derive(Clone, Debug)]
pub(crate) struct Delivery {
    pub(crate) addr: Option<HubAddr>,
    pub(crate) message: Message,
    pub(crate) snoop: bool,
}

impl Delivery {
    pub(crate) fn new(addr: Option<HubAddr>, message: Message, snoop: bool) -> Self {
        Self {
            addr,
            message,
            snoop,
        }
    }

    pub(crate) fn poison(target: Option<PortId>) -> Self {
        Self::new(None, Message::Poison { target }, false)
    }
}

#[cfg(test)]
mod tests {
    use super::{Message, MessageKind, PortId};
    use crate::address::HubAddr;
    use crate::platform::{MessageBody, PlatformMessage};

    #[test]
    fn port_ids_are_unique() {
        assert_ne!(PortId::next(), PortId::next());
    }

    #[test]
    fn broadcast_poison_targets_everyone() {
        let poison = Message::Poison { target: None };

        assert!(poison.is_poison_for(PortId::next()));
        assert_eq!(poison.kind(), MessageKind::Poison);
    }

    #[test]
    fn targeted_poison_only_matches_its_target() {
        let target = PortId::next();
        let poison = Message::Poison {
            target: Some(target),
        };

        assert!(poison.is_poison_for(target));
        assert!(!poison.is_poison_for(PortId::next()));
    }

    #[test]
    fn platform_envelope_projects_addresses() {
        let message = Message::platform(
            PlatformMessage::builder(MessageBody::new("hub:Ping"))
                .from(HubAddr::service("client"))
                .to(HubAddr::service("hub"))
                .build(),
        );

        assert_eq!(message.kind(), MessageKind::Platform);
        assert_eq!(message.source(), Some(&HubAddr::service("client")));
        assert_eq!(message.destination(), Some(&HubAddr::service("hub")));
        assert!(!message.is_forwarded());
        assert!(!message.is_poison_for(PortId::next()));
    }
}
