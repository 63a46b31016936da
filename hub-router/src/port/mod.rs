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

//! The port handle: one participant on the hub message bus.
//!
//! Every port variant is the same struct composed of:
//! - an [`Addressing`] strategy: service, bridge or unbound
//! - a [`Capability`] restriction: full, listener-only or inject-only
//! - a role: registered endpoint (own queue and worker), inner address-bound port
//!   wrapped by a snooper, or delegate sub-dispatch target.
//!
//! ```
//! use hub_router::{platform_handler, HubAddr, MessageBody, Reply, Router, RouterConfig};
//!
//! let router = Router::new(RouterConfig::default());
//! router.start().unwrap();
//!
//! let alarm = router
//!     .connect_addr(
//!         "alarm",
//!         &HubAddr::service("alarm"),
//!         platform_handler(|_port, _message| Ok(Reply::Handled)),
//!     )
//!     .unwrap();
//!
//! assert_eq!(alarm.service_id(), Some("alarm"));
//! assert!(alarm.protocol_address().is_err());
//! alarm
//!     .send(&HubAddr::service("hub"), MessageBody::new("alarm:Armed"))
//!     .unwrap();
//!
//! router.shutdown();
//! ```

use crate::address::{HubAddr, HubIdentity};
use crate::config::QueueDepthPolicy;
use crate::data_plane::processor::{Consumer, MessageProcessor};
use crate::error::RouterError;
use crate::handler::{NoopHandler, PortHandler, SnoopingBase, SnoopingPortHandler};
use crate::message::{Delivery, Message, MessageKind, PortId, PortRef};
use crate::observability::{events, fields};
use crate::platform::{MessageBody, PlatformMessage};
use crate::protocol::ProtocolMessage;
use crate::router::RouterShared;
use crate::routing::delegate_chain::DelegateChain;
use crate::routing::filter::DelegateFilter;
use std::any::Any;
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::{debug, trace, warn};

const COMPONENT: &str = "port";

/// Addresses a port answers to, computed once at construction.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum Addressing {
    Service { platform: HubAddr },
    Bridge { platform: HubAddr, protocol: HubAddr },
    Unbound,
}

impl Addressing {
    /// Resolves the addressing strategy for `address`, stamped with the hub identity.
    pub(crate) fn bound(hub: &HubIdentity, address: &HubAddr) -> Result<Self, RouterError> {
        if address.is_broadcast() {
            return Err(RouterError::MissingAddress);
        }

        match (address.platform_projection(), address.protocol_projection()) {
            (Some(platform), Some(protocol)) => Ok(Addressing::Bridge {
                platform: hub.qualify(&platform),
                protocol: hub.qualify(&protocol),
            }),
            (Some(platform), None) => Ok(Addressing::Service {
                platform: hub.qualify(&platform),
            }),
            (None, _) => Err(RouterError::MissingAddress),
        }
    }

    fn platform(&self) -> Option<&HubAddr> {
        match self {
            Addressing::Service { platform } | Addressing::Bridge { platform, .. } => Some(platform),
            Addressing::Unbound => None,
        }
    }

    fn protocol(&self) -> Option<&HubAddr> {
        match self {
            Addressing::Bridge { protocol, .. } => Some(protocol),
            Addressing::Service { .. } | Addressing::Unbound => None,
        }
    }

    /// Whether a message of `kind` routed by `addr` was aimed at these addresses.
    ///
    /// Platform traffic is matched on the service id, protocol traffic on the
    /// protocol id.
    fn matches(&self, kind: MessageKind, addr: &HubAddr) -> bool {
        let (own, target) = match kind {
            MessageKind::Platform => (
                self.platform().and_then(HubAddr::service_id),
                addr.service_id(),
            ),
            MessageKind::Protocol => (
                self.protocol().and_then(HubAddr::protocol_id),
                addr.protocol_id(),
            ),
            MessageKind::Custom | MessageKind::Poison => (None, None),
        };
        own.zip(target).is_some_and(|(own, target)| own == target)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Capability {
    Full,
    /// Observes only: never sends, replies or forwards.
    ListenerOnly,
    /// Pushes pre-built messages only.
    InjectOnly,
}

struct Snooping {
    handler: Arc<dyn SnoopingPortHandler>,
    inner: Option<Port>,
}

enum PortRole {
    Endpoint {
        processor: Arc<MessageProcessor>,
        chain: DelegateChain,
        snooping: Option<Snooping>,
    },
    Inner {
        processor: Arc<MessageProcessor>,
        chain: DelegateChain,
    },
    Delegate {
        parent: Weak<PortInner>,
    },
}

struct PortInner {
    id: PortId,
    owner: PortId,
    name: String,
    router: Weak<RouterShared>,
    addressing: Addressing,
    capability: Capability,
    listen_all: bool,
    gateway: bool,
    role: PortRole,
}

/// Handle to a port. Cheap to clone; clones refer to the same port.
#[derive(Clone)]
pub struct Port {
    inner: Arc<PortInner>,
}

/// Wiring for a port built by the router.
pub(crate) struct PortSpec {
    pub(crate) name: String,
    pub(crate) addressing: Addressing,
    pub(crate) capability: Capability,
    pub(crate) handler: Arc<dyn PortHandler>,
}

impl PortSpec {
    pub(crate) fn injector(name: &str) -> Self {
        Self {
            name: name.to_string(),
            addressing: Addressing::Unbound,
            capability: Capability::InjectOnly,
            handler: Arc::new(NoopHandler),
        }
    }

    pub(crate) fn full(name: &str, addressing: Addressing, handler: Arc<dyn PortHandler>) -> Self {
        Self {
            name: name.to_string(),
            addressing,
            capability: Capability::Full,
            handler,
        }
    }
}

impl Port {
    /// Builds a registered endpoint with its own queue.
    pub(crate) fn endpoint(
        spec: PortSpec,
        router: Weak<RouterShared>,
        policy: QueueDepthPolicy,
    ) -> Port {
        let id = PortId::next();
        Port {
            inner: Arc::new(PortInner {
                id,
                owner: id,
                router,
                addressing: spec.addressing,
                capability: spec.capability,
                listen_all: false,
                gateway: false,
                role: PortRole::Endpoint {
                    processor: Arc::new(MessageProcessor::new(id, &spec.name, policy)),
                    chain: DelegateChain::new(spec.handler),
                    snooping: None,
                },
                name: spec.name,
            }),
        }
    }

    /// Builds a listen-all endpoint, optionally wrapping an address-bound port that
    /// shares its queue.
    pub(crate) fn snooping(
        name: &str,
        snoop: Arc<dyn SnoopingPortHandler>,
        inner: Option<PortSpec>,
        gateway: bool,
        router: Weak<RouterShared>,
        policy: QueueDepthPolicy,
    ) -> Port {
        let id = PortId::next();
        let processor = Arc::new(MessageProcessor::new(id, name, policy));

        let inner = inner.map(|spec| Port {
            inner: Arc::new(PortInner {
                id: PortId::next(),
                owner: id,
                router: router.clone(),
                addressing: spec.addressing,
                capability: spec.capability,
                listen_all: false,
                gateway: false,
                role: PortRole::Inner {
                    processor: processor.clone(),
                    chain: DelegateChain::new(spec.handler),
                },
                name: spec.name,
            }),
        });
        let (addressing, capability) = match &inner {
            Some(inner) => (inner.inner.addressing.clone(), Capability::Full),
            None => (Addressing::Unbound, Capability::ListenerOnly),
        };

        Port {
            inner: Arc::new(PortInner {
                id,
                owner: id,
                name: name.to_string(),
                router,
                addressing,
                capability,
                listen_all: true,
                gateway,
                role: PortRole::Endpoint {
                    processor,
                    chain: DelegateChain::new(Arc::new(SnoopingBase(snoop.clone()))),
                    snooping: Some(Snooping {
                        handler: snoop,
                        inner,
                    }),
                },
            }),
        }
    }

    fn new_delegate(parent: &Port) -> Port {
        let parent_inner = &parent.inner;
        Port {
            inner: Arc::new(PortInner {
                id: PortId::next(),
                owner: parent_inner.owner,
                name: format!("{}-delegate", parent_inner.name),
                router: parent_inner.router.clone(),
                addressing: parent_inner.addressing.clone(),
                capability: parent_inner.capability,
                listen_all: parent_inner.listen_all,
                gateway: parent_inner.gateway,
                role: PortRole::Delegate {
                    parent: Arc::downgrade(parent_inner),
                },
            }),
        }
    }

    pub fn id(&self) -> PortId {
        self.inner.id
    }

    /// Reference used to address custom messages to this port.
    pub fn port_ref(&self) -> PortRef {
        PortRef {
            id: self.inner.id,
            owner: self.inner.owner,
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn is_listener_only(&self) -> bool {
        self.inner.capability == Capability::ListenerOnly
    }

    pub fn is_listen_all(&self) -> bool {
        self.inner.listen_all
    }

    /// Descriptive flag only; gateways route exactly like snooping ports.
    pub fn is_gateway(&self) -> bool {
        self.inner.gateway
    }

    pub fn is_injector(&self) -> bool {
        self.inner.capability == Capability::InjectOnly
    }

    pub fn is_running(&self) -> bool {
        self.processor()
            .is_some_and(|processor| processor.is_running())
    }

    /// Messages queued for this port's worker and not yet picked up.
    pub fn queue_depth(&self) -> usize {
        self.processor()
            .map_or(0, |processor| processor.queue_depth())
    }

    pub fn platform_address(&self) -> Result<HubAddr, RouterError> {
        self.inner
            .addressing
            .platform()
            .cloned()
            .ok_or_else(|| self.no_address("platform"))
    }

    pub fn protocol_address(&self) -> Result<HubAddr, RouterError> {
        self.inner
            .addressing
            .protocol()
            .cloned()
            .ok_or_else(|| self.no_address("protocol"))
    }

    pub fn service_id(&self) -> Option<&str> {
        self.inner
            .addressing
            .platform()
            .and_then(HubAddr::service_id)
    }

    pub fn protocol_id(&self) -> Option<&str> {
        self.inner
            .addressing
            .protocol()
            .and_then(HubAddr::protocol_id)
    }

    pub fn send(&self, destination: &HubAddr, body: MessageBody) -> Result<(), RouterError> {
        self.send_platform(destination, body, None, false).map(|_| ())
    }

    pub fn send_with_ttl(
        &self,
        destination: &HubAddr,
        body: MessageBody,
        ttl: u32,
    ) -> Result<(), RouterError> {
        self.send_platform(destination, body, Some(ttl), false)
            .map(|_| ())
    }

    /// Sends a request and returns its correlation id.
    pub fn send_request(
        &self,
        destination: &HubAddr,
        body: MessageBody,
    ) -> Result<String, RouterError> {
        self.send_platform(destination, body, None, true)
    }

    pub fn send_request_with_ttl(
        &self,
        destination: &HubAddr,
        body: MessageBody,
        ttl: u32,
    ) -> Result<String, RouterError> {
        self.send_platform(destination, body, Some(ttl), true)
    }

    /// Publishes `body` to the hub-wide broadcast address.
    pub fn send_event(&self, body: MessageBody) -> Result<(), RouterError> {
        let source = self.platform_address()?;
        self.send_event_from(&source, body)
    }

    /// Publishes `body` to the hub-wide broadcast address on behalf of `source`.
    pub fn send_event_from(&self, source: &HubAddr, body: MessageBody) -> Result<(), RouterError> {
        self.require_sender("send_event")?;
        let message = PlatformMessage::builder(body)
            .from(source.clone())
            .to(HubAddr::broadcast())
            .build();
        self.route(Message::platform(message))
    }

    /// Sends a fully addressed platform message as-is.
    pub fn send_message(&self, message: PlatformMessage) -> Result<(), RouterError> {
        self.require_sender("send_message")?;
        self.route(Message::platform(message))
    }

    pub fn send_protocol(
        &self,
        destination: &HubAddr,
        protocol: &str,
        payload: impl Into<Vec<u8>>,
    ) -> Result<(), RouterError> {
        self.require_sender("send_protocol")?;
        let message = ProtocolMessage::new(protocol, payload)
            .from(self.protocol_address()?)
            .to(destination.clone());
        self.route(Message::protocol(message))
    }

    pub fn send_protocol_message(&self, message: ProtocolMessage) -> Result<(), RouterError> {
        self.require_sender("send_protocol_message")?;
        self.route(Message::protocol(message))
    }

    /// Sends `body` back to whoever sent `request`, correlated when it was.
    pub fn reply(&self, request: &PlatformMessage, body: MessageBody) -> Result<(), RouterError> {
        self.require_sender("reply")?;
        let response = PlatformMessage::response_to(request, &self.platform_address()?, body);
        self.route(Message::platform(response))
    }

    /// Correlated error response to `request`.
    pub fn error_reply(
        &self,
        request: &PlatformMessage,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Result<(), RouterError> {
        self.reply(request, MessageBody::error(code, message))
    }

    /// Uncorrelated error notification to the sender of `message`.
    pub fn error(
        &self,
        message: &PlatformMessage,
        code: impl Into<String>,
        text: impl Into<String>,
    ) -> Result<(), RouterError> {
        self.require_sender("error")?;
        let notification = PlatformMessage::response_to(
            message,
            &self.platform_address()?,
            MessageBody::error_event(code, text),
        )
        .uncorrelated();
        self.route(Message::platform(notification))
    }

    /// Relays `message` to `destination` without claiming authorship.
    ///
    /// The relayed copy loses its correlation id and is not shown to snoopers again.
    pub fn forward(&self, destination: &HubAddr, message: &PlatformMessage) -> Result<(), RouterError> {
        self.require_sender("forward")?;
        self.route(Message::forwarded_platform(message.forwarded_to(destination)))
    }

    pub fn forward_protocol(
        &self,
        destination: &HubAddr,
        message: &ProtocolMessage,
    ) -> Result<(), RouterError> {
        self.require_sender("forward_protocol")?;
        self.route(Message::forwarded_protocol(message.forwarded_to(destination)))
    }

    /// Registers `handler` for traffic matching `filter` and returns the sub-port
    /// it will be handed.
    ///
    /// Delegates are checked in registration order; the first match wins.
    pub fn delegate(
        &self,
        filter: DelegateFilter,
        handler: Arc<dyn PortHandler>,
    ) -> Result<Port, RouterError> {
        self.require_receiver("delegate")?;
        match &self.inner.role {
            PortRole::Delegate { .. } => self.parent()?.delegate(filter, handler),
            PortRole::Endpoint {
                snooping:
                    Some(Snooping {
                        inner: Some(inner), ..
                    }),
                ..
            } => inner.delegate(filter, handler),
            PortRole::Endpoint { chain, .. } | PortRole::Inner { chain, .. } => {
                let delegate = Port::new_delegate(self);
                chain.add(filter, delegate.clone(), handler);
                debug!(
                    event = events::PORT_DELEGATE,
                    component = COMPONENT,
                    port = self.name(),
                    delegate = %delegate.id(),
                    "delegate registered"
                );
                Ok(delegate)
            }
        }
    }

    /// Routes `message` through the dispatcher again as if freshly sent.
    pub fn queue_platform(&self, message: PlatformMessage) -> Result<(), RouterError> {
        self.require_receiver("queue_platform")?;
        self.route(Message::platform(message))
    }

    pub fn queue_protocol(&self, message: ProtocolMessage) -> Result<(), RouterError> {
        self.require_receiver("queue_protocol")?;
        self.route(Message::protocol(message))
    }

    /// Delivers `payload` back to this port's own handler as a custom message.
    pub fn queue<T: Any + Send + Sync>(&self, payload: T) -> Result<(), RouterError> {
        self.queue_to(self, payload)
    }

    /// Delivers `payload` to `destination`'s handler as a custom message.
    pub fn queue_to<T: Any + Send + Sync>(
        &self,
        destination: &Port,
        payload: T,
    ) -> Result<(), RouterError> {
        self.require_receiver("queue")?;
        self.route(Message::Custom {
            destination: destination.port_ref(),
            payload: Arc::new(payload),
        })
    }

    /// Pushes a pre-built platform message without restamping its source.
    pub fn inject_platform(&self, message: PlatformMessage) -> Result<(), RouterError> {
        self.route(Message::platform(message))
    }

    pub fn inject_protocol(&self, message: ProtocolMessage) -> Result<(), RouterError> {
        self.route(Message::protocol(message))
    }

    fn send_platform(
        &self,
        destination: &HubAddr,
        body: MessageBody,
        ttl: Option<u32>,
        request: bool,
    ) -> Result<String, RouterError> {
        self.require_sender(if request { "send_request" } else { "send" })?;
        let mut builder = PlatformMessage::builder(body)
            .from(self.platform_address()?)
            .to(destination.clone())
            .ttl(ttl);
        if request {
            builder = builder.request();
        }

        let message = builder.build();
        let correlation_id = message.correlation_id().unwrap_or_default().to_string();
        self.route(Message::platform(message))?;
        Ok(correlation_id)
    }

    fn route(&self, message: Message) -> Result<(), RouterError> {
        match self.inner.router.upgrade() {
            Some(router) => router.submit(message),
            None => {
                warn!(
                    event = events::PORT_SEND_DROPPED,
                    component = COMPONENT,
                    port = self.name(),
                    msg_kind = message.kind().as_str(),
                    reason = fields::REASON_ROUTER_GONE,
                    "router is gone; dropping message"
                );
                Ok(())
            }
        }
    }

    fn require_sender(&self, operation: &'static str) -> Result<(), RouterError> {
        match self.inner.capability {
            Capability::Full => Ok(()),
            Capability::ListenerOnly | Capability::InjectOnly => Err(self.unsupported(operation)),
        }
    }

    fn require_receiver(&self, operation: &'static str) -> Result<(), RouterError> {
        match self.inner.capability {
            Capability::Full | Capability::ListenerOnly => Ok(()),
            Capability::InjectOnly => Err(self.unsupported(operation)),
        }
    }

    fn unsupported(&self, operation: &'static str) -> RouterError {
        RouterError::Unsupported {
            port: self.inner.name.clone(),
            operation,
        }
    }

    fn no_address(&self, kind: &'static str) -> RouterError {
        RouterError::NoAddress {
            port: self.inner.name.clone(),
            kind,
        }
    }

    fn parent(&self) -> Result<Port, RouterError> {
        match &self.inner.role {
            PortRole::Delegate { parent } => parent
                .upgrade()
                .map(|inner| Port { inner })
                .ok_or_else(|| RouterError::PortClosed(self.inner.name.clone())),
            PortRole::Endpoint { .. } | PortRole::Inner { .. } => Ok(self.clone()),
        }
    }

    fn processor(&self) -> Option<Arc<MessageProcessor>> {
        match &self.inner.role {
            PortRole::Endpoint { processor, .. } | PortRole::Inner { processor, .. } => {
                Some(processor.clone())
            }
            PortRole::Delegate { .. } => self.parent().ok().and_then(|parent| parent.processor()),
        }
    }

    /// Queue of a registered endpoint. `None` for inner and delegate ports.
    pub(crate) fn endpoint_processor(&self) -> Option<&Arc<MessageProcessor>> {
        match &self.inner.role {
            PortRole::Endpoint { processor, .. } => Some(processor),
            PortRole::Inner { .. } | PortRole::Delegate { .. } => None,
        }
    }

    /// Queues a routed message on this endpoint.
    ///
    /// Snooped copies are first offered to the snooping handler's interest check and
    /// silently skipped when it declines.
    pub(crate) fn enqueue(
        &self,
        addr: Option<HubAddr>,
        message: Message,
        snoop: bool,
    ) -> Result<(), RouterError> {
        let PortRole::Endpoint {
            processor,
            snooping,
            ..
        } = &self.inner.role
        else {
            return Err(self.unsupported("enqueue"));
        };

        if snoop {
            if let Some(snooping) = snooping {
                let interested = match &message {
                    Message::Platform { message, .. } => {
                        snooping.handler.is_interested_in_platform(message)
                    }
                    Message::Protocol { message, .. } => {
                        snooping.handler.is_interested_in_protocol(message)
                    }
                    Message::Custom { .. } | Message::Poison { .. } => true,
                };
                if !interested {
                    trace!(
                        event = events::PORT_SNOOP_IGNORED,
                        component = COMPONENT,
                        port = self.name(),
                        msg_type = fields::format_message_type(&message).as_str(),
                        "snooping handler not interested"
                    );
                    return Ok(());
                }
            }
        }

        processor.enqueue(Delivery::new(addr, message, snoop))
    }

    fn chain(&self) -> Option<&DelegateChain> {
        match &self.inner.role {
            PortRole::Endpoint { chain, .. } | PortRole::Inner { chain, .. } => Some(chain),
            PortRole::Delegate { .. } => None,
        }
    }

    fn dispatch(&self, delivery: &Delivery, snooped: bool) -> anyhow::Result<()> {
        let Some(chain) = self.chain() else {
            anyhow::bail!("port {} has no delegate chain", self.name());
        };

        match &delivery.message {
            Message::Platform { message, .. } => {
                chain.dispatch_platform(self, message, snooped);
                Ok(())
            }
            Message::Protocol { message, .. } => chain.dispatch_protocol(self, message),
            Message::Custom {
                destination,
                payload,
            } => chain.dispatch_custom(self, destination.id, payload),
            Message::Poison { target } => {
                debug!(
                    event = events::PROCESSOR_IGNORED_POISON,
                    component = COMPONENT,
                    port = self.name(),
                    target = ?target,
                    "ignoring poison addressed to another port"
                );
                Ok(())
            }
        }
    }
}

impl Consumer for Port {
    fn handle(&self, delivery: Delivery) -> anyhow::Result<()> {
        let inner = match &self.inner.role {
            PortRole::Endpoint {
                snooping: Some(snooping),
                ..
            } => snooping.inner.as_ref(),
            _ => return self.dispatch(&delivery, delivery.snoop),
        };

        if let Message::Custom {
            destination,
            payload,
        } = &delivery.message
        {
            return match (inner, inner.and_then(Port::chain)) {
                (Some(inner), Some(chain)) => {
                    let target = if destination.id == self.id() {
                        inner.id()
                    } else {
                        destination.id
                    };
                    chain.dispatch_custom(inner, target, payload)
                }
                _ => self.dispatch(&delivery, false),
            };
        }

        let addressed_to_inner = !delivery.snoop
            && delivery
                .addr
                .as_ref()
                .zip(inner)
                .is_some_and(|(addr, inner)| {
                    inner.inner.addressing.matches(delivery.message.kind(), addr)
                });
        match inner {
            Some(inner) if addressed_to_inner => inner.dispatch(&delivery, false),
            _ => self.dispatch(&delivery, true),
        }
    }
}

impl PartialEq for Port {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for Port {}

impl fmt::Debug for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Port")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .field("addressing", &self.inner.addressing)
            .field("capability", &self.inner.capability)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{Addressing, Port, PortSpec};
    use crate::address::{HubAddr, HubIdentity};
    use crate::config::QueueDepthPolicy;
    use crate::error::RouterError;
    use crate::handler::{NoopHandler, PortHandler, Reply, SnoopingPortHandler};
    use crate::message::MessageKind;
    use crate::platform::{MessageBody, PlatformMessage};
    use crate::routing::filter::DelegateFilter;
    use std::sync::{Arc, Weak};

    struct Quiet;

    impl PortHandler for Quiet {
        fn recv_platform(&self, _port: &Port, _message: &PlatformMessage) -> anyhow::Result<Reply> {
            Ok(Reply::Handled)
        }
    }

    impl SnoopingPortHandler for Quiet {}

    fn hub() -> HubIdentity {
        HubIdentity::new("hub-1")
    }

    fn detached(addressing: Addressing) -> Port {
        Port::endpoint(
            PortSpec::full("detached", addressing, Arc::new(NoopHandler)),
            Weak::new(),
            QueueDepthPolicy::default(),
        )
    }

    #[test]
    fn inner_match_uses_the_projection_of_the_message_kind() {
        let bridge = Addressing::bound(&HubIdentity::new("hub"), &HubAddr::bridge("zigbee", "ZIGB"))
            .expect("bridge binds");

        assert!(bridge.matches(MessageKind::Platform, &HubAddr::service("zigbee")));
        assert!(!bridge.matches(MessageKind::Platform, &HubAddr::protocol("ZIGB")));
        assert!(bridge.matches(MessageKind::Protocol, &HubAddr::protocol("ZIGB")));
        assert!(!bridge.matches(MessageKind::Protocol, &HubAddr::service("zigbee")));
        assert!(!bridge.matches(MessageKind::Custom, &HubAddr::bridge("zigbee", "ZIGB")));
    }

    #[test]
    fn bound_addressing_rejects_missing_address() {
        assert!(matches!(
            Addressing::bound(&hub(), &HubAddr::unaddressed()),
            Err(RouterError::MissingAddress)
        ));
        assert!(matches!(
            Addressing::bound(&hub(), &HubAddr::broadcast()),
            Err(RouterError::MissingAddress)
        ));
    }

    #[test]
    fn protocol_address_makes_a_bridge() {
        let addressing = Addressing::bound(&hub(), &HubAddr::protocol("ZIGB")).expect("bridge");
        let port = detached(addressing);

        assert_eq!(port.service_id(), Some("ZIGB"));
        assert_eq!(port.protocol_id(), Some("ZIGB"));
        assert_eq!(
            port.protocol_address().expect("protocol").hub_id(),
            Some("hub-1")
        );
    }

    #[test]
    fn service_port_has_no_protocol_address() {
        let port = detached(Addressing::bound(&hub(), &HubAddr::service("alarm")).expect("service"));

        assert!(matches!(
            port.protocol_address(),
            Err(RouterError::NoAddress { kind: "protocol", .. })
        ));
        assert_eq!(port.platform_address().expect("platform").to_string(), "SERV:alarm@hub-1");
    }

    #[test]
    fn injector_rejects_everything_but_injection() {
        let injector = Port::endpoint(
            PortSpec::injector("inject"),
            Weak::new(),
            QueueDepthPolicy::default(),
        );
        let body = || MessageBody::new("hub:Ping");

        assert!(injector.is_injector());
        assert!(matches!(
            injector.send(&HubAddr::service("hub"), body()),
            Err(RouterError::Unsupported { operation: "send", .. })
        ));
        assert!(injector.queue(1_u8).is_err());
        assert!(injector
            .delegate(DelegateFilter::message_types(["hub:Ping"]), Arc::new(NoopHandler))
            .is_err());
        // Router is gone: injection is accepted and dropped.
        assert!(injector
            .inject_platform(PlatformMessage::builder(body()).build())
            .is_ok());
    }

    #[test]
    fn listener_only_snooper_can_queue_but_not_send() {
        let snooper = Port::snooping(
            "snoop",
            Arc::new(Quiet),
            None,
            false,
            Weak::new(),
            QueueDepthPolicy::default(),
        );

        assert!(snooper.is_listener_only());
        assert!(snooper.is_listen_all());
        assert!(matches!(
            snooper.send_event(MessageBody::new("hub:Ping")),
            Err(RouterError::NoAddress { .. }) | Err(RouterError::Unsupported { .. })
        ));
        assert!(snooper
            .reply(
                &PlatformMessage::builder(MessageBody::empty()).build(),
                MessageBody::empty()
            )
            .is_err());
        assert!(snooper.queue("later").is_ok());
    }

    #[test]
    fn gateway_takes_inner_addresses_and_delegates_share_them() {
        let gateway = Port::snooping(
            "gateway",
            Arc::new(Quiet),
            Some(PortSpec::full(
                "gateway-inner",
                Addressing::bound(&hub(), &HubAddr::service("cloud")).expect("service"),
                Arc::new(NoopHandler),
            )),
            true,
            Weak::new(),
            QueueDepthPolicy::default(),
        );
        let delegate = gateway
            .delegate(DelegateFilter::message_types(["cloud:Sync"]), Arc::new(NoopHandler))
            .expect("delegate");

        assert!(gateway.is_gateway());
        assert!(!gateway.is_listener_only());
        assert_eq!(gateway.service_id(), Some("cloud"));
        assert_eq!(delegate.service_id(), Some("cloud"));
        assert_eq!(delegate.port_ref().owner, gateway.id());
        assert_ne!(delegate.id(), gateway.id());
    }
}
