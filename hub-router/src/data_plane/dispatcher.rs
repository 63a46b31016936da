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

//! Resolves produced messages to owning ports on the single dispatcher worker.

use crate::address::HubAddr;
use crate::control_plane::registry::PortRegistry;
use crate::data_plane::processor::Consumer;
use crate::message::{Delivery, Message, PortId};
use crate::observability::{events, fields};
use crate::port::Port;
use std::sync::Arc;
use tracing::{debug, info, trace, warn, Level};

const COMPONENT: &str = "dispatcher";

pub(crate) const DISPATCHER_NAME: &str = "dispatcher";

/// Routing decisions for every message produced on the bus.
///
/// All routing happens on one worker, which gives a total order over routing
/// decisions even though ports run in parallel.
pub(crate) struct Dispatcher {
    registry: Arc<PortRegistry>,
}

impl Dispatcher {
    pub(crate) fn new(registry: Arc<PortRegistry>) -> Self {
        Self { registry }
    }

    pub(crate) fn route(&self, message: Message) {
        if let Some(destination) = message.destination().cloned() {
            self.route_addressed(&destination, message);
            return;
        }

        match &message {
            Message::Custom { destination, .. } => match self.registry.get(destination.owner) {
                Some(owner) => deliver(&owner, None, message.clone(), false),
                None => warn!(
                    event = events::DISPATCH_DROP_UNREGISTERED,
                    component = COMPONENT,
                    dst = %destination.id,
                    "custom message destination is not registered; dropping"
                ),
            },
            Message::Poison {
                target: Some(target),
            } => self.route_targeted_poison(*target, message.clone()),
            Message::Poison { target: None } => broadcast_poison(&self.registry),
            Message::Platform { .. } | Message::Protocol { .. } => {}
        }
    }

    fn route_addressed(&self, destination: &HubAddr, message: Message) {
        let (service_owner, protocol_owner) = self.registry.resolve(destination);
        let mut delivered: Vec<PortId> = Vec::with_capacity(2);

        for owner in [service_owner, protocol_owner].into_iter().flatten() {
            if delivered.contains(&owner.id()) {
                continue;
            }
            deliver(&owner, Some(destination.clone()), message.clone(), false);
            delivered.push(owner.id());
        }

        let mut snooped = 0_usize;
        if !message.is_forwarded() {
            for snooper in self.registry.snoopers().iter() {
                if delivered.contains(&snooper.id()) {
                    continue;
                }
                deliver(snooper, Some(destination.clone()), message.clone(), true);
                snooped += 1;
            }
        }

        if tracing::enabled!(Level::TRACE) {
            let message_fields = fields::FormattedMessageFields::from_message(&message);
            trace!(
                event = events::DISPATCH_ROUTE,
                component = COMPONENT,
                msg_kind = message_fields.msg_kind,
                msg_type = message_fields.msg_type.as_str(),
                src = message_fields.src.as_str(),
                dst = message_fields.dst.as_str(),
                owners = delivered.len(),
                snooped,
                "message routed"
            );
        }

        if delivered.is_empty() && snooped == 0 {
            let message_fields = fields::FormattedMessageFields::from_message(&message);
            if destination.is_broadcast() {
                debug!(
                    event = events::DISPATCH_DROP_UNADDRESSED,
                    component = COMPONENT,
                    msg_type = message_fields.msg_type.as_str(),
                    src = message_fields.src.as_str(),
                    "broadcast has no listeners"
                );
            } else {
                warn!(
                    event = events::DISPATCH_DROP_UNADDRESSED,
                    component = COMPONENT,
                    msg_kind = message_fields.msg_kind,
                    msg_type = message_fields.msg_type.as_str(),
                    src = message_fields.src.as_str(),
                    dst = message_fields.dst.as_str(),
                    "no port owns the destination; dropping"
                );
            }
        }
    }

    /// Delivers the poison, then forgets the port so later traffic to its addresses
    /// is dropped instead of queued behind the poison.
    fn route_targeted_poison(&self, target: PortId, message: Message) {
        match self.registry.get(target) {
            Some(port) => {
                deliver(&port, None, message, false);
                self.registry.unregister(target);
                info!(
                    event = events::PORT_UNREGISTER,
                    component = COMPONENT,
                    port = port.name(),
                    "port unregistered"
                );
            }
            None => warn!(
                event = events::DISPATCH_DROP_UNREGISTERED,
                component = COMPONENT,
                dst = %target,
                "poison target is not registered; dropping"
            ),
        }
    }
}

impl Consumer for Dispatcher {
    fn handle(&self, delivery: Delivery) -> anyhow::Result<()> {
        self.route(delivery.message);
        Ok(())
    }

    fn on_poison(&self, _delivery: &Delivery) {
        broadcast_poison(&self.registry);
    }
}

/// Queues a broadcast poison on every registered port.
pub(crate) fn broadcast_poison(registry: &PortRegistry) {
    let ports = registry.ports();
    for port in &ports {
        deliver(port, None, Message::Poison { target: None }, false);
    }
    info!(
        event = events::DISPATCH_BROADCAST_POISON,
        component = COMPONENT,
        ports = ports.len(),
        "poison broadcast to all ports"
    );
}

fn deliver(port: &Port, addr: Option<HubAddr>, message: Message, snoop: bool) {
    let kind = message.kind();
    if let Err(err) = port.enqueue(addr, message, snoop) {
        warn!(
            event = events::DISPATCH_ENQUEUE_FAILED,
            component = COMPONENT,
            port = port.name(),
            msg_kind = kind.as_str(),
            err = %err,
            "unable to deliver message to port"
        );
    }
}
