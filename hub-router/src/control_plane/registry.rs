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

//! Registered ports and their address indices.

use crate::address::HubAddr;
use crate::error::RouterError;
use crate::message::PortId;
use crate::port::Port;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Default)]
struct RegistryState {
    ports: HashMap<PortId, Port>,
    snoopers: Arc<Vec<Port>>,
    services: HashMap<String, Port>,
    protocols: HashMap<String, Port>,
}

/// Ports by identity plus the service-id and protocol-id indices.
///
/// Written only while ports are connected or torn down; the dispatcher reads it
/// for every routed message.
#[derive(Default)]
pub(crate) struct PortRegistry {
    state: RwLock<RegistryState>,
}

impl PortRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Adds `port` to every registry it qualifies for.
    ///
    /// Fails without side effects if another port already owns one of its ids.
    pub(crate) fn register(&self, port: &Port) -> Result<(), RouterError> {
        let mut state = self.state.write();

        if let Some(service_id) = port.service_id() {
            if state.services.contains_key(service_id) {
                return Err(RouterError::AddressInUse(
                    HubAddr::service(service_id).to_string(),
                ));
            }
        }
        if let Some(protocol_id) = port.protocol_id() {
            if state.protocols.contains_key(protocol_id) {
                return Err(RouterError::AddressInUse(
                    HubAddr::protocol(protocol_id).to_string(),
                ));
            }
        }

        state.ports.insert(port.id(), port.clone());
        if port.is_listen_all() {
            let mut snoopers = state.snoopers.as_ref().clone();
            snoopers.push(port.clone());
            state.snoopers = Arc::new(snoopers);
        }
        if let Some(service_id) = port.service_id() {
            state.services.insert(service_id.to_string(), port.clone());
        }
        if let Some(protocol_id) = port.protocol_id() {
            state.protocols.insert(protocol_id.to_string(), port.clone());
        }
        Ok(())
    }

    /// Removes the port `id` from every registry.
    pub(crate) fn unregister(&self, id: PortId) -> Option<Port> {
        let mut state = self.state.write();
        let port = state.ports.remove(&id)?;

        if port.is_listen_all() {
            let snoopers = state
                .snoopers
                .iter()
                .filter(|snooper| snooper.id() != id)
                .cloned()
                .collect();
            state.snoopers = Arc::new(snoopers);
        }
        state.services.retain(|_, owner| owner.id() != id);
        state.protocols.retain(|_, owner| owner.id() != id);
        Some(port)
    }

    pub(crate) fn get(&self, id: PortId) -> Option<Port> {
        self.state.read().ports.get(&id).cloned()
    }

    /// Owners of `addr`'s service id and protocol id, in that order.
    pub(crate) fn resolve(&self, addr: &HubAddr) -> (Option<Port>, Option<Port>) {
        let state = self.state.read();
        let service = addr
            .service_id()
            .and_then(|service_id| state.services.get(service_id).cloned());
        let protocol = addr
            .protocol_id()
            .and_then(|protocol_id| state.protocols.get(protocol_id).cloned());
        (service, protocol)
    }

    /// Snapshot of the listen-all ports in registration order.
    pub(crate) fn snoopers(&self) -> Arc<Vec<Port>> {
        self.state.read().snoopers.clone()
    }

    pub(crate) fn ports(&self) -> Vec<Port> {
        self.state.read().ports.values().cloned().collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.state.read().ports.len()
    }

    pub(crate) fn clear(&self) -> usize {
        let mut state = self.state.write();
        let removed = state.ports.len();
        *state = RegistryState::default();
        removed
    }
}
