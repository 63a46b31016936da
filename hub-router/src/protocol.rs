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

//! Protocol messages: device-wire-level traffic addressed to protocol endpoints.

use crate::address::HubAddr;
use chrono::{DateTime, Utc};

/// An immutable protocol message. The payload is an already-encoded frame.
#[derive(Clone, Debug, PartialEq)]
pub struct ProtocolMessage {
    source: HubAddr,
    destination: HubAddr,
    protocol: String,
    payload: Vec<u8>,
    ttl: Option<u32>,
    timestamp: DateTime<Utc>,
}

impl ProtocolMessage {
    pub fn new(protocol: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            source: HubAddr::unaddressed(),
            destination: HubAddr::unaddressed(),
            protocol: protocol.into(),
            payload: payload.into(),
            ttl: None,
            timestamp: Utc::now(),
        }
    }

    pub fn from(mut self, source: HubAddr) -> Self {
        self.source = source;
        self
    }

    pub fn to(mut self, destination: HubAddr) -> Self {
        self.destination = destination;
        self
    }

    pub fn with_ttl(mut self, ttl: Option<u32>) -> Self {
        self.ttl = ttl;
        self
    }

    pub(crate) fn forwarded_to(&self, destination: &HubAddr) -> ProtocolMessage {
        ProtocolMessage {
            destination: destination.clone(),
            ..self.clone()
        }
    }

    pub fn source(&self) -> &HubAddr {
        &self.source
    }

    pub fn destination(&self) -> &HubAddr {
        &self.destination
    }

    /// Protocol name, e.g. `ZIGB`, `ZWAV` or `REFL`.
    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn ttl(&self) -> Option<u32> {
        self.ttl
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}
