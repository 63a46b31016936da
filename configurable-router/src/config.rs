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

use hub_router::{HubAddr, RouterConfig};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub(crate) router: RouterConfig,
    #[serde(default)]
    pub(crate) services: Vec<ServiceConfig>,
    #[serde(default)]
    pub(crate) gateway: GatewayConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    pub(crate) name: String,
    pub(crate) service_id: Option<String>,
    pub(crate) protocol_id: Option<String>,
}

impl ServiceConfig {
    pub(crate) fn address(&self) -> anyhow::Result<HubAddr> {
        match (&self.service_id, &self.protocol_id) {
            (Some(service_id), Some(protocol_id)) => Ok(HubAddr::bridge(service_id, protocol_id)),
            (Some(service_id), None) => Ok(HubAddr::service(service_id)),
            (None, Some(protocol_id)) => Ok(HubAddr::protocol(protocol_id)),
            (None, None) => anyhow::bail!(
                "service {} needs a service_id or a protocol_id",
                self.name
            ),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    #[serde(default)]
    pub(crate) enabled: bool,
    /// When set the gateway also owns this service id and answers its requests.
    #[serde(default)]
    pub(crate) service_id: Option<String>,
    /// Empty means every platform message type.
    #[serde(default)]
    pub(crate) message_type_prefixes: Vec<String>,
}

impl GatewayConfig {
    pub(crate) fn is_interested_in(&self, message_type: &str) -> bool {
        self.message_type_prefixes.is_empty()
            || self
                .message_type_prefixes
                .iter()
                .any(|prefix| message_type.starts_with(prefix.as_str()))
    }
}
