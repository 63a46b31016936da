/********************************************************************************
 * Copyright (c) 2025 Contributors to the Eclipse Foundation
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

use crate::address::HubIdentity;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_HUB_ID: &str = "local-hub";
pub const DEFAULT_QUEUE_WARN_THRESHOLD: usize = 10;
pub const DEFAULT_QUEUE_WARN_GRANULARITY: usize = 10;
pub const DEFAULT_SHUTDOWN_DRAIN_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_SHUTDOWN_DRAIN_ATTEMPTS: u32 = 3;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct RouterConfig {
    pub hub_id: String,
    pub queue_warn_threshold: usize,
    pub queue_warn_granularity: usize,
    pub shutdown_drain_timeout_ms: u64,
    pub shutdown_drain_attempts: u32,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            hub_id: DEFAULT_HUB_ID.to_string(),
            queue_warn_threshold: DEFAULT_QUEUE_WARN_THRESHOLD,
            queue_warn_granularity: DEFAULT_QUEUE_WARN_GRANULARITY,
            shutdown_drain_timeout_ms: DEFAULT_SHUTDOWN_DRAIN_TIMEOUT_MS,
            shutdown_drain_attempts: DEFAULT_SHUTDOWN_DRAIN_ATTEMPTS,
        }
    }
}

impl RouterConfig {
    pub fn from_json5(contents: &str) -> Result<Self, json5::Error> {
        json5::from_str(contents)
    }

    pub fn hub_identity(&self) -> HubIdentity {
        HubIdentity::new(&self.hub_id)
    }

    pub fn shutdown_drain_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_drain_timeout_ms)
    }

    pub(crate) fn queue_depth_policy(&self) -> QueueDepthPolicy {
        QueueDepthPolicy {
            threshold: self.queue_warn_threshold.max(1),
            granularity: self.queue_warn_granularity.max(1),
        }
    }
}

/// When queue-depth milestones are reported.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct QueueDepthPolicy {
    pub(crate) threshold: usize,
    pub(crate) granularity: usize,
}

impl Default for QueueDepthPolicy {
    fn default() -> Self {
        RouterConfig::default().queue_depth_policy()
    }
}
