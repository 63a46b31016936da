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

//! Hub-local addressing.
//!
//! A [`HubAddr`] names either a logical platform service (`service_id`), a physical
//! protocol endpoint (`protocol_id`), both at once (a protocol bridge), the hub-wide
//! broadcast address, or nobody at all.

use std::fmt;
use std::sync::Arc;

/// Identity of the hub hosting the router.
///
/// Computed once and handed to the router, which stamps it onto every port address.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct HubIdentity {
    hub_id: Arc<str>,
}

impl HubIdentity {
    pub fn new(hub_id: impl AsRef<str>) -> Self {
        Self {
            hub_id: Arc::from(hub_id.as_ref()),
        }
    }

    pub fn hub_id(&self) -> &str {
        &self.hub_id
    }

    /// Returns `address` attributed to this hub.
    pub fn qualify(&self, address: &HubAddr) -> HubAddr {
        HubAddr {
            hub_id: Some(self.hub_id.clone()),
            ..address.clone()
        }
    }
}

impl fmt::Display for HubIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hub_id)
    }
}

/// Address of a participant on the hub message bus.
///
/// Equality and hashing include the owning hub, routing only ever looks at the
/// [`service_id`](HubAddr::service_id) and [`protocol_id`](HubAddr::protocol_id)
/// projections.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct HubAddr {
    hub_id: Option<Arc<str>>,
    service_id: Option<Arc<str>>,
    protocol_id: Option<Arc<str>>,
    broadcast: bool,
}

impl HubAddr {
    /// Address of a platform service, e.g. `hub` or `alarm`.
    pub fn service(service_id: impl AsRef<str>) -> Self {
        Self {
            service_id: Some(Arc::from(service_id.as_ref())),
            ..Self::default()
        }
    }

    /// Address of a protocol endpoint, e.g. `ZIGB`.
    pub fn protocol(protocol_id: impl AsRef<str>) -> Self {
        Self {
            protocol_id: Some(Arc::from(protocol_id.as_ref())),
            ..Self::default()
        }
    }

    /// Address owned by a protocol bridge: one service id plus one protocol id.
    pub fn bridge(service_id: impl AsRef<str>, protocol_id: impl AsRef<str>) -> Self {
        Self {
            service_id: Some(Arc::from(service_id.as_ref())),
            protocol_id: Some(Arc::from(protocol_id.as_ref())),
            ..Self::default()
        }
    }

    /// Hub-wide broadcast. Owned by nobody; only snoopers observe it.
    pub fn broadcast() -> Self {
        Self {
            broadcast: true,
            ..Self::default()
        }
    }

    /// The "not addressed to anyone" sentinel.
    pub fn unaddressed() -> Self {
        Self::default()
    }

    pub fn hub_id(&self) -> Option<&str> {
        self.hub_id.as_deref()
    }

    pub fn service_id(&self) -> Option<&str> {
        self.service_id.as_deref()
    }

    pub fn protocol_id(&self) -> Option<&str> {
        self.protocol_id.as_deref()
    }

    pub fn is_broadcast(&self) -> bool {
        self.broadcast
    }

    pub fn is_unaddressed(&self) -> bool {
        !self.broadcast && self.service_id.is_none() && self.protocol_id.is_none()
    }

    /// Service-shaped projection of this address, used as a bridge's platform address.
    pub(crate) fn platform_projection(&self) -> Option<HubAddr> {
        let service_id = self
            .service_id
            .clone()
            .or_else(|| self.protocol_id.clone())?;
        Some(HubAddr {
            hub_id: self.hub_id.clone(),
            service_id: Some(service_id),
            protocol_id: None,
            broadcast: false,
        })
    }

    /// Protocol-shaped projection of this address.
    pub(crate) fn protocol_projection(&self) -> Option<HubAddr> {
        let protocol_id = self.protocol_id.clone()?;
        Some(HubAddr {
            hub_id: self.hub_id.clone(),
            service_id: None,
            protocol_id: Some(protocol_id),
            broadcast: false,
        })
    }
}

impl fmt::Display for HubAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.broadcast {
            f.write_str("BCST")?;
        } else {
            match (self.service_id(), self.protocol_id()) {
                (Some(service), Some(protocol)) => write!(f, "BRDG:{service}:{protocol}")?,
                (Some(service), None) => write!(f, "SERV:{service}")?,
                (None, Some(protocol)) => write!(f, "PROT:{protocol}")?,
                (None, None) => f.write_str("NONE")?,
            }
        }

        if let Some(hub_id) = self.hub_id() {
            write!(f, "@{hub_id}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{HubAddr, HubIdentity};

    #[test]
    fn sentinels_are_distinguishable() {
        assert!(HubAddr::unaddressed().is_unaddressed());
        assert!(!HubAddr::broadcast().is_unaddressed());
        assert!(HubAddr::broadcast().is_broadcast());
        assert!(!HubAddr::service("hub").is_unaddressed());
    }

    #[test]
    fn bridge_exposes_both_projections() {
        let addr = HubAddr::bridge("zigb", "ZIGB");

        assert_eq!(addr.service_id(), Some("zigb"));
        assert_eq!(addr.protocol_id(), Some("ZIGB"));
        assert_eq!(
            addr.platform_projection().and_then(|a| a.service_id().map(str::to_owned)),
            Some("zigb".to_string())
        );
        assert_eq!(
            addr.protocol_projection().map(|a| a.service_id().is_none()),
            Some(true)
        );
    }

    #[test]
    fn protocol_only_address_has_service_shaped_platform_projection() {
        let addr = HubAddr::protocol("ZWAV");

        let platform = addr.platform_projection().expect("projection should exist");
        assert_eq!(platform.service_id(), Some("ZWAV"));
        assert_eq!(platform.protocol_id(), None);
    }

    #[test]
    fn qualify_attaches_hub_id_and_display_includes_it() {
        let hub = HubIdentity::new("LWW-1234");
        let addr = hub.qualify(&HubAddr::service("hub"));

        assert_eq!(addr.hub_id(), Some("LWW-1234"));
        assert_eq!(addr.to_string(), "SERV:hub@LWW-1234");
        assert_eq!(HubAddr::bridge("zigb", "ZIGB").to_string(), "BRDG:zigb:ZIGB");
        assert_eq!(HubAddr::unaddressed().to_string(), "NONE");
    }
}
