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

//! Selection predicates for delegate handlers.

use crate::protocol::ProtocolMessage;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Decides which messages a delegate handler claims.
///
/// Platform filters never match protocol messages and vice versa.
#[derive(Clone)]
pub enum DelegateFilter {
    /// Platform messages whose type tag is in the set.
    MessageTypes(BTreeSet<String>),
    /// Protocol messages whose protocol name is in the set.
    Protocols(BTreeSet<String>),
    /// Platform messages whose type tag satisfies the predicate.
    MessageTypeWhere(Arc<dyn Fn(&str) -> bool + Send + Sync>),
    /// Protocol messages satisfying the predicate.
    ProtocolWhere(Arc<dyn Fn(&ProtocolMessage) -> bool + Send + Sync>),
}

impl DelegateFilter {
    pub fn message_types<I, S>(message_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        DelegateFilter::MessageTypes(message_types.into_iter().map(Into::into).collect())
    }

    pub fn protocols<I, S>(protocols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        DelegateFilter::Protocols(protocols.into_iter().map(Into::into).collect())
    }

    pub fn message_type_where<F>(predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        DelegateFilter::MessageTypeWhere(Arc::new(predicate))
    }

    pub fn protocol_where<F>(predicate: F) -> Self
    where
        F: Fn(&ProtocolMessage) -> bool + Send + Sync + 'static,
    {
        DelegateFilter::ProtocolWhere(Arc::new(predicate))
    }

    pub(crate) fn accepts_platform(&self, message_type: &str) -> bool {
        match self {
            DelegateFilter::MessageTypes(types) => types.contains(message_type),
            DelegateFilter::MessageTypeWhere(predicate) => predicate(message_type),
            DelegateFilter::Protocols(_) | DelegateFilter::ProtocolWhere(_) => false,
        }
    }

    pub(crate) fn accepts_protocol(&self, message: &ProtocolMessage) -> bool {
        match self {
            DelegateFilter::Protocols(protocols) => protocols.contains(message.protocol()),
            DelegateFilter::ProtocolWhere(predicate) => predicate(message),
            DelegateFilter::MessageTypes(_) | DelegateFilter::MessageTypeWhere(_) => false,
        }
    }
}

impl fmt::Debug for DelegateFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DelegateFilter::MessageTypes(types) => {
                f.debug_tuple("MessageTypes").field(types).finish()
            }
            DelegateFilter::Protocols(protocols) => {
                f.debug_tuple("Protocols").field(protocols).finish()
            }
            DelegateFilter::MessageTypeWhere(_) => f.write_str("MessageTypeWhere(..)"),
            DelegateFilter::ProtocolWhere(_) => f.write_str("ProtocolWhere(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DelegateFilter;
    use crate::protocol::ProtocolMessage;

    #[test]
    fn message_type_filter_ignores_protocol_traffic() {
        let filter = DelegateFilter::message_types(["zigbee:Join", "zigbee:Leave"]);

        assert!(filter.accepts_platform("zigbee:Join"));
        assert!(!filter.accepts_platform("zwave:Join"));
        assert!(!filter.accepts_protocol(&ProtocolMessage::new("zigbee:Join", vec![])));
    }

    #[test]
    fn protocol_predicate_sees_payload() {
        let filter = DelegateFilter::protocol_where(|message| message.payload().first() == Some(&0x7e));

        assert!(filter.accepts_protocol(&ProtocolMessage::new("ZIGB", vec![0x7e, 0x01])));
        assert!(!filter.accepts_protocol(&ProtocolMessage::new("ZIGB", vec![0x00])));
        assert!(!filter.accepts_platform("ZIGB"));
    }
}
