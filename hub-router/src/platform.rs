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

//! Platform messages: application-level events and requests addressed to services.

use crate::address::HubAddr;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const EMPTY_MESSAGE_TYPE: &str = "EmptyMessage";
pub const ERROR_MESSAGE_TYPE: &str = "Error";
pub const ERROR_EVENT_MESSAGE_TYPE: &str = "ErrorEvent";

const ATTR_CODE: &str = "code";
const ATTR_MESSAGE: &str = "message";

/// Typed payload of a platform message. Opaque to the router beyond its type tag.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageBody {
    message_type: String,
    #[serde(default)]
    attributes: Map<String, Value>,
}

impl MessageBody {
    pub fn new(message_type: impl Into<String>) -> Self {
        Self {
            message_type: message_type.into(),
            attributes: Map::new(),
        }
    }

    pub fn empty() -> Self {
        Self::new(EMPTY_MESSAGE_TYPE)
    }

    /// Structured error value. `ERROR_MESSAGE_TYPE` for correlated replies.
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ERROR_MESSAGE_TYPE)
            .with_attribute(ATTR_CODE, code.into())
            .with_attribute(ATTR_MESSAGE, message.into())
    }

    /// Structured error value used for unsolicited error notifications.
    pub fn error_event(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ERROR_EVENT_MESSAGE_TYPE)
            .with_attribute(ATTR_CODE, code.into())
            .with_attribute(ATTR_MESSAGE, message.into())
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn message_type(&self) -> &str {
        &self.message_type
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    pub fn is_error(&self) -> bool {
        self.message_type == ERROR_MESSAGE_TYPE || self.message_type == ERROR_EVENT_MESSAGE_TYPE
    }

    pub fn error_code(&self) -> Option<&str> {
        self.is_error()
            .then(|| self.attribute(ATTR_CODE).and_then(Value::as_str))
            .flatten()
    }
}

/// An immutable platform message.
#[derive(Clone, Debug, PartialEq)]
pub struct PlatformMessage {
    source: HubAddr,
    destination: HubAddr,
    body: MessageBody,
    correlation_id: Option<String>,
    request: bool,
    ttl: Option<u32>,
    timestamp: DateTime<Utc>,
}

impl PlatformMessage {
    pub fn builder(body: MessageBody) -> PlatformMessageBuilder {
        PlatformMessageBuilder {
            message: PlatformMessage {
                source: HubAddr::unaddressed(),
                destination: HubAddr::unaddressed(),
                body,
                correlation_id: None,
                request: false,
                ttl: None,
                timestamp: Utc::now(),
            },
        }
    }

    /// Response to `request` carrying `body`, correlated when `request` was.
    ///
    /// The response is sent by whatever `request` was addressed to, falling back to
    /// `default_source` when it carried no destination.
    pub(crate) fn response_to(
        request: &PlatformMessage,
        default_source: &HubAddr,
        body: MessageBody,
    ) -> PlatformMessage {
        let source = if request.destination.is_unaddressed() || request.destination.is_broadcast()
        {
            default_source.clone()
        } else {
            request.destination.clone()
        };

        PlatformMessage::builder(body)
            .from(source)
            .to(request.source.clone())
            .correlation_id(request.correlation_id.clone())
            .build()
    }

    /// Drops the correlation id, turning a response into a plain notification.
    pub(crate) fn uncorrelated(mut self) -> PlatformMessage {
        self.correlation_id = None;
        self
    }

    /// Copy of this message re-addressed to `destination` without its correlation id.
    ///
    /// TTL, timestamp and the request flag are preserved.
    pub(crate) fn forwarded_to(&self, destination: &HubAddr) -> PlatformMessage {
        PlatformMessage {
            destination: destination.clone(),
            correlation_id: None,
            ..self.clone()
        }
    }

    pub fn source(&self) -> &HubAddr {
        &self.source
    }

    pub fn destination(&self) -> &HubAddr {
        &self.destination
    }

    pub fn body(&self) -> &MessageBody {
        &self.body
    }

    pub fn message_type(&self) -> &str {
        self.body.message_type()
    }

    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    pub fn is_request(&self) -> bool {
        self.request
    }

    /// A request demands a correlated response.
    pub fn is_response_required(&self) -> bool {
        self.request
    }

    pub fn is_error(&self) -> bool {
        self.body.is_error()
    }

    pub fn ttl(&self) -> Option<u32> {
        self.ttl
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

pub struct PlatformMessageBuilder {
    message: PlatformMessage,
}

impl PlatformMessageBuilder {
    pub fn from(mut self, source: HubAddr) -> Self {
        self.message.source = source;
        self
    }

    pub fn to(mut self, destination: HubAddr) -> Self {
        self.message.destination = destination;
        self
    }

    /// Marks the message as a request and assigns a fresh correlation id if none is set.
    pub fn request(mut self) -> Self {
        self.message.request = true;
        if self.message.correlation_id.is_none() {
            self.message.correlation_id = Some(uuid::Uuid::new_v4().to_string());
        }
        self
    }

    pub fn correlation_id(mut self, correlation_id: Option<String>) -> Self {
        self.message.correlation_id = correlation_id;
        self
    }

    pub fn ttl(mut self, ttl: Option<u32>) -> Self {
        self.message.ttl = ttl;
        self
    }

    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.message.timestamp = timestamp;
        self
    }

    pub fn build(self) -> PlatformMessage {
        self.message
    }
}

#[cfg(test)]
mod tests {
    use super::{MessageBody, PlatformMessage, EMPTY_MESSAGE_TYPE};
    use crate::address::HubAddr;

    fn request() -> PlatformMessage {
        PlatformMessage::builder(MessageBody::new("hub:GetAttributes"))
            .from(HubAddr::service("client"))
            .to(HubAddr::service("hub"))
            .ttl(Some(30))
            .request()
            .build()
    }

    #[test]
    fn request_builder_assigns_correlation_id() {
        let req = request();

        assert!(req.is_request());
        assert!(req.is_response_required());
        assert!(req.correlation_id().is_some());
    }

    #[test]
    fn response_is_correlated_and_reverses_addresses() {
        let req = request();
        let rsp = PlatformMessage::response_to(
            &req,
            &HubAddr::service("fallback"),
            MessageBody::empty(),
        );

        assert_eq!(rsp.correlation_id(), req.correlation_id());
        assert_eq!(rsp.source(), &HubAddr::service("hub"));
        assert_eq!(rsp.destination(), &HubAddr::service("client"));
        assert!(!rsp.is_request());
        assert_eq!(rsp.message_type(), EMPTY_MESSAGE_TYPE);
    }

    #[test]
    fn response_to_unaddressed_request_uses_default_source() {
        let req = PlatformMessage::builder(MessageBody::new("hub:Ping"))
            .from(HubAddr::service("client"))
            .build();
        let rsp = PlatformMessage::response_to(
            &req,
            &HubAddr::service("hub"),
            MessageBody::new("hub:Pong"),
        );

        assert_eq!(rsp.source(), &HubAddr::service("hub"));
        assert_eq!(rsp.correlation_id(), None);
    }

    #[test]
    fn forwarded_copy_strips_correlation_but_keeps_ttl_and_request_flag() {
        let req = request();
        let fwd = req.forwarded_to(&HubAddr::protocol("ZIGB"));

        assert_eq!(fwd.correlation_id(), None);
        assert_eq!(fwd.ttl(), Some(30));
        assert_eq!(fwd.timestamp(), req.timestamp());
        assert!(fwd.is_request());
        assert_eq!(fwd.source(), req.source());
        assert_eq!(fwd.destination(), &HubAddr::protocol("ZIGB"));
    }

    #[test]
    fn error_bodies_expose_code() {
        assert_eq!(
            MessageBody::error("NotFound", "missing").error_code(),
            Some("NotFound")
        );
        assert!(MessageBody::error_event("Oops", "x").is_error());
        assert_eq!(MessageBody::new("hub:Ping").error_code(), None);
    }
}
