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

//! # hub-router
//!
//! `hub-router` is the in-process message bus of an IoT hub agent. Independently
//! threaded ports exchange platform messages (application events and requests
//! addressed to services), protocol messages (device-wire traffic addressed to
//! protocol endpoints) and same-process custom messages.
//!
//! Typical usage is API-first and centered on [`Router`], [`Port`] and the
//! [`PortHandler`] contract.
//!
//! ## Request and reply
//!
//! ```
//! use std::sync::mpsc;
//! use std::time::Duration;
//! use hub_router::{platform_handler, HubAddr, MessageBody, Reply, Router, RouterConfig};
//!
//! let router = Router::new(RouterConfig::default());
//! router.start().unwrap();
//!
//! router
//!     .connect_addr(
//!         "clock",
//!         &HubAddr::service("clock"),
//!         platform_handler(|_port, _request| {
//!             Ok(Reply::Body(MessageBody::new("clock:Time").with_attribute("hour", 12)))
//!         }),
//!     )
//!     .unwrap();
//!
//! let (replies, received) = mpsc::channel();
//! let client = router
//!     .connect_addr(
//!         "client",
//!         &HubAddr::service("client"),
//!         platform_handler(move |_port, reply| {
//!             replies.send(reply.clone()).unwrap();
//!             Ok(Reply::Handled)
//!         }),
//!     )
//!     .unwrap();
//!
//! let correlation_id = client
//!     .send_request(&HubAddr::service("clock"), MessageBody::new("clock:GetTime"))
//!     .unwrap();
//! let reply = received.recv_timeout(Duration::from_secs(5)).unwrap();
//!
//! assert_eq!(reply.correlation_id(), Some(correlation_id.as_str()));
//! assert_eq!(reply.message_type(), "clock:Time");
//! assert!(router.shutdown());
//! ```
//!
//! ## Port contract
//!
//! Unsupported operations fail fast: an injector can only push pre-built
//! messages and a listener-only snooper can never send.
//!
//! ```
//! use std::sync::Arc;
//! use hub_router::{
//!     HubAddr, MessageBody, PlatformMessage, Port, PortHandler, Reply, Router, RouterError,
//!     SnoopingPortHandler,
//! };
//!
//! struct Tap;
//!
//! impl PortHandler for Tap {
//!     fn recv_platform(&self, _port: &Port, _message: &PlatformMessage) -> anyhow::Result<Reply> {
//!         Ok(Reply::None)
//!     }
//! }
//!
//! impl SnoopingPortHandler for Tap {}
//!
//! let router = Router::default();
//! let injector = router.injector("cli").unwrap();
//! let tap = router.snoop("tap", Arc::new(Tap)).unwrap();
//!
//! assert!(matches!(
//!     injector.send(&HubAddr::service("hub"), MessageBody::new("hub:Ping")),
//!     Err(RouterError::Unsupported { .. })
//! ));
//! assert!(injector
//!     .inject_platform(
//!         PlatformMessage::builder(MessageBody::new("hub:Ping"))
//!             .from(HubAddr::service("cli"))
//!             .to(HubAddr::service("hub"))
//!             .build(),
//!     )
//!     .is_ok());
//! assert!(tap.is_listener_only());
//! assert!(tap.send_event(MessageBody::new("hub:Ping")).is_err());
//! router.shutdown();
//! ```
//!
//! ## Layers
//!
//! - API facade: [`Router`], [`Port`], handler traits and message types
//! - Control plane: port registry and service-id/protocol-id indices
//! - Routing: delegate chains, filters and reply conversion
//! - Data plane: per-port message processors and the dispatcher
//! - Runtime: worker threads and shutdown interruption
//!
//! ## Observability
//!
//! The crate uses `tracing` for logs/events. Library code never initializes a
//! global subscriber; binaries and tests are responsible for one-time
//! `tracing_subscriber` initialization. Every event carries `event` and
//! `component` fields with names from [`observability::events`].

mod address;
pub use address::{HubAddr, HubIdentity};

mod config;
pub use config::RouterConfig;

mod error;
pub use error::{ErrorEvent, RouterError, DEFAULT_ERROR_CODE};

mod handler;
pub use handler::{platform_handler, PortHandler, Reply, SnoopingPortHandler};

mod message;
pub use message::{CustomPayload, Message, MessageKind, PortId, PortRef};

mod platform;
pub use platform::{
    MessageBody, PlatformMessage, PlatformMessageBuilder, EMPTY_MESSAGE_TYPE,
    ERROR_EVENT_MESSAGE_TYPE, ERROR_MESSAGE_TYPE,
};

mod protocol;
pub use protocol::ProtocolMessage;

mod port;
pub use port::Port;

mod router;
pub use router::Router;

pub use routing::filter::DelegateFilter;

mod control_plane;
mod data_plane;
#[doc(hidden)]
pub mod observability;
mod routing;
mod runtime;
