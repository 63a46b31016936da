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

#![allow(dead_code)]

use hub_router::{
    CustomPayload, PlatformMessage, Port, PortHandler, ProtocolMessage, Reply, Router,
    RouterConfig, SnoopingPortHandler,
};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::Duration;

pub(crate) const RECV_TIMEOUT: Duration = Duration::from_secs(5);
pub(crate) const QUIET_PERIOD: Duration = Duration::from_millis(200);

pub(crate) fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub(crate) fn make_router(hub_id: &str) -> Router {
    init_logging();
    let router = Router::new(RouterConfig {
        hub_id: hub_id.to_string(),
        shutdown_drain_timeout_ms: 2_000,
        shutdown_drain_attempts: 2,
        ..RouterConfig::default()
    });
    router.start().expect("router should start");
    router
}

/// What a [`Recorder`] saw, tagged with the name of the port it was handed.
#[derive(Clone, Debug)]
pub(crate) enum Received {
    Platform { port: String, message: PlatformMessage },
    Protocol { port: String, message: ProtocolMessage },
    Custom { port: String, payload: String },
}

impl Received {
    pub(crate) fn port(&self) -> &str {
        match self {
            Received::Platform { port, .. }
            | Received::Protocol { port, .. }
            | Received::Custom { port, .. } => port,
        }
    }

    pub(crate) fn platform(&self) -> &PlatformMessage {
        match self {
            Received::Platform { message, .. } => message,
            other => panic!("expected a platform message, got {other:?}"),
        }
    }

    pub(crate) fn message_type(&self) -> &str {
        match self {
            Received::Platform { message, .. } => message.message_type(),
            Received::Protocol { message, .. } => message.protocol(),
            Received::Custom { payload, .. } => payload,
        }
    }
}

type ReplyFn = dyn Fn(&Port, &PlatformMessage) -> anyhow::Result<Reply> + Send + Sync;

/// Handler that reports everything it receives on a channel.
pub(crate) struct Recorder {
    events: Sender<Received>,
    reply: Box<ReplyFn>,
    snoop_interest: Option<String>,
}

impl Recorder {
    /// Records and returns [`Reply::None`].
    pub(crate) fn new() -> (Arc<Self>, Receiver<Received>) {
        Self::replying(|_port, _message| Ok(Reply::None))
    }

    pub(crate) fn replying<F>(reply: F) -> (Arc<Self>, Receiver<Received>)
    where
        F: Fn(&Port, &PlatformMessage) -> anyhow::Result<Reply> + Send + Sync + 'static,
    {
        let (events, received) = mpsc::channel();
        (
            Arc::new(Self {
                events,
                reply: Box::new(reply),
                snoop_interest: None,
            }),
            received,
        )
    }

    /// Records snooped platform messages whose type starts with `prefix` only.
    pub(crate) fn interested_in(prefix: &str) -> (Arc<Self>, Receiver<Received>) {
        let (events, received) = mpsc::channel();
        (
            Arc::new(Self {
                events,
                reply: Box::new(|_port, _message| Ok(Reply::None)),
                snoop_interest: Some(prefix.to_string()),
            }),
            received,
        )
    }
}

impl PortHandler for Recorder {
    fn recv_platform(&self, port: &Port, message: &PlatformMessage) -> anyhow::Result<Reply> {
        let _ = self.events.send(Received::Platform {
            port: port.name().to_string(),
            message: message.clone(),
        });
        (self.reply)(port, message)
    }

    fn recv_protocol(&self, port: &Port, message: &ProtocolMessage) -> anyhow::Result<()> {
        let _ = self.events.send(Received::Protocol {
            port: port.name().to_string(),
            message: message.clone(),
        });
        Ok(())
    }

    fn recv_custom(&self, port: &Port, payload: &CustomPayload) -> anyhow::Result<()> {
        let payload = payload
            .downcast_ref::<String>()
            .cloned()
            .or_else(|| payload.downcast_ref::<&str>().map(|text| text.to_string()))
            .unwrap_or_else(|| "<opaque>".to_string());
        let _ = self.events.send(Received::Custom {
            port: port.name().to_string(),
            payload,
        });
        Ok(())
    }
}

impl SnoopingPortHandler for Recorder {
    fn is_interested_in_platform(&self, message: &PlatformMessage) -> bool {
        self.snoop_interest
            .as_deref()
            .map_or(true, |prefix| message.message_type().starts_with(prefix))
    }
}

pub(crate) fn expect_one(received: &Receiver<Received>) -> Received {
    received
        .recv_timeout(RECV_TIMEOUT)
        .expect("expected a message within the timeout")
}

pub(crate) fn expect_n(received: &Receiver<Received>, count: usize) -> Vec<Received> {
    (0..count).map(|_| expect_one(received)).collect()
}

pub(crate) fn expect_nothing(received: &Receiver<Received>) {
    if let Ok(unexpected) = received.recv_timeout(QUIET_PERIOD) {
        panic!("expected no message, got {unexpected:?}");
    }
}

/// Polls `condition` until it holds or [`RECV_TIMEOUT`] elapses.
pub(crate) fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = std::time::Instant::now() + RECV_TIMEOUT;
    while std::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    condition()
}
