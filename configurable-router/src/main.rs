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

mod config;

use crate::config::{Config, GatewayConfig};
use anyhow::Context;
use clap::Parser;
use hub_router::{
    HubAddr, PlatformMessage, Port, PortHandler, ProtocolMessage, Reply, Router,
    SnoopingPortHandler,
};
use std::fs;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command()]
struct RouterArgs {
    #[arg(short, long, value_name = "FILE")]
    config: String,
}

/// Logs what a configured service receives. Requests get an empty reply.
struct LoggingService;

impl PortHandler for LoggingService {
    fn recv_platform(&self, port: &Port, message: &PlatformMessage) -> anyhow::Result<Reply> {
        info!(
            port = port.name(),
            msg_type = message.message_type(),
            src = %message.source(),
            request = message.is_request(),
            "service received message"
        );
        Ok(Reply::None)
    }

    fn recv_protocol(&self, port: &Port, message: &ProtocolMessage) -> anyhow::Result<()> {
        info!(
            port = port.name(),
            protocol = message.protocol(),
            bytes = message.payload().len(),
            "service received protocol message"
        );
        Ok(())
    }
}

struct GatewayTap {
    config: GatewayConfig,
}

impl PortHandler for GatewayTap {
    fn recv_platform(&self, port: &Port, message: &PlatformMessage) -> anyhow::Result<Reply> {
        info!(
            port = port.name(),
            msg_type = message.message_type(),
            src = %message.source(),
            dst = %message.destination(),
            "gateway observed message"
        );
        Ok(Reply::Handled)
    }
}

impl SnoopingPortHandler for GatewayTap {
    fn is_interested_in_platform(&self, message: &PlatformMessage) -> bool {
        self.config.is_interested_in(message.message_type())
    }

    fn is_interested_in_protocol(&self, _message: &ProtocolMessage) -> bool {
        false
    }
}

fn load_config(path: &str) -> anyhow::Result<Config> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("unable to read config file {path}"))?;
    json5::from_str(&contents).with_context(|| format!("unable to parse config file {path}"))
}

fn connect_all(router: &Router, config: &Config) -> anyhow::Result<Vec<Port>> {
    let mut ports = Vec::with_capacity(config.services.len() + 1);
    for service in &config.services {
        let port = router
            .connect_addr(&service.name, &service.address()?, Arc::new(LoggingService))
            .with_context(|| format!("unable to connect service {}", service.name))?;
        info!(port = port.name(), "service connected");
        ports.push(port);
    }

    if config.gateway.enabled {
        let tap = Arc::new(GatewayTap {
            config: config.gateway.clone(),
        });
        let port = match &config.gateway.service_id {
            Some(service_id) => router.gateway(
                "gateway",
                tap,
                &HubAddr::service(service_id),
                Arc::new(LoggingService),
            ),
            None => router.snoop("gateway", tap),
        }
        .context("unable to connect gateway")?;
        info!(port = port.name(), "gateway connected");
        ports.push(port);
    }
    Ok(ports)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = tracing_subscriber::fmt::try_init();

    let args = RouterArgs::parse();
    let config = load_config(&args.config)?;
    info!(hub_id = config.router.hub_id.as_str(), "starting hub router");

    let router = Router::new(config.router.clone());
    let ports = connect_all(&router, &config)?;
    router.start().context("unable to start router")?;
    info!(ports = ports.len(), "hub router running; press ctrl-c to stop");

    tokio::signal::ctrl_c()
        .await
        .context("unable to listen for ctrl-c")?;

    let drained = tokio::task::spawn_blocking(move || router.shutdown())
        .await
        .context("shutdown task failed")?;
    if !drained {
        warn!("some port workers did not stop in time");
    }
    info!("hub router stopped");
    Ok(())
}
