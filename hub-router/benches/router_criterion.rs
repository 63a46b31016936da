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

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use hub_router::{
    platform_handler, HubAddr, MessageBody, PlatformMessage, PlatformMessageBuilder, Port,
    PortHandler, ProtocolMessage, Reply, Router, RouterConfig, SnoopingPortHandler,
};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::Duration;

const BATCH: usize = 64;
const SNOOPERS: usize = 4;
const BATCH_TIMEOUT: Duration = Duration::from_secs(10);

struct Counter(Sender<()>);

impl PortHandler for Counter {
    fn recv_platform(&self, _port: &Port, _message: &PlatformMessage) -> anyhow::Result<Reply> {
        let _ = self.0.send(());
        Ok(Reply::Handled)
    }

    fn recv_protocol(&self, _port: &Port, _message: &ProtocolMessage) -> anyhow::Result<()> {
        let _ = self.0.send(());
        Ok(())
    }
}

impl SnoopingPortHandler for Counter {}

fn counting_router(snoopers: usize) -> (Router, Port, Receiver<()>) {
    let router = Router::new(RouterConfig {
        hub_id: "bench-hub".to_string(),
        ..RouterConfig::default()
    });
    let (seen, seen_rx) = mpsc::channel();
    router
        .connect_addr(
            "sink",
            &HubAddr::service("sink"),
            Arc::new(Counter(seen.clone())),
        )
        .expect("sink should connect");
    for index in 0..snoopers {
        router
            .snoop(&format!("tap-{index}"), Arc::new(Counter(seen.clone())))
            .expect("snooper should connect");
    }
    let injector = router.injector("bench").expect("injector should connect");
    router.start().expect("router should start");
    (router, injector, seen_rx)
}

fn message() -> PlatformMessageBuilder {
    PlatformMessage::builder(MessageBody::new("bench:Tick"))
        .from(HubAddr::service("bench"))
        .to(HubAddr::service("sink"))
}

fn run_batch(injector: &Port, seen: &Receiver<()>, expected: usize) {
    for _ in 0..BATCH {
        injector
            .inject_platform(message().build())
            .expect("inject should succeed");
    }
    for _ in 0..expected {
        seen.recv_timeout(BATCH_TIMEOUT)
            .expect("batch should be delivered");
    }
}

fn router_criterion(c: &mut Criterion) {
    let mut dispatch_group = c.benchmark_group("dispatch");
    dispatch_group.throughput(Throughput::Elements(BATCH as u64));

    let (direct_router, direct_injector, direct_seen) = counting_router(0);
    dispatch_group.bench_function("single_service_port", |b| {
        b.iter(|| run_batch(&direct_injector, &direct_seen, BATCH));
    });

    let (snoop_router, snoop_injector, snoop_seen) = counting_router(SNOOPERS);
    dispatch_group.bench_function("service_port_with_snoopers", |b| {
        b.iter(|| run_batch(&snoop_injector, &snoop_seen, BATCH * (SNOOPERS + 1)));
    });
    dispatch_group.finish();

    let (reply_router, client, replies) = {
        let router = Router::new(RouterConfig {
            hub_id: "bench-hub".to_string(),
            ..RouterConfig::default()
        });
        router
            .connect_addr(
                "echo",
                &HubAddr::service("echo"),
                platform_handler(|_port, message| Ok(Reply::Body(message.body().clone()))),
            )
            .expect("echo should connect");
        let (seen, seen_rx) = mpsc::channel();
        let client = router
            .connect_addr("client", &HubAddr::service("client"), Arc::new(Counter(seen)))
            .expect("client should connect");
        router.start().expect("router should start");
        (router, client, seen_rx)
    };

    let mut request_group = c.benchmark_group("request_reply");
    request_group.bench_function("round_trip", |b| {
        b.iter(|| {
            let correlation_id = client
                .send_request(&HubAddr::service("echo"), MessageBody::new("bench:Echo"))
                .expect("request should be sent");
            replies
                .recv_timeout(BATCH_TIMEOUT)
                .expect("reply should arrive");
            black_box(correlation_id);
        });
    });
    request_group.finish();

    direct_router.shutdown();
    snoop_router.shutdown();
    reply_router.shutdown();
}

criterion_group!(benches, router_criterion);
criterion_main!(benches);
