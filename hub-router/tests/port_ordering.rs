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

mod support;

use hub_router::{platform_handler, HubAddr, MessageBody, PlatformMessage, Reply};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;
use support::{expect_n, make_router, Recorder};

#[test]
fn messages_from_one_producer_arrive_in_send_order() {
    let router = make_router("fifo-hub");
    let (recorder, received) = Recorder::new();
    router
        .connect_addr("sink", &HubAddr::service("sink"), recorder)
        .expect("sink should connect");
    let source = router
        .connect_addr(
            "source",
            &HubAddr::service("source"),
            platform_handler(|_port, _message| Ok(Reply::Handled)),
        )
        .expect("source should connect");

    for seq in 0..50 {
        source
            .send(
                &HubAddr::service("sink"),
                MessageBody::new("test:Seq").with_attribute("seq", seq),
            )
            .expect("send should succeed");
    }

    let seqs: Vec<i64> = expect_n(&received, 50)
        .iter()
        .map(|event| {
            event
                .platform()
                .body()
                .attribute("seq")
                .and_then(|seq| seq.as_i64())
                .expect("seq attribute")
        })
        .collect();
    assert_eq!(seqs, (0..50).collect::<Vec<i64>>());
    assert!(router.shutdown());
}

#[test]
fn one_port_never_runs_two_handlers_at_once() {
    const PRODUCERS: usize = 4;
    const PER_PRODUCER: usize = 25;

    let router = make_router("single-consumer-hub");
    let in_flight = Arc::new(AtomicUsize::new(0));
    let max_in_flight = Arc::new(AtomicUsize::new(0));
    let (done, finished) = mpsc::channel();

    let handler = {
        let in_flight = in_flight.clone();
        let max_in_flight = max_in_flight.clone();
        platform_handler(move |_port, _message| {
            let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            max_in_flight.fetch_max(now, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(1));
            in_flight.fetch_sub(1, Ordering::SeqCst);
            let _ = done.send(());
            Ok(Reply::Handled)
        })
    };
    router
        .connect_addr("counter", &HubAddr::service("counter"), handler)
        .expect("counter should connect");

    let producers: Vec<_> = (0..PRODUCERS)
        .map(|index| {
            let injector = router
                .injector(&format!("producer-{index}"))
                .expect("injector should connect");
            thread::spawn(move || {
                for _ in 0..PER_PRODUCER {
                    injector
                        .inject_platform(
                            PlatformMessage::builder(MessageBody::new("test:Count"))
                                .from(HubAddr::service(format!("producer-{index}")))
                                .to(HubAddr::service("counter"))
                                .build(),
                        )
                        .expect("inject should succeed");
                }
            })
        })
        .collect();
    for producer in producers {
        producer.join().expect("producer thread should finish");
    }

    for _ in 0..PRODUCERS * PER_PRODUCER {
        finished
            .recv_timeout(support::RECV_TIMEOUT)
            .expect("every message should be handled");
    }
    assert_eq!(max_in_flight.load(Ordering::SeqCst), 1);
    assert!(router.shutdown());
}
