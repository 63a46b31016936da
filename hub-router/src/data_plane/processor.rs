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

//! Single-consumer message loop shared by every port and the dispatcher.

use crate::config::QueueDepthPolicy;
use crate::error::RouterError;
use crate::message::{Delivery, PortId};
use crate::observability::{events, fields};
use crate::runtime::worker_pool::{interrupted, InterruptSignal};
use parking_lot::Mutex;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, trace, warn, Level};

const COMPONENT: &str = "message_processor";

/// The logical consumer behind a [`MessageProcessor`].
pub(crate) trait Consumer {
    /// Handles one delivery, including poison messages aimed at other consumers.
    fn handle(&self, delivery: Delivery) -> anyhow::Result<()>;

    /// Called with the poison message that ends the loop.
    fn on_poison(&self, _delivery: &Delivery) {}
}

/// Turns a multi-producer queue into a serialized call sequence on one consumer.
pub(crate) struct MessageProcessor {
    id: PortId,
    name: String,
    policy: QueueDepthPolicy,
    sender: UnboundedSender<Delivery>,
    receiver: Mutex<Option<UnboundedReceiver<Delivery>>>,
    depth: AtomicUsize,
    last_warned_bucket: AtomicUsize,
    depth_warnings: AtomicUsize,
    running: AtomicBool,
}

impl MessageProcessor {
    pub(crate) fn new(id: PortId, name: &str, policy: QueueDepthPolicy) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            id,
            name: name.to_string(),
            policy,
            sender,
            receiver: Mutex::new(Some(receiver)),
            depth: AtomicUsize::new(0),
            last_warned_bucket: AtomicUsize::new(0),
            depth_warnings: AtomicUsize::new(0),
            running: AtomicBool::new(false),
        }
    }

    #[cfg(test)]
    pub(crate) fn id(&self) -> PortId {
        self.id
    }

    pub(crate) fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub(crate) fn queue_depth(&self) -> usize {
        self.depth.load(Ordering::Acquire)
    }

    #[cfg(test)]
    pub(crate) fn depth_warnings(&self) -> usize {
        self.depth_warnings.load(Ordering::Relaxed)
    }

    /// Pushes `delivery` onto the queue. Never blocks; fails only once the queue is closed.
    pub(crate) fn enqueue(&self, delivery: Delivery) -> Result<(), RouterError> {
        let depth = self.depth.fetch_add(1, Ordering::AcqRel) + 1;

        if let Err(err) = self.sender.send(delivery) {
            self.depth.fetch_sub(1, Ordering::AcqRel);
            warn!(
                event = events::QUEUE_ENQUEUE_FAILED,
                component = COMPONENT,
                port = self.name.as_str(),
                msg_kind = err.0.message.kind().as_str(),
                reason = fields::REASON_QUEUE_CLOSED,
                "unable to enqueue message"
            );
            return Err(RouterError::Interrupted(self.name.clone()));
        }

        self.note_depth(depth);
        Ok(())
    }

    /// Reports queue-depth milestones. Returns `true` when a warning was emitted.
    fn note_depth(&self, depth: usize) -> bool {
        let QueueDepthPolicy {
            threshold,
            granularity,
        } = self.policy;

        if depth < threshold {
            trace!(
                event = events::QUEUE_ENQUEUE,
                component = COMPONENT,
                port = self.name.as_str(),
                depth,
                "message enqueued"
            );
            return false;
        }

        if (depth - threshold) % granularity != 0 {
            return false;
        }

        let bucket = (depth - threshold) / granularity + 1;
        if self.last_warned_bucket.fetch_max(bucket, Ordering::AcqRel) >= bucket {
            return false;
        }

        self.depth_warnings.fetch_add(1, Ordering::Relaxed);
        warn!(
            event = events::QUEUE_DEPTH_WARNING,
            component = COMPONENT,
            port = self.name.as_str(),
            depth,
            "message queue depth milestone reached"
        );
        true
    }

    fn note_dequeue(&self) {
        if self.depth.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.last_warned_bucket.store(0, Ordering::Release);
        }
    }

    /// Drives the consume loop until this processor's poison message or an interrupt.
    ///
    /// May be called once per processor.
    pub(crate) async fn run<C: Consumer>(
        &self,
        consumer: &C,
        mut interrupt: InterruptSignal,
    ) -> Result<(), RouterError> {
        let mut receiver = self
            .receiver
            .lock()
            .take()
            .ok_or_else(|| RouterError::ProcessorAlreadyStarted(self.name.clone()))?;

        let worker_context = fields::WorkerContext::with_current_thread(self.name.as_str());
        self.running.store(true, Ordering::Release);
        info!(
            event = events::PROCESSOR_START,
            component = COMPONENT,
            port = worker_context.port.as_str(),
            worker_thread = worker_context.worker_thread.as_str(),
            "message processor started"
        );

        let reason = loop {
            let delivery = tokio::select! {
                biased;
                _ = interrupted(&mut interrupt) => {
                    warn!(
                        event = events::PROCESSOR_INTERRUPTED,
                        component = COMPONENT,
                        port = worker_context.port.as_str(),
                        depth = self.queue_depth(),
                        "message processor interrupted with work pending"
                    );
                    break fields::REASON_INTERRUPTED;
                }
                delivery = receiver.recv() => match delivery {
                    Some(delivery) => delivery,
                    None => break fields::REASON_QUEUE_CLOSED,
                },
            };
            self.note_dequeue();

            if delivery.message.is_poison_for(self.id) {
                consumer.on_poison(&delivery);
                break fields::REASON_POISON;
            }

            self.handle_one(consumer, delivery, &worker_context);
        };

        self.running.store(false, Ordering::Release);
        info!(
            event = events::PROCESSOR_STOP,
            component = COMPONENT,
            port = worker_context.port.as_str(),
            worker_thread = worker_context.worker_thread.as_str(),
            reason,
            "message processor shut down"
        );
        Ok(())
    }

    fn handle_one<C: Consumer>(
        &self,
        consumer: &C,
        delivery: Delivery,
        worker_context: &fields::WorkerContext,
    ) {
        let message_fields = tracing::enabled!(Level::DEBUG)
            .then(|| fields::FormattedMessageFields::from_message(&delivery.message));

        match panic::catch_unwind(AssertUnwindSafe(|| consumer.handle(delivery))) {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                if let Some(fields) = message_fields.as_ref() {
                    debug!(
                        event = events::PROCESSOR_HANDLE_FAILED,
                        component = COMPONENT,
                        port = worker_context.port.as_str(),
                        msg_kind = fields.msg_kind,
                        msg_type = fields.msg_type.as_str(),
                        src = fields.src.as_str(),
                        dst = fields.dst.as_str(),
                        err = %format!("{err:#}"),
                        "dropping message after handler failure"
                    );
                }
            }
            Err(panic) => {
                let err = panic_message(panic.as_ref());
                if let Some(fields) = message_fields.as_ref() {
                    debug!(
                        event = events::PROCESSOR_HANDLE_PANICKED,
                        component = COMPONENT,
                        port = worker_context.port.as_str(),
                        msg_kind = fields.msg_kind,
                        msg_type = fields.msg_type.as_str(),
                        src = fields.src.as_str(),
                        dst = fields.dst.as_str(),
                        err = err.as_str(),
                        "dropping message after handler panic"
                    );
                }
            }
        }
    }
}

pub(crate) fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|msg| msg.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}
