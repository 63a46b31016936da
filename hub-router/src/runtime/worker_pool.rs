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

//! Growable worker pool: one dedicated thread per port loop plus the dispatcher.

use crate::error::RouterError;
use crate::observability::{events, fields};
use parking_lot::{Condvar, Mutex};
use std::future::Future;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tokio::runtime::Builder;
use tokio::sync::watch;
use tracing::{debug, error};

pub(crate) const DEFAULT_WORKER_THREAD_NAME: &str = "hub-router-wrk";
const WORKER_THREAD_NAME_PREFIX: &str = "hr-";
const WORKER_THREAD_NAME_MAX_LEN: usize = 15;
const COMPONENT: &str = "worker_pool";

/// Raised once the pool asks every worker to abandon its loop.
pub(crate) type InterruptSignal = watch::Receiver<bool>;

/// Resolves when `signal` has been raised or its pool is gone.
pub(crate) async fn interrupted(signal: &mut InterruptSignal) {
    let _ = signal.wait_for(|raised| *raised).await;
}

#[derive(Default)]
struct ActiveWorkers {
    count: Mutex<usize>,
    drained: Condvar,
}

struct ActiveWorkerGuard(Arc<ActiveWorkers>);

impl ActiveWorkerGuard {
    fn register(active: &Arc<ActiveWorkers>) -> Self {
        *active.count.lock() += 1;
        Self(active.clone())
    }
}

impl Drop for ActiveWorkerGuard {
    fn drop(&mut self) {
        let mut count = self.0.count.lock();
        *count -= 1;
        if *count == 0 {
            self.0.drained.notify_all();
        }
    }
}

pub(crate) struct WorkerPool {
    interrupt: watch::Sender<bool>,
    active: Arc<ActiveWorkers>,
}

impl WorkerPool {
    pub(crate) fn new() -> Self {
        let (interrupt, _) = watch::channel(false);
        Self {
            interrupt,
            active: Arc::new(ActiveWorkers::default()),
        }
    }

    /// Spawns `run_loop` on a dedicated thread driving its own current-thread runtime.
    pub(crate) fn spawn<F, Fut>(&self, worker_name: &str, run_loop: F) -> Result<(), RouterError>
    where
        F: FnOnce(InterruptSignal) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + 'static,
    {
        let thread_name = build_worker_thread_name(worker_name);
        let interrupt = self.interrupt.subscribe();
        let guard = ActiveWorkerGuard::register(&self.active);

        let spawn_result = thread::Builder::new()
            .name(thread_name.clone())
            .spawn(move || {
                let _guard = guard;
                match Builder::new_current_thread().enable_all().build() {
                    Ok(runtime) => runtime.block_on(run_loop(interrupt)),
                    Err(err) => error!(
                        event = events::RUNTIME_BUILD_FAILED,
                        component = COMPONENT,
                        worker_thread = fields::current_thread_name_or_default().as_str(),
                        err = %err,
                        "unable to build worker runtime"
                    ),
                }
            });

        match spawn_result {
            Ok(_) => {
                debug!(
                    event = events::RUNTIME_SPAWN_OK,
                    component = COMPONENT,
                    port = worker_name,
                    worker_thread = thread_name.as_str(),
                    "worker spawned"
                );
                Ok(())
            }
            Err(source) => {
                error!(
                    event = events::RUNTIME_SPAWN_FAILED,
                    component = COMPONENT,
                    port = worker_name,
                    worker_thread = thread_name.as_str(),
                    err = %source,
                    "unable to spawn worker thread"
                );
                Err(RouterError::WorkerSpawn {
                    name: worker_name.to_string(),
                    source,
                })
            }
        }
    }

    pub(crate) fn active_workers(&self) -> usize {
        *self.active.count.lock()
    }

    /// Blocks until every worker has exited or `timeout` elapses.
    ///
    /// Returns `true` when the pool drained.
    pub(crate) fn await_termination(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut count = self.active.count.lock();
        while *count > 0 {
            if self
                .active
                .drained
                .wait_until(&mut count, deadline)
                .timed_out()
            {
                return *count == 0;
            }
        }
        true
    }

    /// Asks every worker to abandon its loop at its next suspension point.
    pub(crate) fn interrupt(&self) {
        self.interrupt.send_replace(true);
    }
}

fn build_worker_thread_name(worker_name: &str) -> String {
    let suffix_len = WORKER_THREAD_NAME_MAX_LEN - WORKER_THREAD_NAME_PREFIX.len();
    let suffix: String = worker_name
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || *ch == '-' || *ch == '_')
        .take(suffix_len)
        .collect();

    if suffix.is_empty() {
        debug!(
            event = events::RUNTIME_THREAD_NAME_FALLBACK,
            component = COMPONENT,
            port = worker_name,
            reason = fields::REASON_INVALID_THREAD_NAME,
            "using default worker thread name"
        );
        DEFAULT_WORKER_THREAD_NAME.to_string()
    } else {
        format!("{WORKER_THREAD_NAME_PREFIX}{suffix}")
    }
}

#[cfg(test)]
mod tests {
    use super::{
        build_worker_thread_name, interrupted, WorkerPool, DEFAULT_WORKER_THREAD_NAME,
        WORKER_THREAD_NAME_MAX_LEN, WORKER_THREAD_NAME_PREFIX,
    };
    use std::time::Duration;

    #[test]
    fn build_worker_thread_name_keeps_prefix_and_linux_safe_length() {
        let thread_name = build_worker_thread_name("a-really-long-port-name");

        assert!(thread_name.starts_with(WORKER_THREAD_NAME_PREFIX));
        assert_eq!(thread_name.len(), WORKER_THREAD_NAME_MAX_LEN);
    }

    #[test]
    fn build_worker_thread_name_uses_fallback_for_unusable_names() {
        assert_eq!(build_worker_thread_name("@@ !"), DEFAULT_WORKER_THREAD_NAME);
    }

    #[test]
    fn await_termination_returns_once_workers_exit() {
        let pool = WorkerPool::new();
        pool.spawn("short", |_| async {}).expect("spawn should succeed");

        assert!(pool.await_termination(Duration::from_secs(5)));
        assert_eq!(pool.active_workers(), 0);
    }

    #[test]
    fn interrupt_releases_blocked_workers() {
        let pool = WorkerPool::new();
        pool.spawn("blocked", |mut signal| async move {
            interrupted(&mut signal).await;
        })
        .expect("spawn should succeed");

        assert!(!pool.await_termination(Duration::from_millis(50)));
        pool.interrupt();
        assert!(pool.await_termination(Duration::from_secs(5)));
    }
}
