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

use crate::address::{HubAddr, HubIdentity};
use crate::config::RouterConfig;
use crate::control_plane::registry::PortRegistry;
use crate::data_plane::dispatcher::{broadcast_poison, Dispatcher, DISPATCHER_NAME};
use crate::data_plane::processor::MessageProcessor;
use crate::error::RouterError;
use crate::handler::{PortHandler, SnoopingPortHandler};
use crate::message::{Delivery, Message, PortId};
use crate::observability::{events, fields};
use crate::port::{Addressing, Port, PortSpec};
use crate::runtime::worker_pool::WorkerPool;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tracing::{info, warn};

const COMPONENT: &str = "router";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Lifecycle {
    Created,
    Running,
    ShutDown,
}

/// State shared between the router facade and every port it built.
///
/// Ports hold it weakly so dropping the [`Router`] tears the bus down.
pub(crate) struct RouterShared {
    config: RouterConfig,
    hub: HubIdentity,
    registry: Arc<PortRegistry>,
    dispatcher: RwLock<Option<Arc<MessageProcessor>>>,
    pool: WorkerPool,
    lifecycle: Mutex<Lifecycle>,
}

impl RouterShared {
    /// Hands `message` to the dispatcher. Never blocks on routing work.
    ///
    /// Once the router is shutting down, messages are dropped with a warning.
    pub(crate) fn submit(&self, message: Message) -> Result<(), RouterError> {
        let dispatcher = self.dispatcher.read().clone();
        match dispatcher {
            Some(dispatcher) => dispatcher.enqueue(Delivery::new(None, message, false)),
            None => {
                warn!(
                    event = events::PORT_SEND_DROPPED,
                    component = COMPONENT,
                    msg_kind = message.kind().as_str(),
                    reason = fields::REASON_ROUTER_STOPPED,
                    "router is shut down; dropping message"
                );
                Ok(())
            }
        }
    }
}

/// The in-process hub message router.
///
/// Owns the port registry, the dispatcher worker and the worker pool every port
/// runs on. Ports may be connected before or after [`start`](Router::start);
/// messages sent before `start` wait in the dispatcher queue.
pub struct Router {
    shared: Arc<RouterShared>,
}

impl Router {
    pub fn new(config: RouterConfig) -> Self {
        let dispatcher = MessageProcessor::new(
            PortId::next(),
            DISPATCHER_NAME,
            config.queue_depth_policy(),
        );

        Self {
            shared: Arc::new(RouterShared {
                hub: config.hub_identity(),
                config,
                registry: Arc::new(PortRegistry::new()),
                dispatcher: RwLock::new(Some(Arc::new(dispatcher))),
                pool: WorkerPool::new(),
                lifecycle: Mutex::new(Lifecycle::Created),
            }),
        }
    }

    pub fn hub(&self) -> &HubIdentity {
        &self.shared.hub
    }

    pub fn config(&self) -> &RouterConfig {
        &self.shared.config
    }

    /// Starts the dispatcher. Calling it again while running has no effect.
    pub fn start(&self) -> Result<(), RouterError> {
        let mut lifecycle = self.shared.lifecycle.lock();
        match *lifecycle {
            Lifecycle::Running => return Ok(()),
            Lifecycle::ShutDown => return Err(RouterError::RouterShutDown),
            Lifecycle::Created => {}
        }

        let processor = self
            .shared
            .dispatcher
            .read()
            .clone()
            .ok_or(RouterError::RouterShutDown)?;
        let dispatcher = Dispatcher::new(self.shared.registry.clone());
        self.shared
            .pool
            .spawn(DISPATCHER_NAME, move |interrupt| async move {
                if let Err(err) = processor.run(&dispatcher, interrupt).await {
                    warn!(
                        event = events::DISPATCH_FAILED,
                        component = COMPONENT,
                        err = %err,
                        "dispatcher loop failed to start"
                    );
                }
            })?;

        *lifecycle = Lifecycle::Running;
        info!(
            event = events::ROUTER_START,
            component = COMPONENT,
            hub = self.shared.hub.hub_id(),
            ports = self.shared.registry.len(),
            "router started"
        );
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        *self.shared.lifecycle.lock() == Lifecycle::Running
    }

    /// Number of ports currently registered.
    pub fn port_count(&self) -> usize {
        self.shared.registry.len()
    }

    /// A port that can only push pre-built messages into the router.
    pub fn injector(&self, name: &str) -> Result<Port, RouterError> {
        self.attach(self.endpoint(PortSpec::injector(name)))
    }

    /// A port without an address. It can queue custom messages to itself and be
    /// disconnected, but has nothing to send from.
    pub fn connect(&self, name: &str, handler: Arc<dyn PortHandler>) -> Result<Port, RouterError> {
        self.attach(self.endpoint(PortSpec::full(name, Addressing::Unbound, handler)))
    }

    /// A service port, or a bridge port when `addr` carries a protocol id.
    pub fn connect_addr(
        &self,
        name: &str,
        addr: &HubAddr,
        handler: Arc<dyn PortHandler>,
    ) -> Result<Port, RouterError> {
        let addressing = Addressing::bound(&self.shared.hub, addr)?;
        self.attach(self.endpoint(PortSpec::full(name, addressing, handler)))
    }

    /// A snooping port wrapping an address-bound port.
    ///
    /// Traffic for `addr` goes to `handler`; snooped copies of everything else go
    /// to `snoop`.
    pub fn connect_snooping(
        &self,
        name: &str,
        snoop: Arc<dyn SnoopingPortHandler>,
        addr: &HubAddr,
        handler: Arc<dyn PortHandler>,
    ) -> Result<Port, RouterError> {
        self.snooping(name, snoop, Some((addr, handler)), false)
    }

    /// A listener-only port that sees all traffic and owns no address.
    pub fn snoop(
        &self,
        name: &str,
        snoop: Arc<dyn SnoopingPortHandler>,
    ) -> Result<Port, RouterError> {
        self.snooping(name, snoop, None, false)
    }

    /// Same as [`connect_snooping`](Router::connect_snooping), flagged as a gateway.
    pub fn gateway(
        &self,
        name: &str,
        snoop: Arc<dyn SnoopingPortHandler>,
        addr: &HubAddr,
        handler: Arc<dyn PortHandler>,
    ) -> Result<Port, RouterError> {
        self.snooping(name, snoop, Some((addr, handler)), true)
    }

    /// Stops `port` once it has drained what was queued before this call.
    ///
    /// The port is unregistered when the dispatcher routes the request.
    pub fn disconnect(&self, port: &Port) -> Result<(), RouterError> {
        if port.endpoint_processor().is_none() {
            return Err(RouterError::Unsupported {
                port: port.name().to_string(),
                operation: "disconnect",
            });
        }

        info!(
            event = events::PORT_DISCONNECT,
            component = COMPONENT,
            port = port.name(),
            "disconnecting port"
        );
        self.shared.submit(Message::Poison {
            target: Some(port.id()),
        })
    }

    /// Broadcasts poison to every port, waits for the workers to drain and finally
    /// interrupts whatever is left.
    ///
    /// Returns `true` if every worker exited. Must not be called from a port handler.
    pub fn shutdown(&self) -> bool {
        let previous = {
            let mut lifecycle = self.shared.lifecycle.lock();
            std::mem::replace(&mut *lifecycle, Lifecycle::ShutDown)
        };
        if previous == Lifecycle::ShutDown {
            return self.shared.pool.active_workers() == 0;
        }

        let registry = &self.shared.registry;
        info!(
            event = events::ROUTER_SHUTDOWN_START,
            component = COMPONENT,
            ports = registry.len(),
            "router shutting down"
        );

        let dispatcher = self.shared.dispatcher.write().take();
        match dispatcher {
            Some(dispatcher) if previous == Lifecycle::Running => {
                if dispatcher.enqueue(Delivery::poison(None)).is_err() {
                    broadcast_poison(registry);
                }
            }
            _ => broadcast_poison(registry),
        }

        let pool = &self.shared.pool;
        let timeout = self.shared.config.shutdown_drain_timeout();
        let attempts = self.shared.config.shutdown_drain_attempts.max(1);
        let mut drained = false;
        for attempt in 1..=attempts {
            if pool.await_termination(timeout) {
                drained = true;
                break;
            }
            warn!(
                event = events::ROUTER_SHUTDOWN_WAIT,
                component = COMPONENT,
                attempt,
                active_workers = pool.active_workers(),
                "workers still draining"
            );
        }

        if !drained {
            warn!(
                event = events::ROUTER_SHUTDOWN_INTERRUPT,
                component = COMPONENT,
                active_workers = pool.active_workers(),
                "interrupting remaining workers"
            );
            pool.interrupt();
            drained = pool.await_termination(timeout);
        }

        let removed = registry.clear();
        info!(
            event = events::ROUTER_SHUTDOWN_OK,
            component = COMPONENT,
            ports = removed,
            drained,
            "router shut down"
        );
        drained
    }

    fn endpoint(&self, spec: PortSpec) -> Port {
        Port::endpoint(
            spec,
            Arc::downgrade(&self.shared),
            self.shared.config.queue_depth_policy(),
        )
    }

    fn snooping(
        &self,
        name: &str,
        snoop: Arc<dyn SnoopingPortHandler>,
        inner: Option<(&HubAddr, Arc<dyn PortHandler>)>,
        gateway: bool,
    ) -> Result<Port, RouterError> {
        let inner = inner
            .map(|(addr, handler)| {
                Addressing::bound(&self.shared.hub, addr)
                    .map(|addressing| PortSpec::full(name, addressing, handler))
            })
            .transpose()?;

        self.attach(Port::snooping(
            name,
            snoop,
            inner,
            gateway,
            Arc::downgrade(&self.shared),
            self.shared.config.queue_depth_policy(),
        ))
    }

    /// Registers `port` and starts its worker, undoing the registration if the
    /// worker cannot be spawned.
    fn attach(&self, port: Port) -> Result<Port, RouterError> {
        let lifecycle = self.shared.lifecycle.lock();
        if *lifecycle == Lifecycle::ShutDown {
            return Err(RouterError::RouterShutDown);
        }

        if let Err(err) = self.shared.registry.register(&port) {
            warn!(
                event = events::PORT_CONNECT_FAILED,
                component = COMPONENT,
                port = port.name(),
                err = %err,
                "unable to register port"
            );
            return Err(err);
        }

        let worker = port.clone();
        let spawned = self.shared.pool.spawn(port.name(), move |interrupt| async move {
            let Some(processor) = worker.endpoint_processor().cloned() else {
                return;
            };
            if let Err(err) = processor.run(&worker, interrupt).await {
                warn!(
                    event = events::PORT_CONNECT_FAILED,
                    component = COMPONENT,
                    port = worker.name(),
                    err = %err,
                    "port loop failed to start"
                );
            }
        });
        if let Err(err) = spawned {
            self.shared.registry.unregister(port.id());
            return Err(err);
        }
        drop(lifecycle);

        info!(
            event = events::PORT_CONNECT,
            component = COMPONENT,
            port = port.name(),
            service_id = port.service_id().unwrap_or(fields::NONE),
            protocol_id = port.protocol_id().unwrap_or(fields::NONE),
            listen_all = port.is_listen_all(),
            gateway = port.is_gateway(),
            "port connected"
        );
        Ok(port)
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new(RouterConfig::default())
    }
}

impl Drop for Router {
    fn drop(&mut self) {
        if *self.shared.lifecycle.lock() != Lifecycle::ShutDown {
            self.shutdown();
        }
    }
}
