//! Canonical structured event names used across `hub-router`.

// Message processor events.
pub const QUEUE_ENQUEUE: &str = "queue_enqueue";
pub const QUEUE_DEPTH_WARNING: &str = "queue_depth_warning";
pub const QUEUE_ENQUEUE_FAILED: &str = "queue_enqueue_failed";
pub const PROCESSOR_START: &str = "processor_start";
pub const PROCESSOR_STOP: &str = "processor_stop";
pub const PROCESSOR_INTERRUPTED: &str = "processor_interrupted";
pub const PROCESSOR_HANDLE_FAILED: &str = "processor_handle_failed";
pub const PROCESSOR_HANDLE_PANICKED: &str = "processor_handle_panicked";
pub const PROCESSOR_IGNORED_POISON: &str = "processor_ignored_poison";

// Delegate chain events.
pub const CHAIN_HANDLER_FAILED: &str = "chain_handler_failed";
pub const CHAIN_UNRECOGNIZED_REPLY: &str = "chain_unrecognized_reply";
pub const CHAIN_REPLY_FAILED: &str = "chain_reply_failed";
pub const CHAIN_CUSTOM_NO_TARGET: &str = "chain_custom_no_target";

// Port events.
pub const PORT_SNOOP_IGNORED: &str = "port_snoop_ignored";
pub const PORT_SEND_DROPPED: &str = "port_send_dropped";
pub const PORT_DELEGATE: &str = "port_delegate";

// Dispatcher events.
pub const DISPATCH_ROUTE: &str = "dispatch_route";
pub const DISPATCH_DROP_UNADDRESSED: &str = "dispatch_drop_unaddressed";
pub const DISPATCH_DROP_UNREGISTERED: &str = "dispatch_drop_unregistered";
pub const DISPATCH_ENQUEUE_FAILED: &str = "dispatch_enqueue_failed";
pub const DISPATCH_FAILED: &str = "dispatch_failed";
pub const DISPATCH_BROADCAST_POISON: &str = "dispatch_broadcast_poison";

// Registry and lifecycle events.
pub const PORT_CONNECT: &str = "port_connect";
pub const PORT_CONNECT_FAILED: &str = "port_connect_failed";
pub const PORT_DISCONNECT: &str = "port_disconnect";
pub const PORT_UNREGISTER: &str = "port_unregister";
pub const ROUTER_START: &str = "router_start";
pub const ROUTER_SHUTDOWN_START: &str = "router_shutdown_start";
pub const ROUTER_SHUTDOWN_WAIT: &str = "router_shutdown_wait";
pub const ROUTER_SHUTDOWN_INTERRUPT: &str = "router_shutdown_interrupt";
pub const ROUTER_SHUTDOWN_OK: &str = "router_shutdown_ok";

// Runtime events.
pub const RUNTIME_THREAD_NAME_FALLBACK: &str = "runtime_thread_name_fallback";
pub const RUNTIME_SPAWN_OK: &str = "runtime_spawn_ok";
pub const RUNTIME_SPAWN_FAILED: &str = "runtime_spawn_failed";
pub const RUNTIME_BUILD_FAILED: &str = "runtime_build_failed";
