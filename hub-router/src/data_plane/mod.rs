//! Data-plane layer.
//!
//! Owns the single-consumer message processor behind every port and the
//! dispatcher that resolves each produced message to its owners and snoopers.
//! Producers never block on routing work; they only enqueue.

pub(crate) mod dispatcher;
pub(crate) mod processor;
