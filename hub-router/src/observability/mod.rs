//! Event names and log field helpers shared by every layer.
//!
//! Library code only emits `tracing` events. Installing a subscriber is left to
//! the hosting binary or test.

pub mod events;
pub mod fields;
