//! Routing layer.
//!
//! Sub-dispatch inside one port: delegate filters, the first-match delegate chain
//! and conversion of handler results into replies.
//!
//! ```
//! use std::sync::Arc;
//! use hub_router::{platform_handler, DelegateFilter, HubAddr, Reply, Router};
//!
//! let router = Router::default();
//! let zigbee = router
//!     .connect_addr(
//!         "zigbee",
//!         &HubAddr::service("zigbee"),
//!         platform_handler(|_port, _message| Ok(Reply::None)),
//!     )
//!     .unwrap();
//!
//! // Joins and leaves go to the delegate, everything else to the base handler.
//! let membership = zigbee
//!     .delegate(
//!         DelegateFilter::message_types(["zigbee:Join", "zigbee:Leave"]),
//!         platform_handler(|_port, _message| Ok(Reply::Handled)),
//!     )
//!     .unwrap();
//! assert_eq!(membership.port_ref().owner, zigbee.id());
//! router.shutdown();
//! ```

pub(crate) mod delegate_chain;
pub(crate) mod filter;
