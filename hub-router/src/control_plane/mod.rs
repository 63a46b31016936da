//! Control-plane layer.
//!
//! Owns the port registry and its service-id and protocol-id indices. Registration
//! is all-or-nothing: a port whose address is already owned is rejected before any
//! index changes.
//!
//! ```
//! use hub_router::{platform_handler, HubAddr, Reply, Router, RouterError};
//!
//! let router = Router::default();
//! let handler = || platform_handler(|_port, _message| Ok(Reply::Handled));
//!
//! router
//!     .connect_addr("zigbee", &HubAddr::bridge("zigbee", "ZIGB"), handler())
//!     .unwrap();
//! assert!(matches!(
//!     router.connect_addr("zigbee-2", &HubAddr::protocol("ZIGB"), handler()),
//!     Err(RouterError::AddressInUse(_))
//! ));
//! assert_eq!(router.port_count(), 1);
//! router.shutdown();
//! ```

pub(crate) mod registry;
