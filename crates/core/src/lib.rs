//! Green Basket Core - Shared types library.
//!
//! This crate provides common types used across all Green Basket components:
//! - `client` - The ordering library consumed by the mobile UI shell
//! - `integration-tests` - End-to-end flow tests
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access, no async. This keeps it lightweight and allows it to be
//! used anywhere, including inside the UI layer.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, the order status state machine, order totals
//!   math, and the fulfillment barcode token

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
