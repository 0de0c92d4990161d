//! Shared type definitions.
//!
//! - [`id`] - Newtype wrappers for type-safe entity IDs
//! - [`status`] - Order status state machine and list filters
//! - [`totals`] - Derived order pricing (subtotal, tax, fee, total)
//! - [`barcode`] - The fulfillment barcode token

pub mod barcode;
pub mod id;
pub mod status;
pub mod totals;

pub use barcode::Barcode;
pub use id::{LocationId, OrderId, ProductId, UserId};
pub use status::{OrderFilter, OrderStatus, ParseStatusError};
pub use totals::OrderTotals;
