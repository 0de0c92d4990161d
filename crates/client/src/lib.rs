//! Green Basket Client - the ordering library behind the mobile UI shell.
//!
//! The UI layer renders screens; everything with actual state-transition
//! logic lives here:
//!
//! - [`services::CartService`] - the device-local cart: line items keyed by
//!   product, derived subtotal/tax/fee/total, persisted as a blob after every
//!   mutation.
//! - [`services::OrderService`] - checkout (cart -> persisted order header +
//!   line items + fulfillment barcode) and the employee-driven status state
//!   machine.
//! - [`services::CatalogService`] - cached product pricing for add-to-cart.
//!
//! The remote data service is an opaque collaborator reached through the
//! capability traits in [`store`]; [`store::MemoryStore`] serves tests and
//! [`store::PgStore`] a real Postgres backend. Auth and the device blob store
//! are platform concerns the UI shell supplies.
//!
//! All failures surface as [`OrderingError`]; raw transport errors never
//! cross the service boundary.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod error;
pub mod models;
pub mod services;
pub mod store;

pub use error::OrderingError;
