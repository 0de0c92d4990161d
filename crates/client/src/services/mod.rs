//! Service layer exposed to the presentation shell.
//!
//! - [`CartService`] - the cart aggregator over a [`crate::store::BlobStore`]
//! - [`CatalogService`] - cached product pricing lookups
//! - [`OrderService`] - order submission and fulfillment status progression

pub mod cart;
pub mod catalog;
pub mod orders;

pub use cart::CartService;
pub use catalog::CatalogService;
pub use orders::OrderService;
