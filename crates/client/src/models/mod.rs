//! Domain types.
//!
//! These are validated domain objects separate from whatever row or JSON
//! shapes the store implementations deal in.

pub mod cart;
pub mod order;
pub mod product;

pub use cart::{Cart, CartLine};
pub use order::{Checkout, NewOrder, NewOrderLine, Order, OrderLine};
pub use product::Product;
