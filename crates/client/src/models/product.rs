//! Catalog product read model.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use green_basket_core::ProductId;

/// A product as read from the catalog.
///
/// The catalog is read-only from this library's point of view; it exists
/// solely to price new cart lines at add-time. An order line keeps the price
/// it was added at even if the catalog changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Catalog ID.
    pub id: ProductId,
    /// Display name (e.g. "Honeycrisp Apples").
    pub name: String,
    /// Current unit price.
    pub price: Decimal,
    /// Unit the price applies to (e.g. "lb", "each", "bunch").
    pub unit_label: String,
}
