//! Order domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use green_basket_core::{
    Barcode, LocationId, OrderId, OrderStatus, OrderTotals, ProductId, UserId,
};

/// A persisted order: header plus line items.
///
/// Totals are computed once at submission and immutable thereafter; `status`
/// is the only field that changes post-creation, driven by fulfillment staff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Server-assigned row id.
    pub id: OrderId,
    /// Human-readable order number, server-assigned and unique.
    pub order_number: String,
    /// Customer who placed the order.
    pub user_id: UserId,
    /// Store location fulfilling the order.
    pub location_id: LocationId,
    /// Line items, in cart order. Always non-empty for a well-formed order.
    pub lines: Vec<OrderLine>,
    /// Frozen pricing.
    pub totals: OrderTotals,
    /// Start of the customer's pickup window.
    pub pickup_time: DateTime<Utc>,
    /// When the order was submitted.
    pub created_at: DateTime<Utc>,
    /// Current lifecycle status.
    pub status: OrderStatus,
    /// Pickup token, generated once at submission.
    pub barcode: Barcode,
}

/// One product row belonging to exactly one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    /// Owning order (back-reference, not ownership).
    pub order_id: OrderId,
    /// Catalog product.
    pub product_id: ProductId,
    /// Ordered quantity.
    pub quantity: u32,
    /// Unit price captured at order time; independent of later catalog
    /// price changes.
    pub unit_price: Decimal,
}

/// Header fields for an order about to be inserted.
///
/// The store assigns `id`, `order_number`, and `created_at`, and sets the
/// initial status to [`OrderStatus::Pending`].
#[derive(Debug, Clone)]
pub struct NewOrder {
    /// Customer placing the order.
    pub user_id: UserId,
    /// Selected pickup location.
    pub location_id: LocationId,
    /// Frozen pricing computed from the cart.
    pub totals: OrderTotals,
    /// Start of the pickup window.
    pub pickup_time: DateTime<Utc>,
    /// Freshly generated pickup token.
    pub barcode: Barcode,
}

/// A line item about to be inserted for a just-created order.
#[derive(Debug, Clone)]
pub struct NewOrderLine {
    /// Catalog product.
    pub product_id: ProductId,
    /// Ordered quantity.
    pub quantity: u32,
    /// Unit price captured from the cart, not the live catalog.
    pub unit_price: Decimal,
}

/// Checkout parameters gathered by the UI before submission.
#[derive(Debug, Clone)]
pub struct Checkout {
    /// Pickup location, if the user has selected one.
    pub location: Option<LocationId>,
    /// Requested pickup window start.
    pub pickup_time: DateTime<Utc>,
}
