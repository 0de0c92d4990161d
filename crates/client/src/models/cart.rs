//! The device-local cart.
//!
//! A [`Cart`] is a pure value: mutation methods rewrite the line list and
//! nothing here touches storage. [`crate::services::CartService`] wraps it
//! with blob-store persistence.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use green_basket_core::{OrderTotals, ProductId};

use super::Product;

/// One product selection in the cart.
///
/// Lines are keyed by `product_id` (unique per cart) and carry the price the
/// product had when it was added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Catalog product this line refers to.
    pub product_id: ProductId,
    /// Product name at add-time.
    pub name: String,
    /// Unit price at add-time.
    pub unit_price: Decimal,
    /// Selected quantity, always >= 1.
    pub quantity: u32,
    /// Unit the price applies to.
    pub unit_label: String,
}

impl CartLine {
    /// `unit_price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// The unsubmitted working set of line items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// The lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Whether the cart holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Add `quantity` of `product`, merging into an existing line for the
    /// same product if one exists. A zero quantity is a no-op.
    pub fn add_or_increment(&mut self, product: &Product, quantity: u32) {
        if quantity == 0 {
            return;
        }
        if let Some(line) = self.line_mut(product.id) {
            line.quantity += quantity;
            return;
        }
        self.lines.push(CartLine {
            product_id: product.id,
            name: product.name.clone(),
            unit_price: product.price,
            quantity,
            unit_label: product.unit_label.clone(),
        });
    }

    /// Decrease the line's quantity by one, floored at 1. Decrement never
    /// removes a line; use [`Cart::remove`] for that.
    pub fn decrement(&mut self, product_id: ProductId) {
        if let Some(line) = self.line_mut(product_id) {
            line.quantity = line.quantity.saturating_sub(1).max(1);
        }
    }

    /// Delete the line unconditionally. Unknown products are ignored.
    pub fn remove(&mut self, product_id: ProductId) {
        self.lines.retain(|line| line.product_id != product_id);
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Derive subtotal, tax, fee, and total from the current lines.
    ///
    /// Pure function; recomputed on demand, never stored on the cart.
    #[must_use]
    pub fn totals(&self) -> OrderTotals {
        let subtotal = self.lines.iter().map(CartLine::line_total).sum();
        OrderTotals::from_subtotal(subtotal)
    }

    fn line_mut(&mut self, product_id: ProductId) -> Option<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|line| line.product_id == product_id)
    }
}
