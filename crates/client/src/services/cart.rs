//! Cart aggregator service.
//!
//! Holds the working set of line items and exposes derived totals. The cart
//! survives process restarts: every mutating operation writes the full
//! serialized cart back to the blob store before returning. No network
//! calls - the blob store is the only side effect.

use tracing::instrument;

use green_basket_core::{OrderTotals, ProductId};

use crate::error::OrderingError;
use crate::models::{Cart, Product};
use crate::store::BlobStore;

/// Blob key the serialized cart lives under.
const CART_KEY: &str = "cart";

/// The cart aggregator.
#[derive(Debug, Clone)]
pub struct CartService<S: BlobStore> {
    store: S,
}

impl<S: BlobStore> CartService<S> {
    /// Create a cart service over a blob store.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Load the current cart. A missing or unreadable blob yields an empty
    /// cart (a corrupt blob is logged and discarded, not surfaced).
    ///
    /// # Errors
    ///
    /// Returns [`OrderingError::RemoteUnavailable`] if the blob store cannot
    /// be read.
    pub async fn cart(&self) -> Result<Cart, OrderingError> {
        let Some(blob) = self.store.read_blob(CART_KEY).await? else {
            return Ok(Cart::new());
        };
        match serde_json::from_str(&blob) {
            Ok(cart) => Ok(cart),
            Err(err) => {
                tracing::warn!(error = %err, "stored cart is unreadable, starting empty");
                Ok(Cart::new())
            }
        }
    }

    /// Add `quantity` of `product` to the cart, merging with an existing
    /// line for the same product. A zero quantity is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`OrderingError::RemoteUnavailable`] if the cart cannot be
    /// loaded or persisted.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn add_or_increment(
        &self,
        product: &Product,
        quantity: u32,
    ) -> Result<Cart, OrderingError> {
        let mut cart = self.cart().await?;
        cart.add_or_increment(product, quantity);
        self.persist(&cart).await?;
        Ok(cart)
    }

    /// Decrease a line's quantity by one, floored at 1.
    ///
    /// # Errors
    ///
    /// Returns [`OrderingError::RemoteUnavailable`] if the cart cannot be
    /// loaded or persisted.
    #[instrument(skip(self))]
    pub async fn decrement(&self, product_id: ProductId) -> Result<Cart, OrderingError> {
        let mut cart = self.cart().await?;
        cart.decrement(product_id);
        self.persist(&cart).await?;
        Ok(cart)
    }

    /// Delete a line unconditionally.
    ///
    /// # Errors
    ///
    /// Returns [`OrderingError::RemoteUnavailable`] if the cart cannot be
    /// loaded or persisted.
    #[instrument(skip(self))]
    pub async fn remove(&self, product_id: ProductId) -> Result<Cart, OrderingError> {
        let mut cart = self.cart().await?;
        cart.remove(product_id);
        self.persist(&cart).await?;
        Ok(cart)
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns [`OrderingError::RemoteUnavailable`] if the blob cannot be
    /// deleted.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<(), OrderingError> {
        self.store.delete_blob(CART_KEY).await?;
        Ok(())
    }

    /// Derived subtotal/tax/fee/total for the current cart.
    ///
    /// # Errors
    ///
    /// Returns [`OrderingError::RemoteUnavailable`] if the cart cannot be
    /// loaded.
    pub async fn totals(&self) -> Result<OrderTotals, OrderingError> {
        Ok(self.cart().await?.totals())
    }

    async fn persist(&self, cart: &Cart) -> Result<(), OrderingError> {
        let blob = serde_json::to_string(cart)
            .map_err(|err| OrderingError::RemoteUnavailable(format!("cart serialize: {err}")))?;
        self.store.write_blob(CART_KEY, &blob).await?;
        Ok(())
    }
}
