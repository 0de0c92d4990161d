//! Order submission and fulfillment engine.
//!
//! Converts a finalized cart into a persisted order (header + line items +
//! fulfillment barcode) and drives the status state machine afterwards.
//!
//! # The dual write
//!
//! Submission performs two dependent writes: the order header, then the line
//! items referencing the new order id. The line-item step is retried once;
//! if it still fails, a compensating delete removes the orphaned header. Only
//! when the compensation itself fails does the caller see
//! [`OrderingError::PartialOrder`] - at that point the orphaned header id has
//! been logged at error level for operator reconciliation, and the cart is
//! left intact so the customer can retry.

use tracing::instrument;

use green_basket_core::{Barcode, OrderFilter, OrderId, OrderStatus, UserId};

use crate::error::OrderingError;
use crate::models::{Checkout, NewOrder, NewOrderLine, Order, OrderLine};
use crate::services::CartService;
use crate::store::{AuthProvider, BlobStore, OrderStore, StoreError};

/// Total attempts for the line-item insert (one retry).
const LINE_INSERT_ATTEMPTS: u32 = 2;

/// Order submission and status progression.
#[derive(Debug, Clone)]
pub struct OrderService<S: OrderStore, A: AuthProvider> {
    store: S,
    auth: A,
}

impl<S: OrderStore, A: AuthProvider> OrderService<S, A> {
    /// Create an order service over the order store and auth capabilities.
    #[must_use]
    pub const fn new(store: S, auth: A) -> Self {
        Self { store, auth }
    }

    /// Submit the current cart as an order.
    ///
    /// Totals are computed from the cart, a fresh barcode is generated, the
    /// header is inserted with status [`OrderStatus::Pending`], and one line
    /// is inserted per cart line with its price captured from the cart. On
    /// full success the cart is cleared and the complete order returned.
    ///
    /// Validation runs before any remote write: an empty cart, a missing
    /// user, or a missing location produce zero side effects.
    ///
    /// # Errors
    ///
    /// - [`OrderingError::Validation`] - the cart is empty
    /// - [`OrderingError::Auth`] - no authenticated user
    /// - [`OrderingError::LocationRequired`] - no pickup location selected
    /// - [`OrderingError::RemoteUnavailable`] - a write failed and was fully
    ///   rolled back
    /// - [`OrderingError::PartialOrder`] - the header persisted without
    ///   lines and could not be rolled back
    #[instrument(skip(self, cart))]
    pub async fn submit_order<B: BlobStore>(
        &self,
        cart: &CartService<B>,
        checkout: &Checkout,
    ) -> Result<Order, OrderingError> {
        let snapshot = cart.cart().await?;
        if snapshot.is_empty() {
            return Err(OrderingError::Validation("cart is empty".to_owned()));
        }

        let user_id = self
            .auth
            .current_user()
            .await
            .map_err(OrderingError::from)?
            .ok_or(OrderingError::Auth)?;

        let location_id = checkout.location.ok_or(OrderingError::LocationRequired)?;

        let lines: Vec<NewOrderLine> = snapshot
            .lines()
            .iter()
            .map(|line| NewOrderLine {
                product_id: line.product_id,
                quantity: line.quantity,
                unit_price: line.unit_price,
            })
            .collect();

        let header = self
            .store
            .insert_order(NewOrder {
                user_id,
                location_id,
                totals: snapshot.totals(),
                pickup_time: checkout.pickup_time,
                barcode: Barcode::generate(),
            })
            .await
            .map_err(|err| match err {
                // A barcode collision is not a status race; don't surface it
                // as StaleStatus
                StoreError::Conflict(msg) => OrderingError::RemoteUnavailable(msg),
                other => OrderingError::from(other),
            })?;

        self.insert_lines_or_compensate(header.id, &lines).await?;

        let mut order = header;
        order.lines = lines
            .iter()
            .map(|line| OrderLine {
                order_id: order.id,
                product_id: line.product_id,
                quantity: line.quantity,
                unit_price: line.unit_price,
            })
            .collect();

        // The order exists; a failed cart clear must not fail the checkout
        if let Err(err) = cart.clear().await {
            tracing::warn!(order_id = %order.id, error = %err, "cart clear failed after submit");
        }

        tracing::info!(
            order_id = %order.id,
            order_number = %order.order_number,
            total = %order.totals.total,
            "order submitted"
        );
        Ok(order)
    }

    /// Move an order to `next`, enforcing the state machine.
    ///
    /// The update is compare-and-swap on the status observed by the
    /// re-read, so two staff clients racing on the same order cannot both
    /// land conflicting terminal states.
    ///
    /// # Errors
    ///
    /// - [`OrderingError::UnknownOrder`] - no such order
    /// - [`OrderingError::InvalidTransition`] - `next` is not reachable from
    ///   the current status
    /// - [`OrderingError::StaleStatus`] - another client updated the order
    ///   first; re-read before retrying
    #[instrument(skip(self))]
    pub async fn advance_status(
        &self,
        order_id: OrderId,
        next: OrderStatus,
    ) -> Result<Order, OrderingError> {
        let order = self
            .store
            .order(order_id)
            .await
            .map_err(OrderingError::from)?
            .ok_or(OrderingError::UnknownOrder)?;

        if !order.status.can_transition_to(next) {
            return Err(OrderingError::InvalidTransition {
                from: order.status,
                to: next,
            });
        }

        let updated = self.store.update_status(order_id, order.status, next).await?;
        tracing::info!(
            order_id = %updated.id,
            from = %order.status,
            to = %updated.status,
            "order status advanced"
        );
        Ok(updated)
    }

    /// A user's order history, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`OrderingError::RemoteUnavailable`] on a failed read.
    pub async fn list_orders(
        &self,
        user_id: UserId,
        filter: OrderFilter,
    ) -> Result<Vec<Order>, OrderingError> {
        Ok(self.store.list_orders(user_id, filter).await?)
    }

    /// Fetch a single order with its lines.
    ///
    /// # Errors
    ///
    /// Returns [`OrderingError::UnknownOrder`] if no order has this id.
    pub async fn order(&self, order_id: OrderId) -> Result<Order, OrderingError> {
        self.store
            .order(order_id)
            .await
            .map_err(OrderingError::from)?
            .ok_or(OrderingError::UnknownOrder)
    }

    /// Look up an order by its scanned pickup barcode.
    ///
    /// # Errors
    ///
    /// Returns [`OrderingError::UnknownOrder`] if no order carries this
    /// barcode.
    pub async fn order_by_barcode(&self, barcode: &str) -> Result<Order, OrderingError> {
        self.store
            .order_by_barcode(barcode)
            .await
            .map_err(OrderingError::from)?
            .ok_or(OrderingError::UnknownOrder)
    }

    /// Insert the line batch, retrying once; on repeated failure, delete the
    /// orphaned header. See the module docs for the full contract.
    async fn insert_lines_or_compensate(
        &self,
        order_id: OrderId,
        lines: &[NewOrderLine],
    ) -> Result<(), OrderingError> {
        let mut last_err = None;
        for attempt in 1..=LINE_INSERT_ATTEMPTS {
            match self.store.insert_order_lines(order_id, lines).await {
                Ok(()) => return Ok(()),
                Err(err) => {
                    if attempt < LINE_INSERT_ATTEMPTS {
                        tracing::warn!(
                            order_id = %order_id,
                            error = %err,
                            "line item insert failed, retrying"
                        );
                    }
                    last_err = Some(err);
                }
            }
        }
        let err = last_err.map_or_else(
            || OrderingError::RemoteUnavailable("line item insert failed".to_owned()),
            OrderingError::from,
        );

        match self.store.delete_order(order_id).await {
            Ok(()) => {
                tracing::warn!(order_id = %order_id, "order rolled back after line insert failure");
                Err(err)
            }
            Err(delete_err) => {
                tracing::error!(
                    order_id = %order_id,
                    error = %delete_err,
                    "orphaned order header: line items missing and compensating delete failed"
                );
                Err(OrderingError::PartialOrder { order_id })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Product;
    use crate::store::MemoryStore;
    use chrono::{TimeZone, Utc};
    use green_basket_core::{LocationId, ProductId};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn checkout() -> Checkout {
        Checkout {
            location: Some(LocationId::new(1)),
            pickup_time: Utc
                .with_ymd_and_hms(2025, 4, 18, 14, 0, 0)
                .single()
                .expect("valid time"),
        }
    }

    async fn seeded_cart(store: &MemoryStore) -> CartService<MemoryStore> {
        let cart = CartService::new(store.clone());
        cart.add_or_increment(
            &Product {
                id: ProductId::new(1),
                name: "Apples".to_owned(),
                price: Decimal::new(1000, 2),
                unit_label: "lb".to_owned(),
            },
            2,
        )
        .await
        .expect("add");
        cart
    }

    #[tokio::test]
    async fn empty_cart_fails_validation_with_zero_writes() {
        let store = MemoryStore::new();
        store.set_user(Some(UserId::new(Uuid::new_v4())));
        let orders = OrderService::new(store.clone(), store.clone());
        let cart = CartService::new(store.clone());

        let err = orders
            .submit_order(&cart, &checkout())
            .await
            .expect_err("empty cart");
        assert!(matches!(err, OrderingError::Validation(_)));
        assert_eq!(store.order_count(), 0);
    }

    #[tokio::test]
    async fn anonymous_submit_fails_auth_with_zero_writes() {
        let store = MemoryStore::new();
        let orders = OrderService::new(store.clone(), store.clone());
        let cart = seeded_cart(&store).await;

        let err = orders
            .submit_order(&cart, &checkout())
            .await
            .expect_err("not signed in");
        assert!(matches!(err, OrderingError::Auth));
        assert_eq!(store.order_count(), 0);
    }

    #[tokio::test]
    async fn missing_location_fails_with_zero_writes() {
        let store = MemoryStore::new();
        store.set_user(Some(UserId::new(Uuid::new_v4())));
        let orders = OrderService::new(store.clone(), store.clone());
        let cart = seeded_cart(&store).await;

        let mut no_location = checkout();
        no_location.location = None;
        let err = orders
            .submit_order(&cart, &no_location)
            .await
            .expect_err("no location");
        assert!(matches!(err, OrderingError::LocationRequired));
        assert_eq!(store.order_count(), 0);
    }

    #[tokio::test]
    async fn advancing_an_unknown_order_fails() {
        let store = MemoryStore::new();
        let orders = OrderService::new(store.clone(), store);

        let err = orders
            .advance_status(OrderId::new(404), OrderStatus::Processing)
            .await
            .expect_err("unknown order");
        assert!(matches!(err, OrderingError::UnknownOrder));
    }
}
