//! In-process store implementation.
//!
//! Implements all four capability traits over a mutexed map. Used by unit
//! and integration tests, and as the reference semantics for real backends:
//! compare-and-swap on status, barcode uniqueness, all-or-nothing line
//! batches.
//!
//! The mutex is held only across synchronous map operations, never across an
//! await point.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;

use green_basket_core::{OrderFilter, OrderId, OrderStatus, ProductId, UserId};

use crate::models::{NewOrder, NewOrderLine, Order, OrderLine, Product};

use super::{AuthProvider, BlobStore, Catalog, OrderStore, StoreError};

#[derive(Debug, Default)]
struct Inner {
    user: Option<UserId>,
    blobs: HashMap<String, String>,
    products: HashMap<ProductId, Product>,
    orders: HashMap<OrderId, Order>,
    next_order_id: i64,
    next_order_seq: i64,
    fail_line_inserts: u32,
    fail_deletes: u32,
}

/// In-memory implementation of every capability trait.
///
/// Cheaply cloneable; clones share state. Failure injection
/// ([`MemoryStore::fail_line_inserts`], [`MemoryStore::fail_deletes`])
/// exists to exercise the dual-write recovery paths in tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    /// Create an empty store with no signed-in user.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (or clear) the signed-in user.
    pub fn set_user(&self, user: Option<UserId>) {
        self.lock().user = user;
    }

    /// Seed a catalog product.
    pub fn put_product(&self, product: Product) {
        self.lock().products.insert(product.id, product);
    }

    /// Make the next `count` calls to `insert_order_lines` fail.
    pub fn fail_line_inserts(&self, count: u32) {
        self.lock().fail_line_inserts = count;
    }

    /// Make the next `count` calls to `delete_order` fail.
    pub fn fail_deletes(&self, count: u32) {
        self.lock().fail_deletes = count;
    }

    /// Number of persisted order headers, regardless of owner or status.
    #[must_use]
    pub fn order_count(&self) -> usize {
        self.lock().orders.len()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl AuthProvider for MemoryStore {
    async fn current_user(&self) -> Result<Option<UserId>, StoreError> {
        Ok(self.lock().user)
    }
}

impl BlobStore for MemoryStore {
    async fn read_blob(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.lock().blobs.get(key).cloned())
    }

    async fn write_blob(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.lock().blobs.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn delete_blob(&self, key: &str) -> Result<(), StoreError> {
        self.lock().blobs.remove(key);
        Ok(())
    }
}

impl Catalog for MemoryStore {
    async fn product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.lock().products.get(&id).cloned())
    }
}

impl OrderStore for MemoryStore {
    async fn insert_order(&self, order: NewOrder) -> Result<Order, StoreError> {
        let mut inner = self.lock();

        let duplicate = inner
            .orders
            .values()
            .any(|existing| existing.barcode == order.barcode);
        if duplicate {
            return Err(StoreError::Conflict("barcode already exists".to_owned()));
        }

        inner.next_order_id += 1;
        inner.next_order_seq += 1;
        let id = OrderId::new(inner.next_order_id);
        let order_number = format!("GB-{}", 100_000 + inner.next_order_seq);

        let stored = Order {
            id,
            order_number,
            user_id: order.user_id,
            location_id: order.location_id,
            lines: Vec::new(),
            totals: order.totals,
            pickup_time: order.pickup_time,
            created_at: Utc::now(),
            status: OrderStatus::Pending,
            barcode: order.barcode,
        };
        inner.orders.insert(id, stored.clone());
        Ok(stored)
    }

    async fn insert_order_lines(
        &self,
        order_id: OrderId,
        lines: &[NewOrderLine],
    ) -> Result<(), StoreError> {
        let mut inner = self.lock();

        if inner.fail_line_inserts > 0 {
            inner.fail_line_inserts -= 1;
            return Err(StoreError::Unavailable(
                "injected line insert failure".to_owned(),
            ));
        }

        let order = inner.orders.get_mut(&order_id).ok_or(StoreError::NotFound)?;
        order.lines = lines
            .iter()
            .map(|line| OrderLine {
                order_id,
                product_id: line.product_id,
                quantity: line.quantity,
                unit_price: line.unit_price,
            })
            .collect();
        Ok(())
    }

    async fn delete_order(&self, order_id: OrderId) -> Result<(), StoreError> {
        let mut inner = self.lock();

        if inner.fail_deletes > 0 {
            inner.fail_deletes -= 1;
            return Err(StoreError::Unavailable("injected delete failure".to_owned()));
        }

        inner.orders.remove(&order_id);
        Ok(())
    }

    async fn order(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        Ok(self.lock().orders.get(&id).cloned())
    }

    async fn order_by_barcode(&self, barcode: &str) -> Result<Option<Order>, StoreError> {
        Ok(self
            .lock()
            .orders
            .values()
            .find(|order| order.barcode.as_str() == barcode)
            .cloned())
    }

    async fn update_status(
        &self,
        id: OrderId,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> Result<Order, StoreError> {
        let mut inner = self.lock();
        let order = inner.orders.get_mut(&id).ok_or(StoreError::NotFound)?;

        if order.status != expected {
            return Err(StoreError::Conflict(format!(
                "expected status {expected}, found {}",
                order.status
            )));
        }
        order.status = next;
        Ok(order.clone())
    }

    async fn list_orders(
        &self,
        user_id: UserId,
        filter: OrderFilter,
    ) -> Result<Vec<Order>, StoreError> {
        let mut orders: Vec<Order> = self
            .lock()
            .orders
            .values()
            .filter(|order| order.user_id == user_id && filter.matches(order.status))
            .cloned()
            .collect();
        // created_at can collide within a test run; id breaks the tie
        orders.sort_by_key(|order| std::cmp::Reverse((order.created_at, order.id)));
        Ok(orders)
    }
}
