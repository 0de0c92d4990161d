//! Capability interface to the remote data service.
//!
//! The hosted backend (auth, blob storage, and the relational tables) is an
//! opaque collaborator. Everything this library needs from it is expressed as
//! four small traits, so any session store or database can stand behind them:
//!
//! - [`AuthProvider`] - authenticated-user lookup
//! - [`BlobStore`] - key-value blobs for the device-local cart
//! - [`Catalog`] - read-only product pricing
//! - [`OrderStore`] - the `orders` / `order_items` tables
//!
//! Implementations provided here: [`MemoryStore`] (all four traits, used by
//! tests) and [`PgStore`] (`Catalog` + `OrderStore` over Postgres; auth and
//! the device blob store are platform concerns the UI shell supplies).
//!
//! Every method fails closed: a timeout is a failure, never an assumed
//! success.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use thiserror::Error;

use green_basket_core::{OrderFilter, OrderId, OrderStatus, ProductId, UserId};

use crate::models::{NewOrder, NewOrderLine, Order, Product};

/// Errors surfaced by store implementations.
///
/// Services convert these at the component boundary; they never reach the
/// presentation layer as-is.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The remote service failed or could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A stored record does not parse into its domain type.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation, including a failed compare-and-swap.
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Authenticated-user lookup.
pub trait AuthProvider: Send + Sync {
    /// The currently signed-in user, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the auth service cannot be
    /// reached. An anonymous session is `Ok(None)`, not an error.
    async fn current_user(&self) -> Result<Option<UserId>, StoreError>;
}

/// Key-value blob storage for device-local state.
pub trait BlobStore: Send + Sync {
    /// Read the blob stored under `key`, if present.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the store cannot be read.
    async fn read_blob(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write `value` under `key`, replacing any existing blob.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the write fails.
    async fn write_blob(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete the blob under `key`. Deleting a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the delete fails.
    async fn delete_blob(&self, key: &str) -> Result<(), StoreError>;
}

/// Read-only product catalog, used to price new cart lines at add-time.
pub trait Catalog: Send + Sync {
    /// Look up a product by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] on a failed read.
    async fn product(&self, id: ProductId) -> Result<Option<Product>, StoreError>;
}

/// The `orders` and `order_items` tables.
pub trait OrderStore: Send + Sync {
    /// Insert an order header with status [`OrderStatus::Pending`] and no
    /// lines yet. The store assigns the id, order number, and creation time,
    /// and enforces barcode uniqueness.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] on a duplicate barcode and
    /// [`StoreError::Unavailable`] on a failed write.
    async fn insert_order(&self, order: NewOrder) -> Result<Order, StoreError>;

    /// Insert one row per line for an existing order. All-or-nothing: a
    /// partial batch must not persist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] on a failed write.
    async fn insert_order_lines(
        &self,
        order_id: OrderId,
        lines: &[NewOrderLine],
    ) -> Result<(), StoreError>;

    /// Delete an order header and any of its lines. This is the compensating
    /// write for a failed line-item insert.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] on a failed delete.
    async fn delete_order(&self, order_id: OrderId) -> Result<(), StoreError>;

    /// Fetch a single order with its lines.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] on a failed read.
    async fn order(&self, id: OrderId) -> Result<Option<Order>, StoreError>;

    /// Fetch a single order by its pickup barcode.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] on a failed read.
    async fn order_by_barcode(&self, barcode: &str) -> Result<Option<Order>, StoreError>;

    /// Compare-and-swap status update: persists `next` only if the stored
    /// status still equals `expected`, and returns the updated order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] if the stored status no longer
    /// matches `expected`, [`StoreError::NotFound`] if the order does not
    /// exist, and [`StoreError::Unavailable`] on a failed write.
    async fn update_status(
        &self,
        id: OrderId,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> Result<Order, StoreError>;

    /// List a user's orders matching `filter`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] on a failed read.
    async fn list_orders(
        &self,
        user_id: UserId,
        filter: OrderFilter,
    ) -> Result<Vec<Order>, StoreError>;
}
