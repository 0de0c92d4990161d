//! Postgres implementation of the catalog and order capabilities.
//!
//! Auth and the device-local blob store are platform concerns; this module
//! covers the three relational tables only.
//!
//! # Tables
//!
//! ```sql
//! CREATE TABLE products (
//!     id         BIGSERIAL PRIMARY KEY,
//!     name       TEXT NOT NULL,
//!     price      NUMERIC(10, 2) NOT NULL CHECK (price >= 0),
//!     unit_label TEXT NOT NULL
//! );
//!
//! CREATE SEQUENCE order_number_seq START 100001;
//!
//! CREATE TABLE orders (
//!     id           BIGSERIAL PRIMARY KEY,
//!     order_number TEXT NOT NULL UNIQUE
//!                  DEFAULT ('GB-' || nextval('order_number_seq')),
//!     user_id      UUID NOT NULL,
//!     location_id  BIGINT NOT NULL,
//!     subtotal     NUMERIC(10, 2) NOT NULL,
//!     tax          NUMERIC(10, 2) NOT NULL,
//!     service_fee  NUMERIC(10, 2) NOT NULL,
//!     total        NUMERIC(10, 2) NOT NULL,
//!     pickup_time  TIMESTAMPTZ NOT NULL,
//!     created_at   TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     status       TEXT NOT NULL DEFAULT 'Pending',
//!     barcode      TEXT NOT NULL UNIQUE
//! );
//!
//! CREATE TABLE order_items (
//!     id         BIGSERIAL PRIMARY KEY,
//!     order_id   BIGINT NOT NULL REFERENCES orders (id) ON DELETE CASCADE,
//!     product_id BIGINT NOT NULL REFERENCES products (id),
//!     quantity   BIGINT NOT NULL CHECK (quantity >= 1),
//!     price      NUMERIC(10, 2) NOT NULL
//! );
//! ```
//!
//! Queries are runtime-checked and rows are mapped by hand into domain
//! types; a value that does not parse (e.g. an unknown status string) is
//! reported as [`StoreError::DataCorruption`], never silently coerced.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use green_basket_core::{
    Barcode, LocationId, OrderFilter, OrderId, OrderStatus, OrderTotals, ProductId, UserId,
};

use crate::models::{NewOrder, NewOrderLine, Order, OrderLine, Product};

use super::{Catalog, OrderStore, StoreError};

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in
///   `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

const ORDER_COLUMNS: &str = "id, order_number, user_id, location_id, subtotal, tax, \
                             service_fee, total, pickup_time, created_at, status, barcode";

/// Catalog and order store over a Postgres pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap an existing connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn lines_for(&self, order_id: OrderId) -> Result<Vec<OrderLine>, StoreError> {
        let rows = sqlx::query(
            "SELECT order_id, product_id, quantity, price
             FROM order_items
             WHERE order_id = $1
             ORDER BY id",
        )
        .bind(order_id.as_i64())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(line_from_row).collect()
    }

    async fn with_lines(&self, mut order: Order) -> Result<Order, StoreError> {
        order.lines = self.lines_for(order.id).await?;
        Ok(order)
    }
}

impl Catalog for PgStore {
    async fn product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query("SELECT id, name, price, unit_label FROM products WHERE id = $1")
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(product_from_row).transpose()
    }
}

impl OrderStore for PgStore {
    async fn insert_order(&self, order: NewOrder) -> Result<Order, StoreError> {
        let query = format!(
            "INSERT INTO orders
                 (user_id, location_id, subtotal, tax, service_fee, total,
                  pickup_time, status, barcode)
             VALUES ($1, $2, $3, $4, $5, $6, $7, 'Pending', $8)
             RETURNING {ORDER_COLUMNS}"
        );
        let row = sqlx::query(&query)
            .bind(order.user_id.as_uuid())
            .bind(order.location_id.as_i64())
            .bind(order.totals.subtotal)
            .bind(order.totals.tax)
            .bind(order.totals.service_fee)
            .bind(order.totals.total)
            .bind(order.pickup_time)
            .bind(order.barcode.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_unique_violation()
                {
                    return StoreError::Conflict("barcode already exists".to_owned());
                }
                StoreError::from(e)
            })?;

        order_from_row(&row)
    }

    async fn insert_order_lines(
        &self,
        order_id: OrderId,
        lines: &[NewOrderLine],
    ) -> Result<(), StoreError> {
        // One transaction for the whole batch: a partial batch never persists
        let mut tx = self.pool.begin().await?;
        for line in lines {
            sqlx::query(
                "INSERT INTO order_items (order_id, product_id, quantity, price)
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(order_id.as_i64())
            .bind(line.product_id.as_i64())
            .bind(i64::from(line.quantity))
            .bind(line.unit_price)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn delete_order(&self, order_id: OrderId) -> Result<(), StoreError> {
        // order_items rows go with it via ON DELETE CASCADE
        sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(order_id.as_i64())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn order(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        let query = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1");
        let row = sqlx::query(&query)
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(self.with_lines(order_from_row(&row)?).await?)),
            None => Ok(None),
        }
    }

    async fn order_by_barcode(&self, barcode: &str) -> Result<Option<Order>, StoreError> {
        let query = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE barcode = $1");
        let row = sqlx::query(&query)
            .bind(barcode)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(self.with_lines(order_from_row(&row)?).await?)),
            None => Ok(None),
        }
    }

    async fn update_status(
        &self,
        id: OrderId,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> Result<Order, StoreError> {
        let query = format!(
            "UPDATE orders SET status = $3
             WHERE id = $1 AND status = $2
             RETURNING {ORDER_COLUMNS}"
        );
        let row = sqlx::query(&query)
            .bind(id.as_i64())
            .bind(expected.as_str())
            .bind(next.as_str())
            .fetch_optional(&self.pool)
            .await?;

        if let Some(row) = row {
            return self.with_lines(order_from_row(&row)?).await;
        }

        // The guard rejected the write: either the order is gone or another
        // client moved the status between our read and this update.
        let current = sqlx::query("SELECT status FROM orders WHERE id = $1")
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?;
        match current {
            None => Err(StoreError::NotFound),
            Some(row) => {
                let found: String = row.try_get("status")?;
                Err(StoreError::Conflict(format!(
                    "expected status {expected}, found {found}"
                )))
            }
        }
    }

    async fn list_orders(
        &self,
        user_id: UserId,
        filter: OrderFilter,
    ) -> Result<Vec<Order>, StoreError> {
        let statuses: Vec<String> = OrderStatus::ALL
            .into_iter()
            .filter(|status| filter.matches(*status))
            .map(|status| status.as_str().to_owned())
            .collect();

        let query = format!(
            "SELECT {ORDER_COLUMNS} FROM orders
             WHERE user_id = $1 AND status = ANY($2)
             ORDER BY created_at DESC, id DESC"
        );
        let rows = sqlx::query(&query)
            .bind(user_id.as_uuid())
            .bind(statuses)
            .fetch_all(&self.pool)
            .await?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in &rows {
            orders.push(self.with_lines(order_from_row(row)?).await?);
        }
        Ok(orders)
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::NotFound,
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                Self::DataCorruption(err.to_string())
            }
            other => Self::Unavailable(other.to_string()),
        }
    }
}

fn product_from_row(row: &PgRow) -> Result<Product, StoreError> {
    Ok(Product {
        id: ProductId::new(row.try_get::<i64, _>("id")?),
        name: row.try_get("name")?,
        price: row.try_get::<Decimal, _>("price")?,
        unit_label: row.try_get("unit_label")?,
    })
}

fn line_from_row(row: &PgRow) -> Result<OrderLine, StoreError> {
    let quantity: i64 = row.try_get("quantity")?;
    Ok(OrderLine {
        order_id: OrderId::new(row.try_get::<i64, _>("order_id")?),
        product_id: ProductId::new(row.try_get::<i64, _>("product_id")?),
        quantity: u32::try_from(quantity)
            .map_err(|_| StoreError::DataCorruption(format!("invalid quantity: {quantity}")))?,
        unit_price: row.try_get::<Decimal, _>("price")?,
    })
}

fn order_from_row(row: &PgRow) -> Result<Order, StoreError> {
    let status_raw: String = row.try_get("status")?;
    let status = status_raw
        .parse::<OrderStatus>()
        .map_err(|e| StoreError::DataCorruption(e.to_string()))?;

    Ok(Order {
        id: OrderId::new(row.try_get::<i64, _>("id")?),
        order_number: row.try_get("order_number")?,
        user_id: UserId::new(row.try_get::<Uuid, _>("user_id")?),
        location_id: LocationId::new(row.try_get::<i64, _>("location_id")?),
        lines: Vec::new(),
        totals: OrderTotals {
            subtotal: row.try_get::<Decimal, _>("subtotal")?,
            tax: row.try_get::<Decimal, _>("tax")?,
            service_fee: row.try_get::<Decimal, _>("service_fee")?,
            total: row.try_get::<Decimal, _>("total")?,
        },
        pickup_time: row.try_get::<DateTime<Utc>, _>("pickup_time")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        status,
        barcode: Barcode::from(row.try_get::<String, _>("barcode")?),
    })
}
