//! Integration tests for Green Basket.
//!
//! The tests exercise the full service stack (cart, catalog, orders) over
//! the in-process [`MemoryStore`], which implements every capability trait
//! with the same contracts the Postgres backend honors: barcode uniqueness,
//! compare-and-swap status updates, all-or-nothing line batches.
//!
//! # Running
//!
//! ```bash
//! cargo test -p green-basket-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `checkout_flow` - cart to submitted order, end to end
//! - `fulfillment_flow` - staff status progression and history filters
//! - `partial_order` - dual-write failure recovery

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use green_basket_client::models::Product;
use green_basket_client::services::{CartService, CatalogService, OrderService};
use green_basket_client::store::MemoryStore;
use green_basket_core::{ProductId, UserId};

/// A signed-in user over a seeded in-memory store, with all three services
/// wired to the same store instance.
pub struct TestContext {
    pub store: MemoryStore,
    pub user_id: UserId,
    pub cart: CartService<MemoryStore>,
    pub catalog: CatalogService<MemoryStore>,
    pub orders: OrderService<MemoryStore, MemoryStore>,
}

impl TestContext {
    /// A context with a signed-in user and the standard product seed.
    #[must_use]
    pub fn new() -> Self {
        let store = MemoryStore::new();
        let user_id = UserId::new(Uuid::new_v4());
        store.set_user(Some(user_id));
        for product in seed_products() {
            store.put_product(product);
        }
        Self {
            user_id,
            cart: CartService::new(store.clone()),
            catalog: CatalogService::new(store.clone()),
            orders: OrderService::new(store.clone(), store.clone()),
            store,
        }
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// The catalog every context starts with.
#[must_use]
pub fn seed_products() -> Vec<Product> {
    vec![
        Product {
            id: ProductId::new(1),
            name: "Honeycrisp Apples".to_owned(),
            price: Decimal::new(299, 2),
            unit_label: "lb".to_owned(),
        },
        Product {
            id: ProductId::new(2),
            name: "Whole Milk".to_owned(),
            price: Decimal::new(450, 2),
            unit_label: "gal".to_owned(),
        },
        Product {
            id: ProductId::new(3),
            name: "Sourdough Loaf".to_owned(),
            price: Decimal::new(599, 2),
            unit_label: "ea".to_owned(),
        },
    ]
}

/// A fixed pickup slot, for deterministic assertions.
#[must_use]
pub fn pickup_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 4, 18, 14, 0, 0)
        .single()
        .expect("valid timestamp")
}
