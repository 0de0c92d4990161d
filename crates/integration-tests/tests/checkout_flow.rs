//! End-to-end checkout: build a cart, submit it, and find the order again.

use rust_decimal::Decimal;

use green_basket_client::models::Checkout;
use green_basket_client::OrderingError;
use green_basket_core::{LocationId, OrderFilter, OrderStatus, ProductId};
use green_basket_integration_tests::{pickup_time, seed_products, TestContext};

fn checkout() -> Checkout {
    Checkout {
        location: Some(LocationId::new(7)),
        pickup_time: pickup_time(),
    }
}

#[tokio::test]
async fn cart_to_order_happy_path() {
    let ctx = TestContext::new();
    let products = seed_products();

    // 2 lb apples + 1 gallon milk
    ctx.cart.add_or_increment(&products[0], 2).await.expect("add apples");
    ctx.cart.add_or_increment(&products[1], 1).await.expect("add milk");

    let order = ctx
        .orders
        .submit_order(&ctx.cart, &checkout())
        .await
        .expect("submit");

    // Subtotal 2 * 2.99 + 4.50 = 10.48; tax 8% = 0.84; fee 2.00
    assert_eq!(order.totals.subtotal, Decimal::new(1048, 2));
    assert_eq!(order.totals.tax, Decimal::new(84, 2));
    assert_eq!(order.totals.service_fee, Decimal::new(200, 2));
    assert_eq!(order.totals.total, Decimal::new(1332, 2));

    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.user_id, ctx.user_id);
    assert_eq!(order.location_id, LocationId::new(7));
    assert_eq!(order.pickup_time, pickup_time());
    assert!(order.order_number.starts_with("GB-"));
    assert_eq!(order.lines.len(), 2);

    // Line prices were captured from the cart at submit time
    let apples = order
        .lines
        .iter()
        .find(|line| line.product_id == ProductId::new(1))
        .expect("apples line");
    assert_eq!(apples.quantity, 2);
    assert_eq!(apples.unit_price, Decimal::new(299, 2));

    // The cart is empty after a successful submit
    assert!(ctx.cart.cart().await.expect("load").is_empty());
}

#[tokio::test]
async fn submitted_order_is_found_by_barcode_and_in_active_history() {
    let ctx = TestContext::new();
    ctx.cart
        .add_or_increment(&seed_products()[2], 1)
        .await
        .expect("add bread");

    let order = ctx
        .orders
        .submit_order(&ctx.cart, &checkout())
        .await
        .expect("submit");

    let scanned = ctx
        .orders
        .order_by_barcode(order.barcode.as_str())
        .await
        .expect("scan");
    assert_eq!(scanned.id, order.id);
    assert_eq!(scanned.order_number, order.order_number);

    let active = ctx
        .orders
        .list_orders(ctx.user_id, OrderFilter::Active)
        .await
        .expect("list");
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, order.id);

    let past = ctx
        .orders
        .list_orders(ctx.user_id, OrderFilter::Past)
        .await
        .expect("list");
    assert!(past.is_empty());
}

#[tokio::test]
async fn merged_lines_submit_as_one_line() {
    let ctx = TestContext::new();
    let apples = &seed_products()[0];
    ctx.cart.add_or_increment(apples, 1).await.expect("add");
    ctx.cart.add_or_increment(apples, 2).await.expect("add again");

    let order = ctx
        .orders
        .submit_order(&ctx.cart, &checkout())
        .await
        .expect("submit");

    assert_eq!(order.lines.len(), 1);
    assert_eq!(order.lines[0].quantity, 3);
}

#[tokio::test]
async fn each_order_gets_a_distinct_barcode_and_number() {
    let ctx = TestContext::new();
    let milk = &seed_products()[1];

    ctx.cart.add_or_increment(milk, 1).await.expect("add");
    let first = ctx
        .orders
        .submit_order(&ctx.cart, &checkout())
        .await
        .expect("first submit");

    ctx.cart.add_or_increment(milk, 1).await.expect("add");
    let second = ctx
        .orders
        .submit_order(&ctx.cart, &checkout())
        .await
        .expect("second submit");

    assert_ne!(first.barcode, second.barcode);
    assert_ne!(first.order_number, second.order_number);
}

#[tokio::test]
async fn cached_catalog_serves_the_seeded_products() {
    let ctx = TestContext::new();
    let milk = ctx
        .catalog
        .product(ProductId::new(2))
        .await
        .expect("lookup")
        .expect("seeded");
    assert_eq!(milk.name, "Whole Milk");
    assert_eq!(milk.price, Decimal::new(450, 2));

    assert!(ctx
        .catalog
        .product(ProductId::new(99))
        .await
        .expect("lookup")
        .is_none());
}

#[tokio::test]
async fn signed_out_user_cannot_submit() {
    let ctx = TestContext::new();
    ctx.cart
        .add_or_increment(&seed_products()[0], 1)
        .await
        .expect("add");
    ctx.store.set_user(None);

    let err = ctx
        .orders
        .submit_order(&ctx.cart, &checkout())
        .await
        .expect_err("signed out");
    assert!(matches!(err, OrderingError::Auth));
    assert_eq!(
        err.user_message(),
        "You must be logged in to place an order."
    );

    // The cart survives the rejection
    assert!(!ctx.cart.cart().await.expect("load").is_empty());
}
