//! Dual-write recovery: the line-item insert retry, the compensating header
//! delete, and the orphaned-header escape hatch when both fail.

use green_basket_client::models::Checkout;
use green_basket_client::OrderingError;
use green_basket_core::{LocationId, OrderFilter};
use green_basket_integration_tests::{pickup_time, seed_products, TestContext};

fn checkout() -> Checkout {
    Checkout {
        location: Some(LocationId::new(1)),
        pickup_time: pickup_time(),
    }
}

async fn fill_cart(ctx: &TestContext) {
    ctx.cart
        .add_or_increment(&seed_products()[0], 2)
        .await
        .expect("add");
}

#[tokio::test]
async fn single_line_insert_failure_is_retried_transparently() {
    let ctx = TestContext::new();
    fill_cart(&ctx).await;
    ctx.store.fail_line_inserts(1);

    let order = ctx
        .orders
        .submit_order(&ctx.cart, &checkout())
        .await
        .expect("retry succeeds");
    assert_eq!(order.lines.len(), 1);
    assert!(ctx.cart.cart().await.expect("load").is_empty());
}

#[tokio::test]
async fn repeated_line_failure_rolls_the_header_back() {
    let ctx = TestContext::new();
    fill_cart(&ctx).await;
    ctx.store.fail_line_inserts(2);

    let err = ctx
        .orders
        .submit_order(&ctx.cart, &checkout())
        .await
        .expect_err("both attempts fail");
    assert!(matches!(err, OrderingError::RemoteUnavailable(_)));

    // The compensating delete removed the header; nothing persisted
    assert_eq!(ctx.store.order_count(), 0);
    let history = ctx
        .orders
        .list_orders(ctx.user_id, OrderFilter::All)
        .await
        .expect("list");
    assert!(history.is_empty());

    // The cart was not cleared, so the customer can retry
    assert!(!ctx.cart.cart().await.expect("load").is_empty());
}

#[tokio::test]
async fn failed_compensation_reports_the_orphaned_header() {
    let ctx = TestContext::new();
    fill_cart(&ctx).await;
    ctx.store.fail_line_inserts(2);
    ctx.store.fail_deletes(1);

    let err = ctx
        .orders
        .submit_order(&ctx.cart, &checkout())
        .await
        .expect_err("compensation fails");
    let OrderingError::PartialOrder { order_id } = err else {
        panic!("expected PartialOrder, got {err:?}");
    };

    // The orphaned header is still there, lines missing, under the reported id
    assert_eq!(ctx.store.order_count(), 1);
    let orphan = ctx.orders.order(order_id).await.expect("fetch orphan");
    assert!(orphan.lines.is_empty());

    assert!(!ctx.cart.cart().await.expect("load").is_empty());
}

#[tokio::test]
async fn recovery_leaves_the_store_usable_for_the_next_submit() {
    let ctx = TestContext::new();
    fill_cart(&ctx).await;
    ctx.store.fail_line_inserts(2);

    ctx.orders
        .submit_order(&ctx.cart, &checkout())
        .await
        .expect_err("rolled back");

    // Same cart, no injected failures: the retry goes through cleanly
    let order = ctx
        .orders
        .submit_order(&ctx.cart, &checkout())
        .await
        .expect("second attempt");
    assert_eq!(order.lines.len(), 1);
    assert_eq!(ctx.store.order_count(), 1);
}
