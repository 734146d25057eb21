//! Integration tests for the checkout flow
//!
//! These run against the in-memory repository, which mirrors the MongoDB
//! implementation's atomicity contract: sale insert plus stock decrements
//! land together or not at all.

use std::sync::Arc;

use chrono::{Days, Utc};
use domain_pos::*;
use test_utils::TestDataBuilder;
use uuid::Uuid;

fn product(id: Uuid, name: &str, price: f64, cost_price: f64, stock: i32) -> Product {
    let now = Utc::now();
    Product {
        id,
        name: name.to_string(),
        category: Some("Fresh".to_string()),
        source: ProductSource::Own,
        price,
        cost_price,
        stock,
        unit: "kg".to_string(),
        created_at: now,
        updated_at: now,
    }
}

fn pickup_request() -> CheckoutRequest {
    CheckoutRequest {
        kind: OrderKind::StorePickup,
        sale_date: Utc::now().date_naive(),
        delivery: None,
    }
}

fn delivery_request(builder: &TestDataBuilder) -> CheckoutRequest {
    CheckoutRequest {
        kind: OrderKind::Delivery,
        sale_date: Utc::now().date_naive(),
        delivery: Some(DeliveryDetails {
            name: builder.customer_name(),
            phone: builder.phone(),
            address: builder.address(),
        }),
    }
}

#[tokio::test]
async fn test_checkout_commits_sale_and_decrements_stock() {
    let builder = TestDataBuilder::from_test_name("checkout_commits");
    let repo = Arc::new(InMemoryPosRepository::new());
    let p = product(builder.id(0), &builder.name("oyster"), 100.0, 60.0, 10);
    let other = product(builder.id(1), &builder.name("shiitake"), 250.0, 150.0, 4);
    repo.upsert_product(p.clone()).await;
    repo.upsert_product(other.clone()).await;

    let service = CheckoutService::from_shared(Arc::clone(&repo));
    let mut cart = Cart::new();
    for _ in 0..3 {
        cart.add_item(&p).unwrap();
    }

    let sale = service.checkout(&cart, pickup_request()).await.unwrap();

    assert_eq!(sale.total_price, 300.0);
    assert_eq!(sale.status, SaleStatus::Completed);
    assert_eq!(sale.kind, OrderKind::StorePickup);
    assert_eq!(sale.items.len(), 1);
    assert_eq!(sale.items[0].qty, 3);
    assert!(sale.customer_name.is_empty());

    // Stock decremented for the sold product, untouched elsewhere
    let after = repo.product(p.id).await.unwrap();
    assert_eq!(after.stock, 7);
    let untouched = repo.product(other.id).await.unwrap();
    assert_eq!(untouched.stock, 4);
}

#[tokio::test]
async fn test_checkout_empty_cart_persists_nothing() {
    let repo = Arc::new(InMemoryPosRepository::new());
    let service = CheckoutService::from_shared(Arc::clone(&repo));

    let err = service
        .checkout(&Cart::new(), pickup_request())
        .await
        .unwrap_err();

    assert!(matches!(err, PosError::EmptyCart));
    assert_eq!(repo.sale_count().await, 0);
}

#[tokio::test]
async fn test_checkout_delivery_requires_complete_details() {
    let builder = TestDataBuilder::from_test_name("delivery_details");
    let repo = Arc::new(InMemoryPosRepository::new());
    let p = product(builder.id(0), &builder.name("oyster"), 100.0, 60.0, 10);
    repo.upsert_product(p.clone()).await;

    let service = CheckoutService::from_shared(Arc::clone(&repo));
    let mut cart = Cart::new();
    cart.add_item(&p).unwrap();

    let blank_variants = [
        None,
        Some(DeliveryDetails {
            name: String::new(),
            phone: builder.phone(),
            address: builder.address(),
        }),
        Some(DeliveryDetails {
            name: builder.customer_name(),
            phone: String::new(),
            address: builder.address(),
        }),
        Some(DeliveryDetails {
            name: builder.customer_name(),
            phone: builder.phone(),
            address: String::new(),
        }),
    ];

    for delivery in blank_variants {
        let request = CheckoutRequest {
            kind: OrderKind::Delivery,
            sale_date: Utc::now().date_naive(),
            delivery,
        };
        let err = service.checkout(&cart, request).await.unwrap_err();
        assert!(matches!(err, PosError::MissingDeliveryDetails));
    }

    // Nothing persisted, stock untouched, cart still usable
    assert_eq!(repo.sale_count().await, 0);
    assert_eq!(repo.product(p.id).await.unwrap().stock, 10);
    assert_eq!(cart.len(), 1);
}

#[tokio::test]
async fn test_checkout_delivery_enters_pending_queue() {
    let builder = TestDataBuilder::from_test_name("delivery_pending");
    let repo = Arc::new(InMemoryPosRepository::new());
    let p = product(builder.id(0), &builder.name("oyster"), 100.0, 60.0, 10);
    repo.upsert_product(p.clone()).await;

    let service = CheckoutService::from_shared(Arc::clone(&repo));
    let delivery = DeliveryService::from_shared(Arc::clone(&repo));

    let mut cart = Cart::new();
    cart.add_item(&p).unwrap();

    let sale = service
        .checkout(&cart, delivery_request(&builder))
        .await
        .unwrap();

    assert_eq!(sale.status, SaleStatus::Pending);
    assert_eq!(sale.kind, OrderKind::Delivery);
    assert_eq!(sale.customer_name, builder.customer_name());
    assert_eq!(sale.customer_phone, builder.phone());
    assert_eq!(sale.customer_address, builder.address());

    let pending = delivery.list_pending().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, sale.id);
}

#[tokio::test]
async fn test_stale_cart_fails_commit_and_persists_nothing() {
    let builder = TestDataBuilder::from_test_name("stale_cart");
    let repo = Arc::new(InMemoryPosRepository::new());
    let p = product(builder.id(0), &builder.name("oyster"), 100.0, 60.0, 10);
    repo.upsert_product(p.clone()).await;

    let service = CheckoutService::from_shared(Arc::clone(&repo));
    let mut cart = Cart::new();
    for _ in 0..3 {
        cart.add_item(&p).unwrap();
    }

    // Stock drops after the cart was built (another terminal sold through)
    repo.upsert_product(product(p.id, &p.name, 100.0, 60.0, 2))
        .await;

    let err = service.checkout(&cart, pickup_request()).await.unwrap_err();

    assert!(matches!(err, PosError::InsufficientStock(id) if id == p.id));
    assert_eq!(repo.sale_count().await, 0);
    assert_eq!(repo.product(p.id).await.unwrap().stock, 2);
    // Cart intact for correction and retry
    assert_eq!(cart.lines()[0].qty, 3);
}

#[tokio::test]
async fn test_partial_cart_failure_leaves_all_stock_untouched() {
    let builder = TestDataBuilder::from_test_name("partial_failure");
    let repo = Arc::new(InMemoryPosRepository::new());
    let a = product(builder.id(0), &builder.name("oyster"), 100.0, 60.0, 10);
    let b = product(builder.id(1), &builder.name("shiitake"), 250.0, 150.0, 5);
    repo.upsert_product(a.clone()).await;
    repo.upsert_product(b.clone()).await;

    let service = CheckoutService::from_shared(Arc::clone(&repo));
    let mut cart = Cart::new();
    cart.add_item(&a).unwrap();
    for _ in 0..4 {
        cart.add_item(&b).unwrap();
    }

    // Second line becomes unsatisfiable
    repo.upsert_product(product(b.id, &b.name, 250.0, 150.0, 1))
        .await;

    let err = service.checkout(&cart, pickup_request()).await.unwrap_err();

    assert!(matches!(err, PosError::InsufficientStock(id) if id == b.id));
    // The first line's stock must not have been decremented either
    assert_eq!(repo.product(a.id).await.unwrap().stock, 10);
    assert_eq!(repo.product(b.id).await.unwrap().stock, 1);
    assert_eq!(repo.sale_count().await, 0);
}

#[tokio::test]
async fn test_concurrent_checkouts_never_oversell() {
    let builder = TestDataBuilder::from_test_name("concurrent_checkouts");
    let repo = Arc::new(InMemoryPosRepository::new());
    let p = product(builder.id(0), &builder.name("oyster"), 100.0, 60.0, 5);
    repo.upsert_product(p.clone()).await;

    let service_a = CheckoutService::from_shared(Arc::clone(&repo));
    let service_b = CheckoutService::from_shared(Arc::clone(&repo));

    let mut cart_a = Cart::new();
    let mut cart_b = Cart::new();
    for _ in 0..3 {
        cart_a.add_item(&p).unwrap();
        cart_b.add_item(&p).unwrap();
    }

    let (first, second) = tokio::join!(
        service_a.checkout(&cart_a, pickup_request()),
        service_b.checkout(&cart_b, pickup_request()),
    );

    // Exactly one succeeds; the loser sees the live re-check fail
    let successes = [&first, &second].iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);
    let failure = if first.is_err() { first } else { second };
    assert!(matches!(
        failure.unwrap_err(),
        PosError::InsufficientStock(id) if id == p.id
    ));

    assert_eq!(repo.product(p.id).await.unwrap().stock, 2);
    assert_eq!(repo.sale_count().await, 1);
}

#[tokio::test]
async fn test_sale_snapshot_survives_product_edits() {
    let builder = TestDataBuilder::from_test_name("snapshot_survives");
    let repo = Arc::new(InMemoryPosRepository::new());
    let p = product(builder.id(0), &builder.name("oyster"), 100.0, 60.0, 10);
    repo.upsert_product(p.clone()).await;

    let service = CheckoutService::from_shared(Arc::clone(&repo));
    let mut cart = Cart::new();
    for _ in 0..3 {
        cart.add_item(&p).unwrap();
    }
    let sale = service.checkout(&cart, pickup_request()).await.unwrap();

    // Catalog edit after the sale: new price, new name
    repo.upsert_product(product(p.id, "Renamed", 999.0, 500.0, 7))
        .await;

    let stored = repo.sale(sale.id).await.unwrap();
    assert_eq!(stored.items[0].price, 100.0);
    assert_eq!(stored.items[0].cost_price, 60.0);
    assert_eq!(stored.items[0].name, builder.name("oyster"));
    assert_eq!(stored.total_price, 300.0);
}

#[tokio::test]
async fn test_sale_date_combines_selected_day_with_commit_time() {
    let builder = TestDataBuilder::from_test_name("backdated_sale");
    let repo = Arc::new(InMemoryPosRepository::new());
    let p = product(builder.id(0), &builder.name("oyster"), 100.0, 60.0, 10);
    repo.upsert_product(p.clone()).await;

    let service = CheckoutService::from_shared(Arc::clone(&repo));
    let mut cart = Cart::new();
    cart.add_item(&p).unwrap();

    let backdate = Utc::now().date_naive().checked_sub_days(Days::new(2)).unwrap();
    let request = CheckoutRequest {
        kind: OrderKind::StorePickup,
        sale_date: backdate,
        delivery: None,
    };

    let before = Utc::now();
    let sale = service.checkout(&cart, request).await.unwrap();
    let after = Utc::now();

    // Calendar date from the operator, time-of-day from the commit moment
    assert_eq!(sale.date.date_naive(), backdate);
    assert!(sale.created_at >= before && sale.created_at <= after);
}
