//! Checkout orchestration: stock validation, atomic reservation, ledger
//! commit and cart reconciliation against a scratch embedded database.

use rust_decimal::Decimal;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use store_server::checkout::{
    CheckoutError, CheckoutItemInput, CheckoutService, PricingPolicy,
};
use store_server::db::DbService;
use store_server::db::models::{OrderStatus, Product, ProductCreate, Role, User, UserCreate};
use store_server::db::repository::{
    CartRepository, OrderRepository, ProductRepository, UserRepository,
};

async fn open_db(tmp: &tempfile::TempDir) -> Surreal<Db> {
    let path = tmp.path().join("store.db");
    DbService::new(&path.to_string_lossy())
        .await
        .expect("db open")
        .db
}

async fn create_user(db: &Surreal<Db>, email: &str) -> User {
    UserRepository::new(db.clone())
        .create(
            UserCreate {
                name: "Test Shopper".to_string(),
                email: email.to_string(),
                password: "test-password".to_string(),
            },
            Role::User,
        )
        .await
        .expect("user create")
}

async fn create_product(db: &Surreal<Db>, name: &str, price: &str, stock: i64) -> Product {
    ProductRepository::new(db.clone())
        .create(ProductCreate {
            name: name.to_string(),
            price: price.parse().unwrap(),
            description: None,
            stock: Some(stock),
            category: "test".to_string(),
            image: None,
        })
        .await
        .expect("product create")
}

fn service(db: &Surreal<Db>) -> CheckoutService {
    CheckoutService::with_db(db.clone(), PricingPolicy::TrustClient)
}

#[tokio::test]
async fn cart_checkout_decrements_stock_and_clears_cart() {
    let tmp = tempfile::tempdir().unwrap();
    let db = open_db(&tmp).await;

    let user = create_user(&db, "a@example.com").await;
    let user_rid = user.id.clone().unwrap();
    let product = create_product(&db, "Widget", "10.50", 5).await;
    let product_rid = product.id.clone().unwrap();

    let carts = CartRepository::new(db.clone());
    carts.add_item(&user_rid, &product_rid, 2).await.unwrap();

    let order = service(&db)
        .create_order(&user_rid.to_string(), None)
        .await
        .expect("checkout should succeed");

    // Order snapshot: live name/price captured, total exact
    assert_eq!(order.status, OrderStatus::Paid);
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].name, "Widget");
    assert_eq!(order.items[0].quantity, 2);
    assert_eq!(order.total, "21.00".parse::<Decimal>().unwrap());

    // Stock decremented 5 -> 3
    let refreshed = ProductRepository::new(db.clone())
        .find_by_record(&product_rid)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(refreshed.stock, 3);

    // Ordered line left the cart
    let cart = carts.get(&user_rid).await.unwrap();
    assert!(cart.is_empty());
}

#[tokio::test]
async fn insufficient_stock_fails_without_side_effects() {
    let tmp = tempfile::tempdir().unwrap();
    let db = open_db(&tmp).await;

    let user = create_user(&db, "b@example.com").await;
    let user_rid = user.id.clone().unwrap();
    let product = create_product(&db, "Scarce Thing", "3.00", 3).await;
    let product_rid = product.id.clone().unwrap();

    let carts = CartRepository::new(db.clone());
    carts.add_item(&user_rid, &product_rid, 10).await.unwrap();

    let err = service(&db)
        .create_order(&user_rid.to_string(), None)
        .await
        .expect_err("checkout must fail");
    assert!(matches!(err, CheckoutError::InsufficientStock(_)));
    assert_eq!(err.code(), "INSUFFICIENT_STOCK");

    // Stock untouched, no order recorded, cart line still present
    let refreshed = ProductRepository::new(db.clone())
        .find_by_record(&product_rid)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(refreshed.stock, 3);

    let orders = OrderRepository::new(db.clone())
        .find_by_user(&user_rid)
        .await
        .unwrap();
    assert!(orders.is_empty());

    assert_eq!(carts.get(&user_rid).await.unwrap().len(), 1);
}

#[tokio::test]
async fn empty_selection_is_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let db = open_db(&tmp).await;

    let user = create_user(&db, "c@example.com").await;
    let user_rid = user.id.clone().unwrap();

    // No cart at all
    let err = service(&db)
        .create_order(&user_rid.to_string(), None)
        .await
        .expect_err("empty cart must fail");
    assert!(matches!(err, CheckoutError::EmptySelection));

    // A cart whose lines are all deselected behaves the same
    let product = create_product(&db, "Unpicked", "1.00", 5).await;
    let product_rid = product.id.clone().unwrap();
    let carts = CartRepository::new(db.clone());
    carts.add_item(&user_rid, &product_rid, 1).await.unwrap();
    carts
        .set_selected(&user_rid, std::slice::from_ref(&product_rid), false)
        .await
        .unwrap();

    let err = service(&db)
        .create_order(&user_rid.to_string(), None)
        .await
        .expect_err("deselected cart must fail");
    assert!(matches!(err, CheckoutError::EmptySelection));
}

#[tokio::test]
async fn unknown_product_in_explicit_items_aborts_validation() {
    let tmp = tempfile::tempdir().unwrap();
    let db = open_db(&tmp).await;

    let user = create_user(&db, "d@example.com").await;
    let user_rid = user.id.clone().unwrap();
    let product = create_product(&db, "Real Product", "5.00", 4).await;
    let product_rid = product.id.clone().unwrap();

    let items = vec![
        CheckoutItemInput {
            product_id: Some(product_rid.to_string()),
            name: Some("Real Product".to_string()),
            price: Some("5.00".parse().unwrap()),
            quantity: Some(2),
        },
        CheckoutItemInput {
            product_id: Some("product:doesnotexist".to_string()),
            name: None,
            price: None,
            quantity: Some(1),
        },
    ];

    let err = service(&db)
        .create_order(&user_rid.to_string(), Some(items))
        .await
        .expect_err("unknown product must fail");
    assert!(matches!(err, CheckoutError::ProductNotFound(_)));

    // Validation failed on line 2: line 1's stock must be unchanged
    let refreshed = ProductRepository::new(db.clone())
        .find_by_record(&product_rid)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(refreshed.stock, 4);

    let orders = OrderRepository::new(db.clone())
        .find_by_user(&user_rid)
        .await
        .unwrap();
    assert!(orders.is_empty());
}

#[tokio::test]
async fn missing_product_reference_is_a_distinct_failure() {
    let tmp = tempfile::tempdir().unwrap();
    let db = open_db(&tmp).await;

    let user = create_user(&db, "e@example.com").await;
    let user_rid = user.id.clone().unwrap();

    let items = vec![CheckoutItemInput {
        product_id: None,
        name: Some("Ghost".to_string()),
        price: Some("9.99".parse().unwrap()),
        quantity: Some(1),
    }];

    let err = service(&db)
        .create_order(&user_rid.to_string(), Some(items))
        .await
        .expect_err("missing reference must fail");
    assert!(matches!(err, CheckoutError::MissingProductReference));
    assert_eq!(err.code(), "MISSING_PRODUCT_REFERENCE");
}

#[tokio::test]
async fn missing_user_is_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let db = open_db(&tmp).await;

    let err = service(&db)
        .create_order("", None)
        .await
        .expect_err("blank user must fail");
    assert!(matches!(err, CheckoutError::MissingUser));
}

#[tokio::test]
async fn concurrent_checkouts_cannot_oversell_the_last_unit() {
    let tmp = tempfile::tempdir().unwrap();
    let db = open_db(&tmp).await;

    let alice = create_user(&db, "alice@example.com").await;
    let bob = create_user(&db, "bob@example.com").await;
    let alice_rid = alice.id.clone().unwrap();
    let bob_rid = bob.id.clone().unwrap();

    let product = create_product(&db, "Last Unit", "42.00", 1).await;
    let product_rid = product.id.clone().unwrap();

    let carts = CartRepository::new(db.clone());
    carts.add_item(&alice_rid, &product_rid, 1).await.unwrap();
    carts.add_item(&bob_rid, &product_rid, 1).await.unwrap();

    let svc = service(&db);
    let alice_id = alice_rid.to_string();
    let bob_id = bob_rid.to_string();
    let (a, b) = tokio::join!(
        svc.create_order(&alice_id, None),
        svc.create_order(&bob_id, None),
    );

    // Exactly one winner; the loser sees INSUFFICIENT_STOCK
    let successes = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
    assert_eq!(successes, 1, "exactly one checkout may win the last unit");
    let loser = if a.is_ok() { b } else { a };
    assert!(matches!(
        loser.expect_err("loser must fail"),
        CheckoutError::InsufficientStock(_)
    ));

    // Stock bottomed out at zero, never negative
    let refreshed = ProductRepository::new(db.clone())
        .find_by_record(&product_rid)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(refreshed.stock, 0);
}

#[tokio::test]
async fn multi_line_total_is_exact_sum_of_snapshots() {
    let tmp = tempfile::tempdir().unwrap();
    let db = open_db(&tmp).await;

    let user = create_user(&db, "f@example.com").await;
    let user_rid = user.id.clone().unwrap();

    let p1 = create_product(&db, "Coffee Beans", "12.35", 10).await;
    let p2 = create_product(&db, "Grinder", "149.99", 2).await;
    let p1_rid = p1.id.clone().unwrap();
    let p2_rid = p2.id.clone().unwrap();

    let carts = CartRepository::new(db.clone());
    carts.add_item(&user_rid, &p1_rid, 3).await.unwrap();
    carts.add_item(&user_rid, &p2_rid, 1).await.unwrap();

    let order = service(&db)
        .create_order(&user_rid.to_string(), None)
        .await
        .expect("checkout should succeed");

    // 3 x 12.35 + 1 x 149.99 = 187.04, exactly
    assert_eq!(order.total, "187.04".parse::<Decimal>().unwrap());
    let from_items: Decimal = order.items.iter().map(|i| i.line_total()).sum();
    assert_eq!(order.total, from_items);

    // Ledger lookup returns the committed order, newest first
    let orders = OrderRepository::new(db.clone())
        .find_by_user(&user_rid)
        .await
        .unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].total, order.total);
}

#[tokio::test]
async fn unselected_lines_survive_checkout() {
    let tmp = tempfile::tempdir().unwrap();
    let db = open_db(&tmp).await;

    let user = create_user(&db, "g@example.com").await;
    let user_rid = user.id.clone().unwrap();

    let wanted = create_product(&db, "Wanted Now", "5.00", 5).await;
    let later = create_product(&db, "Saved For Later", "7.00", 5).await;
    let wanted_rid = wanted.id.clone().unwrap();
    let later_rid = later.id.clone().unwrap();

    let carts = CartRepository::new(db.clone());
    carts.add_item(&user_rid, &wanted_rid, 1).await.unwrap();
    carts.add_item(&user_rid, &later_rid, 2).await.unwrap();
    carts
        .set_selected(&user_rid, std::slice::from_ref(&later_rid), false)
        .await
        .unwrap();

    let order = service(&db)
        .create_order(&user_rid.to_string(), None)
        .await
        .expect("checkout should succeed");
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].name, "Wanted Now");

    // The deselected line is untouched, the ordered one is gone
    let cart = carts.get(&user_rid).await.unwrap();
    assert_eq!(cart.len(), 1);
    assert_eq!(cart[0].product, later_rid);
    assert_eq!(cart[0].quantity, 2);
    assert!(!cart[0].selected);

    // Saved-for-later stock untouched
    let refreshed = ProductRepository::new(db.clone())
        .find_by_record(&later_rid)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(refreshed.stock, 5);
}

#[tokio::test]
async fn explicit_items_trust_client_prices_by_default() {
    let tmp = tempfile::tempdir().unwrap();
    let db = open_db(&tmp).await;

    let user = create_user(&db, "h@example.com").await;
    let user_rid = user.id.clone().unwrap();
    let product = create_product(&db, "Catalog Priced", "100.00", 5).await;
    let product_rid = product.id.clone().unwrap();

    let items = vec![CheckoutItemInput {
        product_id: Some(product_rid.to_string()),
        name: Some("Locked Price".to_string()),
        price: Some("80.00".parse().unwrap()),
        quantity: Some(1),
    }];

    let order = service(&db)
        .create_order(&user_rid.to_string(), Some(items))
        .await
        .expect("checkout should succeed");

    // Client-declared snapshot wins under TrustClient
    assert_eq!(order.items[0].name, "Locked Price");
    assert_eq!(order.total, "80.00".parse::<Decimal>().unwrap());
}

#[tokio::test]
async fn catalog_only_policy_reprices_explicit_items() {
    let tmp = tempfile::tempdir().unwrap();
    let db = open_db(&tmp).await;

    let user = create_user(&db, "i@example.com").await;
    let user_rid = user.id.clone().unwrap();
    let product = create_product(&db, "Catalog Priced", "100.00", 5).await;
    let product_rid = product.id.clone().unwrap();

    let items = vec![CheckoutItemInput {
        product_id: Some(product_rid.to_string()),
        name: Some("Client Lie".to_string()),
        price: Some("0.01".parse().unwrap()),
        quantity: Some(1),
    }];

    let svc = CheckoutService::with_db(db.clone(), PricingPolicy::CatalogOnly);
    let order = svc
        .create_order(&user_rid.to_string(), Some(items))
        .await
        .expect("checkout should succeed");

    // Snapshot re-derived from the catalog
    assert_eq!(order.items[0].name, "Catalog Priced");
    assert_eq!(order.total, "100.00".parse::<Decimal>().unwrap());
}
