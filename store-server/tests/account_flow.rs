//! Account lifecycle and the social edges around products: registration,
//! duplicate emails, password reset, favorites toggling, comments and the
//! buyer/commenter counts.

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use store_server::checkout::{CheckoutService, PricingPolicy};
use store_server::db::DbService;
use store_server::db::models::{Product, ProductCreate, Role, User, UserCreate};
use store_server::db::repository::{
    CartRepository, CommentRepository, OrderRepository, ProductRepository, RepoError,
    UserRepository,
};

async fn open_db(tmp: &tempfile::TempDir) -> Surreal<Db> {
    let path = tmp.path().join("store.db");
    DbService::new(&path.to_string_lossy())
        .await
        .expect("db open")
        .db
}

async fn create_user(db: &Surreal<Db>, name: &str, email: &str) -> User {
    UserRepository::new(db.clone())
        .create(
            UserCreate {
                name: name.to_string(),
                email: email.to_string(),
                password: "initial-password".to_string(),
            },
            Role::User,
        )
        .await
        .expect("user create")
}

async fn create_product(db: &Surreal<Db>, name: &str) -> Product {
    ProductRepository::new(db.clone())
        .create(ProductCreate {
            name: name.to_string(),
            price: "19.99".parse().unwrap(),
            description: Some("A test product".to_string()),
            stock: Some(50),
            category: "test".to_string(),
            image: None,
        })
        .await
        .expect("product create")
}

#[tokio::test]
async fn duplicate_email_registration_is_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let db = open_db(&tmp).await;

    let repo = UserRepository::new(db.clone());
    create_user(&db, "First", "dup@example.com").await;

    let err = repo
        .create(
            UserCreate {
                name: "Second".to_string(),
                email: "dup@example.com".to_string(),
                password: "whatever-pass".to_string(),
            },
            Role::User,
        )
        .await
        .expect_err("duplicate email must be rejected");
    assert!(matches!(err, RepoError::Duplicate(_)));
}

#[tokio::test]
async fn password_verify_and_reset() {
    let tmp = tempfile::tempdir().unwrap();
    let db = open_db(&tmp).await;

    let repo = UserRepository::new(db.clone());
    let user = create_user(&db, "Resetter", "reset@example.com").await;
    assert!(user.verify_password("initial-password").unwrap());
    assert!(!user.verify_password("wrong-password").unwrap());

    repo.reset_password("reset@example.com", "brand-new-password")
        .await
        .unwrap();

    let reloaded = repo
        .find_by_email("reset@example.com")
        .await
        .unwrap()
        .unwrap();
    assert!(reloaded.verify_password("brand-new-password").unwrap());
    assert!(!reloaded.verify_password("initial-password").unwrap());

    // Resetting an unknown email reports not-found
    let err = repo
        .reset_password("nobody@example.com", "irrelevant-pass")
        .await
        .expect_err("unknown email must fail");
    assert!(matches!(err, RepoError::NotFound(_)));
}

#[tokio::test]
async fn favorites_toggle_on_and_off() {
    let tmp = tempfile::tempdir().unwrap();
    let db = open_db(&tmp).await;

    let repo = UserRepository::new(db.clone());
    let user = create_user(&db, "Collector", "fav@example.com").await;
    let user_rid = user.id.unwrap();
    let product = create_product(&db, "Collectible").await;
    let product_rid = product.id.unwrap();

    // On
    let favorites = repo
        .set_favorites(&user_rid, vec![product_rid.clone()])
        .await
        .unwrap();
    assert_eq!(favorites, vec![product_rid.clone()]);

    // Off (toggle semantics live in the handler; the store holds the list)
    let favorites = repo.set_favorites(&user_rid, vec![]).await.unwrap();
    assert!(favorites.is_empty());
}

#[tokio::test]
async fn comments_are_newest_first_with_author_resolved() {
    let tmp = tempfile::tempdir().unwrap();
    let db = open_db(&tmp).await;

    let alice = create_user(&db, "Alice", "alice-c@example.com").await;
    let bob = create_user(&db, "Bob", "bob-c@example.com").await;
    let product = create_product(&db, "Discussed Product").await;
    let product_rid = product.id.unwrap();

    let comments = CommentRepository::new(db.clone());
    comments
        .create(
            alice.id.clone().unwrap(),
            product_rid.clone(),
            "First!".to_string(),
        )
        .await
        .unwrap();
    comments
        .create(
            bob.id.clone().unwrap(),
            product_rid.clone(),
            "Second thoughts".to_string(),
        )
        .await
        .unwrap();

    let listed = comments.find_by_product(&product_rid).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].content, "Second thoughts");
    assert_eq!(listed[0].user_name.as_deref(), Some("Bob"));
    assert_eq!(listed[1].user_name.as_deref(), Some("Alice"));
}

#[tokio::test]
async fn counts_deduplicate_buyers_and_commenters() {
    let tmp = tempfile::tempdir().unwrap();
    let db = open_db(&tmp).await;

    let alice = create_user(&db, "Alice", "alice-n@example.com").await;
    let alice_rid = alice.id.unwrap();
    let product = create_product(&db, "Counted Product").await;
    let product_rid = product.id.unwrap();

    // Alice buys it twice (two separate checkouts)
    let carts = CartRepository::new(db.clone());
    let svc = CheckoutService::with_db(db.clone(), PricingPolicy::TrustClient);
    for _ in 0..2 {
        carts.add_item(&alice_rid, &product_rid, 1).await.unwrap();
        svc.create_order(&alice_rid.to_string(), None)
            .await
            .expect("checkout should succeed");
    }

    // ... and comments twice
    let comments = CommentRepository::new(db.clone());
    for text in ["Nice", "Still nice"] {
        comments
            .create(alice_rid.clone(), product_rid.clone(), text.to_string())
            .await
            .unwrap();
    }

    let orders = OrderRepository::new(db.clone());
    assert_eq!(orders.count_distinct_buyers(&product_rid).await.unwrap(), 1);
    assert_eq!(
        comments
            .count_distinct_commenters(&product_rid)
            .await
            .unwrap(),
        1
    );

    // Two orders are on the ledger all the same
    assert_eq!(orders.find_by_user(&alice_rid).await.unwrap().len(), 2);
}

#[tokio::test]
async fn product_update_merges_partial_fields() {
    let tmp = tempfile::tempdir().unwrap();
    let db = open_db(&tmp).await;

    let repo = ProductRepository::new(db.clone());
    let product = create_product(&db, "Partially Updated").await;
    let id = product.id.clone().unwrap().to_string();

    let updated = repo
        .update(
            &id,
            store_server::db::models::ProductUpdate {
                name: None,
                price: Some("25.00".parse().unwrap()),
                description: None,
                stock: None,
                category: None,
                image: None,
            },
        )
        .await
        .unwrap();

    // Only the supplied field changed
    assert_eq!(updated.name, "Partially Updated");
    assert_eq!(updated.price, "25.00".parse().unwrap());
    assert_eq!(updated.stock, 50);
    assert_eq!(updated.category, "test");
}
