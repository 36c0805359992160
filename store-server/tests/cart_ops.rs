//! Cart store semantics: merge-on-re-add, quantity floor, remove-on-zero,
//! selection flags and read idempotence.

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use store_server::db::DbService;
use store_server::db::models::{Product, ProductCreate, Role, User, UserCreate};
use store_server::db::repository::{CartRepository, ProductRepository, UserRepository};

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
                name: "Cart Tester".to_string(),
                email: email.to_string(),
                password: "test-password".to_string(),
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
            price: "9.99".parse().unwrap(),
            description: None,
            stock: Some(100),
            category: "test".to_string(),
            image: None,
        })
        .await
        .expect("product create")
}

#[tokio::test]
async fn missing_cart_reads_as_empty() {
    let tmp = tempfile::tempdir().unwrap();
    let db = open_db(&tmp).await;

    let user = create_user(&db, "empty@example.com").await;
    let user_rid = user.id.unwrap();

    let lines = CartRepository::new(db.clone()).get(&user_rid).await.unwrap();
    assert!(lines.is_empty());
}

#[tokio::test]
async fn re_adding_a_product_merges_into_one_line() {
    let tmp = tempfile::tempdir().unwrap();
    let db = open_db(&tmp).await;

    let user = create_user(&db, "merge@example.com").await;
    let user_rid = user.id.unwrap();
    let product = create_product(&db, "Merge Target").await;
    let product_rid = product.id.unwrap();

    let carts = CartRepository::new(db.clone());
    carts.add_item(&user_rid, &product_rid, 2).await.unwrap();
    let line = carts.add_item(&user_rid, &product_rid, 3).await.unwrap();

    // Increment by the delta only, never a duplicate line
    assert_eq!(line.quantity, 5);
    let lines = carts.get(&user_rid).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].selected, "new lines default to selected");
}

#[tokio::test]
async fn add_quantity_is_floored_at_one() {
    let tmp = tempfile::tempdir().unwrap();
    let db = open_db(&tmp).await;

    let user = create_user(&db, "floor@example.com").await;
    let user_rid = user.id.unwrap();
    let product = create_product(&db, "Floored").await;
    let product_rid = product.id.unwrap();

    let carts = CartRepository::new(db.clone());
    let line = carts.add_item(&user_rid, &product_rid, 0).await.unwrap();
    assert_eq!(line.quantity, 1);

    // A negative delta cannot push an existing line below 1 either
    let line = carts.add_item(&user_rid, &product_rid, -10).await.unwrap();
    assert_eq!(line.quantity, 1);
}

#[tokio::test]
async fn set_quantity_overwrites_and_zero_removes() {
    let tmp = tempfile::tempdir().unwrap();
    let db = open_db(&tmp).await;

    let user = create_user(&db, "setqty@example.com").await;
    let user_rid = user.id.unwrap();
    let product = create_product(&db, "Adjustable").await;
    let product_rid = product.id.unwrap();

    let carts = CartRepository::new(db.clone());
    carts.add_item(&user_rid, &product_rid, 2).await.unwrap();

    let line = carts
        .set_quantity(&user_rid, &product_rid, 7)
        .await
        .unwrap()
        .expect("line exists");
    assert_eq!(line.quantity, 7);

    // qty <= 0 removes the line
    let removed = carts.set_quantity(&user_rid, &product_rid, 0).await.unwrap();
    assert!(removed.is_none());
    assert!(carts.get(&user_rid).await.unwrap().is_empty());

    // Setting quantity on an absent line is a no-op, not an error
    let missing = carts.set_quantity(&user_rid, &product_rid, 3).await.unwrap();
    assert!(missing.is_none());
    assert!(carts.get(&user_rid).await.unwrap().is_empty());
}

#[tokio::test]
async fn selection_flags_only_touch_listed_products() {
    let tmp = tempfile::tempdir().unwrap();
    let db = open_db(&tmp).await;

    let user = create_user(&db, "select@example.com").await;
    let user_rid = user.id.unwrap();
    let p1 = create_product(&db, "Selected One").await;
    let p2 = create_product(&db, "Selected Two").await;
    let p1_rid = p1.id.unwrap();
    let p2_rid = p2.id.unwrap();

    let carts = CartRepository::new(db.clone());
    carts.add_item(&user_rid, &p1_rid, 1).await.unwrap();
    carts.add_item(&user_rid, &p2_rid, 1).await.unwrap();

    carts
        .set_selected(&user_rid, std::slice::from_ref(&p1_rid), false)
        .await
        .unwrap();

    let lines = carts.get(&user_rid).await.unwrap();
    let p1_line = lines.iter().find(|l| l.product == p1_rid).unwrap();
    let p2_line = lines.iter().find(|l| l.product == p2_rid).unwrap();
    assert!(!p1_line.selected);
    assert!(p2_line.selected);
}

#[tokio::test]
async fn carts_are_isolated_per_user() {
    let tmp = tempfile::tempdir().unwrap();
    let db = open_db(&tmp).await;

    let a = create_user(&db, "owner-a@example.com").await;
    let b = create_user(&db, "owner-b@example.com").await;
    let a_rid = a.id.unwrap();
    let b_rid = b.id.unwrap();
    let product = create_product(&db, "Shared Interest").await;
    let product_rid = product.id.unwrap();

    let carts = CartRepository::new(db.clone());
    carts.add_item(&a_rid, &product_rid, 2).await.unwrap();
    carts.add_item(&b_rid, &product_rid, 9).await.unwrap();

    assert_eq!(carts.get(&a_rid).await.unwrap()[0].quantity, 2);
    assert_eq!(carts.get(&b_rid).await.unwrap()[0].quantity, 9);

    carts.clear(&a_rid).await.unwrap();
    assert!(carts.get(&a_rid).await.unwrap().is_empty());
    assert_eq!(carts.get(&b_rid).await.unwrap().len(), 1);
}

#[tokio::test]
async fn remove_products_drops_only_the_given_subset() {
    let tmp = tempfile::tempdir().unwrap();
    let db = open_db(&tmp).await;

    let user = create_user(&db, "subset@example.com").await;
    let user_rid = user.id.unwrap();
    let keep = create_product(&db, "Keep Me").await;
    let gone = create_product(&db, "Drop Me").await;
    let keep_rid = keep.id.unwrap();
    let gone_rid = gone.id.unwrap();

    let carts = CartRepository::new(db.clone());
    carts.add_item(&user_rid, &keep_rid, 1).await.unwrap();
    carts.add_item(&user_rid, &gone_rid, 1).await.unwrap();

    carts
        .remove_products(&user_rid, std::slice::from_ref(&gone_rid))
        .await
        .unwrap();

    let lines = carts.get(&user_rid).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].product, keep_rid);
}
