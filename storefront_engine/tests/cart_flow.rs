use storefront_engine::{
    db_types::Money,
    CartApi,
    CartError,
    CatalogManagement,
    InventoryError,
    InventoryManagement,
};

mod support;
use support::{new_user, seed_catalog, setup, tear_down};

#[tokio::test]
async fn adding_a_product_reserves_stock() {
    let db = setup().await;
    let (_street, products) = seed_catalog(&db).await;
    let user = new_user(&db, "50.00").await;
    let cart = CartApi::new(db.clone());

    let teabags = &products[0];
    let line = cart.add_product(user.id, teabags.id).await.unwrap();
    assert_eq!(line.quantity, 1);
    assert_eq!(line.unit_price, teabags.price);
    assert_eq!(db.stock_on_hand(teabags.id).await.unwrap(), 9);

    // A second add merges into the same line.
    let line2 = cart.add_product(user.id, teabags.id).await.unwrap();
    assert_eq!(line2.id, line.id);
    assert_eq!(line2.quantity, 2);
    assert_eq!(db.stock_on_hand(teabags.id).await.unwrap(), 8);

    let snapshot = cart.snapshot(user.id).await.unwrap();
    assert_eq!(snapshot.lines.len(), 1);
    assert_eq!(snapshot.total, teabags.price * 2);
    tear_down(db).await;
}

#[tokio::test]
async fn adding_beyond_stock_fails() {
    let db = setup().await;
    let (_street, products) = seed_catalog(&db).await;
    let alice = new_user(&db, "100.00").await;
    let bob = new_user(&db, "100.00").await;
    let cart = CartApi::new(db.clone());

    let croissant = &products[2];
    assert_eq!(croissant.count, 1);
    cart.add_product(alice.id, croissant.id).await.unwrap();
    let err = cart.add_product(bob.id, croissant.id).await.unwrap_err();
    assert!(matches!(err, CartError::Inventory(InventoryError::OutOfStock(id)) if id == croissant.id));
    // Bob's cart stays empty and the failed add reserved nothing.
    assert!(cart.snapshot(bob.id).await.unwrap().is_empty());
    assert_eq!(db.stock_on_hand(croissant.id).await.unwrap(), 0);
    tear_down(db).await;
}

#[tokio::test]
async fn adding_an_unknown_product_fails() {
    let db = setup().await;
    let _ = seed_catalog(&db).await;
    let user = new_user(&db, "10.00").await;
    let cart = CartApi::new(db.clone());
    let err = cart.add_product(user.id, 999).await.unwrap_err();
    assert!(matches!(err, CartError::Inventory(InventoryError::ProductNotFound(999))));
    tear_down(db).await;
}

#[tokio::test]
async fn increment_and_decrement_adjust_stock() {
    let db = setup().await;
    let (_street, products) = seed_catalog(&db).await;
    let user = new_user(&db, "500.00").await;
    let cart = CartApi::new(db.clone());

    let whisky = &products[1];
    let line = cart.add_product(user.id, whisky.id).await.unwrap();
    assert_eq!(cart.increment(user.id, line.id).await.unwrap(), 2);
    assert_eq!(cart.increment(user.id, line.id).await.unwrap(), 3);
    assert_eq!(db.stock_on_hand(whisky.id).await.unwrap(), 2);

    assert_eq!(cart.decrement(user.id, line.id).await.unwrap(), 2);
    assert_eq!(db.stock_on_hand(whisky.id).await.unwrap(), 3);

    // Decrementing down to 1 and then once more is a no-op.
    assert_eq!(cart.decrement(user.id, line.id).await.unwrap(), 1);
    assert_eq!(cart.decrement(user.id, line.id).await.unwrap(), 1);
    assert_eq!(db.stock_on_hand(whisky.id).await.unwrap(), 4);
    tear_down(db).await;
}

#[tokio::test]
async fn increment_is_capped_by_stock() {
    let db = setup().await;
    let (_street, products) = seed_catalog(&db).await;
    let user = new_user(&db, "100.00").await;
    let cart = CartApi::new(db.clone());

    let croissant = &products[2];
    let line = cart.add_product(user.id, croissant.id).await.unwrap();
    let err = cart.increment(user.id, line.id).await.unwrap_err();
    assert!(matches!(err, CartError::Inventory(InventoryError::OutOfStock(_))));
    // The failed increment left the line alone.
    let snapshot = cart.snapshot(user.id).await.unwrap();
    assert_eq!(snapshot.lines[0].quantity, 1);
    tear_down(db).await;
}

#[tokio::test]
async fn removing_a_line_releases_all_its_stock() {
    let db = setup().await;
    let (_street, products) = seed_catalog(&db).await;
    let user = new_user(&db, "500.00").await;
    let cart = CartApi::new(db.clone());

    let whisky = &products[1];
    let line = cart.add_product(user.id, whisky.id).await.unwrap();
    cart.increment(user.id, line.id).await.unwrap();
    cart.increment(user.id, line.id).await.unwrap();
    assert_eq!(db.stock_on_hand(whisky.id).await.unwrap(), 2);

    cart.remove(user.id, line.id).await.unwrap();
    assert_eq!(db.stock_on_hand(whisky.id).await.unwrap(), 5);
    assert!(cart.snapshot(user.id).await.unwrap().is_empty());
    tear_down(db).await;
}

#[tokio::test]
async fn cart_lines_are_scoped_to_their_owner() {
    let db = setup().await;
    let (_street, products) = seed_catalog(&db).await;
    let alice = new_user(&db, "50.00").await;
    let bob = new_user(&db, "50.00").await;
    let cart = CartApi::new(db.clone());

    let line = cart.add_product(alice.id, products[0].id).await.unwrap();
    for result in [
        cart.increment(bob.id, line.id).await,
        cart.decrement(bob.id, line.id).await,
        cart.remove(bob.id, line.id).await.map(|()| 0),
    ] {
        assert!(matches!(result.unwrap_err(), CartError::LineNotFound(id) if id == line.id));
    }
    // Alice's line is untouched.
    assert_eq!(cart.snapshot(alice.id).await.unwrap().lines[0].quantity, 1);
    tear_down(db).await;
}

#[tokio::test]
async fn snapshot_keeps_the_price_at_add_time() {
    let db = setup().await;
    let (_street, products) = seed_catalog(&db).await;
    let user = new_user(&db, "50.00").await;
    let cart = CartApi::new(db.clone());

    let teabags = &products[0];
    cart.add_product(user.id, teabags.id).await.unwrap();
    db.update_price(teabags.id, "9.99".parse::<Money>().unwrap()).await.unwrap();

    let snapshot = cart.snapshot(user.id).await.unwrap();
    assert_eq!(snapshot.total, teabags.price);
    tear_down(db).await;
}
