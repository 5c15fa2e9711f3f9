//! Races over the guarded columns: stock, quantity and balance must never go negative, no matter how requests
//! interleave.

use storefront_engine::{
    db_types::Money,
    order_objects::AddressForm,
    CartError,
    CartManagement,
    InventoryError,
    InventoryManagement,
    SettlementDatabase,
    SettlementError,
    WalletError,
    WalletManagement,
};

mod support;
use support::{new_user, seed_catalog, setup, tear_down};

#[tokio::test]
async fn two_buyers_race_for_the_last_unit() {
    let db = setup().await;
    let (_street, products) = seed_catalog(&db).await;
    let alice = new_user(&db, "50.00").await;
    let bob = new_user(&db, "50.00").await;
    let croissant = products[2].clone();
    assert_eq!(croissant.count, 1);

    let db_a = db.clone();
    let db_b = db.clone();
    let product_id = croissant.id;
    let a = tokio::spawn(async move { db_a.add_product(alice.id, product_id).await });
    let b = tokio::spawn(async move { db_b.add_product(bob.id, product_id).await });
    let (a, b) = (a.await.unwrap(), b.await.unwrap());

    let winners = [&a, &b].iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1, "Exactly one buyer should get the last unit");
    let loser = if a.is_err() { a.unwrap_err() } else { b.unwrap_err() };
    assert!(matches!(loser, CartError::Inventory(InventoryError::OutOfStock(id)) if id == product_id));
    assert_eq!(db.stock_on_hand(product_id).await.unwrap(), 0);
    tear_down(db).await;
}

#[tokio::test]
async fn concurrent_increments_never_oversell() {
    let db = setup().await;
    let (_street, products) = seed_catalog(&db).await;
    let user = new_user(&db, "500.00").await;
    let whisky = products[1].clone();
    assert_eq!(whisky.count, 5);
    let line = db.add_product(user.id, whisky.id).await.unwrap();

    // Eight increments chase the four remaining units.
    let mut tasks = Vec::new();
    for _ in 0..8 {
        let db = db.clone();
        tasks.push(tokio::spawn(async move { db.increment_line(user.id, line.id).await }));
    }
    let mut successes = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => successes += 1,
            // The losers must see the stock run out, never a lock or serialisation failure.
            Err(e) => {
                assert!(matches!(e, CartError::Inventory(InventoryError::OutOfStock(_))), "unexpected error: {e}")
            },
        }
    }
    assert_eq!(successes, 4);
    assert_eq!(db.stock_on_hand(whisky.id).await.unwrap(), 0);
    let lines = db.cart_for_user(user.id).await.unwrap();
    assert_eq!(lines[0].quantity, 5);
    tear_down(db).await;
}

#[tokio::test]
async fn a_double_submitted_checkout_only_charges_once() {
    let db = setup().await;
    let (street, products) = seed_catalog(&db).await;
    let user = new_user(&db, "50.00").await;
    let teabags = &products[0];
    db.add_product(user.id, teabags.id).await.unwrap();
    let address = AddressForm::new(street.id, true, "14a").validated().unwrap();

    let db_a = db.clone();
    let db_b = db.clone();
    let addr_a = address.clone();
    let a = tokio::spawn(async move { db_a.settle_cart(user.id, &addr_a).await });
    let b = tokio::spawn(async move { db_b.settle_cart(user.id, &address).await });
    let (a, b) = (a.await.unwrap(), b.await.unwrap());

    let winners = [&a, &b].iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1, "Exactly one of the two submissions should settle");
    let loser = if a.is_err() { a.unwrap_err() } else { b.unwrap_err() };
    assert!(matches!(loser, SettlementError::EmptyCart), "unexpected error: {loser}");
    // The wallet was debited exactly once.
    assert_eq!(db.balance_for_user(user.id).await.unwrap(), "47.50".parse::<Money>().unwrap());
    tear_down(db).await;
}

#[tokio::test]
async fn concurrent_debits_never_overdraw() {
    let db = setup().await;
    let user = new_user(&db, "10.00").await;
    let amount = "7.00".parse::<Money>().unwrap();

    let db_a = db.clone();
    let db_b = db.clone();
    let a = tokio::spawn(async move { db_a.debit(user.id, amount).await });
    let b = tokio::spawn(async move { db_b.debit(user.id, amount).await });
    let (a, b) = (a.await.unwrap(), b.await.unwrap());

    let winners = [&a, &b].iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1, "Only one of the two debits can clear");
    let loser = if a.is_err() { a.unwrap_err() } else { b.unwrap_err() };
    assert!(matches!(loser, WalletError::InsufficientFunds { .. }));
    assert_eq!(db.balance_for_user(user.id).await.unwrap(), "3.00".parse::<Money>().unwrap());
    tear_down(db).await;
}
