use storefront_engine::{
    db_types::Money,
    order_objects::AddressForm,
    recommender::MemoryRecommender,
    CartApi,
    CatalogManagement,
    FulfillmentTracking,
    InventoryManagement,
    SettlementApi,
    SettlementError,
    WalletManagement,
};

mod support;
use support::{new_user, seed_catalog, setup, tear_down};

#[tokio::test]
async fn a_cart_settles_into_an_order() {
    let db = setup().await;
    let (street, products) = seed_catalog(&db).await;
    let user = new_user(&db, "120.00").await;
    let cart = CartApi::new(db.clone());
    let settlement = SettlementApi::new(db.clone());

    let teabags = &products[0];
    let whisky = &products[1];
    let line = cart.add_product(user.id, teabags.id).await.unwrap();
    cart.increment(user.id, line.id).await.unwrap();
    cart.add_product(user.id, whisky.id).await.unwrap();

    let address = AddressForm::new(street.id, true, "14a");
    let order = settlement.place_order(user.id, address).await.unwrap();
    // 2 x 2.50 + 100.00
    assert_eq!(order.total_price, "105.00".parse::<Money>().unwrap());
    assert!(!order.is_delivered);
    assert_eq!(order.street_id, street.id);

    // The wallet was debited, the cart drained, and the order lines froze the cart contents.
    assert_eq!(db.balance_for_user(user.id).await.unwrap(), "15.00".parse::<Money>().unwrap());
    assert!(cart.snapshot(user.id).await.unwrap().is_empty());
    let lines = db.lines_awaiting_feedback(order.id).await.unwrap();
    assert_eq!(lines.len(), 2);
    let teabag_line = lines.iter().find(|l| l.product_id == teabags.id).unwrap();
    assert_eq!(teabag_line.quantity, 2);
    assert_eq!(teabag_line.unit_price, teabags.price);
    // Stock was reserved at add time; settlement does not touch it again.
    assert_eq!(db.stock_on_hand(teabags.id).await.unwrap(), 8);
    assert_eq!(db.stock_on_hand(whisky.id).await.unwrap(), 4);
    tear_down(db).await;
}

#[tokio::test]
async fn an_empty_cart_cannot_settle() {
    let db = setup().await;
    let (street, _products) = seed_catalog(&db).await;
    let user = new_user(&db, "120.00").await;
    let settlement = SettlementApi::new(db.clone());

    let address = AddressForm::new(street.id, true, "14a");
    let err = settlement.place_order(user.id, address).await.unwrap_err();
    assert!(matches!(err, SettlementError::EmptyCart));
    assert_eq!(db.balance_for_user(user.id).await.unwrap(), "120.00".parse::<Money>().unwrap());
    tear_down(db).await;
}

#[tokio::test]
async fn insufficient_funds_roll_the_settlement_back() {
    let db = setup().await;
    let (street, products) = seed_catalog(&db).await;
    let user = new_user(&db, "99.99").await;
    let cart = CartApi::new(db.clone());
    let settlement = SettlementApi::new(db.clone());

    let whisky = &products[1];
    cart.add_product(user.id, whisky.id).await.unwrap();
    let address = AddressForm::new(street.id, true, "14a");
    let err = settlement.place_order(user.id, address).await.unwrap_err();
    let (total, available) = match err {
        SettlementError::InsufficientFunds { total, available } => (total, available),
        other => panic!("Expected InsufficientFunds, got {other}"),
    };
    assert_eq!(total, whisky.price);
    assert_eq!(available, "99.99".parse::<Money>().unwrap());

    // Nothing changed: balance, cart and reservation are all intact.
    assert_eq!(db.balance_for_user(user.id).await.unwrap(), available);
    assert_eq!(cart.snapshot(user.id).await.unwrap().lines.len(), 1);
    assert_eq!(db.stock_on_hand(whisky.id).await.unwrap(), 4);
    assert!(db.orders_for_user(user.id, false).await.unwrap().is_empty());
    tear_down(db).await;
}

#[tokio::test]
async fn an_exact_balance_is_affordable() {
    let db = setup().await;
    let (street, products) = seed_catalog(&db).await;
    let user = new_user(&db, "100.00").await;
    let cart = CartApi::new(db.clone());
    let settlement = SettlementApi::new(db.clone());

    cart.add_product(user.id, products[1].id).await.unwrap();
    let address = AddressForm::new(street.id, false, "7").with_apartment("22");
    let order = settlement.place_order(user.id, address).await.unwrap();
    assert_eq!(order.total_price, "100.00".parse::<Money>().unwrap());
    assert_eq!(db.balance_for_user(user.id).await.unwrap(), Money::default());
    tear_down(db).await;
}

#[tokio::test]
async fn malformed_addresses_are_rejected_before_settlement() {
    let db = setup().await;
    let (street, products) = seed_catalog(&db).await;
    let user = new_user(&db, "100.00").await;
    let cart = CartApi::new(db.clone());
    let settlement = SettlementApi::new(db.clone());
    cart.add_product(user.id, products[0].id).await.unwrap();

    // A private house with an apartment number, and an apartment building without one.
    for form in [
        AddressForm::new(street.id, true, "14a").with_apartment("3"),
        AddressForm::new(street.id, false, "7"),
    ] {
        let err = settlement.place_order(user.id, form).await.unwrap_err();
        assert!(matches!(err, SettlementError::InvalidAddress(_)));
    }
    // The cart is still intact and the wallet untouched.
    assert_eq!(cart.snapshot(user.id).await.unwrap().lines.len(), 1);
    assert_eq!(db.balance_for_user(user.id).await.unwrap(), "100.00".parse::<Money>().unwrap());
    tear_down(db).await;
}

#[tokio::test]
async fn an_unknown_street_is_an_invalid_address() {
    let db = setup().await;
    let (_street, products) = seed_catalog(&db).await;
    let user = new_user(&db, "100.00").await;
    let cart = CartApi::new(db.clone());
    let settlement = SettlementApi::new(db.clone());
    cart.add_product(user.id, products[0].id).await.unwrap();

    let address = AddressForm::new(999, true, "14a");
    let err = settlement.place_order(user.id, address).await.unwrap_err();
    assert!(matches!(err, SettlementError::InvalidAddress(_)));
    tear_down(db).await;
}

#[tokio::test]
async fn orders_settle_at_the_price_captured_in_the_cart() {
    let db = setup().await;
    let (street, products) = seed_catalog(&db).await;
    let user = new_user(&db, "10.00").await;
    let cart = CartApi::new(db.clone());
    let settlement = SettlementApi::new(db.clone());

    let teabags = &products[0];
    cart.add_product(user.id, teabags.id).await.unwrap();
    // The price changes between add and checkout; the buyer pays what the cart promised.
    db.update_price(teabags.id, "999.00".parse::<Money>().unwrap()).await.unwrap();

    let address = AddressForm::new(street.id, true, "14a");
    let order = settlement.place_order(user.id, address).await.unwrap();
    assert_eq!(order.total_price, teabags.price);
    tear_down(db).await;
}

#[tokio::test]
async fn settled_orders_feed_the_recommender() {
    let db = setup().await;
    let (street, products) = seed_catalog(&db).await;
    let user = new_user(&db, "200.00").await;
    let cart = CartApi::new(db.clone());
    let recommender = MemoryRecommender::new();
    let settlement = SettlementApi::new_with_recommender(db.clone(), recommender);

    let teabags = &products[0];
    let whisky = &products[1];
    cart.add_product(user.id, teabags.id).await.unwrap();
    cart.add_product(user.id, whisky.id).await.unwrap();
    let address = AddressForm::new(street.id, true, "14a");
    settlement.place_order(user.id, address).await.unwrap();

    let suggestions = settlement.suggestions(&[teabags.id], 5).await.unwrap();
    assert_eq!(suggestions, vec![whisky.id]);
    tear_down(db).await;
}
