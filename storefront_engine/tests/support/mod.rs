#![allow(dead_code)]

use log::*;
use sqlx::{migrate, migrate::MigrateDatabase, Sqlite};
use storefront_engine::{
    db_types::{Money, NewProduct, Product, Street, UserAccount},
    CatalogManagement,
    SettlementDatabase,
    SqliteDatabase,
    WalletManagement,
};

pub async fn prepare_test_env(url: &str) {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    debug!("🚀️ Logging initialised");
    create_database(url).await;
    run_migrations(url).await;
}

pub fn random_db_path() -> String {
    let dir = std::env::temp_dir();
    format!("sqlite://{}/sfe_test_{}.db", dir.display(), rand::random::<u64>())
}

pub async fn create_database(url: &str) {
    if let Err(e) = Sqlite::drop_database(url).await {
        warn!("Error dropping database {url}: {e:?}");
    }
    Sqlite::create_database(url).await.expect("Error creating database");
    info!("Created Sqlite database {url}");
}

pub async fn run_migrations(url: &str) {
    let db = SqliteDatabase::new_with_url(url, 1).await.expect("Error creating connection to database");
    migrate!("./migrations").run(db.pool()).await.expect("Error running DB migrations");
    info!("🚀️ Migrations complete");
}

pub async fn setup() -> SqliteDatabase {
    let url = random_db_path();
    prepare_test_env(&url).await;
    SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database")
}

pub async fn tear_down(mut db: SqliteDatabase) {
    let url = db.url().to_string();
    if let Err(e) = db.close().await {
        error!("🚀️ Failed to close database: {e}");
    }
    Sqlite::drop_database(&url).await.expect("Error dropping database");
}

/// Seeds a category, a street and three products. The returned products are:
/// * a cheap one (2.50, 10 in stock),
/// * a pricey one (100.00, 5 in stock),
/// * a scarce one (15.00, 1 in stock).
pub async fn seed_catalog(db: &SqliteDatabase) -> (Street, Vec<Product>) {
    let category = db.insert_category("Groceries").await.expect("Error creating category");
    let street = db.insert_street("Baker street").await.expect("Error creating street");
    let mut products = Vec::with_capacity(3);
    for (name, price, count) in
        [("Teabags", "2.50", 10), ("Single malt", "100.00", 5), ("Last croissant", "15.00", 1)]
    {
        let price: Money = price.parse().expect("Error parsing price");
        let product = db
            .insert_product(NewProduct::new(category.id, name, price, count))
            .await
            .expect("Error creating product");
        products.push(product);
    }
    (street, products)
}

pub async fn new_user(db: &SqliteDatabase, opening_balance: &str) -> UserAccount {
    let balance: Money = opening_balance.parse().expect("Error parsing balance");
    db.create_account(balance).await.expect("Error creating user account")
}
