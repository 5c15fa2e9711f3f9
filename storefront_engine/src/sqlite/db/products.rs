use log::{debug, trace};
use sqlx::SqliteConnection;

use crate::{
    db_types::{Category, Money, NewProduct, Product, Street},
    traits::{CatalogError, InventoryError},
};

pub(crate) async fn insert_category(name: &str, conn: &mut SqliteConnection) -> Result<Category, CatalogError> {
    let category = sqlx::query_as("INSERT INTO categories (name) VALUES ($1) RETURNING *")
        .bind(name)
        .fetch_one(conn)
        .await?;
    Ok(category)
}

pub(crate) async fn insert_street(name: &str, conn: &mut SqliteConnection) -> Result<Street, CatalogError> {
    let street =
        sqlx::query_as("INSERT INTO streets (name) VALUES ($1) RETURNING *").bind(name).fetch_one(conn).await?;
    Ok(street)
}

pub(crate) async fn insert_product(product: NewProduct, conn: &mut SqliteConnection) -> Result<Product, CatalogError> {
    let product: Product = sqlx::query_as(
        r#"
            INSERT INTO products (category_id, name, image, price, count)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(product.category_id)
    .bind(product.name)
    .bind(product.image)
    .bind(product.price.value())
    .bind(product.count)
    .fetch_one(conn)
    .await?;
    debug!("📦️ Product '{}' inserted with id {}", product.name, product.id);
    Ok(product)
}

pub(crate) async fn update_price(
    product_id: i64,
    new_price: Money,
    conn: &mut SqliteConnection,
) -> Result<Product, CatalogError> {
    let product: Option<Product> = sqlx::query_as(
        "UPDATE products SET price = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 RETURNING *",
    )
    .bind(new_price.value())
    .bind(product_id)
    .fetch_optional(conn)
    .await?;
    product.ok_or(CatalogError::ProductNotFound(product_id))
}

pub(crate) async fn fetch_product(product_id: i64, conn: &mut SqliteConnection) -> Result<Option<Product>, sqlx::Error> {
    let product = sqlx::query_as("SELECT * FROM products WHERE id = $1").bind(product_id).fetch_optional(conn).await?;
    Ok(product)
}

pub(crate) async fn fetch_street(street_id: i64, conn: &mut SqliteConnection) -> Result<Option<Street>, sqlx::Error> {
    let street = sqlx::query_as("SELECT * FROM streets WHERE id = $1").bind(street_id).fetch_optional(conn).await?;
    Ok(street)
}

/// Atomically reserves `qty` units of stock. The decrement and the non-negativity check are a single guarded UPDATE,
/// so concurrent callers serialise on the product row and the loser of a race for the last unit sees
/// [`InventoryError::OutOfStock`] rather than a negative count.
pub(crate) async fn reserve_stock(
    product_id: i64,
    qty: i64,
    conn: &mut SqliteConnection,
) -> Result<(), InventoryError> {
    let result = sqlx::query(
        "UPDATE products SET count = count - $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 AND count >= $1",
    )
    .bind(qty)
    .bind(product_id)
    .execute(&mut *conn)
    .await?;
    if result.rows_affected() == 0 {
        return match fetch_product(product_id, conn).await? {
            Some(_) => Err(InventoryError::OutOfStock(product_id)),
            None => Err(InventoryError::ProductNotFound(product_id)),
        };
    }
    trace!("📦️ Reserved {qty} unit(s) of product #{product_id}");
    Ok(())
}

/// Releases `qty` units of stock back to the product.
pub(crate) async fn release_stock(
    product_id: i64,
    qty: i64,
    conn: &mut SqliteConnection,
) -> Result<(), InventoryError> {
    let result =
        sqlx::query("UPDATE products SET count = count + $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2")
            .bind(qty)
            .bind(product_id)
            .execute(conn)
            .await?;
    if result.rows_affected() == 0 {
        return Err(InventoryError::ProductNotFound(product_id));
    }
    trace!("📦️ Released {qty} unit(s) of product #{product_id}");
    Ok(())
}

pub(crate) async fn stock_on_hand(product_id: i64, conn: &mut SqliteConnection) -> Result<i64, InventoryError> {
    let product = fetch_product(product_id, conn).await?.ok_or(InventoryError::ProductNotFound(product_id))?;
    Ok(product.count)
}
