use log::trace;
use sqlx::SqliteConnection;

use crate::db_types::{CartLine, Money};

/// Inserts the (user, product) cart line with quantity 1, or bumps the quantity of the existing line by one.
/// The unit price is only written on insert, so the price snapshot taken at first add survives later increments.
pub(crate) async fn upsert_line(
    user_id: i64,
    product_id: i64,
    unit_price: Money,
    conn: &mut SqliteConnection,
) -> Result<CartLine, sqlx::Error> {
    let line: CartLine = sqlx::query_as(
        r#"
            INSERT INTO cart_lines (user_id, product_id, unit_price, quantity)
            VALUES ($1, $2, $3, 1)
            ON CONFLICT (user_id, product_id) DO UPDATE SET quantity = quantity + 1
            RETURNING *;
        "#,
    )
    .bind(user_id)
    .bind(product_id)
    .bind(unit_price.value())
    .fetch_one(conn)
    .await?;
    trace!("🛒️ Cart line {} for user #{user_id} is now at quantity {}", line.id, line.quantity);
    Ok(line)
}

/// Fetches a cart line scoped to its owner. A line belonging to another user is indistinguishable from a missing
/// one.
pub(crate) async fn fetch_line_for_user(
    line_id: i64,
    user_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<CartLine>, sqlx::Error> {
    let line = sqlx::query_as("SELECT * FROM cart_lines WHERE id = $1 AND user_id = $2")
        .bind(line_id)
        .bind(user_id)
        .fetch_optional(conn)
        .await?;
    Ok(line)
}

/// Bumps the line quantity by one, scoped to the owner. Returns the new quantity and the product id, or `None` when
/// the line does not exist or belongs to another user.
pub(crate) async fn increment_quantity(
    line_id: i64,
    user_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<(i64, i64)>, sqlx::Error> {
    let row = sqlx::query_as(
        "UPDATE cart_lines SET quantity = quantity + 1 WHERE id = $1 AND user_id = $2 RETURNING quantity, product_id",
    )
    .bind(line_id)
    .bind(user_id)
    .fetch_optional(conn)
    .await?;
    Ok(row)
}

/// Drops the line quantity by one, scoped to the owner and guarded so the quantity can never go below 1. Returns
/// the new quantity and the product id; `None` means the line is missing, foreign, or already at quantity 1, and
/// nothing was changed.
pub(crate) async fn decrement_quantity(
    line_id: i64,
    user_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<(i64, i64)>, sqlx::Error> {
    let row = sqlx::query_as(
        r#"
            UPDATE cart_lines SET quantity = quantity - 1
            WHERE id = $1 AND user_id = $2 AND quantity > 1
            RETURNING quantity, product_id
        "#,
    )
    .bind(line_id)
    .bind(user_id)
    .fetch_optional(conn)
    .await?;
    Ok(row)
}

/// Deletes the cart line, scoped to the owner. Returns the product id and quantity it held, so the caller can
/// release the reserved stock.
pub(crate) async fn delete_line(
    line_id: i64,
    user_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<(i64, i64)>, sqlx::Error> {
    let row = sqlx::query_as("DELETE FROM cart_lines WHERE id = $1 AND user_id = $2 RETURNING product_id, quantity")
        .bind(line_id)
        .bind(user_id)
        .fetch_optional(conn)
        .await?;
    Ok(row)
}

pub(crate) async fn lines_for_user(user_id: i64, conn: &mut SqliteConnection) -> Result<Vec<CartLine>, sqlx::Error> {
    let lines = sqlx::query_as("SELECT * FROM cart_lines WHERE user_id = $1 ORDER BY created_at DESC, id DESC")
        .bind(user_id)
        .fetch_all(conn)
        .await?;
    Ok(lines)
}

/// Deletes all cart lines of the user and returns them. Settlement issues this as the *first* statement of its
/// transaction: the drain both captures the lines to be settled and takes the write lock up front.
pub(crate) async fn drain_cart(user_id: i64, conn: &mut SqliteConnection) -> Result<Vec<CartLine>, sqlx::Error> {
    let lines = sqlx::query_as("DELETE FROM cart_lines WHERE user_id = $1 RETURNING *")
        .bind(user_id)
        .fetch_all(conn)
        .await?;
    Ok(lines)
}
