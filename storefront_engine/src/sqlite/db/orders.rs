use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{CartLine, Money, Order, OrderLine, OrderRef},
    order_objects::ShippingAddress,
};

/// Inserts the order row. This is not atomic on its own; settlement embeds this call inside a transaction together
/// with the line snapshots, the cart drain and the wallet debit.
pub(crate) async fn insert_order(
    user_id: i64,
    order_ref: &OrderRef,
    address: &ShippingAddress,
    total_price: Money,
    conn: &mut SqliteConnection,
) -> Result<Order, sqlx::Error> {
    let order: Order = sqlx::query_as(
        r#"
            INSERT INTO orders (
                order_ref,
                user_id,
                street_id,
                is_private,
                building,
                apartment,
                total_price
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *;
        "#,
    )
    .bind(order_ref.as_str())
    .bind(user_id)
    .bind(address.street_id)
    .bind(address.is_private)
    .bind(address.building.as_str())
    .bind(address.apartment.as_deref())
    .bind(total_price.value())
    .fetch_one(conn)
    .await?;
    debug!("🧾️ Order {} inserted with id {}", order.order_ref, order.id);
    Ok(order)
}

/// Freezes a cart line into an order line. Price and quantity are copied from the cart snapshot, never re-read from
/// the product row.
pub(crate) async fn insert_order_line(
    order_id: i64,
    line: &CartLine,
    conn: &mut SqliteConnection,
) -> Result<OrderLine, sqlx::Error> {
    let order_line = sqlx::query_as(
        r#"
            INSERT INTO order_lines (order_id, product_id, unit_price, quantity)
            VALUES ($1, $2, $3, $4)
            RETURNING *;
        "#,
    )
    .bind(order_id)
    .bind(line.product_id)
    .bind(line.unit_price.value())
    .bind(line.quantity)
    .fetch_one(conn)
    .await?;
    Ok(order_line)
}

pub(crate) async fn fetch_order_for_user(
    order_id: i64,
    user_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = $1 AND user_id = $2")
        .bind(order_id)
        .bind(user_id)
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

pub(crate) async fn orders_for_user(
    user_id: i64,
    pending_only: bool,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, sqlx::Error> {
    let sql = if pending_only {
        "SELECT * FROM orders WHERE user_id = $1 AND is_delivered = 0 ORDER BY created_at DESC, id DESC"
    } else {
        "SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
    };
    let orders = sqlx::query_as(sql).bind(user_id).fetch_all(conn).await?;
    Ok(orders)
}

/// Sets the delivered flag, scoped to the owner. The flag is monotonic: there is no SQL path that ever resets it,
/// and re-marking a delivered order rewrites the same value, which is what makes the operation idempotent.
/// Returns `None` when the order does not exist or belongs to another user.
pub(crate) async fn set_delivered(
    order_id: i64,
    user_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("UPDATE orders SET is_delivered = 1 WHERE id = $1 AND user_id = $2 RETURNING *")
        .bind(order_id)
        .bind(user_id)
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

pub(crate) async fn lines_for_order(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<OrderLine>, sqlx::Error> {
    let lines = sqlx::query_as("SELECT * FROM order_lines WHERE order_id = $1 ORDER BY id ASC")
        .bind(order_id)
        .fetch_all(conn)
        .await?;
    Ok(lines)
}

/// Retires the order line for the (order, product) pair, with the ownership check folded into the statement.
/// Returns the deleted line, or `None` when the order is missing, foreign, or holds no line for the product.
pub(crate) async fn retire_line(
    order_id: i64,
    product_id: i64,
    user_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<OrderLine>, sqlx::Error> {
    let line = sqlx::query_as(
        r#"
            DELETE FROM order_lines
            WHERE order_id = $1 AND product_id = $2
              AND EXISTS (SELECT 1 FROM orders WHERE id = $1 AND user_id = $3)
            RETURNING *
        "#,
    )
    .bind(order_id)
    .bind(product_id)
    .bind(user_id)
    .fetch_optional(conn)
    .await?;
    Ok(line)
}
