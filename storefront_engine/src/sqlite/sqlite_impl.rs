//! `SqliteDatabase` is a concrete implementation of a storefront settlement engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`crate::traits`]
//! module. Every multi-statement mutation runs inside a single transaction obtained from the pool, and every change
//! to a contended column (stock count, wallet balance, line quantity) is a single guarded UPDATE, so the
//! non-negativity invariants hold under concurrent requests.
//!
//! The *first* statement of every transaction here is a write on one of the rows being mutated. SQLite rejects a
//! read-to-write upgrade inside a transaction whose snapshot has gone stale (`SQLITE_BUSY_SNAPSHOT`), without
//! consulting the busy timeout. Writing first means concurrent transactions queue on the busy timeout at the write
//! lock instead, and any reads that follow see the serialised state.
use std::fmt::Debug;

use log::*;
use sqlx::SqlitePool;

use super::db::{cart, db_url, feedback, new_pool, orders, products, wallet};
use crate::{
    db_types::{Category, CartLine, Feedback, Money, NewProduct, Order, OrderLine, Product, Street, UserAccount, RATING_RANGE},
    helpers::new_order_ref,
    order_objects::ShippingAddress,
    traits::{
        CartError,
        CartManagement,
        CatalogError,
        CatalogManagement,
        FulfillmentError,
        FulfillmentTracking,
        InventoryError,
        InventoryManagement,
        SettlementDatabase,
        SettlementError,
        WalletError,
        WalletManagement,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object using the URL from the environment (or the default).
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl CatalogManagement for SqliteDatabase {
    async fn insert_category(&self, name: &str) -> Result<Category, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        products::insert_category(name, &mut conn).await
    }

    async fn insert_street(&self, name: &str) -> Result<Street, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        products::insert_street(name, &mut conn).await
    }

    async fn insert_product(&self, product: NewProduct) -> Result<Product, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        products::insert_product(product, &mut conn).await
    }

    async fn update_price(&self, product_id: i64, new_price: Money) -> Result<Product, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        products::update_price(product_id, new_price, &mut conn).await
    }

    async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::fetch_product(product_id, &mut conn).await?;
        Ok(product)
    }

    async fn fetch_street(&self, street_id: i64) -> Result<Option<Street>, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        let street = products::fetch_street(street_id, &mut conn).await?;
        Ok(street)
    }
}

impl InventoryManagement for SqliteDatabase {
    async fn reserve_stock(&self, product_id: i64, qty: i64) -> Result<(), InventoryError> {
        let mut conn = self.pool.acquire().await?;
        products::reserve_stock(product_id, qty, &mut conn).await
    }

    async fn release_stock(&self, product_id: i64, qty: i64) -> Result<(), InventoryError> {
        let mut conn = self.pool.acquire().await?;
        products::release_stock(product_id, qty, &mut conn).await
    }

    async fn stock_on_hand(&self, product_id: i64) -> Result<i64, InventoryError> {
        let mut conn = self.pool.acquire().await?;
        products::stock_on_hand(product_id, &mut conn).await
    }
}

impl CartManagement for SqliteDatabase {
    /// Reserves one unit of stock and upserts the (user, product) cart line in one transaction.
    ///
    /// The reservation is the transaction's first statement, so two requests racing for the last unit serialise on
    /// the guarded stock UPDATE, and the loser rolls back without ever touching the cart.
    async fn add_product(&self, user_id: i64, product_id: i64) -> Result<CartLine, CartError> {
        let mut tx = self.pool.begin().await?;
        products::reserve_stock(product_id, 1, &mut tx).await?;
        let product = products::fetch_product(product_id, &mut tx)
            .await?
            .ok_or(CartError::Inventory(InventoryError::ProductNotFound(product_id)))?;
        let line = cart::upsert_line(user_id, product_id, product.price, &mut tx).await?;
        tx.commit().await?;
        debug!("🛒️ User #{user_id} added product #{product_id} to cart (quantity {})", line.quantity);
        Ok(line)
    }

    /// The quantity bump is the transaction's first statement; the stock reservation follows and rolls the bump
    /// back if the product has run out.
    async fn increment_line(&self, user_id: i64, line_id: i64) -> Result<i64, CartError> {
        let mut tx = self.pool.begin().await?;
        let (quantity, product_id) = cart::increment_quantity(line_id, user_id, &mut tx)
            .await?
            .ok_or(CartError::LineNotFound(line_id))?;
        products::reserve_stock(product_id, 1, &mut tx).await?;
        tx.commit().await?;
        debug!("🛒️ Cart line {line_id} incremented to quantity {quantity}");
        Ok(quantity)
    }

    async fn decrement_line(&self, user_id: i64, line_id: i64) -> Result<i64, CartError> {
        let mut tx = self.pool.begin().await?;
        match cart::decrement_quantity(line_id, user_id, &mut tx).await? {
            Some((quantity, product_id)) => {
                products::release_stock(product_id, 1, &mut tx).await?;
                tx.commit().await?;
                debug!("🛒️ Cart line {line_id} decremented to quantity {quantity}");
                Ok(quantity)
            },
            // Either the line is at quantity 1 (a defined no-op) or it does not belong to this user.
            None => match cart::fetch_line_for_user(line_id, user_id, &mut tx).await? {
                Some(_) => {
                    debug!("🛒️ Cart line {line_id} is at quantity 1; decrement is a no-op");
                    Ok(1)
                },
                None => Err(CartError::LineNotFound(line_id)),
            },
        }
    }

    async fn remove_line(&self, user_id: i64, line_id: i64) -> Result<(), CartError> {
        let mut tx = self.pool.begin().await?;
        let (product_id, quantity) =
            cart::delete_line(line_id, user_id, &mut tx).await?.ok_or(CartError::LineNotFound(line_id))?;
        products::release_stock(product_id, quantity, &mut tx).await?;
        tx.commit().await?;
        debug!("🛒️ Cart line {line_id} removed; {quantity} unit(s) of product #{product_id} released");
        Ok(())
    }

    async fn cart_for_user(&self, user_id: i64) -> Result<Vec<CartLine>, CartError> {
        let mut conn = self.pool.acquire().await?;
        let lines = cart::lines_for_user(user_id, &mut conn).await?;
        Ok(lines)
    }
}

impl WalletManagement for SqliteDatabase {
    async fn create_account(&self, opening_balance: Money) -> Result<UserAccount, WalletError> {
        let mut conn = self.pool.acquire().await?;
        wallet::create_account(opening_balance, &mut conn).await
    }

    async fn balance_for_user(&self, user_id: i64) -> Result<Money, WalletError> {
        let mut conn = self.pool.acquire().await?;
        let account = wallet::fetch_account(user_id, &mut conn).await?.ok_or(WalletError::AccountNotFound(user_id))?;
        Ok(account.balance)
    }

    async fn debit(&self, user_id: i64, amount: Money) -> Result<Money, WalletError> {
        let mut conn = self.pool.acquire().await?;
        wallet::debit(user_id, amount, &mut conn).await
    }

    async fn credit(&self, user_id: i64, amount: Money) -> Result<Money, WalletError> {
        let mut conn = self.pool.acquire().await?;
        wallet::credit(user_id, amount, &mut conn).await
    }
}

impl FulfillmentTracking for SqliteDatabase {
    /// A single owner-scoped UPDATE; setting the flag on an already delivered order rewrites the same value, which
    /// is what makes repeated calls harmless.
    async fn mark_delivered(&self, order_id: i64, user_id: i64) -> Result<Order, FulfillmentError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::set_delivered(order_id, user_id, &mut conn)
            .await?
            .ok_or(FulfillmentError::OrderNotFound(order_id))?;
        debug!("🚚️ Order {} marked as delivered", order.order_ref);
        Ok(order)
    }

    /// Retires the matching order line and records the feedback row in one transaction, so a line can never be
    /// retired without its feedback (or vice versa). The retirement is the transaction's first statement and folds
    /// in the ownership check.
    async fn submit_feedback(
        &self,
        order_id: i64,
        user_id: i64,
        product_id: i64,
        rating: i64,
        review: Option<String>,
    ) -> Result<Feedback, FulfillmentError> {
        if !RATING_RANGE.contains(&rating) {
            return Err(FulfillmentError::InvalidRating(rating));
        }
        let mut tx = self.pool.begin().await?;
        // A retired line, a foreign order and a missing order deliberately share the same outcome.
        orders::retire_line(order_id, product_id, user_id, &mut tx)
            .await?
            .ok_or(FulfillmentError::OrderNotFound(order_id))?;
        let feedback = feedback::insert_feedback(user_id, product_id, rating, review.as_deref(), &mut tx).await?;
        tx.commit().await?;
        debug!("⭐️ Feedback recorded for product #{product_id} on order #{order_id}; line retired");
        Ok(feedback)
    }

    async fn clear_review(&self, feedback_id: i64, user_id: i64) -> Result<Feedback, FulfillmentError> {
        let mut conn = self.pool.acquire().await?;
        let feedback = feedback::clear_review_text(feedback_id, user_id, &mut conn)
            .await?
            .ok_or(FulfillmentError::FeedbackNotFound(feedback_id))?;
        Ok(feedback)
    }

    async fn orders_for_user(&self, user_id: i64, pending_only: bool) -> Result<Vec<Order>, FulfillmentError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::orders_for_user(user_id, pending_only, &mut conn).await?;
        Ok(orders)
    }

    async fn fetch_order(&self, order_id: i64, user_id: i64) -> Result<Option<Order>, FulfillmentError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_for_user(order_id, user_id, &mut conn).await?;
        Ok(order)
    }

    async fn lines_awaiting_feedback(&self, order_id: i64) -> Result<Vec<OrderLine>, FulfillmentError> {
        let mut conn = self.pool.acquire().await?;
        let lines = orders::lines_for_order(order_id, &mut conn).await?;
        Ok(lines)
    }

    async fn average_rating(&self, product_id: i64) -> Result<Option<f64>, FulfillmentError> {
        let mut conn = self.pool.acquire().await?;
        let average = feedback::average_rating(product_id, &mut conn).await?;
        Ok(average)
    }
}

impl SettlementDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Takes the user's current cart and, in a single atomic transaction,
    /// * drains the cart, capturing the lines to settle (the transaction's first statement, a DELETE ... RETURNING),
    /// * validates that the delivery street exists,
    /// * computes the total from the snapshotted cart prices,
    /// * debits the wallet (the guarded UPDATE doubles as the affordability check),
    /// * creates the order row and one order line per cart line.
    ///
    /// Inventory is deliberately not touched: stock was reserved when the lines entered the cart.
    async fn settle_cart(
        &self,
        user_id: i64,
        address: &ShippingAddress,
    ) -> Result<(Order, Vec<OrderLine>), SettlementError> {
        let mut tx = self.pool.begin().await?;
        let lines = cart::drain_cart(user_id, &mut tx).await?;
        if lines.is_empty() {
            return Err(SettlementError::EmptyCart);
        }
        let street = products::fetch_street(address.street_id, &mut tx)
            .await?
            .ok_or_else(|| SettlementError::InvalidAddress(format!("street {} does not exist", address.street_id)))?;
        let total: Money = lines.iter().map(CartLine::line_cost).sum();
        wallet::debit(user_id, total, &mut tx).await.map_err(|e| match e {
            WalletError::InsufficientFunds { available, .. } => SettlementError::InsufficientFunds { total, available },
            other => SettlementError::Wallet(other),
        })?;
        let order_ref = new_order_ref();
        let order = orders::insert_order(user_id, &order_ref, address, total, &mut tx).await?;
        let mut order_lines = Vec::with_capacity(lines.len());
        for line in &lines {
            order_lines.push(orders::insert_order_line(order.id, line, &mut tx).await?);
        }
        tx.commit().await?;
        debug!(
            "🧾️ Order {} settled for user #{user_id}: {} line(s) totalling {total}, delivery to {} street",
            order.order_ref,
            order_lines.len(),
            street.name
        );
        Ok((order, order_lines))
    }

    async fn close(&mut self) -> Result<(), SettlementError> {
        self.pool.close().await;
        Ok(())
    }
}
