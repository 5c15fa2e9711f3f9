//! Unified API for cart manipulation.

use std::fmt::Debug;

use crate::{
    db_types::CartLine,
    sfe_api::order_objects::CartSnapshot,
    traits::{CartError, CartManagement},
};

/// The `CartApi` wraps a storage backend and exposes the cart operations a storefront needs. Stock accounting is
/// handled inside the backend: adding to a cart reserves a unit, removing releases it.
pub struct CartApi<B> {
    db: B,
}

impl<B: Debug> Debug for CartApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CartApi ({:?})", self.db)
    }
}

impl<B> CartApi<B>
where B: CartManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Adds one unit of the product to the user's cart, creating the cart line if needed. Fails with
    /// [`CartError::Inventory`] when the product has no stock left.
    pub async fn add_product(&self, user_id: i64, product_id: i64) -> Result<CartLine, CartError> {
        self.db.add_product(user_id, product_id).await
    }

    /// Bumps the quantity of the given cart line by one, reserving another unit of stock. Returns the new quantity.
    pub async fn increment(&self, user_id: i64, line_id: i64) -> Result<i64, CartError> {
        self.db.increment_line(user_id, line_id).await
    }

    /// Drops the quantity of the given cart line by one, releasing a unit of stock. A line at quantity 1 is left
    /// unchanged; use [`CartApi::remove`] to take it out of the cart entirely. Returns the resulting quantity.
    pub async fn decrement(&self, user_id: i64, line_id: i64) -> Result<i64, CartError> {
        self.db.decrement_line(user_id, line_id).await
    }

    /// Removes the cart line and releases all stock it held.
    pub async fn remove(&self, user_id: i64, line_id: i64) -> Result<(), CartError> {
        self.db.remove_line(user_id, line_id).await
    }

    /// Returns the user's cart lines together with the total they would settle for right now.
    pub async fn snapshot(&self, user_id: i64) -> Result<CartSnapshot, CartError> {
        let lines = self.db.cart_for_user(user_id).await?;
        Ok(CartSnapshot::new(user_id, lines))
    }
}
