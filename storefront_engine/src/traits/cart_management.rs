use thiserror::Error;

use crate::{db_types::CartLine, traits::InventoryError};

/// The cart store. Every mutation here moves inventory in lockstep with the cart line, inside a single transaction:
/// adding or incrementing reserves stock, decrementing or removing releases it.
///
/// Decrementing a line that is already at quantity 1 is a defined no-op, not an error; removal is a separate,
/// explicit operation. Callers of the no-op observe the unchanged quantity.
#[allow(async_fn_in_trait)]
pub trait CartManagement {
    /// Gets-or-creates the user's cart line for the product and reserves one unit of stock, atomically.
    ///
    /// On create, the current product price is snapshotted into the line and the quantity is 1; on an existing line
    /// the quantity is incremented. If the product is out of stock the cart is left untouched and
    /// [`InventoryError::OutOfStock`] is returned (via [`CartError::Inventory`]).
    async fn add_product(&self, user_id: i64, product_id: i64) -> Result<CartLine, CartError>;

    /// Increments the quantity of an existing cart line by one, reserving one unit of stock atomically.
    /// Returns the new quantity.
    async fn increment_line(&self, user_id: i64, line_id: i64) -> Result<i64, CartError>;

    /// Decrements the quantity of an existing cart line by one, releasing one unit of stock atomically.
    /// A line at quantity 1 is left unchanged (no-op). Returns the (possibly unchanged) quantity.
    async fn decrement_line(&self, user_id: i64, line_id: i64) -> Result<i64, CartError>;

    /// Deletes the cart line, releasing its full quantity back to inventory, atomically.
    async fn remove_line(&self, user_id: i64, line_id: i64) -> Result<(), CartError>;

    /// All cart lines of the user, newest first.
    async fn cart_for_user(&self, user_id: i64) -> Result<Vec<CartLine>, CartError>;
}

#[derive(Debug, Clone, Error)]
pub enum CartError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    /// A cart line that does not exist, or that belongs to another user. The two cases are deliberately
    /// indistinguishable so that line ids do not leak across users.
    #[error("The requested cart line {0} does not exist")]
    LineNotFound(i64),
    #[error("{0}")]
    Inventory(#[from] InventoryError),
}

impl From<sqlx::Error> for CartError {
    fn from(e: sqlx::Error) -> Self {
        CartError::DatabaseError(e.to_string())
    }
}
