use thiserror::Error;

/// The inventory ledger. It owns `Product.count`, the authoritative stock quantity.
///
/// Both operations must execute their read-modify-write step atomically at the storage layer. Two callers racing for
/// the last unit of stock must serialise on the product row: the loser observes [`InventoryError::OutOfStock`],
/// never a negative count.
#[allow(async_fn_in_trait)]
pub trait InventoryManagement {
    /// Decrements the stock of the product by `qty`. Fails with [`InventoryError::OutOfStock`] if the resulting
    /// quantity would go negative, leaving the count unchanged.
    async fn reserve_stock(&self, product_id: i64, qty: i64) -> Result<(), InventoryError>;

    /// Increments the stock of the product by `qty`. Used when cart lines are decremented or removed.
    async fn release_stock(&self, product_id: i64, qty: i64) -> Result<(), InventoryError>;

    /// The current stock quantity of the product.
    async fn stock_on_hand(&self, product_id: i64) -> Result<i64, InventoryError>;
}

#[derive(Debug, Clone, Error)]
pub enum InventoryError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("The requested product {0} does not exist")]
    ProductNotFound(i64),
    #[error("Insufficient stock of product {0}")]
    OutOfStock(i64),
}

impl From<sqlx::Error> for InventoryError {
    fn from(e: sqlx::Error) -> Self {
        InventoryError::DatabaseError(e.to_string())
    }
}
