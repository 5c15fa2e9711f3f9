use thiserror::Error;

use crate::db_types::{Category, Money, NewProduct, Product, Street};

/// The seam to the (out-of-scope) catalog and admin layer: insertion and lookup of the reference data the
/// settlement core depends on.
///
/// There is deliberately no product deletion here. Cart and order lines reference products, and orphaning order
/// history is worse than carrying a retired product row.
#[allow(async_fn_in_trait)]
pub trait CatalogManagement {
    async fn insert_category(&self, name: &str) -> Result<Category, CatalogError>;

    async fn insert_street(&self, name: &str) -> Result<Street, CatalogError>;

    async fn insert_product(&self, product: NewProduct) -> Result<Product, CatalogError>;

    /// Changes the catalog price of a product. Existing cart and order lines keep their snapshotted prices.
    async fn update_price(&self, product_id: i64, new_price: Money) -> Result<Product, CatalogError>;

    async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, CatalogError>;

    async fn fetch_street(&self, street_id: i64) -> Result<Option<Street>, CatalogError>;
}

#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("The requested product {0} does not exist")]
    ProductNotFound(i64),
}

impl From<sqlx::Error> for CatalogError {
    fn from(e: sqlx::Error) -> Self {
        CatalogError::DatabaseError(e.to_string())
    }
}
