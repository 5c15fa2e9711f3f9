use thiserror::Error;

use crate::{
    db_types::{Money, Order, OrderLine},
    order_objects::ShippingAddress,
    traits::{CartError, CartManagement, CatalogManagement, FulfillmentTracking, InventoryManagement, WalletError, WalletManagement},
};

/// This trait defines the highest level of behaviour for backends supporting the settlement engine.
///
/// The central contract is [`SettlementDatabase::settle_cart`]: the one place in the system where the cart, the
/// wallet and the order tables are mutated together, and the step whose atomicity the whole design hinges on.
#[allow(async_fn_in_trait)]
pub trait SettlementDatabase:
    Clone + CatalogManagement + InventoryManagement + CartManagement + WalletManagement + FulfillmentTracking
{
    /// The URL of the database.
    fn url(&self) -> &str;

    /// Converts the user's cart into an immutable order, in a single all-or-nothing transaction:
    ///
    /// 1. The user's cart lines are drained and captured (a consistent snapshot). An empty cart is rejected with
    ///    [`SettlementError::EmptyCart`].
    /// 2. The delivery street must exist, else [`SettlementError::InvalidAddress`].
    /// 3. The total is the sum of the *snapshotted* line prices, never re-read from the product rows.
    /// 4. The wallet is debited by the total; a balance lower than the total rejects the settlement with
    ///    [`SettlementError::InsufficientFunds`]. A balance exactly equal to the total is affordable.
    /// 5. The order row and one order line per captured cart line are inserted.
    ///
    /// Stock is **not** touched here. Inventory was already reserved when the lines entered the cart
    /// (the reserve-at-add-time policy); decrementing it again at settlement would oversubtract.
    ///
    /// Any failure inside the transaction rolls the whole step back: no order, no lines, no cart deletion, no debit.
    ///
    /// Returns the created order together with its line snapshots, so callers need no follow-up read to learn what
    /// was settled.
    async fn settle_cart(
        &self,
        user_id: i64,
        address: &ShippingAddress,
    ) -> Result<(Order, Vec<OrderLine>), SettlementError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), SettlementError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum SettlementError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("The cart is empty")]
    EmptyCart,
    #[error("Insufficient funds: the cart total of {total} exceeds the available balance of {available}")]
    InsufficientFunds { total: Money, available: Money },
    #[error("Invalid delivery address: {0}")]
    InvalidAddress(String),
    #[error("{0}")]
    Cart(#[from] CartError),
    #[error("{0}")]
    Wallet(#[from] WalletError),
}

impl From<sqlx::Error> for SettlementError {
    fn from(e: sqlx::Error) -> Self {
        SettlementError::DatabaseError(e.to_string())
    }
}
