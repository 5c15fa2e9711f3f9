use thiserror::Error;

use crate::db_types::{Money, UserAccount};

/// The user wallet. The balance is only ever changed by single atomic increments and decrements at the storage
/// layer, and can never go negative.
///
/// The settlement engine is the only debtor; [`WalletManagement::credit`] backs the (out-of-scope) "add funds" flow
/// and exists so that top-ups share the same atomicity guarantees.
#[allow(async_fn_in_trait)]
pub trait WalletManagement {
    /// Creates a new wallet account with the given opening balance. Account identity is otherwise owned by the
    /// account layer; the engine only stores the balance.
    async fn create_account(&self, opening_balance: Money) -> Result<UserAccount, WalletError>;

    /// The current balance of the user's wallet.
    async fn balance_for_user(&self, user_id: i64) -> Result<Money, WalletError>;

    /// Atomically decrements the balance by `amount`. Fails with [`WalletError::InsufficientFunds`] if the amount
    /// exceeds the current balance, leaving the balance unchanged. Returns the new balance.
    async fn debit(&self, user_id: i64, amount: Money) -> Result<Money, WalletError>;

    /// Atomically increments the balance by `amount`. Returns the new balance.
    async fn credit(&self, user_id: i64, amount: Money) -> Result<Money, WalletError>;
}

#[derive(Debug, Clone, Error)]
pub enum WalletError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("The requested account {0} does not exist")]
    AccountNotFound(i64),
    #[error("Insufficient funds: {required} is required but only {available} is available")]
    InsufficientFunds { required: Money, available: Money },
    #[error("Wallet amounts must not be negative: {0}")]
    InvalidAmount(Money),
}

impl From<sqlx::Error> for WalletError {
    fn from(e: sqlx::Error) -> Self {
        WalletError::DatabaseError(e.to_string())
    }
}
