use log::{debug, trace};
use sqlx::SqliteConnection;

use crate::{
    db_types::{Money, UserAccount},
    traits::WalletError,
};

pub(crate) async fn create_account(
    opening_balance: Money,
    conn: &mut SqliteConnection,
) -> Result<UserAccount, WalletError> {
    if opening_balance.is_negative() {
        return Err(WalletError::InvalidAmount(opening_balance));
    }
    let account: UserAccount = sqlx::query_as("INSERT INTO users (balance) VALUES ($1) RETURNING *")
        .bind(opening_balance.value())
        .fetch_one(conn)
        .await?;
    debug!("🧑️ Created wallet account #{} with opening balance {}", account.id, account.balance);
    Ok(account)
}

pub(crate) async fn fetch_account(
    user_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<UserAccount>, sqlx::Error> {
    let account = sqlx::query_as("SELECT * FROM users WHERE id = $1").bind(user_id).fetch_optional(conn).await?;
    Ok(account)
}

/// Atomically debits the account. The decrement and the affordability check are a single guarded UPDATE, so a
/// concurrent debit can never drive the balance negative.
pub(crate) async fn debit(user_id: i64, amount: Money, conn: &mut SqliteConnection) -> Result<Money, WalletError> {
    if amount.is_negative() {
        return Err(WalletError::InvalidAmount(amount));
    }
    let new_balance: Option<i64> = sqlx::query_scalar(
        r#"
            UPDATE users SET balance = balance - $1, updated_at = CURRENT_TIMESTAMP
            WHERE id = $2 AND balance >= $1
            RETURNING balance
        "#,
    )
    .bind(amount.value())
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await?;
    match new_balance {
        Some(balance) => {
            trace!("💰️ Debited {amount} from account #{user_id}. New balance: {}", Money::from(balance));
            Ok(Money::from(balance))
        },
        None => match fetch_account(user_id, conn).await? {
            Some(account) => Err(WalletError::InsufficientFunds { required: amount, available: account.balance }),
            None => Err(WalletError::AccountNotFound(user_id)),
        },
    }
}

pub(crate) async fn credit(user_id: i64, amount: Money, conn: &mut SqliteConnection) -> Result<Money, WalletError> {
    if amount.is_negative() {
        return Err(WalletError::InvalidAmount(amount));
    }
    let new_balance: Option<i64> = sqlx::query_scalar(
        "UPDATE users SET balance = balance + $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 RETURNING balance",
    )
    .bind(amount.value())
    .bind(user_id)
    .fetch_optional(conn)
    .await?;
    let balance = new_balance.ok_or(WalletError::AccountNotFound(user_id))?;
    trace!("💰️ Credited {amount} to account #{user_id}. New balance: {}", Money::from(balance));
    Ok(Money::from(balance))
}
