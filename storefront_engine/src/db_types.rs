use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};

pub use sfe_common::Money;

//--------------------------------------      OrderRef       ---------------------------------------------------------

/// The opaque reference under which an order is exposed to the outside world (URLs, emails, support tickets).
/// Internal surrogate ids never leave the engine.
#[derive(Debug, Clone, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct OrderRef(pub String);

impl Display for OrderRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<String> for OrderRef {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for OrderRef {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl OrderRef {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------      Category       ---------------------------------------------------------

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

//--------------------------------------       Street        ---------------------------------------------------------

/// Address reference data. Order forms may only reference streets that exist here.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Street {
    pub id: i64,
    pub name: String,
}

//--------------------------------------       Product       ---------------------------------------------------------

/// A catalog product. `count` is the authoritative stock quantity and is only ever changed through the inventory
/// ledger operations, which keep it non-negative.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub category_id: i64,
    pub name: String,
    pub image: Option<String>,
    pub price: Money,
    pub count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub category_id: i64,
    pub name: String,
    pub image: Option<String>,
    pub price: Money,
    pub count: i64,
}

impl NewProduct {
    pub fn new<S: Into<String>>(category_id: i64, name: S, price: Money, count: i64) -> Self {
        Self { category_id, name: name.into(), image: None, price, count }
    }

    pub fn with_image<S: Into<String>>(mut self, image: S) -> Self {
        self.image = Some(image.into());
        self
    }
}

//--------------------------------------     UserAccount     ---------------------------------------------------------

/// The wallet projection of a storefront user. Registration, authentication and profile data live in the
/// (out-of-scope) account layer; the engine only ever touches the balance.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: i64,
    pub balance: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------      CartLine       ---------------------------------------------------------

/// One product in a user's cart. There is at most one line per (user, product) pair.
///
/// `unit_price` is a snapshot taken when the product was first added; later catalog price changes do not
/// retroactively change the cart total.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CartLine {
    pub id: i64,
    pub user_id: i64,
    pub product_id: i64,
    pub unit_price: Money,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
}

impl CartLine {
    /// The cost of this line: unit price times quantity.
    pub fn line_cost(&self) -> Money {
        self.unit_price * self.quantity
    }
}

//--------------------------------------        Order        ---------------------------------------------------------

/// An immutable, settled order. Once created, only `is_delivered` may change, and only from `false` to `true`.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub order_ref: OrderRef,
    pub user_id: i64,
    pub street_id: i64,
    pub is_private: bool,
    pub building: String,
    pub apartment: Option<String>,
    pub total_price: Money,
    pub is_delivered: bool,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------      OrderLine      ---------------------------------------------------------

/// A (product, price, quantity) snapshot frozen into an order at settlement time. It is decoupled from the live
/// product row from that point on. The row is deleted when feedback is recorded for the product within its order,
/// which is how "awaiting feedback" is tracked.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub unit_price: Money,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
}

impl OrderLine {
    pub fn line_cost(&self) -> Money {
        self.unit_price * self.quantity
    }
}

//--------------------------------------      Feedback       ---------------------------------------------------------

/// A rating (0-5) with an optional free-text review, left by a user for a product from a delivered order.
/// The review text can later be cleared by its author; the rating record persists.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Feedback {
    pub id: i64,
    pub user_id: i64,
    pub product_id: i64,
    pub rating: i64,
    pub review: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// The inclusive range of valid feedback ratings.
pub const RATING_RANGE: std::ops::RangeInclusive<i64> = 0..=5;
