use thiserror::Error;

use crate::db_types::{Feedback, Order, OrderLine};

/// Fulfilment tracking for settled orders: the one-way `Pending -> Delivered` transition, and per-product feedback
/// that retires the matching order line from the "awaiting feedback" set.
///
/// All ownership failures surface as *not found* rather than *forbidden*, so that probing with foreign ids does not
/// confirm the existence of other users' orders or feedback.
#[allow(async_fn_in_trait)]
pub trait FulfillmentTracking {
    /// Marks the order as delivered. Idempotent: a delivered order stays delivered and repeated calls have no
    /// further side effects. The order must belong to `user_id`.
    async fn mark_delivered(&self, order_id: i64, user_id: i64) -> Result<Order, FulfillmentError>;

    /// Records feedback for a product of an order and retires the matching order line, as a single atomic
    /// step. Fails with [`FulfillmentError::OrderNotFound`] if the order does not belong to the user or if no order
    /// line for the product remains (i.e. feedback was already given).
    async fn submit_feedback(
        &self,
        order_id: i64,
        user_id: i64,
        product_id: i64,
        rating: i64,
        review: Option<String>,
    ) -> Result<Feedback, FulfillmentError>;

    /// Blanks the review text of the feedback, keeping the rating record. Author-only; clearing an already blank
    /// review is a no-op. Returns the updated feedback.
    async fn clear_review(&self, feedback_id: i64, user_id: i64) -> Result<Feedback, FulfillmentError>;

    /// The user's orders, newest first. With `pending_only`, only orders not yet delivered are returned.
    async fn orders_for_user(&self, user_id: i64, pending_only: bool) -> Result<Vec<Order>, FulfillmentError>;

    /// Fetches a single order, scoped to its owner.
    async fn fetch_order(&self, order_id: i64, user_id: i64) -> Result<Option<Order>, FulfillmentError>;

    /// The order lines that have not yet been retired by feedback.
    async fn lines_awaiting_feedback(&self, order_id: i64) -> Result<Vec<OrderLine>, FulfillmentError>;

    /// The mean rating of the product over all feedback, or `None` if there is none yet.
    async fn average_rating(&self, product_id: i64) -> Result<Option<f64>, FulfillmentError>;
}

#[derive(Debug, Clone, Error)]
pub enum FulfillmentError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    /// The order does not exist, belongs to another user, or holds no line for the requested product.
    #[error("The requested order {0} does not exist")]
    OrderNotFound(i64),
    /// The feedback does not exist or belongs to another user.
    #[error("The requested feedback {0} does not exist")]
    FeedbackNotFound(i64),
    #[error("Ratings must be between 0 and 5, got {0}")]
    InvalidRating(i64),
}

impl From<sqlx::Error> for FulfillmentError {
    fn from(e: sqlx::Error) -> Self {
        FulfillmentError::DatabaseError(e.to_string())
    }
}
