//! Unified API for post-settlement order tracking and feedback.

use std::fmt::Debug;

use crate::{
    db_types::{Feedback, Order, OrderLine},
    traits::{FulfillmentError, FulfillmentTracking},
};

pub struct FulfillmentApi<B> {
    db: B,
}

impl<B: Debug> Debug for FulfillmentApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FulfillmentApi ({:?})", self.db)
    }
}

impl<B> FulfillmentApi<B>
where B: FulfillmentTracking
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Marks the order as delivered. Delivery is idempotent and monotonic; marking a delivered order again returns
    /// it unchanged.
    pub async fn mark_delivered(&self, order_id: i64, user_id: i64) -> Result<Order, FulfillmentError> {
        self.db.mark_delivered(order_id, user_id).await
    }

    /// Records feedback for a product on the order and retires the matching order line, so each line accepts
    /// feedback exactly once.
    pub async fn submit_feedback(
        &self,
        order_id: i64,
        user_id: i64,
        product_id: i64,
        rating: i64,
        review: Option<String>,
    ) -> Result<Feedback, FulfillmentError> {
        self.db.submit_feedback(order_id, user_id, product_id, rating, review).await
    }

    /// Blanks the review text of the feedback, keeping the rating. Only the author can do this.
    pub async fn clear_review(&self, feedback_id: i64, user_id: i64) -> Result<Feedback, FulfillmentError> {
        self.db.clear_review(feedback_id, user_id).await
    }

    /// The user's orders, newest first. With `pending_only`, only orders not yet delivered.
    pub async fn orders_for_user(&self, user_id: i64, pending_only: bool) -> Result<Vec<Order>, FulfillmentError> {
        self.db.orders_for_user(user_id, pending_only).await
    }

    /// The order together with the lines that have not received feedback yet. `None` when the order does not exist
    /// or belongs to another user.
    pub async fn order_detail(
        &self,
        order_id: i64,
        user_id: i64,
    ) -> Result<Option<(Order, Vec<OrderLine>)>, FulfillmentError> {
        let Some(order) = self.db.fetch_order(order_id, user_id).await? else {
            return Ok(None);
        };
        let lines = self.db.lines_awaiting_feedback(order_id).await?;
        Ok(Some((order, lines)))
    }

    /// The mean rating over all feedback for the product, or `None` when there is none yet.
    pub async fn average_rating(&self, product_id: i64) -> Result<Option<f64>, FulfillmentError> {
        self.db.average_rating(product_id).await
    }
}
