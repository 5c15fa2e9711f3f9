//! Unified API for turning carts into orders.

use std::fmt::Debug;

use log::*;

use crate::{
    db_types::Order,
    recommender::{NoopRecommender, Recommender, RecommenderError},
    sfe_api::order_objects::AddressForm,
    traits::{SettlementDatabase, SettlementError},
};

/// The `SettlementApi` drives the cart-to-order pipeline: address validation, the atomic settlement transaction in
/// the backend, and the best-effort report to the co-purchase recommender.
///
/// The recommender defaults to [`NoopRecommender`]; settlement is fully functional without one.
pub struct SettlementApi<B, R = NoopRecommender> {
    db: B,
    recommender: R,
}

impl<B: Debug, R> Debug for SettlementApi<B, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SettlementApi ({:?})", self.db)
    }
}

impl<B> SettlementApi<B>
where B: SettlementDatabase
{
    pub fn new(db: B) -> Self {
        Self { db, recommender: NoopRecommender }
    }
}

impl<B, R> SettlementApi<B, R>
where
    B: SettlementDatabase,
    R: Recommender,
{
    pub fn new_with_recommender(db: B, recommender: R) -> Self {
        Self { db, recommender }
    }

    /// Settles the user's cart into an order delivered to the given address.
    ///
    /// The address form is validated first; a malformed form fails with [`SettlementError::InvalidAddress`] before
    /// anything touches the database. The settlement itself is a single transaction in the backend. Afterwards the
    /// ordered product ids are reported to the recommender; a recommender failure is logged and swallowed, the
    /// order stands regardless.
    pub async fn place_order(&self, user_id: i64, address: AddressForm) -> Result<Order, SettlementError> {
        let address = address.validated().map_err(SettlementError::InvalidAddress)?;
        let (order, lines) = self.db.settle_cart(user_id, &address).await?;
        info!("🧾️ Order {} placed by user #{user_id} for {}", order.order_ref, order.total_price);
        let product_ids = lines.iter().map(|l| l.product_id).collect::<Vec<i64>>();
        if let Err(e) = self.recommender.record_purchase(&product_ids).await {
            warn!("⭐️ Could not record co-purchase scores for order {}: {e}", order.order_ref);
        }
        Ok(order)
    }

    /// Products most often bought together with the given ones, best match first.
    pub async fn suggestions(&self, product_ids: &[i64], max: usize) -> Result<Vec<i64>, RecommenderError> {
        self.recommender.suggest_for(product_ids, max).await
    }
}
