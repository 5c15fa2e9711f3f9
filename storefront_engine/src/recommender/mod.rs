//! Co-purchase recommendations.
//!
//! The recommender is a best-effort collaborator of the settlement pipeline. Settlement reports the product ids of
//! every completed order via [`Recommender::record_purchase`]; a failure there is logged and swallowed, never
//! surfaced to the buyer. [`NoopRecommender`] is the default and keeps the engine fully functional for deployments
//! that do not want recommendations at all.
mod memory;

use thiserror::Error;

pub use memory::MemoryRecommender;

#[derive(Debug, Clone, Error)]
pub enum RecommenderError {
    #[error("The recommendation store is unavailable. {0}")]
    StoreError(String),
}

#[allow(async_fn_in_trait)]
pub trait Recommender {
    /// Records that the given products were bought together, bumping the pairwise co-purchase score of every
    /// distinct pair in the slice.
    async fn record_purchase(&self, product_ids: &[i64]) -> Result<(), RecommenderError>;

    /// Returns up to `max` product ids most often co-purchased with the given products, best score first. The input
    /// products themselves are never suggested.
    async fn suggest_for(&self, product_ids: &[i64], max: usize) -> Result<Vec<i64>, RecommenderError>;
}

/// A recommender that records nothing and suggests nothing.
#[derive(Debug, Clone, Default)]
pub struct NoopRecommender;

impl Recommender for NoopRecommender {
    async fn record_purchase(&self, _product_ids: &[i64]) -> Result<(), RecommenderError> {
        Ok(())
    }

    async fn suggest_for(&self, _product_ids: &[i64], _max: usize) -> Result<Vec<i64>, RecommenderError> {
        Ok(Vec::new())
    }
}
