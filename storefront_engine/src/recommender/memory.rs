use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use log::trace;

use super::{Recommender, RecommenderError};

/// An in-process co-purchase scorer.
///
/// Keeps one score map per product, keyed by the co-purchased product id. Clones share the same store, so a single
/// instance can be handed to every settlement worker.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecommender {
    scores: Arc<Mutex<HashMap<i64, HashMap<i64, u64>>>>,
}

impl MemoryRecommender {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<i64, HashMap<i64, u64>>>, RecommenderError> {
        self.scores.lock().map_err(|e: PoisonError<_>| RecommenderError::StoreError(e.to_string()))
    }
}

impl Recommender for MemoryRecommender {
    async fn record_purchase(&self, product_ids: &[i64]) -> Result<(), RecommenderError> {
        let mut scores = self.lock()?;
        for &a in product_ids {
            for &b in product_ids {
                if a == b {
                    continue;
                }
                *scores.entry(a).or_default().entry(b).or_default() += 1;
            }
        }
        trace!("⭐️ Co-purchase scores updated for {} product(s)", product_ids.len());
        Ok(())
    }

    async fn suggest_for(&self, product_ids: &[i64], max: usize) -> Result<Vec<i64>, RecommenderError> {
        let scores = self.lock()?;
        let mut merged: HashMap<i64, u64> = HashMap::new();
        for id in product_ids {
            if let Some(neighbours) = scores.get(id) {
                for (&other, &score) in neighbours {
                    if !product_ids.contains(&other) {
                        *merged.entry(other).or_default() += score;
                    }
                }
            }
        }
        let mut ranked: Vec<(i64, u64)> = merged.into_iter().collect();
        // Ties break on the lower product id so suggestions are stable.
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        Ok(ranked.into_iter().take(max).map(|(id, _)| id).collect())
    }
}
