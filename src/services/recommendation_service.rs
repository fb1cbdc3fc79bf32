use crate::database::sqlite::SqliteDatabase;
use crate::errors::{AppError, Result};
use crate::models::interaction::UserProductInteraction;
use crate::models::product::ProductView;
use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

pub const MAX_RECOMMENDATIONS: usize = 50;

/// Turns interaction history into an ordered list of product ids.
pub trait RecommendationStrategy: Send + Sync {
    fn rank(
        &self,
        user_id: i64,
        events: &[UserProductInteraction],
        catalog: &[i64],
        limit: usize,
    ) -> Vec<i64>;
}

/// Co-interaction filtering. Products the user has not touched are scored by
/// how strongly overlapping users interacted with them, then by overall
/// popularity, then by id. Unscored products still trail the list.
#[derive(Debug, Default, Clone, Copy)]
pub struct PeerInteractionStrategy;

impl RecommendationStrategy for PeerInteractionStrategy {
    fn rank(
        &self,
        user_id: i64,
        events: &[UserProductInteraction],
        catalog: &[i64],
        limit: usize,
    ) -> Vec<i64> {
        let mut products_by_user: HashMap<i64, HashSet<i64>> = HashMap::new();
        let mut popularity: HashMap<i64, u64> = HashMap::new();
        for event in events {
            products_by_user.entry(event.user).or_default().insert(event.product);
            *popularity.entry(event.product).or_default() += event.interaction_type.weight();
        }

        let seen = products_by_user.remove(&user_id).unwrap_or_default();

        let peer_weights: HashMap<i64, u64> = products_by_user
            .iter()
            .filter_map(|(&peer, products)| {
                let overlap = products.intersection(&seen).count() as u64;
                (overlap > 0).then_some((peer, overlap))
            })
            .collect();

        let mut peer_scores: HashMap<i64, u64> = HashMap::new();
        for event in events {
            if seen.contains(&event.product) {
                continue;
            }
            if let Some(weight) = peer_weights.get(&event.user) {
                *peer_scores.entry(event.product).or_default() += weight * event.interaction_type.weight();
            }
        }

        let mut candidates: Vec<(i64, u64, u64)> = catalog
            .iter()
            .copied()
            .filter(|id| !seen.contains(id))
            .map(|id| {
                (
                    id,
                    peer_scores.get(&id).copied().unwrap_or(0),
                    popularity.get(&id).copied().unwrap_or(0),
                )
            })
            .collect();
        candidates.sort_by_key(|&(id, peer, popular)| (Reverse(peer), Reverse(popular), id));

        debug!(
            action = "rank_recommendations",
            user_id = user_id,
            peers = peer_weights.len(),
            candidates = candidates.len()
        );
        candidates.into_iter().take(limit).map(|(id, _, _)| id).collect()
    }
}

pub struct RecommendationService {
    db: Arc<SqliteDatabase>,
    strategy: Arc<dyn RecommendationStrategy>,
    default_limit: usize,
}

impl RecommendationService {
    pub fn new(db: Arc<SqliteDatabase>, strategy: Arc<dyn RecommendationStrategy>, default_limit: usize) -> Self {
        Self { db, strategy, default_limit }
    }

    pub async fn recommend_for_user(&self, user_id: i64, limit: Option<usize>) -> Result<Vec<ProductView>> {
        if self.db.get_user_by_id(user_id).await?.is_none() {
            return Err(AppError::UserNotFound);
        }

        let limit = limit.unwrap_or(self.default_limit).clamp(1, MAX_RECOMMENDATIONS);
        let events = self.db.list_all_interactions().await?;
        let catalog = self.db.list_published_product_ids().await?;
        let ranked = self.strategy.rank(user_id, &events, &catalog, limit);

        let mut by_id: HashMap<i64, ProductView> = self
            .db
            .list_products_by_ids(&ranked)
            .await?
            .into_iter()
            .map(|product| (product.id, ProductView::from(product)))
            .collect();
        let products: Vec<ProductView> = ranked.iter().filter_map(|id| by_id.remove(id)).collect();

        info!(action = "recommendations_served", user_id = user_id, count = products.len());
        Ok(products)
    }
}
