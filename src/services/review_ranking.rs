use std::sync::Arc;

use crate::{
    db::{Cache, CacheKey, CatalogStore},
    error::{AppError, AppResult},
    models::ReviewOutcome,
    services::{ranking_catalog::RankingCatalog, sentiment::SentimentClassifier},
};

/// Turns an admin review into a stored ranking for one movie
///
/// Concurrent submissions for the same movie are not serialized; the last
/// write wins and no history is kept.
pub struct ReviewRankingService {
    catalog: RankingCatalog,
    classifier: SentimentClassifier,
    store: Arc<dyn CatalogStore>,
    cache: Option<Cache>,
}

impl ReviewRankingService {
    pub fn new(
        catalog: RankingCatalog,
        classifier: SentimentClassifier,
        store: Arc<dyn CatalogStore>,
        cache: Option<Cache>,
    ) -> Self {
        Self {
            catalog,
            classifier,
            store,
            cache,
        }
    }

    /// Classifies `review_text` and stores it with the resulting ranking.
    ///
    /// Makes one classification call and one write. The review text and the
    /// ranking are set by the same update, so a failure anywhere leaves the
    /// movie untouched.
    #[tracing::instrument(skip(self, review_text), fields(review_len = review_text.len()))]
    pub async fn submit_review(&self, imdb_id: &str, review_text: &str) -> AppResult<ReviewOutcome> {
        if imdb_id.trim().is_empty() {
            return Err(AppError::InvalidInput("Movie ID is required".to_string()));
        }
        if review_text.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Admin review cannot be empty".to_string(),
            ));
        }

        let categories = self.catalog.load_categories().await?;
        let ranking = self.classifier.classify(review_text, &categories).await?;

        let matched = self
            .store
            .update_review(imdb_id, review_text, &ranking)
            .await?;

        if matched == 0 {
            tracing::info!("Review submitted for unknown movie");
            return Err(AppError::NotFound(format!("Movie {} not found", imdb_id)));
        }

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.invalidate(&CacheKey::Movie(imdb_id.to_string())).await {
                tracing::warn!(error = %e, "Failed to invalidate cached movie");
            }
        }

        tracing::info!(
            ranking_name = %ranking.ranking_name,
            ranking_value = ranking.ranking_value,
            "Admin review stored"
        );

        Ok(ReviewOutcome {
            ranking_name: ranking.ranking_name,
            admin_review: review_text.to_string(),
        })
    }
}
