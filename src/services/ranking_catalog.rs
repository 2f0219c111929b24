use std::sync::Arc;

use crate::{db::CatalogStore, error::AppResult, models::Ranking};

/// Source of the sentiment categories a review can be ranked into
///
/// Categories are re-read on every call; the set is small and may be edited
/// while the service runs.
#[derive(Clone)]
pub struct RankingCatalog {
    store: Arc<dyn CatalogStore>,
}

impl RankingCatalog {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    pub async fn load_categories(&self) -> AppResult<Vec<Ranking>> {
        let categories = self.store.find_rankings().await?;
        tracing::debug!(count = categories.len(), "Loaded ranking categories");
        Ok(categories)
    }
}
