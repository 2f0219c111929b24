//! Genre-based movie recommendations ordered by admin ranking.

use std::sync::Arc;

use crate::{db::CatalogStore, error::AppResult, models::Movie};

/// Keeps movies sharing a genre with `favourite_genres`, best rank first.
///
/// Unranked movies sort with the sentinel value. Equal ranks fall back to
/// IMDB ID ascending so the output does not depend on store order.
pub fn select_recommendations(
    movies: Vec<Movie>,
    favourite_genres: &[String],
    limit: usize,
) -> Vec<Movie> {
    let mut selected: Vec<Movie> = movies
        .into_iter()
        .filter(|movie| movie.matches_any_genre(favourite_genres))
        .collect();

    selected.sort_by(|a, b| {
        a.rank_order()
            .cmp(&b.rank_order())
            .then_with(|| a.imdb_id.cmp(&b.imdb_id))
    });
    selected.truncate(limit);
    selected
}

pub struct RecommendationEngine {
    store: Arc<dyn CatalogStore>,
}

impl RecommendationEngine {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Favourite genres for `user_id`; a user without stored preferences has none
    async fn favourite_genres(&self, user_id: &str) -> AppResult<Vec<String>> {
        let genres = self
            .store
            .find_user_preferences(user_id)
            .await?
            .map(|prefs| prefs.favourite_genres)
            .unwrap_or_default();
        Ok(genres)
    }

    /// Up to `limit` movies in the user's favourite genres, best ranked first
    #[tracing::instrument(skip(self))]
    pub async fn recommend(&self, user_id: &str, limit: usize) -> AppResult<Vec<Movie>> {
        let favourite_genres = self.favourite_genres(user_id).await?;

        if favourite_genres.is_empty() {
            tracing::info!("No favourite genres, nothing to recommend");
            return Ok(Vec::new());
        }

        let candidates = self.store.find_movies_by_genres(&favourite_genres).await?;
        let candidate_count = candidates.len();
        let recommended = select_recommendations(candidates, &favourite_genres, limit);

        tracing::info!(
            genres = ?favourite_genres,
            candidates = candidate_count,
            returned = recommended.len(),
            "Recommendations selected"
        );

        Ok(recommended)
    }
}
