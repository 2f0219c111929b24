use std::sync::Arc;

use crate::{
    cached,
    db::{Cache, CacheKey, CatalogStore},
    error::{AppError, AppResult},
    models::{Movie, NewMovie},
};

const MOVIE_CACHE_TTL: u64 = 300; // 5 minutes

/// Read and ingest operations over the movie catalog
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
    cache: Option<Cache>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore>, cache: Option<Cache>) -> Self {
        Self { store, cache }
    }

    pub async fn list_movies(&self) -> AppResult<Vec<Movie>> {
        let movies = self.store.find_all_movies().await?;
        tracing::debug!(count = movies.len(), "Listed movies");
        Ok(movies)
    }

    pub async fn get_movie(&self, imdb_id: &str) -> AppResult<Movie> {
        if imdb_id.trim().is_empty() {
            return Err(AppError::InvalidInput("Movie ID is required".to_string()));
        }

        cached!(
            self.cache.as_ref(),
            CacheKey::Movie(imdb_id.to_string()),
            MOVIE_CACHE_TTL,
            async {
                self.store
                    .find_movie(imdb_id)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("Movie {} not found", imdb_id)))
            }
        )
    }

    /// Adds an unranked movie to the catalog
    pub async fn add_movie(&self, new_movie: NewMovie) -> AppResult<Movie> {
        validate_new_movie(&new_movie)?;

        let movie = Movie::from(new_movie);
        self.store.insert_movie(&movie).await?;

        tracing::info!(
            imdb_id = %movie.imdb_id,
            genres = movie.genres.len(),
            "Movie added to catalog"
        );

        Ok(movie)
    }
}

fn validate_new_movie(movie: &NewMovie) -> AppResult<()> {
    if movie.imdb_id.trim().is_empty() {
        return Err(AppError::InvalidInput("imdb_id is required".to_string()));
    }
    if movie.title.trim().is_empty() {
        return Err(AppError::InvalidInput("title is required".to_string()));
    }
    if movie.genres.is_empty() || movie.genres.iter().any(|g| g.trim().is_empty()) {
        return Err(AppError::InvalidInput(
            "at least one non-empty genre is required".to_string(),
        ));
    }
    Ok(())
}
