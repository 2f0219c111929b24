//! Document store for rankings, movies and user genre preferences.

use sqlx::PgPool;
use std::future::Future;
use std::time::Duration;

use crate::{
    error::{AppError, AppResult},
    models::{Movie, Ranking, UserPreferences},
};

/// Storage collaborator used by the ranking and recommendation services
///
/// Implementations own their own call timeouts; callers treat any error as a
/// storage failure and never retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogStore: Send + Sync {
    /// Every stored sentiment category, in no particular order
    async fn find_rankings(&self) -> AppResult<Vec<Ranking>>;

    /// Every movie, ordered by IMDB ID
    async fn find_all_movies(&self) -> AppResult<Vec<Movie>>;

    async fn find_movie(&self, imdb_id: &str) -> AppResult<Option<Movie>>;

    /// Inserts a new movie; an existing IMDB ID is a conflict
    async fn insert_movie(&self, movie: &Movie) -> AppResult<()>;

    /// Movies carrying at least one of `genres`, in no particular order
    async fn find_movies_by_genres(&self, genres: &[String]) -> AppResult<Vec<Movie>>;

    /// Sets the review text and ranking in a single write.
    ///
    /// Returns the number of matched movies (0 or 1).
    async fn update_review(
        &self,
        imdb_id: &str,
        admin_review: &str,
        ranking: &Ranking,
    ) -> AppResult<u64>;

    /// `None` when the user has no stored preferences
    async fn find_user_preferences(&self, user_id: &str) -> AppResult<Option<UserPreferences>>;
}

const MOVIE_COLUMNS: &str = "imdb_id, title, poster_path, youtube_id, genres, \
                             admin_review, ranking_name, ranking_value";

#[derive(Debug, sqlx::FromRow)]
struct MovieRow {
    imdb_id: String,
    title: String,
    poster_path: Option<String>,
    youtube_id: Option<String>,
    genres: Vec<String>,
    admin_review: Option<String>,
    ranking_name: Option<String>,
    ranking_value: Option<i32>,
}

impl TryFrom<MovieRow> for Movie {
    type Error = AppError;

    fn try_from(row: MovieRow) -> AppResult<Self> {
        let ranking = match (row.ranking_name, row.ranking_value) {
            (Some(name), Some(value)) => Some(Ranking::new(name, value)),
            (None, None) => None,
            _ => {
                return Err(AppError::Storage(format!(
                    "movie {} has an incomplete ranking",
                    row.imdb_id
                )))
            }
        };

        Ok(Movie {
            imdb_id: row.imdb_id,
            title: row.title,
            poster_path: row.poster_path,
            youtube_id: row.youtube_id,
            genres: row.genres.into_iter().collect(),
            admin_review: row.admin_review,
            ranking,
        })
    }
}

fn decode_movies(rows: Vec<MovieRow>) -> AppResult<Vec<Movie>> {
    rows.into_iter().map(Movie::try_from).collect()
}

/// PostgreSQL-backed catalog store
#[derive(Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
    timeout: Duration,
}

impl PgCatalogStore {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    /// Runs a query, abandoning it once the configured timeout elapses
    async fn bounded<T, F>(&self, operation: &'static str, query: F) -> AppResult<T>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.timeout, query).await {
            Ok(result) => result.map_err(AppError::from),
            Err(_) => {
                tracing::warn!(
                    operation,
                    timeout_secs = self.timeout.as_secs(),
                    "Store call timed out"
                );
                Err(AppError::Storage(format!("{} timed out", operation)))
            }
        }
    }
}

#[async_trait::async_trait]
impl CatalogStore for PgCatalogStore {
    async fn find_rankings(&self) -> AppResult<Vec<Ranking>> {
        self.bounded(
            "find_rankings",
            sqlx::query_as::<_, Ranking>("SELECT ranking_name, ranking_value FROM rankings")
                .fetch_all(&self.pool),
        )
        .await
    }

    async fn find_all_movies(&self) -> AppResult<Vec<Movie>> {
        let sql = format!("SELECT {} FROM movies ORDER BY imdb_id", MOVIE_COLUMNS);
        let rows = self
            .bounded(
                "find_all_movies",
                sqlx::query_as::<_, MovieRow>(&sql).fetch_all(&self.pool),
            )
            .await?;
        decode_movies(rows)
    }

    async fn find_movie(&self, imdb_id: &str) -> AppResult<Option<Movie>> {
        let sql = format!("SELECT {} FROM movies WHERE imdb_id = $1", MOVIE_COLUMNS);
        let row = self
            .bounded(
                "find_movie",
                sqlx::query_as::<_, MovieRow>(&sql)
                    .bind(imdb_id)
                    .fetch_optional(&self.pool),
            )
            .await?;
        row.map(Movie::try_from).transpose()
    }

    async fn insert_movie(&self, movie: &Movie) -> AppResult<()> {
        let genres: Vec<String> = movie.genres.iter().cloned().collect();
        let result = self
            .bounded(
                "insert_movie",
                sqlx::query(
                    r#"
                    INSERT INTO movies (imdb_id, title, poster_path, youtube_id, genres)
                    VALUES ($1, $2, $3, $4, $5)
                    "#,
                )
                .bind(&movie.imdb_id)
                .bind(&movie.title)
                .bind(&movie.poster_path)
                .bind(&movie.youtube_id)
                .bind(genres)
                .execute(&self.pool),
            )
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(AppError::Database(sqlx::Error::Database(db_err)))
                if db_err.is_unique_violation() =>
            {
                Err(AppError::Conflict(format!(
                    "movie {} already exists",
                    movie.imdb_id
                )))
            }
            Err(e) => Err(e),
        }
    }

    async fn find_movies_by_genres(&self, genres: &[String]) -> AppResult<Vec<Movie>> {
        let sql = format!("SELECT {} FROM movies WHERE genres && $1", MOVIE_COLUMNS);
        let rows = self
            .bounded(
                "find_movies_by_genres",
                sqlx::query_as::<_, MovieRow>(&sql)
                    .bind(genres.to_vec())
                    .fetch_all(&self.pool),
            )
            .await?;
        decode_movies(rows)
    }

    async fn update_review(
        &self,
        imdb_id: &str,
        admin_review: &str,
        ranking: &Ranking,
    ) -> AppResult<u64> {
        let result = self
            .bounded(
                "update_review",
                sqlx::query(
                    r#"
                    UPDATE movies
                    SET admin_review = $2, ranking_name = $3, ranking_value = $4
                    WHERE imdb_id = $1
                    "#,
                )
                .bind(imdb_id)
                .bind(admin_review)
                .bind(&ranking.ranking_name)
                .bind(ranking.ranking_value)
                .execute(&self.pool),
            )
            .await?;

        Ok(result.rows_affected())
    }

    async fn find_user_preferences(&self, user_id: &str) -> AppResult<Option<UserPreferences>> {
        self.bounded(
            "find_user_preferences",
            sqlx::query_as::<_, UserPreferences>(
                "SELECT user_id, favourite_genres FROM users WHERE user_id = $1",
            )
            .bind(user_id)
            .fetch_optional(&self.pool),
        )
        .await
    }
}
