use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{Movie, NewMovie},
    routes::AppState,
};

/// Handler for listing the whole catalog
pub async fn list(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<Movie>>> {
    let movies = state.catalog.list_movies().await?;
    Ok(Json(movies))
}

/// Handler for a single movie by IMDB ID
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(imdb_id): Path<String>,
) -> AppResult<Json<Movie>> {
    let movie = state.catalog.get_movie(&imdb_id).await?;
    Ok(Json(movie))
}

/// Handler for adding a movie to the catalog
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(request): Json<NewMovie>,
) -> AppResult<(StatusCode, Json<Movie>)> {
    let movie = state.catalog.add_movie(request).await?;
    Ok((StatusCode::CREATED, Json(movie)))
}
