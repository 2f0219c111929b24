use axum::{extract::State, Json};
use std::sync::Arc;

use crate::{
    error::AppResult, middleware::user_id::UserId, models::Movie, routes::AppState,
};

/// Handler for the caller's personal recommendations
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    UserId(user_id): UserId,
) -> AppResult<Json<Vec<Movie>>> {
    let movies = state
        .recommendations
        .recommend(&user_id, state.recommended_movies_limit)
        .await?;
    Ok(Json(movies))
}
