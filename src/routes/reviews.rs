use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{error::AppResult, models::ReviewOutcome, routes::AppState};

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub admin_review: String,
}

/// Handler for classifying and storing an admin review
pub async fn submit(
    State(state): State<Arc<AppState>>,
    Path(imdb_id): Path<String>,
    Json(request): Json<ReviewRequest>,
) -> AppResult<Json<ReviewOutcome>> {
    tracing::info!(
        imdb_id = %imdb_id,
        review_len = request.admin_review.len(),
        "Processing admin review"
    );

    let outcome = state
        .reviews
        .submit_review(&imdb_id, &request.admin_review)
        .await?;

    tracing::info!(ranking_name = %outcome.ranking_name, "Admin review ranked");

    Ok(Json(outcome))
}
