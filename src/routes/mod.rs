use axum::{
    body::Body,
    extract::Request,
    http::{header, HeaderName, Method, StatusCode},
    routing::{get, patch},
    Json, Router,
};
use serde_json::{json, Value};
use std::{sync::Arc, time::Duration};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::{
    db::{Cache, CatalogStore},
    middleware::user_id::USER_ID_HEADER,
    services::{
        providers::CompletionProvider, CatalogService, RankingCatalog, RecommendationEngine,
        ReviewRankingService, SentimentClassifier,
    },
};

pub mod movies;
pub mod recommendations;
pub mod reviews;

/// Services shared by every handler, built once at start-up
pub struct AppState {
    pub catalog: CatalogService,
    pub reviews: ReviewRankingService,
    pub recommendations: RecommendationEngine,
    pub recommended_movies_limit: usize,
}

impl AppState {
    /// Wires the services onto one store, one completion provider and an optional cache
    pub fn new(
        store: Arc<dyn CatalogStore>,
        provider: Arc<dyn CompletionProvider>,
        cache: Option<Cache>,
        prompt_template: String,
        recommended_movies_limit: usize,
    ) -> Self {
        let classifier = SentimentClassifier::new(provider, prompt_template);

        Self {
            catalog: CatalogService::new(store.clone(), cache.clone()),
            reviews: ReviewRankingService::new(
                RankingCatalog::new(store.clone()),
                classifier,
                store.clone(),
                cache,
            ),
            recommendations: RecommendationEngine::new(store),
            recommended_movies_limit,
        }
    }
}

/// Request id header, taken from the caller or generated as a UUID v4
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    // The id must be set before the trace layer builds its span
    let layers = ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .layer(PropagateRequestIdLayer::new(request_id))
        .layer(cors_layer());

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .with_state(state)
        .layer(layers)
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/movies", get(movies::list).post(movies::create))
        .route("/movies/:imdb_id", get(movies::get))
        .route("/movies/:imdb_id/review", patch(reviews::submit))
        .route("/recommendations", get(recommendations::recommend))
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH])
        .allow_headers([
            header::ORIGIN,
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(REQUEST_ID_HEADER),
            HeaderName::from_static(USER_ID_HEADER),
        ])
        .expose_headers([header::CONTENT_LENGTH])
        .max_age(Duration::from_secs(12 * 60 * 60))
}

fn request_span(request: &Request<Body>) -> tracing::Span {
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .and_then(|id| id.header_value().to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id,
    )
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
