use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};

use marquee_api::{
    db::CatalogStore,
    error::{AppError, AppResult},
    models::{Movie, NewMovie, Ranking, UserPreferences},
    routes::{create_router, AppState},
    services::providers::CompletionProvider,
};

const TEMPLATE: &str = "Answer with one of {rankings}. Review: ";

/// In-memory stand-in for the Postgres store
struct InMemoryStore {
    rankings: Vec<Ranking>,
    movies: Mutex<BTreeMap<String, Movie>>,
    users: HashMap<String, UserPreferences>,
    writes: Mutex<u32>,
}

#[async_trait::async_trait]
impl CatalogStore for InMemoryStore {
    async fn find_rankings(&self) -> AppResult<Vec<Ranking>> {
        Ok(self.rankings.clone())
    }

    async fn find_all_movies(&self) -> AppResult<Vec<Movie>> {
        Ok(self.movies.lock().unwrap().values().cloned().collect())
    }

    async fn find_movie(&self, imdb_id: &str) -> AppResult<Option<Movie>> {
        Ok(self.movies.lock().unwrap().get(imdb_id).cloned())
    }

    async fn insert_movie(&self, movie: &Movie) -> AppResult<()> {
        let mut movies = self.movies.lock().unwrap();
        if movies.contains_key(&movie.imdb_id) {
            return Err(AppError::Conflict(format!(
                "movie {} already exists",
                movie.imdb_id
            )));
        }
        movies.insert(movie.imdb_id.clone(), movie.clone());
        Ok(())
    }

    async fn find_movies_by_genres(&self, genres: &[String]) -> AppResult<Vec<Movie>> {
        // Reverse order so the engine, not the store, decides the ordering
        Ok(self
            .movies
            .lock()
            .unwrap()
            .values()
            .rev()
            .filter(|m| m.matches_any_genre(genres))
            .cloned()
            .collect())
    }

    async fn update_review(
        &self,
        imdb_id: &str,
        admin_review: &str,
        ranking: &Ranking,
    ) -> AppResult<u64> {
        let mut movies = self.movies.lock().unwrap();
        match movies.get_mut(imdb_id) {
            Some(movie) => {
                *self.writes.lock().unwrap() += 1;
                movie.admin_review = Some(admin_review.to_string());
                movie.ranking = Some(ranking.clone());
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn find_user_preferences(&self, user_id: &str) -> AppResult<Option<UserPreferences>> {
        Ok(self.users.get(user_id).cloned())
    }
}

/// Answers with the first category whose name appears in the review
struct KeywordProvider {
    fail: bool,
}

#[async_trait::async_trait]
impl CompletionProvider for KeywordProvider {
    async fn complete(&self, prompt: &str) -> AppResult<String> {
        if self.fail {
            return Err(AppError::Classification("invalid api key".to_string()));
        }
        let review = prompt.split("Review: ").nth(1).unwrap_or_default();
        let answer = ["Excellent", "Good", "Bad"]
            .into_iter()
            .find(|name| review.contains(name))
            .unwrap_or("Unsure");
        Ok(answer.to_string())
    }

    fn name(&self) -> &'static str {
        "keyword"
    }
}

fn movie(imdb_id: &str, genres: &[&str], rank: Option<i32>) -> Movie {
    Movie {
        imdb_id: imdb_id.to_string(),
        title: format!("Title {}", imdb_id),
        poster_path: None,
        youtube_id: None,
        genres: genres.iter().map(|g| g.to_string()).collect(),
        admin_review: rank.map(|_| "seeded".to_string()),
        ranking: rank.map(|v| Ranking::new(format!("Rank {}", v), v)),
    }
}

fn seeded_store() -> Arc<InMemoryStore> {
    let movies = [
        movie("tt0000001", &["Drama"], Some(1)),
        movie("tt0000002", &["Drama"], Some(3)),
        movie("tt0000003", &["Comedy"], Some(0)),
        movie("tt0000004", &["Drama", "Comedy"], None),
    ];

    let drama_fan = UserPreferences {
        user_id: "drama-fan".to_string(),
        favourite_genres: vec!["Drama".to_string()],
    };

    Arc::new(InMemoryStore {
        rankings: vec![
            Ranking::new("Excellent", 1),
            Ranking::new("Good", 2),
            Ranking::new("Bad", 4),
            Ranking::new("Not_Ranked", 999),
        ],
        movies: Mutex::new(
            movies
                .into_iter()
                .map(|m| (m.imdb_id.clone(), m))
                .collect(),
        ),
        users: HashMap::from([(drama_fan.user_id.clone(), drama_fan)]),
        writes: Mutex::new(0),
    })
}

fn create_test_server(store: Arc<InMemoryStore>, fail_classifier: bool, limit: usize) -> TestServer {
    let state = AppState::new(
        store,
        Arc::new(KeywordProvider {
            fail: fail_classifier,
        }),
        None,
        TEMPLATE.to_string(),
        limit,
    );
    TestServer::new(create_router(Arc::new(state))).unwrap()
}

fn user_header(user_id: &'static str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("x-user-id"),
        HeaderValue::from_static(user_id),
    )
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server(seeded_store(), false, 5);
    let response = server.get("/health").await;
    response.assert_status_ok();
    assert!(!response.header("x-request-id").is_empty());
}

#[tokio::test]
async fn test_request_id_is_generated_per_request() {
    let server = create_test_server(seeded_store(), false, 5);

    let first = server.get("/health").await.header("x-request-id");
    let second = server.get("/health").await.header("x-request-id");

    assert_eq!(first.len(), 36);
    assert_ne!(first, second);
}

#[tokio::test]
async fn test_request_id_is_propagated_from_caller() {
    let server = create_test_server(seeded_store(), false, 5);

    let response = server
        .get("/api/v1/movies")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static("gateway-7f3a"),
        )
        .await;

    response.assert_status_ok();
    assert_eq!(response.header("x-request-id"), "gateway-7f3a");
}

#[tokio::test]
async fn test_list_and_get_movies() {
    let server = create_test_server(seeded_store(), false, 5);

    let response = server.get("/api/v1/movies").await;
    response.assert_status_ok();
    let movies: Vec<Value> = response.json();
    assert_eq!(movies.len(), 4);

    let response = server.get("/api/v1/movies/tt0000001").await;
    response.assert_status_ok();
    let movie: Value = response.json();
    assert_eq!(movie["ranking"]["ranking_value"], 1);

    server
        .get("/api/v1/movies/tt9999999")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_add_movie() {
    let server = create_test_server(seeded_store(), false, 5);
    let body = NewMovie {
        imdb_id: "tt0068646".to_string(),
        title: "The Godfather".to_string(),
        poster_path: None,
        youtube_id: Some("sY1S34973zA".to_string()),
        genres: ["Crime".to_string(), "Drama".to_string()].into_iter().collect(),
    };

    let response = server.post("/api/v1/movies").json(&body).await;
    response.assert_status(StatusCode::CREATED);
    let created: Value = response.json();
    assert_eq!(created["title"], "The Godfather");
    assert!(created["ranking"].is_null());

    server
        .post("/api/v1/movies")
        .json(&body)
        .await
        .assert_status(StatusCode::CONFLICT);

    server
        .post("/api/v1/movies")
        .json(&json!({ "imdb_id": "tt1", "title": "No genres" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_submit_review_ranks_and_stores() {
    let store = seeded_store();
    let server = create_test_server(store.clone(), false, 5);

    let response = server
        .patch("/api/v1/movies/tt0000003/review")
        .json(&json!({ "admin_review": "Excellent timing and a great cast" }))
        .await;
    response.assert_status_ok();
    let outcome: Value = response.json();
    assert_eq!(outcome["ranking_name"], "Excellent");
    assert_eq!(outcome["admin_review"], "Excellent timing and a great cast");

    let stored = store.find_movie("tt0000003").await.unwrap().unwrap();
    assert_eq!(stored.ranking, Some(Ranking::new("Excellent", 1)));
    assert_eq!(
        stored.admin_review.as_deref(),
        Some("Excellent timing and a great cast")
    );
}

#[tokio::test]
async fn test_submit_review_last_write_wins() {
    let store = seeded_store();
    let server = create_test_server(store.clone(), false, 5);

    for review in ["Good fun", "Bad pacing"] {
        server
            .patch("/api/v1/movies/tt0000002/review")
            .json(&json!({ "admin_review": review }))
            .await
            .assert_status_ok();
    }

    let stored = store.find_movie("tt0000002").await.unwrap().unwrap();
    assert_eq!(stored.ranking, Some(Ranking::new("Bad", 4)));
    assert_eq!(stored.admin_review.as_deref(), Some("Bad pacing"));
}

#[tokio::test]
async fn test_submit_review_unmatched_answer_gets_rank_zero() {
    let store = seeded_store();
    let server = create_test_server(store.clone(), false, 5);

    let response = server
        .patch("/api/v1/movies/tt0000001/review")
        .json(&json!({ "admin_review": "Hard to describe" }))
        .await;
    response.assert_status_ok();

    let stored = store.find_movie("tt0000001").await.unwrap().unwrap();
    assert_eq!(stored.ranking, Some(Ranking::new("Unsure", 0)));
}

#[tokio::test]
async fn test_submit_review_unknown_movie() {
    let store = seeded_store();
    let server = create_test_server(store.clone(), false, 5);

    server
        .patch("/api/v1/movies/tt9999999/review")
        .json(&json!({ "admin_review": "Good" }))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    assert_eq!(*store.writes.lock().unwrap(), 0);
}

#[tokio::test]
async fn test_submit_review_classifier_failure_leaves_movie_untouched() {
    let store = seeded_store();
    let server = create_test_server(store.clone(), true, 5);

    server
        .patch("/api/v1/movies/tt0000002/review")
        .json(&json!({ "admin_review": "Good" }))
        .await
        .assert_status(StatusCode::BAD_GATEWAY);

    let stored = store.find_movie("tt0000002").await.unwrap().unwrap();
    assert_eq!(stored.admin_review.as_deref(), Some("seeded"));
    assert_eq!(stored.ranking, Some(Ranking::new("Rank 3", 3)));
    assert_eq!(*store.writes.lock().unwrap(), 0);
}

#[tokio::test]
async fn test_recommendations_filter_order_and_limit() {
    let server = create_test_server(seeded_store(), false, 2);
    let (name, value) = user_header("drama-fan");

    let response = server
        .get("/api/v1/recommendations")
        .add_header(name, value)
        .await;
    response.assert_status_ok();

    let movies: Vec<Movie> = response.json();
    let ids: Vec<&str> = movies.iter().map(|m| m.imdb_id.as_str()).collect();
    assert_eq!(ids, vec!["tt0000001", "tt0000002"]);
}

#[tokio::test]
async fn test_recommendations_put_unranked_last() {
    let server = create_test_server(seeded_store(), false, 5);
    let (name, value) = user_header("drama-fan");

    let movies: Vec<Movie> = server
        .get("/api/v1/recommendations")
        .add_header(name, value)
        .await
        .json();
    let ids: Vec<&str> = movies.iter().map(|m| m.imdb_id.as_str()).collect();
    assert_eq!(ids, vec!["tt0000001", "tt0000002", "tt0000004"]);
}

#[tokio::test]
async fn test_recommendations_for_user_without_preferences() {
    let server = create_test_server(seeded_store(), false, 5);
    let (name, value) = user_header("newcomer");

    let response = server
        .get("/api/v1/recommendations")
        .add_header(name, value)
        .await;
    response.assert_status_ok();
    let movies: Vec<Value> = response.json();
    assert!(movies.is_empty());
}

#[tokio::test]
async fn test_recommendations_require_user_identity() {
    let server = create_test_server(seeded_store(), false, 5);
    server
        .get("/api/v1/recommendations")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}
