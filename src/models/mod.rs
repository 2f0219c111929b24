use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub mod ranking;
pub mod user_preferences;

pub use ranking::{Ranking, SENTINEL_RANK, UNMATCHED_RANK};
pub use user_preferences::UserPreferences;

/// A movie in the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    /// IMDB ID (e.g., "tt1375666")
    pub imdb_id: String,
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub youtube_id: Option<String>,
    #[serde(default)]
    pub genres: BTreeSet<String>,
    /// Set together with `ranking` by the review pipeline
    #[serde(default)]
    pub admin_review: Option<String>,
    #[serde(default)]
    pub ranking: Option<Ranking>,
}

impl Movie {
    /// Ordering key for recommendations; unranked movies sort with the sentinel
    pub fn rank_order(&self) -> i32 {
        self.ranking
            .as_ref()
            .map(|r| r.ranking_value)
            .unwrap_or(SENTINEL_RANK)
    }

    /// Whether the movie carries at least one of the given genres
    pub fn matches_any_genre(&self, genres: &[String]) -> bool {
        genres.iter().any(|g| self.genres.contains(g))
    }
}

/// Payload for adding a movie to the catalog
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NewMovie {
    pub imdb_id: String,
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub youtube_id: Option<String>,
    #[serde(default)]
    pub genres: BTreeSet<String>,
}

impl From<NewMovie> for Movie {
    fn from(new: NewMovie) -> Self {
        Movie {
            imdb_id: new.imdb_id,
            title: new.title,
            poster_path: new.poster_path,
            youtube_id: new.youtube_id,
            genres: new.genres,
            admin_review: None,
            ranking: None,
        }
    }
}

/// Result of classifying and storing an admin review
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewOutcome {
    pub ranking_name: String,
    pub admin_review: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(genres: &[&str], ranking: Option<Ranking>) -> Movie {
        Movie {
            imdb_id: "tt0111161".to_string(),
            title: "The Shawshank Redemption".to_string(),
            poster_path: None,
            youtube_id: None,
            genres: genres.iter().map(|g| g.to_string()).collect(),
            admin_review: None,
            ranking,
        }
    }

    #[test]
    fn test_rank_order_uses_sentinel_when_unranked() {
        assert_eq!(movie(&["Drama"], None).rank_order(), SENTINEL_RANK);
        assert_eq!(
            movie(&["Drama"], Some(Ranking::new("Good", 2))).rank_order(),
            2
        );
    }

    #[test]
    fn test_matches_any_genre() {
        let m = movie(&["Drama", "Crime"], None);
        assert!(m.matches_any_genre(&["Comedy".to_string(), "Crime".to_string()]));
        assert!(!m.matches_any_genre(&["Comedy".to_string()]));
        assert!(!m.matches_any_genre(&[]));
    }

    #[test]
    fn test_movie_deserializes_without_review() {
        let json = r#"{
            "imdb_id": "tt0111161",
            "title": "The Shawshank Redemption",
            "genres": ["Drama", "Drama"]
        }"#;
        let m: Movie = serde_json::from_str(json).unwrap();
        assert_eq!(m.genres.len(), 1);
        assert!(m.admin_review.is_none());
        assert!(m.ranking.is_none());
    }

    #[test]
    fn test_new_movie_starts_unranked() {
        let new = NewMovie {
            imdb_id: "tt0068646".to_string(),
            title: "The Godfather".to_string(),
            poster_path: Some("https://example.com/godfather.jpg".to_string()),
            youtube_id: None,
            genres: ["Crime".to_string()].into_iter().collect(),
        };
        let m: Movie = new.into();
        assert_eq!(m.imdb_id, "tt0068646");
        assert!(m.ranking.is_none());
        assert!(m.admin_review.is_none());
    }
}
