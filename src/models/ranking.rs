use serde::{Deserialize, Serialize};

/// Rank value reserved for the "not yet ranked" placeholder category.
///
/// Categories carrying it are valid stored ranks but are never offered to the
/// classifier, and unranked movies sort as if they held it.
pub const SENTINEL_RANK: i32 = 999;

/// Rank assigned when the classifier answers with a name outside the catalog
pub const UNMATCHED_RANK: i32 = 0;

/// A sentiment category and its ordering key (lower is better)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct Ranking {
    pub ranking_name: String,
    pub ranking_value: i32,
}

impl Ranking {
    pub fn new(ranking_name: impl Into<String>, ranking_value: i32) -> Self {
        Self {
            ranking_name: ranking_name.into(),
            ranking_value,
        }
    }

    /// Whether this category is the unranked placeholder
    pub fn is_sentinel(&self) -> bool {
        self.ranking_value == SENTINEL_RANK
    }
}
