use serde::{Deserialize, Serialize};

/// Genre preferences owned by the account subsystem; read-only here
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct UserPreferences {
    pub user_id: String,
    /// Favourite genres in the order the user picked them
    pub favourite_genres: Vec<String>,
}
