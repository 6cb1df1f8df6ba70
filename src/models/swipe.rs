use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user's like or dislike of a catalog variant
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Swipe {
    pub user_id: i64,
    pub variant_id: i64,
    pub liked: bool,
    pub created_at: DateTime<Utc>,
}

impl Swipe {
    pub fn new(user_id: i64, variant_id: i64, liked: bool) -> Self {
        Self {
            user_id,
            variant_id,
            liked,
            created_at: Utc::now(),
        }
    }
}
