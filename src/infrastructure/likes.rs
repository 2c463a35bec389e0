// Like counter protocol - increment always, decrement only above zero

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LikeChange {
    Increment,
    Decrement,
}

impl LikeChange {
    /// Next value of a like counter. Decrementing zero leaves it at zero.
    pub fn apply(self, likes: i64) -> i64 {
        match self {
            LikeChange::Increment => likes.saturating_add(1),
            LikeChange::Decrement if likes > 0 => likes - 1,
            LikeChange::Decrement => likes,
        }
    }

    /// Relational form of the same transition; the floor lives in the predicate.
    pub fn update_sql(self) -> &'static str {
        match self {
            LikeChange::Increment => "UPDATE events SET likes = likes + 1 WHERE id = ?",
            LikeChange::Decrement => {
                "UPDATE events SET likes = likes - 1 WHERE id = ? AND likes > 0"
            }
        }
    }

    pub fn verb(self) -> &'static str {
        match self {
            LikeChange::Increment => "added like to",
            LikeChange::Decrement => "removed like from",
        }
    }
}
