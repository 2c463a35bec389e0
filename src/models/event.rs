use serde::{Deserialize, Serialize};

/// An event listing.
///
/// `comments` is only populated on single-event retrieval and on the mock
/// store's list; relational listings leave it out of the JSON entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub event_time: String,
    pub description: String,
    pub location: String,
    pub likes: i64,
    pub datetime_added: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<Comment>>,
}

/// A text annotation attached to exactly one event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub event_id: i64,
    pub comment: String,
    // Only the relational store records when a comment was added
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datetime_added: Option<String>,
}

/// Payload for creating an event. Any id or likes sent by a client are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewEvent {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub event_time: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
}

/// Payload for updating the editable fields of an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventUpdate {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub event_time: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewComment {
    pub event_id: i64,
    #[serde(default)]
    pub comment: String,
}

/// Body of the like/unlike endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeRequest {
    pub id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventList {
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateResult {
    Success,
    Error,
}

/// Wire shape of an update response: `{"result": "success"}` or `{"result": "error"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateOutcome {
    pub result: UpdateResult,
}

impl UpdateOutcome {
    pub fn success() -> Self {
        Self {
            result: UpdateResult::Success,
        }
    }

    pub fn error() -> Self {
        Self {
            result: UpdateResult::Error,
        }
    }

    pub fn is_success(&self) -> bool {
        self.result == UpdateResult::Success
    }
}

impl Event {
    /// Overwrite the editable fields. Likes and `datetime_added` stay untouched.
    pub fn apply_update(&mut self, update: &EventUpdate) {
        self.title = update.title.clone();
        self.event_time = update.event_time.clone();
        self.description = update.description.clone();
        self.location = update.location.clone();
    }
}
