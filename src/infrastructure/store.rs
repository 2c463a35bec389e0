// Store abstraction - the seam between the repository and its two backends

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::infrastructure::likes::LikeChange;
use crate::models::{Comment, Event, EventUpdate, NewEvent};

#[derive(Debug, Error)]
pub enum StoreError {
    /// No connection could be opened; the store is not reachable right now.
    #[error("relational store unavailable")]
    Unavailable,

    #[error("statement failed: {0}")]
    Query(#[from] sqlx::Error),

    #[error("insert into {0} did not report a generated id")]
    MissingInsertId(&'static str),
}

impl StoreError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Unavailable)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Which store produced a repository result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    Relational,
    Memory,
}

impl StoreKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKind::Relational => "relational",
            StoreKind::Memory => "memory",
        }
    }
}

/// A value together with the store that served it.
#[derive(Debug, Clone, PartialEq)]
pub struct Served<T> {
    pub value: T,
    pub source: StoreKind,
}

impl<T> Served<T> {
    pub fn relational(value: T) -> Self {
        Self {
            value,
            source: StoreKind::Relational,
        }
    }

    pub fn memory(value: T) -> Self {
        Self {
            value,
            source: StoreKind::Memory,
        }
    }

    pub fn from_fallback(&self) -> bool {
        self.source == StoreKind::Memory
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

/// Data access operations shared by the relational and in-memory stores.
#[async_trait]
pub trait EventStore: Send + Sync {
    fn kind(&self) -> StoreKind;

    /// Capability check: can this store serve a request right now?
    async fn is_available(&self) -> bool;

    async fn list_events(&self) -> StoreResult<Vec<Event>>;
    async fn get_event(&self, id: i64) -> StoreResult<Option<Event>>;
    async fn add_event(&self, event: &NewEvent) -> StoreResult<i64>;
    async fn update_event(&self, update: &EventUpdate) -> StoreResult<()>;
    async fn delete_event(&self, id: i64) -> StoreResult<i64>;

    async fn get_comments(&self, event_id: i64) -> StoreResult<Vec<Comment>>;
    /// Returns `None` when the store knows the event does not exist.
    async fn add_comment(&self, event_id: i64, comment: &str) -> StoreResult<Option<i64>>;
    async fn delete_comment(&self, event_id: i64, id: i64) -> StoreResult<i64>;

    /// Apply a like change and return the event as it is afterwards.
    async fn change_likes(&self, id: i64, change: LikeChange) -> StoreResult<Option<Event>>;
}
