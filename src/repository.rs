// Event repository - relational first, in-memory mock data when that fails
//
// Each call is served by exactly one store. When the relational attempt fails
// (no connection or a failed statement) the mock equivalent runs instead, so a
// failed write is lost from the database but recorded in the mock working set.

use std::sync::Arc;
use tracing::{error, warn};

use crate::config::DatabaseConfig;
use crate::infrastructure::likes::LikeChange;
use crate::infrastructure::memory_store::InMemoryStore;
use crate::infrastructure::relational_store::RelationalStore;
use crate::infrastructure::store::{EventStore, Served, StoreError, StoreResult};
use crate::models::{Comment, Event, EventUpdate, NewEvent, UpdateOutcome};

#[derive(Clone)]
pub struct EventRepository {
    primary: Arc<dyn EventStore>,
    fallback: InMemoryStore,
}

fn log_fallback(operation: &'static str, err: &StoreError) {
    if err.is_unavailable() {
        warn!(operation, "relational store unavailable, serving mock data");
    } else {
        error!(operation, error = %err, "relational operation failed, serving mock data");
    }
}

impl EventRepository {
    /// Repository over the configured database with a freshly seeded mock fallback.
    pub fn new(config: &DatabaseConfig) -> Self {
        Self::with_stores(Arc::new(RelationalStore::new(config)), InMemoryStore::new())
    }

    pub fn with_stores(primary: Arc<dyn EventStore>, fallback: InMemoryStore) -> Self {
        Self { primary, fallback }
    }

    pub fn fallback(&self) -> &InMemoryStore {
        &self.fallback
    }

    /// Capability check of the relational store.
    pub async fn relational_available(&self) -> bool {
        self.primary.is_available().await
    }

    async fn serve<T, F, Fut>(
        &self,
        operation: &'static str,
        attempt: StoreResult<T>,
        fallback: F,
    ) -> Served<T>
    where
        F: FnOnce(InMemoryStore) -> Fut,
        Fut: std::future::Future<Output = T>,
    {
        match attempt {
            Ok(value) => Served {
                value,
                source: self.primary.kind(),
            },
            Err(err) => {
                log_fallback(operation, &err);
                Served::memory(fallback(self.fallback.clone()).await)
            }
        }
    }

    /// Relational listings carry no comments; the mock listing embeds them.
    pub async fn list_events(&self) -> Served<Vec<Event>> {
        let attempt = self.primary.list_events().await;
        self.serve("list_events", attempt, |mock| async move {
            mock.list_events().await
        })
        .await
    }

    pub async fn get_event(&self, id: i64) -> Served<Option<Event>> {
        let attempt = self.primary.get_event(id).await;
        self.serve("get_event", attempt, |mock| async move {
            mock.get_event(id).await
        })
        .await
    }

    pub async fn add_event(&self, event: &NewEvent) -> Served<i64> {
        let attempt = self.primary.add_event(event).await;
        self.serve("add_event", attempt, |mock| async move {
            mock.add_event(event).await
        })
        .await
    }

    /// A failed statement reports `error`, an unreachable store reports `success`;
    /// both apply the change to the mock data.
    pub async fn update_event(&self, update: &EventUpdate) -> Served<UpdateOutcome> {
        match self.primary.update_event(update).await {
            Ok(()) => Served {
                value: UpdateOutcome::success(),
                source: self.primary.kind(),
            },
            Err(err) => {
                log_fallback("update_event", &err);
                self.fallback.update_event(update).await;
                let outcome = if err.is_unavailable() {
                    UpdateOutcome::success()
                } else {
                    UpdateOutcome::error()
                };
                Served::memory(outcome)
            }
        }
    }

    pub async fn delete_event(&self, id: i64) -> Served<i64> {
        let attempt = self.primary.delete_event(id).await;
        self.serve("delete_event", attempt, |mock| async move {
            mock.delete_event(id).await
        })
        .await
    }

    pub async fn get_comments(&self, event_id: i64) -> Served<Vec<Comment>> {
        let attempt = self.primary.get_comments(event_id).await;
        self.serve("get_comments", attempt, |mock| async move {
            mock.get_comments(event_id).await
        })
        .await
    }

    pub async fn add_comment(&self, event_id: i64, comment: &str) -> Served<Option<i64>> {
        let attempt = self.primary.add_comment(event_id, comment).await;
        self.serve("add_comment", attempt, |mock| async move {
            mock.add_comment(event_id, comment).await
        })
        .await
    }

    pub async fn delete_comment(&self, event_id: i64, id: i64) -> Served<i64> {
        let attempt = self.primary.delete_comment(event_id, id).await;
        self.serve("delete_comment", attempt, |mock| async move {
            mock.delete_comment(event_id, id).await
        })
        .await
    }

    pub async fn add_like(&self, id: i64) -> Served<Option<Event>> {
        self.change_likes(id, LikeChange::Increment).await
    }

    pub async fn remove_like(&self, id: i64) -> Served<Option<Event>> {
        self.change_likes(id, LikeChange::Decrement).await
    }

    async fn change_likes(&self, id: i64, change: LikeChange) -> Served<Option<Event>> {
        let attempt = self.primary.change_likes(id, change).await;
        self.serve("change_likes", attempt, |mock| async move {
            mock.change_likes(id, change).await
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::store::StoreKind;
    use async_trait::async_trait;

    /// Store whose every statement fails on a live connection.
    struct BrokenStore;

    #[async_trait]
    impl EventStore for BrokenStore {
        fn kind(&self) -> StoreKind {
            StoreKind::Relational
        }

        async fn is_available(&self) -> bool {
            true
        }

        async fn list_events(&self) -> StoreResult<Vec<Event>> {
            Err(StoreError::Query(sqlx::Error::RowNotFound))
        }

        async fn get_event(&self, _id: i64) -> StoreResult<Option<Event>> {
            Err(StoreError::Query(sqlx::Error::RowNotFound))
        }

        async fn add_event(&self, _event: &NewEvent) -> StoreResult<i64> {
            Err(StoreError::MissingInsertId("events"))
        }

        async fn update_event(&self, _update: &EventUpdate) -> StoreResult<()> {
            Err(StoreError::Query(sqlx::Error::RowNotFound))
        }

        async fn delete_event(&self, _id: i64) -> StoreResult<i64> {
            Err(StoreError::Query(sqlx::Error::RowNotFound))
        }

        async fn get_comments(&self, _event_id: i64) -> StoreResult<Vec<Comment>> {
            Err(StoreError::Query(sqlx::Error::RowNotFound))
        }

        async fn add_comment(&self, _event_id: i64, _comment: &str) -> StoreResult<Option<i64>> {
            Err(StoreError::Query(sqlx::Error::RowNotFound))
        }

        async fn delete_comment(&self, _event_id: i64, _id: i64) -> StoreResult<i64> {
            Err(StoreError::Query(sqlx::Error::RowNotFound))
        }

        async fn change_likes(&self, _id: i64, _change: LikeChange) -> StoreResult<Option<Event>> {
            Err(StoreError::Query(sqlx::Error::RowNotFound))
        }
    }

    /// Store that is never reachable.
    struct OfflineStore;

    #[async_trait]
    impl EventStore for OfflineStore {
        fn kind(&self) -> StoreKind {
            StoreKind::Relational
        }

        async fn is_available(&self) -> bool {
            false
        }

        async fn list_events(&self) -> StoreResult<Vec<Event>> {
            Err(StoreError::Unavailable)
        }

        async fn get_event(&self, _id: i64) -> StoreResult<Option<Event>> {
            Err(StoreError::Unavailable)
        }

        async fn add_event(&self, _event: &NewEvent) -> StoreResult<i64> {
            Err(StoreError::Unavailable)
        }

        async fn update_event(&self, _update: &EventUpdate) -> StoreResult<()> {
            Err(StoreError::Unavailable)
        }

        async fn delete_event(&self, _id: i64) -> StoreResult<i64> {
            Err(StoreError::Unavailable)
        }

        async fn get_comments(&self, _event_id: i64) -> StoreResult<Vec<Comment>> {
            Err(StoreError::Unavailable)
        }

        async fn add_comment(&self, _event_id: i64, _comment: &str) -> StoreResult<Option<i64>> {
            Err(StoreError::Unavailable)
        }

        async fn delete_comment(&self, _event_id: i64, _id: i64) -> StoreResult<i64> {
            Err(StoreError::Unavailable)
        }

        async fn change_likes(&self, _id: i64, _change: LikeChange) -> StoreResult<Option<Event>> {
            Err(StoreError::Unavailable)
        }
    }

    fn update_for(id: i64) -> EventUpdate {
        EventUpdate {
            id,
            title: "updated".to_string(),
            event_time: "2022-02-01 12:00:00".to_string(),
            description: "event".to_string(),
            location: "somewhere else".to_string(),
        }
    }

    #[tokio::test]
    async fn test_update_reports_success_when_store_unreachable() {
        let repo = EventRepository::with_stores(Arc::new(OfflineStore), InMemoryStore::new());
        let served = repo.update_event(&update_for(1)).await;
        assert!(served.value.is_success());
        assert!(served.from_fallback());
        assert_eq!(repo.fallback().get_event(1).await.unwrap().title, "updated");
    }

    #[tokio::test]
    async fn test_update_reports_error_when_statement_fails() {
        let repo = EventRepository::with_stores(Arc::new(BrokenStore), InMemoryStore::new());
        let served = repo.update_event(&update_for(2)).await;
        assert!(!served.value.is_success());
        assert_eq!(served.source, StoreKind::Memory);
        // The change still lands in the mock data
        assert_eq!(repo.fallback().get_event(2).await.unwrap().title, "updated");
    }

    #[tokio::test]
    async fn test_failed_statements_fall_back_to_mock_data() {
        let repo = EventRepository::with_stores(Arc::new(BrokenStore), InMemoryStore::new());

        let events = repo.list_events().await;
        assert!(events.from_fallback());
        assert_eq!(events.value.len(), 2);

        let id = repo
            .add_event(&NewEvent {
                title: "fallback".to_string(),
                ..Default::default()
            })
            .await;
        assert_eq!(id.value, 3);

        let liked = repo.add_like(1).await.into_inner().unwrap();
        assert_eq!(liked.likes, 1);

        let comment_id = repo.add_comment(1, "kept in memory").await;
        assert_eq!(comment_id.value, Some(3));
    }

    #[tokio::test]
    async fn test_successful_primary_leaves_fallback_untouched() {
        let repo = EventRepository::with_stores(Arc::new(InMemoryStore::new()), InMemoryStore::new());
        let id = repo.add_event(&NewEvent::default()).await;
        assert_eq!(id.value, 3);
        assert_eq!(id.source, StoreKind::Memory);
        assert_eq!(repo.fallback().list_events().await.len(), 2);
    }

    #[tokio::test]
    async fn test_relational_availability_is_reported() {
        let repo = EventRepository::with_stores(Arc::new(OfflineStore), InMemoryStore::new());
        assert!(!repo.relational_available().await);

        let repo = EventRepository::with_stores(Arc::new(BrokenStore), InMemoryStore::new());
        assert!(repo.relational_available().await);
    }
}
