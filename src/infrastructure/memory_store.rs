// In-memory mock store - the fallback dataset when the relational store is unreachable

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::infrastructure::likes::LikeChange;
use crate::infrastructure::store::{EventStore, StoreKind, StoreResult};
use crate::models::{Comment, Event, EventUpdate, NewEvent};

/// An event plus the id its next comment will receive.
#[derive(Debug, Clone)]
struct MockEvent {
    event: Event,
    next_comment_id: i64,
}

impl MockEvent {
    fn comments(&self) -> &[Comment] {
        self.event.comments.as_deref().unwrap_or(&[])
    }

    fn comments_mut(&mut self) -> &mut Vec<Comment> {
        self.event.comments.get_or_insert_with(Vec::new)
    }
}

#[derive(Debug)]
struct MockState {
    events: Vec<MockEvent>,
    next_event_id: i64,
}

impl MockState {
    fn seeded() -> Self {
        let events: Vec<MockEvent> = [
            (
                1,
                "Company Pet Show",
                "November 6 at Noon",
                "Super-fun with furry friends!",
                "Reston Dog Park",
                "2025-08-30:12:00",
            ),
            (
                2,
                "Company Picnic",
                "July 4th at 10:00AM",
                "Come for free food and drinks.",
                "Central Park",
                "2025-08-30:12:02",
            ),
        ]
        .into_iter()
        .map(|(id, title, event_time, description, location, added)| MockEvent {
            event: Event {
                id,
                title: title.to_string(),
                event_time: event_time.to_string(),
                description: description.to_string(),
                location: location.to_string(),
                likes: 0,
                datetime_added: added.to_string(),
                comments: Some(vec![
                    seed_comment(1, id, "this is a comment"),
                    seed_comment(2, id, "this is another comment"),
                ]),
            },
            next_comment_id: 3,
        })
        .collect();

        Self {
            next_event_id: events.len() as i64 + 1,
            events,
        }
    }

    fn find(&self, id: i64) -> Option<&MockEvent> {
        self.events.iter().find(|mock| mock.event.id == id)
    }

    fn find_mut(&mut self, id: i64) -> Option<&mut MockEvent> {
        self.events.iter_mut().find(|mock| mock.event.id == id)
    }
}

fn seed_comment(id: i64, event_id: i64, text: &str) -> Comment {
    Comment {
        id,
        event_id,
        comment: text.to_string(),
        datetime_added: None,
    }
}

/// Process-lifetime event dataset, seeded with two events carrying two comments each.
///
/// Identifiers come from monotonic counters taken under the write lock, so they
/// are never reused after a delete.
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    state: Arc<RwLock<MockState>>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(MockState::seeded())),
        }
    }

    /// All events, each with its embedded comments.
    pub async fn list_events(&self) -> Vec<Event> {
        let state = self.state.read().await;
        state.events.iter().map(|mock| mock.event.clone()).collect()
    }

    pub async fn get_event(&self, id: i64) -> Option<Event> {
        let state = self.state.read().await;
        state.find(id).map(|mock| {
            let mut event = mock.event.clone();
            event.comments.get_or_insert_with(Vec::new);
            event
        })
    }

    pub async fn add_event(&self, new_event: &NewEvent) -> i64 {
        let mut state = self.state.write().await;
        let id = state.next_event_id;
        state.next_event_id += 1;
        state.events.push(MockEvent {
            event: Event {
                id,
                title: new_event.title.clone(),
                event_time: new_event.event_time.clone(),
                description: new_event.description.clone(),
                location: new_event.location.clone(),
                likes: 0,
                datetime_added: chrono::Utc::now().to_rfc2822(),
                comments: Some(Vec::new()),
            },
            next_comment_id: 1,
        });
        info!(event_id = id, "mock event added");
        id
    }

    /// Returns whether an event with that id existed.
    pub async fn update_event(&self, update: &EventUpdate) -> bool {
        let mut state = self.state.write().await;
        match state.find_mut(update.id) {
            Some(mock) => {
                mock.event.apply_update(update);
                info!(event_id = update.id, "updated mock event");
                true
            }
            None => {
                info!(event_id = update.id, "no mock event to update");
                false
            }
        }
    }

    /// Remove the event and, with it, its comments. Absent ids are a no-op.
    pub async fn delete_event(&self, id: i64) -> i64 {
        let mut state = self.state.write().await;
        let before = state.events.len();
        state.events.retain(|mock| mock.event.id != id);
        if state.events.len() < before {
            info!(event_id = id, "deleted mock event");
        }
        id
    }

    pub async fn get_comments(&self, event_id: i64) -> Vec<Comment> {
        let state = self.state.read().await;
        state
            .find(event_id)
            .map(|mock| mock.comments().to_vec())
            .unwrap_or_default()
    }

    pub async fn add_comment(&self, event_id: i64, text: &str) -> Option<i64> {
        let mut state = self.state.write().await;
        let mock = state.find_mut(event_id)?;
        let id = mock.next_comment_id;
        mock.next_comment_id += 1;
        mock.comments_mut().push(Comment {
            id,
            event_id,
            comment: text.to_string(),
            datetime_added: None,
        });
        info!(event_id, comment_id = id, "mock comment added");
        Some(id)
    }

    /// Comment ids are scoped to their event in the mock dataset.
    pub async fn delete_comment(&self, event_id: i64, id: i64) -> i64 {
        let mut state = self.state.write().await;
        if let Some(mock) = state.find_mut(event_id) {
            mock.comments_mut().retain(|comment| comment.id != id);
            info!(event_id, comment_id = id, "mock comment deleted");
        }
        id
    }

    pub async fn change_likes(&self, id: i64, change: LikeChange) -> Option<Event> {
        let mut state = self.state.write().await;
        let mock = state.find_mut(id)?;
        mock.event.likes = change.apply(mock.event.likes);
        info!(event_id = id, likes = mock.event.likes, "{} mock event", change.verb());
        Some(mock.event.clone())
    }
}

#[async_trait]
impl EventStore for InMemoryStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Memory
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn list_events(&self) -> StoreResult<Vec<Event>> {
        Ok(InMemoryStore::list_events(self).await)
    }

    async fn get_event(&self, id: i64) -> StoreResult<Option<Event>> {
        Ok(InMemoryStore::get_event(self, id).await)
    }

    async fn add_event(&self, event: &NewEvent) -> StoreResult<i64> {
        Ok(InMemoryStore::add_event(self, event).await)
    }

    async fn update_event(&self, update: &EventUpdate) -> StoreResult<()> {
        InMemoryStore::update_event(self, update).await;
        Ok(())
    }

    async fn delete_event(&self, id: i64) -> StoreResult<i64> {
        Ok(InMemoryStore::delete_event(self, id).await)
    }

    async fn get_comments(&self, event_id: i64) -> StoreResult<Vec<Comment>> {
        Ok(InMemoryStore::get_comments(self, event_id).await)
    }

    async fn add_comment(&self, event_id: i64, comment: &str) -> StoreResult<Option<i64>> {
        Ok(InMemoryStore::add_comment(self, event_id, comment).await)
    }

    async fn delete_comment(&self, event_id: i64, id: i64) -> StoreResult<i64> {
        Ok(InMemoryStore::delete_comment(self, event_id, id).await)
    }

    async fn change_likes(&self, id: i64, change: LikeChange) -> StoreResult<Option<Event>> {
        Ok(InMemoryStore::change_likes(self, id, change).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_event(title: &str) -> NewEvent {
        NewEvent {
            title: title.to_string(),
            event_time: "2022-02-01 12:00:00".to_string(),
            description: "event".to_string(),
            location: "somewhere".to_string(),
        }
    }

    #[tokio::test]
    async fn test_seed_has_two_events_with_two_comments_each() {
        let store = InMemoryStore::new();
        let events = store.list_events().await;
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].id, 1);
        assert_eq!(events[1].id, 2);
        for event in &events {
            let comments = event.comments.as_ref().unwrap();
            assert_eq!(comments.iter().map(|c| c.id).collect::<Vec<_>>(), vec![1, 2]);
            assert!(comments.iter().all(|c| c.event_id == event.id));
            assert_eq!(event.likes, 0);
        }
    }

    #[tokio::test]
    async fn test_add_event_assigns_next_id() {
        let store = InMemoryStore::new();
        let id = store.add_event(&new_event("new")).await;
        assert_eq!(id, 3);

        let event = store.get_event(3).await.unwrap();
        assert_eq!(event.title, "new");
        assert_eq!(event.likes, 0);
        assert_eq!(event.comments, Some(vec![]));
    }

    #[tokio::test]
    async fn test_ids_are_not_reused_after_delete() {
        let store = InMemoryStore::new();
        assert_eq!(store.add_event(&new_event("third")).await, 3);
        store.delete_event(3).await;
        assert_eq!(store.add_event(&new_event("fourth")).await, 4);

        store.delete_comment(1, 2).await;
        assert_eq!(store.add_comment(1, "again").await, Some(3));
    }

    #[tokio::test]
    async fn test_update_changes_only_editable_fields() {
        let store = InMemoryStore::new();
        store.change_likes(1, LikeChange::Increment).await;

        let found = store
            .update_event(&EventUpdate {
                id: 1,
                title: "updated".to_string(),
                event_time: "2022-02-01 12:00:00".to_string(),
                description: "event".to_string(),
                location: "somewhere else".to_string(),
            })
            .await;
        assert!(found);

        let event = store.get_event(1).await.unwrap();
        assert_eq!(event.title, "updated");
        assert_eq!(event.location, "somewhere else");
        assert_eq!(event.likes, 1);
        assert_eq!(event.datetime_added, "2025-08-30:12:00");
    }

    #[tokio::test]
    async fn test_delete_event_removes_comments() {
        let store = InMemoryStore::new();
        assert_eq!(store.delete_event(2).await, 2);
        assert!(store.get_event(2).await.is_none());
        assert!(store.get_comments(2).await.is_empty());
        assert_eq!(store.list_events().await.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_missing_event_is_noop() {
        let store = InMemoryStore::new();
        assert_eq!(store.delete_event(99).await, 99);
        assert_eq!(store.list_events().await.len(), 2);
    }

    #[tokio::test]
    async fn test_comments_are_scoped_per_event() {
        let store = InMemoryStore::new();
        assert_eq!(store.add_comment(2, "hello").await, Some(3));
        assert_eq!(store.delete_comment(1, 1).await, 1);

        let first = store.get_comments(1).await;
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].id, 2);

        let second = store.get_comments(2).await;
        assert_eq!(second.len(), 3);
        assert_eq!(second[2].comment, "hello");
    }

    #[tokio::test]
    async fn test_add_comment_to_missing_event() {
        let store = InMemoryStore::new();
        assert_eq!(store.add_comment(42, "orphan").await, None);
    }

    #[tokio::test]
    async fn test_likes_floor_at_zero() {
        let store = InMemoryStore::new();
        let mut event = None;
        for _ in 0..6 {
            event = store.change_likes(1, LikeChange::Decrement).await;
        }
        assert_eq!(event.unwrap().likes, 0);

        let liked = store.change_likes(2, LikeChange::Increment).await.unwrap();
        assert_eq!(liked.likes, 1);
        let liked = store.change_likes(2, LikeChange::Increment).await.unwrap();
        assert_eq!(liked.likes, 2);
        let unliked = store.change_likes(2, LikeChange::Decrement).await.unwrap();
        assert_eq!(unliked.likes, 1);
    }

    #[tokio::test]
    async fn test_change_likes_on_missing_event() {
        let store = InMemoryStore::new();
        assert!(store.change_likes(7, LikeChange::Increment).await.is_none());
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = InMemoryStore::new();
        let other = store.clone();
        other.add_event(&new_event("shared")).await;
        assert_eq!(store.list_events().await.len(), 3);
    }
}
