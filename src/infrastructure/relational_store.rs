// Relational store - events and comments tables reached through sqlx's Any driver
// Every operation opens its own connection, runs its statements and closes it again.
// On a failed statement the connection is dropped rather than closed.

use async_trait::async_trait;
use sqlx::any::AnyRow;
use sqlx::{Any, AnyConnection, Connection, Decode, Row, Type, ValueRef};
use tracing::{debug, info};

use crate::config::{DatabaseConfig, Dialect};
use crate::infrastructure::connection::{release, ConnectionProvider};
use crate::infrastructure::likes::LikeChange;
use crate::infrastructure::store::{EventStore, StoreError, StoreKind, StoreResult};
use crate::models::{Comment, Event, EventUpdate, NewEvent};

// TEXT columns arrive as blobs through the MySQL Any driver, so they are read as CHAR
const LIST_EVENTS_SQL: &str = "SELECT id, title, event_time, \
     CAST(description AS CHAR) AS description, location, likes, \
     CAST(datetime_added AS CHAR) AS datetime_added FROM events";

const GET_EVENT_SQL: &str = "SELECT id, title, event_time, \
     CAST(description AS CHAR) AS description, location, likes, \
     CAST(datetime_added AS CHAR) AS datetime_added FROM events WHERE id = ?";

const GET_EVENT_WITH_COMMENTS_SQL: &str = "SELECT e.id, e.title, e.event_time, \
     CAST(e.description AS CHAR) AS description, e.location, e.likes, \
     CAST(e.datetime_added AS CHAR) AS datetime_added, \
     CAST(c.comment AS CHAR) AS comment, c.id AS comment_id, \
     CAST(c.datetime_added AS CHAR) AS comment_added \
     FROM events e LEFT OUTER JOIN comments c ON e.id = c.event_id WHERE e.id = ? ORDER BY c.id";

const GET_COMMENTS_SQL: &str = "SELECT id, event_id, CAST(comment AS CHAR) AS comment, \
     CAST(datetime_added AS CHAR) AS datetime_added FROM comments WHERE event_id = ? ORDER BY id";

const INSERT_EVENT_SQL: &str =
    "INSERT INTO events (title, event_time, description, location) VALUES (?, ?, ?, ?)";

const UPDATE_EVENT_SQL: &str =
    "UPDATE events SET title = ?, event_time = ?, description = ?, location = ? WHERE id = ?";

const DELETE_EVENT_COMMENTS_SQL: &str = "DELETE FROM comments WHERE event_id = ?";
const DELETE_EVENT_SQL: &str = "DELETE FROM events WHERE id = ?";

const INSERT_COMMENT_SQL: &str = "INSERT INTO comments (comment, event_id) VALUES (?, ?)";
const DELETE_COMMENT_SQL: &str = "DELETE FROM comments WHERE id = ?";

/// Decode a column that may hold NULL. The Any driver rejects NULL even for `Option<T>`.
fn nullable<'r, T>(row: &'r AnyRow, column: &str) -> Result<Option<T>, sqlx::Error>
where
    T: Decode<'r, Any> + Type<Any>,
{
    if row.try_get_raw(column)?.is_null() {
        return Ok(None);
    }
    row.try_get(column).map(Some)
}

fn last_insert_id_sql(dialect: Dialect) -> &'static str {
    match dialect {
        Dialect::MySql => "SELECT CAST(LAST_INSERT_ID() AS SIGNED) AS id",
        Dialect::Sqlite => "SELECT last_insert_rowid() AS id",
    }
}

fn event_from_row(row: &AnyRow) -> Result<Event, sqlx::Error> {
    Ok(Event {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        event_time: row.try_get("event_time")?,
        description: row.try_get("description")?,
        location: row.try_get("location")?,
        likes: nullable::<i64>(row, "likes")?.unwrap_or(0),
        datetime_added: nullable::<String>(row, "datetime_added")?.unwrap_or_default(),
        comments: None,
    })
}

fn comment_from_row(row: &AnyRow) -> Result<Comment, sqlx::Error> {
    Ok(Comment {
        id: row.try_get("id")?,
        event_id: row.try_get("event_id")?,
        comment: row.try_get("comment")?,
        datetime_added: nullable(row, "datetime_added")?,
    })
}

/// Fold the rows of the event/comments outer join into one event.
fn event_from_join(rows: &[AnyRow]) -> Result<Option<Event>, sqlx::Error> {
    let Some(first) = rows.first() else {
        return Ok(None);
    };

    let mut event = event_from_row(first)?;
    let mut comments = Vec::new();
    for row in rows {
        // An event without comments yields one row of NULL comment columns
        let comment_id: Option<i64> = nullable(row, "comment_id")?;
        let text: Option<String> = nullable(row, "comment")?;
        if let (Some(id), Some(comment)) = (comment_id, text) {
            comments.push(Comment {
                id,
                event_id: event.id,
                comment,
                datetime_added: nullable(row, "comment_added")?,
            });
        }
    }
    event.comments = Some(comments);
    Ok(Some(event))
}

#[derive(Debug, Clone)]
pub struct RelationalStore {
    provider: ConnectionProvider,
}

impl RelationalStore {
    pub fn new(config: &DatabaseConfig) -> Self {
        Self {
            provider: ConnectionProvider::new(config),
        }
    }

    pub fn with_provider(provider: ConnectionProvider) -> Self {
        Self { provider }
    }

    async fn connect(&self) -> StoreResult<AnyConnection> {
        self.provider.acquire().await.into_live()
    }

    /// Id generated by the last insert on `conn`. SQLite does not report it
    /// through the Any driver, so it is asked for on the same connection.
    async fn inserted_id(
        &self,
        conn: &mut AnyConnection,
        reported: Option<i64>,
        table: &'static str,
    ) -> StoreResult<i64> {
        if let Some(id) = reported {
            return Ok(id);
        }
        let row = sqlx::query(last_insert_id_sql(self.provider.dialect()))
            .fetch_one(&mut *conn)
            .await?;
        match nullable::<i64>(&row, "id")? {
            Some(id) if id > 0 => Ok(id),
            _ => Err(StoreError::MissingInsertId(table)),
        }
    }

    async fn select_event(conn: &mut AnyConnection, id: i64) -> StoreResult<Option<Event>> {
        let row = sqlx::query(GET_EVENT_SQL)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(row.as_ref().map(event_from_row).transpose()?)
    }
}

#[async_trait]
impl EventStore for RelationalStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Relational
    }

    async fn is_available(&self) -> bool {
        self.provider.is_available().await
    }

    async fn list_events(&self) -> StoreResult<Vec<Event>> {
        let mut conn = self.connect().await?;
        debug!(sql = LIST_EVENTS_SQL);
        let rows = sqlx::query(LIST_EVENTS_SQL).fetch_all(&mut conn).await?;
        let events = rows
            .iter()
            .map(event_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        release(conn).await;
        info!(count = events.len(), "retrieved all events from db");
        Ok(events)
    }

    async fn get_event(&self, id: i64) -> StoreResult<Option<Event>> {
        let mut conn = self.connect().await?;
        debug!(sql = GET_EVENT_WITH_COMMENTS_SQL, id);
        let rows = sqlx::query(GET_EVENT_WITH_COMMENTS_SQL)
            .bind(id)
            .fetch_all(&mut conn)
            .await?;
        let event = event_from_join(&rows)?;
        release(conn).await;
        info!(event_id = id, found = event.is_some(), "retrieved event from db");
        Ok(event)
    }

    async fn add_event(&self, event: &NewEvent) -> StoreResult<i64> {
        let mut conn = self.connect().await?;
        debug!(sql = INSERT_EVENT_SQL);
        let result = sqlx::query(INSERT_EVENT_SQL)
            .bind(event.title.as_str())
            .bind(event.event_time.as_str())
            .bind(event.description.as_str())
            .bind(event.location.as_str())
            .execute(&mut conn)
            .await?;
        let id = self
            .inserted_id(&mut conn, result.last_insert_id(), "events")
            .await?;
        release(conn).await;
        info!(event_id = id, "inserted event");
        Ok(id)
    }

    async fn update_event(&self, update: &EventUpdate) -> StoreResult<()> {
        let mut conn = self.connect().await?;
        debug!(sql = UPDATE_EVENT_SQL, id = update.id);
        let result = sqlx::query(UPDATE_EVENT_SQL)
            .bind(update.title.as_str())
            .bind(update.event_time.as_str())
            .bind(update.description.as_str())
            .bind(update.location.as_str())
            .bind(update.id)
            .execute(&mut conn)
            .await?;
        release(conn).await;
        info!(
            event_id = update.id,
            rows = result.rows_affected(),
            "updated event"
        );
        Ok(())
    }

    async fn delete_event(&self, id: i64) -> StoreResult<i64> {
        let mut conn = self.connect().await?;
        // Comments and event go together or not at all; dropping `tx` rolls back
        let mut tx = conn.begin().await?;
        sqlx::query(DELETE_EVENT_COMMENTS_SQL)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query(DELETE_EVENT_SQL)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        release(conn).await;
        info!(event_id = id, "deleted event and comments");
        Ok(id)
    }

    async fn get_comments(&self, event_id: i64) -> StoreResult<Vec<Comment>> {
        let mut conn = self.connect().await?;
        debug!(sql = GET_COMMENTS_SQL, event_id);
        let rows = sqlx::query(GET_COMMENTS_SQL)
            .bind(event_id)
            .fetch_all(&mut conn)
            .await?;
        let comments = rows
            .iter()
            .map(comment_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        release(conn).await;
        info!(event_id, count = comments.len(), "retrieved comments");
        Ok(comments)
    }

    async fn add_comment(&self, event_id: i64, comment: &str) -> StoreResult<Option<i64>> {
        let mut conn = self.connect().await?;
        debug!(sql = INSERT_COMMENT_SQL, event_id);
        let result = sqlx::query(INSERT_COMMENT_SQL)
            .bind(comment)
            .bind(event_id)
            .execute(&mut conn)
            .await?;
        let id = self
            .inserted_id(&mut conn, result.last_insert_id(), "comments")
            .await?;
        release(conn).await;
        info!(event_id, comment_id = id, "inserted comment");
        Ok(Some(id))
    }

    async fn delete_comment(&self, event_id: i64, id: i64) -> StoreResult<i64> {
        let mut conn = self.connect().await?;
        debug!(sql = DELETE_COMMENT_SQL, id);
        sqlx::query(DELETE_COMMENT_SQL)
            .bind(id)
            .execute(&mut conn)
            .await?;
        release(conn).await;
        info!(event_id, comment_id = id, "deleted comment");
        Ok(id)
    }

    async fn change_likes(&self, id: i64, change: LikeChange) -> StoreResult<Option<Event>> {
        let mut conn = self.connect().await?;
        debug!(sql = change.update_sql(), id);
        sqlx::query(change.update_sql())
            .bind(id)
            .execute(&mut conn)
            .await?;
        let event = Self::select_event(&mut conn, id).await?;
        release(conn).await;
        info!(
            event_id = id,
            likes = ?event.as_ref().map(|e| e.likes),
            "{} event",
            change.verb()
        );
        Ok(event)
    }
}
