// Relational schema for the events database, in MySQL/MariaDB and SQLite flavours

use sqlx::AnyConnection;
use tracing::info;

use crate::config::Dialect;

const MYSQL_CREATE_EVENTS: &str = r#"
    CREATE TABLE events (
        id INT NOT NULL AUTO_INCREMENT,
        title VARCHAR(255) NOT NULL,
        event_time VARCHAR(100) NOT NULL,
        description TEXT NOT NULL,
        location VARCHAR(255) NOT NULL,
        likes INT DEFAULT 0,
        datetime_added TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        PRIMARY KEY (id)
    )
"#;

const MYSQL_CREATE_COMMENTS: &str = r#"
    CREATE TABLE comments (
        id INT NOT NULL AUTO_INCREMENT,
        comment TEXT NOT NULL,
        event_id INT NOT NULL,
        datetime_added TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        PRIMARY KEY (id),
        FOREIGN KEY (event_id) REFERENCES events(id)
    )
"#;

const SQLITE_CREATE_EVENTS: &str = r#"
    CREATE TABLE events (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title VARCHAR(255) NOT NULL,
        event_time VARCHAR(100) NOT NULL,
        description TEXT NOT NULL,
        location VARCHAR(255) NOT NULL,
        likes INTEGER DEFAULT 0,
        datetime_added TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
"#;

const SQLITE_CREATE_COMMENTS: &str = r#"
    CREATE TABLE comments (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        comment TEXT NOT NULL,
        event_id INTEGER NOT NULL REFERENCES events(id),
        datetime_added TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
"#;

/// Rows inserted into a freshly provisioned database. No comments are seeded.
pub const SEED_EVENTS: [(&str, &str, &str, &str); 2] = [
    (
        "Pet Show Db",
        "November 6 at Noon",
        "Super-fun with furry friends!",
        "Dog Park",
    ),
    (
        "Company Picnic Db",
        "July 4th at 10:00AM",
        "Come for free food and drinks.",
        "At the lake",
    ),
];

fn create_statements(dialect: Dialect) -> [&'static str; 2] {
    match dialect {
        Dialect::MySql => [MYSQL_CREATE_EVENTS, MYSQL_CREATE_COMMENTS],
        Dialect::Sqlite => [SQLITE_CREATE_EVENTS, SQLITE_CREATE_COMMENTS],
    }
}

/// Drop both tables, children first.
pub async fn drop_tables(conn: &mut AnyConnection) -> Result<(), sqlx::Error> {
    sqlx::query("DROP TABLE IF EXISTS comments")
        .execute(&mut *conn)
        .await?;
    sqlx::query("DROP TABLE IF EXISTS events")
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn create_tables(conn: &mut AnyConnection, dialect: Dialect) -> Result<(), sqlx::Error> {
    for statement in create_statements(dialect) {
        sqlx::query(statement).execute(&mut *conn).await?;
    }
    info!(?dialect, "tables created");
    Ok(())
}

pub async fn seed_events(conn: &mut AnyConnection) -> Result<(), sqlx::Error> {
    for (title, event_time, description, location) in SEED_EVENTS {
        sqlx::query(
            "INSERT INTO events (title, event_time, description, location) VALUES (?, ?, ?, ?)",
        )
        .bind(title)
        .bind(event_time)
        .bind(description)
        .bind(location)
        .execute(&mut *conn)
        .await?;
    }
    info!(count = SEED_EVENTS.len(), "seed records added");
    Ok(())
}

/// Recreate the schema from scratch on an already selected database.
pub async fn reset(conn: &mut AnyConnection, dialect: Dialect) -> Result<(), sqlx::Error> {
    drop_tables(conn).await?;
    create_tables(conn, dialect).await
}
