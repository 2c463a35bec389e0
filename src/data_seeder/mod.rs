// Database initializer - provision the events schema and seed rows, retrying until the server is up

use anyhow::{bail, Context};
use sqlx::{AnyConnection, Connection};
use std::time::Duration;
use tracing::{info, warn};

use crate::config::{DatabaseConfig, Dialect, InitializerConfig};
use crate::infrastructure::schema;

/// Exponential backoff between provisioning attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(64),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &InitializerConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            ..Self::default()
        }
    }

    /// Delay after the given failed attempt (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }
}

async fn connect(url: &str, timeout: Duration) -> anyhow::Result<AnyConnection> {
    sqlx::any::install_default_drivers();
    tokio::time::timeout(timeout, AnyConnection::connect(url))
        .await
        .context("timed out connecting to database")?
        .context("failed to connect to database")
}

fn checked_database_name(name: &str) -> anyhow::Result<&str> {
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        bail!("invalid database name: {:?}", name);
    }
    Ok(name)
}

/// Drop and recreate the MySQL database, then connect to it.
async fn recreate_mysql_database(config: &DatabaseConfig) -> anyhow::Result<AnyConnection> {
    let name = checked_database_name(&config.database)?;
    let mut server = connect(&config.server_url(), config.connect_timeout()).await?;

    sqlx::query(&format!("DROP DATABASE IF EXISTS `{}`", name))
        .execute(&mut server)
        .await
        .context("failed to drop database")?;
    sqlx::query(&format!("CREATE DATABASE `{}`", name))
        .execute(&mut server)
        .await
        .context("failed to create database")?;
    server.close().await?;
    info!(database = name, "database recreated");

    connect(&config.connection_url(), config.connect_timeout()).await
}

/// One provisioning attempt: fresh schema plus the two seed events.
pub async fn initialize_database(config: &InitializerConfig) -> anyhow::Result<()> {
    let database = &config.database;
    let dialect = database.dialect();

    let mut conn = match dialect {
        Dialect::MySql => {
            let mut conn = recreate_mysql_database(database).await?;
            schema::create_tables(&mut conn, dialect)
                .await
                .context("failed to create tables")?;
            conn
        }
        Dialect::Sqlite => {
            let mut conn = connect(&database.connection_url(), database.connect_timeout()).await?;
            schema::reset(&mut conn, dialect)
                .await
                .context("failed to recreate tables")?;
            conn
        }
    };

    schema::seed_events(&mut conn)
        .await
        .context("failed to seed events")?;
    conn.close().await?;
    Ok(())
}

/// Run `initialize_database` until it succeeds or the attempts run out.
pub async fn run_with_retry(config: &InitializerConfig, policy: &RetryPolicy) -> anyhow::Result<()> {
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match initialize_database(config).await {
            Ok(()) => {
                info!(attempt, "database initialized");
                return Ok(());
            }
            Err(err) if attempt >= max_attempts => {
                return Err(err.context(format!("giving up after {} attempts", attempt)));
            }
            Err(err) => {
                let delay = policy.delay_after(attempt);
                warn!(
                    attempt,
                    max_attempts,
                    delay_secs = delay.as_secs_f64(),
                    error = %format!("{:#}", err),
                    "database initialization failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
