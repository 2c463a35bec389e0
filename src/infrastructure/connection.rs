// Connection provider - one fresh connection per repository operation

use sqlx::{AnyConnection, Connection};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::{DatabaseConfig, Dialect};
use crate::infrastructure::store::{StoreError, StoreResult};

/// Outcome of a connection attempt. `Unavailable` is an ordinary branch, not an error.
pub enum Acquired {
    Live(AnyConnection),
    Unavailable,
}

impl Acquired {
    pub fn is_live(&self) -> bool {
        matches!(self, Acquired::Live(_))
    }

    pub fn into_live(self) -> StoreResult<AnyConnection> {
        match self {
            Acquired::Live(conn) => Ok(conn),
            Acquired::Unavailable => Err(StoreError::Unavailable),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConnectionProvider {
    url: String,
    dialect: Dialect,
    connect_timeout: Duration,
}

impl ConnectionProvider {
    pub fn new(config: &DatabaseConfig) -> Self {
        Self::for_url(config.connection_url(), config.connect_timeout())
    }

    pub fn for_url(url: impl Into<String>, connect_timeout: Duration) -> Self {
        sqlx::any::install_default_drivers();
        let url = url.into();
        Self {
            dialect: Dialect::from_url(&url),
            url,
            connect_timeout,
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Try to open a connection. Failures are logged and reported as `Unavailable`.
    pub async fn acquire(&self) -> Acquired {
        match tokio::time::timeout(self.connect_timeout, AnyConnection::connect(&self.url)).await {
            Ok(Ok(conn)) => Acquired::Live(conn),
            Ok(Err(err)) => {
                warn!(error = %err, "no connection - using mock data");
                Acquired::Unavailable
            }
            Err(_) => {
                warn!(
                    timeout_secs = self.connect_timeout.as_secs(),
                    "connection attempt timed out - using mock data"
                );
                Acquired::Unavailable
            }
        }
    }

    pub async fn is_available(&self) -> bool {
        match self.acquire().await {
            Acquired::Live(conn) => {
                release(conn).await;
                true
            }
            Acquired::Unavailable => false,
        }
    }
}

/// Close a connection after a successful operation.
pub async fn release(conn: AnyConnection) {
    if let Err(err) = conn.close().await {
        debug!(error = %err, "failed to close connection cleanly");
    }
}
