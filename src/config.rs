use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Which SQL dialect a database URL speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dialect {
    MySql,
    Sqlite,
}

impl Dialect {
    pub fn from_url(url: &str) -> Self {
        if url.starts_with("sqlite:") {
            Dialect::Sqlite
        } else {
            Dialect::MySql
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub user: String,
    pub password: String,
    pub database: String,
    /// Full connection URL; takes precedence over the individual fields.
    pub url: Option<String>,
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Configuration of the events API process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
}

/// Configuration of the server-rendered website.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebsiteConfig {
    /// Base URL of the events API.
    pub api_url: String,
    pub server: ServerConfig,
}

/// Configuration of the database provisioning program.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitializerConfig {
    pub database: DatabaseConfig,
    pub max_attempts: u32,
}

fn var_or(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    lookup(key).unwrap_or_else(|| default.to_string())
}

fn parsed_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    lookup(key)
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

fn process_env(key: &str) -> Option<String> {
    env::var(key).ok()
}

impl DatabaseConfig {
    fn from_lookup(
        lookup: &impl Fn(&str) -> Option<String>,
        default_host: &str,
        default_user: &str,
    ) -> Self {
        Self {
            host: var_or(lookup, "DBHOST", default_host),
            user: var_or(lookup, "DBUSER", default_user),
            password: var_or(lookup, "DBPASSWORD", "letmein!"),
            database: var_or(lookup, "DBDATABASE", "events_db"),
            url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            connect_timeout_secs: parsed_or(lookup, "DB_CONNECT_TIMEOUT_SECS", 5),
        }
    }

    /// Configuration pointing at an explicit URL, mostly useful for SQLite files.
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            host: String::new(),
            user: String::new(),
            password: String::new(),
            database: String::new(),
            url: Some(url.into()),
            connect_timeout_secs: 5,
        }
    }

    pub fn dialect(&self) -> Dialect {
        Dialect::from_url(&self.connection_url())
    }

    /// URL of the events database.
    pub fn connection_url(&self) -> String {
        match &self.url {
            Some(url) => url.clone(),
            None => format!("{}/{}", self.server_url(), self.database),
        }
    }

    /// URL of the database server without selecting a database.
    ///
    /// For an explicit URL this is the URL itself.
    pub fn server_url(&self) -> String {
        match &self.url {
            Some(url) => url.clone(),
            None => format!(
                "mysql://{}:{}@{}",
                urlencoding::encode(&self.user),
                urlencoding::encode(&self.password),
                self.host
            ),
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs.max(1))
    }
}

impl ServerConfig {
    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>, default_port: u16) -> Self {
        Self {
            host: var_or(lookup, "SERVICE_HOST", "0.0.0.0"),
            port: parsed_or(lookup, "SERVICE_PORT", default_port),
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl ApiConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self::from_lookup(process_env))
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            database: DatabaseConfig::from_lookup(&lookup, "localhost", "events_user"),
            server: ServerConfig::from_lookup(&lookup, 8082),
        }
    }
}

impl WebsiteConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self::from_lookup(process_env))
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let api_url = var_or(&lookup, "SERVER", "http://localhost:8082");
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            server: ServerConfig::from_lookup(&lookup, 8080),
        }
    }
}

impl InitializerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self::from_lookup(process_env))
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            database: DatabaseConfig::from_lookup(&lookup, "127.0.0.1", "root"),
            max_attempts: parsed_or(&lookup, "INIT_MAX_ATTEMPTS", 10),
        }
    }
}
