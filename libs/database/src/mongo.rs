//! MongoDB connector for the store database

use mongodb::{Client, options::ClientOptions};
use std::time::Duration;
use tracing::info;

use crate::error::{DatabaseError, DatabaseResult};
use crate::retry::{RetryConfig, retry, retry_with_backoff};

/// Connection settings for the store database
///
/// Construct in code or load from the environment:
///
/// ```ignore
/// let config = MongoConfig::with_database("mongodb://localhost:27017", "pos");
/// let config = MongoConfig::from_env()?;
/// ```
#[derive(Clone, Debug)]
pub struct MongoConfig {
    /// Connection string, `mongodb://[user:pass@]host[:port][/...]`
    pub url: String,

    /// Database name holding the `products` and `sales` collections
    pub database: String,

    /// Optional application name reported to the server
    pub app_name: Option<String>,

    pub max_pool_size: u32,
    pub min_pool_size: u32,
    pub connect_timeout_secs: u64,
    pub server_selection_timeout_secs: u64,
}

impl MongoConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_database(url: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            database: database.into(),
            ..Self::default()
        }
    }

    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    /// Load settings from environment variables
    ///
    /// - `MONGODB_URL` (required)
    /// - `MONGODB_DATABASE` (default: `pos`)
    /// - `MONGODB_APP_NAME` (optional)
    /// - `MONGODB_MAX_POOL_SIZE` (default: 100)
    /// - `MONGODB_MIN_POOL_SIZE` (default: 5)
    /// - `MONGODB_CONNECT_TIMEOUT_SECS` (default: 10)
    /// - `MONGODB_SERVER_SELECTION_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> DatabaseResult<Self> {
        let url = std::env::var("MONGODB_URL").map_err(|_| {
            DatabaseError::Config("environment variable MONGODB_URL is required".to_string())
        })?;

        let database =
            std::env::var("MONGODB_DATABASE").unwrap_or_else(|_| "pos".to_string());
        let app_name = std::env::var("MONGODB_APP_NAME").ok();

        Ok(Self {
            url,
            database,
            app_name,
            max_pool_size: env_parsed("MONGODB_MAX_POOL_SIZE", 100)?,
            min_pool_size: env_parsed("MONGODB_MIN_POOL_SIZE", 5)?,
            connect_timeout_secs: env_parsed("MONGODB_CONNECT_TIMEOUT_SECS", 10)?,
            server_selection_timeout_secs: env_parsed(
                "MONGODB_SERVER_SELECTION_TIMEOUT_SECS",
                30,
            )?,
        })
    }
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            url: "mongodb://localhost:27017".to_string(),
            database: "pos".to_string(),
            app_name: None,
            max_pool_size: 100,
            min_pool_size: 5,
            connect_timeout_secs: 10,
            server_selection_timeout_secs: 30,
        }
    }
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> DatabaseResult<T>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw.parse().map_err(|e| {
            DatabaseError::Config(format!("failed to parse {}: {}", key, e))
        }),
        Err(_) => Ok(default),
    }
}

/// Connect to MongoDB with default pool settings
pub async fn connect(url: &str) -> DatabaseResult<Client> {
    connect_from_config(&MongoConfig::new(url)).await
}

/// Connect using a [`MongoConfig`]
pub async fn connect_from_config(config: &MongoConfig) -> DatabaseResult<Client> {
    info!("Connecting to MongoDB at {}", config.url);

    let mut options = ClientOptions::parse(&config.url).await?;

    options.max_pool_size = Some(config.max_pool_size);
    options.min_pool_size = Some(config.min_pool_size);
    options.connect_timeout = Some(Duration::from_secs(config.connect_timeout_secs));
    options.server_selection_timeout =
        Some(Duration::from_secs(config.server_selection_timeout_secs));

    if let Some(ref app_name) = config.app_name {
        options.app_name = Some(app_name.clone());
    }

    let client = Client::with_options(options)?;

    // Verify the connection with a lightweight round trip
    client
        .list_database_names()
        .await
        .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

    info!("Connected to MongoDB");
    Ok(client)
}

/// Connect from config with automatic retry on transient failures
pub async fn connect_with_retry(
    config: &MongoConfig,
    retry_config: Option<RetryConfig>,
) -> DatabaseResult<Client> {
    let config_clone = config.clone();

    match retry_config {
        Some(policy) => retry_with_backoff(|| connect_from_config(&config_clone), policy).await,
        None => retry(|| connect_from_config(&config_clone)).await,
    }
}

/// Check connectivity with a lightweight round trip
pub async fn check_health(client: &Client) -> bool {
    client.list_database_names().await.is_ok()
}
