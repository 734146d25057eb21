//! MongoDB connection management for the store database
//!
//! The POS domain crates talk to a single MongoDB database holding the
//! `products` and `sales` collections. This library owns the connection
//! lifecycle: configuration (from the environment or built in code),
//! connecting with retry/backoff, and health checks.
//!
//! # Examples
//!
//! ```ignore
//! use database::mongo::{self, MongoConfig};
//!
//! let config = MongoConfig::from_env()?;
//! let client = mongo::connect_from_config(&config).await?;
//! let db = client.database(config.database());
//! ```

pub mod error;
pub mod mongo;
pub mod retry;

pub use error::{DatabaseError, DatabaseResult};
pub use mongo::MongoConfig;
pub use retry::{RetryConfig, retry, retry_with_backoff};
