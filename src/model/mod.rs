//! The record store: schema, the `SubscriberStore` trait and its backends.

mod memory;
mod postgres;
mod subscriber;

// re-exports
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use subscriber::{
    FieldError, SubscriberDraft, SubscriberMetadata, SubscriberRecord, ValidEmail, ValidSource,
    ValidSubscriber, ValidationErrors,
};

use async_trait::async_trait;

/// Durable storage of subscriber records.
///
/// Backends only implement `insert_valid`; schema enforcement lives in the provided `insert`
/// so every backend rejects the same drafts with the same messages.
/// No uniqueness is enforced on `email` or on `(email, source)`.
#[async_trait]
pub trait SubscriberStore: Send + Sync {
    /// Persists an already validated subscriber, assigning its id and timestamps.
    async fn insert_valid(&self, subscriber: ValidSubscriber) -> StoreResult<SubscriberRecord>;

    /// Validates and normalizes the draft, then persists it.
    async fn insert(&self, draft: SubscriberDraft) -> StoreResult<SubscriberRecord> {
        let subscriber = ValidSubscriber::try_from(draft)?;
        self.insert_valid(subscriber).await
    }
}

// ###################################
// ->   ERROR
// ###################################
pub type StoreResult<T> = core::result::Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("subscriber validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("store is unavailable")]
    Unavailable,
    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

pub type Result<T> = core::result::Result<T, Error>;

/// Errors while setting up a store backend.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(#[from] crate::config::ConfigError),
    #[error("sqlx migration error: {0}")]
    SqlxMigrate(#[from] sqlx::migrate::MigrateError),
}
