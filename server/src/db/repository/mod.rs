//! Repository Module
//!
//! One repository per SurrealDB table, all built on [`BaseRepository`].

// Accounts + social graph
pub mod user;

// Feed
pub mod post;

// Marketplace
pub mod deal;
pub mod product;
pub mod transaction;

// Side records
pub mod notification;
pub mod verification;

// Re-exports
pub use deal::DealRepository;
pub use notification::NotificationRepository;
pub use post::{PostRepository, PostSet};
pub use product::ProductRepository;
pub use transaction::TransactionRepository;
pub use user::UserRepository;
pub use verification::VerificationRepository;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        let msg = err.to_string();
        // Unique index violations surface as conflicts, not 500s
        if msg.contains("already contains") || msg.contains("index") && msg.contains("unique") {
            RepoError::Duplicate(msg)
        } else {
            RepoError::Database(msg)
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}
