//! Verification Code Repository
//!
//! Keyed store with explicit expiry for password-reset and email codes.
//! One live code per key; storing replaces any previous code.

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::VerificationCode;
use chrono::Utc;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const VCODE_TABLE: &str = "verification_code";

#[derive(Clone)]
pub struct VerificationRepository {
    base: BaseRepository,
}

impl VerificationRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Store a code, replacing any existing one for the same key
    pub async fn store(&self, code: VerificationCode) -> RepoResult<()> {
        let key = code.key.clone();
        self.base
            .db()
            .query("DELETE verification_code WHERE key = $key")
            .bind(("key", key))
            .await?;
        let created: Option<VerificationCode> =
            self.base.db().create(VCODE_TABLE).content(code).await?;
        created.ok_or_else(|| RepoError::Database("Failed to store verification code".to_string()))?;
        Ok(())
    }

    /// Verify and consume a code
    ///
    /// Expired or missing codes verify as false; the row is deleted on
    /// success and on expiry, so a code can be used at most once.
    pub async fn verify(&self, key: &str, code: &str) -> RepoResult<bool> {
        let rows: Vec<VerificationCode> = self
            .base
            .db()
            .query("SELECT * FROM verification_code WHERE key = $key")
            .bind(("key", key.to_string()))
            .await?
            .take(0)?;

        let Some(stored) = rows.into_iter().next() else {
            return Ok(false);
        };

        if stored.is_expired(Utc::now()) {
            self.delete(key).await?;
            return Ok(false);
        }

        if stored.code != code {
            return Ok(false);
        }

        self.delete(key).await?;
        Ok(true)
    }

    /// Explicitly drop a stored code
    pub async fn delete(&self, key: &str) -> RepoResult<()> {
        self.base
            .db()
            .query("DELETE verification_code WHERE key = $key")
            .bind(("key", key.to_string()))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use chrono::Duration;

    async fn setup() -> VerificationRepository {
        let db = DbService::open_in_memory().await.unwrap();
        VerificationRepository::new(db.db.clone())
    }

    #[tokio::test]
    async fn test_code_is_single_use() {
        let repo = setup().await;
        repo.store(VerificationCode::new("alice@campus.edu", "482913", 10))
            .await
            .unwrap();

        assert!(repo.verify("alice@campus.edu", "482913").await.unwrap());
        // Consumed on success
        assert!(!repo.verify("alice@campus.edu", "482913").await.unwrap());
    }

    #[tokio::test]
    async fn test_wrong_code_keeps_the_row() {
        let repo = setup().await;
        repo.store(VerificationCode::new("bob@campus.edu", "111111", 10))
            .await
            .unwrap();

        assert!(!repo.verify("bob@campus.edu", "000000").await.unwrap());
        assert!(repo.verify("bob@campus.edu", "111111").await.unwrap());
    }

    #[tokio::test]
    async fn test_expired_code_verifies_false() {
        let repo = setup().await;
        let mut code = VerificationCode::new("eve@campus.edu", "222222", 10);
        code.expires_at = Utc::now() - Duration::seconds(1);
        repo.store(code).await.unwrap();

        assert!(!repo.verify("eve@campus.edu", "222222").await.unwrap());
    }

    #[tokio::test]
    async fn test_store_replaces_previous_code() {
        let repo = setup().await;
        repo.store(VerificationCode::new("kim@campus.edu", "first1", 10))
            .await
            .unwrap();
        repo.store(VerificationCode::new("kim@campus.edu", "second", 10))
            .await
            .unwrap();

        assert!(!repo.verify("kim@campus.edu", "first1").await.unwrap());
        assert!(repo.verify("kim@campus.edu", "second").await.unwrap());
    }
}
