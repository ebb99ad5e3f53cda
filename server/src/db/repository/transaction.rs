//! Pending Transaction Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::PendingTransaction;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TX_TABLE: &str = "pending_transaction";

#[derive(Clone)]
pub struct TransactionRepository {
    base: BaseRepository,
}

impl TransactionRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Create a new pending transaction
    pub async fn create(&self, tx: PendingTransaction) -> RepoResult<PendingTransaction> {
        let created: Option<PendingTransaction> =
            self.base.db().create(TX_TABLE).content(tx).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create transaction".to_string()))
    }

    /// Find a transaction by its domain id
    pub async fn find_by_transaction_id(
        &self,
        transaction_id: &str,
    ) -> RepoResult<Option<PendingTransaction>> {
        let txs: Vec<PendingTransaction> = self
            .base
            .db()
            .query("SELECT * FROM pending_transaction WHERE transaction_id = $tid")
            .bind(("tid", transaction_id.to_string()))
            .await?
            .take(0)?;
        Ok(txs.into_iter().next())
    }

    /// Find a still-pending transaction owned by the given seller
    ///
    /// Confirmation authorizes by ownership: id AND seller must match.
    pub async fn find_pending_for_seller(
        &self,
        transaction_id: &str,
        seller_id: &str,
    ) -> RepoResult<Option<PendingTransaction>> {
        let txs: Vec<PendingTransaction> = self
            .base
            .db()
            .query(
                "SELECT * FROM pending_transaction
                 WHERE transaction_id = $tid AND seller_id = $seller AND status = 'pending'",
            )
            .bind(("tid", transaction_id.to_string()))
            .bind(("seller", seller_id.to_string()))
            .await?
            .take(0)?;
        Ok(txs.into_iter().next())
    }

    /// Mark a transaction rejected (expiry); terminal state
    pub async fn mark_rejected(&self, transaction_id: &str) -> RepoResult<()> {
        self.base
            .db()
            .query("UPDATE pending_transaction SET status = 'rejected' WHERE transaction_id = $tid")
            .bind(("tid", transaction_id.to_string()))
            .await?;
        Ok(())
    }

    /// All pending transactions for a seller (listing)
    pub async fn list_pending_for_seller(
        &self,
        seller_id: &str,
    ) -> RepoResult<Vec<PendingTransaction>> {
        let txs: Vec<PendingTransaction> = self
            .base
            .db()
            .query(
                "SELECT * FROM pending_transaction
                 WHERE seller_id = $seller AND status = 'pending' ORDER BY created_at DESC",
            )
            .bind(("seller", seller_id.to_string()))
            .await?
            .take(0)?;
        Ok(txs)
    }
}
