//! Deal Repository

use super::{BaseRepository, RepoResult};
use crate::db::models::Deal;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct DealRepository {
    base: BaseRepository,
}

impl DealRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// All deals a user participated in, either side
    pub async fn list_for_user(&self, uid: &str) -> RepoResult<Vec<Deal>> {
        let deals: Vec<Deal> = self
            .base
            .db()
            .query(
                "SELECT * FROM deal WHERE seller_id = $uid OR buyer_id = $uid
                 ORDER BY deal_date DESC",
            )
            .bind(("uid", uid.to_string()))
            .await?
            .take(0)?;
        Ok(deals)
    }
}
