//! Notification Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::Notification;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const NOTIFICATION_TABLE: &str = "notification";

#[derive(Clone)]
pub struct NotificationRepository {
    base: BaseRepository,
}

impl NotificationRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Create a notification row
    pub async fn create(&self, notification: Notification) -> RepoResult<Notification> {
        let created: Option<Notification> = self
            .base
            .db()
            .create(NOTIFICATION_TABLE)
            .content(notification)
            .await?;
        created.ok_or_else(|| RepoError::Database("Failed to create notification".to_string()))
    }

    /// Notifications for a user, newest first
    pub async fn list_for_user(&self, uid: &str) -> RepoResult<Vec<Notification>> {
        let notifications: Vec<Notification> = self
            .base
            .db()
            .query("SELECT * FROM notification WHERE user_id = $uid ORDER BY created_at DESC")
            .bind(("uid", uid.to_string()))
            .await?
            .take(0)?;
        Ok(notifications)
    }

    /// Mark one notification read
    pub async fn mark_read(&self, notification_id: &str) -> RepoResult<()> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE notification SET is_read = true
                 WHERE notification_id = $nid RETURN AFTER",
            )
            .bind(("nid", notification_id.to_string()))
            .await?;
        let rows: Vec<Notification> = result.take(0)?;
        if rows.is_empty() {
            return Err(RepoError::NotFound(format!(
                "Notification {} not found",
                notification_id
            )));
        }
        Ok(())
    }
}
