//! 通知模块 - 尽力而为的用户通知
//!
//! 通知是副作用记录：落库失败只记日志，绝不让触发它的业务操作失败。
//! 成功落库后向总线广播一条 [`EventType::Notification`] 事件。

use shared::message::{BusMessage, EventType, NotificationPayload};

use crate::db::models::Notification;
use crate::db::repository::NotificationRepository;
use crate::message::MessageBus;
use crate::utils::AppResult;

#[derive(Clone)]
pub struct Notifier {
    notifications: NotificationRepository,
    bus: MessageBus,
}

impl Notifier {
    pub fn new(notifications: NotificationRepository, bus: MessageBus) -> Self {
        Self { notifications, bus }
    }

    /// Deliver a notification, best-effort
    ///
    /// Storage failures are logged and swallowed; callers never see them.
    pub async fn send(&self, notification: Notification) {
        let user_id = notification.user_id.clone();
        match self.notifications.create(notification).await {
            Ok(created) => {
                self.bus.publish(BusMessage::new(
                    EventType::Notification,
                    &NotificationPayload {
                        notification_id: created.notification_id,
                        user_id: created.user_id,
                        kind: created.kind,
                    },
                ));
            }
            Err(e) => {
                tracing::warn!(target: "notify", user_id = %user_id, error = %e,
                    "Failed to store notification");
            }
        }
    }

    /// Notifications for a user, newest first
    pub async fn list_for_user(&self, uid: &str) -> AppResult<Vec<Notification>> {
        Ok(self.notifications.list_for_user(uid).await?)
    }

    /// Mark one notification read; 404 if it does not exist
    pub async fn mark_read(&self, notification_id: &str) -> AppResult<()> {
        Ok(self.notifications.mark_read(notification_id).await?)
    }
}
