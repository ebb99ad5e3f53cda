//! 消息总线核心实现
//!
//! # 消息流
//!
//! ```text
//! Feed/Settlement 引擎 ──▶ publish() ──▶ broadcast::Sender ──▶ 所有订阅者
//! ```
//!
//! 总线只做扇出，不做背压处理：落后的订阅者由 broadcast 通道按容量
//! 丢弃最旧消息。发布是 fire-and-forget，总线不可用绝不影响 HTTP 响应。

use shared::message::BusMessage;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

/// Configuration for the broadcast channel
#[derive(Debug, Clone)]
pub struct BusConfig {
    /// Capacity of the broadcast channel (default: 1024)
    pub channel_capacity: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 1024,
        }
    }
}

/// 消息总线 - 负责事件扇出
///
/// # 职责
///
/// - 事件发布 (publish)
/// - 订阅管理 (subscribe)
/// - 关闭信号 (shutdown_token)
#[derive(Debug, Clone)]
pub struct MessageBus {
    /// 服务器到订阅者的广播通道
    server_tx: broadcast::Sender<BusMessage>,
    /// 关闭信号令牌
    shutdown_token: CancellationToken,
}

impl MessageBus {
    /// 创建默认容量的消息总线
    pub fn new() -> Self {
        Self::from_config(BusConfig::default())
    }

    /// 从配置创建消息总线
    pub fn from_config(config: BusConfig) -> Self {
        let (server_tx, _) = broadcast::channel(config.channel_capacity);
        Self {
            server_tx,
            shutdown_token: CancellationToken::new(),
        }
    }

    /// 创建指定容量的消息总线
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_config(BusConfig {
            channel_capacity: capacity,
        })
    }

    /// 发布事件到所有订阅者
    ///
    /// 没有订阅者时 send 返回错误；对总线而言这不是故障，静默忽略。
    pub fn publish(&self, msg: BusMessage) {
        let _ = self.server_tx.send(msg);
    }

    /// 订阅服务器广播
    pub fn subscribe(&self) -> broadcast::Receiver<BusMessage> {
        self.server_tx.subscribe()
    }

    /// 当前订阅者数量
    pub fn subscriber_count(&self) -> usize {
        self.server_tx.receiver_count()
    }

    /// 获取广播发送端 (高级用法)
    pub fn sender(&self) -> &broadcast::Sender<BusMessage> {
        &self.server_tx
    }

    /// 获取关闭令牌 (用于监控关闭信号)
    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown_token
    }

    /// 优雅关闭消息总线
    pub fn shutdown(&self) {
        tracing::info!("Shutting down message bus");
        self.shutdown_token.cancel();
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}
