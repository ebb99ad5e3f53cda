use std::time::Duration;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::core::Config;
use crate::db::DbService;
use crate::db::repository::{
    DealRepository, NotificationRepository, PostRepository, ProductRepository,
    TransactionRepository, UserRepository,
};
use crate::feed::{EngagementEngine, FeedCache, FeedEngine};
use crate::message::{BusConfig, MessageBus};
use crate::notify::Notifier;
use crate::settlement::SettlementEngine;
use crate::utils::AppResult;

/// 服务器状态 - 持有所有引擎与仓储的共享引用
///
/// 所有字段内部都是 Arc 风格的浅拷贝句柄，Clone 成本极低；
/// 每个 HTTP 请求处理器通过 axum `State` 拿到一份。
///
/// # 组件
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置项（不可变） |
/// | db | 嵌入式数据库句柄 |
/// | message_bus | 进程内广播总线 |
/// | feed | Feed 排序分页引擎 |
/// | engagement | 互动引擎 |
/// | settlement | 积分结算引擎 |
/// | notifier | 通知发送器 |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub db: Surreal<Db>,
    pub message_bus: MessageBus,
    pub feed: FeedEngine,
    pub engagement: EngagementEngine,
    pub settlement: SettlementEngine,
    pub notifier: Notifier,
    pub users: UserRepository,
    pub products: ProductRepository,
}

impl ServerState {
    /// 初始化服务器状态（磁盘数据库）
    pub async fn initialize(config: Config) -> AppResult<Self> {
        let db_path = config.db_path();
        let db = DbService::open(&db_path.to_string_lossy()).await?;
        Ok(Self::assemble(config, db))
    }

    /// 初始化服务器状态（内存数据库，测试用）
    pub async fn initialize_in_memory(config: Config) -> AppResult<Self> {
        let db = DbService::open_in_memory().await?;
        Ok(Self::assemble(config, db))
    }

    fn assemble(config: Config, db: DbService) -> Self {
        let db = db.db;
        let message_bus = MessageBus::from_config(BusConfig {
            channel_capacity: config.bus_capacity,
        });

        let users = UserRepository::new(db.clone());
        let posts = PostRepository::new(db.clone());
        let products = ProductRepository::new(db.clone());
        let transactions = TransactionRepository::new(db.clone());
        let deals = DealRepository::new(db.clone());
        let notifications = NotificationRepository::new(db.clone());

        let notifier = Notifier::new(notifications, message_bus.clone());
        let cache = FeedCache::with_ttl(Duration::from_secs(config.feed_cache_ttl_secs));
        let feed = FeedEngine::new(posts.clone(), cache).with_page_size(config.feed_page_size);
        let engagement = EngagementEngine::new(posts, users.clone(), message_bus.clone());
        let settlement = SettlementEngine::new(
            db.clone(),
            users.clone(),
            products.clone(),
            transactions,
            deals,
            notifier.clone(),
        );

        Self {
            config,
            db,
            message_bus,
            feed,
            engagement,
            settlement,
            notifier,
            users,
            products,
        }
    }

    /// 优雅关闭：通知总线订阅者退出
    pub fn shutdown(&self) {
        self.message_bus.shutdown();
    }
}
