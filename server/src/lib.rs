//! Campus Server - 校园社交与积分商店后端
//!
//! # 架构概述
//!
//! 本模块是服务器主入口，提供以下核心功能：
//!
//! - **Feed 引擎** (`feed`): 派生排序分数、游标分页、首页 TTL 缓存与互动操作
//! - **积分结算** (`settlement`): 数字商品即时结算、实体商品两段式确认
//! - **消息总线** (`message`): 进程内广播，写入提交后的尽力而为通知
//! - **数据库** (`db`): 嵌入式 SurrealDB 存储
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── api/           # HTTP 路由和处理器
//! ├── feed/          # 排序、分页、缓存、互动
//! ├── settlement/    # 积分结算引擎
//! ├── notify/        # 通知发送
//! ├── message/       # 广播总线
//! ├── db/            # 数据库层（模型 + 仓储）
//! └── utils/         # 错误、日志、随机 ID
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod feed;
pub mod message;
pub mod notify;
pub mod settlement;
pub mod utils;

// Re-export 公共类型
pub use core::{Config, Server, ServerState};
pub use feed::{EngagementEngine, FeedEngine};
pub use message::{BusMessage, EventType, MessageBus};
pub use settlement::SettlementEngine;
pub use shared::ApiResponse;
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// 设置运行环境：加载 .env、创建工作目录、初始化日志
pub fn setup_environment() -> Result<Config, AppError> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    std::fs::create_dir_all(&config.work_dir)
        .map_err(|e| AppError::internal(format!("Failed to create work dir: {e}")))?;
    let log_dir = config.log_dir();
    std::fs::create_dir_all(&log_dir)
        .map_err(|e| AppError::internal(format!("Failed to create log dir: {e}")))?;

    let level = if config.is_production() { "info" } else { "debug" };
    init_logger_with_file(Some(level), log_dir.to_str());

    Ok(config)
}
