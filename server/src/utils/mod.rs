//! 工具模块 - 通用工具函数和类型
//!
//! # 内容
//!
//! - [`AppError`] - 应用错误类型
//! - [`AppResult`] - 处理器 Result 别名
//! - 日志、随机 ID 等工具

pub mod error;
pub mod ids;
pub mod logger;
pub mod result;

pub use error::{AppError, ok, ok_with_message};
pub use ids::{random_id, short_id};
pub use result::AppResult;
