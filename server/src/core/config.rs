use std::path::PathBuf;

/// 服务器配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | /var/lib/campus | 工作目录（数据库、日志） |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | FEED_CACHE_TTL_SECS | 300 | Feed 首页缓存 TTL（秒） |
/// | FEED_PAGE_SIZE | 15 | Feed 默认页大小 |
/// | BUS_CAPACITY | 1024 | 广播通道容量 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/campus HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库和日志文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// Feed 首页缓存存活时间（秒）
    pub feed_cache_ttl_secs: u64,
    /// Feed 默认页大小
    pub feed_page_size: usize,
    /// 广播通道容量
    pub bus_capacity: usize,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/campus".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            feed_cache_ttl_secs: std::env::var("FEED_CACHE_TTL_SECS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(300),
            feed_page_size: std::env::var("FEED_PAGE_SIZE")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(15),
            bus_capacity: std::env::var("BUS_CAPACITY")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(1024),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    /// 数据库存储路径
    pub fn db_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("db")
    }

    /// 日志目录
    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_keep_defaults() {
        let config = Config::with_overrides("/tmp/campus-test", 8080);
        assert_eq!(config.work_dir, "/tmp/campus-test");
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.db_path(), PathBuf::from("/tmp/campus-test/db"));
    }
}
