// crates/rg_config/src/error.rs

//! 配置层错误类型

/// 配置错误
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 读取配置文件失败
    #[error("读取配置文件失败: {0}")]
    Io(#[from] std::io::Error),

    /// JSON 解析失败
    #[error("配置解析失败: {0}")]
    Parse(#[from] serde_json::Error),

    /// 配置项取值非法
    #[error("配置项 '{key}' 取值非法: {value} ({reason})")]
    InvalidValue {
        /// 配置键
        key: String,
        /// 实际取值
        value: String,
        /// 拒绝原因
        reason: String,
    },
}

impl ConfigError {
    /// 非法取值的便捷构造
    pub fn invalid(
        key: impl Into<String>,
        value: impl std::fmt::Display,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            key: key.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}
