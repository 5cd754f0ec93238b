//! Transport 错误类型

use std::path::PathBuf;

use thiserror::Error;

/// Transport 错误
#[derive(Debug, Error)]
pub enum TransportError {
    /// 回放文件无法打开
    #[error("failed to open replay file {path}: {source}")]
    ReplayOpen {
        /// 文件路径
        path: PathBuf,
        /// 底层 IO 错误
        #[source]
        source: std::io::Error,
    },

    /// 回放记录解析失败
    #[error("replay line {line}: {message}")]
    ReplayParse {
        /// 行号 (从 1 开始)
        line: usize,
        /// 错误消息
        message: String,
    },

    /// 高度剖面参数非法
    #[error("invalid profile: {message}")]
    InvalidProfile {
        /// 错误消息
        message: String,
    },

    /// 合约错误
    #[error(transparent)]
    Contract(#[from] contracts::ContractError),
}

/// Transport Result 类型别名
pub type Result<T> = std::result::Result<T, TransportError>;
