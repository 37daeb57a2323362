//! 错误类型（核心库对外统一使用 `ScanError`）
use std::path::PathBuf;

use thiserror::Error;

/// 错误大类：CLI 据此决定展示方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// 打开/读取/映射/写出失败，或存储无法以只读方式打开
    Io,
    /// 越界访问（实现缺陷，正常流程不应出现）
    OutOfRange,
    /// 存储迭代过程中单条记录读取失败
    CorruptStore,
    /// 配置或模式非法
    Config,
    /// 扫描线程异常退出（实现缺陷）
    Internal,
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("io error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot open store {} read-only: {source}", path.display())]
    StoreOpen {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("range {offset}+{count} out of bounds for source of length {len}")]
    OutOfRange { offset: usize, count: usize, len: usize },

    #[error("corrupt store record #{record}: {reason}")]
    CorruptStore { record: usize, reason: String },

    #[error("invalid config: {0}")]
    Config(String),

    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("write output failed: {0}")]
    Output(#[source] std::io::Error),

    #[error("scan worker failed: {0}")]
    Worker(String),
}

impl ScanError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ScanError::Io { path: path.into(), source }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            ScanError::Io { .. } | ScanError::StoreOpen { .. } | ScanError::Output(_) => ErrorClass::Io,
            ScanError::OutOfRange { .. } => ErrorClass::OutOfRange,
            ScanError::CorruptStore { .. } => ErrorClass::CorruptStore,
            ScanError::Config(_) | ScanError::Pattern(_) => ErrorClass::Config,
            ScanError::Worker(_) => ErrorClass::Internal,
        }
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
