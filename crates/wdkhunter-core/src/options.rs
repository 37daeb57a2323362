//! 扫描选项与统计信息（模块）
use crate::candidate::{ScanMode, StrategyKind};
use crate::config::ScanConfig;

/// 字节源后端
/// - Flat：整文件读入内存
/// - Mapped：只读内存映射
/// - Store：SQLite 键值表，记录值按迭代顺序拼接
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Flat,
    Mapped,
    Store,
}

impl Backend {
    /// 解析 CLI 名称：flat / mmap / store
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "flat" => Some(Backend::Flat),
            "mmap" => Some(Backend::Mapped),
            "store" => Some(Backend::Store),
            _ => None,
        }
    }
}

/// 结果输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// 每行一个十六进制候选（目录模式下前缀文件名与制表符）
    Text,
    /// JSON 数组，每项包含来源、值、偏移与策略
    Json,
}

/// 扫描选项
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub backend: Backend,
    /// 依次运行的策略；重复项只保留一次
    pub strategies: Vec<StrategyKind>,
    /// None 表示按策略默认模式推断（含穷举滑窗即 AllMatches）
    pub mode: Option<ScanMode>,
    /// 标记集合、十六进制模式与存储表名
    pub config: ScanConfig,
    /// 线程数：None 表示自动（等于 CPU 核数）；Some(1) 走串行
    pub threads: Option<usize>,
    /// 最大文件大小（字节）；目录模式下超过则跳过
    pub max_file_size: Option<u64>,
    pub format: OutputFormat,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            backend: Backend::Flat,
            strategies: vec![StrategyKind::MagicPrefix],
            mode: None,
            config: ScanConfig::default(),
            threads: None,
            max_file_size: None,
            format: OutputFormat::Text,
        }
    }
}

impl ScanOptions {
    /// 实际生效的扫描模式
    pub fn effective_mode(&self) -> ScanMode {
        self.mode.unwrap_or_else(|| {
            if self.strategies.iter().any(|k| k.default_mode() == ScanMode::AllMatches) {
                ScanMode::AllMatches
            } else {
                ScanMode::FirstMatch
            }
        })
    }

    pub fn effective_threads(&self) -> usize {
        self.threads.unwrap_or_else(num_cpus::get).max(1)
    }
}

/// 扫描统计信息（便于 CLI 打印）
#[derive(Debug, Default, Clone)]
pub struct ScanStats {
    pub sources_scanned: usize,
    pub sources_failed: usize,
    pub sources_skipped: usize,
    pub raw_candidates: usize,
    pub candidates_total: usize,
    pub outputs_written: usize,
}
