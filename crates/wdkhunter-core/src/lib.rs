//! 核心扫描库：在不透明的二进制数据中定位 5 字节候选
//!
//! 流程：后端选择 -> 字节源 -> 一个或多个扫描策略 -> 候选聚合 -> 输出。
//! - 字节源（`ByteSource`）屏蔽数据来源：整读、内存映射、SQLite 键值表拼接。
//! - 三种策略共用同一个字节源接口：魔数前缀、穷举滑窗、十六进制正则。
//! - 聚合按 5 字节值去重，保留首次出现顺序；“没有候选”是空结果，不是错误。
//! - 只产出候选，不做校验、解密或钱包格式解析。

mod aggregate;
mod backend;
mod candidate;
mod config;
mod engine_hex;
mod engine_magic;
mod engine_window;
mod error;
mod options;
mod scan;
mod sink;
mod source;
mod store;
mod strategy;
mod types;

pub use aggregate::{aggregate, CandidateAggregator};
pub use backend::open_source;
pub use candidate::{decode_hex, Candidate, ScanMode, StrategyKind, CANDIDATE_LEN};
pub use config::{load_config, parse_config, ScanConfig};
pub use engine_hex::{HexRegex, DEFAULT_HEX_PATTERN};
pub use engine_magic::{parse_marker, MagicPrefix, DEFAULT_MARKERS, MARKER_LEN};
pub use engine_window::ExhaustiveWindow;
pub use error::{ErrorClass, Result, ScanError};
pub use options::{Backend, OutputFormat, ScanOptions, ScanStats};
pub use scan::{scan_and_write, scan_path, ScanPlan};
pub use sink::ReportWriter;
pub use source::{ByteSource, FlatSource, MappedSource, SourceKind};
pub use store::{StoreSource, DEFAULT_STORE_TABLE};
pub use strategy::{build_strategies, build_strategy, ScanStrategy};
pub use types::{OutputItem, ScanReport};
