//! 候选项与扫描模式
use std::fmt;
use std::hash::{Hash, Hasher};

/// 候选值固定长度（字节）
pub const CANDIDATE_LEN: usize = 5;

/// 扫描模式
/// - FirstMatch：取到第一个候选即停止
/// - AllMatches：收集全部去重后的候选
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    FirstMatch,
    AllMatches,
}

/// 产生候选的算法标签，仅用于诊断，不参与相等判断
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    MagicPrefix,
    ExhaustiveWindow,
    HexRegex,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::MagicPrefix => "magic",
            StrategyKind::ExhaustiveWindow => "window",
            StrategyKind::HexRegex => "hex",
        }
    }

    /// 未显式指定模式时各策略的默认模式
    pub fn default_mode(&self) -> ScanMode {
        match self {
            StrategyKind::ExhaustiveWindow => ScanMode::AllMatches,
            StrategyKind::MagicPrefix | StrategyKind::HexRegex => ScanMode::FirstMatch,
        }
    }
}

/// 单个候选：5 字节值 + 命中偏移
///
/// 相等与哈希只看 `value`；偏移和策略标签是来源信息。
#[derive(Debug, Clone, Copy)]
pub struct Candidate {
    pub value: [u8; CANDIDATE_LEN],
    pub offset: usize,
    pub strategy: StrategyKind,
}

impl Candidate {
    pub fn new(value: [u8; CANDIDATE_LEN], offset: usize, strategy: StrategyKind) -> Self {
        Self { value, offset, strategy }
    }

    /// 从恰好 5 字节的切片构造；长度不符返回 None
    pub fn from_slice(bytes: &[u8], offset: usize, strategy: StrategyKind) -> Option<Self> {
        let value: [u8; CANDIDATE_LEN] = bytes.try_into().ok()?;
        Some(Self::new(value, offset, strategy))
    }

    /// 10 位小写十六进制，无分隔符
    pub fn to_hex(&self) -> String {
        hex::encode(self.value)
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for Candidate {}

impl Hash for Candidate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// 解析候选的十六进制文本（大小写均可）；长度或字符非法返回 None
pub fn decode_hex(text: &str) -> Option<[u8; CANDIDATE_LEN]> {
    let mut out = [0u8; CANDIDATE_LEN];
    hex::decode_to_slice(text, &mut out).ok()?;
    Some(out)
}
