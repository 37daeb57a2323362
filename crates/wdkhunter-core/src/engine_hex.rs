//! 十六进制正则策略
//!
//! 将整个缓冲区转成小写十六进制文本，再用（默认大小写不敏感的）正则找第一个
//! 连续 10 位十六进制字符，解码回 5 字节。由于文本本身全是十六进制字符，
//! 只要长度 >= 5，默认模式总是命中缓冲区的前 5 个字节。
use regex::Regex;

use crate::candidate::{decode_hex, Candidate, StrategyKind};
use crate::error::Result;
use crate::source::ByteSource;
use crate::strategy::ScanStrategy;

/// 默认模式：恰好 10 个十六进制字符
pub const DEFAULT_HEX_PATTERN: &str = r"(?i)[0-9a-f]{10}";

#[derive(Debug, Clone)]
pub struct HexRegex {
    pattern: Regex,
}

impl HexRegex {
    pub fn new(pattern: &str) -> Result<Self> {
        Ok(Self { pattern: Regex::new(pattern)? })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// 最左侧的合格匹配；起点不在字节边界或解码不是 5 字节的匹配跳过
    ///
    /// 被跳过的匹配只前进一个字符再查找，与之重叠的对齐匹配仍然可见。
    pub fn first_match(&self, source: &dyn ByteSource) -> Option<Candidate> {
        let text = hex::encode(source.as_bytes());
        let mut pos = 0usize;
        while pos <= text.len() {
            let m = self.pattern.find_at(&text, pos)?;
            if m.start() % 2 == 0 {
                if let Some(value) = decode_hex(m.as_str()) {
                    return Some(Candidate::new(value, m.start() / 2, StrategyKind::HexRegex));
                }
            }
            pos = m.start() + 1;
        }
        None
    }
}

impl Default for HexRegex {
    fn default() -> Self {
        Self::new(DEFAULT_HEX_PATTERN).expect("default hex pattern compiles")
    }
}

impl ScanStrategy for HexRegex {
    fn kind(&self) -> StrategyKind {
        StrategyKind::HexRegex
    }

    fn candidates<'a>(&'a self, source: &'a dyn ByteSource) -> Box<dyn Iterator<Item = Candidate> + 'a> {
        Box::new(self.first_match(source).into_iter())
    }
}
