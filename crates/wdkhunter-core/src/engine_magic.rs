//! 魔数前缀策略：命中 2 字节标记且其后还有 3 字节时，取这 5 字节
use aho_corasick::{AhoCorasick, MatchKind};

use crate::candidate::{Candidate, StrategyKind, CANDIDATE_LEN};
use crate::error::{Result, ScanError};
use crate::source::ByteSource;
use crate::strategy::ScanStrategy;

/// 标记长度（字节）
pub const MARKER_LEN: usize = 2;

/// 默认标记集合
pub const DEFAULT_MARKERS: [[u8; MARKER_LEN]; 2] = [[0xA1, 0xB2], [0x5A, 0xA5]];

pub struct MagicPrefix {
    markers: Vec<[u8; MARKER_LEN]>,
    ac: AhoCorasick,
}

impl MagicPrefix {
    pub fn new(markers: &[[u8; MARKER_LEN]]) -> Result<Self> {
        let mut uniq: Vec<[u8; MARKER_LEN]> = Vec::with_capacity(markers.len());
        for m in markers {
            if !uniq.contains(m) {
                uniq.push(*m);
            }
        }
        if uniq.is_empty() {
            return Err(ScanError::Config("magic prefix needs at least one marker".into()));
        }
        // Standard 语义才支持重叠查找；所有标记等长，结束位置顺序即起始位置顺序
        let ac = AhoCorasick::builder()
            .match_kind(MatchKind::Standard)
            .build(&uniq)
            .map_err(|e| ScanError::Config(format!("build marker automaton: {e}")))?;
        Ok(Self { markers: uniq, ac })
    }

    pub fn markers(&self) -> &[[u8; MARKER_LEN]] {
        &self.markers
    }

    /// 自左向右找第一个合格位置，找到即返回，不再继续扫描
    pub fn first_match(&self, source: &dyn ByteSource) -> Option<Candidate> {
        let len = source.len();
        if len < CANDIDATE_LEN {
            return None;
        }
        // 标记起点最多到 len - 5，因此只需在前 len - 3 字节内查找
        let haystack = &source.as_bytes()[..len - CANDIDATE_LEN + MARKER_LEN];
        let hit = self.ac.find_overlapping_iter(haystack).next()?;
        let offset = hit.start();
        let window = source.slice(offset, CANDIDATE_LEN).ok()?;
        Candidate::from_slice(window, offset, StrategyKind::MagicPrefix)
    }
}

impl Default for MagicPrefix {
    fn default() -> Self {
        Self::new(&DEFAULT_MARKERS).expect("default markers are valid")
    }
}

impl ScanStrategy for MagicPrefix {
    fn kind(&self) -> StrategyKind {
        StrategyKind::MagicPrefix
    }

    fn candidates<'a>(&'a self, source: &'a dyn ByteSource) -> Box<dyn Iterator<Item = Candidate> + 'a> {
        Box::new(self.first_match(source).into_iter())
    }
}

/// 解析 4 位十六进制的标记文本，例如 "a1b2"
pub fn parse_marker(text: &str) -> Result<[u8; MARKER_LEN]> {
    let mut out = [0u8; MARKER_LEN];
    hex::decode_to_slice(text.trim(), &mut out)
        .map_err(|e| ScanError::Config(format!("invalid marker {text:?}: {e}")))?;
    Ok(out)
}
