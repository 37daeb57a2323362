//! 公共类型（对外暴露）
use serde::Serialize;

use crate::candidate::Candidate;
use crate::source::SourceKind;

/// 输出项结构（JSON 输出中的单个元素）
#[derive(Debug, Clone, Serialize)]
pub struct OutputItem<'a> {
    pub source: &'a str,
    pub value: String,
    pub offset: usize,
    pub strategy: &'static str,
}

/// 单个字节源的扫描结果
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// 字节源路径（展示用）
    pub source: String,
    pub source_kind: SourceKind,
    pub source_len: usize,
    /// 聚合前各策略产出的候选总数
    pub raw_candidates: usize,
    /// 聚合后的候选（去重，首次出现顺序）
    pub candidates: Vec<Candidate>,
}

impl ScanReport {
    pub fn output_items(&self) -> impl Iterator<Item = OutputItem<'_>> {
        self.candidates.iter().map(move |c| OutputItem {
            source: &self.source,
            value: c.to_hex(),
            offset: c.offset,
            strategy: c.strategy.as_str(),
        })
    }
}
