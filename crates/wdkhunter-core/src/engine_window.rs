//! 穷举滑窗策略：每个 5 字节窗口都是一个候选，不做任何过滤
//!
//! 产出是惰性的，去重完全交给聚合器；FirstMatch 聚合时只会拉取第一个窗口。
use crate::candidate::{Candidate, StrategyKind, CANDIDATE_LEN};
use crate::source::ByteSource;
use crate::strategy::ScanStrategy;

#[derive(Debug, Default, Clone, Copy)]
pub struct ExhaustiveWindow;

impl ScanStrategy for ExhaustiveWindow {
    fn kind(&self) -> StrategyKind {
        StrategyKind::ExhaustiveWindow
    }

    fn candidates<'a>(&'a self, source: &'a dyn ByteSource) -> Box<dyn Iterator<Item = Candidate> + 'a> {
        // windows() 在长度不足 5 时不产生任何窗口
        Box::new(
            source
                .as_bytes()
                .windows(CANDIDATE_LEN)
                .enumerate()
                .filter_map(|(i, w)| Candidate::from_slice(w, i, StrategyKind::ExhaustiveWindow)),
        )
    }
}
