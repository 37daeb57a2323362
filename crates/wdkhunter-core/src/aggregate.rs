//! 候选聚合：按 5 字节值去重，保留首次出现的顺序与偏移
use std::collections::HashSet;

use crate::candidate::{Candidate, ScanMode};

/// 增量聚合器（多个策略的候选流依次并入）
#[derive(Debug)]
pub struct CandidateAggregator {
    mode: ScanMode,
    seen: HashSet<[u8; 5]>,
    out: Vec<Candidate>,
}

impl CandidateAggregator {
    pub fn new(mode: ScanMode) -> Self {
        Self { mode, seen: HashSet::new(), out: Vec::new() }
    }

    pub fn mode(&self) -> ScanMode {
        self.mode
    }

    /// FirstMatch 模式下已取到候选
    pub fn is_satisfied(&self) -> bool {
        self.mode == ScanMode::FirstMatch && !self.out.is_empty()
    }

    /// 并入一个候选；返回是否为新值
    pub fn push(&mut self, c: Candidate) -> bool {
        if self.is_satisfied() {
            return false;
        }
        if self.seen.insert(c.value) {
            self.out.push(c);
            true
        } else {
            false
        }
    }

    /// 并入一条候选流；FirstMatch 满足后不再拉取剩余元素
    pub fn extend<I: IntoIterator<Item = Candidate>>(&mut self, iter: I) {
        let mut iter = iter.into_iter();
        while !self.is_satisfied() {
            match iter.next() {
                Some(c) => {
                    self.push(c);
                }
                None => break,
            }
        }
    }

    pub fn len(&self) -> usize {
        self.out.len()
    }

    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

    pub fn finish(self) -> Vec<Candidate> {
        self.out
    }
}

/// 一次性聚合；空输入得到空输出，从不失败
pub fn aggregate<I: IntoIterator<Item = Candidate>>(candidates: I, mode: ScanMode) -> Vec<Candidate> {
    let mut agg = CandidateAggregator::new(mode);
    agg.extend(candidates);
    agg.finish()
}
