//! 扫描策略接口与策略集合构建
use crate::candidate::{Candidate, StrategyKind};
use crate::config::ScanConfig;
use crate::engine_hex::HexRegex;
use crate::engine_magic::MagicPrefix;
use crate::engine_window::ExhaustiveWindow;
use crate::error::Result;
use crate::source::ByteSource;

/// 扫描策略：给定字节源，产出候选序列
///
/// 策略只读字节源，不持有可变状态，可在多个线程间共享。
/// 对不匹配的输入返回空序列，从不报错。
pub trait ScanStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    fn candidates<'a>(&'a self, source: &'a dyn ByteSource) -> Box<dyn Iterator<Item = Candidate> + 'a>;
}

/// 按配置构建单个策略
pub fn build_strategy(kind: StrategyKind, cfg: &ScanConfig) -> Result<Box<dyn ScanStrategy>> {
    let strategy: Box<dyn ScanStrategy> = match kind {
        StrategyKind::MagicPrefix => Box::new(MagicPrefix::new(&cfg.markers)?),
        StrategyKind::ExhaustiveWindow => Box::new(ExhaustiveWindow),
        StrategyKind::HexRegex => Box::new(HexRegex::new(&cfg.hex_pattern)?),
    };
    Ok(strategy)
}

/// 按给定顺序构建策略集合；重复的策略只保留第一次出现
pub fn build_strategies(kinds: &[StrategyKind], cfg: &ScanConfig) -> Result<Vec<Box<dyn ScanStrategy>>> {
    let mut out: Vec<Box<dyn ScanStrategy>> = Vec::with_capacity(kinds.len());
    for &kind in kinds {
        if out.iter().any(|s| s.kind() == kind) {
            continue;
        }
        out.push(build_strategy(kind, cfg)?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorClass;
    use crate::source::FlatSource;

    #[test]
    fn every_strategy_is_empty_on_short_buffers() {
        let cfg = ScanConfig::default();
        let all = [StrategyKind::MagicPrefix, StrategyKind::ExhaustiveWindow, StrategyKind::HexRegex];
        let strategies = build_strategies(&all, &cfg).unwrap();
        assert_eq!(strategies.len(), 3);
        for n in 0..5usize {
            // 全部由标记字节组成，保证“短”是唯一的不命中原因
            let src = FlatSource::from_bytes([0xA1, 0xB2].iter().copied().cycle().take(n).collect());
            for s in &strategies {
                assert_eq!(s.candidates(&src).count(), 0, "{:?} on {} bytes", s.kind(), n);
            }
        }
    }

    #[test]
    fn duplicates_are_dropped_and_order_kept() {
        let cfg = ScanConfig::default();
        let kinds = [StrategyKind::HexRegex, StrategyKind::MagicPrefix, StrategyKind::HexRegex];
        let got: Vec<StrategyKind> = build_strategies(&kinds, &cfg).unwrap().iter().map(|s| s.kind()).collect();
        assert_eq!(got, vec![StrategyKind::HexRegex, StrategyKind::MagicPrefix]);
    }

    #[test]
    fn bad_config_fails_at_build_time() {
        let cfg = ScanConfig { hex_pattern: "(".into(), ..ScanConfig::default() };
        let err = build_strategy(StrategyKind::HexRegex, &cfg).err().unwrap();
        assert_eq!(err.class(), ErrorClass::Config);

        let cfg = ScanConfig { markers: Vec::new(), ..ScanConfig::default() };
        assert!(build_strategy(StrategyKind::MagicPrefix, &cfg).is_err());
    }
}
