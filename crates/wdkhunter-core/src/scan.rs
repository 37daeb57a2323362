//! 扫描主流程与并行调度
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::aggregate::CandidateAggregator;
use crate::backend::open_source;
use crate::candidate::{Candidate, ScanMode};
use crate::error::{Result, ScanError};
use crate::options::{Backend, ScanOptions, ScanStats};
use crate::sink::ReportWriter;
use crate::source::ByteSource;
use crate::strategy::{build_strategies, ScanStrategy};
use crate::types::ScanReport;

/// 一次调用的策略集合与聚合模式
pub struct ScanPlan {
    strategies: Vec<Box<dyn ScanStrategy>>,
    mode: ScanMode,
    parallel: bool,
}

impl ScanPlan {
    pub fn from_options(opts: &ScanOptions) -> Result<Self> {
        if opts.strategies.is_empty() {
            return Err(ScanError::Config("no scan strategy selected".into()));
        }
        let strategies = build_strategies(&opts.strategies, &opts.config)?;
        Ok(Self {
            strategies,
            mode: opts.effective_mode(),
            parallel: opts.effective_threads() > 1,
        })
    }

    pub fn mode(&self) -> ScanMode {
        self.mode
    }

    /// 对一个字节源跑完所有策略并聚合，返回 (聚合结果, 原始候选数)
    ///
    /// 多策略且允许并行时，各策略在 rayon 线程上各自去重，
    /// 再由当前线程按策略顺序合并；结果与串行执行一致。
    pub fn run(&self, source: &dyn ByteSource) -> (Vec<Candidate>, usize) {
        let mode = self.mode;
        if self.parallel && self.strategies.len() > 1 {
            let partials: Vec<(Vec<Candidate>, usize)> = self
                .strategies
                .par_iter()
                .map(|s| run_one(s.as_ref(), source, mode))
                .collect();
            // FirstMatch 下只计入串行时会被拉取的策略，原始计数与串行一致
            let mut agg = CandidateAggregator::new(mode);
            let mut raw = 0usize;
            for (part, n) in partials {
                if agg.is_satisfied() {
                    break;
                }
                raw += n;
                agg.extend(part);
            }
            return (agg.finish(), raw);
        }

        let mut agg = CandidateAggregator::new(mode);
        let mut raw = 0usize;
        for s in &self.strategies {
            if agg.is_satisfied() {
                break;
            }
            agg.extend(s.candidates(source).inspect(|_| raw += 1));
        }
        (agg.finish(), raw)
    }
}

fn run_one(strategy: &dyn ScanStrategy, source: &dyn ByteSource, mode: ScanMode) -> (Vec<Candidate>, usize) {
    let mut raw = 0usize;
    let mut agg = CandidateAggregator::new(mode);
    agg.extend(strategy.candidates(source).inspect(|_| raw += 1));
    debug!(strategy = strategy.kind().as_str(), raw, kept = agg.len(), "strategy finished");
    (agg.finish(), raw)
}

/// 扫描单个文件：打开字节源 -> 一次扫描 -> 释放字节源
pub fn scan_path(path: &Path, backend: Backend, store_table: &str, plan: &ScanPlan) -> Result<ScanReport> {
    let source = open_source(path, backend, store_table)?;
    let (candidates, raw_candidates) = plan.run(source.as_ref());
    debug!(path = %path.display(), raw_candidates, kept = candidates.len(), "source scanned");
    Ok(ScanReport {
        source: path.display().to_string(),
        source_kind: source.kind(),
        source_len: source.len(),
        raw_candidates,
        candidates,
    })
}

/// 扫描文件或目录，并把结果写入 `out`
///
/// - 文件：一次扫描；任何错误直接返回
/// - 目录：仅扫描第一层普通文件，按文件名排序输出；单个文件失败只记日志并计数
pub fn scan_and_write(input: &Path, out: &mut dyn Write, opts: &ScanOptions) -> Result<ScanStats> {
    let plan = ScanPlan::from_options(opts)?;
    let md = std::fs::metadata(input).map_err(|e| ScanError::io(input, e))?;
    let mut stats = ScanStats::default();

    if !md.is_dir() {
        let report = scan_path(input, opts.backend, &opts.config.store_table, &plan)?;
        let mut writer = ReportWriter::new(out, opts.format, false);
        writer.begin()?;
        record(&mut stats, &report);
        stats.outputs_written += writer.write_report(&report)?;
        writer.end()?;
        return Ok(stats);
    }

    let mut files: Vec<PathBuf> = vec![];
    for entry in WalkDir::new(input).min_depth(1).max_depth(1) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!(error = %e, "skipping unreadable directory entry");
                continue;
            }
        };
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    // 按文件名排序，确保输出顺序稳定
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    let mut writer = ReportWriter::new(out, opts.format, true);
    writer.begin()?;
    let threads = opts.effective_threads();
    if threads > 1 && files.len() > 1 {
        scan_dir_parallel(files, &mut writer, opts, plan, &mut stats, threads)?;
    } else {
        for path in &files {
            let outcome = scan_dir_entry(path, opts.backend, &opts.config.store_table, &plan, opts.max_file_size);
            apply_outcome(path, outcome, &mut writer, &mut stats)?;
        }
    }
    writer.end()?;
    Ok(stats)
}

/// 目录模式下单个文件的处理结果
enum Outcome {
    Scanned(ScanReport),
    Skipped,
    Failed(ScanError),
}

fn scan_dir_entry(path: &Path, backend: Backend, store_table: &str, plan: &ScanPlan, max_file_size: Option<u64>) -> Outcome {
    if let Some(max) = max_file_size {
        if let Ok(md) = std::fs::metadata(path) {
            if md.len() > max {
                return Outcome::Skipped;
            }
        }
    }
    match scan_path(path, backend, store_table, plan) {
        Ok(report) => Outcome::Scanned(report),
        Err(e) => Outcome::Failed(e),
    }
}

fn record(stats: &mut ScanStats, report: &ScanReport) {
    stats.sources_scanned += 1;
    stats.raw_candidates += report.raw_candidates;
    stats.candidates_total += report.candidates.len();
}

fn apply_outcome(path: &Path, outcome: Outcome, writer: &mut ReportWriter<'_>, stats: &mut ScanStats) -> Result<()> {
    match outcome {
        Outcome::Scanned(report) => {
            if report.candidates.is_empty() {
                debug!(path = %path.display(), "no candidate found");
            }
            record(stats, &report);
            stats.outputs_written += writer.write_report(&report)?;
        }
        Outcome::Skipped => {
            debug!(path = %path.display(), "skipped: larger than max file size");
            stats.sources_skipped += 1;
        }
        Outcome::Failed(e) => {
            warn!(path = %path.display(), error = %e, "scan failed");
            stats.sources_failed += 1;
        }
    }
    Ok(())
}

/// 并行调度（目录模式）：
/// - 后台线程内的 Rayon 线程池并行扫描各文件
/// - 当前线程作为 Writer，按 idx 重排后顺序写出
fn scan_dir_parallel(
    files: Vec<PathBuf>,
    writer: &mut ReportWriter<'_>,
    opts: &ScanOptions,
    plan: ScanPlan,
    stats: &mut ScanStats,
    threads: usize,
) -> Result<()> {
    use crossbeam_channel as channel;

    let (tx, rx) = channel::bounded::<(usize, Outcome)>(256);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| ScanError::Config(format!("build thread pool: {e}")))?;
    let plan = Arc::new(plan);
    let backend = opts.backend;
    let store_table = opts.config.store_table.clone();
    let max_file_size = opts.max_file_size;
    let indexed: Vec<(usize, PathBuf)> = files.into_iter().enumerate().collect();
    let paths: Vec<PathBuf> = indexed.iter().map(|(_, p)| p.clone()).collect();

    let scan_thread = std::thread::spawn(move || {
        pool.install(|| {
            indexed.par_iter().for_each(|(idx, path)| {
                let outcome = scan_dir_entry(path, backend, &store_table, &plan, max_file_size);
                let _ = tx.send((*idx, outcome));
            });
        });
        // 结束后 Sender 被丢弃，Receiver 收到关闭信号
    });

    let drained = drain_in_order(&rx, &paths, writer, stats);
    let joined = join_scan_thread(scan_thread);
    // 扫描线程 panic 是缺失结果的根因，优先报告
    joined.and(drained)
}

/// Writer：维护 next_idx 与缓存，按序输出
///
/// 通道关闭后缓存仍有剩余，说明某个文件的结果没有送达（扫描线程中途退出），整体报错。
fn drain_in_order(
    rx: &crossbeam_channel::Receiver<(usize, Outcome)>,
    paths: &[PathBuf],
    writer: &mut ReportWriter<'_>,
    stats: &mut ScanStats,
) -> Result<()> {
    let mut next_idx: usize = 0;
    let mut buffer: BTreeMap<usize, Outcome> = BTreeMap::new();
    let mut write_result = Ok(());
    while let Ok((idx, outcome)) = rx.recv() {
        buffer.insert(idx, outcome);
        while let Some(outcome) = buffer.remove(&next_idx) {
            if write_result.is_ok() {
                write_result = apply_outcome(&paths[next_idx], outcome, writer, stats);
            }
            next_idx += 1;
        }
    }
    write_result?;

    if next_idx < paths.len() {
        return Err(ScanError::Worker(format!(
            "no result for {} ({} of {} files written, {} buffered)",
            paths[next_idx].display(),
            next_idx,
            paths.len(),
            buffer.len()
        )));
    }
    Ok(())
}

fn join_scan_thread(handle: std::thread::JoinHandle<()>) -> Result<()> {
    handle.join().map_err(|panic| {
        let msg = panic
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| panic.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        ScanError::Worker(format!("scan thread panicked: {msg}"))
    })
}
