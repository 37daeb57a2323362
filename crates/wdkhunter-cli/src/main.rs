use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};
use wdkhunter_core::{
    load_config, parse_marker, scan_and_write, Backend, OutputFormat, ScanConfig, ScanMode, ScanOptions, StrategyKind,
};

/// 命令行入口（基于 clap）
#[derive(Parser, Debug)]
#[command(name = "wdkhunter", version, about = "在二进制数据中定位 5 字节候选密钥")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 扫描文件（或目录下的每个文件）并输出候选
    Scan {
        /// 输入文件或目录
        #[arg(long)]
        input: PathBuf,

        /// 输出文件；缺省写到标准输出
        #[arg(long)]
        output: Option<PathBuf>,

        /// 字节源后端：flat（整读）、mmap（内存映射）、store（SQLite 键值表）
        #[arg(long, default_value = "flat", value_parser = ["flat", "mmap", "store"])]
        backend: String,

        /// 扫描策略，可重复指定：magic、window、hex
        #[arg(long = "strategy", default_value = "magic", value_parser = ["magic", "window", "hex"])]
        strategies: Vec<String>,

        /// 聚合模式：first 或 all；缺省按策略推断
        #[arg(long, value_parser = ["first", "all"])]
        mode: Option<String>,

        /// 魔数标记（4 位十六进制），可重复指定；覆盖配置文件与默认值
        #[arg(long = "marker")]
        markers: Vec<String>,

        /// 配置文件路径（TOML）
        #[arg(long)]
        config: Option<PathBuf>,

        /// 存储后端的记录表名（覆盖配置文件）
        #[arg(long)]
        table: Option<String>,

        /// 输出格式：text 或 json
        #[arg(long, default_value = "text", value_parser = ["text", "json"])]
        format: String,

        /// 线程数（"auto"=CPU 核心数；1 表示串行）
        #[arg(long, default_value = "auto")]
        threads: String,

        /// 目录模式下的最大文件大小（字节），超过则跳过
        #[arg(long)]
        max_file_size: Option<u64>,

        /// 记录扫描耗时
        #[arg(long)]
        timing: bool,
    },
}

fn main() -> Result<()> {
    // 初始化日志（支持通过 RUST_LOG 控制等级，例如 info、debug）
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            input,
            output,
            backend,
            strategies,
            mode,
            markers,
            config,
            table,
            format,
            threads,
            max_file_size,
            timing,
        } => {
            info!(?input, ?output, %backend, ?strategies, "starting scan");

            let backend = Backend::from_name(&backend).unwrap_or(Backend::Flat);
            let strategies: Vec<StrategyKind> = strategies.iter().map(|s| parse_strategy(s)).collect();
            let mode = mode.as_deref().map(|m| match m {
                "all" => ScanMode::AllMatches,
                _ => ScanMode::FirstMatch,
            });
            let format = match format.as_str() {
                "json" => OutputFormat::Json,
                _ => OutputFormat::Text,
            };

            // 配置优先级：命令行 > 配置文件 > 内置默认
            let mut scan_config = match &config {
                Some(path) => load_config(path).with_context(|| format!("load config {}", path.display()))?,
                None => ScanConfig::default(),
            };
            if !markers.is_empty() {
                scan_config.markers = markers
                    .iter()
                    .map(|m| parse_marker(m))
                    .collect::<Result<Vec<_>, _>>()
                    .context("parse --marker")?;
            }
            if let Some(table) = table {
                scan_config.store_table = table;
            }

            let opts = ScanOptions {
                backend,
                strategies,
                mode,
                config: scan_config,
                threads: parse_threads(&threads),
                max_file_size,
                format,
            };

            let mut out: Box<dyn Write> = match &output {
                Some(path) => Box::new(BufWriter::new(
                    File::create(path).with_context(|| format!("create output file {}", path.display()))?,
                )),
                None => Box::new(BufWriter::new(std::io::stdout().lock())),
            };

            let started = Instant::now();
            let stats = scan_and_write(&input, &mut out, &opts).context("scan failed")?;
            out.flush().context("flush output")?;

            if timing {
                info!(elapsed_ms = started.elapsed().as_millis() as u64, "scan timing");
            }
            if stats.sources_failed > 0 {
                warn!(sources_failed = stats.sources_failed, "some sources could not be scanned");
            } else if stats.candidates_total == 0 {
                // 只有全部来源都扫描成功时才报告空结果，失败不能伪装成“无候选”
                info!("no candidate found");
            }
            info!(
                sources_scanned = stats.sources_scanned,
                sources_failed = stats.sources_failed,
                sources_skipped = stats.sources_skipped,
                raw_candidates = stats.raw_candidates,
                outputs_written = stats.outputs_written,
                "scan finished"
            );
        }
    }

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};
    // 日志写到 stderr，stdout 只留给扫描结果
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn parse_strategy(s: &str) -> StrategyKind {
    match s {
        "window" => StrategyKind::ExhaustiveWindow,
        "hex" => StrategyKind::HexRegex,
        _ => StrategyKind::MagicPrefix,
    }
}

/// 解析线程参数
fn parse_threads(s: &str) -> Option<usize> {
    if s.eq_ignore_ascii_case("auto") {
        return None;
    }
    match s.parse::<usize>() {
        Ok(n) if n >= 1 => Some(n),
        _ => None,
    }
}
