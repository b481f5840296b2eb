//! 时间 oracle 构建
//!
//! 把若干 step 的执行 trace 折叠进一张 "算子 -> 最小时长" 表并写出 JSON。

use clap::Parser;
use std::path::PathBuf;
use tictac_rs::oracle::TimeOracle;
use tictac_rs::trace::StepTrace;
use tictac_rs::{Result, SchedulerConfig};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "time_oracle", about = "从执行 trace 构建时间 oracle")]
struct Args {
    /// trace JSON 文件（单个 step 或 step 数组，可重复）
    #[arg(long = "trace", num_args = 1.., required = true)]
    trace: Vec<PathBuf>,

    /// 构图时使用的实验 scope，例如 vgg16-none
    #[arg(long)]
    scope: Option<String>,

    /// 在已有 oracle 文件的基础上继续合并
    #[arg(long)]
    merge: Option<PathBuf>,

    /// 只统计设备名包含该子串的设备
    #[arg(long)]
    worker_filter: Option<String>,

    /// 输出 oracle JSON
    #[arg(long)]
    out: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    let args = Args::parse();
    let cfg = SchedulerConfig::default();
    let scope = args.scope.as_deref();

    let oracle = match &args.merge {
        Some(path) => TimeOracle::load(path, scope)?,
        None => TimeOracle::new(scope)?,
    };
    let mut oracle = oracle.with_worker_filter(args.worker_filter.unwrap_or(cfg.worker_filter));

    let mut steps = 0usize;
    for path in &args.trace {
        for step in StepTrace::load_many(path)? {
            oracle.update(&step);
            steps += 1;
        }
    }
    info!(steps, entries = oracle.len(), "folded traces");

    oracle.save(&args.out)
}
