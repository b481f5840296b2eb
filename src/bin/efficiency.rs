//! 并行效率统计
//!
//! 对每个 trace 的每个 worker 设备打印 E/S/a 等指标，最后给出 a 的汇总值。

use clap::Parser;
use std::path::PathBuf;
use tictac_rs::analysis::ResultAnalyser;
use tictac_rs::trace::StepTrace;
use tictac_rs::{Result, SchedulerConfig};

#[derive(Debug, Parser)]
#[command(name = "efficiency", about = "计算执行 trace 的通信/计算重叠效率")]
struct Args {
    /// trace JSON 文件（可重复）
    #[arg(long = "trace", num_args = 1.., required = true)]
    trace: Vec<PathBuf>,

    /// 只统计设备名包含该子串的设备
    #[arg(long)]
    device_filter: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    let args = Args::parse();
    let filter = args
        .device_filter
        .unwrap_or_else(|| SchedulerConfig::default().worker_filter);

    let mut steps = Vec::new();
    for path in &args.trace {
        steps.extend(StepTrace::load_many(path)?);
    }

    let analyser = ResultAnalyser::new(&steps, &filter);
    for (i, effs) in analyser.effs.iter().enumerate() {
        for (device, eff) in analyser.worker_devices.iter().zip(effs) {
            println!("step {i} {device}: {eff}");
        }
    }
    match analyser.get_a() {
        Some(a) => println!("a={a:.3}"),
        None => println!("a=n/a"),
    }
    Ok(())
}
