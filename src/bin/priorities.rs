//! 通信优先级计算
//!
//! 读取若干数据流图（每个图一个实验 scope），按 TAO 或 TIO 策略计算接收算子的
//! 优先级，输出按 scope 分组的 (rank, 张量名) 表。

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tictac_rs::graph::GraphSpec;
use tictac_rs::oracle::TimeOracle;
use tictac_rs::order::{CommOrdering, PriorityReport, PriorityTable, Tao, Tio};
use tictac_rs::{Result, SchedulerConfig};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Policy {
    /// 基于时间 oracle
    Tao,
    /// 仅基于拓扑
    Tio,
}

#[derive(Debug, Parser)]
#[command(name = "priorities", about = "计算数据流图中接收算子的调度优先级")]
struct Args {
    /// 图 JSON 文件（可重复）
    #[arg(long = "graph", num_args = 1.., required = true)]
    graph: Vec<PathBuf>,

    #[arg(long, value_enum, default_value_t = Policy::Tio)]
    policy: Policy,

    /// 时间 oracle JSON（tao 必需；按每个图的 scope 加载）
    #[arg(long, required_if_eq("policy", "tao"))]
    oracle: Option<PathBuf>,

    /// oracle 缺失条目时使用的时长（微秒）
    #[arg(long)]
    fallback_us: Option<u64>,

    /// 接收算子名字后缀
    #[arg(long)]
    recv_suffix: Option<String>,

    /// 输出 JSON 文件；缺省打印到 stdout
    #[arg(long)]
    out: Option<PathBuf>,
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
    let mut cfg = SchedulerConfig::default();
    if let Some(us) = args.fallback_us {
        cfg.fallback_duration_us = us;
    }
    if let Some(suffix) = args.recv_suffix {
        cfg.recv_suffix = suffix;
    }

    // clap 保证 tao 一定带 --oracle
    let oracle_path = match args.policy {
        Policy::Tao => args.oracle.clone(),
        Policy::Tio => None,
    };

    let mut report = PriorityReport::default();
    for path in &args.graph {
        let spec = GraphSpec::load(path)?;
        let (graph, root) = spec.build(&cfg)?;
        if graph.scope().is_none() {
            warn!(path = %path.display(), "graph has no scope; oracle names will not be normalized");
        }

        let table = match &oracle_path {
            Some(oracle_path) => {
                let oracle = TimeOracle::load(oracle_path, graph.scope())?;
                let tao = Tao::new(&graph, root, &oracle, &cfg)?;
                PriorityTable::new(&graph, tao.name(), tao.get_priorities())
            }
            None => {
                let tio = Tio::new(&graph, root)?;
                PriorityTable::new(&graph, tio.name(), tio.get_priorities())
            }
        };
        info!(
            path = %path.display(),
            scope = %table.scope,
            policy = %table.policy,
            entries = table.entries.len(),
            "priorities computed"
        );
        report.push(table);
    }

    match &args.out {
        Some(out) => report.save(out),
        None => {
            let raw = serde_json::to_string_pretty(&report).map_err(|source| {
                tictac_rs::Error::Json {
                    path: PathBuf::from("<stdout>"),
                    source,
                }
            })?;
            println!("{raw}");
            Ok(())
        }
    }
}
