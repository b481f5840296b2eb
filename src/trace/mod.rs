//! 执行 trace 数据模型
//!
//! 与运行时 profiler 输出的 step stats 同构：每个设备一组算子记录，
//! 每条记录有开始时间（微秒）、相对结束时间，以及一段自由文本的 timeline label。

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// RPC 接收张量记录的固定算子名
pub const RECV_TENSOR: &str = "RecvTensor";

/// 一个 step 的完整 trace
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepTrace {
    #[serde(default)]
    pub dev_stats: Vec<DeviceStepStats>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceStepStats {
    pub device: String,
    #[serde(default)]
    pub node_stats: Vec<NodeExecStats>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeExecStats {
    pub node_name: String,
    #[serde(default)]
    pub op_type: Option<String>,
    pub all_start_micros: u64,
    /// 算子本身结束时间（相对开始）
    #[serde(default)]
    pub op_end_rel_micros: Option<u64>,
    /// 包括输出处理在内的结束时间（相对开始）
    #[serde(default)]
    pub all_end_rel_micros: Option<u64>,
    #[serde(default)]
    pub timeline_label: String,
}

impl NodeExecStats {
    pub fn is_recv(&self) -> bool {
        self.node_name == RECV_TENSOR || self.op_type.as_deref() == Some(RECV_TENSOR)
    }

    pub fn op_end_rel(&self) -> u64 {
        self.op_end_rel_micros
            .or(self.all_end_rel_micros)
            .unwrap_or(0)
    }

    pub fn all_end_rel(&self) -> u64 {
        self.all_end_rel_micros
            .or(self.op_end_rel_micros)
            .unwrap_or(0)
    }

    /// 绝对结束时间（按 all_end_rel 计）
    pub fn all_end(&self) -> u64 {
        self.all_start_micros.saturating_add(self.all_end_rel())
    }

    pub fn op_end(&self) -> u64 {
        self.all_start_micros.saturating_add(self.op_end_rel())
    }
}

/// trace 文件既可以是单个 step，也可以是 step 数组
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TraceFile {
    Many(Vec<StepTrace>),
    One(StepTrace),
}

impl StepTrace {
    /// 所有设备名包含 `device_filter` 的算子记录
    pub fn ops_on<'a>(&'a self, device_filter: &'a str) -> impl Iterator<Item = &'a NodeExecStats> {
        self.dev_stats
            .iter()
            .filter(move |d| d.device.contains(device_filter))
            .flat_map(|d| d.node_stats.iter())
    }

    /// 设备名包含 `device_filter` 的去重设备列表（保持首次出现顺序）
    pub fn devices(&self, device_filter: &str) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for d in &self.dev_stats {
            if d.device.contains(device_filter) && !out.contains(&d.device) {
                out.push(d.device.clone());
            }
        }
        out
    }

    pub fn load_many(path: &Path) -> Result<Vec<StepTrace>> {
        let raw = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file: TraceFile = serde_json::from_str(&raw).map_err(|source| Error::Json {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(match file {
            TraceFile::Many(steps) => steps,
            TraceFile::One(step) => vec![step],
        })
    }
}
