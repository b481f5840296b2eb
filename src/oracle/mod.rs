//! 时间 oracle
//!
//! 从执行 trace 中提取每个算子的代表性时长（取观测最小值），
//! 以 "规范名 -> 微秒" 的 JSON 表持久化，供 TAO 调度查询。
//!
//! 规范名有两类：
//! - 普通算子：去掉实验 scope 前缀后的相对名（`/a/b`，或 scope 嵌套两层时的 `//a/b`）；
//! - 接收：`recv:` + 被传输张量的规范名。
//!
//! 注意：加载时给出的 scope 必须与构图时一致，否则所有查询都会落空，这里不做检测。

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use regex::Regex;
use tracing::{debug, info, trace};

use crate::error::{Error, Result};
use crate::trace::{NodeExecStats, StepTrace};

pub const RECV_PREFIX: &str = "recv:";

/// 修正后的接收区间（微秒）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecvInterval {
    pub label: String,
    pub start: u64,
    pub end: u64,
}

impl RecvInterval {
    pub fn duration(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }
}

#[derive(Debug, Clone)]
struct ScopePatterns {
    double: Regex,
    single: Regex,
}

impl ScopePatterns {
    fn new(scope: &str) -> Result<Self> {
        let s = regex::escape(scope);
        Ok(Self {
            double: Regex::new(&format!(r"^{s}(?:_\d+)?/{s}/(.*)$"))?,
            single: Regex::new(&format!(r"^{s}(?:_\d+)?/(.*)$"))?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct TimeOracle {
    time: BTreeMap<String, u64>,
    scope: Option<String>,
    patterns: Option<ScopePatterns>,
    recv_label: Regex,
    worker_filter: String,
}

impl TimeOracle {
    pub fn new(scope: Option<&str>) -> Result<Self> {
        Ok(Self {
            time: BTreeMap::new(),
            scope: scope.map(str::to_string),
            patterns: scope.map(ScopePatterns::new).transpose()?,
            recv_label: Regex::new(r".* edge_\d+_(.+)/read from .*")?,
            worker_filter: "worker".to_string(),
        })
    }

    /// 只统计设备名包含该子串的设备（默认 `worker`）
    pub fn with_worker_filter(mut self, filter: impl Into<String>) -> Self {
        self.worker_filter = filter.into();
        self
    }

    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    pub fn load(path: &Path, scope: Option<&str>) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let time: BTreeMap<String, u64> =
            serde_json::from_str(&raw).map_err(|source| Error::Json {
                path: path.to_path_buf(),
                source,
            })?;
        let mut oracle = Self::new(scope)?;
        oracle.time = time;
        info!(path = %path.display(), entries = oracle.time.len(), scope = ?scope, "loaded time oracle");
        Ok(oracle)
    }

    /// 按 key 排序写出，便于 diff
    pub fn save(&self, path: &Path) -> Result<()> {
        let raw = serde_json::to_string_pretty(&self.time).map_err(|source| Error::Json {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, raw).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), entries = self.time.len(), "saved time oracle");
        Ok(())
    }

    /// 合并一个 step 的 trace；同名条目只保留更小的时长。
    #[tracing::instrument(skip(self, step), fields(scope = ?self.scope))]
    pub fn update(&mut self, step: &StepTrace) {
        let mut ops: Vec<&NodeExecStats> = step.ops_on(&self.worker_filter).collect();
        ops.sort_by_key(|op| op.all_end());

        let mut last_end = 0u64;
        let mut folded = 0usize;
        for op in ops {
            let (name, duration) = if op.is_recv() {
                let (start, end) = correct_recv(op, last_end);
                last_end = end;
                (self.recv_op_name(&op.timeline_label), end - start)
            } else {
                (Some(self.remove_prefix(&op.node_name)), op.all_end_rel())
            };
            let Some(name) = name else {
                debug!(label = %op.timeline_label, "skip recv record without tensor name");
                continue;
            };
            trace!(op = %name, duration, "fold");
            let slot = self.time.entry(name).or_insert(duration);
            *slot = (*slot).min(duration);
            folded += 1;
        }
        debug!(folded, entries = self.time.len(), "trace folded into oracle");
    }

    /// 顺序修正后的接收区间（按结束时间排序）
    pub fn corrected_recv_intervals(&self, step: &StepTrace) -> Vec<RecvInterval> {
        let mut recvs: Vec<&NodeExecStats> = step
            .ops_on(&self.worker_filter)
            .filter(|op| op.is_recv())
            .collect();
        recvs.sort_by_key(|op| op.all_end());

        let mut last_end = 0u64;
        recvs
            .into_iter()
            .map(|op| {
                let (start, end) = correct_recv(op, last_end);
                last_end = end;
                RecvInterval {
                    label: op.timeline_label.clone(),
                    start,
                    end,
                }
            })
            .collect()
    }

    /// 先查普通规范名，再查 `recv:` 形式
    pub fn query(&self, name: &str) -> Option<u64> {
        let fixed = self.remove_prefix(name);
        if let Some(&t) = self.time.get(&fixed) {
            return Some(t);
        }
        self.time.get(&format!("{RECV_PREFIX}{fixed}")).copied()
    }

    /// 去掉实验 scope 前缀：先尝试两层嵌套，再尝试一层，否则原样返回
    pub fn remove_prefix(&self, name: &str) -> String {
        let Some(p) = &self.patterns else {
            return name.to_string();
        };
        if let Some(c) = p.double.captures(name) {
            return format!("//{}", &c[1]);
        }
        if let Some(c) = p.single.captures(name) {
            return format!("/{}", &c[1]);
        }
        name.to_string()
    }

    /// 从 `... edge_<N>_<tensor>/read from ...` 形式的 label 中提取接收规范名
    pub fn recv_op_name(&self, label: &str) -> Option<String> {
        let c = self.recv_label.captures(label)?;
        Some(format!("{RECV_PREFIX}{}", self.remove_prefix(&c[1])))
    }

    pub fn insert(&mut self, name: impl Into<String>, duration_us: u64) {
        let slot = self.time.entry(name.into()).or_insert(duration_us);
        *slot = (*slot).min(duration_us);
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.time.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// 接收记录的开始时间不早于上一个接收的结束时间
fn correct_recv(op: &NodeExecStats, last_end: u64) -> (u64, u64) {
    let end = op.all_end();
    let start = op.all_start_micros.max(last_end).min(end);
    (start, end)
}
