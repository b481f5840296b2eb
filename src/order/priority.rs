use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::graph::{Graph, NodeId};

/// 一个接收算子的优先级；rank 越小越早调度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Priority {
    pub rank: usize,
    pub op: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityEntry {
    pub rank: usize,
    /// 被传输张量名（接收算子名去掉接收后缀）
    pub name: String,
}

/// 一张图（一个 scope）的优先级表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriorityTable {
    pub scope: String,
    pub policy: String,
    pub entries: Vec<PriorityEntry>,
}

impl PriorityTable {
    pub fn new(graph: &Graph, policy: &str, priorities: &[Priority]) -> Self {
        let mut entries: Vec<PriorityEntry> = priorities
            .iter()
            .map(|p| PriorityEntry {
                rank: p.rank,
                name: graph
                    .recv_name(p.op)
                    .unwrap_or_else(|| graph.name(p.op))
                    .to_string(),
            })
            .collect();
        entries.sort_by_key(|e| e.rank);
        Self {
            scope: graph.scope().unwrap_or_default().to_string(),
            policy: policy.to_string(),
            entries,
        }
    }
}

/// 按 scope 分组、保持插入顺序的优先级表集合
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriorityReport {
    pub tables: Vec<PriorityTable>,
}

impl PriorityReport {
    pub fn push(&mut self, table: PriorityTable) {
        self.tables.push(table);
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let raw = serde_json::to_string_pretty(self).map_err(|source| Error::Json {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, raw).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
