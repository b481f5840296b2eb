//! 数据流图的 JSON 输入格式

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::dataflow::Graph;
use super::id::NodeId;
use crate::config::SchedulerConfig;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphSpec {
    #[serde(default)]
    pub scope: Option<String>,
    /// 目标节点（loss 或训练 op）
    pub root: String,
    pub nodes: Vec<NodeSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSpec {
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<String>,
}

impl GraphSpec {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| Error::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// 构建图，返回 (图, 根节点)。
    ///
    /// 节点可以按任意顺序出现；输入名中的 `:<n>` 输出下标会被去掉，
    /// `^name` 形式的控制依赖不携带张量，直接忽略。
    pub fn build(&self, cfg: &SchedulerConfig) -> Result<(Graph, NodeId)> {
        let mut graph = Graph::new(cfg);
        if let Some(scope) = &self.scope {
            graph = graph.with_scope(scope.clone());
        }
        for node in &self.nodes {
            graph.add_node(node.name.clone(), &[])?;
        }
        for node in &self.nodes {
            let mut inputs = Vec::with_capacity(node.inputs.len());
            for input in &node.inputs {
                if input.starts_with('^') {
                    continue;
                }
                let name = parse_input(input);
                let id = graph.find(name).ok_or_else(|| Error::UnknownInput {
                    node: node.name.clone(),
                    input: input.clone(),
                })?;
                inputs.push(id);
            }
            if let Some(id) = graph.find(&node.name) {
                graph.set_inputs(id, inputs);
            }
        }
        let root = graph
            .find(&self.root)
            .ok_or_else(|| Error::UnknownRoot(self.root.clone()))?;
        info!(nodes = graph.len(), root = %self.root, scope = ?self.scope, "built dataflow graph");
        Ok((graph, root))
    }
}

/// `name:1` -> `name`
fn parse_input(input: &str) -> &str {
    match input.rsplit_once(':') {
        Some((name, idx)) if !idx.is_empty() && idx.bytes().all(|b| b.is_ascii_digit()) => name,
        _ => input,
    }
}
