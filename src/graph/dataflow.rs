use std::collections::HashMap;

use tracing::debug;

use super::id::NodeId;
use super::node::{GraphNode, OpKind};
use crate::config::SchedulerConfig;
use crate::error::{Error, Result};

/// 数据流图：拥有全部节点，边用 `NodeId` 引用
#[derive(Debug, Clone)]
pub struct Graph {
    nodes: Vec<GraphNode>,
    by_name: HashMap<String, NodeId>,
    recv_suffix: String,
    /// 构图时使用的实验 scope（例如 `vgg16-TAO`）
    scope: Option<String>,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new(&SchedulerConfig::default())
    }
}

impl Graph {
    pub fn new(cfg: &SchedulerConfig) -> Self {
        Self {
            nodes: Vec::new(),
            by_name: HashMap::new(),
            recv_suffix: cfg.recv_suffix.clone(),
            scope: None,
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    pub fn recv_suffix(&self) -> &str {
        &self.recv_suffix
    }

    /// 添加节点；名字重复时报错。
    pub fn add_node(&mut self, name: impl Into<String>, inputs: &[NodeId]) -> Result<NodeId> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(Error::DuplicateNode(name));
        }
        let id = NodeId(self.nodes.len());
        let kind = OpKind::classify(&name, &self.recv_suffix);
        debug!(node = %name, ?kind, inputs = inputs.len(), "add node");
        self.by_name.insert(name.clone(), id);
        self.nodes.push(GraphNode::new(name, kind, inputs.to_vec()));
        Ok(id)
    }

    /// 覆盖某个节点的输入边（仅供按名字解析的构图流程使用）
    pub(super) fn set_inputs(&mut self, id: NodeId, inputs: Vec<NodeId>) {
        self.nodes[id.0].set_inputs(inputs);
    }

    pub fn node(&self, id: NodeId) -> &GraphNode {
        &self.nodes[id.0]
    }

    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).copied()
    }

    pub fn name(&self, id: NodeId) -> &str {
        self.nodes[id.0].name()
    }

    pub fn is_recv(&self, id: NodeId) -> bool {
        self.nodes[id.0].is_recv()
    }

    /// 接收算子对应的被传输张量名（去掉接收后缀）；计算算子返回 None
    pub fn recv_name(&self, id: NodeId) -> Option<&str> {
        let node = &self.nodes[id.0];
        if node.is_recv() {
            node.name().strip_suffix(self.recv_suffix.as_str())
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &GraphNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }
}
