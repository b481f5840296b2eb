//! 图节点

use super::id::NodeId;

/// 节点类别：本地计算，或从其他进程/设备接收张量
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    Compute,
    Receive,
}

impl OpKind {
    /// 按名字结构判定：以接收后缀结尾的节点是接收算子
    pub fn classify(name: &str, recv_suffix: &str) -> Self {
        if !recv_suffix.is_empty() && name.ends_with(recv_suffix) {
            Self::Receive
        } else {
            Self::Compute
        }
    }
}

#[derive(Debug, Clone)]
pub struct GraphNode {
    name: String,
    kind: OpKind,
    /// 有序输入边（生产者节点）
    inputs: Vec<NodeId>,
}

impl GraphNode {
    pub(super) fn new(name: String, kind: OpKind, inputs: Vec<NodeId>) -> Self {
        Self { name, kind, inputs }
    }

    pub(super) fn set_inputs(&mut self, inputs: Vec<NodeId>) {
        self.inputs = inputs;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> OpKind {
        self.kind
    }

    pub fn is_recv(&self) -> bool {
        self.kind == OpKind::Receive
    }

    pub fn inputs(&self) -> &[NodeId] {
        &self.inputs
    }
}
