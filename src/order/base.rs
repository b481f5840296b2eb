use std::collections::{HashMap, HashSet};

use crate::graph::{Dependencies, Graph, NodeId, walker};
use crate::error::Result;

/// 尚未观测到联合依赖时的 `mp`
pub const INF: u64 = u64::MAX;

/// 每个接收算子的调度属性
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpProps {
    /// 自身时长
    pub m: u64,
    /// 仅等待该接收即可运行的计算时长之和
    pub p: u64,
    /// 联合依赖中最小的接收时长之和
    pub mp: u64,
}

impl Default for OpProps {
    fn default() -> Self {
        Self { m: 0, p: 0, mp: INF }
    }
}

/// 调度属性表（属于策略对象，不挂在图上）
pub type Props = HashMap<NodeId, OpProps>;

/// 两种策略共享的状态：依赖分析结果 + 每个可达节点的时长
#[derive(Debug, Clone)]
pub(super) struct OrderingBase {
    pub(super) deps: Dependencies,
    cost: HashMap<NodeId, u64>,
}

impl OrderingBase {
    pub(super) fn new(
        graph: &Graph,
        root: NodeId,
        mut cost_of: impl FnMut(NodeId) -> u64,
    ) -> Result<Self> {
        let deps = walker::walk(graph, root)?;
        let cost = deps
            .recv_ops
            .iter()
            .chain(deps.comp_ops.iter())
            .map(|&id| (id, cost_of(id)))
            .collect();
        Ok(Self { deps, cost })
    }

    pub(super) fn cost(&self, id: NodeId) -> u64 {
        self.cost.get(&id).copied().unwrap_or(0)
    }

    pub(super) fn recv_ops(&self) -> &[NodeId] {
        &self.deps.recv_ops
    }

    /// 针对当前未调度的接收集合重新计算 `p`/`m`/`mp`
    pub(super) fn update_properties(&self, outstanding: &HashSet<NodeId>) -> Props {
        let mut props: Props = self
            .deps
            .recv_ops
            .iter()
            .map(|&id| {
                (
                    id,
                    OpProps {
                        m: self.cost(id),
                        ..OpProps::default()
                    },
                )
            })
            .collect();

        for &op in &self.deps.comp_ops {
            let op_deps: Vec<NodeId> = self
                .deps
                .deps_of(op)
                .iter()
                .copied()
                .filter(|d| outstanding.contains(d))
                .collect();
            match op_deps.as_slice() {
                [] => {}
                [read] => {
                    if let Some(pr) = props.get_mut(read) {
                        pr.p = pr.p.saturating_add(self.cost(op));
                    }
                }
                reads => {
                    let joint = reads
                        .iter()
                        .fold(0u64, |acc, &r| acc.saturating_add(self.cost(r)));
                    for read in reads {
                        if let Some(pr) = props.get_mut(read) {
                            pr.mp = pr.mp.min(joint);
                        }
                    }
                }
            }
        }
        props
    }
}
