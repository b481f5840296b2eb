//! 仅基于拓扑的调度（TIO）
//!
//! 没有可信的时长数据：接收算子记 1，计算算子记 0，于是 `mp` 退化为
//! "被共同需要的接收算子个数"。被同一个计算共同需要的接收算子应当一起取回，
//! 所以 `mp` 相同的算子得到相同 rank；rank 是该组在排序结果中的起始位置。

use std::cell::OnceCell;
use std::collections::HashSet;

use tracing::debug;

use super::base::{OrderingBase, Props};
use super::comparator::{MpComparator, OpComparator};
use super::priority::Priority;
use super::CommOrdering;
use crate::error::Result;
use crate::graph::{Graph, NodeId};

#[derive(Debug)]
pub struct Tio {
    base: OrderingBase,
    priorities: OnceCell<Vec<Priority>>,
}

impl Tio {
    #[tracing::instrument(skip_all, fields(scope = ?graph.scope()))]
    pub fn new(graph: &Graph, root: NodeId) -> Result<Self> {
        let base = OrderingBase::new(graph, root, |id| u64::from(graph.is_recv(id)))?;
        Ok(Self {
            base,
            priorities: OnceCell::new(),
        })
    }

    /// 全部接收算子都未调度时的属性表
    pub fn properties(&self) -> Props {
        let outstanding: HashSet<NodeId> = self.base.recv_ops().iter().copied().collect();
        self.base.update_properties(&outstanding)
    }

    fn compute(&self) -> Vec<Priority> {
        let props = self.properties();
        let mut ops: Vec<NodeId> = self.base.recv_ops().to_vec();
        // mp 是全序，直接用标准库的稳定排序
        ops.sort_by(|a, b| MpComparator.compare(&props[a], &props[b]));

        let mut out = Vec::with_capacity(ops.len());
        let mut group: Option<(u64, usize)> = None;
        for (counter, op) in ops.into_iter().enumerate() {
            let mp = props[&op].mp;
            let rank = match group {
                Some((last_mp, rank)) if last_mp >= mp => rank,
                _ => {
                    group = Some((mp, counter));
                    counter
                }
            };
            out.push(Priority { rank, op });
        }
        debug!(
            ops = out.len(),
            groups = out.windows(2).filter(|w| w[0].rank != w[1].rank).count() + usize::from(!out.is_empty()),
            "topology-only priorities"
        );
        out
    }
}

impl CommOrdering for Tio {
    fn name(&self) -> &'static str {
        "TIO"
    }

    fn get_priorities(&self) -> &[Priority] {
        self.priorities.get_or_init(|| self.compute())
    }
}
