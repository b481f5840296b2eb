//! 基于时间 oracle 的调度（TAO）

use std::cell::OnceCell;
use std::collections::{HashMap, HashSet};

use tracing::{debug, info, warn};

use super::base::{OrderingBase, Props};
use super::comparator::{OpComparator, TaoComparator, stable_sort_by};
use super::priority::Priority;
use super::CommOrdering;
use crate::config::SchedulerConfig;
use crate::error::Result;
use crate::graph::{Graph, NodeId};
use crate::oracle::TimeOracle;

/// TAO 策略对象：一个对象只服务于一张图，结果计算一次后缓存，不会失效
#[derive(Debug)]
pub struct Tao<C: OpComparator = TaoComparator> {
    base: OrderingBase,
    comparator: C,
    priorities: OnceCell<Vec<Priority>>,
}

impl Tao<TaoComparator> {
    pub fn new(
        graph: &Graph,
        root: NodeId,
        oracle: &TimeOracle,
        cfg: &SchedulerConfig,
    ) -> Result<Self> {
        Self::with_comparator(graph, root, oracle, cfg, TaoComparator)
    }
}

impl<C: OpComparator> Tao<C> {
    #[tracing::instrument(skip_all, fields(scope = ?graph.scope()))]
    pub fn with_comparator(
        graph: &Graph,
        root: NodeId,
        oracle: &TimeOracle,
        cfg: &SchedulerConfig,
        comparator: C,
    ) -> Result<Self> {
        let mut missing = 0usize;
        let base = OrderingBase::new(graph, root, |id| {
            let name = graph.recv_name(id).unwrap_or_else(|| graph.name(id));
            match oracle.query(name) {
                Some(t) => t,
                None => {
                    warn!(op = %name, "no measured duration (server/client version mismatch?)");
                    missing += 1;
                    cfg.fallback_duration_us
                }
            }
        })?;
        if missing > 0 {
            info!(missing, fallback_us = cfg.fallback_duration_us, "oracle lookups fell back");
        }
        Ok(Self {
            base,
            comparator,
            priorities: OnceCell::new(),
        })
    }

    /// 给定未调度集合下的属性表
    pub fn properties(&self, outstanding: &[NodeId]) -> Props {
        let set: HashSet<NodeId> = outstanding.iter().copied().collect();
        self.base.update_properties(&set)
    }

    fn compute(&self) -> Vec<Priority> {
        let mut outstanding: Vec<NodeId> = self.base.recv_ops().to_vec();
        let mut out = Vec::with_capacity(outstanding.len());
        let mut rank = 0usize;
        while !outstanding.is_empty() {
            let props = self.properties(&outstanding);
            stable_sort_by(&mut outstanding, |a, b| {
                self.comparator.compare(&props[a], &props[b])
            });
            let op = outstanding.remove(0);
            debug!(rank, ?op, props = ?props[&op], "scheduled");
            out.push(Priority { rank, op });
            rank += 1;
        }
        out
    }

    /// 接收算子的时长（oracle 查询结果或回退值）
    pub fn durations(&self) -> HashMap<NodeId, u64> {
        self.base
            .recv_ops()
            .iter()
            .map(|&id| (id, self.base.cost(id)))
            .collect()
    }
}

impl<C: OpComparator> CommOrdering for Tao<C> {
    fn name(&self) -> &'static str {
        "TAO"
    }

    fn get_priorities(&self) -> &[Priority] {
        self.priorities.get_or_init(|| self.compute())
    }
}
