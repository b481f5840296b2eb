//! 依赖分析
//!
//! 从目标节点出发做两遍互相独立的遍历：
//! - 分类：找出所有可达的接收算子与计算算子；
//! - 依赖集合：对每个计算算子，求出它不经过其他接收算子即可到达的接收算子集合。
//!
//! 两遍都用显式栈，避免深图上的递归溢出。

use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::{debug, info};

use super::dataflow::Graph;
use super::id::NodeId;
use crate::error::{Error, Result};

/// 节点 -> 依赖的接收算子集合
pub type DepsTable = HashMap<NodeId, BTreeSet<NodeId>>;

#[derive(Debug, Clone, Default)]
pub struct Classification {
    /// 按发现顺序排列的接收算子
    pub recv_ops: Vec<NodeId>,
    pub comp_ops: Vec<NodeId>,
}

#[derive(Debug, Clone, Default)]
pub struct Dependencies {
    pub recv_ops: Vec<NodeId>,
    pub comp_ops: Vec<NodeId>,
    pub deps: DepsTable,
}

impl Dependencies {
    /// 节点的依赖集合；根不可达的节点返回空集合
    pub fn deps_of(&self, id: NodeId) -> &BTreeSet<NodeId> {
        static EMPTY: BTreeSet<NodeId> = BTreeSet::new();
        self.deps.get(&id).unwrap_or(&EMPTY)
    }
}

/// 分类遍历：接收算子不再向上展开
pub fn classify(graph: &Graph, root: NodeId) -> Classification {
    let mut out = Classification::default();
    let mut visited: HashSet<NodeId> = HashSet::new();
    let mut stack = vec![root];

    while let Some(id) = stack.pop() {
        if !visited.insert(id) {
            continue;
        }
        if graph.is_recv(id) {
            out.recv_ops.push(id);
        } else {
            out.comp_ops.push(id);
            stack.extend_from_slice(graph.node(id).inputs());
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    Enter,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Open,
    Done,
}

/// 依赖集合遍历（两次出栈模拟后序）。
///
/// 第一次出栈时把自己以 `Exit` 重新压栈，再压入全部输入；第二次出栈时
/// 输入均已完成，依赖集合即为输入依赖集合的并集。接收算子的依赖集合是它自己。
/// 若某节点在仍处于 `Open` 时再次被进入，说明存在环。
pub fn find_deps(graph: &Graph, root: NodeId) -> Result<DepsTable> {
    let mut deps: DepsTable = HashMap::new();
    let mut marks: HashMap<NodeId, Mark> = HashMap::new();
    let mut stack = vec![(root, Visit::Enter)];

    while let Some((id, visit)) = stack.pop() {
        match visit {
            Visit::Enter => match marks.get(&id) {
                Some(Mark::Done) => {}
                Some(Mark::Open) => return Err(Error::Cycle(graph.name(id).to_string())),
                None => {
                    if graph.is_recv(id) {
                        deps.insert(id, BTreeSet::from([id]));
                        marks.insert(id, Mark::Done);
                    } else {
                        marks.insert(id, Mark::Open);
                        stack.push((id, Visit::Exit));
                        for &input in graph.node(id).inputs() {
                            stack.push((input, Visit::Enter));
                        }
                    }
                }
            },
            Visit::Exit => {
                let mut set = BTreeSet::new();
                for input in graph.node(id).inputs() {
                    if let Some(d) = deps.get(input) {
                        set.extend(d.iter().copied());
                    }
                }
                deps.insert(id, set);
                marks.insert(id, Mark::Done);
            }
        }
    }
    Ok(deps)
}

/// 依次执行两遍遍历
#[tracing::instrument(skip(graph), fields(root = %graph.name(root)))]
pub fn walk(graph: &Graph, root: NodeId) -> Result<Dependencies> {
    let deps = find_deps(graph, root)?;
    let Classification { recv_ops, comp_ops } = classify(graph, root);
    debug!(deps_entries = deps.len(), "dependency sets computed");
    info!(
        recv_ops = recv_ops.len(),
        comp_ops = comp_ops.len(),
        "classified reachable ops"
    );
    Ok(Dependencies {
        recv_ops,
        comp_ops,
        deps,
    })
}
