//! 静态数据流图
//!
//! 此模块包含数据流图的节点表示、JSON 输入格式，以及依赖分析（walker）。
//! 图在构建后不可变；调度策略只读取它，派生出的属性保存在策略自己的表里。

// 子模块声明
mod id;
mod node;
mod dataflow;
mod spec;
pub mod walker;

// 重新导出公共接口
pub use id::NodeId;
pub use node::{GraphNode, OpKind};
pub use dataflow::Graph;
pub use spec::{GraphSpec, NodeSpec};
pub use walker::{Classification, Dependencies, DepsTable};
