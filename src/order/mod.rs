//! 通信调度策略
//!
//! 两种可互换的策略都基于同一份依赖分析结果：
//! - [`Tao`]：使用时间 oracle 的实测时长，每次选出一个接收算子后重新计算属性；
//! - [`Tio`]：不依赖时长，只按 "被多少接收算子共同需要" 排序。
//!
//! 输出形状相同：按 rank 排列的 (rank, 接收算子) 序列。

// 子模块声明
mod base;
mod comparator;
mod priority;
mod tao;
mod tio;

// 重新导出公共接口
pub use base::{OpProps, Props, INF};
pub use comparator::{MpComparator, OpComparator, TaoComparator, stable_sort_by};
pub use priority::{Priority, PriorityEntry, PriorityReport, PriorityTable};
pub use tao::Tao;
pub use tio::Tio;

/// 调度策略公共接口
pub trait CommOrdering {
    /// 策略名（写入输出表）
    fn name(&self) -> &'static str;

    /// 计算（并缓存）优先级序列
    fn get_priorities(&self) -> &[Priority];
}
