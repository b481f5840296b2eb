//! 并行效率分析
//!
//! 对单个设备上的计算流与通信流分别统计忙碌区间与有效占用时间，
//! 得到重叠效率 `E`、可加速空间 `S` 以及通信/计算比 `a`。
//! 外部的 batch size 搜索以 `a ≈ 1` 为目标调整实验参数。

use std::fmt;

use crate::trace::{NodeExecStats, StepTrace};

/// 一条算子流的忙碌区间与占用时间（微秒）
#[derive(Debug, Clone, Default)]
pub struct Tracker {
    utilization: u64,
    start: u64,
    end: u64,
    ops: usize,
}

impl Tracker {
    /// 记录按开始时间排序到达的算子；与已记录区间重叠的部分不重复计入
    pub fn add_op(&mut self, op: &NodeExecStats) {
        if self.ops == 0 {
            self.start = op.all_start_micros;
        }
        let op_end = op.op_end();
        self.utilization = self
            .utilization
            .saturating_add(op_end.saturating_sub(self.end.max(op.all_start_micros)));
        self.start = self.start.min(op.all_start_micros);
        self.end = self.end.max(op_end);
        self.ops += 1;
    }

    pub fn makespan(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    pub fn utilization(&self) -> u64 {
        self.utilization
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    pub fn is_empty(&self) -> bool {
        self.ops == 0
    }
}

#[derive(Debug, Clone)]
pub struct Efficiency {
    pub comm: Tracker,
    pub comp: Tracker,
    /// 两条流合并后的忙碌区间长度
    pub u: u64,
    pub cost_max: u64,
    pub cost_min: u64,
    /// 重叠效率：1 表示完全重叠，0 表示完全串行
    pub e: Option<f64>,
    pub s: Option<f64>,
    /// 通信/计算比
    pub a: Option<f64>,
    pub p: u64,
    pub m: u64,
}

impl Efficiency {
    pub fn from_trace(step: &StepTrace, device_filter: &str) -> Self {
        let mut ops: Vec<&NodeExecStats> = step.ops_on(device_filter).collect();
        ops.sort_by_key(|op| op.all_start_micros);

        let mut comm = Tracker::default();
        let mut comp = Tracker::default();
        for op in ops {
            if op.is_recv() {
                comm.add_op(op);
            } else {
                comp.add_op(op);
            }
        }

        let busy: Vec<&Tracker> = [&comm, &comp].into_iter().filter(|t| !t.is_empty()).collect();
        let u = match (
            busy.iter().map(|t| t.start()).min(),
            busy.iter().map(|t| t.end()).max(),
        ) {
            (Some(start), Some(end)) => end.saturating_sub(start),
            _ => 0,
        };

        let (m, p) = (comm.utilization(), comp.utilization());
        let cost_max = m.saturating_add(p);
        let cost_min = m.max(p);
        let span = cost_max - cost_min;
        let e = (span != 0).then(|| (cost_max as f64 - u as f64) / span as f64);
        let s = (cost_min != 0).then(|| span as f64 / cost_min as f64);
        let a = (p != 0).then(|| m as f64 / p as f64);

        Self {
            comm,
            comp,
            u,
            cost_max,
            cost_min,
            e,
            s,
            a,
            p,
            m,
        }
    }
}

impl fmt::Display for Efficiency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = |x: Option<f64>| x.unwrap_or(-1.0);
        let es = match (self.e, self.s) {
            (Some(e), Some(s)) => e * s,
            _ => -1.0,
        };
        write!(
            f,
            "E: {:0.2}, S: {:0.2}, a: {:0.2} E*S: {:0.2} M: {:0.0} P: {:0.0} U: {:0.0}",
            r(self.e),
            r(self.s),
            r(self.a),
            es,
            self.m as f64 / 1000.0,
            self.p as f64 / 1000.0,
            self.u as f64 / 1000.0,
        )
    }
}

/// 多个 step、多个 worker 设备的效率汇总
#[derive(Debug, Clone, Default)]
pub struct ResultAnalyser {
    pub worker_devices: Vec<String>,
    /// 每个 step 一组（每个设备一个）
    pub effs: Vec<Vec<Efficiency>>,
}

impl ResultAnalyser {
    pub fn new(steps: &[StepTrace], worker_filter: &str) -> Self {
        let Some(last) = steps.last() else {
            return Self::default();
        };
        let worker_devices = last.devices(worker_filter);
        let effs = steps
            .iter()
            .map(|step| {
                worker_devices
                    .iter()
                    .map(|d| Efficiency::from_trace(step, d))
                    .collect()
            })
            .collect();
        Self {
            worker_devices,
            effs,
        }
    }

    pub fn all_effs(&self) -> impl Iterator<Item = &Efficiency> {
        self.effs.iter().flatten()
    }

    /// 所有 `a` 的最小值与最大值的均值
    pub fn get_a(&self) -> Option<f64> {
        let mut lo: Option<f64> = None;
        let mut hi: Option<f64> = None;
        for a in self.all_effs().filter_map(|e| e.a) {
            lo = Some(lo.map_or(a, |x| x.min(a)));
            hi = Some(hi.map_or(a, |x| x.max(a)));
        }
        Some((lo? + hi?) / 2.0)
    }
}
