//! 调度器配置

/// 数据流图/trace 中的结构性常量
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// 接收算子（变量读取）名字的后缀
    pub recv_suffix: String,
    /// oracle 缺失某个算子时使用的时长（微秒）
    pub fallback_duration_us: u64,
    /// 只统计设备名包含该子串的设备（排除 PS 设备）
    pub worker_filter: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            recv_suffix: "/read".to_string(),
            fallback_duration_us: 10,
            worker_filter: "worker".to_string(),
        }
    }
}
