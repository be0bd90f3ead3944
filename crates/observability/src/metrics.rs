//! 分发指标收集模块
//!
//! 基于 DispatchOutcome 与单个 topic 的发布结果记录运行指标。

use contracts::DispatchOutcome;
use metrics::{counter, histogram};

/// 从 DispatchOutcome 记录指标
///
/// 每次分发调用结束后调用此函数。
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_dispatch_outcome;
///
/// let outcome = dispatcher.dispatch(events).await;
/// record_dispatch_outcome(&outcome);
/// ```
pub fn record_dispatch_outcome(outcome: &DispatchOutcome) {
    counter!("event_dispatcher_batches_total").increment(1);

    counter!("event_dispatcher_events_total", "outcome" => "succeeded")
        .increment(outcome.succeeded.len() as u64);
    counter!("event_dispatcher_events_total", "outcome" => "invalid")
        .increment(outcome.invalid.len() as u64);
    counter!("event_dispatcher_events_total", "outcome" => "failed")
        .increment(outcome.failed.len() as u64);

    histogram!("event_dispatcher_batch_size").record(outcome.len() as f64);
}

/// 记录单个 topic 的发布结果
pub fn record_group_publish(success: bool, event_count: usize, latency_ms: f64) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "event_dispatcher_group_publish_total",
        "status" => status
    )
    .increment(1);

    histogram!("event_dispatcher_group_size").record(event_count as f64);
    histogram!("event_dispatcher_group_publish_latency_ms").record(latency_ms);
}

/// 记录被整体拒绝的请求 (请求体无法解析)
pub fn record_request_rejected(reason: &'static str) {
    counter!("event_dispatcher_requests_rejected_total", "reason" => reason).increment(1);
}

/// 分发结果聚合器
///
/// 在内存中聚合请求/事件结果，用于压测统计和输出摘要。
#[derive(Debug, Clone, Default)]
pub struct OutcomeAggregator {
    /// 总请求数
    pub total_requests: u64,

    /// 成功请求数 (HTTP 200)
    pub success_requests: u64,

    /// 失败请求数
    pub failed_requests: u64,

    /// 超时请求数
    pub timeout_requests: u64,

    /// 事件计数
    pub success_events: u64,
    pub failed_events: u64,
    pub invalid_events: u64,

    /// 成功请求的延迟统计 (毫秒)
    pub latency_stats: RunningStats,
}

impl OutcomeAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一次成功返回的请求
    pub fn record_response(&mut self, outcome: &DispatchOutcome, latency_ms: f64) {
        self.total_requests += 1;
        self.success_requests += 1;
        self.success_events += outcome.succeeded.len() as u64;
        self.failed_events += outcome.failed.len() as u64;
        self.invalid_events += outcome.invalid.len() as u64;
        self.latency_stats.push(latency_ms);
    }

    /// 记录一次失败的请求
    pub fn record_failure(&mut self, timed_out: bool) {
        self.total_requests += 1;
        if timed_out {
            self.timeout_requests += 1;
        } else {
            self.failed_requests += 1;
        }
    }

    /// 事件总数
    pub fn total_events(&self) -> u64 {
        self.success_events + self.failed_events + self.invalid_events
    }

    /// 生成摘要报告
    pub fn summary(&self) -> LoadSummary {
        let total_events = self.total_events();
        LoadSummary {
            total_requests: self.total_requests,
            success_requests: self.success_requests,
            failed_requests: self.failed_requests,
            timeout_requests: self.timeout_requests,
            total_events,
            success_events: self.success_events,
            failed_events: self.failed_events,
            invalid_events: self.invalid_events,
            request_success_rate: percentage(self.success_requests, self.total_requests),
            timeout_rate: percentage(self.timeout_requests, self.total_requests),
            event_success_rate: percentage(self.success_events, total_events),
            latency_ms: StatsSummary::from(&self.latency_stats),
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn percentage(part: u64, total: u64) -> f64 {
    if total > 0 {
        part as f64 / total as f64 * 100.0
    } else {
        0.0
    }
}

/// 压测指标摘要
#[derive(Debug, Clone, Default)]
pub struct LoadSummary {
    pub total_requests: u64,
    pub success_requests: u64,
    pub failed_requests: u64,
    pub timeout_requests: u64,
    pub total_events: u64,
    pub success_events: u64,
    pub failed_events: u64,
    pub invalid_events: u64,
    pub request_success_rate: f64,
    pub timeout_rate: f64,
    pub event_success_rate: f64,
    pub latency_ms: StatsSummary,
}

impl std::fmt::Display for LoadSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Requests: {} total, {} success, {} failed, {} timeout",
            self.total_requests, self.success_requests, self.failed_requests, self.timeout_requests
        )?;
        writeln!(
            f,
            "Events: {} total, {} success, {} failed, {} invalid",
            self.total_events, self.success_events, self.failed_events, self.invalid_events
        )?;
        writeln!(f, "Latency (ms): {}", self.latency_ms)?;
        writeln!(
            f,
            "Success Rate: {:.2}% (requests), {:.2}% (events)",
            self.request_success_rate, self.event_success_rate
        )?;
        if self.timeout_requests > 0 {
            writeln!(
                f,
                "Timeout Rate: {:.2}% ({}/{} requests)",
                self.timeout_rate, self.timeout_requests, self.total_requests
            )?;
        }
        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// 样本数量
    pub fn count(&self) -> u64 {
        self.count
    }

    /// 均值
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// 标准差
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// 最小值
    pub fn min(&self) -> f64 {
        self.min
    }

    /// 最大值
    pub fn max(&self) -> f64 {
        self.max
    }
}
