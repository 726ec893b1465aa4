// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::time::Duration;

/// 重试策略配置
///
/// 控制单个工作单元的抓取尝试次数、每次尝试前的随机节流延迟，
/// 以及被封锁后的指数退避。
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// 最大尝试次数（包含第一次）
    pub retry_limit: u32,
    /// 退避底数，第 a 次（从0开始）尝试被封锁后等待 base^a 个退避单位
    pub backoff_base: f64,
    /// 退避单位
    pub backoff_unit: Duration,
    /// 节流延迟下限
    pub pacing_min: Duration,
    /// 节流延迟上限
    pub pacing_max: Duration,
    /// 单次请求超时
    pub request_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retry_limit: 3,
            backoff_base: 2.0,
            backoff_unit: Duration::from_secs(1),
            pacing_min: Duration::from_millis(500),
            pacing_max: Duration::from_millis(1200),
            request_timeout: Duration::from_secs(15),
        }
    }
}

impl RetryPolicy {
    /// 创建标准重试策略
    pub fn standard() -> Self {
        Self::default()
    }

    /// 创建无延迟策略（测试和本地回放使用）
    pub fn immediate(retry_limit: u32) -> Self {
        Self {
            retry_limit,
            backoff_base: 2.0,
            backoff_unit: Duration::ZERO,
            pacing_min: Duration::ZERO,
            pacing_max: Duration::ZERO,
            request_timeout: Duration::from_secs(5),
        }
    }

    /// 计算被封锁后的退避时间
    ///
    /// # 参数
    ///
    /// * `attempt` - 从0开始的尝试序号
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        let factor = self.backoff_base.powi(attempt as i32);
        Duration::from_secs_f64(self.backoff_unit.as_secs_f64() * factor.max(0.0))
    }

    /// 计算一次请求前的随机节流延迟
    pub fn pacing_delay(&self) -> Duration {
        let min = self.pacing_min.as_millis() as u64;
        let max = self.pacing_max.as_millis() as u64;
        if max <= min {
            return self.pacing_min;
        }
        Duration::from_millis(rand::random_range(min..=max))
    }

    /// 在第 `attempt` 次尝试失败后是否还应继续
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt + 1 < self.retry_limit
    }
}
