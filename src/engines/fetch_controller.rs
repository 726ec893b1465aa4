// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::{counter, histogram};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};

use crate::domain::models::unit_result::{FailureRecord, UnitPayload, UnitResult};
use crate::domain::models::work_unit::WorkUnit;
use crate::domain::services::failure_log::FailureLog;
use crate::engines::identity_pool::IdentityPool;
use crate::engines::payload_parser::{ParseError, PayloadParser};
use crate::engines::traits::{EngineError, RawResponse, UnitFetcher};
use crate::utils::retry_policy::RetryPolicy;

/// 单次尝试的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// 解析成功，立即返回
    Success(UnitPayload),
    /// 远端标记了当前身份：轮换身份并退避
    Blocked(String),
    /// 网络错误、超时或负载格式错误：在预算内重试
    Transient(String),
    /// 重试无意义（例如端点无法构造请求）：立即放弃
    Fatal(String),
}

/// 将一次请求的结果分类
///
/// 403/429 以及成功状态码但响应体不是JSON的情况视为被封锁；
/// 其余非成功状态码、网络错误和结构不符的JSON视为暂时性失败。
pub fn classify(
    parser: &PayloadParser,
    response: Result<RawResponse, EngineError>,
) -> AttemptOutcome {
    let response = match response {
        Ok(response) => response,
        Err(e) if e.is_retryable() => return AttemptOutcome::Transient(e.to_string()),
        Err(e) => return AttemptOutcome::Fatal(e.to_string()),
    };

    if response.is_block_status() {
        let reason = if response.status_code == 429 {
            "Rate limited (HTTP 429)"
        } else {
            "Access denied (HTTP 403)"
        };
        return AttemptOutcome::Blocked(reason.to_string());
    }

    if !response.is_success() {
        return AttemptOutcome::Transient(format!("HTTP {}", response.status_code));
    }

    match parser.parse(&response.content) {
        Ok(payload) => AttemptOutcome::Success(payload),
        Err(ParseError::NotStructured) => AttemptOutcome::Blocked(format!(
            "Unstructured response body ({})",
            if response.content_type.is_empty() {
                "no content type"
            } else {
                response.content_type.as_str()
            }
        )),
        Err(e @ ParseError::Malformed(_)) => AttemptOutcome::Transient(e.to_string()),
    }
}

/// 抓取重试控制器
///
/// 在至多 `retry_limit` 次尝试内完成一个工作单元的抓取。所有失败都在这里
/// 被转换为失败结果并写入失败日志，任何错误都不会越过这个边界。
pub struct FetchController {
    fetcher: Arc<dyn UnitFetcher>,
    pool: Arc<IdentityPool>,
    parser: PayloadParser,
    policy: RetryPolicy,
    failures: Arc<FailureLog>,
    date_code: String,
}

impl FetchController {
    pub fn new(
        fetcher: Arc<dyn UnitFetcher>,
        pool: Arc<IdentityPool>,
        parser: PayloadParser,
        policy: RetryPolicy,
        failures: Arc<FailureLog>,
        date_code: impl Into<String>,
    ) -> Self {
        Self {
            fetcher,
            pool,
            parser,
            policy,
            failures,
            date_code: date_code.into(),
        }
    }

    pub fn pool(&self) -> &Arc<IdentityPool> {
        &self.pool
    }

    pub fn failures(&self) -> &Arc<FailureLog> {
        &self.failures
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// 抓取一个工作单元
    ///
    /// # 参数
    ///
    /// * `worker_key` - 工作器槽位，决定使用哪个身份
    /// * `sequence` - 工作单元在提交序列中的位置
    /// * `unit` - 工作单元
    ///
    /// # 返回值
    ///
    /// 恰好一个结果：成功负载，或者已写入失败日志的失败记录
    #[instrument(skip(self, unit), fields(unit = %unit, worker = worker_key))]
    pub async fn harvest(&self, worker_key: usize, sequence: usize, unit: WorkUnit) -> UnitResult {
        let url = unit.endpoint(&self.date_code);
        let mut last_error = String::from("no attempt was made");

        for attempt in 0..self.policy.retry_limit {
            sleep(self.policy.pacing_delay()).await;

            match self.attempt(worker_key, &url).await {
                AttemptOutcome::Success(payload) => {
                    counter!("harvest_units_total", "outcome" => "harvested").increment(1);
                    info!(attempt, entries = payload.len(), "Unit harvested");
                    return UnitResult::harvested(sequence, unit, payload);
                }
                AttemptOutcome::Blocked(reason) => {
                    counter!("harvest_blocked_total").increment(1);
                    warn!(attempt, "Blocked: {}", reason);
                    self.pool.invalidate(worker_key);
                    last_error = reason;

                    if self.policy.should_retry(attempt) {
                        let backoff = self.policy.calculate_backoff(attempt);
                        debug!(attempt, backoff_ms = backoff.as_millis() as u64, "Backing off");
                        sleep(backoff).await;
                    }
                }
                AttemptOutcome::Transient(reason) => {
                    warn!(attempt, "Transient failure: {}", reason);
                    last_error = reason;
                }
                AttemptOutcome::Fatal(reason) => {
                    warn!(attempt, "Unrecoverable failure: {}", reason);
                    last_error = reason;
                    break;
                }
            }
        }

        let record = FailureRecord::for_unit(&unit, &last_error);
        let errors = self.failures.record(record.clone());
        counter!("harvest_units_total", "outcome" => "failed").increment(1);
        counter!("harvest_units_failed_total").increment(1);
        error!(errors, "Giving up on unit: {}", last_error);

        UnitResult::failed(sequence, unit, record)
    }

    /// 执行一次尝试：获取槽位身份、发出请求并分类
    pub async fn attempt(&self, worker_key: usize, url: &str) -> AttemptOutcome {
        let identity = match self.pool.acquire(worker_key).await {
            Ok(identity) => identity,
            Err(e) => return AttemptOutcome::Transient(format!("Identity unavailable: {}", e)),
        };

        let start = Instant::now();
        let response = self.fetcher.fetch(url, &identity).await;
        histogram!("harvest_attempt_duration_seconds", "fetcher" => self.fetcher.name())
            .record(start.elapsed().as_secs_f64());

        classify(&self.parser, response)
    }
}

#[cfg(test)]
#[path = "fetch_controller_test.rs"]
mod tests;
