// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::{
    config::settings::Settings,
    domain::{
        models::{
            unit_result::{HarvestMode, UnitResult},
            work_unit::WorkUnit,
        },
        repositories::{
            result_sink::{ResultSink, RunReport},
            storage_repository::StorageRepository,
            work_unit_source::WorkUnitSource,
        },
        services::{
            aggregation_service::Aggregator, failure_log::FailureLog,
            publish_service::{compose_summary, Publisher},
        },
    },
    engines::{
        fetch_controller::FetchController, identity::IdentityFactory,
        identity_pool::IdentityPool, payload_parser::PayloadParser, traits::UnitFetcher,
    },
    infrastructure::checkpoint::{CheckpointEntry, CheckpointStore, CheckpointUnits},
    utils::{date_code::date_code, errors::HarvestError, retry_policy::RetryPolicy},
    workers::WorkerManager,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// 一次运行的参数
#[derive(Debug, Clone)]
pub struct HarvestOptions {
    pub mode: HarvestMode,
    pub ranked_cutoff: usize,
    pub hit_type: String,
    pub worker_count: usize,
    pub leaderboard_size: usize,
    pub policy: RetryPolicy,
    pub utc_offset_minutes: i32,
    /// `None` 表示禁用检查点
    pub checkpoint: Option<CheckpointOptions>,
    pub publish_top_n: usize,
    pub publish_max_chars: usize,
}

/// 检查点写入节奏
#[derive(Debug, Clone, Copy)]
pub struct CheckpointOptions {
    pub interval: usize,
    pub error_threshold: u64,
}

impl HarvestOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            mode: settings.harvest.mode,
            ranked_cutoff: settings.harvest.ranked_cutoff,
            hit_type: settings.source.hit_type.clone(),
            worker_count: settings.harvest.worker_count,
            leaderboard_size: settings.harvest.leaderboard_size,
            policy: settings.retry_policy(),
            utc_offset_minutes: settings.storage.utc_offset_minutes,
            checkpoint: settings.checkpoint.enabled.then_some(CheckpointOptions {
                interval: settings.checkpoint.interval,
                error_threshold: settings.checkpoint.error_threshold,
            }),
            publish_top_n: settings.publish.top_n,
            publish_max_chars: settings.publish.max_chars,
        }
    }
}

/// 抓取用例
///
/// 加载工作单元、恢复检查点、在工作器池上抓取剩余单元、按完成顺序聚合、
/// 持久化产出文件并按需发布摘要。
pub struct HarvestUseCase {
    source: Arc<dyn WorkUnitSource>,
    fetcher: Arc<dyn UnitFetcher>,
    identities: IdentityFactory,
    sink: Arc<dyn ResultSink>,
    storage: Arc<dyn StorageRepository>,
    publisher: Option<Arc<dyn Publisher>>,
    options: HarvestOptions,
    date_override: Option<String>,
}

impl HarvestUseCase {
    pub fn new(
        source: Arc<dyn WorkUnitSource>,
        fetcher: Arc<dyn UnitFetcher>,
        identities: IdentityFactory,
        sink: Arc<dyn ResultSink>,
        storage: Arc<dyn StorageRepository>,
        options: HarvestOptions,
    ) -> Self {
        Self {
            source,
            fetcher,
            identities,
            sink,
            storage,
            publisher: None,
            options,
            date_override: None,
        }
    }

    pub fn with_publisher(mut self, publisher: Arc<dyn Publisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    /// 固定日期代码，而不是取当前时间
    pub fn with_date_code(mut self, date: impl Into<String>) -> Self {
        self.date_override = Some(date.into());
        self
    }

    /// 执行一次完整的抓取运行
    ///
    /// # 返回值
    ///
    /// * `Ok(RunReport)` - 排行榜、各单元负载与失败记录
    /// * `Err(HarvestError)` - 单元加载或产出文件写入失败
    #[instrument(skip(self), fields(mode = %self.options.mode))]
    pub async fn execute(&self) -> Result<RunReport, HarvestError> {
        let units = self.source.load().await?;
        let date = self
            .date_override
            .clone()
            .unwrap_or_else(|| date_code(Utc::now(), self.options.utc_offset_minutes));
        info!("Harvest run {} starting with {} units", date, units.len());

        let checkpoint = self
            .options
            .checkpoint
            .map(|opts| (CheckpointStore::new(self.storage.clone(), date.clone()), opts));
        let restored = match &checkpoint {
            Some((store, _)) => store.restore().await,
            None => CheckpointUnits::new(),
        };

        let mut aggregator = Aggregator::new(self.options.ranked_cutoff);
        let (mut checkpointed, pending) = self.partition(&units, restored, &mut aggregator);
        let resumed_units = checkpointed.len();
        if resumed_units > 0 {
            info!("Resuming: {} units restored, {} pending", resumed_units, pending.len());
        }

        let failures = Arc::new(FailureLog::new());
        let controller = Arc::new(FetchController::new(
            self.fetcher.clone(),
            Arc::new(IdentityPool::new(self.identities.clone())),
            PayloadParser::new(
                self.options.mode,
                self.options.ranked_cutoff,
                self.options.hit_type.clone(),
            ),
            self.options.policy.clone(),
            failures.clone(),
            date.clone(),
        ));

        let mut manager = WorkerManager::new(controller, self.options.worker_count);
        let mut results = manager.dispatch(pending);

        let mut since_flush = 0usize;
        let mut threshold_flushed = false;
        while let Some(result) = results.recv().await {
            aggregator.fold(&result);

            let Some((store, opts)) = &checkpoint else {
                continue;
            };
            if let Some(payload) = result.payload() {
                checkpointed.insert(
                    result.sequence,
                    CheckpointEntry::new(result.unit.id.clone(), payload.clone()),
                );
                since_flush += 1;
                if since_flush >= opts.interval {
                    flush(store, &checkpointed).await;
                    since_flush = 0;
                }
            } else if !threshold_flushed && failures.error_count() >= opts.error_threshold {
                warn!(
                    "Error count reached {}, saving progress to {}",
                    failures.error_count(),
                    store.key()
                );
                flush(store, &checkpointed).await;
                threshold_flushed = true;
            }
        }
        manager.join().await;

        if aggregator.folded_count() != units.len() {
            warn!(
                "Folded {} results for {} units",
                aggregator.folded_count(),
                units.len()
            );
        }

        let report = RunReport {
            date: date.clone(),
            total_units: units.len(),
            harvested_units: aggregator.harvested_count(),
            resumed_units,
            rankings: aggregator.rankings().clone(),
            leaderboard: aggregator.leaderboard(self.options.leaderboard_size),
            failures: failures.snapshot(),
        };

        let paths = self.sink.persist(&report).await?;
        info!(
            harvested = report.harvested_units,
            failed = report.failures.len(),
            "Harvest run {} finished, rankings at {}",
            date,
            paths.rankings
        );

        if let Some((store, _)) = &checkpoint {
            if report.failures.is_empty() {
                if let Err(e) = store.clear().await {
                    warn!("Failed to remove checkpoint {}: {}", store.key(), e);
                }
            } else {
                flush(store, &checkpointed).await;
            }
        }

        self.publish(&report).await;
        Ok(report)
    }

    /// 把单元分成已由检查点覆盖的和待抓取的两部分，前者直接折叠
    ///
    /// 检查点条目按序号匹配，且代码与模式都一致时才视为已完成，
    /// 每个条目至多覆盖一个工作单元。
    fn partition(
        &self,
        units: &[WorkUnit],
        mut restored: CheckpointUnits,
        aggregator: &mut Aggregator,
    ) -> (CheckpointUnits, Vec<(usize, WorkUnit)>) {
        let mut resumed = CheckpointUnits::new();
        let mut pending = Vec::new();

        for (sequence, unit) in units.iter().enumerate() {
            match restored.remove(&sequence) {
                Some(entry)
                    if entry.unit_id == unit.id && entry.payload.mode() == self.options.mode =>
                {
                    aggregator.fold(&UnitResult::harvested(
                        sequence,
                        unit.clone(),
                        entry.payload.clone(),
                    ));
                    resumed.insert(sequence, entry);
                }
                _ => pending.push((sequence, unit.clone())),
            }
        }

        if !restored.is_empty() {
            warn!("Dropped {} checkpoint entries with no matching unit", restored.len());
        }

        (resumed, pending)
    }

    async fn publish(&self, report: &RunReport) {
        let Some(publisher) = &self.publisher else {
            return;
        };

        let message = compose_summary(
            &report.leaderboard,
            &report.date,
            self.options.publish_top_n,
            self.options.publish_max_chars,
        );
        if let Err(e) = publisher.publish(&message).await {
            warn!("Failed to publish summary: {}", e);
        }
    }
}

async fn flush(store: &CheckpointStore, units: &CheckpointUnits) {
    if let Err(e) = store.save(units).await {
        warn!("Failed to write checkpoint {}: {}", store.key(), e);
    }
}
