// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

use crate::domain::models::leaderboard::LeaderboardEntry;
use crate::domain::models::unit_result::{FailureRecord, UnitPayload};
use crate::domain::repositories::result_sink::{ArtifactPaths, ResultSink, RunReport};
use crate::domain::repositories::storage_repository::{StorageError, StorageRepository};

#[derive(Serialize)]
struct RankingsArtifact<'a> {
    date: &'a str,
    total_units: usize,
    harvested_units: usize,
    rankings: &'a BTreeMap<String, UnitPayload>,
    leaderboard: &'a [LeaderboardEntry],
}

#[derive(Serialize)]
struct FailuresArtifact<'a> {
    date: &'a str,
    total_failures: usize,
    failures: &'a [FailureRecord],
}

/// 基于存储仓库的结果输出
///
/// 排行榜写入 `{data_dir}/{date}_Rankings.json`；仅在存在失败时
/// 写入 `{trash_dir}/failures_{date}.json`。
pub struct StorageResultSink {
    storage: Arc<dyn StorageRepository>,
    data_dir: String,
    trash_dir: String,
}

impl StorageResultSink {
    pub fn new(
        storage: Arc<dyn StorageRepository>,
        data_dir: impl Into<String>,
        trash_dir: impl Into<String>,
    ) -> Self {
        Self {
            storage,
            data_dir: data_dir.into(),
            trash_dir: trash_dir.into(),
        }
    }

    pub fn rankings_key(&self, date: &str) -> String {
        format!("{}/{}_Rankings.json", self.data_dir, date)
    }

    pub fn failures_key(&self, date: &str) -> String {
        format!("{}/failures_{}.json", self.trash_dir, date)
    }
}

#[async_trait]
impl ResultSink for StorageResultSink {
    async fn persist(&self, report: &RunReport) -> Result<ArtifactPaths, StorageError> {
        let rankings = RankingsArtifact {
            date: &report.date,
            total_units: report.total_units,
            harvested_units: report.harvested_units,
            rankings: &report.rankings,
            leaderboard: &report.leaderboard.entries,
        };
        let rankings_key = self.rankings_key(&report.date);
        self.storage
            .save(&rankings_key, &serde_json::to_vec_pretty(&rankings)?)
            .await?;
        info!("Rankings written to {}", rankings_key);

        let failures_key = if report.failures.is_empty() {
            None
        } else {
            let failures = FailuresArtifact {
                date: &report.date,
                total_failures: report.failures.len(),
                failures: &report.failures,
            };
            let key = self.failures_key(&report.date);
            self.storage
                .save(&key, &serde_json::to_vec_pretty(&failures)?)
                .await?;
            info!("{} failures written to {}", report.failures.len(), key);
            Some(key)
        };

        Ok(ArtifactPaths {
            rankings: rankings_key,
            failures: failures_key,
        })
    }
}
