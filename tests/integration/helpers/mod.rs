// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

use trendrs::application::use_cases::harvest_use_case::{CheckpointOptions, HarvestOptions};
use trendrs::domain::models::unit_result::HarvestMode;
use trendrs::domain::models::work_unit::WorkUnit;
use trendrs::domain::repositories::storage_repository::{StorageError, StorageRepository};
use trendrs::domain::repositories::work_unit_source::{SourceError, WorkUnitSource};
use trendrs::domain::services::publish_service::{PublishError, Publisher};
use trendrs::engines::identity::Identity;
use trendrs::engines::traits::{EngineError, RawResponse, UnitFetcher};
use trendrs::infrastructure::storage::InMemoryStorage;
use trendrs::utils::retry_policy::RetryPolicy;

pub const STUB_TEMPLATE: &str = "http://stub.local/search?r={id}";

/// 构造排名列表响应体
pub fn ranked_body(titles: &[&str]) -> String {
    let hits: Vec<serde_json::Value> = titles
        .iter()
        .map(|title| serde_json::json!({"TYPE": "MT", "TITLE": title}))
        .collect();
    serde_json::json!({ "hits": hits }).to_string()
}

/// 工作单元标签由代码派生，便于断言
pub fn label_for(id: &str) -> String {
    format!("{} City", id)
}

pub fn units(ids: &[&str], template: &str) -> Vec<WorkUnit> {
    ids.iter()
        .map(|id| WorkUnit::new(*id, label_for(id), template))
        .collect()
}

pub fn options(worker_count: usize, ranked_cutoff: usize) -> HarvestOptions {
    HarvestOptions {
        mode: HarvestMode::Ranked,
        ranked_cutoff,
        hit_type: "MT".to_string(),
        worker_count,
        leaderboard_size: 20,
        policy: RetryPolicy::immediate(3),
        utc_offset_minutes: 330,
        checkpoint: None,
        publish_top_n: 5,
        publish_max_chars: 280,
    }
}

pub fn with_checkpoint(options: HarvestOptions, interval: usize) -> HarvestOptions {
    with_checkpoint_threshold(options, interval, 20)
}

pub fn with_checkpoint_threshold(
    mut options: HarvestOptions,
    interval: usize,
    error_threshold: u64,
) -> HarvestOptions {
    options.checkpoint = Some(CheckpointOptions {
        interval,
        error_threshold,
    });
    options
}

/// 固定的工作单元来源
pub struct StaticUnitSource(pub Vec<WorkUnit>);

#[async_trait]
impl WorkUnitSource for StaticUnitSource {
    async fn load(&self) -> Result<Vec<WorkUnit>, SourceError> {
        Ok(self.0.clone())
    }
}

/// 桩抓取器对单个单元的行为
#[derive(Debug, Clone)]
pub enum Behaviour {
    Json(String),
    Status(u16),
    Panic,
}

/// 按单元代码（`r=` 查询参数）返回预设行为，并统计调用次数
#[derive(Default)]
pub struct StubFetcher {
    behaviours: HashMap<String, Behaviour>,
    calls: Mutex<HashMap<String, usize>>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, id: &str, behaviour: Behaviour) -> Self {
        self.behaviours.insert(id.to_string(), behaviour);
        self
    }

    pub fn calls(&self, id: &str) -> usize {
        self.calls.lock().get(id).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().values().sum()
    }
}

#[async_trait]
impl UnitFetcher for StubFetcher {
    async fn fetch(&self, url: &str, _identity: &Identity) -> Result<RawResponse, EngineError> {
        let id = url.rsplit("r=").next().unwrap_or_default().to_string();
        *self.calls.lock().entry(id.clone()).or_insert(0) += 1;

        let behaviour = self
            .behaviours
            .get(&id)
            .cloned()
            .unwrap_or_else(|| Behaviour::Json(ranked_body(&[])));

        let (status_code, content) = match behaviour {
            Behaviour::Json(body) => (200, body),
            Behaviour::Status(code) => (code, String::new()),
            Behaviour::Panic => panic!("stub fetcher exploded on {}", id),
        };

        Ok(RawResponse {
            status_code,
            content,
            content_type: "application/json".to_string(),
            response_time_ms: 0,
        })
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

/// 记录已发布消息的发布器
#[derive(Default)]
pub struct RecordingPublisher {
    pub messages: Mutex<Vec<String>>,
    pub fail: bool,
}

#[async_trait]
impl Publisher for RecordingPublisher {
    async fn publish(&self, message: &str) -> Result<(), PublishError> {
        self.messages.lock().push(message.to_string());
        if self.fail {
            return Err(PublishError::Rejected {
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        Ok(())
    }
}

/// 记录写入顺序的存储
///
/// 检查点写入记为 `checkpoint:{条目数}`，其余写入记为键名。
#[derive(Default)]
pub struct RecordingStorage {
    pub inner: InMemoryStorage,
    events: Mutex<Vec<String>>,
}

impl RecordingStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }

    /// 只看检查点写入时各自的条目数
    pub fn checkpoint_sizes(&self) -> Vec<usize> {
        self.events()
            .iter()
            .filter_map(|event| event.strip_prefix("checkpoint:"))
            .filter_map(|n| n.parse().ok())
            .collect()
    }
}

#[async_trait]
impl StorageRepository for RecordingStorage {
    async fn save(&self, key: &str, data: &[u8]) -> Result<(), StorageError> {
        let checkpoint = key
            .starts_with("checkpoints/")
            .then(|| serde_json::from_slice::<serde_json::Value>(data).ok())
            .flatten();
        let event = match checkpoint {
            Some(file) => format!(
                "checkpoint:{}",
                file["units"].as_object().map_or(0, |units| units.len())
            ),
            None => key.to_string(),
        };
        self.events.lock().push(event);
        self.inner.save(key, data).await
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        self.inner.get(key).await
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.inner.delete(key).await
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        self.inner.exists(key).await
    }
}
