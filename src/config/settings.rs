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

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;
use validator::{Validate, ValidationError};

use crate::domain::models::unit_result::HarvestMode;
use crate::utils::errors::HarvestError;
use crate::utils::retry_policy::RetryPolicy;

/// 应用程序配置设置
///
/// 包含抓取、工作单元来源、存储、检查点、发布和指标等所有配置项
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Settings {
    /// 抓取配置
    #[validate(nested)]
    pub harvest: HarvestSettings,
    /// 工作单元来源配置
    #[validate(nested)]
    pub source: SourceSettings,
    /// 存储配置
    #[validate(nested)]
    pub storage: StorageSettings,
    /// 检查点配置
    #[validate(nested)]
    pub checkpoint: CheckpointSettings,
    /// 摘要发布配置
    #[validate(nested)]
    pub publish: PublishSettings,
    /// 指标配置
    pub metrics: MetricsSettings,
}

/// 抓取配置设置
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_pacing"))]
pub struct HarvestSettings {
    /// 工作器数量
    #[validate(range(min = 1, max = 64))]
    pub worker_count: usize,
    /// 每个单元的最大尝试次数
    #[validate(range(min = 1, max = 10))]
    pub retry_limit: u32,
    /// 单次请求超时（秒）
    #[validate(range(min = 1, max = 300))]
    pub request_timeout_secs: u64,
    /// 节流延迟下限（毫秒）
    pub pacing_min_ms: u64,
    /// 节流延迟上限（毫秒）
    pub pacing_max_ms: u64,
    /// 退避底数
    #[validate(range(min = 1.0, max = 10.0))]
    pub backoff_base: f64,
    /// 退避单位（毫秒）
    pub backoff_unit_ms: u64,
    /// 排名列表保留的名次数 K
    #[validate(range(min = 1, max = 100))]
    pub ranked_cutoff: usize,
    /// 排行榜长度 N
    #[validate(range(min = 1))]
    pub leaderboard_size: usize,
    /// 新身份是否先请求入口页
    pub warm_up: bool,
    /// 抓取模式
    pub mode: HarvestMode,
}

fn validate_pacing(harvest: &HarvestSettings) -> Result<(), ValidationError> {
    if harvest.pacing_min_ms > harvest.pacing_max_ms {
        return Err(ValidationError::new("pacing_range")
            .with_message("pacing_min_ms must not exceed pacing_max_ms".into()));
    }
    Ok(())
}

/// 工作单元来源配置设置
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SourceSettings {
    /// 单元列表文件路径
    #[validate(length(min = 1))]
    pub units_path: String,
    /// 默认端点模板，`{id}` 为单元代码，`{date}` 为日期代码
    #[validate(length(min = 1))]
    pub endpoint_template: String,
    /// 身份预热入口
    #[validate(url)]
    pub entry_point: String,
    /// 所有请求携带的 Origin
    pub origin: String,
    /// 排名列表中参与排名的条目类型
    #[validate(length(min = 1))]
    pub hit_type: String,
}

/// 存储配置设置
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StorageSettings {
    /// 存储类型 (local, memory)
    pub storage_type: String,
    /// 本地存储根目录
    pub local_path: String,
    /// 排行榜目录
    pub data_dir: String,
    /// 失败记录目录
    pub trash_dir: String,
    /// 日期代码使用的UTC偏移（分钟）
    #[validate(range(min = -1440, max = 1440))]
    pub utc_offset_minutes: i32,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            storage_type: "local".to_string(),
            local_path: ".".to_string(),
            data_dir: "Data".to_string(),
            trash_dir: "Trash".to_string(),
            utc_offset_minutes: 330,
        }
    }
}

/// 检查点配置设置
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CheckpointSettings {
    /// 是否启用检查点
    pub enabled: bool,
    /// 每成功多少个单元写一次检查点
    #[validate(range(min = 1))]
    pub interval: usize,
    /// 失败数达到该值时立即写检查点
    #[validate(range(min = 1))]
    pub error_threshold: u64,
}

/// 摘要发布配置设置
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PublishSettings {
    /// 是否发布摘要
    pub enabled: bool,
    /// Webhook地址
    pub webhook_url: String,
    /// Webhook签名密钥
    pub secret: String,
    /// 摘要包含的名次数
    #[validate(range(min = 1))]
    pub top_n: usize,
    /// 摘要最大字符数
    #[validate(range(min = 16))]
    pub max_chars: usize,
}

/// 指标配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    /// 是否启用Prometheus导出
    pub enabled: bool,
    /// 导出监听地址
    pub listen_addr: String,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次叠加默认值、`config/default`、`config/{APP_ENVIRONMENT}` 和
    /// `TRENDRS__` 前缀的环境变量，并校验结果
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(HarvestError)` - 配置加载或校验失败
    pub fn new() -> Result<Self, HarvestError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Self::defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("TRENDRS").separator("__"));

        Self::from_builder(builder)
    }

    /// 仅包含默认值的配置构建器
    pub fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            // Harvest
            .set_default("harvest.worker_count", 4)?
            .set_default("harvest.retry_limit", 3)?
            .set_default("harvest.request_timeout_secs", 15)?
            .set_default("harvest.pacing_min_ms", 500)?
            .set_default("harvest.pacing_max_ms", 1200)?
            .set_default("harvest.backoff_base", 2.0)?
            .set_default("harvest.backoff_unit_ms", 1000)?
            .set_default("harvest.ranked_cutoff", 8)?
            .set_default("harvest.leaderboard_size", 20)?
            .set_default("harvest.warm_up", true)?
            .set_default("harvest.mode", "ranked")?
            // Source
            .set_default("source.units_path", "config/units.json")?
            .set_default(
                "source.endpoint_template",
                "https://in.bookmyshow.com/quickbook-search.bms?r={id}",
            )?
            .set_default("source.entry_point", "https://in.bookmyshow.com/")?
            .set_default("source.origin", "https://in.bookmyshow.com")?
            .set_default("source.hit_type", "MT")?
            // Storage
            .set_default("storage.storage_type", "local")?
            .set_default("storage.local_path", ".")?
            .set_default("storage.data_dir", "Data")?
            .set_default("storage.trash_dir", "Trash")?
            .set_default("storage.utc_offset_minutes", 330)?
            // Checkpoint
            .set_default("checkpoint.enabled", true)?
            .set_default("checkpoint.interval", 10)?
            .set_default("checkpoint.error_threshold", 20)?
            // Publish
            .set_default("publish.enabled", false)?
            .set_default("publish.webhook_url", "")?
            .set_default("publish.secret", "")?
            .set_default("publish.top_n", 5)?
            .set_default("publish.max_chars", 280)?
            // Metrics
            .set_default("metrics.enabled", false)?
            .set_default("metrics.listen_addr", "0.0.0.0:9000")
    }

    /// 从构建器加载并校验配置
    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, HarvestError> {
        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// 抓取重试策略
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            retry_limit: self.harvest.retry_limit,
            backoff_base: self.harvest.backoff_base,
            backoff_unit: Duration::from_millis(self.harvest.backoff_unit_ms),
            pacing_min: Duration::from_millis(self.harvest.pacing_min_ms),
            pacing_max: Duration::from_millis(self.harvest.pacing_max_ms),
            request_timeout: Duration::from_secs(self.harvest.request_timeout_secs),
        }
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
