// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{info, warn};
use url::Url;

use crate::domain::models::work_unit::WorkUnit;
use crate::domain::repositories::work_unit_source::{SourceError, WorkUnitSource};

/// 单元描述，兼容旧版地区列表格式
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UnitDescriptor {
    Current {
        id: String,
        label: String,
        #[serde(default)]
        endpoint_template: Option<String>,
    },
    Legacy {
        #[serde(rename = "RegionCode")]
        region_code: String,
        #[serde(rename = "RegionName")]
        region_name: String,
    },
}

/// 从JSON数组文件加载工作单元
pub struct JsonFileUnitSource {
    path: PathBuf,
    default_template: String,
}

impl JsonFileUnitSource {
    /// 创建加载器
    ///
    /// # 参数
    ///
    /// * `path` - JSON文件路径
    /// * `default_template` - 单元未声明模板时使用的端点模板
    pub fn new(path: impl Into<PathBuf>, default_template: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            default_template: default_template.into(),
        }
    }

    /// 解析并校验单元列表
    pub fn parse(&self, raw: &str) -> Result<Vec<WorkUnit>, SourceError> {
        let descriptors: Vec<UnitDescriptor> = serde_json::from_str(raw)?;
        let mut seen = HashSet::new();
        let mut units = Vec::with_capacity(descriptors.len());

        for (index, descriptor) in descriptors.into_iter().enumerate() {
            let (id, label, template) = match descriptor {
                UnitDescriptor::Current {
                    id,
                    label,
                    endpoint_template,
                } => (id, label, endpoint_template),
                UnitDescriptor::Legacy {
                    region_code,
                    region_name,
                } => (region_code, region_name, None),
            };

            let id = id.trim().to_string();
            if id.is_empty() {
                return Err(SourceError::InvalidUnit {
                    index,
                    reason: "empty id".to_string(),
                });
            }

            let label = if label.trim().is_empty() {
                id.clone()
            } else {
                label.trim().to_string()
            };
            let template = template.unwrap_or_else(|| self.default_template.clone());
            let unit = WorkUnit::new(id, label, template);

            // Probe with a placeholder date so volume templates validate too
            let endpoint = unit.endpoint("01012000");
            Url::parse(&endpoint).map_err(|e| SourceError::InvalidUnit {
                index,
                reason: format!("invalid endpoint {}: {}", endpoint, e),
            })?;

            if !seen.insert(unit.id.clone()) {
                warn!("Duplicate unit id {} at index {}", unit.id, index);
            }
            units.push(unit);
        }

        Ok(units)
    }
}

#[async_trait]
impl WorkUnitSource for JsonFileUnitSource {
    async fn load(&self) -> Result<Vec<WorkUnit>, SourceError> {
        let raw = tokio::fs::read_to_string(&self.path).await?;
        let units = self.parse(&raw)?;
        info!("Loaded {} work units from {}", units.len(), self.path.display());
        Ok(units)
    }
}
