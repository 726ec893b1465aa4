// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 响应负载解析
//!
//! 排名列表模式的响应形如 `{"hits": [{"TYPE": "MT", "TITLE": "..."}, ...]}`，
//! 远端已按热度排序；销量模式的响应形如
//! `{"shows": [{"title": "...", "seats_sold": 37}, ...]}`。
//! 结构合法但没有可用条目的响应解析为空负载，而不是错误。

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use thiserror::Error;

use crate::domain::models::unit_result::{HarvestMode, UnitPayload, VolumeEntry};
use crate::utils::text_processing::normalize_title;

/// 解析错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// 响应体根本不是JSON（通常是拦截页面）
    #[error("Response body is not structured JSON")]
    NotStructured,
    /// JSON结构与预期不符
    #[error("Malformed payload: {0}")]
    Malformed(String),
}

#[derive(Debug, Deserialize)]
struct RankedResponse {
    #[serde(default)]
    hits: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct VolumeResponse {
    #[serde(default)]
    shows: Vec<Value>,
}

/// 负载解析器
#[derive(Debug, Clone)]
pub struct PayloadParser {
    mode: HarvestMode,
    cutoff: usize,
    hit_type: String,
}

impl PayloadParser {
    /// 创建解析器
    ///
    /// # 参数
    ///
    /// * `mode` - 抓取模式
    /// * `cutoff` - 排名列表保留的名次数 K
    /// * `hit_type` - 排名列表中参与排名的条目类型（例如 `MT`）
    pub fn new(mode: HarvestMode, cutoff: usize, hit_type: impl Into<String>) -> Self {
        Self {
            mode,
            cutoff,
            hit_type: hit_type.into(),
        }
    }

    pub fn mode(&self) -> HarvestMode {
        self.mode
    }

    /// 解析响应体
    pub fn parse(&self, body: &str) -> Result<UnitPayload, ParseError> {
        let value: Value = serde_json::from_str(body).map_err(|_| ParseError::NotStructured)?;

        match self.mode {
            HarvestMode::Ranked => self.parse_ranked(value),
            HarvestMode::Volume => self.parse_volume(value),
        }
    }

    fn parse_ranked(&self, value: Value) -> Result<UnitPayload, ParseError> {
        let response: RankedResponse =
            serde_json::from_value(value).map_err(|e| ParseError::Malformed(e.to_string()))?;

        let mut seen = HashSet::new();
        let titles = response
            .hits
            .iter()
            .filter(|hit| hit.get("TYPE").and_then(Value::as_str) == Some(self.hit_type.as_str()))
            .filter_map(|hit| hit.get("TITLE").and_then(Value::as_str))
            .map(normalize_title)
            .filter(|title| !title.is_empty() && seen.insert(title.clone()))
            .take(self.cutoff)
            .collect();

        Ok(UnitPayload::Ranked(titles))
    }

    fn parse_volume(&self, value: Value) -> Result<UnitPayload, ParseError> {
        let response: VolumeResponse =
            serde_json::from_value(value).map_err(|e| ParseError::Malformed(e.to_string()))?;

        let entries = response
            .shows
            .iter()
            .filter_map(|show| {
                let title = show.get("title").and_then(Value::as_str)?;
                let units = show
                    .get("seats_sold")
                    .or_else(|| show.get("sold"))
                    .and_then(Value::as_u64)?;
                let title = normalize_title(title);
                (!title.is_empty()).then(|| VolumeEntry::new(title, units))
            })
            .collect();

        Ok(UnitPayload::Volume(entries))
    }
}
