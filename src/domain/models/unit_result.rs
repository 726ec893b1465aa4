// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::work_unit::WorkUnit;

/// 抓取模式
///
/// 决定远端响应如何解析，以及解析结果如何折算成分数。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HarvestMode {
    /// 排名列表模式：按名次计分
    #[default]
    Ranked,
    /// 销量模式：按售出数量计分
    Volume,
}

impl fmt::Display for HarvestMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            HarvestMode::Ranked => write!(f, "ranked"),
            HarvestMode::Volume => write!(f, "volume"),
        }
    }
}

/// 销量条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeEntry {
    pub title: String,
    pub units: u64,
}

impl VolumeEntry {
    pub fn new(title: impl Into<String>, units: u64) -> Self {
        Self {
            title: title.into(),
            units,
        }
    }
}

/// 单个工作单元的抓取负载
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "entries", rename_all = "snake_case")]
pub enum UnitPayload {
    /// 已去重、按名次排列的标题
    Ranked(Vec<String>),
    /// 标题及其售出数量
    Volume(Vec<VolumeEntry>),
}

impl UnitPayload {
    pub fn mode(&self) -> HarvestMode {
        match self {
            UnitPayload::Ranked(_) => HarvestMode::Ranked,
            UnitPayload::Volume(_) => HarvestMode::Volume,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            UnitPayload::Ranked(titles) => titles.len(),
            UnitPayload::Volume(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 失败记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    /// 工作单元标识符
    pub unit_id: String,
    /// 工作单元标签
    pub label: String,
    /// 最后一次失败的描述
    pub error: String,
}

impl FailureRecord {
    pub fn for_unit(unit: &WorkUnit, error: impl fmt::Display) -> Self {
        Self {
            unit_id: unit.id.clone(),
            label: unit.label.clone(),
            error: error.to_string(),
        }
    }
}

/// 工作单元结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitOutcome {
    Harvested(UnitPayload),
    Failed(FailureRecord),
}

/// 单个工作单元的最终结果
///
/// 每个提交的工作单元恰好产生一个结果。`sequence` 是工作单元在提交序列中的位置，
/// 聚合时用它确定并列名次的先后，使结果与完成顺序无关。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitResult {
    pub sequence: usize,
    pub unit: WorkUnit,
    pub outcome: UnitOutcome,
}

impl UnitResult {
    pub fn harvested(sequence: usize, unit: WorkUnit, payload: UnitPayload) -> Self {
        Self {
            sequence,
            unit,
            outcome: UnitOutcome::Harvested(payload),
        }
    }

    pub fn failed(sequence: usize, unit: WorkUnit, record: FailureRecord) -> Self {
        Self {
            sequence,
            unit,
            outcome: UnitOutcome::Failed(record),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, UnitOutcome::Harvested(_))
    }

    pub fn payload(&self) -> Option<&UnitPayload> {
        match &self.outcome {
            UnitOutcome::Harvested(payload) => Some(payload),
            UnitOutcome::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&FailureRecord> {
        match &self.outcome {
            UnitOutcome::Harvested(_) => None,
            UnitOutcome::Failed(record) => Some(record),
        }
    }
}
