// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::models::leaderboard::Leaderboard;
use crate::domain::models::unit_result::{FailureRecord, UnitPayload};
use crate::domain::repositories::storage_repository::StorageError;

/// 一次运行的汇总
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// 运行日期代码（DDMMYYYY）
    pub date: String,
    /// 提交的工作单元总数
    pub total_units: usize,
    /// 成功抓取的单元数（含从检查点恢复的单元）
    pub harvested_units: usize,
    /// 从检查点恢复、本次未重新抓取的单元数
    pub resumed_units: usize,
    /// 各单元的抓取负载，按标签索引
    pub rankings: BTreeMap<String, UnitPayload>,
    pub leaderboard: Leaderboard,
    pub failures: Vec<FailureRecord>,
}

/// 产出文件位置
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub rankings: String,
    pub failures: Option<String>,
}

/// 结果输出特质
#[async_trait]
pub trait ResultSink: Send + Sync {
    /// 持久化运行汇总，返回写入的位置
    async fn persist(&self, report: &RunReport) -> Result<ArtifactPaths, StorageError>;
}
