// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::models::unit_result::UnitPayload;
use crate::domain::repositories::storage_repository::{StorageError, StorageRepository};

/// 检查点中的一条记录
///
/// 以提交序号为键保存，`unit_id` 用于确认序号仍指向同一个工作单元。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointEntry {
    pub unit_id: String,
    pub payload: UnitPayload,
}

impl CheckpointEntry {
    pub fn new(unit_id: impl Into<String>, payload: UnitPayload) -> Self {
        Self {
            unit_id: unit_id.into(),
            payload,
        }
    }
}

/// 序号 -> 已抓取负载
pub type CheckpointUnits = BTreeMap<usize, CheckpointEntry>;

#[derive(Debug, Default, Serialize, Deserialize)]
struct CheckpointFile {
    date: String,
    units: CheckpointUnits,
}

/// 检查点存储
///
/// 保存当日已成功抓取的单元负载（按提交序号索引），使中断的运行可以
/// 跳过这些单元继续执行。键为 `checkpoints/{date}.json`。
pub struct CheckpointStore {
    storage: Arc<dyn StorageRepository>,
    date: String,
}

impl CheckpointStore {
    pub fn new(storage: Arc<dyn StorageRepository>, date: impl Into<String>) -> Self {
        Self {
            storage,
            date: date.into(),
        }
    }

    pub fn key(&self) -> String {
        format!("checkpoints/{}.json", self.date)
    }

    /// 无法读取的检查点被移到这里
    pub fn quarantine_key(&self) -> String {
        format!("checkpoints/{}.corrupt.json", self.date)
    }

    /// 读取检查点，不存在时返回空集合
    pub async fn load(&self) -> Result<CheckpointUnits, StorageError> {
        let Some(raw) = self.storage.get(&self.key()).await? else {
            return Ok(BTreeMap::new());
        };

        let file: CheckpointFile = serde_json::from_slice(&raw)?;
        if file.date != self.date {
            return Err(StorageError::Other(format!(
                "Checkpoint {} belongs to {}",
                self.key(),
                file.date
            )));
        }

        info!("Restored {} units from {}", file.units.len(), self.key());
        Ok(file.units)
    }

    /// 读取检查点用于恢复
    ///
    /// 文件损坏或日期不符时记录警告、把原文件移到 `quarantine_key()`，
    /// 并从空集合开始，运行本身不受影响。
    pub async fn restore(&self) -> CheckpointUnits {
        match self.load().await {
            Ok(units) => units,
            Err(e) => {
                warn!("Ignoring unreadable checkpoint {}: {}", self.key(), e);
                if let Err(e) = self.quarantine().await {
                    warn!("Failed to move checkpoint {} aside: {}", self.key(), e);
                }
                BTreeMap::new()
            }
        }
    }

    async fn quarantine(&self) -> Result<(), StorageError> {
        if let Some(raw) = self.storage.get(&self.key()).await? {
            self.storage.save(&self.quarantine_key(), &raw).await?;
        }
        self.storage.delete(&self.key()).await
    }

    /// 覆盖写入检查点
    pub async fn save(&self, units: &CheckpointUnits) -> Result<(), StorageError> {
        #[derive(Serialize)]
        struct Borrowed<'a> {
            date: &'a str,
            units: &'a CheckpointUnits,
        }

        let body = serde_json::to_vec(&Borrowed {
            date: &self.date,
            units,
        })?;
        self.storage.save(&self.key(), &body).await?;
        debug!("Checkpoint flushed with {} units", units.len());
        Ok(())
    }

    /// 删除检查点
    pub async fn clear(&self) -> Result<(), StorageError> {
        self.storage.delete(&self.key()).await
    }
}
