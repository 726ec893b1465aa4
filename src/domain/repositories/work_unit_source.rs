// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::models::work_unit::WorkUnit;

/// 工作单元来源错误
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid unit list: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid unit at index {index}: {reason}")]
    InvalidUnit { index: usize, reason: String },
}

/// 工作单元来源特质
///
/// 在调度开始前一次性加载有序的工作单元序列，核心只读不写。
#[async_trait]
pub trait WorkUnitSource: Send + Sync {
    async fn load(&self) -> Result<Vec<WorkUnit>, SourceError>;
}
