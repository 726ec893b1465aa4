// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use thiserror::Error;

use crate::domain::repositories::storage_repository::StorageError;
use crate::domain::repositories::work_unit_source::SourceError;

/// 运行级错误类型
///
/// 单个工作单元的失败永远不会以此类型出现，它们会被降级为失败记录；
/// 这里只收纳协作方（配置、工作单元来源、存储）导致整个运行无法继续的错误。
#[derive(Error, Debug)]
pub enum HarvestError {
    #[error("配置错误: {0}")]
    Config(#[from] config::ConfigError),

    #[error("配置校验失败: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("工作单元来源错误: {0}")]
    Source(#[from] SourceError),

    #[error("存储错误: {0}")]
    Storage(#[from] StorageError),

    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("内部错误: {0}")]
    InternalError(String),
}

/// Worker错误类型
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("结果通道已关闭: {0}")]
    ChannelClosed(String),

    #[error("内部错误: {0}")]
    InternalError(String),
}
