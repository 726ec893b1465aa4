// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含系统的核心业务逻辑，包括：
/// - 领域模型（models）：工作单元、单元结果和排行榜
/// - 仓库接口（repositories）：工作单元来源、存储与结果输出的抽象接口
/// - 服务（services）：聚合、失败日志与摘要发布
///
/// 领域层不依赖于任何外部实现。
pub mod models;
pub mod repositories;
pub mod services;
