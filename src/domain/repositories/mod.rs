// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库接口模块
///
/// 该模块定义了领域层的仓库接口，遵循依赖倒置原则。
/// 具体实现由基础设施层提供。
///
/// 包含的仓库接口：
/// - 结果输出（result_sink）：持久化排行榜与失败记录
/// - 存储仓库（storage_repository）：管理文件和对象的存储
/// - 工作单元来源（work_unit_source）：加载待抓取的工作单元
pub mod result_sink;
pub mod storage_repository;
pub mod work_unit_source;
