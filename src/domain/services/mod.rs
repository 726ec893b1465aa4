// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 包含的服务：
/// - 聚合服务（aggregation_service）：把单元结果折叠为全局得分与排行榜
/// - 失败日志（failure_log）：工作器共享的只追加失败记录
/// - 发布服务（publish_service）：排行榜摘要生成与外部发布接口
pub mod aggregation_service;
pub mod failure_log;
pub mod publish_service;
