// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// 领域层抽象接口的具体实现：
/// - 存储（storage）：本地文件系统与内存键值存储
/// - 结果输出（result_sink）：排行榜与失败记录文件
/// - 检查点（checkpoint）：中断运行的恢复点
/// - 工作单元加载（work_unit_loader）：JSON单元列表
/// - 服务（services）：Webhook摘要发布
/// - 可观测性（observability）：Prometheus指标
pub mod checkpoint;
pub mod observability;
pub mod result_sink;
pub mod services;
pub mod storage;
pub mod work_unit_loader;
