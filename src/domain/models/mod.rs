// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了系统的核心业务实体，包括：
/// - 工作单元（work_unit）：一个地区或影院的抓取任务
/// - 单元结果（unit_result）：抓取负载或失败记录
/// - 排行榜（leaderboard）：累计得分与最终排名
pub mod leaderboard;
pub mod unit_result;
pub mod work_unit;
