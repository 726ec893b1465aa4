// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工作器模块
///
/// 在固定大小的工作器池上执行抓取，并按完成顺序交付结果
pub mod harvest_worker;
pub mod manager;
pub mod worker;

pub use manager::WorkerManager;
pub use worker::Worker;
