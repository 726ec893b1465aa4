// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use parking_lot::Mutex;

use crate::domain::models::unit_result::FailureRecord;

#[derive(Debug, Default)]
struct FailureState {
    records: Vec<FailureRecord>,
    error_count: u64,
}

/// 失败日志
///
/// 所有工作器共享的只追加日志，也是整个运行中唯一由多个工作器并发写入的状态。
/// 每次追加都在互斥锁内完成，运行级错误计数与记录在同一把锁下更新。
#[derive(Debug, Default)]
pub struct FailureLog {
    state: Mutex<FailureState>,
}

impl FailureLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一条失败记录
    ///
    /// # 返回值
    ///
    /// 追加后的运行级错误计数
    pub fn record(&self, record: FailureRecord) -> u64 {
        let mut state = self.state.lock();
        state.records.push(record);
        state.error_count += 1;
        state.error_count
    }

    pub fn error_count(&self) -> u64 {
        self.state.lock().error_count
    }

    pub fn len(&self) -> usize {
        self.state.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 获取当前所有记录的副本
    pub fn snapshot(&self) -> Vec<FailureRecord> {
        self.state.lock().records.clone()
    }
}
