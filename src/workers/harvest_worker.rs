// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use futures::FutureExt;
use metrics::counter;
use std::any::Any;
use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info};

use crate::domain::models::unit_result::{FailureRecord, UnitResult};
use crate::domain::models::work_unit::WorkUnit;
use crate::engines::fetch_controller::FetchController;
use crate::utils::errors::WorkerError;
use crate::workers::worker::Worker;

/// 共享工作队列，元素为 (序列号, 工作单元)
pub type WorkQueue = Arc<Mutex<VecDeque<(usize, WorkUnit)>>>;

/// 抓取工作器
///
/// 每个工作器占据一个固定槽位，一次处理一个工作单元，处理完成后再从
/// 共享队列中取下一个。槽位号同时是身份池中的键。
pub struct HarvestWorker {
    slot: usize,
    name: String,
    controller: Arc<FetchController>,
    queue: WorkQueue,
    results: mpsc::UnboundedSender<UnitResult>,
}

impl HarvestWorker {
    /// 创建新的抓取工作器
    ///
    /// # 参数
    ///
    /// * `slot` - 工作器槽位
    /// * `controller` - 共享的抓取重试控制器
    /// * `queue` - 共享工作队列
    /// * `results` - 结果通道的发送端
    pub fn new(
        slot: usize,
        controller: Arc<FetchController>,
        queue: WorkQueue,
        results: mpsc::UnboundedSender<UnitResult>,
    ) -> Self {
        Self {
            slot,
            name: format!("harvest-worker-{}", slot),
            controller,
            queue,
            results,
        }
    }

    async fn next_unit(&self) -> Option<(usize, WorkUnit)> {
        self.queue.lock().await.pop_front()
    }

    /// 处理单个工作单元，单元内部的panic被转换为失败结果
    async fn process(&self, sequence: usize, unit: WorkUnit) -> UnitResult {
        let harvest = self.controller.harvest(self.slot, sequence, unit.clone());

        match AssertUnwindSafe(harvest).catch_unwind().await {
            Ok(result) => result,
            Err(payload) => {
                let message = format!("Worker panicked: {}", panic_message(payload.as_ref()));
                error!(worker = %self.name, unit = %unit, "{}", message);

                // The controller never reached its own failure bookkeeping
                let record = FailureRecord::for_unit(&unit, &message);
                self.controller.failures().record(record.clone());
                counter!("harvest_units_total", "outcome" => "failed").increment(1);
                counter!("harvest_units_failed_total").increment(1);

                UnitResult::failed(sequence, unit, record)
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[async_trait]
impl Worker for HarvestWorker {
    async fn run(&self) -> Result<(), WorkerError> {
        info!("{} started", self.name);
        let mut processed = 0usize;

        while let Some((sequence, unit)) = self.next_unit().await {
            debug!(worker = %self.name, sequence, "Picked up {}", unit);
            let result = self.process(sequence, unit).await;
            processed += 1;

            self.results
                .send(result)
                .map_err(|_| WorkerError::ChannelClosed(self.name.clone()))?;
        }

        info!("{} drained the queue after {} units", self.name, processed);
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
