// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::domain::models::unit_result::UnitResult;
use crate::domain::models::work_unit::WorkUnit;
use crate::engines::fetch_controller::FetchController;
use crate::utils::errors::WorkerError;
use crate::workers::harvest_worker::{HarvestWorker, WorkQueue};
use crate::workers::worker::Worker;

/// 工作管理器
///
/// 在固定大小的工作器池上调度工作单元。每个单元恰好被派发一次，
/// 结果按完成顺序通过通道交给唯一的消费方。
pub struct WorkerManager {
    controller: Arc<FetchController>,
    worker_count: usize,
    handles: Vec<JoinHandle<Result<(), WorkerError>>>,
}

impl WorkerManager {
    /// 创建工作管理器
    ///
    /// # 参数
    ///
    /// * `controller` - 共享的抓取重试控制器
    /// * `worker_count` - 工作器数量，至少为1
    pub fn new(controller: Arc<FetchController>, worker_count: usize) -> Self {
        Self {
            controller,
            worker_count: worker_count.max(1),
            handles: Vec::new(),
        }
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// 启动工作器并派发工作单元
    ///
    /// # 参数
    ///
    /// * `units` - (序列号, 工作单元) 列表
    ///
    /// # 返回值
    ///
    /// 结果通道的接收端；所有工作器耗尽队列后通道关闭
    pub fn dispatch(&mut self, units: Vec<(usize, WorkUnit)>) -> mpsc::UnboundedReceiver<UnitResult> {
        let (tx, rx) = mpsc::unbounded_channel();
        let total = units.len();
        let queue: WorkQueue = Arc::new(Mutex::new(units.into_iter().collect::<VecDeque<_>>()));

        // No point in spinning up idle slots
        let slots = self.worker_count.min(total.max(1));
        info!("Dispatching {} units over {} workers", total, slots);

        for slot in 0..slots {
            let worker = HarvestWorker::new(slot, self.controller.clone(), queue.clone(), tx.clone());
            let handle = tokio::spawn(async move {
                let result = worker.run().await;
                if let Err(e) = &result {
                    error!("{} stopped: {}", worker.name(), e);
                }
                result
            });
            self.handles.push(handle);
        }

        rx
    }

    /// 等待所有工作器退出
    ///
    /// # 返回值
    ///
    /// 正常退出的工作器数量
    pub async fn join(&mut self) -> usize {
        let mut finished = 0;
        for handle in self.handles.drain(..) {
            match handle.await {
                Ok(Ok(())) => finished += 1,
                Ok(Err(e)) => warn!("Worker exited with error: {}", e),
                Err(e) => error!("Worker task failed to join: {}", e),
            }
        }
        finished
    }
}
