// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use dashmap::DashMap;
use metrics::counter;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

use crate::engines::identity::{Identity, IdentityFactory};
use crate::engines::traits::EngineError;

/// 身份池
///
/// 按工作器槽位保存身份：每个槽位只会被一个工作器使用，
/// 因此身份从不在并发执行的工作器之间共享。
pub struct IdentityPool {
    factory: IdentityFactory,
    slots: DashMap<usize, Arc<Identity>>,
    created: AtomicU64,
    invalidated: AtomicU64,
}

impl IdentityPool {
    pub fn new(factory: IdentityFactory) -> Self {
        Self {
            factory,
            slots: DashMap::new(),
            created: AtomicU64::new(0),
            invalidated: AtomicU64::new(0),
        }
    }

    /// 获取槽位绑定的身份，首次调用时创建
    ///
    /// # 参数
    ///
    /// * `worker_key` - 工作器槽位
    pub async fn acquire(&self, worker_key: usize) -> Result<Arc<Identity>, EngineError> {
        if let Some(identity) = self.slots.get(&worker_key) {
            return Ok(identity.clone());
        }

        // The slot is only ever touched by its own worker, so no other task can
        // race this insert.
        let identity = Arc::new(self.factory.create().await?);
        self.created.fetch_add(1, Ordering::Relaxed);
        counter!("harvest_identities_created_total").increment(1);
        debug!(
            worker = worker_key,
            identity = %identity.id(),
            user_agent = identity.user_agent(),
            "Created identity"
        );

        self.slots.insert(worker_key, identity.clone());
        Ok(identity)
    }

    /// 丢弃槽位绑定的身份，下次 `acquire` 会创建新身份
    ///
    /// # 返回值
    ///
    /// 槽位原先是否绑定了身份
    pub fn invalidate(&self, worker_key: usize) -> bool {
        match self.slots.remove(&worker_key) {
            Some((_, identity)) => {
                self.invalidated.fetch_add(1, Ordering::Relaxed);
                info!(
                    worker = worker_key,
                    identity = %identity.id(),
                    requests = identity.request_count(),
                    "Invalidated identity"
                );
                true
            }
            None => false,
        }
    }

    pub fn created_count(&self) -> u64 {
        self.created.load(Ordering::Relaxed)
    }

    pub fn invalidation_count(&self) -> u64 {
        self.invalidated.load(Ordering::Relaxed)
    }

    pub fn active_count(&self) -> usize {
        self.slots.len()
    }
}
