// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 工作器管理器测试模块
//!
//! 验证工作器数量的边界处理与空队列下通道的关闭

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use trendrs::domain::models::unit_result::HarvestMode;
use trendrs::domain::services::failure_log::FailureLog;
use trendrs::engines::fetch_controller::FetchController;
use trendrs::engines::identity::{Identity, IdentityFactory};
use trendrs::engines::identity_pool::IdentityPool;
use trendrs::engines::payload_parser::PayloadParser;
use trendrs::engines::traits::{EngineError, RawResponse, UnitFetcher};
use trendrs::utils::retry_policy::RetryPolicy;
use trendrs::workers::WorkerManager;

struct UnreachableFetcher;

#[async_trait]
impl UnitFetcher for UnreachableFetcher {
    async fn fetch(&self, _url: &str, _identity: &Identity) -> Result<RawResponse, EngineError> {
        Err(EngineError::Other("no units should be fetched".to_string()))
    }

    fn name(&self) -> &'static str {
        "unreachable"
    }
}

fn controller() -> Arc<FetchController> {
    Arc::new(FetchController::new(
        Arc::new(UnreachableFetcher),
        Arc::new(IdentityPool::new(IdentityFactory::new(Duration::from_secs(1)))),
        PayloadParser::new(HarvestMode::Ranked, 8, "MT"),
        RetryPolicy::immediate(1),
        Arc::new(FailureLog::new()),
        "01022024",
    ))
}

#[test]
fn test_worker_count_is_at_least_one() {
    assert_eq!(WorkerManager::new(controller(), 0).worker_count(), 1);
    assert_eq!(WorkerManager::new(controller(), 4).worker_count(), 4);
}

#[tokio::test]
async fn test_empty_dispatch_closes_channel() {
    let mut manager = WorkerManager::new(controller(), 4);
    let mut results = manager.dispatch(Vec::new());

    assert!(results.recv().await.is_none());
    assert_eq!(manager.join().await, 1);
}
