// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use async_trait::async_trait;
use thiserror::Error;

use crate::engines::identity::Identity;

/// 引擎错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    /// 请求失败
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    /// 超时
    #[error("Timeout")]
    Timeout,
    /// 客户端构建失败
    #[error("Client build failed: {0}")]
    ClientBuild(String),
    /// 其他错误
    #[error("Other error: {0}")]
    Other(String),
}

impl EngineError {
    /// 判断错误是否可重试
    ///
    /// # 返回值
    ///
    /// 如果错误是可重试的则返回true，否则返回false
    pub fn is_retryable(&self) -> bool {
        match self {
            EngineError::RequestFailed(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.is_request()
                    || e.is_body()
                    || e.status().is_some_and(|s| s.is_server_error())
            }
            EngineError::Timeout => true,
            EngineError::ClientBuild(_) => true, // a fresh identity may build fine
            EngineError::Other(_) => false,
        }
    }
}

/// 原始响应
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP状态码
    pub status_code: u16,
    /// 响应内容
    pub content: String,
    /// 内容类型
    pub content_type: String,
    /// 响应时间（毫秒）
    pub response_time_ms: u64,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// 远端是否明确拒绝了当前身份（限流或拒绝访问）
    pub fn is_block_status(&self) -> bool {
        matches!(self.status_code, 403 | 429)
    }
}

/// 单元抓取特质
///
/// 通过给定身份对一个已渲染的端点执行一次网络请求。
/// 实现只负责传输，不做重试和分类，这些由抓取重试控制器负责。
#[async_trait]
pub trait UnitFetcher: Send + Sync {
    /// 执行一次抓取
    async fn fetch(&self, url: &str, identity: &Identity) -> Result<RawResponse, EngineError>;

    /// 抓取器名称
    fn name(&self) -> &'static str;
}
