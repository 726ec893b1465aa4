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
use std::time::{Duration, Instant};

use crate::engines::identity::Identity;
use crate::engines::traits::{EngineError, RawResponse, UnitFetcher};

/// 抓取引擎
///
/// 基于reqwest实现的HTTP抓取器，请求经由身份自带的客户端发出，
/// 从而携带该身份的指纹和 Cookie。
pub struct ReqwestFetcher {
    timeout: Duration,
}

impl ReqwestFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl UnitFetcher for ReqwestFetcher {
    /// 执行HTTP抓取
    ///
    /// # 参数
    ///
    /// * `url` - 已渲染的端点
    /// * `identity` - 发出请求的身份
    ///
    /// # 返回值
    ///
    /// * `Ok(RawResponse)` - 任何状态码的响应
    /// * `Err(EngineError)` - 网络错误或超时
    async fn fetch(&self, url: &str, identity: &Identity) -> Result<RawResponse, EngineError> {
        identity.record_request();

        let start = Instant::now();
        let response = identity
            .client()
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    EngineError::Timeout
                } else {
                    EngineError::RequestFailed(e)
                }
            })?;

        let status_code = response.status().as_u16();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let content = response.text().await?;

        Ok(RawResponse {
            status_code,
            content,
            content_type,
            response_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// 获取抓取器名称
    fn name(&self) -> &'static str {
        "reqwest"
    }
}

#[cfg(test)]
#[path = "reqwest_engine_test.rs"]
mod tests;
