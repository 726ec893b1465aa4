// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::engines::traits::EngineError;

/// 身份指纹目录
///
/// 每个新身份从中随机选取一个声明的客户端签名，使不同工作器、
/// 以及同一工作器的前后两次重置之间的指纹互不相同。
pub const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.0.0",
    "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.6099.210 Mobile Safari/537.36",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_2 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Mobile/15E148 Safari/604.1",
];

/// 模拟客户端身份
///
/// 一个声明的客户端签名加上带 Cookie 存储的 HTTP 客户端。
/// 同一时间只由一个工作器槽位持有。
#[derive(Debug)]
pub struct Identity {
    id: Uuid,
    user_agent: &'static str,
    client: reqwest::Client,
    requests: AtomicU64,
}

impl Identity {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_agent(&self) -> &'static str {
        self.user_agent
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// 记录一次经由该身份发出的请求
    pub fn record_request(&self) -> u64 {
        self.requests.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn request_count(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    /// 预热请求
    ///
    /// 访问服务入口以积累会话状态（Cookie 等），返回状态码。
    pub async fn warm_up(&self, url: &str) -> Result<u16, EngineError> {
        self.record_request();
        let response = self.client.get(url).send().await?;
        Ok(response.status().as_u16())
    }
}

/// 身份工厂
///
/// 持有所有身份共享的请求头、超时和预热入口。
#[derive(Debug, Clone)]
pub struct IdentityFactory {
    default_headers: HeaderMap,
    request_timeout: Duration,
    warm_up_url: Option<String>,
}

impl IdentityFactory {
    pub fn new(request_timeout: Duration) -> Self {
        Self {
            default_headers: HeaderMap::new(),
            request_timeout,
            warm_up_url: None,
        }
    }

    /// 添加默认请求头，非法的名称或值会被忽略
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(k), Ok(v)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.default_headers.insert(k, v);
        } else {
            warn!("Ignoring invalid default header {}", name);
        }
        self
    }

    /// 设置预热入口，`None` 表示新身份不做预热
    pub fn with_warm_up(mut self, url: Option<String>) -> Self {
        self.warm_up_url = url;
        self
    }

    /// 创建一个新身份
    ///
    /// 预热失败只记录日志，身份仍然可用。
    pub async fn create(&self) -> Result<Identity, EngineError> {
        let user_agent = USER_AGENTS[rand::random_range(0..USER_AGENTS.len())];

        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .default_headers(self.default_headers.clone())
            .timeout(self.request_timeout)
            .cookie_store(true)
            .build()
            .map_err(|e| EngineError::ClientBuild(e.to_string()))?;

        let identity = Identity {
            id: Uuid::new_v4(),
            user_agent,
            client,
            requests: AtomicU64::new(0),
        };

        if let Some(url) = &self.warm_up_url {
            match identity.warm_up(url).await {
                Ok(status) => debug!(identity = %identity.id, status, "Identity warmed up"),
                Err(e) => warn!(identity = %identity.id, "Warm-up request failed: {}", e),
            }
        }

        Ok(identity)
    }
}
