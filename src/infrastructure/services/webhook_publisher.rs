// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;
use std::time::Duration;
use tracing::info;

use crate::domain::services::publish_service::{PublishError, Publisher};

type HmacSha256 = Hmac<Sha256>;

/// 签名请求头
pub const SIGNATURE_HEADER: &str = "X-Trendrs-Signature";

/// Webhook发布实现
///
/// 以JSON形式 POST `{"text": message}`，请求体使用HMAC-SHA256签名。
pub struct WebhookPublisher {
    /// HTTP 客户端
    client: reqwest::Client,
    /// 目标地址
    url: String,
    /// 签名密钥
    secret: String,
}

impl WebhookPublisher {
    /// 创建新的Webhook发布器
    pub fn new(url: impl Into<String>, secret: impl Into<String>) -> Result<Self, PublishError> {
        let url = url.into();
        if url.is_empty() {
            return Err(PublishError::InvalidConfig(
                "webhook_url is required when publishing is enabled".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            url,
            secret: secret.into(),
        })
    }

    /// 为请求体生成签名
    pub fn sign(&self, body: &[u8]) -> Result<String, PublishError> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|e| PublishError::InvalidConfig(e.to_string()))?;
        mac.update(body);
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}

#[async_trait]
impl Publisher for WebhookPublisher {
    async fn publish(&self, message: &str) -> Result<(), PublishError> {
        let body = serde_json::to_vec(&json!({ "text": message }))
            .map_err(|e| PublishError::InvalidConfig(e.to_string()))?;
        let signature = self.sign(&body)?;

        let response = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .header(SIGNATURE_HEADER, signature)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            info!("Summary published ({} chars)", message.chars().count());
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(PublishError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }
}
