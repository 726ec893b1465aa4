// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::models::leaderboard::Leaderboard;

/// 发布错误类型
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("Publish rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("Invalid publisher configuration: {0}")]
    InvalidConfig(String),
}

/// 发布服务特质
///
/// 把排行榜摘要提交到外部消息接口
#[async_trait]
pub trait Publisher: Send + Sync {
    /// 发布一条消息
    ///
    /// # 参数
    ///
    /// * `message` - 已按长度上限截断的消息正文
    async fn publish(&self, message: &str) -> Result<(), PublishError>;
}

/// 生成长度受限的排行榜摘要
///
/// 标题行之后逐行追加 `"{名次}. {标题} ({分数} pts, {单元数} regions)"`，
/// 只追加完整的行；下一行会超出 `max_chars` 字符时停止。
/// 标题行本身超长时截断并以省略号结尾。
pub fn compose_summary(
    leaderboard: &Leaderboard,
    date: &str,
    top_n: usize,
    max_chars: usize,
) -> String {
    let header = format!("Top trending titles for {}", date);
    let mut message = truncate_chars(&header, max_chars);
    let mut used = message.chars().count();

    for entry in leaderboard.iter().take(top_n) {
        let line = format!(
            "\n{}. {} ({} pts, {} regions)",
            entry.position, entry.title, entry.points, entry.unit_count
        );
        let len = line.chars().count();
        if used + len > max_chars {
            break;
        }
        message.push_str(&line);
        used += len;
    }

    message
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }
    let mut truncated: String = text.chars().take(max_chars - 1).collect();
    truncated.push('…');
    truncated
}
