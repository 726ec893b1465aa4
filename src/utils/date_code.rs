// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset, Offset, Utc};

/// 生成运行日期代码（`DDMMYYYY`）
///
/// 日期按配置的UTC偏移（分钟）计算；偏移量非法时回退到UTC。
pub fn date_code(now: DateTime<Utc>, utc_offset_minutes: i32) -> String {
    let offset = FixedOffset::east_opt(utc_offset_minutes.saturating_mul(60)).unwrap_or(Utc.fix());
    now.with_timezone(&offset).format("%d%m%Y").to_string()
}
