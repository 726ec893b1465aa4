// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 标题规范化
//!
//! 远端列表中同一部作品经常带有年份、语言或版本后缀，
//! 例如 `Movie (2024)`、`Movie (Re-release)`，聚合前需要归一为同一个键。

use once_cell::sync::Lazy;
use regex::Regex;

static TRAILING_QUALIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\([^()]*\)\s*$").expect("valid qualifier pattern"));

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// 规范化作品标题
///
/// 反复去除末尾的括号限定语并压缩空白。结果是幂等的：
/// `normalize_title(normalize_title(t)) == normalize_title(t)`。
/// 如果去除后标题为空（整个标题就是括号内容），保留压缩空白后的原标题。
pub fn normalize_title(title: &str) -> String {
    let collapsed = WHITESPACE.replace_all(title.trim(), " ").into_owned();

    let mut current = collapsed.as_str();
    while let Some(m) = TRAILING_QUALIFIER.find(current) {
        let head = current[..m.start()].trim_end();
        if head.is_empty() {
            break;
        }
        current = head;
    }

    current.to_string()
}
