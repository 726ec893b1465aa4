// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 工作单元
///
/// 一个独立的抓取任务（地区或影院）。标识符代入端点模板中的 `{id}`，
/// 标签用于成员集合与产出文件。工作单元创建后不可变。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkUnit {
    /// 地区或影院代码
    pub id: String,
    /// 可读标签
    pub label: String,
    /// 端点模板，支持 `{id}` 和 `{date}` 占位符
    pub endpoint_template: String,
}

impl WorkUnit {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        endpoint_template: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            endpoint_template: endpoint_template.into(),
        }
    }

    /// 渲染目标端点
    ///
    /// # 参数
    ///
    /// * `date_code` - 运行日期代码，仅在模板包含 `{date}` 时使用
    pub fn endpoint(&self, date_code: &str) -> String {
        self.endpoint_template
            .replace("{id}", &self.id)
            .replace("{date}", date_code)
    }
}

impl fmt::Display for WorkUnit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({})", self.label, self.id)
    }
}
