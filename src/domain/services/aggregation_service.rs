// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

use crate::domain::models::leaderboard::{Leaderboard, ScoreEntry};
use crate::domain::models::unit_result::{UnitOutcome, UnitPayload, UnitResult};
use crate::utils::text_processing::normalize_title;

/// 聚合引擎
///
/// 只由消费调度结果流的单个任务调用，因此内部状态不加锁。
/// 折叠操作满足交换律与结合律（分数求和、成员集合求并、首次出现位置取最小），
/// 相同的结果集合以任意顺序折叠都会得到相同的排行榜。
#[derive(Debug)]
pub struct Aggregator {
    /// 排名列表模式的截断名次 K
    cutoff: usize,
    scores: HashMap<String, ScoreEntry>,
    rankings: BTreeMap<String, UnitPayload>,
    /// 每个标签当前负载所属的提交序号
    ranking_sequences: HashMap<String, usize>,
    harvested: usize,
    failed: usize,
}

impl Aggregator {
    /// 创建聚合引擎
    ///
    /// # 参数
    ///
    /// * `cutoff` - 排名列表模式下计分的名次数 K，第 r 名得 `(K+1) - r` 分
    pub fn new(cutoff: usize) -> Self {
        Self {
            cutoff,
            scores: HashMap::new(),
            rankings: BTreeMap::new(),
            ranking_sequences: HashMap::new(),
            harvested: 0,
            failed: 0,
        }
    }

    /// 折叠一个工作单元结果
    pub fn fold(&mut self, result: &UnitResult) {
        let payload = match &result.outcome {
            UnitOutcome::Harvested(payload) => payload,
            UnitOutcome::Failed(_) => {
                self.failed += 1;
                return;
            }
        };

        self.harvested += 1;
        let label = result.unit.label.as_str();

        match payload {
            UnitPayload::Ranked(titles) => {
                let mut seen = HashSet::new();
                let ranked = titles
                    .iter()
                    .map(|t| normalize_title(t))
                    .filter(|t| !t.is_empty() && seen.insert(t.clone()))
                    .take(self.cutoff);
                for (idx, title) in ranked.enumerate() {
                    let points = (self.cutoff - idx) as u64;
                    self.credit(title, points, label, (result.sequence, idx));
                }
            }
            UnitPayload::Volume(entries) => {
                for (idx, entry) in entries.iter().enumerate() {
                    let title = normalize_title(&entry.title);
                    if title.is_empty() {
                        continue;
                    }
                    self.credit(title, entry.units, label, (result.sequence, idx));
                }
            }
        }

        debug!(
            unit = %result.unit,
            entries = payload.len(),
            "Folded unit result"
        );
        self.record_ranking(label, result.sequence, payload);
    }

    /// 同一标签出现多次时保留序号最小的负载，与折叠顺序无关
    fn record_ranking(&mut self, label: &str, sequence: usize, payload: &UnitPayload) {
        let current = self
            .ranking_sequences
            .entry(label.to_string())
            .or_insert(sequence);
        if sequence <= *current {
            *current = sequence;
            self.rankings.insert(label.to_string(), payload.clone());
        }
    }

    fn credit(&mut self, title: String, points: u64, label: &str, seen_at: (usize, usize)) {
        self.scores
            .entry(title)
            .or_insert_with_key(|title| ScoreEntry::new(title.clone(), seen_at))
            .credit(points, label, seen_at);
    }

    /// 生成排行榜
    ///
    /// 按总分降序，同分按首次出现顺序，截断到 `top_n`。
    pub fn leaderboard(&self, top_n: usize) -> Leaderboard {
        Leaderboard::from_scores(self.scores.values(), top_n)
    }

    pub fn score(&self, title: &str) -> Option<&ScoreEntry> {
        self.scores.get(title)
    }

    /// 各单元的抓取负载，按标签索引
    pub fn rankings(&self) -> &BTreeMap<String, UnitPayload> {
        &self.rankings
    }

    pub fn harvested_count(&self) -> usize {
        self.harvested
    }

    pub fn failed_count(&self) -> usize {
        self.failed
    }

    pub fn folded_count(&self) -> usize {
        self.harvested + self.failed
    }
}

#[cfg(test)]
#[path = "aggregation_service_test.rs"]
mod tests;
