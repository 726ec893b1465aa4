// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// 单个标题的累计得分
///
/// `points` 在一次运行中只增不减；`units` 是贡献过该标题的工作单元标签集合，
/// 同一工作单元重复贡献不会重复计入。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreEntry {
    pub title: String,
    pub points: u64,
    pub units: BTreeSet<String>,
    /// 首次出现位置：（工作单元序号，单元内位置），取所有贡献中的最小值
    pub first_seen: (usize, usize),
}

impl ScoreEntry {
    pub fn new(title: impl Into<String>, first_seen: (usize, usize)) -> Self {
        Self {
            title: title.into(),
            points: 0,
            units: BTreeSet::new(),
            first_seen,
        }
    }

    /// 累加一次贡献
    pub fn credit(&mut self, points: u64, label: &str, seen_at: (usize, usize)) {
        self.points = self.points.saturating_add(points);
        if !self.units.contains(label) {
            self.units.insert(label.to_string());
        }
        if seen_at < self.first_seen {
            self.first_seen = seen_at;
        }
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }
}

/// 排行榜条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// 从1开始的名次
    pub position: usize,
    pub title: String,
    pub points: u64,
    pub unit_count: usize,
    pub units: Vec<String>,
}

/// 排行榜
///
/// 按总分降序排列，同分按首次出现顺序排列，并截断到 top-N。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    /// 从得分条目构建排行榜
    pub fn from_scores<'a>(scores: impl IntoIterator<Item = &'a ScoreEntry>, top_n: usize) -> Self {
        let mut ranked: Vec<&ScoreEntry> = scores.into_iter().collect();
        ranked.sort_by(|a, b| {
            b.points
                .cmp(&a.points)
                .then_with(|| a.first_seen.cmp(&b.first_seen))
        });

        let entries = ranked
            .into_iter()
            .take(top_n)
            .enumerate()
            .map(|(idx, score)| LeaderboardEntry {
                position: idx + 1,
                title: score.title.clone(),
                points: score.points,
                unit_count: score.unit_count(),
                units: score.units.iter().cloned().collect(),
            })
            .collect();

        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LeaderboardEntry> {
        self.entries.iter()
    }

    pub fn titles(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.title.as_str()).collect()
    }
}
