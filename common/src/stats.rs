//! アノテーション結果の集計
//!
//! 進捗と感情・アスペクトの分布を履歴から計算する。

use crate::types::{AnnotationRecord, Sentiment};
use std::collections::{BTreeSet, HashMap};

/// 集計結果
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    /// ラベル総数
    pub total_labels: usize,
    /// 完了アイテム数
    pub completed_items: usize,
    /// 全アイテム数
    pub total_items: usize,
    /// ユニークなアスペクト数
    pub unique_aspects: usize,
    /// 感情ごとの件数（Sentiment::ALL の順）
    pub sentiments: Vec<(Sentiment, usize)>,
    /// アスペクトごとの件数（件数降順、同数は名前順）
    pub aspects: Vec<(String, usize)>,
}

impl Summary {
    pub fn from_history(history: &[AnnotationRecord], total_items: usize) -> Self {
        let completed: BTreeSet<usize> = history.iter().map(|r| r.item_position).collect();

        let mut sentiment_counts: HashMap<Sentiment, usize> = HashMap::new();
        let mut aspect_counts: HashMap<&str, usize> = HashMap::new();
        for record in history {
            *sentiment_counts.entry(record.sentiment).or_default() += 1;
            *aspect_counts.entry(record.aspect.as_str()).or_default() += 1;
        }

        let sentiments = Sentiment::ALL
            .iter()
            .map(|s| (*s, sentiment_counts.get(s).copied().unwrap_or(0)))
            .collect();

        let mut aspects: Vec<(String, usize)> = aspect_counts
            .into_iter()
            .map(|(a, n)| (a.to_string(), n))
            .collect();
        aspects.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        Self {
            total_labels: history.len(),
            completed_items: completed.len(),
            total_items,
            unique_aspects: aspects.len(),
            sentiments,
            aspects,
        }
    }

    pub fn remaining_items(&self) -> usize {
        self.total_items.saturating_sub(self.completed_items)
    }

    /// 進捗率（0.0〜1.0）
    pub fn progress(&self) -> f64 {
        if self.total_items == 0 {
            0.0
        } else {
            (self.completed_items as f64 / self.total_items as f64).min(1.0)
        }
    }
}
