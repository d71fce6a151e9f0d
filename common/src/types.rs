//! アノテーションの型定義
//!
//! CLIと将来のUIで共有される型:
//! - Sentiment: 3値の感情ラベル
//! - LabelEntry: 編集中の (アスペクト, 感情) ペア
//! - AnnotationRecord: 確定済みのアノテーション（履歴の1行）
//! - Vocabulary: 設定されたアスペクト語彙

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 感情ラベル
///
/// 保存・出力時はデータセットの表記（Positif / Negatif / Netral）を使う。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Sentiment {
    #[serde(rename = "Positif", alias = "Positive")]
    Positive,
    #[serde(rename = "Negatif", alias = "Negative")]
    Negative,
    #[serde(rename = "Netral", alias = "Neutral")]
    Neutral,
}

impl Sentiment {
    /// 選択肢の表示順
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Negative, Sentiment::Neutral];

    pub fn label(&self) -> &'static str {
        match self {
            Sentiment::Positive => "Positif",
            Sentiment::Negative => "Negatif",
            Sentiment::Neutral => "Netral",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Sentiment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "positif" | "positive" | "pos" | "+" => Ok(Sentiment::Positive),
            "negatif" | "negative" | "neg" | "-" => Ok(Sentiment::Negative),
            "netral" | "neutral" | "net" | "0" => Ok(Sentiment::Neutral),
            _ => Err(Error::InvalidSentiment(s.to_string())),
        }
    }
}

/// 編集中ラベル（1アイテム内でアスペクトは一意）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEntry {
    pub aspect: String,
    pub sentiment: Sentiment,
}

impl LabelEntry {
    pub fn new(aspect: impl Into<String>, sentiment: Sentiment) -> Self {
        Self {
            aspect: aspect.into(),
            sentiment,
        }
    }
}

/// 確定済みアノテーション
///
/// 生成時にテキストとアスペクトをtrimする。シリアライズ時は
/// `tweet_id`（位置+1）/ `tweet` / `aspek` / `sentimen` の行形式になる。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "RecordRow", try_from = "RecordRow")]
pub struct AnnotationRecord {
    pub item_position: usize,
    pub item_text: String,
    pub aspect: String,
    pub sentiment: Sentiment,
}

impl AnnotationRecord {
    pub fn new(item_position: usize, item_text: &str, aspect: &str, sentiment: Sentiment) -> Self {
        Self {
            item_position,
            item_text: item_text.trim().to_string(),
            aspect: aspect.trim().to_string(),
            sentiment,
        }
    }

    /// 出力用のID（1始まり）
    pub fn tweet_id(&self) -> usize {
        self.item_position + 1
    }

    /// 同一 (位置, アスペクト) かどうか
    pub fn same_slot(&self, item_position: usize, aspect: &str) -> bool {
        self.item_position == item_position && self.aspect == aspect.trim()
    }
}

/// 出力・保存用の行形式
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordRow {
    pub tweet_id: usize,
    pub tweet: String,
    pub aspek: String,
    pub sentimen: Sentiment,
}

impl From<AnnotationRecord> for RecordRow {
    fn from(record: AnnotationRecord) -> Self {
        Self {
            tweet_id: record.tweet_id(),
            tweet: record.item_text,
            aspek: record.aspect,
            sentimen: record.sentiment,
        }
    }
}

impl From<&AnnotationRecord> for RecordRow {
    fn from(record: &AnnotationRecord) -> Self {
        record.clone().into()
    }
}

impl TryFrom<RecordRow> for AnnotationRecord {
    type Error = Error;

    fn try_from(row: RecordRow) -> Result<Self> {
        let item_position = row
            .tweet_id
            .checked_sub(1)
            .ok_or_else(|| Error::Snapshot("tweet_id must start at 1".into()))?;
        Ok(AnnotationRecord::new(item_position, &row.tweet, &row.aspek, row.sentimen))
    }
}

/// アスペクト語彙
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vocabulary {
    aspects: Vec<String>,
}

impl Vocabulary {
    /// 未選択を表すプレースホルダ（語彙には含めない）
    pub const PLACEHOLDER: &'static str = "-- Pilih Aspek --";

    pub fn new<I, S>(aspects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list: Vec<String> = Vec::new();
        for aspect in aspects {
            let aspect = aspect.as_ref().trim();
            if aspect.is_empty() || aspect == Self::PLACEHOLDER {
                continue;
            }
            if !list.iter().any(|a| a == aspect) {
                list.push(aspect.to_string());
            }
        }
        Self { aspects: list }
    }

    pub fn contains(&self, aspect: &str) -> bool {
        let aspect = aspect.trim();
        aspect != Self::PLACEHOLDER && self.aspects.iter().any(|a| a == aspect)
    }

    /// 語彙チェック
    pub fn validate(&self, aspect: &str) -> Result<()> {
        if self.contains(aspect) {
            Ok(())
        } else {
            Err(Error::InvalidAspect(aspect.to_string()))
        }
    }

    pub fn aspects(&self) -> &[String] {
        &self.aspects
    }

    pub fn len(&self) -> usize {
        self.aspects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aspects.is_empty()
    }
}
