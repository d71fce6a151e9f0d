//! アノテーションセッションの状態遷移
//!
//! カーソル位置・完了済み集合・編集中台帳・確定履歴をひとつの値として持ち、
//! インテント単位で更新する。各操作は検証をすべて終えてから状態を変更するため、
//! 失敗した操作は状態を一切変えない。
//!
//! 不変条件: `completed` は `history` に現れる位置の集合と常に一致する。
//!
//! ## アイテム状態
//! - Untouched: 台帳が空で未完了
//! - Editing: 台帳に1件以上あり未完了
//! - Completed: 完了済み（確定履歴あり）

use crate::error::{Error, Result};
use crate::item::ItemStore;
use crate::ledger::LabelLedger;
use crate::types::{AnnotationRecord, LabelEntry, Sentiment, Vocabulary};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// 状態遷移に必要な読み取り専用の環境
#[derive(Debug, Clone, Copy)]
pub struct SessionContext<'a> {
    pub items: &'a ItemStore,
    pub vocabulary: &'a Vocabulary,
}

impl<'a> SessionContext<'a> {
    pub fn new(items: &'a ItemStore, vocabulary: &'a Vocabulary) -> Self {
        Self { items, vocabulary }
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}

/// アイテムごとの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemStatus {
    Untouched,
    Editing,
    Completed,
}

/// UIから届く操作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Navigate(usize),
    Next,
    Previous,
    AddLabel(LabelEntry),
    RemoveLabel(String),
    /// `pending` は選択済みだが未追加のラベル
    Complete { pending: Option<LabelEntry> },
    ClearAll,
}

/// 操作結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Outcome {
    /// 保存が必要な変更があったか
    pub changed: bool,
    /// 完了させたアイテム位置
    pub completed: Option<usize>,
}

impl Outcome {
    fn changed(changed: bool) -> Self {
        Self { changed, completed: None }
    }
}

/// 永続化形式
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub current_index: usize,
    #[serde(default)]
    pub annotations: Vec<AnnotationRecord>,
    #[serde(default)]
    pub completed_tweets: Vec<usize>,
    #[serde(default)]
    pub current_aspects: LabelLedger,
}

impl Snapshot {
    /// 完了済み一覧が履歴と一致しているか
    pub fn is_consistent(&self) -> bool {
        let stored: BTreeSet<usize> = self.completed_tweets.iter().copied().collect();
        let derived: BTreeSet<usize> = self.annotations.iter().map(|r| r.item_position).collect();
        stored == derived
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    cursor: usize,
    completed: BTreeSet<usize>,
    ledger: LabelLedger,
    history: Vec<AnnotationRecord>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn completed(&self) -> &BTreeSet<usize> {
        &self.completed
    }

    pub fn ledger(&self) -> &LabelLedger {
        &self.ledger
    }

    pub fn history(&self) -> &[AnnotationRecord] {
        &self.history
    }

    pub fn status(&self, position: usize) -> ItemStatus {
        if self.completed.contains(&position) {
            ItemStatus::Completed
        } else if self.ledger.has_entries(position) {
            ItemStatus::Editing
        } else {
            ItemStatus::Untouched
        }
    }

    /// インテントを適用
    pub fn apply(&mut self, ctx: &SessionContext<'_>, intent: Intent) -> Result<Outcome> {
        match intent {
            Intent::Navigate(target) => self.navigate(ctx, target).map(Outcome::changed),
            Intent::Next => Ok(Outcome::changed(self.next(ctx))),
            Intent::Previous => Ok(Outcome::changed(self.previous())),
            Intent::AddLabel(entry) => {
                self.add_label(ctx, &entry.aspect, entry.sentiment)?;
                Ok(Outcome::changed(true))
            }
            Intent::RemoveLabel(aspect) => Ok(Outcome::changed(self.remove_label(&aspect))),
            Intent::Complete { pending } => {
                let labels = self.ledger.merge_pending(self.cursor, pending);
                let position = self.complete_current(ctx, labels)?;
                Ok(Outcome {
                    changed: true,
                    completed: Some(position),
                })
            }
            Intent::ClearAll => {
                let changed = *self != SessionState::default();
                self.clear_all();
                Ok(Outcome::changed(changed))
            }
        }
    }

    /// カーソル移動。台帳・履歴・完了集合には触れない
    pub fn navigate(&mut self, ctx: &SessionContext<'_>, target: usize) -> Result<bool> {
        let item_count = ctx.item_count();
        if target >= item_count {
            return Err(Error::OutOfRange { target, item_count });
        }
        let moved = self.cursor != target;
        self.cursor = target;
        Ok(moved)
    }

    /// 次のアイテムへ（末尾では移動しない）
    pub fn next(&mut self, ctx: &SessionContext<'_>) -> bool {
        if self.cursor + 1 < ctx.item_count() {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    /// 前のアイテムへ（先頭では移動しない）
    pub fn previous(&mut self) -> bool {
        if self.cursor > 0 {
            self.cursor -= 1;
            true
        } else {
            false
        }
    }

    /// カーソル位置の台帳にラベルを追加
    pub fn add_label(&mut self, ctx: &SessionContext<'_>, aspect: &str, sentiment: Sentiment) -> Result<()> {
        ctx.vocabulary.validate(aspect)?;
        self.ledger.set(self.cursor, aspect, sentiment);
        Ok(())
    }

    /// カーソル位置の台帳からラベルを削除
    ///
    /// 完了済みアイテムでは何もしない。確定済みの内容は再完了でのみ変更する。
    pub fn remove_label(&mut self, aspect: &str) -> bool {
        if self.status(self.cursor) == ItemStatus::Completed {
            return false;
        }
        self.ledger.remove(self.cursor, aspect)
    }

    /// カーソル位置のアイテムを確定
    ///
    /// `labels` は未追加の選択をマージ済みの台帳内容。同じ (位置, アスペクト) の
    /// 既存レコードは削除してから追加する。カーソルは次へ進む（末尾では留まる）。
    pub fn complete_current(&mut self, ctx: &SessionContext<'_>, labels: Vec<LabelEntry>) -> Result<usize> {
        let position = self.cursor;
        if labels.is_empty() {
            return Err(Error::EmptyLedger(position));
        }
        for label in &labels {
            ctx.vocabulary.validate(&label.aspect)?;
        }
        let item = ctx.items.get(position)?;

        self.ledger.replace(position, labels);
        for entry in self.ledger.entries(position) {
            let record = AnnotationRecord::new(position, &item.text, &entry.aspect, entry.sentiment);
            self.history.retain(|r| !r.same_slot(position, &record.aspect));
            self.history.push(record);
        }
        self.completed.insert(position);
        self.cursor = (position + 1).min(ctx.item_count().saturating_sub(1));

        Ok(position)
    }

    /// すべてリセット
    pub fn clear_all(&mut self) {
        *self = SessionState::default();
    }

    /// データセットが縮んだ場合にカーソルを範囲内へ戻す
    pub fn clamp_cursor(&mut self, item_count: usize) -> bool {
        let max = item_count.saturating_sub(1);
        if self.cursor > max {
            self.cursor = max;
            true
        } else {
            false
        }
    }

    pub fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            current_index: self.cursor,
            annotations: self.history.clone(),
            completed_tweets: self.completed.iter().copied().collect(),
            current_aspects: self.ledger.clone(),
        }
    }

    /// 保存形式から復元
    ///
    /// 重複した (位置, アスペクト) は後勝ちで1件にまとめ、完了済み集合は履歴から作り直す。
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let mut history: Vec<AnnotationRecord> = Vec::with_capacity(snapshot.annotations.len());
        for record in snapshot.annotations {
            history.retain(|r| !r.same_slot(record.item_position, &record.aspect));
            history.push(record);
        }
        let completed = history.iter().map(|r| r.item_position).collect();

        Self {
            cursor: snapshot.current_index,
            completed,
            ledger: snapshot.current_aspects,
            history,
        }
    }
}

/// 関数形式の適用（新しい状態と結果を返す）
pub fn apply(mut state: SessionState, ctx: &SessionContext<'_>, intent: Intent) -> (SessionState, Result<Outcome>) {
    let result = state.apply(ctx, intent);
    (state, result)
}
