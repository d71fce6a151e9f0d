//! 対話式アノテーションモジュール
//!
//! 1ツイートずつ表示し、メニュー操作をインテントに変換して状態に適用する。
//! 変更があった操作のたびにスナップショットを保存タスクへ送る。
//!
//! ## 変更履歴
//! - 2026-10-17: 初期作成

use crate::config::Config;
use crate::dataset;
use crate::error::{AnnotatorError, Result};
use crate::persistence::{self, SnapshotWriter};
use absa_annotator_common::{
    Error as SessionError, Intent, ItemStatus, LabelEntry, Outcome, Sentiment, SessionContext, SessionState,
    Summary, Vocabulary,
};
use dialoguer::{Confirm, Input, Select};
use std::fmt::Write as _;
use std::path::Path;

/// メニュー操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    /// ラベルを追加
    AddLabel,
    /// ラベルを削除
    RemoveLabel,
    /// 完了して次へ
    Complete,
    Previous,
    Next,
    /// 番号を指定して移動
    Jump,
    /// 全アノテーションを削除
    ClearAll,
    /// 保存して終了
    Quit,
}

impl MenuAction {
    pub const ALL: [MenuAction; 8] = [
        MenuAction::AddLabel,
        MenuAction::RemoveLabel,
        MenuAction::Complete,
        MenuAction::Previous,
        MenuAction::Next,
        MenuAction::Jump,
        MenuAction::ClearAll,
        MenuAction::Quit,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MenuAction::AddLabel => "ラベルを追加",
            MenuAction::RemoveLabel => "ラベルを削除",
            MenuAction::Complete => "完了して次へ",
            MenuAction::Previous => "← 前のツイート",
            MenuAction::Next => "次のツイート →",
            MenuAction::Jump => "番号で移動",
            MenuAction::ClearAll => "全て削除",
            MenuAction::Quit => "保存して終了",
        }
    }
}

fn status_label(status: ItemStatus) -> &'static str {
    match status {
        ItemStatus::Untouched => "未着手",
        ItemStatus::Editing => "編集中",
        ItemStatus::Completed => "完了",
    }
}

/// 状態と保存タスクをまとめたセッション
pub struct Annotator<'a> {
    ctx: SessionContext<'a>,
    state: SessionState,
    writer: SnapshotWriter,
}

impl<'a> Annotator<'a> {
    pub fn new(ctx: SessionContext<'a>, mut state: SessionState, writer: SnapshotWriter) -> Self {
        if state.clamp_cursor(ctx.item_count()) {
            tracing::warn!(cursor = state.cursor(), "カーソルがデータセット外だったため末尾に戻しました");
        }
        Self { ctx, state, writer }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn context(&self) -> &SessionContext<'a> {
        &self.ctx
    }

    /// インテントを適用し、変更があれば保存を依頼
    pub fn dispatch(&mut self, intent: Intent) -> Result<Outcome> {
        tracing::debug!(?intent, cursor = self.state.cursor(), "インテント適用");
        let outcome = self.state.apply(&self.ctx, intent)?;
        if outcome.changed {
            self.writer.submit(self.state.to_snapshot())?;
        }
        Ok(outcome)
    }

    /// 保存を待って終了
    pub async fn finish(self) -> Result<SessionState> {
        self.writer.shutdown().await?;
        Ok(self.state)
    }
}

/// 現在のツイートの表示内容
pub fn render_item_view(ctx: &SessionContext<'_>, state: &SessionState) -> Result<String> {
    let position = state.cursor();
    let item = ctx.items.get(position)?;
    let summary = Summary::from_history(state.history(), ctx.item_count());

    let mut view = String::new();
    let _ = writeln!(view, "────────────────────────────────────────");
    let _ = writeln!(
        view,
        "Tweet ke-{} dari {}  [{}]",
        position + 1,
        ctx.item_count(),
        status_label(state.status(position))
    );
    if let Some(category) = &item.category {
        let _ = writeln!(view, "カテゴリ: {}", category);
    }
    let _ = writeln!(
        view,
        "進捗: {}/{} ({:.1}%)",
        summary.completed_items,
        summary.total_items,
        summary.progress() * 100.0
    );
    let _ = writeln!(view);
    if item.is_blank() {
        let _ = writeln!(view, "（本文なし）");
    } else {
        let _ = writeln!(view, "{}", item.text);
    }
    let _ = writeln!(view);

    let entries = state.ledger().entries(position);
    if entries.is_empty() {
        let _ = writeln!(view, "ラベル: なし");
    } else {
        let _ = writeln!(view, "ラベル:");
        for entry in entries {
            let _ = writeln!(view, "  - {}: {}", entry.aspect, entry.sentiment);
        }
    }
    Ok(view)
}

/// 番号入力（1始まり）を位置に変換。0 は範囲外として扱う
pub fn jump_target(number: usize, item_count: usize) -> usize {
    number.checked_sub(1).unwrap_or(item_count)
}

/// ユーザーに見せて続行するエラーか
fn is_user_error(error: &AnnotatorError) -> bool {
    matches!(
        error,
        AnnotatorError::Common(
            SessionError::OutOfRange { .. } | SessionError::InvalidAspect(_) | SessionError::EmptyLedger(_)
        )
    )
}

/// 対話式でアノテーション
pub async fn run_interactive(config: &Config, state_path: &Path) -> Result<()> {
    let items = dataset::load_items(&config.sources, &config.text_column)?;
    let vocabulary = config.vocabulary();
    let ctx = SessionContext::new(&items, &vocabulary);

    let state = persistence::load_state(state_path)?;
    let writer = SnapshotWriter::spawn(state_path.to_path_buf());
    let mut annotator = Annotator::new(ctx, state, writer);

    println!("📝 アノテーター: {}", config.annotator);
    println!("📂 ツイート: {}件 / 保存先: {}\n", items.len(), state_path.display());

    loop {
        print!("{}", render_item_view(annotator.context(), annotator.state())?);

        let action = prompt_action()?;
        let intent = match action {
            MenuAction::AddLabel => prompt_label(&vocabulary, "アスペクト")?.map(Intent::AddLabel),
            MenuAction::RemoveLabel => prompt_remove(annotator.state())?.map(Intent::RemoveLabel),
            MenuAction::Complete => Some(Intent::Complete {
                pending: prompt_label(&vocabulary, "未追加のアスペクト（なければそのまま）")?,
            }),
            MenuAction::Previous => Some(Intent::Previous),
            MenuAction::Next => Some(Intent::Next),
            MenuAction::Jump => Some(Intent::Navigate(prompt_jump(items.len())?)),
            MenuAction::ClearAll => confirm_clear()?.then_some(Intent::ClearAll),
            MenuAction::Quit => break,
        };

        let Some(intent) = intent else {
            continue;
        };

        match annotator.dispatch(intent) {
            Ok(outcome) => {
                if let Some(position) = outcome.completed {
                    println!("  ✔ Tweet ke-{} を保存しました\n", position + 1);
                    if annotator.state().completed().len() == items.len() {
                        println!("🎉 すべてのツイートが完了しました\n");
                    }
                } else if !outcome.changed {
                    println!("  → 変更なし\n");
                }
            }
            Err(e) if is_user_error(&e) => println!("  ⚠ {}\n", e),
            Err(e) => return Err(e),
        }
    }

    println!("保存して終了します...");
    let state = annotator.finish().await?;
    println!("✓ 保存しました: {} ({}件)", state_path.display(), state.history().len());
    Ok(())
}

/// 既定は「いいえ」
fn confirm_clear() -> Result<bool> {
    Confirm::new()
        .with_prompt("すべてのアノテーションを削除します。よろしいですか？")
        .default(false)
        .interact()
        .map_err(|e| AnnotatorError::Prompt(e.to_string()))
}

fn prompt_action() -> Result<MenuAction> {
    let labels: Vec<&str> = MenuAction::ALL.iter().map(|a| a.label()).collect();
    let selection = Select::new()
        .with_prompt("操作")
        .items(&labels)
        .default(0)
        .interact()
        .map_err(|e| AnnotatorError::Prompt(e.to_string()))?;
    Ok(MenuAction::ALL[selection])
}

/// アスペクトと感情を選ぶ。先頭のプレースホルダーを選ぶと感情は聞かずに None
fn prompt_label(vocabulary: &Vocabulary, prompt: &str) -> Result<Option<LabelEntry>> {
    let mut choices = vec![Vocabulary::PLACEHOLDER];
    choices.extend(vocabulary.aspects().iter().map(String::as_str));

    let aspect_idx = Select::new()
        .with_prompt(prompt)
        .items(&choices)
        .default(0)
        .interact()
        .map_err(|e| AnnotatorError::Prompt(e.to_string()))?;
    if aspect_idx == 0 {
        return Ok(None);
    }

    let sentiments: Vec<&str> = Sentiment::ALL.iter().map(|s| s.label()).collect();
    let sentiment_idx = Select::new()
        .with_prompt("感情")
        .items(&sentiments)
        .default(0)
        .interact()
        .map_err(|e| AnnotatorError::Prompt(e.to_string()))?;

    Ok(Some(LabelEntry::new(choices[aspect_idx], Sentiment::ALL[sentiment_idx])))
}

fn prompt_remove(state: &SessionState) -> Result<Option<String>> {
    let entries = state.ledger().entries(state.cursor());
    if entries.is_empty() {
        println!("  → 削除できるラベルがありません\n");
        return Ok(None);
    }

    let labels: Vec<String> = entries.iter().map(|e| format!("{}: {}", e.aspect, e.sentiment)).collect();
    let idx = Select::new()
        .with_prompt("削除するラベル")
        .items(&labels)
        .default(0)
        .interact()
        .map_err(|e| AnnotatorError::Prompt(e.to_string()))?;
    Ok(Some(entries[idx].aspect.clone()))
}

fn prompt_jump(item_count: usize) -> Result<usize> {
    let number: usize = Input::new()
        .with_prompt(format!("ツイート番号 (1-{})", item_count))
        .interact_text()
        .map_err(|e| AnnotatorError::Prompt(e.to_string()))?;
    Ok(jump_target(number, item_count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use absa_annotator_common::{ItemStore, SourceTable};
    use tempfile::tempdir;

    fn fixture() -> (ItemStore, Vocabulary) {
        let items = ItemStore::load(vec![SourceTable::new(
            "transparansi.csv",
            Some("Transparansi".into()),
            vec!["Anggaran tidak dibuka".into(), "Menteri terbuka, bagus".into()],
        )])
        .unwrap();
        (items, Vocabulary::new(["Transparansi", "Kompetensi Menteri"]))
    }

    #[test]
    fn test_render_item_view() {
        let (items, vocab) = fixture();
        let ctx = SessionContext::new(&items, &vocab);
        let mut state = SessionState::new();
        state.add_label(&ctx, "Transparansi", Sentiment::Negative).unwrap();

        let view = render_item_view(&ctx, &state).unwrap();
        assert!(view.contains("Tweet ke-1 dari 2  [編集中]"));
        assert!(view.contains("カテゴリ: Transparansi"));
        assert!(view.contains("進捗: 0/2 (0.0%)"));
        assert!(view.contains("Anggaran tidak dibuka"));
        assert!(view.contains("  - Transparansi: Negatif"));
    }

    #[test]
    fn test_render_blank_item() {
        let items = ItemStore::load(vec![SourceTable::new("lama.csv", None, vec!["ada".into(), "   ".into()])]).unwrap();
        let vocab = Vocabulary::new(["Transparansi"]);
        let ctx = SessionContext::new(&items, &vocab);
        let mut state = SessionState::new();
        state.navigate(&ctx, 1).unwrap();

        let view = render_item_view(&ctx, &state).unwrap();
        assert!(view.contains("Tweet ke-2 dari 2"));
        assert!(view.contains("（本文なし）"));
    }

    #[test]
    fn test_jump_target() {
        assert_eq!(jump_target(1, 5), 0);
        assert_eq!(jump_target(5, 5), 4);
        assert_eq!(jump_target(0, 5), 5);
    }

    #[test]
    fn test_is_user_error() {
        assert!(is_user_error(&AnnotatorError::Common(SessionError::EmptyLedger(0))));
        assert!(is_user_error(&AnnotatorError::Common(SessionError::OutOfRange {
            target: 9,
            item_count: 2
        })));
        assert!(!is_user_error(&AnnotatorError::WriterClosed));
    }

    #[tokio::test]
    async fn test_dispatch_persists_changes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("annotation_state.json");
        let (items, vocab) = fixture();
        let ctx = SessionContext::new(&items, &vocab);

        let mut annotator = Annotator::new(ctx, SessionState::new(), SnapshotWriter::spawn(path.clone()));
        annotator
            .dispatch(Intent::AddLabel(LabelEntry::new("Transparansi", Sentiment::Negative)))
            .unwrap();
        let outcome = annotator.dispatch(Intent::Complete { pending: None }).unwrap();
        assert_eq!(outcome.completed, Some(0));

        let rejected = annotator.dispatch(Intent::Navigate(7));
        assert!(is_user_error(&rejected.unwrap_err()));

        let state = annotator.finish().await.unwrap();
        let restored = persistence::load_state(&path).unwrap();
        assert_eq!(restored, state);
        assert_eq!(restored.cursor(), 1);
        assert_eq!(restored.history().len(), 1);
    }

    #[tokio::test]
    async fn test_clear_all_menu_saves_empty_snapshot() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("annotation_state.json");
        let (items, vocab) = fixture();
        let ctx = SessionContext::new(&items, &vocab);

        let mut annotator = Annotator::new(ctx, SessionState::new(), SnapshotWriter::spawn(path.clone()));
        annotator
            .dispatch(Intent::Complete {
                pending: Some(LabelEntry::new("Transparansi", Sentiment::Positive)),
            })
            .unwrap();
        assert!(MenuAction::ALL.contains(&MenuAction::ClearAll));
        let outcome = annotator.dispatch(Intent::ClearAll).unwrap();
        assert!(outcome.changed);

        annotator.finish().await.unwrap();
        let restored = persistence::load_state(&path).unwrap();
        assert_eq!(restored, SessionState::new());
    }

    #[tokio::test]
    async fn test_new_clamps_cursor() {
        let dir = tempdir().unwrap();
        let (items, vocab) = fixture();
        let ctx = SessionContext::new(&items, &vocab);
        let state = SessionState::from_snapshot(absa_annotator_common::Snapshot {
            current_index: 10,
            ..Default::default()
        });

        let annotator = Annotator::new(ctx, state, SnapshotWriter::spawn(dir.path().join("s.json")));
        assert_eq!(annotator.state().cursor(), 1);
        annotator.finish().await.unwrap();
    }
}
