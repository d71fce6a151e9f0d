//! セッションスナップショットの保存・読み込み
//!
//! 保存は一時ファイルに書いてからリネームする。
//! `SnapshotWriter` は専用タスクで受け付け順に書き込むため、
//! 後の操作の保存が先の保存を追い越すことはない。

use crate::error::{AnnotatorError, Result};
use absa_annotator_common::{SessionState, Snapshot};
use std::path::{Path, PathBuf};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// スナップショットを読み込む（ファイルがなければ空の状態）
pub fn load_state(path: &Path) -> Result<SessionState> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "スナップショットなし、新規セッション");
        return Ok(SessionState::new());
    }

    let content = std::fs::read_to_string(path)?;
    let snapshot: Snapshot = serde_json::from_str(&content)?;
    if !snapshot.is_consistent() {
        tracing::warn!(
            path = %path.display(),
            "完了済み一覧が履歴と一致しないため履歴から再構築します"
        );
    }
    let state = SessionState::from_snapshot(snapshot);
    tracing::info!(
        path = %path.display(),
        records = state.history().len(),
        completed = state.completed().len(),
        "スナップショットを読み込みました"
    );
    Ok(state)
}

/// スナップショットを同期的に保存
pub fn save_snapshot(path: &Path, snapshot: &Snapshot) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(snapshot)?;
    ensure_parent(path)?;
    let tmp = temp_path(path);
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// 全削除の結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClearReport {
    /// 削除前の確定レコード数
    pub records_cleared: usize,
    /// 削除したファイル
    pub removed: Vec<PathBuf>,
}

/// セッションをリセットし、スナップショットと出力ファイルを削除
///
/// 状態は `SessionState::clear_all` で初期化してから、スナップショット（書きかけの一時ファイル含む）と
/// `export_files` のうち存在するものを消す。壊れたスナップショットも削除対象にする。
pub fn clear_session(state_path: &Path, export_files: &[PathBuf]) -> Result<ClearReport> {
    let mut state = match load_state(state_path) {
        Ok(state) => state,
        Err(AnnotatorError::JsonParse(e)) => {
            tracing::warn!(path = %state_path.display(), "壊れたスナップショットを削除します: {}", e);
            SessionState::new()
        }
        Err(e) => return Err(e),
    };

    let records_cleared = state.history().len();
    state.clear_all();

    let mut removed = Vec::new();
    for path in [state_path.to_path_buf(), temp_path(state_path)]
        .into_iter()
        .chain(export_files.iter().cloned())
    {
        if remove_if_exists(&path)? {
            tracing::info!(path = %path.display(), "削除しました");
            removed.push(path);
        }
    }

    Ok(ClearReport { records_cleared, removed })
}

/// スナップショットを削除（存在しなければfalse）
pub fn remove_state(path: &Path) -> Result<bool> {
    remove_if_exists(path)
}

fn remove_if_exists(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    std::fs::remove_file(path)?;
    Ok(true)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

async fn write_async(path: &Path, snapshot: &Snapshot) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(snapshot)?;
    ensure_parent(path)?;
    let tmp = temp_path(path);
    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

enum WriterCommand {
    Save(Box<Snapshot>),
    Flush(oneshot::Sender<Option<String>>),
}

/// 順序保証つきの非同期保存
pub struct SnapshotWriter {
    tx: mpsc::UnboundedSender<WriterCommand>,
    handle: JoinHandle<()>,
}

impl SnapshotWriter {
    pub fn spawn(path: PathBuf) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(writer_task(path, rx));
        Self { tx, handle }
    }

    /// 保存を依頼（待たない）
    pub fn submit(&self, snapshot: Snapshot) -> Result<()> {
        self.tx
            .send(WriterCommand::Save(Box::new(snapshot)))
            .map_err(|_| AnnotatorError::WriterClosed)
    }

    /// それまでに依頼した保存がすべて終わるまで待つ
    ///
    /// 前回のflush以降に失敗した書き込みがあればエラーを返す。
    pub async fn flush(&self) -> Result<()> {
        let (done_tx, done_rx) = oneshot::channel();
        self.tx
            .send(WriterCommand::Flush(done_tx))
            .map_err(|_| AnnotatorError::WriterClosed)?;
        match done_rx.await {
            Ok(None) => Ok(()),
            Ok(Some(message)) => Err(AnnotatorError::Io(std::io::Error::other(message))),
            Err(_) => Err(AnnotatorError::WriterClosed),
        }
    }

    /// 残りを書き出してタスクを終了
    pub async fn shutdown(self) -> Result<()> {
        let result = self.flush().await;
        drop(self.tx);
        if let Err(e) = self.handle.await {
            tracing::error!("保存タスクが異常終了しました: {}", e);
        }
        result
    }
}

async fn writer_task(path: PathBuf, mut rx: mpsc::UnboundedReceiver<WriterCommand>) {
    let mut last_error: Option<String> = None;

    while let Some(command) = rx.recv().await {
        match command {
            WriterCommand::Save(snapshot) => match write_async(&path, &snapshot).await {
                Ok(()) => tracing::debug!(path = %path.display(), "スナップショットを保存しました"),
                Err(e) => {
                    tracing::error!(path = %path.display(), "スナップショット保存に失敗: {}", e);
                    last_error = Some(e.to_string());
                }
            },
            WriterCommand::Flush(done) => {
                let _ = done.send(last_error.take());
            }
        }
    }
}
