//! データセット読み込みモジュール
//!
//! 設定されたソース（CSV/Excelファイルまたはフォルダ）を指定順に読み込み、
//! ItemStoreへ連結する。見つからないファイルは警告してスキップする。

mod csv_source;
mod xlsx_source;

use crate::config::SourceConfig;
use crate::error::{AnnotatorError, Result};
use absa_annotator_common::{ItemStore, SourceTable};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 旧データセットのテキスト列名
pub const TEXT_COLUMN_ALIASES: &[&str] = &["Cleaned_Tweet"];

const DATASET_EXTENSIONS: &[&str] = &["csv", "xlsx", "xls"];

/// 展開済みのソースファイル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetSource {
    pub path: PathBuf,
    pub category: Option<String>,
}

/// フォルダ指定を直下のデータセットファイルに展開
///
/// フォルダ内のファイルはファイル名順。カテゴリ未指定ならファイル名（拡張子なし）をカテゴリにする。
pub fn expand_sources(sources: &[SourceConfig]) -> Vec<DatasetSource> {
    let mut expanded = Vec::new();

    for source in sources {
        if !source.path.is_dir() {
            expanded.push(DatasetSource {
                path: source.path.clone(),
                category: source.category.clone(),
            });
            continue;
        }

        let mut files: Vec<PathBuf> = WalkDir::new(&source.path)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .map(|e| e.into_path())
            .filter(|p| p.is_file() && is_dataset_file(p))
            .collect();
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        for path in files {
            let category = source.category.clone().or_else(|| {
                path.file_stem()
                    .map(|s| s.to_string_lossy().to_string())
            });
            expanded.push(DatasetSource { path, category });
        }
    }

    expanded
}

fn is_dataset_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .map(|e| DATASET_EXTENSIONS.contains(&e.as_str()))
        .unwrap_or(false)
}

/// 1ファイルを読み込む
pub fn read_table(source: &DatasetSource, text_column: &str) -> Result<SourceTable> {
    let ext = source
        .path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    let rows = match ext.as_str() {
        "xlsx" | "xls" => xlsx_source::read_text_column(&source.path, text_column)?,
        _ => csv_source::read_text_column(&source.path, text_column)?,
    };

    Ok(SourceTable::new(
        source.path.display().to_string(),
        source.category.clone(),
        rows,
    ))
}

/// すべてのソースを読み込んでItemStoreを作る
pub fn load_items(sources: &[SourceConfig], text_column: &str) -> Result<ItemStore> {
    let mut tables = Vec::new();

    for source in expand_sources(sources) {
        if !source.path.exists() {
            tracing::warn!(path = %source.path.display(), "データセットが見つからないためスキップします");
            continue;
        }
        let table = read_table(&source, text_column)?;
        tracing::info!(
            path = %source.path.display(),
            rows = table.rows.len(),
            category = source.category.as_deref().unwrap_or("-"),
            "データセットを読み込みました"
        );
        tables.push(table);
    }

    Ok(ItemStore::load(tables)?)
}

/// ヘッダーからテキスト列の位置を探す
fn find_text_column<'a, I>(headers: I, text_column: &str) -> Option<usize>
where
    I: IntoIterator<Item = &'a str> + Clone,
{
    let normalized = |h: &str| h.trim().trim_matches('\u{feff}').to_string();
    headers
        .clone()
        .into_iter()
        .position(|h| normalized(h) == text_column)
        .or_else(|| {
            headers
                .into_iter()
                .position(|h| TEXT_COLUMN_ALIASES.contains(&normalized(h).as_str()))
        })
}

fn missing_column(path: &Path, text_column: &str) -> AnnotatorError {
    AnnotatorError::Dataset(format!(
        "{}: テキスト列 '{}' がありません",
        path.display(),
        text_column
    ))
}
