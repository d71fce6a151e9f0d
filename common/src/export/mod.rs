//! エクスポート描画（CLI/将来のUI共通）
//!
//! 確定履歴を各形式の文字列・バッファに変換する。ファイル書き込みは呼び出し側で行う。

pub mod absa;
pub mod tabular;

#[cfg(feature = "excel")]
pub mod excel_core;

use crate::error::Result;
use crate::types::AnnotationRecord;

pub use absa::render_absa;
pub use tabular::{parse_tabular, render_tabular, TABULAR_HEADER};

/// 3形式まとめての出力
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportBundle {
    /// CSV
    pub tabular: String,
    /// JSON配列（整形済み）
    pub structured: String,
    /// ABSA学習用テキスト
    pub delimited: String,
}

pub fn export(history: &[AnnotationRecord]) -> Result<ExportBundle> {
    Ok(ExportBundle {
        tabular: render_tabular(history)?,
        structured: render_structured(history)?,
        delimited: render_absa(history),
    })
}

/// JSON配列（履歴順、CSVと同じフィールド名）
pub fn render_structured(history: &[AnnotationRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(history)?)
}
