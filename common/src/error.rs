//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("Load error: {0}")]
    Load(String),

    #[error("Item not found: position {0}")]
    NotFound(usize),

    #[error("Position {target} is out of range (items: {item_count})")]
    OutOfRange { target: usize, item_count: usize },

    #[error("Invalid aspect: {0}")]
    InvalidAspect(String),

    #[error("Item {0} has no labels to complete")]
    EmptyLedger(usize),

    #[error("Invalid sentiment: {0}")]
    InvalidSentiment(String),

    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "excel")]
    #[error("Excel error: {0}")]
    Excel(#[from] rust_xlsxwriter::XlsxError),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
