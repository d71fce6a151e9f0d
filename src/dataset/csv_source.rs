use super::{find_text_column, missing_column};
use crate::error::Result;
use csv::ReaderBuilder;
use std::path::Path;

/// CSVのテキスト列を読み込む
pub fn read_text_column(path: &Path, text_column: &str) -> Result<Vec<String>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    let idx = find_text_column(headers.iter(), text_column)
        .ok_or_else(|| missing_column(path, text_column))?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.get(idx).unwrap_or("").to_string());
    }
    Ok(rows)
}
