use super::{find_text_column, missing_column};
use crate::error::{AnnotatorError, Result};
use calamine::{open_workbook_auto, Reader};
use std::path::Path;

/// Excelの先頭シートからテキスト列を読み込む
pub fn read_text_column(path: &Path, text_column: &str) -> Result<Vec<String>> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| AnnotatorError::Xlsx(format!("{}: {}", path.display(), e)))?;

    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| AnnotatorError::Xlsx(format!("{}: シートがありません", path.display())))?;
    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| AnnotatorError::Xlsx(format!("{}: {}", path.display(), e)))?;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(Vec::new());
    };
    let header: Vec<String> = header.iter().map(|c| c.to_string()).collect();
    let idx = find_text_column(header.iter().map(String::as_str), text_column)
        .ok_or_else(|| missing_column(path, text_column))?;

    Ok(rows
        .map(|row| row.get(idx).map(|c| c.to_string()).unwrap_or_default())
        .collect())
}
