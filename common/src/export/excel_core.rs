//! Excel生成（共通ライブラリ）
//!
//! CSVと同じ列構成で1シートに書き出す。

use crate::error::Result;
use crate::export::tabular::TABULAR_HEADER;
use crate::types::AnnotationRecord;
use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook};

const SHEET_NAME: &str = "annotations";
const COLUMN_WIDTHS: [f64; 4] = [10.0, 80.0, 24.0, 12.0];

/// Excelをバッファに生成
pub fn generate_excel_buffer(history: &[AnnotationRecord]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();

    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0xF5F5F5))
        .set_border(FormatBorder::Thin)
        .set_border_color(Color::RGB(0xAAAAAA));
    let text_format = Format::new().set_text_wrap();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, width) in COLUMN_WIDTHS.iter().enumerate() {
        worksheet.set_column_width(col as u16, *width)?;
    }
    for (col, title) in TABULAR_HEADER.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *title, &header_format)?;
    }
    worksheet.set_freeze_panes(1, 0)?;

    for (idx, record) in history.iter().enumerate() {
        let row = idx as u32 + 1;
        worksheet.write_number(row, 0, record.tweet_id() as f64)?;
        worksheet.write_string_with_format(row, 1, &record.item_text, &text_format)?;
        worksheet.write_string(row, 2, &record.aspect)?;
        worksheet.write_string(row, 3, record.sentiment.label())?;
    }

    Ok(workbook.save_to_buffer()?)
}
