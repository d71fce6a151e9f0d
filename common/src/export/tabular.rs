//! CSV形式（tweet_id,tweet,aspek,sentimen）

use crate::error::Result;
use crate::types::{AnnotationRecord, RecordRow};
use csv::{ReaderBuilder, WriterBuilder};

pub const TABULAR_HEADER: [&str; 4] = ["tweet_id", "tweet", "aspek", "sentimen"];

/// 履歴をCSV文字列に変換（履歴が空でもヘッダー行は出力する）
pub fn render_tabular(history: &[AnnotationRecord]) -> Result<String> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(Vec::new());
    writer.write_record(TABULAR_HEADER)?;
    for record in history {
        writer.serialize(RecordRow::from(record))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// CSV文字列を履歴に戻す
pub fn parse_tabular(input: &str) -> Result<Vec<AnnotationRecord>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_reader(input.trim_start_matches('\u{feff}').as_bytes());

    let mut history = Vec::new();
    for row in reader.deserialize::<RecordRow>() {
        history.push(AnnotationRecord::try_from(row?)?);
    }
    Ok(history)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Sentiment;

    fn sample() -> Vec<AnnotationRecord> {
        vec![
            AnnotationRecord::new(0, "Saya suka program ini", "Program Kerja", Sentiment::Positive),
            AnnotationRecord::new(1, "Menteri \"kurang\" transparan, katanya", "Transparansi", Sentiment::Negative),
            AnnotationRecord::new(1, "Menteri \"kurang\" transparan, katanya", "Figur Menteri", Sentiment::Neutral),
        ]
    }

    #[test]
    fn test_render_header_and_rows() {
        let csv = render_tabular(&sample()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "tweet_id,tweet,aspek,sentimen");
        assert_eq!(lines[1], "1,Saya suka program ini,Program Kerja,Positif");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_roundtrip_with_quotes_and_commas() {
        let history = sample();
        let parsed = parse_tabular(&render_tabular(&history).unwrap()).unwrap();
        assert_eq!(parsed, history);
    }

    #[test]
    fn test_parse_with_bom() {
        let input = "\u{feff}tweet_id,tweet,aspek,sentimen\n3,teks,Transparansi,Netral\n";
        let parsed = parse_tabular(input).unwrap();
        assert_eq!(parsed, vec![AnnotationRecord::new(2, "teks", "Transparansi", Sentiment::Neutral)]);
    }

    #[test]
    fn test_parse_invalid_sentiment() {
        let input = "tweet_id,tweet,aspek,sentimen\n1,teks,Transparansi,Senang\n";
        assert!(parse_tabular(input).is_err());
    }
}
