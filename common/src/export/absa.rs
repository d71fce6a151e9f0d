//! ABSA学習用テキスト形式
//!
//! 1レコード3行（`$T$ テキスト` / アスペクト / 感情）を区切り行なしで並べる。
//! (位置, アスペクト) が重複する場合は最初の1件のみ出力する。
//! テキストとアスペクト内の改行・連続空白は1つの空白にまとめ、1レコード3行を崩さない。

use crate::types::AnnotationRecord;
use std::collections::HashSet;

pub const TEXT_MARKER: &str = "$T$";

fn single_line(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn render_absa(history: &[AnnotationRecord]) -> String {
    let mut seen: HashSet<(usize, &str)> = HashSet::new();
    let mut out = String::new();

    for record in history {
        if !seen.insert((record.item_position, record.aspect.trim())) {
            continue;
        }
        out.push_str(TEXT_MARKER);
        out.push(' ');
        out.push_str(&single_line(&record.item_text));
        out.push('\n');
        out.push_str(&single_line(&record.aspect));
        out.push('\n');
        out.push_str(record.sentiment.label());
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Sentiment;

    #[test]
    fn test_render_blocks() {
        let history = vec![
            AnnotationRecord::new(0, " Saya suka program ini ", "Program Kerja", Sentiment::Positive),
            AnnotationRecord::new(1, "Kabinet gemuk", "Struktur Kabinet", Sentiment::Negative),
        ];
        let text = render_absa(&history);
        assert_eq!(
            text,
            "$T$ Saya suka program ini\nProgram Kerja\nPositif\n$T$ Kabinet gemuk\nStruktur Kabinet\nNegatif\n"
        );
    }

    #[test]
    fn test_multiline_text_stays_one_line() {
        let history = vec![
            AnnotationRecord::new(0, "Baris satu\nbaris dua\r\n  baris\ttiga", "Transparansi", Sentiment::Positive),
            AnnotationRecord::new(1, "Kabinet gemuk", "Struktur\nKabinet", Sentiment::Negative),
        ];
        let text = render_absa(&history);
        assert_eq!(text.lines().count(), 6);
        assert_eq!(
            text,
            "$T$ Baris satu baris dua baris tiga\nTransparansi\nPositif\n$T$ Kabinet gemuk\nStruktur Kabinet\nNegatif\n"
        );
    }

    #[test]
    fn test_duplicates_keep_first() {
        // 通常の履歴では起こらないが、外部から渡された場合も重複させない
        let history = vec![
            AnnotationRecord::new(0, "a", "Transparansi", Sentiment::Positive),
            AnnotationRecord::new(0, "a", "Transparansi", Sentiment::Negative),
            AnnotationRecord::new(1, "a", "Transparansi", Sentiment::Neutral),
        ];
        let text = render_absa(&history);
        assert_eq!(text.lines().count(), 6);
        assert!(text.starts_with("$T$ a\nTransparansi\nPositif\n"));
        assert!(!text.contains("Negatif"));
    }
}
