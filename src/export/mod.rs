pub mod remote;

use crate::cli::ExportFormat;
use crate::error::Result;
use absa_annotator_common::export::{excel_core, render_absa, render_structured, render_tabular};
use absa_annotator_common::AnnotationRecord;
use std::path::{Path, PathBuf};

const FILE_STEM: &str = "annotations";

/// 1ファイル分の出力形式
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Json,
    Txt,
    Xlsx,
}

impl FileFormat {
    /// `all` で書き出す順
    pub const ALL: [FileFormat; 4] = [FileFormat::Csv, FileFormat::Json, FileFormat::Txt, FileFormat::Xlsx];

    pub fn extension(self) -> &'static str {
        match self {
            FileFormat::Csv => "csv",
            FileFormat::Json => "json",
            FileFormat::Txt => "txt",
            FileFormat::Xlsx => "xlsx",
        }
    }
}

/// 単一形式ならその形式、`all` なら None
pub fn file_format(format: &ExportFormat) -> Option<FileFormat> {
    match format {
        ExportFormat::Csv => Some(FileFormat::Csv),
        ExportFormat::Json => Some(FileFormat::Json),
        ExportFormat::Txt => Some(FileFormat::Txt),
        ExportFormat::Excel => Some(FileFormat::Xlsx),
        ExportFormat::All => None,
    }
}

fn output_path_for_format(output: &Path, extension: &str) -> PathBuf {
    if output.is_dir() || output.extension().is_none() {
        output.join(format!("{}.{}", FILE_STEM, extension))
    } else {
        output.to_path_buf()
    }
}

fn output_paths_for_all(output: &Path) -> Vec<(FileFormat, PathBuf)> {
    let (dir, stem) = if output.is_dir() || output.extension().is_none() {
        (output.to_path_buf(), FILE_STEM.to_string())
    } else {
        let parent = output.parent().unwrap_or_else(|| Path::new("."));
        let stem = output
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(FILE_STEM);
        (parent.to_path_buf(), stem.to_string())
    };

    FileFormat::ALL
        .into_iter()
        .map(|f| (f, dir.join(format!("{}.{}", stem, f.extension()))))
        .collect()
}

/// 出力ディレクトリ内の既定エクスポートファイル
pub fn default_export_paths(dir: &Path) -> Vec<PathBuf> {
    output_paths_for_all(dir).into_iter().map(|(_, p)| p).collect()
}

fn write_one(history: &[AnnotationRecord], format: FileFormat, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    match format {
        FileFormat::Csv => std::fs::write(path, render_tabular(history)?)?,
        FileFormat::Json => std::fs::write(path, render_structured(history)?)?,
        FileFormat::Txt => std::fs::write(path, render_absa(history))?,
        FileFormat::Xlsx => std::fs::write(path, excel_core::generate_excel_buffer(history)?)?,
    }
    Ok(())
}

/// 履歴をファイルに書き出し、書き出したパスを返す
pub fn export_results(
    history: &[AnnotationRecord],
    format: &ExportFormat,
    output: &Path,
) -> Result<Vec<PathBuf>> {
    let targets = match file_format(format) {
        Some(single) => vec![(single, output_path_for_format(output, single.extension()))],
        None => output_paths_for_all(output),
    };

    let mut written = Vec::new();
    for (format, path) in targets {
        write_one(history, format, &path)?;
        tracing::info!(path = %path.display(), records = history.len(), "エクスポートしました");
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_for_format() {
        assert_eq!(
            output_path_for_format(Path::new("out"), "csv"),
            PathBuf::from("out/annotations.csv")
        );
        assert_eq!(
            output_path_for_format(Path::new("out/hasil.txt"), "txt"),
            PathBuf::from("out/hasil.txt")
        );
    }

    #[test]
    fn test_output_paths_for_all_with_file() {
        let paths = output_paths_for_all(Path::new("out/hasil.csv"));
        let names: Vec<_> = paths
            .iter()
            .map(|(_, p)| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["hasil.csv", "hasil.json", "hasil.txt", "hasil.xlsx"]);
        assert_eq!(paths[3].0, FileFormat::Xlsx);
    }

    #[test]
    fn test_file_format() {
        assert_eq!(file_format(&ExportFormat::Excel), Some(FileFormat::Xlsx));
        assert_eq!(file_format(&ExportFormat::Txt).map(FileFormat::extension), Some("txt"));
        assert_eq!(file_format(&ExportFormat::All), None);
    }
}
