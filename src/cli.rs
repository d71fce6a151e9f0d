use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "absa-annotator")]
#[command(about = "ツイート向けアスペクト感情アノテーションツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 設定ファイル（省略時: ~/.config/absa-annotator/config.json）
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 対話式でアノテーション
    Annotate {
        /// スナップショットファイル（省略時は設定値）
        #[arg(short, long)]
        state: Option<PathBuf>,
    },

    /// 進捗と集計を表示
    Status {
        /// スナップショットファイル
        #[arg(short, long)]
        state: Option<PathBuf>,
    },

    /// アノテーション結果を出力
    Export {
        /// スナップショットファイル
        #[arg(short, long)]
        state: Option<PathBuf>,

        /// 出力形式 (csv/json/txt/xlsx/all)
        #[arg(short, long, default_value = "all")]
        format: ExportFormat,

        /// 出力ファイル/ディレクトリ（省略時は設定の export_dir）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// リモートシートにも送信
        #[arg(long)]
        remote: bool,
    },

    /// すべてのアノテーションを削除
    Clear {
        /// スナップショットファイル
        #[arg(short, long)]
        state: Option<PathBuf>,

        /// 確認なしで削除
        #[arg(short, long)]
        yes: bool,

        /// エクスポート済みファイルは残す
        #[arg(long)]
        keep_exports: bool,
    },

    /// 設定を表示/編集
    Config {
        /// アノテーター名を設定
        #[arg(long)]
        set_annotator: Option<String>,

        /// データセットを追加（PATH または PATH=カテゴリ）
        #[arg(long)]
        add_source: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
    Txt,
    Excel,
    #[default]
    All,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "txt" | "absa" => Ok(ExportFormat::Txt),
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            "all" => Ok(ExportFormat::All),
            _ => Err(format!("Unknown format: {}. Use csv, json, txt, xlsx, or all", s)),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Txt => "txt",
            ExportFormat::Excel => "xlsx",
            ExportFormat::All => "all",
        };
        write!(f, "{}", name)
    }
}
