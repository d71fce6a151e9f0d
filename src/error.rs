use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnnotatorError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("データセット読み込みエラー: {0}")]
    Dataset(String),

    #[error("Excel読み込みエラー: {0}")]
    Xlsx(String),

    #[error("CSVエラー: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("リモート送信エラー: {0}")]
    RemoteSink(String),

    #[error("入力エラー: {0}")]
    Prompt(String),

    #[error("ログ初期化エラー: {0}")]
    Logging(String),

    #[error("保存タスクが停止しています")]
    WriterClosed,

    #[error(transparent)]
    Common(#[from] absa_annotator_common::Error),
}

pub type Result<T> = std::result::Result<T, AnnotatorError>;
