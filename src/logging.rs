//! ログ初期化
//!
//! `RUST_LOG` があればそれを優先し、なければ `-v` の有無で既定レベルを決める。
//! ユーザー向けの進捗表示は標準出力、ログは標準エラーに出す。

use crate::error::{AnnotatorError, Result};
use tracing_subscriber::EnvFilter;

const VERBOSE_FILTER: &str = "absa_annotator=debug,absa_annotator_common=debug";
const DEFAULT_FILTER: &str = "warn";

pub fn init(verbose: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER }));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| AnnotatorError::Logging(e.to_string()))
}
