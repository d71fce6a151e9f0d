use crate::error::{AnnotatorError, Result};
use absa_annotator_common::Vocabulary;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// アノテーター名を上書きする環境変数
pub const ANNOTATOR_ENV: &str = "ABSA_ANNOTATOR";
/// リモート送信のトークン
pub const REMOTE_TOKEN_ENV: &str = "ABSA_REMOTE_TOKEN";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub annotator: String,
    pub aspects: Vec<String>,
    pub sources: Vec<SourceConfig>,
    /// テキスト列名（`Cleaned_Tweet` は別名として常に受け付ける）
    pub text_column: String,
    pub state_file: PathBuf,
    pub export_dir: PathBuf,
    pub remote: Option<RemoteConfig>,
}

/// データセットのソース（ファイルまたはフォルダ）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub path: PathBuf,
    #[serde(default)]
    pub category: Option<String>,
}

impl std::str::FromStr for SourceConfig {
    type Err = AnnotatorError;

    /// `PATH` または `PATH=CATEGORY`
    fn from_str(s: &str) -> Result<Self> {
        let (path, category) = match s.split_once('=') {
            Some((path, category)) => (path.trim(), Some(category.trim().to_string())),
            None => (s.trim(), None),
        };
        if path.is_empty() {
            return Err(AnnotatorError::Config(format!("ソース指定が空です: {}", s)));
        }
        Ok(Self {
            path: PathBuf::from(path),
            category: category.filter(|c| !c.is_empty()),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// 1行ずつPOSTするエンドポイント
    pub endpoint: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_timeout() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    /// 設定を読み込む
    ///
    /// 明示パスが存在しなければエラー。既定パスが存在しなければ組み込み設定を使う。
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(AnnotatorError::FileNotFound(path.display().to_string()));
                }
                Self::read(path)?
            }
            None => {
                let default_path = Self::config_path()?;
                if default_path.exists() {
                    Self::read(&default_path)?
                } else {
                    Self::default_config()
                }
            }
        };

        if let Ok(name) = std::env::var(ANNOTATOR_ENV) {
            if !name.trim().is_empty() {
                config.annotator = name.trim().to_string();
            }
        }

        config.validate()?;
        Ok(config)
    }

    fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        tracing::debug!(path = %path.display(), "設定を読み込みました");
        Ok(config)
    }

    pub fn save(&self, path: Option<&Path>) -> Result<PathBuf> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        if let Some(parent) = config_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(config_path)
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| AnnotatorError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("absa-annotator").join("config.json"))
    }

    fn default_config() -> Self {
        let sources = [
            ("filtered_aspek_kebijakan_top100.csv", "Kebijakan Pemerintah"),
            ("filtered_aspek_kompetensi_top100.csv", "Kompetensi"),
            ("filtered_aspek_responsivitas_top100.csv", "Responsivitas"),
            ("filtered_aspek_representasi_top100.csv", "Representasi"),
            ("filtered_aspek_transparansi_top100.csv", "Transparansi"),
        ]
        .into_iter()
        .map(|(file, category)| SourceConfig {
            path: PathBuf::from("dataset").join(file),
            category: Some(category.to_string()),
        })
        .collect();

        Self {
            annotator: "annotator".into(),
            aspects: vec![
                "Kebijakan Pemerintah".into(),
                "Kompetensi Menteri".into(),
                "Fleksibilitas".into(),
                "Keterwakilan".into(),
                "Transparansi".into(),
            ],
            sources,
            text_column: "tweet".into(),
            state_file: PathBuf::from("annotation_state.json"),
            export_dir: PathBuf::from("."),
            remote: None,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.vocabulary().is_empty() {
            return Err(AnnotatorError::Config("アスペクトが1つも設定されていません".into()));
        }
        if self.text_column.trim().is_empty() {
            return Err(AnnotatorError::Config("text_column が空です".into()));
        }
        Ok(())
    }

    pub fn vocabulary(&self) -> Vocabulary {
        Vocabulary::new(&self.aspects)
    }

    /// 環境変数を優先してトークンを取得
    pub fn remote_token(&self) -> Option<String> {
        if let Ok(token) = std::env::var(REMOTE_TOKEN_ENV) {
            if !token.trim().is_empty() {
                return Some(token);
            }
        }
        self.remote.as_ref().and_then(|r| r.token.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_vocabulary() {
        let config = Config::default();
        let vocab = config.vocabulary();
        assert_eq!(vocab.len(), 5);
        assert!(vocab.contains("Transparansi"));
        assert_eq!(config.sources.len(), 5);
        assert_eq!(config.sources[0].category.as_deref(), Some("Kebijakan Pemerintah"));
    }

    #[test]
    fn test_source_from_str() {
        let source: SourceConfig = "dataset/a.csv=Transparansi".parse().unwrap();
        assert_eq!(source.path, PathBuf::from("dataset/a.csv"));
        assert_eq!(source.category.as_deref(), Some("Transparansi"));

        let source: SourceConfig = "dataset/b.csv".parse().unwrap();
        assert!(source.category.is_none());

        assert!("=x".parse::<SourceConfig>().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"annotator": "rina"}"#).expect("デシリアライズ失敗");
        assert_eq!(config.annotator, "rina");
        assert_eq!(config.text_column, "tweet");
        assert!(config.remote.is_none());
    }

    #[test]
    fn test_load_explicit_missing_path() {
        let result = Config::load(Some(Path::new("/nonexistent/absa/config.json")));
        assert!(matches!(result, Err(AnnotatorError::FileNotFound(_))));
    }

    #[test]
    fn test_validate_rejects_placeholder_only() {
        let config = Config {
            aspects: vec![Vocabulary::PLACEHOLDER.to_string()],
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
