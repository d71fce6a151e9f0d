//! リモートシート送信
//!
//! 確定履歴を1行ずつ外部シートへ追記する。ベストエフォートで、失敗した行は
//! 記録して続行する。ローカルの履歴やスナップショットには一切触れない。

use crate::config::RemoteConfig;
use crate::error::{AnnotatorError, Result};
use absa_annotator_common::AnnotationRecord;
use indicatif::ProgressBar;
use serde::Serialize;
use std::time::Duration;

/// タイムスタンプ形式
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn timestamp_now() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// 送信する1行
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteRow {
    pub tweet_id: usize,
    pub tweet: String,
    pub aspek: String,
    pub sentimen: String,
    pub annotator: String,
    pub timestamp: String,
}

impl RemoteRow {
    pub fn new(record: &AnnotationRecord, annotator: &str, timestamp: String) -> Self {
        Self {
            tweet_id: record.tweet_id(),
            tweet: record.item_text.clone(),
            aspek: record.aspect.clone(),
            sentimen: record.sentiment.label().to_string(),
            annotator: annotator.to_string(),
            timestamp,
        }
    }

    /// シートの列順 `[tweet_id, tweet, aspek, sentimen, annotator, timestamp]`
    pub fn values(&self) -> serde_json::Value {
        serde_json::json!([
            self.tweet_id,
            self.tweet,
            self.aspek,
            self.sentimen,
            self.annotator,
            self.timestamp,
        ])
    }
}

/// 追記先
#[allow(async_fn_in_trait)]
pub trait RemoteSink {
    async fn append_row(&self, row: &RemoteRow) -> Result<()>;
}

/// HTTPエンドポイントへPOSTする実装
///
/// 本文は `{"values": [[...]]}`。トークンがあればBearer認証を付ける。
pub struct HttpSink {
    client: reqwest::Client,
    endpoint: String,
    token: Option<String>,
}

impl HttpSink {
    pub fn new(config: &RemoteConfig, token: Option<String>) -> Result<Self> {
        if config.endpoint.trim().is_empty() {
            return Err(AnnotatorError::Config("remote.endpoint が空です".into()));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AnnotatorError::RemoteSink(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            token,
        })
    }
}

impl RemoteSink for HttpSink {
    async fn append_row(&self, row: &RemoteRow) -> Result<()> {
        let body = serde_json::json!({ "values": [row.values()] });
        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AnnotatorError::RemoteSink(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AnnotatorError::RemoteSink(format!("HTTP {}: {}", status, text.trim())));
        }
        Ok(())
    }
}

/// 送信失敗した行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFailure {
    pub tweet_id: usize,
    pub aspect: String,
    pub message: String,
}

/// 送信結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteReport {
    pub appended: usize,
    pub failures: Vec<RemoteFailure>,
}

impl RemoteReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn into_result(self) -> Result<usize> {
        match self.failures.first() {
            None => Ok(self.appended),
            Some(first) => Err(AnnotatorError::RemoteSink(format!(
                "{}件中{}件失敗（最初の失敗: tweet {} / {}: {}）",
                self.appended + self.failures.len(),
                self.failures.len(),
                first.tweet_id,
                first.aspect,
                first.message
            ))),
        }
    }
}

/// 履歴をリモートへ追記
pub async fn export_remote<S, F>(
    records: &[AnnotationRecord],
    annotator: &str,
    mut timestamp_fn: F,
    sink: &S,
    progress: &ProgressBar,
) -> RemoteReport
where
    S: RemoteSink,
    F: FnMut() -> String,
{
    let mut report = RemoteReport::default();
    progress.set_length(records.len() as u64);

    for record in records {
        let row = RemoteRow::new(record, annotator, timestamp_fn());
        match sink.append_row(&row).await {
            Ok(()) => report.appended += 1,
            Err(e) => {
                tracing::warn!(tweet_id = row.tweet_id, aspek = %row.aspek, "リモート送信に失敗: {}", e);
                report.failures.push(RemoteFailure {
                    tweet_id: row.tweet_id,
                    aspect: row.aspek.clone(),
                    message: e.to_string(),
                });
            }
        }
        progress.inc(1);
    }

    progress.finish_and_clear();
    report
}
