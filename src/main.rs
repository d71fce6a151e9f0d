use absa_annotator::{annotate, cli, config, dataset, error, export, logging, persistence};
use absa_annotator_common::Summary;
use cli::{Cli, Commands};
use clap::Parser;
use config::{Config, SourceConfig};
use dialoguer::Confirm;
use error::{AnnotatorError, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Annotate { state } => {
            println!("📝 absa-annotator - アノテーション\n");
            let state_path = state.unwrap_or_else(|| config.state_file.clone());
            annotate::run_interactive(&config, &state_path).await?;
        }

        Commands::Status { state } => {
            let state_path = state.unwrap_or_else(|| config.state_file.clone());
            let session = persistence::load_state(&state_path)?;

            let total_items = match dataset::load_items(&config.sources, &config.text_column) {
                Ok(items) => items.len(),
                Err(e) => {
                    tracing::warn!("データセットを読み込めないため総数は不明です: {}", e);
                    0
                }
            };
            let summary = Summary::from_history(session.history(), total_items);
            print_summary(&summary, &state_path);
        }

        Commands::Export { state, format, output, remote } => {
            println!("📄 absa-annotator - エクスポート\n");

            let state_path = state.unwrap_or_else(|| config.state_file.clone());
            let session = persistence::load_state(&state_path)?;
            let history = session.history();

            if history.is_empty() {
                println!("⚠ 確定済みのアノテーションがありません（ヘッダーのみ出力します）");
            }

            let output = output.unwrap_or_else(|| config.export_dir.clone());
            let written = export::export_results(history, &format, &output)?;
            for path in &written {
                println!("✔ {}", path.display());
            }

            if remote {
                let remote_config = config
                    .remote
                    .as_ref()
                    .ok_or_else(|| AnnotatorError::Config("remote が設定されていません".into()))?;
                let sink = export::remote::HttpSink::new(remote_config, config.remote_token())?;

                println!("\n☁ リモートへ送信中...");
                let progress = ProgressBar::new(history.len() as u64);
                progress.set_style(bar_style());
                let report = export::remote::export_remote(
                    history,
                    &config.annotator,
                    export::remote::timestamp_now,
                    &sink,
                    &progress,
                )
                .await;

                for failure in &report.failures {
                    println!(
                        "  ✗ tweet {} / {}: {}",
                        failure.tweet_id, failure.aspect, failure.message
                    );
                }
                let appended = report.into_result()?;
                println!("✔ リモートに{}件送信しました", appended);
            }

            println!("\n✅ エクスポート完了 ({}件)", history.len());
        }

        Commands::Clear { state, yes, keep_exports } => {
            let state_path = state.unwrap_or_else(|| config.state_file.clone());

            if !yes {
                let confirmed = Confirm::new()
                    .with_prompt("すべてのアノテーションを削除します。よろしいですか？")
                    .default(false)
                    .interact()
                    .map_err(|e| AnnotatorError::Prompt(e.to_string()))?;
                if !confirmed {
                    println!("中止しました");
                    return Ok(());
                }
            }

            let export_files = if keep_exports {
                Vec::new()
            } else {
                export::default_export_paths(&config.export_dir)
            };
            let report = persistence::clear_session(&state_path, &export_files)?;
            for path in &report.removed {
                println!("  - {}", path.display());
            }
            println!("✔ アノテーションをすべて削除しました ({}件)", report.records_cleared);
        }

        Commands::Config { set_annotator, add_source, show } => {
            let mut config = config;
            let mut changed = false;

            if let Some(name) = set_annotator {
                config.annotator = name.trim().to_string();
                changed = true;
                println!("✔ アノテーター名を設定しました: {}", config.annotator);
            }

            if let Some(spec) = add_source {
                let source: SourceConfig = spec.parse()?;
                println!("✔ データセットを追加しました: {}", source.path.display());
                config.sources.push(source);
                changed = true;
            }

            if changed {
                let path = config.save(cli.config.as_deref())?;
                tracing::info!(path = %path.display(), "設定を保存しました");
            }

            if show || !changed {
                print_config(&config);
            }
        }
    }

    Ok(())
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}").unwrap_or_else(|_| ProgressStyle::default_bar())
}

fn print_summary(summary: &Summary, state_path: &Path) {
    println!("📊 アノテーション集計 ({})\n", state_path.display());

    if summary.total_items > 0 {
        let bar = ProgressBar::new(summary.total_items as u64);
        bar.set_style(bar_style());
        bar.set_position(summary.completed_items as u64);
        bar.abandon_with_message(format!("{:.1}%", summary.progress() * 100.0));
        println!("  残り: {}件", summary.remaining_items());
    } else {
        println!("  完了: {}件（全体数不明）", summary.completed_items);
    }

    println!("  ラベル総数: {}", summary.total_labels);
    println!("  アスペクト数: {}", summary.unique_aspects);

    println!("\n感情:");
    for (sentiment, count) in &summary.sentiments {
        println!("  {}: {}", sentiment, count);
    }

    if !summary.aspects.is_empty() {
        println!("\nアスペクト:");
        for (aspect, count) in &summary.aspects {
            println!("  {}: {}", aspect, count);
        }
    }
}

fn print_config(config: &Config) {
    println!("設定:");
    println!("  アノテーター: {}", config.annotator);
    println!("  アスペクト: {}", config.aspects.join(", "));
    println!("  テキスト列: {}", config.text_column);
    println!("  保存先: {}", config.state_file.display());
    println!("  出力先: {}", config.export_dir.display());
    println!("  データセット:");
    for source in &config.sources {
        match &source.category {
            Some(category) => println!("    - {} ({})", source.path.display(), category),
            None => println!("    - {}", source.path.display()),
        }
    }
    match &config.remote {
        Some(remote) => println!(
            "  リモート: {} (トークン: {})",
            remote.endpoint,
            if config.remote_token().is_some() { "設定済み" } else { "未設定" }
        ),
        None => println!("  リモート: 未設定"),
    }
}
