//! スナップショット保存・読み込みの統合テスト

use absa_annotator::error::AnnotatorError;
use absa_annotator::persistence::{self, SnapshotWriter};
use absa_annotator_common::{
    AnnotationRecord, Intent, ItemStore, LabelEntry, Sentiment, SessionContext, SessionState, SourceTable, Vocabulary,
};
use tempfile::tempdir;

fn fixture() -> (ItemStore, Vocabulary) {
    let items = ItemStore::load(vec![SourceTable::new(
        "kebijakan.csv",
        Some("Kebijakan Pemerintah".into()),
        vec![
            "Saya suka program ini".into(),
            "Kebijakan baru membingungkan".into(),
            "Menteri kurang responsif".into(),
        ],
    )])
    .expect("fixture load");
    let vocab = Vocabulary::new(["Kebijakan Pemerintah", "Kompetensi Menteri", "Transparansi"]);
    (items, vocab)
}

#[test]
fn test_missing_file_yields_new_session() {
    let dir = tempdir().expect("Failed to create temp dir");
    let state = persistence::load_state(&dir.path().join("annotation_state.json")).unwrap();
    assert_eq!(state, SessionState::new());
}

#[test]
fn test_save_and_load_roundtrip() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("nested").join("annotation_state.json");
    let (items, vocab) = fixture();
    let ctx = SessionContext::new(&items, &vocab);

    let mut state = SessionState::new();
    state
        .apply(&ctx, Intent::AddLabel(LabelEntry::new("Kompetensi Menteri", Sentiment::Negative)))
        .unwrap();
    state
        .apply(&ctx, Intent::AddLabel(LabelEntry::new("Kebijakan Pemerintah", Sentiment::Positive)))
        .unwrap();
    state.apply(&ctx, Intent::Complete { pending: None }).unwrap();
    state
        .apply(&ctx, Intent::AddLabel(LabelEntry::new("Transparansi", Sentiment::Neutral)))
        .unwrap();

    persistence::save_snapshot(&path, &state.to_snapshot()).unwrap();
    assert!(!path.with_file_name("annotation_state.json.tmp").exists());

    let restored = persistence::load_state(&path).unwrap();
    assert_eq!(restored, state);

    // 台帳の挿入順が保たれる
    let aspects: Vec<&str> = restored.ledger().entries(0).iter().map(|e| e.aspect.as_str()).collect();
    assert_eq!(aspects, vec!["Kompetensi Menteri", "Kebijakan Pemerintah"]);
}

#[test]
fn test_snapshot_json_layout() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("annotation_state.json");
    let (items, vocab) = fixture();
    let ctx = SessionContext::new(&items, &vocab);

    let mut state = SessionState::new();
    state.add_label(&ctx, "Transparansi", Sentiment::Negative).unwrap();
    state.complete_current(&ctx, state.ledger().snapshot(0)).unwrap();
    persistence::save_snapshot(&path, &state.to_snapshot()).unwrap();

    let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["current_index"], 1);
    assert_eq!(json["completed_tweets"], serde_json::json!([0]));
    assert_eq!(json["annotations"][0]["tweet_id"], 1);
    assert_eq!(json["annotations"][0]["aspek"], "Transparansi");
    assert_eq!(json["annotations"][0]["sentimen"], "Negatif");
    assert_eq!(json["current_aspects"]["item_0"]["Transparansi"], "Negatif");
}

#[test]
fn test_load_legacy_snapshot() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("annotation_state.json");
    std::fs::write(
        &path,
        r#"{
            "current_index": 2,
            "annotations": [
                {"tweet_id": 1, "tweet": "Saya suka program ini", "aspek": "Kebijakan Pemerintah", "sentimen": "Positif"},
                {"tweet_id": 2, "tweet": "Kebijakan baru membingungkan", "aspek": "Transparansi", "sentimen": "Negatif"}
            ],
            "completed_tweets": [0, 1],
            "current_aspects": {
                "tweet_0": {"Kebijakan Pemerintah": "Positif"},
                "tweet_1": {"Transparansi": "Negatif"},
                "tweet_2": {"Kompetensi Menteri": "Netral"}
            }
        }"#,
    )
    .unwrap();

    let state = persistence::load_state(&path).unwrap();
    assert_eq!(state.cursor(), 2);
    assert_eq!(state.history().len(), 2);
    assert_eq!(state.history()[1], AnnotationRecord::new(1, "Kebijakan baru membingungkan", "Transparansi", Sentiment::Negative));
    assert_eq!(state.completed().iter().copied().collect::<Vec<_>>(), vec![0, 1]);
    assert_eq!(state.ledger().get(2, "Kompetensi Menteri"), Some(Sentiment::Neutral));
}

#[test]
fn test_corrupt_snapshot_is_error() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("annotation_state.json");
    std::fs::write(&path, "{ not json").unwrap();

    let result = persistence::load_state(&path);
    assert!(matches!(result, Err(AnnotatorError::JsonParse(_))));
    // 壊れたファイルは消さない
    assert!(path.exists());
}

#[test]
fn test_remove_state() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("annotation_state.json");
    persistence::save_snapshot(&path, &SessionState::new().to_snapshot()).unwrap();

    assert!(persistence::remove_state(&path).unwrap());
    assert!(!persistence::remove_state(&path).unwrap());
}

#[tokio::test]
async fn test_writer_keeps_submission_order() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("annotation_state.json");
    let (items, vocab) = fixture();
    let ctx = SessionContext::new(&items, &vocab);

    let writer = SnapshotWriter::spawn(path.clone());
    let mut state = SessionState::new();
    for round in 0..50 {
        let intent = match round % 3 {
            0 => Intent::Next,
            1 => Intent::Previous,
            _ => Intent::AddLabel(LabelEntry::new("Transparansi", Sentiment::ALL[(round / 3) % 3])),
        };
        if state.apply(&ctx, intent).unwrap().changed {
            writer.submit(state.to_snapshot()).unwrap();
        }
    }
    state.apply(&ctx, Intent::Navigate(2)).unwrap();
    writer.submit(state.to_snapshot()).unwrap();

    writer.flush().await.unwrap();
    assert_eq!(persistence::load_state(&path).unwrap(), state);

    writer.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_writer_reports_failure_on_flush() {
    let dir = tempdir().expect("Failed to create temp dir");
    // ディレクトリと同名のファイルがあるため親ディレクトリを作れない
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "x").unwrap();

    let writer = SnapshotWriter::spawn(blocker.join("annotation_state.json"));
    writer.submit(SessionState::new().to_snapshot()).unwrap();
    assert!(writer.flush().await.is_err());

    // エラーは一度報告されたらリセットされる
    assert!(writer.flush().await.is_ok());
    writer.shutdown().await.unwrap();
}
