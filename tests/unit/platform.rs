use super::*;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("storycard-platform-{}-{name}", std::process::id()))
}

#[test]
fn cancel_token_is_shared_between_clones() {
    let token = CancelToken::new();
    let other = token.clone();
    assert!(token.check("export").is_ok());
    other.cancel();
    assert!(matches!(token.check("export"), Err(StoryError::Cancelled(_))));
}

#[test]
fn file_draft_store_round_trips_and_clears() {
    let path = temp_path("draft.json");
    let mut store = JsonFileDraftStore::new(&path);
    assert_eq!(store.load().unwrap(), None);

    let blob = serde_json::json!({ "v": 1, "templateId": "classic" });
    store.save(&blob).unwrap();
    assert_eq!(store.load().unwrap(), Some(blob));

    store.clear().unwrap();
    assert_eq!(store.load().unwrap(), None);
    store.clear().unwrap();
}

#[test]
fn corrupt_draft_file_reads_as_absent() {
    let path = temp_path("corrupt.json");
    std::fs::write(&path, "{ not json").unwrap();
    assert_eq!(JsonFileDraftStore::new(&path).load().unwrap(), None);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn activity_source_accepts_object_or_array() {
    let path = temp_path("activities.json");
    std::fs::write(&path, r#"[{ "id": 1, "type": "Run" }, { "id": "b", "type": "Yoga" }]"#).unwrap();
    let source = JsonFileActivitySource::new(&path);
    assert_eq!(source.activity("b").unwrap().kind, "Yoga");
    assert!(matches!(source.activity("zzz"), Err(StoryError::Validation(_))));

    std::fs::write(&path, r#"{ "id": 7, "type": "Ride" }"#).unwrap();
    assert_eq!(source.activity("7").unwrap().kind, "Ride");
    let _ = std::fs::remove_file(&path);
}

#[test]
fn share_sink_rejects_missing_files() {
    let mut sink = CollectingShareSink::default();
    assert!(sink.share(Path::new("/nonexistent/out.png"), "image/png").is_err());
    assert!(sink.shared.is_empty());
}
