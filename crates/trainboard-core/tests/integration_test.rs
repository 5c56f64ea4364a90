//! Integration tests for trainboard-core.

use chrono::{TimeZone, Utc};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tempfile::TempDir;

use trainboard_core::store::RECORD_KEY;
use trainboard_core::{
    AppConfig, AppContext, Dataset, Document, DocumentId, DocumentStore, FieldValue,
    FileDocumentStore, InputRecord, KeyValueStore, MemoryDocumentStore, MemoryKeyValueStore,
    ModelType, NoticeLevel, ResultView, Section, TaskStatus, TrainboardError, TrainingResponse,
};

fn make_context(backend: MemoryKeyValueStore) -> AppContext<MemoryKeyValueStore> {
    let mut ctx = AppContext::new(backend, AppConfig::default());
    ctx.initialize();
    ctx
}

fn stored(ctx: &AppContext<MemoryKeyValueStore>) -> InputRecord {
    ctx.records().load().unwrap().expect("a stored record")
}

/// Key/value store that refuses every write, like a full `localStorage`.
#[derive(Default)]
struct FullStore;

impl KeyValueStore for FullStore {
    fn get_item(&self, _key: &str) -> trainboard_core::Result<Option<String>> {
        Ok(None)
    }
    fn set_item(&mut self, _key: &str, _value: &str) -> trainboard_core::Result<()> {
        Err(TrainboardError::Storage("QuotaExceededError".into()))
    }
    fn remove_item(&mut self, _key: &str) -> trainboard_core::Result<()> {
        Ok(())
    }
}

#[test]
fn test_initialize_restores_stored_record() {
    let mut record = InputRecord::new();
    record.insert("dataset", "Titanic");
    record.insert("dt-max-depth", "12");
    record.insert("dt-splitter", "random");
    record.insert("titanic-age", true);
    record.insert("titanic-passenger-class", false);

    let mut backend = MemoryKeyValueStore::new();
    backend
        .set_item(RECORD_KEY, &serde_json::to_string(&record).unwrap())
        .unwrap();

    let ctx = make_context(backend);
    let form = ctx.form();
    assert_eq!(form.dataset(), Dataset::Titanic);
    assert_eq!(form.field_value("dt-max-depth"), Some("12"));
    assert_eq!(form.field_value("dt-splitter"), Some("random"));
    assert!(form.is_checked("titanic-age"));
    assert!(!form.is_checked("titanic-passenger-class"));
    // Panels stay hidden after a restore.
    assert_eq!(form.active_model(), None);
    assert_eq!(form.active_features(), None);
}

#[test]
fn test_initialize_without_record_is_noop() {
    let ctx = make_context(MemoryKeyValueStore::new());
    assert!(ctx.is_initialized());
    assert!(ctx.notices().is_empty());
    assert_eq!(ctx.form().field_value("lr-learning-rate"), Some("0.01"));
}

#[test]
fn test_corrupt_record_falls_back_to_empty() {
    let mut backend = MemoryKeyValueStore::new();
    backend.set_item(RECORD_KEY, "[1, 2").unwrap();

    let mut ctx = make_context(backend);
    assert_eq!(ctx.notices().len(), 1);
    assert_eq!(ctx.notices().iter().next().unwrap().level, NoticeLevel::Warning);

    let summary = ctx.render_summary();
    assert_eq!(summary.dataset, "");
    assert_eq!(summary.detail_lines(), vec!["None specified"]);
}

#[test]
fn test_extract_captures_only_visible_panel() {
    let mut ctx = make_context(MemoryKeyValueStore::new());
    for model in ModelType::ALL {
        ctx.select_model(model.key());
        let record = ctx.extract();
        for other in ModelType::ALL.into_iter().filter(|m| *m != model) {
            for field in trainboard_core::catalog::fields(other) {
                assert!(
                    !record.contains_key(field.id),
                    "{} leaked into {} extraction",
                    field.id,
                    model
                );
            }
        }
        for field in trainboard_core::catalog::fields(model) {
            assert!(record.contains_key(field.id));
        }
        assert_eq!(stored(&ctx), record);
    }
}

#[test]
fn test_extract_replaces_stored_record() {
    let mut ctx = make_context(MemoryKeyValueStore::new());
    ctx.select_model("neural");
    ctx.extract();
    ctx.select_model("linear");
    ctx.extract();

    let record = stored(&ctx);
    assert_eq!(record.text("modelType").as_deref(), Some("Linear Regression"));
    assert!(!record.contains_key("nn-neurons"));
}

#[test]
fn test_titanic_layout() {
    let mut ctx = make_context(MemoryKeyValueStore::new());
    ctx.select_model("linear");
    ctx.on_dataset_change("titanic");

    let form = ctx.form();
    let buttons = form.buttons();
    assert!(!buttons.linear);
    assert!(buttons.decision);
    assert!(buttons.neural);
    assert_eq!(form.result_view(), ResultView::Accuracy);
    assert_eq!(form.active_model(), Some(ModelType::Decision));
}

#[test]
fn test_regression_layouts() {
    for dataset in ["wine", "boston"] {
        let mut ctx = make_context(MemoryKeyValueStore::new());
        ctx.on_dataset_change("titanic");
        ctx.on_dataset_change(dataset);

        let buttons = ctx.form().buttons();
        assert!(buttons.linear && buttons.decision && buttons.neural);
        assert_eq!(ctx.form().result_view(), ResultView::Loss);
    }
}

#[test]
fn test_finalize_submission_writes_one_document() {
    let mut ctx = make_context(MemoryKeyValueStore::new());
    let mut docs = MemoryDocumentStore::new();

    ctx.select_model("decision");
    ctx.extract();
    ctx.form_mut().submission.name = "ada".into();
    ctx.form_mut().submission.model_tuning = "deeper tree".into();
    ctx.form_mut().submission.improvement = "more features".into();

    let t = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let pending = ctx.submit_to_at(&mut docs, t);

    assert_eq!(docs.len(), 1);
    assert_eq!(pending.document.id.as_str(), t.timestamp_millis().to_string());
    assert_eq!(ctx.task_status(pending.task), Some(&TaskStatus::Succeeded));
    assert_eq!(ctx.form().section(), Section::Leaderboard);

    let doc = docs.get(&pending.document.id).unwrap().unwrap();
    assert_eq!(doc.record.text("name").as_deref(), Some("ada"));
    assert_eq!(doc.record.text("model-tuning").as_deref(), Some("deeper tree"));
    assert_eq!(doc.record.text("improvement").as_deref(), Some("more features"));
    assert_eq!(doc.record.text("modelType").as_deref(), Some("Decision Tree"));

    // The merged record is persisted locally too.
    assert_eq!(stored(&ctx).text("name").as_deref(), Some("ada"));
}

#[test]
fn test_same_millisecond_submissions_overwrite() {
    let mut ctx = make_context(MemoryKeyValueStore::new());
    let mut docs = MemoryDocumentStore::new();
    let t = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

    ctx.form_mut().submission.name = "first".into();
    ctx.submit_to_at(&mut docs, t);
    ctx.form_mut().submission.name = "second".into();
    ctx.submit_to_at(&mut docs, t);

    let all = docs.all_docs().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].record.text("name").as_deref(), Some("second"));

    ctx.submit_to_at(&mut docs, t + chrono::Duration::milliseconds(1));
    assert_eq!(docs.len(), 2);
}

#[test]
fn test_simulated_training_renders_chart() {
    let mut ctx = make_context(MemoryKeyValueStore::new());
    let mut rng = SmallRng::seed_from_u64(99);
    ctx.run_training_simulation(&mut rng);

    let chart = ctx.form().chart().unwrap();
    assert_eq!(chart.len(), 100);
    assert_eq!(chart.title, "Loss over Time");
    assert_eq!(chart.x_title, "Iterations");
    assert_eq!(chart.y_title, "Loss");
    assert_eq!(ctx.form().loss_text().unwrap().len(), 4);
}

#[test]
fn test_remote_training_response() {
    let mut ctx = make_context(MemoryKeyValueStore::new());
    ctx.select_model("linear");
    let request = ctx.begin_remote_training().unwrap();
    assert_eq!(request.endpoint, "http://localhost:3000/create_model");
    assert_eq!(
        request.record.get("modelType"),
        Some(&FieldValue::from("Linear Regression"))
    );
    assert_eq!(ctx.task_status(request.task), Some(&TaskStatus::Pending));

    let response = TrainingResponse::parse(r#"{"losses":[3.1,2.0,1.2],"mse":1.23456}"#);
    ctx.complete_remote_training(request.task, response);

    assert_eq!(ctx.form().loss_text(), Some("1.23"));
    assert_eq!(ctx.form().chart().unwrap().len(), 3);
    assert_eq!(ctx.task_status(request.task), Some(&TaskStatus::Succeeded));
}

#[test]
fn test_remote_training_failure_raises_notice() {
    let mut ctx = make_context(MemoryKeyValueStore::new());
    let request = ctx.begin_remote_training().unwrap();
    ctx.complete_remote_training(
        request.task,
        Err(TrainboardError::Network("connection refused".into())),
    );

    assert!(ctx.form().chart().is_none());
    assert!(matches!(ctx.task_status(request.task), Some(TaskStatus::Failed(_))));
    let notice = ctx.notices().iter().next().unwrap();
    assert_eq!(notice.level, NoticeLevel::Error);
    assert!(notice.message.contains("connection refused"));
}

#[test]
fn test_overlapping_training_requests_complete_independently() {
    let mut ctx = make_context(MemoryKeyValueStore::new());
    let first = ctx.begin_remote_training().unwrap();
    let second = ctx.begin_remote_training().unwrap();
    assert_eq!(ctx.tasks().pending_count(), 2);

    let late = TrainingResponse {
        losses: vec![0.5],
        mse: 0.5,
    };
    let early = TrainingResponse {
        losses: vec![0.9, 0.7],
        mse: 0.7,
    };
    ctx.complete_remote_training(second.task, Ok(early));
    ctx.complete_remote_training(first.task, Ok(late));

    // Last completion wins the display.
    assert_eq!(ctx.form().loss_text(), Some("0.50"));
    assert_eq!(ctx.tasks().pending_count(), 0);
}

#[test]
fn test_storage_failure_is_recoverable() {
    let mut ctx = AppContext::new(FullStore, AppConfig::simulated());
    ctx.initialize();
    ctx.select_model("neural");

    let record = ctx.extract();
    assert_eq!(record.text("modelType").as_deref(), Some("Neural Network"));
    assert_eq!(ctx.notices().len(), 1);
}

#[test]
fn test_file_document_store() {
    let tmp = TempDir::new().unwrap();
    let mut store = FileDocumentStore::open(tmp.path()).unwrap();
    assert!(store.dir().ends_with("model_db"));

    let mut ctx = make_context(MemoryKeyValueStore::new());
    ctx.form_mut().submission.name = "grace".into();
    let t = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
    let pending = ctx.submit_to_at(&mut store, t);

    let path = store.dir().join(format!("{}.json", pending.document.id));
    assert!(path.exists());

    let reopened = FileDocumentStore::open(tmp.path()).unwrap();
    let docs = reopened.all_docs().unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].record.text("name").as_deref(), Some("grace"));

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(raw["_id"], pending.document.id.as_str());
}

#[test]
fn test_file_store_ignores_record_id() {
    let tmp = TempDir::new().unwrap();
    let mut store = FileDocumentStore::open(tmp.path()).unwrap();

    let mut record = InputRecord::new();
    record.insert("_id", "spoof");
    record.insert("name", "ada");
    store
        .put(Document {
            id: DocumentId::from("1000"),
            record,
        })
        .unwrap();

    let doc = store.get(&DocumentId::from("1000")).unwrap().unwrap();
    assert_eq!(doc.id.as_str(), "1000");
    assert!(!doc.record.contains_key("_id"));
    assert_eq!(store.all_docs().unwrap().len(), 1);
}

#[test]
fn test_remote_mse_rounds_half_up() {
    let mut ctx = make_context(MemoryKeyValueStore::new());
    let request = ctx.begin_remote_training().unwrap();
    ctx.complete_remote_training(
        request.task,
        TrainingResponse::parse(r#"{"losses":[1.0],"mse":0.125}"#),
    );
    assert_eq!(ctx.form().loss_text(), Some("0.13"));
}
