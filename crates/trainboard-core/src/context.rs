//! The form state manager.
//!
//! `AppContext` owns the form, the local record store, the task ledger and
//! the notice list. Every UI handler goes through it; nothing lives in
//! globals. Asynchronous work is split into a `begin_*` call that hands
//! back a task handle and a `complete_*` call that reports the outcome.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::error::TrainboardError;
use crate::form::{layout_for, FormState, Section};
use crate::models::{
    Document, DocumentId, InputRecord, KEY_IMPROVEMENT, KEY_MODEL_TUNING, KEY_NAME,
};
use crate::store::{DocumentStore, KeyValueStore, LocalRecordStore};
use crate::summary::Summary;
use crate::task::{NoticeLevel, Notices, TaskId, TaskKind, TaskLedger, TaskStatus};
use crate::training::{self, TrainingResponse, DEFAULT_TRAINING_ENDPOINT};

/// Client-side configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where `create_model` requests go. `None` runs the simulation instead.
    pub training_endpoint: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            training_endpoint: Some(DEFAULT_TRAINING_ENDPOINT.to_string()),
        }
    }
}

impl AppConfig {
    pub fn simulated() -> Self {
        Self {
            training_endpoint: None,
        }
    }

    fn endpoint(&self) -> Option<&str> {
        self.training_endpoint
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// A training request ready to be sent.
#[derive(Debug, Clone)]
pub struct TrainingRequest {
    pub task: TaskId,
    pub endpoint: String,
    pub record: InputRecord,
}

/// A finalized submission waiting to be written to `model_db`.
#[derive(Debug, Clone)]
pub struct PendingDocument {
    pub task: TaskId,
    pub document: Document,
}

pub struct AppContext<K: KeyValueStore> {
    form: FormState,
    records: LocalRecordStore<K>,
    tasks: TaskLedger,
    notices: Notices,
    config: AppConfig,
    initialized: bool,
}

impl<K: KeyValueStore> AppContext<K> {
    pub fn new(backend: K, config: AppConfig) -> Self {
        Self {
            form: FormState::new(),
            records: LocalRecordStore::new(backend),
            tasks: TaskLedger::new(),
            notices: Notices::default(),
            config,
            initialized: false,
        }
    }

    // ─── Lifecycle ───────────────────────────────────────────────────────

    /// Hide every panel, then restore the last extracted record if any.
    pub fn initialize(&mut self) {
        self.form.hide_all_panels();
        if let Some(record) = self.load_record() {
            let updated = self.form.populate(&record);
            debug!(updated, "Restored form from local store");
        }
        self.initialized = true;
        info!("Form initialized");
    }

    /// Abandon pending tasks. Returns how many were still in flight.
    pub fn teardown(&mut self) -> usize {
        let abandoned = self.tasks.abandon_pending();
        if abandoned > 0 {
            warn!(abandoned, "Tearing down with tasks in flight");
        }
        self.initialized = false;
        abandoned
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    // ─── Panels ──────────────────────────────────────────────────────────

    /// Show the hyperparameter panel for `model_type`. Unknown keys leave
    /// every panel hidden.
    pub fn select_model(&mut self, model_type: &str) {
        if let Err(e) = self.form.show_model(model_type) {
            warn!("select_model: {}", e);
        }
    }

    /// Show the feature panel of the dataset currently in the selector.
    pub fn select_dataset(&mut self) {
        let dataset = self.form.show_features();
        debug!(dataset = %dataset, "Showing features");
    }

    /// Swap model buttons and result container for the chosen dataset.
    /// Titanic is classification: linear regression is unavailable, the
    /// decision tree is picked, and accuracy replaces loss.
    pub fn on_dataset_change(&mut self, selected: &str) {
        let Some((buttons, view)) = layout_for(selected) else {
            debug!(selected, "No layout for dataset");
            return;
        };
        self.form.set_buttons(buttons);
        self.form.set_result_view(view);
        if !buttons.linear {
            self.select_model("decision");
        }
    }

    /// The selector's change event: update its value, then run both
    /// change handlers.
    pub fn change_dataset(&mut self, value: &str) {
        match value.parse() {
            Ok(dataset) => {
                self.form.set_dataset(dataset);
                self.select_dataset();
                self.on_dataset_change(value);
            }
            Err(e) => warn!("change_dataset: {}", e),
        }
    }

    pub fn show_section(&mut self, section: Section) {
        self.form.show_section(section);
    }

    // ─── Extraction ──────────────────────────────────────────────────────

    /// Capture the form and replace the local record with it.
    pub fn extract(&mut self) -> InputRecord {
        let record = self.form.capture_inputs();
        self.persist(&record);
        debug!(?record, "Extracted inputs");
        record
    }

    /// Capture dataset, active hyperparameters and model label without
    /// persisting. This is the training request body.
    pub fn extract_hyperparameters(&self) -> InputRecord {
        self.form.capture_hyperparameters()
    }

    // ─── Submission ──────────────────────────────────────────────────────

    pub fn finalize_submission(&mut self) -> PendingDocument {
        self.finalize_submission_at(Utc::now())
    }

    /// Merge the submission fields into the last record, persist it, and
    /// switch to the leaderboard. The returned document still has to be
    /// written; report the result with [`complete_document_write`].
    ///
    /// [`complete_document_write`]: Self::complete_document_write
    pub fn finalize_submission_at(&mut self, time: DateTime<Utc>) -> PendingDocument {
        let mut record = self.load_record().unwrap_or_default();
        record.insert(KEY_NAME, self.form.submission.name.clone());
        record.insert(KEY_MODEL_TUNING, self.form.submission.model_tuning.clone());
        record.insert(KEY_IMPROVEMENT, self.form.submission.improvement.clone());
        self.persist(&record);

        let task = self.tasks.begin(TaskKind::DocumentWrite);
        let document = Document::new(DocumentId::at(time), record);
        info!(id = %document.id, task = %task, "Submission finalized");

        self.form.show_section(Section::Leaderboard);
        PendingDocument { task, document }
    }

    pub fn complete_document_write(&mut self, task: TaskId, outcome: crate::Result<()>) {
        self.finish_task(task, outcome.map_err(|e| e.to_string()));
    }

    /// Finalize and write straight into a synchronous store.
    pub fn submit_to<D: DocumentStore>(&mut self, store: &mut D) -> PendingDocument {
        self.submit_to_at(store, Utc::now())
    }

    pub fn submit_to_at<D: DocumentStore>(
        &mut self,
        store: &mut D,
        time: DateTime<Utc>,
    ) -> PendingDocument {
        let pending = self.finalize_submission_at(time);
        let outcome = store.put(pending.document.clone());
        self.complete_document_write(pending.task, outcome);
        pending
    }

    // ─── Training ────────────────────────────────────────────────────────

    /// Run a simulated training and render its results.
    pub fn run_training_simulation<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let run = training::simulate(rng);
        self.form.set_chart(run.chart());
        self.form.set_accuracy_text(training::format_metric(run.accuracy));
        self.form.set_loss_text(training::format_metric(run.loss));
        info!(points = run.losses.len(), "Simulated training run");
    }

    /// Build a remote training request, or `None` when no endpoint is
    /// configured.
    pub fn begin_remote_training(&mut self) -> Option<TrainingRequest> {
        let endpoint = self.config.endpoint()?.to_string();
        let record = self.extract_hyperparameters();
        let task = self.tasks.begin(TaskKind::Training);
        info!(task = %task, endpoint = %endpoint, "Training request started");
        Some(TrainingRequest {
            task,
            endpoint,
            record,
        })
    }

    /// Train remotely when an endpoint is configured, else simulate.
    pub fn start_training<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<TrainingRequest> {
        let request = self.begin_remote_training();
        if request.is_none() {
            self.run_training_simulation(rng);
        }
        request
    }

    /// Render a training response. Failures are logged and shown as a
    /// notice; nothing is retried.
    pub fn complete_remote_training(
        &mut self,
        task: TaskId,
        outcome: crate::Result<TrainingResponse>,
    ) {
        match outcome {
            Ok(response) => {
                self.form.set_chart(response.chart());
                self.form
                    .set_visible_result_text(training::format_metric(response.mse));
                self.finish_task(task, Ok(()));
            }
            Err(e) => self.finish_task(task, Err(e.to_string())),
        }
    }

    // ─── Summary ─────────────────────────────────────────────────────────

    pub fn render_summary(&mut self) -> Summary {
        let record = self.load_record().unwrap_or_default();
        Summary::from_record(&record)
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FormState {
        &mut self.form
    }

    pub fn records(&self) -> &LocalRecordStore<K> {
        &self.records
    }

    pub fn tasks(&self) -> &TaskLedger {
        &self.tasks
    }

    pub fn task_status(&self, task: TaskId) -> Option<&TaskStatus> {
        self.tasks.status(task)
    }

    pub fn notices(&self) -> &Notices {
        &self.notices
    }

    pub fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) -> u64 {
        self.notices.push(level, message)
    }

    pub fn dismiss_notice(&mut self, id: u64) {
        self.notices.dismiss(id);
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: AppConfig) {
        self.config = config;
    }

    // ─── Internals ───────────────────────────────────────────────────────

    /// Load the stored record; corrupt state is reported and treated as
    /// absent.
    fn load_record(&mut self) -> Option<InputRecord> {
        match self.records.load() {
            Ok(record) => record,
            Err(e @ TrainboardError::CorruptState(_)) => {
                error!("{}", e);
                self.notices.push(
                    NoticeLevel::Warning,
                    "Saved form data was unreadable and has been ignored.",
                );
                None
            }
            Err(e) => {
                error!("Failed to read local store: {}", e);
                self.notices
                    .push(NoticeLevel::Warning, format!("Could not read saved form data: {}", e));
                None
            }
        }
    }

    fn persist(&mut self, record: &InputRecord) {
        if let Err(e) = self.records.save(record) {
            error!("Failed to save record: {}", e);
            self.notices
                .push(NoticeLevel::Warning, format!("Could not save form data: {}", e));
        }
    }

    fn finish_task(&mut self, task: TaskId, outcome: std::result::Result<(), String>) {
        let failure = outcome.as_ref().err().cloned();
        match self.tasks.finish(task, outcome) {
            Ok(kind) => {
                if let Some(msg) = failure {
                    error!(task = %task, "{} failed: {}", kind, msg);
                    self.notices
                        .push(NoticeLevel::Error, format!("The {} failed: {}", kind, msg));
                } else {
                    debug!(task = %task, "{} finished", kind);
                }
            }
            Err(e) => warn!("Ignoring completion: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryKeyValueStore;

    fn context() -> AppContext<MemoryKeyValueStore> {
        let mut ctx = AppContext::new(MemoryKeyValueStore::new(), AppConfig::simulated());
        ctx.initialize();
        ctx
    }

    #[test]
    fn test_select_model_switches_panels() {
        let mut ctx = context();
        ctx.select_model("linear");
        ctx.select_model("neural");
        assert_eq!(ctx.form().active_model(), Some(crate::ModelType::Neural));

        ctx.select_model("unknown");
        assert_eq!(ctx.form().active_model(), None);
    }

    #[test]
    fn test_change_dataset_shows_features() {
        let mut ctx = context();
        ctx.change_dataset("boston");
        assert_eq!(ctx.form().active_features(), Some(crate::Dataset::Boston));

        ctx.change_dataset("iris");
        assert_eq!(ctx.form().active_features(), Some(crate::Dataset::Boston));
    }

    #[test]
    fn test_extract_hyperparameters_does_not_persist() {
        let mut ctx = context();
        ctx.select_model("linear");
        let record = ctx.extract_hyperparameters();
        assert_eq!(record.text("modelType").as_deref(), Some("Linear Regression"));
        assert!(ctx.records().load().unwrap().is_none());
    }

    #[test]
    fn test_start_training_without_endpoint_simulates() {
        use rand::rngs::SmallRng;
        use rand::SeedableRng;

        let mut ctx = context();
        let mut rng = SmallRng::seed_from_u64(1);
        assert!(ctx.start_training(&mut rng).is_none());
        assert_eq!(ctx.form().chart().unwrap().len(), 100);
        assert!(ctx.form().loss_text().is_some());
        assert!(ctx.form().accuracy_text().is_some());
    }

    #[test]
    fn test_blank_endpoint_counts_as_unset() {
        let mut ctx = AppContext::new(
            MemoryKeyValueStore::new(),
            AppConfig {
                training_endpoint: Some("  ".into()),
            },
        );
        assert!(ctx.begin_remote_training().is_none());
    }

    #[test]
    fn test_teardown_abandons_pending() {
        let mut ctx = AppContext::new(MemoryKeyValueStore::new(), AppConfig::default());
        ctx.initialize();
        let request = ctx.begin_remote_training().unwrap();
        assert_eq!(ctx.teardown(), 1);
        assert_eq!(ctx.task_status(request.task), Some(&TaskStatus::Abandoned));
        assert!(!ctx.is_initialized());

        // Late completions are ignored.
        ctx.complete_remote_training(request.task, Err(TrainboardError::Network("late".into())));
        assert!(ctx.notices().is_empty());
    }
}
