//! The training form as plain state.
//!
//! `FormState` stands in for the page markup: it knows which hyperparameter
//! and feature panel is active, what every field holds, which model buttons
//! and result containers are showing, and which page section is visible.
//! Extraction reads the active panel from here rather than from layout.

use std::collections::{BTreeMap, BTreeSet};

use crate::catalog;
use crate::error::Result;
use crate::models::{
    Dataset, InputRecord, ModelType, ProblemKind, KEY_DATASET, KEY_LOSS, KEY_MODEL_TYPE,
    KEY_TEST_ACCURACY,
};
use crate::training::ChartSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Section {
    #[default]
    Train,
    Share,
    Leaderboard,
}

impl Section {
    pub fn id(self) -> &'static str {
        match self {
            Section::Train => "train",
            Section::Share => "share",
            Section::Leaderboard => "leaderboard",
        }
    }
}

/// Which result container is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultView {
    #[default]
    Loss,
    Accuracy,
}

impl ResultView {
    pub fn container_id(self) -> &'static str {
        match self {
            ResultView::Loss => "loss-container",
            ResultView::Accuracy => "test-accuracy-container",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelButtons {
    pub linear: bool,
    pub decision: bool,
    pub neural: bool,
}

impl ModelButtons {
    pub fn all() -> Self {
        Self {
            linear: true,
            decision: true,
            neural: true,
        }
    }

    pub fn is_visible(&self, model: ModelType) -> bool {
        match model {
            ModelType::Linear => self.linear,
            ModelType::Decision => self.decision,
            ModelType::Neural => self.neural,
        }
    }
}

impl Default for ModelButtons {
    fn default() -> Self {
        Self::all()
    }
}

/// Free-text fields of the "submit result" step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionFields {
    /// `name-field`
    pub name: String,
    /// `model-tuning-field`
    pub model_tuning: String,
    /// `model-improvement-field`
    pub improvement: String,
}

#[derive(Debug, Clone)]
pub struct FormState {
    dataset: Dataset,
    active_model: Option<ModelType>,
    active_features: Option<Dataset>,
    values: BTreeMap<String, String>,
    checked: BTreeSet<String>,
    buttons: ModelButtons,
    result_view: ResultView,
    accuracy_text: Option<String>,
    loss_text: Option<String>,
    chart: Option<ChartSpec>,
    section: Section,
    pub submission: SubmissionFields,
}

impl Default for FormState {
    fn default() -> Self {
        Self::new()
    }
}

impl FormState {
    /// Fresh page: first dataset option selected, every field at its
    /// default, loss container showing.
    pub fn new() -> Self {
        let values = ModelType::ALL
            .into_iter()
            .flat_map(catalog::fields)
            .map(|f| (f.id.to_string(), f.default.to_string()))
            .collect();
        Self {
            dataset: Dataset::Wine,
            active_model: None,
            active_features: None,
            values,
            checked: BTreeSet::new(),
            buttons: ModelButtons::all(),
            result_view: ResultView::Loss,
            accuracy_text: None,
            loss_text: None,
            chart: None,
            section: Section::Train,
            submission: SubmissionFields::default(),
        }
    }

    // ─── Visibility ──────────────────────────────────────────────────────

    pub fn hide_all_panels(&mut self) {
        self.active_model = None;
        self.active_features = None;
    }

    /// Hide every hyperparameter panel, then show the one for `model_type`.
    /// An unknown key leaves all of them hidden.
    pub fn show_model(&mut self, model_type: &str) -> Result<ModelType> {
        self.active_model = None;
        let model = model_type.parse::<ModelType>()?;
        self.active_model = Some(model);
        Ok(model)
    }

    /// Hide every feature panel, then show the selected dataset's.
    pub fn show_features(&mut self) -> Dataset {
        self.active_features = Some(self.dataset);
        self.dataset
    }

    pub fn set_buttons(&mut self, buttons: ModelButtons) {
        self.buttons = buttons;
    }

    pub fn set_result_view(&mut self, view: ResultView) {
        self.result_view = view;
    }

    pub fn show_section(&mut self, section: Section) {
        self.section = section;
    }

    pub fn active_model(&self) -> Option<ModelType> {
        self.active_model
    }

    pub fn active_features(&self) -> Option<Dataset> {
        self.active_features
    }

    pub fn is_model_visible(&self, model: ModelType) -> bool {
        self.active_model == Some(model)
    }

    pub fn is_features_visible(&self, dataset: Dataset) -> bool {
        self.active_features == Some(dataset)
    }

    pub fn buttons(&self) -> ModelButtons {
        self.buttons
    }

    pub fn result_view(&self) -> ResultView {
        self.result_view
    }

    pub fn section(&self) -> Section {
        self.section
    }

    // ─── Fields ──────────────────────────────────────────────────────────

    pub fn dataset(&self) -> Dataset {
        self.dataset
    }

    pub fn set_dataset(&mut self, dataset: Dataset) {
        self.dataset = dataset;
    }

    pub fn field_value(&self, id: &str) -> Option<&str> {
        self.values.get(id).map(String::as_str)
    }

    /// Set a hyperparameter field; `false` if no field has that id.
    pub fn set_field(&mut self, id: &str, value: impl Into<String>) -> bool {
        match self.values.get_mut(id) {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    pub fn is_checked(&self, id: &str) -> bool {
        self.checked.contains(id)
    }

    /// Tick or clear a feature checkbox; `false` if no checkbox has that id.
    pub fn set_checked(&mut self, id: &str, checked: bool) -> bool {
        if catalog::feature(id).is_none() {
            return false;
        }
        if checked {
            self.checked.insert(id.to_string());
        } else {
            self.checked.remove(id);
        }
        true
    }

    // ─── Results ─────────────────────────────────────────────────────────

    pub fn accuracy_text(&self) -> Option<&str> {
        self.accuracy_text.as_deref()
    }

    pub fn loss_text(&self) -> Option<&str> {
        self.loss_text.as_deref()
    }

    pub fn set_accuracy_text(&mut self, text: impl Into<String>) {
        self.accuracy_text = Some(text.into());
    }

    pub fn set_loss_text(&mut self, text: impl Into<String>) {
        self.loss_text = Some(text.into());
    }

    /// Write into whichever result container is showing.
    pub fn set_visible_result_text(&mut self, text: impl Into<String>) {
        match self.result_view {
            ResultView::Loss => self.set_loss_text(text),
            ResultView::Accuracy => self.set_accuracy_text(text),
        }
    }

    pub fn chart(&self) -> Option<&ChartSpec> {
        self.chart.as_ref()
    }

    pub fn set_chart(&mut self, chart: ChartSpec) {
        self.chart = Some(chart);
    }

    // ─── Records ─────────────────────────────────────────────────────────

    /// Dataset text, the active panel's fields and its model label.
    pub fn capture_hyperparameters(&self) -> InputRecord {
        let mut record = InputRecord::new();
        record.insert(KEY_DATASET, self.dataset.display_name());
        if let Some(model) = self.active_model {
            for field in catalog::fields(model) {
                let value = self.values.get(field.id).cloned().unwrap_or_default();
                record.insert(field.id, value);
            }
            record.insert(KEY_MODEL_TYPE, catalog::model_label(model));
        }
        record
    }

    /// [`capture_hyperparameters`](Self::capture_hyperparameters) plus the
    /// metric of the visible result container, when one was produced.
    pub fn capture_inputs(&self) -> InputRecord {
        let mut record = self.capture_hyperparameters();
        match self.result_view {
            ResultView::Accuracy => {
                if let Some(text) = &self.accuracy_text {
                    record.insert(KEY_TEST_ACCURACY, text.clone());
                }
            }
            ResultView::Loss => {
                if let Some(text) = &self.loss_text {
                    record.insert(KEY_LOSS, text.clone());
                }
            }
        }
        record
    }

    /// Copy a stored record back into the form. Returns the number of
    /// elements that were updated.
    pub fn populate(&mut self, record: &InputRecord) -> usize {
        let mut updated = 0;

        if let Some(name) = record.get(KEY_DATASET).and_then(|v| v.as_text()) {
            if let Some(dataset) = Dataset::from_display_name(name) {
                self.dataset = dataset;
                updated += 1;
            }
        }

        for (key, value) in record.iter() {
            if key == KEY_DATASET {
                continue;
            }
            if self.set_field(key, value.to_string()) {
                updated += 1;
            }
            if value.is_true() && self.set_checked(key, true) {
                updated += 1;
            }
        }
        updated
    }
}

/// Buttons and result container for a dataset, or `None` when the value
/// is not a known dataset.
pub fn layout_for(dataset: &str) -> Option<(ModelButtons, ResultView)> {
    let dataset = dataset.parse::<Dataset>().ok()?;
    Some(match dataset.problem() {
        ProblemKind::Classification => (
            ModelButtons {
                linear: false,
                decision: true,
                neural: true,
            },
            ResultView::Accuracy,
        ),
        ProblemKind::Regression => (ModelButtons::all(), ResultView::Loss),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldValue;

    #[test]
    fn test_new_form_defaults() {
        let form = FormState::new();
        assert_eq!(form.dataset(), Dataset::Wine);
        assert_eq!(form.active_model(), None);
        assert_eq!(form.field_value("dt-criterion"), Some("gini"));
        assert_eq!(form.result_view(), ResultView::Loss);
        assert_eq!(form.section(), Section::Train);
    }

    #[test]
    fn test_show_model_unknown_hides_everything() {
        let mut form = FormState::new();
        form.show_model("neural").unwrap();
        assert!(form.show_model("svm").is_err());
        assert_eq!(form.active_model(), None);
    }

    #[test]
    fn test_capture_only_active_panel() {
        let mut form = FormState::new();
        form.show_model("decision").unwrap();
        form.set_field("dt-max-depth", "9");
        form.set_field("nn-neurons", "64");

        let record = form.capture_hyperparameters();
        assert_eq!(record.text("dt-max-depth").as_deref(), Some("9"));
        assert_eq!(record.text("modelType").as_deref(), Some("Decision Tree"));
        assert_eq!(record.text("dataset").as_deref(), Some("Wine Quality"));
        assert!(!record.contains_key("nn-neurons"));
    }

    #[test]
    fn test_capture_inputs_uses_visible_result() {
        let mut form = FormState::new();
        form.set_accuracy_text("0.91");
        let record = form.capture_inputs();
        assert!(!record.contains_key("testAccuracy"));
        assert!(!record.contains_key("loss"));

        form.set_result_view(ResultView::Accuracy);
        let record = form.capture_inputs();
        assert_eq!(record.text("testAccuracy").as_deref(), Some("0.91"));
    }

    #[test]
    fn test_populate_ignores_unknown_ids() {
        let mut form = FormState::new();
        let record: InputRecord = [
            ("dataset".to_string(), FieldValue::from("Boston Housing")),
            ("nn-activation".to_string(), FieldValue::from("tanh")),
            ("modelType".to_string(), FieldValue::from("Neural Network")),
            ("boston-crime-rate".to_string(), FieldValue::from(true)),
            ("missing-field".to_string(), FieldValue::from("x")),
        ]
        .into_iter()
        .collect();

        assert_eq!(form.populate(&record), 3);
        assert_eq!(form.dataset(), Dataset::Boston);
        assert_eq!(form.field_value("nn-activation"), Some("tanh"));
        assert!(form.is_checked("boston-crime-rate"));
        assert_eq!(form.active_model(), None);
    }

    #[test]
    fn test_layout_for_datasets() {
        let (buttons, view) = layout_for("titanic").unwrap();
        assert!(!buttons.linear && buttons.decision && buttons.neural);
        assert_eq!(view, ResultView::Accuracy);
        assert_eq!(layout_for("boston").unwrap().1, ResultView::Loss);
        assert!(layout_for("iris").is_none());
    }
}
