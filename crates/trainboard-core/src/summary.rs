//! Read-only summary of a stored record for the share page.

use serde::Serialize;

use crate::models::{InputRecord, KEY_DATASET, KEY_MODEL_TYPE, KEY_TEST_ACCURACY};

/// Shown instead of the detail list when a record has no other keys.
pub const NO_DETAILS: &str = "None specified";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub dataset: String,
    pub model_type: String,
    pub accuracy: String,
    /// Every other key as `(key, value)`, in key order.
    pub details: Vec<(String, String)>,
}

impl Summary {
    pub fn from_record(record: &InputRecord) -> Self {
        let text = |key: &str| record.text(key).unwrap_or_default();
        let details = record
            .iter()
            .filter(|(k, _)| !matches!(k.as_str(), KEY_DATASET | KEY_MODEL_TYPE | KEY_TEST_ACCURACY))
            .map(|(k, v)| (k.clone(), v.to_string()))
            .collect();
        Self {
            dataset: text(KEY_DATASET),
            model_type: text(KEY_MODEL_TYPE),
            accuracy: text(KEY_TEST_ACCURACY),
            details,
        }
    }

    /// `key: value` lines, or the placeholder.
    pub fn detail_lines(&self) -> Vec<String> {
        if self.details.is_empty() {
            return vec![NO_DETAILS.to_string()];
        }
        self.details
            .iter()
            .map(|(k, v)| format!("{}: {}", k, v))
            .collect()
    }
}
