//! Data models for trainboard.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TrainboardError;

/// Reserved record keys.
pub const KEY_DATASET: &str = "dataset";
pub const KEY_MODEL_TYPE: &str = "modelType";
pub const KEY_TEST_ACCURACY: &str = "testAccuracy";
pub const KEY_LOSS: &str = "loss";

/// Keys merged in by the "submit result" step.
pub const KEY_NAME: &str = "name";
pub const KEY_MODEL_TUNING: &str = "model-tuning";
pub const KEY_IMPROVEMENT: &str = "improvement";

/// Document id field in `model_db`; never stored as a record key.
pub const KEY_ID: &str = "_id";

/// A single form value: text from inputs/selects, or a checkbox flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Text(String),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Bool(_) => None,
        }
    }

    pub fn is_true(&self) -> bool {
        matches!(self, FieldValue::Bool(true))
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}
impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}
impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

/// One form snapshot: field identifier -> value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputRecord(BTreeMap<String, FieldValue>);

impl InputRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.0.get(key)
    }

    /// Text value of `key`; booleans are rendered as `true` / `false`.
    pub fn text(&self, key: &str) -> Option<String> {
        self.0.get(key).map(|v| v.to_string())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn remove(&mut self, key: &str) -> Option<FieldValue> {
        self.0.remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, FieldValue)> for InputRecord {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// The three toy datasets offered by the dataset selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dataset {
    Wine,
    Titanic,
    Boston,
}

impl Dataset {
    pub const ALL: [Dataset; 3] = [Dataset::Wine, Dataset::Titanic, Dataset::Boston];

    /// Option value of the selector (`wine`, `titanic`, `boston`).
    pub fn value(self) -> &'static str {
        match self {
            Dataset::Wine => "wine",
            Dataset::Titanic => "titanic",
            Dataset::Boston => "boston",
        }
    }

    /// Option text shown to the user and stored under `dataset`.
    pub fn display_name(self) -> &'static str {
        match self {
            Dataset::Wine => "Wine Quality",
            Dataset::Titanic => "Titanic",
            Dataset::Boston => "Boston Housing",
        }
    }

    pub fn features_panel_id(self) -> String {
        format!("{}-features", self.value())
    }

    /// Titanic is framed as classification and reports accuracy; the
    /// others are regression tasks and report loss.
    pub fn problem(self) -> ProblemKind {
        match self {
            Dataset::Titanic => ProblemKind::Classification,
            Dataset::Wine | Dataset::Boston => ProblemKind::Regression,
        }
    }

    pub fn from_display_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.display_name() == name)
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}

impl FromStr for Dataset {
    type Err = TrainboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.value() == s)
            .ok_or_else(|| TrainboardError::UnknownDataset(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProblemKind {
    Classification,
    Regression,
}

/// Model families, one hyperparameter panel each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelType {
    Linear,
    Decision,
    Neural,
}

impl ModelType {
    pub const ALL: [ModelType; 3] = [ModelType::Linear, ModelType::Decision, ModelType::Neural];

    pub fn key(self) -> &'static str {
        match self {
            ModelType::Linear => "linear",
            ModelType::Decision => "decision",
            ModelType::Neural => "neural",
        }
    }

    pub fn panel_id(self) -> String {
        format!("{}-hyperparameters", self.key())
    }

    pub fn button_id(self) -> &'static str {
        match self {
            ModelType::Linear => "lg-button",
            ModelType::Decision => "dt-button",
            ModelType::Neural => "nn-button",
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ModelType {
    type Err = TrainboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.key() == s)
            .ok_or_else(|| TrainboardError::UnknownModel(s.to_string()))
    }
}

/// Identifier of a `model_db` document: milliseconds since epoch, as a
/// decimal string. Two writes in the same millisecond share an id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn now() -> Self {
        Self::at(Utc::now())
    }

    pub fn at(time: DateTime<Utc>) -> Self {
        Self(time.timestamp_millis().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parsed timestamp, if the id is a well-formed millisecond count.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.0
            .parse::<i64>()
            .ok()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for DocumentId {
    fn from(v: String) -> Self {
        Self(v)
    }
}
impl From<&str> for DocumentId {
    fn from(v: &str) -> Self {
        Self(v.to_string())
    }
}

/// A finalized submission as stored in `model_db`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    /// Flattened next to `_id`, so the record must not carry that key.
    #[serde(flatten)]
    pub record: InputRecord,
}

impl Document {
    /// The id is authoritative: an `_id` key in `record` is dropped.
    pub fn new(id: DocumentId, mut record: InputRecord) -> Self {
        if record.remove(KEY_ID).is_some() {
            tracing::warn!(id = %id, "Dropped reserved _id key from record");
        }
        Self { id, record }
    }
}

/// Leaderboard row derived from a stored document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub id: String,
    pub submitted_at: Option<DateTime<Utc>>,
    pub name: String,
    pub dataset: String,
    pub model_type: String,
    /// `testAccuracy` for classification runs, `loss` otherwise.
    pub metric_name: String,
    pub metric: String,
}

impl LeaderboardEntry {
    pub fn from_document(doc: &Document) -> Self {
        let text = |key: &str| doc.record.text(key).unwrap_or_default();
        let (metric_name, metric) = if doc.record.contains_key(KEY_TEST_ACCURACY) {
            (KEY_TEST_ACCURACY, text(KEY_TEST_ACCURACY))
        } else {
            (KEY_LOSS, text(KEY_LOSS))
        };
        Self {
            id: doc.id.to_string(),
            submitted_at: doc.id.timestamp(),
            name: text(KEY_NAME),
            dataset: text(KEY_DATASET),
            model_type: text(KEY_MODEL_TYPE),
            metric_name: metric_name.to_string(),
            metric,
        }
    }
}

/// Build leaderboard rows, newest submission first.
pub fn leaderboard(docs: &[Document]) -> Vec<LeaderboardEntry> {
    let mut sorted: Vec<&Document> = docs.iter().collect();
    sorted.sort_by(|a, b| newest_first(&a.id, &b.id));
    sorted.into_iter().map(LeaderboardEntry::from_document).collect()
}

fn newest_first(a: &DocumentId, b: &DocumentId) -> std::cmp::Ordering {
    match (a.as_str().parse::<i64>(), b.as_str().parse::<i64>()) {
        (Ok(x), Ok(y)) => y.cmp(&x),
        _ => b.cmp(a),
    }
}
