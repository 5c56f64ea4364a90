//! Static description of the training form: which panels exist, what
//! fields they hold and how each one is labelled.

use crate::models::{Dataset, ModelType};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    Number { min: f64, step: f64 },
    Select { options: &'static [&'static str] },
}

/// One input or select inside a hyperparameter panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub id: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub default: &'static str,
}

/// One checkbox inside a feature panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureSpec {
    pub id: &'static str,
    pub label: &'static str,
}

const LINEAR_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        id: "lr-learning-rate",
        label: "Learning rate",
        kind: FieldKind::Number { min: 0.0, step: 0.001 },
        default: "0.01",
    },
    FieldSpec {
        id: "lr-iterations",
        label: "Number of iterations",
        kind: FieldKind::Number { min: 1.0, step: 1.0 },
        default: "1000",
    },
    FieldSpec {
        id: "lr-regularization",
        label: "Regularization",
        kind: FieldKind::Select { options: &["none", "l1", "l2"] },
        default: "none",
    },
];

const DECISION_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        id: "dt-criterion",
        label: "Criterion",
        kind: FieldKind::Select { options: &["gini", "entropy"] },
        default: "gini",
    },
    FieldSpec {
        id: "dt-splitter",
        label: "Splitter",
        kind: FieldKind::Select { options: &["best", "random"] },
        default: "best",
    },
    FieldSpec {
        id: "dt-max-depth",
        label: "Max depth",
        kind: FieldKind::Number { min: 1.0, step: 1.0 },
        default: "5",
    },
    FieldSpec {
        id: "dt-min-samples-split",
        label: "Min samples split",
        kind: FieldKind::Number { min: 2.0, step: 1.0 },
        default: "2",
    },
];

const NEURAL_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        id: "nn-hidden-layers",
        label: "Number of hidden layers",
        kind: FieldKind::Number { min: 1.0, step: 1.0 },
        default: "2",
    },
    FieldSpec {
        id: "nn-neurons",
        label: "Neurons per layer",
        kind: FieldKind::Number { min: 1.0, step: 1.0 },
        default: "32",
    },
    FieldSpec {
        id: "nn-activation",
        label: "Activation function",
        kind: FieldKind::Select { options: &["relu", "sigmoid", "tanh"] },
        default: "relu",
    },
    FieldSpec {
        id: "nn-learning-rate",
        label: "Learning rate",
        kind: FieldKind::Number { min: 0.0, step: 0.001 },
        default: "0.001",
    },
];

const WINE_FEATURES: &[FeatureSpec] = &[
    FeatureSpec { id: "wine-fixed-acidity", label: "Fixed acidity" },
    FeatureSpec { id: "wine-volatile-acidity", label: "Volatile acidity" },
];

const TITANIC_FEATURES: &[FeatureSpec] = &[
    FeatureSpec { id: "titanic-passenger-class", label: "Passenger class" },
    FeatureSpec { id: "titanic-age", label: "Age" },
];

const BOSTON_FEATURES: &[FeatureSpec] = &[
    FeatureSpec { id: "boston-crime-rate", label: "Per capita crime rate by town" },
    FeatureSpec {
        id: "boston-residential-land",
        label: "Residential land zoned for lots over 25,000 sq. ft.",
    },
];

/// Panel heading; the record's `modelType` is its first two words.
pub fn heading(model: ModelType) -> &'static str {
    match model {
        ModelType::Linear => "Linear Regression Hyperparameters",
        ModelType::Decision => "Decision Tree Hyperparameters",
        ModelType::Neural => "Neural Network Hyperparameters",
    }
}

pub fn model_label(model: ModelType) -> String {
    heading(model).split(' ').take(2).collect::<Vec<_>>().join(" ")
}

pub fn fields(model: ModelType) -> &'static [FieldSpec] {
    match model {
        ModelType::Linear => LINEAR_FIELDS,
        ModelType::Decision => DECISION_FIELDS,
        ModelType::Neural => NEURAL_FIELDS,
    }
}

pub fn features(dataset: Dataset) -> &'static [FeatureSpec] {
    match dataset {
        Dataset::Wine => WINE_FEATURES,
        Dataset::Titanic => TITANIC_FEATURES,
        Dataset::Boston => BOSTON_FEATURES,
    }
}

pub fn field(id: &str) -> Option<&'static FieldSpec> {
    ModelType::ALL
        .into_iter()
        .flat_map(fields)
        .find(|f| f.id == id)
}

pub fn feature(id: &str) -> Option<&'static FeatureSpec> {
    Dataset::ALL
        .into_iter()
        .flat_map(features)
        .find(|f| f.id == id)
}
