//! Training results: the simulated run, the remote `create_model`
//! response, and the loss chart built from either.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrainboardError};

pub const CHART_TITLE: &str = "Loss over Time";
pub const X_AXIS_TITLE: &str = "Iterations";
pub const Y_AXIS_TITLE: &str = "Loss";
pub const CHART_HEIGHT: u32 = 500;

/// Points in a simulated loss curve.
pub const SIMULATED_POINTS: usize = 100;

/// Default training backend endpoint.
pub const DEFAULT_TRAINING_ENDPOINT: &str = "http://localhost:3000/create_model";

/// A single-trace line chart, renderer agnostic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub title: String,
    pub x_title: String,
    pub y_title: String,
    pub height: u32,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl ChartSpec {
    fn loss_chart(x: Vec<f64>, y: Vec<f64>) -> Self {
        Self {
            title: CHART_TITLE.to_string(),
            x_title: X_AXIS_TITLE.to_string(),
            y_title: Y_AXIS_TITLE.to_string(),
            height: CHART_HEIGHT,
            x,
            y,
        }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// Outcome of a simulated training run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedRun {
    pub losses: Vec<f64>,
    pub accuracy: f64,
    pub loss: f64,
}

impl SimulatedRun {
    /// x = iteration 1..=n, y = loss.
    pub fn chart(&self) -> ChartSpec {
        let x = (1..=self.losses.len()).map(|i| i as f64).collect();
        ChartSpec::loss_chart(x, self.losses.clone())
    }
}

/// Draw a simulated run: every value uniform in `[0, 1)`.
pub fn simulate<R: Rng + ?Sized>(rng: &mut R) -> SimulatedRun {
    let losses = (0..SIMULATED_POINTS).map(|_| rng.random::<f64>()).collect();
    SimulatedRun {
        losses,
        accuracy: rng.random::<f64>(),
        loss: rng.random::<f64>(),
    }
}

/// Body returned by the training backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingResponse {
    pub losses: Vec<f64>,
    pub mse: f64,
}

impl TrainingResponse {
    pub fn parse(body: &str) -> Result<Self> {
        serde_json::from_str(body).map_err(|e| {
            TrainboardError::Network(format!("Malformed training response: {}", e))
        })
    }

    /// x = loss values, y = 1-based index. The axes are swapped relative to
    /// [`SimulatedRun::chart`]; kept as the backend integration shipped it.
    pub fn chart(&self) -> ChartSpec {
        let y = (1..=self.losses.len()).map(|i| i as f64).collect();
        ChartSpec::loss_chart(self.losses.clone(), y)
    }
}

/// Two-decimal result text. Exact ties round away from zero, so 0.125
/// reads "0.13" as it does in a browser's `toFixed(2)`.
pub fn format_metric(value: f64) -> String {
    let scaled = value * 100.0;
    if !scaled.is_finite() {
        return format!("{:.2}", value);
    }
    format!("{:.2}", scaled.round() / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_simulated_chart_shape() {
        let mut rng = SmallRng::seed_from_u64(7);
        let run = simulate(&mut rng);
        let chart = run.chart();

        assert_eq!(run.losses.len(), 100);
        assert_eq!(chart.len(), 100);
        assert_eq!(chart.title, "Loss over Time");
        assert_eq!(chart.x_title, "Iterations");
        assert_eq!(chart.y_title, "Loss");
        assert_eq!(chart.x.first(), Some(&1.0));
        assert_eq!(chart.x.last(), Some(&100.0));
        assert!(run.losses.iter().all(|v| (0.0..1.0).contains(v)));
    }

    #[test]
    fn test_remote_response_chart_and_text() {
        let resp = TrainingResponse::parse(r#"{"losses":[3.1,2.0,1.2],"mse":1.23456}"#).unwrap();
        let chart = resp.chart();

        assert_eq!(format_metric(resp.mse), "1.23");
        assert_eq!(chart.len(), 3);
        assert_eq!(chart.x, vec![3.1, 2.0, 1.2]);
        assert_eq!(chart.y, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_malformed_response_is_network_error() {
        let err = TrainingResponse::parse(r#"{"loss":[1.0]}"#).unwrap_err();
        assert!(matches!(err, TrainboardError::Network(_)));
    }

    #[test]
    fn test_format_metric_rounds() {
        assert_eq!(format_metric(0.0), "0.00");
        assert_eq!(format_metric(0.876), "0.88");
    }

    #[test]
    fn test_format_metric_ties_round_up() {
        assert_eq!(format_metric(0.125), "0.13");
        assert_eq!(format_metric(1.125), "1.13");
        assert_eq!(format_metric(-0.125), "-0.13");
        assert_eq!(format_metric(1.005), "1.00");
    }
}
