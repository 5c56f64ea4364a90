//! HTTP calls: server config, the submission store and the training backend.

use gloo_net::http::Request;
use serde::Deserialize;

use trainboard_core::{Document, InputRecord, LeaderboardEntry, TrainboardError, TrainingResponse};

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ServerInfo {
    pub version: String,
    pub training_endpoint: Option<String>,
}

fn network(e: gloo_net::Error) -> TrainboardError {
    TrainboardError::Network(e.to_string())
}

pub async fn fetch_config() -> Result<ServerInfo, String> {
    let resp = Request::get("/api/config")
        .send()
        .await
        .map_err(|e| e.to_string())?;

    if !resp.ok() {
        return Err(format!("Error fetching config: {}", resp.status()));
    }

    let text = resp.text().await.map_err(|e| e.to_string())?;
    serde_json::from_str(&text).map_err(|e| e.to_string())
}

pub async fn fetch_leaderboard() -> Result<Vec<LeaderboardEntry>, String> {
    let resp = Request::get("/api/leaderboard")
        .send()
        .await
        .map_err(|e| e.to_string())?;

    if !resp.ok() {
        return Err(format!("Error fetching leaderboard: {}", resp.status()));
    }

    let text = resp.text().await.map_err(|e| e.to_string())?;
    serde_json::from_str(&text).map_err(|e| e.to_string())
}

/// Write a finalized submission into `model_db`.
pub async fn put_document(doc: &Document) -> trainboard_core::Result<()> {
    let resp = Request::put(&format!("/api/model_db/{}", doc.id))
        .json(&doc.record)
        .map_err(network)?
        .send()
        .await
        .map_err(network)?;

    if !resp.ok() {
        return Err(TrainboardError::Storage(format!(
            "Submission store returned {}",
            resp.status()
        )));
    }
    Ok(())
}

/// POST the record to the training backend and parse its reply.
pub async fn create_model(
    endpoint: &str,
    record: &InputRecord,
) -> trainboard_core::Result<TrainingResponse> {
    let resp = Request::post(endpoint)
        .json(record)
        .map_err(network)?
        .send()
        .await
        .map_err(network)?;

    if !resp.ok() {
        return Err(TrainboardError::Network(format!(
            "Training backend returned {}",
            resp.status()
        )));
    }

    let text = resp.text().await.map_err(network)?;
    log::debug!("create_model response: {}", text);
    TrainingResponse::parse(&text)
}
