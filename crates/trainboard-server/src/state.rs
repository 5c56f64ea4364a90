//! Shared application state for the Axum server.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use trainboard_core::training::DEFAULT_TRAINING_ENDPOINT;
use trainboard_core::FileDocumentStore;

#[derive(Clone)]
pub struct AppState {
    pub documents: Arc<Mutex<FileDocumentStore>>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> trainboard_core::Result<Self> {
        let documents = FileDocumentStore::open(&config.data_dir)?;
        Ok(Self {
            documents: Arc::new(Mutex::new(documents)),
            config: Arc::new(config),
        })
    }
}

/// Configuration for the web server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Directory holding the `model_db` collection.
    pub data_dir: PathBuf,
    pub host: String,
    pub port: u16,
    /// Handed to the frontend; `None` makes it simulate training.
    pub training_endpoint: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("trainboard-data"),
            host: "127.0.0.1".to_string(),
            port: 8000,
            training_endpoint: Some(DEFAULT_TRAINING_ENDPOINT.to_string()),
        }
    }
}

impl ServerConfig {
    /// Load from a YAML file; missing keys take their defaults.
    pub fn from_yaml_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }
}
