//! trainboard-core: form state, record stores and result rendering for the
//! trainboard model-training playground.
//!
//! Everything here is platform neutral. The browser frontend plugs
//! `localStorage` and HTTP into the traits in [`store`]; the server and the
//! CLI use the file-backed document store.

pub mod catalog;
pub mod context;
pub mod error;
pub mod form;
pub mod models;
pub mod store;
pub mod summary;
pub mod task;
pub mod training;

pub use context::{AppConfig, AppContext, PendingDocument, TrainingRequest};
pub use error::{Result, TrainboardError};
pub use form::{FormState, ResultView, Section};
pub use models::{Dataset, Document, DocumentId, FieldValue, InputRecord, LeaderboardEntry, ModelType};
pub use store::{DocumentStore, KeyValueStore, LocalRecordStore, MemoryDocumentStore, MemoryKeyValueStore};
pub use summary::Summary;
pub use task::{Notice, NoticeLevel, TaskId, TaskStatus};
pub use training::{ChartSpec, TrainingResponse};

#[cfg(not(target_arch = "wasm32"))]
pub use store::FileDocumentStore;
