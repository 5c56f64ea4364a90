//! Storage layer: the local key/value record store and the `model_db`
//! document store.
//!
//! Both stores are opaque sinks. The local store keeps exactly one record
//! under [`RECORD_KEY`]; the document store keeps one document per
//! finalized submission and replaces a document written under an id that
//! already exists.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{Result, TrainboardError};
use crate::models::{Document, DocumentId, InputRecord};

/// Key under which the latest extraction is stored.
pub const RECORD_KEY: &str = "inputs";

/// Name of the document collection holding finalized submissions.
pub const COLLECTION: &str = "model_db";

// ─── Key/value ───────────────────────────────────────────────────────────────

/// String key/value storage with the shape of the browser's `localStorage`.
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove_item(&mut self, key: &str) -> Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    items: BTreeMap<String, String>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        self.items.remove(key);
        Ok(())
    }
}

/// The single "last extracted record" slot.
#[derive(Debug, Clone)]
pub struct LocalRecordStore<K> {
    backend: K,
}

impl<K: KeyValueStore> LocalRecordStore<K> {
    pub fn new(backend: K) -> Self {
        Self { backend }
    }

    /// Load the stored record. `Ok(None)` when nothing was stored yet,
    /// `CorruptState` when the stored text is not a valid record.
    pub fn load(&self) -> Result<Option<InputRecord>> {
        match self.backend.get_item(RECORD_KEY)? {
            None => Ok(None),
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| TrainboardError::CorruptState(e.to_string())),
        }
    }

    /// Replace whatever is stored with `record`.
    pub fn save(&mut self, record: &InputRecord) -> Result<()> {
        let raw = serde_json::to_string(record)?;
        self.backend.set_item(RECORD_KEY, &raw)?;
        debug!(fields = record.len(), "Saved record to local store");
        Ok(())
    }

    pub fn clear(&mut self) -> Result<()> {
        self.backend.remove_item(RECORD_KEY)
    }

    pub fn backend(&self) -> &K {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut K {
        &mut self.backend
    }
}

// ─── Documents ───────────────────────────────────────────────────────────────

/// Append-style store of finalized submissions.
pub trait DocumentStore {
    /// Write `doc` under its id, replacing any document with the same id.
    fn put(&mut self, doc: Document) -> Result<()>;
    fn get(&self, id: &DocumentId) -> Result<Option<Document>>;
    /// Every stored document, ordered by id.
    fn all_docs(&self) -> Result<Vec<Document>>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryDocumentStore {
    docs: BTreeMap<DocumentId, InputRecord>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn put(&mut self, doc: Document) -> Result<()> {
        let doc = Document::new(doc.id, doc.record);
        self.docs.insert(doc.id, doc.record);
        Ok(())
    }

    fn get(&self, id: &DocumentId) -> Result<Option<Document>> {
        Ok(self
            .docs
            .get(id)
            .map(|record| Document::new(id.clone(), record.clone())))
    }

    fn all_docs(&self) -> Result<Vec<Document>> {
        Ok(self
            .docs
            .iter()
            .map(|(id, record)| Document::new(id.clone(), record.clone()))
            .collect())
    }
}

/// Ids end up as file names, so only plain identifier characters pass.
pub fn validate_document_id(id: &DocumentId) -> Result<()> {
    let s = id.as_str();
    let ok = !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok {
        Ok(())
    } else {
        Err(TrainboardError::Other(format!("Invalid document id: {:?}", s)))
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileDocumentStore;

#[cfg(not(target_arch = "wasm32"))]
mod file {
    use std::fs;
    use std::path::{Path, PathBuf};

    use tracing::warn;

    use super::{validate_document_id, DocumentStore, COLLECTION};
    use crate::error::Result;
    use crate::models::{Document, DocumentId};

    /// `model_db` as a directory of `<id>.json` files.
    #[derive(Debug, Clone)]
    pub struct FileDocumentStore {
        dir: PathBuf,
    }

    impl FileDocumentStore {
        /// Open (creating if needed) the collection under `data_dir`.
        pub fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
            let dir = data_dir.as_ref().join(COLLECTION);
            fs::create_dir_all(&dir)?;
            Ok(Self { dir })
        }

        pub fn dir(&self) -> &Path {
            &self.dir
        }

        fn path_for(&self, id: &DocumentId) -> PathBuf {
            self.dir.join(format!("{}.json", id))
        }
    }

    impl DocumentStore for FileDocumentStore {
        fn put(&mut self, doc: Document) -> Result<()> {
            validate_document_id(&doc.id)?;
            let doc = Document::new(doc.id, doc.record);
            let content = serde_json::to_string_pretty(&doc)?;
            fs::write(self.path_for(&doc.id), content)?;
            Ok(())
        }

        fn get(&self, id: &DocumentId) -> Result<Option<Document>> {
            validate_document_id(id)?;
            let path = self.path_for(id);
            if !path.exists() {
                return Ok(None);
            }
            let content = fs::read_to_string(&path)?;
            Ok(Some(serde_json::from_str(&content)?))
        }

        fn all_docs(&self) -> Result<Vec<Document>> {
            let mut docs = vec![];
            for entry in fs::read_dir(&self.dir)? {
                let path = entry?.path();
                if path.extension().and_then(|e| e.to_str()) != Some("json") {
                    continue;
                }
                let content = fs::read_to_string(&path)?;
                match serde_json::from_str::<Document>(&content) {
                    Ok(doc) => docs.push(doc),
                    // Skip, keep listing the rest.
                    Err(e) => warn!("Skipping unreadable document {}: {}", path.display(), e),
                }
            }
            docs.sort_by(|a, b| a.id.cmp(&b.id));
            Ok(docs)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::KEY_DATASET;

    #[test]
    fn test_local_store_roundtrip_and_overwrite() {
        let mut store = LocalRecordStore::new(MemoryKeyValueStore::new());
        assert!(store.load().unwrap().is_none());

        let mut first = InputRecord::new();
        first.insert(KEY_DATASET, "Wine Quality");
        first.insert("lr-iterations", "500");
        store.save(&first).unwrap();

        let mut second = InputRecord::new();
        second.insert(KEY_DATASET, "Titanic");
        store.save(&second).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded, second);
        assert!(!loaded.contains_key("lr-iterations"));
    }

    #[test]
    fn test_local_store_corrupt_state() {
        let mut backend = MemoryKeyValueStore::new();
        backend.set_item(RECORD_KEY, "{not json").unwrap();
        let store = LocalRecordStore::new(backend);
        assert!(matches!(store.load(), Err(TrainboardError::CorruptState(_))));
    }

    #[test]
    fn test_memory_documents_replace_on_same_id() {
        let mut store = MemoryDocumentStore::new();
        let mut a = InputRecord::new();
        a.insert("name", "a");
        let mut b = InputRecord::new();
        b.insert("name", "b");

        store.put(Document::new(DocumentId::from("42"), a)).unwrap();
        store.put(Document::new(DocumentId::from("42"), b.clone())).unwrap();

        assert_eq!(store.len(), 1);
        let doc = store.get(&DocumentId::from("42")).unwrap().unwrap();
        assert_eq!(doc.record, b);
    }

    #[test]
    fn test_memory_put_keeps_path_id() {
        let mut store = MemoryDocumentStore::new();
        let mut record = InputRecord::new();
        record.insert("_id", "spoof");
        record.insert("name", "ada");
        let doc = Document {
            id: DocumentId::from("1000"),
            record,
        };
        store.put(doc).unwrap();

        let doc = store.get(&DocumentId::from("1000")).unwrap().unwrap();
        assert!(!doc.record.contains_key("_id"));
        assert_eq!(store.all_docs().unwrap().len(), 1);
    }

    #[test]
    fn test_document_id_validation() {
        assert!(validate_document_id(&DocumentId::from("1712345678901")).is_ok());
        assert!(validate_document_id(&DocumentId::from("../etc/passwd")).is_err());
        assert!(validate_document_id(&DocumentId::from("")).is_err());
    }
}
