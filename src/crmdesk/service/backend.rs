use crate::error::Result;
use crate::model::Record;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Everything the bundled service persists, as one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub accounts: Vec<Record>,
    #[serde(default)]
    pub contacts: Vec<Record>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_user: Option<String>,
}

/// Abstract interface for raw storage I/O.
/// The backend handles the "how" (filesystem vs memory), while RecordStore
/// handles the "what" (matching, validation, ids).
pub trait StorageBackend {
    /// Load the whole dataset. A backend with nothing stored yet returns an
    /// empty dataset.
    fn load(&self) -> Result<Dataset>;

    /// Replace the stored dataset.
    /// MUST be atomic (e.g. write to tmp then rename) to avoid partial writes.
    fn save(&self, dataset: &Dataset) -> Result<()>;

    /// Where the data lives, for display. MemBackend returns a virtual path.
    fn location(&self) -> PathBuf;
}
