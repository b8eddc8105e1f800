use super::backend::{Dataset, StorageBackend};
use crate::error::{CrmError, Result};
use std::fs;
use std::path::PathBuf;
use uuid::Uuid;

const DATA_FILENAME: &str = "data.json";

/// Keeps the dataset in `<root>/data.json`.
pub struct FsBackend {
    root: PathBuf,
}

impl FsBackend {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn data_file(&self) -> PathBuf {
        self.root.join(DATA_FILENAME)
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(CrmError::Io)?;
        }
        Ok(())
    }
}

impl StorageBackend for FsBackend {
    fn load(&self) -> Result<Dataset> {
        let data_file = self.data_file();
        if !data_file.exists() {
            return Ok(Dataset::default());
        }
        let content = fs::read_to_string(data_file).map_err(CrmError::Io)?;
        let dataset: Dataset = serde_json::from_str(&content).map_err(CrmError::Serialization)?;
        Ok(dataset)
    }

    fn save(&self, dataset: &Dataset) -> Result<()> {
        self.ensure_dir()?;
        let content = serde_json::to_string_pretty(dataset).map_err(CrmError::Serialization)?;

        // Atomic write
        let tmp_file = self.root.join(format!(".data-{}.tmp", Uuid::new_v4()));
        fs::write(&tmp_file, content).map_err(CrmError::Io)?;
        fs::rename(&tmp_file, self.data_file()).map_err(CrmError::Io)?;
        Ok(())
    }

    fn location(&self) -> PathBuf {
        self.data_file()
    }
}
