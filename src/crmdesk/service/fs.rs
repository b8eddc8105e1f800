use super::fs_backend::FsBackend;
use super::record_store::RecordStore;
use std::path::PathBuf;

/// Production service: the dataset lives in `data.json` under `root`.
pub type FileService = RecordStore<FsBackend>;

impl FileService {
    pub fn open(root: PathBuf) -> Self {
        RecordStore::with_backend(FsBackend::new(root))
    }
}
