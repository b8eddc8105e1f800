use crate::api::CrmApi;
use crate::config::CrmConfig;
use crate::error::{CrmError, Result};
use crate::service::backend::StorageBackend;
use crate::service::fs::FileService;
use directories::ProjectDirs;
use std::path::PathBuf;
use tracing::debug;

/// Overrides the data directory, mainly for tests and scripted use.
pub const HOME_ENV: &str = "CRMDESK_HOME";

pub struct CrmContext {
    pub api: CrmApi<FileService>,
    pub config: CrmConfig,
}

/// Where `config.json` and `data.json` live: `$CRMDESK_HOME` when set,
/// otherwise the platform data directory.
pub fn data_dir() -> Result<PathBuf> {
    if let Some(home) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(home));
    }
    ProjectDirs::from("com", "crmdesk", "crmdesk")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| CrmError::Store("Could not determine the data directory".to_string()))
}

pub fn initialize() -> Result<CrmContext> {
    let dir = data_dir()?;
    debug!(data_dir = %dir.display(), "initializing");

    let config = CrmConfig::load(&dir)?;
    let service = FileService::open(dir.clone()).with_current_user(config.current_user.clone());
    debug!(data_file = %service.backend().location().display(), "record store opened");
    let api = CrmApi::new(service, config.clone(), dir);

    Ok(CrmContext { api, config })
}
