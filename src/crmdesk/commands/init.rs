use crate::commands::{CmdMessage, CmdResult};
use crate::config::CrmConfig;
use crate::error::Result;
use std::fs;
use std::path::Path;

/// Creates the data directory and a default `config.json`, recording
/// `user` as the current user when given. Existing settings are kept.
pub fn run(data_dir: &Path, user: Option<String>) -> Result<CmdResult> {
    fs::create_dir_all(data_dir)?;

    let mut config = CrmConfig::load(data_dir)?;
    if let Some(name) = user {
        config.set("current-user", &name)?;
    }
    config.save(data_dir)?;

    let mut result = CmdResult::default().with_config(config);
    result.add_message(CmdMessage::success(format!(
        "Initialized crmdesk store at {}",
        data_dir.display()
    )));
    Ok(result)
}
