use crate::commands::{CmdMessage, CmdResult};
use crate::config::CrmConfig;
use crate::error::Result;
use std::path::Path;

#[derive(Debug, Clone)]
pub enum ConfigAction {
    ShowAll,
    ShowKey(String),
    Set(String, String),
}

pub fn run(data_dir: &Path, action: ConfigAction) -> Result<CmdResult> {
    match action {
        ConfigAction::ShowAll => {
            let config = CrmConfig::load(data_dir)?;
            Ok(CmdResult::default().with_config(config))
        }
        ConfigAction::ShowKey(key) => {
            let config = CrmConfig::load(data_dir)?;
            let mut result = CmdResult::default();
            match config.get(&key) {
                Some(val) => result.add_message(CmdMessage::info(val)),
                None => result.add_message(CmdMessage::warning(format!(
                    "Unknown config key: {} (known: {})",
                    key,
                    CrmConfig::keys().join(", ")
                ))),
            }
            Ok(result)
        }
        ConfigAction::Set(key, value) => {
            let mut config = CrmConfig::load(data_dir)?;
            if let Err(e) = config.set(&key, &value) {
                let mut res = CmdResult::default();
                res.add_message(CmdMessage::error(e.to_string()));
                return Ok(res);
            }
            config.save(data_dir)?;
            let display_val = config.get(&key).unwrap_or_else(|| value.clone());
            let mut result = CmdResult::default().with_config(config);
            result.add_message(CmdMessage::success(format!(
                "{} set to {}",
                key, display_val
            )));
            Ok(result)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::MessageLevel;

    #[test]
    fn set_then_show_key() {
        let dir = tempfile::tempdir().unwrap();

        let set = run(
            dir.path(),
            ConfigAction::Set("page-sizes".into(), "10,20".into()),
        )
        .unwrap();
        assert_eq!(set.messages[0].content, "page-sizes set to 10,20");

        let shown = run(dir.path(), ConfigAction::ShowKey("page-sizes".into())).unwrap();
        assert_eq!(shown.messages[0].content, "10,20");
    }

    #[test]
    fn invalid_value_is_reported_not_saved() {
        let dir = tempfile::tempdir().unwrap();

        let res = run(
            dir.path(),
            ConfigAction::Set("search-debounce-ms".into(), "soon".into()),
        )
        .unwrap();
        assert!(matches!(res.messages[0].level, MessageLevel::Error));
        assert!(!dir.path().join("config.json").exists());
    }

    #[test]
    fn unknown_key_is_a_warning() {
        let dir = tempfile::tempdir().unwrap();
        let res = run(dir.path(), ConfigAction::ShowKey("colour".into())).unwrap();
        assert!(matches!(res.messages[0].level, MessageLevel::Warning));
        assert!(res.messages[0].content.starts_with("Unknown config key: colour"));
        assert!(res.messages[0].content.contains("page-size"));
    }

    #[test]
    fn show_all_returns_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let res = run(dir.path(), ConfigAction::ShowAll).unwrap();
        assert_eq!(res.config, Some(CrmConfig::default()));
    }
}
