use crate::error::{CrmError, Result};
use crate::pagination::DEFAULT_PAGE_SIZE_OPTIONS;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

const CONFIG_FILENAME: &str = "config.json";
const DEFAULT_SEARCH_DELAY_MS: u64 = 300;

/// Configuration for crmdesk, stored in `<data dir>/config.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CrmConfig {
    /// Page sizes offered by the tables.
    #[serde(default = "default_page_size_options")]
    pub page_size_options: Vec<usize>,

    /// Page size used on load. Falls back to the first option when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_page_size: Option<usize>,

    /// Quiet period after the last keystroke before a search is sent.
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,

    /// Name shown in the accounts header; overrides the one in `data.json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_user: Option<String>,
}

fn default_page_size_options() -> Vec<usize> {
    DEFAULT_PAGE_SIZE_OPTIONS.to_vec()
}

fn default_search_debounce_ms() -> u64 {
    DEFAULT_SEARCH_DELAY_MS
}

impl Default for CrmConfig {
    fn default() -> Self {
        Self {
            page_size_options: default_page_size_options(),
            default_page_size: None,
            search_debounce_ms: DEFAULT_SEARCH_DELAY_MS,
            current_user: None,
        }
    }
}

impl CrmConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(CrmError::Io)?;
        let config: CrmConfig =
            serde_json::from_str(&content).map_err(CrmError::Serialization)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(CrmError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(CrmError::Serialization)?;
        fs::write(config_path, content).map_err(CrmError::Io)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_size_options.is_empty() || self.page_size_options.contains(&0) {
            return Err(CrmError::Validation(
                "page-sizes must be a non-empty list of positive numbers".to_string(),
            ));
        }
        if self.default_page_size == Some(0) {
            return Err(CrmError::Validation(
                "page-size must be a positive number".to_string(),
            ));
        }
        Ok(())
    }

    pub fn initial_page_size(&self) -> usize {
        self.default_page_size
            .or_else(|| self.page_size_options.first().copied())
            .unwrap_or(DEFAULT_PAGE_SIZE_OPTIONS[0])
    }

    pub fn search_delay(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    /// Keys accepted by [`CrmConfig::get`] and [`CrmConfig::set`].
    pub fn keys() -> &'static [&'static str] {
        &["page-sizes", "page-size", "search-debounce-ms", "current-user"]
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "page-sizes" => Some(
                self.page_size_options
                    .iter()
                    .map(|n| n.to_string())
                    .collect::<Vec<_>>()
                    .join(","),
            ),
            "page-size" => Some(self.initial_page_size().to_string()),
            "search-debounce-ms" => Some(self.search_debounce_ms.to_string()),
            "current-user" => Some(self.current_user.clone().unwrap_or_default()),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "page-sizes" => {
                let options = value
                    .split(',')
                    .map(|part| part.trim().parse::<usize>())
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(|_| {
                        CrmError::Validation(format!("Invalid page sizes: {}", value))
                    })?;
                let candidate = Self {
                    page_size_options: options,
                    ..self.clone()
                };
                candidate.validate()?;
                *self = candidate;
            }
            "page-size" => {
                let size = value.trim().parse::<usize>().map_err(|_| {
                    CrmError::Validation(format!("Invalid page size: {}", value))
                })?;
                let candidate = Self {
                    default_page_size: Some(size),
                    ..self.clone()
                };
                candidate.validate()?;
                *self = candidate;
            }
            "search-debounce-ms" => {
                self.search_debounce_ms = value.trim().parse().map_err(|_| {
                    CrmError::Validation(format!("Invalid search debounce: {}", value))
                })?;
            }
            "current-user" => {
                let name = value.trim();
                self.current_user = (!name.is_empty()).then(|| name.to_string());
            }
            other => {
                return Err(CrmError::Validation(format!(
                    "Unknown config key: {}",
                    other
                )))
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CrmConfig::default();
        assert_eq!(config.page_size_options, vec![5, 10, 25]);
        assert_eq!(config.initial_page_size(), 5);
        assert_eq!(config.search_delay(), Duration::from_millis(300));
    }

    #[test]
    fn test_set_page_sizes() {
        let mut config = CrmConfig::default();
        config.set("page-sizes", "10, 50").unwrap();
        assert_eq!(config.page_size_options, vec![10, 50]);
        assert_eq!(config.get("page-sizes").as_deref(), Some("10,50"));
    }

    #[test]
    fn test_rejects_zero_page_size() {
        let mut config = CrmConfig::default();
        assert!(config.set("page-sizes", "5,0").is_err());
        assert!(config.set("page-sizes", "five").is_err());
        assert_eq!(config, CrmConfig::default());
    }

    #[test]
    fn test_default_page_size_overrides_first_option() {
        let mut config = CrmConfig::default();
        config.set("page-size", "10").unwrap();
        assert_eq!(config.initial_page_size(), 10);
        assert!(config.set("page-size", "0").is_err());
        assert_eq!(config.initial_page_size(), 10);
    }

    #[test]
    fn test_blank_current_user_clears_it() {
        let mut config = CrmConfig::default();
        config.set("current-user", "Dana").unwrap();
        config.set("current-user", "  ").unwrap();
        assert_eq!(config.current_user, None);
    }

    #[test]
    fn test_unknown_key() {
        let mut config = CrmConfig::default();
        assert!(config.get("file-ext").is_none());
        assert!(matches!(
            config.set("file-ext", ".md"),
            Err(CrmError::Validation(_))
        ));
    }

    #[test]
    fn test_load_missing_config() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = CrmConfig::load(temp_dir.path()).unwrap();
        assert_eq!(config, CrmConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = tempfile::tempdir().unwrap();

        let mut config = CrmConfig::default();
        config.set("search-debounce-ms", "150").unwrap();
        config.set("current-user", "Dana Admin").unwrap();
        config.save(temp_dir.path()).unwrap();

        let loaded = CrmConfig::load(temp_dir.path()).unwrap();
        assert_eq!(loaded.search_debounce_ms, 150);
        assert_eq!(loaded.current_user.as_deref(), Some("Dana Admin"));
        assert_eq!(loaded.page_size_options, vec![5, 10, 25]);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join(CONFIG_FILENAME), r#"{"search_debounce_ms": 50}"#).unwrap();

        let loaded = CrmConfig::load(temp_dir.path()).unwrap();
        assert_eq!(loaded.search_debounce_ms, 50);
        assert_eq!(loaded.page_size_options, vec![5, 10, 25]);
    }
}
