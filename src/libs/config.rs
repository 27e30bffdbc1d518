//! Configuration for fieldbook.
//!
//! Settings live in `config.json` inside the application data directory
//! (see [`DataStorage`]). Every section is optional; a missing file or a
//! missing section means the built-in defaults apply.
//!
//! ## Sections
//!
//! - **database**: Override for the database file location
//! - **today**: Caps for the urgent and due lists of the Today view
//! - **events**: Default number of audit records listed
//!
//! ## Usage
//!
//! ```rust,no_run
//! use fieldbook::libs::config::{Config, TodayConfig};
//!
//! let mut config = Config::read()?;
//! config.today = Some(TodayConfig { limit_urgent: 10, limit_due: 30 });
//! config.save()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use super::data_storage::DataStorage;
use crate::db::today::{TodayLimits, DEFAULT_LIMIT_DUE, DEFAULT_LIMIT_URGENT};
use crate::libs::event_log::DEFAULT_EVENT_LIMIT;
use crate::libs::messages::Message;
use crate::msg_print;
use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Input};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct DatabaseConfig {
    /// Database file to use instead of `fieldbook.db` in the data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Caps for the Today view lists.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TodayConfig {
    pub limit_urgent: usize,
    pub limit_due: usize,
}

impl Default for TodayConfig {
    fn default() -> Self {
        TodayConfig {
            limit_urgent: DEFAULT_LIMIT_URGENT,
            limit_due: DEFAULT_LIMIT_DUE,
        }
    }
}

impl From<&TodayConfig> for TodayLimits {
    fn from(config: &TodayConfig) -> Self {
        TodayLimits {
            limit_urgent: config.limit_urgent,
            limit_due: config.limit_due,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct EventsConfig {
    /// Number of audit records shown when no limit is given.
    pub list_limit: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        EventsConfig {
            list_limit: DEFAULT_EVENT_LIMIT,
        }
    }
}

/// Root configuration. Unset sections are omitted from the file.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<DatabaseConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub today: Option<TodayConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<EventsConfig>,
}

impl Config {
    /// Reads the configuration from the application data directory,
    /// falling back to defaults when no file exists.
    pub fn read() -> Result<Config> {
        let config_file_path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;
        Self::read_from(&config_file_path)
    }

    pub fn read_from(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let config_str = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_str)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_file_path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;
        self.save_to(&config_file_path)
    }

    /// Writes the configuration as pretty-printed JSON, replacing any existing file.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let config_file = File::create(path)?;
        serde_json::to_writer_pretty(&config_file, &self)?;
        Ok(())
    }

    /// Effective Today limits.
    pub fn today_limits(&self) -> TodayLimits {
        self.today.as_ref().map(TodayLimits::from).unwrap_or_default()
    }

    /// Effective default for audit listings.
    pub fn event_limit(&self) -> usize {
        self.events.as_ref().map(|events| events.list_limit).unwrap_or(DEFAULT_EVENT_LIMIT)
    }

    /// Interactive setup, pre-filled with the current values.
    pub fn init() -> Result<Self> {
        let mut config = Self::read().unwrap_or_default();

        msg_print!(Message::ConfigModuleDatabase);
        let current_path = config
            .database
            .as_ref()
            .and_then(|database| database.path.as_ref())
            .map(|path| path.display().to_string())
            .unwrap_or_default();
        let path: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptDatabasePath.to_string())
            .default(current_path)
            .allow_empty(true)
            .interact_text()?;
        config.database = match path.trim() {
            "" => None,
            path => Some(DatabaseConfig {
                path: Some(PathBuf::from(path)),
            }),
        };

        msg_print!(Message::ConfigModuleToday);
        let today = config.today.clone().unwrap_or_default();
        config.today = Some(TodayConfig {
            limit_urgent: Input::with_theme(&ColorfulTheme::default())
                .with_prompt(Message::PromptLimitUrgent.to_string())
                .default(today.limit_urgent)
                .interact_text()?,
            limit_due: Input::with_theme(&ColorfulTheme::default())
                .with_prompt(Message::PromptLimitDue.to_string())
                .default(today.limit_due)
                .interact_text()?,
        });

        msg_print!(Message::ConfigModuleEvents);
        let events = config.events.clone().unwrap_or_default();
        config.events = Some(EventsConfig {
            list_limit: Input::with_theme(&ColorfulTheme::default())
                .with_prompt(Message::PromptEventLimit.to_string())
                .default(events.list_limit)
                .interact_text()?,
        });

        Ok(config)
    }
}
