//!
//! This module defines the settings the scanner reads, how they are loaded, and
//! the immutable snapshot every scan pass works from.
//! Supports the settings-store JSON document and a `diffspell.toml` file for the CLI.

use crate::section::ChangeKind;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;

/// Default configuration file name looked up by the CLI
pub const CONFIG_FILE_NAME: &str = "diffspell.toml";

/// Which kinds of diff rows are scanned
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, schemars::JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ScanOptions {
    /// Scan added rows
    #[serde(alias = "check-on-added-rows", alias = "check_on_added_rows")]
    pub check_on_added_rows: bool,

    /// Scan deleted rows
    #[serde(alias = "check-on-deleted-rows", alias = "check_on_deleted_rows")]
    pub check_on_deleted_rows: bool,

    /// Scan unchanged context rows
    #[serde(alias = "check-on-other-rows", alias = "check_on_other_rows")]
    pub check_on_other_rows: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            check_on_added_rows: true,
            check_on_deleted_rows: false,
            check_on_other_rows: true,
        }
    }
}

impl ScanOptions {
    /// Whether rows of `kind` are scanned
    pub fn is_enabled(&self, kind: ChangeKind) -> bool {
        match kind {
            ChangeKind::Added => self.check_on_added_rows,
            ChangeKind::Deleted => self.check_on_deleted_rows,
            ChangeKind::Unchanged => self.check_on_other_rows,
        }
    }

    /// True when no row kind is scanned at all
    pub fn is_empty(&self) -> bool {
        !self.check_on_added_rows && !self.check_on_deleted_rows && !self.check_on_other_rows
    }
}

/// The settings-store document
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, schemars::JsonSchema)]
#[serde(default, rename_all = "camelCase")]
#[schemars(description = "diffspell settings: row kinds to scan and words to always accept.")]
pub struct Settings {
    /// Words the user always accepts (stored lowercase)
    #[serde(alias = "user-dictionary", alias = "user_dictionary")]
    pub user_dictionary: Vec<String>,

    /// Row kinds to scan
    pub options: ScanOptions,
}

impl Settings {
    /// Parse a settings-store JSON document, failing on malformed input
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Parse a settings-store JSON document, falling back to defaults for
    /// anything missing or malformed. Never fails.
    pub fn from_json_lenient(json: &str) -> Self {
        match serde_json::from_str::<JsonValue>(json) {
            Ok(value) => Self::from_value_lenient(&value),
            Err(e) => {
                log::warn!("[diffspell-config] Ignoring unreadable settings document: {e}");
                Self::default()
            }
        }
    }

    /// Field-by-field extraction from an arbitrary JSON value
    pub fn from_value_lenient(value: &JsonValue) -> Self {
        let mut settings = Self::default();

        let Some(obj) = value.as_object() else {
            log::warn!("[diffspell-config] Settings document is not an object, using defaults");
            return settings;
        };

        if let Some(words) = obj.get("userDictionary").and_then(|v| v.as_array()) {
            settings.user_dictionary = words.iter().filter_map(|w| w.as_str()).map(str::to_string).collect();
        }

        if let Some(options) = obj.get("options").and_then(|v| v.as_object()) {
            let flag = |key: &str, default: bool| options.get(key).and_then(|v| v.as_bool()).unwrap_or(default);
            let defaults = ScanOptions::default();
            settings.options = ScanOptions {
                check_on_added_rows: flag("checkOnAddedRows", defaults.check_on_added_rows),
                check_on_deleted_rows: flag("checkOnDeletedRows", defaults.check_on_deleted_rows),
                check_on_other_rows: flag("checkOnOtherRows", defaults.check_on_other_rows),
            };
        }

        settings
    }

    /// Serialize back to the settings-store JSON document
    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Load settings from a file. `.json` files are read as a settings-store
    /// document, anything else as `diffspell.toml`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let is_json = path.extension().and_then(|e| e.to_str()) == Some("json");
        if is_json {
            let content = read_config_file(path)?;
            Self::from_json(&content)
        } else {
            Ok(FileConfig::load(path)?.settings())
        }
    }
}

/// On-disk `diffspell.toml`
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct FileConfig {
    /// Path to a word list or Hunspell `.dic` file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dictionary: Option<String>,

    /// Words the user always accepts
    #[serde(alias = "user_dictionary", alias = "userDictionary")]
    pub user_dictionary: Vec<String>,

    /// Row kinds to scan
    pub options: ScanOptions,
}

impl FileConfig {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = read_config_file(path)?;
        log::debug!("[diffspell-config] Loaded configuration from {}", path.display());
        Self::from_toml(&content)
    }

    /// Settings part of the file
    pub fn settings(&self) -> Settings {
        Settings {
            user_dictionary: self.user_dictionary.clone(),
            options: self.options,
        }
    }
}

fn read_config_file(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::IoError {
        source,
        path: path.display().to_string(),
    })
}

/// Parse the user-dictionary text area format: one word per line, trimmed
/// and lowercased. Blank lines are dropped.
pub fn parse_user_dictionary(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.trim().to_lowercase())
        .filter(|word| !word.is_empty())
        .collect()
}

/// Render a user dictionary back to its text area format
pub fn format_user_dictionary(words: &[String]) -> String {
    words.join("\n")
}

/// Immutable view of the settings used for one scan pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsSnapshot {
    options: ScanOptions,
    user_dictionary: HashSet<String>,
}

impl SettingsSnapshot {
    pub fn new(settings: &Settings) -> Self {
        let user_dictionary = settings
            .user_dictionary
            .iter()
            .map(|word| word.trim().to_lowercase())
            .filter(|word| !word.is_empty())
            .collect();
        Self {
            options: settings.options,
            user_dictionary,
        }
    }

    pub fn options(&self) -> ScanOptions {
        self.options
    }

    /// Whether rows of `kind` are scanned
    pub fn is_kind_enabled(&self, kind: ChangeKind) -> bool {
        self.options.is_enabled(kind)
    }

    /// Case-insensitive user dictionary lookup
    pub fn accepts_user_word(&self, word: &str) -> bool {
        !self.user_dictionary.is_empty() && self.user_dictionary.contains(&word.to_lowercase())
    }

    pub fn user_dictionary_len(&self) -> usize {
        self.user_dictionary.len()
    }
}

impl From<&Settings> for SettingsSnapshot {
    fn from(settings: &Settings) -> Self {
        Self::new(settings)
    }
}

/// Errors that can occur when loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("Failed to read config file at {path}: {source}")]
    IoError { source: io::Error, path: String },

    /// Failed to parse the configuration content (TOML or JSON)
    #[error("Failed to parse config: {0}")]
    ParseError(String),
}
