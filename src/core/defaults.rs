use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};
use crate::paths;
use crate::utils::io;

/// Root configuration structure for monthshift.json
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MonthshiftConfig {
    #[serde(default)]
    pub defaults: Defaults,
}

/// All configurable defaults that can be overridden via monthshift.json
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Defaults {
    /// Extensions (without dot) treated as documents. Case-insensitive.
    #[serde(default = "default_document_extensions")]
    pub document_extensions: Vec<String>,

    #[serde(default = "default_temp_suffix")]
    pub temp_suffix: String,

    /// Extension of the staged copy, always the writable package form.
    #[serde(default = "default_temp_extension")]
    pub temp_extension: String,

    #[serde(default)]
    pub include_hidden: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            document_extensions: default_document_extensions(),
            temp_suffix: default_temp_suffix(),
            temp_extension: default_temp_extension(),
            include_hidden: false,
        }
    }
}

impl Defaults {
    /// Reject values that would make a run unsafe or meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.document_extensions.iter().all(|e| e.trim().is_empty()) {
            return Err(Error::config_invalid_value(
                "defaults.document_extensions",
                Some(self.document_extensions.join(",")),
                "at least one extension is required",
            ));
        }
        for (key, value) in [
            ("defaults.temp_suffix", &self.temp_suffix),
            ("defaults.temp_extension", &self.temp_extension),
        ] {
            if value.contains(['/', '\\']) || value.contains("..") {
                return Err(Error::config_invalid_value(
                    key,
                    Some(value.clone()),
                    "must not contain path separators or '..'",
                ));
            }
        }
        if self.temp_suffix.is_empty() {
            return Err(Error::config_invalid_value(
                "defaults.temp_suffix",
                Some(self.temp_suffix.clone()),
                "temp suffix must not be empty",
            ));
        }
        if !self.temp_extension.starts_with('.') || self.temp_extension.len() < 2 {
            return Err(Error::config_invalid_value(
                "defaults.temp_extension",
                Some(self.temp_extension.clone()),
                "temp extension must start with '.'",
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Default value functions
// =============================================================================

fn default_document_extensions() -> Vec<String> {
    vec!["docx".to_string(), "docm".to_string()]
}

fn default_temp_suffix() -> String {
    "_temp".to_string()
}

fn default_temp_extension() -> String {
    ".docx".to_string()
}

// =============================================================================
// Loading functions
// =============================================================================

/// Load defaults, merging file config with built-in defaults.
/// If monthshift.json is missing or invalid, silently returns built-in defaults.
pub fn load_defaults() -> Defaults {
    load_config().defaults
}

/// Load the full monthshift.json config, falling back to defaults on any error.
pub fn load_config() -> MonthshiftConfig {
    paths::monthshift_json()
        .and_then(|path| load_config_from_path(&path))
        .unwrap_or_default()
}

/// Parse a config file. A missing file is an error so callers can fall back.
pub fn load_config_from_path(path: &Path) -> Result<MonthshiftConfig> {
    if !path.exists() {
        return Err(Error::other(format!("{} not found", path.display())));
    }

    let content = io::read_file(path, &format!("read {}", path.display()))?;

    serde_json::from_str(&content)
        .map_err(|e| Error::config_invalid_json(path.display().to_string(), e))
}

/// Save config to monthshift.json file (creates if missing).
pub fn save_config(config: &MonthshiftConfig) -> Result<()> {
    let path = paths::monthshift_json()?;

    let content = serde_json::to_string_pretty(config).map_err(|e| {
        Error::internal_json(e.to_string(), Some("serialize monthshift.json".to_string()))
    })?;

    io::write_file_atomic(&path, &content, &format!("write {}", path.display()))
}

/// Check if monthshift.json file exists
pub fn config_exists() -> bool {
    paths::monthshift_json()
        .map(|p| p.exists())
        .unwrap_or(false)
}

/// Delete monthshift.json file (reset to defaults)
pub fn reset_config() -> Result<bool> {
    let path = paths::monthshift_json()?;
    io::remove_file_if_exists(&path, &format!("delete {}", path.display()))
}

/// Get the path to monthshift.json (for display purposes)
pub fn config_path() -> Result<String> {
    Ok(paths::monthshift_json()?.display().to_string())
}

/// Get built-in defaults (ignoring any file config)
pub fn builtin_defaults() -> Defaults {
    Defaults::default()
}
