use clap::{Args, Subcommand};
use serde::Serialize;
use serde_json::Value;

use monthshift::defaults::{self, Defaults, MonthshiftConfig};

use super::CmdResult;

const KNOWN_KEYS: [&str; 4] = [
    "document_extensions",
    "temp_suffix",
    "temp_extension",
    "include_hidden",
];

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Display configuration (merged defaults + file)
    Show {
        /// Show only built-in defaults (ignore monthshift.json)
        #[arg(long)]
        builtin: bool,
    },
    /// Set a default (e.g. `include_hidden true`, `document_extensions '["docx"]'`)
    Set {
        /// Key under `defaults`
        key: String,
        /// Value to set (JSON; bare words are taken as strings)
        value: String,
    },
    /// Reset configuration to built-in defaults (deletes monthshift.json)
    Reset,
    /// Show the path to monthshift.json
    Path,
}

#[derive(Debug, Serialize)]
pub struct ConfigOutput {
    command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    config: Option<MonthshiftConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    defaults: Option<Defaults>,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exists: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    deleted: Option<bool>,
}

impl ConfigOutput {
    fn new(command: &str) -> Self {
        Self {
            command: command.to_string(),
            config: None,
            defaults: None,
            path: None,
            exists: None,
            key: None,
            deleted: None,
        }
    }
}

pub fn run(args: ConfigArgs, _global: &crate::commands::GlobalArgs) -> CmdResult<ConfigOutput> {
    match args.command {
        ConfigCommand::Show { builtin } => show(builtin),
        ConfigCommand::Set { key, value } => set(&key, &value),
        ConfigCommand::Reset => reset(),
        ConfigCommand::Path => path(),
    }
}

fn show(builtin: bool) -> CmdResult<ConfigOutput> {
    let mut output = ConfigOutput::new("config.show");
    if builtin {
        output.defaults = Some(defaults::builtin_defaults());
    } else {
        output.config = Some(defaults::load_config());
    }
    Ok((output, 0))
}

fn set(key: &str, value_str: &str) -> CmdResult<ConfigOutput> {
    let config = apply_setting(defaults::load_config(), key, value_str)?;
    defaults::save_config(&config)?;

    let mut output = ConfigOutput::new("config.set");
    output.config = Some(config);
    output.key = Some(key.to_string());
    Ok((output, 0))
}

/// Set `defaults.<key>` on a copy of `config` and check the result is usable.
fn apply_setting(config: MonthshiftConfig, key: &str, value_str: &str) -> monthshift::Result<MonthshiftConfig> {
    if !KNOWN_KEYS.contains(&key) {
        return Err(monthshift::Error::validation_invalid_argument(
            "key",
            format!("Unknown config key '{}'", key),
            Some(key.to_string()),
            Some(KNOWN_KEYS.iter().map(|k| k.to_string()).collect()),
        ));
    }

    let value: Value =
        serde_json::from_str(value_str).unwrap_or_else(|_| Value::String(value_str.to_string()));

    let mut config_json = serde_json::to_value(&config).map_err(|e| {
        monthshift::Error::internal_json(e.to_string(), Some("serialize config".to_string()))
    })?;
    config_json["defaults"][key] = value;

    let config: MonthshiftConfig = serde_json::from_value(config_json).map_err(|e| {
        monthshift::Error::validation_invalid_json(
            e,
            Some(format!("set defaults.{}", key)),
            Some(value_str.chars().take(200).collect::<String>()),
        )
    })?;
    config.defaults.validate()?;

    Ok(config)
}

fn reset() -> CmdResult<ConfigOutput> {
    let deleted = defaults::reset_config()?;

    let mut output = ConfigOutput::new("config.reset");
    output.defaults = Some(defaults::builtin_defaults());
    output.path = Some(defaults::config_path()?);
    output.deleted = Some(deleted);
    Ok((output, 0))
}

fn path() -> CmdResult<ConfigOutput> {
    let mut output = ConfigOutput::new("config.path");
    output.path = Some(defaults::config_path()?);
    output.exists = Some(defaults::config_exists());
    Ok((output, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_parses_json_values() {
        let config = apply_setting(MonthshiftConfig::default(), "include_hidden", "true").unwrap();
        assert!(config.defaults.include_hidden);

        let config =
            apply_setting(MonthshiftConfig::default(), "document_extensions", r#"["docx"]"#).unwrap();
        assert_eq!(config.defaults.document_extensions, vec!["docx"]);
    }

    #[test]
    fn set_takes_bare_words_as_strings() {
        let config = apply_setting(MonthshiftConfig::default(), "temp_suffix", "_staged").unwrap();
        assert_eq!(config.defaults.temp_suffix, "_staged");
    }

    #[test]
    fn set_rejects_unknown_key() {
        let err = apply_setting(MonthshiftConfig::default(), "colour", "red").unwrap_err();
        assert_eq!(err.code.as_str(), "validation.invalid_argument");
        assert_eq!(err.details["tried"][0], "document_extensions");
    }

    #[test]
    fn set_rejects_wrong_type() {
        let err = apply_setting(MonthshiftConfig::default(), "include_hidden", "maybe").unwrap_err();
        assert_eq!(err.code.as_str(), "validation.invalid_json");
    }

    #[test]
    fn set_rejects_unusable_value() {
        let err = apply_setting(MonthshiftConfig::default(), "temp_extension", "docx").unwrap_err();
        assert_eq!(err.code.as_str(), "config.invalid_value");
    }
}
