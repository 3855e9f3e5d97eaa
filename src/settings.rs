//! Code for loading program settings.
use crate::get_parkprice_config_dir;
use crate::input::read_toml;
use crate::log::DEFAULT_LOG_LEVEL;
use anyhow::{Context, Result, anyhow, bail};
use documented::DocumentedFields;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::path::{Path, PathBuf};

const SETTINGS_FILE_NAME: &str = "settings.toml";

const DEFAULT_SETTINGS_FILE_HEADER: &str = "# This file contains the program settings for parkprice.
# Uncomment a setting to change it from its default value.
";

/// Default log level for program
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

/// Get the path to where the settings file will be read from
pub fn get_settings_file_path() -> PathBuf {
    let mut path = get_parkprice_config_dir();
    path.push(SETTINGS_FILE_NAME);

    path
}

/// Program settings from config file
#[derive(Debug, DocumentedFields, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// The default program log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Whether to overwrite output files by default
    #[serde(default)]
    pub overwrite: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            overwrite: false,
        }
    }
}

impl Settings {
    /// Read the contents of the user's settings file.
    ///
    /// If the file is not present, default values for settings will be used
    ///
    /// # Returns
    ///
    /// The program settings as a `Settings` struct or an error if the file is invalid
    pub fn load() -> Result<Settings> {
        Self::load_from_path(&get_settings_file_path())
    }

    /// Read settings from the specified path, falling back to defaults if there is no file
    fn load_from_path(file_path: &Path) -> Result<Settings> {
        if !file_path.is_file() {
            return Ok(Settings::default());
        }

        read_toml(file_path)
    }

    /// A settings file with every setting commented out at its default value.
    ///
    /// Each setting is preceded by its documentation.
    pub fn default_file_contents() -> Result<String> {
        let toml::Value::Table(defaults) = toml::Value::try_from(Settings::default())
            .context("Could not convert settings to TOML")?
        else {
            bail!("Settings did not serialise to a TOML table");
        };

        let mut contents = DEFAULT_SETTINGS_FILE_HEADER.to_string();
        for (name, value) in &defaults {
            let docs = Settings::get_field_docs(name)
                .map_err(|_| anyhow!("Missing doc comment for setting {name}"))?;

            contents.push('\n');
            for line in docs.lines() {
                writeln!(contents, "# # {}", line.trim())?;
            }
            writeln!(contents, "# {name} = {value}")?;
        }

        Ok(contents)
    }
}
