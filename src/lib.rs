//! Common functionality for parkprice.
#![warn(missing_docs)]
use std::path::PathBuf;

pub mod cli;
pub mod error;
pub mod id;
pub mod input;
pub mod log;
pub mod lot;
pub mod observation;
pub mod output;
pub mod parameters;
pub mod settings;
pub mod simulation;

#[cfg(test)]
mod fixture;

/// Get the path to the config directory for parkprice
pub fn get_parkprice_config_dir() -> PathBuf {
    let Some(mut config_dir) = dirs::config_dir() else {
        // No config directory on this platform, so fall back to the current directory
        return PathBuf::new();
    };

    config_dir.push("parkprice");
    config_dir
}
