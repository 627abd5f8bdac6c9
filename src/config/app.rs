//! Application configuration loading from config.toml
//!
//! The file carries the workflow policy switches and the load coefficients used to seed the
//! first settings row. Every key is optional; a missing file yields the built-in defaults.

use crate::core::settings::LoadRules;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Default, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Workflow policy switches
    pub workflow: WorkflowPolicy,
    /// Coefficients seeded when the settings table is empty
    pub load_defaults: LoadRules,
}

/// Policy decisions that deployments disagree on
#[derive(Debug, Default, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct WorkflowPolicy {
    /// Allow submitting a statement that has no line items
    pub allow_empty_submission: bool,
    /// Activating a phase deactivates every other phase, not only those of its semester
    pub single_active_phase: bool,
}

/// Loads the application configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A key has the wrong type
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path_ref.display()),
    })
}

/// Loads `./config.toml`, or `CONFIG_PATH` if set; falls back to defaults when the file
/// does not exist.
pub fn load_default_config() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    if !Path::new(&path).exists() {
        info!("No configuration file at {}, using built-in defaults", path);
        return Ok(AppConfig::default());
    }
    load_config(path)
}
