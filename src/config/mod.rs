/// Application configuration loaded from config.toml
pub mod app;

/// Database configuration and connection management
pub mod database;

pub use app::{AppConfig, WorkflowPolicy, load_config, load_default_config};
