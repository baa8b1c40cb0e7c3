//! Configuration module for schemagram.
//!
//! Handles the TOML settings file, environment variables and connection
//! resolution.

mod connection;
mod settings;

pub use connection::{ConnectionConfig, ConnectionError, ENV_DB_SCHEMA, ENV_DB_URL};
pub use settings::{
    expand_env_vars, ConnectionSettings, LoggingSettings, ServerSettings, SessionSettings,
    Settings, SettingsError,
};
