// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Application settings.
//!
//! # Loading Pipeline
//!
//! 1. Start from the built-in defaults
//! 2. Merge the YAML file named by `UALOOP_CONFIG`, if set
//! 3. Apply environment overrides
//! 4. Validate
//!
//! ```text
//! UALOOP_CONFIG=/etc/ualoop.yaml
//! UALOOP_ENDPOINT=opc.tcp://plc.local:4840
//! UALOOP_LOG_LEVEL=debug
//! UALOOP_LOG_FORMAT=json
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use ualoop_opcua::ClientSettings;

use crate::error::{BinError, BinResult};
use crate::logging::{is_known_level, LogFormat};

/// Names the settings file.
pub const ENV_CONFIG_PATH: &str = "UALOOP_CONFIG";

/// Overrides `client.endpoint`.
pub const ENV_ENDPOINT: &str = "UALOOP_ENDPOINT";

/// Overrides `log_level`.
pub const ENV_LOG_LEVEL: &str = "UALOOP_LOG_LEVEL";

/// Overrides `log_format`.
pub const ENV_LOG_FORMAT: &str = "UALOOP_LOG_FORMAT";

// =============================================================================
// AppSettings
// =============================================================================

/// Settings of the ualoop binary.
///
/// # Example
///
/// ```yaml
/// client:
///   endpoint: opc.tcp://plc.local:4840
///   subscription:
///     publishing_interval: 1s
/// retry_pause: 1s
/// iterate_timeout: 1s
/// log_level: debug
/// log_format: json
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    /// OPC UA client settings.
    #[serde(default)]
    pub client: ClientSettings,

    /// Pause between failed connect attempts.
    #[serde(default = "default_retry_pause")]
    #[serde(with = "ualoop_opcua::types::humantime_serde")]
    pub retry_pause: Duration,

    /// Bound on one event-processing iteration.
    #[serde(default = "default_iterate_timeout")]
    #[serde(with = "ualoop_opcua::types::humantime_serde")]
    pub iterate_timeout: Duration,

    /// Log level used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log output format.
    #[serde(default)]
    pub log_format: LogFormat,

    /// Query and log the server's endpoints once before connecting.
    #[serde(default)]
    pub discover_endpoints_on_start: bool,
}

fn default_retry_pause() -> Duration {
    Duration::from_secs(1)
}

fn default_iterate_timeout() -> Duration {
    Duration::from_secs(1)
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            client: ClientSettings::default(),
            retry_pause: default_retry_pause(),
            iterate_timeout: default_iterate_timeout(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            discover_endpoints_on_start: false,
        }
    }
}

impl AppSettings {
    /// Validates the settings.
    pub fn validate(&self) -> BinResult<()> {
        self.client.validate()?;

        if self.retry_pause.is_zero() {
            return Err(BinError::config("retry_pause must be greater than 0"));
        }

        if self.iterate_timeout.is_zero() {
            return Err(BinError::config("iterate_timeout must be greater than 0"));
        }

        if !is_known_level(&self.log_level) {
            return Err(BinError::config(format!(
                "unknown log level '{}'",
                self.log_level
            )));
        }

        Ok(())
    }

    /// Applies environment overrides read through `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> BinResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup(ENV_ENDPOINT) {
            self.client.endpoint = endpoint;
        }

        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.log_level = level;
        }

        if let Some(format) = lookup(ENV_LOG_FORMAT) {
            self.log_format = format
                .parse()
                .map_err(|e: BinError| e.with_context(ENV_LOG_FORMAT))?;
        }

        Ok(())
    }
}

// =============================================================================
// Loading
// =============================================================================

/// Loads the settings from the process environment.
pub fn load_settings() -> BinResult<AppSettings> {
    let path = env::var_os(ENV_CONFIG_PATH).map(PathBuf::from);
    load_settings_from(path.as_deref(), |key| env::var(key).ok())
}

/// Loads the settings from an optional file and an environment lookup.
pub fn load_settings_from<F>(path: Option<&Path>, lookup: F) -> BinResult<AppSettings>
where
    F: Fn(&str) -> Option<String>,
{
    let mut settings = match path {
        Some(path) => read_settings_file(path)?,
        None => AppSettings::default(),
    };

    settings.apply_env_overrides(lookup)?;
    settings.validate()?;

    Ok(settings)
}

fn read_settings_file(path: &Path) -> BinResult<AppSettings> {
    let content = fs::read_to_string(path).map_err(|e| {
        BinError::from(e).with_context(format!("reading {}", path.display()))
    })?;

    serde_yaml::from_str(&content).map_err(|e| {
        BinError::config(format!("failed to parse {}: {}", path.display(), e))
    })
}

// =============================================================================
// Tests
// =============================================================================
