//! Haul configuration.
//!
//! Loaded from `~/.haul/config.toml` (or `$HAUL_HOME/config.toml`). Every key
//! is optional and a missing file means defaults:
//!
//! ```toml
//! api-key = "5b3ce3597851110001cf6248..."
//! default-driver = "a3b0"
//!
//! [rules]
//! average-speed = 55.0
//! fuel-mile-interval = 900.0
//! ```

use std::env;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::rules::HosRules;

/// Environment variable that overrides the `~/.haul` root.
pub const HOME_ENV: &str = "HAUL_HOME";

/// Environment variable holding the OpenRouteService key.
pub const API_KEY_ENV: &str = "ORS_API_KEY";

/// Haul configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// OpenRouteService API key.
    /// Used when neither `--api-key` nor `ORS_API_KEY` is set.
    pub api_key: Option<String>,

    /// Driver (UUID or prefix) used by `trip plan` when `--driver` is omitted.
    pub default_driver: Option<String>,

    /// Overrides for individual rule values; unset keys keep the
    /// regulatory defaults.
    pub rules: HosRules,
}

impl Config {
    /// Load config from `<home>/config.toml`.
    /// A missing file yields the defaults; an unreadable or invalid one is an error.
    pub fn load() -> Result<Self, String> {
        let path = Self::path().ok_or("could not determine home directory")?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .map_err(|e| format!("failed to read {}: {e}", path.display()))?;

        Self::from_toml(&contents).map_err(|e| format!("invalid config at {}: {e}", path.display()))
    }

    /// Parses and validates config file contents.
    pub fn from_toml(contents: &str) -> Result<Self, String> {
        let config: Self = toml::from_str(contents).map_err(|e| e.to_string())?;
        config.rules.validate().map_err(|e| e.to_string())?;
        Ok(config)
    }

    /// The config file path: `<home>/config.toml`.
    pub fn path() -> Option<PathBuf> {
        home().map(|h| h.join("config.toml"))
    }

    /// Resolves the routing API key: the explicit flag, then `ORS_API_KEY`,
    /// then the config file.
    pub fn resolve_api_key(&self, explicit: Option<&str>) -> Option<String> {
        pick_api_key(
            explicit,
            env::var(API_KEY_ENV).ok().as_deref(),
            self.api_key.as_deref(),
        )
    }
}

/// The Haul home directory: `$HAUL_HOME` or `~/.haul/`.
pub fn home() -> Option<PathBuf> {
    match env::var_os(HOME_ENV) {
        Some(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
        _ => dirs::home_dir().map(|h| h.join(".haul")),
    }
}

/// First non-blank key in resolution order.
fn pick_api_key(
    explicit: Option<&str>,
    from_env: Option<&str>,
    from_config: Option<&str>,
) -> Option<String> {
    [explicit, from_env, from_config]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|k| !k.is_empty())
        .map(String::from)
}
