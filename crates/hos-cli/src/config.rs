//! Configuration loading and management.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use hos_core::HosLimits;
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Regulatory thresholds used by `check` and `evaluate`.
    pub limits: HosLimits,
}

impl Config {
    /// Loads configuration from the default location, then `config_path`,
    /// then the environment.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (HOS_*), e.g. HOS_LIMITS__DRIVING_HOURS
        figment = figment.merge(Env::prefixed("HOS_").split("__"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for hos.
///
/// On Linux: `~/.config/hos`
pub fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("hos"))
}
