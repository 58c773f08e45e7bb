//! IoT Privacy configuration management

use crate::error::{Error, Result};
use crate::privacy::PolicyConfig;
use crate::simulator::Scenario;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Salt used when neither the config file nor the environment sets one
pub const DEFAULT_SALT: &str = "PROJECT_SECRET_KEY_2026";

/// Environment variable overriding the pseudonymization salt
pub const SALT_ENV: &str = "IOT_PRIVACY_SALT";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Privacy controls applied to every packet
    pub policy: PolicyConfig,

    /// Secret material
    pub secret: SecretConfig,

    /// Packet simulator settings
    pub simulator: SimulatorConfig,

    /// Audit log settings
    pub audit: AuditConfig,
}

/// Secret configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecretConfig {
    /// Salt appended to identifiers before hashing
    pub salt: String,
}

impl Default for SecretConfig {
    fn default() -> Self {
        Self {
            salt: DEFAULT_SALT.to_string(),
        }
    }
}

impl std::fmt::Debug for SecretConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretConfig")
            .field("salt", &"[REDACTED]")
            .finish()
    }
}

/// Simulator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Device family to simulate
    pub scenario: Scenario,

    /// Delay between packets in milliseconds
    pub interval_ms: u64,

    /// Packets to generate (0 = until interrupted)
    pub count: u64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            scenario: Scenario::SmartHome,
            interval_ms: 1500,
            count: 0,
        }
    }
}

/// Audit configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Directory for CSV exports (none = no export)
    pub export_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, or from the default location if it exists, or
    /// fall back to defaults. The salt environment variable wins over both.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match default_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };

        if let Ok(salt) = std::env::var(SALT_ENV) {
            if !salt.is_empty() {
                config.secret.salt = salt;
            }
        }
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Self::from_toml_str(&content)
    }

    /// Check value constraints
    pub fn validate(&self) -> Result<()> {
        if self.secret.salt.is_empty() {
            return Err(Error::Config("secret.salt must not be empty".to_string()));
        }
        Ok(())
    }

    /// Render as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }
}

/// Default configuration file location
pub fn default_path() -> Option<PathBuf> {
    dirs_next::config_dir().map(|p| p.join("iot-privacy").join("config.toml"))
}
