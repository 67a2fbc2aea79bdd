use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crypto::Argon2Params;
use crate::errors::{OniLockError, Result};
use crate::vault::ManagerOptions;

/// Environment variable that overrides the OniLock home directory.
pub const HOME_ENV: &str = "ONILOCK_HOME";

/// Directory under the user's home used when `ONILOCK_HOME` is unset.
const DEFAULT_HOME_DIR: &str = ".onilock";

/// User-level configuration, loaded from `<home>/config.toml`.
///
/// Every field has a sensible default so OniLock works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Profile to use when none is specified.
    #[serde(default = "default_profile")]
    pub default_profile: String,

    /// Directory (relative to home) where new vault files are created.
    #[serde(default = "default_vault_dir")]
    pub vault_dir: String,

    /// File name (relative to home) of the shared setup document.
    #[serde(default = "default_setup_file")]
    pub setup_file: String,

    /// Argon2 memory cost in KiB (default: 64 MB).
    #[serde(default = "default_argon2_memory_kib")]
    pub argon2_memory_kib: u32,

    /// Argon2 iteration count (default: 3).
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,

    /// Argon2 parallelism degree (default: 4).
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_profile() -> String {
    "default".to_string()
}

fn default_vault_dir() -> String {
    "vault".to_string()
}

fn default_setup_file() -> String {
    "setup.oni".to_string()
}

fn default_argon2_memory_kib() -> u32 {
    65_536 // 64 MB
}

fn default_argon2_iterations() -> u32 {
    3
}

fn default_argon2_parallelism() -> u32 {
    4
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_profile: default_profile(),
            vault_dir: default_vault_dir(),
            setup_file: default_setup_file(),
            argon2_memory_kib: default_argon2_memory_kib(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the home directory.
    pub const FILE_NAME: &'static str = "config.toml";

    /// Load settings from `<home>/config.toml`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(home: &Path) -> Result<Self> {
        let config_path = home.join(Self::FILE_NAME);

        if !config_path.exists() {
            tracing::debug!(path = %config_path.display(), "no config file; using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            OniLockError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        Ok(settings)
    }

    /// Full path to the setup document.
    ///
    /// Example: `~/.onilock/setup.oni`
    pub fn setup_path(&self, home: &Path) -> PathBuf {
        home.join(&self.setup_file)
    }

    /// Directory for vault files created at the default location.
    ///
    /// Example: `~/.onilock/vault`
    pub fn vault_dir(&self, home: &Path) -> PathBuf {
        home.join(&self.vault_dir)
    }

    /// Convert the Argon2 settings into crypto-layer params.
    pub fn argon2_params(&self) -> Argon2Params {
        Argon2Params {
            memory_kib: self.argon2_memory_kib,
            iterations: self.argon2_iterations,
            parallelism: self.argon2_parallelism,
        }
    }

    /// Everything a `VaultManager` needs to operate on `profile`.
    pub fn manager_options(&self, home: &Path, profile: &str) -> ManagerOptions {
        ManagerOptions {
            profile: profile.to_string(),
            setup_path: self.setup_path(home),
            vault_dir: self.vault_dir(home),
            argon2: self.argon2_params(),
        }
    }
}

/// The OniLock home directory: `$ONILOCK_HOME`, else `~/.onilock`.
pub fn home_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }

    directories::BaseDirs::new()
        .map(|d| d.home_dir().join(DEFAULT_HOME_DIR))
        .ok_or_else(|| OniLockError::ConfigError("cannot determine home directory".into()))
}

// ── Tests ────────────────────────────────────────────────────────────
