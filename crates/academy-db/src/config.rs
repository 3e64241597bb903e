//! # Configuration
//!
//! Where the database lives, how the pool is sized, and whether the
//! sample content is seeded at startup.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     ACADEMY_DB_PATH=/srv/academy/academy.db                            │
//! │     ACADEMY_SEED_MODE=await                                            │
//! │     ACADEMY_MAX_CONNECTIONS=8                                          │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/site/academy.toml (Linux)                                │
//! │     ~/Library/Application Support/com.academy.site/academy.toml        │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     database in the platform data dir, SeedMode::Background            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [database]
//! path = "/srv/academy/academy.db"   # ":memory:" for a throwaway database
//! max_connections = 4
//! busy_timeout_ms = 5000
//!
//! [seed]
//! mode = "background"  # background | await | off
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::pool::DbConfig;

/// File name of the config file inside the platform config dir.
pub const CONFIG_FILE_NAME: &str = "academy.toml";

/// File name of the database inside the platform data dir.
pub const DATABASE_FILE_NAME: &str = "academy.db";

/// `database.path` value selecting an in-memory database.
pub const IN_MEMORY_PATH: &str = ":memory:";

pub const ENV_DB_PATH: &str = "ACADEMY_DB_PATH";
pub const ENV_SEED_MODE: &str = "ACADEMY_SEED_MODE";
pub const ENV_MAX_CONNECTIONS: &str = "ACADEMY_MAX_CONNECTIONS";

// =============================================================================
// Config Error
// =============================================================================

/// Errors while loading or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config file is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config could not be serialized: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// No home directory to derive the platform dirs from.
    #[error("No platform directory available; set {ENV_DB_PATH}")]
    NoPlatformDir,
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Seed Mode
// =============================================================================

/// Whether startup seeding runs, and whether the handle waits for it.
///
/// ## Mode Comparison
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  BACKGROUND (Default)                                                  │
/// │  • Seeder runs on a spawned task                                       │
/// │  • The handle is returned at once                                      │
/// │  • The first page read may see empty stores                            │
/// │                                                                         │
/// │  AWAIT                                                                 │
/// │  • The handle is returned after the seed commits                       │
/// │  • The first page read sees the sample content                         │
/// │                                                                         │
/// │  OFF                                                                   │
/// │  • No seeding; stores stay as they are                                 │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedMode {
    #[default]
    Background,
    Await,
    Off,
}

impl std::fmt::Display for SeedMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeedMode::Background => write!(f, "background"),
            SeedMode::Await => write!(f, "await"),
            SeedMode::Off => write!(f, "off"),
        }
    }
}

impl std::str::FromStr for SeedMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "background" | "bg" => Ok(SeedMode::Background),
            "await" | "blocking" => Ok(SeedMode::Await),
            "off" | "disabled" | "none" => Ok(SeedMode::Off),
            other => Err(ConfigError::Invalid(format!(
                "Unknown seed mode: '{}'. Valid options: background, await, off",
                other
            ))),
        }
    }
}

// =============================================================================
// Database Settings
// =============================================================================

/// The `[database]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// Database file. Defaults to `academy.db` in the platform data dir.
    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,

    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_ms: u64,
}

fn default_max_connections() -> u32 {
    4
}
fn default_min_connections() -> u32 {
    1
}
fn default_connect_timeout() -> u64 {
    30
}
fn default_idle_timeout() -> u64 {
    600
}
fn default_busy_timeout() -> u64 {
    5000
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: None,
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            busy_timeout_ms: default_busy_timeout(),
        }
    }
}

impl DatabaseSettings {
    fn is_in_memory(&self) -> bool {
        self.path.as_deref() == Some(Path::new(IN_MEMORY_PATH))
    }
}

/// The `[seed]` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeedSettings {
    #[serde(default)]
    pub mode: SeedMode,
}

// =============================================================================
// App Config
// =============================================================================

/// Complete configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub seed: SeedSettings,
}

impl AppConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`academy.toml`, or `config_path` when given)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        Self::load_with(config_path, |key| std::env::var(key).ok())
    }

    /// Like [`AppConfig::load`] but reads the environment through `env`.
    pub fn load_with<F>(config_path: Option<PathBuf>, env: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides(env);
        config.validate()?;

        Ok(config)
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or(ConfigError::NoPlatformDir)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&path, toml::to_string_pretty(self)?)?;

        info!(?path, "Config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        let db = &self.database;

        if db.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "max_connections must be greater than 0".into(),
            ));
        }

        if db.min_connections > db.max_connections {
            return Err(ConfigError::Invalid(format!(
                "min_connections ({}) exceeds max_connections ({})",
                db.min_connections, db.max_connections
            )));
        }

        if db.path.as_ref().is_some_and(|p| p.as_os_str().is_empty()) {
            return Err(ConfigError::Invalid("database path is empty".into()));
        }

        Ok(())
    }

    fn apply_env_overrides<F>(&mut self, env: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = env(ENV_DB_PATH) {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = Some(PathBuf::from(path));
        }

        if let Some(mode) = env(ENV_SEED_MODE) {
            match mode.parse() {
                Ok(parsed) => {
                    debug!(mode = %mode, "Overriding seed mode from environment");
                    self.seed.mode = parsed;
                }
                Err(_) => warn!(mode = %mode, "Unknown seed mode in environment"),
            }
        }

        if let Some(max) = env(ENV_MAX_CONNECTIONS) {
            match max.parse::<u32>() {
                Ok(n) => self.database.max_connections = n,
                Err(_) => warn!(value = %max, "Invalid max connections in environment"),
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Returns the default database file path.
    pub fn default_database_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.data_dir().join(DATABASE_FILE_NAME))
    }

    fn project_dirs() -> Option<directories::ProjectDirs> {
        directories::ProjectDirs::from("com", "academy", "site")
    }

    /// Builds the storage configuration.
    ///
    /// Falls back to the platform data dir when no path is set, creating
    /// the directory if needed.
    pub fn db_config(&self) -> ConfigResult<DbConfig> {
        let settings = &self.database;

        let base = if settings.is_in_memory() {
            DbConfig::in_memory()
        } else {
            let path = match &settings.path {
                Some(path) => path.clone(),
                None => Self::default_database_path().ok_or(ConfigError::NoPlatformDir)?,
            };
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            DbConfig::new(path)
                .max_connections(settings.max_connections)
                .min_connections(settings.min_connections)
        };

        Ok(base
            .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
            .idle_timeout(Duration::from_secs(settings.idle_timeout_secs))
            .busy_timeout(Duration::from_millis(settings.busy_timeout_ms)))
    }

    pub fn seed_mode(&self) -> SeedMode {
        self.seed.mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_seed_mode_parsing() {
        assert_eq!("background".parse::<SeedMode>().unwrap(), SeedMode::Background);
        assert_eq!("AWAIT".parse::<SeedMode>().unwrap(), SeedMode::Await);
        assert_eq!("off".parse::<SeedMode>().unwrap(), SeedMode::Off);
        assert!("later".parse::<SeedMode>().is_err());
        assert_eq!(SeedMode::Await.to_string(), "await");
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.seed.mode, SeedMode::Background);
        assert_eq!(config.database.max_connections, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_file_then_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            "[database]\npath = \"/srv/site.db\"\nmax_connections = 2\n\n[seed]\nmode = \"off\"\n",
        )
        .unwrap();

        let config = AppConfig::load_with(Some(path.clone()), env_of(&[])).unwrap();
        assert_eq!(config.database.path, Some(PathBuf::from("/srv/site.db")));
        assert_eq!(config.database.max_connections, 2);
        assert_eq!(config.database.busy_timeout_ms, 5000);
        assert_eq!(config.seed.mode, SeedMode::Off);

        let config = AppConfig::load_with(
            Some(path),
            env_of(&[(ENV_SEED_MODE, "await"), (ENV_MAX_CONNECTIONS, "8")]),
        )
        .unwrap();
        assert_eq!(config.seed.mode, SeedMode::Await);
        assert_eq!(config.database.max_connections, 8);
    }

    #[test]
    fn test_bad_env_values_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_with(
            Some(dir.path().join("missing.toml")),
            env_of(&[(ENV_SEED_MODE, "sometimes"), (ENV_MAX_CONNECTIONS, "many")]),
        )
        .unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_invalid_toml_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[database\n").unwrap();

        assert!(matches!(
            AppConfig::load_with(Some(path), env_of(&[])),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_validation() {
        let mut config = AppConfig::default();
        config.database.max_connections = 0;
        assert!(config.validate().is_err());

        config.database.max_connections = 2;
        config.database.min_connections = 3;
        assert!(config.validate().is_err());

        config.database.min_connections = 1;
        config.database.path = Some(PathBuf::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_db_config_creates_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested").join("academy.db");
        let config = AppConfig::load_with(
            Some(dir.path().join("missing.toml")),
            env_of(&[(ENV_DB_PATH, db_path.to_str().unwrap())]),
        )
        .unwrap();

        let db_config = config.db_config().unwrap();
        assert_eq!(db_config.database_path, Some(db_path));
        assert!(dir.path().join("nested").is_dir());
        assert_eq!(db_config.busy_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_in_memory_path() {
        let mut config = AppConfig::default();
        config.database.path = Some(PathBuf::from(IN_MEMORY_PATH));
        assert!(config.db_config().unwrap().is_in_memory());
    }

    #[test]
    fn test_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conf").join(CONFIG_FILE_NAME);
        let mut config = AppConfig::default();
        config.seed.mode = SeedMode::Await;

        config.save(Some(path.clone())).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("[database]"));
        assert!(text.contains("[seed]"));
        assert_eq!(AppConfig::load_with(Some(path), env_of(&[])).unwrap(), config);
    }
}
