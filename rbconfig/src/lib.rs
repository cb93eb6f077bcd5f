//! # RadioBot Configuration Module
//!
//! This module provides configuration management for RadioBot, including:
//! - Loading configuration from YAML files
//! - Merging with the embedded default configuration
//! - Environment variable overrides (`RADIOBOT_CONFIG__SECTION__KEY`)
//! - Typed getters and setters with logged fallbacks
//! - Transparent decryption of the push secret
//!
//! ## Usage
//!
//! ```no_run
//! use rbconfig::get_config;
//!
//! let config = get_config();
//! let port = config.get_http_port();
//! let snapshot = config.get_snapshot_path()?;
//! let secret = config.get_push_secret()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{anyhow, Result};
use dirs::home_dir;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Number, Value};
use std::{
    env, fs,
    net::UdpSocket,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};
use tracing::{info, warn};

// Chiffrement du secret partagé
pub mod encryption;

// Configuration par défaut intégrée
const DEFAULT_CONFIG: &str = include_str!("radiobot.yaml");

lazy_static! {
    static ref CONFIG: Arc<Config> =
        Arc::new(Config::load_config("").expect("Failed to load RadioBot configuration"));
}

const ENV_CONFIG_DIR: &str = "RADIOBOT_CONFIG";
const ENV_PREFIX: &str = "RADIOBOT_CONFIG__";
const CONFIG_DIR_NAME: &str = ".radiobot";

const DEFAULT_HTTP_PORT: u16 = 8080;
const DEFAULT_LOG_BUFFER_CAPACITY: usize = 1000;
const DEFAULT_LOG_MIN_LEVEL: &str = "INFO";
const DEFAULT_LOG_ENABLE_CONSOLE: bool = true;
const DEFAULT_BOT_NAME: &str = "radiobot";
const DEFAULT_QUEUE: &str = "general";
const DEFAULT_SNAPSHOT_DIR: &str = "snapshots";
const DEFAULT_SNAPSHOT_FILE: &str = "radiobot.json";
const DEFAULT_SNAPSHOT_INTERVAL_SECS: usize = 30;

/// Macro to generate getter/setter for usize values with default
macro_rules! impl_usize_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> Result<usize> {
            match self.get_value($path)? {
                Value::Number(n) => Ok(n.as_u64().map(|v| v as usize).unwrap_or($default)),
                _ => Ok($default),
            }
        }

        pub fn $setter(&self, size: usize) -> Result<()> {
            self.set_value($path, Value::Number(Number::from(size)))
        }
    };
}

/// Macro to generate getter/setter for bool values with default
macro_rules! impl_bool_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> Result<bool> {
            match self.get_value($path)? {
                Value::Bool(b) => Ok(b),
                _ => Ok($default),
            }
        }

        pub fn $setter(&self, value: bool) -> Result<()> {
            self.set_value($path, Value::Bool(value))
        }
    };
}

/// Macro to generate getter/setter for string values with default
macro_rules! impl_string_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> String {
            match self.get_value($path) {
                Ok(Value::String(s)) if !s.trim().is_empty() => s,
                _ => $default.to_string(),
            }
        }

        pub fn $setter(&self, value: impl Into<String>) -> Result<()> {
            self.set_value($path, Value::String(value.into()))
        }
    };
}

/// A track declared in the `radio.seed` section.
///
/// These tracks are loaded into the catalog at startup, before any snapshot
/// is restored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedTrack {
    pub link: String,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// Configuration manager for RadioBot
///
/// # Examples
///
/// ```no_run
/// use rbconfig::Config;
///
/// let config = Config::load_config("/tmp/radiobot")?;
/// println!("HTTP port: {}", config.get_http_port());
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Debug)]
pub struct Config {
    config_dir: String,
    path: String,
    data: Mutex<Value>,
}

impl Clone for Config {
    fn clone(&self) -> Self {
        Self {
            config_dir: self.config_dir.clone(),
            path: self.path.clone(),
            data: Mutex::new(self.data().clone()),
        }
    }
}

impl Config {
    /// Finds a config directory by trying different locations in order
    fn find_config_dir(directory: &str) -> String {
        if !directory.is_empty() {
            return directory.to_string();
        }

        if let Ok(env_path) = env::var(ENV_CONFIG_DIR) {
            info!(env_var = ENV_CONFIG_DIR, path = %env_path, "Trying to load config from env");
            return env_path;
        }

        if Path::new(CONFIG_DIR_NAME).exists() {
            return CONFIG_DIR_NAME.to_string();
        }

        if let Some(home) = home_dir() {
            let home_config = home.join(CONFIG_DIR_NAME);
            if home_config.exists() {
                return home_config.to_string_lossy().to_string();
            }
        }

        CONFIG_DIR_NAME.to_string()
    }

    /// Creates the directory if needed and checks read/write access
    fn validate_config_dir(path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path)?;
        }

        if !path.is_dir() {
            return Err(anyhow!("{} n'est pas un répertoire", path.display()));
        }

        let test_file = path.join(".write_test");
        fs::write(&test_file, b"test")?;
        fs::remove_file(&test_file)?;

        fs::read_dir(path)?;

        Ok(())
    }

    /// Determines and validates the configuration directory
    ///
    /// The directory is searched in the following order:
    /// 1. The provided `directory` parameter if not empty
    /// 2. The `RADIOBOT_CONFIG` environment variable
    /// 3. `.radiobot` in the current directory
    /// 4. `.radiobot` in the user's home directory
    pub fn config_dir(directory: &str) -> Result<String> {
        let dir_path = Self::find_config_dir(directory);
        Self::validate_config_dir(Path::new(&dir_path))?;
        Ok(dir_path)
    }

    /// Loads the configuration from the specified directory
    ///
    /// The embedded default is merged with `config.yaml` (if present), keys
    /// are lower-cased, environment overrides are applied and the result is
    /// written back to `config.yaml`.
    pub fn load_config(directory: &str) -> Result<Self> {
        let config_dir = Self::config_dir(directory)?;
        info!(config_dir = %config_dir, "Using config directory");

        let path = Path::new(&config_dir)
            .join("config.yaml")
            .to_string_lossy()
            .to_string();

        let mut config_value: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;

        match fs::read(&path) {
            Ok(data) => {
                info!(config_file = %path, "Loaded config file");
                let external: Value = serde_yaml::from_slice(&data)?;
                merge_yaml(&mut config_value, &external);
            }
            Err(_) => {
                info!(config_file = %path, "Config file not found, using default embedded config");
            }
        }

        let mut config_value = lower_keys_value(config_value);
        apply_env_overrides(&mut config_value);

        let config = Config {
            config_dir,
            path,
            data: Mutex::new(config_value),
        };

        config.save()?;
        Ok(config)
    }

    // Un mutex empoisonné garde une valeur YAML cohérente : on la reprend
    fn data(&self) -> MutexGuard<'_, Value> {
        self.data.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns the directory holding `config.yaml`
    pub fn get_config_dir(&self) -> &str {
        &self.config_dir
    }

    /// Saves the current configuration to the config.yaml file
    pub fn save(&self) -> Result<()> {
        let yaml = serde_yaml::to_string(&*self.data())?;
        fs::write(&self.path, yaml)?;
        Ok(())
    }

    /// Sets a configuration value at the specified path and saves it
    ///
    /// `path` is an array of keys, e.g. `&["host", "http_port"]`.
    pub fn set_value(&self, path: &[&str], value: Value) -> Result<()> {
        set_value_internal(&mut self.data(), path, value)?;
        self.save()
    }

    /// Gets a configuration value at the specified path
    pub fn get_value(&self, path: &[&str]) -> Result<Value> {
        get_value_internal(&self.data(), path)
    }

    fn resolve_path(&self, raw: &str) -> PathBuf {
        let path = Path::new(raw);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            Path::new(&self.config_dir).join(path)
        }
    }

    /// Récupère un répertoire géré par la configuration
    ///
    /// Le répertoire peut être absolu ou relatif au répertoire de
    /// configuration. Il est créé s'il n'existe pas ; la valeur par défaut
    /// est enregistrée si la clé est absente.
    pub fn get_managed_dir(&self, path: &[&str], default: &str) -> Result<String> {
        let dir_path = match self.get_value(path) {
            Ok(Value::String(s)) if !s.trim().is_empty() => s,
            _ => {
                self.set_managed_dir(path, default.to_string())?;
                default.to_string()
            }
        };

        let absolute = self.resolve_path(&dir_path);
        if !absolute.exists() {
            fs::create_dir_all(&absolute)?;
            info!(directory = %absolute.display(), "Created managed directory");
        }
        Ok(absolute.to_string_lossy().to_string())
    }

    /// Définit un répertoire géré par la configuration
    pub fn set_managed_dir(&self, path: &[&str], directory: String) -> Result<()> {
        self.set_value(path, Value::String(directory))
    }

    /// Gets the base URL (host part) for the HTTP server
    ///
    /// Falls back to the guessed local IP address when not configured.
    pub fn get_base_url(&self) -> String {
        match self.get_value(&["host", "base_url"]) {
            Ok(Value::String(s)) if !s.is_empty() => s,
            Ok(_) => {
                warn!("Base URL is not a string or empty, guessing local address");
                guess_local_ip()
            }
            Err(err) => {
                warn!("Failed to get base URL: {}, guessing local address", err);
                guess_local_ip()
            }
        }
    }

    /// Gets the HTTP port from configuration, defaulting to 8080
    pub fn get_http_port(&self) -> u16 {
        let fallback = |reason: String| {
            warn!("{}, using default {}", reason, DEFAULT_HTTP_PORT);
            DEFAULT_HTTP_PORT
        };

        match self.get_value(&["host", "http_port"]) {
            Ok(Value::Number(n)) => match n.as_u64().and_then(|p| u16::try_from(p).ok()) {
                Some(port) => port,
                None => fallback(format!("HTTP port {} out of range", n)),
            },
            Ok(Value::String(s)) => match s.parse::<u16>() {
                Ok(port) => port,
                Err(_) => fallback(format!("Invalid HTTP port '{}'", s)),
            },
            Ok(_) => fallback("HTTP port not a number or string".to_string()),
            Err(err) => fallback(format!("Failed to get HTTP port: {}", err)),
        }
    }

    /// Sets the HTTP port in configuration
    pub fn set_http_port(&self, port: u16) -> Result<()> {
        self.set_value(&["host", "http_port"], Value::Number(Number::from(port)))
    }

    impl_usize_config!(
        get_log_cache_size,
        set_log_cache_size,
        &["host", "logger", "buffer_capacity"],
        DEFAULT_LOG_BUFFER_CAPACITY
    );

    impl_bool_config!(
        get_log_enable_console,
        set_log_enable_console,
        &["host", "logger", "enable_console"],
        DEFAULT_LOG_ENABLE_CONSOLE
    );

    /// Récupère le niveau de log minimum depuis la configuration
    pub fn get_log_min_level(&self) -> Result<String> {
        match self.get_value(&["host", "logger", "min_level"])? {
            Value::String(s) => Ok(s),
            _ => Ok(DEFAULT_LOG_MIN_LEVEL.to_string()),
        }
    }

    /// Définit le niveau de log minimum dans la configuration
    pub fn set_log_min_level(&self, level: String) -> Result<()> {
        self.set_value(&["host", "logger", "min_level"], Value::String(level))
    }

    impl_string_config!(
        get_bot_name,
        set_bot_name,
        &["radio", "bot_name"],
        DEFAULT_BOT_NAME
    );

    impl_string_config!(
        get_default_queue,
        set_default_queue,
        &["radio", "default_queue"],
        DEFAULT_QUEUE
    );

    impl_usize_config!(
        get_snapshot_interval_secs,
        set_snapshot_interval_secs,
        &["radio", "snapshot", "interval_secs"],
        DEFAULT_SNAPSHOT_INTERVAL_SECS
    );

    /// Periodic snapshot interval; `None` when set to 0 (disabled)
    pub fn get_snapshot_interval(&self) -> Option<Duration> {
        let secs = self.get_snapshot_interval_secs().unwrap_or_else(|e| {
            warn!("Failed to get snapshot interval: {}, using default", e);
            DEFAULT_SNAPSHOT_INTERVAL_SECS
        });
        (secs > 0).then(|| Duration::from_secs(secs as u64))
    }

    /// Full path of the snapshot file
    ///
    /// The file name comes from `radio.snapshot.file` and lives inside the
    /// managed directory `radio.snapshot.directory`. An absolute file name
    /// is used as is.
    pub fn get_snapshot_path(&self) -> Result<PathBuf> {
        let file = match self.get_value(&["radio", "snapshot", "file"]) {
            Ok(Value::String(s)) if !s.trim().is_empty() => s,
            _ => DEFAULT_SNAPSHOT_FILE.to_string(),
        };

        if Path::new(&file).is_absolute() {
            return Ok(PathBuf::from(file));
        }

        let dir = self.get_managed_dir(&["radio", "snapshot", "directory"], DEFAULT_SNAPSHOT_DIR)?;
        Ok(Path::new(&dir).join(file))
    }

    /// Returns the shared secret gating state-changing requests
    ///
    /// `None` when unset or blank. Values stored as `encrypted:...` are
    /// decrypted with the machine key.
    pub fn get_push_secret(&self) -> Result<Option<String>> {
        match self.get_value(&["radio", "push_secret"]) {
            Ok(Value::String(s)) if !s.trim().is_empty() => {
                Ok(Some(encryption::get_secret(s.trim())?))
            }
            Ok(Value::Number(n)) => Ok(Some(n.to_string())),
            _ => Ok(None),
        }
    }

    /// Stores the push secret, encrypted with the machine key
    pub fn set_push_secret(&self, secret: &str) -> Result<()> {
        let stored = if secret.is_empty() {
            String::new()
        } else {
            encryption::encrypt_secret(secret)?
        };
        self.set_value(&["radio", "push_secret"], Value::String(stored))
    }

    /// Tracks preloaded into the catalog at startup
    pub fn get_seed_tracks(&self) -> Vec<SeedTrack> {
        let value = match self.get_value(&["radio", "seed"]) {
            Ok(Value::Sequence(seq)) => seq,
            Ok(Value::Null) | Err(_) => return Vec::new(),
            Ok(_) => {
                warn!("radio.seed is not a list, ignoring it");
                return Vec::new();
            }
        };

        value
            .into_iter()
            .filter_map(|entry| match serde_yaml::from_value::<SeedTrack>(entry) {
                Ok(seed) => Some(seed),
                Err(e) => {
                    warn!("Skipping invalid seed entry: {}", e);
                    None
                }
            })
            .collect()
    }
}

/// Returns the global configuration instance
///
/// The configuration is loaded lazily on first access.
pub fn get_config() -> Arc<Config> {
    CONFIG.clone()
}

/// Guesses the address other hosts can reach us on
pub fn guess_local_ip() -> String {
    UdpSocket::bind("0.0.0.0:0")
        .and_then(|socket| {
            socket.connect("8.8.8.8:80")?;
            socket.local_addr()
        })
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|_| "127.0.0.1".to_string())
}

fn set_value_internal(data: &mut Value, path: &[&str], value: Value) -> Result<()> {
    let Some((head, rest)) = path.split_first() else {
        *data = value;
        return Ok(());
    };

    let Value::Mapping(map) = data else {
        return Err(anyhow!("Current node is not a map"));
    };

    let key = Value::String(head.to_lowercase());
    if rest.is_empty() {
        map.insert(key, value);
        Ok(())
    } else {
        let entry = map.entry(key).or_insert(Value::Mapping(Mapping::new()));
        set_value_internal(entry, rest, value)
    }
}

fn get_value_internal(data: &Value, path: &[&str]) -> Result<Value> {
    let mut current = data;
    for (i, key) in path.iter().enumerate() {
        let Value::Mapping(map) = current else {
            return Err(anyhow!("Path {} is not a mapping", path[..i].join(".")));
        };
        current = map
            .get(&Value::String(key.to_lowercase()))
            .ok_or_else(|| anyhow!("Path {} does not exist", path[..=i].join(".")))?;
    }
    Ok(current.clone())
}

fn apply_env_overrides(config: &mut Value) {
    for (key, value) in env::vars() {
        let Some(stripped) = key.strip_prefix(ENV_PREFIX) else {
            continue;
        };
        let key_path = stripped.split("__").collect::<Vec<_>>();
        let yaml_value =
            serde_yaml::from_str::<Value>(&value).unwrap_or_else(|_| Value::String(value.clone()));
        if let Err(e) = set_value_internal(config, &key_path, yaml_value) {
            warn!(variable = %key, "Ignoring environment override: {}", e);
        }
    }
}

fn lower_keys_value(value: Value) -> Value {
    match value {
        Value::Mapping(map) => Value::Mapping(
            map.into_iter()
                .map(|(k, v)| {
                    let k = match k {
                        Value::String(s) => Value::String(s.to_lowercase()),
                        other => other,
                    };
                    (k, lower_keys_value(v))
                })
                .collect(),
        ),
        Value::Sequence(seq) => Value::Sequence(seq.into_iter().map(lower_keys_value).collect()),
        other => other,
    }
}

/// Merges external YAML configuration into default configuration
///
/// Mappings are merged key by key; scalars and sequences from `external`
/// replace the default.
fn merge_yaml(default: &mut Value, external: &Value) {
    match (default, external) {
        (Value::Mapping(dmap), Value::Mapping(emap)) => {
            for (k, v) in emap {
                match dmap.get_mut(k) {
                    Some(dv) => merge_yaml(dv, v),
                    None => {
                        dmap.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        (d, e) => *d = e.clone(),
    }
}
