//! Service configuration: a TOML file plus `TODO_*` environment overrides.
//!
//! Every field has a default, and a missing file is the same as an empty
//! one.

use serde::Deserialize;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use todo_db::PoolSettings;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address the HTTP server binds.
    pub listen: SocketAddr,
    pub database: DatabaseConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite store file, created on first start.
    pub path: String,
    pub busy_timeout_ms: u64,
    pub max_connections: u32,
    /// Fill an empty store with sample users and todos. Development only.
    pub seed_sample_data: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive, e.g. "info" or "todo_server=debug,info".
    pub filter: String,
    pub json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from((Ipv4Addr::LOCALHOST, 3000)),
            database: DatabaseConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        let pool = PoolSettings::default();
        Self {
            path: "database.db".to_string(),
            busy_timeout_ms: pool.busy_timeout_ms,
            max_connections: pool.max_connections,
            seed_sample_data: false,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

impl DatabaseConfig {
    pub fn pool_settings(&self) -> PoolSettings {
        PoolSettings {
            busy_timeout_ms: self.busy_timeout_ms,
            max_connections: self.max_connections,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// `TODO_CONFIG` if set, otherwise `config.toml` in the working directory.
pub fn config_path() -> PathBuf {
    std::env::var_os("TODO_CONFIG")
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Reads `path`, then applies the environment:
/// `TODO_LISTEN`, `TODO_DB_PATH`, `TODO_SEED_SAMPLE_DATA`, `TODO_LOG`,
/// `TODO_LOG_JSON`. Unparsable override values are ignored.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    let mut config = read_file(path)?;

    override_from_env("TODO_LISTEN", &mut config.listen);
    override_from_env("TODO_DB_PATH", &mut config.database.path);
    override_flag_from_env("TODO_SEED_SAMPLE_DATA", &mut config.database.seed_sample_data);
    override_from_env("TODO_LOG", &mut config.log.filter);
    override_flag_from_env("TODO_LOG_JSON", &mut config.log.json);

    Ok(config)
}

fn read_file(path: &Path) -> Result<Config, ConfigError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn override_from_env<T: FromStr>(key: &str, slot: &mut T) {
    if let Some(value) = std::env::var(key).ok().and_then(|v| v.parse().ok()) {
        *slot = value;
    }
}

fn override_flag_from_env(key: &str, slot: &mut bool) {
    if let Some(flag) = std::env::var(key).ok().and_then(|v| parse_flag(&v)) {
        *slot = flag;
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim() {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let config = read_file(Path::new("/nonexistent/todo-config.toml"))
            .expect("missing file should fall back to defaults");
        assert_eq!(config.listen, SocketAddr::from(([127, 0, 0, 1], 3000)));
        assert_eq!(config.database.path, "database.db");
        assert_eq!(config.database.pool_settings(), PoolSettings::default());
        assert!(!config.database.seed_sample_data);
        assert_eq!(config.log.filter, "info");
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "listen = \"0.0.0.0:8080\"\n\n[database]\nseed_sample_data = true\n",
        )
        .unwrap();

        let config = read_file(&path).unwrap();
        assert_eq!(config.listen.port(), 8080);
        assert!(config.database.seed_sample_data);
        assert_eq!(config.database.path, "database.db");
        assert_eq!(config.database.max_connections, 8);
        assert!(!config.log.json);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[database\npath = ").unwrap();

        let err = read_file(&path).expect_err("should not parse");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn flags_accept_words_and_digits() {
        assert_eq!(parse_flag("true"), Some(true));
        assert_eq!(parse_flag("1"), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("false"), Some(false));
        assert_eq!(parse_flag("yes"), None);
    }
}
