use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const CONFIG_VERSION: u32 = 1;

const DEFAULT_PORT: u16 = 8000;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub version: u32,
    /// JSON array of song records.
    pub catalog_path: String,
    /// Root of the `h[0]/h[0..2]/h` file tree.
    pub files_root: String,
    pub port: u16,
    pub bind_addr: String,
    pub cors_permissive: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            catalog_path: "song.json".to_string(),
            files_root: "files".to_string(),
            port: DEFAULT_PORT,
            bind_addr: "0.0.0.0".to_string(),
            cors_permissive: true,
        }
    }
}

impl ServerConfig {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Yaml(serde_yaml::Error),
    Env(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "io error: {}", err),
            ConfigError::Yaml(err) => write!(f, "yaml error: {}", err),
            ConfigError::Env(message) => write!(f, "environment error: {}", message),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::Yaml(err)
    }
}

pub fn config_path_from_env() -> PathBuf {
    match env::var("CIRCLES_CONFIG") {
        Ok(value) if !value.trim().is_empty() => PathBuf::from(value),
        _ => default_config_path(),
    }
}

fn default_config_path() -> PathBuf {
    match env::current_exe() {
        Ok(exe) => exe
            .parent()
            .map(|dir| dir.join("config.yaml"))
            .unwrap_or_else(|| PathBuf::from("config.yaml")),
        Err(_) => PathBuf::from("config.yaml"),
    }
}

pub fn load_or_create_config(path: &Path) -> Result<(ServerConfig, bool), ConfigError> {
    if path.exists() {
        let contents = fs::read_to_string(path)?;
        let mut config: ServerConfig = serde_yaml::from_str(&contents)?;
        if config.version < CONFIG_VERSION {
            config.version = CONFIG_VERSION;
        }
        if config.catalog_path.trim().is_empty() {
            config.catalog_path = "song.json".to_string();
        }
        if config.files_root.trim().is_empty() {
            config.files_root = "files".to_string();
        }
        if config.bind_addr.trim().is_empty() {
            config.bind_addr = "0.0.0.0".to_string();
        }
        if config.port == 0 {
            config.port = DEFAULT_PORT;
        }
        return Ok((config, false));
    }

    let config = ServerConfig::default();
    save_config(path, &config)?;
    Ok((config, true))
}

pub fn save_config(path: &Path, config: &ServerConfig) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let contents = serde_yaml::to_string(config)?;
    fs::write(path, contents)?;
    Ok(())
}

/// `CIRCLES_CATALOG`, `CIRCLES_FILES_ROOT` and `CIRCLES_PORT` win over the file.
pub fn apply_env_overrides(config: &mut ServerConfig) -> Result<(), ConfigError> {
    apply_overrides(config, |key| env::var(key).ok())
}

fn apply_overrides(
    config: &mut ServerConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
    if let Some(value) = lookup("CIRCLES_CATALOG") {
        config.catalog_path = value;
    }
    if let Some(value) = lookup("CIRCLES_FILES_ROOT") {
        config.files_root = value;
    }
    if let Some(value) = lookup("CIRCLES_PORT") {
        config.port = value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Env(format!("invalid CIRCLES_PORT: {}", value)))?;
    }
    Ok(())
}

pub fn resolve_path(config_path: &Path, value: &str) -> PathBuf {
    let raw = PathBuf::from(value);
    if raw.is_absolute() {
        return raw;
    }
    let base = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    base.join(raw)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};

    use super::{apply_overrides, load_or_create_config, resolve_path, ConfigError, ServerConfig};

    #[test]
    fn creates_default_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conf").join("config.yaml");
        let (config, created) = load_or_create_config(&path).unwrap();
        assert!(created);
        assert!(path.exists());
        assert_eq!(config, ServerConfig::default());

        let (again, created) = load_or_create_config(&path).unwrap();
        assert!(!created);
        assert_eq!(again, config);
    }

    #[test]
    fn fills_blank_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "catalog_path: ''\nport: 0\nfiles_root: /srv/osu\n").unwrap();
        let (config, _) = load_or_create_config(&path).unwrap();
        assert_eq!(config.catalog_path, "song.json");
        assert_eq!(config.port, 8000);
        assert_eq!(config.files_root, "/srv/osu");
        assert!(config.cors_permissive);
    }

    #[test]
    fn rejects_broken_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "port: [nope").unwrap();
        assert!(matches!(load_or_create_config(&path), Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn env_overrides_take_precedence() {
        let vars: HashMap<&str, &str> = [
            ("CIRCLES_CATALOG", "/data/song.json"),
            ("CIRCLES_FILES_ROOT", "/data/files"),
            ("CIRCLES_PORT", "9000"),
        ]
        .into_iter()
        .collect();
        let mut config = ServerConfig::default();
        apply_overrides(&mut config, |key| vars.get(key).map(|v| v.to_string())).unwrap();
        assert_eq!(config.catalog_path, "/data/song.json");
        assert_eq!(config.files_root, "/data/files");
        assert_eq!(config.listen_addr(), "0.0.0.0:9000");
    }

    #[test]
    fn rejects_bad_port_override() {
        let mut config = ServerConfig::default();
        let result = apply_overrides(&mut config, |key| {
            (key == "CIRCLES_PORT").then(|| "http".to_string())
        });
        assert!(matches!(result, Err(ConfigError::Env(_))));
    }

    #[test]
    fn resolves_relative_to_config_dir() {
        let config_path = Path::new("/etc/circles/config.yaml");
        assert_eq!(
            resolve_path(config_path, "song.json"),
            PathBuf::from("/etc/circles/song.json")
        );
        assert_eq!(
            resolve_path(config_path, "/data/files"),
            PathBuf::from("/data/files")
        );
        assert_eq!(
            resolve_path(Path::new("config.yaml"), "files"),
            PathBuf::from("./files")
        );
    }
}
