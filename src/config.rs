use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "taskboard.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub server: ServerConfig,
    pub client: ClientConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub data_file: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            data_file: PathBuf::from("tasks.json"),
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientConfig {
    pub api_url: String,
    /// Where the theme preference survives between sessions.
    pub prefs_file: PathBuf,
    pub log_file: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:5000/api".to_string(),
            prefs_file: PathBuf::from(".taskboard_prefs.json"),
            log_file: PathBuf::from("taskboard.log"),
        }
    }
}

impl Config {
    /// Loads `path`, falling back to defaults when the file does not exist.
    /// Relative file paths are resolved against the config's directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config: Self = match fs::read_to_string(path) {
            Ok(data) => serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        if let Some(base) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    fn resolve_paths(&mut self, base: &Path) {
        for file in [
            &mut self.server.data_file,
            &mut self.client.prefs_file,
            &mut self.client.log_file,
        ] {
            if file.is_relative() {
                *file = base.join(&*file);
            }
        }
    }

    /// Writes a default config and an empty task collection into `dir`.
    /// Returns `false` when a config already exists there.
    pub fn init(dir: &Path) -> Result<bool, ConfigError> {
        let config_path = dir.join(DEFAULT_CONFIG_FILE);
        if config_path.exists() {
            return Ok(false);
        }
        let config = Config::default();
        fs::create_dir_all(dir).map_err(io_err(dir))?;
        let body = serde_json::to_string_pretty(&config).map_err(|source| ConfigError::Parse {
            path: config_path.clone(),
            source,
        })?;
        fs::write(&config_path, body).map_err(io_err(&config_path))?;

        let data_path = dir.join(&config.server.data_file);
        if !data_path.exists() {
            fs::write(&data_path, "[]").map_err(io_err(&data_path))?;
        }
        Ok(true)
    }
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> ConfigError {
    let path = path.to_path_buf();
    move |source| ConfigError::Io { path, source }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config.server.bind_address(), "127.0.0.1:5000");
        assert_eq!(config.client.api_url, ClientConfig::default().api_url);
        assert_eq!(config.server.data_file, dir.path().join("tasks.json"));
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("taskboard.json");
        fs::write(&path, r#"{"server":{"port":8080}}"#).unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.client.api_url, ClientConfig::default().api_url);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("taskboard.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn init_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::init(dir.path()).unwrap());
        assert!(dir.path().join("tasks.json").exists());
        assert!(!Config::init(dir.path()).unwrap());
    }

    #[test]
    fn loaded_paths_point_at_what_init_wrote() {
        let dir = tempfile::tempdir().unwrap();
        let board = dir.path().join("board");
        assert!(Config::init(&board).unwrap());

        let config = Config::load(&board.join(DEFAULT_CONFIG_FILE)).unwrap();
        assert_eq!(config.server.data_file, board.join("tasks.json"));
        assert!(config.server.data_file.exists());
        assert_eq!(config.client.log_file, board.join("taskboard.log"));
        assert_eq!(config.client.prefs_file, board.join(".taskboard_prefs.json"));
    }

    #[test]
    fn absolute_paths_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let elsewhere = tempfile::tempdir().unwrap();
        let data_file = elsewhere.path().join("tasks.json");
        let path = dir.path().join("taskboard.json");
        fs::write(
            &path,
            serde_json::json!({ "server": { "dataFile": data_file } }).to_string(),
        )
        .unwrap();
        assert_eq!(Config::load(&path).unwrap().server.data_file, data_file);
    }

    #[test]
    fn bare_file_name_stays_relative_to_cwd() {
        let config = Config::load(Path::new("definitely-absent-taskboard.json")).unwrap();
        assert_eq!(config, Config::default());
    }
}
