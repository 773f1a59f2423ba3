use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use encwatch_core::DownloadRoute;
use encwatch_engine::{EngineConfig, Endpoints, FetchSettings};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::logging::LogDestination;
use super::ui::render::{ContainerId, Containers};

pub const CONFIG_FILENAME: &str = "encwatch.ron";
pub const CONFIG_ENV: &str = "ENCWATCH_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {message}")]
    Read { path: PathBuf, message: String },
    #[error("failed to parse {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("invalid server url {url:?}: {message}")]
    ServerUrl { url: String, message: String },
    #[error("poll interval must be greater than zero")]
    ZeroPollInterval,
    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),
    #[error("completed and progress containers must differ, both are {0:?}")]
    SameContainer(String),
    #[error("container ids must not be empty")]
    EmptyContainer,
}

/// Settings read from `encwatch.ron`. Every field has a default, so a
/// partial file only overrides what it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server_url: String,
    pub status_path: String,
    pub download_prefix: String,
    pub upload_path: String,
    pub poll_interval_ms: u64,
    pub completed_container: String,
    pub progress_container: String,
    /// Container ids present on the rendered page. Both target containers
    /// must be among them.
    pub page_containers: Vec<String>,
    pub download_dir: PathBuf,
    pub html_snapshot: Option<PathBuf>,
    pub log_destination: LogDestination,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub max_status_bytes: u64,
    /// Stop watching after this many ticks; runs forever when unset.
    pub max_ticks: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let fetch = FetchSettings::default();
        Self {
            server_url: "http://127.0.0.1:8081".to_string(),
            status_path: "/ready".to_string(),
            download_prefix: DownloadRoute::DEFAULT_PREFIX.to_string(),
            upload_path: "/upload".to_string(),
            poll_interval_ms: 1000,
            completed_container: "dl_div".to_string(),
            progress_container: "progressBars".to_string(),
            page_containers: vec!["dl_div".to_string(), "progressBars".to_string()],
            download_dir: PathBuf::from("downloads"),
            html_snapshot: None,
            log_destination: LogDestination::default(),
            connect_timeout_ms: fetch.connect_timeout.as_millis() as u64,
            request_timeout_ms: fetch.request_timeout.as_millis() as u64,
            max_status_bytes: fetch.max_status_bytes,
            max_ticks: None,
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = url::Url::parse(&self.server_url).map_err(|err| ConfigError::ServerUrl {
            url: self.server_url.clone(),
            message: err.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::ServerUrl {
                url: self.server_url.clone(),
                message: format!("unsupported scheme {}", url.scheme()),
            });
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }
        if self.connect_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout("connect_timeout_ms"));
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout("request_timeout_ms"));
        }
        if self.completed_container.is_empty() || self.progress_container.is_empty() {
            return Err(ConfigError::EmptyContainer);
        }
        if self.completed_container == self.progress_container {
            return Err(ConfigError::SameContainer(self.completed_container.clone()));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn containers(&self) -> Containers {
        Containers::new(&self.completed_container, &self.progress_container)
    }

    pub fn page_containers(&self) -> Vec<ContainerId> {
        self.page_containers.iter().map(ContainerId::new).collect()
    }

    pub fn route(&self) -> DownloadRoute {
        DownloadRoute::new(&self.download_prefix)
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            max_status_bytes: self.max_status_bytes,
        }
    }

    pub fn engine_config(&self) -> Result<EngineConfig, ConfigError> {
        let endpoints = Endpoints::new(&self.server_url, &self.status_path, &self.upload_path)
            .map_err(|err| ConfigError::ServerUrl {
                url: self.server_url.clone(),
                message: err.to_string(),
            })?;
        Ok(EngineConfig {
            endpoints,
            fetch: self.fetch_settings(),
            download_dir: self.download_dir.clone(),
        })
    }
}

/// `$ENCWATCH_CONFIG` if set, else `./encwatch.ron`.
pub fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILENAME))
}

/// Reads the config file. `Ok(None)` means there is no file and defaults apply.
pub fn load_config(path: &Path) -> Result<Option<AppConfig>, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                message: err.to_string(),
            })
        }
    };

    ron::from_str(&content)
        .map(Some)
        .map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
}
