/// Configuration management for the clinic client core
use crate::error::{ClinicError, ClinicResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Main client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// Remote API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL, e.g. https://clinic.example.com
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

/// Where the user collection lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UsersBacking {
    /// `/users` REST endpoints
    Remote,
    /// Legacy local mirror
    Local,
}

/// Durable local storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_directory: PathBuf,
    /// Prefix applied to every key
    pub namespace: String,
    pub users_backing: UsersBacking,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: "http://localhost:3000".to_string(),
                timeout_secs: 10,
                user_agent: format!("clinic-core/{}", env!("CARGO_PKG_VERSION")),
            },
            storage: StorageConfig {
                data_directory: PathBuf::from("./data"),
                namespace: "medtech-".to_string(),
                users_backing: UsersBacking::Remote,
            },
            logging: LoggingConfig {
                level: "debug".to_string(),
                json: false,
            },
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> ClinicResult<Self> {
        dotenv::dotenv().ok();

        let defaults = Self::default();

        let base_url = env::var("CLINIC_API_URL")
            .unwrap_or(defaults.api.base_url)
            .trim_end_matches('/')
            .to_string();
        let timeout_secs = match env::var("CLINIC_HTTP_TIMEOUT_SECS") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ClinicError::Config(format!("Invalid timeout: {}", raw)))?,
            Err(_) => defaults.api.timeout_secs,
        };
        let user_agent = env::var("CLINIC_USER_AGENT").unwrap_or(defaults.api.user_agent);

        let data_directory = env::var("CLINIC_DATA_DIRECTORY")
            .map(PathBuf::from)
            .unwrap_or(defaults.storage.data_directory);
        let namespace =
            env::var("CLINIC_STORAGE_NAMESPACE").unwrap_or(defaults.storage.namespace);
        let users_backing = match env::var("CLINIC_USERS_BACKING")
            .unwrap_or_else(|_| "remote".to_string())
            .to_lowercase()
            .as_str()
        {
            "remote" => UsersBacking::Remote,
            "local" => UsersBacking::Local,
            other => {
                return Err(ClinicError::Config(format!(
                    "Invalid users backing: {}",
                    other
                )))
            }
        };

        let level = env::var("RUST_LOG").unwrap_or(defaults.logging.level);
        let json = env::var("CLINIC_LOG_FORMAT")
            .map(|v| v.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        Ok(ClientConfig {
            api: ApiConfig {
                base_url,
                timeout_secs,
                user_agent,
            },
            storage: StorageConfig {
                data_directory,
                namespace,
                users_backing,
            },
            logging: LoggingConfig { level, json },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> ClinicResult<()> {
        let url = self.api.base_url.as_str();
        if url.is_empty() {
            return Err(ClinicError::Config("API URL cannot be empty".to_string()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ClinicError::Config(format!(
                "API URL must be http(s): {}",
                url
            )));
        }

        if self.api.timeout_secs == 0 {
            return Err(ClinicError::Config(
                "HTTP timeout must be at least one second".to_string(),
            ));
        }

        if self.storage.namespace.is_empty() {
            return Err(ClinicError::Config(
                "Storage namespace cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}
