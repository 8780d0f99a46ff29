// crates/sep2-client-http/src/config.rs

use crate::HttpTransport;
use crate::auth::{ClientCertificateAuth, LocalModeXTokenAuth, SessionAuth};
use sep2_client::{EndDeviceInterface, Lfdi, Sep2Error};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Prefix of every configuration environment variable.
pub const ENV_PREFIX: &str = "TWENTYTHIRTYDOTFIVE_";

/// Optional dotenv file read by [`ClientConfig::from_env`].
pub const ENV_FILE: &str = ".env.local";

/// Connection settings of an aggregator client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub server_url: String,
    pub certificate_path: PathBuf,
    pub key_path: PathBuf,
    /// Aggregator LFDI, hex.
    pub client_lfdi: String,
    /// Client certificate auth when set, X-Token auth otherwise.
    pub use_ssl_auth: bool,
}

#[derive(Debug)]
pub enum ConfigError {
    /// A required setting is absent.
    Missing(String),
    /// A setting could not be interpreted.
    Invalid { key: String, value: String },
    Json(serde_json::Error),
    /// Building the client failed.
    Client(Sep2Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing(key) => write!(f, "Missing setting {}", key),
            Self::Invalid { key, value } => write!(f, "Invalid value '{}' for {}", value, key),
            Self::Json(e) => write!(f, "Invalid JSON configuration: {}", e),
            Self::Client(e) => write!(f, "Client setup failed: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl From<Sep2Error> for ConfigError {
    fn from(e: Sep2Error) -> Self {
        Self::Client(e)
    }
}

impl ClientConfig {
    /// Reads `TWENTYTHIRTYDOTFIVE_*` variables, after loading `.env.local` if present.
    ///
    /// Variables already set in the environment take precedence over the file.
    pub fn from_env() -> Result<Self, ConfigError> {
        if dotenv::from_filename(ENV_FILE).is_ok() {
            log::debug!("Loaded settings from {}", ENV_FILE);
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, keys being the full
    /// variable names (`TWENTYTHIRTYDOTFIVE_SERVER_URL`, ...).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            let key = format!("{}{}", ENV_PREFIX, name);
            lookup(&key).ok_or(ConfigError::Missing(key))
        };
        Ok(Self {
            server_url: get("SERVER_URL")?,
            certificate_path: PathBuf::from(get("CERTIFICATE_PATH")?),
            key_path: PathBuf::from(get("KEY_PATH")?),
            client_lfdi: get("CLIENT_LFDI")?,
            use_ssl_auth: parse_flag(&format!("{}USE_SSL_AUTH", ENV_PREFIX), &get("USE_SSL_AUTH")?)?,
        })
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn lfdi(&self) -> Result<Lfdi, ConfigError> {
        Lfdi::new(&self.client_lfdi).map_err(|_| ConfigError::Invalid {
            key: format!("{}CLIENT_LFDI", ENV_PREFIX),
            value: self.client_lfdi.clone(),
        })
    }

    /// The authentication scheme selected by `use_ssl_auth`.
    pub fn auth(&self) -> Result<Box<dyn SessionAuth>, ConfigError> {
        if self.use_ssl_auth {
            Ok(Box::new(ClientCertificateAuth::new(
                &self.certificate_path,
                &self.key_path,
            )))
        } else {
            Ok(Box::new(LocalModeXTokenAuth::new(self.lfdi()?)))
        }
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Builds a connected client for the aggregator described by `config`.
pub fn create_client(config: &ClientConfig) -> Result<EndDeviceInterface<HttpTransport>, ConfigError> {
    let transport = HttpTransport::new(&config.server_url, Some(config.auth()?))?;
    Ok(EndDeviceInterface::new(transport, config.lfdi()?)?)
}
