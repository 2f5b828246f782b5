use std::str::FromStr;

use store::keys::DEFAULT_NAMESPACE;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),
    #[error("Invalid value {value:?} for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Where the worker reads chat lines from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SourceMode {
    /// Stream the body of an HTTP(S) GET.
    #[default]
    Http,
    /// Read a local file, mostly for replays and tests.
    File,
}

impl FromStr for SourceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" | "https" => Ok(SourceMode::Http),
            "text" | "file" => Ok(SourceMode::File),
            other => Err(format!("expected `http` or `text`, got `{other}`")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub chat_interface_url: Option<String>,
    pub redis_url: String,
    pub redis_namespace: String,
    pub worker_mode: SourceMode,
    pub host: String,
    pub port: u16,
}

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build the config from any variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|value| !value.trim().is_empty());

        let redis_url = match get("REDIS_URL") {
            Some(url) => url,
            None => {
                let host = get("REDIS_HOST").ok_or(ConfigError::Missing("REDIS_HOST"))?;
                let port = get("REDIS_PORT").ok_or(ConfigError::Missing("REDIS_PORT"))?;
                let port = parse_port("REDIS_PORT", &port)?;
                format!("redis://{host}:{port}")
            }
        };

        let worker_mode = match get("RESPONSE_STREAM_MODE") {
            Some(mode) => mode
                .parse::<SourceMode>()
                .map_err(|reason| ConfigError::Invalid {
                    var: "RESPONSE_STREAM_MODE",
                    value: mode,
                    reason,
                })?,
            None => SourceMode::default(),
        };

        let port = match get("BACKEND_PORT").or_else(|| get("PORT")) {
            Some(port) => parse_port("PORT", &port)?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            chat_interface_url: get("CHAT_INTERFACE_URL"),
            redis_url,
            redis_namespace: get("REDIS_NAMESPACE").unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
            worker_mode,
            host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
        })
    }

    /// The worker cannot start without a source.
    pub fn chat_interface_url(&self) -> Result<&str, ConfigError> {
        self.chat_interface_url
            .as_deref()
            .ok_or(ConfigError::Missing("CHAT_INTERFACE_URL"))
    }
}

fn parse_port(var: &'static str, value: &str) -> Result<u16, ConfigError> {
    value
        .trim()
        .parse::<u16>()
        .map_err(|e| ConfigError::Invalid {
            var,
            value: value.to_string(),
            reason: e.to_string(),
        })
}
