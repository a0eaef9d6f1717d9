use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum SyncError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Invalid zone file: {0}")]
    InvalidZoneFile(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("HTTP error {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::Io(err.to_string())
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        SyncError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    #[error("API key is not set")]
    MissingApiKey,

    #[error("Invalid nameservers: {0}")]
    InvalidNameservers(String),

    #[error("Invalid TTL: {0}")]
    InvalidTtl(String),

    #[error("Invalid timeout: {0}")]
    InvalidTimeout(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    Io(String),
}
