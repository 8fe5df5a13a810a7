use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClonerError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for ClonerError {
    fn from(e: reqwest::Error) -> Self {
        ClonerError::Transport(e.to_string())
    }
}

impl From<serde_json::Error> for ClonerError {
    fn from(e: serde_json::Error) -> Self {
        ClonerError::MalformedResponse(e.to_string())
    }
}

impl From<crate::config::ConfigError> for ClonerError {
    fn from(e: crate::config::ConfigError) -> Self {
        ClonerError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ClonerError>;
