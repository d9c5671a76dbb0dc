use std::fmt::Debug;

use http::StatusCode;

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("transport error: {0}")]
    Transport(#[source] anyhow::Error),
    #[error("unexpected response shape: {0}")]
    Shape(#[source] anyhow::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    pub fn transport(err: impl Into<anyhow::Error>) -> Self {
        Self::Transport(err.into())
    }

    pub fn shape(err: impl Into<anyhow::Error>) -> Self {
        Self::Shape(err.into())
    }
}

/// Non-success status from an upstream API, kept typed so callers can
/// branch on the code instead of matching message strings.
#[derive(thiserror::Error, Debug)]
#[error("upstream api error: status={status} endpoint={endpoint}")]
pub struct ApiStatusError {
    pub status: StatusCode,
    pub endpoint: String,
}

impl ApiStatusError {
    pub fn new(status: StatusCode, endpoint: impl Into<String>) -> Self {
        Self {
            status,
            endpoint: endpoint.into(),
        }
    }
}
