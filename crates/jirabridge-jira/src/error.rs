//! Error types for JIRA integration

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error(
        "Status '{status}' not available for ticket {ticket}. Available: {}",
        available.join(", ")
    )]
    InvalidTransition {
        ticket: String,
        status: String,
        available: Vec<String>,
    },

    #[error("JIRA upstream error: {0}")]
    Upstream(String),
}

impl Error {
    /// Stable machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::NotFound(_) => "not_found",
            Error::Unauthorized(_) => "unauthorized",
            Error::InvalidQuery(_) => "invalid_query",
            Error::InvalidTransition { .. } => "invalid_transition",
            Error::Upstream(_) => "upstream_error",
        }
    }

    pub fn required(param: &str) -> Self {
        Error::InvalidQuery(format!("{} is required", param))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Upstream(format!("request timed out: {}", err))
        } else if err.is_connect() {
            Error::Upstream(format!("connection failed: {}", err))
        } else {
            Error::Upstream(err.to_string())
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Upstream(format!("unexpected response body: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
