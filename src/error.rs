//! Application error types

use serde::Serialize;
use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Worksheet not found: {0}")]
    WorksheetNotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Write error: {0}")]
    Write(String),

    #[error("Write conflict: {0}")]
    Conflict(String),

    #[error("Channel manager error: status {status}: {body}")]
    Remote { status: u16, body: String },

    #[error("Channel manager is not configured")]
    ChannelDisabled,

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Serializable error response for the dashboard UI
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl From<&AppError> for ErrorResponse {
    fn from(err: &AppError) -> Self {
        let code = match err {
            AppError::Auth(_) => "AUTH_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::WorksheetNotFound(_) => "WORKSHEET_NOT_FOUND",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Write(_) => "WRITE_ERROR",
            AppError::Conflict(_) => "WRITE_CONFLICT",
            AppError::Remote { .. } => "REMOTE_ERROR",
            AppError::ChannelDisabled => "CHANNEL_DISABLED",
            AppError::Http(_) => "HTTP_ERROR",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Io(_) => "IO_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        };

        ErrorResponse {
            code: code.to_string(),
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
