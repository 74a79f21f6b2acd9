use axum::{extract::rejection::JsonRejection, http::StatusCode};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<ControllerError> for AppError {
    fn from(err: ControllerError) -> Self {
        match err {
            ControllerError::UnknownControl(_) => Self::not_found(err.to_string()),
            _ => Self::bad_request(err.to_string()),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}

/// Startup failures while reading the input tables. All of them are fatal.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed csv in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{} row {row}: unrecognized date {value:?}", .path.display())]
    InvalidDate {
        path: PathBuf,
        row: usize,
        value: String,
    },
}

/// Rejected UI events.
#[derive(Debug, Error, PartialEq)]
pub enum ControllerError {
    #[error("no callback is registered for input '{0}'")]
    UnknownControl(String),

    #[error("unknown tab '{0}'")]
    UnknownTab(String),

    #[error("'{0}' is not a summary field (expected session_id or play_time)")]
    UnknownSummaryField(String),

    #[error("invalid value for '{control}': {reason}")]
    InvalidPayload { control: String, reason: String },
}
