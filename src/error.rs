// src/error.rs
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{message::ErrorBody, services::completion::UpstreamError};

#[derive(Debug, Error)]
pub enum AppError {
    /// Body could not be read as a chat request; keeps the extractor's status.
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    #[error("AI function failed. {0}")]
    Upstream(#[from] UpstreamError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Rejected { status, .. } => *status,
            AppError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "relay request failed");
        }

        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}
