use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::future::Future;
use tracing::warn;

use crate::error::{ErrorKind, ScrapeError};

/// Uniform JSON wrapper for every API answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Envelope<T> {
    Success { data: T },
    Failure { code: u16, message: String },
}

impl<T> Envelope<T> {
    pub fn failure(error: &ScrapeError) -> Self {
        Self::from_status(error.status())
    }

    /// Failure envelope for `code` with the kind table's message.
    pub fn from_status(code: u16) -> Self {
        Envelope::Failure {
            code,
            message: ErrorKind::from_status(code).message().to_string(),
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Envelope::Success { .. } => StatusCode::OK,
            Envelope::Failure { code, .. } => {
                StatusCode::from_u16(*code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}

impl<T> From<Result<T, ScrapeError>> for Envelope<T> {
    fn from(result: Result<T, ScrapeError>) -> Self {
        match result {
            Ok(data) => Envelope::Success { data },
            Err(error) => {
                warn!(error = %error, status = error.status(), "request failed");
                Envelope::failure(&error)
            }
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}

/// Awaits `request` and turns its outcome into the response envelope.
pub async fn send_response<T, F>(request: F) -> Envelope<T>
where
    F: Future<Output = Result<T, ScrapeError>>,
{
    Envelope::from(request.await)
}
