//! Error types for the search server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use qpnotes_solr::SearchBackendError;
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Search backend error: {0}")]
    SearchBackend(#[from] SearchBackendError),

    #[error("Export failed: {0}")]
    Export(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<qpnotes_query::Error> for Error {
    fn from(err: qpnotes_query::Error) -> Self {
        match err {
            qpnotes_query::Error::UnsupportedLanguage(code) => {
                Error::NotFound(format!("unsupported language: {code}"))
            }
            other => Error::Validation(other.to_string()),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Error::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            Error::Validation(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            Error::SearchBackend(err) => {
                tracing::error!(error = %err, "Search backend request failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "Search service unavailable".to_string(),
                )
            }
            Error::Export(_)
            | Error::Io(_)
            | Error::Csv(_)
            | Error::Internal(_)
            | Error::Other(_) => {
                tracing::error!("Internal error: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "status": status.as_u16(),
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_error_kind() {
        let cases = [
            (Error::NotFound("x".into()), StatusCode::NOT_FOUND),
            (Error::Validation("x".into()), StatusCode::BAD_REQUEST),
            (
                Error::SearchBackend(SearchBackendError::Malformed("x".into())),
                StatusCode::BAD_GATEWAY,
            ),
            (Error::Export("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (Error::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[test]
    fn unsupported_language_is_not_found() {
        let err: Error = qpnotes_query::Error::UnsupportedLanguage("de".into()).into();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
