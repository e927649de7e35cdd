//! Request failures and their HTTP faces (made by FontLab https://www.fontlab.com/)

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Everything that can stop a stylesheet request short.
///
/// Each variant maps to exactly one status code. The body never carries more
/// than the canonical reason phrase, so internal details stay in the logs.
#[derive(Debug, Error)]
pub enum CssError {
    #[error("method {0} not supported")]
    MethodNotSupported(String),
    #[error("referer {0:?} is not whitelisted")]
    RefererRejected(String),
    #[error("missing family parameter")]
    MissingFamily,
    #[error("unknown font format {0:?}")]
    UnknownFormat(String),
    #[error("family specification {0:?} yields no fonts")]
    EmptyQuery(String),
    #[error("font {family} {column_key} not found")]
    FontNotFound { family: String, column_key: String },
    #[error("rendering stylesheet failed: {0}")]
    RenderFailure(String),
}

impl CssError {
    pub fn status(&self) -> StatusCode {
        match self {
            CssError::MethodNotSupported(_) => StatusCode::NOT_IMPLEMENTED,
            CssError::RefererRejected(_) => StatusCode::FORBIDDEN,
            CssError::MissingFamily
            | CssError::UnknownFormat(_)
            | CssError::EmptyQuery(_)
            | CssError::FontNotFound { .. } => StatusCode::BAD_REQUEST,
            CssError::RenderFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for CssError {
    fn into_response(self) -> Response {
        let status = self.status();
        let reason = status.canonical_reason().unwrap_or_default();
        let mut response = (status, reason).into_response();
        response.headers_mut().insert(
            CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        response
    }
}
