use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use crate::auth::models::Rejection;
use crate::config::Locale;
use crate::errors::Error;

#[derive(Debug)]
pub enum ApiError {
    Unauthorized(String),
    ServiceUnavailable(String),
    Internal(String),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::Unauthorized(msg)
            | ApiError::ServiceUnavailable(msg)
            | ApiError::Internal(msg) => msg,
        }
    }

    pub fn service_unavailable<S: Into<String>>(msg: S) -> Self {
        ApiError::ServiceUnavailable(msg.into())
    }

    /// `401` carrying the localized text for `rejection`.
    pub fn rejected(rejection: Rejection, locale: Locale) -> Self {
        ApiError::Unauthorized(rejection_message(rejection, locale).to_string())
    }
}

/// Client-facing text for each rejection class.
pub fn rejection_message(rejection: Rejection, locale: Locale) -> &'static str {
    match (locale, rejection) {
        (Locale::En, Rejection::MissingHeader) => "Missing token",
        (Locale::En, Rejection::MalformedToken) => "Malformed token",
        (Locale::En, Rejection::InvalidToken) => "Invalid token",
        (Locale::Fr, Rejection::MissingHeader) => "Token manquant",
        (Locale::Fr, Rejection::MalformedToken) => "Token malformé",
        (Locale::Fr, Rejection::InvalidToken) => "Token invalide",
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let body = ErrorBody { message: self.message().to_string() };
        (self.status_code(), Json(body)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::ConnectionFailed { .. } | Error::Database { .. } => {
                ApiError::ServiceUnavailable("Database unavailable".to_string())
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}
