// HTTP API Error Types
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::fmt::Display;

use crate::filter::FilterError;
use crate::investease::InvestEaseError;
use crate::learn::LearnError;

/// Boundary error for every route, rendered as `{"detail", "code"}`
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 422 Unprocessable Entity (well-formed JSON of the wrong shape)
    UnprocessableEntity(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 502 Bad Gateway (upstream unreachable or unusable)
    BadGateway(String),
}

pub type ApiResult<T = Value> = Result<Json<T>, ApiError>;

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::UnprocessableEntity(_) => 422,
            ApiError::InternalServerError(_) => 500,
            ApiError::BadGateway(_) => 502,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::UnprocessableEntity(msg)
            | ApiError::InternalServerError(msg)
            | ApiError::BadGateway(msg) => msg,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::UnprocessableEntity(_) => "UNPROCESSABLE_ENTITY",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::BadGateway(_) => "BAD_GATEWAY",
        }
    }

    /// `detail` is the key the frontend reads
    pub fn to_json(&self) -> Value {
        json!({
            "detail": self.message(),
            "code": self.error_code()
        })
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn unprocessable_entity(message: impl Into<String>) -> Self {
        ApiError::UnprocessableEntity(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        ApiError::BadGateway(message.into())
    }

    /// Provider failure on a row-store or auth route: `"<context>: <message>"` as 400
    pub fn upstream(context: &str, err: impl Display) -> Self {
        ApiError::BadRequest(format!("{}: {}", context, err))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection.status() {
            StatusCode::UNPROCESSABLE_ENTITY => ApiError::unprocessable_entity(rejection.body_text()),
            _ => ApiError::bad_request(rejection.body_text()),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<FilterError> for ApiError {
    fn from(err: FilterError) -> Self {
        ApiError::bad_request(err.to_string())
    }
}

impl From<LearnError> for ApiError {
    fn from(err: LearnError) -> Self {
        match &err {
            LearnError::MissingTopic => ApiError::bad_request(err.to_string()),
            LearnError::Upstream(e) => {
                tracing::warn!(error = %e, "course generation failed");
                ApiError::bad_gateway(err.to_string())
            }
            LearnError::EmptyContent | LearnError::Parse(_) | LearnError::InvalidStructure => {
                ApiError::bad_gateway(err.to_string())
            }
        }
    }
}

impl From<InvestEaseError> for ApiError {
    fn from(err: InvestEaseError) -> Self {
        match &err {
            InvestEaseError::Invalid(msg) => ApiError::bad_request(msg.clone()),
            InvestEaseError::NotConfigured => ApiError::internal_server_error(err.to_string()),
            InvestEaseError::Url(e) => ApiError::bad_request(format!("Invalid proxy path: {}", e)),
            InvestEaseError::Api { .. } => ApiError::bad_gateway(err.to_string()),
            InvestEaseError::Transport(e) => {
                tracing::error!(error = %e, "investease upstream unreachable");
                ApiError::bad_gateway(format!("InvestEase upstream unreachable: {}", e))
            }
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}
