use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::flows::invoker::FlowError;
use crate::flows::schema::ValidationErrors;

/// The only failure message users see when a flow cannot produce a result.
pub const GENERIC_FLOW_FAILURE: &str =
    "The AI service could not complete this request. Please try again.";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(ValidationErrors),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("LLM timeout: {0}")]
    LlmTimeout(String),

    #[error("LLM contract violation: {0}")]
    ContractViolation(String),
}

impl From<FlowError> for AppError {
    fn from(err: FlowError) -> Self {
        match err {
            FlowError::InvalidInput(errors) => AppError::Validation(errors),
            FlowError::Provider(e) => AppError::Llm(e.to_string()),
            e @ FlowError::Timeout(_) => AppError::LlmTimeout(e.to_string()),
            FlowError::ContractViolation(msg) => AppError::ContractViolation(msg),
        }
    }
}

/// A body that is not valid JSON for the flow is reported like any other
/// invalid field.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let mut errors = ValidationErrors::new();
        errors.push("body", rejection.body_text());
        AppError::Validation(errors)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(_) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "Some fields need attention".to_string(),
            ),
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "LLM_ERROR",
                    GENERIC_FLOW_FAILURE.to_string(),
                )
            }
            AppError::LlmTimeout(msg) => {
                tracing::error!("LLM timeout: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "LLM_TIMEOUT",
                    GENERIC_FLOW_FAILURE.to_string(),
                )
            }
            AppError::ContractViolation(msg) => {
                tracing::error!("LLM contract violation: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "LLM_CONTRACT_VIOLATION",
                    GENERIC_FLOW_FAILURE.to_string(),
                )
            }
        };

        let mut error = json!({
            "code": code,
            "message": message
        });
        if let AppError::Validation(errors) = &self {
            error["fields"] = json!(errors);
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}
