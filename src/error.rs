//! Service error taxonomy and the wire-level error envelope.
//!
//! Every failure the service surfaces is a [`ServiceError`] carrying a stable
//! code, a category that maps to an HTTP status, a retryability flag, and a
//! one-line suggestion naming the likely fix. Validation failures stop the
//! pipeline before any generator runs; insight failures never reach this type
//! (they degrade to the deterministic fallback).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // validation
    InvalidDataPoints,
    InvalidLabels,
    InvalidValues,
    MismatchedLengths,
    DuplicateLabels,
    DataRangeError,
    EmptyField,
    InvalidAnalyticsType,
    InvalidLayout,
    InvalidChartType,
    // processing
    ChartGenerationFailed,
    LayoutAssemblyFailed,
    LlmError,
    // resource
    ChartNotFound,
    PresentationNotFound,
    // rate limit
    RateLimitExceeded,
    // system
    UnknownError,
}

/// Error category; determines the HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Validation,
    Processing,
    Resource,
    RateLimit,
    System,
}

impl ErrorCode {
    pub fn category(self) -> ErrorCategory {
        match self {
            Self::InvalidDataPoints
            | Self::InvalidLabels
            | Self::InvalidValues
            | Self::MismatchedLengths
            | Self::DuplicateLabels
            | Self::DataRangeError
            | Self::EmptyField
            | Self::InvalidAnalyticsType
            | Self::InvalidLayout
            | Self::InvalidChartType => ErrorCategory::Validation,
            Self::ChartGenerationFailed | Self::LayoutAssemblyFailed | Self::LlmError => {
                ErrorCategory::Processing
            }
            Self::ChartNotFound | Self::PresentationNotFound => ErrorCategory::Resource,
            Self::RateLimitExceeded => ErrorCategory::RateLimit,
            Self::UnknownError => ErrorCategory::System,
        }
    }

    /// Whether an identical retry can be expected to succeed.
    /// Validation errors stay retryable so callers do not gate retries on
    /// category alone.
    pub fn retryable(self) -> bool {
        !matches!(
            self,
            Self::ChartNotFound | Self::PresentationNotFound | Self::UnknownError
        )
    }

    pub fn suggestion(self) -> &'static str {
        match self {
            Self::InvalidDataPoints => "Send data matching the chart family's payload shape",
            Self::InvalidLabels => "Use non-empty labels of at most 100 characters",
            Self::InvalidValues => "Replace NaN or infinite values with finite numbers",
            Self::MismatchedLengths => "Make every row match the declared label counts",
            Self::DuplicateLabels => "Make labels unique within a single request",
            Self::DataRangeError => "Send between 2 and 50 data points",
            Self::EmptyField => "Fill in the named field; whitespace-only is treated as empty",
            Self::InvalidAnalyticsType => "Pick an analytics_type from the allowed list in details",
            Self::InvalidLayout => "Use one of the layouts L01, L02 or L03",
            Self::InvalidChartType => "Pick a chart_type from the compatible list in details",
            Self::ChartGenerationFailed => "Retry the request; if it persists, check the data shape",
            Self::LayoutAssemblyFailed => "Retry the request",
            Self::LlmError => "Retry the request; observations will fall back to a data summary",
            Self::ChartNotFound => "List /api/v1/chart-types for the known chart ids",
            Self::PresentationNotFound => "Verify the presentation_id",
            Self::RateLimitExceeded => "Wait details.retry_after seconds before retrying",
            Self::UnknownError => "Retry later; contact the service owner if it persists",
        }
    }
}

impl ErrorCategory {
    pub fn status(self) -> StatusCode {
        match self {
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::Resource => StatusCode::NOT_FOUND,
            Self::RateLimit => StatusCode::TOO_MANY_REQUESTS,
            Self::Processing | Self::System => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Structured service failure. Construct through the helper constructors so
/// every error carries its code.
#[derive(Debug, Clone, Error)]
#[error("{code:?}: {message}")]
pub struct ServiceError {
    pub code: ErrorCode,
    pub message: String,
    pub field: Option<String>,
    pub details: Option<serde_json::Value>,
}

impl ServiceError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            field: None,
            details: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn empty_field(field: &str) -> Self {
        Self::new(ErrorCode::EmptyField, format!("Field '{field}' must not be empty"))
            .with_field(field)
    }

    pub fn chart_generation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ChartGenerationFailed, message)
    }

    pub fn rate_limited(retry_after_secs: u64) -> Self {
        Self::new(
            ErrorCode::RateLimitExceeded,
            "Rate limit exceeded, slow down and retry",
        )
        .with_details(serde_json::json!({ "retry_after": retry_after_secs }))
    }

    pub fn category(&self) -> ErrorCategory {
        self.code.category()
    }

    pub fn envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope {
            success: false,
            error: ErrorBody {
                code: self.code,
                message: self.message.clone(),
                category: self.category(),
                field: self.field.clone(),
                details: self.details.clone(),
                retryable: self.code.retryable(),
                suggestion: Some(self.code.suggestion().to_string()),
            },
        }
    }
}

/// Wire shape for every failed response.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
    pub category: ErrorCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    pub retryable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.category().status();
        if status.is_server_error() {
            tracing::error!(code = ?self.code, message = %self.message, "request failed");
        } else {
            tracing::debug!(code = ?self.code, message = %self.message, "request rejected");
        }
        (status, Json(self.envelope())).into_response()
    }
}
