//! Error types and HTTP error responses for the server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use doctext_core::{DiagnosisError, ErrorKind};
use providers::summary::SummaryError;
use serde::Serialize;

#[derive(Debug)]
pub enum ApiError {
    /// The diagnosis pipeline rejected or failed the request.
    Diagnosis(DiagnosisError),
    /// The summarization collaborator failed.
    Summary(SummaryError),
    /// The request body could not be used.
    BadRequest(String),
    /// The pipeline did not finish within the request deadline.
    Timeout,
    /// The blocking worker running the pipeline died.
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    stage: Option<&'static str>,
}

impl ApiError {
    fn parts(&self) -> (StatusCode, ErrorBody) {
        match self {
            ApiError::Diagnosis(e) => {
                let status = match e.kind() {
                    ErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
                    ErrorKind::Prediction => StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorKind::Configuration => StatusCode::SERVICE_UNAVAILABLE,
                };
                (
                    status,
                    ErrorBody {
                        error: e.to_string(),
                        kind: e.kind().as_str(),
                        stage: Some(e.stage().as_str()),
                    },
                )
            }
            ApiError::Summary(SummaryError::UnsupportedMedia(_)) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                ErrorBody {
                    error: self.message(),
                    kind: "summarization",
                    stage: None,
                },
            ),
            ApiError::Summary(_) => (
                StatusCode::BAD_GATEWAY,
                ErrorBody {
                    error: self.message(),
                    kind: "summarization",
                    stage: None,
                },
            ),
            ApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: msg.clone(),
                    kind: "validation",
                    stage: Some("input"),
                },
            ),
            ApiError::Timeout => (
                StatusCode::GATEWAY_TIMEOUT,
                ErrorBody {
                    error: "request timed out".into(),
                    kind: "timeout",
                    stage: None,
                },
            ),
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    error: msg.clone(),
                    kind: "internal",
                    stage: None,
                },
            ),
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Diagnosis(e) => e.to_string(),
            ApiError::Summary(e) => e.to_string(),
            ApiError::BadRequest(msg) | ApiError::Internal(msg) => msg.clone(),
            ApiError::Timeout => "request timed out".into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.parts();
        (status, axum::Json(body)).into_response()
    }
}

impl From<DiagnosisError> for ApiError {
    fn from(e: DiagnosisError) -> Self {
        ApiError::Diagnosis(e)
    }
}

impl From<SummaryError> for ApiError {
    fn from(e: SummaryError) -> Self {
        ApiError::Summary(e)
    }
}
