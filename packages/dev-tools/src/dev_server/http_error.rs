//! HTTP error handling for dev server
//!
//! Every failure leaves the server as `{ message, code, details? }`, with the
//! status derived from `code`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use folio_core::services::CategoryTreeError;
use serde::{Deserialize, Serialize};

/// HTTP error response body
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpError {
    /// User-facing error message
    pub message: String,
    /// Machine-readable error code
    pub code: String,
    /// Optional detailed error information for debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl HttpError {
    /// Create a new HTTP error
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            details: None,
        }
    }

    /// Create a new HTTP error with details
    pub fn with_details(
        message: impl Into<String>,
        code: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            details: Some(details.into()),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.code.as_str() {
            "CATEGORY_NOT_FOUND" | "PARENT_NOT_FOUND" => StatusCode::NOT_FOUND,
            "VALIDATION_ERROR" | "CIRCULAR_REFERENCE" | "MALFORMED_PATH" => {
                StatusCode::BAD_REQUEST
            }
            "CONFLICT" => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<CategoryTreeError> for HttpError {
    fn from(err: CategoryTreeError) -> Self {
        let message = err.to_string();
        match err {
            CategoryTreeError::CategoryNotFound { .. } => {
                HttpError::new(message, "CATEGORY_NOT_FOUND")
            }
            CategoryTreeError::ParentNotFound { .. } => HttpError::new(message, "PARENT_NOT_FOUND"),
            CategoryTreeError::Validation(_) => HttpError::new(message, "VALIDATION_ERROR"),
            CategoryTreeError::CircularReference { .. } => {
                HttpError::new(message, "CIRCULAR_REFERENCE")
            }
            CategoryTreeError::MalformedPath(_) => HttpError::new(message, "MALFORMED_PATH"),
            CategoryTreeError::Conflict(_) => HttpError::new(message, "CONFLICT"),
            CategoryTreeError::DescendantRepairFailed {
                moved_id,
                failed_id,
                ..
            } => HttpError::with_details(
                message,
                "DESCENDANT_REPAIR_FAILED",
                format!(
                    "moved_id: {}, failed_id: {}; the subtree may hold stale paths",
                    moved_id, failed_id
                ),
            ),
            CategoryTreeError::DepthLimitExceeded { .. } => {
                HttpError::new(message, "DEPTH_LIMIT_EXCEEDED")
            }
            CategoryTreeError::StoreFailed(_) => HttpError::new(message, "DATABASE_ERROR"),
            CategoryTreeError::ContentLookupFailed(_) => {
                HttpError::new(message, "CONTENT_LOOKUP_ERROR")
            }
            CategoryTreeError::InvalidConfig(_) => HttpError::new(message, "INTERNAL_ERROR"),
        }
    }
}
