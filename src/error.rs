//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing setting: {0}")]
    Missing(&'static str),
    #[error("invalid setting {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Field options shape violations. The display text is the message returned to clients.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OptionsError {
    #[error("options.choices is required for choice-based fields")]
    ChoicesRequired,
    #[error("options.choices must be a non-empty array")]
    ChoicesEmpty,
    #[error("each choice must have a label")]
    ChoiceLabelMissing,
    #[error("choice ids must be unique (duplicate '{0}')")]
    DuplicateChoiceId(String),
    #[error("options.max_files must be number")]
    MaxFilesNotNumber,
    #[error("allowed_mime_types must be array")]
    MimeTypesNotArray,
    #[error("options.min and options.max must be numbers")]
    ScaleBoundsNotNumbers,
    #[error("min must be < max")]
    ScaleBoundsOrder,
    #[error("rows and columns arrays required")]
    GridAxesRequired,
    #[error("rows/columns cannot be empty")]
    GridAxesEmpty,
}

impl OptionsError {
    /// Stable machine-readable code for this violation.
    pub fn code(&self) -> &'static str {
        match self {
            OptionsError::ChoicesRequired => "choices_required",
            OptionsError::ChoicesEmpty => "choices_empty",
            OptionsError::ChoiceLabelMissing => "choice_label_missing",
            OptionsError::DuplicateChoiceId(_) => "duplicate_choice_id",
            OptionsError::MaxFilesNotNumber => "max_files_not_number",
            OptionsError::MimeTypesNotArray => "mime_types_not_array",
            OptionsError::ScaleBoundsNotNumbers => "scale_bounds_not_numbers",
            OptionsError::ScaleBoundsOrder => "scale_bounds_order",
            OptionsError::GridAxesRequired => "grid_axes_required",
            OptionsError::GridAxesEmpty => "grid_axes_empty",
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    InvalidOptions(#[from] OptionsError),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("missing or invalid acting user")]
    Unauthorized,
    #[error("unable to generate unique slug")]
    SlugExhausted,
}

impl AppError {
    /// Maps storage errors, turning unique-key violations into `Conflict`.
    pub fn from_db(e: sqlx::Error) -> Self {
        if let Some(db) = e.as_database_error() {
            if db.code().as_deref() == Some("23505") {
                let what = db.constraint().unwrap_or("unique key").to_string();
                return AppError::Conflict(format!("duplicate value for {}", what));
            }
        }
        AppError::Db(e)
    }

    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error"),
            AppError::InvalidOptions(e) => (StatusCode::BAD_REQUEST, e.code()),
            AppError::Db(e) => {
                if let sqlx::Error::RowNotFound = e {
                    (StatusCode::NOT_FOUND, "not_found")
                } else {
                    (StatusCode::INTERNAL_SERVER_ERROR, "database_error")
                }
            }
            AppError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
            AppError::SlugExhausted => (StatusCode::INTERNAL_SERVER_ERROR, "slug_exhausted"),
        }
    }

    /// Message safe to show a client. Storage and config internals are replaced by a generic text.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Db(sqlx::Error::RowNotFound) => "record not found".into(),
            AppError::Db(_) => "storage unavailable".into(),
            AppError::Config(_) => "server misconfigured".into(),
            other => other.to_string(),
        }
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!(error = %self, code, "request failed");
        }
        let body = ErrorBody {
            success: false,
            error: ErrorDetail {
                code: code.to_string(),
                message: self.public_message(),
                details: None,
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choice_messages_are_distinct() {
        assert_ne!(
            OptionsError::ChoicesRequired.to_string(),
            OptionsError::ChoicesEmpty.to_string()
        );
        assert_ne!(OptionsError::ChoicesRequired.code(), OptionsError::ChoicesEmpty.code());
    }

    #[test]
    fn storage_details_do_not_leak() {
        let err = AppError::Db(sqlx::Error::PoolTimedOut);
        assert_eq!(err.public_message(), "storage unavailable");
        let err = AppError::NotFound("form");
        assert_eq!(err.public_message(), "form not found");
    }

    #[test]
    fn options_error_maps_to_bad_request() {
        let err: AppError = OptionsError::ScaleBoundsOrder.into();
        let (status, code) = err.status_and_code();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(code, "scale_bounds_order");
        assert_eq!(err.public_message(), "min must be < max");
    }
}
