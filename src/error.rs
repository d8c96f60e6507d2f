//! Error handling for the application

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::pricing::responses::PricingErrorResponse;
use crate::pricing::PricingError;

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Pricing error: {0}")]
    Pricing(#[from] PricingError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Pricing(PricingError::UnknownComponent { .. }) => StatusCode::NOT_FOUND,
            AppError::Pricing(PricingError::InvalidSelection { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            AppError::Database(_) => "database_error",
            AppError::Pricing(e) => e.error_type(),
            AppError::Validation(_) => "validation_error",
            AppError::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let (message, details) = match &self {
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                ("Database error".to_string(), None)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                ("Internal error".to_string(), None)
            }
            AppError::Pricing(PricingError::InvalidSelection { errors, .. }) => {
                (self.to_string(), Some(serde_json::json!({ "errors": errors })))
            }
            _ => (self.to_string(), None),
        };

        let body = PricingErrorResponse {
            error_type: self.error_type().to_string(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::Validation("bad".to_string()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::Pricing(PricingError::UnknownComponent {
                kind: "panel".to_string(),
                id: "abc".to_string(),
            })
            .status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Internal("boom".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_type_for_pricing_errors() {
        let err = AppError::from(PricingError::InvalidSelection {
            message: "Storage not allowed".to_string(),
            errors: vec!["storage_id".to_string()],
        });
        assert_eq!(err.error_type(), "invalid_selection");
    }
}
