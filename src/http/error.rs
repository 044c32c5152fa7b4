use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;

use crate::domain::order::OrderError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error(transparent)]
    Order(#[from] OrderError),
}

impl ApiError {
    fn kind(&self) -> &'static str {
        match self {
            ApiError::Unauthenticated(_) => "unauthenticated",
            ApiError::Order(e) => e.kind(),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Order(e) => match e {
                OrderError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
                OrderError::NotFound(_) => StatusCode::NOT_FOUND,
                OrderError::Forbidden => StatusCode::FORBIDDEN,
                OrderError::UnknownStatus(_) => StatusCode::UNPROCESSABLE_ENTITY,
                OrderError::Blocked { .. } => StatusCode::CONFLICT,
                OrderError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        // Storage details stay in the logs
        let message = match self {
            ApiError::Order(OrderError::Storage(_)) => "internal storage error".to_string(),
            other => other.to_string(),
        };

        HttpResponse::build(status).json(json!({
            "error": self.kind(),
            "message": message,
        }))
    }
}
