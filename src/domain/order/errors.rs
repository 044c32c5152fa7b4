use uuid::Uuid;

use crate::status::UnknownStatus;
use crate::store::StoreError;

// ============================================================================
// Order Business Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Order not found: {0}")]
    NotFound(Uuid),

    #[error("This order does not belong to the current user")]
    Forbidden,

    #[error(transparent)]
    UnknownStatus(#[from] UnknownStatus),

    #[error("Shipping details cannot be changed in the current status ({current}); contact an administrator")]
    Blocked { current: String },

    #[error("Storage error: {0}")]
    Storage(StoreError),
}

impl OrderError {
    /// Stable, machine-readable name of the failure
    pub fn kind(&self) -> &'static str {
        match self {
            OrderError::InvalidRequest(_) => "invalid_request",
            OrderError::NotFound(_) => "not_found",
            OrderError::Forbidden => "forbidden",
            OrderError::UnknownStatus(_) => "unknown_status",
            OrderError::Blocked { .. } => "blocked",
            OrderError::Storage(_) => "storage",
        }
    }
}

impl From<StoreError> for OrderError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => OrderError::NotFound(id),
            other => OrderError::Storage(other),
        }
    }
}
