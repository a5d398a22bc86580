use http::StatusCode;
use std::error::Error;

/// Error taxonomy for every storefront operation. Dependency failures are
/// converted at the operation boundary; raw store errors never escape a
/// service.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("cart is empty")]
    EmptyCart,

    #[error("{0} not found")]
    NotFound(String),

    #[error("not authorized: {0}")]
    Authorization(String),

    #[error("dependency failure: {0}")]
    Dependency(String),
}

impl StoreError {
    /// Wrap a failed store/queue call. The original error is kept as the
    /// message only; callers get 500 semantics, not the raw error.
    pub fn dependency(err: Box<dyn Error + Send + Sync>) -> Self {
        StoreError::Dependency(err.to_string())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            StoreError::Validation(_) | StoreError::EmptyCart => StatusCode::BAD_REQUEST,
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            StoreError::Authorization(_) => StatusCode::FORBIDDEN,
            StoreError::Dependency(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
