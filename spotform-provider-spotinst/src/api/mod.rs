//! Vendor API trait and error types
//!
//! The resource handlers only ever see [`ResourceApi`]. The provider ships
//! an in-memory implementation; an HTTP client implements the same trait.

pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::resources::update_policy::RollPolicy;

pub use memory::{ApiCall, InMemoryApi};

/// Errors returned by the vendor API
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The API rejected the request with an error code
    #[error("{code}: {message}")]
    Status { code: String, message: String },

    /// No object with this ID exists
    #[error("Not found: {0}")]
    NotFound(String),

    /// The request never got a response
    #[error("Transport error: {0}")]
    Transport(String),
}

impl ApiError {
    pub fn status(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Status {
            code: code.into(),
            message: message.into(),
        }
    }

    /// The API error code, for status errors
    pub fn code(&self) -> Option<&str> {
        match self {
            ApiError::Status { code, .. } => Some(code),
            _ => None,
        }
    }
}

/// Result type for API calls
pub type ApiResult<T> = Result<T, ApiError>;

/// CRUD surface of one vendor object type
#[async_trait]
pub trait ResourceApi<P: Send + Sync>: Send + Sync {
    /// Create an object; the response carries the assigned ID
    async fn create(&self, payload: &P) -> ApiResult<P>;

    /// Fetch an object; `None` if it no longer exists
    async fn read(&self, id: &str) -> ApiResult<Option<P>>;

    /// Apply a sparse update; only members present in `payload` change
    async fn update(&self, payload: &P) -> ApiResult<P>;

    async fn delete(&self, id: &str) -> ApiResult<()>;

    /// Replace running instances in batches
    async fn roll(&self, id: &str, policy: &RollPolicy) -> ApiResult<()>;

    /// Account every call is scoped to; `None` means the credentials' default
    fn account(&self) -> Option<&str> {
        None
    }
}
