//! Error types for the cacheable layer
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for cache setup, key derivation and scope resolution.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Caching was attached to something that is neither a method nor a getter
    #[error("Cannot cache property {property}: {reason}")]
    UncacheableProperty { property: String, reason: String },

    /// An argument could not be turned into a cache key
    #[error(
        "Cannot cache: {identity}. The argument at index {index} cannot be serialized into a cache key \
         ({reason}). Implement CacheableKey for the argument type to provide a key explicitly."
    )]
    UncacheableArgument {
        identity: String,
        index: usize,
        reason: String,
    },

    /// A scope value with no registry behind it
    #[error("No storage registry for scope: {0}")]
    UnrecognizedScope(String),

    /// Context-local caching was used outside of any request context
    #[error("No active request context in namespace '{namespace}'")]
    NoActiveContext { namespace: String },

    /// The same (owner, method) pair was addressed with two value types
    #[error("Cache for {identity} holds values of a different type than {expected}")]
    StoreTypeMismatch { identity: String, expected: String },
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::UncacheableArgument { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
