// Listings - race and sports event listing services
// Read-only SQLite-backed listings with a JSON RPC surface and an HTTP gateway

#![warn(rust_2018_idioms)]

pub mod config;
pub mod entity;
pub mod gateway;
pub mod metrics;
pub mod query;
pub mod server;
pub mod service;
pub mod storage;

// Re-exports for convenience
pub use entity::{annotate, Event, Listing, Race, Status};
pub use query::{ColumnCatalog, OrderSpec};
pub use storage::{ListingRepo, SqliteStore};

/// Listing error types
pub mod error {
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use axum::Json;
    use serde::{Deserialize, Serialize};
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum Error {
        #[error("Not found: {0}")]
        NotFound(String),

        #[error("Store error: {0}")]
        Store(#[from] rusqlite::Error),

        #[error("Invalid argument: {0}")]
        InvalidArgument(String),

        #[error("Upstream error: {0}")]
        Upstream(String),

        #[error("Internal error: {0}")]
        Internal(String),
    }

    pub type Result<T> = std::result::Result<T, Error>;

    impl Error {
        /// HTTP status code for this error
        pub fn status_code(&self) -> StatusCode {
            match self {
                Error::NotFound(_) => StatusCode::NOT_FOUND,
                Error::InvalidArgument(_) => StatusCode::BAD_REQUEST,
                Error::Upstream(_) => StatusCode::BAD_GATEWAY,
                Error::Store(_) | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            }
        }
    }

    /// Error response body
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ErrorResponse {
        pub error: String,
        pub code: u16,
    }

    impl From<&Error> for ErrorResponse {
        fn from(err: &Error) -> Self {
            Self {
                code: err.status_code().as_u16(),
                error: err.to_string(),
            }
        }
    }

    impl IntoResponse for Error {
        fn into_response(self) -> Response {
            let status = self.status_code();
            (status, Json(ErrorResponse::from(&self))).into_response()
        }
    }
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::error::Error;
    use axum::http::StatusCode;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            Error::NotFound("race 7".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            Error::InvalidArgument("id".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::Upstream("connection refused".to_string()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            Error::Store(rusqlite::Error::InvalidQuery).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
