use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application-level errors surfaced by the HTTP handlers
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Error connecting to aggregator: {0}")]
    Transport(#[from] TransportError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Transport(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Failures while forwarding a batch to the aggregator
#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode batch: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to write batch: {0}")]
    Write(#[source] std::io::Error),

    #[error("failed to read reply: {0}")]
    Read(#[source] std::io::Error),

    #[error("no reply from {addr} within {secs}s")]
    TimedOut { addr: String, secs: u64 },
}

/// Failures while decoding a batch on the ingestion side
///
/// None of these reach the sender; the connection is simply dropped.
#[derive(thiserror::Error, Debug)]
pub enum IngestError {
    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed batch: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("batch is not a JSON array")]
    NotAnArray,

    #[error("connection closed after {0} bytes without a complete batch")]
    Incomplete(usize),

    #[error("batch exceeds {limit} bytes")]
    TooLarge { limit: usize },
}

/// Failures while loading the catalog at startup
#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error("cannot open catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read catalog: {0}")]
    Csv(#[from] csv::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_maps_to_bad_request() {
        let response = AppError::InvalidInput("bad".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_transport_maps_to_internal_error_with_cause() {
        let err = AppError::from(TransportError::Connect {
            addr: "localhost:1".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::ConnectionRefused),
        });
        assert!(err.to_string().contains("localhost:1"));

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
