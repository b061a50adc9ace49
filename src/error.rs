//! Error types for Mayor
//!
//! Centralized error handling using thiserror. Most scheduling failures are
//! recovered locally (stale references are dropped, double assignments are
//! logged); only persistence problems reach callers as errors.

use thiserror::Error;

/// All error types that can occur in Mayor
#[derive(Debug, Error)]
pub enum MayorError {
    /// A persisted job id could not be parsed
    #[error("Malformed job id: {0}")]
    MalformedJobId(String),

    /// Job id names a kind with no registered constructor
    #[error("Unknown job kind: {0}")]
    UnknownJobKind(String),

    /// Colony is not present in the world snapshot
    #[error("Unknown colony: {0}")]
    UnknownColony(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for Mayor operations
pub type Result<T> = std::result::Result<T, MayorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_job_id_error() {
        let err = MayorError::MalformedJobId("harvest".to_string());
        assert_eq!(err.to_string(), "Malformed job id: harvest");
    }

    #[test]
    fn test_unknown_job_kind_error() {
        let err = MayorError::UnknownJobKind("juggle".to_string());
        assert_eq!(err.to_string(), "Unknown job kind: juggle");
    }

    #[test]
    fn test_unknown_colony_error() {
        let err = MayorError::UnknownColony("W9N9".to_string());
        assert_eq!(err.to_string(), "Unknown colony: W9N9");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: MayorError = io_err.into();
        assert!(matches!(err, MayorError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let err: MayorError = json_err.into();
        assert!(matches!(err, MayorError::Json(_)));
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_ok() -> Result<i32> {
            Ok(42)
        }

        fn returns_err() -> Result<i32> {
            Err(MayorError::UnknownColony("W9N9".to_string()))
        }

        assert!(returns_ok().is_ok());
        assert!(returns_err().is_err());
    }
}
