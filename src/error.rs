/// Unified error types for the clinic core
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for session, storage and collection operations
#[derive(Error, Debug)]
pub enum ClinicError {
    /// Bad credentials, missing or expired token
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Principal lacks the role required for an operation
    #[error("Not authorized: {0}")]
    Authorization(String),

    /// Malformed input caught before any mutation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Row or resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// A persistence round-trip was rejected by its backing medium
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Transport-level HTTP failures
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote endpoint answered with a non-2xx status
    #[error("Remote returned {status}: {message}")]
    Status { status: u16, message: String },

    /// A 2xx response whose body does not have the expected shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Durable key-value store failures
    #[error("Storage error: {0}")]
    Storage(String),

    /// JSON encoding/decoding errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failure categories surfaced to the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FailureKind {
    Auth,
    Validation,
    Persistence,
    NotFound,
    Internal,
}

impl ClinicError {
    /// Map this error onto the failure taxonomy the UI understands
    pub fn kind(&self) -> FailureKind {
        match self {
            ClinicError::Authentication(_) | ClinicError::Authorization(_) => FailureKind::Auth,
            ClinicError::Status { status, .. } if *status == 401 || *status == 403 => {
                FailureKind::Auth
            }
            ClinicError::Validation(_) => FailureKind::Validation,
            ClinicError::NotFound(_) => FailureKind::NotFound,
            ClinicError::Persistence(_)
            | ClinicError::Http(_)
            | ClinicError::Status { .. }
            | ClinicError::MalformedResponse(_)
            | ClinicError::Storage(_)
            | ClinicError::Serialization(_) => FailureKind::Persistence,
            ClinicError::Io(_) | ClinicError::Config(_) | ClinicError::Internal(_) => {
                FailureKind::Internal
            }
        }
    }

    /// Build an error from a non-2xx HTTP status
    pub fn from_status(status: reqwest::StatusCode, message: impl Into<String>) -> Self {
        ClinicError::Status {
            status: status.as_u16(),
            message: message.into(),
        }
    }
}

/// Structured failure handed to the presentation layer instead of a dialog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureReport {
    pub ok: bool,
    pub kind: FailureKind,
    pub message: String,
}

impl From<&ClinicError> for FailureReport {
    fn from(err: &ClinicError) -> Self {
        let kind = err.kind();
        let message = match (kind, err) {
            // Auth failures are always shown generically
            (FailureKind::Auth, _) => "Invalid email or password".to_string(),
            (FailureKind::Internal, _) => "Internal error".to_string(), // Don't leak details
            (_, err) => err.to_string(),
        };

        FailureReport {
            ok: false,
            kind,
            message,
        }
    }
}

impl From<ClinicError> for FailureReport {
    fn from(err: ClinicError) -> Self {
        FailureReport::from(&err)
    }
}

/// Result type alias for clinic operations
pub type ClinicResult<T> = Result<T, ClinicError>;

/// Operation result in the shape the presentation layer consumes
///
/// Serializes as `{"ok": true, "value": ...}` or as a `FailureReport`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Outcome<T> {
    Success { ok: bool, value: T },
    Failure(FailureReport),
}

impl<T> Outcome<T> {
    pub fn success(value: T) -> Self {
        Outcome::Success { ok: true, value }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Outcome::Success { value, .. } => Some(value),
            Outcome::Failure(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&FailureReport> {
        match self {
            Outcome::Success { .. } => None,
            Outcome::Failure(report) => Some(report),
        }
    }
}

impl<T> From<ClinicResult<T>> for Outcome<T> {
    fn from(result: ClinicResult<T>) -> Self {
        match result {
            Ok(value) => Outcome::success(value),
            Err(e) => Outcome::Failure(FailureReport::from(&e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            ClinicError::Authentication("expired".into()).kind(),
            FailureKind::Auth
        );
        assert_eq!(
            ClinicError::Status { status: 401, message: "no".into() }.kind(),
            FailureKind::Auth
        );
        assert_eq!(
            ClinicError::Status { status: 500, message: "boom".into() }.kind(),
            FailureKind::Persistence
        );
        assert_eq!(
            ClinicError::Validation("bad email".into()).kind(),
            FailureKind::Validation
        );
        assert_eq!(ClinicError::NotFound("p1".into()).kind(), FailureKind::NotFound);
        assert_eq!(ClinicError::Internal("x".into()).kind(), FailureKind::Internal);
    }

    #[test]
    fn test_report_hides_auth_and_internal_details() {
        let report = FailureReport::from(&ClinicError::Authentication("token abc expired".into()));
        assert!(!report.ok);
        assert_eq!(report.kind, FailureKind::Auth);
        assert!(!report.message.contains("abc"));

        let report = FailureReport::from(ClinicError::Internal("stack trace".into()));
        assert_eq!(report.message, "Internal error");
    }

    #[test]
    fn test_report_keeps_persistence_message() {
        let report = FailureReport::from(&ClinicError::Status {
            status: 500,
            message: "database down".into(),
        });
        assert_eq!(report.kind, FailureKind::Persistence);
        assert!(report.message.contains("database down"));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["ok"], false);
        assert_eq!(json["kind"], "persistence");
    }

    #[test]
    fn test_outcome_shapes() {
        let ok: Outcome<u32> = Ok(7).into();
        assert!(ok.is_ok());
        assert_eq!(ok.value(), Some(&7));
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            serde_json::json!({"ok": true, "value": 7})
        );

        let failed: Outcome<u32> = Err(ClinicError::NotFound("p9".into())).into();
        assert!(!failed.is_ok());
        assert_eq!(failed.failure().map(|r| r.kind), Some(FailureKind::NotFound));
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            serde_json::json!({"ok": false, "kind": "notFound", "message": "Not found: p9"})
        );
    }
}
