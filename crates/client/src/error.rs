//! Shared error taxonomy for the client core.
//!
//! Three categories cross module boundaries:
//!
//! - [`ValidationError`] - local required-field checks; blocks submission
//!   before any network call.
//! - [`RemoteError`] - the store or bucket rejected a read or write
//!   (including access-control denial). Read failures degrade the collection,
//!   write failures leave all local state unchanged.
//! - `AuthError` / `IdentityError` live in [`crate::identity`].
//!
//! No category is fatal: every failure path returns control to a stable,
//! previously reachable page.

use thiserror::Error;

/// A required asset field is missing from the submitted draft.
///
/// Surfaced inline on the form; no remote call is issued while this holds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing required fields: {}", missing.join(", "))]
pub struct ValidationError {
    /// Names of the absent required fields.
    pub missing: Vec<&'static str>,
}

/// A remote collaborator (store or bucket) failed a read or write.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// HTTP transport failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store denied the operation (HTTP 401/403, e.g. row-level
    /// security rejecting a write).
    #[error("access denied: {0}")]
    Denied(String),

    /// The store rejected the request for another reason.
    #[error("remote api error (status {status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the response body, if any.
        message: String,
    },

    /// The response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// A row decoded but could not be mapped to the canonical shape.
    #[error("malformed row: {0}")]
    Malformed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_lists_fields() {
        let err = ValidationError {
            missing: vec!["name", "category"],
        };
        assert_eq!(err.to_string(), "missing required fields: name, category");
    }

    #[test]
    fn test_remote_error_display() {
        let err = RemoteError::Api {
            status: 409,
            message: "duplicate key".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "remote api error (status 409): duplicate key"
        );

        let denied = RemoteError::Denied("row-level security".to_owned());
        assert_eq!(denied.to_string(), "access denied: row-level security");
    }
}
