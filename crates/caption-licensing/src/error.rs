//! Licensing Error Types

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, LicenseError>;

/// License and webhook-processing errors
#[derive(Error, Debug)]
pub enum LicenseError {
    /// No license found for the key, or the license has expired.
    /// The two cases are deliberately indistinguishable to the caller.
    #[error("License expired or not found")]
    AccessDenied,

    /// Inbound webhook payload is missing required fields or carries
    /// an unparseable one
    #[error("Malformed webhook event: {0}")]
    MalformedEvent(String),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(String),
}
