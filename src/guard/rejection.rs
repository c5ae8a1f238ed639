//! Structured rejection for failed verification.

use serde::Serialize;
use uuid::Uuid;

/// Stable machine code carried by a failed anti-forgery check.
pub const INVALID_TOKEN_CODE: &str = "invalid_nonce";

/// A caller-visible rejection produced when token verification fails.
///
/// Carries an HTTP-equivalent status and a stable code so clients can
/// branch on it (typically retry with a refreshed token), plus a request
/// id for correlating with server-side logs.
#[derive(Debug, Clone, Serialize)]
pub struct Rejection {
    /// HTTP-equivalent status for transports that map to HTTP.
    pub status: u16,
    /// Stable, machine-checkable error code.
    pub code: String,
    /// Human-readable message safe to show to end users.
    pub message: String,
    /// Unique identifier for this rejection.
    pub request_id: Uuid,
}

impl Rejection {
    /// The rejection for a missing, expired, or mismatched token.
    pub fn invalid_token() -> Self {
        Self {
            status: 403,
            code: INVALID_TOKEN_CODE.to_string(),
            message: "Security verification failed. Please refresh the page and try again."
                .to_string(),
            request_id: Uuid::new_v4(),
        }
    }
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code)
    }
}
