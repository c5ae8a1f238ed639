//! Anti-forgery token module.
//!
//! Issues and verifies action-scoped, time-windowed tokens derived from a
//! process-wide secret with HMAC-SHA256. Verification failure is reported
//! to the caller, never fatal.

mod rejection;
mod token;

pub use rejection::{Rejection, INVALID_TOKEN_CODE};
pub use token::{TokenGuard, DEFAULT_WINDOW};
