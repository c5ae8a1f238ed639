//! HMAC-SHA256 token issuance and verification.

use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use ring::{constant_time, hmac};

use crate::error::DefenseError;
use crate::sanitize::markup::escape_attribute;

use super::Rejection;

/// Default token validity window (12 hours).
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(43_200);

/// HMAC output bytes kept in the rendered token.
const TOKEN_BYTES: usize = 16;

/// Issues and checks action-scoped anti-forgery tokens.
///
/// A token is a keyed hash of the action name and the current time window,
/// so a token rendered into a page stays valid for the lifetime of that
/// page without any server-side storage. Verification accepts the current
/// and the immediately preceding window to tolerate requests that straddle
/// a rollover; once both windows have passed, the token is implicitly
/// expired.
pub struct TokenGuard {
    key: hmac::Key,
    window: Duration,
}

impl TokenGuard {
    /// Create a guard from raw secret bytes and a validity window.
    pub fn new(secret: &[u8], window: Duration) -> Self {
        let key = hmac::Key::new(hmac::HMAC_SHA256, secret);
        Self { key, window }
    }

    /// Create a guard with the default 12-hour window.
    pub fn with_default_window(secret: &[u8]) -> Self {
        Self::new(secret, DEFAULT_WINDOW)
    }

    /// Load the token secret from a file.
    ///
    /// Security: Verifies the file has restrictive permissions (0600 or
    /// 0400) before loading to prevent the secret from being readable by
    /// other users.
    pub fn load_secret(path: &Path) -> Result<Vec<u8>, DefenseError> {
        let metadata = std::fs::metadata(path).map_err(|e| DefenseError::Secret {
            message: format!(
                "Failed to read token secret metadata from {}: {}",
                path.display(),
                e
            ),
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = metadata.permissions().mode();
            // Check that group and world bits are all zero (only owner can access)
            if mode & 0o077 != 0 {
                return Err(DefenseError::Secret {
                    message: format!(
                        "Token secret file {} has insecure permissions {:04o}, expected 0600 or 0400",
                        path.display(),
                        mode & 0o777
                    ),
                });
            }
        }
        #[cfg(not(unix))]
        let _ = metadata;

        std::fs::read(path).map_err(|e| DefenseError::Secret {
            message: format!("Failed to read token secret from {}: {}", path.display(), e),
        })
    }

    /// Issue a token bound to an action name.
    ///
    /// Deterministic within one time window: repeated calls with the same
    /// action and secret return the same token until the window rolls
    /// over. Issuance has no failure mode.
    pub fn issue(&self, action: &str) -> String {
        self.issue_at(action, unix_now())
    }

    /// Issue a token for an explicit clock reading (seconds since epoch).
    pub fn issue_at(&self, action: &str, now_unix: u64) -> String {
        self.compute(action, self.window_index(now_unix))
    }

    /// Verify a token against an action name.
    ///
    /// Recomputes the expected tokens for the current and immediately
    /// preceding window and compares in constant time. Action scoping is
    /// exact-match: a token issued for one action never verifies against
    /// another.
    pub fn verify(&self, token: &str, action: &str) -> bool {
        self.verify_at(token, action, unix_now())
    }

    /// Verify against an explicit clock reading.
    pub fn verify_at(&self, token: &str, action: &str, now_unix: u64) -> bool {
        if token.is_empty() {
            return false;
        }
        let index = self.window_index(now_unix);
        let mut valid = constant_time_eq(token, &self.compute(action, index));
        if index > 0 {
            valid |= constant_time_eq(token, &self.compute(action, index - 1));
        }
        valid
    }

    /// Verify a token extracted from a request carrier (form field, header,
    /// or query parameter). An absent or blank carrier fails verification.
    pub fn verify_carrier(&self, carrier: Option<&str>, action: &str) -> bool {
        match carrier {
            Some(token) if !token.trim().is_empty() => self.verify(token.trim(), action),
            _ => false,
        }
    }

    /// Fail-fast variant of [`TokenGuard::verify_carrier`]: a failed check
    /// produces a structured [`Rejection`] the caller can hand straight
    /// back to the client.
    pub fn require(&self, carrier: Option<&str>, action: &str) -> Result<(), Rejection> {
        if self.verify_carrier(carrier, action) {
            Ok(())
        } else {
            Err(Rejection::invalid_token())
        }
    }

    /// Render a hidden input carrying a fresh token for the action, for
    /// embedding in server-rendered forms.
    pub fn hidden_field(&self, field_name: &str, action: &str) -> String {
        format!(
            r#"<input type="hidden" name="{}" value="{}" />"#,
            escape_attribute(field_name),
            self.issue(action)
        )
    }

    fn window_index(&self, now_unix: u64) -> u64 {
        now_unix / self.window.as_secs().max(1)
    }

    fn compute(&self, action: &str, window_index: u64) -> String {
        let message = format!("{}:{}", action, window_index);
        let tag = hmac::sign(&self.key, message.as_bytes());
        hex::encode(&tag.as_ref()[..TOKEN_BYTES])
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn constant_time_eq(supplied: &str, expected: &str) -> bool {
    constant_time::verify_slices_are_equal(supplied.as_bytes(), expected.as_bytes()).is_ok()
}
