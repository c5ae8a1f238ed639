//! Formgate Library
//!
//! This crate provides the input-defense core for form handling: field-type
//! directed sanitization of untrusted payloads, action-scoped anti-forgery
//! tokens, and a level-filtered audit log with bounded retention.

pub mod audit;
pub mod config;
pub mod error;
pub mod guard;
pub mod sanitize;

pub use audit::{AuditLog, Level, LogEntry};
pub use config::{ConfigStore, MemoryConfigStore, Settings, TomlConfigStore};
pub use error::{DefenseError, DefenseResult};
pub use guard::{Rejection, TokenGuard};
pub use sanitize::{field_value, sanitize_submission, FieldKind, SanitizedValue};
