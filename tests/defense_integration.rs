//! Integration tests for the formgate input-defense core.
//!
//! These tests wire the real components together the way an embedding
//! request handler would: load settings, build the token guard from a
//! secret file, sanitize a payload, verify the anti-forgery token, and
//! record the outcome in the audit log.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde_json::json;
use tempfile::TempDir;

use formgate::{
    AuditLog, ConfigStore, FieldKind, SanitizedValue, Settings, TokenGuard, TomlConfigStore,
};

/// Shared fixture: a settings file, a 0600 secret, and a config store.
struct TestHarness {
    settings: Settings,
    guard: TokenGuard,
    log_dir: PathBuf,
    store_path: PathBuf,
    _temp_dir: TempDir,
}

impl TestHarness {
    fn create() -> Self {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("formgate=debug")
            .try_init();

        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let secret_path = write_secret(temp_dir.path());
        let log_dir = temp_dir.path().join("logs");
        let store_path = temp_dir.path().join("store.toml");

        let config_path = temp_dir.path().join("formgate.toml");
        std::fs::write(
            &config_path,
            format!(
                r#"
[security]
secret_path = "{}"
token_window_seconds = 3600

[logging]
log_dir = "{}"
"#,
                secret_path.display(),
                log_dir.display()
            ),
        )
        .expect("Failed to write config");

        let settings = Settings::load(&config_path).expect("Failed to load settings");
        let secret =
            TokenGuard::load_secret(&settings.security.secret_path).expect("Failed to load secret");
        let guard = TokenGuard::new(
            &secret,
            Duration::from_secs(settings.security.token_window_seconds),
        );

        Self {
            settings,
            guard,
            log_dir,
            store_path,
            _temp_dir: temp_dir,
        }
    }

    fn audit_log(&self) -> AuditLog {
        let store = TomlConfigStore::open(&self.store_path).expect("Failed to open config store");
        AuditLog::new(&self.log_dir, Arc::new(store) as Arc<dyn ConfigStore>)
    }
}

fn write_secret(dir: &Path) -> PathBuf {
    let secret_path = dir.join("token.key");
    std::fs::write(&secret_path, "integration-test-secret-material").expect("Failed to write secret");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&secret_path, std::fs::Permissions::from_mode(0o600))
            .expect("Failed to set secret permissions");
    }
    secret_path
}

#[test]
fn test_accepted_submission_flow() {
    let harness = TestHarness::create();
    let log = harness.audit_log();

    // The form renders a hidden field; the client posts it back.
    let field = harness
        .guard
        .hidden_field(&harness.settings.security.token_field, "submit_contact");
    let token = field
        .split("value=\"")
        .nth(1)
        .and_then(|rest| rest.split('"').next())
        .expect("hidden field should carry a token");

    assert!(harness.guard.verify_carrier(Some(token), "submit_contact"));

    let payload = json!({
        "name": "  Ada Lovelace ",
        "email": "ADA@EXAMPLE.COM",
        "age": "36",
        "newsletter": "on",
        "website": "javascript:alert(1)"
    });
    let field_types: HashMap<String, FieldKind> = [
        ("name", FieldKind::Text),
        ("email", FieldKind::Email),
        ("age", FieldKind::Number),
        ("newsletter", FieldKind::Checkbox),
        ("website", FieldKind::Url),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();

    let sanitized = formgate::sanitize_submission(&payload, &field_types);
    assert_eq!(
        sanitized["name"],
        SanitizedValue::Text("Ada Lovelace".to_string())
    );
    assert_eq!(
        sanitized["email"],
        SanitizedValue::Text("ADA@example.com".to_string())
    );
    assert_eq!(sanitized["age"], SanitizedValue::Integer(36));
    assert_eq!(sanitized["newsletter"], SanitizedValue::Flag(true));
    assert!(sanitized["website"].is_empty());

    log.set_enabled(true);
    log.info("submission accepted", Some(json!({"fields": sanitized.len()})));
    let lines = log.recent(1);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("] [INFO] submission accepted"));
}

#[test]
fn test_rejected_submission_is_always_audited() {
    let harness = TestHarness::create();
    let log = harness.audit_log();

    // Token issued for a different action must not pass.
    let wrong = harness.guard.issue("delete_entry");
    let rejection = harness
        .guard
        .require(Some(&wrong), "submit_contact")
        .unwrap_err();
    assert_eq!(rejection.status, 403);
    assert_eq!(rejection.code, "invalid_nonce");

    // Logging is disabled, yet the error entry still lands.
    assert!(!log.is_enabled());
    log.error(
        "anti-forgery verification failed",
        Some(json!({"action": "submit_contact", "code": rejection.code})),
    );
    log.debug("this one is dropped", None);

    let lines = log.recent(10);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("] [ERROR] anti-forgery verification failed"));
}

#[test]
fn test_token_window_lifecycle() {
    let harness = TestHarness::create();
    let window = harness.settings.security.token_window_seconds;

    // Issued just before a rollover, verified just after: still valid.
    let boundary = 7 * window;
    let token = harness.guard.issue_at("save", boundary - 1);
    assert!(harness.guard.verify_at(&token, "save", boundary + 1));

    // Two full windows later the token has aged out.
    assert!(!harness.guard.verify_at(&token, "save", boundary + 2 * window));

    // Same window, same token; different action, different token.
    assert_eq!(
        harness.guard.issue_at("save", boundary + 10),
        harness.guard.issue_at("save", boundary + 20)
    );
    assert_ne!(
        harness.guard.issue_at("save", boundary + 10),
        harness.guard.issue_at("publish", boundary + 10)
    );
}

#[test]
fn test_enabled_flag_survives_reconstruction() {
    let harness = TestHarness::create();

    {
        let log = harness.audit_log();
        log.set_enabled(true);
    }

    // A fresh logger over the same store sees the persisted flag, the way
    // a new process would.
    let log = harness.audit_log();
    assert!(log.is_enabled());

    log.set_enabled(false);
    let log = harness.audit_log();
    assert!(!log.is_enabled());
}

#[test]
fn test_concurrent_appends_never_interleave() {
    let harness = TestHarness::create();
    let log = Arc::new(harness.audit_log());

    const WRITERS: usize = 8;
    const ENTRIES: usize = 25;

    let mut handles = Vec::new();
    for writer in 0..WRITERS {
        let log = Arc::clone(&log);
        handles.push(thread::spawn(move || {
            for i in 0..ENTRIES {
                log.error(
                    &format!("writer {} entry {}", writer, i),
                    Some(json!({"writer": writer})),
                );
            }
        }));
    }
    for handle in handles {
        handle.join().expect("writer thread panicked");
    }

    let lines = log.recent(WRITERS * ENTRIES + 10);
    assert_eq!(lines.len(), WRITERS * ENTRIES);
    for line in &lines {
        // Every line is complete: bracketed timestamp, level, message,
        // and its context payload.
        assert!(line.starts_with('['), "partial line: {}", line);
        assert!(line.contains("] [ERROR] writer "), "partial line: {}", line);
        assert!(line.ends_with('}'), "partial line: {}", line);
    }
}
