//! Structured Logging with Sensitive Data Redaction
//!
//! Safe logging that automatically redacts:
//! - Private keys
//! - Mnemonics/seed phrases
//! - Full addresses (partial redaction)

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

/// Global flag to enable/disable debug logging
static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);

/// Enable debug logging
pub fn enable_debug() {
    DEBUG_ENABLED.store(true, Ordering::SeqCst);
}

/// Disable debug logging
pub fn disable_debug() {
    DEBUG_ENABLED.store(false, Ordering::SeqCst);
}

pub fn is_debug_enabled() -> bool {
    DEBUG_ENABLED.load(Ordering::SeqCst)
}

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

/// Structured log entry
#[derive(Debug)]
pub struct LogEntry {
    pub level: LogLevel,
    pub module: &'static str,
    pub message: String,
    pub fields: Vec<(&'static str, String)>,
}

impl LogEntry {
    pub fn new(level: LogLevel, module: &'static str, message: impl Into<String>) -> Self {
        Self {
            level,
            module,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    /// Add a field to the log entry (auto-redacts sensitive data)
    pub fn field(mut self, key: &'static str, value: impl fmt::Display) -> Self {
        let value_str = value.to_string();
        let redacted = redact_if_sensitive(key, &value_str);
        self.fields.push((key, redacted));
        self
    }

    /// Add an address field (partial redaction)
    pub fn address_field(mut self, key: &'static str, address: &str) -> Self {
        self.fields.push((key, redact_address(address)));
        self
    }

    /// Log the entry
    pub fn log(self) {
        if self.level == LogLevel::Debug && !is_debug_enabled() {
            return;
        }

        let fields_str = self
            .fields
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(" ");

        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ");

        if fields_str.is_empty() {
            eprintln!("[{}] {} [{}] {}", timestamp, self.level, self.module, self.message);
        } else {
            eprintln!(
                "[{}] {} [{}] {} | {}",
                timestamp, self.level, self.module, self.message, fields_str
            );
        }
    }
}

/// Shorthand constructors

pub fn info(module: &'static str, message: impl Into<String>) -> LogEntry {
    LogEntry::new(LogLevel::Info, module, message)
}

pub fn warn(module: &'static str, message: impl Into<String>) -> LogEntry {
    LogEntry::new(LogLevel::Warn, module, message)
}

pub fn error(module: &'static str, message: impl Into<String>) -> LogEntry {
    LogEntry::new(LogLevel::Error, module, message)
}

/// Redact a value if the key suggests it's sensitive
fn redact_if_sensitive(key: &str, value: &str) -> String {
    let key_lower = key.to_lowercase();

    let fully_redacted = [
        "private_key",
        "privatekey",
        "secret",
        "seed",
        "mnemonic",
        "phrase",
        "keypair",
    ];

    if fully_redacted.iter().any(|k| key_lower.contains(k)) {
        return redact_value(value);
    }

    value.to_string()
}

/// Fully redact a value, keeping only its length
fn redact_value(value: &str) -> String {
    format!("<redacted:{}>", value.len())
}

/// Partially redact an address: first 6 and last 4 characters visible
fn redact_address(address: &str) -> String {
    if address.len() <= 12 {
        return "<redacted>".to_string();
    }
    format!("{}…{}", &address[..6], &address[address.len() - 4..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensitive_keys_fully_redacted() {
        let redacted = redact_if_sensitive("private_key", "0xdeadbeef");
        assert!(!redacted.contains("deadbeef"));
        assert!(redacted.starts_with("<redacted:"));

        let redacted = redact_if_sensitive("mnemonic", "abandon abandon about");
        assert!(!redacted.contains("abandon"));
    }

    #[test]
    fn test_non_sensitive_keys_pass_through() {
        assert_eq!(redact_if_sensitive("signature", "5Ej8..."), "5Ej8...");
        assert_eq!(redact_if_sensitive("amount", "1.5"), "1.5");
    }

    #[test]
    fn test_address_partial_redaction() {
        let redacted = redact_address("So11111111111111111111111111111111111111112");
        assert!(redacted.starts_with("So1111"));
        assert!(redacted.ends_with("1112"));
        assert!(redacted.len() < 43);

        assert_eq!(redact_address("short"), "<redacted>");
    }
}
