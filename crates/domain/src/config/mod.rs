mod authority;
mod observability;
mod store;

pub use authority::*;
pub use observability::*;
pub use store::*;

use serde::{Deserialize, Serialize};
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub authority: AuthorityConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.authority.token_bytes < MIN_TOKEN_BYTES {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "authority.token_bytes".into(),
                message: format!(
                    "tokens need at least {MIN_TOKEN_BYTES} bytes (128 bits) of entropy, got {}",
                    self.authority.token_bytes
                ),
            });
        } else if self.authority.token_bytes > MAX_SENSIBLE_TOKEN_BYTES {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "authority.token_bytes".into(),
                message: format!(
                    "{} bytes is unusually large for a session token",
                    self.authority.token_bytes
                ),
            });
        }

        if !self.authority.enforce_single_session {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "authority.enforce_single_session".into(),
                message: "single-session enforcement is disabled; login hooks will not invalidate older sessions".into(),
            });
        }

        if self.store.backend == StoreBackendKind::File
            && self.store.state_path.as_os_str().is_empty()
        {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "store.state_path".into(),
                message: "the file backend needs a state_path".into(),
            });
        }

        errors
    }

    /// `true` when [`validate`](Self::validate) reports no errors
    /// (warnings are allowed).
    pub fn is_valid(&self) -> bool {
        self.validate()
            .iter()
            .all(|e| e.severity != ConfigSeverity::Error)
    }
}
