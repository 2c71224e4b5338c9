//! Authentication scopes and the raw-session key each one uses.

use std::fmt;

/// Name of the default scope.
pub const DEFAULT_SCOPE: &str = "user";

/// An authentication scope (`user`, `admin`, …).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Scope(String);

impl Scope {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_SCOPE
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self(DEFAULT_SCOPE.into())
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Scope {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Raw-session key holding the session token for `scope`:
/// `auth_id` for the default scope, `auth_<scope>_id` otherwise.
pub fn session_key(scope: &Scope) -> String {
    if scope.is_default() {
        "auth_id".into()
    } else {
        format!("auth_{}_id", scope.as_str())
    }
}
