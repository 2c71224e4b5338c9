//! Session records owned by the authority.
//!
//! A [`SessionRecord`] is the single active session for one user identity.
//! Callers only ever see the opaque token returned from activation, or a
//! token-free [`SessionSummary`] for operator views.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Activation context
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Request metadata captured when a session is activated.
///
/// Informational only: validation never looks at it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl SessionContext {
    pub fn new(ip: Option<String>, user_agent: Option<String>) -> Self {
        Self { ip, user_agent }
    }

    pub fn with_ip(ip: impl Into<String>) -> Self {
        Self {
            ip: Some(ip.into()),
            user_agent: None,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Session record
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The currently active session for one user identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub user_id: String,
    /// Non-secret handle for logs and operator tooling.
    pub session_id: Uuid,
    pub token: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl SessionRecord {
    /// Build a fresh record stamped with the current time and a new
    /// session id.
    pub fn new(user_id: &str, token: String, context: SessionContext) -> Self {
        Self {
            user_id: user_id.to_owned(),
            session_id: Uuid::new_v4(),
            token,
            created_at: Utc::now(),
            ip: context.ip,
            user_agent: context.user_agent,
        }
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            user_id: self.user_id.clone(),
            session_id: self.session_id,
            created_at: self.created_at,
            ip: self.ip.clone(),
            user_agent: self.user_agent.clone(),
        }
    }
}

/// A [`SessionRecord`] with the token stripped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub user_id: String,
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_copies_context() {
        let ctx = SessionContext::new(Some("1.2.3.4".into()), Some("curl/8".into()));
        let rec = SessionRecord::new("alice", "tok".into(), ctx);
        assert_eq!(rec.user_id, "alice");
        assert_eq!(rec.ip.as_deref(), Some("1.2.3.4"));
        assert_eq!(rec.user_agent.as_deref(), Some("curl/8"));
    }

    #[test]
    fn summary_omits_token() {
        let rec = SessionRecord::new("alice", "secret-token".into(), SessionContext::default());
        let json = serde_json::to_string(&rec.summary()).unwrap();
        assert!(!json.contains("secret-token"));
        assert!(json.contains(&rec.session_id.to_string()));
    }

    #[test]
    fn persisted_form_has_required_fields() {
        let rec = SessionRecord::new("bob", "t".into(), SessionContext::default());
        let v = serde_json::to_value(&rec).unwrap();
        assert_eq!(v["user_id"], "bob");
        assert_eq!(v["token"], "t");
        assert!(v.get("created_at").is_some());
        // Absent context is not written out.
        assert!(v.get("ip").is_none());
    }
}
