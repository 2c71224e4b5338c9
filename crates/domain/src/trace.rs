use serde::Serialize;

/// Structured trace events emitted across the session-authority crates.
///
/// Events carry the non-secret `session_id` handle, never the token.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    SessionActivated {
        user_id: String,
        session_id: String,
        /// Session id of the record this activation replaced, if any.
        superseded: Option<String>,
    },
    SessionRejected {
        user_id: String,
        reason: RejectReason,
    },
    SessionDeactivated {
        user_id: String,
        session_id: Option<String>,
    },
    SessionStoreLoaded {
        backend: String,
        sessions: usize,
    },
}

/// Why a presented token did not validate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    NoSession,
    TokenMismatch,
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "ssa_event");
    }
}
