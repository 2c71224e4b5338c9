//! The session authority: one active session per user identity.
//!
//! Per identity the state is either "no session" or "active with token t".
//! `activate` always lands in a fresh active state (implicitly invalidating
//! the old token), `deactivate` always lands in "no session", and
//! `validate` is a pure read.

use std::sync::Arc;

use ssa_domain::config::{AuthorityConfig, MIN_TOKEN_BYTES};
use ssa_domain::error::{Error, Result};
use ssa_domain::session::{SessionContext, SessionRecord, SessionSummary};
use ssa_domain::trace::{RejectReason, TraceEvent};

use crate::lock::UserLockMap;
use crate::store::SessionBackend;
use crate::token::{generate_token, token_matches};

const DEFAULT_TOKEN_BYTES: usize = 32;

/// Issues, validates and revokes single-session tokens.
pub struct SessionAuthority {
    backend: Arc<dyn SessionBackend>,
    locks: UserLockMap,
    token_bytes: usize,
}

impl SessionAuthority {
    pub fn new(backend: Arc<dyn SessionBackend>) -> Self {
        Self {
            backend,
            locks: UserLockMap::new(),
            token_bytes: DEFAULT_TOKEN_BYTES,
        }
    }

    pub fn from_config(config: &AuthorityConfig, backend: Arc<dyn SessionBackend>) -> Self {
        Self::new(backend).with_token_bytes(config.token_bytes)
    }

    /// Set the token width.  Values below 16 bytes are raised to 16.
    pub fn with_token_bytes(mut self, bytes: usize) -> Self {
        if bytes < MIN_TOKEN_BYTES {
            tracing::warn!(
                requested = bytes,
                using = MIN_TOKEN_BYTES,
                "token width below 128 bits, clamping"
            );
        }
        self.token_bytes = bytes.max(MIN_TOKEN_BYTES);
        self
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Start a new session for `user_id`, replacing any existing one.
    ///
    /// Returns the new token.  Every token issued earlier for this user
    /// stops validating as soon as this returns.
    pub async fn activate(&self, user_id: &str, context: SessionContext) -> Result<String> {
        if user_id.trim().is_empty() {
            return Err(Error::InvalidArgument("user_id must not be empty".into()));
        }

        let _permit = self.locks.acquire(user_id).await?;

        let superseded = self
            .backend
            .get(user_id)
            .await?
            .map(|prev| prev.session_id.to_string());

        let token = generate_token(self.token_bytes);
        let record = SessionRecord::new(user_id, token.clone(), context);
        let session_id = record.session_id.to_string();
        self.backend.put(record).await?;

        TraceEvent::SessionActivated {
            user_id: user_id.to_owned(),
            session_id,
            superseded,
        }
        .emit();

        Ok(token)
    }

    /// Check whether `token` is the active session token for `user_id`.
    ///
    /// Unknown users, stale tokens and empty input all yield `Ok(false)`;
    /// only store failures are errors.
    pub async fn validate(&self, user_id: &str, token: &str) -> Result<bool> {
        if user_id.trim().is_empty() || token.is_empty() {
            return Ok(false);
        }

        let record = {
            let _permit = self.locks.acquire(user_id).await?;
            self.backend.get(user_id).await?
        };

        let stored = record.as_ref().map(|r| r.token.as_str());
        let valid = token_matches(stored, token);

        if !valid {
            let reason = if record.is_some() {
                RejectReason::TokenMismatch
            } else {
                RejectReason::NoSession
            };
            TraceEvent::SessionRejected {
                user_id: user_id.to_owned(),
                reason,
            }
            .emit();
        }

        Ok(valid)
    }

    /// End the active session for `user_id`.  Idempotent.
    pub async fn deactivate(&self, user_id: &str) -> Result<()> {
        if user_id.trim().is_empty() {
            return Ok(());
        }

        let _permit = self.locks.acquire(user_id).await?;

        let session_id = self
            .backend
            .get(user_id)
            .await?
            .map(|r| r.session_id.to_string());

        if session_id.is_some() {
            self.backend.remove(user_id).await?;
        }

        TraceEvent::SessionDeactivated {
            user_id: user_id.to_owned(),
            session_id,
        }
        .emit();

        Ok(())
    }

    /// Token-free view of the active session for `user_id`.
    pub async fn current(&self, user_id: &str) -> Result<Option<SessionSummary>> {
        Ok(self
            .backend
            .get(user_id)
            .await?
            .map(|r| r.summary()))
    }

    /// Token-free views of every active session, oldest first.
    pub async fn list(&self) -> Result<Vec<SessionSummary>> {
        let mut out: Vec<SessionSummary> = self
            .backend
            .list()
            .await?
            .iter()
            .map(SessionRecord::summary)
            .collect();
        out.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(out)
    }
}
