//! The three lifecycle hooks.

use std::sync::Arc;

use ssa_domain::config::AuthorityConfig;
use ssa_domain::error::Error;
use ssa_domain::session::SessionContext;
use ssa_sessions::SessionAuthority;

use crate::raw_session::RawSession;
use crate::scope::{session_key, Scope};
use crate::subject::SingleSessionSubject;

/// Outcome of a hook that refused the request.
#[derive(thiserror::Error, Debug)]
pub enum HookError {
    /// The stored session token is missing or no longer the active one.
    /// The caller must log the user out and reject the request.
    #[error("unauthenticated")]
    Unauthenticated,

    /// The authority could not answer (store outage, bad input).
    #[error(transparent)]
    Authority(#[from] Error),
}

/// Explicit lifecycle calls into a [`SessionAuthority`].
pub struct SessionHooks {
    authority: Arc<SessionAuthority>,
    enforce: bool,
}

impl SessionHooks {
    pub fn new(authority: Arc<SessionAuthority>, config: &AuthorityConfig) -> Self {
        if !config.enforce_single_session {
            tracing::warn!("single-session enforcement disabled; session hooks are no-ops");
        }
        Self {
            authority,
            enforce: config.enforce_single_session,
        }
    }

    pub fn is_enforcing(&self) -> bool {
        self.enforce
    }

    pub fn authority(&self) -> &SessionAuthority {
        &self.authority
    }

    fn applies_to<S>(&self, subject: &S) -> bool
    where
        S: SingleSessionSubject + ?Sized,
    {
        self.enforce && subject.single_session()
    }

    /// Call after credentials were verified.
    ///
    /// Activates a fresh session (which retires any other session the
    /// subject had) and stores its token under the scope's key.
    pub async fn after_authentication<S, R>(
        &self,
        subject: &S,
        scope: &Scope,
        raw: &mut R,
        context: SessionContext,
    ) -> Result<(), HookError>
    where
        S: SingleSessionSubject + ?Sized,
        R: RawSession + ?Sized,
    {
        if !self.applies_to(subject) {
            return Ok(());
        }

        let token = self
            .authority
            .activate(subject.subject_id(), context)
            .await?;
        raw.insert(&session_key(scope), token);
        Ok(())
    }

    /// Call after restoring a user from session state.
    ///
    /// On [`HookError::Unauthenticated`] the scope key has already been
    /// cleared from `raw`.
    pub async fn after_fetch<S, R>(
        &self,
        subject: &S,
        scope: &Scope,
        raw: &mut R,
    ) -> Result<(), HookError>
    where
        S: SingleSessionSubject + ?Sized,
        R: RawSession + ?Sized,
    {
        if !self.applies_to(subject) {
            return Ok(());
        }

        let key = session_key(scope);
        let stored = raw.get(&key).unwrap_or_default();
        if self
            .authority
            .validate(subject.subject_id(), &stored)
            .await?
        {
            return Ok(());
        }

        tracing::debug!(
            user_id = subject.subject_id(),
            scope = %scope,
            "stored session token is not the active one, logging out"
        );
        raw.remove(&key);
        Err(HookError::Unauthenticated)
    }

    /// Call before logout completes, so the session token cannot be
    /// replayed afterwards.
    pub async fn before_logout<S, R>(
        &self,
        subject: &S,
        scope: &Scope,
        raw: &mut R,
    ) -> Result<(), HookError>
    where
        S: SingleSessionSubject + ?Sized,
        R: RawSession + ?Sized,
    {
        if !self.applies_to(subject) {
            return Ok(());
        }

        self.authority.deactivate(subject.subject_id()).await?;
        raw.remove(&session_key(scope));
        Ok(())
    }
}
