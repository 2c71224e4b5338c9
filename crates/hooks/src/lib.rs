//! Caller-side glue for single-session enforcement.
//!
//! An authentication pipeline calls these hooks at three fixed points:
//! after a successful login, after restoring a user from session state,
//! and before logout.  The hooks own the session-key naming and the raw
//! session map; the [`ssa_sessions::SessionAuthority`] owns the tokens.

pub mod hooks;
pub mod raw_session;
pub mod scope;
pub mod subject;

pub use hooks::{HookError, SessionHooks};
pub use raw_session::RawSession;
pub use scope::{session_key, Scope};
pub use subject::SingleSessionSubject;
