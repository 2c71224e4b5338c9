//! Single-session authority.
//!
//! Issues one opaque session token per user identity, invalidates every
//! earlier token for that identity on re-activation, and validates presented
//! tokens against the active one in constant time.  Storage is pluggable via
//! [`SessionBackend`]; calls for the same identity are serialized by a
//! per-identity lock, calls for different identities never contend.

pub mod authority;
pub mod lock;
pub mod store;
pub mod token;

pub use authority::SessionAuthority;
pub use lock::{UserLock, UserLockMap};
pub use store::{open_backend, FileBackend, MemoryBackend, SessionBackend};
