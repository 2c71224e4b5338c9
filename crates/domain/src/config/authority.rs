use serde::{Deserialize, Serialize};

/// Smallest token width accepted: 16 bytes = 128 bits of entropy.
pub const MIN_TOKEN_BYTES: usize = 16;

/// Above this, `validate` warns.
pub const MAX_SENSIBLE_TOKEN_BYTES: usize = 128;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Session authority
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Single-session enforcement settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorityConfig {
    /// Whether the lifecycle hooks enforce one active session per user.
    /// When `false` every hook is a no-op (and says so in the log).
    #[serde(default = "d_true")]
    pub enforce_single_session: bool,

    /// Random bytes per session token before base64url encoding.
    #[serde(default = "d_token_bytes")]
    pub token_bytes: usize,
}

impl Default for AuthorityConfig {
    fn default() -> Self {
        Self {
            enforce_single_session: true,
            token_bytes: d_token_bytes(),
        }
    }
}

fn d_true() -> bool {
    true
}

fn d_token_bytes() -> usize {
    32
}
