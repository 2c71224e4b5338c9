//! Session token minting and comparison.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use sha2::{Digest, Sha256};
use subtle::{Choice, ConstantTimeEq};

/// Generate a cryptographically random opaque token
/// (`bytes` random bytes → base64url-encoded, no padding).
pub fn generate_token(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    rand::rng().fill_bytes(&mut buf);
    URL_SAFE_NO_PAD.encode(buf)
}

/// Compare a presented token against the stored one, if any.
///
/// Both sides are SHA-256 digested so `ct_eq` always compares 32 bytes, and
/// the comparison runs even when nothing is stored; a missing record, a
/// wrong token and a right token all cost the same.
pub fn token_matches(stored: Option<&str>, presented: &str) -> bool {
    let present = Choice::from(stored.is_some() as u8);
    let expected = Sha256::digest(stored.unwrap_or_default().as_bytes());
    let provided = Sha256::digest(presented.as_bytes());
    (present & expected.as_slice().ct_eq(provided.as_slice())).into()
}
