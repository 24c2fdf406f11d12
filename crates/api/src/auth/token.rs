//! Session token generation and fingerprinting.
//!
//! Tokens are opaque random strings handed to the client once; only their
//! SHA-256 fingerprint is stored server-side, so a database leak does not
//! yield usable tokens. The fingerprint is deterministic and serves purely
//! as a lookup key.

use rand::RngCore;
use sha2::{Digest, Sha256};

/// Token entropy in bytes (hex-encoded to twice this length).
pub const TOKEN_BYTES: usize = 32;

/// Generate a cryptographically random session token.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    // ThreadRng is a CSPRNG seeded from the OS.
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Compute the SHA-256 hex fingerprint of a token.
///
/// Malformed tokens are not special-cased anywhere: whatever the client
/// sends is hashed, and a bad token simply produces a fingerprint that
/// misses the store. This keeps "wrong format" indistinguishable from
/// "unknown token".
pub fn fingerprint(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}
