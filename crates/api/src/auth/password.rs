//! Scrypt password hashing and verification.
//!
//! Hashes are stored as `salt_hex:key_hex` with a fresh 16-byte random salt
//! per password and a 64-byte derived key. Verification re-derives the key
//! with the stored salt and compares in constant time, so it never branches
//! on secret-dependent data.
//!
//! Both functions are CPU-bound (the KDF is deliberately slow). Async callers
//! must wrap them in `tokio::task::spawn_blocking` to keep the request
//! executor responsive.

use rand::RngCore;
use scrypt::Params;
use subtle::ConstantTimeEq;

/// Salt length in bytes.
const SALT_BYTES: usize = 16;

/// Derived key length in bytes.
const KEY_BYTES: usize = 64;

/// Scrypt cost parameters: N = 2^14, r = 8, p = 1.
const SCRYPT_LOG_N: u8 = 14;
const SCRYPT_R: u32 = 8;
const SCRYPT_P: u32 = 1;

/// Errors from key derivation. With the fixed constants above these cannot
/// occur in practice, but the scrypt API is fallible and we propagate rather
/// than unwrap.
#[derive(Debug, thiserror::Error)]
pub enum HashError {
    #[error("invalid scrypt parameters")]
    InvalidParams(#[from] scrypt::errors::InvalidParams),
    #[error("invalid scrypt output length")]
    InvalidOutputLen(#[from] scrypt::errors::InvalidOutputLen),
}

fn params() -> Result<Params, scrypt::errors::InvalidParams> {
    Params::new(SCRYPT_LOG_N, SCRYPT_R, SCRYPT_P, KEY_BYTES)
}

fn derive_key(password: &str, salt: &[u8]) -> Result<[u8; KEY_BYTES], HashError> {
    let mut key = [0u8; KEY_BYTES];
    scrypt::scrypt(password.as_bytes(), salt, &params()?, &mut key)?;
    Ok(key)
}

/// Hash a plaintext password with a fresh random salt.
///
/// Returns `salt_hex:key_hex`.
pub fn hash_password(password: &str) -> Result<String, HashError> {
    let mut salt = [0u8; SALT_BYTES];
    // ThreadRng is a CSPRNG seeded from the OS.
    rand::rng().fill_bytes(&mut salt);

    let key = derive_key(password, &salt)?;
    Ok(format!("{}:{}", hex::encode(salt), hex::encode(key)))
}

/// Verify a plaintext password against a stored `salt_hex:key_hex` value.
///
/// Fails closed: a missing separator or non-hex content yields `false`, never
/// an error. The final comparison is constant-time.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt_hex, key_hex)) = stored.split_once(':') else {
        return false;
    };
    let Ok(salt) = hex::decode(salt_hex) else {
        return false;
    };
    let Ok(stored_key) = hex::decode(key_hex) else {
        return false;
    };

    let Ok(derived) = derive_key(password, &salt) else {
        return false;
    };

    derived.ct_eq(&stored_key[..]).into()
}
