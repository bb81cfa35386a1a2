//! Password-based key derivation using PBKDF2-HMAC-SHA512
//!
//! The iteration count, hash and output length are part of the envelope
//! format. Changing any of them makes previously written files undecryptable.

use crate::entropy::RandomSource;
use crate::error::Result;
use sha2::Sha512;
use std::fmt;
use zeroize::Zeroizing;

/// PBKDF2 iteration count
pub const ITERATIONS: u32 = 500_000;

/// Length of derived key in bytes (AES-256)
pub const KEY_LEN: usize = 32;

/// Length of salt in bytes
pub const SALT_LEN: usize = 64;

pub type Salt = [u8; SALT_LEN];

/// A symmetric key derived from a password and salt.
///
/// The bytes are wiped when the key is dropped and never show up in
/// `Debug` output.
pub struct DerivedKey(Zeroizing<[u8; KEY_LEN]>);

impl DerivedKey {
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DerivedKey([REDACTED])")
    }
}

/// Derive a 32-byte key from a password and salt.
///
/// Deterministic: the same inputs always produce the same key.
pub fn derive(password: &[u8], salt: &[u8]) -> DerivedKey {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2::pbkdf2_hmac::<Sha512>(password, salt, ITERATIONS, &mut key[..]);
    DerivedKey(key)
}

/// Generate a fresh random salt and derive a key from it.
pub fn derive_with_fresh_salt(
    password: &[u8],
    random: &dyn RandomSource,
) -> Result<(DerivedKey, Salt)> {
    let mut salt = [0u8; SALT_LEN];
    random.fill(&mut salt)?;
    Ok((derive(password, &salt), salt))
}
