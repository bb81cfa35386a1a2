//! Authenticated encryption using PBKDF2 + AES-256-GCM
//!
//! Envelope: salt(64) + nonce(12) + ciphertext + tag(16). No associated data.

use crate::entropy::{Clock, RandomSource};
use crate::envelope::Mode;
use crate::error::{CifraError, ErrorCategory, ErrorKind, Result};
use crate::kdf;
use crate::nonce::NonceGenerator;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};

/// Length of the GCM authentication tag in bytes
pub const TAG_LEN: usize = 16;

fn cipher(key: &kdf::DerivedKey) -> Aes256Gcm {
    Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()))
}

/// Encrypt plaintext under a fresh salt and nonce.
pub fn encrypt(
    plaintext: &[u8],
    password: &[u8],
    random: &dyn RandomSource,
    clock: &dyn Clock,
) -> Result<Vec<u8>> {
    let (key, salt) = kdf::derive_with_fresh_salt(password, random)?;
    let nonce = NonceGenerator::new(random, clock).generate_nonce()?;

    let sealed = cipher(&key)
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|e| {
            CifraError::with_kind(
                ErrorCategory::Internal,
                ErrorKind::CipherFailure,
                format!("AES-GCM encryption failed: {}", e),
            )
        })?;

    Ok(Mode::Gcm.layout().assemble(&salt, &nonce, &sealed))
}

/// Decrypt and authenticate an envelope produced by [`encrypt`].
///
/// A wrong password and a corrupted or tampered envelope produce the same
/// error, and no plaintext is returned in either case.
pub fn decrypt(envelope: &[u8], password: &[u8]) -> Result<Vec<u8>> {
    let parts = Mode::Gcm.layout().split(envelope)?;
    let key = kdf::derive(password, parts.salt);

    cipher(&key)
        .decrypt(Nonce::from_slice(parts.nonce_or_iv), parts.body)
        .map_err(|_| {
            CifraError::with_kind(
                ErrorCategory::User,
                ErrorKind::AuthenticationFailed,
                "corrupt input, tampered-with data, or bad password",
            )
        })
}
