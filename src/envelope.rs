//! Binary envelope layout shared by both cipher modes
//!
//! The format is:
//! - salt: 64 bytes
//! - nonce (GCM, 12 bytes) or IV (CFB, 16 bytes)
//! - body: GCM ciphertext with its 16-byte tag appended, or CFB ciphertext
//!   of exactly the plaintext length
//!
//! There is no header, version or length field. The mode must be known by
//! the caller.

use crate::error::{CifraError, ErrorCategory, ErrorKind, Result};
use crate::kdf::SALT_LEN;
use crate::nonce::{IV_LEN, NONCE_LEN};
use std::fmt;

/// Cipher mode of an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// AES-256-GCM. Authenticated.
    #[default]
    Gcm,
    /// AES-256-CFB. Not authenticated.
    Cfb,
}

impl Mode {
    pub const fn layout(self) -> EnvelopeLayout {
        match self {
            Mode::Gcm => EnvelopeLayout {
                label: "gcm",
                nonce_len: NONCE_LEN,
            },
            Mode::Cfb => EnvelopeLayout {
                label: "cfb",
                nonce_len: IV_LEN,
            },
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.layout().label)
    }
}

/// Fixed field lengths for one mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvelopeLayout {
    pub label: &'static str,
    pub nonce_len: usize,
}

/// An envelope split into its fields, borrowing from the input.
#[derive(Debug, PartialEq, Eq)]
pub struct Parts<'a> {
    pub salt: &'a [u8],
    pub nonce_or_iv: &'a [u8],
    pub body: &'a [u8],
}

impl EnvelopeLayout {
    /// Smallest valid envelope: salt and nonce/IV with an empty body.
    pub const fn min_len(&self) -> usize {
        SALT_LEN + self.nonce_len
    }

    /// Concatenate `salt || nonce_or_iv || body`.
    pub fn assemble(&self, salt: &[u8; SALT_LEN], nonce_or_iv: &[u8], body: &[u8]) -> Vec<u8> {
        debug_assert_eq!(nonce_or_iv.len(), self.nonce_len);

        let mut output = Vec::with_capacity(self.min_len() + body.len());
        output.extend_from_slice(salt);
        output.extend_from_slice(nonce_or_iv);
        output.extend_from_slice(body);
        output
    }

    /// Split an envelope into salt, nonce/IV and body.
    ///
    /// Anything shorter than [`min_len`](Self::min_len) is rejected before
    /// it can reach a cipher.
    pub fn split<'a>(&self, envelope: &'a [u8]) -> Result<Parts<'a>> {
        if envelope.len() < self.min_len() {
            return Err(CifraError::with_kind(
                ErrorCategory::User,
                ErrorKind::MalformedEnvelope,
                format!(
                    "malformed {} envelope: need at least {} bytes, got {}; input likely truncated or corrupt",
                    self.label,
                    self.min_len(),
                    envelope.len()
                ),
            ));
        }

        let (salt, rest) = envelope.split_at(SALT_LEN);
        let (nonce_or_iv, body) = rest.split_at(self.nonce_len);
        Ok(Parts {
            salt,
            nonce_or_iv,
            body,
        })
    }
}
