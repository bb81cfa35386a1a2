//! Mode-selecting facade over the GCM and CFB pipelines
//!
//! The two modes give different guarantees:
//!
//! - **GCM** detects a wrong password and any corruption or tampering, and
//!   returns [`ErrorKind::AuthenticationFailed`](crate::error::ErrorKind)
//!   without any plaintext.
//! - **CFB** detects neither. Decryption always succeeds on an envelope of
//!   valid length and, with the wrong password or corrupted data, returns
//!   garbage of the same length as the original plaintext.
//!
//! Both reject envelopes shorter than salt plus nonce/IV with
//! [`ErrorKind::MalformedEnvelope`](crate::error::ErrorKind).

use crate::cfb;
use crate::entropy::{Clock, OsRandom, RandomSource, SystemClock};
use crate::envelope::Mode;
use crate::error::Result;
use crate::gcm;

/// Encrypts and decrypts envelopes with injected randomness and time.
///
/// Holds no per-call state; a single engine can serve concurrent callers.
pub struct Engine {
    random: Box<dyn RandomSource>,
    clock: Box<dyn Clock>,
}

impl Engine {
    /// An engine backed by the OS random source and the system clock.
    pub fn new() -> Self {
        Self::with_sources(Box::new(OsRandom), Box::new(SystemClock))
    }

    pub fn with_sources(random: Box<dyn RandomSource>, clock: Box<dyn Clock>) -> Self {
        Self { random, clock }
    }

    pub fn encrypt_gcm(&self, plaintext: &[u8], password: &[u8]) -> Result<Vec<u8>> {
        gcm::encrypt(plaintext, password, &*self.random, &*self.clock)
    }

    pub fn decrypt_gcm(&self, envelope: &[u8], password: &[u8]) -> Result<Vec<u8>> {
        gcm::decrypt(envelope, password)
    }

    pub fn encrypt_cfb(&self, plaintext: &[u8], password: &[u8]) -> Result<Vec<u8>> {
        cfb::encrypt(plaintext, password, &*self.random, &*self.clock)
    }

    /// See the module docs: a wrong password is *not* an error here.
    pub fn decrypt_cfb(&self, envelope: &[u8], password: &[u8]) -> Result<Vec<u8>> {
        cfb::decrypt(envelope, password)
    }

    pub fn encrypt(&self, mode: Mode, plaintext: &[u8], password: &[u8]) -> Result<Vec<u8>> {
        match mode {
            Mode::Gcm => self.encrypt_gcm(plaintext, password),
            Mode::Cfb => self.encrypt_cfb(plaintext, password),
        }
    }

    pub fn decrypt(&self, mode: Mode, envelope: &[u8], password: &[u8]) -> Result<Vec<u8>> {
        match mode {
            Mode::Gcm => self.decrypt_gcm(envelope, password),
            Mode::Cfb => self.decrypt_cfb(envelope, password),
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

/// Encrypt with AES-256-GCM using system randomness.
pub fn encrypt_gcm(plaintext: &[u8], password: &[u8]) -> Result<Vec<u8>> {
    Engine::new().encrypt_gcm(plaintext, password)
}

/// Decrypt and authenticate an AES-256-GCM envelope.
pub fn decrypt_gcm(envelope: &[u8], password: &[u8]) -> Result<Vec<u8>> {
    Engine::new().decrypt_gcm(envelope, password)
}

/// Encrypt with AES-256-CFB using system randomness.
pub fn encrypt_cfb(plaintext: &[u8], password: &[u8]) -> Result<Vec<u8>> {
    Engine::new().encrypt_cfb(plaintext, password)
}

/// Decrypt an AES-256-CFB envelope. Never fails on a wrong password.
pub fn decrypt_cfb(envelope: &[u8], password: &[u8]) -> Result<Vec<u8>> {
    Engine::new().decrypt_cfb(envelope, password)
}
