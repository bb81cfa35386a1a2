//! Per-encryption nonce (GCM) and IV (CFB) generation

use crate::entropy::{Clock, RandomSource};
use crate::error::Result;

/// Length of a GCM nonce in bytes
pub const NONCE_LEN: usize = 12;

/// Length of a CFB IV in bytes (the AES block size)
pub const IV_LEN: usize = 16;

/// Number of low-order timestamp bytes kept in a GCM nonce
const TIMESTAMP_LEN: usize = 6;

pub struct NonceGenerator<'a> {
    random: &'a dyn RandomSource,
    clock: &'a dyn Clock,
}

impl<'a> NonceGenerator<'a> {
    pub fn new(random: &'a dyn RandomSource, clock: &'a dyn Clock) -> Self {
        Self { random, clock }
    }

    /// Generate a 12-byte GCM nonce.
    ///
    /// Layout: the low 6 bytes of the big-endian nanosecond timestamp
    /// followed by 6 random bytes. The two high-order timestamp bytes change
    /// too slowly to help with uniqueness and are dropped.
    pub fn generate_nonce(&self) -> Result<[u8; NONCE_LEN]> {
        let timestamp = self.clock.now_nanos().to_be_bytes();

        let mut nonce = [0u8; NONCE_LEN];
        nonce[..TIMESTAMP_LEN].copy_from_slice(&timestamp[8 - TIMESTAMP_LEN..]);
        self.random.fill(&mut nonce[TIMESTAMP_LEN..])?;
        Ok(nonce)
    }

    /// Generate a 16-byte CFB IV from the random source alone.
    pub fn generate_iv(&self) -> Result<[u8; IV_LEN]> {
        let mut iv = [0u8; IV_LEN];
        self.random.fill(&mut iv)?;
        Ok(iv)
    }
}
