//! Injectable sources of randomness and time
//!
//! Key derivation and nonce generation never reach for global state directly.
//! They take a [`RandomSource`] and a [`Clock`], which default to the
//! operating system's CSPRNG and wall clock. Tests substitute fixed
//! implementations to pin down exact envelope bytes.

use crate::error::{CifraError, ErrorCategory, ErrorKind, Result};
use rand::RngCore;
use rand::rngs::OsRng;
use std::time::{SystemTime, UNIX_EPOCH};

/// A source of cryptographically secure random bytes.
pub trait RandomSource: Send + Sync {
    /// Fill `buf` entirely with random bytes.
    ///
    /// Failure means the execution environment is unusable. Callers must
    /// surface it and never retry.
    fn fill(&self, buf: &mut [u8]) -> Result<()>;
}

/// A wall clock with nanosecond resolution.
pub trait Clock: Send + Sync {
    /// Nanoseconds since the Unix epoch.
    fn now_nanos(&self) -> u64;
}

/// The operating system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn fill(&self, buf: &mut [u8]) -> Result<()> {
        OsRng.try_fill_bytes(buf).map_err(|e| {
            CifraError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::RandomSource,
                "system random source unavailable",
                e,
            )
        })
    }
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_nanos(&self) -> u64 {
        // A clock set before 1970 yields 0; the random half of the nonce
        // still varies.
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use std::sync::atomic::{AtomicU8, Ordering};

    /// Fills every buffer with the same byte.
    pub struct FixedRandom(pub u8);

    impl RandomSource for FixedRandom {
        fn fill(&self, buf: &mut [u8]) -> Result<()> {
            buf.fill(self.0);
            Ok(())
        }
    }

    /// Fills each successive buffer with the next byte value, starting at
    /// the given seed.
    pub struct SequenceRandom(pub AtomicU8);

    impl SequenceRandom {
        pub fn starting_at(seed: u8) -> Self {
            Self(AtomicU8::new(seed))
        }
    }

    impl RandomSource for SequenceRandom {
        fn fill(&self, buf: &mut [u8]) -> Result<()> {
            buf.fill(self.0.fetch_add(1, Ordering::Relaxed));
            Ok(())
        }
    }

    /// Always fails, as an exhausted entropy pool would.
    pub struct BrokenRandom;

    impl RandomSource for BrokenRandom {
        fn fill(&self, _buf: &mut [u8]) -> Result<()> {
            Err(CifraError::with_kind(
                ErrorCategory::Internal,
                ErrorKind::RandomSource,
                "simulated entropy failure",
            ))
        }
    }

    pub struct FixedClock(pub u64);

    impl Clock for FixedClock {
        fn now_nanos(&self) -> u64 {
            self.0
        }
    }
}
