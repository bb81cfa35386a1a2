//! Optional text armor for envelopes
//!
//! Wraps the binary envelope in base64url with a version marker so it can be
//! pasted into email, chat or a shell. The armored form:
//! - contains no whitespace
//! - is safe to embed in URLs
//! - is safe to pass unescaped in a POSIX shell

use crate::error::{CifraError, ErrorCategory, ErrorKind, Result};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};

/// Magic prefix for all armor versions
const MAGIC_PREFIX: &str = "cifra";

/// Version 1 magic marker
const V1_MAGIC: &str = "cifra1:";

/// Wrap bytes in armor.
///
/// Format: cifra1:{base64url-no-padding}
pub fn wrap(body: &[u8]) -> String {
    format!("{}{}", V1_MAGIC, URL_SAFE_NO_PAD.encode(body))
}

/// Unwrap an armored string, returning the original bytes.
///
/// Trailing whitespace, such as the newline an editor appends, is ignored.
pub fn unwrap(armored: &str) -> Result<Vec<u8>> {
    let armored = armored.trim_end();

    if armored.len() < V1_MAGIC.len() {
        return Err(CifraError::with_kind(
            ErrorCategory::User,
            ErrorKind::ArmoringInvalid,
            "input size smaller than magic marker; likely truncated",
        ));
    }

    if let Some(encoded) = armored.strip_prefix(V1_MAGIC) {
        URL_SAFE_NO_PAD.decode(encoded).map_err(|e| {
            CifraError::with_kind_and_source(
                ErrorCategory::User,
                ErrorKind::ArmoringDecode,
                format!("base64 decoding failed: {}", e),
                e,
            )
        })
    } else if armored.starts_with(MAGIC_PREFIX) {
        Err(CifraError::with_kind(
            ErrorCategory::User,
            ErrorKind::ArmoringFromFuture,
            "input claims to be cifra armor, but not a version we support",
        ))
    } else {
        Err(CifraError::with_kind(
            ErrorCategory::User,
            ErrorKind::ArmoringInvalid,
            "input unrecognized as cifra armor",
        ))
    }
}
