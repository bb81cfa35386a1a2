//! Unauthenticated encryption using PBKDF2 + AES-256-CFB
//!
//! Envelope: salt(64) + iv(16) + ciphertext. The ciphertext is exactly as
//! long as the plaintext: no tag, no padding.
//!
//! CFB carries no integrity check. Decrypting with the wrong password, or
//! decrypting a corrupted envelope, succeeds and returns bytes of the right
//! length that are garbage. Use GCM when that matters.

use crate::entropy::{Clock, RandomSource};
use crate::envelope::Mode;
use crate::error::Result;
use crate::kdf;
use crate::nonce::NonceGenerator;
use aes::Aes256;
use aes::cipher::generic_array::GenericArray;
use aes::cipher::{AsyncStreamCipher, KeyIvInit};

type Aes256CfbEnc = cfb_mode::Encryptor<Aes256>;
type Aes256CfbDec = cfb_mode::Decryptor<Aes256>;

/// Encrypt plaintext under a fresh salt and IV.
pub fn encrypt(
    plaintext: &[u8],
    password: &[u8],
    random: &dyn RandomSource,
    clock: &dyn Clock,
) -> Result<Vec<u8>> {
    let (key, salt) = kdf::derive_with_fresh_salt(password, random)?;
    let iv = NonceGenerator::new(random, clock).generate_iv()?;

    let layout = Mode::Cfb.layout();
    let mut output = layout.assemble(&salt, &iv, plaintext);
    Aes256CfbEnc::new(
        GenericArray::from_slice(key.as_bytes()),
        GenericArray::from_slice(&iv),
    )
    .encrypt(&mut output[layout.min_len()..]);

    Ok(output)
}

/// Decrypt an envelope produced by [`encrypt`].
///
/// Only the minimum length is checked. Any envelope that passes that check
/// decrypts to *something*; there is no way to tell a wrong password apart
/// from the right one.
pub fn decrypt(envelope: &[u8], password: &[u8]) -> Result<Vec<u8>> {
    let parts = Mode::Cfb.layout().split(envelope)?;
    let key = kdf::derive(password, parts.salt);

    let mut plaintext = parts.body.to_vec();
    Aes256CfbDec::new(
        GenericArray::from_slice(key.as_bytes()),
        GenericArray::from_slice(parts.nonce_or_iv),
    )
    .decrypt(&mut plaintext);

    Ok(plaintext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entropy::fixtures::{BrokenRandom, FixedClock, SequenceRandom};
    use crate::entropy::{OsRandom, SystemClock};
    use crate::error::ErrorKind;
    use crate::kdf::SALT_LEN;
    use crate::nonce::IV_LEN;

    fn seal(plaintext: &[u8], password: &[u8]) -> Vec<u8> {
        encrypt(plaintext, password, &OsRandom, &SystemClock).unwrap()
    }

    #[test]
    fn test_ciphertext_length_equals_plaintext() {
        for len in [0usize, 1, 15, 16, 17, 100] {
            let plaintext = vec![0x5au8; len];
            let envelope = seal(&plaintext, b"pw");
            assert_eq!(envelope.len(), SALT_LEN + IV_LEN + len);
            assert_eq!(decrypt(&envelope, b"pw").unwrap(), plaintext);
        }
    }

    #[test]
    fn test_wrong_password_yields_garbage() {
        let plaintext = b"secret data that is long enough to compare";
        let envelope = seal(plaintext, b"correct");

        let garbage = decrypt(&envelope, b"wrong").unwrap();
        assert_eq!(garbage.len(), plaintext.len());
        assert_ne!(&garbage[..], &plaintext[..]);
    }

    #[test]
    fn test_corruption_is_not_detected() {
        let plaintext = b"0123456789abcdef0123456789abcdef";
        let mut envelope = seal(plaintext, b"pw");
        envelope[SALT_LEN + IV_LEN] ^= 0xff;

        let out = decrypt(&envelope, b"pw").unwrap();
        assert_eq!(out.len(), plaintext.len());
        assert_ne!(&out[..], &plaintext[..]);
    }

    #[test]
    fn test_fields_come_from_random_source() {
        // First fill is the salt, second the IV.
        let random = SequenceRandom::starting_at(0x10);
        let clock = FixedClock(0);
        let envelope = encrypt(b"abc", b"pw", &random, &clock).unwrap();

        assert_eq!(&envelope[..SALT_LEN], &[0x10u8; SALT_LEN][..]);
        assert_eq!(&envelope[SALT_LEN..SALT_LEN + IV_LEN], &[0x11u8; IV_LEN][..]);
        assert_eq!(decrypt(&envelope, b"pw").unwrap(), b"abc");
    }

    #[test]
    fn test_truncated_input() {
        let err = decrypt(&vec![0u8; SALT_LEN + IV_LEN - 1], b"pw").unwrap_err();
        assert_eq!(err.kind, Some(ErrorKind::MalformedEnvelope));
    }

    #[test]
    fn test_random_failure() {
        let err = encrypt(b"data", b"pw", &BrokenRandom, &SystemClock).unwrap_err();
        assert_eq!(err.kind, Some(ErrorKind::RandomSource));
    }
}
