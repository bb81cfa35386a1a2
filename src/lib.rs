//! cifra - Password-based file encryption with AES-256 in GCM or CFB mode
//!
//! The core turns a password and plaintext into a self-describing envelope
//! (`salt || nonce-or-iv || ciphertext`) and back. See [`symmetric`] for the
//! entry points and for the difference in guarantees between the two modes.

#![forbid(unsafe_code)]

pub mod armor;
pub mod cfb;
pub mod entropy;
pub mod envelope;
pub mod error;
pub mod file_ops;
pub mod gcm;
pub mod kdf;
pub mod nonce;
pub mod passphrase;
pub mod symmetric;

pub use envelope::Mode;
pub use symmetric::{Engine, decrypt_cfb, decrypt_gcm, encrypt_cfb, encrypt_gcm};
