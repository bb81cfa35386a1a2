//! File encryption/decryption operations
//!
//! Reads the whole input file, runs it through the engine and writes the
//! result to a new output file. Existing files are never overwritten.

use crate::armor;
use crate::envelope::Mode;
use crate::error::{CifraError, ErrorCategory, ErrorKind, Result};
use crate::passphrase::PassphraseReader;
use crate::symmetric::Engine;
use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Suffix appended to the input name when encrypting without `-o`
pub const ENCRYPTED_SUFFIX: &str = ".cif";

/// Suffix appended to the input name when decrypting without `-o`
pub const DECRYPTED_SUFFIX: &str = ".dec";

/// Output options shared by encryption and decryption.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileOptions {
    pub mode: Mode,
    /// Write (encrypt) or expect (decrypt) armored text instead of raw bytes.
    pub armor: bool,
}

/// The output path used when none is given: the input path with
/// [`ENCRYPTED_SUFFIX`] or [`DECRYPTED_SUFFIX`] appended.
pub fn default_output_path(input_path: &Path, decrypt: bool) -> PathBuf {
    let mut name = OsString::from(input_path.as_os_str());
    name.push(if decrypt {
        DECRYPTED_SUFFIX
    } else {
        ENCRYPTED_SUFFIX
    });
    PathBuf::from(name)
}

/// Encrypt a file with a password
///
/// The output file is created with mode 0o600 (read/write for owner only) on
/// Unix systems.
pub fn encrypt_file(
    input_path: &Path,
    output_path: &Path,
    options: FileOptions,
    passphrase_reader: &mut dyn PassphraseReader,
) -> Result<()> {
    let plaintext = fs::read(input_path).map_err(|e| read_error(input_path, e))?;
    ensure_absent(output_path)?;
    let passphrase = passphrase_reader.read_passphrase()?;

    debug!(
        mode = %options.mode,
        input = %input_path.display(),
        bytes = plaintext.len(),
        "encrypting"
    );
    let envelope = Engine::new()
        .encrypt(options.mode, &plaintext, &passphrase)
        .map_err(|e| e.with_context("encryption failed"))?;

    let contents = if options.armor {
        armor::wrap(&envelope).into_bytes()
    } else {
        envelope
    };
    write_file_secure(output_path, &contents)
        .map_err(|e| e.with_context(format!("failed to write to {}", output_path.display())))?;

    debug!(output = %output_path.display(), bytes = contents.len(), "wrote envelope");
    Ok(())
}

/// Decrypt a file with a password
///
/// In CFB mode a wrong password is not detected: the output file is written
/// and contains garbage.
pub fn decrypt_file(
    input_path: &Path,
    output_path: &Path,
    options: FileOptions,
    passphrase_reader: &mut dyn PassphraseReader,
) -> Result<()> {
    let raw = fs::read(input_path).map_err(|e| read_error(input_path, e))?;
    ensure_absent(output_path)?;

    let envelope = if options.armor {
        let armored = String::from_utf8(raw).map_err(|e| {
            CifraError::with_kind_and_source(
                ErrorCategory::User,
                ErrorKind::ArmoringInvalid,
                "armored input file is not valid UTF-8",
                e,
            )
        })?;
        armor::unwrap(&armored).map_err(|e| e.with_context("failed to unarmor"))?
    } else {
        raw
    };

    let passphrase = passphrase_reader.read_passphrase()?;

    debug!(
        mode = %options.mode,
        input = %input_path.display(),
        bytes = envelope.len(),
        "decrypting"
    );
    let plaintext = Engine::new()
        .decrypt(options.mode, &envelope, &passphrase)
        .map_err(|e| e.with_context("failed to decrypt"))?;

    write_file_secure(output_path, &plaintext)
        .map_err(|e| e.with_context(format!("failed to write to {}", output_path.display())))?;

    debug!(output = %output_path.display(), bytes = plaintext.len(), "wrote plaintext");
    Ok(())
}

fn ensure_absent(path: &Path) -> Result<()> {
    if path.exists() {
        return Err(output_exists(path));
    }
    Ok(())
}

fn output_exists(path: &Path) -> CifraError {
    CifraError::with_kind(
        ErrorCategory::User,
        ErrorKind::OutputExists,
        format!("file \"{}\" already exists", path.display()),
    )
}

/// Write a new file with secure permissions (0o600 on Unix).
///
/// The contents go to a temporary file in the target directory, which is
/// then synced and renamed into place without replacing an existing file.
fn write_file_secure(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    // NamedTempFile is created with mode 0o600 on Unix.
    let mut temp_file = tempfile::NamedTempFile::new_in(dir).map_err(|e| {
        CifraError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            "failed to create tempfile",
            e,
        )
    })?;

    temp_file.write_all(contents).map_err(|e| {
        CifraError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            "failed to write to tempfile",
            e,
        )
    })?;
    temp_file.as_file().sync_all().map_err(|e| {
        CifraError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            "failed to sync file prior to rename",
            e,
        )
    })?;

    temp_file.persist_noclobber(path).map_err(|e| {
        if e.error.kind() == io::ErrorKind::AlreadyExists {
            output_exists(path)
        } else {
            CifraError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::Io,
                format!("failed to rename to target file {}", path.display()),
                e,
            )
        }
    })?;
    Ok(())
}

fn read_error(path: &Path, err: io::Error) -> CifraError {
    let category = if err.kind() == io::ErrorKind::NotFound {
        ErrorCategory::User
    } else {
        ErrorCategory::Internal
    };
    CifraError::with_kind_and_source(
        category,
        ErrorKind::Io,
        format!("failed to read from {}", path.display()),
        err,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passphrase::ConstantPassphraseReader;
    use std::fs;
    use tempfile::TempDir;

    #[cfg(unix)]
    use std::os::unix::fs::PermissionsExt;

    fn options(mode: Mode, armor: bool) -> FileOptions {
        FileOptions { mode, armor }
    }

    fn reader(password: &[u8]) -> ConstantPassphraseReader {
        ConstantPassphraseReader::new(password.to_vec())
    }

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("dir/notes.txt"), false),
            PathBuf::from("dir/notes.txt.cif")
        );
        assert_eq!(
            default_output_path(Path::new("notes.txt.cif"), true),
            PathBuf::from("notes.txt.cif.dec")
        );
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let plain_path = temp_dir.path().join("plain.txt");
        let plaintext = b"Hello, cifra!";
        fs::write(&plain_path, plaintext).unwrap();

        for (mode, armor) in [(Mode::Gcm, false), (Mode::Cfb, true)] {
            let crypt_path = temp_dir.path().join(format!("crypt-{}-{}", mode, armor));
            let decrypted_path = temp_dir.path().join(format!("dec-{}-{}", mode, armor));
            let opts = options(mode, armor);

            encrypt_file(&plain_path, &crypt_path, opts, &mut reader(b"pw")).unwrap();
            decrypt_file(&crypt_path, &decrypted_path, opts, &mut reader(b"pw")).unwrap();

            assert_eq!(fs::read(&decrypted_path).unwrap(), plaintext);
        }
    }

    #[test]
    fn test_armored_output_is_text() {
        let temp_dir = TempDir::new().unwrap();
        let plain_path = temp_dir.path().join("plain.txt");
        let crypt_path = temp_dir.path().join("plain.txt.cif");
        fs::write(&plain_path, b"abc").unwrap();

        encrypt_file(&plain_path, &crypt_path, options(Mode::Gcm, true), &mut reader(b"pw"))
            .unwrap();

        let armored = fs::read_to_string(&crypt_path).unwrap();
        assert!(armored.starts_with("cifra1:"));
    }

    #[test]
    fn test_refuses_to_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let plain_path = temp_dir.path().join("plain.txt");
        let crypt_path = temp_dir.path().join("plain.txt.cif");
        fs::write(&plain_path, b"new").unwrap();
        fs::write(&crypt_path, b"existing").unwrap();

        let err = encrypt_file(&plain_path, &crypt_path, FileOptions::default(), &mut reader(b"pw"))
            .unwrap_err();
        assert_eq!(err.kind, Some(ErrorKind::OutputExists));
        assert_eq!(fs::read(&crypt_path).unwrap(), b"existing");
    }

    #[test]
    fn test_missing_input() {
        let temp_dir = TempDir::new().unwrap();
        let err = encrypt_file(
            &temp_dir.path().join("absent"),
            &temp_dir.path().join("out"),
            FileOptions::default(),
            &mut reader(b"pw"),
        )
        .unwrap_err();

        assert_eq!(err.kind, Some(ErrorKind::Io));
        assert_eq!(err.category, ErrorCategory::User);
    }

    #[test]
    fn test_decrypt_wrong_password_gcm() {
        let temp_dir = TempDir::new().unwrap();
        let plain_path = temp_dir.path().join("plain.txt");
        let crypt_path = temp_dir.path().join("plain.txt.cif");
        let decrypted_path = temp_dir.path().join("plain.txt.cif.dec");
        fs::write(&plain_path, b"secret").unwrap();

        let opts = FileOptions::default();
        encrypt_file(&plain_path, &crypt_path, opts, &mut reader(b"correct")).unwrap();
        let err = decrypt_file(&crypt_path, &decrypted_path, opts, &mut reader(b"wrong"))
            .unwrap_err();

        assert_eq!(err.kind, Some(ErrorKind::AuthenticationFailed));
        assert!(!decrypted_path.exists());
    }

    #[test]
    fn test_decrypt_truncated_file() {
        let temp_dir = TempDir::new().unwrap();
        let crypt_path = temp_dir.path().join("short.cif");
        fs::write(&crypt_path, [0u8; 10]).unwrap();

        let err = decrypt_file(
            &crypt_path,
            &temp_dir.path().join("short.dec"),
            options(Mode::Cfb, false),
            &mut reader(b"pw"),
        )
        .unwrap_err();
        assert_eq!(err.kind, Some(ErrorKind::MalformedEnvelope));
    }

    #[test]
    fn test_empty_file() {
        let temp_dir = TempDir::new().unwrap();
        let plain_path = temp_dir.path().join("empty.txt");
        let crypt_path = temp_dir.path().join("empty.txt.cif");
        let decrypted_path = temp_dir.path().join("empty.txt.cif.dec");
        fs::write(&plain_path, b"").unwrap();

        let opts = FileOptions::default();
        encrypt_file(&plain_path, &crypt_path, opts, &mut reader(b"test")).unwrap();
        decrypt_file(&crypt_path, &decrypted_path, opts, &mut reader(b"test")).unwrap();

        assert_eq!(fs::read(&decrypted_path).unwrap(), b"");
    }

    #[test]
    #[cfg(unix)]
    fn test_file_permissions() {
        let temp_dir = TempDir::new().unwrap();
        let plain_path = temp_dir.path().join("plain.txt");
        let crypt_path = temp_dir.path().join("plain.txt.cif");
        fs::write(&plain_path, b"test").unwrap();

        encrypt_file(&plain_path, &crypt_path, FileOptions::default(), &mut reader(b"test"))
            .unwrap();

        let permissions = fs::metadata(&crypt_path).unwrap().permissions();
        assert_eq!(permissions.mode() & 0o777, 0o600);
    }
}
