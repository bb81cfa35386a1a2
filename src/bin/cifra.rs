//! cifra CLI - Password-based file encryption
//!
//! Encrypts or decrypts a single file with AES-256-GCM (default) or
//! AES-256-CFB, using a key derived from a password with PBKDF2-HMAC-SHA512.

use clap::Parser;
use std::path::PathBuf;
use std::process;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use cifra::Mode;
use cifra::file_ops::{self, FileOptions};
use cifra::passphrase::{PassphraseReader, ReaderPassphraseReader, TerminalPassphraseReader};

#[derive(Parser)]
#[command(name = "cifra")]
#[command(version)]
#[command(about = "Password-based file encryption.")]
#[command(
    long_about = "Password-based file encryption.\n\n\
When the output file name is not given with -o, '.cif' is appended to the \
input file name when encrypting and '.dec' when decrypting. Existing files \
are never overwritten."
)]
struct Cli {
    /// Galois/Counter Mode (default). Detects a wrong password and tampering.
    #[arg(long, conflicts_with = "cfb")]
    gcm: bool,

    /// Cipher feedback mode. A wrong password is NOT detected and produces garbage output.
    #[arg(long)]
    cfb: bool,

    /// Decrypt the input file instead of encrypting it
    #[arg(short, long)]
    dec: bool,

    /// Path to the file to write the result to
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Write (or, with --dec, expect) base64url text instead of raw bytes
    #[arg(long)]
    armor: bool,

    /// Read password from stdin instead of from terminal
    #[arg(long)]
    passphrase_stdin: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Path to the file to encrypt or decrypt
    #[arg(value_name = "FILE")]
    input: PathBuf,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: logging unavailable: {}", e);
    }

    let options = FileOptions {
        mode: if cli.cfb { Mode::Cfb } else { Mode::Gcm },
        armor: cli.armor,
    };
    let output = cli
        .output
        .unwrap_or_else(|| file_ops::default_output_path(&cli.input, cli.dec));
    let mut reader = get_passphrase_reader(cli.passphrase_stdin);

    let result = if cli.dec {
        file_ops::decrypt_file(&cli.input, &output, options, &mut *reader)
    } else {
        file_ops::encrypt_file(&cli.input, &output, options, &mut *reader)
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e.chain_message());
        process::exit(1);
    }
}

fn get_passphrase_reader(use_stdin: bool) -> Box<dyn PassphraseReader> {
    if use_stdin {
        Box::new(ReaderPassphraseReader::new(Box::new(std::io::stdin())))
    } else {
        Box::new(TerminalPassphraseReader::new())
    }
}
