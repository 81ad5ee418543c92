// Error types shared across the crate

use std::io;

/// Errors raised by key-file handling and stream encryption/decryption.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("malformed key file: {0}")]
    MalformedKey(String),

    #[error("ciphertext line is not a valid hexadecimal integer")]
    MalformedCiphertext,

    #[error("no modular inverse exists (exponent not coprime to totient)")]
    NoInverse,

    #[error("modulus too small to frame even a single data byte")]
    ModulusTooSmall,
}

/// Result type for crate operations
pub type Result<T> = std::result::Result<T, Error>;
