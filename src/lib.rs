// rsakit - RSA key generation, block-wise file encryption/decryption
// and signing built on arbitrary-precision integer arithmetic

pub mod decrypt;
pub mod encrypt;
pub mod error;
pub mod keyfile;
pub mod keygen;
pub mod numtheory;

pub use decrypt::{decrypt_block, decrypt_stream};
pub use encrypt::{block_size, encrypt_block, encrypt_stream};
pub use error::{Error, Result};
pub use keygen::{sign, verify, KeyPair, PrivateKey, PublicKey};
