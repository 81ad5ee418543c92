// Persisted key file formats
// Public key: four lines (n, e, s in uppercase hex, then username).
// Private key: two lines (n, d in uppercase hex), created mode 0600.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use num_bigint::BigUint;

use crate::error::{Error, Result};
use crate::keygen::{PrivateKey, PublicKey};

fn next_line(lines: &mut impl Iterator<Item = std::io::Result<String>>, field: &str) -> Result<String> {
    match lines.next() {
        Some(line) => Ok(line?),
        None => Err(Error::MalformedKey(format!("missing {} field", field))),
    }
}

fn parse_hex(line: &str, field: &str) -> Result<BigUint> {
    BigUint::parse_bytes(line.trim().as_bytes(), 16)
        .ok_or_else(|| Error::MalformedKey(format!("{} is not a hexadecimal integer", field)))
}

/// Write a public key file: `n`, `e`, `s` as uppercase hex plus the
/// username, one per line.
pub fn write_public(path: &Path, key: &PublicKey) -> Result<()> {
    let mut file = File::create(path)?;
    writeln!(file, "{:X}", key.n)?;
    writeln!(file, "{:X}", key.e)?;
    writeln!(file, "{:X}", key.signature)?;
    writeln!(file, "{}", key.username)?;
    Ok(())
}

/// Read a public key file written by [`write_public`].
pub fn read_public(path: &Path) -> Result<PublicKey> {
    let mut lines = BufReader::new(File::open(path)?).lines();
    let n = parse_hex(&next_line(&mut lines, "modulus")?, "modulus")?;
    let e = parse_hex(&next_line(&mut lines, "public exponent")?, "public exponent")?;
    let signature = parse_hex(&next_line(&mut lines, "signature")?, "signature")?;
    let username = next_line(&mut lines, "username")?.trim_end().to_string();
    Ok(PublicKey { n, e, signature, username })
}

/// Write a private key file: `n`, `d` as uppercase hex, one per line.
/// The file is created readable and writable by the owner only.
pub fn write_private(path: &Path, key: &PrivateKey) -> Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    writeln!(file, "{:X}", key.n)?;
    writeln!(file, "{:X}", key.d)?;
    Ok(())
}

/// Read a private key file written by [`write_private`].
pub fn read_private(path: &Path) -> Result<PrivateKey> {
    let mut lines = BufReader::new(File::open(path)?).lines();
    let n = parse_hex(&next_line(&mut lines, "modulus")?, "modulus")?;
    let d = parse_hex(&next_line(&mut lines, "private exponent")?, "private exponent")?;
    Ok(PrivateKey { n, d })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keygen::KeyPair;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn test_pair() -> KeyPair {
        let mut rng = ChaCha20Rng::seed_from_u64(42);
        KeyPair::generate(256, 50, "alice", &mut rng).unwrap()
    }

    #[test]
    fn test_public_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rsa.pub");
        let pair = test_pair();

        write_public(&path, &pair.public).unwrap();
        let loaded = read_public(&path).unwrap();
        assert_eq!(loaded, pair.public);
    }

    #[test]
    fn test_private_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rsa.priv");
        let pair = test_pair();

        write_private(&path, &pair.private).unwrap();
        let loaded = read_private(&path).unwrap();
        assert_eq!(loaded, pair.private);
    }

    #[test]
    fn test_file_shapes() {
        let dir = tempfile::tempdir().unwrap();
        let pub_path = dir.path().join("rsa.pub");
        let priv_path = dir.path().join("rsa.priv");
        let pair = test_pair();

        write_public(&pub_path, &pair.public).unwrap();
        write_private(&priv_path, &pair.private).unwrap();

        let pub_text = std::fs::read_to_string(&pub_path).unwrap();
        let pub_lines: Vec<&str> = pub_text.lines().collect();
        assert_eq!(pub_lines.len(), 4);
        for line in &pub_lines[..3] {
            assert!(line.chars().all(|c| c.is_ascii_hexdigit()));
            assert_eq!(*line, line.to_uppercase());
        }
        assert_eq!(pub_lines[3], "alice");

        let priv_text = std::fs::read_to_string(&priv_path).unwrap();
        let priv_lines: Vec<&str> = priv_text.lines().collect();
        assert_eq!(priv_lines.len(), 2);
        for line in &priv_lines {
            assert!(line.chars().all(|c| c.is_ascii_hexdigit()));
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_private_file_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rsa.priv");
        write_private(&path, &test_pair().private).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_truncated_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rsa.priv");
        std::fs::write(&path, "ABCDEF\n").unwrap();

        assert!(matches!(read_private(&path), Err(Error::MalformedKey(_))));
    }

    #[test]
    fn test_non_hex_field_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rsa.priv");
        std::fs::write(&path, "ABCDEF\nzzzz\n").unwrap();

        assert!(matches!(read_private(&path), Err(Error::MalformedKey(_))));
    }
}
