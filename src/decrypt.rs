// Block-wise stream decryption
// Reads one uppercase-hex ciphertext integer per line and strips the
// sentinel byte from each recovered block

use std::io::{BufRead, Write};

use num_bigint::BigUint;

use crate::error::{Error, Result};
use crate::numtheory::pow_mod;

/// Decrypt one integer block: `m = c^d mod n`.
pub fn decrypt_block(c: &BigUint, d: &BigUint, n: &BigUint) -> BigUint {
    pow_mod(c, d, n)
}

/// Decrypt a stream of hex ciphertext lines.
///
/// Each recovered integer is exported to its minimal big-endian byte
/// form and everything after the first (sentinel) byte is written
/// out. The export is minimal, so a short final block yields exactly
/// its own data bytes, never zero padding. Final block length is not
/// validated.
pub fn decrypt_stream<R, W>(input: &mut R, output: &mut W, n: &BigUint, d: &BigUint) -> Result<()>
where
    R: BufRead + ?Sized,
    W: Write + ?Sized,
{
    for line in input.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let c = BigUint::parse_bytes(line.as_bytes(), 16).ok_or(Error::MalformedCiphertext)?;
        let m = decrypt_block(&c, d, n);
        let bytes = m.to_bytes_be();
        output.write_all(&bytes[1..])?;
    }
    Ok(())
}
