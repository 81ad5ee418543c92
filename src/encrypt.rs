// Block-wise stream encryption
// Frames raw bytes under the modulus with a 0xFF sentinel and writes
// one uppercase-hex ciphertext integer per line

use std::io::{self, Read, Write};

use num_bigint::BigUint;
use num_traits::ToPrimitive;

use crate::error::{Error, Result};
use crate::numtheory::pow_mod;

/// Encrypt one integer block: `c = m^e mod n`.
pub fn encrypt_block(m: &BigUint, e: &BigUint, n: &BigUint) -> BigUint {
    pow_mod(m, e, n)
}

/// Base-2 logarithm of `n` from its exponent/mantissa decomposition.
/// The top 52 bits go through `f64` exactly; the rest contribute only
/// the shift, so this never overflows no matter how wide `n` is.
fn log2(n: &BigUint) -> f64 {
    let bits = n.bits();
    if bits <= 52 {
        return n.to_f64().unwrap_or(0.0).log2();
    }
    let shift = bits - 52;
    let mantissa = (n >> shift).to_f64().unwrap_or(0.0);
    mantissa.log2() + shift as f64
}

/// Block size in bytes under modulus `n`: floor((log2(n) - 1) / 8).
/// One byte is reserved for the sentinel, so each block carries up to
/// `block_size - 1` data bytes and its integer value stays below `n`.
pub fn block_size(n: &BigUint) -> usize {
    ((log2(n) - 1.0) / 8.0) as usize
}

/// Fill `buf` from `reader`, short only at end of input.
fn read_chunk<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(count) => filled += count,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Encrypt a byte stream block by block.
///
/// Each block is `[0xFF, data...]` interpreted as a big-endian
/// integer; the sentinel keeps the value strictly below `n`. The
/// final block may carry fewer data bytes; an empty input produces no
/// output at all.
pub fn encrypt_stream<R, W>(input: &mut R, output: &mut W, n: &BigUint, e: &BigUint) -> Result<()>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let k = block_size(n);
    if k < 2 {
        return Err(Error::ModulusTooSmall);
    }

    let mut block = vec![0u8; k];
    block[0] = 0xFF;

    loop {
        let read = read_chunk(input, &mut block[1..])?;
        if read == 0 {
            break;
        }
        let m = BigUint::from_bytes_be(&block[..read + 1]);
        let c = encrypt_block(&m, e, n);
        writeln!(output, "{:X}", c)?;
        if read != k - 1 {
            break;
        }
    }

    Ok(())
}
