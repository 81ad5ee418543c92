// RSA key construction and signing
// Builds (n, e) / (n, d) pairs and the username self-signature

use num_bigint::{BigUint, RandBigInt};
use num_traits::One;
use rand::Rng;

use crate::error::{Error, Result};
use crate::numtheory::{gcd, make_prime, mod_inverse, pow_mod};

/// RSA public key as persisted: modulus, public exponent, the
/// self-signature of the owner's username, and the username itself.
#[derive(Debug, Clone, PartialEq)]
pub struct PublicKey {
    pub n: BigUint,
    pub e: BigUint,
    pub signature: BigUint,
    pub username: String,
}

/// RSA private key. Only `(n, d)` survive key generation; the prime
/// factors are never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct PrivateKey {
    pub n: BigUint,
    pub d: BigUint,
}

/// A freshly generated public/private pair.
#[derive(Debug, Clone)]
pub struct KeyPair {
    pub public: PublicKey,
    pub private: PrivateKey,
}

impl PublicKey {
    /// Re-derive the identity integer from the stored username and
    /// check it against the embedded signature.
    pub fn verify_identity(&self) -> bool {
        let m = username_to_int(&self.username);
        verify(&m, &self.signature, &self.e, &self.n)
    }
}

/// Interpret an identity string as a big-endian integer so it can be
/// signed and verified like any other message.
pub fn username_to_int(username: &str) -> BigUint {
    BigUint::from_bytes_be(username.as_bytes())
}

/// Generate the public components `(p, q, n, e)` of a key pair.
///
/// `nbits` is split unevenly: `p` gets `nbits/4` plus a random offset
/// below `nbits/2`, `q` gets the remainder, so neither factor sits at
/// a predictable width. `e` is drawn `nbits` wide until it is coprime
/// to `φ(n)`.
pub fn make_public<R: Rng + ?Sized>(
    nbits: u64,
    iterations: u64,
    rng: &mut R,
) -> (BigUint, BigUint, BigUint, BigUint) {
    let pbits = nbits / 4 + rng.gen_range(0..nbits / 2);
    let qbits = nbits - pbits;

    let p = make_prime(pbits, iterations, rng);
    let mut q = make_prime(qbits, iterations, rng);
    while q == p {
        q = make_prime(qbits, iterations, rng);
    }

    let n = &p * &q;
    let totient = (&p - 1u8) * (&q - 1u8);

    let e = loop {
        let candidate = rng.gen_biguint(nbits);
        if gcd(&candidate, &totient).is_one() {
            break candidate;
        }
    };

    (p, q, n, e)
}

/// Derive the private exponent `d = e^(-1) mod (p-1)(q-1)`.
pub fn make_private(e: &BigUint, p: &BigUint, q: &BigUint) -> Result<BigUint> {
    let totient = (p - 1u8) * (q - 1u8);
    mod_inverse(e, &totient).ok_or(Error::NoInverse)
}

/// Sign a message: `s = m^d mod n`.
pub fn sign(m: &BigUint, d: &BigUint, n: &BigUint) -> BigUint {
    pow_mod(m, d, n)
}

/// Verify a signature: accepts iff `s^e mod n == m`.
pub fn verify(m: &BigUint, s: &BigUint, e: &BigUint, n: &BigUint) -> bool {
    pow_mod(s, e, n) == *m
}

impl KeyPair {
    /// Generate a complete key pair, signing `username` with the new
    /// private exponent.
    pub fn generate<R: Rng + ?Sized>(
        nbits: u64,
        iterations: u64,
        username: &str,
        rng: &mut R,
    ) -> Result<KeyPair> {
        let (p, q, n, e) = make_public(nbits, iterations, rng);
        let d = make_private(&e, &p, &q)?;
        let signature = sign(&username_to_int(username), &d, &n);

        Ok(KeyPair {
            public: PublicKey {
                n: n.clone(),
                e,
                signature,
                username: username.to_string(),
            },
            private: PrivateKey { n, d },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn test_exponents_are_inverses() {
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let (p, q, _n, e) = make_public(128, 25, &mut rng);
        let d = make_private(&e, &p, &q).unwrap();

        let totient = (&p - 1u8) * (&q - 1u8);
        assert_eq!((&e * &d) % &totient, BigUint::one());
    }

    #[test]
    fn test_distinct_primes() {
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        let (p, q, n, _e) = make_public(128, 25, &mut rng);
        assert_ne!(p, q);
        assert_eq!(n, &p * &q);
    }

    #[test]
    fn test_integer_roundtrip() {
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let (p, q, n, e) = make_public(128, 25, &mut rng);
        let d = make_private(&e, &p, &q).unwrap();

        let m = BigUint::from(0x4869u32); // "Hi"
        let c = pow_mod(&m, &e, &n);
        assert_eq!(pow_mod(&c, &d, &n), m);
    }

    #[test]
    fn test_sign_verify() {
        let mut rng = ChaCha20Rng::seed_from_u64(4);
        let (p, q, n, e) = make_public(128, 25, &mut rng);
        let d = make_private(&e, &p, &q).unwrap();

        let m = BigUint::from(123456789u64);
        let s = sign(&m, &d, &n);
        assert!(verify(&m, &s, &e, &n));

        let tampered = &m + 1u8;
        assert!(!verify(&tampered, &s, &e, &n));
    }

    #[test]
    fn test_keypair_identity() {
        let mut rng = ChaCha20Rng::seed_from_u64(5);
        let pair = KeyPair::generate(192, 25, "alice", &mut rng).unwrap();
        assert!(pair.public.verify_identity());
        assert_eq!(pair.public.n, pair.private.n);

        let mut forged = pair.public.clone();
        forged.username = "mallory".to_string();
        assert!(!forged.verify_identity());
    }

    #[test]
    fn test_deterministic_generation() {
        let mut a = ChaCha20Rng::seed_from_u64(42);
        let mut b = ChaCha20Rng::seed_from_u64(42);
        let pa = KeyPair::generate(256, 50, "alice", &mut a).unwrap();
        let pb = KeyPair::generate(256, 50, "alice", &mut b).unwrap();
        assert_eq!(pa.public, pb.public);
        assert_eq!(pa.private, pb.private);
    }
}
