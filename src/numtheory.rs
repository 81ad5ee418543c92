// Number-theoretic primitives for RSA
// Modular exponentiation, Miller-Rabin, prime generation, GCD, modular inverse

use num_bigint::{BigInt, BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::{One, Signed, Zero};
use rand::Rng;

/// Modular exponentiation: base^exponent mod modulus.
/// Right-to-left square-and-multiply: the exponent is consumed one bit
/// at a time from the least-significant end.
pub fn pow_mod(base: &BigUint, exponent: &BigUint, modulus: &BigUint) -> BigUint {
    if modulus.is_one() {
        return BigUint::zero();
    }

    let mut result = BigUint::one();
    let mut power = base % modulus;
    let mut exp = exponent.clone();

    while !exp.is_zero() {
        if exp.is_odd() {
            result = (&result * &power) % modulus;
        }
        power = (&power * &power) % modulus;
        exp >>= 1;
    }

    result
}

/// Miller-Rabin primality test.
/// Returns true if `n` is probably prime; the false-positive rate is
/// bounded by 4^(-iterations). Witnesses are drawn uniformly from
/// [2, n-2] using the supplied generator.
pub fn is_prime<R: Rng + ?Sized>(n: &BigUint, iterations: u64, rng: &mut R) -> bool {
    let two = BigUint::from(2u8);
    let three = BigUint::from(3u8);
    if n.is_zero() || n.is_one() {
        return false;
    }
    if *n == two || *n == three {
        return true;
    }
    if n.is_even() {
        return false;
    }

    // Write n-1 = 2^s * r with r odd
    let n_minus_1 = n - 1u8;
    let mut r = n_minus_1.clone();
    let mut s = 0u64;
    while r.is_even() {
        r >>= 1;
        s += 1;
    }

    for _ in 0..iterations {
        let a = rng.gen_biguint_range(&two, &n_minus_1); // [2, n-2]
        let mut y = pow_mod(&a, &r, n);

        if y.is_one() || y == n_minus_1 {
            continue;
        }

        // Square up to s-1 times looking for n-1
        let mut witness = true;
        for _ in 1..s {
            y = pow_mod(&y, &two, n);
            if y.is_one() {
                // Nontrivial square root of 1: composite
                return false;
            }
            if y == n_minus_1 {
                witness = false;
                break;
            }
        }
        if witness {
            return false;
        }
    }

    true
}

/// Generate a probable prime with at least `bits` significant bits.
/// Draws `bits` random bits and adds 2^bits to force the magnitude,
/// retrying until the candidate passes Miller-Rabin. The retry loop is
/// unbounded; by prime density it terminates after a small expected
/// number of attempts.
pub fn make_prime<R: Rng + ?Sized>(bits: u64, iterations: u64, rng: &mut R) -> BigUint {
    let floor = BigUint::one() << bits;
    loop {
        let candidate = rng.gen_biguint(bits) + &floor;
        if is_prime(&candidate, iterations, rng) {
            return candidate;
        }
    }
}

/// Greatest common divisor, iterative Euclidean algorithm.
pub fn gcd(a: &BigUint, b: &BigUint) -> BigUint {
    let mut a = a.clone();
    let mut b = b.clone();
    while !b.is_zero() {
        let r = &a % &b;
        a = b;
        b = r;
    }
    a
}

/// Modular inverse of `a` modulo `n` via the extended Euclidean
/// algorithm, tracking only the Bézout coefficient of `a`.
/// Returns `None` when `gcd(a, n) != 1`; otherwise the result lies in
/// `[0, n)` and satisfies `a * i ≡ 1 (mod n)`.
pub fn mod_inverse(a: &BigUint, n: &BigUint) -> Option<BigUint> {
    // Coefficients go negative mid-iteration, so work in BigInt
    let n_signed = BigInt::from(n.clone());
    let mut r1 = n_signed.clone();
    let mut r2 = BigInt::from(a.clone());
    let mut t1 = BigInt::zero();
    let mut t2 = BigInt::one();

    while !r2.is_zero() {
        let q = &r1 / &r2;
        let r = &r1 - &q * &r2;
        r1 = r2;
        r2 = r;
        let t = &t1 - &q * &t2;
        t1 = t2;
        t2 = t;
    }

    if r1 > BigInt::one() {
        return None;
    }
    if t1.is_negative() {
        t1 += n_signed;
    }
    t1.to_biguint()
}
