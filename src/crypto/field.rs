//! Prime Field Arithmetic
//!
//! Big-integer helpers for working in Z/pZ:
//!
//! - canonical reduction into `[0, p)`
//! - modular inverse via the extended Euclidean algorithm
//! - Miller-Rabin probable-prime test and next-prime search
//!
//! Nothing here holds state; every function is a pure function of its inputs.

use num_bigint::{BigInt, BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use sha2::{Digest, Sha256};

const SMALL_PRIMES: [u32; 25] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
];

/// The first 12 primes as bases make Miller-Rabin exact below 3.3 * 10^24.
const FIXED_WITNESSES: usize = 12;

/// Extra bases for larger candidates, derived from the candidate itself.
const DERIVED_WITNESSES: usize = 8;

// ============================================================================
// Reduction and Inversion
// ============================================================================

/// Reduce `value` into the canonical range `[0, modulus)`.
///
/// Uses floored division, so negative inputs land on their non-negative residue.
pub fn reduce(value: &BigInt, modulus: &BigInt) -> BigInt {
    value.mod_floor(modulus)
}

/// Compute `d` with `value * d ≡ 1 (mod modulus)`.
///
/// Returns `None` when `gcd(value, modulus) != 1`, which includes `value ≡ 0`.
/// `modulus` must be at least 2.
pub fn mod_inverse(value: &BigInt, modulus: &BigInt) -> Option<BigInt> {
    let a = reduce(value, modulus);
    if a.is_zero() {
        return None;
    }

    let egcd = a.extended_gcd(modulus);
    if !egcd.gcd.is_one() {
        return None;
    }

    Some(reduce(&egcd.x, modulus))
}

// ============================================================================
// Primality
// ============================================================================

/// Miller-Rabin probable-prime test.
///
/// Trial division by the primes below 100, then the first twelve prime bases,
/// then a few bases drawn from a ChaCha20 stream seeded with SHA-256 of `n`.
/// The result is a deterministic function of `n`.
pub fn is_probable_prime(n: &BigInt) -> bool {
    let n = match n.to_biguint() {
        Some(n) => n,
        None => return false,
    };
    if n < BigUint::from(2u32) {
        return false;
    }

    for &p in SMALL_PRIMES.iter() {
        let p = BigUint::from(p);
        if n == p {
            return true;
        }
        if (&n % &p).is_zero() {
            return false;
        }
    }

    // n is odd and greater than 97 from here on
    let n_minus_one = &n - BigUint::one();
    let s = n_minus_one.trailing_zeros().unwrap_or(0);
    let d = &n_minus_one >> s;

    let mut rng = witness_rng(&n);
    let two = BigUint::from(2u32);

    let fixed = SMALL_PRIMES[..FIXED_WITNESSES]
        .iter()
        .map(|&a| BigUint::from(a));
    let derived = (0..DERIVED_WITNESSES).map(|_| rng.gen_biguint_range(&two, &n_minus_one));

    fixed
        .chain(derived)
        .all(|a| survives_round(&n, &n_minus_one, &d, s, &a))
}

/// Smallest probable prime strictly greater than `n` (2 for any `n < 2`).
pub fn next_probable_prime(n: &BigInt) -> BigInt {
    let two = BigInt::from(2u32);
    if n < &two {
        return two;
    }

    let mut candidate = n + 1u32;
    if candidate.is_even() {
        candidate += 1u32;
    }
    while !is_probable_prime(&candidate) {
        candidate += 2u32;
    }
    candidate
}

/// One Miller-Rabin round with base `a`, where `n - 1 = d * 2^s`.
fn survives_round(n: &BigUint, n_minus_one: &BigUint, d: &BigUint, s: u64, a: &BigUint) -> bool {
    let mut x = a.modpow(d, n);
    if x.is_one() || &x == n_minus_one {
        return true;
    }

    for _ in 1..s {
        x = (&x * &x) % n;
        if &x == n_minus_one {
            return true;
        }
        if x.is_one() {
            return false;
        }
    }

    false
}

fn witness_rng(n: &BigUint) -> ChaCha20Rng {
    let seed: [u8; 32] = Sha256::digest(n.to_bytes_be()).into();
    ChaCha20Rng::from_seed(seed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(n: i64) -> BigInt {
        BigInt::from(n)
    }

    #[test]
    fn test_reduce_negative() {
        assert_eq!(reduce(&big(-1), &big(5)), big(4));
        assert_eq!(reduce(&big(-10), &big(5)), big(0));
        assert_eq!(reduce(&big(23), &big(5)), big(3));
    }

    #[test]
    fn test_mod_inverse() {
        // 3 * 5 = 15 ≡ 1 (mod 7)
        assert_eq!(mod_inverse(&big(3), &big(7)), Some(big(5)));
        // -1 ≡ 16 (mod 17), and 16 * 16 = 256 ≡ 1
        assert_eq!(mod_inverse(&big(-1), &big(17)), Some(big(16)));

        for a in 1..17 {
            let inv = mod_inverse(&big(a), &big(17)).unwrap();
            assert_eq!(reduce(&(big(a) * inv), &big(17)), big(1));
        }
    }

    #[test]
    fn test_mod_inverse_missing() {
        assert_eq!(mod_inverse(&big(0), &big(7)), None);
        assert_eq!(mod_inverse(&big(14), &big(7)), None);
        // gcd(6, 9) = 3
        assert_eq!(mod_inverse(&big(6), &big(9)), None);
    }

    #[test]
    fn test_small_primes() {
        let primes: Vec<i64> = (0..120).filter(|&n| is_probable_prime(&big(n))).collect();
        assert_eq!(
            primes,
            vec![
                2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79,
                83, 89, 97, 101, 103, 107, 109, 113
            ]
        );
        assert!(!is_probable_prime(&big(-7)));
    }

    #[test]
    fn test_carmichael_numbers_rejected() {
        for n in [561, 1105, 1729, 2465, 2821, 6601, 8911] {
            assert!(!is_probable_prime(&big(n)), "{} is a Carmichael number", n);
        }
    }

    #[test]
    fn test_mersenne_primes() {
        let m61 = (BigInt::one() << 61u32) - 1u32;
        let m127 = (BigInt::one() << 127u32) - 1u32;
        assert!(is_probable_prime(&m61));
        assert!(is_probable_prime(&m127));

        let m31 = (BigInt::one() << 31u32) - 1u32;
        assert!(!is_probable_prime(&(&m61 * &m31)));
        assert!(!is_probable_prime(&(m127 + 2u32)));
    }

    #[test]
    fn test_next_probable_prime() {
        assert_eq!(next_probable_prime(&big(-5)), big(2));
        assert_eq!(next_probable_prime(&big(0)), big(2));
        assert_eq!(next_probable_prime(&big(2)), big(3));
        assert_eq!(next_probable_prime(&big(12)), big(13));
        assert_eq!(next_probable_prime(&big(13)), big(17));
        assert_eq!(next_probable_prime(&big(16)), big(17));
        assert_eq!(next_probable_prime(&big(89)), big(97));
    }

    #[test]
    fn test_next_probable_prime_is_deterministic() {
        let n: BigInt = "123456789012345678901234567890".parse().unwrap();
        let p1 = next_probable_prime(&n);
        let p2 = next_probable_prime(&n);
        assert_eq!(p1, p2);
        assert!(p1 > n);
    }
}
