//! Integration tests for secret reconstruction

use num_bigint::{BigInt, RandBigInt};
use num_traits::{One, Zero};
use shamir_recover::crypto::field::reduce;
use shamir_recover::{
    reconstruct, reconstruct_rational, recover, Field, FieldMode, ReconstructionError, Share,
    ShareSet,
};

/// 2^127 - 1
fn mersenne_127() -> BigInt {
    (BigInt::one() << 127u32) - 1u32
}

/// Evaluate Σ coeffs[i]·x^i, reduced mod `modulus` when given (Horner's rule).
fn evaluate(coeffs: &[BigInt], x: &BigInt, modulus: Option<&BigInt>) -> BigInt {
    coeffs.iter().rev().fold(BigInt::zero(), |acc, c| {
        let next = acc * x + c;
        match modulus {
            Some(p) => reduce(&next, p),
            None => next,
        }
    })
}

fn shares_of(coeffs: &[BigInt], xs: &[i64], modulus: Option<&BigInt>) -> Vec<Share> {
    xs.iter()
        .map(|&x| {
            let x = BigInt::from(x);
            let y = evaluate(coeffs, &x, modulus);
            Share { x, y }
        })
        .collect()
}

/// All k-element index subsets of 0..n, in lexicographic order
fn subsets(n: usize, k: usize) -> Vec<Vec<usize>> {
    if k == 0 {
        return vec![Vec::new()];
    }
    if n < k {
        return Vec::new();
    }
    let mut with_last = subsets(n - 1, k - 1);
    for s in with_last.iter_mut() {
        s.push(n - 1);
    }
    let mut result = subsets(n - 1, k);
    result.extend(with_last);
    result
}

/// f(x) = x² + 2x + 1 over GF(17)
#[test]
fn test_quadratic_mod_17() {
    let set = ShareSet::from_pairs([(1, 4), (2, 9), (3, 16)], 3);

    assert_eq!(
        reconstruct(&set, Some(BigInt::from(17))).unwrap(),
        BigInt::from(1)
    );

    // The derived prime is also 17 (smallest prime above 16)
    let r = recover(&set, FieldMode::Derived).unwrap();
    assert_eq!(r.field, Field::Prime(BigInt::from(17)));
    assert_eq!(r.secret, BigInt::from(1));

    assert_eq!(reconstruct_rational(&set).unwrap(), BigInt::from(1));
}

/// Any k-subset of a consistent share set yields the same secret
#[test]
fn test_threshold_invariance_prime_field() {
    let mut rng = rand::thread_rng();
    let p = mersenne_127();
    let k = 4;

    let coeffs: Vec<BigInt> = (0..k)
        .map(|_| rng.gen_bigint_range(&BigInt::zero(), &p))
        .collect();
    let secret = coeffs[0].clone();
    let all = shares_of(&coeffs, &[1, 2, 3, 5, 8, 13, 21], Some(&p));

    for subset in subsets(all.len(), k) {
        let chosen: Vec<Share> = subset.iter().map(|&i| all[i].clone()).collect();
        let set = ShareSet::new(chosen, k);
        assert_eq!(
            reconstruct(&set, Some(p.clone())).unwrap(),
            secret,
            "subset {:?} reconstructed a different secret",
            subset
        );
    }
}

/// Integer polynomial, exact arithmetic: every subset recovers the signed secret
#[test]
fn test_threshold_invariance_rational() {
    let secret: BigInt = "-98765432109876543210987654321".parse().unwrap();
    let coeffs = vec![secret.clone(), BigInt::from(17), BigInt::from(-4), BigInt::from(9)];
    let all = shares_of(&coeffs, &[-3, 1, 2, 4, 10], None);

    for subset in subsets(all.len(), 4) {
        let chosen: Vec<Share> = subset.iter().map(|&i| all[i].clone()).collect();
        let set = ShareSet::new(chosen, 4);
        assert_eq!(reconstruct_rational(&set).unwrap(), secret);
    }
}

/// Only the first k shares are used; a corrupt share after them is ignored
#[test]
fn test_uses_first_k_shares_only() {
    let p = BigInt::from(101);
    let coeffs = vec![BigInt::from(42), BigInt::from(7), BigInt::from(3)];
    let mut shares = shares_of(&coeffs, &[1, 2, 3], Some(&p));
    shares.push(Share::new(4, 0)); // not on the polynomial

    let set = ShareSet::new(shares.clone(), 3);
    assert_eq!(reconstruct(&set, Some(p.clone())).unwrap(), BigInt::from(42));

    // Moving the bad share into the first k changes the result
    shares.swap(0, 3);
    let set = ShareSet::new(shares, 3);
    assert_ne!(reconstruct(&set, Some(p)).unwrap(), BigInt::from(42));
}

#[test]
fn test_canonical_range() {
    let mut rng = rand::thread_rng();
    let p = BigInt::from(1_000_003);

    for _ in 0..50 {
        let shares: Vec<Share> = (1..=5)
            .map(|x| {
                let y = rng.gen_bigint_range(&BigInt::from(-5_000_000), &BigInt::from(5_000_000));
                Share::new(x, y)
            })
            .collect();
        let set = ShareSet::new(shares, 5);

        let secret = reconstruct(&set, Some(p.clone())).unwrap();
        assert!(secret >= BigInt::zero() && secret < p, "{} out of range", secret);

        // Keep max y >= 5 so the derived prime cannot fold x = 1..=5 together
        let lifted: Vec<Share> = set
            .shares
            .iter()
            .map(|s| Share::new(s.x.clone(), s.y.magnitude().clone() + 5u32))
            .collect();
        let r = recover(&ShareSet::new(lifted, 5), FieldMode::Derived).unwrap();
        let derived = r.field.modulus().unwrap();
        assert!(r.secret >= BigInt::zero() && &r.secret < derived);
    }
}

#[test]
fn test_determinism() {
    let set = ShareSet::from_pairs(
        [(3, 1_000_000_007i64), (9, 123_456_789), (27, 987_654_321)],
        3,
    );
    let first = recover(&set, FieldMode::Derived).unwrap();
    for _ in 0..5 {
        assert_eq!(recover(&set, FieldMode::Derived).unwrap(), first);
    }
}

/// Two shares with equal x never produce a silently wrong secret
#[test]
fn test_duplicate_x_rejected() {
    let set = ShareSet::from_pairs([(1, 4), (1, 5), (2, 7)], 2);
    match reconstruct(&set, None) {
        Err(ReconstructionError::NoModularInverse { share, modulus, .. }) => {
            assert_eq!(share, 0);
            assert_eq!(modulus, Some(BigInt::from(7)));
        }
        other => panic!("expected NoModularInverse, got {:?}", other),
    }

    assert!(matches!(
        reconstruct_rational(&set),
        Err(ReconstructionError::NoModularInverse { modulus: None, .. })
    ));
}

/// Distinct x values that collide modulo p are just as degenerate
#[test]
fn test_x_congruent_mod_p_rejected() {
    let set = ShareSet::from_pairs([(1, 2), (8, 3)], 2);
    assert!(matches!(
        reconstruct(&set, Some(BigInt::from(7))),
        Err(ReconstructionError::NoModularInverse { .. })
    ));
}

/// An unchecked composite modulus fails when a denominator shares a factor
#[test]
fn test_composite_modulus_without_inverse() {
    // denominator for x = 1 is (4 - 1) = 3, and gcd(3, 15) = 3
    let set = ShareSet::from_pairs([(1, 2), (4, 5)], 2);
    assert_eq!(
        reconstruct(&set, Some(BigInt::from(15))),
        Err(ReconstructionError::NoModularInverse {
            share: 0,
            denominator: BigInt::from(3),
            modulus: Some(BigInt::from(15)),
        })
    );

    assert_eq!(
        recover(&set, FieldMode::CheckedPrime(BigInt::from(15))),
        Err(ReconstructionError::CompositeModulus {
            modulus: BigInt::from(15)
        })
    );
}

#[test]
fn test_insufficient_shares() {
    let set = ShareSet::from_pairs([(1, 4), (2, 9)], 3);
    assert_eq!(
        reconstruct(&set, Some(BigInt::from(17))),
        Err(ReconstructionError::InsufficientShares {
            required: 3,
            found: 2
        })
    );
    assert_eq!(
        reconstruct_rational(&set),
        Err(ReconstructionError::InsufficientShares {
            required: 3,
            found: 2
        })
    );
}

#[test]
fn test_empty_share_set() {
    let set = ShareSet::from_pairs([(1, 4), (2, 9)], 0);
    assert_eq!(reconstruct(&set, None), Err(ReconstructionError::EmptyShareSet));

    let set = ShareSet::new(Vec::new(), 2);
    assert_eq!(reconstruct(&set, None), Err(ReconstructionError::EmptyShareSet));
}

#[test]
fn test_threshold_one_returns_first_y() {
    let set = ShareSet::from_pairs([(7, 30), (8, 99)], 1);
    assert_eq!(reconstruct(&set, None).unwrap(), BigInt::from(30));
    assert_eq!(reconstruct_rational(&set).unwrap(), BigInt::from(30));
}
