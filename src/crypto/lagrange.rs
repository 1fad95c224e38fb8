//! Lagrange Interpolation at Zero
//!
//! For points (x_0, y_0) .. (x_{k-1}, y_{k-1}) the value of the unique
//! degree k-1 polynomial at x = 0 is
//!
//!   f(0) = Σ_j y_j · λ_j(0),   λ_j(0) = Π_{m≠j} x_m / (x_m - x_j)
//!
//! Two flavours are provided: over a prime field Z/pZ, and over the rationals.

use crate::crypto::field::{mod_inverse, reduce};
use crate::error::ReconstructionError;
use crate::shares::Share;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Zero};
use tracing::trace;

/// Numerator Π_{m≠j} x_m and denominator Π_{m≠j} (x_m - x_j).
///
/// With a modulus, both products are reduced after every step so
/// intermediates stay below p². Without one they are exact.
fn basis_terms(j: usize, points: &[Share], modulus: Option<&BigInt>) -> (BigInt, BigInt) {
    let fold = |value: BigInt| match modulus {
        Some(p) => reduce(&value, p),
        None => value,
    };

    let x_j = &points[j].x;
    let mut numerator = BigInt::one();
    let mut denominator = BigInt::one();

    for (m, point) in points.iter().enumerate() {
        if m == j {
            continue;
        }
        numerator = fold(numerator * &point.x);
        denominator = fold(denominator * (&point.x - x_j));
    }

    (numerator, denominator)
}

// ============================================================================
// Prime Field
// ============================================================================

/// Lagrange coefficient λ_j(0) modulo `modulus`.
pub fn coefficient_at_zero_mod(
    j: usize,
    points: &[Share],
    modulus: &BigInt,
) -> Result<BigInt, ReconstructionError> {
    let (numerator, denominator) = basis_terms(j, points, Some(modulus));

    let denominator_inv =
        mod_inverse(&denominator, modulus).ok_or_else(|| ReconstructionError::NoModularInverse {
            share: j,
            denominator: denominator.clone(),
            modulus: Some(modulus.clone()),
        })?;

    Ok(reduce(&(numerator * denominator_inv), modulus))
}

/// Interpolate f(0) over Z/pZ. The result lies in `[0, modulus)`.
pub fn interpolate_at_zero_mod(
    points: &[Share],
    modulus: &BigInt,
) -> Result<BigInt, ReconstructionError> {
    let mut secret = BigInt::zero();

    for (j, point) in points.iter().enumerate() {
        let coefficient = coefficient_at_zero_mod(j, points, modulus)?;
        let term = reduce(&(reduce(&point.y, modulus) * coefficient), modulus);
        trace!(share = j, x = %point.x, term = %term, "lagrange term");
        secret = reduce(&(secret + term), modulus);
    }

    Ok(secret)
}

// ============================================================================
// Rationals
// ============================================================================

/// Exact Lagrange coefficient λ_j(0) as a reduced fraction.
pub fn coefficient_at_zero_rational(
    j: usize,
    points: &[Share],
) -> Result<BigRational, ReconstructionError> {
    let (numerator, denominator) = basis_terms(j, points, None);
    if denominator.is_zero() {
        return Err(ReconstructionError::NoModularInverse {
            share: j,
            denominator,
            modulus: None,
        });
    }
    Ok(BigRational::new(numerator, denominator))
}

/// Interpolate f(0) exactly over the rationals.
pub fn interpolate_at_zero_rational(points: &[Share]) -> Result<BigRational, ReconstructionError> {
    let mut sum = BigRational::zero();

    for (j, point) in points.iter().enumerate() {
        let coefficient = coefficient_at_zero_rational(j, points)?;
        sum += coefficient * BigRational::from_integer(point.y.clone());
    }

    Ok(sum)
}
