//! Secret Reconstruction
//!
//! Recovers f(0) from the first k shares of a `ShareSet`.
//!
//! ## Field selection
//!
//! The caller picks the arithmetic explicitly through `FieldMode`:
//!
//! - **Derived**: smallest probable prime strictly greater than the largest y
//!   in the working subset (the default, and the canonical path)
//! - **Prime(p)**: caller-supplied modulus, trusted to be prime
//! - **CheckedPrime(p)**: caller-supplied modulus, Miller-Rabin checked first
//! - **Rational**: exact interpolation over Q, no modulus at all
//!
//! Modular and rational results can differ for the same shares, so the two
//! are never mixed behind one call.

use crate::crypto::field::{is_probable_prime, next_probable_prime};
use crate::crypto::lagrange::{interpolate_at_zero_mod, interpolate_at_zero_rational};
use crate::error::ReconstructionError;
use crate::shares::{Share, ShareSet};
use num_bigint::BigInt;
use num_traits::{One, Zero};
use std::fmt;
use tracing::debug;

/// How the caller wants the field chosen.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldMode {
    #[default]
    Derived,
    Prime(BigInt),
    CheckedPrime(BigInt),
    Rational,
}

impl From<Option<BigInt>> for FieldMode {
    fn from(modulus: Option<BigInt>) -> Self {
        match modulus {
            Some(p) => FieldMode::Prime(p),
            None => FieldMode::Derived,
        }
    }
}

/// The arithmetic a reconstruction actually ran in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    Rational,
    Prime(BigInt),
}

impl Field {
    /// Prime field just above the largest share value in `shares`.
    pub fn derive(shares: &[Share]) -> Self {
        let max_y = shares
            .iter()
            .map(|s| &s.y)
            .max()
            .cloned()
            .unwrap_or_else(BigInt::zero);
        Field::Prime(next_probable_prime(&max_y))
    }

    pub fn modulus(&self) -> Option<&BigInt> {
        match self {
            Field::Prime(p) => Some(p),
            Field::Rational => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Rational => write!(f, "rational"),
            Field::Prime(p) => write!(f, "mod {}", p),
        }
    }
}

/// A recovered secret and the field it was computed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconstruction {
    pub secret: BigInt,
    pub field: Field,
    /// Number of shares that went into the interpolation (always k).
    pub shares_used: usize,
}

/// Reconstruct the secret over a prime field.
///
/// `None` derives the modulus from the shares; `Some(p)` uses `p` as given.
/// The result lies in `[0, p)`.
pub fn reconstruct(
    share_set: &ShareSet,
    modulus: Option<BigInt>,
) -> Result<BigInt, ReconstructionError> {
    recover(share_set, FieldMode::from(modulus)).map(|r| r.secret)
}

/// Reconstruct the secret exactly over the rationals.
///
/// Returns the signed integer f(0). Fails with `NonIntegralSecret` when the
/// shares describe a polynomial whose value at zero is not an integer.
pub fn reconstruct_rational(share_set: &ShareSet) -> Result<BigInt, ReconstructionError> {
    recover(share_set, FieldMode::Rational).map(|r| r.secret)
}

/// Reconstruct with an explicit field mode and report the field used.
pub fn recover(
    share_set: &ShareSet,
    mode: FieldMode,
) -> Result<Reconstruction, ReconstructionError> {
    let points = select_working_subset(share_set)?;

    let field = match mode {
        FieldMode::Derived => Field::derive(points),
        FieldMode::Prime(p) => Field::Prime(validate_modulus(p, false)?),
        FieldMode::CheckedPrime(p) => Field::Prime(validate_modulus(p, true)?),
        FieldMode::Rational => Field::Rational,
    };
    debug!(k = share_set.k, field = %field, "reconstructing secret");

    let secret = match &field {
        Field::Prime(p) => interpolate_at_zero_mod(points, p)?,
        Field::Rational => {
            let value = interpolate_at_zero_rational(points)?;
            if !value.is_integer() {
                return Err(ReconstructionError::NonIntegralSecret {
                    numerator: value.numer().clone(),
                    denominator: value.denom().clone(),
                });
            }
            value.to_integer()
        }
    };

    Ok(Reconstruction {
        secret,
        field,
        shares_used: points.len(),
    })
}

fn select_working_subset(share_set: &ShareSet) -> Result<&[Share], ReconstructionError> {
    if share_set.k == 0 || share_set.is_empty() {
        return Err(ReconstructionError::EmptyShareSet);
    }
    if share_set.len() < share_set.k {
        return Err(ReconstructionError::InsufficientShares {
            required: share_set.k,
            found: share_set.len(),
        });
    }
    Ok(share_set.working_subset())
}

fn validate_modulus(modulus: BigInt, check_primality: bool) -> Result<BigInt, ReconstructionError> {
    if modulus <= BigInt::one() {
        return Err(ReconstructionError::InvalidModulus { modulus });
    }
    if check_primality && !is_probable_prime(&modulus) {
        return Err(ReconstructionError::CompositeModulus { modulus });
    }
    Ok(modulus)
}
