//! Error Types
//!
//! One error family per stage:
//!
//! - **RadixError**: a number string does not decode in its declared base
//! - **MalformedInput**: the share-set document does not match the expected schema
//! - **ReconstructionError**: the interpolation itself cannot produce a secret

use num_bigint::BigInt;
use thiserror::Error;

/// Raised by the share normalizer while turning raw input into a `ShareSet`.
#[derive(Error, Debug)]
pub enum MalformedInput {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("top-level value must be an object")]
    NotAnObject,

    #[error("missing \"keys\" object")]
    MissingKeys,

    #[error("missing or invalid threshold \"keys.k\"")]
    MissingThreshold,

    #[error("invalid \"keys.n\": expected a non-negative integer")]
    InvalidTotal,

    #[error("share \"{key}\": expected an object with \"base\" and \"value\"")]
    ShareNotAnObject { key: String },

    #[error("share \"{key}\": missing field \"{field}\"")]
    MissingField { key: String, field: &'static str },

    #[error("share key \"{key}\" is not a decimal integer")]
    InvalidIndex { key: String },

    #[error("share \"{key}\": base {base:?} is not a radix in 2..=36")]
    InvalidBase { key: String, base: String },

    #[error("share \"{key}\": empty value")]
    EmptyValue { key: String },

    #[error("share \"{key}\": digit '{digit}' is not valid in base {base}")]
    InvalidDigit { key: String, digit: char, base: u32 },

    #[error("key \"{key}\" appears more than once")]
    DuplicateKey { key: String },

    #[error("duplicate share index x = {x}")]
    DuplicateIndex { x: BigInt },
}

/// Raised by the reconstructor. Every variant is fatal for the call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReconstructionError {
    #[error("empty share set: threshold k must be at least 1 and at least one share is required")]
    EmptyShareSet,

    #[error("not enough shares: required {required}, found {found}")]
    InsufficientShares { required: usize, found: usize },

    #[error("modulus {modulus} is invalid: it must be at least 2")]
    InvalidModulus { modulus: BigInt },

    #[error("modulus {modulus} is not prime")]
    CompositeModulus { modulus: BigInt },

    /// `modulus` is `None` in rational mode, where only a zero denominator fails.
    #[error("{}", no_inverse_message(.share, .modulus))]
    NoModularInverse {
        share: usize,
        denominator: BigInt,
        modulus: Option<BigInt>,
    },

    #[error("interpolated value at zero is {numerator}/{denominator}, not an integer")]
    NonIntegralSecret { numerator: BigInt, denominator: BigInt },
}

fn no_inverse_message(share: &usize, modulus: &Option<BigInt>) -> String {
    match modulus {
        Some(p) => format!(
            "Lagrange denominator for share #{} has no inverse modulo {} (duplicate x values or non-prime modulus?)",
            share, p
        ),
        None => format!(
            "Lagrange denominator for share #{} is zero (duplicate x values?)",
            share
        ),
    }
}

/// Raised when decoding or encoding a number in an arbitrary radix.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RadixError {
    #[error("radix {0} is outside 2..=36")]
    UnsupportedBase(u32),

    #[error("no digits")]
    Empty,

    #[error("digit '{digit}' is not valid in base {base}")]
    InvalidDigit { digit: char, base: u32 },
}
