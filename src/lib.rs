//! Shamir secret reconstruction.
//!
//! Load a share set, then interpolate the secret polynomial at zero:
//!
//! ```
//! use num_bigint::BigInt;
//! use shamir_recover::{reconstruct, ShareSet};
//!
//! // f(x) = x² + 2x + 1 over GF(17)
//! let shares = ShareSet::from_pairs([(1, 4), (2, 9), (3, 16)], 3);
//! let secret = reconstruct(&shares, Some(BigInt::from(17))).unwrap();
//! assert_eq!(secret, BigInt::from(1));
//! ```

pub mod crypto;
pub mod error;
pub mod reconstruct;
pub mod shares;

pub use error::{MalformedInput, RadixError, ReconstructionError};
pub use reconstruct::{
    reconstruct, reconstruct_rational, recover, Field, FieldMode, Reconstruction,
};
pub use shares::{decode_radix, encode_radix, load_share_set, parse_share_set, Share, ShareSet};
