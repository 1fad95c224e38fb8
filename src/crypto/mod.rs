//! Arithmetic Primitives
//!
//! - **field**: prime-field reduction, modular inverse, probable primes
//! - **lagrange**: Lagrange interpolation at x = 0, modular and exact

pub mod field;
pub mod lagrange;
