//! Group arithmetic for the simulated Diffie-Hellman exchange.
//!
//! All protocol values live in the order-`q` subgroup of `Z*_p`, where
//! `p = q·r + 1` and both `p` and `q` are prime:
//!
//! ```text
//!   q  ← random prime of q_bits
//!   r  ← uniform in [2, 2^r_bits]          (retry until p is prime)
//!   p  = q·r + 1
//!   h  ← uniform in [2, p - 1]
//!   g  = h^r mod p                          (retry until g ≠ 1)
//! ```
//!
//! The arithmetic only has to produce deterministic collision signals for the
//! simulation. It is not a production security primitive.

mod arith;
mod params;
mod prime;

pub use arith::{mod_pow, mul_mod};
pub use params::GroupParams;
pub use prime::{is_prime, random_prime};

/// An element of the order-`q` subgroup (or an exponent drawn as one).
pub type Element = u64;

/// Largest combined size of `q` and the cofactor `r`, keeping `p` below 2^63.
pub const MAX_MODULUS_BITS: u32 = 62;
