//! Safe-prime subgroup parameters.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::arith::mod_pow;
use super::prime::{is_prime, random_prime};
use super::{Element, MAX_MODULUS_BITS};
use crate::error::{Result, SimError};

/// Cofactor draws per candidate `q` before a new `q` is searched.
const COFACTOR_ATTEMPTS: usize = 1024;

/// Parameters of the order-`q` subgroup of `Z*_p`.
///
/// Immutable once built. Every node holds a copy for the duration of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupParams {
    /// Prime modulus, `p = q·r + 1`.
    pub p: u64,
    /// Prime order of the subgroup.
    pub q: u64,
    /// Cofactor `(p - 1) / q`.
    pub r: u64,
    /// Random element `g` was derived from.
    pub h: u64,
    /// Generator of the order-`q` subgroup, `h^r mod p`.
    pub g: u64,
}

impl GroupParams {
    /// Build parameters from explicit values, checking every group invariant.
    pub fn new(p: u64, q: u64, r: u64, h: u64, g: u64) -> Result<Self> {
        let params = Self { p, q, r, h, g };
        params.validate()?;
        Ok(params)
    }

    /// Search for fresh parameters with a `q_bits` subgroup order and a cofactor
    /// drawn from `[2, 2^r_bits]`.
    pub fn generate<R: Rng + ?Sized>(q_bits: u32, r_bits: u32, rng: &mut R) -> Result<Self> {
        if q_bits < 3 || r_bits == 0 || q_bits + r_bits > MAX_MODULUS_BITS {
            return Err(SimError::Config(format!(
                "group sizes q_bits={q_bits}, r_bits={r_bits} must satisfy q_bits >= 3, \
                 r_bits >= 1 and q_bits + r_bits <= {MAX_MODULUS_BITS}"
            )));
        }

        let r_max = 1u64 << r_bits;
        loop {
            // A small cofactor range may never yield a prime p for this q; redraw q then.
            let q = random_prime(q_bits, rng)?;
            for _ in 0..COFACTOR_ATTEMPTS {
                let r = rng.gen_range(2..=r_max);
                let p = q * r + 1;
                if !is_prime(p) {
                    continue;
                }

                let h = rng.gen_range(2..p);
                let g = mod_pow(h, r, p);
                if g != 1 {
                    tracing::debug!(p, q, r, h, g, "generated group parameters");
                    return Ok(Self { p, q, r, h, g });
                }
            }
        }
    }

    /// Check the subgroup invariants.
    pub fn validate(&self) -> Result<()> {
        if !is_prime(self.p) {
            return Err(SimError::Config(format!("modulus p={} is not prime", self.p)));
        }
        if !is_prime(self.q) {
            return Err(SimError::Config(format!("order q={} is not prime", self.q)));
        }
        if u128::from(self.q) * u128::from(self.r) != u128::from(self.p) - 1 {
            return Err(SimError::Config(format!(
                "p - 1 = {} is not q·r = {}·{}",
                self.p - 1,
                self.q,
                self.r
            )));
        }
        if self.g <= 1 || self.g >= self.p {
            return Err(SimError::Config(format!(
                "generator g={} must lie in [2, p)",
                self.g
            )));
        }
        if mod_pow(self.g, self.q, self.p) != 1 {
            return Err(SimError::Config(format!(
                "g={} does not generate the order-{} subgroup",
                self.g, self.q
            )));
        }
        Ok(())
    }

    /// Uniform exponent in `[0, q)`.
    pub fn sample_exponent<R: Rng + ?Sized>(&self, rng: &mut R) -> u64 {
        rng.gen_range(0..self.q)
    }

    /// Uniform element of the subgroup, `g^k mod p` for `k` in `[0, q)`.
    pub fn sample_element<R: Rng + ?Sized>(&self, rng: &mut R) -> Element {
        self.pow_g(self.sample_exponent(rng))
    }

    /// `g^exponent mod p`.
    pub fn pow_g(&self, exponent: u64) -> Element {
        mod_pow(self.g, exponent, self.p)
    }

    /// `base^exponent mod p`.
    pub fn pow(&self, base: Element, exponent: u64) -> Element {
        mod_pow(base, exponent, self.p)
    }

    /// Whether `value` is a member of the order-`q` subgroup.
    pub fn contains(&self, value: Element) -> bool {
        value != 0 && value < self.p && mod_pow(value, self.q, self.p) == 1
    }
}

impl fmt::Display for GroupParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "group [p={},q={},r={},h={},g={}]",
            self.p, self.q, self.r, self.h, self.g
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_generate_satisfies_invariants() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for (q_bits, r_bits) in [(20, 8), (40, 8), (16, 16)] {
            let params = GroupParams::generate(q_bits, r_bits, &mut rng).unwrap();
            params.validate().unwrap();
            assert_ne!(params.g, 1);
            assert!(params.r >= 2 && params.r <= 1 << r_bits);
            assert_eq!(64 - params.q.leading_zeros(), q_bits);
        }
    }

    #[test]
    fn test_generate_rejects_oversized_modulus() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(GroupParams::generate(40, 30, &mut rng).is_err());
        assert!(GroupParams::generate(2, 8, &mut rng).is_err());
        assert!(GroupParams::generate(20, 0, &mut rng).is_err());
    }

    #[test]
    fn test_new_rejects_contract_violations() {
        // p = 23 = 11·2 + 1, g = 2 has order 11
        let good = GroupParams::new(23, 11, 2, 5, 2).unwrap();
        assert_eq!(good.pow_g(11), 1);

        // non-prime modulus
        assert!(matches!(
            GroupParams::new(21, 5, 4, 2, 4),
            Err(SimError::Config(_))
        ));
        // degenerate generator
        assert!(GroupParams::new(23, 11, 2, 22, 1).is_err());
        // q·r ≠ p - 1
        assert!(GroupParams::new(23, 11, 3, 5, 2).is_err());
        // 5 generates the full group of order 22, not the order-11 subgroup
        assert!(GroupParams::new(23, 11, 2, 5, 5).is_err());
    }

    #[test]
    fn test_samples_are_subgroup_members() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let params = GroupParams::generate(20, 8, &mut rng).unwrap();
        for _ in 0..100 {
            let e = params.sample_element(&mut rng);
            assert!(e < params.p);
            assert!(params.contains(e));
            assert!(params.sample_exponent(&mut rng) < params.q);
        }
    }

    #[test]
    fn test_display_matches_report_naming() {
        let params = GroupParams::new(23, 11, 2, 5, 2).unwrap();
        assert_eq!(params.to_string(), "group [p=23,q=11,r=2,h=5,g=2]");
    }
}
