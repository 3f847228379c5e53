//! Modular arithmetic over `u64` with `u128` intermediates.

/// Compute `a·b mod m` without overflow.
pub fn mul_mod(a: u64, b: u64, m: u64) -> u64 {
    ((u128::from(a) * u128::from(b)) % u128::from(m)) as u64
}

/// Compute `base^exponent mod modulus` by square-and-multiply.
///
/// A modulus of 1 yields 0, matching `x mod 1`.
pub fn mod_pow(base: u64, exponent: u64, modulus: u64) -> u64 {
    if modulus == 1 {
        return 0;
    }

    let mut result = 1u64;
    let mut base = base % modulus;
    let mut exponent = exponent;
    while exponent > 0 {
        if exponent & 1 == 1 {
            result = mul_mod(result, base, modulus);
        }
        base = mul_mod(base, base, modulus);
        exponent >>= 1;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_mul_mod_large_operands() {
        let m = (1u64 << 61) - 1;
        assert_eq!(mul_mod(m - 1, m - 1, m), 1);
        assert_eq!(mul_mod(0, 12345, 97), 0);
    }

    #[test]
    fn test_mod_pow_known_values() {
        assert_eq!(mod_pow(2, 10, 1000), 24);
        assert_eq!(mod_pow(3, 0, 7), 1);
        assert_eq!(mod_pow(5, 3, 13), 8);
        assert_eq!(mod_pow(7, 5, 1), 0);
        // Fermat: a^(p-1) = 1 mod p
        assert_eq!(mod_pow(12345, 1_000_000_006, 1_000_000_007), 1);
    }

    proptest! {
        #[test]
        fn prop_exponent_product_commutes(
            g in 2u64..1_000_000,
            x in 1u64..u64::from(u32::MAX),
            y in 1u64..u64::from(u32::MAX),
        ) {
            let p = 1_000_000_007u64;
            let gx = mod_pow(g, x, p);
            let gy = mod_pow(g, y, p);
            prop_assert_eq!(mod_pow(gx, y, p), mod_pow(gy, x, p));
        }

        #[test]
        fn prop_mod_pow_below_modulus(base in any::<u64>(), exponent in any::<u64>(), modulus in 1u64..) {
            prop_assert!(mod_pow(base, exponent, modulus) < modulus);
        }
    }
}
