//! Primality testing and random prime search.

use rand::Rng;

use super::arith::{mod_pow, mul_mod};
use crate::error::{Result, SimError};

/// Small primes used for trial division before Miller-Rabin.
const SMALL_PRIMES: [u64; 70] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
    101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151, 157, 163, 167, 173, 179, 181, 191, 193,
    197, 199, 211, 223, 227, 229, 233, 239, 241, 251, 257, 263, 269, 271, 277, 281, 283, 293, 307,
    311, 313, 317, 331, 337, 347, 349,
];

/// Witness set that makes Miller-Rabin deterministic for every `u64`.
const WITNESSES: [u64; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];

/// Deterministic primality test for 64-bit integers.
pub fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    for &p in &SMALL_PRIMES {
        if n == p {
            return true;
        }
        if n % p == 0 {
            return false;
        }
    }

    // n - 1 = d · 2^s with d odd
    let mut d = n - 1;
    let mut s = 0u32;
    while d % 2 == 0 {
        d >>= 1;
        s += 1;
    }

    WITNESSES.iter().all(|&a| !is_composite_witness(a, d, s, n))
}

fn is_composite_witness(a: u64, d: u64, s: u32, n: u64) -> bool {
    let mut x = mod_pow(a, d, n);
    if x == 1 || x == n - 1 {
        return false;
    }
    for _ in 1..s {
        x = mul_mod(x, x, n);
        if x == n - 1 {
            return false;
        }
    }
    true
}

/// Draw random odd candidates with the top bit set until one is prime.
///
/// `bits` must be in `2..=63`.
pub fn random_prime<R: Rng + ?Sized>(bits: u32, rng: &mut R) -> Result<u64> {
    if !(2..=63).contains(&bits) {
        return Err(SimError::Config(format!(
            "prime size must be between 2 and 63 bits, got {bits}"
        )));
    }
    if bits == 2 {
        return Ok(if rng.gen_bool(0.5) { 2 } else { 3 });
    }

    let top = 1u64 << (bits - 1);
    loop {
        let candidate = rng.gen_range(0..top) | top | 1;
        if is_prime(candidate) {
            return Ok(candidate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_small_values() {
        assert!(!is_prime(0));
        assert!(!is_prime(1));
        assert!(is_prime(2));
        assert!(is_prime(3));
        assert!(!is_prime(4));
        assert!(is_prime(349));
        assert!(!is_prime(351));
    }

    #[test]
    fn test_large_primes_and_composites() {
        assert!(is_prime(1_000_000_007));
        assert!(is_prime(2_147_483_647));
        assert!(is_prime(18_446_744_073_709_551_557)); // largest u64 prime
        // Carmichael numbers fool Fermat but not Miller-Rabin
        assert!(!is_prime(561));
        assert!(!is_prime(41_041));
        assert!(!is_prime(3_215_031_751));
        assert!(!is_prime(1_000_000_007 * 998_244_353));
    }

    #[test]
    fn test_random_prime_has_requested_size() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for bits in [2, 8, 20, 40, 62] {
            let p = random_prime(bits, &mut rng).unwrap();
            assert!(is_prime(p));
            assert_eq!(64 - p.leading_zeros(), bits, "prime {p} for {bits} bits");
        }
    }

    #[test]
    fn test_random_prime_rejects_bad_sizes() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(random_prime(1, &mut rng).is_err());
        assert!(random_prime(64, &mut rng).is_err());
    }
}
