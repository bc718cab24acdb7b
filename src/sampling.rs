//! Gaussian, ternary and uniform sampling of ring elements.
//!
//! ⚠️ NOT CONSTANT-TIME. The error distribution rounds continuous Gaussian
//! samples and redraws past the tail cut.
//!
//! Callers pass their own `Rng + CryptoRng` handle; nothing here touches a
//! process-wide generator.

use std::sync::Arc;

use rand::{CryptoRng, Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rand_distr::{Distribution, Normal};

use crate::params::GAUSSIAN_TAIL_CUT;
use crate::poly::{Poly, Ring};

/// A fresh ChaCha20 stream seeded from OS entropy.
pub fn entropy_rng() -> ChaCha20Rng {
    ChaCha20Rng::from_entropy()
}

/// Derive an independent child stream from `rng` (e.g. one per thread).
pub fn fork<R: Rng + CryptoRng>(rng: &mut R) -> ChaCha20Rng {
    ChaCha20Rng::from_seed(rng.gen())
}

/// Signed coefficients from a rounded Gaussian, bounded by the tail cut.
pub fn sample_gaussian_signed<R: Rng + CryptoRng>(
    rng: &mut R,
    normal: &Normal<f64>,
    n: usize,
) -> Vec<i64> {
    let bound = GAUSSIAN_TAIL_CUT * normal.std_dev();
    (0..n)
        .map(|_| loop {
            let x = normal.sample(&mut *rng);
            if x.abs() <= bound {
                break x.round() as i64;
            }
        })
        .collect()
}

/// Error polynomial: small, symmetric around zero.
pub fn sample_gaussian<R: Rng + CryptoRng>(
    rng: &mut R,
    ring: &Arc<Ring>,
    normal: &Normal<f64>,
) -> Poly {
    let m = ring.modulus() as i128;
    let coeffs = sample_gaussian_signed(rng, normal, ring.degree())
        .into_iter()
        .map(|c| (c as i128).rem_euclid(m) as u64)
        .collect();
    Poly::from_reduced(ring, coeffs)
}

/// Ternary polynomial: each coefficient uniform in {-1, 0, 1}.
pub fn sample_ternary<R: Rng + CryptoRng>(rng: &mut R, ring: &Arc<Ring>) -> Poly {
    let m = ring.modulus();
    let coeffs = (0..ring.degree())
        .map(|_| match rng.gen_range(0..3u8) {
            0 => m - 1,
            1 => 0,
            _ => 1,
        })
        .collect();
    Poly::from_reduced(ring, coeffs)
}

/// Sample a polynomial uniformly in [0, modulus).
pub fn sample_uniform<R: Rng + CryptoRng>(rng: &mut R, ring: &Arc<Ring>) -> Poly {
    let m = ring.modulus();
    let coeffs = (0..ring.degree()).map(|_| rng.gen_range(0..m)).collect();
    Poly::from_reduced(ring, coeffs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;

    const Q: u64 = 8_380_417;

    fn ring(n: usize) -> Arc<Ring> {
        Arc::new(Ring::new(n, Q).unwrap())
    }

    #[test]
    fn test_ternary_distribution() {
        let mut rng = StdRng::seed_from_u64(42);
        let p = sample_ternary(&mut rng, &ring(4096));
        let neg = p.coeffs().iter().filter(|&&c| c == Q - 1).count();
        let zero = p.coeffs().iter().filter(|&&c| c == 0).count();
        let one = p.coeffs().iter().filter(|&&c| c == 1).count();
        assert_eq!(neg + zero + one, 4096);
        for count in [neg, zero, one] {
            assert!((1100..1650).contains(&count), "skewed ternary count {}", count);
        }
    }

    #[test]
    fn test_gaussian_bounded_and_centered() {
        let mut rng = StdRng::seed_from_u64(1);
        let normal = Normal::new(0.0, 3.2).unwrap();
        let samples = sample_gaussian_signed(&mut rng, &normal, 20_000);
        assert!(samples.iter().all(|&x| x.abs() <= 20));
        let mean = samples.iter().sum::<i64>() as f64 / samples.len() as f64;
        assert!(mean.abs() < 0.2, "mean {}", mean);

        let p = sample_gaussian(&mut rng, &ring(1024), &normal);
        assert!(p.infinity_norm() <= 20);
    }

    #[test]
    fn test_uniform_in_range() {
        let mut rng = StdRng::seed_from_u64(9);
        let p = sample_uniform(&mut rng, &ring(1024));
        assert!(p.coeffs().iter().all(|&c| c < Q));
        // a uniform draw over ~2^23 values is essentially never tiny
        assert!(p.infinity_norm() > 1000);
    }

    #[test]
    fn test_forked_streams_differ() {
        let mut parent = StdRng::seed_from_u64(5);
        let mut a = fork(&mut parent);
        let mut b = fork(&mut parent);
        let r = ring(64);
        assert_ne!(sample_uniform(&mut a, &r), sample_uniform(&mut b, &r));
        let mut os = entropy_rng();
        let _ = sample_ternary(&mut os, &r);
    }
}
