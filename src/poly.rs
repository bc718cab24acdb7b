//! Ring elements of R_m = Z_m[x]/(x^N+1).
//!
//! A [`Poly`] lives in the coefficient domain, an [`NttPoly`] in the
//! evaluation (transform) domain. Both carry the [`Ring`] they belong to,
//! and every binary operation checks that the operands share it.

use std::sync::Arc;

use zeroize::Zeroize;

use crate::error::{config_err, mismatch_err, Result};
use crate::ntt::{
    addmod, mulmod, negacyclic_schoolbook, pointwise_add, pointwise_mul, pointwise_sub, submod,
    NttTables,
};

/// Degree and coefficient modulus of a polynomial ring, plus its NTT
/// tables when the modulus admits a primitive 2N-th root of unity.
#[derive(Debug)]
pub struct Ring {
    n: usize,
    modulus: u64,
    ntt: Option<NttTables>,
}

impl Ring {
    /// Ring that multiplies through the NTT when it can and falls back to
    /// schoolbook convolution otherwise.
    pub fn new(n: usize, modulus: u64) -> Result<Self> {
        check_shape(n, modulus)?;
        Ok(Ring { n, modulus, ntt: NttTables::new(modulus, n).ok() })
    }

    /// Ring that must support the NTT.
    pub fn ntt_friendly(n: usize, modulus: u64) -> Result<Self> {
        check_shape(n, modulus)?;
        let tables = NttTables::new(modulus, n)?;
        Ok(Ring { n, modulus, ntt: Some(tables) })
    }

    pub fn degree(&self) -> usize {
        self.n
    }

    pub fn modulus(&self) -> u64 {
        self.modulus
    }

    pub fn has_transform(&self) -> bool {
        self.ntt.is_some()
    }

    pub fn tables(&self) -> Option<&NttTables> {
        self.ntt.as_ref()
    }

    fn same_as(&self, other: &Ring) -> bool {
        self.n == other.n && self.modulus == other.modulus
    }
}

fn check_shape(n: usize, modulus: u64) -> Result<()> {
    if n == 0 || !n.is_power_of_two() {
        return Err(config_err!("ring degree {} is not a power of two", n));
    }
    if modulus < 2 {
        return Err(config_err!("ring modulus must be at least 2, got {}", modulus));
    }
    Ok(())
}

fn check_rings(a: &Ring, b: &Ring) -> Result<()> {
    if !a.same_as(b) {
        return Err(mismatch_err!(
            "ring (N={}, modulus={}) combined with ring (N={}, modulus={})",
            a.n, a.modulus, b.n, b.modulus
        ));
    }
    Ok(())
}

/// Round x/d to nearest, ties away from zero (d > 0).
#[inline]
fn div_round(x: i128, d: i128) -> i128 {
    let q = x / d;
    let r = x % d;
    if 2 * r.abs() >= d { q + x.signum() } else { q }
}

/// Representative of c (mod m) in (-m/2, m/2].
#[inline]
fn center(c: u64, m: u64) -> i128 {
    if c > m / 2 { c as i128 - m as i128 } else { c as i128 }
}

/// A polynomial in coefficient form. Every coefficient lies in [0, modulus).
#[derive(Clone, Debug)]
pub struct Poly {
    ring: Arc<Ring>,
    coeffs: Vec<u64>,
}

impl PartialEq for Poly {
    fn eq(&self, other: &Self) -> bool {
        self.ring.same_as(&other.ring) && self.coeffs == other.coeffs
    }
}

impl Eq for Poly {}

impl Zeroize for Poly {
    fn zeroize(&mut self) {
        self.coeffs.zeroize();
    }
}

impl Poly {
    pub fn zero(ring: &Arc<Ring>) -> Self {
        Poly { ring: Arc::clone(ring), coeffs: vec![0u64; ring.n] }
    }

    /// Build from exactly N coefficients, reducing each one.
    pub fn from_coeffs(ring: &Arc<Ring>, mut coeffs: Vec<u64>) -> Result<Self> {
        if coeffs.len() != ring.n {
            return Err(mismatch_err!("{} coefficients given for degree {}", coeffs.len(), ring.n));
        }
        let m = ring.modulus;
        coeffs.iter_mut().for_each(|c| *c %= m);
        Ok(Poly { ring: Arc::clone(ring), coeffs })
    }

    /// Create a polynomial from small signed integer coefficients.
    pub fn from_signed(ring: &Arc<Ring>, coeffs: &[i64]) -> Result<Self> {
        if coeffs.len() != ring.n {
            return Err(mismatch_err!("{} coefficients given for degree {}", coeffs.len(), ring.n));
        }
        let m = ring.modulus as i128;
        let coeffs = coeffs.iter().map(|&c| (c as i128).rem_euclid(m) as u64).collect();
        Ok(Poly { ring: Arc::clone(ring), coeffs })
    }

    /// Caller guarantees exactly N coefficients, all already reduced.
    pub(crate) fn from_reduced(ring: &Arc<Ring>, coeffs: Vec<u64>) -> Self {
        debug_assert_eq!(coeffs.len(), ring.n);
        debug_assert!(coeffs.iter().all(|&c| c < ring.modulus));
        Poly { ring: Arc::clone(ring), coeffs }
    }

    pub fn ring(&self) -> &Arc<Ring> {
        &self.ring
    }

    pub fn modulus(&self) -> u64 {
        self.ring.modulus
    }

    pub fn degree(&self) -> usize {
        self.ring.n
    }

    pub fn coeffs(&self) -> &[u64] {
        &self.coeffs
    }

    pub fn is_zero(&self) -> bool {
        self.coeffs.iter().all(|&c| c == 0)
    }

    /// Coefficients lifted to (-m/2, m/2].
    pub fn centered_coeffs(&self) -> Vec<i128> {
        let m = self.ring.modulus;
        self.coeffs.iter().map(|&c| center(c, m)).collect()
    }

    /// Largest centered coefficient magnitude.
    pub fn infinity_norm(&self) -> u64 {
        self.centered_coeffs()
            .into_iter()
            .map(|c| c.unsigned_abs() as u64)
            .max()
            .unwrap_or(0)
    }

    pub fn add(&self, other: &Poly) -> Result<Poly> {
        check_rings(&self.ring, &other.ring)?;
        Ok(self.with_coeffs(pointwise_add(&self.coeffs, &other.coeffs, self.ring.modulus)))
    }

    pub fn sub(&self, other: &Poly) -> Result<Poly> {
        check_rings(&self.ring, &other.ring)?;
        Ok(self.with_coeffs(pointwise_sub(&self.coeffs, &other.coeffs, self.ring.modulus)))
    }

    pub fn neg(&self) -> Poly {
        let m = self.ring.modulus;
        self.with_coeffs(self.coeffs.iter().map(|&c| submod(0, c, m)).collect())
    }

    /// Multiply every coefficient by a constant (reduced first).
    pub fn scale(&self, constant: u64) -> Poly {
        let m = self.ring.modulus;
        let k = constant % m;
        self.with_coeffs(self.coeffs.iter().map(|&c| mulmod(c, k, m)).collect())
    }

    /// Ring product; NTT when available, schoolbook otherwise.
    pub fn mul(&self, other: &Poly) -> Result<Poly> {
        check_rings(&self.ring, &other.ring)?;
        if self.ring.has_transform() {
            let a = self.forward()?;
            let b = other.forward()?;
            a.mul(&b)?.inverse()
        } else {
            Ok(self.with_coeffs(negacyclic_schoolbook(&self.coeffs, &other.coeffs, self.ring.modulus)))
        }
    }

    /// Forward NTT into the evaluation domain.
    pub fn forward(&self) -> Result<NttPoly> {
        let tables = self.ring.ntt.as_ref().ok_or_else(|| {
            config_err!("modulus {} has no NTT for N = {}", self.ring.modulus, self.ring.n)
        })?;
        let mut values = self.coeffs.clone();
        tables.forward(&mut values);
        Ok(NttPoly { ring: Arc::clone(&self.ring), values })
    }

    /// c -> round(c * target / current) mod target, per coefficient,
    /// on the non-negative residue c.
    pub fn switch_modulus(&self, target: &Arc<Ring>) -> Result<Poly> {
        self.check_degree(target)?;
        let from = self.ring.modulus as u128;
        let to = target.modulus as u128;
        let coeffs = self
            .coeffs
            .iter()
            .map(|&c| {
                let num = c as u128 * to;
                let (q, r) = (num / from, num % from);
                let rounded = if 2 * r >= from { q + 1 } else { q };
                (rounded % to) as u64
            })
            .collect();
        Ok(Poly { ring: Arc::clone(target), coeffs })
    }

    /// Re-express the centered representatives in another modulus.
    pub fn lift_centered(&self, target: &Arc<Ring>) -> Result<Poly> {
        self.check_degree(target)?;
        let m = self.ring.modulus;
        let to = target.modulus as i128;
        let coeffs = self
            .coeffs
            .iter()
            .map(|&c| center(c, m).rem_euclid(to) as u64)
            .collect();
        Ok(Poly { ring: Arc::clone(target), coeffs })
    }

    /// x -> round(x * numerator / denominator) mod target, with x the
    /// centered representative of each coefficient.
    pub fn rescale(&self, numerator: u64, denominator: u64, target: &Arc<Ring>) -> Result<Poly> {
        self.check_degree(target)?;
        if denominator == 0 {
            return Err(config_err!("rescale by a zero denominator"));
        }
        let m = self.ring.modulus;
        let to = target.modulus as i128;
        let coeffs = self
            .coeffs
            .iter()
            .map(|&c| {
                let scaled = div_round(center(c, m) * numerator as i128, denominator as i128);
                scaled.rem_euclid(to) as u64
            })
            .collect();
        Ok(Poly { ring: Arc::clone(target), coeffs })
    }

    /// Split into `count` digit polynomials base 2^base_bits, least
    /// significant first, so that self = sum_i digit_i * 2^(i*base_bits).
    pub fn decompose(&self, base_bits: u32, count: usize) -> Vec<Poly> {
        let mask = (1u64 << base_bits) - 1;
        (0..count)
            .map(|i| {
                let shift = i as u32 * base_bits;
                let digits = self
                    .coeffs
                    .iter()
                    .map(|&c| c.checked_shr(shift).unwrap_or(0) & mask)
                    .collect();
                self.with_coeffs(digits)
            })
            .collect()
    }

    fn check_degree(&self, target: &Ring) -> Result<()> {
        if self.ring.n != target.n {
            return Err(mismatch_err!("degree {} switched into degree {}", self.ring.n, target.n));
        }
        Ok(())
    }

    fn with_coeffs(&self, coeffs: Vec<u64>) -> Poly {
        Poly { ring: Arc::clone(&self.ring), coeffs }
    }
}

/// A polynomial in NTT evaluation form.
#[derive(Clone, Debug)]
pub struct NttPoly {
    ring: Arc<Ring>,
    values: Vec<u64>,
}

impl PartialEq for NttPoly {
    fn eq(&self, other: &Self) -> bool {
        self.ring.same_as(&other.ring) && self.values == other.values
    }
}

impl Eq for NttPoly {}

impl NttPoly {
    pub fn ring(&self) -> &Arc<Ring> {
        &self.ring
    }

    pub fn values(&self) -> &[u64] {
        &self.values
    }

    pub fn mul(&self, other: &NttPoly) -> Result<NttPoly> {
        check_rings(&self.ring, &other.ring)?;
        Ok(self.with_values(pointwise_mul(&self.values, &other.values, self.ring.modulus)))
    }

    pub fn add(&self, other: &NttPoly) -> Result<NttPoly> {
        check_rings(&self.ring, &other.ring)?;
        Ok(self.with_values(pointwise_add(&self.values, &other.values, self.ring.modulus)))
    }

    pub fn sub(&self, other: &NttPoly) -> Result<NttPoly> {
        check_rings(&self.ring, &other.ring)?;
        Ok(self.with_values(pointwise_sub(&self.values, &other.values, self.ring.modulus)))
    }

    /// Multiply-accumulate: self += a * b.
    pub fn mul_acc(&mut self, a: &NttPoly, b: &NttPoly) -> Result<()> {
        check_rings(&self.ring, &a.ring)?;
        check_rings(&self.ring, &b.ring)?;
        let m = self.ring.modulus;
        for ((acc, &x), &y) in self.values.iter_mut().zip(&a.values).zip(&b.values) {
            *acc = addmod(*acc, mulmod(x, y, m), m);
        }
        Ok(())
    }

    /// Inverse NTT back to coefficient form.
    pub fn inverse(&self) -> Result<Poly> {
        let tables = self.ring.ntt.as_ref().ok_or_else(|| {
            config_err!("modulus {} has no NTT for N = {}", self.ring.modulus, self.ring.n)
        })?;
        let mut coeffs = self.values.clone();
        tables.inverse(&mut coeffs);
        Ok(Poly { ring: Arc::clone(&self.ring), coeffs })
    }

    fn with_values(&self, values: Vec<u64>) -> NttPoly {
        NttPoly { ring: Arc::clone(&self.ring), values }
    }
}
