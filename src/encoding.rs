//! Integer plaintext encoding: balanced base-T digits, one per coefficient.
//!
//! An integer x is written as x = Σ d_i · T^i with every digit d_i in
//! (-T/2, T/2]; digit i goes to the coefficient of x^i, stored as its
//! residue in [0, T). Decoding evaluates the polynomial at T, so a value
//! computed homomorphically decodes to an integer congruent to the plain
//! result modulo T (and equal to it while no digit wraps).

use crate::bigint::Integer;
use crate::error::{mismatch_err, range_err, Result};
use crate::params::FvContext;
use crate::poly::{NttPoly, Poly};

/// An encoded message: a ring element modulo Q whose coefficients lie in
/// [0, T), held in exactly one of the two domains.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Plaintext {
    Coefficient(Poly),
    Evaluation(NttPoly),
}

impl Plaintext {
    /// Wrap raw message coefficients (reduced mod T, zero-padded to N).
    pub fn from_message(ctx: &FvContext, message: &[u64]) -> Result<Self> {
        let n = ctx.degree();
        if message.len() > n {
            return Err(mismatch_err!("{} message coefficients for degree {}", message.len(), n));
        }
        let t = ctx.plain_modulus();
        let mut coeffs = vec![0u64; n];
        for (slot, &m) in coeffs.iter_mut().zip(message) {
            *slot = m % t;
        }
        Ok(Plaintext::Coefficient(Poly::from_coeffs(ctx.ring_q(), coeffs)?))
    }

    /// Coefficient form, transforming back if needed.
    pub fn to_coefficient(&self) -> Result<Poly> {
        match self {
            Plaintext::Coefficient(p) => Ok(p.clone()),
            Plaintext::Evaluation(p) => p.inverse(),
        }
    }

    /// Evaluation form; fails when Q has no NTT.
    pub fn to_evaluation(&self) -> Result<NttPoly> {
        match self {
            Plaintext::Coefficient(p) => p.forward(),
            Plaintext::Evaluation(p) => Ok(p.clone()),
        }
    }

    pub fn into_evaluation(self) -> Result<Self> {
        match self {
            Plaintext::Coefficient(p) => Ok(Plaintext::Evaluation(p.forward()?)),
            evaluated => Ok(evaluated),
        }
    }

    /// Message coefficients in [0, T).
    pub fn message(&self) -> Result<Vec<u64>> {
        Ok(self.to_coefficient()?.coeffs().to_vec())
    }
}

/// Encode an integer. Fails with `Range` when it needs more than N digits.
pub fn encode(ctx: &FvContext, value: &Integer) -> Result<Plaintext> {
    let t = ctx.t();
    let mut digits = vec![0u64; ctx.degree()];
    let mut rest = value.clone();
    for slot in digits.iter_mut() {
        if rest.is_zero() {
            break;
        }
        let digit = rest.centered(t)?;
        *slot = digit.reduce(t)?.to_u64()?;
        rest = (rest - &digit).div_floor(t)?;
    }
    if !rest.is_zero() {
        return Err(range_err!(
            "{} needs more than N = {} base-{} digits",
            value, ctx.degree(), t
        ));
    }
    Ok(Plaintext::Coefficient(Poly::from_coeffs(ctx.ring_q(), digits)?))
}

pub fn encode_i64(ctx: &FvContext, value: i64) -> Result<Plaintext> {
    encode(ctx, &Integer::from(value))
}

/// Decode to an integer: Σ centered(c_i) · T^i.
pub fn decode(ctx: &FvContext, plaintext: &Plaintext) -> Result<Integer> {
    let t = ctx.t();
    let poly = plaintext.to_coefficient()?;
    let mut acc = Integer::zero();
    for &c in poly.coeffs().iter().rev() {
        acc *= t;
        acc += &Integer::from(c).centered(t)?;
    }
    Ok(acc)
}

/// Decode into an i64, failing with `Range` if it does not fit.
pub fn decode_i64(ctx: &FvContext, plaintext: &Plaintext) -> Result<i64> {
    decode(ctx, plaintext)?.to_i64()
}
