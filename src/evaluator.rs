//! Homomorphic operations on ciphertexts.
//!
//! Nothing here tracks noise. Each operation consumes part of the budget
//! (multiplication far more than addition) and a chain that runs past it
//! decrypts to a wrong value without any error being raised.

use crate::encoding::Plaintext;
use crate::encrypt::Ciphertext;
use crate::error::Result;
use crate::keygen::{EvaluationKey, KeyId};
use crate::params::FvContext;
use crate::poly::Poly;

/// A product before relinearization: decrypts under (1, s, s²).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TensorCiphertext {
    key_id: KeyId,
    d0: Poly,
    d1: Poly,
    d2: Poly,
}

impl TensorCiphertext {
    pub fn key_id(&self) -> KeyId {
        self.key_id
    }

    pub fn terms(&self) -> [&Poly; 3] {
        [&self.d0, &self.d1, &self.d2]
    }
}

pub fn add(a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext> {
    a.key_id.ensure_same(b.key_id, "right operand")?;
    Ok(Ciphertext { key_id: a.key_id, c0: a.c0.add(&b.c0)?, c1: a.c1.add(&b.c1)? })
}

pub fn sub(a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext> {
    a.key_id.ensure_same(b.key_id, "right operand")?;
    Ok(Ciphertext { key_id: a.key_id, c0: a.c0.sub(&b.c0)?, c1: a.c1.sub(&b.c1)? })
}

pub fn negate(a: &Ciphertext) -> Ciphertext {
    Ciphertext { key_id: a.key_id, c0: a.c0.neg(), c1: a.c1.neg() }
}

/// Add a plaintext: c0 += Δ·m.
pub fn add_plain(ctx: &FvContext, a: &Ciphertext, plaintext: &Plaintext) -> Result<Ciphertext> {
    let scaled = plaintext.to_coefficient()?.scale(ctx.delta());
    Ok(Ciphertext { key_id: a.key_id, c0: a.c0.add(&scaled)?, c1: a.c1.clone() })
}

/// Multiply by a plaintext. The message digits are lifted centered mod T
/// so the noise grows with |m| ≤ T/2 per coefficient.
pub fn multiply_plain(ctx: &FvContext, a: &Ciphertext, plaintext: &Plaintext) -> Result<Ciphertext> {
    let digits = Poly::from_coeffs(ctx.ring_t(), plaintext.message()?)?;
    let m = digits.lift_centered(ctx.ring_q())?;
    Ok(Ciphertext { key_id: a.key_id, c0: a.c0.mul(&m)?, c1: a.c1.mul(&m)? })
}

/// Tensor product without relinearization.
///
/// Both operands are lifted to BigQ with centered representatives, so the
/// three products are exact integers: each is at most N·Q²/2 in magnitude
/// and the context guarantees BigQ > N·Q².
/// Each term is then scaled by T/Q with rounding back into Q.
pub fn tensor(ctx: &FvContext, a: &Ciphertext, b: &Ciphertext) -> Result<TensorCiphertext> {
    a.key_id.ensure_same(b.key_id, "right operand")?;
    let big = ctx.ring_big_q();
    let a0 = a.c0.lift_centered(big)?;
    let a1 = a.c1.lift_centered(big)?;
    let b0 = b.c0.lift_centered(big)?;
    let b1 = b.c1.lift_centered(big)?;

    let (d0, d1, d2) = if big.has_transform() {
        let (a0, a1, b0, b1) = (a0.forward()?, a1.forward()?, b0.forward()?, b1.forward()?);
        let mut d1 = a0.mul(&b1)?;
        d1.mul_acc(&a1, &b0)?;
        (a0.mul(&b0)?.inverse()?, d1.inverse()?, a1.mul(&b1)?.inverse()?)
    } else {
        (a0.mul(&b0)?, a0.mul(&b1)?.add(&a1.mul(&b0)?)?, a1.mul(&b1)?)
    };

    let (t, q) = (ctx.plain_modulus(), ctx.cipher_modulus());
    let ring_q = ctx.ring_q();
    Ok(TensorCiphertext {
        key_id: a.key_id,
        d0: d0.rescale(t, q, ring_q)?,
        d1: d1.rescale(t, q, ring_q)?,
        d2: d2.rescale(t, q, ring_q)?,
    })
}

/// Fold d2 back into two terms: decompose d2 in base w and pair digit i
/// with evaluation-key part i, which encrypts w^i·s².
pub fn relinearize(evk: &EvaluationKey, product: &TensorCiphertext) -> Result<Ciphertext> {
    evk.id().ensure_same(product.key_id, "product")?;
    let count = relinearization_digits(product.d2.modulus(), evk.base_bits(), evk.len());
    let digits = product.d2.decompose(evk.base_bits(), count);
    let mut c0 = product.d0.clone();
    let mut c1 = product.d1.clone();
    for (digit, (k0, k1)) in digits.iter().zip(evk.parts()) {
        c0 = c0.add(&digit.mul(k0)?)?;
        c1 = c1.add(&digit.mul(k1)?)?;
    }
    Ok(Ciphertext { key_id: product.key_id, c0, c1 })
}

/// Digits of base 2^base_bits that a residue mod q can occupy, capped at
/// the number of evaluation-key parts. Higher digits are always zero.
fn relinearization_digits(q: u64, base_bits: u32, available: usize) -> usize {
    let q_bits = u64::BITS - q.leading_zeros();
    (q_bits.div_ceil(base_bits) as usize).min(available)
}

/// Homomorphic product, relinearized back to two components.
pub fn multiply(
    ctx: &FvContext,
    evk: &EvaluationKey,
    a: &Ciphertext,
    b: &Ciphertext,
) -> Result<Ciphertext> {
    relinearize(evk, &tensor(ctx, a, b)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decrypt::{decrypt, noise_budget};
    use crate::encoding::{decode_i64, encode_i64};
    use crate::encrypt::encrypt;
    use crate::error::FvError;
    use crate::keygen::{keygen, KeyBundle};
    use crate::params::FvParams;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct Fixture {
        ctx: FvContext,
        keys: KeyBundle,
        rng: StdRng,
    }

    impl Fixture {
        fn new(seed: u64) -> Self {
            let ctx = FvParams::reference().build().unwrap();
            let mut rng = StdRng::seed_from_u64(seed);
            let keys = keygen(&mut rng, &ctx).unwrap();
            Fixture { ctx, keys, rng }
        }

        fn enc(&mut self, x: i64) -> Ciphertext {
            let pt = encode_i64(&self.ctx, x).unwrap();
            encrypt(&mut self.rng, &self.ctx, self.keys.public_key(), &pt).unwrap()
        }

        fn dec(&self, ct: &Ciphertext) -> i64 {
            let pt = decrypt(&self.ctx, self.keys.secret_key(), ct).unwrap();
            decode_i64(&self.ctx, &pt).unwrap()
        }
    }

    #[test]
    fn test_add_sub_negate() {
        let mut f = Fixture::new(11);
        let a = f.enc(123);
        let b = f.enc(-45);
        assert_eq!(f.dec(&add(&a, &b).unwrap()).rem_euclid(10), 8);
        assert_eq!(f.dec(&sub(&a, &b).unwrap()).rem_euclid(10), 8);
        assert_eq!(f.dec(&negate(&a)), -123);
    }

    #[test]
    fn test_plain_operations() {
        let mut f = Fixture::new(12);
        let a = f.enc(21);
        let two = encode_i64(&f.ctx, 2).unwrap();
        assert_eq!(f.dec(&add_plain(&f.ctx, &a, &two).unwrap()), 23);
        assert_eq!(f.dec(&multiply_plain(&f.ctx, &a, &two).unwrap()), 42);
        let evaluated = two.into_evaluation().unwrap();
        assert_eq!(f.dec(&add_plain(&f.ctx, &a, &evaluated).unwrap()), 23);
        // 21 * 3 = [3, 6]; digit 6 decodes as -4, so only the residue is exact
        let three = encode_i64(&f.ctx, 3).unwrap();
        assert_eq!(f.dec(&multiply_plain(&f.ctx, &a, &three).unwrap()).rem_euclid(10), 3);
    }

    #[test]
    fn test_multiply_small() {
        let mut f = Fixture::new(13);
        let a = f.enc(2);
        let b = f.enc(-2);
        let product = multiply(&f.ctx, f.keys.evaluation_key(), &a, &b).unwrap();
        assert_eq!(f.dec(&product), -4);
        assert!(noise_budget(&f.ctx, f.keys.secret_key(), &product).unwrap() >= 1);
    }

    #[test]
    fn test_tensor_then_relinearize() {
        let mut f = Fixture::new(14);
        let a = f.enc(12);
        let b = f.enc(2);
        let product = tensor(&f.ctx, &a, &b).unwrap();
        assert_eq!(product.key_id(), f.keys.id());
        assert!(product.terms().iter().all(|d| d.modulus() == f.ctx.cipher_modulus()));
        let relinearized = relinearize(f.keys.evaluation_key(), &product).unwrap();
        assert_eq!(f.dec(&relinearized), 24);
    }

    #[test]
    fn test_relinearization_skips_empty_digits() {
        // Q < 2^23 with w = 16: six digits, the other ten key parts stay unused
        assert_eq!(relinearization_digits(8_380_417, 4, 16), 6);
        assert_eq!(relinearization_digits(8_380_417, 8, 8), 3);
        assert_eq!(relinearization_digits(8_380_417, 1, 4), 4);

        let mut f = Fixture::new(16);
        let a = f.enc(7);
        let b = f.enc(-3);
        let product = tensor(&f.ctx, &a, &b).unwrap();
        let evk = f.keys.evaluation_key();

        // folding in every key part gives the same ciphertext
        let mut c0 = product.d0.clone();
        let mut c1 = product.d1.clone();
        let all_digits = product.d2.decompose(evk.base_bits(), evk.len());
        for (digit, (k0, k1)) in all_digits.iter().zip(evk.parts()) {
            c0 = c0.add(&digit.mul(k0).unwrap()).unwrap();
            c1 = c1.add(&digit.mul(k1).unwrap()).unwrap();
        }
        let relinearized = relinearize(evk, &product).unwrap();
        assert_eq!(relinearized.c0(), &c0);
        assert_eq!(relinearized.c1(), &c1);
        assert!(all_digits[6..].iter().all(|d| d.is_zero()));
        assert_eq!(f.dec(&relinearized).rem_euclid(10), 9);
    }

    #[test]
    fn test_mixed_bundles_rejected() {
        let mut f = Fixture::new(15);
        let a = f.enc(1);
        let other = keygen(&mut f.rng, &f.ctx).unwrap();
        let pt = encode_i64(&f.ctx, 1).unwrap();
        let b = encrypt(&mut f.rng, &f.ctx, other.public_key(), &pt).unwrap();
        assert!(matches!(add(&a, &b), Err(FvError::DomainMismatch(_))));
        assert!(matches!(
            multiply(&f.ctx, other.evaluation_key(), &a, &a),
            Err(FvError::DomainMismatch(_))
        ));
    }
}
