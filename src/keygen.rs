//! Key generation.

use std::fmt;

use rand::{CryptoRng, Rng};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::{mismatch_err, Result};
use crate::ntt::mulmod;
use crate::params::FvContext;
use crate::poly::Poly;
use crate::sampling::{sample_gaussian, sample_ternary, sample_uniform};

/// Random tag shared by every piece of one key bundle and by every
/// ciphertext encrypted under it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeyId(u64);

impl KeyId {
    /// Fail with `DomainMismatch` unless both sides come from one bundle.
    pub fn ensure_same(self, other: KeyId, what: &str) -> Result<()> {
        if self != other {
            return Err(mismatch_err!("{} belongs to key {:#x}, expected {:#x}", what, other.0, self.0));
        }
        Ok(())
    }
}

/// Secret key: a ternary polynomial s modulo Q.
///
/// Zeroized on drop to prevent secret material from lingering in memory.
/// Does not implement `Debug` to prevent accidental logging of secrets.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey {
    #[zeroize(skip)]
    id: KeyId,
    s: Poly,
}

impl SecretKey {
    pub fn id(&self) -> KeyId {
        self.id
    }

    pub fn poly(&self) -> &Poly {
        &self.s
    }
}

/// Public key: (p0, p1) = (-(a·s + e), a) modulo Q.
#[derive(Clone, Debug)]
pub struct PublicKey {
    id: KeyId,
    p0: Poly,
    p1: Poly,
}

impl PublicKey {
    pub fn id(&self) -> KeyId {
        self.id
    }

    pub fn p0(&self) -> &Poly {
        &self.p0
    }

    pub fn p1(&self) -> &Poly {
        &self.p1
    }
}

/// Relinearization key: pair i is (-(a_i·s + e_i) + w^i·s², a_i) modulo Q,
/// for i in 0..EvaSize and w = 2^base_bits.
#[derive(Clone, Debug)]
pub struct EvaluationKey {
    id: KeyId,
    base_bits: u32,
    parts: Vec<(Poly, Poly)>,
}

impl EvaluationKey {
    pub fn id(&self) -> KeyId {
        self.id
    }

    /// log2 of the decomposition base w.
    pub fn base_bits(&self) -> u32 {
        self.base_bits
    }

    /// EvaSize.
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn parts(&self) -> &[(Poly, Poly)] {
        &self.parts
    }
}

/// Secret, public and evaluation keys generated together.
#[derive(Clone)]
pub struct KeyBundle {
    secret: SecretKey,
    public: PublicKey,
    evaluation: EvaluationKey,
}

impl KeyBundle {
    pub fn id(&self) -> KeyId {
        self.public.id
    }

    pub fn secret_key(&self) -> &SecretKey {
        &self.secret
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    pub fn evaluation_key(&self) -> &EvaluationKey {
        &self.evaluation
    }

    pub fn eva_size(&self) -> usize {
        self.evaluation.len()
    }
}

impl fmt::Debug for KeyBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyBundle")
            .field("id", &self.id())
            .field("eva_size", &self.eva_size())
            .finish_non_exhaustive()
    }
}

/// Fresh ternary secret with a new key id.
pub fn generate_secret_key<R: Rng + CryptoRng>(rng: &mut R, ctx: &FvContext) -> SecretKey {
    SecretKey { id: KeyId(rng.gen()), s: sample_ternary(rng, ctx.ring_q()) }
}

pub fn generate_public_key<R: Rng + CryptoRng>(
    rng: &mut R,
    ctx: &FvContext,
    sk: &SecretKey,
) -> Result<PublicKey> {
    let (p0, p1) = mask_secret(rng, ctx, sk)?;
    Ok(PublicKey { id: sk.id, p0, p1 })
}

pub fn generate_evaluation_key<R: Rng + CryptoRng>(
    rng: &mut R,
    ctx: &FvContext,
    sk: &SecretKey,
) -> Result<EvaluationKey> {
    let q = ctx.cipher_modulus();
    let base_bits = ctx.decomposition_bits();
    let w = (1u64 << base_bits) % q;
    let s_squared = Zeroizing::new(sk.s.mul(&sk.s)?);

    let mut parts = Vec::with_capacity(ctx.eva_size());
    let mut w_pow = 1 % q;
    for _ in 0..ctx.eva_size() {
        let (masked, a) = mask_secret(rng, ctx, sk)?;
        let hint = Zeroizing::new(s_squared.scale(w_pow));
        parts.push((masked.add(&hint)?, a));
        w_pow = mulmod(w_pow, w, q);
    }
    Ok(EvaluationKey { id: sk.id, base_bits, parts })
}

/// Generate a key bundle.
pub fn keygen<R: Rng + CryptoRng>(rng: &mut R, ctx: &FvContext) -> Result<KeyBundle> {
    let secret = generate_secret_key(rng, ctx);
    let public = generate_public_key(rng, ctx, &secret)?;
    let evaluation = generate_evaluation_key(rng, ctx, &secret)?;
    Ok(KeyBundle { secret, public, evaluation })
}

/// (-(a·s + e), a) with fresh uniform a and error e.
fn mask_secret<R: Rng + CryptoRng>(
    rng: &mut R,
    ctx: &FvContext,
    sk: &SecretKey,
) -> Result<(Poly, Poly)> {
    let a = sample_uniform(rng, ctx.ring_q());
    let e = sample_gaussian(rng, ctx.ring_q(), ctx.error_distribution());
    let masked = a.mul(&sk.s)?.add(&e)?.neg();
    Ok((masked, a))
}
