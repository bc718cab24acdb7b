//! Encryption under a public key.

use rand::{CryptoRng, Rng};

use crate::encoding::Plaintext;
use crate::error::Result;
use crate::keygen::{KeyId, PublicKey};
use crate::params::FvContext;
use crate::poly::Poly;
use crate::sampling::{sample_gaussian, sample_ternary};

/// A two-component ciphertext modulo Q, tagged with the key bundle it was
/// encrypted under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ciphertext {
    pub(crate) key_id: KeyId,
    pub(crate) c0: Poly,
    pub(crate) c1: Poly,
}

impl Ciphertext {
    pub fn key_id(&self) -> KeyId {
        self.key_id
    }

    pub fn c0(&self) -> &Poly {
        &self.c0
    }

    pub fn c1(&self) -> &Poly {
        &self.c1
    }
}

/// Encrypt a plaintext:
///   c0 = p0·u + e1 + Δ·m,  c1 = p1·u + e2   (mod Q)
/// with fresh ternary u and fresh errors e1, e2 on every call.
pub fn encrypt<R: Rng + CryptoRng>(
    rng: &mut R,
    ctx: &FvContext,
    pk: &PublicKey,
    plaintext: &Plaintext,
) -> Result<Ciphertext> {
    let m = plaintext.to_coefficient()?;
    let scaled = m.scale(ctx.delta());
    let (c0, c1) = mask(rng, ctx, pk)?;
    Ok(Ciphertext { key_id: pk.id(), c0: c0.add(&scaled)?, c1 })
}

/// A fresh encryption of zero.
pub fn encrypt_zero<R: Rng + CryptoRng>(
    rng: &mut R,
    ctx: &FvContext,
    pk: &PublicKey,
) -> Result<Ciphertext> {
    let (c0, c1) = mask(rng, ctx, pk)?;
    Ok(Ciphertext { key_id: pk.id(), c0, c1 })
}

fn mask<R: Rng + CryptoRng>(rng: &mut R, ctx: &FvContext, pk: &PublicKey) -> Result<(Poly, Poly)> {
    let ring = ctx.ring_q();
    let u = sample_ternary(rng, ring);
    let e1 = sample_gaussian(rng, ring, ctx.error_distribution());
    let e2 = sample_gaussian(rng, ring, ctx.error_distribution());

    let (c0, c1) = if ring.has_transform() {
        let u_hat = u.forward()?;
        (
            pk.p0().forward()?.mul(&u_hat)?.inverse()?,
            pk.p1().forward()?.mul(&u_hat)?.inverse()?,
        )
    } else {
        (pk.p0().mul(&u)?, pk.p1().mul(&u)?)
    };
    Ok((c0.add(&e1)?, c1.add(&e2)?))
}
