//! Decryption and noise measurement.
//!
//! Decryption computes raw = c0 + c1·s (mod Q) and scales it by T/Q with
//! rounding. It is only correct while the accumulated noise stays below
//! Δ/2. Past that point the result is a wrong plaintext that looks exactly
//! like a right one: nothing here detects it. Callers holding the secret
//! key can inspect the remaining headroom with [`noise_budget`].

use crate::encoding::Plaintext;
use crate::encrypt::Ciphertext;
use crate::error::Result;
use crate::keygen::SecretKey;
use crate::params::FvContext;
use crate::poly::Poly;

/// Recover the plaintext of `ct`.
pub fn decrypt(ctx: &FvContext, sk: &SecretKey, ct: &Ciphertext) -> Result<Plaintext> {
    let raw = phase(sk, ct)?;
    let message = raw.switch_modulus(ctx.ring_t())?;
    Plaintext::from_message(ctx, message.coeffs())
}

/// Remaining noise headroom in bits: floor(log2((Δ/2) / |v|)) where v is
/// the largest centered noise coefficient, or 0 once decryption is no
/// longer guaranteed.
pub fn noise_budget(ctx: &FvContext, sk: &SecretKey, ct: &Ciphertext) -> Result<u32> {
    let raw = phase(sk, ct)?;
    let message = raw.switch_modulus(ctx.ring_t())?;
    let expected = Poly::from_coeffs(ctx.ring_q(), message.coeffs().to_vec())?.scale(ctx.delta());
    let noise = raw.sub(&expected)?.infinity_norm();
    let half_delta = ctx.delta() / 2;
    Ok(if noise >= half_delta {
        0
    } else {
        (half_delta / noise.max(1)).ilog2()
    })
}

/// c0 + c1·s, after checking `ct` was encrypted under this key.
fn phase(sk: &SecretKey, ct: &Ciphertext) -> Result<Poly> {
    sk.id().ensure_same(ct.key_id(), "ciphertext")?;
    ct.c0().add(&ct.c1().mul(sk.poly())?)
}
