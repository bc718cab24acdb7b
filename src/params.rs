//! Scheme parameters and the frozen evaluation context.

use std::sync::Arc;

use rand_distr::Normal;

use crate::bigint::Integer;
use crate::error::{config_err, Result};
use crate::poly::Ring;

/// Gaussian standard deviation for keygen and encryption noise.
pub const SIGMA: f64 = 3.2;

/// Error samples further than this many standard deviations from zero are
/// redrawn, so the error distribution is bounded.
pub const GAUSSIAN_TAIL_CUT: f64 = 6.0;

/// Relinearization digits are 2^DEFAULT_DECOMPOSITION_BITS wide (w = 16).
pub const DEFAULT_DECOMPOSITION_BITS: u32 = 4;

/// Reference parameter set: N = 32, T = 10, Q = 8380417.
pub const REFERENCE_N: usize = 32;
pub const REFERENCE_T: u64 = 10;
/// Q = 2^23 - 2^13 + 1, prime, ≡ 1 (mod 2^13).
pub const REFERENCE_Q: u64 = 8_380_417;
/// BigQ = 2^25 * 47189 * 2912521 + 1, prime, > Q².
pub const REFERENCE_BIG_Q: u64 = 4_611_686_018_326_724_609;

/// User-facing parameters. Validated and frozen by [`FvParams::build`].
#[derive(Clone, Debug)]
pub struct FvParams {
    /// Ring degree N (power of two)
    pub n: usize,
    /// Plaintext modulus T
    pub t: Integer,
    /// Ciphertext modulus Q
    pub q: Integer,
    /// Auxiliary multiplication modulus, must exceed N·Q²
    pub big_q: Integer,
    /// Error standard deviation
    pub sigma: f64,
    /// log2 of the relinearization base w
    pub decomposition_bits: u32,
    /// Number of evaluation-key pairs; derived from BigQ and w when `None`
    pub eva_size: Option<usize>,
}

impl FvParams {
    pub fn new(n: usize, t: Integer, q: Integer, big_q: Integer) -> Self {
        FvParams {
            n,
            t,
            q,
            big_q,
            sigma: SIGMA,
            decomposition_bits: DEFAULT_DECOMPOSITION_BITS,
            eva_size: None,
        }
    }

    /// The N=32, T=10, Q=8380417, BigQ=4611686018326724609 set.
    pub fn reference() -> Self {
        FvParams::new(
            REFERENCE_N,
            Integer::from(REFERENCE_T),
            Integer::from(REFERENCE_Q),
            Integer::from(REFERENCE_BIG_Q),
        )
    }

    pub fn with_sigma(mut self, sigma: f64) -> Self {
        self.sigma = sigma;
        self
    }

    pub fn with_decomposition_bits(mut self, bits: u32) -> Self {
        self.decomposition_bits = bits;
        self
    }

    pub fn with_eva_size(mut self, eva_size: usize) -> Self {
        self.eva_size = Some(eva_size);
        self
    }

    /// Validate and precompute everything, producing an immutable context.
    pub fn build(&self) -> Result<FvContext> {
        let n = self.n;
        if n == 0 || !n.is_power_of_two() {
            return Err(config_err!("N = {} is not a power of two", n));
        }
        let t = word(&self.t, "T")?;
        let q = word(&self.q, "Q")?;
        let big_q = word(&self.big_q, "BigQ")?;
        if t < 2 {
            return Err(config_err!("T = {} must be at least 2", t));
        }
        if t >= q {
            return Err(config_err!("T = {} must be smaller than Q = {}", t, q));
        }
        let q_squared = &self.q * &self.q;
        if q_squared >= self.big_q {
            return Err(config_err!("BigQ = {} must exceed Q² = {}", self.big_q, q_squared));
        }
        // centered tensor terms reach N·Q²/2 in magnitude and must not wrap mod BigQ
        let tensor_bound = Integer::from(n as u64) * &q_squared;
        if tensor_bound >= self.big_q {
            return Err(config_err!(
                "BigQ = {} must exceed N·Q² = {} for exact ciphertext products",
                self.big_q, tensor_bound
            ));
        }
        if !self.sigma.is_finite() || self.sigma <= 0.0 {
            return Err(config_err!("sigma = {} must be finite and positive", self.sigma));
        }
        let error_distribution = Normal::new(0.0, self.sigma)
            .map_err(|e| config_err!("sigma = {}: {}", self.sigma, e))?;

        let bits = self.decomposition_bits;
        if !(1..=32).contains(&bits) {
            return Err(config_err!("decomposition base 2^{} outside 2^1..=2^32", bits));
        }
        let base = Integer::from(1u64 << bits);
        let eva_size = match self.eva_size {
            Some(size) => {
                let reach = base.pow(size as u32);
                if reach < self.big_q {
                    return Err(config_err!(
                        "EvaSize = {} too small: w^EvaSize = {} < BigQ = {}",
                        size, reach, self.big_q
                    ));
                }
                size
            }
            None => {
                let mut size = 0usize;
                let mut reach = Integer::one();
                while reach < self.big_q {
                    reach *= &base;
                    size += 1;
                }
                size
            }
        };

        let delta = self.q.div_floor(&self.t)?.to_u64()?;

        Ok(FvContext {
            n,
            t: self.t.clone(),
            q: self.q.clone(),
            big_q: self.big_q.clone(),
            delta,
            ring_t: Arc::new(Ring::new(n, t)?),
            ring_q: Arc::new(Ring::new(n, q)?),
            ring_big_q: Arc::new(Ring::new(n, big_q)?),
            sigma: self.sigma,
            error_distribution,
            decomposition_bits: bits,
            eva_size,
        })
    }
}

fn word(value: &Integer, name: &str) -> Result<u64> {
    value
        .to_u64()
        .map_err(|_| config_err!("{} = {} must be a positive 64-bit modulus", name, value))
}

/// Frozen parameters plus the per-modulus rings (and their NTT tables).
///
/// Built once, then shared read-only; it is `Send + Sync`.
#[derive(Debug)]
pub struct FvContext {
    n: usize,
    t: Integer,
    q: Integer,
    big_q: Integer,
    delta: u64,
    ring_t: Arc<Ring>,
    ring_q: Arc<Ring>,
    ring_big_q: Arc<Ring>,
    sigma: f64,
    error_distribution: Normal<f64>,
    decomposition_bits: u32,
    eva_size: usize,
}

impl FvContext {
    /// Context with default sigma and decomposition base.
    pub fn new(n: usize, t: Integer, q: Integer, big_q: Integer) -> Result<Self> {
        FvParams::new(n, t, q, big_q).build()
    }

    pub fn degree(&self) -> usize {
        self.n
    }

    pub fn t(&self) -> &Integer {
        &self.t
    }

    pub fn q(&self) -> &Integer {
        &self.q
    }

    pub fn big_q(&self) -> &Integer {
        &self.big_q
    }

    pub fn plain_modulus(&self) -> u64 {
        self.ring_t.modulus()
    }

    pub fn cipher_modulus(&self) -> u64 {
        self.ring_q.modulus()
    }

    /// Δ = floor(Q / T).
    pub fn delta(&self) -> u64 {
        self.delta
    }

    pub fn ring_t(&self) -> &Arc<Ring> {
        &self.ring_t
    }

    pub fn ring_q(&self) -> &Arc<Ring> {
        &self.ring_q
    }

    pub fn ring_big_q(&self) -> &Arc<Ring> {
        &self.ring_big_q
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    pub fn error_distribution(&self) -> &Normal<f64> {
        &self.error_distribution
    }

    pub fn decomposition_bits(&self) -> u32 {
        self.decomposition_bits
    }

    /// Number of evaluation-key pairs (EvaSize).
    pub fn eva_size(&self) -> usize {
        self.eva_size
    }
}
