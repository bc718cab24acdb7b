//! Number Theoretic Transform (NTT) for negacyclic convolution.
//!
//! Uses the "pre-multiply by ψ^i" approach:
//! 1. Multiply a[i] by ψ^i (converts negacyclic to cyclic)
//! 2. Standard radix-2 DIT NTT using ω = ψ² (N-th root of unity)
//! 3. Pointwise multiply
//! 4. Standard INTT using ω⁻¹
//! 5. Multiply result[i] by ψ^{-i} and scale by N⁻¹
//!
//! Moduli are machine words; products go through u128.

use crate::error::{config_err, Result};

/// Modular multiplication: (a * b) mod m, via u128.
#[inline(always)]
pub const fn mulmod(a: u64, b: u64, m: u64) -> u64 {
    ((a as u128 * b as u128) % m as u128) as u64
}

/// Modular addition: (a + b) mod m, for a, b < m.
#[inline(always)]
pub const fn addmod(a: u64, b: u64, m: u64) -> u64 {
    let s = a as u128 + b as u128;
    (if s >= m as u128 { s - m as u128 } else { s }) as u64
}

/// Modular subtraction: (a - b) mod m, for a, b < m.
#[inline(always)]
pub const fn submod(a: u64, b: u64, m: u64) -> u64 {
    if a >= b { a - b } else { (a as u128 + m as u128 - b as u128) as u64 }
}

/// Modular exponentiation: base^exp mod m.
pub const fn powmod(base: u64, mut exp: u64, m: u64) -> u64 {
    let mut result: u64 = 1 % m;
    let mut b = base % m;
    while exp > 0 {
        if exp & 1 == 1 { result = mulmod(result, b, m); }
        b = mulmod(b, b, m);
        exp >>= 1;
    }
    result
}

/// Deterministic Miller-Rabin for 64-bit integers.
pub fn is_prime(n: u64) -> bool {
    const WITNESSES: [u64; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];
    if n < 2 {
        return false;
    }
    for &p in WITNESSES.iter() {
        if n % p == 0 {
            return n == p;
        }
    }
    let s = (n - 1).trailing_zeros();
    let d = (n - 1) >> s;
    'witness: for &a in WITNESSES.iter() {
        let mut x = powmod(a, d, n);
        if x == 1 || x == n - 1 {
            continue;
        }
        for _ in 1..s {
            x = mulmod(x, x, n);
            if x == n - 1 {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

/// Find a primitive 2N-th root of unity modulo prime p.
fn find_psi(p: u64, n: usize) -> Option<u64> {
    let two_n = 2 * n as u64;
    let exp = (p - 1) / two_n;
    for g in 2..p.min(1 << 16) {
        let w = powmod(g, exp, p);
        // Order is exactly 2N iff w^N ≡ -1 (mod p)
        if powmod(w, n as u64, p) == p - 1 {
            return Some(w);
        }
    }
    None
}

/// Bit-reverse an index in log2(N) bits.
fn bit_reverse(mut x: usize, bits: u32) -> usize {
    let mut r = 0;
    for _ in 0..bits {
        r = (r << 1) | (x & 1);
        x >>= 1;
    }
    r
}

/// Precomputed NTT tables for one (modulus, N) pair.
#[derive(Clone, Debug)]
pub struct NttTables {
    modulus: u64,
    n: usize,
    psi: u64,
    n_inv: u64,
    // Twiddle step per butterfly stage, forward and inverse
    omega_steps: Vec<u64>,
    omega_inv_steps: Vec<u64>,
    // psi_table[i] = psi^i for i = 0..N-1
    psi_table: Vec<u64>,
    psi_inv_table: Vec<u64>,
}

impl NttTables {
    /// Build tables, or fail when `p` does not admit a primitive 2N-th root.
    pub fn new(p: u64, n: usize) -> Result<Self> {
        if n == 0 || !n.is_power_of_two() {
            return Err(config_err!("ring degree {} is not a power of two", n));
        }
        if !is_prime(p) {
            return Err(config_err!("NTT modulus {} is not prime", p));
        }
        if (p - 1) % (2 * n as u64) != 0 {
            return Err(config_err!("NTT modulus {} is not 1 mod 2N = {}", p, 2 * n));
        }
        let psi = find_psi(p, n)
            .ok_or_else(|| config_err!("no primitive {}-th root of unity modulo {}", 2 * n, p))?;

        let psi_inv = powmod(psi, p - 2, p);
        let omega = mulmod(psi, psi, p); // ω = ψ²
        let omega_inv = powmod(omega, p - 2, p);
        let n_inv = powmod(n as u64, p - 2, p);

        let mut psi_table = vec![0u64; n];
        let mut psi_inv_table = vec![0u64; n];
        psi_table[0] = 1;
        psi_inv_table[0] = 1;
        for i in 1..n {
            psi_table[i] = mulmod(psi_table[i - 1], psi, p);
            psi_inv_table[i] = mulmod(psi_inv_table[i - 1], psi_inv, p);
        }

        let mut omega_steps = Vec::new();
        let mut omega_inv_steps = Vec::new();
        let mut len = 2;
        while len <= n {
            let step = (n / len) as u64;
            omega_steps.push(powmod(omega, step, p));
            omega_inv_steps.push(powmod(omega_inv, step, p));
            len *= 2;
        }

        Ok(NttTables {
            modulus: p,
            n,
            psi,
            n_inv,
            omega_steps,
            omega_inv_steps,
            psi_table,
            psi_inv_table,
        })
    }

    pub fn modulus(&self) -> u64 {
        self.modulus
    }

    pub fn degree(&self) -> usize {
        self.n
    }

    /// The primitive 2N-th root of unity ψ the tables were built from.
    pub fn psi(&self) -> u64 {
        self.psi
    }

    /// Forward negacyclic NTT.
    /// Transforms coefficient-domain polynomial to evaluation form.
    pub fn forward(&self, a: &mut [u64]) {
        debug_assert_eq!(a.len(), self.n);
        let p = self.modulus;
        // Step 1: Pre-multiply by ψ^i (converts negacyclic to cyclic)
        for (x, &w) in a.iter_mut().zip(self.psi_table.iter()) {
            *x = mulmod(*x, w, p);
        }
        // Step 2: Standard Cooley-Tukey DIT radix-2 NTT
        self.dit_cyclic(a, &self.omega_steps);
    }

    /// Inverse negacyclic NTT.
    /// Transforms evaluation form back to coefficient domain.
    pub fn inverse(&self, a: &mut [u64]) {
        debug_assert_eq!(a.len(), self.n);
        let p = self.modulus;
        // Step 1: Standard INTT (DIT using omega_inv)
        self.dit_cyclic(a, &self.omega_inv_steps);
        // Step 2: Scale by N^{-1} and post-multiply by ψ^{-i}
        for (x, &w) in a.iter_mut().zip(self.psi_inv_table.iter()) {
            *x = mulmod(mulmod(*x, self.n_inv, p), w, p);
        }
    }

    /// Standard DIT transform for cyclic convolution; `steps[k]` is the
    /// twiddle step of stage k (len = 2^(k+1)).
    fn dit_cyclic(&self, a: &mut [u64], steps: &[u64]) {
        let p = self.modulus;
        let n = self.n;
        let log_n = n.trailing_zeros();

        // Bit-reverse permutation
        for i in 0..n {
            let j = bit_reverse(i, log_n);
            if i < j { a.swap(i, j); }
        }

        // Butterfly stages
        let mut len = 2;
        let mut stage = 0;
        while len <= n {
            let half = len / 2;
            let w_step = steps[stage];
            for start in (0..n).step_by(len) {
                let mut w: u64 = 1;
                for j in 0..half {
                    let u = a[start + j];
                    let v = mulmod(a[start + j + half], w, p);
                    a[start + j] = addmod(u, v, p);
                    a[start + j + half] = submod(u, v, p);
                    w = mulmod(w, w_step, p);
                }
            }
            len *= 2;
            stage += 1;
        }
    }
}

/// Pointwise multiplication of two NTT-domain polynomials.
pub fn pointwise_mul(a: &[u64], b: &[u64], p: u64) -> Vec<u64> {
    a.iter().zip(b).map(|(&x, &y)| mulmod(x, y, p)).collect()
}

/// Pointwise addition.
pub fn pointwise_add(a: &[u64], b: &[u64], p: u64) -> Vec<u64> {
    a.iter().zip(b).map(|(&x, &y)| addmod(x, y, p)).collect()
}

/// Pointwise subtraction.
pub fn pointwise_sub(a: &[u64], b: &[u64], p: u64) -> Vec<u64> {
    a.iter().zip(b).map(|(&x, &y)| submod(x, y, p)).collect()
}

/// O(N²) product in Z_p[x]/(x^N+1). Used when p has no transform.
pub fn negacyclic_schoolbook(a: &[u64], b: &[u64], p: u64) -> Vec<u64> {
    let n = a.len();
    debug_assert_eq!(n, b.len());
    let mut c = vec![0u64; n];
    for i in 0..n {
        if a[i] == 0 {
            continue;
        }
        for j in 0..n {
            let prod = mulmod(a[i], b[j], p);
            let k = i + j;
            if k < n {
                c[k] = addmod(c[k], prod, p);
            } else {
                // x^N = -1
                c[k - n] = submod(c[k - n], prod, p);
            }
        }
    }
    c
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const Q: u64 = 8_380_417;
    const BIG_Q: u64 = 4_611_686_018_326_724_609;
    const N: usize = 32;

    #[test]
    fn test_primality() {
        assert!(is_prime(Q));
        assert!(is_prime(BIG_Q));
        assert!(!is_prime(10));
        assert!(!is_prime(1));
        assert!(is_prime(2));
        // Carmichael number
        assert!(!is_prime(561));
    }

    #[test]
    fn test_psi_order() {
        let tables = NttTables::new(Q, N).unwrap();
        let psi = tables.psi();
        assert_eq!(powmod(psi, N as u64, Q), Q - 1);
        assert_eq!(powmod(psi, 2 * N as u64, Q), 1);
    }

    #[test]
    fn test_rejects_unfriendly_moduli() {
        assert!(NttTables::new(10, N).is_err());
        // 97 is prime but 64 does not divide 96
        assert!(NttTables::new(97, N).is_err());
        assert!(NttTables::new(Q, 24).is_err());
    }

    #[test]
    fn test_ntt_roundtrip_q() {
        let tables = NttTables::new(Q, N).unwrap();
        let mut a = vec![0u64; N];
        a[0] = 1; a[1] = 2; a[2] = 3;
        let original = a.clone();
        tables.forward(&mut a);
        tables.inverse(&mut a);
        assert_eq!(a, original);
    }

    #[test]
    fn test_ntt_roundtrip_big_q() {
        let tables = NttTables::new(BIG_Q, N).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let mut a: Vec<u64> = (0..N).map(|_| rng.gen_range(0..BIG_Q)).collect();
            let original = a.clone();
            tables.forward(&mut a);
            tables.inverse(&mut a);
            assert_eq!(a, original);
        }
    }

    #[test]
    fn test_negacyclic_mul() {
        let tables = NttTables::new(Q, N).unwrap();
        let mut a = vec![0u64; N];
        a[0] = 1; a[1] = 1; // 1 + x
        let mut b = a.clone();
        tables.forward(&mut a);
        tables.forward(&mut b);
        let mut c = pointwise_mul(&a, &b, Q);
        tables.inverse(&mut c);
        // (1+x)^2 = 1 + 2x + x^2
        assert_eq!(c[0], 1);
        assert_eq!(c[1], 2);
        assert_eq!(c[2], 1);
        for i in 3..N { assert_eq!(c[i], 0, "nonzero at {}", i); }
    }

    #[test]
    fn test_negacyclic_wraparound() {
        let tables = NttTables::new(Q, N).unwrap();
        let mut a = vec![0u64; N];
        a[N - 1] = 1; // x^{N-1}
        let mut b = vec![0u64; N];
        b[1] = 1; // x
        tables.forward(&mut a);
        tables.forward(&mut b);
        let mut c = pointwise_mul(&a, &b, Q);
        tables.inverse(&mut c);
        // x^{N-1} * x = x^N = -1 mod (x^N+1)
        assert_eq!(c[0], Q - 1);
        for i in 1..N { assert_eq!(c[i], 0, "nonzero at {}", i); }
    }

    #[test]
    fn test_transform_matches_schoolbook() {
        let mut rng = StdRng::seed_from_u64(42);
        for &p in &[Q, BIG_Q] {
            let tables = NttTables::new(p, N).unwrap();
            for _ in 0..10 {
                let a: Vec<u64> = (0..N).map(|_| rng.gen_range(0..p)).collect();
                let b: Vec<u64> = (0..N).map(|_| rng.gen_range(0..p)).collect();
                let expected = negacyclic_schoolbook(&a, &b, p);
                let (mut fa, mut fb) = (a.clone(), b.clone());
                tables.forward(&mut fa);
                tables.forward(&mut fb);
                let mut c = pointwise_mul(&fa, &fb, p);
                tables.inverse(&mut c);
                assert_eq!(c, expected);
            }
        }
    }

    #[test]
    fn test_transform_is_linear() {
        let tables = NttTables::new(Q, N).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let a: Vec<u64> = (0..N).map(|_| rng.gen_range(0..Q)).collect();
        let b: Vec<u64> = (0..N).map(|_| rng.gen_range(0..Q)).collect();
        let mut sum = pointwise_add(&a, &b, Q);
        let (mut fa, mut fb) = (a, b);
        tables.forward(&mut fa);
        tables.forward(&mut fb);
        tables.forward(&mut sum);
        assert_eq!(sum, pointwise_add(&fa, &fb, Q));
        assert_eq!(pointwise_sub(&sum, &fb, Q), fa);
    }
}
