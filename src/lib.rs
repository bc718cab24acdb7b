//! Fan–Vercauteren somewhat-homomorphic encryption over Z_Q[x]/(x^N+1).
//!
//! Integers are encoded as balanced base-T digits, encrypted under a public
//! key, combined with [`evaluator::add`] and [`evaluator::multiply`] without
//! the secret key, then decrypted. Results are exact modulo T while the
//! noise budget lasts.
//!
//! # ⚠️ WARNING: NOT PRODUCTION READY ⚠️
//!
//! This is a research prototype. NOT audited, NOT constant-time,
//! NOT safe against side-channel attacks. Parameters are taken as given and
//! are not checked for cryptographic security.

pub mod bigint;
pub mod error;
pub mod params;
pub mod ntt;
pub mod poly;
pub mod sampling;
pub mod encoding;
pub mod keygen;
pub mod encrypt;
pub mod decrypt;
pub mod evaluator;

pub use bigint::Integer;
pub use decrypt::{decrypt, noise_budget};
pub use encoding::{decode, decode_i64, encode, encode_i64, Plaintext};
pub use encrypt::{encrypt, encrypt_zero, Ciphertext};
pub use error::{FvError, Result};
pub use keygen::{keygen, EvaluationKey, KeyBundle, KeyId, PublicKey, SecretKey};
pub use params::{FvContext, FvParams};
