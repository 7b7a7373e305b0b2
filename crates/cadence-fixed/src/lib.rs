//! Deterministic fixed-point arithmetic for the cadence simulation core.
//!
//! This is the leaf crate of the cadence workspace. Everything the
//! simulation computes with flows through the types defined here:
//! the 32.32 fixed-point scalar [`Fp`], the vector types [`FpVec2`] and
//! [`FpVec3`], integer-only trigonometry, and the [`Prng`] deterministic
//! random number generator.
//!
//! # Determinism contract
//!
//! Every operation in this crate is a pure function of raw integer inputs.
//! There is no floating point, no platform-dependent widening, and no
//! hidden state. Two machines evaluating the same expression over the same
//! raw bits produce the same raw bits, which is the foundation the whole
//! lockstep model rests on.
//!
//! Multiplication and division widen to `i128` internally and saturate to
//! the `i64` raw range on overflow; saturation is itself deterministic and
//! exercised by tests. Division by zero and square roots of negative
//! values are the only fallible operations, reported as [`MathError`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod fp;
pub mod rng;
pub mod trig;
pub mod vec2;
pub mod vec3;

pub use error::MathError;
pub use fp::Fp;
pub use rng::Prng;
pub use vec2::FpVec2;
pub use vec3::FpVec3;
