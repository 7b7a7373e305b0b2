//! Deterministic xorshift128+ pseudo-random number generator.
//!
//! [`Prng`] is the only randomness source permitted in simulation code.
//! Its state is two 64-bit words, seeded from a `u32` through SplitMix64,
//! and every draw is a pure function of that state. The state round-trips
//! exactly through [`Prng::state`] / [`Prng::from_state`], which is how
//! snapshots capture and restore it.

use crate::error::MathError;
use crate::fp::Fp;
use crate::trig;
use crate::vec2::FpVec2;
use crate::vec3::FpVec3;

/// SplitMix64 increment (golden-ratio based).
const SPLITMIX_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

/// Deterministic xorshift128+ generator.
///
/// # Examples
///
/// ```
/// use cadence_fixed::Prng;
///
/// let mut a = Prng::seeded(12345);
/// let mut b = Prng::seeded(12345);
/// assert_eq!(a.next_u64(), b.next_u64());
///
/// let saved = a.state();
/// let draw = a.next_u64();
/// let mut c = Prng::from_state(saved);
/// assert_eq!(c.next_u64(), draw);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prng {
    s0: u64,
    s1: u64,
}

impl Prng {
    /// Seed from a 32-bit value via two SplitMix64 steps.
    pub fn seeded(seed: u32) -> Self {
        let mut x = seed as u64;
        let s0 = splitmix64(&mut x);
        let s1 = splitmix64(&mut x);
        // xorshift128+ has a single degenerate state; SplitMix64 cannot
        // produce it from sequential outputs, but the constructor still
        // guards the invariant.
        if s0 == 0 && s1 == 0 {
            Prng {
                s0: SPLITMIX_GAMMA,
                s1: 1,
            }
        } else {
            Prng { s0, s1 }
        }
    }

    /// Reconstruct from a saved `(s0, s1)` state pair.
    pub fn from_state(state: (u64, u64)) -> Self {
        Prng {
            s0: state.0,
            s1: state.1,
        }
    }

    /// The raw `(s0, s1)` state pair, for snapshotting.
    pub fn state(&self) -> (u64, u64) {
        (self.s0, self.s1)
    }

    /// The next 64 random bits.
    pub fn next_u64(&mut self) -> u64 {
        let mut s1 = self.s0;
        let s0 = self.s1;
        let result = s0.wrapping_add(s1);
        self.s0 = s0;
        s1 ^= s1 << 23;
        self.s1 = s1 ^ s0 ^ (s1 >> 18) ^ (s0 >> 5);
        result
    }

    /// A non-negative `i32`.
    pub fn next_int(&mut self) -> i32 {
        (self.next_u64() >> 33) as i32
    }

    /// An integer in `[min, max)`, or `min` when the range is empty.
    pub fn next_int_range(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        let span = (max as i64 - min as i64) as u64;
        min + (self.next_u64() % span) as i32
    }

    /// A uniformly random boolean.
    pub fn next_bool(&mut self) -> bool {
        self.next_u64() & 1 == 1
    }

    /// True with probability `pct` percent (clamped to `[0, 100]`).
    pub fn next_chance(&mut self, pct: u32) -> bool {
        let pct = pct.min(100) as i32;
        self.next_int_range(0, 100) < pct
    }

    /// A fixed-point value in `[0, 1)` — the low 32 bits as raw fraction.
    pub fn next_fp(&mut self) -> Fp {
        Fp::from_raw((self.next_u64() & 0xFFFF_FFFF) as i64)
    }

    /// A fixed-point value in `[-1, 1)`.
    pub fn next_fp_signed(&mut self) -> Fp {
        self.next_fp() * Fp::TWO - Fp::ONE
    }

    /// Pick an index with probability proportional to `weights[i]`.
    ///
    /// # Errors
    ///
    /// Returns [`MathError::InvalidRange`] if `weights` is empty, any
    /// weight is negative, or the total is zero.
    pub fn next_weighted(&mut self, weights: &[Fp]) -> Result<usize, MathError> {
        if weights.is_empty() {
            return Err(MathError::InvalidRange);
        }
        let mut total = Fp::ZERO;
        for &w in weights {
            if w < Fp::ZERO {
                return Err(MathError::InvalidRange);
            }
            total += w;
        }
        if total == Fp::ZERO {
            return Err(MathError::InvalidRange);
        }
        let threshold = self.next_fp() * total;
        let mut cumulative = Fp::ZERO;
        for (i, &w) in weights.iter().enumerate() {
            cumulative += w;
            if threshold < cumulative {
                return Ok(i);
            }
        }
        // Rounding in the fixed-point product can leave the threshold at
        // the very top of the range; the last non-zero weight absorbs it.
        Ok(weights.len() - 1)
    }

    /// A point uniformly inside the unit circle, by rejection sampling.
    pub fn inside_unit_circle(&mut self) -> FpVec2 {
        loop {
            let candidate = FpVec2::new(self.next_fp_signed(), self.next_fp_signed());
            if candidate.sqr_magnitude() <= Fp::ONE {
                return candidate;
            }
        }
    }

    /// A point uniformly inside the unit sphere, by rejection sampling.
    pub fn inside_unit_sphere(&mut self) -> FpVec3 {
        loop {
            let candidate = FpVec3::new(
                self.next_fp_signed(),
                self.next_fp_signed(),
                self.next_fp_signed(),
            );
            if candidate.sqr_magnitude() <= Fp::ONE {
                return candidate;
            }
        }
    }

    /// A unit vector with uniformly random planar direction.
    pub fn direction_2d(&mut self) -> FpVec2 {
        let theta = self.next_fp() * Fp::TWO_PI;
        let (sin, cos) = trig::sin_cos(theta);
        FpVec2::new(cos, sin)
    }

    /// A unit vector uniformly distributed on the sphere.
    ///
    /// Samples `z ∈ [-1, 1]` and an azimuth `θ ∈ [0, 2π)`; the ring
    /// radius `sin φ = sqrt(1 - z²)` makes the distribution uniform.
    pub fn direction_3d(&mut self) -> FpVec3 {
        let z = self.next_fp_signed();
        let theta = self.next_fp() * Fp::TWO_PI;
        let ring = (Fp::ONE - z * z).max(Fp::ZERO).sqrt().unwrap_or(Fp::ZERO);
        let (sin, cos) = trig::sin_cos(theta);
        FpVec3::new(ring * cos, ring * sin, z)
    }

    /// In-place Fisher–Yates shuffle.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.next_int_range(0, i as i32 + 1) as usize;
            items.swap(i, j);
        }
    }
}

/// One SplitMix64 step, advancing `x` and returning the mixed output.
fn splitmix64(x: &mut u64) -> u64 {
    *x = x.wrapping_add(SPLITMIX_GAMMA);
    let mut z = *x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
