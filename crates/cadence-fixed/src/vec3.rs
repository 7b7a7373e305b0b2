//! Three-dimensional fixed-point vector.

use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use crate::fp::{Fp, FRACTIONAL_BITS};
use crate::trig;

/// A 3D vector of [`Fp`] components.
///
/// Same arithmetic discipline as [`FpVec2`](crate::FpVec2): componentwise
/// operations saturate, and product sums accumulate in the widened
/// 128-bit domain before the renormalization shift.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FpVec3 {
    /// X component.
    pub x: Fp,
    /// Y component.
    pub y: Fp,
    /// Z component.
    pub z: Fp,
}

impl FpVec3 {
    /// The zero vector.
    pub const ZERO: FpVec3 = FpVec3 {
        x: Fp::ZERO,
        y: Fp::ZERO,
        z: Fp::ZERO,
    };
    /// The all-ones vector.
    pub const ONE: FpVec3 = FpVec3 {
        x: Fp::ONE,
        y: Fp::ONE,
        z: Fp::ONE,
    };
    /// The unit vector along +Y.
    pub const UP: FpVec3 = FpVec3 {
        x: Fp::ZERO,
        y: Fp::ONE,
        z: Fp::ZERO,
    };
    /// The unit vector along +Z.
    pub const FORWARD: FpVec3 = FpVec3 {
        x: Fp::ZERO,
        y: Fp::ZERO,
        z: Fp::ONE,
    };

    /// Construct from components.
    #[inline]
    pub const fn new(x: Fp, y: Fp, z: Fp) -> Self {
        FpVec3 { x, y, z }
    }

    /// Construct from integer components.
    #[inline]
    pub const fn from_ints(x: i32, y: i32, z: i32) -> Self {
        FpVec3 {
            x: Fp::from_int(x),
            y: Fp::from_int(y),
            z: Fp::from_int(z),
        }
    }

    /// Construct from raw 32.32 components.
    #[inline]
    pub const fn from_raw(x: i64, y: i64, z: i64) -> Self {
        FpVec3 {
            x: Fp::from_raw(x),
            y: Fp::from_raw(y),
            z: Fp::from_raw(z),
        }
    }

    /// Dot product, accumulated in the widened domain.
    pub fn dot(self, other: FpVec3) -> Fp {
        let sum = self.x.raw() as i128 * other.x.raw() as i128
            + self.y.raw() as i128 * other.y.raw() as i128
            + self.z.raw() as i128 * other.z.raw() as i128;
        Fp::from_raw(saturate_shifted(sum))
    }

    /// Cross product.
    pub fn cross(self, other: FpVec3) -> FpVec3 {
        FpVec3 {
            x: widened_diff(self.y, other.z, self.z, other.y),
            y: widened_diff(self.z, other.x, self.x, other.z),
            z: widened_diff(self.x, other.y, self.y, other.x),
        }
    }

    /// Squared length, accumulated in the widened domain.
    #[inline]
    pub fn sqr_magnitude(self) -> Fp {
        self.dot(self)
    }

    /// Length of the vector.
    pub fn magnitude(self) -> Fp {
        self.sqr_magnitude().sqrt().unwrap_or(Fp::ZERO)
    }

    /// Unit vector in the same direction, or zero for the zero vector.
    pub fn normalized(self) -> FpVec3 {
        let mag = self.magnitude();
        match (
            self.x.checked_div(mag),
            self.y.checked_div(mag),
            self.z.checked_div(mag),
        ) {
            (Ok(x), Ok(y), Ok(z)) => FpVec3 { x, y, z },
            _ => FpVec3::ZERO,
        }
    }

    /// Distance between two points.
    #[inline]
    pub fn distance(self, other: FpVec3) -> Fp {
        (other - self).magnitude()
    }

    /// Linear interpolation with unclamped `t`.
    pub fn lerp(self, to: FpVec3, t: Fp) -> FpVec3 {
        FpVec3 {
            x: self.x.lerp(to.x, t),
            y: self.y.lerp(to.y, t),
            z: self.z.lerp(to.z, t),
        }
    }

    /// Step from `self` toward `target` by at most `max_delta`.
    ///
    /// Arrives exactly at `target` once the remaining distance is within
    /// `max_delta`.
    pub fn move_towards(self, target: FpVec3, max_delta: Fp) -> FpVec3 {
        let offset = target - self;
        let dist = offset.magnitude();
        if dist <= max_delta || dist == Fp::ZERO {
            return target;
        }
        // Divide last so exact integer geometry stays exact; dist > 0
        // here, so the divisions cannot fail.
        let step = FpVec3 {
            x: (offset.x * max_delta).checked_div(dist).unwrap_or(Fp::ZERO),
            y: (offset.y * max_delta).checked_div(dist).unwrap_or(Fp::ZERO),
            z: (offset.z * max_delta).checked_div(dist).unwrap_or(Fp::ZERO),
        };
        self + step
    }

    /// Unsigned angle between two vectors in radians, `[0, π]`.
    ///
    /// Returns zero if either vector has zero magnitude.
    pub fn angle(self, other: FpVec3) -> Fp {
        let denom = self.magnitude() * other.magnitude();
        match self.dot(other).checked_div(denom) {
            Ok(cosine) => trig::acos(cosine),
            Err(_) => Fp::ZERO,
        }
    }

    /// Clamp the vector's magnitude to at most `max`.
    pub fn clamp_magnitude(self, max: Fp) -> FpVec3 {
        let mag = self.magnitude();
        if mag <= max {
            return self;
        }
        match max.checked_div(mag) {
            Ok(scale) => self * scale,
            Err(_) => FpVec3::ZERO,
        }
    }

    /// Reflect off a surface with unit normal `normal`.
    pub fn reflect(self, normal: FpVec3) -> FpVec3 {
        self - normal * (Fp::TWO * self.dot(normal))
    }

    /// Project onto `onto`; zero if `onto` is the zero vector.
    pub fn project(self, onto: FpVec3) -> FpVec3 {
        match self.dot(onto).checked_div(onto.dot(onto)) {
            Ok(scale) => onto * scale,
            Err(_) => FpVec3::ZERO,
        }
    }
}

/// `a*b - c*d` in the widened domain, shifted and saturated.
#[inline]
fn widened_diff(a: Fp, b: Fp, c: Fp, d: Fp) -> Fp {
    let sum = a.raw() as i128 * b.raw() as i128 - c.raw() as i128 * d.raw() as i128;
    Fp::from_raw(saturate_shifted(sum))
}

/// Shift a widened product sum back to 32.32 and saturate.
#[inline]
fn saturate_shifted(sum: i128) -> i64 {
    let shifted = sum >> FRACTIONAL_BITS;
    if shifted > i64::MAX as i128 {
        i64::MAX
    } else if shifted < i64::MIN as i128 {
        i64::MIN
    } else {
        shifted as i64
    }
}

impl Add for FpVec3 {
    type Output = FpVec3;
    #[inline]
    fn add(self, rhs: FpVec3) -> FpVec3 {
        FpVec3 {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
            z: self.z + rhs.z,
        }
    }
}

impl Sub for FpVec3 {
    type Output = FpVec3;
    #[inline]
    fn sub(self, rhs: FpVec3) -> FpVec3 {
        FpVec3 {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
            z: self.z - rhs.z,
        }
    }
}

impl Neg for FpVec3 {
    type Output = FpVec3;
    #[inline]
    fn neg(self) -> FpVec3 {
        FpVec3 {
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }
}

impl Mul<Fp> for FpVec3 {
    type Output = FpVec3;
    #[inline]
    fn mul(self, rhs: Fp) -> FpVec3 {
        FpVec3 {
            x: self.x * rhs,
            y: self.y * rhs,
            z: self.z * rhs,
        }
    }
}

impl Div<Fp> for FpVec3 {
    type Output = FpVec3;

    /// Componentwise scalar division.
    ///
    /// # Panics
    ///
    /// Panics if `rhs` is zero, like scalar [`Fp`] division.
    #[inline]
    fn div(self, rhs: Fp) -> FpVec3 {
        FpVec3 {
            x: self.x / rhs,
            y: self.y / rhs,
            z: self.z / rhs,
        }
    }
}

impl AddAssign for FpVec3 {
    #[inline]
    fn add_assign(&mut self, rhs: FpVec3) {
        *self = *self + rhs;
    }
}

impl SubAssign for FpVec3 {
    #[inline]
    fn sub_assign(&mut self, rhs: FpVec3) {
        *self = *self - rhs;
    }
}

impl fmt::Display for FpVec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: i32, y: i32, z: i32) -> FpVec3 {
        FpVec3::from_ints(x, y, z)
    }

    #[test]
    fn componentwise_arithmetic() {
        assert_eq!(v(1, 2, 3) + v(4, 5, 6), v(5, 7, 9));
        assert_eq!(v(4, 5, 6) - v(1, 2, 3), v(3, 3, 3));
        assert_eq!(v(1, 2, 3) * Fp::from_int(2), v(2, 4, 6));
        assert_eq!(v(2, 4, 6) / Fp::from_int(2), v(1, 2, 3));
    }

    #[test]
    fn dot_orthogonal_and_parallel() {
        assert_eq!(v(1, 0, 0).dot(v(0, 1, 0)), Fp::ZERO);
        assert_eq!(v(2, 3, 4).dot(v(2, 3, 4)), Fp::from_int(29));
    }

    #[test]
    fn cross_follows_right_hand_rule() {
        let x = v(1, 0, 0);
        let y = v(0, 1, 0);
        let z = v(0, 0, 1);
        assert_eq!(x.cross(y), z);
        assert_eq!(y.cross(z), x);
        assert_eq!(z.cross(x), y);
        assert_eq!(y.cross(x), -z);
    }

    #[test]
    fn cross_with_self_is_zero() {
        let a = v(3, -5, 7);
        assert_eq!(a.cross(a), FpVec3::ZERO);
    }

    #[test]
    fn magnitude_pythagorean_quadruple() {
        // 1² + 2² + 2² = 9.
        assert_eq!(v(1, 2, 2).magnitude(), Fp::from_int(3));
        assert_eq!(v(1, 2, 2).sqr_magnitude(), Fp::from_int(9));
    }

    #[test]
    fn sqr_magnitude_saturates_at_extremes() {
        let big = FpVec3::new(Fp::MAX, Fp::MAX, Fp::MAX);
        assert_eq!(big.sqr_magnitude(), Fp::MAX);
        assert_eq!(big.dot(big), Fp::MAX);
    }

    #[test]
    fn normalized_zero_is_zero() {
        assert_eq!(FpVec3::ZERO.normalized(), FpVec3::ZERO);
        let n = v(0, 3, 4).normalized();
        assert_eq!(n.y, Fp::from_int(3) / Fp::from_int(5));
        assert_eq!(n.z, Fp::from_int(4) / Fp::from_int(5));
    }

    #[test]
    fn move_towards_exact_arrival() {
        let target = v(10, 0, 10);
        let mut pos = FpVec3::ZERO;
        // Step by 1 along the diagonal until arrival; must land exactly.
        for _ in 0..20 {
            pos = pos.move_towards(target, Fp::from_int(1));
        }
        assert_eq!(pos, target);
    }

    #[test]
    fn move_towards_partial_step_along_axis() {
        let stepped = FpVec3::ZERO.move_towards(v(10, 0, 0), Fp::from_int(4));
        assert_eq!(stepped, v(4, 0, 0));
    }

    #[test]
    fn lerp_endpoints() {
        let a = v(0, 0, 0);
        let b = v(2, 4, 8);
        assert_eq!(a.lerp(b, Fp::ZERO), a);
        assert_eq!(a.lerp(b, Fp::ONE), b);
        assert_eq!(a.lerp(b, Fp::HALF), v(1, 2, 4));
    }

    #[test]
    fn angle_between_axes() {
        let a = v(1, 0, 0).angle(v(0, 0, 1));
        let delta = (a.raw() - Fp::HALF_PI.raw()).abs();
        assert!(delta < 50_000_000, "angle delta {delta}");
    }

    #[test]
    fn reflect_off_ground_plane() {
        let falling = v(1, -1, 0);
        assert_eq!(falling.reflect(FpVec3::UP), v(1, 1, 0));
    }

    #[test]
    fn project_onto_plane_axis() {
        assert_eq!(v(3, 4, 5).project(FpVec3::FORWARD), v(0, 0, 5));
        assert_eq!(v(3, 4, 5).project(FpVec3::ZERO), FpVec3::ZERO);
    }

    #[test]
    fn clamp_magnitude_short_vector_unchanged() {
        assert_eq!(v(1, 0, 0).clamp_magnitude(Fp::from_int(2)), v(1, 0, 0));
    }
}
