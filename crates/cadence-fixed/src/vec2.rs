//! Two-dimensional fixed-point vector.

use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use crate::fp::{Fp, FRACTIONAL_BITS};
use crate::trig;

/// A 2D vector of [`Fp`] components.
///
/// Componentwise arithmetic saturates like the scalar type. The
/// product-sum operations ([`dot`](FpVec2::dot),
/// [`sqr_magnitude`](FpVec2::sqr_magnitude), [`cross`](FpVec2::cross))
/// accumulate in the widened 128-bit domain *before* the 32.32
/// renormalization shift, so intermediate overflow cannot corrupt the
/// low bits of the result.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FpVec2 {
    /// X component.
    pub x: Fp,
    /// Y component.
    pub y: Fp,
}

impl FpVec2 {
    /// The zero vector.
    pub const ZERO: FpVec2 = FpVec2 {
        x: Fp::ZERO,
        y: Fp::ZERO,
    };
    /// The unit vector along +X.
    pub const RIGHT: FpVec2 = FpVec2 {
        x: Fp::ONE,
        y: Fp::ZERO,
    };
    /// The unit vector along +Y.
    pub const UP: FpVec2 = FpVec2 {
        x: Fp::ZERO,
        y: Fp::ONE,
    };

    /// Construct from components.
    #[inline]
    pub const fn new(x: Fp, y: Fp) -> Self {
        FpVec2 { x, y }
    }

    /// Construct from integer components.
    #[inline]
    pub const fn from_ints(x: i32, y: i32) -> Self {
        FpVec2 {
            x: Fp::from_int(x),
            y: Fp::from_int(y),
        }
    }

    /// Dot product, accumulated in the widened domain.
    pub fn dot(self, other: FpVec2) -> Fp {
        let sum = self.x.raw() as i128 * other.x.raw() as i128
            + self.y.raw() as i128 * other.y.raw() as i128;
        Fp::from_raw(saturate_shifted(sum))
    }

    /// 2D cross product (the scalar z of the 3D cross), widened.
    pub fn cross(self, other: FpVec2) -> Fp {
        let sum = self.x.raw() as i128 * other.y.raw() as i128
            - self.y.raw() as i128 * other.x.raw() as i128;
        Fp::from_raw(saturate_shifted(sum))
    }

    /// Squared length, accumulated in the widened domain.
    #[inline]
    pub fn sqr_magnitude(self) -> Fp {
        self.dot(self)
    }

    /// Length of the vector.
    pub fn magnitude(self) -> Fp {
        // sqr_magnitude is non-negative by construction.
        self.sqr_magnitude().sqrt().unwrap_or(Fp::ZERO)
    }

    /// Unit vector in the same direction, or zero for the zero vector.
    pub fn normalized(self) -> FpVec2 {
        let mag = self.magnitude();
        match (self.x.checked_div(mag), self.y.checked_div(mag)) {
            (Ok(x), Ok(y)) => FpVec2 { x, y },
            _ => FpVec2::ZERO,
        }
    }

    /// Distance between two points.
    #[inline]
    pub fn distance(self, other: FpVec2) -> Fp {
        (other - self).magnitude()
    }

    /// Linear interpolation with unclamped `t`.
    pub fn lerp(self, to: FpVec2, t: Fp) -> FpVec2 {
        FpVec2 {
            x: self.x.lerp(to.x, t),
            y: self.y.lerp(to.y, t),
        }
    }

    /// Step from `self` toward `target` by at most `max_delta`.
    ///
    /// Arrives exactly at `target` once the remaining distance is within
    /// `max_delta`, which keeps repeated stepping free of overshoot
    /// oscillation.
    pub fn move_towards(self, target: FpVec2, max_delta: Fp) -> FpVec2 {
        let offset = target - self;
        let dist = offset.magnitude();
        if dist <= max_delta || dist == Fp::ZERO {
            return target;
        }
        // Scale each component by max_delta/dist, dividing last so exact
        // integer geometry stays exact. dist > 0 here, so the divisions
        // cannot fail.
        let step = FpVec2 {
            x: (offset.x * max_delta).checked_div(dist).unwrap_or(Fp::ZERO),
            y: (offset.y * max_delta).checked_div(dist).unwrap_or(Fp::ZERO),
        };
        self + step
    }

    /// Unsigned angle between two vectors in radians, `[0, π]`.
    ///
    /// Returns zero if either vector has zero magnitude.
    pub fn angle(self, other: FpVec2) -> Fp {
        let denom = self.magnitude() * other.magnitude();
        match self.dot(other).checked_div(denom) {
            Ok(cosine) => trig::acos(cosine),
            Err(_) => Fp::ZERO,
        }
    }

    /// Clamp the vector's magnitude to at most `max`.
    pub fn clamp_magnitude(self, max: Fp) -> FpVec2 {
        let mag = self.magnitude();
        if mag <= max {
            return self;
        }
        match max.checked_div(mag) {
            Ok(scale) => self * scale,
            Err(_) => FpVec2::ZERO,
        }
    }

    /// Reflect off a surface with unit normal `normal`.
    pub fn reflect(self, normal: FpVec2) -> FpVec2 {
        self - normal * (Fp::TWO * self.dot(normal))
    }

    /// Project onto `onto`; zero if `onto` is the zero vector.
    pub fn project(self, onto: FpVec2) -> FpVec2 {
        match self.dot(onto).checked_div(onto.dot(onto)) {
            Ok(scale) => onto * scale,
            Err(_) => FpVec2::ZERO,
        }
    }
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

impl Add for FpVec2 {
    type Output = FpVec2;
    #[inline]
    fn add(self, rhs: FpVec2) -> FpVec2 {
        FpVec2 {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl Sub for FpVec2 {
    type Output = FpVec2;
    #[inline]
    fn sub(self, rhs: FpVec2) -> FpVec2 {
        FpVec2 {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl Neg for FpVec2 {
    type Output = FpVec2;
    #[inline]
    fn neg(self) -> FpVec2 {
        FpVec2 {
            x: -self.x,
            y: -self.y,
        }
    }
}

impl Mul<Fp> for FpVec2 {
    type Output = FpVec2;
    #[inline]
    fn mul(self, rhs: Fp) -> FpVec2 {
        FpVec2 {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

impl Div<Fp> for FpVec2 {
    type Output = FpVec2;

    /// Componentwise scalar division.
    ///
    /// # Panics
    ///
    /// Panics if `rhs` is zero, like scalar [`Fp`] division.
    #[inline]
    fn div(self, rhs: Fp) -> FpVec2 {
        FpVec2 {
            x: self.x / rhs,
            y: self.y / rhs,
        }
    }
}

impl AddAssign for FpVec2 {
    #[inline]
    fn add_assign(&mut self, rhs: FpVec2) {
        *self = *self + rhs;
    }
}

impl SubAssign for FpVec2 {
    #[inline]
    fn sub_assign(&mut self, rhs: FpVec2) {
        *self = *self - rhs;
    }
}

impl fmt::Display for FpVec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
