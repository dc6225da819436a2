//! Wrapping 16-bit angles.
//!
//! A full turn is `0x10000` units. Arithmetic wraps modulo a full turn, so
//! `Angle(0x7FFF) + 1 == Angle(-0x8000)`. Comparisons are signed, which makes
//! `dyaw > Angle(-0x4000) && dyaw < Angle(0x4000)` read as "within a quarter
//! turn".

use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

use super::trig;

/// A binary angle with wrap-around arithmetic.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Angle(pub i16);

impl Angle {
    pub const ZERO: Self = Self(0);

    /// 90 degrees.
    pub const QUARTER: Self = Self(0x4000);

    /// 180 degrees. Stored as `-0x8000`.
    pub const HALF: Self = Self(i16::MIN);

    /// Largest positive angle, one unit short of a half turn.
    pub const MAX: Self = Self(i16::MAX);

    /// Convert degrees to binary angle units, truncating.
    pub fn degrees(deg: f32) -> Self {
        Self::from_f32(deg * 65536.0 / 360.0)
    }

    /// Truncate a float to an angle, wrapping like a 16-bit store.
    #[inline]
    pub fn from_f32(value: f32) -> Self {
        Self((value as i32) as i16)
    }

    /// Truncate an integer to an angle, wrapping like a 16-bit store.
    #[inline]
    pub fn from_i32(value: i32) -> Self {
        Self(value as i16)
    }

    /// Add a float delta and store the truncated result.
    #[inline]
    pub fn add_f32(self, delta: f32) -> Self {
        Self::from_f32(self.0 as f32 + delta)
    }

    /// Raw unsigned representation (0..=0xFFFF).
    #[inline]
    pub fn as_u16(self) -> u16 {
        self.0 as u16
    }

    #[inline]
    pub fn as_i32(self) -> i32 {
        i32::from(self.0)
    }

    #[inline]
    pub fn sin(self) -> f32 {
        trig::sins(self)
    }

    #[inline]
    pub fn cos(self) -> f32 {
        trig::coss(self)
    }

    pub fn to_radians(self) -> f32 {
        f32::from(self.0) * std::f32::consts::PI / 32768.0
    }

    pub fn from_radians(radians: f32) -> Self {
        Self::from_f32(radians * 32768.0 / std::f32::consts::PI)
    }

    /// Absolute shortest distance between two angles.
    ///
    /// A half-turn difference reports `0x7FFF`, the largest representable
    /// magnitude, instead of overflowing.
    pub fn abs_diff(self, other: Self) -> i16 {
        let diff = (other - self).0;
        if diff == i16::MIN {
            i16::MAX
        } else {
            diff.abs()
        }
    }

    /// True when the angle lies strictly inside `(-limit, limit)`.
    #[inline]
    pub fn within(self, limit: i16) -> bool {
        self.0 > -limit && self.0 < limit
    }
}

impl From<i16> for Angle {
    fn from(value: i16) -> Self {
        Self(value)
    }
}

impl Add for Angle {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self(self.0.wrapping_add(rhs.0))
    }
}

impl Sub for Angle {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self(self.0.wrapping_sub(rhs.0))
    }
}

impl Neg for Angle {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self(self.0.wrapping_neg())
    }
}

impl Add<i32> for Angle {
    type Output = Self;

    #[inline]
    fn add(self, rhs: i32) -> Self {
        Self::from_i32(self.as_i32().wrapping_add(rhs))
    }
}

impl Sub<i32> for Angle {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: i32) -> Self {
        Self::from_i32(self.as_i32().wrapping_sub(rhs))
    }
}

impl AddAssign for Angle {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for Angle {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl AddAssign<i32> for Angle {
    fn add_assign(&mut self, rhs: i32) {
        *self = *self + rhs;
    }
}

impl SubAssign<i32> for Angle {
    fn sub_assign(&mut self, rhs: i32) {
        *self = *self - rhs;
    }
}

/// Pitch / yaw / roll triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Orientation {
    pub pitch: Angle,
    pub yaw: Angle,
    pub roll: Angle,
}

impl Orientation {
    pub const ZERO: Self = Self {
        pitch: Angle::ZERO,
        yaw: Angle::ZERO,
        roll: Angle::ZERO,
    };

    pub fn from_yaw(yaw: Angle) -> Self {
        Self {
            yaw,
            ..Self::ZERO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapping_add() {
        assert_eq!(Angle(0x7FFF) + Angle(1), Angle(i16::MIN));
        assert_eq!(Angle(0x4000) + 0xC000, Angle(0));
        assert_eq!(Angle(-0x8000) - Angle(1), Angle(0x7FFF));
    }

    #[test]
    fn test_neg_of_half_turn_is_half_turn() {
        assert_eq!(-Angle::HALF, Angle::HALF);
    }

    #[test]
    fn test_add_f32_truncates() {
        assert_eq!(Angle(100).add_f32(10.9), Angle(110));
        assert_eq!(Angle(100).add_f32(-10.9), Angle(89));
        assert_eq!(Angle(0x7FFF).add_f32(2.0), Angle(-0x7FFF));
    }

    #[test]
    fn test_abs_diff_half_turn() {
        assert_eq!(Angle(0).abs_diff(Angle::HALF), 0x7FFF);
        assert_eq!(Angle(0x100).abs_diff(Angle(-0x100)), 0x200);
    }

    #[test]
    fn test_degrees() {
        assert_eq!(Angle::degrees(90.0), Angle::QUARTER);
        assert_eq!(Angle::degrees(60.0), Angle(0x2AAA));
    }

    #[test]
    fn test_within() {
        assert!(Angle(0x3FFF).within(0x4000));
        assert!(!Angle(-0x4000).within(0x4000));
    }
}
