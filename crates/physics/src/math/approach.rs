//! Monotonic "move toward" helpers.
//!
//! The linear helpers take separate increment and decrement limits: the
//! increment applies while the value is below the target, the decrement
//! while it is above. None of them overshoot the target.

use super::angle::Angle;

/// Move an integer toward `target` by at most `inc` upward or `dec` downward.
pub fn approach_s32(current: i32, target: i32, inc: i32, dec: i32) -> i32 {
    let dist = target.wrapping_sub(current);
    if dist > 0 {
        if dist > inc {
            current.wrapping_add(inc)
        } else {
            target
        }
    } else if dist < 0 {
        if dist < -dec {
            current.wrapping_sub(dec)
        } else {
            target
        }
    } else {
        current
    }
}

pub fn approach_s32_symmetric(current: i32, target: i32, inc: i32) -> i32 {
    approach_s32(current, target, inc, inc)
}

/// Move a float toward `target` by at most `inc` upward or `dec` downward.
pub fn approach_f32(current: f32, target: f32, inc: f32, dec: f32) -> f32 {
    let dist = target - current;
    if dist >= 0.0 {
        if dist > inc {
            current + inc
        } else {
            target
        }
    } else if dist < -dec {
        current - dec
    } else {
        target
    }
}

pub fn approach_f32_symmetric(current: f32, target: f32, inc: f32) -> f32 {
    let inc = inc.abs();
    approach_f32(current, target, inc, inc)
}

/// Rotate toward `target` along the shorter arc.
///
/// When the target sits exactly a half turn away there is no shorter arc and
/// the signed difference is `-0x8000`. That case moves in the positive
/// direction, saturating at `0x7FFF` units of travel, so a full-speed step
/// from zero lands on `Angle::MAX` rather than wrapping to `Angle::HALF`.
pub fn approach_s16(current: Angle, target: Angle, inc: i16, dec: i16) -> Angle {
    let dist = (target - current).0;

    if dist == i16::MIN {
        return current + Angle(inc.max(0));
    }

    if dist > 0 {
        if dist > inc {
            current + Angle(inc)
        } else {
            target
        }
    } else if dist < 0 {
        if -dist > dec {
            current - Angle(dec)
        } else {
            target
        }
    } else {
        target
    }
}

/// Symmetric [`approach_s16`].
pub fn approach_angle(current: Angle, target: Angle, inc: i16) -> Angle {
    approach_s16(current, target, inc, inc)
}

/// Close a fraction of the remaining distance.
pub fn approach_f32_asymptotic(current: f32, target: f32, multiplier: f32) -> f32 {
    current + (target - current) * multiplier
}

/// Close `1 / divisor` of the remaining angular distance. A divisor of zero
/// snaps to the target.
pub fn approach_s16_asymptotic(current: Angle, target: Angle, divisor: i16) -> Angle {
    if divisor == 0 {
        return target;
    }
    let offset = (current - target).0;
    target + Angle(offset.wrapping_sub(offset.wrapping_div(divisor)))
}

/// Add a signed increment and clamp at `target`, reporting whether the
/// target was reached.
///
/// The sign of `inc` decides the direction: positive increments clamp from
/// below, negative ones from above.
pub fn approach_f32_signed(value: &mut f32, target: f32, inc: f32) -> bool {
    *value += inc;

    if inc >= 0.0 {
        if *value > target {
            *value = target;
            return true;
        }
    } else if *value < target {
        *value = target;
        return true;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approach_s32_no_overshoot() {
        assert_eq!(approach_s32(0, 10, 4, 1), 4);
        assert_eq!(approach_s32(8, 10, 4, 1), 10);
        assert_eq!(approach_s32(10, 0, 4, 3), 7);
        assert_eq!(approach_s32(2, 0, 4, 3), 0);
    }

    #[test]
    fn test_approach_f32_uses_dec_above_target() {
        assert_eq!(approach_f32(20.0, 0.0, 5.0, 2.0), 18.0);
        assert_eq!(approach_f32(-20.0, 0.0, 5.0, 2.0), -15.0);
        assert_eq!(approach_f32_symmetric(1.0, 0.0, -3.0), 0.0);
    }

    #[test]
    fn test_approach_s16_half_turn_saturates() {
        assert_eq!(
            approach_s16(Angle(0), Angle::HALF, 0x7FFF, 0x7FFF),
            Angle(0x7FFF)
        );
        assert_eq!(approach_s16(Angle(0), Angle::HALF, 0x800, 0x800), Angle(0x800));
    }

    #[test]
    fn test_approach_s16_takes_short_arc() {
        // From just below a half turn to just above it crosses the wrap
        let next = approach_s16(Angle(0x7F00), Angle(-0x7F00), 0x100, 0x100);
        assert_eq!(next, Angle(-0x8000));
        assert_eq!(approach_angle(Angle(0x100), Angle(-0x100), 0x80), Angle(0x80));
        assert_eq!(approach_angle(Angle(0x100), Angle(0x120), 0x80), Angle(0x120));
    }

    #[test]
    fn test_asymptotic() {
        assert_eq!(approach_f32_asymptotic(0.0, 10.0, 0.5), 5.0);
        assert_eq!(approach_s16_asymptotic(Angle(0), Angle(0x400), 4), Angle(0x100));
        assert_eq!(approach_s16_asymptotic(Angle(0), Angle(0x400), 0), Angle(0x400));
    }

    #[test]
    fn test_approach_f32_signed() {
        let mut v = 0.0;
        assert!(!approach_f32_signed(&mut v, 10.0, 4.0));
        assert!(!approach_f32_signed(&mut v, 10.0, 4.0));
        assert!(approach_f32_signed(&mut v, 10.0, 4.0));
        assert_eq!(v, 10.0);

        let mut down = 5.0;
        assert!(approach_f32_signed(&mut down, 0.0, -8.0));
        assert_eq!(down, 0.0);
    }
}
