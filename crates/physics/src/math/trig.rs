//! Table-driven trigonometry on binary angles.
//!
//! Sine uses a 4096-entry table indexed by the top 12 bits of the angle, so
//! results are quantized to `0x10` angle units. Cosine reads the same table a
//! quarter turn ahead. `atan2s` resolves the octant first and then looks up
//! a 1025-entry arctangent table covering `[0, 1]`.

use std::f64::consts::{PI, TAU};
use std::sync::OnceLock;

use super::angle::Angle;

const SINE_ENTRIES: usize = 4096;
const ARCTAN_ENTRIES: usize = 1025;

/// Cosines of the slope limits the action code compares floor normals with.
pub const COS1: f32 = 0.999_847_7;
pub const COS5: f32 = 0.996_194_7;
pub const COS10: f32 = 0.984_807_8;
pub const COS15: f32 = 0.965_925_8;
pub const COS20: f32 = 0.939_692_6;
pub const COS25: f32 = 0.906_307_8;
pub const COS30: f32 = 0.866_025_4;
pub const COS38: f32 = 0.788_010_8;
pub const COS73: f32 = 0.292_371_7;
pub const COS80: f32 = 0.173_648_2;

static SINE_TABLE: OnceLock<Vec<f32>> = OnceLock::new();
static ARCTAN_TABLE: OnceLock<Vec<u16>> = OnceLock::new();

fn sine_table() -> &'static [f32] {
    SINE_TABLE.get_or_init(|| {
        (0..SINE_ENTRIES)
            .map(|i| (i as f64 * TAU / SINE_ENTRIES as f64).sin() as f32)
            .collect()
    })
}

fn arctan_table() -> &'static [u16] {
    ARCTAN_TABLE.get_or_init(|| {
        (0..ARCTAN_ENTRIES)
            .map(|i| {
                let ratio = i as f64 / (ARCTAN_ENTRIES - 1) as f64;
                (ratio.atan() * 32768.0 / PI).round() as u16
            })
            .collect()
    })
}

/// Sine of a binary angle.
#[inline]
pub fn sins(angle: Angle) -> f32 {
    sine_table()[usize::from(angle.as_u16() >> 4)]
}

/// Cosine of a binary angle.
#[inline]
pub fn coss(angle: Angle) -> f32 {
    sins(angle + Angle::QUARTER)
}

/// Arctangent of a ratio in `[0, 1]`, in binary angle units (`0..=0x2000`).
fn atans(ratio: f32) -> u16 {
    let index = ((ratio * 1024.0 + 0.5) as i32).clamp(0, (ARCTAN_ENTRIES - 1) as i32);
    arctan_table()[index as usize]
}

/// `atan(y / x)` for the first octant, treating `x == 0` as zero.
fn octant_lookup(y: f32, x: f32) -> u16 {
    if x == 0.0 {
        0
    } else {
        atans(y / x)
    }
}

/// Angle from the origin to `(x, y)`.
///
/// Terrain lives in the XZ plane, so yaw is usually computed as
/// `atan2s(z, x)`: an angle of zero faces +Z and `0x4000` faces +X.
pub fn atan2s(y: f32, x: f32) -> Angle {
    let (mut x, mut y) = (x, y);
    let ret: u16 = if x >= 0.0 {
        if y >= 0.0 {
            if y >= x {
                octant_lookup(x, y)
            } else {
                0x4000 - octant_lookup(y, x)
            }
        } else {
            y = -y;
            if y < x {
                0x4000 + octant_lookup(y, x)
            } else {
                0x8000 - octant_lookup(x, y)
            }
        }
    } else {
        x = -x;
        if y < 0.0 {
            y = -y;
            if y >= x {
                0x8000 + octant_lookup(x, y)
            } else {
                0xC000 - octant_lookup(y, x)
            }
        } else if y < x {
            0xC000 + octant_lookup(y, x)
        } else {
            octant_lookup(x, y).wrapping_neg()
        }
    };
    Angle(ret as i16)
}

/// `atan2s` converted to radians.
pub fn atan2f(y: f32, x: f32) -> f32 {
    atan2s(y, x).to_radians()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cardinal_sines() {
        assert_eq!(sins(Angle(0)), 0.0);
        assert_eq!(sins(Angle::QUARTER), 1.0);
        assert_eq!(coss(Angle(0)), 1.0);
        assert!((sins(Angle::HALF)).abs() < 1e-6);
        assert!((coss(Angle::HALF) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_sine_quantization() {
        // Angles inside the same 0x10 bucket share a value
        assert_eq!(sins(Angle(0x1000)), sins(Angle(0x100F)));
    }

    #[test]
    fn test_atan2s_axes() {
        assert_eq!(atan2s(1.0, 0.0), Angle(0));
        assert_eq!(atan2s(0.0, 1.0), Angle(0x4000));
        assert_eq!(atan2s(-1.0, 0.0), Angle::HALF);
        assert_eq!(atan2s(0.0, -1.0), Angle(-0x4000));
        assert_eq!(atan2s(0.0, 0.0), Angle(0));
    }

    #[test]
    fn test_atan2s_diagonal() {
        assert_eq!(atan2s(1.0, 1.0), Angle(0x2000));
        assert_eq!(atan2s(-1.0, -1.0), Angle(-0x6000));
    }

    #[test]
    fn test_atan2s_inverts_yaw() {
        for raw in [0x0123_i16, 0x1800, 0x3FF0, 0x5000, -0x2000, -0x7000] {
            let yaw = Angle(raw);
            let back = atan2s(coss(yaw), sins(yaw));
            assert!(yaw.abs_diff(back) <= 0x20, "yaw {raw:#x} came back as {back:?}");
        }
    }
}
