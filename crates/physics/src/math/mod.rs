//! Fixed-range math primitives shared by collision and movement.
//!
//! Angles are 16-bit binary angles (`0x10000` units per turn) that wrap on
//! overflow. Trigonometry goes through lookup tables so every platform sees
//! the same values for the same angle.
//!
//! # Key Types
//!
//! - [`Angle`]: wrapping 16-bit angle
//! - [`SeededRandom`]: the 16-bit LFSR used for gameplay randomness
//!
//! Approach helpers live in [`approach`] and follow the "move toward a
//! target by at most N" convention used all over the action code.

pub mod angle;
pub mod approach;
pub mod random;
pub mod trig;

use glam::{Mat4, Vec3, Vec4};

pub use angle::{Angle, Orientation};
pub use approach::{
    approach_angle, approach_f32, approach_f32_asymptotic, approach_f32_signed,
    approach_f32_symmetric, approach_s16, approach_s16_asymptotic, approach_s32,
    approach_s32_symmetric,
};
pub use random::SeededRandom;
pub use trig::{
    atan2f, atan2s, coss, sins, COS1, COS10, COS15, COS20, COS25, COS30, COS38, COS5, COS73,
    COS80,
};

/// Build a transform whose Y axis is `up`, facing `yaw` around it, placed at
/// `pos`.
///
/// Falls back to the identity basis when `up` is degenerate.
pub fn align_to_normal(up: Vec3, pos: Vec3, yaw: Angle) -> Mat4 {
    let lateral = Vec3::new(sins(yaw), 0.0, coss(yaw));
    let up = up.try_normalize().unwrap_or(Vec3::Y);
    let left = up.cross(lateral).try_normalize().unwrap_or(Vec3::X);
    let forward = left.cross(up).try_normalize().unwrap_or(Vec3::Z);

    Mat4::from_cols(
        left.extend(0.0),
        up.extend(0.0),
        forward.extend(0.0),
        Vec4::new(pos.x, pos.y, pos.z, 1.0),
    )
}

/// Normal of the plane through three points, unnormalized.
#[inline]
pub fn plane_normal(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    (b - a).cross(c - b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_to_flat_normal_keeps_yaw() {
        let m = align_to_normal(Vec3::Y, Vec3::new(1.0, 2.0, 3.0), Angle::ZERO);

        // Facing +Z with Y up
        assert!((m.y_axis.truncate() - Vec3::Y).length() < 1e-5);
        assert!((m.z_axis.truncate() - Vec3::Z).length() < 1e-5);
        assert_eq!(m.w_axis, Vec4::new(1.0, 2.0, 3.0, 1.0));
    }

    #[test]
    fn test_plane_normal_orientation() {
        // Counter-clockwise seen from above points up
        let n = plane_normal(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 1.0),
        );
        assert!(n.y > 0.0);
    }
}
