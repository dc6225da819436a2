//! Collision triangles and their gameplay classification.

use glam::{IVec3, Vec3};
use serde::{Deserialize, Serialize};

use super::flags::SurfaceFlags;
use crate::math::{atan2s, Angle};

/// Gameplay type of a surface.
///
/// Values match the collision data format so level files decode directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SurfaceType(pub u16);

impl SurfaceType {
    pub const DEFAULT: Self = Self(0x0000);
    /// Lava.
    pub const BURNING: Self = Self(0x0001);
    /// Pushes like flowing water, used by a few underwater currents.
    pub const FORCE_0004: Self = Self(0x0004);
    /// Ceiling the avatar can hang from.
    pub const HANGABLE: Self = Self(0x0005);
    pub const SLOW: Self = Self(0x0009);
    pub const DEATH_PLANE: Self = Self(0x000A);
    pub const CLOSE_CAMERA: Self = Self(0x000B);
    pub const WATER: Self = Self(0x000D);
    pub const FLOWING_WATER: Self = Self(0x000E);
    pub const INTANGIBLE: Self = Self(0x0012);
    pub const VERY_SLIPPERY: Self = Self(0x0013);
    pub const SLIPPERY: Self = Self(0x0014);
    pub const NOT_SLIPPERY: Self = Self(0x0015);
    pub const TTM_VINES: Self = Self(0x0016);
    pub const MGR_MUSIC: Self = Self(0x001A);
    pub const SHALLOW_QUICKSAND: Self = Self(0x0021);
    pub const DEEP_QUICKSAND: Self = Self(0x0022);
    pub const INSTANT_QUICKSAND: Self = Self(0x0023);
    pub const DEEP_MOVING_QUICKSAND: Self = Self(0x0024);
    pub const SHALLOW_MOVING_QUICKSAND: Self = Self(0x0025);
    pub const QUICKSAND: Self = Self(0x0026);
    pub const MOVING_QUICKSAND: Self = Self(0x0027);
    pub const WALL_MISC: Self = Self(0x0028);
    pub const NOISE_DEFAULT: Self = Self(0x0029);
    pub const NOISE_SLIPPERY: Self = Self(0x002A);
    pub const HORIZONTAL_WIND: Self = Self(0x002C);
    pub const INSTANT_MOVING_QUICKSAND: Self = Self(0x002D);
    pub const ICE: Self = Self(0x002E);
    pub const LOOK_UP_WARP: Self = Self(0x002F);
    pub const HARD: Self = Self(0x0030);
    pub const WARP: Self = Self(0x0032);
    pub const TIMER_START: Self = Self(0x0033);
    pub const TIMER_END: Self = Self(0x0034);
    pub const HARD_SLIPPERY: Self = Self(0x0035);
    pub const HARD_VERY_SLIPPERY: Self = Self(0x0036);
    pub const HARD_NOT_SLIPPERY: Self = Self(0x0037);
    pub const VERTICAL_WIND: Self = Self(0x0038);
    pub const BOSS_FIGHT_CAMERA: Self = Self(0x0065);
    pub const CAMERA_FREE_ROAM: Self = Self(0x0066);
    pub const THI3_WALLKICK: Self = Self(0x0068);
    pub const CAMERA_8_DIR: Self = Self(0x0069);
    pub const CAMERA_MIDDLE: Self = Self(0x006E);
    pub const CAMERA_ROTATE_RIGHT: Self = Self(0x006F);
    pub const CAMERA_ROTATE_LEFT: Self = Self(0x0070);
    /// Invisible wall only the camera collides with.
    pub const CAMERA_BOUNDARY: Self = Self(0x0072);
    pub const NOISE_VERY_SLIPPERY_73: Self = Self(0x0073);
    pub const NOISE_VERY_SLIPPERY_74: Self = Self(0x0074);
    pub const NOISE_VERY_SLIPPERY: Self = Self(0x0075);
    pub const NO_CAM_COLLISION: Self = Self(0x0076);
    pub const NO_CAM_COLLISION_77: Self = Self(0x0077);
    pub const NO_CAM_COL_VERY_SLIPPERY: Self = Self(0x0078);
    pub const NO_CAM_COL_SLIPPERY: Self = Self(0x0079);
    pub const SWITCH: Self = Self(0x007A);
    /// Walls the avatar passes through while wearing the vanish cap.
    pub const VANISH_CAP_WALLS: Self = Self(0x007B);
    pub const PAINTING_WARP_D3: Self = Self(0x00D3);
    pub const PAINTING_WARP_F9: Self = Self(0x00F9);
    pub const TRAPDOOR: Self = Self(0x00FF);
    /// Top face of a water volume.
    pub const NEW_WATER: Self = Self(0x00FD);
    /// Bottom face of a water volume.
    pub const NEW_WATER_BOTTOM: Self = Self(0x00FE);

    /// Types that carry a push force in their collision data.
    pub fn has_force(self) -> bool {
        matches!(
            self,
            Self::FORCE_0004
                | Self::FLOWING_WATER
                | Self::DEEP_MOVING_QUICKSAND
                | Self::SHALLOW_MOVING_QUICKSAND
                | Self::MOVING_QUICKSAND
                | Self::HORIZONTAL_WIND
                | Self::INSTANT_MOVING_QUICKSAND
        )
    }

    pub fn is_quicksand(self) -> bool {
        (Self::SHALLOW_QUICKSAND.0..=Self::MOVING_QUICKSAND.0).contains(&self.0)
            || self == Self::INSTANT_MOVING_QUICKSAND
    }

    /// Floors that let the avatar take fall damage are "hard". Everything
    /// except the dedicated hard types is soft when fall damage is limited
    /// to hard floors.
    pub fn is_hard(self) -> bool {
        matches!(
            self,
            Self::HARD | Self::HARD_SLIPPERY | Self::HARD_VERY_SLIPPERY | Self::HARD_NOT_SLIPPERY
        )
    }

    pub fn is_water_volume(self) -> bool {
        matches!(self, Self::NEW_WATER | Self::NEW_WATER_BOTTOM)
    }

    /// Floors that can carry a warp node.
    pub fn is_warp(self) -> bool {
        matches!(
            self,
            Self::WARP | Self::DEATH_PLANE | Self::VERTICAL_WIND | Self::LOOK_UP_WARP
        ) || (Self::PAINTING_WARP_D3.0..=Self::PAINTING_WARP_F9.0).contains(&self.0)
    }
}

/// Index of a surface in the collision world.
///
/// Ids of dynamic surfaces are only valid until the next dynamic reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SurfaceId(pub u32);

impl SurfaceId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A surface as seen from avatar state: a world surface, or the flat
/// water-top floor used while riding a shell across water.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurfaceRef {
    Store(SurfaceId),
    WaterPseudoFloor,
}

impl From<SurfaceId> for SurfaceRef {
    fn from(id: SurfaceId) -> Self {
        Self::Store(id)
    }
}

/// Partition bucket a surface is sorted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurfaceKind {
    Floor = 0,
    Ceiling = 1,
    Wall = 2,
    Water = 3,
}

/// A collision triangle with its derived plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Surface {
    pub vertices: [IVec3; 3],
    /// Unit normal, following the winding `(v2 - v1) x (v3 - v2)`.
    pub normal: Vec3,
    /// Plane constant: `normal . p + origin_offset == 0` on the plane.
    pub origin_offset: f32,
    /// Lowest vertex Y minus 5.
    pub lower_y: i32,
    /// Highest vertex Y plus 5.
    pub upper_y: i32,
    pub ty: SurfaceType,
    pub flags: SurfaceFlags,
    pub force: i16,
    pub room: i8,
}

/// Floor substituted when riding a shell over water.
pub const WATER_PSEUDO_FLOOR: Surface = Surface {
    vertices: [IVec3::ZERO; 3],
    normal: Vec3::Y,
    origin_offset: 0.0,
    lower_y: 0,
    upper_y: 0,
    ty: SurfaceType::VERY_SLIPPERY,
    flags: SurfaceFlags::NONE,
    force: 0,
    room: 0,
};

impl Surface {
    /// Build a surface from three vertices.
    ///
    /// Returns `None` for degenerate triangles whose normal has near-zero
    /// length.
    pub fn new(vertices: [IVec3; 3], ty: SurfaceType, force: i16) -> Option<Self> {
        let [v1, v2, v3] = vertices.map(|v| v.as_vec3());
        let normal = (v2 - v1).cross(v3 - v2);
        let mag = normal.length();
        if mag < 0.0001 {
            return None;
        }
        let normal = normal / mag;

        let origin_offset = -normal.dot(v1);
        let min_y = vertices.iter().map(|v| v.y).min().unwrap_or(0);
        let max_y = vertices.iter().map(|v| v.y).max().unwrap_or(0);

        let mut flags = SurfaceFlags::NONE;
        if normal.x < -0.707 || normal.x > 0.707 {
            flags |= SurfaceFlags::X_PROJECTION;
        }

        Some(Self {
            vertices,
            normal,
            origin_offset,
            lower_y: min_y - 5,
            upper_y: max_y + 5,
            ty,
            flags,
            force,
            room: 0,
        })
    }

    pub fn with_room(mut self, room: i8) -> Self {
        self.room = room;
        self
    }

    pub fn with_flags(mut self, flags: SurfaceFlags) -> Self {
        self.flags |= flags;
        self
    }

    /// Bucket this surface is sorted into.
    pub fn kind(&self) -> SurfaceKind {
        if self.ty.is_water_volume() {
            SurfaceKind::Water
        } else if self.normal.y > 0.01 {
            SurfaceKind::Floor
        } else if self.normal.y < -0.01 {
            SurfaceKind::Ceiling
        } else {
            SurfaceKind::Wall
        }
    }

    #[inline]
    pub fn is_dynamic(&self) -> bool {
        self.flags.contains(SurfaceFlags::DYNAMIC)
    }

    /// Height of the plane at `(x, z)`. Meaningless for walls.
    #[inline]
    pub fn height_at(&self, x: f32, z: f32) -> f32 {
        -(x * self.normal.x + z * self.normal.z + self.origin_offset) / self.normal.y
    }

    /// Signed distance from the plane.
    #[inline]
    pub fn distance_to(&self, pos: Vec3) -> f32 {
        self.normal.dot(pos) + self.origin_offset
    }

    /// Warp node stored in the upper byte of the force, for warp floors.
    pub fn warp_node(&self) -> Option<u8> {
        self.ty.is_warp().then(|| (self.force >> 8) as u8)
    }

    /// Yaw the surface faces, measured in the XZ plane.
    pub fn yaw(&self) -> Angle {
        atan2s(self.normal.z, self.normal.x)
    }

    /// XZ containment for floors (winding counter-clockwise from above).
    pub(crate) fn contains_xz_floor(&self, x: i32, z: i32) -> bool {
        self.edge_tests(x, z).iter().all(|&c| c >= 0)
    }

    /// XZ containment for ceilings (winding clockwise from above).
    pub(crate) fn contains_xz_ceil(&self, x: i32, z: i32) -> bool {
        self.edge_tests(x, z).iter().all(|&c| c <= 0)
    }

    fn edge_tests(&self, x: i32, z: i32) -> [i64; 3] {
        let (x, z) = (i64::from(x), i64::from(z));
        let edge = |a: IVec3, b: IVec3| {
            let (x1, z1) = (i64::from(a.x), i64::from(a.z));
            let (x2, z2) = (i64::from(b.x), i64::from(b.z));
            (z1 - z) * (x2 - x1) - (x1 - x) * (z2 - z1)
        };
        let [v1, v2, v3] = self.vertices;
        [edge(v1, v2), edge(v2, v3), edge(v3, v1)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floor_tri() -> Surface {
        Surface::new(
            [
                IVec3::new(-100, 0, -100),
                IVec3::new(-100, 0, 100),
                IVec3::new(100, 0, 100),
            ],
            SurfaceType::DEFAULT,
            0,
        )
        .unwrap()
    }

    #[test]
    fn test_floor_normal_points_up() {
        let s = floor_tri();
        assert_eq!(s.kind(), SurfaceKind::Floor);
        assert!((s.normal - Vec3::Y).length() < 1e-6);
        assert_eq!(s.lower_y, -5);
        assert_eq!(s.upper_y, 5);
        assert_eq!(s.height_at(10.0, 50.0), 0.0);
    }

    #[test]
    fn test_degenerate_rejected() {
        let collinear = [IVec3::ZERO, IVec3::new(10, 0, 0), IVec3::new(20, 0, 0)];
        assert!(Surface::new(collinear, SurfaceType::DEFAULT, 0).is_none());
    }

    #[test]
    fn test_wall_projection_flag() {
        // Facing +X
        let wall = Surface::new(
            [
                IVec3::new(0, 0, 0),
                IVec3::new(0, 100, 0),
                IVec3::new(0, 0, 100),
            ],
            SurfaceType::DEFAULT,
            0,
        )
        .unwrap();
        assert_eq!(wall.kind(), SurfaceKind::Wall);
        assert!(wall.flags.contains(SurfaceFlags::X_PROJECTION));
    }

    #[test]
    fn test_floor_containment() {
        let s = floor_tri();
        assert!(s.contains_xz_floor(-50, 50));
        assert!(s.contains_xz_floor(-100, -100));
        assert!(!s.contains_xz_floor(50, -50));
    }

    #[test]
    fn test_water_types_go_to_water_bucket() {
        let mut s = floor_tri();
        s.ty = SurfaceType::NEW_WATER;
        assert_eq!(s.kind(), SurfaceKind::Water);
    }

    #[test]
    fn test_warp_node() {
        let mut s = floor_tri();
        s.ty = SurfaceType::WARP;
        s.force = 0x0A00;
        assert_eq!(s.warp_node(), Some(0x0A));
        s.ty = SurfaceType::DEFAULT;
        assert_eq!(s.warp_node(), None);
    }
}
