//! Bit flags for surfaces and collision queries.
//!
//! Surface flags are baked into a surface when it is inserted. Query flags
//! and raycast flags are supplied per call to filter what a query may return.

use serde::{Deserialize, Serialize};

/// Properties attached to a surface at insertion time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SurfaceFlags(pub u32);

impl SurfaceFlags {
    pub const NONE: Self = Self(0);

    /// Inserted into the per-frame dynamic buckets.
    pub const DYNAMIC: Self = Self(1 << 0);

    /// Ignored by camera queries and rays.
    pub const NO_CAM_COLLISION: Self = Self(1 << 1);

    /// Wall whose normal is closer to the X axis than to Z. Wall tests project
    /// onto the YZ plane instead of XY.
    pub const X_PROJECTION: Self = Self(1 << 3);

    #[inline]
    pub fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    #[inline]
    pub fn intersects(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }
}

impl std::ops::BitOr for SurfaceFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for SurfaceFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Filters for floor, ceiling and wall queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct QueryFlags(pub u32);

impl QueryFlags {
    pub const NONE: Self = Self(0);

    /// Query issued by the camera: skips `NO_CAM_COLLISION` surfaces and
    /// accepts camera boundaries.
    pub const CAMERA: Self = Self(1 << 0);

    /// Floors of type `INTANGIBLE` are returned instead of skipped.
    pub const INCLUDE_INTANGIBLE: Self = Self(1 << 1);

    /// Only static buckets are searched.
    pub const EXCLUDE_DYNAMIC: Self = Self(1 << 2);

    #[inline]
    pub fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }
}

impl std::ops::BitOr for QueryFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Which buckets a ray visits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RaycastFlags(pub u32);

impl RaycastFlags {
    pub const FLOOR: Self = Self(1 << 0);
    pub const CEIL: Self = Self(1 << 1);
    pub const WALL: Self = Self(1 << 2);
    pub const WATER: Self = Self(1 << 3);

    pub const SOLID: Self = Self(Self::FLOOR.0 | Self::CEIL.0 | Self::WALL.0);
    pub const ALL: Self = Self(Self::SOLID.0 | Self::WATER.0);

    #[inline]
    pub fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }
}

impl std::ops::BitOr for RaycastFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_flags_operations() {
        let flags = SurfaceFlags::DYNAMIC | SurfaceFlags::X_PROJECTION;

        assert!(flags.contains(SurfaceFlags::DYNAMIC));
        assert!(flags.intersects(SurfaceFlags::X_PROJECTION | SurfaceFlags::NO_CAM_COLLISION));
        assert!(!flags.contains(SurfaceFlags::NO_CAM_COLLISION));
    }

    #[test]
    fn test_raycast_masks() {
        assert!(RaycastFlags::ALL.contains(RaycastFlags::WATER));
        assert!(RaycastFlags::SOLID.contains(RaycastFlags::CEIL | RaycastFlags::FLOOR));
        assert!(!RaycastFlags::SOLID.contains(RaycastFlags::WATER));
    }
}
