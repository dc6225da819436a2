//! Collision engine configuration.

use serde::{Deserialize, Serialize};

/// Storage width of collision coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CoordinateWidth {
    /// Vertices and query points wrap like 16-bit integers.
    #[default]
    Bits16,
    Bits32,
}

impl CoordinateWidth {
    /// Truncate a world coordinate the way the collision system stores it.
    #[inline]
    pub fn truncate(self, value: f32) -> i32 {
        match self {
            Self::Bits16 => i32::from(value as i32 as i16),
            Self::Bits32 => value as i32,
        }
    }

    /// Wrap an integer vertex component to the storage width.
    #[inline]
    pub fn wrap(self, value: i32) -> i32 {
        match self {
            Self::Bits16 => i32::from(value as i16),
            Self::Bits32 => value,
        }
    }
}

/// Tuning for the surface partition and collision queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollisionConfig {
    // ========================================================================
    // Partition
    // ========================================================================
    /// Half-extent of the level on X and Z. Queries at or beyond it miss.
    pub level_boundary: i32,

    /// Edge length of one partition cell.
    pub cell_size: i32,

    /// Surfaces within this distance of a cell edge also go in the neighbour.
    pub cell_overlap: i32,

    pub coordinate_width: CoordinateWidth,

    // ========================================================================
    // Walls
    // ========================================================================
    /// How many walls a single wall query records. Extra walls still push.
    pub max_referenced_walls: usize,

    /// Wall query radius is clamped to this.
    pub max_wall_radius: f32,

    // ========================================================================
    // Surface data
    // ========================================================================
    /// Keep the force value for every surface type, not only the ones that
    /// push. Warp-capable floors read their warp node from its upper byte.
    pub all_surfaces_have_force: bool,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            level_boundary: 0x2000,
            cell_size: 0x400,
            cell_overlap: 50,
            coordinate_width: CoordinateWidth::Bits16,

            max_referenced_walls: 4,
            max_wall_radius: 200.0,

            all_surfaces_have_force: false,
        }
    }
}

impl CollisionConfig {
    /// Four times the vanilla level size, with 32-bit coordinates.
    pub fn extended_bounds() -> Self {
        Self {
            level_boundary: 0x8000,
            cell_size: 0x800,
            coordinate_width: CoordinateWidth::Bits32,
            all_surfaces_have_force: true,
            ..Default::default()
        }
    }

    /// Number of cells along each axis.
    pub fn num_cells(&self) -> usize {
        ((self.level_boundary * 2) / self.cell_size).max(1) as usize
    }

    /// True when a query coordinate lies outside the partition.
    #[inline]
    pub fn out_of_bounds(&self, coord: i32) -> bool {
        coord <= -self.level_boundary || coord >= self.level_boundary
    }

    /// Cell index of an in-bounds query coordinate.
    #[inline]
    pub fn cell_of(&self, coord: i32) -> usize {
        let last = self.num_cells() - 1;
        (((coord + self.level_boundary) / self.cell_size).max(0) as usize).min(last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_grid() {
        let config = CollisionConfig::default();
        assert_eq!(config.num_cells(), 16);
        assert_eq!(config.cell_of(0), 8);
        assert_eq!(config.cell_of(-0x2000 + 1), 0);
        assert_eq!(config.cell_of(0x1FFF), 15);
        assert!(config.out_of_bounds(0x2000));
        assert!(config.out_of_bounds(-0x2000));
    }

    #[test]
    fn test_extended_grid() {
        let config = CollisionConfig::extended_bounds();
        assert_eq!(config.num_cells(), 32);
        assert!(!config.out_of_bounds(0x7000));
        assert_eq!(config.cell_of(0x7FFF), 31);
    }

    #[test]
    fn test_uneven_grid_keeps_cells_in_order() {
        let config = CollisionConfig {
            level_boundary: 0x3000,
            ..Default::default()
        };
        assert_eq!(config.num_cells(), 24);
        assert_eq!(config.cell_of(-3300), 8);
        assert_eq!(config.cell_of(-0x3000 + 1), 0);
        assert_eq!(config.cell_of(0x2FFF), 23);
    }

    #[test]
    fn test_truncate_wraps_in_16_bit() {
        assert_eq!(CoordinateWidth::Bits16.truncate(40000.0), 40000 - 65536);
        assert_eq!(CoordinateWidth::Bits32.truncate(40000.0), 40000);
        assert_eq!(CoordinateWidth::Bits16.truncate(-1.5), -1);
    }
}
