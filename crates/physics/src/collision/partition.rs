//! Uniform grid over the level's XZ extent.
//!
//! Each cell keeps eight id lists: {static, dynamic} x {floor, ceiling, wall,
//! water}. A surface is listed in every cell its footprint touches, widened by
//! `cell_overlap` so queries near a cell edge still see it. Lists keep
//! insertion order.

use serde::{Deserialize, Serialize};

use super::config::CollisionConfig;
use super::surface::{Surface, SurfaceId, SurfaceKind};

/// How long a surface stays in the partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurfaceLifetime {
    /// Loaded with the area, kept until the area is cleared.
    Static = 0,
    /// Re-submitted every frame by moving platforms.
    Dynamic = 1,
}

#[derive(Debug, Clone, Default)]
pub struct PartitionCell {
    buckets: [[Vec<SurfaceId>; 4]; 2],
}

impl PartitionCell {
    #[inline]
    pub fn bucket(&self, lifetime: SurfaceLifetime, kind: SurfaceKind) -> &[SurfaceId] {
        &self.buckets[lifetime as usize][kind as usize]
    }
}

#[derive(Debug, Clone)]
pub struct SpatialPartition {
    num_cells: usize,
    cells: Vec<PartitionCell>,
}

impl SpatialPartition {
    pub fn new(config: &CollisionConfig) -> Self {
        let num_cells = config.num_cells();
        Self {
            num_cells,
            cells: vec![PartitionCell::default(); num_cells * num_cells],
        }
    }

    #[inline]
    pub fn num_cells(&self) -> usize {
        self.num_cells
    }

    /// Cell at grid coordinates, or `None` outside the grid.
    pub fn cell(&self, cell_x: i32, cell_z: i32) -> Option<&PartitionCell> {
        let n = self.num_cells as i32;
        if cell_x < 0 || cell_z < 0 || cell_x >= n || cell_z >= n {
            return None;
        }
        self.cells.get(cell_z as usize * self.num_cells + cell_x as usize)
    }

    /// List a surface in every cell its footprint overlaps.
    pub fn insert(
        &mut self,
        config: &CollisionConfig,
        id: SurfaceId,
        surface: &Surface,
        lifetime: SurfaceLifetime,
    ) {
        let kind = surface.kind();
        let (min_x, max_x) = min_max(surface.vertices.map(|v| v.x));
        let (min_z, max_z) = min_max(surface.vertices.map(|v| v.z));

        let min_cell_x = self.lower_cell_index(config, min_x);
        let max_cell_x = self.upper_cell_index(config, max_x);
        let min_cell_z = self.lower_cell_index(config, min_z);
        let max_cell_z = self.upper_cell_index(config, max_z);

        for cell_z in min_cell_z..=max_cell_z {
            for cell_x in min_cell_x..=max_cell_x {
                let index = cell_z * self.num_cells + cell_x;
                if let Some(cell) = self.cells.get_mut(index) {
                    cell.buckets[lifetime as usize][kind as usize].push(id);
                }
            }
        }
    }

    /// Drop every dynamic listing, leaving static buckets untouched.
    pub fn clear_dynamic(&mut self) {
        for cell in &mut self.cells {
            for bucket in &mut cell.buckets[SurfaceLifetime::Dynamic as usize] {
                bucket.clear();
            }
        }
    }

    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            for lifetime in &mut cell.buckets {
                for bucket in lifetime {
                    bucket.clear();
                }
            }
        }
    }

    // ========================================================================
    // Private helpers
    // ========================================================================

    /// First cell touched by a footprint starting at `coord`.
    fn lower_cell_index(&self, config: &CollisionConfig, coord: i32) -> usize {
        let coord = (coord + config.level_boundary).max(0);
        let mut index = coord / config.cell_size;
        if coord % config.cell_size < config.cell_overlap {
            index -= 1;
        }
        index.max(0) as usize
    }

    /// Last cell touched by a footprint ending at `coord`.
    fn upper_cell_index(&self, config: &CollisionConfig, coord: i32) -> usize {
        let coord = (coord + config.level_boundary).max(0);
        let mut index = coord / config.cell_size;
        if coord % config.cell_size > config.cell_size - config.cell_overlap {
            index += 1;
        }
        (index.max(0) as usize).min(self.num_cells - 1)
    }
}

fn min_max(values: [i32; 3]) -> (i32, i32) {
    let [a, b, c] = values;
    (a.min(b).min(c), a.max(b).max(c))
}

#[cfg(test)]
mod tests {
    use glam::IVec3;

    use super::*;
    use crate::collision::surface::SurfaceType;

    fn floor_at(x0: i32, z0: i32, x1: i32, z1: i32) -> Surface {
        Surface::new(
            [
                IVec3::new(x0, 0, z0),
                IVec3::new(x0, 0, z1),
                IVec3::new(x1, 0, z1),
            ],
            SurfaceType::DEFAULT,
            0,
        )
        .unwrap()
    }

    fn cells_containing(partition: &SpatialPartition, id: SurfaceId) -> usize {
        partition
            .cells
            .iter()
            .filter(|c| c.bucket(SurfaceLifetime::Static, SurfaceKind::Floor).contains(&id))
            .count()
    }

    #[test]
    fn test_small_surface_single_cell() {
        let config = CollisionConfig::default();
        let mut partition = SpatialPartition::new(&config);
        let surface = floor_at(100, 100, 200, 200);

        partition.insert(&config, SurfaceId(0), &surface, SurfaceLifetime::Static);

        assert_eq!(cells_containing(&partition, SurfaceId(0)), 1);
        let cell = partition.cell(8, 8).unwrap();
        assert_eq!(cell.bucket(SurfaceLifetime::Static, SurfaceKind::Floor), &[SurfaceId(0)]);
    }

    #[test]
    fn test_spanning_surface_in_every_cell() {
        let config = CollisionConfig::default();
        let mut partition = SpatialPartition::new(&config);
        // Crosses the x = 0 and z = 0 cell edges
        let surface = floor_at(-500, -500, 500, 500);

        partition.insert(&config, SurfaceId(3), &surface, SurfaceLifetime::Static);

        assert_eq!(cells_containing(&partition, SurfaceId(3)), 4);
    }

    #[test]
    fn test_edge_margin_adds_neighbour() {
        let config = CollisionConfig::default();
        let mut partition = SpatialPartition::new(&config);
        // Starts 10 units past the cell edge at x = 0
        let surface = floor_at(10, 100, 200, 200);

        partition.insert(&config, SurfaceId(0), &surface, SurfaceLifetime::Static);

        assert!(partition.cell(7, 8).is_some_and(|c| !c
            .bucket(SurfaceLifetime::Static, SurfaceKind::Floor)
            .is_empty()));
    }

    #[test]
    fn test_clear_dynamic_keeps_static() {
        let config = CollisionConfig::default();
        let mut partition = SpatialPartition::new(&config);
        let surface = floor_at(100, 100, 200, 200);

        partition.insert(&config, SurfaceId(0), &surface, SurfaceLifetime::Static);
        partition.insert(&config, SurfaceId(1), &surface, SurfaceLifetime::Dynamic);
        partition.clear_dynamic();

        let cell = partition.cell(8, 8).unwrap();
        assert_eq!(cell.bucket(SurfaceLifetime::Static, SurfaceKind::Floor).len(), 1);
        assert!(cell.bucket(SurfaceLifetime::Dynamic, SurfaceKind::Floor).is_empty());
    }

    #[test]
    fn test_out_of_grid_cell() {
        let partition = SpatialPartition::new(&CollisionConfig::default());
        assert!(partition.cell(-1, 0).is_none());
        assert!(partition.cell(0, 16).is_none());
    }
}
