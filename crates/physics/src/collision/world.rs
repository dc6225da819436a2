//! Collision world: the surface store plus its spatial partition.
//!
//! Static surfaces are loaded with the area and live at the front of the
//! store. Dynamic surfaces are appended every frame by moving platforms and
//! wiped wholesale by [`CollisionWorld::reset_dynamic`], which also
//! invalidates their ids.
//!
//! All queries are total. A miss returns a sentinel height and no surface.

use glam::{IVec3, Vec3};

use super::config::CollisionConfig;
use super::flags::{QueryFlags, SurfaceFlags};
use super::partition::{PartitionCell, SpatialPartition, SurfaceLifetime};
use super::surface::{Surface, SurfaceId, SurfaceKind, SurfaceRef, SurfaceType, WATER_PSEUDO_FLOOR};

/// Height reported when no floor (or water) is found.
pub const FLOOR_LOWER_LIMIT: f32 = -11000.0;

/// Height reported when no ceiling is found.
pub const CELL_HEIGHT_LIMIT: f32 = 20000.0;

/// Result of a floor query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloorHit {
    pub height: f32,
    pub surface: Option<SurfaceId>,
}

impl FloorHit {
    pub const NONE: Self = Self {
        height: FLOOR_LOWER_LIMIT,
        surface: None,
    };
}

/// Result of a ceiling query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CeilHit {
    pub height: f32,
    pub surface: Option<SurfaceId>,
}

impl CeilHit {
    pub const NONE: Self = Self {
        height: CELL_HEIGHT_LIMIT,
        surface: None,
    };
}

/// In/out parameters of a wall query.
///
/// The query pushes `x`/`z` out of every wall it touches and records the
/// first few walls in `walls`.
#[derive(Debug, Clone, Default)]
pub struct WallCollisionData {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Added to `y` to get the height that is tested against walls.
    pub offset_y: f32,
    pub radius: f32,
    pub flags: QueryFlags,
    /// Vanish cap walls are passed through.
    pub ignore_vanish_walls: bool,
    pub walls: Vec<SurfaceId>,
}

impl WallCollisionData {
    pub fn new(pos: Vec3, offset_y: f32, radius: f32) -> Self {
        Self {
            x: pos.x,
            y: pos.y,
            z: pos.z,
            offset_y,
            radius,
            ..Default::default()
        }
    }

    #[inline]
    pub fn pos(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    /// Most recently recorded wall.
    #[inline]
    pub fn last_wall(&self) -> Option<SurfaceId> {
        self.walls.last().copied()
    }
}

/// The collision environment of one area.
#[derive(Debug, Clone)]
pub struct CollisionWorld {
    pub(super) config: CollisionConfig,
    pub(super) surfaces: Vec<Surface>,
    static_count: usize,
    pub(super) partition: SpatialPartition,
}

impl Default for CollisionWorld {
    fn default() -> Self {
        Self::new(CollisionConfig::default())
    }
}

impl CollisionWorld {
    pub fn new(config: CollisionConfig) -> Self {
        let partition = SpatialPartition::new(&config);
        Self {
            config,
            surfaces: Vec::new(),
            static_count: 0,
            partition,
        }
    }

    pub fn config(&self) -> &CollisionConfig {
        &self.config
    }

    /// Build a surface using this world's coordinate width and force rules.
    ///
    /// Returns `None` for degenerate triangles.
    pub fn build_surface(
        &self,
        vertices: [IVec3; 3],
        ty: SurfaceType,
        force: i16,
    ) -> Option<Surface> {
        let width = self.config.coordinate_width;
        let vertices = vertices.map(|v| IVec3::new(width.wrap(v.x), width.wrap(v.y), width.wrap(v.z)));
        let force = if self.config.all_surfaces_have_force || ty.has_force() {
            force
        } else {
            0
        };

        let surface = Surface::new(vertices, ty, force);
        if surface.is_none() {
            log::warn!("Dropping degenerate triangle {:?}", vertices);
        }
        surface
    }

    /// Add a surface that lasts until [`clear`](Self::clear).
    pub fn add_static_surface(
        &mut self,
        vertices: [IVec3; 3],
        ty: SurfaceType,
        force: i16,
    ) -> Option<SurfaceId> {
        let surface = self.build_surface(vertices, ty, force)?;
        Some(self.insert(surface, SurfaceLifetime::Static))
    }

    /// Add a surface that lasts until the next [`reset_dynamic`](Self::reset_dynamic).
    pub fn add_dynamic_surface(
        &mut self,
        vertices: [IVec3; 3],
        ty: SurfaceType,
        force: i16,
    ) -> Option<SurfaceId> {
        let surface = self.build_surface(vertices, ty, force)?;
        Some(self.insert(surface, SurfaceLifetime::Dynamic))
    }

    /// Store a prepared surface and list it in the partition.
    ///
    /// Static surfaces must precede dynamic ones in the store, so adding a
    /// static surface while dynamic ones exist drops the dynamic set first.
    pub fn insert(&mut self, mut surface: Surface, lifetime: SurfaceLifetime) -> SurfaceId {
        match lifetime {
            SurfaceLifetime::Static => {
                if self.surfaces.len() > self.static_count {
                    self.reset_dynamic();
                }
                surface.flags = SurfaceFlags(surface.flags.0 & !SurfaceFlags::DYNAMIC.0);
            }
            SurfaceLifetime::Dynamic => surface.flags |= SurfaceFlags::DYNAMIC,
        }

        let id = SurfaceId(self.surfaces.len() as u32);
        self.partition.insert(&self.config, id, &surface, lifetime);
        self.surfaces.push(surface);
        if lifetime == SurfaceLifetime::Static {
            self.static_count = self.surfaces.len();
        }
        id
    }

    /// Forget every dynamic surface. Static surfaces and their ids survive.
    pub fn reset_dynamic(&mut self) {
        let dropped = self.surfaces.len() - self.static_count;
        if dropped > 0 {
            log::debug!("Resetting {} dynamic surfaces", dropped);
        }
        self.surfaces.truncate(self.static_count);
        self.partition.clear_dynamic();
    }

    /// Remove all collision geometry.
    pub fn clear(&mut self) {
        self.surfaces.clear();
        self.static_count = 0;
        self.partition.clear();
    }

    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }

    pub fn static_surface_count(&self) -> usize {
        self.static_count
    }

    pub fn dynamic_surface_count(&self) -> usize {
        self.surfaces.len() - self.static_count
    }

    pub fn surface(&self, id: SurfaceId) -> Option<&Surface> {
        self.surfaces.get(id.index())
    }

    /// Look up a surface reference held by avatar state.
    pub fn resolve(&self, surface: SurfaceRef) -> Option<&Surface> {
        match surface {
            SurfaceRef::Store(id) => self.surface(id),
            SurfaceRef::WaterPseudoFloor => Some(&WATER_PSEUDO_FLOOR),
        }
    }

    // ========================================================================
    // Floors and ceilings
    // ========================================================================

    /// Highest floor at `(x, z)` whose height does not exceed `y`.
    ///
    /// Ties go to the surface listed last, so dynamic floors win over static
    /// ones at the same height.
    pub fn find_floor(&self, x: f32, y: f32, z: f32) -> FloorHit {
        self.find_floor_filtered(x, y, z, QueryFlags::NONE)
    }

    pub fn find_floor_filtered(&self, x: f32, y: f32, z: f32, flags: QueryFlags) -> FloorHit {
        let Some((cell, xi, zi)) = self.query_cell(x, z) else {
            return FloorHit::NONE;
        };

        let mut best: Option<(f32, SurfaceId)> = None;
        for lifetime in self.lifetimes(flags) {
            for &id in cell.bucket(lifetime, SurfaceKind::Floor) {
                let Some(surf) = self.surface(id) else { continue };

                if y < surf.lower_y as f32 {
                    continue;
                }
                if !self.accepts(surf, flags) {
                    continue;
                }
                if surf.ty == SurfaceType::INTANGIBLE
                    && !flags.contains(QueryFlags::INCLUDE_INTANGIBLE)
                {
                    continue;
                }
                if !surf.contains_xz_floor(xi, zi) {
                    continue;
                }

                let height = surf.height_at(xi as f32, zi as f32);
                if height > y {
                    continue;
                }
                if best.map_or(true, |(h, _)| height >= h) {
                    best = Some((height, id));
                }
            }
        }

        match best {
            Some((height, id)) => FloorHit {
                height,
                surface: Some(id),
            },
            None => FloorHit::NONE,
        }
    }

    pub fn find_floor_height(&self, x: f32, y: f32, z: f32) -> f32 {
        self.find_floor(x, y, z).height
    }

    /// Lowest ceiling at `(x, z)` whose height is at least `y`.
    pub fn find_ceil(&self, x: f32, y: f32, z: f32) -> CeilHit {
        self.find_ceil_filtered(x, y, z, QueryFlags::NONE)
    }

    pub fn find_ceil_filtered(&self, x: f32, y: f32, z: f32, flags: QueryFlags) -> CeilHit {
        let Some((cell, xi, zi)) = self.query_cell(x, z) else {
            return CeilHit::NONE;
        };

        let mut best: Option<(f32, SurfaceId)> = None;
        for lifetime in self.lifetimes(flags) {
            for &id in cell.bucket(lifetime, SurfaceKind::Ceiling) {
                let Some(surf) = self.surface(id) else { continue };

                if y > surf.upper_y as f32 {
                    continue;
                }
                if !self.accepts(surf, flags) {
                    continue;
                }
                if !surf.contains_xz_ceil(xi, zi) {
                    continue;
                }

                let height = surf.height_at(xi as f32, zi as f32);
                if height < y {
                    continue;
                }
                if best.map_or(true, |(h, _)| height <= h) {
                    best = Some((height, id));
                }
            }
        }

        match best {
            Some((height, id)) => CeilHit {
                height,
                surface: Some(id),
            },
            None => CeilHit::NONE,
        }
    }

    // ========================================================================
    // Walls
    // ========================================================================

    /// Push `data` out of every wall within `radius` and record them.
    ///
    /// Returns how many walls pushed, which can exceed the number recorded.
    pub fn find_wall_collisions(&self, data: &mut WallCollisionData) -> usize {
        data.walls.clear();

        let Some((cell, _, _)) = self.query_cell(data.x, data.z) else {
            return 0;
        };

        let mut collisions = 0;
        if !data.flags.contains(QueryFlags::EXCLUDE_DYNAMIC) {
            collisions += self.walls_from_list(
                cell.bucket(SurfaceLifetime::Dynamic, SurfaceKind::Wall),
                data,
            );
        }
        collisions += self.walls_from_list(cell.bucket(SurfaceLifetime::Static, SurfaceKind::Wall), data);
        collisions
    }

    /// Push `pos` out of nearby walls and return the last wall recorded.
    pub fn resolve_and_return_wall_collisions(
        &self,
        pos: &mut Vec3,
        offset_y: f32,
        radius: f32,
    ) -> Option<SurfaceId> {
        let mut data = WallCollisionData::new(*pos, offset_y, radius);
        self.find_wall_collisions(&mut data);
        *pos = data.pos();
        data.last_wall()
    }

    // ========================================================================
    // Water
    // ========================================================================

    /// Height of the highest water surface over `(x, z)`.
    pub fn find_water_level(&self, x: f32, z: f32) -> f32 {
        let Some((cell, xi, zi)) = self.query_cell(x, z) else {
            return FLOOR_LOWER_LIMIT;
        };

        let mut level: Option<f32> = None;
        for lifetime in [SurfaceLifetime::Static, SurfaceLifetime::Dynamic] {
            for &id in cell.bucket(lifetime, SurfaceKind::Water) {
                let Some(surf) = self.surface(id) else { continue };
                if surf.ty != SurfaceType::NEW_WATER || surf.normal.y <= 0.0 {
                    continue;
                }
                if !surf.contains_xz_floor(xi, zi) {
                    continue;
                }
                let height = surf.height_at(xi as f32, zi as f32);
                if level.map_or(true, |l| height >= l) {
                    level = Some(height);
                }
            }
        }
        level.unwrap_or(FLOOR_LOWER_LIMIT)
    }

    // ========================================================================
    // Private helpers
    // ========================================================================

    /// Truncated coordinates and the cell they fall in, or `None` when out of
    /// bounds.
    fn query_cell(&self, x: f32, z: f32) -> Option<(&PartitionCell, i32, i32)> {
        let xi = self.config.coordinate_width.truncate(x);
        let zi = self.config.coordinate_width.truncate(z);
        if self.config.out_of_bounds(xi) || self.config.out_of_bounds(zi) {
            return None;
        }

        let cell_x = self.config.cell_of(xi) as i32;
        let cell_z = self.config.cell_of(zi) as i32;
        self.partition.cell(cell_x, cell_z).map(|cell| (cell, xi, zi))
    }

    fn lifetimes(&self, flags: QueryFlags) -> impl Iterator<Item = SurfaceLifetime> {
        let with_dynamic = !flags.contains(QueryFlags::EXCLUDE_DYNAMIC);
        [SurfaceLifetime::Static, SurfaceLifetime::Dynamic]
            .into_iter()
            .filter(move |l| with_dynamic || *l == SurfaceLifetime::Static)
    }

    /// Camera filter shared by floors, ceilings and walls.
    fn accepts(&self, surf: &Surface, flags: QueryFlags) -> bool {
        if flags.contains(QueryFlags::CAMERA) {
            !surf.flags.contains(SurfaceFlags::NO_CAM_COLLISION)
        } else {
            surf.ty != SurfaceType::CAMERA_BOUNDARY
        }
    }

    fn walls_from_list(&self, list: &[SurfaceId], data: &mut WallCollisionData) -> usize {
        let radius = data.radius.min(self.config.max_wall_radius);
        let x = data.x;
        let y = data.y + data.offset_y;
        let z = data.z;
        let mut collisions = 0;

        for &id in list {
            let Some(surf) = self.surface(id) else { continue };

            if y < surf.lower_y as f32 || y > surf.upper_y as f32 {
                continue;
            }

            let offset = surf.distance_to(Vec3::new(x, y, z));
            if offset < -radius || offset > radius {
                continue;
            }

            if !wall_contains(surf, x, y, z) {
                continue;
            }

            if !self.accepts(surf, data.flags) {
                continue;
            }
            if surf.ty == SurfaceType::VANISH_CAP_WALLS && data.ignore_vanish_walls {
                continue;
            }

            data.x += surf.normal.x * (radius - offset);
            data.z += surf.normal.z * (radius - offset);

            if data.walls.len() < self.config.max_referenced_walls {
                data.walls.push(id);
            }
            collisions += 1;
        }
        collisions
    }
}

/// Point-in-triangle test on the wall's projection plane.
fn wall_contains(surf: &Surface, x: f32, y: f32, z: f32) -> bool {
    let [v1, v2, v3] = surf.vertices.map(|v| v.as_vec3());
    let (y1, y2, y3) = (v1.y, v2.y, v3.y);

    // Projection onto YZ uses -z so both projections share one winding rule
    let (w, w1, w2, w3, facing_positive) = if surf.flags.contains(SurfaceFlags::X_PROJECTION) {
        (-z, -v1.z, -v2.z, -v3.z, surf.normal.x > 0.0)
    } else {
        (x, v1.x, v2.x, v3.x, surf.normal.z > 0.0)
    };

    let edges = [
        (y1 - y) * (w2 - w1) - (w1 - w) * (y2 - y1),
        (y2 - y) * (w3 - w2) - (w2 - w) * (y3 - y2),
        (y3 - y) * (w1 - w3) - (w3 - w) * (y1 - y3),
    ];

    if facing_positive {
        edges.iter().all(|&e| e <= 0.0)
    } else {
        edges.iter().all(|&e| e >= 0.0)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Split a quad into two triangles sharing the `a`-`c` diagonal.
    fn add_quad(world: &mut CollisionWorld, quad: [IVec3; 4], ty: SurfaceType, lifetime: SurfaceLifetime) {
        let [a, b, c, d] = quad;
        for tri in [[a, b, c], [a, c, d]] {
            let surface = world.build_surface(tri, ty, 0).unwrap();
            world.insert(surface, lifetime);
        }
    }

    fn flat_floor(half: i32, y: i32) -> [IVec3; 4] {
        floor_rect(-half, -half, half, half, y)
    }

    fn floor_rect(x0: i32, z0: i32, x1: i32, z1: i32, y: i32) -> [IVec3; 4] {
        [
            IVec3::new(x0, y, z0),
            IVec3::new(x0, y, z1),
            IVec3::new(x1, y, z1),
            IVec3::new(x1, y, z0),
        ]
    }

    fn ceil_rect(x0: i32, z0: i32, x1: i32, z1: i32, y: i32) -> [IVec3; 4] {
        let [a, b, c, d] = floor_rect(x0, z0, x1, z1, y);
        [a, d, c, b]
    }

    /// Wall in the plane x = `x`, facing -X.
    fn wall_facing_neg_x(x: i32) -> [IVec3; 4] {
        [
            IVec3::new(x, 0, -1000),
            IVec3::new(x, 0, 1000),
            IVec3::new(x, 1000, 1000),
            IVec3::new(x, 1000, -1000),
        ]
    }

    fn create_test_world() -> CollisionWorld {
        let mut world = CollisionWorld::default();

        // Ground at y=0
        add_quad(&mut world, flat_floor(2000, 0), SurfaceType::DEFAULT, SurfaceLifetime::Static);

        // Platform at y=200
        add_quad(
            &mut world,
            floor_rect(0, 0, 500, 500, 200),
            SurfaceType::DEFAULT,
            SurfaceLifetime::Static,
        );

        // Ceiling at y=1000
        add_quad(
            &mut world,
            ceil_rect(-2000, -2000, 2000, 2000, 1000),
            SurfaceType::DEFAULT,
            SurfaceLifetime::Static,
        );

        world
    }

    #[test]
    fn test_floor_dominance() {
        let world = create_test_world();

        let hit = world.find_floor(100.0, 900.0, 100.0);
        assert_eq!(hit.height, 200.0);
        assert!(hit.surface.is_some());

        // Below the platform only the ground qualifies
        assert_eq!(world.find_floor(100.0, 150.0, 100.0).height, 0.0);

        // Off the platform
        assert_eq!(world.find_floor(-100.0, 900.0, -100.0).height, 0.0);
    }

    #[test]
    fn test_floor_found_on_uneven_grid() {
        let mut world = CollisionWorld::new(CollisionConfig {
            level_boundary: 0x3000,
            ..Default::default()
        });
        add_quad(&mut world, flat_floor(0x2F00, 0), SurfaceType::DEFAULT, SurfaceLifetime::Static);

        assert_eq!(world.find_floor(-3300.0, 100.0, -2700.0).height, 0.0);
        assert_eq!(world.find_floor(12000.0, 100.0, -12000.0).height, 0.0);
    }

    #[test]
    fn test_no_floor_sentinel() {
        let world = create_test_world();

        assert_eq!(world.find_floor(100.0, -50.0, 100.0), FloorHit::NONE);
        assert_eq!(world.find_floor(3000.0, 500.0, 3000.0), FloorHit::NONE);

        // Outside the level boundary
        assert_eq!(world.find_floor(9000.0, 500.0, 0.0), FloorHit::NONE);
        assert_eq!(world.find_floor(0.0, 500.0, -8192.0), FloorHit::NONE);
    }

    #[test]
    fn test_floor_tie_goes_to_last_inserted() {
        let mut world = CollisionWorld::default();
        add_quad(&mut world, flat_floor(1000, 0), SurfaceType::DEFAULT, SurfaceLifetime::Static);
        add_quad(&mut world, flat_floor(1000, 0), SurfaceType::SLIPPERY, SurfaceLifetime::Static);

        let hit = world.find_floor(10.0, 100.0, 10.0);
        let surface = world.surface(hit.surface.unwrap()).unwrap();
        assert_eq!(surface.ty, SurfaceType::SLIPPERY);

        // Dynamic platforms override static ground at equal height
        add_quad(&mut world, flat_floor(1000, 0), SurfaceType::ICE, SurfaceLifetime::Dynamic);
        let hit = world.find_floor(10.0, 100.0, 10.0);
        assert_eq!(world.surface(hit.surface.unwrap()).unwrap().ty, SurfaceType::ICE);
        assert!(world.surface(hit.surface.unwrap()).unwrap().is_dynamic());
    }

    #[test]
    fn test_intangible_floor_filter() {
        let mut world = CollisionWorld::default();
        add_quad(&mut world, flat_floor(1000, 0), SurfaceType::DEFAULT, SurfaceLifetime::Static);
        add_quad(&mut world, flat_floor(1000, 100), SurfaceType::INTANGIBLE, SurfaceLifetime::Static);

        assert_eq!(world.find_floor(0.0, 500.0, 0.0).height, 0.0);
        let hit = world.find_floor_filtered(0.0, 500.0, 0.0, QueryFlags::INCLUDE_INTANGIBLE);
        assert_eq!(hit.height, 100.0);
    }

    #[test]
    fn test_camera_boundary_skipped_for_avatar() {
        let mut world = CollisionWorld::default();
        add_quad(&mut world, flat_floor(1000, 0), SurfaceType::DEFAULT, SurfaceLifetime::Static);
        add_quad(&mut world, flat_floor(1000, 50), SurfaceType::CAMERA_BOUNDARY, SurfaceLifetime::Static);

        assert_eq!(world.find_floor(0.0, 500.0, 0.0).height, 0.0);
        let hit = world.find_floor_filtered(0.0, 500.0, 0.0, QueryFlags::CAMERA);
        assert_eq!(hit.height, 50.0);
    }

    #[test]
    fn test_find_ceil() {
        let world = create_test_world();

        let hit = world.find_ceil(0.0, 300.0, 0.0);
        assert_eq!(hit.height, 1000.0);
        assert!(hit.surface.is_some());

        assert_eq!(world.find_ceil(0.0, 1200.0, 0.0), CeilHit::NONE);
    }

    #[test]
    fn test_lowest_ceiling_wins() {
        let mut world = create_test_world();
        add_quad(
            &mut world,
            ceil_rect(-100, -100, 100, 100, 600),
            SurfaceType::HANGABLE,
            SurfaceLifetime::Static,
        );

        let hit = world.find_ceil(0.0, 300.0, 0.0);
        assert_eq!(hit.height, 600.0);
        assert_eq!(world.surface(hit.surface.unwrap()).unwrap().ty, SurfaceType::HANGABLE);
    }

    #[test]
    fn test_wall_push_out() {
        let mut world = CollisionWorld::default();
        add_quad(&mut world, wall_facing_neg_x(500), SurfaceType::DEFAULT, SurfaceLifetime::Static);

        let mut pos = Vec3::new(480.0, 0.0, 0.0);
        let wall = world.resolve_and_return_wall_collisions(&mut pos, 30.0, 50.0);

        assert!(wall.is_some());
        assert!((pos.x - 450.0).abs() < 1e-3);
        assert_eq!(pos.z, 0.0);

        // Out of reach
        let mut far = Vec3::new(300.0, 0.0, 0.0);
        assert!(world.resolve_and_return_wall_collisions(&mut far, 30.0, 50.0).is_none());
        assert_eq!(far.x, 300.0);
    }

    #[test]
    fn test_wall_reference_cap() {
        let mut world = CollisionWorld::default();
        for _ in 0..6 {
            add_quad(&mut world, wall_facing_neg_x(500), SurfaceType::DEFAULT, SurfaceLifetime::Static);
        }

        // Only the lower triangle of each quad contains the test point
        let mut data = WallCollisionData::new(Vec3::new(480.0, 0.0, 0.0), 30.0, 50.0);
        let count = world.find_wall_collisions(&mut data);

        assert_eq!(count, 6);
        assert_eq!(data.walls.len(), 4);

        // Every push is measured from the position captured before the list
        assert!((data.x - 300.0).abs() < 1e-3);
    }

    #[test]
    fn test_wall_radius_capped() {
        let mut world = CollisionWorld::default();
        add_quad(&mut world, wall_facing_neg_x(500), SurfaceType::DEFAULT, SurfaceLifetime::Static);

        let mut data = WallCollisionData::new(Vec3::new(250.0, 0.0, 0.0), 30.0, 400.0);
        assert_eq!(world.find_wall_collisions(&mut data), 0);
    }

    #[test]
    fn test_water_level() {
        let mut world = create_test_world();
        assert_eq!(world.find_water_level(0.0, 0.0), FLOOR_LOWER_LIMIT);

        add_quad(&mut world, flat_floor(1000, 400), SurfaceType::NEW_WATER, SurfaceLifetime::Static);
        assert_eq!(world.find_water_level(0.0, 0.0), 400.0);

        // Water tops never count as floors
        assert_eq!(world.find_floor(-100.0, 900.0, -100.0).height, 0.0);
    }

    #[test]
    fn test_reset_dynamic_keeps_static() {
        let mut world = create_test_world();
        let statics = world.surface_count();

        add_quad(
            &mut world,
            floor_rect(-500, -500, -100, -100, 300),
            SurfaceType::DEFAULT,
            SurfaceLifetime::Dynamic,
        );
        assert_eq!(world.dynamic_surface_count(), 2);
        assert_eq!(world.find_floor(-200.0, 900.0, -200.0).height, 300.0);

        world.reset_dynamic();
        assert_eq!(world.surface_count(), statics);
        assert_eq!(world.find_floor(-200.0, 900.0, -200.0).height, 0.0);
    }

    #[test]
    fn test_force_dropped_for_plain_types() {
        let world = CollisionWorld::default();
        let tri = [IVec3::new(0, 0, 0), IVec3::new(0, 0, 100), IVec3::new(100, 0, 100)];

        assert_eq!(world.build_surface(tri, SurfaceType::DEFAULT, 7).unwrap().force, 0);
        assert_eq!(world.build_surface(tri, SurfaceType::HORIZONTAL_WIND, 7).unwrap().force, 7);

        let extended = CollisionWorld::new(CollisionConfig::extended_bounds());
        assert_eq!(extended.build_surface(tri, SurfaceType::DEFAULT, 7).unwrap().force, 7);
    }
}
