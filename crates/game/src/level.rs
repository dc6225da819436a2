//! Level loading and management.

use glam::{IVec3, Vec3};
use hopper_physics::collision::SurfaceId;
use hopper_physics::math::sins;
use hopper_physics::{Angle, AreaInfo, CollisionConfig, CollisionWorld, SurfaceRef, SurfaceType};
use serde::{Deserialize, Serialize};

use crate::collision_data::{CollisionData, CollisionDataError};

/// A game level containing collision geometry and spawn points.
#[derive(Debug)]
pub struct Level {
    /// Level identifier.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Collision world for physics.
    pub collision: CollisionWorld,

    /// Area settings the action code reads.
    pub area: AreaInfo,

    /// Player spawn points.
    pub spawn_points: Vec<SpawnPoint>,

    /// Platforms re-inserted as dynamic surfaces every frame.
    pub platforms: Vec<MovingPlatform>,
}

/// A spawn point for players.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnPoint {
    /// Position in world space.
    pub position: Vec3,

    /// Initial facing.
    pub yaw: Angle,

    /// Warp node that sends players here.
    pub warp_node: u8,
}

/// A solid box that oscillates along `travel`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovingPlatform {
    /// Corners of the box at rest.
    pub min: IVec3,
    pub max: IVec3,

    /// Furthest offset from rest.
    pub travel: Vec3,

    /// Frames for one full swing.
    pub period: u32,

    pub ty: SurfaceType,

    /// Surfaces inserted this frame.
    #[serde(skip)]
    surfaces: Vec<SurfaceId>,
}

/// The six faces of a box, wound to face outward.
fn box_quads(min: IVec3, max: IVec3) -> [[IVec3; 4]; 6] {
    let (x0, y0, z0) = (min.x, min.y, min.z);
    let (x1, y1, z1) = (max.x, max.y, max.z);
    let v = IVec3::new;
    [
        // Top
        [v(x0, y1, z0), v(x0, y1, z1), v(x1, y1, z1), v(x1, y1, z0)],
        // Bottom
        [v(x0, y0, z0), v(x1, y0, z0), v(x1, y0, z1), v(x0, y0, z1)],
        // -X
        [v(x0, y0, z0), v(x0, y0, z1), v(x0, y1, z1), v(x0, y1, z0)],
        // +X
        [v(x1, y0, z0), v(x1, y1, z0), v(x1, y1, z1), v(x1, y0, z1)],
        // -Z
        [v(x0, y0, z0), v(x0, y1, z0), v(x1, y1, z0), v(x1, y0, z0)],
        // +Z
        [v(x0, y0, z1), v(x1, y0, z1), v(x1, y1, z1), v(x0, y1, z1)],
    ]
}

/// Split a quad into two triangles sharing the first and third corners.
fn quad_triangles(quad: [IVec3; 4]) -> [[IVec3; 3]; 2] {
    let [a, b, c, d] = quad;
    [[a, b, c], [a, c, d]]
}

impl MovingPlatform {
    pub fn new(min: IVec3, max: IVec3, travel: Vec3, period: u32) -> Self {
        Self {
            min,
            max,
            travel,
            period: period.max(1),
            ty: SurfaceType::DEFAULT,
            surfaces: Vec::new(),
        }
    }

    /// Offset from rest on `frame`.
    pub fn offset_at(&self, frame: u32) -> Vec3 {
        let phase = (frame % self.period) as u64 * 0x10000 / self.period as u64;
        self.travel * sins(Angle(phase as u16 as i16))
    }

    /// Whole-unit offset the surfaces are placed at on `frame`.
    pub fn placed_offset(&self, frame: u32) -> Vec3 {
        self.offset_at(frame).round()
    }

    /// Insert this frame's surfaces. The world's dynamic set must have been
    /// reset first.
    fn insert(&mut self, world: &mut CollisionWorld, frame: u32) {
        let offset = self.placed_offset(frame).as_ivec3();
        self.surfaces.clear();
        for quad in box_quads(self.min + offset, self.max + offset) {
            for tri in quad_triangles(quad) {
                if let Some(id) = world.add_dynamic_surface(tri, self.ty, 0) {
                    self.surfaces.push(id);
                }
            }
        }
    }

    /// Whether `surface` is one of this frame's platform surfaces.
    pub fn owns(&self, surface: SurfaceRef) -> bool {
        match surface {
            SurfaceRef::Store(id) => self.surfaces.contains(&id),
            SurfaceRef::WaterPseudoFloor => false,
        }
    }
}

impl Level {
    /// Create an empty level.
    pub fn new(id: &str, name: &str, config: CollisionConfig) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            collision: CollisionWorld::new(config),
            area: AreaInfo::default(),
            spawn_points: Vec::new(),
            platforms: Vec::new(),
        }
    }

    /// Build a level from a collision command stream.
    pub fn from_collision_data(
        id: &str,
        name: &str,
        words: &[i16],
        config: CollisionConfig,
    ) -> Result<Self, CollisionDataError> {
        let data = CollisionData::decode(words, config.all_surfaces_have_force)?;
        let mut level = Self::new(id, name, config);
        let stats = data.load_into(&mut level.collision);
        log::info!(
            "Loaded level {} with {} surfaces",
            level.id,
            stats.surfaces
        );
        Ok(level)
    }

    /// Create a simple test level for development.
    pub fn test_arena() -> Self {
        let mut level = Self::new("test_arena", "Test Arena", CollisionConfig::default());

        // Floor
        level.add_quad(
            [
                IVec3::new(-3000, 0, -3000),
                IVec3::new(-3000, 0, 3000),
                IVec3::new(3000, 0, 3000),
                IVec3::new(3000, 0, -3000),
            ],
            SurfaceType::DEFAULT,
        );

        // Perimeter walls
        let wall_height = 800;
        let thickness = 100;
        let size = 3000;
        level.add_box(
            IVec3::new(-size - thickness, 0, -size),
            IVec3::new(-size, wall_height, size),
            SurfaceType::DEFAULT,
        );
        level.add_box(
            IVec3::new(size, 0, -size),
            IVec3::new(size + thickness, wall_height, size),
            SurfaceType::DEFAULT,
        );
        level.add_box(
            IVec3::new(-size, 0, -size - thickness),
            IVec3::new(size, wall_height, -size),
            SurfaceType::DEFAULT,
        );
        level.add_box(
            IVec3::new(-size, 0, size),
            IVec3::new(size, wall_height, size + thickness),
            SurfaceType::DEFAULT,
        );

        // A block too tall to step onto
        level.add_box(
            IVec3::new(500, 0, 500),
            IVec3::new(900, 300, 900),
            SurfaceType::DEFAULT,
        );

        // Ramp rising toward +Z
        level.add_quad(
            [
                IVec3::new(-1500, 0, 500),
                IVec3::new(-1500, 400, 1500),
                IVec3::new(-1100, 400, 1500),
                IVec3::new(-1100, 0, 500),
            ],
            SurfaceType::NOT_SLIPPERY,
        );

        // Shallow puddle
        for tri in quad_triangles([
            IVec3::new(-2500, 60, -2500),
            IVec3::new(-2500, 60, -2000),
            IVec3::new(-2000, 60, -2000),
            IVec3::new(-2000, 60, -2500),
        ]) {
            level.collision.add_static_surface(tri, SurfaceType::NEW_WATER, 0);
        }

        // Lift
        level.platforms.push(MovingPlatform::new(
            IVec3::new(1500, 200, -500),
            IVec3::new(1900, 260, -100),
            Vec3::new(0.0, 300.0, 0.0),
            240,
        ));

        // Spawn points
        level.spawn_points.push(SpawnPoint {
            position: Vec3::ZERO,
            yaw: Angle::ZERO,
            warp_node: 0x0A,
        });
        level.spawn_points.push(SpawnPoint {
            position: Vec3::new(0.0, 0.0, -1500.0),
            yaw: Angle::HALF,
            warp_node: 0xF3,
        });

        level
    }

    /// Add a static quad.
    pub fn add_quad(&mut self, quad: [IVec3; 4], ty: SurfaceType) {
        for tri in quad_triangles(quad) {
            self.collision.add_static_surface(tri, ty, 0);
        }
    }

    /// Add a static solid box.
    pub fn add_box(&mut self, min: IVec3, max: IVec3, ty: SurfaceType) {
        for quad in box_quads(min, max) {
            self.add_quad(quad, ty);
        }
    }

    /// Drop last frame's platform surfaces and insert this frame's.
    ///
    /// Must run before any avatar queries the world on `frame`.
    pub fn begin_frame(&mut self, frame: u32) {
        self.collision.reset_dynamic();
        for platform in &mut self.platforms {
            platform.insert(&mut self.collision, frame);
        }
    }

    /// How far the platform under `floor` moves going into `frame`.
    ///
    /// `floor` must come from the previous frame, before
    /// [`begin_frame`](Self::begin_frame) resets the dynamic surfaces.
    pub fn platform_displacement(&self, floor: Option<SurfaceRef>, frame: u32) -> Vec3 {
        let (Some(floor), Some(prev)) = (floor, frame.checked_sub(1)) else {
            return Vec3::ZERO;
        };
        self.platforms
            .iter()
            .find(|p| p.owns(floor))
            .map_or(Vec3::ZERO, |p| p.placed_offset(frame) - p.placed_offset(prev))
    }

    /// Get a player spawn point.
    pub fn spawn(&self, index: usize) -> Option<&SpawnPoint> {
        self.spawn_points.get(index)
    }

    /// Spawn point for a warp node, falling back to the first spawn.
    pub fn warp_destination(&self, node: u8) -> Option<&SpawnPoint> {
        self.spawn_points
            .iter()
            .find(|s| s.warp_node == node)
            .or_else(|| self.spawn_points.first())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision_data::{COL_END, COL_INIT, COL_TRI_STOP};

    #[test]
    fn test_level_creation() {
        let level = Level::new("test", "Test Level", CollisionConfig::default());
        assert_eq!(level.id, "test");
        assert_eq!(level.collision.surface_count(), 0);
    }

    #[test]
    fn test_test_arena() {
        let level = Level::test_arena();
        assert!(level.collision.static_surface_count() > 0);
        assert!(level.spawn_points.len() >= 2);
        assert_eq!(level.collision.find_floor(0.0, 100.0, 0.0).height, 0.0);
        assert_eq!(level.collision.find_water_level(-2200.0, -2200.0), 60.0);
    }

    #[test]
    fn test_box_faces_point_outward() {
        let mut level = Level::new("test", "Test", CollisionConfig::default());
        level.add_box(IVec3::new(0, 0, 0), IVec3::new(400, 300, 400), SurfaceType::DEFAULT);

        assert_eq!(level.collision.find_floor(200.0, 1000.0, 200.0).height, 300.0);
        assert_eq!(level.collision.find_ceil(200.0, -100.0, 200.0).height, 0.0);
    }

    #[test]
    fn test_platform_reinserted_each_frame() {
        let mut level = Level::test_arena();
        let statics = level.collision.static_surface_count();

        level.begin_frame(0);
        let dynamics = level.collision.dynamic_surface_count();
        assert_eq!(dynamics, 12);

        level.begin_frame(1);
        assert_eq!(level.collision.dynamic_surface_count(), dynamics);
        assert_eq!(level.collision.static_surface_count(), statics);
    }

    #[test]
    fn test_platform_swings_and_carries() {
        let mut level = Level::test_arena();
        let platform = &level.platforms[0];
        assert_eq!(platform.offset_at(0), Vec3::ZERO);
        assert!((platform.offset_at(60).y - 300.0).abs() < 1.0);

        level.begin_frame(10);
        let hit = level.collision.find_floor(1700.0, 2000.0, -300.0);
        let floor = hit.surface.map(SurfaceRef::from);
        assert!(hit.height > 260.0);

        let moved = level.platform_displacement(floor, 11);
        assert!(moved.y > 0.0);

        // Riders move exactly as far as the surfaces do.
        level.begin_frame(11);
        let next = level.collision.find_floor(1700.0, 2000.0, -300.0);
        assert_eq!(next.height - hit.height, moved.y);

        // Ground is not a platform.
        let ground = level.collision.find_floor(0.0, 100.0, 0.0).surface.map(SurfaceRef::from);
        assert_eq!(level.platform_displacement(ground, 11), Vec3::ZERO);
    }

    #[test]
    fn test_warp_destination_falls_back() {
        let level = Level::test_arena();
        assert_eq!(level.warp_destination(0xF3).map(|s| s.position.z), Some(-1500.0));
        assert_eq!(level.warp_destination(0x55).map(|s| s.position), Some(Vec3::ZERO));
    }

    #[test]
    #[rustfmt::skip]
    fn test_from_collision_data() {
        let words = [
            COL_INIT, 3, 0, 0, 0, 0, 0, 500, 500, 0, 500,
            0, 1, 0, 1, 2,
            COL_TRI_STOP, COL_END,
        ];
        let level = Level::from_collision_data("tri", "Triangle", &words, CollisionConfig::default())
            .unwrap();
        assert_eq!(level.collision.surface_count(), 1);

        let err = Level::from_collision_data("bad", "Bad", &words[..5], CollisionConfig::default());
        assert!(err.is_err());
    }
}
