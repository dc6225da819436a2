//! Ray casting through the partition.
//!
//! The ray walks the grid cell by cell with an Amanatides-Woo voxel
//! traversal and tests every listed triangle with Moller-Trumbore. The
//! closest hit along the ray wins.

use glam::Vec3;

use super::flags::{RaycastFlags, SurfaceFlags};
use super::partition::SurfaceLifetime;
use super::surface::{Surface, SurfaceId, SurfaceKind, SurfaceType};
use super::world::CollisionWorld;

const NEAR_ZERO: f32 = 1.0e-5;
const NEAR_ONE: f32 = 0.99999;

/// Result of [`CollisionWorld::find_surface_on_ray`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Closest surface hit, if any.
    pub surface: Option<SurfaceId>,
    /// Hit point, or `origin + dir` on a miss.
    pub hit_pos: Vec3,
    /// Distance to the hit, or the full ray length on a miss.
    pub length: f32,
}

impl RayHit {
    pub fn hit_something(&self) -> bool {
        self.surface.is_some()
    }
}

impl CollisionWorld {
    /// Cast a ray from `origin` along `dir`; the ray's length is `|dir|`.
    pub fn find_surface_on_ray(&self, origin: Vec3, dir: Vec3, flags: RaycastFlags) -> RayHit {
        let dir_length = dir.length();
        let mut hit = RayHit {
            surface: None,
            hit_pos: origin + dir,
            length: dir_length,
        };

        let Some(normalized) = dir.try_normalize() else {
            return hit;
        };

        let boundary = self.config.level_boundary as f32;
        let inv_cell = 1.0 / self.config.cell_size as f32;
        let start_x = (origin.x + boundary) * inv_cell;
        let start_z = (origin.z + boundary) * inv_cell;
        let end_x = (origin.x + dir.x + boundary) * inv_cell;
        let end_z = (origin.z + dir.z + boundary) * inv_cell;

        let ray = Ray {
            origin,
            dir: normalized,
            dir_length,
            flags,
        };

        // Straight up or down stays in one cell
        if normalized.y >= NEAR_ONE || normalized.y <= -NEAR_ONE {
            self.ray_cell(start_x as i32, start_z as i32, &ray, &mut hit);
            return hit;
        }

        let rd_x = end_x - start_x;
        let rd_z = end_z - start_z;
        let mut p_x = (start_x as i32) as f32;
        let mut p_z = (start_z as i32) as f32;
        let rdinv_x = 1.0 / rd_x;
        let rdinv_z = 1.0 / rd_z;
        let stp_x = signum_positive(rd_x);
        let stp_z = signum_positive(rd_z);
        let delta_x = min(rdinv_x * stp_x, 1.0);
        let delta_z = min(rdinv_z * stp_z, 1.0);
        let mut t_max_x = ((p_x + stp_x.max(0.0) - start_x) * rdinv_x).abs();
        let mut t_max_z = ((p_z + stp_z.max(0.0) - start_z) * rdinv_z).abs();

        loop {
            self.ray_cell(p_x as i32, p_z as i32, &ray, &mut hit);

            let t_next = min(t_max_x, t_max_z);
            if t_next > 1.0 {
                break;
            }

            if t_max_x < t_max_z {
                t_max_x += delta_x;
                p_x += stp_x;
            } else {
                t_max_z += delta_z;
                p_z += stp_z;
            }
        }

        hit
    }

    fn ray_cell(&self, cell_x: i32, cell_z: i32, ray: &Ray, hit: &mut RayHit) {
        let Some(cell) = self.partition.cell(cell_x, cell_z) else {
            return;
        };

        let mut kinds = Vec::with_capacity(4);
        if ray.dir.y > -NEAR_ONE && ray.flags.contains(RaycastFlags::CEIL) {
            kinds.push(SurfaceKind::Ceiling);
        }
        if ray.dir.y < NEAR_ONE && ray.flags.contains(RaycastFlags::FLOOR) {
            kinds.push(SurfaceKind::Floor);
        }
        if ray.flags.contains(RaycastFlags::WALL) {
            kinds.push(SurfaceKind::Wall);
        }
        if ray.flags.contains(RaycastFlags::WATER) {
            kinds.push(SurfaceKind::Water);
        }

        for kind in kinds {
            for lifetime in [SurfaceLifetime::Static, SurfaceLifetime::Dynamic] {
                self.ray_list(cell.bucket(lifetime, kind), ray, hit);
            }
        }
    }

    fn ray_list(&self, list: &[SurfaceId], ray: &Ray, hit: &mut RayHit) {
        let end_y = ray.origin.y + ray.dir.y * ray.dir_length;
        let (top, bottom) = if ray.dir.y >= 0.0 {
            (end_y, ray.origin.y)
        } else {
            (ray.origin.y, end_y)
        };

        for &id in list {
            let Some(surf) = self.surface(id) else { continue };

            if surf.lower_y as f32 > top || (surf.upper_y as f32) < bottom {
                continue;
            }

            if let Some((pos, length)) = ray_surface_intersect(ray, surf) {
                if length <= hit.length {
                    hit.surface = Some(id);
                    hit.hit_pos = pos;
                    hit.length = length;
                }
            }
        }
    }
}

struct Ray {
    origin: Vec3,
    /// Unit direction.
    dir: Vec3,
    dir_length: f32,
    flags: RaycastFlags,
}

/// Moller-Trumbore against one triangle. Back faces miss.
fn ray_surface_intersect(ray: &Ray, surf: &Surface) -> Option<(Vec3, f32)> {
    if surf.ty == SurfaceType::INTANGIBLE || surf.flags.contains(SurfaceFlags::NO_CAM_COLLISION) {
        return None;
    }

    let [v0, v1, v2] = surf.vertices.map(|v| v.as_vec3());
    let e1 = v1 - v0;
    let e2 = v2 - v0;
    let h = ray.dir.cross(e2);

    let det = e1.dot(h);
    if det < NEAR_ZERO {
        return None;
    }

    let f = 1.0 / det;
    let s = ray.origin - v0;
    let u = f * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(e1);
    let v = f * ray.dir.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let length = f * e2.dot(q);
    if length <= NEAR_ZERO || length > ray.dir_length {
        return None;
    }

    Some((ray.origin + ray.dir * length, length))
}

#[inline]
fn signum_positive(x: f32) -> f32 {
    if x >= 0.0 {
        1.0
    } else {
        -1.0
    }
}

/// `a < b ? a : b`, keeping the first operand's NaN behaviour.
#[inline]
fn min(a: f32, b: f32) -> f32 {
    if a < b {
        a
    } else {
        b
    }
}

#[cfg(test)]
mod tests {
    use glam::IVec3;

    use super::*;

    fn create_test_world() -> CollisionWorld {
        let mut world = CollisionWorld::default();
        let floor = [
            [IVec3::new(-1000, 0, -1000), IVec3::new(-1000, 0, 1000), IVec3::new(1000, 0, 1000)],
            [IVec3::new(-1000, 0, -1000), IVec3::new(1000, 0, 1000), IVec3::new(1000, 0, -1000)],
        ];
        // Facing -X at x=500
        let wall = [
            [IVec3::new(500, 0, -1000), IVec3::new(500, 0, 1000), IVec3::new(500, 1000, 1000)],
            [IVec3::new(500, 0, -1000), IVec3::new(500, 1000, 1000), IVec3::new(500, 1000, -1000)],
        ];
        for tri in floor.into_iter().chain(wall) {
            world.add_static_surface(tri, SurfaceType::DEFAULT, 0).unwrap();
        }
        world
    }

    #[test]
    fn test_vertical_ray_hits_floor() {
        let world = create_test_world();

        let hit = world.find_surface_on_ray(
            Vec3::new(10.0, 500.0, -20.0),
            Vec3::new(0.0, -1000.0, 0.0),
            RaycastFlags::ALL,
        );

        assert!(hit.hit_something());
        assert!(hit.hit_pos.y.abs() < 1e-3);
        assert!((hit.length - 500.0).abs() < 1e-3);
    }

    #[test]
    fn test_short_vertical_ray_misses() {
        let world = create_test_world();
        let origin = Vec3::new(10.0, 500.0, -20.0);
        let dir = Vec3::new(0.0, -400.0, 0.0);

        let hit = world.find_surface_on_ray(origin, dir, RaycastFlags::ALL);

        assert!(!hit.hit_something());
        assert_eq!(hit.hit_pos, origin + dir);
        assert_eq!(hit.length, 400.0);
    }

    #[test]
    fn test_horizontal_ray_crosses_cells_to_wall() {
        let world = create_test_world();

        let hit = world.find_surface_on_ray(
            Vec3::new(-1500.0, 100.0, 0.0),
            Vec3::new(3000.0, 0.0, 0.0),
            RaycastFlags::SOLID,
        );

        assert!(hit.hit_something());
        assert!((hit.hit_pos.x - 500.0).abs() < 1e-2);
        assert!((hit.length - 2000.0).abs() < 1e-2);
    }

    #[test]
    fn test_flags_filter_buckets() {
        let world = create_test_world();

        let hit = world.find_surface_on_ray(
            Vec3::new(-1500.0, 100.0, 0.0),
            Vec3::new(3000.0, 0.0, 0.0),
            RaycastFlags::FLOOR,
        );
        assert!(!hit.hit_something());
    }

    #[test]
    fn test_back_face_is_skipped() {
        let world = create_test_world();

        // From behind the wall travelling -X
        let hit = world.find_surface_on_ray(
            Vec3::new(900.0, 100.0, 0.0),
            Vec3::new(-800.0, 0.0, 0.0),
            RaycastFlags::WALL,
        );
        assert!(!hit.hit_something());
    }

    #[test]
    fn test_zero_length_ray() {
        let world = create_test_world();
        let hit = world.find_surface_on_ray(Vec3::new(0.0, 10.0, 0.0), Vec3::ZERO, RaycastFlags::ALL);
        assert!(!hit.hit_something());
        assert_eq!(hit.length, 0.0);
    }
}
