//! Quarter-step motion integration.
//!
//! A frame's displacement is applied in four equal parts, each followed by a
//! fresh round of wall, floor and ceiling queries. A quarter of the fastest
//! normal speed is smaller than the wall push radius, so the avatar cannot
//! skip over a wall between two queries.
//!
//! # Results
//!
//! - [`GroundStep`]: none / left ground / hit wall
//! - [`AirStep`]: none / landed / hit wall / grabbed ledge / grabbed ceiling /
//!   hit lava wall

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::collision::{
    CeilHit, CollisionWorld, FloorHit, Surface, SurfaceId, SurfaceRef, SurfaceType,
    WallCollisionData,
};
use crate::math::{atan2s, Angle, Orientation, COS25};

use super::action::ActionId;
use super::context::ActionContext;
use super::state::{AvatarFlags, InputFlags};

/// Height of the avatar's collision cylinder.
pub const HITBOX_HEIGHT: f32 = 160.0;

/// Floors are searched from this far above the query point so small steps
/// up are still found.
pub const FLOOR_QUERY_BUFFER: f32 = 78.0;

/// Push speeds for moving quicksand, indexed by the force's upper byte.
const MOVING_SAND_SPEEDS: [f32; 4] = [12.0, 8.0, 4.0, 0.0];

/// Outcome of a ground step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroundStep {
    None,
    LeftGround,
    HitWall,
}

/// Outcome of an air step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AirStep {
    None,
    Landed,
    HitWall,
    GrabbedLedge,
    GrabbedCeiling,
    HitLavaWall,
}

/// Optional checks for [`ActionContext::perform_air_step`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirStepFlags(pub u32);

impl AirStepFlags {
    pub const NONE: Self = Self(0);
    pub const CHECK_LEDGE_GRAB: Self = Self(1 << 0);
    pub const CHECK_HANG: Self = Self(1 << 1);

    #[inline]
    pub fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }
}

impl std::ops::BitOr for AirStepFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GroundQuarter {
    None,
    LeftGround,
    /// Blocked; the remaining quarter steps are skipped.
    Stop,
    /// Pressing into a wall; keep stepping.
    Continue,
}

/// Floor under an avatar-sized point.
pub fn find_avatar_floor(world: &CollisionWorld, x: f32, y: f32, z: f32) -> FloorHit {
    world.find_floor(x, y + FLOOR_QUERY_BUFFER, z)
}

/// Ceiling over an avatar standing at `pos` on a floor at `floor_height`.
pub fn find_avatar_ceil(world: &CollisionWorld, pos: Vec3, floor_height: f32) -> CeilHit {
    world.find_ceil(pos.x, floor_height.max(pos.y) + 3.0, pos.z)
}

/// Push `pos` out of walls and keep the walls that pushed.
fn collide_walls(world: &CollisionWorld, pos: &mut Vec3, offset_y: f32, radius: f32) -> Vec<SurfaceId> {
    let mut data = WallCollisionData::new(*pos, offset_y, radius);
    world.find_wall_collisions(&mut data);
    *pos = data.pos();
    data.walls
}

impl<'a> ActionContext<'a> {
    fn set_floor(&mut self, floor: SurfaceRef, height: f32) {
        self.avatar.floor = Some(floor);
        self.avatar.floor_height = height;
    }

    /// Water top acts as the floor while riding a shell over it.
    fn shell_floor(&self, floor: SurfaceRef, height: f32, water_level: f32) -> (SurfaceRef, f32) {
        if self.avatar.action.has(ActionId::FLAG_RIDING_SHELL) && height < water_level {
            (SurfaceRef::WaterPseudoFloor, water_level)
        } else {
            (floor, height)
        }
    }

    fn update_render_transform(&mut self) {
        let m = &mut *self.avatar;
        m.render.pos = m.pos;
        m.render.angle = Orientation::from_yaw(m.face_angle.yaw);
    }

    // ========================================================================
    // Ground
    // ========================================================================

    fn ground_quarter_step(&mut self, mut next: Vec3) -> GroundQuarter {
        let world: &'a CollisionWorld = self.world;

        collide_walls(world, &mut next, 30.0, 24.0);
        let upper_walls = collide_walls(world, &mut next, 60.0, 50.0);

        let floor_hit = find_avatar_floor(world, next.x, next.y, next.z);
        let ceil_height = find_avatar_ceil(world, next, floor_hit.height).height;
        let water_level = world.find_water_level(next.x, next.z);

        let wall_id = upper_walls.last().copied();
        self.avatar.wall = wall_id.map(SurfaceRef::from);
        if let Some(surf) = wall_id.and_then(|id| world.surface(id)) {
            self.avatar.wall_yaw = surf.yaw();
        }

        let Some(floor_id) = floor_hit.surface else {
            return GroundQuarter::Stop;
        };
        let (floor, floor_height) = self.shell_floor(floor_id.into(), floor_hit.height, water_level);

        if next.y > floor_height + 100.0 {
            if next.y + HITBOX_HEIGHT >= ceil_height {
                return GroundQuarter::Stop;
            }
            self.avatar.pos = next;
            self.set_floor(floor, floor_height);
            return GroundQuarter::LeftGround;
        }

        if floor_height + HITBOX_HEIGHT >= ceil_height {
            return GroundQuarter::Stop;
        }

        self.avatar.pos = Vec3::new(next.x, floor_height, next.z);
        self.set_floor(floor, floor_height);

        let face = self.avatar.face_angle.yaw;
        for surf in upper_walls.iter().filter_map(|&id| world.surface(id)) {
            let dyaw = (surf.yaw() - face).0;
            // Walls met side-on are slid along without a bonk.
            if (0x2AAA..=0x5555).contains(&dyaw) || (-0x5555..=-0x2AAA).contains(&dyaw) {
                continue;
            }
            return GroundQuarter::Continue;
        }

        GroundQuarter::None
    }

    /// Move along the floor by this frame's velocity.
    pub fn perform_ground_step(&mut self) -> GroundStep {
        let mut result = GroundQuarter::None;

        for _ in 0..4 {
            let normal_y = self.floor_normal().y;
            let m = &*self.avatar;
            let next = Vec3::new(
                m.pos.x + normal_y * (m.vel.x / 4.0),
                m.pos.y,
                m.pos.z + normal_y * (m.vel.z / 4.0),
            );

            result = self.ground_quarter_step(next);
            if matches!(result, GroundQuarter::LeftGround | GroundQuarter::Stop) {
                break;
            }
        }

        self.update_render_transform();

        match result {
            GroundQuarter::None => GroundStep::None,
            GroundQuarter::LeftGround => GroundStep::LeftGround,
            GroundQuarter::Stop | GroundQuarter::Continue => GroundStep::HitWall,
        }
    }

    /// Stand in place, unless sand or wind is pushing.
    pub fn stationary_ground_step(&mut self) -> GroundStep {
        self.set_forward_vel(0.0);

        let sand = self.update_moving_sand();
        let wind = self.update_windy_ground();
        if sand || wind {
            return self.perform_ground_step();
        }

        self.avatar.pos.y = self.avatar.floor_height;
        self.update_render_transform();
        GroundStep::None
    }

    /// Moving quicksand drags the avatar along its force direction.
    pub fn update_moving_sand(&mut self) -> bool {
        let Some(floor) = self.floor() else {
            return false;
        };
        if !matches!(
            floor.ty,
            SurfaceType::DEEP_MOVING_QUICKSAND
                | SurfaceType::SHALLOW_MOVING_QUICKSAND
                | SurfaceType::MOVING_QUICKSAND
                | SurfaceType::INSTANT_MOVING_QUICKSAND
        ) {
            return false;
        }

        let push_angle = Angle::from_i32(i32::from(floor.force) << 8);
        let push_speed = MOVING_SAND_SPEEDS[((floor.force >> 8) & 0x3) as usize];
        self.avatar.vel.x += push_speed * push_angle.sin();
        self.avatar.vel.z += push_speed * push_angle.cos();
        true
    }

    fn horizontal_wind_floor(&self) -> Option<&'a Surface> {
        let floor = self.floor()?;
        if floor.ty != SurfaceType::HORIZONTAL_WIND {
            return None;
        }
        if self.config.wind_resistant_metal_cap && self.avatar.flags.has(AvatarFlags::METAL_CAP) {
            return None;
        }
        Some(floor)
    }

    /// Wind floors push harder against the avatar's heading.
    pub fn update_windy_ground(&mut self) -> bool {
        let Some(floor) = self.horizontal_wind_floor() else {
            return false;
        };

        let push_angle = Angle::from_i32(i32::from(floor.force) << 8);
        let m = &mut *self.avatar;

        let push_speed = if m.action.has(ActionId::FLAG_MOVING) {
            let dyaw = m.face_angle.yaw - push_angle;
            let mut speed = if m.forward_vel > 0.0 {
                -m.forward_vel * 0.5
            } else {
                -8.0
            };
            if dyaw.within(0x4000) {
                speed = -speed;
            }
            speed * dyaw.cos()
        } else {
            3.2 + (self.frame % 4) as f32
        };

        m.vel.x += push_speed * push_angle.sin();
        m.vel.z += push_speed * push_angle.cos();
        true
    }

    /// Sink into quicksand, or die in it.
    ///
    /// Returns `true` when the avatar was pulled under.
    pub fn update_quicksand(&mut self, sinking_speed: f32) -> bool {
        if self.avatar.action.has(ActionId::FLAG_RIDING_SHELL) {
            self.avatar.quicksand_depth = 0.0;
            return false;
        }

        if self.avatar.quicksand_depth < 1.1 {
            self.avatar.quicksand_depth = 1.1;
        }

        let floor_type = self.floor_type();
        let depth = &mut self.avatar.quicksand_depth;
        let cap = match floor_type {
            SurfaceType::SHALLOW_QUICKSAND => 10.0,
            SurfaceType::SHALLOW_MOVING_QUICKSAND => 25.0,
            SurfaceType::QUICKSAND | SurfaceType::MOVING_QUICKSAND => 60.0,
            SurfaceType::DEEP_QUICKSAND | SurfaceType::DEEP_MOVING_QUICKSAND => {
                *depth += sinking_speed;
                if *depth >= 160.0 {
                    self.reset_camera();
                    return self.drop_and_set_action(ActionId::QUICKSAND_DEATH, 0);
                }
                return false;
            }
            SurfaceType::INSTANT_QUICKSAND | SurfaceType::INSTANT_MOVING_QUICKSAND => {
                self.reset_camera();
                return self.drop_and_set_action(ActionId::QUICKSAND_DEATH, 0);
            }
            _ => {
                *depth = 0.0;
                return false;
            }
        };

        *depth = (*depth + sinking_speed).min(cap);
        false
    }

    // ========================================================================
    // Air
    // ========================================================================

    /// Land on whatever was last recorded as the floor.
    fn land_on_previous_floor(&mut self, next_y: f32) -> AirStep {
        if next_y <= self.avatar.floor_height {
            self.avatar.pos.y = self.avatar.floor_height;
            AirStep::Landed
        } else {
            self.avatar.pos.y = next_y;
            AirStep::HitWall
        }
    }

    /// A hand-hold exists above the wall the avatar is falling past.
    fn check_ledge_grab(
        &self,
        wall: &Surface,
        intended: Vec3,
        next: Vec3,
    ) -> Option<(Vec3, SurfaceId)> {
        let m = &*self.avatar;
        if m.vel.y > 0.0 {
            return None;
        }

        // Moving away from the wall
        let dx = next.x - intended.x;
        let dz = next.z - intended.z;
        if dx * m.vel.x + dz * m.vel.z > 0.0 {
            return None;
        }

        let ledge_x = next.x - wall.normal.x * 60.0;
        let ledge_z = next.z - wall.normal.z * 60.0;
        let hit = find_avatar_floor(self.world, ledge_x, next.y + HITBOX_HEIGHT, ledge_z);
        let floor = hit.surface?;

        if hit.height - next.y <= 100.0 {
            return None;
        }
        if self.world.surface(floor).map_or(true, |f| f.normal.y < COS25) {
            return None;
        }

        Some((Vec3::new(ledge_x, hit.height, ledge_z), floor))
    }

    fn air_quarter_step(&mut self, intended: Vec3, flags: AirStepFlags) -> AirStep {
        let world: &'a CollisionWorld = self.world;
        let mut next = intended;

        let upper_walls = collide_walls(world, &mut next, 150.0, 50.0);
        let lower_walls = collide_walls(world, &mut next, 30.0, 50.0);

        let floor_hit = find_avatar_floor(world, next.x, next.y, next.z);
        let ceil_hit = find_avatar_ceil(world, next, floor_hit.height);
        let water_level = world.find_water_level(next.x, next.z);

        self.avatar.wall = None;

        // Out of bounds
        let Some(floor_id) = floor_hit.surface else {
            return self.land_on_previous_floor(next.y);
        };
        let (floor, floor_height) = self.shell_floor(floor_id.into(), floor_hit.height, water_level);

        if next.y <= floor_height {
            if ceil_hit.height - floor_height > HITBOX_HEIGHT {
                self.avatar.pos.x = next.x;
                self.avatar.pos.z = next.z;
                self.set_floor(floor, floor_height);
            }
            self.avatar.pos.y = floor_height;
            return AirStep::Landed;
        }

        if next.y + HITBOX_HEIGHT > ceil_hit.height {
            if self.avatar.vel.y >= 0.0 {
                self.avatar.vel.y = 0.0;
                let hangable = ceil_hit
                    .surface
                    .and_then(|id| world.surface(id))
                    .is_some_and(|c| c.ty == SurfaceType::HANGABLE);
                if flags.contains(AirStepFlags::CHECK_HANG) && hangable {
                    self.avatar.ceil = ceil_hit.surface.map(SurfaceRef::from);
                    return AirStep::GrabbedCeiling;
                }
                return AirStep::None;
            }
            return self.land_on_previous_floor(next.y);
        }

        if flags.contains(AirStepFlags::CHECK_LEDGE_GRAB) && upper_walls.is_empty() {
            if let Some(wall) = lower_walls.last().and_then(|&id| world.surface(id)) {
                if let Some((ledge_pos, ledge_floor)) = self.check_ledge_grab(wall, intended, next) {
                    let m = &mut *self.avatar;
                    m.pos = ledge_pos;
                    m.floor = Some(ledge_floor.into());
                    m.floor_height = ledge_pos.y;
                    if let Some(surf) = world.surface(ledge_floor) {
                        m.floor_angle = atan2s(surf.normal.z, surf.normal.x);
                    }
                    m.face_angle.pitch = Angle::ZERO;
                    m.face_angle.yaw = wall.yaw() + Angle::HALF;
                    return AirStep::GrabbedLedge;
                }

                self.avatar.pos = next;
                self.set_floor(floor, floor_height);
                return AirStep::None;
            }
        }

        self.avatar.pos = next;
        self.set_floor(floor, floor_height);

        let wall_id = upper_walls.last().or(lower_walls.last()).copied();
        if let Some(wall) = wall_id.and_then(|id| world.surface(id).map(|s| (id, s))) {
            let (id, surf) = wall;
            self.avatar.wall = Some(id.into());
            self.avatar.wall_yaw = surf.yaw();

            if surf.ty == SurfaceType::BURNING {
                return AirStep::HitLavaWall;
            }

            let dyaw = (surf.yaw() - self.avatar.face_angle.yaw).0;
            if !(-0x6000..=0x6000).contains(&dyaw) {
                return AirStep::HitWall;
            }
        }

        AirStep::None
    }

    /// Move through the air by this frame's velocity, then apply gravity.
    pub fn perform_air_step(&mut self, flags: AirStepFlags) -> AirStep {
        let mut result = AirStep::None;
        self.avatar.wall = None;

        for _ in 0..4 {
            let intended = self.avatar.pos + self.avatar.vel / 4.0;
            let quarter = self.air_quarter_step(intended, flags);

            // A wall hit in an early quarter survives later clean quarters.
            if quarter != AirStep::None {
                result = quarter;
            }
            if matches!(
                quarter,
                AirStep::Landed | AirStep::GrabbedLedge | AirStep::GrabbedCeiling | AirStep::HitLavaWall
            ) {
                break;
            }
        }

        if self.avatar.vel.y >= 0.0 {
            self.avatar.peak_height = self.avatar.pos.y;
        }

        if self.avatar.action != ActionId::FLYING {
            self.apply_gravity();
        }
        self.apply_vertical_wind();
        self.update_render_transform();

        result
    }

    fn jump_ascent_is_cut(&self) -> bool {
        let m = &*self.avatar;
        if !m.flags.has(AvatarFlags::JUMPING) {
            return false;
        }
        if m.action.has(ActionId::FLAG_INTANGIBLE | ActionId::FLAG_INVULNERABLE) {
            return false;
        }
        !m.input.has(InputFlags::A_DOWN)
            && m.vel.y > 20.0
            && m.action.has(ActionId::FLAG_CONTROL_JUMP_HEIGHT)
    }

    pub fn apply_gravity(&mut self) {
        fn fall(vel_y: &mut f32, accel: f32, terminal: f32) {
            *vel_y -= accel;
            if *vel_y < terminal {
                *vel_y = terminal;
            }
        }

        let action = self.avatar.action;
        let cut_ascent = self.jump_ascent_is_cut();
        let m = &mut *self.avatar;

        if action == ActionId::TWIRLING && m.vel.y < 0.0 {
            let spin = m.angle_vel.yaw.as_i32();
            let heaviness = if spin > 1024 { 1024.0 / spin as f32 } else { 1.0 };
            fall(&mut m.vel.y, 4.0 * heaviness, -75.0 * heaviness);
        } else if action == ActionId::SHOT_FROM_CANNON {
            fall(&mut m.vel.y, 1.0, -75.0);
        } else if action == ActionId::LONG_JUMP || action == ActionId::SLIDE_KICK {
            fall(&mut m.vel.y, 2.0, -75.0);
        } else if action == ActionId::LAVA_BOOST {
            fall(&mut m.vel.y, 3.2, -65.0);
        } else if action == ActionId::GETTING_BLOWN {
            let wind = m.wind_gravity;
            fall(&mut m.vel.y, wind, -75.0);
        } else if cut_ascent {
            m.vel.y /= 4.0;
        } else if action.has(ActionId::FLAG_METAL_WATER) {
            fall(&mut m.vel.y, 1.6, -16.0);
        } else if m.flags.has(AvatarFlags::WING_CAP)
            && m.vel.y < 0.0
            && m.input.has(InputFlags::A_DOWN)
        {
            m.body.wing_flutter = true;
            m.vel.y -= 2.0;
            if m.vel.y < -37.5 {
                m.vel.y = (m.vel.y + 4.0).min(-37.5);
            }
        } else {
            fall(&mut m.vel.y, 4.0, -75.0);
        }
    }

    /// Updrafts over vertical wind floors.
    pub fn apply_vertical_wind(&mut self) {
        if self.avatar.action == ActionId::GROUND_POUND {
            return;
        }
        if self.floor_type() != SurfaceType::VERTICAL_WIND {
            return;
        }

        let offset_y = self.avatar.pos.y + 1500.0;
        if !(-3000.0 < offset_y && offset_y < 2000.0) {
            return;
        }

        let max_vel_y = if offset_y >= 0.0 {
            10000.0 / (offset_y + 200.0)
        } else {
            50.0
        };

        let vel_y = &mut self.avatar.vel.y;
        if *vel_y < max_vel_y {
            *vel_y = (*vel_y + max_vel_y / 8.0).min(max_vel_y);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::context::tests::{add_quad, flat_world, floor_rect, wall_facing_neg_x, Harness};
    use super::*;
    use crate::collision::{CollisionConfig, CollisionWorld};
    use glam::IVec3;

    fn walking(h: &mut Harness, yaw: Angle, speed: f32) {
        h.avatar.action = ActionId::WALKING;
        h.avatar.face_angle.yaw = yaw;
        h.avatar.set_forward_vel(speed);
    }

    #[test]
    fn test_ground_step_follows_flat_floor() {
        let mut h = Harness::new(flat_world(SurfaceType::DEFAULT));
        walking(&mut h, Angle::ZERO, 20.0);

        let result = h.ctx().perform_ground_step();
        assert_eq!(result, GroundStep::None);
        assert!((h.avatar.pos.z - 20.0).abs() < 1e-3);
        assert_eq!(h.avatar.pos.y, 0.0);
        assert_eq!(h.avatar.render.pos, h.avatar.pos);
    }

    #[test]
    fn test_ground_step_off_ledge_leaves_ground() {
        let mut world = CollisionWorld::new(CollisionConfig::default());
        add_quad(&mut world, floor_rect(-500, -500, 500, 500, 0), SurfaceType::DEFAULT);
        add_quad(&mut world, floor_rect(-500, 500, 500, 1500, -400), SurfaceType::DEFAULT);

        let mut h = Harness::new(world);
        h.avatar.pos.z = 490.0;
        walking(&mut h, Angle::ZERO, 32.0);

        assert_eq!(h.ctx().perform_ground_step(), GroundStep::LeftGround);
        assert!(h.avatar.pos.z > 500.0);
        assert_eq!(h.avatar.pos.y, 0.0);
        assert_eq!(h.avatar.floor_height, -400.0);
    }

    #[test]
    fn test_ground_step_into_thin_wall_never_crosses() {
        let mut world = flat_world(SurfaceType::DEFAULT);
        add_quad(&mut world, wall_facing_neg_x(100, 600), SurfaceType::DEFAULT);

        let mut h = Harness::new(world);
        // Each quarter step covers 40 units, more than the wall is thick
        walking(&mut h, Angle::QUARTER, 160.0);

        assert_eq!(h.ctx().perform_ground_step(), GroundStep::HitWall);
        assert!(h.avatar.pos.x < 100.0);
        assert!(h.avatar.wall.is_some());
    }

    #[test]
    fn test_ground_step_with_no_floor_stops() {
        let mut h = Harness::new(flat_world(SurfaceType::DEFAULT));
        h.avatar.pos.x = 3990.0;
        walking(&mut h, Angle::QUARTER, 200.0);

        assert_eq!(h.ctx().perform_ground_step(), GroundStep::HitWall);
        assert!(h.avatar.pos.x <= 4000.0);
    }

    #[test]
    fn test_air_step_lands_on_floor() {
        let mut h = Harness::new(flat_world(SurfaceType::DEFAULT));
        h.avatar.action = ActionId::FREEFALL;
        h.avatar.pos.y = 30.0;
        h.avatar.vel.y = -60.0;

        assert_eq!(h.ctx().perform_air_step(AirStepFlags::NONE), AirStep::Landed);
        assert_eq!(h.avatar.pos.y, 0.0);
    }

    #[test]
    fn test_air_step_into_thin_wall_reports_hit_wall() {
        let mut world = flat_world(SurfaceType::DEFAULT);
        add_quad(&mut world, wall_facing_neg_x(100, 1000), SurfaceType::DEFAULT);

        let mut h = Harness::new(world);
        h.avatar.action = ActionId::JUMP;
        h.avatar.pos.y = 200.0;
        h.avatar.face_angle.yaw = Angle::QUARTER;
        h.avatar.vel = Vec3::new(180.0, 0.0, 0.0);

        assert_eq!(h.ctx().perform_air_step(AirStepFlags::NONE), AirStep::HitWall);
        assert!(h.avatar.pos.x < 100.0);
    }

    #[test]
    fn test_air_step_into_burning_wall() {
        let mut world = flat_world(SurfaceType::DEFAULT);
        add_quad(&mut world, wall_facing_neg_x(100, 1000), SurfaceType::BURNING);

        let mut h = Harness::new(world);
        h.avatar.action = ActionId::JUMP;
        h.avatar.pos = Vec3::new(60.0, 200.0, 0.0);
        h.avatar.face_angle.yaw = Angle::QUARTER;
        h.avatar.vel = Vec3::new(20.0, 0.0, 0.0);

        assert_eq!(h.ctx().perform_air_step(AirStepFlags::NONE), AirStep::HitLavaWall);
    }

    #[test]
    fn test_ceiling_bonk_zeroes_upward_speed() {
        let mut world = flat_world(SurfaceType::DEFAULT);
        let [a, b, c, d] = floor_rect(-1000, -1000, 1000, 1000, 300);
        add_quad(&mut world, [a, d, c, b], SurfaceType::DEFAULT);

        let mut h = Harness::new(world);
        h.avatar.action = ActionId::JUMP;
        h.avatar.pos.y = 120.0;
        h.avatar.vel.y = 60.0;

        assert_eq!(h.ctx().perform_air_step(AirStepFlags::NONE), AirStep::None);
        // Zeroed by the bonk, then pulled down by gravity
        assert_eq!(h.avatar.vel.y, -4.0);
        assert!(h.avatar.pos.y + HITBOX_HEIGHT <= 300.0);
    }

    #[test]
    fn test_ledge_grab_when_only_lower_wall_hits() {
        let mut world = flat_world(SurfaceType::DEFAULT);
        // Ledge top at y = 300, wall face at x = 100
        add_quad(&mut world, wall_facing_neg_x(100, 300), SurfaceType::DEFAULT);
        add_quad(&mut world, floor_rect(100, -1000, 1000, 1000, 300), SurfaceType::DEFAULT);

        let mut h = Harness::new(world);
        h.avatar.action = ActionId::FREEFALL;
        h.avatar.pos = Vec3::new(40.0, 190.0, 0.0);
        h.avatar.face_angle.yaw = Angle::QUARTER;
        h.avatar.vel = Vec3::new(20.0, -4.0, 0.0);

        let result = h.ctx().perform_air_step(AirStepFlags::CHECK_LEDGE_GRAB);
        assert_eq!(result, AirStep::GrabbedLedge);
        assert_eq!(h.avatar.pos.y, 300.0);
        assert_eq!(h.avatar.face_angle.yaw, Angle::QUARTER);
    }

    #[test]
    fn test_ledge_grab_in_corner_uses_last_wall() {
        let mut world = flat_world(SurfaceType::DEFAULT);
        add_quad(&mut world, wall_facing_neg_x(100, 300), SurfaceType::DEFAULT);
        add_quad(
            &mut world,
            [
                IVec3::new(-1000, 0, 100),
                IVec3::new(-1000, 300, 100),
                IVec3::new(1000, 300, 100),
                IVec3::new(1000, 0, 100),
            ],
            SurfaceType::DEFAULT,
        );
        add_quad(&mut world, floor_rect(100, -1000, 1000, 1000, 300), SurfaceType::DEFAULT);
        add_quad(&mut world, floor_rect(-1000, 100, 100, 1000, 300), SurfaceType::DEFAULT);

        let mut target = Vec3::new(65.0, 189.0, 65.0);
        let last = world
            .resolve_and_return_wall_collisions(&mut target, 30.0, 50.0)
            .and_then(|id| world.surface(id))
            .map(|wall| wall.yaw())
            .unwrap();

        let mut h = Harness::new(world);
        h.avatar.action = ActionId::FREEFALL;
        h.avatar.pos = Vec3::new(60.0, 190.0, 60.0);
        h.avatar.face_angle.yaw = Angle(0x2000);
        h.avatar.vel = Vec3::new(20.0, -4.0, 20.0);

        let result = h.ctx().perform_air_step(AirStepFlags::CHECK_LEDGE_GRAB);
        assert_eq!(result, AirStep::GrabbedLedge);
        assert_eq!(h.avatar.face_angle.yaw, last + Angle::HALF);
    }

    #[test]
    fn test_gravity_terminal_velocity() {
        let mut h = Harness::new(flat_world(SurfaceType::DEFAULT));
        h.avatar.action = ActionId::FREEFALL;
        h.avatar.vel.y = -73.0;
        h.ctx().apply_gravity();
        assert_eq!(h.avatar.vel.y, -75.0);

        h.avatar.action = ActionId::LAVA_BOOST;
        h.avatar.vel.y = -64.0;
        h.ctx().apply_gravity();
        assert_eq!(h.avatar.vel.y, -65.0);
    }

    #[test]
    fn test_releasing_a_cuts_jump_ascent() {
        let mut h = Harness::new(flat_world(SurfaceType::DEFAULT));
        h.avatar.action = ActionId::JUMP;
        h.avatar.flags.set(AvatarFlags::JUMPING, true);
        h.avatar.vel.y = 40.0;

        h.ctx().apply_gravity();
        assert_eq!(h.avatar.vel.y, 10.0);

        h.avatar.vel.y = 40.0;
        h.avatar.input.set(InputFlags::A_DOWN, true);
        h.ctx().apply_gravity();
        assert_eq!(h.avatar.vel.y, 36.0);
    }

    #[test]
    fn test_quicksand_depth_caps_by_type() {
        let mut h = Harness::new(flat_world(SurfaceType::SHALLOW_QUICKSAND));
        h.avatar.action = ActionId::WALKING;
        for _ in 0..100 {
            assert!(!h.ctx().update_quicksand(0.25));
        }
        assert_eq!(h.avatar.quicksand_depth, 10.0);

        let mut h = Harness::new(flat_world(SurfaceType::INSTANT_QUICKSAND));
        h.avatar.action = ActionId::WALKING;
        assert!(h.ctx().update_quicksand(0.25));
        assert_eq!(h.avatar.action, ActionId::QUICKSAND_DEATH);
    }

    #[test]
    fn test_stationary_step_snaps_to_floor() {
        let mut h = Harness::new(flat_world(SurfaceType::DEFAULT));
        h.avatar.action = ActionId::IDLE;
        h.avatar.pos.y = 3.0;
        h.avatar.forward_vel = 5.0;

        assert_eq!(h.ctx().stationary_ground_step(), GroundStep::None);
        assert_eq!(h.avatar.pos.y, 0.0);
        assert_eq!(h.avatar.forward_vel, 0.0);
    }
}
