//! Avatar movement controller.
//!
//! This is the main entry point for avatar movement. Each tick it turns the
//! controller snapshot into input flags, refreshes the surfaces around the
//! avatar, reacts to special floors and then runs the current action.

use glam::Vec3;

use crate::collision::{CollisionWorld, SurfaceRef, SurfaceType};
use crate::math::{atan2s, SeededRandom};

use super::action::{ActionGroup, ActionId};
use super::actions::ActionTable;
use super::config::MovementConfig;
use super::context::{ActionContext, AreaInfo};
use super::signal::{Signal, Signals};
use super::state::{AvatarCommand, AvatarFlags, AvatarState, Buttons, InputFlags, InteractStatus};
use super::step::{find_avatar_ceil, find_avatar_floor};

/// Warp node that warp floors and bottomless pits send the avatar to unless
/// the floor names another.
pub const WARP_NODE_WARP_FLOOR: u8 = 0xF3;

/// Below this far over a death plane the level takes the avatar back.
const DEATH_BARRIER_HEIGHT: f32 = 2048.0;

/// Health at or above which the avatar is alive.
const HEALTH_ALIVE: i16 = 0x100;
const HEALTH_MAX: i16 = 0x880;

/// A floor and ceiling this close together crush the avatar when either
/// one is moving.
const SQUISH_GAP: f32 = 150.0;

/// The world around the avatar for one tick.
#[derive(Clone, Copy)]
pub struct FrameEnv<'a> {
    pub world: &'a CollisionWorld,
    pub area: &'a AreaInfo,
    /// Global frame counter.
    pub frame: u32,
}

/// Avatar movement controller.
///
/// Owns the action table and the movement configuration. One controller can
/// drive any number of avatars.
///
/// # Example
///
/// ```ignore
/// let controller = AvatarController::new(MovementConfig::default());
/// let mut avatar = AvatarState::default();
/// controller.spawn_at(&mut avatar, spawn_position, &world);
///
/// // Each frame:
/// let env = FrameEnv { world: &world, area: &area, frame };
/// controller.update(&mut avatar, &command, &env, &mut rng, &mut signals);
/// ```
#[derive(Debug, Clone)]
pub struct AvatarController {
    /// Movement configuration.
    pub config: MovementConfig,
    table: ActionTable,
}

impl AvatarController {
    /// Create a controller with the full action table.
    pub fn new(config: MovementConfig) -> Self {
        Self {
            config,
            table: ActionTable::default(),
        }
    }

    /// Create a controller with default configuration.
    pub fn with_default_config() -> Self {
        Self::new(MovementConfig::default())
    }

    pub fn table(&self) -> &ActionTable {
        &self.table
    }

    /// Collaborators that own parked actions can swap in their handlers.
    pub fn table_mut(&mut self) -> &mut ActionTable {
        &mut self.table
    }

    /// Place an avatar at a spawn point.
    ///
    /// Snaps onto a floor within reach of the spawn point and starts idle.
    /// Without a floor close by the avatar starts falling from the spawn
    /// point instead.
    pub fn spawn_at(&self, avatar: &mut AvatarState, spawn_pos: Vec3, world: &CollisionWorld) {
        avatar.pos = spawn_pos;
        avatar.vel = Vec3::ZERO;
        avatar.forward_vel = 0.0;
        avatar.peak_height = spawn_pos.y;
        avatar.render.pos = spawn_pos;

        let hit = find_avatar_floor(world, spawn_pos.x, spawn_pos.y, spawn_pos.z);
        avatar.floor = hit.surface.map(SurfaceRef::from);
        avatar.floor_height = hit.height;
        if let Some(floor) = hit.surface.and_then(|id| world.surface(id)) {
            avatar.floor_angle = atan2s(floor.normal.z, floor.normal.x);
        }

        let grounded = hit.surface.is_some() && spawn_pos.y - hit.height <= 100.0;
        if grounded {
            avatar.pos.y = hit.height;
            avatar.render.pos = avatar.pos;
            avatar.force_action(ActionId::IDLE, 0);
        } else {
            avatar.force_action(ActionId::FREEFALL, 0);
        }
        log::debug!(
            "spawned avatar at ({:.0}, {:.0}, {:.0}), grounded: {}",
            avatar.pos.x,
            avatar.pos.y,
            avatar.pos.z,
            grounded
        );
    }

    /// Advance one avatar by one frame.
    ///
    /// Returns `true` when the current action requested a transition.
    pub fn update(
        &self,
        avatar: &mut AvatarState,
        command: &AvatarCommand,
        env: &FrameEnv<'_>,
        rng: &mut SeededRandom,
        signals: &mut Signals,
    ) -> bool {
        let mut ctx = ActionContext {
            avatar,
            world: env.world,
            config: &self.config,
            area: env.area,
            rng,
            signals,
            frame: env.frame,
        };

        ctx.begin_frame();
        ctx.update_inputs(command);
        ctx.handle_special_floors();

        let transitioned = self.table.execute(&mut ctx);

        ctx.update_health();
        ctx.update_timers();
        ctx.avatar.anim.advance();
        ctx.avatar.interact_status = InteractStatus::default();
        transitioned
    }
}

impl ActionContext<'_> {
    // ========================================================================
    // Frame setup
    // ========================================================================

    fn begin_frame(&mut self) {
        let m = &mut *self.avatar;
        m.transitioned = false;
        m.render.throw_matrix = None;
        m.flags.0 &= !(AvatarFlags::PER_FRAME | AvatarFlags::METAL_SHOCK);
        m.body.reset();
    }

    fn update_inputs(&mut self, command: &AvatarCommand) {
        self.avatar.input = InputFlags::default();
        self.update_button_inputs(command);
        self.update_stick_inputs(command);
        self.update_geometry_inputs();

        let m = &mut *self.avatar;
        m.input.set(InputFlags::FIRST_PERSON, command.first_person);

        let status = m.interact_status;
        if status.has(InteractStatus::STUNNED) || status.has(InteractStatus::KNOCKED_BACK) {
            m.input.set(InputFlags::STOMPED, true);
        }

        if !m.input.has(InputFlags::NONZERO_ANALOG) && !m.input.has(InputFlags::A_PRESSED) {
            m.input.set(InputFlags::IDLE, true);
        }

        m.wall_kick_timer = m.wall_kick_timer.saturating_sub(1);
        m.double_jump_timer = m.double_jump_timer.saturating_sub(1);
    }

    fn update_button_inputs(&mut self, command: &AvatarCommand) {
        let m = &mut *self.avatar;
        let (pressed, down) = (command.pressed, command.down);

        m.input.set(InputFlags::A_PRESSED, pressed.pressed(Buttons::A));
        m.input.set(InputFlags::A_DOWN, down.pressed(Buttons::A));

        // A crushed avatar can only jump.
        if m.squish_timer == 0 {
            m.input.set(InputFlags::B_PRESSED, pressed.pressed(Buttons::B));
            m.input.set(InputFlags::Z_DOWN, down.pressed(Buttons::Z));
            m.input.set(InputFlags::Z_PRESSED, pressed.pressed(Buttons::Z));
        }

        if m.input.has(InputFlags::A_PRESSED) {
            m.frames_since_a = 0;
        } else if m.frames_since_a < 0xFF {
            m.frames_since_a += 1;
        }

        if m.input.has(InputFlags::B_PRESSED) {
            m.frames_since_b = 0;
        } else if m.frames_since_b < 0xFF {
            m.frames_since_b += 1;
        }
    }

    fn update_stick_inputs(&mut self, command: &AvatarCommand) {
        let m = &mut *self.avatar;
        m.stick_x = command.stick_x;
        m.stick_y = command.stick_y;
        m.stick_mag = command.stick_mag();

        // Quadratic response curve, half range.
        let curved = (m.stick_mag / 64.0) * (m.stick_mag / 64.0) * 64.0;
        m.intended_mag = if m.squish_timer == 0 {
            curved / 2.0
        } else {
            curved / 8.0
        };

        if m.intended_mag > 0.0 {
            m.intended_yaw = atan2s(-command.stick_y, command.stick_x) + command.camera_yaw;
            m.input.set(InputFlags::NONZERO_ANALOG, true);
        } else {
            m.intended_yaw = m.face_angle.yaw;
        }
    }

    fn update_geometry_inputs(&mut self) {
        let world = self.world;

        let mut pos = self.avatar.pos;
        world.resolve_and_return_wall_collisions(&mut pos, 60.0, 50.0);
        world.resolve_and_return_wall_collisions(&mut pos, 30.0, 24.0);

        let mut floor_hit = find_avatar_floor(world, pos.x, pos.y, pos.z);
        if floor_hit.surface.is_none() {
            // Pushed out of bounds; fall back to where the avatar was drawn.
            pos = self.avatar.render.pos;
            floor_hit = find_avatar_floor(world, pos.x, pos.y, pos.z);
        }
        self.avatar.pos = pos;

        let ceil_hit = find_avatar_ceil(world, pos, floor_hit.height);
        let m = &mut *self.avatar;
        m.floor = floor_hit.surface.map(SurfaceRef::from);
        m.floor_height = floor_hit.height;
        m.ceil = ceil_hit.surface.map(SurfaceRef::from);
        m.ceil_height = ceil_hit.height;
        m.water_level = world.find_water_level(pos.x, pos.z);

        let Some(floor) = self.floor() else {
            log::debug!("no floor under avatar at ({:.0}, {:.0}, {:.0})", pos.x, pos.y, pos.z);
            self.signals.push(Signal::Death);
            return;
        };

        self.avatar.floor_angle = atan2s(floor.normal.z, floor.normal.x);

        if pos.y > self.avatar.water_level - 40.0 && self.floor_is_slippery() {
            self.avatar.input.set(InputFlags::ABOVE_SLIDE, true);
        }

        let ceil_moving = self.ceil().is_some_and(|c| c.is_dynamic());
        if floor.is_dynamic() || ceil_moving {
            let gap = self.avatar.ceil_height - self.avatar.floor_height;
            if (0.0..=SQUISH_GAP).contains(&gap) {
                self.avatar.input.set(InputFlags::SQUISHED, true);
            }
        }

        let m = &mut *self.avatar;
        if m.pos.y > m.floor_height + 100.0 {
            m.input.set(InputFlags::OFF_FLOOR, true);
        }
        if m.pos.y < m.water_level - 10.0 {
            m.input.set(InputFlags::IN_WATER, true);
        }
    }

    // ========================================================================
    // Special floors
    // ========================================================================

    fn handle_special_floors(&mut self) {
        if self.avatar.action.group() == ActionGroup::Cutscene {
            return;
        }
        let Some(floor) = self.floor() else {
            return;
        };

        match floor.ty {
            SurfaceType::DEATH_PLANE | SurfaceType::VERTICAL_WIND => {
                if self.avatar.pos.y < self.avatar.floor_height + DEATH_BARRIER_HEIGHT {
                    self.trigger_warp_floor(floor.force);
                }
            }
            SurfaceType::WARP => self.trigger_warp_floor(floor.force),
            _ => {}
        }

        let action = self.avatar.action;
        if !action.has(ActionId::FLAG_AIR)
            && !action.has(ActionId::FLAG_SWIMMING)
            && floor.ty == SurfaceType::BURNING
        {
            self.check_lava_boost();
        }
    }

    /// The upper byte of the floor's force picks the warp node when the
    /// level stores one.
    fn trigger_warp_floor(&mut self, force: i16) {
        let node = match (force >> 8) as u8 {
            0 => WARP_NODE_WARP_FLOOR,
            node => node,
        };
        let signal = Signal::Warp { node };
        if !self.signals.contains(signal) {
            log::debug!("warp floor triggered under action {:#010x}", self.avatar.action.0);
            self.signals.push(signal);
        }
    }

    fn check_lava_boost(&mut self) {
        if self.avatar.action.has(ActionId::FLAG_RIDING_SHELL) {
            return;
        }
        if self.avatar.pos.y >= self.avatar.floor_height + 10.0 {
            return;
        }

        if !self.avatar.flags.has(AvatarFlags::METAL_CAP) {
            self.add_hurt(12, 18);
        }
        self.reset_camera();
        self.drop_and_set_action(ActionId::LAVA_BOOST, 0);
    }

    // ========================================================================
    // After the action
    // ========================================================================

    fn update_health(&mut self) {
        let step = self.config.health_step;
        let m = &mut *self.avatar;
        if m.health < HEALTH_ALIVE {
            return;
        }

        if m.heal_counter > 0 {
            m.health = m.health.saturating_add(step);
            m.heal_counter -= 1;
        }
        if m.hurt_counter > 0 {
            m.health = m.health.saturating_sub(step);
            m.hurt_counter -= 1;
        }

        m.health = m.health.min(HEALTH_MAX);
        if m.health < HEALTH_ALIVE {
            log::debug!("avatar health ran out");
            m.health = HEALTH_ALIVE - 1;
        }
    }

    fn update_timers(&mut self) {
        let m = &mut *self.avatar;
        if m.invinc_timer > 0 {
            m.invinc_timer -= 1;
        }
        // 0xFF pins the squash until something resets it.
        if m.squish_timer != 0xFF {
            m.squish_timer = m.squish_timer.saturating_sub(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::CollisionConfig;
    use crate::math::Angle;
    use glam::IVec3;

    fn create_test_world(ty: SurfaceType) -> CollisionWorld {
        let mut world = CollisionWorld::new(CollisionConfig::default());
        let (a, b, c, d) = (
            IVec3::new(-4000, 0, -4000),
            IVec3::new(-4000, 0, 4000),
            IVec3::new(4000, 0, 4000),
            IVec3::new(4000, 0, -4000),
        );
        world.add_static_surface([a, b, c], ty, 0);
        world.add_static_surface([a, c, d], ty, 0);
        world
    }

    struct Sim {
        controller: AvatarController,
        world: CollisionWorld,
        area: AreaInfo,
        rng: SeededRandom,
        signals: Signals,
        avatar: AvatarState,
        frame: u32,
    }

    impl Sim {
        fn new(world: CollisionWorld, spawn: Vec3) -> Self {
            let controller = AvatarController::with_default_config();
            let mut avatar = AvatarState::default();
            controller.spawn_at(&mut avatar, spawn, &world);
            Self {
                controller,
                world,
                area: AreaInfo::default(),
                rng: SeededRandom::new(0),
                signals: Signals::new(),
                avatar,
                frame: 0,
            }
        }

        fn tick(&mut self, command: &AvatarCommand) -> bool {
            let env = FrameEnv {
                world: &self.world,
                area: &self.area,
                frame: self.frame,
            };
            self.frame += 1;
            self.controller
                .update(&mut self.avatar, command, &env, &mut self.rng, &mut self.signals)
        }
    }

    fn press_a() -> AvatarCommand {
        let mut command = AvatarCommand::default();
        command.pressed.press(Buttons::A);
        command.down.press(Buttons::A);
        command
    }

    /// Full stick away from a camera that sits on the -Z side.
    fn run_forward() -> AvatarCommand {
        AvatarCommand {
            stick_y: 64.0,
            camera_yaw: Angle::HALF,
            ..Default::default()
        }
    }

    // ========================================================================
    // Spawn Tests
    // ========================================================================

    #[test]
    fn test_spawn_at_finds_ground() {
        let sim = Sim::new(create_test_world(SurfaceType::DEFAULT), Vec3::new(0.0, 50.0, 0.0));
        assert_eq!(sim.avatar.pos.y, 0.0);
        assert_eq!(sim.avatar.action, ActionId::IDLE);
        assert!(sim.avatar.floor.is_some());
    }

    #[test]
    fn test_spawn_high_up_falls() {
        let sim = Sim::new(create_test_world(SurfaceType::DEFAULT), Vec3::new(0.0, 2000.0, 0.0));
        assert_eq!(sim.avatar.pos.y, 2000.0);
        assert_eq!(sim.avatar.action, ActionId::FREEFALL);
    }

    // ========================================================================
    // Frame Tests
    // ========================================================================

    #[test]
    fn test_idle_stays_put() {
        let mut sim = Sim::new(create_test_world(SurfaceType::DEFAULT), Vec3::ZERO);
        for _ in 0..10 {
            sim.tick(&AvatarCommand::default());
        }
        assert_eq!(sim.avatar.action, ActionId::IDLE);
        assert_eq!(sim.avatar.pos, Vec3::ZERO);
        assert!(sim.avatar.input.has(InputFlags::IDLE));
    }

    #[test]
    fn test_one_transition_per_frame() {
        let mut sim = Sim::new(create_test_world(SurfaceType::DEFAULT), Vec3::ZERO);

        assert!(sim.tick(&press_a()));
        assert_eq!(sim.avatar.action, ActionId::JUMP);
        assert!(sim.avatar.transitioned);
        assert_eq!(sim.avatar.frames_since_a, 0);

        // The guard is cleared at the start of the next frame and the jump
        // body gets to run.
        sim.tick(&AvatarCommand::default());
        assert_eq!(sim.avatar.action, ActionId::JUMP);
        assert!(sim.avatar.pos.y > 0.0);
        assert_eq!(sim.avatar.frames_since_a, 1);
    }

    #[test]
    fn test_walking_speed_plateaus() {
        let mut sim = Sim::new(create_test_world(SurfaceType::DEFAULT), Vec3::ZERO);
        let command = run_forward();

        let mut top_speed: f32 = 0.0;
        for _ in 0..90 {
            sim.tick(&command);
            top_speed = top_speed.max(sim.avatar.forward_vel);
        }

        assert_eq!(sim.avatar.action, ActionId::WALKING);
        assert!(top_speed <= 48.0);
        assert!(
            sim.avatar.forward_vel > 30.0 && sim.avatar.forward_vel <= 33.0,
            "speed {}",
            sim.avatar.forward_vel
        );
        assert!(sim.avatar.pos.z > 1500.0);
    }

    #[test]
    fn test_hard_fall_hurts_over_following_frames() {
        let mut sim = Sim::new(create_test_world(SurfaceType::DEFAULT), Vec3::new(0.0, 3200.0, 0.0));

        for _ in 0..200 {
            sim.tick(&AvatarCommand::default());
            if sim.avatar.action != ActionId::FREEFALL {
                break;
            }
        }
        assert_eq!(sim.avatar.action, ActionId::HARD_BACKWARD_GROUND_KB);

        // 16 units of damage with the cap on, one already applied.
        assert_eq!(sim.avatar.hurt_counter, 15);
        assert_eq!(sim.avatar.health, 0x880 - 0x40);
    }

    #[test]
    fn test_health_clamps_at_death() {
        let mut sim = Sim::new(create_test_world(SurfaceType::DEFAULT), Vec3::ZERO);
        sim.avatar.health = 0x120;
        sim.avatar.hurt_counter = 4;

        sim.tick(&AvatarCommand::default());
        assert_eq!(sim.avatar.health, 0xFF);

        // Dead avatars stop taking damage and fall over on the next frame.
        sim.tick(&AvatarCommand::default());
        assert_eq!(sim.avatar.health, 0xFF);
        assert_eq!(sim.avatar.hurt_counter, 3);
        assert_eq!(sim.avatar.action, ActionId::STANDING_DEATH);
    }

    #[test]
    fn test_heal_caps_at_full() {
        let mut sim = Sim::new(create_test_world(SurfaceType::DEFAULT), Vec3::ZERO);
        sim.avatar.health = 0x860;
        sim.avatar.heal_counter = 2;

        sim.tick(&AvatarCommand::default());
        assert_eq!(sim.avatar.health, 0x880);
        assert_eq!(sim.avatar.heal_counter, 1);
    }

    #[test]
    fn test_burning_floor_boosts() {
        let mut sim = Sim::new(create_test_world(SurfaceType::BURNING), Vec3::ZERO);
        sim.tick(&AvatarCommand::default());

        assert_eq!(sim.avatar.action, ActionId::LAVA_BOOST);
        // 12 with the cap on, one step already taken off.
        assert_eq!(sim.avatar.hurt_counter, 11);
    }

    #[test]
    fn test_warp_floor_signals_once_per_frame() {
        let mut sim = Sim::new(create_test_world(SurfaceType::WARP), Vec3::ZERO);
        sim.tick(&AvatarCommand::default());

        let warps = sim
            .signals
            .events
            .iter()
            .filter(|s| matches!(s, Signal::Warp { .. }))
            .count();
        assert_eq!(warps, 1);
    }

    #[test]
    fn test_death_plane_only_near_bottom() {
        let mut sim = Sim::new(create_test_world(SurfaceType::DEATH_PLANE), Vec3::new(0.0, 3000.0, 0.0));
        let warp = Signal::Warp {
            node: WARP_NODE_WARP_FLOOR,
        };

        sim.tick(&AvatarCommand::default());
        assert!(!sim.signals.contains(warp));

        sim.avatar.pos.y = 1000.0;
        sim.tick(&AvatarCommand::default());
        assert!(sim.signals.contains(warp));
    }

    #[test]
    fn test_stick_sets_intended_heading() {
        let mut sim = Sim::new(create_test_world(SurfaceType::DEFAULT), Vec3::ZERO);
        sim.tick(&run_forward());
        assert!(sim.avatar.input.has(InputFlags::NONZERO_ANALOG));
        assert_eq!(sim.avatar.intended_mag, 32.0);
        assert_eq!(sim.avatar.intended_yaw, Angle::ZERO);
    }

    #[test]
    fn test_timers_count_down() {
        let mut sim = Sim::new(create_test_world(SurfaceType::DEFAULT), Vec3::ZERO);
        sim.avatar.invinc_timer = 3;
        sim.avatar.squish_timer = 2;
        sim.avatar.wall_kick_timer = 1;

        sim.tick(&AvatarCommand::default());
        assert_eq!(sim.avatar.invinc_timer, 2);
        assert_eq!(sim.avatar.squish_timer, 1);
        assert_eq!(sim.avatar.wall_kick_timer, 0);
    }
}
