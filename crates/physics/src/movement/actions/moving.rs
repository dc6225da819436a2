//! Ground-moving actions.
//!
//! Walking and its variants, the slides, ground knockbacks and the short
//! landing actions that follow every jump. Handlers share a small set of
//! speed updates:
//!
//! - walking speed: accelerate toward the stick, turn at a capped rate
//! - slope accel/decel: friction class decides how hard slopes pull
//! - sliding: velocity lives in `slide_vel_x/z` and is steered sideways
//!
//! Landings are table driven: each [`Landing`] names where the avatar goes
//! when the landing times out, gets interrupted by A, or runs off a ledge.

use glam::{Mat4, Vec3};

use crate::collision::{SurfaceRef, SurfaceType, WallCollisionData};
use crate::math::{
    align_to_normal, approach_angle, approach_f32, approach_s32, approach_s32_symmetric, atan2s,
    plane_normal, Angle, COS73, COS80,
};

use super::super::action::ActionId;
use super::super::animation::AnimId;
use super::super::context::{ActionContext, FloorClass, Voice};
use super::super::signal::{ParticleFlags, Signal, Sound};
use super::super::state::{AvatarFlags, EyeState, InputFlags, InteractStatus};
use super::super::step::GroundStep;
use super::ActionTable;

/// Walk animation phases, stored in the action timer.
const WALK_START_TIPTOE: u16 = 0;
const WALK_TIPTOE: u16 = 1;
const WALK_WALKING: u16 = 2;
const WALK_RUNNING: u16 = 3;

/// Hold-walk animation phases.
const HOLD_WALK_SLOW: u16 = 0;
const HOLD_WALK_WALKING: u16 = 1;
const HOLD_WALK_RUNNING: u16 = 2;

/// Walking state after pressing into a wall; the action arg holds the yaw
/// facing away from it.
const WALKING_REACH_WALL: u16 = 1;

/// Move punches can still turn into a jump kick on the first frame.
const PUNCH_CAN_JUMP_KICK: u16 = 0;
const PUNCH_NO_JUMP_KICK: u16 = 1;

/// Stick more than ~100 degrees away from the facing.
const STICK_BACK_LIMIT: i16 = 0x471C;

/// 30 degrees.
const TILT_LIMIT: i32 = 0x1555;

/// 160 degrees.
const PUSH_WALL_LIMIT: i16 = 0x71C7;

pub(super) fn register(table: &mut ActionTable) {
    table.register(ActionId::WALKING, "walking", walking);
    table.register(ActionId::HOLD_WALKING, "hold_walking", hold_walking);
    table.register(ActionId::HOLD_HEAVY_WALKING, "hold_heavy_walking", hold_heavy_walking);
    table.register(ActionId::TURNING_AROUND, "turning_around", turning_around);
    table.register(ActionId::FINISH_TURNING_AROUND, "finish_turning_around", finish_turning_around);
    table.register(ActionId::BRAKING, "braking", braking);
    table.register(ActionId::RIDING_SHELL_GROUND, "riding_shell_ground", riding_shell_ground);
    table.register(ActionId::CRAWLING, "crawling", crawling);
    table.register(ActionId::BURNING_GROUND, "burning_ground", burning_ground);
    table.register(ActionId::DECELERATING, "decelerating", decelerating);
    table.register(ActionId::HOLD_DECELERATING, "hold_decelerating", hold_decelerating);
    table.register(ActionId::BUTT_SLIDE, "butt_slide", butt_slide);
    table.register(ActionId::STOMACH_SLIDE, "stomach_slide", stomach_slide);
    table.register(ActionId::HOLD_BUTT_SLIDE, "hold_butt_slide", hold_butt_slide);
    table.register(ActionId::HOLD_STOMACH_SLIDE, "hold_stomach_slide", hold_stomach_slide);
    table.register(ActionId::DIVE_SLIDE, "dive_slide", dive_slide);
    table.register(ActionId::MOVE_PUNCHING, "move_punching", move_punching);
    table.register(ActionId::CROUCH_SLIDE, "crouch_slide", crouch_slide);
    table.register(ActionId::SLIDE_KICK_SLIDE, "slide_kick_slide", slide_kick_slide);
    table.register(ActionId::HARD_BACKWARD_GROUND_KB, "hard_backward_ground_kb", hard_backward_ground_kb);
    table.register(ActionId::HARD_FORWARD_GROUND_KB, "hard_forward_ground_kb", hard_forward_ground_kb);
    table.register(ActionId::BACKWARD_GROUND_KB, "backward_ground_kb", backward_ground_kb);
    table.register(ActionId::FORWARD_GROUND_KB, "forward_ground_kb", forward_ground_kb);
    table.register(ActionId::SOFT_BACKWARD_GROUND_KB, "soft_backward_ground_kb", soft_backward_ground_kb);
    table.register(ActionId::SOFT_FORWARD_GROUND_KB, "soft_forward_ground_kb", soft_forward_ground_kb);
    table.register(ActionId::GROUND_BONK, "ground_bonk", ground_bonk);
    table.register(ActionId::DEATH_EXIT_LAND, "death_exit_land", death_exit_land);
    table.register(ActionId::JUMP_LAND, "jump_land", jump_land);
    table.register(ActionId::FREEFALL_LAND, "freefall_land", freefall_land);
    table.register(ActionId::DOUBLE_JUMP_LAND, "double_jump_land", double_jump_land);
    table.register(ActionId::SIDE_FLIP_LAND, "side_flip_land", side_flip_land);
    table.register(ActionId::HOLD_JUMP_LAND, "hold_jump_land", hold_jump_land);
    table.register(ActionId::HOLD_FREEFALL_LAND, "hold_freefall_land", hold_freefall_land);
    table.register(ActionId::TRIPLE_JUMP_LAND, "triple_jump_land", triple_jump_land);
    table.register(ActionId::BACKFLIP_LAND, "backflip_land", backflip_land);
    table.register(ActionId::QUICKSAND_JUMP_LAND, "quicksand_jump_land", quicksand_jump_land);
    table.register(
        ActionId::HOLD_QUICKSAND_JUMP_LAND,
        "hold_quicksand_jump_land",
        hold_quicksand_jump_land,
    );
    table.register(ActionId::LONG_JUMP_LAND, "long_jump_land", long_jump_land);
}

// ============================================================================
// Landing table
// ============================================================================

/// How an A press during a landing is turned into a jump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LandingJump {
    /// Jump into the landing's A action.
    Action,
    /// Chain into a triple jump when fast enough.
    Triple,
}

/// Exits of one landing action.
#[derive(Debug, Clone, Copy)]
struct Landing {
    frames: u16,
    double_jump_timer: u8,
    very_steep: ActionId,
    end: ActionId,
    a_pressed: ActionId,
    off_floor: ActionId,
    slide: ActionId,
    jump: LandingJump,
}

impl Landing {
    const fn plain(end: ActionId, a_pressed: ActionId) -> Self {
        Self {
            frames: 4,
            double_jump_timer: 5,
            very_steep: ActionId::FREEFALL,
            end,
            a_pressed,
            off_floor: ActionId::FREEFALL,
            slide: ActionId::BEGIN_SLIDING,
            jump: LandingJump::Action,
        }
    }

    const fn holding(end: ActionId) -> Self {
        Self {
            frames: 4,
            double_jump_timer: 5,
            very_steep: ActionId::HOLD_FREEFALL,
            end,
            a_pressed: ActionId::HOLD_JUMP,
            off_floor: ActionId::HOLD_FREEFALL,
            slide: ActionId::HOLD_BEGIN_SLIDING,
            jump: LandingJump::Action,
        }
    }
}

const JUMP_LANDING: Landing = Landing::plain(ActionId::JUMP_LAND_STOP, ActionId::DOUBLE_JUMP);
const FREEFALL_LANDING: Landing = Landing::plain(ActionId::FREEFALL_LAND_STOP, ActionId::DOUBLE_JUMP);
const SIDE_FLIP_LANDING: Landing = Landing::plain(ActionId::SIDE_FLIP_LAND_STOP, ActionId::DOUBLE_JUMP);
const HOLD_JUMP_LANDING: Landing = Landing::holding(ActionId::HOLD_JUMP_LAND_STOP);
const HOLD_FREEFALL_LANDING: Landing = Landing::holding(ActionId::HOLD_FREEFALL_LAND_STOP);

const LONG_JUMP_LANDING: Landing = Landing {
    frames: 6,
    ..Landing::plain(ActionId::LONG_JUMP_LAND_STOP, ActionId::LONG_JUMP)
};

const DOUBLE_JUMP_LANDING: Landing = Landing {
    jump: LandingJump::Triple,
    ..Landing::plain(ActionId::DOUBLE_JUMP_LAND_STOP, ActionId::JUMP)
};

const TRIPLE_JUMP_LANDING: Landing = Landing {
    double_jump_timer: 0,
    ..Landing::plain(ActionId::TRIPLE_JUMP_LAND_STOP, ActionId::UNINITIALIZED)
};

const BACKFLIP_LANDING: Landing = Landing {
    double_jump_timer: 0,
    ..Landing::plain(ActionId::BACKFLIP_LAND_STOP, ActionId::BACKFLIP)
};

/// Rotate `face` toward `target` by at most `rate`, measured from the
/// target side.
fn turn_toward(face: Angle, target: Angle, rate: i32) -> Angle {
    target - Angle::from_i32(approach_s32((target - face).as_i32(), 0, rate, rate))
}

/// Playback rate in 16.16 fixed point.
fn anim_rate(speed: f32) -> i32 {
    (speed * 65536.0) as i32
}

impl ActionContext<'_> {
    // ========================================================================
    // Pose
    // ========================================================================

    /// Snap to the floor and tilt the render transform to match it.
    fn align_with_floor(&mut self) {
        let Some(floor) = self.floor() else {
            return;
        };
        if self.avatar.pos.y >= self.avatar.floor_height + 80.0 {
            return;
        }

        self.avatar.pos.y = self.avatar.floor_height;
        let m = &*self.avatar;
        let matrix = match self.config.fast_floor_align {
            Some(threshold) if m.forward_vel.abs() > threshold => {
                align_to_normal(floor.normal, m.pos, m.face_angle.yaw)
            }
            _ => self.align_terrain_triangle(40.0),
        };
        self.avatar.render.throw_matrix = Some(matrix);
    }

    /// Fit a plane through three floor samples around the avatar.
    fn align_terrain_triangle(&self, radius: f32) -> Mat4 {
        let pos = self.avatar.pos;
        let yaw = self.avatar.face_angle.yaw;
        let probe_y = pos.y + 150.0;

        let sample = |offset: Angle| {
            let dir = yaw + offset;
            let x = pos.x + radius * dir.sin();
            let z = pos.z + radius * dir.cos();
            let mut y = self.world.find_floor_height(x, probe_y, z);
            // Samples over a drop keep the avatar's own height.
            if y - pos.y < -radius * 3.0 {
                y = pos.y;
            }
            Vec3::new(x, y, z)
        };

        let a = sample(Angle::degrees(60.0));
        let b = sample(Angle::HALF);
        let c = sample(Angle::degrees(-60.0));
        let avg_y = (a.y + b.y + c.y) / 3.0;

        align_to_normal(
            plane_normal(a, b, c),
            Vec3::new(pos.x, pos.y.max(avg_y), pos.z),
            yaw,
        )
    }

    /// Forward lean while running on a slope.
    fn tilt_body_running(&self) -> i32 {
        let slope = self.find_floor_slope(Angle::ZERO);
        let pitch = (f32::from(slope.0) * self.avatar.forward_vel / 40.0) as i32 as i16;
        i32::from((-i32::from(pitch)) as i16)
    }

    fn tilt_body_walking(&mut self, start_yaw: Angle) {
        let anim = self.avatar.anim.id();
        let m = &mut *self.avatar;
        let torso = &mut m.body.torso_angle;

        if matches!(anim, Some(AnimId::Walking | AnimId::Running)) {
            let dyaw = (m.face_angle.yaw - start_yaw).0;
            let raw_roll = (f32::from(dyaw) * m.forward_vel / 12.0) as i32 as i16;
            let roll = i32::from((-i32::from(raw_roll)) as i16).clamp(-TILT_LIMIT, TILT_LIMIT);
            let pitch = i32::from((m.forward_vel * 170.0) as i32 as i16).clamp(0, TILT_LIMIT);

            torso.roll = Angle::from_i32(approach_s32(torso.roll.as_i32(), roll, 0x400, 0x400));
            torso.pitch = Angle::from_i32(approach_s32(torso.pitch.as_i32(), pitch, 0x400, 0x400));
        } else {
            torso.roll = Angle::ZERO;
            torso.pitch = Angle::ZERO;
        }
    }

    fn tilt_body_ground_shell(&mut self, start_yaw: Angle) {
        let m = &mut *self.avatar;
        let dyaw = (m.face_angle.yaw - start_yaw).0;
        let raw_roll = (f32::from(dyaw) * m.forward_vel / 12.0) as i32 as i16;
        let roll = i32::from((-i32::from(raw_roll)) as i16).clamp(-0x1800, 0x1800);
        let pitch = i32::from((m.forward_vel * 170.0) as i32 as i16).clamp(0, 0x1000);

        let body = &mut m.body;
        body.torso_angle.roll =
            Angle::from_i32(approach_s32_symmetric(body.torso_angle.roll.as_i32(), roll, 0x200));
        body.torso_angle.pitch =
            Angle::from_i32(approach_s32_symmetric(body.torso_angle.pitch.as_i32(), pitch, 0x200));
        body.head_angle.roll = -body.torso_angle.roll;

        m.render.angle.roll = body.torso_angle.roll;
        m.render.pos.y += 45.0;
    }

    fn tilt_body_butt_slide(&mut self) {
        let m = &mut *self.avatar;
        let dyaw = m.intended_yaw - m.face_angle.yaw;
        let mag = f32::from(TILT_LIMIT as i16) * m.intended_mag / 32.0;
        m.body.torso_angle.pitch = Angle::from_i32((mag * dyaw.cos()) as i32);
        m.body.torso_angle.roll = Angle::from_i32((-(mag * dyaw.sin())) as i32);
    }

    // ========================================================================
    // Sounds
    // ========================================================================

    /// Footstep on either of the two contact frames of the current clip.
    fn play_step_sound(&mut self, frame1: i16, frame2: i16) {
        let anim = &self.avatar.anim;
        if !anim.is_past_frame(frame1) && !anim.is_past_frame(frame2) {
            return;
        }

        let tiptoe = anim.id() == Some(AnimId::Tiptoe);
        let sound = if self.avatar.flags.has(AvatarFlags::METAL_CAP) {
            if tiptoe {
                Sound::MetalStepTiptoe
            } else {
                Sound::MetalStep
            }
        } else if self.avatar.quicksand_depth > 50.0 {
            Sound::QuicksandStep
        } else if tiptoe {
            Sound::TerrainStepTiptoe
        } else {
            Sound::TerrainStep
        };
        self.signals.sound(sound);
    }

    // ========================================================================
    // Speed
    // ========================================================================

    /// Pull the slide velocity downhill, apply friction and turn the
    /// facing toward the direction of travel.
    fn update_sliding_angle(&mut self, accel: f32, loss: f32) {
        let normal = self.floor_normal();
        let slope = atan2s(normal.z, normal.x);
        let steepness = (normal.x * normal.x + normal.z * normal.z).sqrt();

        let m = &mut *self.avatar;
        m.slide_vel_x += accel * steepness * slope.sin();
        m.slide_vel_z += accel * steepness * slope.cos();
        m.slide_vel_x *= loss;
        m.slide_vel_z *= loss;
        m.slide_yaw = atan2s(m.slide_vel_z, m.slide_vel_x);

        let mut dyaw = i32::from((m.face_angle.yaw - m.slide_yaw).0);
        if dyaw > 0 && dyaw <= 0x4000 {
            dyaw = (dyaw - 0x200).max(0);
        } else if dyaw > -0x4000 && dyaw < 0 {
            dyaw = (dyaw + 0x200).min(0);
        } else if dyaw > 0x4000 && dyaw < 0x8000 {
            dyaw = (dyaw + 0x200).min(0x8000);
        } else if dyaw > -0x8000 && dyaw < -0x4000 {
            dyaw = (dyaw - 0x200).max(-0x8000);
        }
        m.face_angle.yaw = m.slide_yaw + Angle::from_i32(dyaw);

        m.vel = Vec3::new(m.slide_vel_x, 0.0, m.slide_vel_z);

        self.update_moving_sand();
        self.update_windy_ground();

        // The cap applies to the slide velocity only, so the speed read
        // this frame can still exceed it.
        let m = &mut *self.avatar;
        m.forward_vel = (m.slide_vel_x * m.slide_vel_x + m.slide_vel_z * m.slide_vel_z).sqrt();
        if m.forward_vel > 100.0 {
            m.slide_vel_x = m.slide_vel_x * 100.0 / m.forward_vel;
            m.slide_vel_z = m.slide_vel_z * 100.0 / m.forward_vel;
        }

        if !(-0x4000..=0x4000).contains(&dyaw) {
            m.forward_vel = -m.forward_vel;
        }
    }

    /// Steer a slide with the stick. Returns `true` once it has stopped on
    /// flat ground.
    fn update_sliding(&mut self, stop_speed: f32) -> bool {
        let (accel, base_loss) = match self.floor_class() {
            FloorClass::VerySlippery => (10.0, 0.98),
            FloorClass::Slippery => (8.0, 0.96),
            FloorClass::Default => (7.0, 0.92),
            FloorClass::NotSlippery => (5.0, 0.92),
        };

        let m = &mut *self.avatar;
        let dyaw = m.intended_yaw - m.slide_yaw;
        let mut forward = dyaw.cos();
        let sideward = dyaw.sin();

        // Pulling back barely slows a fast slide.
        if forward < 0.0 && m.forward_vel >= 0.0 {
            forward *= 0.5 + 0.5 * m.forward_vel / 100.0;
        }

        let stick = m.intended_mag / 32.0;
        let loss = stick * forward * 0.02 + base_loss;

        let old_speed = (m.slide_vel_x * m.slide_vel_x + m.slide_vel_z * m.slide_vel_z).sqrt();
        m.slide_vel_x += m.slide_vel_z * stick * sideward * 0.05;
        m.slide_vel_z -= m.slide_vel_x * stick * sideward * 0.05;
        let new_speed = (m.slide_vel_x * m.slide_vel_x + m.slide_vel_z * m.slide_vel_z).sqrt();

        if old_speed > 0.0 && new_speed > 0.0 {
            m.slide_vel_x = m.slide_vel_x * old_speed / new_speed;
            m.slide_vel_z = m.slide_vel_z * old_speed / new_speed;
        }

        self.update_sliding_angle(accel, loss);

        let speed = self.avatar.forward_vel;
        if !self.floor_is_slope() && speed * speed < stop_speed * stop_speed {
            self.set_forward_vel(0.0);
            return true;
        }
        false
    }

    /// Slopes speed the avatar up or slow it down depending on facing.
    fn apply_slope_accel(&mut self) {
        let normal = self.floor_normal();
        let steepness = (normal.x * normal.x + normal.z * normal.z).sqrt();

        if self.floor_is_slope() {
            let action = self.avatar.action;
            let class = if matches!(
                action,
                ActionId::SOFT_BACKWARD_GROUND_KB | ActionId::SOFT_FORWARD_GROUND_KB
            ) {
                FloorClass::Default
            } else {
                self.floor_class()
            };
            let accel = match class {
                FloorClass::VerySlippery => 5.3,
                FloorClass::Slippery => 2.7,
                FloorClass::Default => 1.7,
                FloorClass::NotSlippery => 0.0,
            };

            let m = &mut *self.avatar;
            if (m.floor_angle - m.face_angle.yaw).within(0x4000) {
                m.forward_vel += accel * steepness;
            } else {
                m.forward_vel -= accel * steepness;
            }
        }

        let m = &mut *self.avatar;
        m.slide_yaw = m.face_angle.yaw;
        m.slide_vel_x = m.forward_vel * m.face_angle.yaw.sin();
        m.slide_vel_z = m.forward_vel * m.face_angle.yaw.cos();
        m.vel = Vec3::new(m.slide_vel_x, 0.0, m.slide_vel_z);

        self.update_moving_sand();
        self.update_windy_ground();
    }

    /// Friction for landings. Returns `true` once stopped.
    fn apply_landing_accel(&mut self, friction: f32) -> bool {
        self.apply_slope_accel();

        if !self.floor_is_slope() {
            self.avatar.forward_vel *= friction;
            let speed = self.avatar.forward_vel;
            if speed * speed < 1.0 {
                self.set_forward_vel(0.0);
                return true;
            }
        }
        false
    }

    /// Skid to a halt. Returns `true` once stopped.
    fn apply_slope_decel(&mut self, coef: f32) -> bool {
        let decel = coef
            * match self.floor_class() {
                FloorClass::VerySlippery => 0.2,
                FloorClass::Slippery => 0.7,
                FloorClass::Default => 2.0,
                FloorClass::NotSlippery => 3.0,
            };

        self.avatar.forward_vel = approach_f32(self.avatar.forward_vel, 0.0, decel, decel);
        let stopped = self.avatar.forward_vel == 0.0;
        self.apply_slope_accel();
        stopped
    }

    fn update_decelerating_speed(&mut self) -> bool {
        let speed = approach_f32(self.avatar.forward_vel, 0.0, 1.0, 1.0);
        self.set_forward_vel(speed);
        self.update_moving_sand();
        self.update_windy_ground();
        speed == 0.0
    }

    fn update_walking_speed(&mut self) {
        let max_target = if self.floor_type() == SurfaceType::SLOW {
            24.0
        } else {
            32.0
        };
        let normal_y = self.floor_normal().y;
        let velocity_turn = self.config.velocity_based_turn_speed;

        let m = &mut *self.avatar;
        let mut target = m.intended_mag.min(max_target);
        if m.quicksand_depth > 10.0 {
            target *= 6.25 / m.quicksand_depth;
        }

        if m.forward_vel <= 0.0 {
            m.forward_vel += 1.1;
        } else if m.forward_vel <= target {
            m.forward_vel += 1.1 - m.forward_vel / 43.0;
        } else if normal_y >= 0.95 {
            m.forward_vel -= 1.0;
        }

        if m.forward_vel > 48.0 {
            m.forward_vel = 48.0;
        }

        if velocity_turn && m.held_obj.is_none() && !m.action.has(ActionId::FLAG_SHORT_HITBOX) {
            if m.forward_vel >= 16.0 {
                let range = f32::from(m.face_angle.yaw.abs_diff(m.intended_yaw));
                let fac = (m.forward_vel + m.intended_mag).clamp(0.0, 32.0);
                let range = ((range * (1.0 - fac / 32.0)) as i16).max(0x800);
                m.face_angle.yaw = approach_angle(m.face_angle.yaw, m.intended_yaw, range);
            } else {
                m.face_angle.yaw = m.intended_yaw;
            }
        } else {
            m.face_angle.yaw = turn_toward(m.face_angle.yaw, m.intended_yaw, 0x800);
        }

        self.apply_slope_accel();
    }

    fn update_shell_speed(&mut self) {
        if self.avatar.floor_height < self.avatar.water_level {
            self.avatar.floor_height = self.avatar.water_level;
            self.avatar.floor = Some(SurfaceRef::WaterPseudoFloor);
        }

        let max_target = if self.floor_type() == SurfaceType::SLOW {
            48.0
        } else {
            64.0
        };
        let normal_y = self.floor_normal().y;

        let m = &mut *self.avatar;
        let target = (m.intended_mag * 2.0).min(max_target).max(24.0);

        if m.forward_vel <= 0.0 {
            m.forward_vel += 1.1;
        } else if m.forward_vel <= target {
            m.forward_vel += 1.1 - m.forward_vel / 58.0;
        } else if normal_y >= 0.95 {
            m.forward_vel -= 1.0;
        }

        // Only forward speed is capped.
        if m.forward_vel > 64.0 {
            m.forward_vel = 64.0;
        }

        m.face_angle.yaw = turn_toward(m.face_angle.yaw, m.intended_yaw, 0x800);
        self.apply_slope_accel();
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    fn begin_walking_action(&mut self, speed: f32, action: ActionId, arg: u32) -> bool {
        self.avatar.face_angle.yaw = self.avatar.intended_yaw;
        self.set_forward_vel(speed);
        self.set_action(action, arg)
    }

    fn should_begin_sliding(&self) -> bool {
        self.has_input(InputFlags::ABOVE_SLIDE)
            && (self.on_slide_terrain()
                || self.avatar.forward_vel <= -1.0
                || self.facing_downhill(false))
    }

    fn stick_held_back(&self) -> bool {
        self.avatar.intended_yaw.abs_diff(self.avatar.face_angle.yaw) > STICK_BACK_LIMIT
    }

    /// B on the ground: dive when running flat out, punch otherwise.
    fn check_ground_dive_or_punch(&mut self) -> bool {
        if !self.has_input(InputFlags::B_PRESSED) {
            return false;
        }

        if self.avatar.forward_vel >= 29.0 && self.avatar.stick_mag > 48.0 {
            self.avatar.vel.y = 20.0;
            return self.set_action(ActionId::DIVE, 1);
        }
        self.set_action(ActionId::MOVE_PUNCHING, 0)
    }

    fn begin_braking_action(&mut self) -> bool {
        self.drop_held_object();

        if self.avatar.action_state == WALKING_REACH_WALL {
            self.avatar.face_angle.yaw = Angle(self.avatar.action_arg as u16 as i16);
            return self.set_action(ActionId::STANDING_AGAINST_WALL, 0);
        }

        if self.avatar.forward_vel >= 16.0 && self.floor_normal().y >= COS80 {
            return self.set_action(ActionId::BRAKING, 0);
        }
        self.set_action(ActionId::DECELERATING, 0)
    }

    /// Walking into a drop-off backwards turns into climbing down the ledge.
    fn check_ledge_climb_down(&mut self) {
        if self.avatar.forward_vel >= 10.0 {
            return;
        }

        let mut data = WallCollisionData::new(self.avatar.pos, -10.0, 10.0);
        if self.world.find_wall_collisions(&mut data) == 0 {
            return;
        }

        let floor_hit = self.world.find_floor(data.x, data.y, data.z);
        if floor_hit.surface.is_none() || data.y - floor_hit.height <= 160.0 {
            return;
        }

        let Some(wall) = data.last_wall().and_then(|id| self.world.surface(id)) else {
            return;
        };
        let wall_yaw = wall.yaw();
        if !(wall_yaw - self.avatar.face_angle.yaw).within(0x4000) {
            return;
        }

        let m = &mut *self.avatar;
        m.pos.x = data.x - 20.0 * wall.normal.x;
        m.pos.z = data.z - 20.0 * wall.normal.z;
        m.face_angle.pitch = Angle::ZERO;
        m.face_angle.yaw = wall_yaw + Angle::HALF;
        self.set_action(ActionId::LEDGE_CLIMB_DOWN, 0);
        self.set_anim(AnimId::ClimbDownLedge);
    }

    /// Bounce back off a wall when fast, otherwise just stop.
    fn slide_bonk(&mut self, fast_action: ActionId, slow_action: ActionId) {
        if self.avatar.forward_vel > 16.0 {
            self.bonk_reflection(true);
            self.drop_and_set_action(fast_action, 0);
        } else {
            self.set_forward_vel(0.0);
            self.set_action(slow_action, 0);
        }
    }

    /// Pick up whatever is in reach of the avatar's hands.
    fn grab_object_in_reach(&mut self) -> bool {
        if self.avatar.held_obj.is_some()
            || !self.avatar.interact_status.has(InteractStatus::GRAB_IN_REACH)
        {
            return false;
        }

        self.signals.push(Signal::GrabObject);
        let action = if self.avatar.action == ActionId::DIVE_SLIDE {
            ActionId::DIVE_PICKING_UP
        } else {
            ActionId::PICKING_UP
        };
        self.set_action(action, 0)
    }

    /// Advance the punch combo stored in the action arg.
    ///
    /// Arg 0..=2 is the first punch, 3..=5 the second, 6 the kick and 9 the
    /// breakdance sweep from a crouch.
    pub(crate) fn update_punch_sequence(&mut self) -> bool {
        let (end_action, crouch_end_action) = if self.avatar.action.has(ActionId::FLAG_MOVING) {
            (ActionId::WALKING, ActionId::CROUCH_SLIDE)
        } else {
            (ActionId::IDLE, ActionId::CROUCHING)
        };

        match self.avatar.action_arg {
            0 | 1 => {
                if self.avatar.action_arg == 0 {
                    self.signals.sound(Sound::PunchYah);
                }
                self.set_anim(AnimId::FirstPunch);
                self.avatar.action_arg = if self.anim_past_end() { 2 } else { 1 };

                if self.anim_frame() >= 2 {
                    if self.grab_object_in_reach() {
                        return true;
                    }
                    self.avatar.flags.set(AvatarFlags::PUNCHING, true);
                }
                if self.avatar.action_arg == 2 {
                    self.avatar.body.punch_state = 4;
                }
            }
            2 => {
                self.set_anim(AnimId::FirstPunchFast);
                if self.anim_frame() <= 0 {
                    self.avatar.flags.set(AvatarFlags::PUNCHING, true);
                }
                if self.has_input(InputFlags::B_PRESSED) {
                    self.avatar.action_arg = 3;
                }
                if self.anim_at_end() {
                    self.set_action(end_action, 0);
                }
            }
            3 | 4 => {
                if self.avatar.action_arg == 3 {
                    self.signals.sound(Sound::PunchWah);
                }
                self.set_anim(AnimId::SecondPunch);
                self.avatar.action_arg = if self.anim_past_end() { 5 } else { 4 };

                if self.anim_frame() > 0 {
                    self.avatar.flags.set(AvatarFlags::PUNCHING, true);
                }
                if self.avatar.action_arg == 5 {
                    self.avatar.body.punch_state = (1 << 6) | 4;
                }
            }
            5 => {
                self.set_anim(AnimId::SecondPunchFast);
                if self.anim_frame() <= 0 {
                    self.avatar.flags.set(AvatarFlags::PUNCHING, true);
                }
                if self.has_input(InputFlags::B_PRESSED) {
                    self.avatar.action_arg = 6;
                }
                if self.anim_at_end() {
                    self.set_action(end_action, 0);
                }
            }
            6 => {
                self.play_sound_if_no_flag(Sound::PunchHoo, AvatarFlags::ACTION_SOUND_PLAYED);
                let frame = self.set_anim(AnimId::GroundKick);
                if frame == 0 {
                    self.avatar.body.punch_state = (2 << 6) | 6;
                }
                if (0..8).contains(&frame) {
                    self.avatar.flags.set(AvatarFlags::KICKING, true);
                }
                if self.anim_at_end() {
                    self.set_action(end_action, 0);
                }
            }
            9 => {
                self.play_sound_if_no_flag(Sound::PunchHoo, AvatarFlags::ACTION_SOUND_PLAYED);
                let frame = self.set_anim(AnimId::Breakdance);
                if (2..8).contains(&frame) {
                    self.avatar.flags.set(AvatarFlags::TRIPPING, true);
                }
                if self.anim_at_end() {
                    self.set_action(crouch_end_action, 0);
                }
            }
            _ => {}
        }
        false
    }

    fn push_or_sidle_wall(&mut self, start: Vec3) {
        let m = &*self.avatar;
        let moved = Vec3::new(m.pos.x - start.x, 0.0, m.pos.z - start.z).length();
        let accel = anim_rate(moved * 2.0);

        if self.avatar.forward_vel > 6.0 {
            self.set_forward_vel(6.0);
        }

        let wall_yaw = self.wall().map(|wall| wall.yaw());
        let dyaw = wall_yaw.map(|yaw| (yaw - self.avatar.face_angle.yaw).0);

        match (wall_yaw, dyaw) {
            (Some(wall_yaw), Some(dyaw)) if dyaw > -PUSH_WALL_LIMIT && dyaw < PUSH_WALL_LIMIT => {
                let anim = if dyaw < 0 {
                    AnimId::SidestepRight
                } else {
                    AnimId::SidestepLeft
                };
                self.set_anim_with_accel(anim, accel);

                if self.anim_frame() < 20 {
                    self.signals.sound(Sound::TerrainSlide);
                    self.signals.particle(ParticleFlags::DUST);
                }

                let away = wall_yaw + Angle::HALF;
                let roll = self.find_floor_slope(Angle::QUARTER);
                let m = &mut *self.avatar;
                m.action_state = WALKING_REACH_WALL;
                m.action_arg = u32::from(away.as_u16());
                m.render.angle.yaw = away;
                m.render.angle.roll = roll;
            }
            _ => {
                self.avatar.flags.set(AvatarFlags::PUSHING, true);
                self.set_anim(AnimId::Pushing);
                self.play_step_sound(6, 18);
            }
        }
    }

    // ========================================================================
    // Walk animations
    // ========================================================================

    fn anim_and_audio_for_walk(&mut self) {
        let speed = self.avatar.intended_mag.max(self.avatar.forward_vel).max(4.0);
        let mut target_pitch = 0;

        if self.avatar.quicksand_depth > 50.0 {
            self.set_anim_with_accel(AnimId::MoveInQuicksand, anim_rate(speed / 4.0));
            self.play_step_sound(19, 93);
            self.avatar.action_timer = WALK_START_TIPTOE;
        } else {
            loop {
                match self.avatar.action_timer {
                    WALK_START_TIPTOE => {
                        if speed > 8.0 {
                            self.avatar.action_timer = WALK_WALKING;
                            continue;
                        }
                        let accel = anim_rate(speed / 4.0).max(0x1000);
                        self.set_anim_with_accel(AnimId::StartTiptoe, accel);
                        self.play_step_sound(7, 22);
                        if self.avatar.anim.is_past_frame(23) {
                            self.avatar.action_timer = WALK_WALKING;
                        }
                    }
                    WALK_TIPTOE => {
                        if speed > 8.0 {
                            self.avatar.action_timer = WALK_WALKING;
                            continue;
                        }
                        let accel = anim_rate(speed).max(0x1000);
                        self.set_anim_with_accel(AnimId::Tiptoe, accel);
                        self.play_step_sound(14, 72);
                    }
                    WALK_RUNNING => {
                        if speed < 18.0 {
                            self.avatar.action_timer = WALK_WALKING;
                            continue;
                        }
                        self.set_anim_with_accel(AnimId::Running, anim_rate(speed / 4.0));
                        self.play_step_sound(9, 45);
                        target_pitch = self.tilt_body_running();
                    }
                    _ => {
                        if speed < 5.0 {
                            self.avatar.action_timer = WALK_TIPTOE;
                            continue;
                        }
                        if speed > 22.0 {
                            self.avatar.action_timer = WALK_RUNNING;
                            continue;
                        }
                        self.avatar.action_timer = WALK_WALKING;
                        self.set_anim_with_accel(AnimId::Walking, anim_rate(speed / 4.0));
                        self.play_step_sound(10, 49);
                    }
                }
                break;
            }
        }

        let body = &mut self.avatar.body;
        body.walking_pitch = Angle::from_i32(approach_s32_symmetric(
            body.walking_pitch.as_i32(),
            target_pitch,
            0x800,
        ));
        self.avatar.render.angle.pitch = self.avatar.body.walking_pitch;
    }

    fn anim_and_audio_for_hold_walk(&mut self) {
        let speed = self.avatar.intended_mag.max(self.avatar.forward_vel).max(2.0);

        loop {
            match self.avatar.action_timer {
                HOLD_WALK_SLOW => {
                    if speed > 6.0 {
                        self.avatar.action_timer = HOLD_WALK_WALKING;
                        continue;
                    }
                    self.set_anim_with_accel(AnimId::SlowWalkWithLightObj, anim_rate(speed));
                    self.play_step_sound(12, 62);
                }
                HOLD_WALK_RUNNING => {
                    if speed < 8.0 {
                        self.avatar.action_timer = HOLD_WALK_WALKING;
                        continue;
                    }
                    self.set_anim_with_accel(AnimId::RunWithLightObj, anim_rate(speed / 2.0));
                    self.play_step_sound(10, 49);
                }
                _ => {
                    if speed < 3.0 {
                        self.avatar.action_timer = HOLD_WALK_SLOW;
                        continue;
                    }
                    if speed > 11.0 {
                        self.avatar.action_timer = HOLD_WALK_RUNNING;
                        continue;
                    }
                    self.avatar.action_timer = HOLD_WALK_WALKING;
                    self.set_anim_with_accel(AnimId::WalkWithLightObj, anim_rate(speed));
                    self.play_step_sound(12, 62);
                }
            }
            break;
        }
    }

    fn anim_and_audio_for_heavy_walk(&mut self) {
        let accel = anim_rate(self.avatar.intended_mag);
        self.set_anim_with_accel(AnimId::WalkWithHeavyObj, accel);
        self.play_step_sound(26, 79);
    }

    // ========================================================================
    // Slides
    // ========================================================================

    fn common_slide_action(&mut self, end_action: ActionId, air_action: ActionId, anim: AnimId) {
        self.signals.sound(Sound::TerrainSlide);

        match self.perform_ground_step() {
            GroundStep::LeftGround => {
                self.set_action(air_action, 0);
                if self.avatar.forward_vel.abs() > 50.0 {
                    self.signals.sound(Sound::Hoohoo);
                }
            }
            GroundStep::None => {
                self.set_anim(anim);
                self.align_with_floor();
                self.signals.particle(ParticleFlags::DUST);
            }
            GroundStep::HitWall => {
                if !self.floor_is_slippery() {
                    if self.avatar.forward_vel > 16.0 {
                        self.signals.particle(ParticleFlags::VERTICAL_STAR);
                    }
                    self.slide_bonk(ActionId::GROUND_BONK, end_action);
                } else if let Some(wall) = self.wall() {
                    let wall_yaw = wall.yaw();
                    let m = &mut *self.avatar;
                    let speed = ((m.slide_vel_x * m.slide_vel_x + m.slide_vel_z * m.slide_vel_z)
                        .sqrt()
                        * 0.9)
                        .max(4.0);

                    m.slide_yaw = wall_yaw - (m.slide_yaw - wall_yaw) + Angle::HALF;
                    m.slide_vel_x = speed * m.slide_yaw.sin();
                    m.slide_vel_z = speed * m.slide_yaw.cos();
                    m.vel.x = m.slide_vel_x;
                    m.vel.z = m.slide_vel_z;
                }
                self.align_with_floor();
            }
        }
    }

    fn common_slide_action_with_jump(
        &mut self,
        stop_action: ActionId,
        jump_action: ActionId,
        air_action: ActionId,
        anim: AnimId,
    ) -> bool {
        if self.config.slope_buffer {
            if self.has_input(InputFlags::A_PRESSED) {
                self.avatar.action_state = 1;
            } else if !self.has_input(InputFlags::A_DOWN) {
                self.avatar.action_state = 0;
            }
            if self.avatar.action_timer == 5 {
                if self.avatar.action_state == 1 {
                    return self.set_jumping_action(jump_action, 0);
                }
            } else {
                self.avatar.action_timer += 1;
            }
        } else if self.avatar.action_timer == 5 {
            if self.has_input(InputFlags::A_PRESSED) {
                return self.set_jumping_action(jump_action, 0);
            }
        } else {
            self.avatar.action_timer += 1;
        }

        if self.update_sliding(4.0) {
            return self.set_action(stop_action, 0);
        }

        self.common_slide_action(stop_action, air_action, anim);
        false
    }

    fn stomach_slide_action(&mut self, stop_action: ActionId, air_action: ActionId, anim: AnimId) -> bool {
        if self.avatar.action_timer == 5 {
            if !self.has_input(InputFlags::ABOVE_SLIDE)
                && self.has_input(InputFlags::A_PRESSED | InputFlags::B_PRESSED)
            {
                let rollout = if self.avatar.forward_vel >= 0.0 {
                    ActionId::FORWARD_ROLLOUT
                } else {
                    ActionId::BACKWARD_ROLLOUT
                };
                return self.drop_and_set_action(rollout, 0);
            }
        } else {
            self.avatar.action_timer += 1;
        }

        if self.update_sliding(4.0) {
            return self.set_action(stop_action, 0);
        }

        self.common_slide_action(stop_action, air_action, anim);
        false
    }

    // ========================================================================
    // Knockbacks and landings
    // ========================================================================

    /// Slide out a ground knockback. Returns the animation frame.
    fn common_ground_knockback(&mut self, anim: AnimId, check_frame: i16, heavy_landing: bool) -> i16 {
        let attacked = self.avatar.action_arg;

        if heavy_landing {
            self.play_heavy_landing_sound_once(Sound::TerrainBodyHitGround);
        }
        let voice = if attacked > 0 { Sound::Attacked } else { Sound::Ooof };
        self.play_sound_if_no_flag(voice, AvatarFlags::VOICE_PLAYED);

        self.avatar.forward_vel = self.avatar.forward_vel.clamp(-32.0, 32.0);

        let frame = self.set_anim(anim);
        if frame < check_frame {
            self.apply_landing_accel(0.9);
        } else if self.avatar.forward_vel >= 0.0 {
            self.set_forward_vel(0.1);
        } else {
            self.set_forward_vel(-0.1);
        }

        if self.perform_ground_step() == GroundStep::LeftGround {
            let action = if self.avatar.forward_vel >= 0.0 {
                ActionId::FORWARD_AIR_KB
            } else {
                ActionId::BACKWARD_AIR_KB
            };
            self.set_action(action, attacked);
        } else if self.anim_at_end() {
            if self.avatar.is_dead() {
                self.set_action(ActionId::STANDING_DEATH, 0);
            } else {
                if attacked > 0 {
                    self.avatar.invinc_timer = 30;
                }
                self.set_action(ActionId::IDLE, 0);
            }
        }

        frame
    }

    fn common_landing_action(&mut self, anim: AnimId, air_action: ActionId) -> GroundStep {
        if self.has_input(InputFlags::NONZERO_ANALOG) {
            self.apply_landing_accel(0.98);
        } else if self.avatar.forward_vel >= 16.0 {
            self.apply_slope_decel(2.0);
        } else {
            self.avatar.vel.y = 0.0;
        }

        let step = self.perform_ground_step();
        match step {
            GroundStep::LeftGround => {
                self.set_action(air_action, 0);
            }
            GroundStep::HitWall => {
                self.set_anim(AnimId::Pushing);
            }
            GroundStep::None => {}
        }

        if self.avatar.forward_vel > 16.0 {
            self.signals.particle(ParticleFlags::DUST);
        }

        self.set_anim(anim);
        self.play_landing_sound_once(Sound::TerrainLanding);

        let ty = self.floor_type();
        if (SurfaceType::SHALLOW_QUICKSAND.0..=SurfaceType::MOVING_QUICKSAND.0).contains(&ty.0) {
            let timer = f32::from(self.avatar.action_timer);
            self.avatar.quicksand_depth += (4.0 - timer) * 3.5 - 0.5;
        }

        step
    }

    /// Exits shared by every landing. Runs before the avatar has moved, so
    /// a steep floor left behind last frame still counts.
    fn common_landing_cancels(&mut self, landing: &Landing) -> bool {
        if self.floor_normal().y < COS73 {
            return self.push_off_steep_floor(landing.very_steep, 0);
        }

        self.avatar.double_jump_timer = landing.double_jump_timer;

        if self.should_begin_sliding() {
            return self.set_action(landing.slide, 0);
        }

        if self.has_input(InputFlags::FIRST_PERSON) {
            return self.set_action(landing.end, 0);
        }

        self.avatar.action_timer += 1;
        if self.avatar.action_timer >= landing.frames {
            return self.set_action(landing.end, 0);
        }

        if self.has_input(InputFlags::A_PRESSED) {
            return match landing.jump {
                LandingJump::Action => self.set_jumping_action(landing.a_pressed, 0),
                LandingJump::Triple => self.set_triple_jump_action(),
            };
        }

        if self.has_input(InputFlags::OFF_FLOOR) {
            return self.set_action(landing.off_floor, 0);
        }

        false
    }

    fn quicksand_jump_land_action(
        &mut self,
        rising: AnimId,
        landing: AnimId,
        end_action: ActionId,
        air_action: ActionId,
    ) -> bool {
        let timer = self.avatar.action_timer;
        self.avatar.action_timer += 1;

        if timer < 6 {
            let m = &mut *self.avatar;
            m.quicksand_depth -= (7.0 - f32::from(m.action_timer)) * 0.8;
            if m.quicksand_depth < 1.0 {
                m.quicksand_depth = 1.1;
            }
            self.play_avatar_sound(Sound::TerrainJump, Voice::JumpCall);
            self.set_anim(rising);
        } else {
            if self.avatar.action_timer >= 13 {
                return self.set_action(end_action, 0);
            }
            self.set_anim(landing);
        }

        self.apply_landing_accel(0.95);
        if self.perform_ground_step() == GroundStep::LeftGround {
            self.set_action(air_action, 0);
        }
        false
    }
}

// ============================================================================
// Walking
// ============================================================================

fn walking(ctx: &mut ActionContext<'_>) -> bool {
    let start_yaw = ctx.avatar.face_angle.yaw;

    ctx.drop_held_object();

    if ctx.should_begin_sliding() {
        return ctx.set_action(ActionId::BEGIN_SLIDING, 0);
    }
    if ctx.has_input(InputFlags::FIRST_PERSON) {
        return ctx.begin_braking_action();
    }
    if ctx.has_input(InputFlags::A_PRESSED) {
        if ctx.config.easier_long_jumps
            && ctx.has_input(InputFlags::Z_PRESSED)
            && ctx.avatar.forward_vel > 10.0
        {
            return ctx.set_action(ActionId::CROUCH_SLIDE, 0);
        }
        return ctx.set_jump_from_landing();
    }
    if ctx.check_ground_dive_or_punch() {
        return true;
    }
    if ctx.has_input(InputFlags::IDLE) {
        return ctx.begin_braking_action();
    }

    let turn_speed = if ctx.config.side_flip_at_low_speeds { 0.0 } else { 16.0 };
    if ctx.stick_held_back() && ctx.avatar.forward_vel >= turn_speed {
        return ctx.set_action(ActionId::TURNING_AROUND, 0);
    }
    if ctx.has_input(InputFlags::Z_PRESSED) {
        return ctx.set_action(ActionId::CROUCH_SLIDE, 0);
    }

    ctx.avatar.action_state = 0;
    let start = ctx.avatar.pos;
    ctx.update_walking_speed();

    match ctx.perform_ground_step() {
        GroundStep::LeftGround => {
            ctx.set_action(ActionId::FREEFALL, 0);
            ctx.set_anim(AnimId::GeneralFall);
        }
        GroundStep::None => {
            ctx.anim_and_audio_for_walk();
            if ctx.avatar.intended_mag - ctx.avatar.forward_vel > 16.0 {
                ctx.signals.particle(ParticleFlags::DUST);
            }
        }
        GroundStep::HitWall => {
            ctx.push_or_sidle_wall(start);
            ctx.avatar.action_timer = WALK_START_TIPTOE;
        }
    }

    ctx.check_ledge_climb_down();
    ctx.tilt_body_walking(start_yaw);
    false
}

fn move_punching(ctx: &mut ActionContext<'_>) -> bool {
    if ctx.should_begin_sliding() {
        return ctx.set_action(ActionId::BEGIN_SLIDING, 0);
    }
    if ctx.avatar.action_state == PUNCH_CAN_JUMP_KICK && ctx.has_input(InputFlags::A_DOWN) {
        return ctx.set_action(ActionId::JUMP_KICK, 0);
    }

    ctx.avatar.action_state = PUNCH_NO_JUMP_KICK;
    ctx.update_punch_sequence();

    if ctx.avatar.forward_vel >= 0.0 {
        ctx.apply_slope_decel(0.5);
    } else {
        ctx.avatar.forward_vel = (ctx.avatar.forward_vel + 8.0).min(0.0);
        ctx.apply_slope_accel();
    }

    match ctx.perform_ground_step() {
        GroundStep::LeftGround => {
            ctx.set_action(ActionId::FREEFALL, 0);
        }
        GroundStep::None => ctx.signals.particle(ParticleFlags::DUST),
        GroundStep::HitWall => {}
    }
    false
}

fn hold_walking(ctx: &mut ActionContext<'_>) -> bool {
    if ctx.avatar.held_obj.is_some_and(|obj| obj.jumping_box) {
        return ctx.set_action(ActionId::CRAZY_BOX_BOUNCE, 0);
    }
    if ctx.holding_dropped() {
        return ctx.drop_and_set_action(ActionId::WALKING, 0);
    }
    if ctx.should_begin_sliding() {
        return ctx.set_action(ActionId::HOLD_BEGIN_SLIDING, 0);
    }
    if ctx.has_input(InputFlags::B_PRESSED) {
        return ctx.set_action(ActionId::THROWING, 0);
    }
    if ctx.has_input(InputFlags::A_PRESSED) {
        return ctx.set_jumping_action(ActionId::HOLD_JUMP, 0);
    }
    if ctx.has_input(InputFlags::IDLE) {
        return ctx.set_action(ActionId::HOLD_DECELERATING, 0);
    }
    if ctx.has_input(InputFlags::Z_PRESSED) {
        return ctx.drop_and_set_action(ActionId::CROUCH_SLIDE, 0);
    }

    ctx.avatar.intended_mag *= 0.4;
    ctx.update_walking_speed();

    match ctx.perform_ground_step() {
        GroundStep::LeftGround => {
            ctx.set_action(ActionId::HOLD_FREEFALL, 0);
        }
        GroundStep::HitWall => {
            if ctx.avatar.forward_vel > 16.0 {
                ctx.set_forward_vel(16.0);
            }
        }
        GroundStep::None => {}
    }

    ctx.anim_and_audio_for_hold_walk();

    if 0.4 * ctx.avatar.intended_mag - ctx.avatar.forward_vel > 10.0 {
        ctx.signals.particle(ParticleFlags::DUST);
    }
    false
}

fn hold_heavy_walking(ctx: &mut ActionContext<'_>) -> bool {
    if ctx.has_input(InputFlags::B_PRESSED) {
        return ctx.set_action(ActionId::HEAVY_THROW, 0);
    }
    if ctx.should_begin_sliding() {
        return ctx.drop_and_set_action(ActionId::BEGIN_SLIDING, 0);
    }
    if ctx.has_input(InputFlags::IDLE) {
        return ctx.set_action(ActionId::HOLD_HEAVY_IDLE, 0);
    }

    ctx.avatar.intended_mag *= 0.1;
    ctx.update_walking_speed();

    match ctx.perform_ground_step() {
        GroundStep::LeftGround => {
            ctx.drop_and_set_action(ActionId::FREEFALL, 0);
        }
        GroundStep::HitWall => {
            if ctx.avatar.forward_vel > 10.0 {
                ctx.set_forward_vel(10.0);
            }
        }
        GroundStep::None => {}
    }

    ctx.anim_and_audio_for_heavy_walk();
    false
}

fn turning_around(ctx: &mut ActionContext<'_>) -> bool {
    if ctx.has_input(InputFlags::ABOVE_SLIDE) {
        return ctx.set_action(ActionId::BEGIN_SLIDING, 0);
    }
    if ctx.has_input(InputFlags::A_PRESSED) {
        return ctx.set_jumping_action(ActionId::SIDE_FLIP, 0);
    }
    if ctx.has_input(InputFlags::IDLE) {
        return ctx.set_action(ActionId::BRAKING, 0);
    }
    if !ctx.stick_held_back() {
        return ctx.set_action(ActionId::WALKING, 0);
    }

    if ctx.apply_slope_decel(2.0) {
        return ctx.begin_walking_action(8.0, ActionId::FINISH_TURNING_AROUND, 0);
    }

    ctx.signals.sound(Sound::TerrainSlide);

    match ctx.perform_ground_step() {
        GroundStep::LeftGround => {
            ctx.set_action(ActionId::FREEFALL, 0);
        }
        GroundStep::None => ctx.signals.particle(ParticleFlags::DUST),
        GroundStep::HitWall => {}
    }

    if ctx.avatar.forward_vel >= 18.0 {
        ctx.set_anim(AnimId::TurningPart1);
    } else {
        ctx.set_anim(AnimId::TurningPart2);
        if ctx.anim_at_end() {
            let speed = ctx.avatar.forward_vel;
            if speed > 0.0 {
                ctx.begin_walking_action(-speed, ActionId::WALKING, 0);
            } else {
                ctx.begin_walking_action(8.0, ActionId::WALKING, 0);
            }
        }
    }
    false
}

fn finish_turning_around(ctx: &mut ActionContext<'_>) -> bool {
    if ctx.has_input(InputFlags::ABOVE_SLIDE) {
        return ctx.set_action(ActionId::BEGIN_SLIDING, 0);
    }
    if ctx.has_input(InputFlags::A_PRESSED) {
        return ctx.set_jumping_action(ActionId::SIDE_FLIP, 0);
    }
    let reset_direction = ctx.config.reset_direction_when_turning_around;
    if reset_direction && ctx.stick_held_back() {
        return ctx.set_action(ActionId::TURNING_AROUND, 0);
    }

    ctx.update_walking_speed();
    ctx.set_anim(AnimId::TurningPart2);

    if ctx.perform_ground_step() == GroundStep::LeftGround {
        ctx.set_action(ActionId::FREEFALL, 0);
    }
    if ctx.anim_at_end() {
        ctx.set_action(ActionId::WALKING, 0);
    }

    // The clip is authored facing backwards.
    if reset_direction && !ctx.has_input(InputFlags::NONZERO_ANALOG) {
        let m = &mut *ctx.avatar;
        m.face_angle.yaw = m.intended_yaw;
        m.render.angle.yaw = m.face_angle.yaw + Angle::HALF;
    } else {
        ctx.avatar.render.angle.yaw += Angle::HALF;
    }
    false
}

fn braking(ctx: &mut ActionContext<'_>) -> bool {
    if !ctx.has_input(InputFlags::FIRST_PERSON)
        && ctx.has_input(
            InputFlags::NONZERO_ANALOG
                | InputFlags::A_PRESSED
                | InputFlags::OFF_FLOOR
                | InputFlags::ABOVE_SLIDE,
        )
    {
        return ctx.check_common_action_exits();
    }

    if ctx.apply_slope_decel(2.0) {
        return ctx.set_action(ActionId::BRAKING_STOP, 0);
    }
    if ctx.has_input(InputFlags::B_PRESSED) {
        return ctx.set_action(ActionId::MOVE_PUNCHING, 0);
    }

    match ctx.perform_ground_step() {
        GroundStep::LeftGround => {
            ctx.set_action(ActionId::FREEFALL, 0);
        }
        GroundStep::None => ctx.signals.particle(ParticleFlags::DUST),
        GroundStep::HitWall => ctx.slide_bonk(ActionId::BACKWARD_GROUND_KB, ActionId::BRAKING_STOP),
    }

    ctx.signals.sound(Sound::TerrainSlide);
    ctx.set_anim(AnimId::SkidOnGround);
    false
}

fn decelerating(ctx: &mut ActionContext<'_>) -> bool {
    let class = ctx.floor_class();

    if !ctx.has_input(InputFlags::FIRST_PERSON) {
        if ctx.should_begin_sliding() {
            return ctx.set_action(ActionId::BEGIN_SLIDING, 0);
        }
        if ctx.has_input(InputFlags::A_PRESSED) {
            return ctx.set_jump_from_landing();
        }
        if ctx.check_ground_dive_or_punch() {
            return true;
        }
        if ctx.has_input(InputFlags::NONZERO_ANALOG) {
            return ctx.set_action(ActionId::WALKING, 0);
        }
        if ctx.has_input(InputFlags::Z_PRESSED) {
            return ctx.set_action(ActionId::CROUCH_SLIDE, 0);
        }
    }

    if ctx.update_decelerating_speed() {
        return ctx.set_action(ActionId::IDLE, 0);
    }

    match ctx.perform_ground_step() {
        GroundStep::LeftGround => {
            ctx.set_action(ActionId::FREEFALL, 0);
        }
        GroundStep::HitWall => {
            if class == FloorClass::VerySlippery {
                ctx.bonk_reflection(true);
            } else {
                ctx.set_forward_vel(0.0);
            }
        }
        GroundStep::None => {}
    }

    if class == FloorClass::VerySlippery {
        ctx.set_anim(AnimId::IdleHeadLeft);
        ctx.signals.sound(Sound::TerrainSlide);
        ctx.signals.particle(ParticleFlags::DUST);
    } else {
        let accel = anim_rate(ctx.avatar.forward_vel / 4.0).max(0x1000);
        ctx.set_anim_with_accel(AnimId::Walking, accel);
        ctx.play_step_sound(10, 49);
    }
    false
}

fn hold_decelerating(ctx: &mut ActionContext<'_>) -> bool {
    let class = ctx.floor_class();

    if ctx.holding_dropped() {
        return ctx.drop_and_set_action(ActionId::WALKING, 0);
    }
    if ctx.should_begin_sliding() {
        return ctx.set_action(ActionId::HOLD_BEGIN_SLIDING, 0);
    }
    if ctx.has_input(InputFlags::B_PRESSED) {
        return ctx.set_action(ActionId::THROWING, 0);
    }
    if ctx.has_input(InputFlags::A_PRESSED) {
        return ctx.set_jumping_action(ActionId::HOLD_JUMP, 0);
    }
    if ctx.has_input(InputFlags::Z_PRESSED) {
        return ctx.drop_and_set_action(ActionId::CROUCH_SLIDE, 0);
    }
    if ctx.has_input(InputFlags::NONZERO_ANALOG) {
        return ctx.set_action(ActionId::HOLD_WALKING, 0);
    }

    if ctx.update_decelerating_speed() {
        return ctx.set_action(ActionId::HOLD_IDLE, 0);
    }

    ctx.avatar.intended_mag *= 0.4;

    match ctx.perform_ground_step() {
        GroundStep::LeftGround => {
            ctx.set_action(ActionId::HOLD_FREEFALL, 0);
        }
        GroundStep::HitWall => {
            if class == FloorClass::VerySlippery {
                ctx.bonk_reflection(true);
            } else {
                ctx.set_forward_vel(0.0);
            }
        }
        GroundStep::None => {}
    }

    if class == FloorClass::VerySlippery {
        ctx.set_anim(AnimId::IdleWithLightObj);
        ctx.signals.sound(Sound::TerrainSlide);
        ctx.signals.particle(ParticleFlags::DUST);
    } else {
        let accel = anim_rate(ctx.avatar.forward_vel).max(0x1000);
        ctx.set_anim_with_accel(AnimId::WalkWithLightObj, accel);
        ctx.play_step_sound(12, 62);
    }
    false
}

fn riding_shell_ground(ctx: &mut ActionContext<'_>) -> bool {
    let start_yaw = ctx.avatar.face_angle.yaw;
    ctx.avatar.shell_coyote_timer = 0;

    if ctx.has_input(InputFlags::A_PRESSED) {
        return ctx.set_action(ActionId::RIDING_SHELL_JUMP, 0);
    }
    if ctx.has_input(InputFlags::Z_PRESSED) {
        ctx.stop_riding_and_holding();
        if ctx.avatar.forward_vel < 24.0 {
            ctx.set_forward_vel(24.0);
        }
        return ctx.set_action(ActionId::CROUCH_SLIDE, 0);
    }

    ctx.update_shell_speed();
    let anim = if ctx.avatar.action_arg == 0 {
        AnimId::StartRidingShell
    } else {
        AnimId::RidingShell
    };
    ctx.set_anim(anim);

    match ctx.perform_ground_step() {
        GroundStep::LeftGround => {
            ctx.set_action(ActionId::RIDING_SHELL_FALL, 0);
        }
        GroundStep::HitWall => {
            ctx.stop_riding_and_holding();
            let bonk = if ctx.avatar.flags.has(AvatarFlags::METAL_CAP) {
                Sound::MetalBonk
            } else {
                Sound::Bonk
            };
            ctx.signals.sound(bonk);
            ctx.signals.particle(ParticleFlags::VERTICAL_STAR);
            ctx.set_action(ActionId::BACKWARD_GROUND_KB, 0);
        }
        GroundStep::None => {}
    }

    ctx.tilt_body_ground_shell(start_yaw);
    let sound = if ctx.floor_type() == SurfaceType::BURNING {
        Sound::RidingShellLava
    } else {
        Sound::TerrainRidingShell
    };
    ctx.signals.sound(sound);
    false
}

fn crawling(ctx: &mut ActionContext<'_>) -> bool {
    if ctx.should_begin_sliding() {
        return ctx.set_action(ActionId::BEGIN_SLIDING, 0);
    }
    if ctx.has_input(InputFlags::FIRST_PERSON) {
        return ctx.set_action(ActionId::STOP_CRAWLING, 0);
    }
    if ctx.has_input(InputFlags::A_PRESSED) {
        return ctx.set_jumping_action(ActionId::JUMP, 0);
    }
    if ctx.check_ground_dive_or_punch() {
        return true;
    }
    if ctx.has_input(InputFlags::IDLE) || !ctx.has_input(InputFlags::Z_DOWN) {
        return ctx.set_action(ActionId::STOP_CRAWLING, 0);
    }

    ctx.avatar.intended_mag *= 0.1;
    ctx.update_walking_speed();

    match ctx.perform_ground_step() {
        GroundStep::LeftGround => {
            ctx.set_action(ActionId::FREEFALL, 0);
        }
        GroundStep::HitWall => {
            if ctx.avatar.forward_vel > 10.0 {
                ctx.set_forward_vel(10.0);
            }
            // Crawling into a wall still hugs the floor.
            ctx.align_with_floor();
        }
        GroundStep::None => ctx.align_with_floor(),
    }

    let accel = anim_rate(ctx.avatar.intended_mag * 2.0);
    ctx.set_anim_with_accel(AnimId::Crawling, accel);
    ctx.play_step_sound(26, 79);
    false
}

fn burning_ground(ctx: &mut ActionContext<'_>) -> bool {
    if ctx.has_input(InputFlags::A_PRESSED) {
        return ctx.set_action(ActionId::BURNING_JUMP, 0);
    }

    ctx.avatar.burn_timer += 2;
    if ctx.avatar.burn_timer > 160 {
        return ctx.set_action(ActionId::WALKING, 0);
    }

    if ctx.avatar.water_level - ctx.avatar.floor_height > 50.0 {
        ctx.signals.sound(Sound::FlameOut);
        return ctx.set_action(ActionId::WALKING, 0);
    }

    let m = &mut *ctx.avatar;
    m.forward_vel = approach_f32(m.forward_vel.clamp(8.0, 48.0), 32.0, 4.0, 1.0);
    if m.input.has(InputFlags::NONZERO_ANALOG) {
        m.face_angle.yaw = approach_angle(m.face_angle.yaw, m.intended_yaw, 0x600);
    }

    ctx.apply_slope_accel();

    if ctx.perform_ground_step() == GroundStep::LeftGround {
        ctx.set_action(ActionId::BURNING_FALL, 0);
    }

    let accel = anim_rate(ctx.avatar.forward_vel / 2.0);
    ctx.set_anim_with_accel(AnimId::Running, accel);
    ctx.play_step_sound(9, 45);

    ctx.signals.particle(ParticleFlags::FIRE);
    ctx.signals.sound(Sound::LavaBurn);

    ctx.avatar.health -= 10;
    if ctx.avatar.is_dead() {
        ctx.set_action(ActionId::STANDING_DEATH, 0);
    }

    ctx.avatar.body.eye_state = EyeState::Dead;
    false
}

// ============================================================================
// Slides
// ============================================================================

fn butt_slide(ctx: &mut ActionContext<'_>) -> bool {
    let cancel = ctx.common_slide_action_with_jump(
        ActionId::BUTT_SLIDE_STOP,
        ActionId::JUMP,
        ActionId::BUTT_SLIDE_AIR,
        AnimId::Slide,
    );
    ctx.tilt_body_butt_slide();
    cancel
}

fn hold_butt_slide(ctx: &mut ActionContext<'_>) -> bool {
    if ctx.holding_dropped() {
        return ctx.drop_and_set_action(ActionId::BUTT_SLIDE, 0);
    }

    let cancel = ctx.common_slide_action_with_jump(
        ActionId::HOLD_BUTT_SLIDE_STOP,
        ActionId::HOLD_JUMP,
        ActionId::HOLD_BUTT_SLIDE_AIR,
        AnimId::SlidingOnBottomWithLightObj,
    );
    ctx.tilt_body_butt_slide();
    cancel
}

fn crouch_slide(ctx: &mut ActionContext<'_>) -> bool {
    if ctx.has_input(InputFlags::ABOVE_SLIDE) {
        return ctx.set_action(ActionId::BUTT_SLIDE, 0);
    }

    if ctx.avatar.action_timer < 30 {
        ctx.avatar.action_timer += 1;
        if ctx.has_input(InputFlags::A_PRESSED) && ctx.avatar.forward_vel > 10.0 {
            return ctx.set_jumping_action(ActionId::LONG_JUMP, 0);
        }
    }

    if ctx.has_input(InputFlags::B_PRESSED) {
        if ctx.avatar.forward_vel >= 10.0 {
            return ctx.set_action(ActionId::SLIDE_KICK, 0);
        }
        return ctx.set_action(ActionId::MOVE_PUNCHING, 9);
    }
    if ctx.has_input(InputFlags::A_PRESSED) {
        return ctx.set_jumping_action(ActionId::JUMP, 0);
    }
    if ctx.has_input(InputFlags::FIRST_PERSON) {
        return ctx.set_action(ActionId::BRAKING, 0);
    }

    ctx.common_slide_action_with_jump(
        ActionId::CROUCHING,
        ActionId::JUMP,
        ActionId::FREEFALL,
        AnimId::StartCrouching,
    )
}

fn slide_kick_slide(ctx: &mut ActionContext<'_>) -> bool {
    if ctx.has_input(InputFlags::A_PRESSED) {
        return ctx.set_jumping_action(ActionId::FORWARD_ROLLOUT, 0);
    }

    ctx.set_anim(AnimId::SlideKick);
    if ctx.anim_at_end() && ctx.avatar.forward_vel < 1.0 {
        return ctx.set_action(ActionId::SLIDE_KICK_SLIDE_STOP, 0);
    }

    ctx.update_sliding(1.0);
    match ctx.perform_ground_step() {
        GroundStep::LeftGround => {
            ctx.set_action(ActionId::FREEFALL, 2);
        }
        GroundStep::HitWall => {
            ctx.bonk_reflection(true);
            ctx.signals.particle(ParticleFlags::VERTICAL_STAR);
            ctx.set_action(ActionId::BACKWARD_GROUND_KB, 0);
        }
        GroundStep::None => {}
    }

    ctx.signals.sound(Sound::TerrainSlide);
    ctx.signals.particle(ParticleFlags::DUST);
    false
}

fn stomach_slide(ctx: &mut ActionContext<'_>) -> bool {
    ctx.stomach_slide_action(ActionId::STOMACH_SLIDE_STOP, ActionId::FREEFALL, AnimId::SlideDive)
}

fn hold_stomach_slide(ctx: &mut ActionContext<'_>) -> bool {
    if ctx.holding_dropped() {
        return ctx.drop_and_set_action(ActionId::STOMACH_SLIDE, 0);
    }
    ctx.stomach_slide_action(ActionId::DIVE_PICKING_UP, ActionId::HOLD_FREEFALL, AnimId::SlideDive)
}

fn dive_slide(ctx: &mut ActionContext<'_>) -> bool {
    if !ctx.has_input(InputFlags::ABOVE_SLIDE)
        && ctx.has_input(InputFlags::A_PRESSED | InputFlags::B_PRESSED)
    {
        let rollout = if ctx.avatar.forward_vel > 0.0 {
            ActionId::FORWARD_ROLLOUT
        } else {
            ActionId::BACKWARD_ROLLOUT
        };
        return ctx.set_action(rollout, 0);
    }

    ctx.play_landing_sound_once(Sound::TerrainBodyHitGround);

    if ctx.update_sliding(8.0) && ctx.anim_at_end() {
        ctx.set_forward_vel(0.0);
        ctx.set_action(ActionId::STOMACH_SLIDE_STOP, 0);
    }

    if ctx.grab_object_in_reach() {
        return true;
    }

    ctx.common_slide_action(ActionId::STOMACH_SLIDE_STOP, ActionId::FREEFALL, AnimId::Dive);
    false
}

// ============================================================================
// Ground knockbacks
// ============================================================================

fn hard_backward_ground_kb(ctx: &mut ActionContext<'_>) -> bool {
    let frame = ctx.common_ground_knockback(AnimId::FallOverBackwards, 43, true);
    if frame == 43 && ctx.avatar.is_dead() {
        ctx.set_action(ActionId::DEATH_ON_BACK, 0);
    }
    if frame == 54 && ctx.avatar.prev_action == ActionId::SPECIAL_DEATH_EXIT {
        ctx.signals.sound(Sound::MamaMia);
    }
    if frame == 69 {
        ctx.play_landing_sound_once(Sound::TerrainLanding);
    }
    false
}

fn hard_forward_ground_kb(ctx: &mut ActionContext<'_>) -> bool {
    let frame = ctx.common_ground_knockback(AnimId::LandOnStomach, 21, true);
    if frame == 23 && ctx.avatar.is_dead() {
        ctx.set_action(ActionId::DEATH_ON_STOMACH, 0);
    }
    false
}

fn backward_ground_kb(ctx: &mut ActionContext<'_>) -> bool {
    ctx.common_ground_knockback(AnimId::BackwardKb, 22, true);
    false
}

fn forward_ground_kb(ctx: &mut ActionContext<'_>) -> bool {
    ctx.common_ground_knockback(AnimId::ForwardKb, 20, true);
    false
}

fn soft_backward_ground_kb(ctx: &mut ActionContext<'_>) -> bool {
    ctx.common_ground_knockback(AnimId::SoftBackKb, 100, false);
    false
}

fn soft_forward_ground_kb(ctx: &mut ActionContext<'_>) -> bool {
    ctx.common_ground_knockback(AnimId::SoftFrontKb, 100, false);
    false
}

fn ground_bonk(ctx: &mut ActionContext<'_>) -> bool {
    let frame = ctx.common_ground_knockback(AnimId::GroundBonk, 32, true);
    if frame == 32 {
        ctx.play_landing_sound(Sound::TerrainLanding);
    }
    false
}

fn death_exit_land(ctx: &mut ActionContext<'_>) -> bool {
    ctx.apply_landing_accel(0.9);
    ctx.play_heavy_landing_sound_once(Sound::TerrainBodyHitGround);

    let frame = ctx.set_anim(AnimId::FallOverBackwards);
    if frame == 54 {
        ctx.signals.sound(Sound::MamaMia);
    }
    if frame == 68 {
        ctx.play_landing_sound(Sound::TerrainLanding);
    }

    if ctx.anim_at_end() {
        ctx.set_action(ActionId::IDLE, 0);
    }
    false
}

// ============================================================================
// Landings
// ============================================================================

fn jump_land(ctx: &mut ActionContext<'_>) -> bool {
    if ctx.common_landing_cancels(&JUMP_LANDING) {
        return true;
    }
    ctx.common_landing_action(AnimId::LandFromSingleJump, ActionId::FREEFALL);
    false
}

fn freefall_land(ctx: &mut ActionContext<'_>) -> bool {
    if ctx.common_landing_cancels(&FREEFALL_LANDING) {
        return true;
    }
    ctx.common_landing_action(AnimId::GeneralLand, ActionId::FREEFALL);
    false
}

fn side_flip_land(ctx: &mut ActionContext<'_>) -> bool {
    if ctx.common_landing_cancels(&SIDE_FLIP_LANDING) {
        return true;
    }
    if ctx.common_landing_action(AnimId::SlideflipLand, ActionId::FREEFALL) != GroundStep::HitWall {
        ctx.avatar.render.angle.yaw += Angle::HALF;
    }
    false
}

fn hold_jump_land(ctx: &mut ActionContext<'_>) -> bool {
    if ctx.holding_dropped() {
        return ctx.drop_and_set_action(ActionId::JUMP_LAND_STOP, 0);
    }
    if ctx.common_landing_cancels(&HOLD_JUMP_LANDING) {
        return true;
    }
    ctx.common_landing_action(AnimId::JumpLandWithLightObj, ActionId::HOLD_FREEFALL);
    false
}

fn hold_freefall_land(ctx: &mut ActionContext<'_>) -> bool {
    if ctx.holding_dropped() {
        return ctx.drop_and_set_action(ActionId::FREEFALL_LAND_STOP, 0);
    }
    if ctx.common_landing_cancels(&HOLD_FREEFALL_LANDING) {
        return true;
    }
    ctx.common_landing_action(AnimId::FallLandWithLightObj, ActionId::HOLD_FREEFALL);
    false
}

fn long_jump_land(ctx: &mut ActionContext<'_>) -> bool {
    if ctx.config.disable_blj && ctx.avatar.forward_vel < 0.0 {
        ctx.avatar.forward_vel = 0.0;
    }

    if !ctx.has_input(InputFlags::Z_DOWN) {
        ctx.avatar.input.set(InputFlags::A_PRESSED, false);
    }

    if ctx.common_landing_cancels(&LONG_JUMP_LANDING) {
        return true;
    }

    if !ctx.has_input(InputFlags::NONZERO_ANALOG) {
        ctx.play_sound_if_no_flag(Sound::UhLongJumpLand, AvatarFlags::VOICE_PLAYED);
    }

    let anim = if ctx.avatar.long_jump_is_slow {
        AnimId::CrouchFromSlowLongjump
    } else {
        AnimId::CrouchFromFastLongjump
    };
    ctx.common_landing_action(anim, ActionId::FREEFALL);
    false
}

fn double_jump_land(ctx: &mut ActionContext<'_>) -> bool {
    if ctx.common_landing_cancels(&DOUBLE_JUMP_LANDING) {
        return true;
    }
    ctx.common_landing_action(AnimId::LandFromDoubleJump, ActionId::FREEFALL);
    false
}

fn triple_jump_land(ctx: &mut ActionContext<'_>) -> bool {
    ctx.avatar.input.set(InputFlags::A_PRESSED, false);

    if ctx.common_landing_cancels(&TRIPLE_JUMP_LANDING) {
        return true;
    }

    if !ctx.has_input(InputFlags::NONZERO_ANALOG) {
        ctx.play_sound_if_no_flag(Sound::Haha, AvatarFlags::VOICE_PLAYED);
    }
    ctx.common_landing_action(AnimId::TripleJumpLand, ActionId::FREEFALL);
    false
}

fn backflip_land(ctx: &mut ActionContext<'_>) -> bool {
    if !ctx.has_input(InputFlags::Z_DOWN) {
        ctx.avatar.input.set(InputFlags::A_PRESSED, false);
    }

    if ctx.common_landing_cancels(&BACKFLIP_LANDING) {
        return true;
    }

    if !ctx.has_input(InputFlags::NONZERO_ANALOG) {
        ctx.play_sound_if_no_flag(Sound::Haha, AvatarFlags::VOICE_PLAYED);
    }
    ctx.common_landing_action(AnimId::TripleJumpLand, ActionId::FREEFALL);
    false
}

fn quicksand_jump_land(ctx: &mut ActionContext<'_>) -> bool {
    ctx.quicksand_jump_land_action(
        AnimId::SingleJump,
        AnimId::LandFromSingleJump,
        ActionId::JUMP_LAND_STOP,
        ActionId::FREEFALL,
    )
}

fn hold_quicksand_jump_land(ctx: &mut ActionContext<'_>) -> bool {
    ctx.quicksand_jump_land_action(
        AnimId::JumpWithLightObj,
        AnimId::JumpLandWithLightObj,
        ActionId::HOLD_JUMP_LAND_STOP,
        ActionId::HOLD_FREEFALL,
    )
}

#[cfg(test)]
mod tests {
    use super::super::super::context::tests::{
        add_quad, flat_world, floor_rect, sloped_world, wall_facing_neg_x, Harness,
    };
    use super::super::super::state::HeldObject;
    use super::*;
    use crate::collision::{CollisionConfig, CollisionWorld};
    use glam::IVec3;

    fn run(h: &mut Harness) -> bool {
        h.avatar.transitioned = false;
        let table = ActionTable::default();
        let cancelled = table.execute(&mut h.ctx());
        h.avatar.anim.advance();
        cancelled
    }

    fn run_until_change(h: &mut Harness, frames: usize) -> ActionId {
        let start = h.avatar.action;
        for _ in 0..frames {
            run(h);
            if h.avatar.action != start {
                break;
            }
        }
        h.avatar.action
    }

    fn world_with_wall_at(x: i32) -> CollisionWorld {
        let mut world = flat_world(SurfaceType::DEFAULT);
        add_quad(&mut world, wall_facing_neg_x(x, 400), SurfaceType::DEFAULT);
        world
    }

    fn hold_stick(h: &mut Harness, yaw: Angle, mag: f32) {
        h.avatar.intended_yaw = yaw;
        h.avatar.intended_mag = mag;
        h.avatar.stick_mag = mag * 2.0;
        h.avatar.input.set(InputFlags::NONZERO_ANALOG, true);
    }

    #[test]
    fn test_walking_speed_plateaus_without_overshoot() {
        let mut h = Harness::new(flat_world(SurfaceType::DEFAULT));
        h.avatar.action = ActionId::WALKING;
        hold_stick(&mut h, Angle::ZERO, 32.0);

        for _ in 0..100 {
            run(&mut h);
            assert!(h.avatar.forward_vel <= 48.0);
        }

        assert_eq!(h.avatar.action, ActionId::WALKING);
        assert!(h.avatar.forward_vel > 31.0 && h.avatar.forward_vel < 33.0);
        // Ran straight ahead along +Z.
        assert!(h.avatar.pos.z > 2000.0);
        assert_eq!(h.avatar.anim.id(), Some(AnimId::Running));
    }

    #[test]
    fn test_slow_floor_caps_walking_target() {
        let mut h = Harness::new(flat_world(SurfaceType::SLOW));
        h.avatar.action = ActionId::WALKING;
        hold_stick(&mut h, Angle::ZERO, 32.0);

        for _ in 0..100 {
            run(&mut h);
        }
        assert!(h.avatar.forward_vel < 25.0);
    }

    #[test]
    fn test_vanilla_turn_rate_is_capped() {
        let mut h = Harness::new(flat_world(SurfaceType::DEFAULT));
        h.avatar.action = ActionId::WALKING;
        h.avatar.forward_vel = 10.0;
        hold_stick(&mut h, Angle(0x3000), 32.0);

        run(&mut h);
        assert_eq!(h.avatar.face_angle.yaw, Angle(0x800));
    }

    #[test]
    fn test_stick_held_back_turns_around() {
        let mut h = Harness::new(flat_world(SurfaceType::DEFAULT));
        h.avatar.action = ActionId::WALKING;
        h.avatar.forward_vel = 20.0;
        hold_stick(&mut h, Angle::HALF, 32.0);

        assert!(run(&mut h));
        assert_eq!(h.avatar.action, ActionId::TURNING_AROUND);
    }

    #[test]
    fn test_idle_stick_brakes_or_decelerates() {
        let mut h = Harness::new(flat_world(SurfaceType::DEFAULT));
        h.avatar.action = ActionId::WALKING;
        h.avatar.forward_vel = 20.0;
        h.avatar.input.set(InputFlags::IDLE, true);
        run(&mut h);
        assert_eq!(h.avatar.action, ActionId::BRAKING);

        let mut h = Harness::new(flat_world(SurfaceType::DEFAULT));
        h.avatar.action = ActionId::WALKING;
        h.avatar.forward_vel = 8.0;
        h.avatar.input.set(InputFlags::IDLE, true);
        run(&mut h);
        assert_eq!(h.avatar.action, ActionId::DECELERATING);
    }

    #[test]
    fn test_walking_drops_held_object() {
        let mut h = Harness::new(flat_world(SurfaceType::DEFAULT));
        h.avatar.action = ActionId::WALKING;
        h.avatar.held_obj = Some(HeldObject::new(7));
        hold_stick(&mut h, Angle::ZERO, 10.0);

        run(&mut h);
        assert!(h.avatar.held_obj.is_none());
        assert!(h.signals.contains(Signal::DropHeldObject));
    }

    #[test]
    fn test_running_dive_and_standing_punch() {
        let mut h = Harness::new(flat_world(SurfaceType::DEFAULT));
        h.avatar.action = ActionId::WALKING;
        h.avatar.forward_vel = 30.0;
        hold_stick(&mut h, Angle::ZERO, 32.0);
        h.avatar.input.set(InputFlags::B_PRESSED, true);
        run(&mut h);
        assert_eq!(h.avatar.action, ActionId::DIVE);
        assert_eq!(h.avatar.action_arg, 1);
        assert_eq!(h.avatar.vel.y, 20.0);

        let mut h = Harness::new(flat_world(SurfaceType::DEFAULT));
        h.avatar.action = ActionId::DECELERATING;
        h.avatar.forward_vel = 4.0;
        h.avatar.input.set(InputFlags::B_PRESSED, true);
        run(&mut h);
        assert_eq!(h.avatar.action, ActionId::MOVE_PUNCHING);
    }

    #[test]
    fn test_move_punch_can_jump_kick_on_first_frame() {
        let mut h = Harness::new(flat_world(SurfaceType::DEFAULT));
        h.avatar.action = ActionId::MOVE_PUNCHING;
        h.avatar.input.set(InputFlags::A_DOWN, true);
        run(&mut h);
        assert_eq!(h.avatar.action, ActionId::JUMP_KICK);
        assert_eq!(h.avatar.vel.y, 20.0);

        let mut h = Harness::new(flat_world(SurfaceType::DEFAULT));
        h.avatar.action = ActionId::MOVE_PUNCHING;
        run(&mut h);
        assert_eq!(h.avatar.action_state, PUNCH_NO_JUMP_KICK);
        assert!(h.signals.played(Sound::PunchYah));
        h.avatar.input.set(InputFlags::A_DOWN, true);
        run(&mut h);
        assert_eq!(h.avatar.action, ActionId::MOVE_PUNCHING);
    }

    #[test]
    fn test_punch_combo_returns_to_walking() {
        let mut h = Harness::new(flat_world(SurfaceType::DEFAULT));
        h.avatar.action = ActionId::MOVE_PUNCHING;
        assert_eq!(run_until_change(&mut h, 60), ActionId::WALKING);
    }

    #[test]
    fn test_braking_into_wall_knocks_back() {
        let mut h = Harness::new(world_with_wall_at(100));
        h.avatar.action = ActionId::BRAKING;
        h.avatar.face_angle.yaw = Angle::QUARTER;
        h.avatar.pos.x = 60.0;
        h.avatar.forward_vel = 30.0;

        run(&mut h);
        assert_eq!(h.avatar.action, ActionId::BACKWARD_GROUND_KB);
        assert!(h.avatar.forward_vel < 0.0);
        assert!(h.avatar.pos.x <= 50.0 + 1e-3);
    }

    #[test]
    fn test_braking_to_stop() {
        let mut h = Harness::new(flat_world(SurfaceType::DEFAULT));
        h.avatar.action = ActionId::BRAKING;
        h.avatar.forward_vel = 20.0;
        assert_eq!(run_until_change(&mut h, 20), ActionId::BRAKING_STOP);
        assert_eq!(h.avatar.forward_vel, 0.0);
    }

    #[test]
    fn test_walking_into_wall_pushes() {
        let mut h = Harness::new(world_with_wall_at(100));
        h.avatar.action = ActionId::WALKING;
        h.avatar.face_angle.yaw = Angle::QUARTER;
        h.avatar.pos.x = 40.0;
        h.avatar.forward_vel = 20.0;
        hold_stick(&mut h, Angle::QUARTER, 32.0);
        // Left over from an earlier air step.
        h.avatar.wall_yaw = Angle::ZERO;

        run(&mut h);
        assert_eq!(h.avatar.action, ActionId::WALKING);
        assert_eq!(h.avatar.wall_yaw, Angle(-0x4000));
        assert!(h.avatar.flags.has(AvatarFlags::PUSHING));
        assert_eq!(h.avatar.anim.id(), Some(AnimId::Pushing));
        assert!(h.avatar.forward_vel <= 6.0);
    }

    #[test]
    fn test_ledge_climb_down_when_backing_off_an_edge() {
        let mut world = CollisionWorld::new(CollisionConfig::default());
        add_quad(&mut world, floor_rect(-2000, -2000, 5, 2000, 0), SurfaceType::DEFAULT);
        add_quad(&mut world, floor_rect(-4000, -4000, 4000, 4000, -400), SurfaceType::DEFAULT);
        // Cliff face at x = 5 looking out over the drop.
        add_quad(
            &mut world,
            [
                IVec3::new(5, 0, -2000),
                IVec3::new(5, 0, 2000),
                IVec3::new(5, -400, 2000),
                IVec3::new(5, -400, -2000),
            ],
            SurfaceType::DEFAULT,
        );

        let mut h = Harness::new(world);
        h.avatar.action = ActionId::WALKING;
        h.avatar.face_angle.yaw = Angle::QUARTER;
        h.ctx().check_ledge_climb_down();

        assert_eq!(h.avatar.action, ActionId::LEDGE_CLIMB_DOWN);
        assert_eq!(h.avatar.face_angle.yaw, Angle::QUARTER + Angle::HALF);
        assert_eq!(h.avatar.anim.id(), Some(AnimId::ClimbDownLedge));
        assert!(h.avatar.pos.x < 5.0);
    }

    #[test]
    fn test_landing_times_out_into_stop() {
        let mut h = Harness::new(flat_world(SurfaceType::DEFAULT));
        h.avatar.action = ActionId::JUMP_LAND;

        assert_eq!(run_until_change(&mut h, 10), ActionId::JUMP_LAND_STOP);
        assert_eq!(h.avatar.double_jump_timer, 5);
        assert!(h.signals.played(Sound::TerrainLanding));

        let mut h = Harness::new(flat_world(SurfaceType::DEFAULT));
        h.avatar.action = ActionId::LONG_JUMP_LAND;
        let mut frames = 0;
        while h.avatar.action == ActionId::LONG_JUMP_LAND && frames < 20 {
            run(&mut h);
            frames += 1;
        }
        assert_eq!(h.avatar.action, ActionId::LONG_JUMP_LAND_STOP);
        assert_eq!(frames, 6);
    }

    #[test]
    fn test_a_during_landing_chains_jumps() {
        let mut h = Harness::new(flat_world(SurfaceType::DEFAULT));
        h.avatar.action = ActionId::JUMP_LAND;
        h.avatar.input.set(InputFlags::A_PRESSED, true);
        run(&mut h);
        assert_eq!(h.avatar.action, ActionId::DOUBLE_JUMP);
        assert_eq!(h.avatar.vel.y, 52.0);

        let mut h = Harness::new(flat_world(SurfaceType::DEFAULT));
        h.avatar.action = ActionId::DOUBLE_JUMP_LAND;
        h.avatar.forward_vel = 30.0;
        h.avatar.input.set(InputFlags::A_PRESSED, true);
        run(&mut h);
        assert_eq!(h.avatar.action, ActionId::TRIPLE_JUMP);
    }

    #[test]
    fn test_triple_jump_landing_ignores_a() {
        let mut h = Harness::new(flat_world(SurfaceType::DEFAULT));
        h.avatar.action = ActionId::TRIPLE_JUMP_LAND;
        h.avatar.input.set(InputFlags::A_PRESSED, true);
        run(&mut h);
        assert_eq!(h.avatar.action, ActionId::TRIPLE_JUMP_LAND);
        assert!(h.signals.played(Sound::Haha));
        assert_eq!(h.avatar.double_jump_timer, 0);
    }

    #[test]
    fn test_steep_landing_pushes_off() {
        let mut h = Harness::new(sloped_world(SurfaceType::DEFAULT, 4.0));
        h.avatar.action = ActionId::FREEFALL_LAND;
        h.avatar.face_angle.yaw = h.avatar.floor_angle;

        run(&mut h);
        assert_eq!(h.avatar.action, ActionId::FREEFALL);
        assert_eq!(h.avatar.forward_vel, 16.0);
    }

    #[test]
    fn test_blj_clamp_on_long_jump_landing() {
        let mut h = Harness::new(flat_world(SurfaceType::DEFAULT));
        h.config.disable_blj = true;
        h.avatar.action = ActionId::LONG_JUMP_LAND;
        h.avatar.forward_vel = -40.0;
        run(&mut h);
        assert_eq!(h.avatar.forward_vel, 0.0);

        let mut h = Harness::new(flat_world(SurfaceType::DEFAULT));
        h.avatar.action = ActionId::LONG_JUMP_LAND;
        h.avatar.forward_vel = -40.0;
        run(&mut h);
        assert!(h.avatar.forward_vel < -30.0);
    }

    #[test]
    fn test_knockback_recovers_to_idle() {
        let mut h = Harness::new(flat_world(SurfaceType::DEFAULT));
        h.avatar.action = ActionId::BACKWARD_GROUND_KB;
        h.avatar.action_arg = 1;
        h.avatar.forward_vel = -20.0;

        assert_eq!(run_until_change(&mut h, 80), ActionId::IDLE);
        assert_eq!(h.avatar.invinc_timer, 30);
        assert!(h.signals.played(Sound::Attacked));
        assert!(h.signals.played(Sound::TerrainBodyHitGround));
    }

    #[test]
    fn test_knockback_with_no_health_dies() {
        let mut h = Harness::new(flat_world(SurfaceType::DEFAULT));
        h.avatar.action = ActionId::SOFT_FORWARD_GROUND_KB;
        h.avatar.health = 0xFF;

        assert_eq!(run_until_change(&mut h, 80), ActionId::STANDING_DEATH);
    }

    #[test]
    fn test_butt_slide_stops_on_flat_ground() {
        let mut h = Harness::new(flat_world(SurfaceType::DEFAULT));
        h.avatar.action = ActionId::BUTT_SLIDE;
        h.avatar.set_forward_vel(2.0);

        run(&mut h);
        assert_eq!(h.avatar.action, ActionId::BUTT_SLIDE_STOP);
        assert_eq!(h.avatar.forward_vel, 0.0);
    }

    #[test]
    fn test_slide_picks_up_speed_downhill() {
        let mut h = Harness::new(sloped_world(SurfaceType::DEFAULT, 0.5));
        h.avatar.action = ActionId::BUTT_SLIDE;
        h.avatar.face_angle.yaw = h.avatar.floor_angle;

        for _ in 0..10 {
            run(&mut h);
        }
        assert_eq!(h.avatar.action, ActionId::BUTT_SLIDE);
        assert!(h.avatar.forward_vel > 5.0);
        assert!(h.avatar.pos.z < 0.0);
        assert!(h.signals.played(Sound::TerrainSlide));
    }

    #[test]
    fn test_dive_slide_grabs_object_in_reach() {
        let mut h = Harness::new(flat_world(SurfaceType::DEFAULT));
        h.avatar.action = ActionId::DIVE_SLIDE;
        h.avatar.set_forward_vel(20.0);
        h.avatar.interact_status = InteractStatus(InteractStatus::GRAB_IN_REACH);

        assert!(run(&mut h));
        assert_eq!(h.avatar.action, ActionId::DIVE_PICKING_UP);
        assert!(h.signals.contains(Signal::GrabObject));
    }

    #[test]
    fn test_stomach_slide_rollout_window() {
        let mut h = Harness::new(flat_world(SurfaceType::DEFAULT));
        h.avatar.action = ActionId::STOMACH_SLIDE;
        h.avatar.set_forward_vel(30.0);
        h.avatar.input.set(InputFlags::A_PRESSED, true);

        // Too early for a rollout.
        run(&mut h);
        assert_eq!(h.avatar.action, ActionId::STOMACH_SLIDE);

        h.avatar.action_timer = 5;
        run(&mut h);
        assert_eq!(h.avatar.action, ActionId::FORWARD_ROLLOUT);
    }

    #[test]
    fn test_burning_ground_drains_health() {
        let mut h = Harness::new(flat_world(SurfaceType::DEFAULT));
        h.avatar.action = ActionId::BURNING_GROUND;
        let health = h.avatar.health;

        run(&mut h);
        assert_eq!(h.avatar.health, health - 10);
        assert_eq!(h.avatar.burn_timer, 2);
        assert_eq!(h.avatar.forward_vel, 12.0);
        assert!(h.signals.particles.has(ParticleFlags::FIRE));
        assert_eq!(h.avatar.body.eye_state, EyeState::Dead);
    }

    #[test]
    fn test_shell_rides_over_water_surface() {
        let mut h = Harness::new(flat_world(SurfaceType::DEFAULT));
        h.avatar.action = ActionId::RIDING_SHELL_GROUND;
        h.avatar.action_arg = 1;
        h.avatar.ridden_obj = Some(3);
        h.avatar.water_level = 20.0;
        h.avatar.pos.y = 20.0;

        h.ctx().update_shell_speed();
        assert_eq!(h.avatar.floor, Some(SurfaceRef::WaterPseudoFloor));
        assert_eq!(h.avatar.floor_height, 20.0);
        // Shell speed starts from the 24 floor on the target.
        assert!((h.avatar.forward_vel - 1.1).abs() < 1e-5);
    }

    #[test]
    fn test_shell_wall_hit_dismounts() {
        let mut h = Harness::new(world_with_wall_at(100));
        h.avatar.action = ActionId::RIDING_SHELL_GROUND;
        h.avatar.action_arg = 1;
        h.avatar.ridden_obj = Some(3);
        h.avatar.face_angle.yaw = Angle::QUARTER;
        h.avatar.intended_yaw = Angle::QUARTER;
        h.avatar.pos.x = 40.0;
        h.avatar.forward_vel = 40.0;

        run(&mut h);
        assert_eq!(h.avatar.action, ActionId::BACKWARD_GROUND_KB);
        assert!(h.avatar.ridden_obj.is_none());
        assert!(h.signals.contains(Signal::StopRiding));
        assert!(h.signals.played(Sound::Bonk));
    }

    #[test]
    fn test_water_swaps_dust_for_wave_trail() {
        let mut h = Harness::new(flat_world(SurfaceType::DEFAULT));
        h.avatar.action = ActionId::WALKING;
        hold_stick(&mut h, Angle::ZERO, 30.0);
        h.avatar.input.set(InputFlags::IN_WATER, true);

        run(&mut h);
        assert!(h.signals.particles.has(ParticleFlags::WAVE_TRAIL));
        assert!(!h.signals.particles.has(ParticleFlags::DUST));
    }

    #[test]
    fn test_turn_toward_clamps_rate() {
        assert_eq!(turn_toward(Angle::ZERO, Angle(0x100), 0x800), Angle(0x100));
        assert_eq!(turn_toward(Angle::ZERO, Angle(0x4000), 0x800), Angle(0x800));
        assert_eq!(turn_toward(Angle::ZERO, Angle(-0x4000), 0x800), Angle(-0x800));
    }
}
