//! Airborne actions.
//!
//! Most handlers follow the same shape: check the button cancels, play the
//! jump sound, steer, run one air step and react to its result. The shared
//! pieces (steering, fall damage, wall bonks, knockback steps) are private
//! helpers on [`ActionContext`].

use glam::Vec3;

use crate::collision::SurfaceType;
use crate::math::{approach_f32, approach_s32, approach_s32_symmetric, atan2s, Angle, COS10, COS30};

use super::super::action::ActionId;
use super::super::animation::AnimId;
use super::super::context::{ActionContext, Terrain, Voice};
use super::super::signal::{CameraShake, ParticleFlags, Signal, Sound};
use super::super::state::{AvatarFlags, EyeState, InputFlags, InteractStatus};
use super::super::step::{AirStep, AirStepFlags};
use super::ActionTable;

/// Steepest dive or flight pitch, 60 degrees.
const MAX_PITCH: i16 = 0x2AAA;

pub(super) fn register(table: &mut ActionTable) {
    table.register(ActionId::JUMP, "jump", jump);
    table.register(ActionId::DOUBLE_JUMP, "double_jump", double_jump);
    table.register(ActionId::TRIPLE_JUMP, "triple_jump", triple_jump);
    table.register(ActionId::BACKFLIP, "backflip", backflip);
    table.register(ActionId::FREEFALL, "freefall", freefall);
    table.register(ActionId::HOLD_JUMP, "hold_jump", hold_jump);
    table.register(ActionId::HOLD_FREEFALL, "hold_freefall", hold_freefall);
    table.register(ActionId::SIDE_FLIP, "side_flip", side_flip);
    table.register(ActionId::WALL_KICK_AIR, "wall_kick_air", wall_kick_air);
    table.register(ActionId::TWIRLING, "twirling", twirling);
    table.register(ActionId::WATER_JUMP, "water_jump", water_jump);
    table.register(ActionId::HOLD_WATER_JUMP, "hold_water_jump", hold_water_jump);
    table.register(ActionId::STEEP_JUMP, "steep_jump", steep_jump);
    table.register(ActionId::BURNING_JUMP, "burning_jump", burning_jump);
    table.register(ActionId::BURNING_FALL, "burning_fall", burning_fall);
    table.register(ActionId::LONG_JUMP, "long_jump", long_jump);
    table.register(ActionId::RIDING_SHELL_JUMP, "riding_shell_jump", riding_shell_air);
    table.register(ActionId::RIDING_SHELL_FALL, "riding_shell_fall", riding_shell_air);
    table.register(ActionId::DIVE, "dive", dive);
    table.register(ActionId::AIR_THROW, "air_throw", air_throw);
    table.register(ActionId::BACKWARD_AIR_KB, "backward_air_kb", backward_air_kb);
    table.register(ActionId::FORWARD_AIR_KB, "forward_air_kb", forward_air_kb);
    table.register(ActionId::HARD_BACKWARD_AIR_KB, "hard_backward_air_kb", hard_backward_air_kb);
    table.register(ActionId::HARD_FORWARD_AIR_KB, "hard_forward_air_kb", hard_forward_air_kb);
    table.register(ActionId::SOFT_BONK, "soft_bonk", soft_bonk);
    table.register(ActionId::AIR_HIT_WALL, "air_hit_wall", air_hit_wall);
    table.register(ActionId::FORWARD_ROLLOUT, "forward_rollout", forward_rollout);
    table.register(ActionId::BACKWARD_ROLLOUT, "backward_rollout", backward_rollout);
    table.register(ActionId::SHOT_FROM_CANNON, "shot_from_cannon", shot_from_cannon);
    table.register(ActionId::BUTT_SLIDE_AIR, "butt_slide_air", butt_slide_air);
    table.register(ActionId::HOLD_BUTT_SLIDE_AIR, "hold_butt_slide_air", hold_butt_slide_air);
    table.register(ActionId::LAVA_BOOST, "lava_boost", lava_boost);
    table.register(ActionId::GETTING_BLOWN, "getting_blown", getting_blown);
    table.register(ActionId::CRAZY_BOX_BOUNCE, "crazy_box_bounce", crazy_box_bounce);
    table.register(ActionId::SPECIAL_TRIPLE_JUMP, "special_triple_jump", special_triple_jump);
    table.register(ActionId::GROUND_POUND, "ground_pound", ground_pound);
    table.register(ActionId::THROWN_FORWARD, "thrown_forward", thrown_forward);
    table.register(ActionId::THROWN_BACKWARD, "thrown_backward", thrown_backward);
    table.register(ActionId::FLYING_TRIPLE_JUMP, "flying_triple_jump", flying_triple_jump);
    table.register(ActionId::SLIDE_KICK, "slide_kick", slide_kick);
    table.register(ActionId::JUMP_KICK, "jump_kick", jump_kick);
    table.register(ActionId::FLYING, "flying", flying);
    table.register(ActionId::RIDING_HOOT, "riding_hoot", riding_hoot);
    table.register(ActionId::TOP_OF_POLE_JUMP, "top_of_pole_jump", top_of_pole_jump);
    table.register(ActionId::VERTICAL_WIND, "vertical_wind", vertical_wind);
}

/// Negated stick deflection scaled by speed, stored as a 16-bit rate.
fn stick_rate(stick: f32, scale: f32) -> i32 {
    let raw = (stick * scale) as i32 as i16;
    i32::from((-i32::from(raw)) as i16)
}

impl ActionContext<'_> {
    // ========================================================================
    // Sounds
    // ========================================================================

    fn play_flip_sounds(&mut self, frames: [i16; 3]) {
        if frames.contains(&self.anim_frame()) {
            self.signals.sound(Sound::Spin);
        }
    }

    /// Scream once when a fall gets long enough to hurt.
    pub(crate) fn play_far_fall_sound(&mut self) {
        let action = self.avatar.action;
        if action.is_invulnerable()
            || action == ActionId::TWIRLING
            || action == ActionId::FLYING
            || self.avatar.flags.has(AvatarFlags::FALL_SOUND_PLAYED)
        {
            return;
        }

        if self.avatar.peak_height - self.avatar.pos.y > self.config.fall_damage_height_small {
            self.signals.sound(Sound::Waaaooow);
            self.avatar.flags.set(AvatarFlags::FALL_SOUND_PLAYED, true);
        }
    }

    fn play_knockback_sound(&mut self) {
        let sound = if self.avatar.action_arg == 0 && self.avatar.forward_vel.abs() >= 28.0 {
            Sound::Doh
        } else {
            Sound::Uh
        };
        self.play_sound_if_no_flag(sound, AvatarFlags::VOICE_PLAYED);
    }

    // ========================================================================
    // Damage and landings
    // ========================================================================

    fn cap_on_head(&self) -> bool {
        self.avatar.flags.has(AvatarFlags::CAP_ON_HEAD)
    }

    pub(crate) fn add_hurt(&mut self, with_cap: u8, without_cap: u8) {
        let damage = if self.cap_on_head() { with_cap } else { without_cap };
        self.avatar.hurt_counter = self.avatar.hurt_counter.saturating_add(damage);
    }

    /// Bounce off a burning wall.
    pub(crate) fn lava_boost_on_wall(&mut self) -> bool {
        let m = &mut *self.avatar;
        m.face_angle.yaw = m.wall_yaw;
        if m.forward_vel < 24.0 {
            m.forward_vel = 24.0;
        }

        if !self.avatar.flags.has(AvatarFlags::METAL_CAP) {
            self.add_hurt(12, 18);
        }

        self.signals.sound(Sound::OnFire);
        self.reset_camera();
        self.drop_and_set_action(ActionId::LAVA_BOOST, 1)
    }

    /// Hurt the avatar for a long fall. Returns `true` when the landing
    /// turned into `hard_fall`.
    fn check_fall_damage(&mut self, hard_fall: ActionId) -> bool {
        if !self.config.fall_damage {
            return false;
        }

        let fall_height = self.avatar.peak_height - self.avatar.pos.y;
        if self.avatar.action == ActionId::TWIRLING || self.floor_type() == SurfaceType::BURNING {
            return false;
        }
        if self.avatar.vel.y >= -55.0 {
            return false;
        }

        if fall_height > self.config.fall_damage_height_large {
            self.add_hurt(16, 24);
            self.signals.push(Signal::CameraShake(CameraShake::FallDamage));
            self.signals.sound(Sound::Attacked);
            return self.drop_and_set_action(hard_fall, 4);
        }

        if fall_height > self.config.fall_damage_height_small && !self.floor_is_slippery() {
            self.add_hurt(8, 12);
            self.avatar.squish_timer = 30;
            self.signals.push(Signal::CameraShake(CameraShake::FallDamage));
            self.signals.sound(Sound::Attacked);
        }

        false
    }

    /// Long falls into soft snow or sand bury the avatar.
    fn should_get_stuck_in_ground(&self) -> bool {
        if !self.config.getting_buried {
            return false;
        }
        let Some(floor) = self.floor() else {
            return false;
        };

        matches!(self.area.terrain, Terrain::Snow | Terrain::Sand)
            && floor.ty != SurfaceType::BURNING
            && !floor.ty.is_hard()
            && !floor.is_dynamic()
            && self.avatar.peak_height - self.avatar.pos.y > 1000.0
            && floor.normal.y >= COS30
    }

    fn check_fall_damage_or_get_stuck(&mut self, hard_fall: ActionId) -> bool {
        if self.should_get_stuck_in_ground() {
            self.signals.sound(Sound::Ooof);
            self.signals.particle(ParticleFlags::MIST_CIRCLE);
            self.drop_and_set_action(ActionId::FEET_STUCK_IN_GROUND, 0);
            return true;
        }

        self.check_fall_damage(hard_fall)
    }

    fn check_kick_or_dive_in_air(&mut self) -> bool {
        if self.has_input(InputFlags::B_PRESSED) {
            let action = if self.avatar.forward_vel > 28.0 {
                ActionId::DIVE
            } else {
                ActionId::JUMP_KICK
            };
            return self.set_action(action, 0);
        }
        false
    }

    fn check_wall_kick(&mut self) -> bool {
        let m = &*self.avatar;
        if m.input.has(InputFlags::A_PRESSED)
            && m.wall_kick_timer != 0
            && m.prev_action == ActionId::AIR_HIT_WALL
        {
            self.avatar.face_angle.yaw += Angle::HALF;
            return self.set_action(ActionId::WALL_KICK_AIR, 0);
        }
        false
    }

    /// Transition after bonking off something that is not a referenced
    /// wall. The classic game keeps the held object attached here.
    fn set_air_bonk_action(&mut self, action: ActionId) -> bool {
        if self.config.drop_held_on_air_bonk {
            self.drop_and_set_action(action, 0)
        } else {
            self.set_action(action, 0)
        }
    }

    fn stop_rising(&mut self) {
        if self.avatar.vel.y > 0.0 {
            self.avatar.vel.y = 0.0;
        }
    }

    // ========================================================================
    // Steering
    // ========================================================================

    /// Wind floors carry the avatar along while airborne.
    fn check_horizontal_wind(&mut self) -> bool {
        let Some(floor) = self.floor() else {
            return false;
        };
        if floor.ty != SurfaceType::HORIZONTAL_WIND {
            return false;
        }
        if self.config.wind_resistant_metal_cap && self.avatar.flags.has(AvatarFlags::METAL_CAP) {
            return false;
        }

        let push = Angle::from_i32(i32::from(floor.force) << 8);
        let m = &mut *self.avatar;
        m.slide_vel_x += 1.2 * push.sin();
        m.slide_vel_z += 1.2 * push.cos();

        let mut speed = m.slide_vel_x * m.slide_vel_x + m.slide_vel_z * m.slide_vel_z;
        if speed > 48.0 * 48.0 {
            speed = speed.sqrt();
            m.slide_vel_x = m.slide_vel_x * 48.0 / speed;
            m.slide_vel_z = m.slide_vel_z * 48.0 / speed;
            speed = 48.0;
        } else if speed > 32.0 {
            // Squared speed against an unsquared cap, as in the classic game.
            speed = 32.0;
        }

        m.vel.x = m.slide_vel_x;
        m.vel.z = m.slide_vel_z;
        m.slide_yaw = atan2s(m.slide_vel_z, m.slide_vel_x);
        m.forward_vel = speed * (m.face_angle.yaw - m.slide_yaw).cos();
        true
    }

    fn air_drag(&mut self) -> f32 {
        let threshold = if self.avatar.action == ActionId::LONG_JUMP {
            48.0
        } else {
            32.0
        };
        self.avatar.forward_vel = approach_f32(self.avatar.forward_vel, 0.0, 0.35, 0.35);
        threshold
    }

    fn clamp_air_speed(&mut self, threshold: f32) {
        let m = &mut *self.avatar;
        // Forward air speed is not hard-capped; the drag is net positive.
        if m.forward_vel > threshold {
            m.forward_vel -= 1.0;
        }
        if m.forward_vel < -16.0 {
            m.forward_vel += 2.0;
        }
    }

    /// Air control that turns the avatar toward the stick.
    fn update_air_with_turn(&mut self) {
        if self.check_horizontal_wind() {
            return;
        }

        let threshold = self.air_drag();
        let m = &mut *self.avatar;
        if m.input.has(InputFlags::NONZERO_ANALOG) {
            let dyaw = m.intended_yaw - m.face_angle.yaw;
            let mag = m.intended_mag / 32.0;
            m.forward_vel += 1.5 * dyaw.cos() * mag;
            m.face_angle.yaw = m.face_angle.yaw.add_f32(512.0 * dyaw.sin() * mag);
        }

        self.clamp_air_speed(threshold);
        let m = &mut *self.avatar;
        m.slide_vel_x = m.forward_vel * m.face_angle.yaw.sin();
        m.slide_vel_z = m.forward_vel * m.face_angle.yaw.cos();
        m.vel.x = m.slide_vel_x;
        m.vel.z = m.slide_vel_z;
    }

    /// Air control that strafes without turning.
    ///
    /// Returns `true` when a late shell jump was taken instead.
    fn update_air_without_turn(&mut self) -> bool {
        let m = &*self.avatar;
        if m.action == ActionId::RIDING_SHELL_FALL
            && m.input.has(InputFlags::A_PRESSED)
            && m.shell_coyote_timer < self.config.koopa_shell_coyote_time
        {
            return self.set_action(ActionId::RIDING_SHELL_JUMP, 0);
        }

        if self.check_horizontal_wind() {
            return false;
        }

        let threshold = self.air_drag();
        let mut sideways = 0.0;
        let m = &mut *self.avatar;
        if m.input.has(InputFlags::NONZERO_ANALOG) {
            let dyaw = m.intended_yaw - m.face_angle.yaw;
            let mag = m.intended_mag / 32.0;
            m.forward_vel += mag * dyaw.cos() * 1.5;
            sideways = mag * dyaw.sin() * 10.0;
        }

        self.clamp_air_speed(threshold);
        let m = &mut *self.avatar;
        let yaw = m.face_angle.yaw;
        let side = yaw + Angle::QUARTER;
        m.slide_vel_x = m.forward_vel * yaw.sin() + sideways * side.sin();
        m.slide_vel_z = m.forward_vel * yaw.cos() + sideways * side.cos();
        m.vel.x = m.slide_vel_x;
        m.vel.z = m.slide_vel_z;
        false
    }

    /// Steering for lava boosts and twirls: turn freely, never go backwards.
    fn update_lava_boost_or_twirling(&mut self) {
        let m = &mut *self.avatar;
        if m.input.has(InputFlags::NONZERO_ANALOG) {
            let dyaw = m.intended_yaw - m.face_angle.yaw;
            let mag = m.intended_mag / 32.0;

            m.forward_vel += dyaw.cos() * mag;
            m.face_angle.yaw = m.face_angle.yaw.add_f32(dyaw.sin() * mag * 1024.0);

            if m.forward_vel < 0.0 {
                m.face_angle.yaw += Angle::HALF;
                m.forward_vel = -m.forward_vel;
            }
            if m.forward_vel > 32.0 {
                m.forward_vel -= 2.0;
            }
        }

        m.slide_vel_x = m.forward_vel * m.face_angle.yaw.sin();
        m.slide_vel_z = m.forward_vel * m.face_angle.yaw.cos();
        m.vel.x = m.slide_vel_x;
        m.vel.z = m.slide_vel_z;
    }

    fn update_flying_yaw(&mut self) {
        let m = &mut *self.avatar;
        let target = stick_rate(m.stick_x, m.forward_vel / 4.0);
        let mut rate = m.angle_vel.yaw.as_i32();

        if target > 0 {
            if rate < 0 {
                rate = (rate + 0x40).min(0x10);
            } else {
                rate = approach_s32(rate, target, 0x10, 0x20);
            }
        } else if target < 0 {
            if rate > 0 {
                rate = (rate - 0x40).max(-0x10);
            } else {
                rate = approach_s32(rate, target, 0x20, 0x10);
            }
        } else {
            rate = approach_s32(rate, 0, 0x40, 0x40);
        }

        m.angle_vel.yaw = Angle::from_i32(rate);
        m.face_angle.yaw += m.angle_vel.yaw;
        m.face_angle.roll = Angle::from_i32(20 * -rate);
    }

    fn update_flying_pitch(&mut self) {
        let m = &mut *self.avatar;
        let target = stick_rate(m.stick_y, m.forward_vel / 5.0);
        let mut rate = m.angle_vel.pitch.as_i32();

        if target > 0 {
            if rate < 0 {
                rate = (rate + 0x40).min(0x20);
            } else {
                rate = approach_s32(rate, target, 0x20, 0x40);
            }
        } else if target < 0 {
            if rate > 0 {
                rate = (rate - 0x40).max(-0x20);
            } else {
                rate = approach_s32(rate, target, 0x40, 0x20);
            }
        } else {
            rate = approach_s32(rate, 0, 0x40, 0x40);
        }

        m.angle_vel.pitch = Angle::from_i32(rate);
    }

    /// Wing cap flight: pitch trades speed for height.
    fn update_flying(&mut self) {
        self.update_flying_pitch();
        self.update_flying_yaw();

        let m = &mut *self.avatar;
        m.forward_vel -= 2.0 * (f32::from(m.face_angle.pitch.0) / 16384.0) + 0.1;
        m.forward_vel -= 0.5 * (1.0 - m.angle_vel.yaw.cos());
        if m.forward_vel < 0.0 {
            m.forward_vel = 0.0;
        }

        if m.forward_vel > 16.0 {
            m.face_angle.pitch = m.face_angle.pitch.add_f32((m.forward_vel - 32.0) * 6.0);
        } else if m.forward_vel > 4.0 {
            m.face_angle.pitch = m.face_angle.pitch.add_f32((m.forward_vel - 32.0) * 10.0);
        } else {
            m.face_angle.pitch -= 0x400;
        }

        m.face_angle.pitch += m.angle_vel.pitch;
        m.face_angle.pitch = Angle(m.face_angle.pitch.0.clamp(-MAX_PITCH, MAX_PITCH));

        let (pitch, yaw) = (m.face_angle.pitch, m.face_angle.yaw);
        m.vel.x = m.forward_vel * pitch.cos() * yaw.sin();
        m.vel.y = m.forward_vel * pitch.sin();
        m.vel.z = m.forward_vel * pitch.cos() * yaw.cos();
        m.slide_vel_x = m.vel.x;
        m.slide_vel_z = m.vel.z;
    }

    // ========================================================================
    // Shared steps
    // ========================================================================

    /// Steer, step, and handle the usual outcomes of a jump or fall.
    fn common_air_action_step(&mut self, land: ActionId, anim: AnimId, flags: AirStepFlags) -> AirStep {
        self.update_air_without_turn();

        let step = self.perform_air_step(flags);
        match step {
            AirStep::None => {
                self.set_anim(anim);
            }
            AirStep::Landed => {
                if !self.check_fall_damage_or_get_stuck(ActionId::HARD_BACKWARD_GROUND_KB) {
                    self.set_action(land, 0);
                }
            }
            AirStep::HitWall => {
                self.set_anim(anim);

                if self.avatar.forward_vel > 16.0 {
                    self.bonk_reflection(false);
                    self.avatar.face_angle.yaw += Angle::HALF;

                    if self.avatar.wall.is_some() {
                        self.set_action(ActionId::AIR_HIT_WALL, 0);
                    } else {
                        self.stop_rising();
                        if self.avatar.forward_vel >= 38.0 {
                            self.signals.particle(ParticleFlags::VERTICAL_STAR);
                            self.set_air_bonk_action(ActionId::BACKWARD_AIR_KB);
                        } else {
                            if self.avatar.forward_vel > 8.0 {
                                self.set_forward_vel(-8.0);
                            }
                            self.set_air_bonk_action(ActionId::SOFT_BONK);
                        }
                    }
                } else {
                    self.set_forward_vel(0.0);
                }
            }
            AirStep::GrabbedLedge => {
                self.set_anim(AnimId::IdleOnLedge);
                self.drop_and_set_action(ActionId::LEDGE_GRAB, 0);
            }
            AirStep::GrabbedCeiling => {
                self.set_action(ActionId::START_HANGING, 0);
            }
            AirStep::HitLavaWall => {
                self.lava_boost_on_wall();
            }
        }

        step
    }

    /// Fly backwards or forwards at a fixed speed until landing.
    fn common_air_knockback_step(
        &mut self,
        land: ActionId,
        hard_fall: ActionId,
        anim: AnimId,
        speed: f32,
    ) -> AirStep {
        self.set_forward_vel(speed);

        let step = self.perform_air_step(AirStepFlags::NONE);
        match step {
            AirStep::None => {
                self.set_anim(anim);
            }
            AirStep::Landed => {
                if !self.check_fall_damage_or_get_stuck(hard_fall) {
                    let action = self.avatar.action;
                    let arg = if action == ActionId::THROWN_FORWARD || action == ActionId::THROWN_BACKWARD {
                        u32::from(self.avatar.hurt_counter)
                    } else {
                        self.avatar.action_arg
                    };
                    self.set_action(land, arg);
                }
            }
            AirStep::HitWall => {
                self.set_anim(AnimId::BackwardAirKb);
                self.bonk_reflection(false);
                self.stop_rising();
                self.set_forward_vel(-speed);
            }
            AirStep::HitLavaWall => {
                self.lava_boost_on_wall();
            }
            AirStep::GrabbedLedge | AirStep::GrabbedCeiling => {}
        }

        step
    }

    fn rollout(&mut self, anim: AnimId) {
        if self.avatar.action_state == 0 {
            self.avatar.vel.y = 30.0;
            self.avatar.action_state = 1;
        }

        self.play_avatar_sound(Sound::TerrainJump, Voice::JumpCall);
        self.update_air_without_turn();

        match self.perform_air_step(AirStepFlags::NONE) {
            AirStep::None => {
                if self.avatar.action_state == 1 {
                    if self.set_anim(anim) == 4 {
                        self.signals.sound(Sound::Spin);
                    }
                } else {
                    self.set_anim(AnimId::GeneralFall);
                }
            }
            AirStep::Landed => {
                self.set_action(ActionId::FREEFALL_LAND_STOP, 0);
                self.play_landing_sound(Sound::TerrainLanding);
            }
            AirStep::HitWall => self.set_forward_vel(0.0),
            AirStep::HitLavaWall => {
                self.lava_boost_on_wall();
            }
            _ => {}
        }
    }

    fn butt_slide_air_step(&mut self, slide: ActionId, holding: bool) {
        self.update_air_with_turn();

        match self.perform_air_step(AirStepFlags::NONE) {
            AirStep::Landed => {
                if self.avatar.action_state == 0
                    && self.avatar.vel.y < 0.0
                    && self.floor_normal().y >= COS10
                {
                    self.avatar.vel.y = -self.avatar.vel.y / 2.0;
                    self.avatar.action_state = 1;
                } else {
                    self.set_action(slide, 0);
                }
                self.play_landing_sound(Sound::TerrainLanding);
            }
            AirStep::HitWall => {
                self.stop_rising();
                if holding {
                    self.drop_held_object();
                }
                self.signals.particle(ParticleFlags::VERTICAL_STAR);
                self.set_action(ActionId::BACKWARD_AIR_KB, 0);
            }
            AirStep::HitLavaWall => {
                self.lava_boost_on_wall();
            }
            _ => {}
        }
    }

    fn burning_air_step(&mut self) {
        let speed = self.avatar.forward_vel;
        self.set_forward_vel(speed);

        if self.perform_air_step(AirStepFlags::NONE) == AirStep::Landed {
            self.play_landing_sound(Sound::TerrainLanding);
            self.set_action(ActionId::BURNING_GROUND, 0);
        }
    }

    fn burn(&mut self) {
        self.signals.particle(ParticleFlags::FIRE);
        let m = &mut *self.avatar;
        m.burn_timer = m.burn_timer.saturating_add(3);
        m.health -= 10;
        if m.health < 0x100 {
            m.health = 0xFF;
        }
    }

    pub(crate) fn holding_dropped(&self) -> bool {
        self.avatar.interact_status.has(InteractStatus::DROP_OBJECT)
    }

    fn can_throw_in_air(&self) -> bool {
        self.has_input(InputFlags::B_PRESSED)
            && !self.avatar.held_obj.is_some_and(|obj| obj.holdable_npc)
    }
}

// ============================================================================
// Jumps
// ============================================================================

fn jump(ctx: &mut ActionContext<'_>) -> bool {
    if ctx.check_kick_or_dive_in_air() {
        return true;
    }
    if ctx.has_input(InputFlags::Z_PRESSED) {
        return ctx.set_action(ActionId::GROUND_POUND, 0);
    }

    ctx.play_avatar_sound(Sound::TerrainJump, Voice::JumpCall);
    ctx.common_air_action_step(
        ActionId::JUMP_LAND,
        AnimId::SingleJump,
        AirStepFlags::CHECK_LEDGE_GRAB | AirStepFlags::CHECK_HANG,
    );
    false
}

fn double_jump(ctx: &mut ActionContext<'_>) -> bool {
    let anim = if ctx.avatar.vel.y >= 0.0 {
        AnimId::DoubleJumpRise
    } else {
        AnimId::DoubleJumpFall
    };

    if ctx.check_kick_or_dive_in_air() {
        return true;
    }
    if ctx.has_input(InputFlags::Z_PRESSED) {
        return ctx.set_action(ActionId::GROUND_POUND, 0);
    }

    ctx.play_avatar_sound(Sound::TerrainJump, Voice::Clip(Sound::Hoohoo));
    ctx.common_air_action_step(
        ActionId::DOUBLE_JUMP_LAND,
        anim,
        AirStepFlags::CHECK_LEDGE_GRAB | AirStepFlags::CHECK_HANG,
    );
    false
}

fn triple_jump(ctx: &mut ActionContext<'_>) -> bool {
    if ctx.avatar.special_triple_jump {
        return ctx.set_action(ActionId::SPECIAL_TRIPLE_JUMP, 0);
    }
    if ctx.has_input(InputFlags::B_PRESSED) {
        return ctx.set_action(ActionId::DIVE, 0);
    }
    if ctx.has_input(InputFlags::Z_PRESSED) {
        return ctx.set_action(ActionId::GROUND_POUND, 0);
    }

    ctx.play_avatar_sound(Sound::TerrainJump, Voice::JumpCall);
    ctx.common_air_action_step(ActionId::TRIPLE_JUMP_LAND, AnimId::TripleJump, AirStepFlags::NONE);
    ctx.play_flip_sounds([2, 8, 20]);
    false
}

fn backflip(ctx: &mut ActionContext<'_>) -> bool {
    if ctx.has_input(InputFlags::Z_PRESSED) {
        return ctx.set_action(ActionId::GROUND_POUND, 0);
    }

    ctx.play_avatar_sound(Sound::TerrainJump, Voice::Clip(Sound::YahWahHoo));
    ctx.common_air_action_step(ActionId::BACKFLIP_LAND, AnimId::Backflip, AirStepFlags::NONE);
    ctx.play_flip_sounds([2, 3, 17]);
    false
}

fn freefall(ctx: &mut ActionContext<'_>) -> bool {
    if ctx.has_input(InputFlags::B_PRESSED) {
        return ctx.set_action(ActionId::DIVE, 0);
    }
    if ctx.has_input(InputFlags::Z_PRESSED) {
        return ctx.set_action(ActionId::GROUND_POUND, 0);
    }

    let anim = match ctx.avatar.action_arg {
        1 => AnimId::FallFromSlide,
        2 => AnimId::FallFromSlideKick,
        _ => AnimId::GeneralFall,
    };
    ctx.common_air_action_step(ActionId::FREEFALL_LAND, anim, AirStepFlags::CHECK_LEDGE_GRAB);
    false
}

fn hold_jump(ctx: &mut ActionContext<'_>) -> bool {
    if ctx.holding_dropped() {
        return ctx.drop_and_set_action(ActionId::FREEFALL, 0);
    }
    if ctx.can_throw_in_air() {
        return ctx.set_action(ActionId::AIR_THROW, 0);
    }
    if ctx.has_input(InputFlags::Z_PRESSED) {
        return ctx.drop_and_set_action(ActionId::GROUND_POUND, 0);
    }

    ctx.play_avatar_sound(Sound::TerrainJump, Voice::JumpCall);
    ctx.common_air_action_step(
        ActionId::HOLD_JUMP_LAND,
        AnimId::JumpWithLightObj,
        AirStepFlags::CHECK_LEDGE_GRAB,
    );
    false
}

fn hold_freefall(ctx: &mut ActionContext<'_>) -> bool {
    let anim = if ctx.avatar.action_arg == 0 {
        AnimId::FallWithLightObj
    } else {
        AnimId::FallFromSlidingWithLightObj
    };

    if ctx.holding_dropped() {
        return ctx.drop_and_set_action(ActionId::FREEFALL, 0);
    }
    if ctx.can_throw_in_air() {
        return ctx.set_action(ActionId::AIR_THROW, 0);
    }
    if ctx.has_input(InputFlags::Z_PRESSED) {
        return ctx.drop_and_set_action(ActionId::GROUND_POUND, 0);
    }

    ctx.common_air_action_step(ActionId::HOLD_FREEFALL_LAND, anim, AirStepFlags::CHECK_LEDGE_GRAB);
    false
}

fn side_flip(ctx: &mut ActionContext<'_>) -> bool {
    if ctx.has_input(InputFlags::B_PRESSED) {
        ctx.avatar.render.angle.yaw += Angle::HALF;
        return ctx.set_action(ActionId::DIVE, 0);
    }
    if ctx.has_input(InputFlags::Z_PRESSED) {
        ctx.avatar.render.angle.yaw += Angle::HALF;
        return ctx.set_action(ActionId::GROUND_POUND, 0);
    }

    ctx.play_avatar_sound(Sound::TerrainJump, Voice::JumpCall);

    let step = ctx.common_air_action_step(
        ActionId::SIDE_FLIP_LAND,
        AnimId::Slideflip,
        AirStepFlags::CHECK_LEDGE_GRAB,
    );
    // The flip animation plays facing backwards.
    if step != AirStep::GrabbedLedge {
        ctx.avatar.render.angle.yaw += Angle::HALF;
    }

    if ctx.anim_frame() == 6 {
        ctx.signals.sound(Sound::SideFlip);
    }
    false
}

fn wall_kick_air(ctx: &mut ActionContext<'_>) -> bool {
    if ctx.has_input(InputFlags::B_PRESSED) {
        return ctx.set_action(ActionId::DIVE, 0);
    }
    if ctx.has_input(InputFlags::Z_PRESSED) {
        return ctx.set_action(ActionId::GROUND_POUND, 0);
    }

    ctx.play_jump_voice();
    ctx.common_air_action_step(ActionId::JUMP_LAND, AnimId::Slidejump, AirStepFlags::CHECK_LEDGE_GRAB);
    false
}

fn long_jump(ctx: &mut ActionContext<'_>) -> bool {
    let anim = if ctx.avatar.long_jump_is_slow {
        AnimId::SlowLongjump
    } else {
        AnimId::FastLongjump
    };

    ctx.play_avatar_sound(Sound::TerrainJump, Voice::Clip(Sound::Yahoo));

    let wind_resisted =
        ctx.config.wind_resistant_metal_cap && ctx.avatar.flags.has(AvatarFlags::METAL_CAP);
    if !wind_resisted
        && ctx.floor_type() == SurfaceType::VERTICAL_WIND
        && ctx.avatar.action_state == 0
    {
        ctx.signals.sound(Sound::HereWeGo);
        ctx.avatar.action_state = 1;
    }

    ctx.common_air_action_step(ActionId::LONG_JUMP_LAND, anim, AirStepFlags::CHECK_LEDGE_GRAB);
    false
}

fn steep_jump(ctx: &mut ActionContext<'_>) -> bool {
    if ctx.has_input(InputFlags::B_PRESSED) {
        return ctx.set_action(ActionId::DIVE, 0);
    }

    ctx.play_avatar_sound(Sound::TerrainJump, Voice::JumpCall);
    let speed = 0.98 * ctx.avatar.forward_vel;
    ctx.set_forward_vel(speed);

    match ctx.perform_air_step(AirStepFlags::NONE) {
        AirStep::Landed => {
            if !ctx.check_fall_damage_or_get_stuck(ActionId::HARD_BACKWARD_GROUND_KB) {
                ctx.avatar.face_angle.pitch = Angle::ZERO;
                let action = if ctx.avatar.forward_vel < 0.0 {
                    ActionId::BEGIN_SLIDING
                } else {
                    ActionId::JUMP_LAND
                };
                ctx.set_action(action, 0);
            }
        }
        AirStep::HitWall => ctx.set_forward_vel(0.0),
        AirStep::HitLavaWall => {
            ctx.lava_boost_on_wall();
        }
        _ => {}
    }

    ctx.set_anim(AnimId::SingleJump);
    ctx.avatar.render.angle.yaw = ctx.avatar.steep_jump_yaw;
    false
}

fn special_triple_jump(ctx: &mut ActionContext<'_>) -> bool {
    if ctx.has_input(InputFlags::B_PRESSED) {
        return ctx.set_action(ActionId::DIVE, 0);
    }
    if ctx.has_input(InputFlags::Z_PRESSED) {
        return ctx.set_action(ActionId::GROUND_POUND, 0);
    }

    ctx.play_avatar_sound(Sound::TerrainJump, Voice::Clip(Sound::Yahoo));
    ctx.update_air_without_turn();

    match ctx.perform_air_step(AirStepFlags::NONE) {
        AirStep::Landed => {
            let state = ctx.avatar.action_state;
            ctx.avatar.action_state += 1;
            if state == 0 {
                ctx.avatar.vel.y = 42.0;
            } else {
                ctx.set_action(ActionId::FREEFALL_LAND_STOP, 0);
            }
            ctx.play_landing_sound(Sound::TerrainLanding);
        }
        AirStep::HitWall => ctx.bonk_reflection(true),
        _ => {}
    }

    if ctx.avatar.action_state == 0 || ctx.avatar.vel.y > 0.0 {
        if ctx.set_anim(AnimId::ForwardSpinning) == 0 {
            ctx.signals.sound(Sound::Spin);
        }
    } else {
        ctx.set_anim(AnimId::GeneralFall);
    }

    ctx.signals.particle(ParticleFlags::SPARKLES);
    false
}

fn flying_triple_jump(ctx: &mut ActionContext<'_>) -> bool {
    if ctx.has_input(InputFlags::B_PRESSED | InputFlags::Z_PRESSED) {
        ctx.set_flying_camera(false);
        let action = if ctx.has_input(InputFlags::B_PRESSED) {
            ActionId::DIVE
        } else {
            ActionId::GROUND_POUND
        };
        return ctx.set_action(action, 0);
    }

    ctx.play_avatar_sound(Sound::TerrainJump, Voice::Clip(Sound::Yahoo));
    if ctx.avatar.action_state == 0 {
        ctx.set_anim(AnimId::TripleJumpFly);
        if ctx.anim_frame() == 7 {
            ctx.signals.sound(Sound::Spin);
        }
        if ctx.anim_past_end() {
            ctx.set_anim(AnimId::ForwardSpinning);
            ctx.avatar.action_state = 1;
        }
    }

    if ctx.avatar.action_state == 1 && ctx.anim_frame() == 1 {
        ctx.signals.sound(Sound::Spin);
    }

    if ctx.avatar.vel.y < 4.0 {
        ctx.set_flying_camera(true);
        if ctx.avatar.forward_vel < 32.0 {
            ctx.set_forward_vel(32.0);
        }
        ctx.set_action(ActionId::FLYING, 1);
    }

    let timer = ctx.avatar.action_timer;
    ctx.avatar.action_timer = timer.wrapping_add(1);
    if timer == 10 {
        ctx.set_flying_camera(true);
    }

    ctx.update_air_without_turn();

    match ctx.perform_air_step(AirStepFlags::NONE) {
        AirStep::Landed => {
            if !ctx.check_fall_damage_or_get_stuck(ActionId::HARD_BACKWARD_GROUND_KB) {
                ctx.set_action(ActionId::DOUBLE_JUMP_LAND, 0);
            }
        }
        AirStep::HitWall => ctx.bonk_reflection(false),
        AirStep::HitLavaWall => {
            ctx.lava_boost_on_wall();
        }
        _ => {}
    }
    false
}

fn top_of_pole_jump(ctx: &mut ActionContext<'_>) -> bool {
    ctx.play_jump_voice();
    ctx.common_air_action_step(
        ActionId::FREEFALL_LAND,
        AnimId::HandstandJump,
        AirStepFlags::CHECK_LEDGE_GRAB,
    );
    false
}

// ============================================================================
// Water exits
// ============================================================================

fn water_jump(ctx: &mut ActionContext<'_>) -> bool {
    if ctx.avatar.forward_vel < 15.0 {
        ctx.set_forward_vel(15.0);
    }

    ctx.play_avatar_sound(Sound::WaterJump, Voice::JumpCall);
    ctx.set_anim(AnimId::SingleJump);

    match ctx.perform_air_step(AirStepFlags::CHECK_LEDGE_GRAB) {
        AirStep::Landed => {
            ctx.set_action(ActionId::JUMP_LAND, 0);
            ctx.reset_camera();
        }
        AirStep::HitWall => ctx.set_forward_vel(15.0),
        AirStep::GrabbedLedge => {
            ctx.set_anim(AnimId::IdleOnLedge);
            ctx.set_action(ActionId::LEDGE_GRAB, 0);
            ctx.reset_camera();
        }
        AirStep::HitLavaWall => {
            ctx.lava_boost_on_wall();
        }
        _ => {}
    }
    false
}

fn hold_water_jump(ctx: &mut ActionContext<'_>) -> bool {
    if ctx.holding_dropped() {
        return ctx.drop_and_set_action(ActionId::FREEFALL, 0);
    }

    if ctx.avatar.forward_vel < 15.0 {
        ctx.set_forward_vel(15.0);
    }

    ctx.play_avatar_sound(Sound::WaterJump, Voice::JumpCall);
    ctx.set_anim(AnimId::JumpWithLightObj);

    match ctx.perform_air_step(AirStepFlags::NONE) {
        AirStep::Landed => {
            ctx.set_action(ActionId::HOLD_JUMP_LAND, 0);
            ctx.reset_camera();
        }
        AirStep::HitWall => ctx.set_forward_vel(15.0),
        AirStep::HitLavaWall => {
            ctx.lava_boost_on_wall();
        }
        _ => {}
    }
    false
}

// ============================================================================
// Spins, dives and attacks
// ============================================================================

fn twirling(ctx: &mut ActionContext<'_>) -> bool {
    let start_yaw = ctx.avatar.twirl_yaw;

    let target = if ctx.config.z_twirl && ctx.has_input(InputFlags::Z_DOWN) {
        0x2800
    } else if ctx.has_input(InputFlags::A_DOWN) {
        0x2000
    } else {
        0x1800
    };

    let m = &mut *ctx.avatar;
    m.angle_vel.yaw = Angle::from_i32(approach_s32_symmetric(m.angle_vel.yaw.as_i32(), target, 0x200));
    m.twirl_yaw += m.angle_vel.yaw;

    let anim = if ctx.avatar.action_arg == 0 {
        AnimId::StartTwirl
    } else {
        AnimId::Twirl
    };
    ctx.set_anim(anim);
    if ctx.anim_past_end() {
        ctx.avatar.action_arg = 1;
    }

    // One sound per full revolution.
    if start_yaw.0 > ctx.avatar.twirl_yaw.0 {
        ctx.signals.sound(Sound::Twirl);
    }

    ctx.update_lava_boost_or_twirling();

    match ctx.perform_air_step(AirStepFlags::NONE) {
        AirStep::Landed => {
            ctx.set_action(ActionId::TWIRL_LAND, 0);
        }
        AirStep::HitWall => ctx.bonk_reflection(false),
        AirStep::HitLavaWall => {
            ctx.lava_boost_on_wall();
        }
        _ => {}
    }

    ctx.avatar.render.angle.yaw += ctx.avatar.twirl_yaw;
    false
}

fn dive(ctx: &mut ActionContext<'_>) -> bool {
    if ctx.avatar.action_arg == 0 {
        ctx.play_avatar_sound(Sound::Throw, Voice::Clip(Sound::Hoohoo));
    } else {
        ctx.play_avatar_sound(Sound::TerrainJump, Voice::JumpCall);
    }

    ctx.set_anim(AnimId::Dive);
    if ctx.avatar.held_obj.is_none()
        && ctx.avatar.interact_status.has(InteractStatus::GRAB_IN_REACH)
    {
        ctx.signals.push(Signal::GrabObject);
    }

    ctx.update_air_without_turn();

    match ctx.perform_air_step(AirStepFlags::NONE) {
        AirStep::None => {
            let m = &mut *ctx.avatar;
            if m.vel.y < 0.0 && m.face_angle.pitch.0 > -MAX_PITCH {
                m.face_angle.pitch -= 0x200;
                if m.face_angle.pitch.0 < -MAX_PITCH {
                    m.face_angle.pitch = Angle(-MAX_PITCH);
                }
            }
            m.render.angle.pitch = -m.face_angle.pitch;
        }
        AirStep::Landed => {
            if ctx.should_get_stuck_in_ground() && ctx.avatar.face_angle.pitch.0 == -MAX_PITCH {
                ctx.signals.sound(Sound::Ooof);
                ctx.signals.particle(ParticleFlags::MIST_CIRCLE);
                ctx.drop_and_set_action(ActionId::HEAD_STUCK_IN_GROUND, 0);
            } else if !ctx.check_fall_damage(ActionId::HARD_FORWARD_GROUND_KB) {
                let action = if ctx.avatar.held_obj.is_none() {
                    ActionId::DIVE_SLIDE
                } else {
                    ActionId::DIVE_PICKING_UP
                };
                ctx.set_action(action, 0);
            }
            ctx.avatar.face_angle.pitch = Angle::ZERO;
        }
        AirStep::HitWall => {
            ctx.bonk_reflection(true);
            ctx.avatar.face_angle.pitch = Angle::ZERO;
            ctx.stop_rising();
            ctx.signals.particle(ParticleFlags::VERTICAL_STAR);
            ctx.drop_and_set_action(ActionId::BACKWARD_AIR_KB, 0);
        }
        AirStep::HitLavaWall => {
            ctx.lava_boost_on_wall();
        }
        _ => {}
    }
    false
}

fn air_throw(ctx: &mut ActionContext<'_>) -> bool {
    ctx.avatar.action_timer += 1;
    if ctx.avatar.action_timer == 4 && ctx.avatar.held_obj.take().is_some() {
        ctx.signals.push(Signal::ThrowHeldObject);
    }

    ctx.play_sound_if_no_flag(Sound::Wah, AvatarFlags::VOICE_PLAYED);
    ctx.set_anim(AnimId::ThrowLightObject);
    ctx.update_air_without_turn();

    match ctx.perform_air_step(AirStepFlags::NONE) {
        AirStep::Landed => {
            if !ctx.check_fall_damage_or_get_stuck(ActionId::HARD_BACKWARD_GROUND_KB) {
                // The throw animation carries on into the landing untouched.
                let m = &mut *ctx.avatar;
                if !m.transitioned {
                    m.prev_action = m.action;
                    m.action = ActionId::AIR_THROW_LAND;
                    m.transitioned = true;
                }
            }
        }
        AirStep::HitWall => ctx.set_forward_vel(0.0),
        AirStep::HitLavaWall => {
            ctx.lava_boost_on_wall();
        }
        _ => {}
    }
    false
}

fn ground_pound(ctx: &mut ActionContext<'_>) -> bool {
    ctx.play_sound_if_no_flag(Sound::Throw, AvatarFlags::ACTION_SOUND_PLAYED);

    if ctx.avatar.action_state == 0 {
        let m = &mut *ctx.avatar;
        if m.action_timer < 10 {
            let rise = 20.0 - 2.0 * f32::from(m.action_timer);
            if m.pos.y + rise + 160.0 < m.ceil_height {
                m.pos.y += rise;
                m.peak_height = m.pos.y;
                m.render.pos = m.pos;
            }
        }

        m.vel.y = -50.0;
        ctx.set_forward_vel(0.0);

        let anim = if ctx.avatar.action_arg == 0 {
            AnimId::StartGroundPound
        } else {
            AnimId::TripleJumpGroundPound
        };
        ctx.set_anim(anim);
        if ctx.avatar.action_timer == 0 {
            ctx.signals.sound(Sound::Spin);
        }

        ctx.avatar.action_timer += 1;
        let wind_up = i32::from(ctx.avatar.anim.clip().loop_end) + 4;
        if i32::from(ctx.avatar.action_timer) >= wind_up {
            ctx.signals.sound(Sound::GroundPoundWah);
            ctx.avatar.action_state = 1;
        }
        return false;
    }

    ctx.set_anim(AnimId::GroundPound);

    match ctx.perform_air_step(AirStepFlags::NONE) {
        AirStep::Landed => {
            if ctx.should_get_stuck_in_ground() {
                ctx.signals.sound(Sound::Ooof);
                ctx.signals.particle(ParticleFlags::MIST_CIRCLE);
                ctx.set_action(ActionId::BUTT_STUCK_IN_GROUND, 0);
            } else {
                ctx.play_heavy_landing_sound(Sound::TerrainHeavyLanding);
                if !ctx.check_fall_damage(ActionId::HARD_BACKWARD_GROUND_KB) {
                    ctx.signals.particle(ParticleFlags::MIST_CIRCLE | ParticleFlags::HORIZONTAL_STAR);
                    ctx.set_action(ActionId::GROUND_POUND_LAND, 0);
                }
            }
            ctx.signals.push(Signal::CameraShake(CameraShake::GroundPound));
        }
        AirStep::HitWall if ctx.config.ground_pound_wall_bonk => {
            ctx.set_forward_vel(-16.0);
            ctx.stop_rising();
            ctx.signals.particle(ParticleFlags::VERTICAL_STAR);
            ctx.set_action(ActionId::BACKWARD_AIR_KB, 0);
        }
        _ => {}
    }
    false
}

fn slide_kick(ctx: &mut ActionContext<'_>) -> bool {
    if ctx.avatar.action_state == 0 && ctx.avatar.action_timer == 0 {
        ctx.play_avatar_sound(Sound::TerrainJump, Voice::Clip(Sound::Hoohoo));
        ctx.set_anim(AnimId::SlideKick);
    }

    ctx.avatar.action_timer += 1;
    if ctx.avatar.action_timer > 30 && ctx.avatar.pos.y - ctx.avatar.floor_height > 500.0 {
        return ctx.set_action(ActionId::FREEFALL, 2);
    }

    ctx.update_air_without_turn();

    match ctx.perform_air_step(AirStepFlags::NONE) {
        AirStep::None => {
            if ctx.avatar.action_state == 0 {
                let m = &mut *ctx.avatar;
                let pitch = atan2s(m.forward_vel, -m.vel.y);
                m.render.angle.pitch = Angle(pitch.0.min(0x1800));
            }
        }
        AirStep::Landed => {
            if ctx.avatar.action_state == 0 && ctx.avatar.vel.y < 0.0 {
                ctx.avatar.vel.y = -ctx.avatar.vel.y / 2.0;
                ctx.avatar.action_state = 1;
                ctx.avatar.action_timer = 0;
            } else {
                ctx.set_action(ActionId::SLIDE_KICK_SLIDE, 0);
            }
            ctx.play_landing_sound(Sound::TerrainLanding);
        }
        AirStep::HitWall => {
            ctx.stop_rising();
            ctx.signals.particle(ParticleFlags::VERTICAL_STAR);
            ctx.set_action(ActionId::BACKWARD_AIR_KB, 0);
        }
        AirStep::HitLavaWall => {
            ctx.lava_boost_on_wall();
        }
        _ => {}
    }
    false
}

fn jump_kick(ctx: &mut ActionContext<'_>) -> bool {
    if ctx.avatar.action_state == 0 {
        ctx.play_sound_if_no_flag(Sound::PunchHoo, AvatarFlags::ACTION_SOUND_PLAYED);
        ctx.avatar.anim.invalidate();
        ctx.set_anim(AnimId::AirKick);
        ctx.avatar.action_state = 1;
    }

    let frame = ctx.anim_frame();
    if frame == 0 {
        // Kick, active for six frames
        ctx.avatar.body.punch_state = (2 << 6) | 0x6;
    }
    if (0..8).contains(&frame) {
        ctx.avatar.flags.set(AvatarFlags::KICKING, true);
    }

    ctx.update_air_without_turn();

    match ctx.perform_air_step(AirStepFlags::NONE) {
        AirStep::Landed => {
            if !ctx.check_fall_damage_or_get_stuck(ActionId::HARD_BACKWARD_GROUND_KB) {
                ctx.set_action(ActionId::FREEFALL_LAND, 0);
            }
        }
        AirStep::HitWall => ctx.set_forward_vel(0.0),
        _ => {}
    }
    false
}

// ============================================================================
// Knockbacks and bonks
// ============================================================================

fn backward_air_kb(ctx: &mut ActionContext<'_>) -> bool {
    if ctx.check_wall_kick() {
        return true;
    }

    ctx.play_knockback_sound();
    ctx.common_air_knockback_step(
        ActionId::BACKWARD_GROUND_KB,
        ActionId::HARD_BACKWARD_GROUND_KB,
        AnimId::BackwardAirKb,
        -16.0,
    );
    false
}

fn forward_air_kb(ctx: &mut ActionContext<'_>) -> bool {
    if ctx.check_wall_kick() {
        return true;
    }

    ctx.play_knockback_sound();
    ctx.common_air_knockback_step(
        ActionId::FORWARD_GROUND_KB,
        ActionId::HARD_FORWARD_GROUND_KB,
        AnimId::AirForwardKb,
        16.0,
    );
    false
}

fn hard_backward_air_kb(ctx: &mut ActionContext<'_>) -> bool {
    ctx.play_knockback_sound();
    ctx.common_air_knockback_step(
        ActionId::HARD_BACKWARD_GROUND_KB,
        ActionId::HARD_BACKWARD_GROUND_KB,
        AnimId::BackwardAirKb,
        -16.0,
    );
    false
}

fn hard_forward_air_kb(ctx: &mut ActionContext<'_>) -> bool {
    ctx.play_knockback_sound();
    ctx.common_air_knockback_step(
        ActionId::HARD_FORWARD_GROUND_KB,
        ActionId::HARD_FORWARD_GROUND_KB,
        AnimId::AirForwardKb,
        16.0,
    );
    false
}

fn thrown_backward(ctx: &mut ActionContext<'_>) -> bool {
    let land = if ctx.avatar.action_arg != 0 {
        ActionId::HARD_BACKWARD_GROUND_KB
    } else {
        ActionId::BACKWARD_GROUND_KB
    };

    ctx.play_sound_if_no_flag(Sound::Waaaooow, AvatarFlags::VOICE_PLAYED);

    let speed = ctx.avatar.forward_vel;
    ctx.common_air_knockback_step(land, ActionId::HARD_BACKWARD_GROUND_KB, AnimId::BackwardAirKb, speed);

    ctx.avatar.forward_vel *= 0.98;
    false
}

fn thrown_forward(ctx: &mut ActionContext<'_>) -> bool {
    let land = if ctx.avatar.action_arg != 0 {
        ActionId::HARD_FORWARD_GROUND_KB
    } else {
        ActionId::FORWARD_GROUND_KB
    };

    ctx.play_sound_if_no_flag(Sound::Waaaooow, AvatarFlags::VOICE_PLAYED);

    let speed = ctx.avatar.forward_vel;
    let step = ctx.common_air_knockback_step(land, ActionId::HARD_FORWARD_GROUND_KB, AnimId::AirForwardKb, speed);
    if step == AirStep::None {
        let m = &mut *ctx.avatar;
        let pitch = atan2s(m.forward_vel, -m.vel.y).0.min(0x1800);
        m.render.angle.pitch = Angle(pitch) + 0x1800;
    }

    ctx.avatar.forward_vel *= 0.98;
    false
}

fn soft_bonk(ctx: &mut ActionContext<'_>) -> bool {
    if ctx.check_wall_kick() {
        return true;
    }

    ctx.play_knockback_sound();
    let speed = ctx.avatar.forward_vel;
    ctx.common_air_knockback_step(
        ActionId::FREEFALL_LAND,
        ActionId::HARD_BACKWARD_GROUND_KB,
        AnimId::GeneralFall,
        speed,
    );
    false
}

/// Brief window after bonking into a wall in which A wall-kicks.
fn air_hit_wall(ctx: &mut ActionContext<'_>) -> bool {
    ctx.drop_held_object();

    ctx.avatar.action_timer += 1;
    if ctx.avatar.action_timer <= 2 {
        if ctx.has_input(InputFlags::A_PRESSED) {
            ctx.avatar.vel.y = 52.0;
            ctx.avatar.face_angle.yaw += Angle::HALF;
            return ctx.set_action(ActionId::WALL_KICK_AIR, 0);
        }
    } else if ctx.avatar.forward_vel >= 38.0 {
        ctx.avatar.wall_kick_timer = 5;
        ctx.stop_rising();
        ctx.signals.particle(ParticleFlags::VERTICAL_STAR);
        return ctx.set_action(ActionId::BACKWARD_AIR_KB, 0);
    } else {
        ctx.avatar.wall_kick_timer = 5;
        ctx.stop_rising();
        if ctx.avatar.forward_vel > 8.0 {
            ctx.set_forward_vel(-8.0);
        }
        return ctx.set_action(ActionId::SOFT_BONK, 0);
    }

    ctx.set_anim(AnimId::StartWallkick);
    true
}

fn getting_blown(ctx: &mut ActionContext<'_>) -> bool {
    let m = &mut *ctx.avatar;
    if m.action_state == 0 {
        if m.forward_vel > -60.0 {
            m.forward_vel -= 6.0;
        } else {
            m.action_state = 1;
        }
    } else {
        if m.forward_vel < -16.0 {
            m.forward_vel += 0.8;
        }
        if m.vel.y < 0.0 && m.wind_gravity < 4.0 {
            m.wind_gravity += 0.05;
        }
    }

    m.action_timer += 1;
    if m.action_timer == 20 && ctx.config.cap_loss && m.flags.has(AvatarFlags::CAP_ON_HEAD) {
        m.flags.set(AvatarFlags::CAP_ON_HEAD | AvatarFlags::NORMAL_CAP, false);
        ctx.signals.push(Signal::CapBlownOff);
    }

    let speed = ctx.avatar.forward_vel;
    ctx.set_forward_vel(speed);
    ctx.set_anim(AnimId::BackwardAirKb);

    match ctx.perform_air_step(AirStepFlags::NONE) {
        AirStep::Landed => {
            ctx.set_action(ActionId::HARD_BACKWARD_AIR_KB, 0);
        }
        AirStep::HitWall => {
            ctx.set_anim(AnimId::AirForwardKb);
            ctx.bonk_reflection(false);
            ctx.stop_rising();
            let speed = -ctx.avatar.forward_vel;
            ctx.set_forward_vel(speed);
        }
        _ => {}
    }
    false
}

fn lava_boost(ctx: &mut ActionContext<'_>) -> bool {
    ctx.play_sound_if_no_flag(Sound::OnFire, AvatarFlags::VOICE_PLAYED);

    if !ctx.has_input(InputFlags::NONZERO_ANALOG) {
        ctx.avatar.forward_vel = approach_f32(ctx.avatar.forward_vel, 0.0, 0.35, 0.35);
    }

    ctx.update_lava_boost_or_twirling();

    match ctx.perform_air_step(AirStepFlags::NONE) {
        AirStep::Landed => {
            if ctx.floor_type() == SurfaceType::BURNING {
                // Back into the lava: boost again.
                ctx.avatar.action_state = 0;
                if !ctx.avatar.flags.has(AvatarFlags::METAL_CAP) {
                    ctx.add_hurt(12, 18);
                }
                ctx.avatar.vel.y = 84.0;
                ctx.signals.sound(Sound::OnFire);
            } else {
                ctx.play_heavy_landing_sound(Sound::TerrainBodyHitGround);
                if ctx.avatar.action_state < 2 && ctx.avatar.vel.y < 0.0 {
                    ctx.avatar.vel.y = -ctx.avatar.vel.y * 0.4;
                    let speed = ctx.avatar.forward_vel * 0.5;
                    ctx.set_forward_vel(speed);
                    ctx.avatar.action_state += 1;
                } else {
                    ctx.set_action(ActionId::LAVA_BOOST_LAND, 0);
                }
            }
        }
        AirStep::HitWall => ctx.bonk_reflection(false),
        AirStep::HitLavaWall => {
            ctx.lava_boost_on_wall();
        }
        _ => {}
    }

    ctx.set_anim(AnimId::FireLavaBurn);
    if ctx.area.terrain != Terrain::Snow
        && !ctx.avatar.flags.has(AvatarFlags::METAL_CAP)
        && ctx.avatar.vel.y > 0.0
    {
        ctx.signals.particle(ParticleFlags::FIRE);
        if ctx.avatar.action_state == 0 {
            ctx.signals.sound(Sound::LavaBurn);
        }
    }

    if ctx.avatar.is_dead() {
        ctx.signals.push(Signal::Death);
    }

    ctx.avatar.body.eye_state = EyeState::Dead;
    false
}

// ============================================================================
// Rollouts and slides
// ============================================================================

fn forward_rollout(ctx: &mut ActionContext<'_>) -> bool {
    ctx.rollout(AnimId::ForwardSpinning);
    if ctx.avatar.action_state == 1 && ctx.anim_past_end() {
        ctx.avatar.action_state = 2;
    }
    false
}

fn backward_rollout(ctx: &mut ActionContext<'_>) -> bool {
    ctx.rollout(AnimId::BackwardSpinning);
    if ctx.avatar.action_state == 1 && ctx.anim_frame() == 2 {
        ctx.avatar.action_state = 2;
    }
    false
}

fn butt_slide_air(ctx: &mut ActionContext<'_>) -> bool {
    ctx.avatar.action_timer += 1;
    if ctx.avatar.action_timer > 30 && ctx.avatar.pos.y - ctx.avatar.floor_height > 500.0 {
        return ctx.set_action(ActionId::FREEFALL, 1);
    }

    ctx.butt_slide_air_step(ActionId::BUTT_SLIDE, false);
    ctx.set_anim(AnimId::Slide);
    false
}

fn hold_butt_slide_air(ctx: &mut ActionContext<'_>) -> bool {
    if ctx.holding_dropped() {
        return ctx.drop_and_set_action(ActionId::HOLD_FREEFALL, 1);
    }

    ctx.avatar.action_timer += 1;
    if ctx.avatar.action_timer > 30 && ctx.avatar.pos.y - ctx.avatar.floor_height > 500.0 {
        return ctx.set_action(ActionId::HOLD_FREEFALL, 1);
    }

    ctx.butt_slide_air_step(ActionId::HOLD_BUTT_SLIDE, true);
    ctx.set_anim(AnimId::SlidingOnBottomWithLightObj);
    false
}

// ============================================================================
// Riding, burning and launchers
// ============================================================================

fn riding_shell_air(ctx: &mut ActionContext<'_>) -> bool {
    ctx.set_anim(AnimId::JumpRidingShell);

    if ctx.config.koopa_shell_coyote_time > 0 && ctx.avatar.action == ActionId::RIDING_SHELL_FALL {
        ctx.avatar.shell_coyote_timer = ctx.avatar.shell_coyote_timer.saturating_add(1);
    } else {
        ctx.play_avatar_sound(Sound::TerrainJump, Voice::JumpCall);
    }

    ctx.update_air_without_turn();

    match ctx.perform_air_step(AirStepFlags::NONE) {
        AirStep::Landed => {
            ctx.set_action(ActionId::RIDING_SHELL_GROUND, 1);
        }
        AirStep::HitWall => ctx.set_forward_vel(0.0),
        AirStep::HitLavaWall => {
            ctx.lava_boost_on_wall();
        }
        _ => {}
    }

    ctx.avatar.render.pos.y += 42.0;
    false
}

fn burning_jump(ctx: &mut ActionContext<'_>) -> bool {
    let voice = if ctx.avatar.action_arg == 0 {
        Voice::JumpCall
    } else {
        Voice::Silent
    };
    ctx.play_avatar_sound(Sound::TerrainJump, voice);

    ctx.burning_air_step();

    let anim = if ctx.avatar.action_arg == 0 {
        AnimId::SingleJump
    } else {
        AnimId::FireLavaBurn
    };
    ctx.set_anim(anim);
    ctx.signals.sound(Sound::LavaBurn);
    ctx.burn();
    false
}

fn burning_fall(ctx: &mut ActionContext<'_>) -> bool {
    ctx.burning_air_step();
    ctx.set_anim(AnimId::GeneralFall);
    ctx.burn();
    false
}

fn crazy_box_bounce(ctx: &mut ActionContext<'_>) -> bool {
    if ctx.avatar.action_timer == 0 {
        let (vel_y, min_speed) = match ctx.avatar.action_arg {
            0 => (45.0, 32.0),
            1 => (60.0, 36.0),
            _ => (100.0, 48.0),
        };
        ctx.avatar.vel.y = vel_y;
        ctx.signals.sound(if min_speed < 40.0 {
            Sound::CrazyBoxBoingSlow
        } else {
            Sound::CrazyBoxBoingFast
        });

        if ctx.avatar.forward_vel < min_speed {
            ctx.set_forward_vel(min_speed);
        }
        ctx.avatar.action_timer = 1;
    }

    ctx.play_avatar_sound(Sound::TerrainJump, Voice::JumpCall);
    ctx.set_anim(AnimId::Dive);
    ctx.update_air_without_turn();

    match ctx.perform_air_step(AirStepFlags::NONE) {
        AirStep::Landed => {
            let arg = ctx.avatar.action_arg;
            if arg < 2 {
                ctx.set_action(ActionId::CRAZY_BOX_BOUNCE, arg + 1);
            } else {
                if ctx.avatar.held_obj.take().is_some() {
                    ctx.signals.push(Signal::StopRiding);
                }
                ctx.set_action(ActionId::STOMACH_SLIDE, 0);
            }
            ctx.signals.particle(ParticleFlags::MIST_CIRCLE);
        }
        AirStep::HitWall => ctx.bonk_reflection(false),
        AirStep::HitLavaWall => {
            ctx.lava_boost_on_wall();
        }
        _ => {}
    }

    let m = &mut *ctx.avatar;
    m.render.angle.pitch = atan2s(m.forward_vel, -m.vel.y);
    false
}

fn shot_from_cannon(ctx: &mut ActionContext<'_>) -> bool {
    let speed = ctx.avatar.forward_vel;
    ctx.set_forward_vel(speed);
    ctx.play_sound_if_no_flag(Sound::Yahoo, AvatarFlags::VOICE_PLAYED);

    match ctx.perform_air_step(AirStepFlags::NONE) {
        AirStep::None => {
            ctx.set_anim(AnimId::AirborneOnStomach);
            let m = &mut *ctx.avatar;
            m.face_angle.pitch = atan2s(m.forward_vel, m.vel.y);
            m.render.angle.pitch = -m.face_angle.pitch;
        }
        AirStep::Landed => {
            ctx.set_action(ActionId::DIVE_SLIDE, 0);
            ctx.avatar.face_angle.pitch = Angle::ZERO;
            ctx.reset_camera();
        }
        AirStep::HitWall => {
            ctx.set_forward_vel(-16.0);
            ctx.avatar.face_angle.pitch = Angle::ZERO;
            ctx.stop_rising();
            ctx.signals.particle(ParticleFlags::VERTICAL_STAR);
            ctx.set_action(ActionId::BACKWARD_AIR_KB, 0);
            ctx.reset_camera();
        }
        AirStep::HitLavaWall => {
            ctx.lava_boost_on_wall();
        }
        _ => {}
    }

    if ctx.avatar.flags.has(AvatarFlags::WING_CAP) && ctx.avatar.vel.y < 0.0 {
        ctx.set_action(ActionId::FLYING, 0);
    }

    ctx.avatar.forward_vel -= 0.05;
    if ctx.avatar.forward_vel < 10.0 {
        ctx.set_forward_vel(10.0);
    }

    if ctx.avatar.vel.y > 0.0 {
        ctx.signals.particle(ParticleFlags::DUST);
    }
    false
}

fn flying(ctx: &mut ActionContext<'_>) -> bool {
    let start_pitch = ctx.avatar.face_angle.pitch;

    if ctx.has_input(InputFlags::Z_PRESSED) {
        ctx.set_flying_camera(false);
        return ctx.set_action(ActionId::GROUND_POUND, 1);
    }

    if !ctx.avatar.flags.has(AvatarFlags::WING_CAP) {
        ctx.set_flying_camera(false);
        return ctx.set_action(ActionId::FREEFALL, 0);
    }

    ctx.set_flying_camera(true);

    if ctx.avatar.action_state == 0 {
        // Arg 1: launched from a flying triple jump; 2: from a cannon.
        if ctx.avatar.action_arg == 2 {
            ctx.set_anim(AnimId::FlyFromCannon);
        } else {
            ctx.set_anim(AnimId::ForwardSpinningFlip);
            if ctx.anim_frame() == 1 {
                ctx.signals.sound(Sound::Spin);
            }
        }

        if ctx.anim_at_end() {
            ctx.set_anim(AnimId::WingCapFly);
            ctx.avatar.action_state = 1;
        }
    }

    ctx.update_flying();

    match ctx.perform_air_step(AirStepFlags::NONE) {
        AirStep::None => {
            let m = &mut *ctx.avatar;
            m.render.angle.pitch = -m.face_angle.pitch;
            m.render.angle.roll = m.face_angle.roll;
            m.action_timer = 0;
        }
        AirStep::Landed => {
            ctx.set_action(ActionId::DIVE_SLIDE, 0);
            ctx.set_anim(AnimId::Dive);
            ctx.avatar.anim.set_to_frame(7);
            ctx.avatar.face_angle.pitch = Angle::ZERO;
            ctx.set_flying_camera(false);
        }
        AirStep::HitWall => {
            if ctx.avatar.wall.is_some() {
                ctx.set_forward_vel(-16.0);
                ctx.avatar.face_angle.pitch = Angle::ZERO;
                ctx.stop_rising();

                let sound = if ctx.avatar.flags.has(AvatarFlags::METAL_CAP) {
                    Sound::MetalBonk
                } else {
                    Sound::Bonk
                };
                ctx.signals.sound(sound);
                ctx.signals.particle(ParticleFlags::VERTICAL_STAR);
                ctx.set_action(ActionId::BACKWARD_AIR_KB, 0);
                ctx.set_flying_camera(false);
            } else {
                // Scraping along a ceiling: nose down.
                let m = &mut *ctx.avatar;
                let timer = m.action_timer;
                m.action_timer += 1;
                if timer == 0 {
                    ctx.signals.sound(Sound::Hit);
                }

                let m = &mut *ctx.avatar;
                if m.action_timer == 30 {
                    m.action_timer = 0;
                }

                m.face_angle.pitch -= 0x200;
                if m.face_angle.pitch.0 < -MAX_PITCH {
                    m.face_angle.pitch = Angle(-MAX_PITCH);
                }
                m.render.angle.pitch = -m.face_angle.pitch;
                m.render.angle.roll = m.face_angle.roll;
            }
        }
        AirStep::HitLavaWall => {
            ctx.lava_boost_on_wall();
        }
        _ => {}
    }

    let m = &*ctx.avatar;
    if m.face_angle.pitch.0 > 0x800 && m.forward_vel >= 48.0 {
        ctx.signals.particle(ParticleFlags::DUST);
    }

    if start_pitch.0 <= 0 && ctx.avatar.face_angle.pitch.0 > 0 && ctx.avatar.forward_vel >= 48.0 {
        ctx.signals.sound(Sound::FlyingFast);
        ctx.signals.sound(Sound::YahooWahaYippee);
    }

    ctx.signals.sound(Sound::Flying);
    false
}

fn riding_hoot(ctx: &mut ActionContext<'_>) -> bool {
    let released = !ctx.has_input(InputFlags::A_DOWN)
        || ctx.avatar.interact_status.has(InteractStatus::DROP_FROM_HOOT);
    let Some(carrier) = ctx.avatar.carrier.filter(|_| !released) else {
        ctx.signals.push(Signal::StopRiding);
        ctx.avatar.carrier = None;
        ctx.play_sound_if_no_flag(Sound::Uh, AvatarFlags::VOICE_PLAYED);
        return ctx.set_action(ActionId::FREEFALL, 0);
    };

    let m = &mut *ctx.avatar;
    m.pos = carrier.pos - Vec3::new(0.0, 92.5, 0.0);
    m.face_angle.yaw = Angle::QUARTER - carrier.move_yaw;

    if m.action_state == 0 {
        ctx.set_anim(AnimId::HangOnCeiling);
        if ctx.anim_at_end() {
            ctx.set_anim(AnimId::HangOnOwl);
            ctx.avatar.action_state = 1;
        }
    }

    let m = &mut *ctx.avatar;
    m.vel = Vec3::ZERO;
    m.render.pos = m.pos;
    m.render.angle.pitch = Angle::ZERO;
    m.render.angle.yaw = Angle::QUARTER - m.face_angle.yaw;
    m.render.angle.roll = Angle::ZERO;
    false
}

fn vertical_wind(ctx: &mut ActionContext<'_>) -> bool {
    let dyaw = ctx.avatar.intended_yaw - ctx.avatar.face_angle.yaw;
    let mag = ctx.avatar.intended_mag / 32.0;

    ctx.play_sound_if_no_flag(Sound::HereWeGo, AvatarFlags::VOICE_PLAYED);
    if ctx.avatar.action_state == 0 {
        ctx.set_anim(AnimId::ForwardSpinningFlip);
        if ctx.anim_frame() == 1 {
            ctx.signals.sound(Sound::Spin);
        }
        if ctx.anim_past_end() {
            ctx.avatar.action_state = 1;
        }
    } else {
        ctx.set_anim(AnimId::AirborneOnStomach);
    }

    ctx.update_air_without_turn();

    match ctx.perform_air_step(AirStepFlags::NONE) {
        AirStep::Landed => {
            ctx.set_action(ActionId::DIVE_SLIDE, 0);
        }
        AirStep::HitWall => ctx.set_forward_vel(-16.0),
        _ => {}
    }

    let m = &mut *ctx.avatar;
    m.render.angle.pitch = Angle::from_f32(6144.0 * mag * dyaw.cos());
    m.render.angle.roll = Angle::from_f32(-4096.0 * mag * dyaw.sin());
    false
}
