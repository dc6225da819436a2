//! Per-frame execution context handed to every action handler.
//!
//! The context bundles the avatar with read-only access to the world and
//! configuration, plus the outbound signal queue. Floor classification and
//! the small sound/animation helpers live here so handlers stay short.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::collision::{CollisionWorld, Surface, SurfaceType};
use crate::math::{atan2s, Angle, SeededRandom, COS10, COS15, COS20, COS30, COS38, COS5};

use super::action::ActionId;
use super::animation::AnimId;
use super::config::MovementConfig;
use super::signal::{Signal, Signals, Sound};
use super::state::{AvatarFlags, AvatarState};
use super::step::find_avatar_floor;

/// Terrain theme of the current area.
///
/// Picks step sounds in the full game; here it only matters for slide
/// levels and for snow or sand that can bury the avatar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Terrain {
    #[default]
    Grass,
    Stone,
    Snow,
    Sand,
    Spooky,
    Water,
    Slide,
}

/// Per-area settings the action code reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaInfo {
    pub terrain: Terrain,
}

/// Friction class of the floor under the avatar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloorClass {
    Default,
    VerySlippery,
    Slippery,
    NotSlippery,
}

/// What voice line accompanies a body sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Voice {
    /// The usual jump call, picked by the current action.
    JumpCall,
    Silent,
    Clip(Sound),
}

/// Everything an action handler may touch during one frame.
pub struct ActionContext<'a> {
    pub avatar: &'a mut AvatarState,
    pub world: &'a CollisionWorld,
    pub config: &'a MovementConfig,
    pub area: &'a AreaInfo,
    pub rng: &'a mut SeededRandom,
    pub signals: &'a mut Signals,
    /// Global frame counter.
    pub frame: u32,
}

impl<'a> ActionContext<'a> {
    // ========================================================================
    // Surfaces
    // ========================================================================

    /// The surface the avatar stands on, if any.
    pub fn floor(&self) -> Option<&'a Surface> {
        let world: &'a CollisionWorld = self.world;
        self.avatar.floor.and_then(|r| world.resolve(r))
    }

    pub fn ceil(&self) -> Option<&'a Surface> {
        let world: &'a CollisionWorld = self.world;
        self.avatar.ceil.and_then(|r| world.resolve(r))
    }

    pub fn wall(&self) -> Option<&'a Surface> {
        let world: &'a CollisionWorld = self.world;
        self.avatar.wall.and_then(|r| world.resolve(r))
    }

    /// Floor normal, straight up when there is no floor.
    pub fn floor_normal(&self) -> Vec3 {
        self.floor().map_or(Vec3::Y, |f| f.normal)
    }

    pub fn floor_type(&self) -> SurfaceType {
        self.floor().map_or(SurfaceType::DEFAULT, |f| f.ty)
    }

    pub fn on_slide_terrain(&self) -> bool {
        self.area.terrain == Terrain::Slide
    }

    pub fn floor_class(&self) -> FloorClass {
        let mut class = if self.on_slide_terrain() {
            FloorClass::VerySlippery
        } else {
            FloorClass::Default
        };

        if let Some(floor) = self.floor() {
            let ty = floor.ty;
            if matches!(
                ty,
                SurfaceType::NOT_SLIPPERY | SurfaceType::HARD_NOT_SLIPPERY | SurfaceType::SWITCH
            ) {
                class = FloorClass::NotSlippery;
            } else if matches!(
                ty,
                SurfaceType::SLIPPERY
                    | SurfaceType::NOISE_SLIPPERY
                    | SurfaceType::HARD_SLIPPERY
                    | SurfaceType::NO_CAM_COL_SLIPPERY
            ) {
                class = FloorClass::Slippery;
            } else if matches!(
                ty,
                SurfaceType::VERY_SLIPPERY
                    | SurfaceType::ICE
                    | SurfaceType::HARD_VERY_SLIPPERY
                    | SurfaceType::NOISE_VERY_SLIPPERY_73
                    | SurfaceType::NOISE_VERY_SLIPPERY_74
                    | SurfaceType::NOISE_VERY_SLIPPERY
                    | SurfaceType::NO_CAM_COL_VERY_SLIPPERY
            ) {
                class = FloorClass::VerySlippery;
            }

            // Crawling up a gentle slope always grips.
            if self.avatar.action == ActionId::CRAWLING
                && floor.normal.y > 0.5
                && class == FloorClass::Default
            {
                class = FloorClass::NotSlippery;
            }
        }

        class
    }

    /// Too slippery to stand still on.
    pub fn floor_is_slippery(&self) -> bool {
        let normal_y = self.floor_normal().y;
        if self.on_slide_terrain() && normal_y < crate::math::COS1 {
            return true;
        }

        let limit = match self.floor_class() {
            FloorClass::VerySlippery => COS10,
            FloorClass::Slippery => COS20,
            FloorClass::Default => COS38,
            FloorClass::NotSlippery => 0.0,
        };
        normal_y <= limit
    }

    /// Steep enough for slope acceleration to kick in.
    pub fn floor_is_slope(&self) -> bool {
        let normal_y = self.floor_normal().y;
        if self.on_slide_terrain() && normal_y < crate::math::COS1 {
            return true;
        }

        let limit = match self.floor_class() {
            FloorClass::VerySlippery => COS5,
            FloorClass::Slippery => COS10,
            FloorClass::Default => COS15,
            FloorClass::NotSlippery => COS20,
        };
        normal_y <= limit
    }

    /// Too steep to jump straight up from while facing uphill.
    pub fn floor_is_steep(&self) -> bool {
        if self.facing_downhill(false) {
            return false;
        }

        let limit = match self.floor_class() {
            FloorClass::VerySlippery => COS15,
            FloorClass::Slippery => COS20,
            FloorClass::Default | FloorClass::NotSlippery => COS30,
        };
        self.floor_normal().y <= limit
    }

    /// The facing is within a quarter turn of the downhill direction.
    pub fn facing_downhill(&self, turn_yaw: bool) -> bool {
        let mut yaw = self.avatar.face_angle.yaw;
        if turn_yaw && self.avatar.forward_vel < 0.0 {
            yaw = yaw + Angle::HALF;
        }
        (self.avatar.floor_angle - yaw).within(0x4000)
    }

    /// Slope of the terrain along `face + yaw_offset`, sampled five units
    /// each way.
    pub fn find_floor_slope(&self, yaw_offset: Angle) -> Angle {
        let m = &*self.avatar;
        let dir = m.face_angle.yaw + yaw_offset;
        let x = dir.sin() * 5.0;
        let z = dir.cos() * 5.0;

        let forward = find_avatar_floor(self.world, m.pos.x + x, m.pos.y + 100.0, m.pos.z + z).height;
        let backward = find_avatar_floor(self.world, m.pos.x - x, m.pos.y + 100.0, m.pos.z - z).height;

        let forward_delta = forward - m.pos.y;
        let backward_delta = m.pos.y - backward;

        if forward_delta * forward_delta < backward_delta * backward_delta {
            atan2s(5.0, forward_delta)
        } else {
            atan2s(5.0, backward_delta)
        }
    }

    // ========================================================================
    // Sounds
    // ========================================================================

    /// Play `sound` unless `flag` is already latched, then latch it.
    pub fn play_sound_if_no_flag(&mut self, sound: Sound, flag: u32) {
        if !self.avatar.flags.has(flag) {
            self.signals.sound(sound);
            self.avatar.flags.set(flag, true);
        }
    }

    pub fn play_jump_voice(&mut self) {
        if !self.avatar.flags.has(AvatarFlags::VOICE_PLAYED) {
            let sound = if self.avatar.action == ActionId::TRIPLE_JUMP {
                Sound::YahooWahaYippee
            } else {
                Sound::YahWahHoo
            };
            self.signals.sound(sound);
            self.avatar.flags.set(AvatarFlags::VOICE_PLAYED, true);
        }
    }

    /// Body sound for the current action, with an optional voice line.
    pub fn play_avatar_sound(&mut self, body: Sound, voice: Voice) {
        if body == Sound::TerrainJump {
            let sound = if self.avatar.flags.has(AvatarFlags::METAL_CAP) {
                Sound::MetalJump
            } else {
                Sound::TerrainJump
            };
            self.play_sound_if_no_flag(sound, AvatarFlags::ACTION_SOUND_PLAYED);
        } else {
            self.play_sound_if_no_flag(body, AvatarFlags::ACTION_SOUND_PLAYED);
        }

        match voice {
            Voice::JumpCall => self.play_jump_voice(),
            Voice::Clip(sound) => self.play_sound_if_no_flag(sound, AvatarFlags::VOICE_PLAYED),
            Voice::Silent => {}
        }
    }

    pub fn play_landing_sound(&mut self, sound: Sound) {
        let sound = if self.avatar.flags.has(AvatarFlags::METAL_CAP) {
            Sound::MetalLanding
        } else {
            sound
        };
        self.signals.sound(sound);
    }

    pub fn play_landing_sound_once(&mut self, sound: Sound) {
        if !self.avatar.flags.has(AvatarFlags::ACTION_SOUND_PLAYED) {
            self.play_landing_sound(sound);
            self.avatar.flags.set(AvatarFlags::ACTION_SOUND_PLAYED, true);
        }
    }

    pub fn play_heavy_landing_sound(&mut self, sound: Sound) {
        let sound = if self.avatar.flags.has(AvatarFlags::METAL_CAP) {
            Sound::MetalHeavyLanding
        } else {
            sound
        };
        self.signals.sound(sound);
    }

    pub fn play_heavy_landing_sound_once(&mut self, sound: Sound) {
        if !self.avatar.flags.has(AvatarFlags::ACTION_SOUND_PLAYED) {
            self.play_heavy_landing_sound(sound);
            self.avatar.flags.set(AvatarFlags::ACTION_SOUND_PLAYED, true);
        }
    }

    /// Reset the camera when a knockback or lava boost starts.
    pub fn reset_camera(&mut self) {
        self.avatar.flying_camera = false;
        self.signals.push(Signal::ResetCameraMode);
    }

    /// Switch between the flying follow camera and the default one. Only a
    /// change of mode is signalled.
    pub fn set_flying_camera(&mut self, flying: bool) {
        if self.avatar.flying_camera == flying {
            return;
        }
        self.avatar.flying_camera = flying;
        self.signals.push(if flying {
            Signal::FlyingCameraMode
        } else {
            Signal::ResetCameraMode
        });
    }

    // ========================================================================
    // Animation
    // ========================================================================

    pub fn set_anim(&mut self, id: AnimId) -> i16 {
        self.avatar.anim.set(id)
    }

    pub fn set_anim_with_accel(&mut self, id: AnimId, accel: i32) -> i16 {
        self.avatar.anim.set_with_accel(id, accel)
    }

    #[inline]
    pub fn anim_frame(&self) -> i16 {
        self.avatar.anim.frame()
    }

    #[inline]
    pub fn anim_at_end(&self) -> bool {
        self.avatar.anim.is_at_end()
    }

    #[inline]
    pub fn anim_past_end(&self) -> bool {
        self.avatar.anim.is_past_end()
    }

    // ========================================================================
    // Motion helpers
    // ========================================================================

    #[inline]
    pub fn set_forward_vel(&mut self, speed: f32) {
        self.avatar.set_forward_vel(speed);
    }

    #[inline]
    pub fn has_input(&self, flag: u32) -> bool {
        self.avatar.input.has(flag)
    }

    /// Turn off a wall: reflect the facing across it, or turn around when
    /// there is no wall to reflect from.
    pub fn bonk_reflection(&mut self, negate_speed: bool) {
        if let Some(wall) = self.wall() {
            let wall_yaw = wall.yaw();
            let face = self.avatar.face_angle.yaw;
            self.avatar.face_angle.yaw = wall_yaw - (face - wall_yaw);
            let sound = if self.avatar.flags.has(AvatarFlags::METAL_CAP) {
                Sound::MetalBonk
            } else {
                Sound::Bonk
            };
            self.signals.sound(sound);
        } else {
            self.signals.sound(Sound::Hit);
        }

        if negate_speed {
            let speed = -self.avatar.forward_vel;
            self.set_forward_vel(speed);
        } else {
            self.avatar.face_angle.yaw = self.avatar.face_angle.yaw + Angle::HALF;
        }
    }
}
