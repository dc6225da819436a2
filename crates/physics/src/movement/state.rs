//! Avatar state and input structures.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::collision::SurfaceRef;
use crate::math::{Angle, Orientation};

use super::action::ActionId;
use super::animation::AnimationCursor;

/// Per-frame input flags derived from the controller and the geometry
/// around the avatar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputFlags(pub u32);

impl InputFlags {
    /// The stick is off center.
    pub const NONZERO_ANALOG: u32 = 1 << 0;

    /// A went down this frame.
    pub const A_PRESSED: u32 = 1 << 1;

    /// More than 100 units above the floor.
    pub const OFF_FLOOR: u32 = 1 << 2;

    /// Standing on a floor too slippery to stand still on.
    pub const ABOVE_SLIDE: u32 = 1 << 3;

    /// First-person view is active.
    pub const FIRST_PERSON: u32 = 1 << 4;

    /// Neither the stick nor A is in use.
    pub const IDLE: u32 = 1 << 5;

    /// A dynamic floor and ceiling are closing in.
    pub const SQUISHED: u32 = 1 << 6;

    pub const A_DOWN: u32 = 1 << 7;

    /// Below the water surface.
    pub const IN_WATER: u32 = 1 << 9;

    /// Hit by a stomp shockwave.
    pub const STOMPED: u32 = 1 << 10;

    pub const B_PRESSED: u32 = 1 << 13;
    pub const Z_DOWN: u32 = 1 << 14;
    pub const Z_PRESSED: u32 = 1 << 15;

    /// Check if a flag is set.
    #[inline]
    pub fn has(self, flag: u32) -> bool {
        (self.0 & flag) != 0
    }

    /// Set or clear a flag.
    #[inline]
    pub fn set(&mut self, flag: u32, value: bool) {
        if value {
            self.0 |= flag;
        } else {
            self.0 &= !flag;
        }
    }
}

/// Persistent avatar flags: power-ups, cap state and one-shot sound latches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvatarFlags(pub u32);

impl AvatarFlags {
    pub const NORMAL_CAP: u32 = 1 << 0;
    pub const VANISH_CAP: u32 = 1 << 1;
    pub const METAL_CAP: u32 = 1 << 2;
    pub const WING_CAP: u32 = 1 << 3;
    pub const CAP_ON_HEAD: u32 = 1 << 4;
    pub const CAP_IN_HAND: u32 = 1 << 5;
    pub const METAL_SHOCK: u32 = 1 << 6;

    /// Set on entering an airborne action; gates jump-height control.
    pub const JUMPING: u32 = 1 << 8;

    /// Pressing into a wall this frame.
    pub const PUSHING: u32 = 1 << 11;

    /// Body sound for the current action already played.
    pub const ACTION_SOUND_PLAYED: u32 = 1 << 16;

    /// Voice clip for the current action already played.
    pub const VOICE_PLAYED: u32 = 1 << 17;

    /// Long-fall scream already played.
    pub const FALL_SOUND_PLAYED: u32 = 1 << 18;

    pub const PUNCHING: u32 = 1 << 20;
    pub const KICKING: u32 = 1 << 21;
    pub const TRIPPING: u32 = 1 << 22;

    /// Bits cleared at the start of every frame.
    pub const PER_FRAME: u32 = Self::PUSHING | Self::PUNCHING | Self::KICKING | Self::TRIPPING;

    #[inline]
    pub fn has(self, flag: u32) -> bool {
        (self.0 & flag) != 0
    }

    #[inline]
    pub fn set(&mut self, flag: u32, value: bool) {
        if value {
            self.0 |= flag;
        } else {
            self.0 &= !flag;
        }
    }
}

/// Controller buttons.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buttons(pub u16);

impl Buttons {
    pub const A: u16 = 1 << 0;
    pub const B: u16 = 1 << 1;
    pub const Z: u16 = 1 << 2;
    pub const START: u16 = 1 << 3;

    #[inline]
    pub fn pressed(self, button: u16) -> bool {
        (self.0 & button) != 0
    }

    #[inline]
    pub fn press(&mut self, button: u16) {
        self.0 |= button;
    }

    #[inline]
    pub fn release(&mut self, button: u16) {
        self.0 &= !button;
    }
}

/// Input snapshot for one frame.
///
/// Stick values are already dead-zoned and lie in `[-64, 64]`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AvatarCommand {
    pub stick_x: f32,
    pub stick_y: f32,

    /// Buttons that went down this frame.
    pub pressed: Buttons,

    /// Buttons currently held.
    pub down: Buttons,

    /// Yaw of the camera, used to turn the stick into a world heading.
    pub camera_yaw: Angle,

    /// The camera is in its first-person mode.
    pub first_person: bool,
}

impl AvatarCommand {
    /// Stick deflection, capped at 64.
    pub fn stick_mag(&self) -> f32 {
        (self.stick_x * self.stick_x + self.stick_y * self.stick_y)
            .sqrt()
            .min(64.0)
    }
}

/// Interaction results written by the object system before the frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractStatus(pub u32);

impl InteractStatus {
    /// The held object must be let go.
    pub const DROP_OBJECT: u32 = 1 << 0;
    pub const STUNNED: u32 = 1 << 1;
    pub const KNOCKED_BACK: u32 = 1 << 2;
    pub const SHOCKWAVE: u32 = 1 << 3;
    /// The owl let go of the avatar.
    pub const DROP_FROM_HOOT: u32 = 1 << 4;
    /// A grabbable object is within reach of the avatar's hands.
    pub const GRAB_IN_REACH: u32 = 1 << 5;

    #[inline]
    pub fn has(self, flag: u32) -> bool {
        (self.0 & flag) != 0
    }
}

/// An object the avatar is carrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeldObject {
    pub id: u32,
    /// The crazy box bounces the avatar instead of being carried normally.
    pub jumping_box: bool,
    /// A creature that struggles in the avatar's arms and cannot be thrown
    /// mid-air.
    pub holdable_npc: bool,
}

impl HeldObject {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            jumping_box: false,
            holdable_npc: false,
        }
    }
}

/// An object carrying the avatar around, such as the owl.
///
/// The object system writes its position every frame before the avatar runs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Carrier {
    pub id: u32,
    pub pos: Vec3,
    pub move_yaw: Angle,
}

/// Eye texture selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EyeState {
    #[default]
    Blink,
    HalfClosed,
    Dead,
}

/// Hand pose.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandState {
    #[default]
    Fists,
    Open,
}

/// Pose details that the renderer reads back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BodyState {
    pub eye_state: EyeState,
    pub hand_state: HandState,
    pub wing_flutter: bool,
    pub torso_angle: Orientation,
    pub head_angle: Orientation,
    pub punch_state: u8,
    /// Forward lean while running.
    pub walking_pitch: Angle,
}

impl BodyState {
    /// Clear the per-frame pose bits.
    pub fn reset(&mut self) {
        self.eye_state = EyeState::Blink;
        self.hand_state = HandState::Fists;
        self.wing_flutter = false;
    }
}

/// Transform handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderState {
    pub pos: Vec3,
    pub angle: Orientation,
    /// Floor-aligned transform, when an action asked for one.
    pub throw_matrix: Option<Mat4>,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            pos: Vec3::ZERO,
            angle: Orientation::ZERO,
            throw_matrix: None,
        }
    }
}

/// Everything the action state machine knows about one avatar.
///
/// Surface references are only valid for the frame they were found in; the
/// controller re-queries them at the start of every frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvatarState {
    // ========================================================================
    // Kinematics
    // ========================================================================
    pub pos: Vec3,
    pub vel: Vec3,
    pub forward_vel: f32,
    pub slide_vel_x: f32,
    pub slide_vel_z: f32,
    pub slide_yaw: Angle,
    pub face_angle: Orientation,
    pub angle_vel: Orientation,
    pub twirl_yaw: Angle,

    // ========================================================================
    // Input
    // ========================================================================
    pub input: InputFlags,
    pub intended_yaw: Angle,
    pub intended_mag: f32,
    pub stick_x: f32,
    pub stick_y: f32,
    pub stick_mag: f32,
    pub frames_since_a: u8,
    pub frames_since_b: u8,

    // ========================================================================
    // Action
    // ========================================================================
    pub action: ActionId,
    pub prev_action: ActionId,
    pub action_arg: u32,
    pub action_state: u16,
    pub action_timer: u16,
    /// Set once a transition commits; cleared at the start of the frame.
    pub transitioned: bool,

    // ========================================================================
    // Surroundings
    // ========================================================================
    pub floor: Option<SurfaceRef>,
    pub ceil: Option<SurfaceRef>,
    pub wall: Option<SurfaceRef>,
    pub floor_height: f32,
    pub ceil_height: f32,
    pub water_level: f32,
    /// Downhill yaw of the floor.
    pub floor_angle: Angle,
    pub wall_yaw: Angle,
    pub peak_height: f32,
    pub quicksand_depth: f32,
    pub wind_gravity: f32,

    // ========================================================================
    // Health and timers
    // ========================================================================
    pub health: i16,
    pub hurt_counter: u8,
    pub heal_counter: u8,
    pub squish_timer: u8,
    pub invinc_timer: i16,
    pub double_jump_timer: u8,
    pub wall_kick_timer: u8,
    pub burn_timer: u16,
    pub shell_coyote_timer: u8,

    // ========================================================================
    // Objects
    // ========================================================================
    pub held_obj: Option<HeldObject>,
    pub ridden_obj: Option<u32>,
    pub carrier: Option<Carrier>,
    pub interact_status: InteractStatus,

    // ========================================================================
    // Presentation
    // ========================================================================
    pub flags: AvatarFlags,
    pub body: BodyState,
    pub anim: AnimationCursor,
    pub render: RenderState,
    /// Long jump started slowly; picks the landing animation.
    pub long_jump_is_slow: bool,
    pub steep_jump_yaw: Angle,
    /// The next triple jump becomes the sparkling special triple jump.
    pub special_triple_jump: bool,
    /// The camera was last asked to follow in flying mode.
    pub flying_camera: bool,
}

impl Default for AvatarState {
    fn default() -> Self {
        Self {
            pos: Vec3::ZERO,
            vel: Vec3::ZERO,
            forward_vel: 0.0,
            slide_vel_x: 0.0,
            slide_vel_z: 0.0,
            slide_yaw: Angle::ZERO,
            face_angle: Orientation::ZERO,
            angle_vel: Orientation::ZERO,
            twirl_yaw: Angle::ZERO,

            input: InputFlags::default(),
            intended_yaw: Angle::ZERO,
            intended_mag: 0.0,
            stick_x: 0.0,
            stick_y: 0.0,
            stick_mag: 0.0,
            frames_since_a: 0xFF,
            frames_since_b: 0xFF,

            action: ActionId::IDLE,
            prev_action: ActionId::UNINITIALIZED,
            action_arg: 0,
            action_state: 0,
            action_timer: 0,
            transitioned: false,

            floor: None,
            ceil: None,
            wall: None,
            floor_height: 0.0,
            ceil_height: 0.0,
            water_level: crate::collision::FLOOR_LOWER_LIMIT,
            floor_angle: Angle::ZERO,
            wall_yaw: Angle::ZERO,
            peak_height: 0.0,
            quicksand_depth: 0.0,
            wind_gravity: 0.0,

            health: 0x880,
            hurt_counter: 0,
            heal_counter: 0,
            squish_timer: 0,
            invinc_timer: 0,
            double_jump_timer: 0,
            wall_kick_timer: 0,
            burn_timer: 0,
            shell_coyote_timer: 0,

            held_obj: None,
            ridden_obj: None,
            carrier: None,
            interact_status: InteractStatus::default(),

            flags: AvatarFlags(AvatarFlags::NORMAL_CAP | AvatarFlags::CAP_ON_HEAD),
            body: BodyState::default(),
            anim: AnimationCursor::default(),
            render: RenderState::default(),
            long_jump_is_slow: false,
            steep_jump_yaw: Angle::ZERO,
            special_triple_jump: false,
            flying_camera: false,
        }
    }
}

impl AvatarState {
    /// Create a new avatar standing at `pos` facing `yaw`.
    pub fn new(pos: Vec3, yaw: Angle) -> Self {
        Self {
            pos,
            face_angle: Orientation::from_yaw(yaw),
            peak_height: pos.y,
            render: RenderState {
                pos,
                angle: Orientation::from_yaw(yaw),
                throw_matrix: None,
            },
            ..Default::default()
        }
    }

    /// Switch action from outside the state machine.
    ///
    /// Collaborators that own non-core actions (swimming, cutscenes, object
    /// interactions) use this to hand the avatar back. It bypasses the
    /// per-frame transition guard and the entry side effects.
    pub fn force_action(&mut self, action: ActionId, arg: u32) {
        log::debug!("forced action {:#010x} -> {:#010x}", self.action.0, action.0);
        self.prev_action = self.action;
        self.action = action;
        self.action_arg = arg;
        self.action_state = 0;
        self.action_timer = 0;
    }

    /// Set forward speed and derive horizontal velocity from the facing.
    pub fn set_forward_vel(&mut self, speed: f32) {
        self.forward_vel = speed;
        self.slide_vel_x = self.face_angle.yaw.sin() * speed;
        self.slide_vel_z = self.face_angle.yaw.cos() * speed;
        self.vel.x = self.slide_vel_x;
        self.vel.z = self.slide_vel_z;
    }

    /// Current horizontal speed.
    pub fn horizontal_speed(&self) -> f32 {
        Vec3::new(self.vel.x, 0.0, self.vel.z).length()
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.health < 0x100
    }

    #[inline]
    pub fn has_flag(&self, flag: u32) -> bool {
        self.flags.has(flag)
    }

    #[inline]
    pub fn has_input(&self, flag: u32) -> bool {
        self.input.has(flag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_flags() {
        let mut input = InputFlags::default();
        assert!(!input.has(InputFlags::A_PRESSED));

        input.set(InputFlags::A_PRESSED, true);
        assert!(input.has(InputFlags::A_PRESSED));

        input.set(InputFlags::A_PRESSED, false);
        assert!(!input.has(InputFlags::A_PRESSED));
    }

    #[test]
    fn test_default_avatar_has_cap_and_full_health() {
        let avatar = AvatarState::default();
        assert!(avatar.has_flag(AvatarFlags::CAP_ON_HEAD));
        assert_eq!(avatar.health, 0x880);
        assert_eq!(avatar.action, ActionId::IDLE);
    }

    #[test]
    fn test_set_forward_vel_follows_yaw() {
        let mut avatar = AvatarState::new(Vec3::ZERO, Angle::QUARTER);
        avatar.set_forward_vel(10.0);
        // Yaw 0x4000 faces +X
        assert!((avatar.vel.x - 10.0).abs() < 1e-3);
        assert!(avatar.vel.z.abs() < 1e-3);
    }

    #[test]
    fn test_force_action_records_previous() {
        let mut avatar = AvatarState::default();
        avatar.action_timer = 9;
        avatar.force_action(ActionId::WATER_IDLE, 0);
        assert_eq!(avatar.prev_action, ActionId::IDLE);
        assert_eq!(avatar.action, ActionId::WATER_IDLE);
        assert_eq!(avatar.action_timer, 0);
    }

    #[test]
    fn test_stick_mag_capped() {
        let command = AvatarCommand {
            stick_x: 64.0,
            stick_y: 64.0,
            ..Default::default()
        };
        assert_eq!(command.stick_mag(), 64.0);
    }
}
