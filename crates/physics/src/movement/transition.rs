//! Action transitions.
//!
//! Every change of action goes through [`ActionContext::set_action`]. Entering
//! an airborne or moving action applies that group's entry setup (launch
//! speeds, slide direction), then resets the per-action scratch fields.
//!
//! Only the first transition of a frame commits. Handlers still return
//! `true` from later requests so they stop running, but the avatar keeps the
//! action chosen first.

use crate::math::{atan2s, Angle};

use super::action::{ActionGroup, ActionId};
use super::context::{ActionContext, FloorClass};
use super::signal::Signal;
use super::state::AvatarFlags;

impl ActionContext<'_> {
    /// Request a transition to `action`.
    ///
    /// Always returns `true` so handlers can `return ctx.set_action(..)`.
    pub fn set_action(&mut self, action: ActionId, arg: u32) -> bool {
        if self.avatar.transitioned {
            log::debug!(
                "ignoring transition to {:#010x}; already left {:#010x} this frame",
                action.0,
                self.avatar.prev_action.0
            );
            return true;
        }

        let action = match action.group() {
            ActionGroup::Moving => self.enter_moving(action),
            ActionGroup::Airborne => self.enter_airborne(action, arg),
            _ => action,
        };

        let m = &mut *self.avatar;
        m.flags.set(AvatarFlags::ACTION_SOUND_PLAYED, false);
        m.flags.set(AvatarFlags::VOICE_PLAYED, false);
        if !m.action.is_air() {
            m.flags.set(AvatarFlags::FALL_SOUND_PLAYED, false);
        }

        log::debug!("action {:#010x} -> {:#010x} (arg {})", m.action.0, action.0, arg);

        m.prev_action = m.action;
        m.action = action;
        m.action_arg = arg;
        m.action_state = 0;
        m.action_timer = 0;
        m.transitioned = true;
        true
    }

    /// Let go of anything held or ridden, then transition.
    pub fn drop_and_set_action(&mut self, action: ActionId, arg: u32) -> bool {
        if !self.avatar.transitioned {
            self.stop_riding_and_holding();
        }
        self.set_action(action, arg)
    }

    /// Queue `damage` hurt frames, then transition.
    pub fn hurt_and_set_action(&mut self, action: ActionId, arg: u32, damage: u8) -> bool {
        if !self.avatar.transitioned {
            self.avatar.hurt_counter = damage;
        }
        self.set_action(action, arg)
    }

    pub fn drop_held_object(&mut self) {
        if self.avatar.held_obj.take().is_some() {
            self.signals.push(Signal::DropHeldObject);
        }
    }

    pub fn stop_riding_and_holding(&mut self) {
        self.drop_held_object();
        if self.avatar.ridden_obj.take().is_some() {
            self.signals.push(Signal::StopRiding);
        }
        if self.avatar.action == ActionId::RIDING_HOOT {
            self.signals.push(Signal::StopRiding);
        }
    }

    /// Jump unless quicksand or a steep floor says otherwise.
    pub fn set_jumping_action(&mut self, action: ActionId, arg: u32) -> bool {
        if self.avatar.quicksand_depth >= 11.0 {
            return self.set_quicksand_jump_land();
        }

        if self.floor_is_steep() {
            self.set_steep_jump_action();
        } else {
            self.set_action(action, arg);
        }
        true
    }

    /// Jump from a landing, chaining into double and triple jumps.
    pub fn set_jump_from_landing(&mut self) -> bool {
        if self.avatar.transitioned {
            return self.set_action(ActionId::JUMP, 0);
        }
        if self.avatar.quicksand_depth >= 11.0 {
            return self.set_quicksand_jump_land();
        }

        if self.floor_is_steep() {
            self.set_steep_jump_action();
        } else if self.avatar.double_jump_timer == 0 || self.avatar.squish_timer != 0 {
            self.set_action(ActionId::JUMP, 0);
        } else {
            let prev = self.avatar.prev_action;
            if matches!(
                prev,
                ActionId::JUMP_LAND | ActionId::FREEFALL_LAND | ActionId::SIDE_FLIP_LAND_STOP
            ) {
                self.set_action(ActionId::DOUBLE_JUMP, 0);
            } else if prev == ActionId::DOUBLE_JUMP_LAND {
                self.set_triple_jump_action();
            } else {
                self.set_action(ActionId::JUMP, 0);
            }
        }

        self.avatar.double_jump_timer = 0;
        true
    }

    /// Triple jump when fast enough, flying triple jump with the wing cap.
    pub fn set_triple_jump_action(&mut self) -> bool {
        if self.avatar.flags.has(AvatarFlags::WING_CAP) {
            self.set_action(ActionId::FLYING_TRIPLE_JUMP, 0)
        } else if self.avatar.forward_vel > 20.0 {
            self.set_action(ActionId::TRIPLE_JUMP, 0)
        } else {
            self.set_action(ActionId::JUMP, 0)
        }
    }

    fn set_quicksand_jump_land(&mut self) -> bool {
        let action = if self.avatar.held_obj.is_none() {
            ActionId::QUICKSAND_JUMP_LAND
        } else {
            ActionId::HOLD_QUICKSAND_JUMP_LAND
        };
        self.set_action(action, 0)
    }

    /// Redirect a jump off a steep floor so it follows the slope.
    pub fn set_steep_jump_action(&mut self) {
        if self.avatar.transitioned {
            self.set_action(ActionId::STEEP_JUMP, 0);
            return;
        }
        let m = &mut *self.avatar;
        m.steep_jump_yaw = m.face_angle.yaw;

        if m.forward_vel > 0.0 {
            let uphill = m.floor_angle + Angle::HALF;
            let relative = m.face_angle.yaw - uphill;
            let y = relative.sin() * m.forward_vel;
            let x = relative.cos() * m.forward_vel * 0.75;

            m.forward_vel = (y * y + x * x).sqrt();
            m.face_angle.yaw = atan2s(x, y) + uphill;
        }

        self.drop_and_set_action(ActionId::STEEP_JUMP, 0);
    }

    /// Slide back down a floor too steep to stand on.
    pub fn push_off_steep_floor(&mut self, action: ActionId, arg: u32) -> bool {
        if self.avatar.transitioned {
            return self.set_action(action, arg);
        }
        let m = &mut *self.avatar;
        let delta = m.floor_angle - m.face_angle.yaw;

        if delta.within(0x4000) {
            m.forward_vel = 16.0;
            m.face_angle.yaw = m.floor_angle;
        } else {
            m.forward_vel = -16.0;
            m.face_angle.yaw = m.floor_angle + Angle::HALF;
        }

        self.set_action(action, arg)
    }

    /// Vertical launch speed, with a share of forward speed carried over.
    fn set_y_vel_from_forward(&mut self, initial: f32, multiplier: f32) {
        let m = &mut *self.avatar;
        m.vel.y = initial + m.forward_vel * multiplier;
        if m.squish_timer != 0 || m.quicksand_depth > 1.0 {
            m.vel.y *= 0.5;
        }
    }

    fn enter_airborne(&mut self, action: ActionId, arg: u32) -> ActionId {
        let mut action = action;
        if (self.avatar.squish_timer != 0 || self.avatar.quicksand_depth >= 1.0)
            && matches!(action, ActionId::DOUBLE_JUMP | ActionId::TWIRLING)
        {
            action = ActionId::JUMP;
        }

        match action {
            ActionId::DOUBLE_JUMP => {
                self.set_y_vel_from_forward(52.0, 0.25);
                self.avatar.forward_vel *= 0.8;
            }
            ActionId::BACKFLIP => {
                self.avatar.anim.invalidate();
                self.avatar.forward_vel = -16.0;
                self.set_y_vel_from_forward(62.0, 0.0);
            }
            ActionId::TRIPLE_JUMP => {
                self.set_y_vel_from_forward(69.0, 0.0);
                self.avatar.forward_vel *= 0.8;
            }
            ActionId::FLYING_TRIPLE_JUMP => self.set_y_vel_from_forward(82.0, 0.0),
            ActionId::WATER_JUMP | ActionId::HOLD_WATER_JUMP => {
                if arg == 0 {
                    self.set_y_vel_from_forward(42.0, 0.0);
                }
            }
            ActionId::BURNING_JUMP => {
                self.avatar.vel.y = 31.5;
                self.avatar.forward_vel = 8.0;
            }
            ActionId::RIDING_SHELL_JUMP => self.set_y_vel_from_forward(42.0, 0.25),
            ActionId::JUMP | ActionId::HOLD_JUMP => {
                self.avatar.anim.invalidate();
                self.set_y_vel_from_forward(42.0, 0.25);
                self.avatar.forward_vel *= 0.8;
            }
            ActionId::WALL_KICK_AIR | ActionId::TOP_OF_POLE_JUMP => {
                self.set_y_vel_from_forward(62.0, 0.0);
                if self.avatar.forward_vel < 24.0 {
                    self.avatar.forward_vel = 24.0;
                }
                self.avatar.wall_kick_timer = 0;
            }
            ActionId::SIDE_FLIP => {
                self.set_y_vel_from_forward(62.0, 0.0);
                self.avatar.forward_vel = 8.0;
                self.avatar.face_angle.yaw = self.avatar.intended_yaw;
            }
            ActionId::STEEP_JUMP => {
                self.avatar.anim.invalidate();
                self.set_y_vel_from_forward(42.0, 0.25);
                self.avatar.face_angle.pitch = Angle(-0x2000);
            }
            ActionId::LAVA_BOOST => {
                self.avatar.vel.y = 84.0;
                if arg == 0 {
                    self.avatar.forward_vel = 0.0;
                }
            }
            ActionId::DIVE => {
                let speed = (self.avatar.forward_vel + 15.0).min(48.0);
                self.set_forward_vel(speed);
            }
            ActionId::LONG_JUMP => {
                self.avatar.anim.invalidate();
                self.set_y_vel_from_forward(30.0, 0.0);
                let m = &mut *self.avatar;
                m.long_jump_is_slow = m.forward_vel <= 16.0;
                // Backwards long jumps keep stacking speed here.
                m.forward_vel = (m.forward_vel * 1.5).min(48.0);
            }
            ActionId::SLIDE_KICK => {
                self.avatar.vel.y = 12.0;
                if self.avatar.forward_vel < 32.0 {
                    self.avatar.forward_vel = 32.0;
                }
            }
            ActionId::JUMP_KICK => self.avatar.vel.y = 20.0,
            _ => {}
        }

        self.avatar.peak_height = self.avatar.pos.y;
        self.avatar.flags.set(AvatarFlags::JUMPING, true);
        action
    }

    fn enter_moving(&mut self, action: ActionId) -> ActionId {
        let class = self.floor_class();
        let speed = self.avatar.forward_vel;
        let mag = self.avatar.intended_mag.min(8.0);

        match action {
            ActionId::WALKING => {
                if class != FloorClass::VerySlippery && (0.0..mag).contains(&speed) {
                    self.avatar.forward_vel = mag;
                }
                self.avatar.body.walking_pitch = Angle::ZERO;
                action
            }
            ActionId::HOLD_WALKING => {
                if (0.0..mag / 2.0).contains(&speed) {
                    self.avatar.forward_vel = mag / 2.0;
                }
                action
            }
            ActionId::BEGIN_SLIDING => {
                if self.facing_downhill(false) {
                    ActionId::BUTT_SLIDE
                } else {
                    ActionId::STOMACH_SLIDE
                }
            }
            ActionId::HOLD_BEGIN_SLIDING => {
                if self.facing_downhill(false) {
                    ActionId::HOLD_BUTT_SLIDE
                } else {
                    ActionId::HOLD_STOMACH_SLIDE
                }
            }
            _ => action,
        }
    }
}
