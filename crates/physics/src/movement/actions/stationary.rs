//! Standing actions.
//!
//! Only the set that the moving and airborne actions hand off to: idling,
//! crouching, the short stops after landings and slides, and the stationary
//! punch. Each one either plays out a clip and moves on, or waits for input.

use glam::Vec3;

use crate::math::{Angle, COS73};

use super::super::action::ActionId;
use super::super::animation::AnimId;
use super::super::context::ActionContext;
use super::super::signal::{Signal, Sound};
use super::super::state::{EyeState, InputFlags, InteractStatus};
use super::ActionTable;

/// Speed curve of a standing punch, indexed by the countdown in the action
/// timer.
const PUNCH_FORWARD_VEL: [f32; 8] = [0.0, 1.0, 1.0, 2.0, 3.0, 5.0, 7.0, 10.0];

/// Frames the avatar bobs after being stomped.
const SHOCKWAVE_BOUNCE_FRAMES: u16 = 48;

/// Head turn phases of the idle loop.
const IDLE_HEAD_PHASES: u16 = 3;

/// Any of these leave a stop for the general exits.
const EXIT_INPUTS: u32 = InputFlags::NONZERO_ANALOG
    | InputFlags::A_PRESSED
    | InputFlags::OFF_FLOOR
    | InputFlags::ABOVE_SLIDE;

pub(super) fn register(table: &mut ActionTable) {
    table.register(ActionId::IDLE, "idle", idle);
    table.register(ActionId::PANTING, "panting", panting);
    table.register(ActionId::IN_QUICKSAND, "in_quicksand", in_quicksand);
    table.register(ActionId::HOLD_IDLE, "hold_idle", hold_idle);
    table.register(ActionId::HOLD_HEAVY_IDLE, "hold_heavy_idle", hold_heavy_idle);
    table.register(ActionId::STANDING_AGAINST_WALL, "standing_against_wall", standing_against_wall);
    table.register(ActionId::FIRST_PERSON, "first_person", first_person);
    table.register(ActionId::SHOCKWAVE_BOUNCE, "shockwave_bounce", shockwave_bounce);
    table.register(ActionId::CROUCHING, "crouching", crouching);
    table.register(ActionId::START_CROUCHING, "start_crouching", start_crouching);
    table.register(ActionId::STOP_CROUCHING, "stop_crouching", stop_crouching);
    table.register(ActionId::START_CRAWLING, "start_crawling", start_crawling);
    table.register(ActionId::STOP_CRAWLING, "stop_crawling", stop_crawling);
    table.register(ActionId::PUNCHING, "punching", punching);
    table.register(ActionId::JUMP_LAND_STOP, "jump_land_stop", jump_land_stop);
    table.register(ActionId::DOUBLE_JUMP_LAND_STOP, "double_jump_land_stop", double_jump_land_stop);
    table.register(ActionId::FREEFALL_LAND_STOP, "freefall_land_stop", freefall_land_stop);
    table.register(ActionId::SIDE_FLIP_LAND_STOP, "side_flip_land_stop", side_flip_land_stop);
    table.register(ActionId::TRIPLE_JUMP_LAND_STOP, "triple_jump_land_stop", triple_jump_land_stop);
    table.register(ActionId::BACKFLIP_LAND_STOP, "backflip_land_stop", backflip_land_stop);
    table.register(ActionId::LONG_JUMP_LAND_STOP, "long_jump_land_stop", long_jump_land_stop);
    table.register(ActionId::HOLD_JUMP_LAND_STOP, "hold_jump_land_stop", hold_jump_land_stop);
    table.register(ActionId::HOLD_FREEFALL_LAND_STOP, "hold_freefall_land_stop", hold_freefall_land_stop);
    table.register(ActionId::LAVA_BOOST_LAND, "lava_boost_land", lava_boost_land);
    table.register(ActionId::TWIRL_LAND, "twirl_land", twirl_land);
    table.register(ActionId::GROUND_POUND_LAND, "ground_pound_land", ground_pound_land);
    table.register(ActionId::AIR_THROW_LAND, "air_throw_land", air_throw_land);
    table.register(ActionId::BRAKING_STOP, "braking_stop", braking_stop);
    table.register(ActionId::BUTT_SLIDE_STOP, "butt_slide_stop", butt_slide_stop);
    table.register(ActionId::HOLD_BUTT_SLIDE_STOP, "hold_butt_slide_stop", hold_butt_slide_stop);
    table.register(ActionId::SLIDE_KICK_SLIDE_STOP, "slide_kick_slide_stop", slide_kick_slide_stop);
    table.register(ActionId::STOMACH_SLIDE_STOP, "stomach_slide_stop", stomach_slide_stop);
}

impl ActionContext<'_> {
    /// Jump, fall, walk or slide, in that order of priority.
    pub(crate) fn check_common_action_exits(&mut self) -> bool {
        if self.has_input(InputFlags::A_PRESSED) {
            return self.set_action(ActionId::JUMP, 0);
        }
        if self.has_input(InputFlags::OFF_FLOOR) {
            return self.set_action(ActionId::FREEFALL, 0);
        }
        if self.has_input(InputFlags::NONZERO_ANALOG) {
            return self.set_action(ActionId::WALKING, 0);
        }
        if self.has_input(InputFlags::ABOVE_SLIDE) {
            return self.set_action(ActionId::BEGIN_SLIDING, 0);
        }
        false
    }

    fn check_common_holding_action_exits(&mut self) -> bool {
        if self.has_input(InputFlags::A_PRESSED) {
            return self.set_jumping_action(ActionId::HOLD_JUMP, 0);
        }
        if self.has_input(InputFlags::OFF_FLOOR) {
            return self.set_action(ActionId::HOLD_FREEFALL, 0);
        }
        if self.has_input(InputFlags::NONZERO_ANALOG) {
            return self.set_action(ActionId::HOLD_WALKING, 0);
        }
        if self.has_input(InputFlags::ABOVE_SLIDE) {
            return self.set_action(ActionId::HOLD_BEGIN_SLIDING, 0);
        }
        false
    }

    fn check_stomped(&mut self) -> bool {
        self.has_input(InputFlags::STOMPED) && self.drop_and_set_action(ActionId::SHOCKWAVE_BOUNCE, 0)
    }

    fn check_common_idle_cancels(&mut self) -> bool {
        self.drop_held_object();

        if self.floor_normal().y < COS73 {
            return self.push_off_steep_floor(ActionId::FREEFALL, 0);
        }
        if self.check_stomped() {
            return true;
        }
        if self.has_input(InputFlags::A_PRESSED) {
            return self.set_jumping_action(ActionId::JUMP, 0);
        }
        if self.has_input(InputFlags::OFF_FLOOR) {
            return self.set_action(ActionId::FREEFALL, 0);
        }
        if self.has_input(InputFlags::ABOVE_SLIDE) {
            return self.set_action(ActionId::BEGIN_SLIDING, 0);
        }
        if self.has_input(InputFlags::FIRST_PERSON) {
            return self.set_action(ActionId::FIRST_PERSON, 0);
        }
        if self.has_input(InputFlags::NONZERO_ANALOG) {
            self.avatar.face_angle.yaw = self.avatar.intended_yaw;
            return self.set_action(ActionId::WALKING, 0);
        }
        if self.has_input(InputFlags::B_PRESSED) {
            return self.set_action(ActionId::PUNCHING, 0);
        }
        if self.has_input(InputFlags::Z_DOWN) {
            return self.set_action(ActionId::START_CROUCHING, 0);
        }
        false
    }

    fn check_common_hold_idle_cancels(&mut self) -> bool {
        if self.floor_normal().y < COS73 {
            return self.push_off_steep_floor(ActionId::HOLD_FREEFALL, 0);
        }
        if self.check_stomped() {
            return true;
        }
        if self.holding_dropped() {
            return self.drop_and_set_action(ActionId::IDLE, 0);
        }
        if self.has_input(InputFlags::A_PRESSED) {
            return self.set_jumping_action(ActionId::HOLD_JUMP, 0);
        }
        if self.has_input(InputFlags::OFF_FLOOR) {
            return self.set_action(ActionId::HOLD_FREEFALL, 0);
        }
        if self.has_input(InputFlags::ABOVE_SLIDE) {
            return self.set_action(ActionId::HOLD_BEGIN_SLIDING, 0);
        }
        if self.has_input(InputFlags::NONZERO_ANALOG) {
            self.avatar.face_angle.yaw = self.avatar.intended_yaw;
            return self.set_action(ActionId::HOLD_WALKING, 0);
        }
        if self.has_input(InputFlags::B_PRESSED) {
            return self.set_action(ActionId::THROWING, 0);
        }
        if self.has_input(InputFlags::Z_DOWN) {
            return self.drop_and_set_action(ActionId::START_CROUCHING, 0);
        }
        false
    }

    /// Exits from a landing stop. `jump` is the action an A press starts;
    /// `None` chains from the landing instead.
    fn check_common_landing_cancels(&mut self, jump: Option<ActionId>) -> bool {
        if self.has_input(InputFlags::STOMPED) {
            return self.set_action(ActionId::SHOCKWAVE_BOUNCE, 0);
        }
        if self.has_input(InputFlags::FIRST_PERSON) {
            return self.set_action(ActionId::IDLE, 0);
        }
        if self.has_input(InputFlags::A_PRESSED) {
            return match jump {
                Some(action) => self.set_jumping_action(action, 0),
                None => self.set_jump_from_landing(),
            };
        }
        if self.has_input(EXIT_INPUTS) {
            return self.check_common_action_exits();
        }
        if self.has_input(InputFlags::B_PRESSED) {
            return self.set_action(ActionId::PUNCHING, 0);
        }
        false
    }

    /// Stand still, play `anim` and switch to `action` once it ends.
    fn animated_stationary_step(&mut self, anim: AnimId, action: ActionId) -> bool {
        self.stationary_ground_step();
        self.set_anim(anim);
        self.anim_at_end() && self.set_action(action, 0)
    }
}

fn idle(ctx: &mut ActionContext<'_>) -> bool {
    if ctx.avatar.quicksand_depth > 30.0 {
        return ctx.set_action(ActionId::IN_QUICKSAND, 0);
    }
    // Arg bit 0 marks an idle entered from leaning on a wall.
    let against_wall = ctx.avatar.action_arg & 1 != 0;
    if !against_wall && ctx.avatar.health < 0x300 {
        return ctx.set_action(ActionId::PANTING, 0);
    }
    if ctx.check_common_idle_cancels() {
        return true;
    }

    let anim = if against_wall {
        AnimId::StandAgainstWall
    } else {
        match ctx.avatar.action_state {
            0 => AnimId::IdleHeadLeft,
            1 => AnimId::IdleHeadRight,
            _ => AnimId::IdleHeadCenter,
        }
    };
    ctx.set_anim(anim);

    if ctx.anim_at_end() {
        ctx.avatar.action_state = (ctx.avatar.action_state + 1) % IDLE_HEAD_PHASES;
    }

    ctx.stationary_ground_step();
    false
}

fn panting(ctx: &mut ActionContext<'_>) -> bool {
    if ctx.check_stomped() {
        return true;
    }
    if ctx.avatar.health >= 0x500 {
        return ctx.set_action(ActionId::IDLE, 0);
    }
    if ctx.check_common_idle_cancels() {
        return true;
    }

    if ctx.set_anim(AnimId::WalkPanting) == 1 {
        ctx.signals.sound(Sound::Panting);
    }
    ctx.stationary_ground_step();
    ctx.avatar.body.eye_state = EyeState::HalfClosed;
    false
}

fn in_quicksand(ctx: &mut ActionContext<'_>) -> bool {
    if ctx.avatar.quicksand_depth < 30.0 {
        return ctx.set_action(ActionId::IDLE, 0);
    }
    if ctx.check_common_idle_cancels() {
        return true;
    }

    let anim = if ctx.avatar.quicksand_depth > 70.0 {
        AnimId::DyingInQuicksand
    } else {
        AnimId::IdleInQuicksand
    };
    ctx.set_anim(anim);
    ctx.stationary_ground_step();
    false
}

fn hold_idle(ctx: &mut ActionContext<'_>) -> bool {
    if ctx.avatar.held_obj.is_some_and(|obj| obj.jumping_box) {
        return ctx.set_action(ActionId::CRAZY_BOX_BOUNCE, 0);
    }
    if ctx.holding_dropped() {
        return ctx.drop_and_set_action(ActionId::IDLE, 0);
    }
    if ctx.avatar.quicksand_depth > 30.0 {
        return ctx.drop_and_set_action(ActionId::IN_QUICKSAND, 0);
    }
    if ctx.check_common_hold_idle_cancels() {
        return true;
    }

    ctx.stationary_ground_step();
    ctx.set_anim(AnimId::IdleWithLightObj);
    false
}

fn hold_heavy_idle(ctx: &mut ActionContext<'_>) -> bool {
    if ctx.check_stomped() {
        return true;
    }
    if ctx.has_input(InputFlags::OFF_FLOOR) {
        return ctx.drop_and_set_action(ActionId::FREEFALL, 0);
    }
    if ctx.has_input(InputFlags::ABOVE_SLIDE) {
        return ctx.drop_and_set_action(ActionId::BEGIN_SLIDING, 0);
    }
    if ctx.has_input(InputFlags::NONZERO_ANALOG) {
        return ctx.set_action(ActionId::HOLD_HEAVY_WALKING, 0);
    }
    if ctx.has_input(InputFlags::B_PRESSED) {
        return ctx.set_action(ActionId::HEAVY_THROW, 0);
    }

    ctx.stationary_ground_step();
    ctx.set_anim(AnimId::IdleHeavyObj);
    false
}

fn standing_against_wall(ctx: &mut ActionContext<'_>) -> bool {
    if ctx.check_stomped() {
        return true;
    }
    if ctx.has_input(EXIT_INPUTS) {
        return ctx.check_common_action_exits();
    }
    if ctx.has_input(InputFlags::FIRST_PERSON) {
        return ctx.set_action(ActionId::IDLE, 0);
    }
    if ctx.has_input(InputFlags::B_PRESSED) {
        return ctx.set_action(ActionId::PUNCHING, 0);
    }

    ctx.set_anim(AnimId::StandAgainstWall);
    ctx.stationary_ground_step();
    false
}

fn first_person(ctx: &mut ActionContext<'_>) -> bool {
    let interrupted =
        ctx.has_input(InputFlags::OFF_FLOOR | InputFlags::ABOVE_SLIDE | InputFlags::STOMPED);

    if ctx.avatar.action_state == 0 {
        ctx.avatar.action_state = 1;
    } else if !ctx.has_input(InputFlags::FIRST_PERSON) || interrupted {
        ctx.reset_camera();
        return ctx.set_action(ActionId::IDLE, 0);
    }

    ctx.stationary_ground_step();
    ctx.set_anim(AnimId::FirstPerson);
    false
}

fn shockwave_bounce(ctx: &mut ActionContext<'_>) -> bool {
    if ctx.avatar.interact_status.has(InteractStatus::SHOCKWAVE) {
        return ctx.hurt_and_set_action(ActionId::SHOCKED, 0, 4);
    }

    ctx.avatar.action_timer += 1;
    if ctx.avatar.action_timer == SHOCKWAVE_BOUNCE_FRAMES {
        return ctx.set_action(ActionId::IDLE, 0);
    }

    let timer = ctx.avatar.action_timer;
    let phase = Angle::from_i32(i32::from(timer % 16) << 12);
    let amplitude = (6.0 - f32::from(timer / 8)) * 8.0 + 4.0;

    ctx.set_forward_vel(0.0);
    let m = &mut *ctx.avatar;
    m.vel = Vec3::ZERO;
    m.pos.y = m.floor_height + (phase.sin() * amplitude).abs();
    m.render.pos = m.pos;
    m.render.angle.pitch = Angle::ZERO;
    m.render.angle.yaw = m.face_angle.yaw;
    m.render.angle.roll = Angle::ZERO;

    ctx.set_anim(AnimId::APose);
    false
}

// ============================================================================
// Crouching
// ============================================================================

fn check_crouch_cancels(ctx: &mut ActionContext<'_>) -> bool {
    if ctx.check_stomped() {
        return true;
    }
    if ctx.has_input(InputFlags::A_PRESSED) {
        return ctx.set_jumping_action(ActionId::BACKFLIP, 0);
    }
    if ctx.has_input(InputFlags::OFF_FLOOR) {
        return ctx.set_action(ActionId::FREEFALL, 0);
    }
    if ctx.has_input(InputFlags::ABOVE_SLIDE) {
        return ctx.set_action(ActionId::BEGIN_SLIDING, 0);
    }
    false
}

fn crouching(ctx: &mut ActionContext<'_>) -> bool {
    if check_crouch_cancels(ctx) {
        return true;
    }
    if ctx.has_input(InputFlags::FIRST_PERSON) || !ctx.has_input(InputFlags::Z_DOWN) {
        return ctx.set_action(ActionId::STOP_CROUCHING, 0);
    }
    if ctx.has_input(InputFlags::NONZERO_ANALOG) {
        return ctx.set_action(ActionId::START_CRAWLING, 0);
    }
    if ctx.has_input(InputFlags::B_PRESSED) {
        return ctx.set_action(ActionId::PUNCHING, 9);
    }

    ctx.stationary_ground_step();
    ctx.set_anim(AnimId::Crouching);
    false
}

fn start_crouching(ctx: &mut ActionContext<'_>) -> bool {
    if check_crouch_cancels(ctx) {
        return true;
    }

    ctx.stationary_ground_step();
    ctx.set_anim(AnimId::StartCrouching);
    if ctx.anim_past_end() {
        ctx.set_action(ActionId::CROUCHING, 0);
    }
    false
}

fn stop_crouching(ctx: &mut ActionContext<'_>) -> bool {
    if check_crouch_cancels(ctx) {
        return true;
    }

    ctx.stationary_ground_step();
    ctx.set_anim(AnimId::StopCrouching);
    if ctx.anim_past_end() {
        ctx.set_action(ActionId::IDLE, 0);
    }
    false
}

fn check_crawl_cancels(ctx: &mut ActionContext<'_>) -> bool {
    if ctx.check_stomped() {
        return true;
    }
    if ctx.has_input(InputFlags::OFF_FLOOR) {
        return ctx.set_action(ActionId::FREEFALL, 0);
    }
    if ctx.has_input(InputFlags::ABOVE_SLIDE) {
        return ctx.set_action(ActionId::BEGIN_SLIDING, 0);
    }
    false
}

fn start_crawling(ctx: &mut ActionContext<'_>) -> bool {
    if ctx.has_input(InputFlags::FIRST_PERSON) {
        return ctx.set_action(ActionId::STOP_CROUCHING, 0);
    }
    if check_crawl_cancels(ctx) {
        return true;
    }

    ctx.stationary_ground_step();
    ctx.set_anim(AnimId::StartCrawling);
    if ctx.anim_past_end() {
        ctx.set_action(ActionId::CRAWLING, 0);
    }
    false
}

fn stop_crawling(ctx: &mut ActionContext<'_>) -> bool {
    if check_crawl_cancels(ctx) {
        return true;
    }

    ctx.stationary_ground_step();
    ctx.set_anim(AnimId::StopCrawling);
    if ctx.anim_past_end() {
        ctx.set_action(ActionId::CROUCHING, 0);
    }
    false
}

fn punching(ctx: &mut ActionContext<'_>) -> bool {
    if ctx.check_stomped() {
        return true;
    }
    if ctx.has_input(EXIT_INPUTS) {
        return ctx.check_common_action_exits();
    }
    if ctx.avatar.action_state == 0 && ctx.has_input(InputFlags::A_DOWN) {
        return ctx.set_action(ActionId::JUMP_KICK, 0);
    }

    ctx.avatar.action_state = 1;
    if ctx.avatar.action_arg == 0 {
        ctx.avatar.action_timer = 7;
    }

    let timer = usize::from(ctx.avatar.action_timer).min(PUNCH_FORWARD_VEL.len() - 1);
    ctx.set_forward_vel(PUNCH_FORWARD_VEL[timer]);
    if ctx.avatar.action_timer > 0 {
        ctx.avatar.action_timer -= 1;
    }

    ctx.update_punch_sequence();
    ctx.perform_ground_step();
    false
}

// ============================================================================
// Landing stops
// ============================================================================

fn jump_land_stop(ctx: &mut ActionContext<'_>) -> bool {
    if ctx.check_common_landing_cancels(None) {
        return true;
    }
    ctx.animated_stationary_step(AnimId::LandFromSingleJump, ActionId::IDLE);
    false
}

fn double_jump_land_stop(ctx: &mut ActionContext<'_>) -> bool {
    if ctx.check_common_landing_cancels(None) {
        return true;
    }
    ctx.animated_stationary_step(AnimId::LandFromDoubleJump, ActionId::IDLE);
    false
}

fn freefall_land_stop(ctx: &mut ActionContext<'_>) -> bool {
    if ctx.check_common_landing_cancels(None) {
        return true;
    }
    ctx.animated_stationary_step(AnimId::GeneralLand, ActionId::IDLE);
    false
}

fn side_flip_land_stop(ctx: &mut ActionContext<'_>) -> bool {
    if ctx.check_common_landing_cancels(None) {
        return true;
    }
    ctx.animated_stationary_step(AnimId::SlideflipLand, ActionId::IDLE);
    ctx.avatar.render.angle.yaw += Angle::HALF;
    false
}

fn triple_jump_land_stop(ctx: &mut ActionContext<'_>) -> bool {
    if ctx.check_common_landing_cancels(Some(ActionId::JUMP)) {
        return true;
    }
    ctx.animated_stationary_step(AnimId::TripleJumpLand, ActionId::IDLE);
    false
}

fn backflip_land_stop(ctx: &mut ActionContext<'_>) -> bool {
    if !ctx.has_input(InputFlags::Z_DOWN) || ctx.anim_frame() >= 6 {
        ctx.avatar.input.set(InputFlags::A_PRESSED, false);
    }
    if ctx.check_common_landing_cancels(Some(ActionId::BACKFLIP)) {
        return true;
    }
    ctx.animated_stationary_step(AnimId::TripleJumpLand, ActionId::IDLE);
    false
}

fn long_jump_land_stop(ctx: &mut ActionContext<'_>) -> bool {
    ctx.avatar.input.set(InputFlags::B_PRESSED, false);
    if ctx.check_common_landing_cancels(Some(ActionId::JUMP)) {
        return true;
    }

    let anim = if ctx.avatar.long_jump_is_slow {
        AnimId::CrouchFromSlowLongjump
    } else {
        AnimId::CrouchFromFastLongjump
    };
    ctx.animated_stationary_step(anim, ActionId::CROUCHING);
    false
}

fn hold_land_stop(ctx: &mut ActionContext<'_>, anim: AnimId) -> bool {
    if ctx.holding_dropped() {
        return ctx.drop_and_set_action(ActionId::IDLE, 0);
    }
    if ctx.has_input(InputFlags::STOMPED) {
        return ctx.drop_and_set_action(ActionId::SHOCKWAVE_BOUNCE, 0);
    }
    if ctx.has_input(EXIT_INPUTS) {
        return ctx.check_common_holding_action_exits();
    }
    if ctx.has_input(InputFlags::B_PRESSED) {
        return ctx.set_action(ActionId::THROWING, 0);
    }

    ctx.animated_stationary_step(anim, ActionId::HOLD_IDLE);
    false
}

fn hold_jump_land_stop(ctx: &mut ActionContext<'_>) -> bool {
    hold_land_stop(ctx, AnimId::JumpLandWithLightObj)
}

fn hold_freefall_land_stop(ctx: &mut ActionContext<'_>) -> bool {
    hold_land_stop(ctx, AnimId::FallLandWithLightObj)
}

fn lava_boost_land(ctx: &mut ActionContext<'_>) -> bool {
    ctx.avatar
        .input
        .set(InputFlags::FIRST_PERSON | InputFlags::B_PRESSED, false);
    if ctx.check_common_landing_cancels(None) {
        return true;
    }
    ctx.animated_stationary_step(AnimId::StandUpFromLavaBoost, ActionId::IDLE);
    false
}

fn twirl_land(ctx: &mut ActionContext<'_>) -> bool {
    ctx.avatar.action_state = 1;
    if ctx.check_stomped() {
        return true;
    }
    if ctx.has_input(InputFlags::FIRST_PERSON) {
        return ctx.set_action(ActionId::IDLE, 0);
    }

    ctx.stationary_ground_step();
    ctx.set_anim(AnimId::TwirlLand);

    let m = &mut *ctx.avatar;
    if m.angle_vel.yaw.0 > 0 {
        m.angle_vel.yaw = Angle::from_i32(m.angle_vel.yaw.as_i32().saturating_sub(0x400).max(0));
        m.twirl_yaw += m.angle_vel.yaw;
    }
    m.render.angle.yaw += m.twirl_yaw;

    if ctx.anim_at_end() && ctx.avatar.angle_vel.yaw == Angle::ZERO {
        let twirl = ctx.avatar.twirl_yaw;
        ctx.avatar.face_angle.yaw += twirl;
        ctx.set_action(ActionId::IDLE, 0);
    }
    false
}

fn ground_pound_land(ctx: &mut ActionContext<'_>) -> bool {
    ctx.avatar.action_state = 1;
    if ctx.check_stomped() {
        return true;
    }
    if ctx.has_input(InputFlags::FIRST_PERSON) {
        return ctx.set_action(ActionId::BUTT_SLIDE_STOP, 0);
    }
    if ctx.has_input(EXIT_INPUTS) {
        return ctx.check_common_action_exits();
    }

    ctx.animated_stationary_step(AnimId::GroundPoundLanding, ActionId::BUTT_SLIDE_STOP);
    false
}

fn air_throw_land(ctx: &mut ActionContext<'_>) -> bool {
    if ctx.check_stomped() {
        return true;
    }

    ctx.avatar.action_timer += 1;
    if ctx.avatar.action_timer == 4 && ctx.avatar.held_obj.take().is_some() {
        ctx.signals.push(Signal::ThrowHeldObject);
    }

    ctx.animated_stationary_step(AnimId::ThrowLightObject, ActionId::IDLE);
    false
}

// ============================================================================
// Slide stops
// ============================================================================

fn braking_stop(ctx: &mut ActionContext<'_>) -> bool {
    if ctx.check_stomped() {
        return true;
    }
    if ctx.has_input(InputFlags::OFF_FLOOR) {
        return ctx.set_action(ActionId::FREEFALL, 0);
    }
    if ctx.has_input(InputFlags::B_PRESSED) {
        return ctx.set_action(ActionId::PUNCHING, 0);
    }
    if !ctx.has_input(InputFlags::FIRST_PERSON) && ctx.has_input(EXIT_INPUTS) {
        return ctx.check_common_action_exits();
    }

    ctx.animated_stationary_step(AnimId::StopSkid, ActionId::IDLE);
    false
}

fn butt_slide_stop(ctx: &mut ActionContext<'_>) -> bool {
    if ctx.check_stomped() {
        return true;
    }
    if ctx.has_input(EXIT_INPUTS) {
        return ctx.check_common_action_exits();
    }

    ctx.animated_stationary_step(AnimId::StopSlide, ActionId::IDLE);
    if ctx.anim_frame() == 6 {
        ctx.play_landing_sound(Sound::TerrainLanding);
    }
    false
}

fn hold_butt_slide_stop(ctx: &mut ActionContext<'_>) -> bool {
    if ctx.holding_dropped() {
        return ctx.drop_and_set_action(ActionId::IDLE, 0);
    }
    if ctx.check_stomped() {
        return true;
    }
    if ctx.has_input(EXIT_INPUTS) {
        return ctx.check_common_holding_action_exits();
    }
    if ctx.has_input(InputFlags::B_PRESSED) {
        return ctx.set_action(ActionId::THROWING, 0);
    }

    ctx.animated_stationary_step(AnimId::StopSlideLightObj, ActionId::HOLD_IDLE);
    false
}

fn slide_kick_slide_stop(ctx: &mut ActionContext<'_>) -> bool {
    if ctx.check_stomped() {
        return true;
    }
    if ctx.has_input(InputFlags::OFF_FLOOR) {
        return ctx.drop_and_set_action(ActionId::FREEFALL, 0);
    }

    ctx.animated_stationary_step(AnimId::SlideKickStop, ActionId::CROUCHING);
    false
}

fn stomach_slide_stop(ctx: &mut ActionContext<'_>) -> bool {
    if ctx.check_stomped() {
        return true;
    }
    if ctx.has_input(InputFlags::OFF_FLOOR) {
        return ctx.set_action(ActionId::FREEFALL, 0);
    }
    if ctx.has_input(InputFlags::ABOVE_SLIDE) {
        return ctx.set_action(ActionId::BEGIN_SLIDING, 0);
    }

    ctx.animated_stationary_step(AnimId::SlowLandFromDive, ActionId::IDLE);
    false
}

#[cfg(test)]
mod tests {
    use super::super::super::context::tests::{flat_world, sloped_world, Harness};
    use super::super::super::state::HeldObject;
    use super::*;
    use crate::collision::SurfaceType;

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

    fn standing(action: ActionId) -> Harness {
        let mut h = Harness::new(flat_world(SurfaceType::DEFAULT));
        h.avatar.action = action;
        h
    }

    #[test]
    fn test_idle_starts_walking_toward_stick() {
        let mut h = standing(ActionId::IDLE);
        h.avatar.intended_yaw = Angle(0x2000);
        h.avatar.intended_mag = 20.0;
        h.avatar.input.set(InputFlags::NONZERO_ANALOG, true);

        assert!(run(&mut h));
        assert_eq!(h.avatar.action, ActionId::WALKING);
        assert_eq!(h.avatar.face_angle.yaw, Angle(0x2000));
        // Walking starts at the stick speed, capped at 8.
        assert_eq!(h.avatar.forward_vel, 8.0);
    }

    #[test]
    fn test_idle_on_steep_floor_slides_off() {
        let mut h = Harness::new(sloped_world(SurfaceType::DEFAULT, 4.0));
        h.avatar.action = ActionId::IDLE;
        run(&mut h);
        assert_eq!(h.avatar.action, ActionId::FREEFALL);
    }

    #[test]
    fn test_idle_hands_off_to_quicksand_and_panting() {
        let mut h = standing(ActionId::IDLE);
        h.avatar.quicksand_depth = 40.0;
        assert!(idle(&mut h.ctx()));
        assert_eq!(h.avatar.action, ActionId::IN_QUICKSAND);

        let mut h = standing(ActionId::IDLE);
        h.avatar.health = 0x200;
        run(&mut h);
        assert_eq!(h.avatar.action, ActionId::PANTING);

        h.avatar.health = 0x600;
        run(&mut h);
        assert_eq!(h.avatar.action, ActionId::IDLE);
    }

    #[test]
    fn test_idle_cycles_head_turns() {
        let mut h = standing(ActionId::IDLE);
        for _ in 0..200 {
            run(&mut h);
        }
        assert_eq!(h.avatar.action, ActionId::IDLE);
        assert!(h.avatar.action_state < IDLE_HEAD_PHASES);
    }

    #[test]
    fn test_landing_stop_plays_out_to_idle() {
        let mut h = standing(ActionId::JUMP_LAND_STOP);
        assert_eq!(run_until_change(&mut h, 30), ActionId::IDLE);

        let mut h = standing(ActionId::LONG_JUMP_LAND_STOP);
        assert_eq!(run_until_change(&mut h, 30), ActionId::CROUCHING);
    }

    #[test]
    fn test_landing_stop_a_press_jumps() {
        let mut h = standing(ActionId::TRIPLE_JUMP_LAND_STOP);
        h.avatar.input.set(InputFlags::A_PRESSED, true);
        run(&mut h);
        assert_eq!(h.avatar.action, ActionId::JUMP);

        // Backflips need Z still held.
        let mut h = standing(ActionId::BACKFLIP_LAND_STOP);
        h.avatar.input.set(InputFlags::A_PRESSED, true);
        run(&mut h);
        assert_eq!(h.avatar.action, ActionId::BACKFLIP_LAND_STOP);
    }

    #[test]
    fn test_crouch_release_and_breakdance() {
        let mut h = standing(ActionId::CROUCHING);
        run(&mut h);
        assert_eq!(h.avatar.action, ActionId::STOP_CROUCHING);

        let mut h = standing(ActionId::CROUCHING);
        h.avatar.input.set(InputFlags::Z_DOWN, true);
        h.avatar.input.set(InputFlags::B_PRESSED, true);
        run(&mut h);
        assert_eq!(h.avatar.action, ActionId::PUNCHING);
        assert_eq!(h.avatar.action_arg, 9);

        h.avatar.input = InputFlags::default();
        assert_eq!(run_until_change(&mut h, 60), ActionId::CROUCHING);
    }

    #[test]
    fn test_crouch_a_press_backflips() {
        let mut h = standing(ActionId::CROUCHING);
        h.avatar.input.set(InputFlags::Z_DOWN, true);
        h.avatar.input.set(InputFlags::A_PRESSED, true);
        run(&mut h);
        assert_eq!(h.avatar.action, ActionId::BACKFLIP);
        assert_eq!(h.avatar.forward_vel, -16.0);
    }

    #[test]
    fn test_standing_punch_lunges_then_returns_to_idle() {
        let mut h = standing(ActionId::PUNCHING);
        run(&mut h);
        assert_eq!(h.avatar.forward_vel, 10.0);
        assert_eq!(h.avatar.action_timer, 6);
        assert_eq!(run_until_change(&mut h, 60), ActionId::IDLE);
    }

    #[test]
    fn test_air_throw_land_releases_object() {
        let mut h = standing(ActionId::AIR_THROW_LAND);
        h.avatar.held_obj = Some(HeldObject::new(4));
        for _ in 0..3 {
            run(&mut h);
        }
        assert!(h.avatar.held_obj.is_some());
        run(&mut h);
        assert!(h.avatar.held_obj.is_none());
        assert!(h.signals.contains(Signal::ThrowHeldObject));
    }

    #[test]
    fn test_twirl_land_spins_down_before_idle() {
        let mut h = standing(ActionId::TWIRL_LAND);
        h.avatar.angle_vel.yaw = Angle(0x1000);

        run(&mut h);
        assert_eq!(h.avatar.angle_vel.yaw, Angle(0xC00));
        assert_eq!(h.avatar.twirl_yaw, Angle(0xC00));

        assert_eq!(run_until_change(&mut h, 60), ActionId::IDLE);
        assert_eq!(h.avatar.angle_vel.yaw, Angle::ZERO);
        assert_eq!(h.avatar.face_angle.yaw, h.avatar.twirl_yaw);
    }

    #[test]
    fn test_shockwave_bounce_settles() {
        let mut h = standing(ActionId::SHOCKWAVE_BOUNCE);
        run(&mut h);
        assert!(h.avatar.pos.y >= h.avatar.floor_height);
        assert_eq!(run_until_change(&mut h, 60), ActionId::IDLE);
    }

    #[test]
    fn test_stops_yield_to_analog_input() {
        for action in [ActionId::BRAKING_STOP, ActionId::BUTT_SLIDE_STOP, ActionId::GROUND_POUND_LAND] {
            let mut h = standing(action);
            h.avatar.intended_mag = 10.0;
            h.avatar.input.set(InputFlags::NONZERO_ANALOG, true);
            run(&mut h);
            assert_eq!(h.avatar.action, ActionId::WALKING, "from {:#010x}", action.0);
        }
    }

    #[test]
    fn test_hold_idle_drop_and_crazy_box() {
        let mut h = standing(ActionId::HOLD_IDLE);
        let mut crate_box = HeldObject::new(2);
        crate_box.jumping_box = true;
        h.avatar.held_obj = Some(crate_box);
        run(&mut h);
        assert_eq!(h.avatar.action, ActionId::CRAZY_BOX_BOUNCE);

        let mut h = standing(ActionId::HOLD_IDLE);
        h.avatar.held_obj = Some(HeldObject::new(2));
        h.avatar.interact_status = InteractStatus(InteractStatus::DROP_OBJECT);
        run(&mut h);
        assert_eq!(h.avatar.action, ActionId::IDLE);
        assert!(h.avatar.held_obj.is_none());
    }
}
