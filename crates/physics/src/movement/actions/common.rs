//! Cancels checked before every handler of a group.

use crate::collision::SurfaceType;
use crate::math::{Angle, Orientation};

use super::super::action::ActionId;
use super::super::context::ActionContext;
use super::super::state::{AvatarFlags, InputFlags};

impl ActionContext<'_> {
    /// Hand the avatar to the swimming code after dropping below the water
    /// surface.
    pub(crate) fn set_water_plunge_action(&mut self) -> bool {
        let m = &mut *self.avatar;
        m.forward_vel /= 4.0;
        m.vel.y /= 2.0;
        m.pos.y = m.water_level - 100.0;
        m.face_angle.roll = Angle::ZERO;
        m.angle_vel = Orientation::ZERO;
        if !m.action.has(ActionId::FLAG_DIVING) {
            m.face_angle.pitch = Angle::ZERO;
        }
        self.set_action(ActionId::WATER_PLUNGE, 0)
    }

    fn below_water_surface(&self) -> bool {
        self.avatar.pos.y < self.avatar.water_level - 100.0
    }

    pub(crate) fn check_common_airborne_cancels(&mut self) -> bool {
        if self.below_water_surface() {
            return self.set_water_plunge_action();
        }

        if self.has_input(InputFlags::SQUISHED) {
            return self.drop_and_set_action(ActionId::SQUISHED, 0);
        }

        let wind_resisted =
            self.config.wind_resistant_metal_cap && self.avatar.flags.has(AvatarFlags::METAL_CAP);
        if !wind_resisted
            && self.floor_type() == SurfaceType::VERTICAL_WIND
            && self.avatar.action.has(ActionId::FLAG_ALLOW_VERTICAL_WIND_ACTION)
        {
            return self.drop_and_set_action(ActionId::VERTICAL_WIND, 0);
        }

        self.avatar.quicksand_depth = 0.0;
        false
    }

    pub(crate) fn check_common_moving_cancels(&mut self) -> bool {
        if self.below_water_surface() {
            return self.set_water_plunge_action();
        }

        let invulnerable = self.avatar.action.is_invulnerable();
        if !invulnerable && self.has_input(InputFlags::STOMPED) {
            return self.drop_and_set_action(ActionId::SHOCKWAVE_BOUNCE, 0);
        }

        if self.has_input(InputFlags::SQUISHED) {
            return self.drop_and_set_action(ActionId::SQUISHED, 0);
        }

        if !invulnerable && self.avatar.is_dead() {
            return self.drop_and_set_action(ActionId::STANDING_DEATH, 0);
        }

        false
    }

    pub(crate) fn check_common_stationary_cancels(&mut self) -> bool {
        if self.below_water_surface() {
            return self.set_water_plunge_action();
        }

        if self.has_input(InputFlags::SQUISHED) {
            return self.drop_and_set_action(ActionId::SQUISHED, 0);
        }

        if self.avatar.is_dead() {
            return self.drop_and_set_action(ActionId::STANDING_DEATH, 0);
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::super::super::context::tests::{flat_world, Harness};
    use super::*;

    #[test]
    fn test_water_plunge_slows_and_snaps_below_surface() {
        let mut h = Harness::new(flat_world(SurfaceType::DEFAULT));
        h.avatar.action = ActionId::JUMP;
        h.avatar.water_level = 500.0;
        h.avatar.pos.y = 350.0;
        h.avatar.forward_vel = 20.0;
        h.avatar.vel.y = -30.0;

        assert!(h.ctx().check_common_airborne_cancels());
        assert_eq!(h.avatar.action, ActionId::WATER_PLUNGE);
        assert_eq!(h.avatar.pos.y, 400.0);
        assert_eq!(h.avatar.forward_vel, 5.0);
        assert_eq!(h.avatar.vel.y, -15.0);
    }

    #[test]
    fn test_vertical_wind_catches_allowed_actions() {
        let mut h = Harness::new(flat_world(SurfaceType::VERTICAL_WIND));
        h.avatar.action = ActionId::JUMP;
        assert!(h.ctx().check_common_airborne_cancels());
        assert_eq!(h.avatar.action, ActionId::VERTICAL_WIND);

        // Ground pounds punch through the updraft.
        let mut h = Harness::new(flat_world(SurfaceType::VERTICAL_WIND));
        h.avatar.action = ActionId::GROUND_POUND;
        h.avatar.quicksand_depth = 5.0;
        assert!(!h.ctx().check_common_airborne_cancels());
        assert_eq!(h.avatar.quicksand_depth, 0.0);
    }

    #[test]
    fn test_metal_cap_resists_updraft_when_configured() {
        let mut h = Harness::new(flat_world(SurfaceType::VERTICAL_WIND));
        h.config.wind_resistant_metal_cap = true;
        h.avatar.flags.set(AvatarFlags::METAL_CAP, true);
        h.avatar.action = ActionId::JUMP;
        assert!(!h.ctx().check_common_airborne_cancels());
    }

    #[test]
    fn test_stomp_ignored_while_invulnerable() {
        let mut h = Harness::new(flat_world(SurfaceType::DEFAULT));
        h.avatar.input.set(InputFlags::STOMPED, true);

        h.avatar.action = ActionId::BACKWARD_GROUND_KB;
        assert!(!h.ctx().check_common_moving_cancels());

        h.avatar.action = ActionId::WALKING;
        assert!(h.ctx().check_common_moving_cancels());
        assert_eq!(h.avatar.action, ActionId::SHOCKWAVE_BOUNCE);
    }

    #[test]
    fn test_low_health_kills_standing_avatar() {
        let mut h = Harness::new(flat_world(SurfaceType::DEFAULT));
        h.avatar.health = 0xFF;
        assert!(h.ctx().check_common_stationary_cancels());
        assert_eq!(h.avatar.action, ActionId::STANDING_DEATH);
    }
}
