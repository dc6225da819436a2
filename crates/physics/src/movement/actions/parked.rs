//! Actions owned by other systems.
//!
//! Swimming, cutscenes, object interactions and the automatic hang/ledge
//! actions are driven elsewhere. They are registered here so that the core
//! can transition into them; the avatar then waits in place until the owner
//! hands it back with [`AvatarState::force_action`].
//!
//! [`AvatarState::force_action`]: super::super::state::AvatarState::force_action

use super::super::action::ActionId;
use super::super::context::ActionContext;
use super::super::signal::Signal;
use super::ActionTable;

/// Owned by the swimming code.
const WATER: [(ActionId, &str); 4] = [
    (ActionId::WATER_IDLE, "water_idle"),
    (ActionId::WATER_PLUNGE, "water_plunge"),
    (ActionId::METAL_WATER_FALLING, "metal_water_falling"),
    (ActionId::HOLD_METAL_WATER_FALLING, "hold_metal_water_falling"),
];

/// Owned by the cutscene and damage scripts.
const CUTSCENE: [(ActionId, &str); 6] = [
    (ActionId::SPECIAL_DEATH_EXIT, "special_death_exit"),
    (ActionId::SHOCKED, "shocked"),
    (ActionId::SQUISHED, "squished"),
    (ActionId::HEAD_STUCK_IN_GROUND, "head_stuck_in_ground"),
    (ActionId::BUTT_STUCK_IN_GROUND, "butt_stuck_in_ground"),
    (ActionId::FEET_STUCK_IN_GROUND, "feet_stuck_in_ground"),
];

const DEATHS: [(ActionId, &str); 4] = [
    (ActionId::STANDING_DEATH, "standing_death"),
    (ActionId::QUICKSAND_DEATH, "quicksand_death"),
    (ActionId::DEATH_ON_STOMACH, "death_on_stomach"),
    (ActionId::DEATH_ON_BACK, "death_on_back"),
];

/// Owned by the hang and ledge code.
const AUTOMATIC: [(ActionId, &str); 3] = [
    (ActionId::START_HANGING, "start_hanging"),
    (ActionId::LEDGE_GRAB, "ledge_grab"),
    (ActionId::LEDGE_CLIMB_DOWN, "ledge_climb_down"),
];

/// Owned by the object interaction code.
const OBJECT: [(ActionId, &str); 6] = [
    (ActionId::GRABBED, "grabbed"),
    (ActionId::PICKING_UP, "picking_up"),
    (ActionId::DIVE_PICKING_UP, "dive_picking_up"),
    (ActionId::PLACING_DOWN, "placing_down"),
    (ActionId::THROWING, "throwing"),
    (ActionId::HEAVY_THROW, "heavy_throw"),
];

pub(super) fn register(table: &mut ActionTable) {
    for (action, name) in WATER.into_iter().chain(CUTSCENE).chain(AUTOMATIC).chain(OBJECT) {
        table.register(action, name, hold);
    }
    for (action, name) in DEATHS {
        table.register(action, name, dying);
    }
}

/// Wait for the owner to move the avatar on.
fn hold(ctx: &mut ActionContext<'_>) -> bool {
    ctx.avatar.action_timer = ctx.avatar.action_timer.saturating_add(1);
    false
}

/// Report the death once, then wait for the level to respawn the avatar.
fn dying(ctx: &mut ActionContext<'_>) -> bool {
    if ctx.avatar.action_timer == 0 {
        log::debug!("avatar died in action {:#010x}", ctx.avatar.action.0);
        ctx.signals.push(Signal::Death);
    }
    hold(ctx)
}

#[cfg(test)]
mod tests {
    use super::super::super::context::tests::{flat_world, Harness};
    use super::*;
    use crate::collision::SurfaceType;

    #[test]
    fn test_every_owned_action_is_registered() {
        let table = ActionTable::default();
        for (action, name) in WATER
            .into_iter()
            .chain(CUTSCENE)
            .chain(DEATHS)
            .chain(AUTOMATIC)
            .chain(OBJECT)
        {
            assert_eq!(table.get(action).map(|h| h.name), Some(name));
        }
    }

    #[test]
    fn test_parked_avatar_waits_for_owner() {
        let mut h = Harness::new(flat_world(SurfaceType::DEFAULT));
        h.avatar.action = ActionId::LEDGE_GRAB;
        let pos = h.avatar.pos;
        let table = ActionTable::default();

        for _ in 0..5 {
            assert!(!table.execute(&mut h.ctx()));
        }
        assert_eq!(h.avatar.action, ActionId::LEDGE_GRAB);
        assert_eq!(h.avatar.pos, pos);
        assert_eq!(h.avatar.action_timer, 5);

        h.avatar.force_action(ActionId::IDLE, 0);
        assert_eq!(h.avatar.action, ActionId::IDLE);
        assert_eq!(h.avatar.prev_action, ActionId::LEDGE_GRAB);
        assert_eq!(h.avatar.action_timer, 0);
    }

    #[test]
    fn test_death_reported_once() {
        let mut h = Harness::new(flat_world(SurfaceType::DEFAULT));
        h.avatar.action = ActionId::DEATH_ON_BACK;
        let table = ActionTable::default();

        for _ in 0..3 {
            table.execute(&mut h.ctx());
        }
        let deaths = h
            .signals
            .events
            .iter()
            .filter(|s| **s == Signal::Death)
            .count();
        assert_eq!(deaths, 1);
    }
}
