//! Action handlers and the table that dispatches them.
//!
//! Every action the avatar can be in maps to one [`ActionHandler`]. Before a
//! handler runs, the cancels for its group get a chance to take over (water
//! plunges, squishes, death, updrafts). A handler returns `true` when it
//! stopped early because it requested a transition.
//!
//! # Groups
//!
//! - [`airborne`]: jumps, falls, knockbacks, flying
//! - [`moving`]: walking, sliding, landings, ground knockbacks
//! - [`stationary`]: idling, crouching and the landing stops
//! - [`parked`]: actions owned by other systems (water, cutscenes, objects)

use std::collections::HashMap;

use super::action::{ActionGroup, ActionId};
use super::context::ActionContext;
use super::signal::ParticleFlags;
use super::state::InputFlags;

pub mod airborne;
mod common;
pub mod moving;
pub mod parked;
pub mod stationary;

/// Signature of an action body.
pub type ActionFn = fn(&mut ActionContext<'_>) -> bool;

/// A named action body.
#[derive(Clone, Copy)]
pub struct ActionHandler {
    pub name: &'static str,
    pub run: ActionFn,
}

impl std::fmt::Debug for ActionHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionHandler").field("name", &self.name).finish()
    }
}

/// Lookup from action id to handler.
#[derive(Debug, Clone)]
pub struct ActionTable {
    handlers: HashMap<ActionId, ActionHandler>,
}

impl Default for ActionTable {
    /// The full table: every airborne, moving and stationary action plus
    /// the parked ones.
    fn default() -> Self {
        let mut table = Self::empty();
        airborne::register(&mut table);
        moving::register(&mut table);
        stationary::register(&mut table);
        parked::register(&mut table);
        table
    }
}

impl ActionTable {
    /// A table with no handlers.
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register `run` for `action`, replacing any previous handler.
    pub fn register(&mut self, action: ActionId, name: &'static str, run: ActionFn) {
        if self
            .handlers
            .insert(action, ActionHandler { name, run })
            .is_some()
        {
            log::debug!("replaced handler for action {:#010x} ({})", action.0, name);
        }
    }

    pub fn get(&self, action: ActionId) -> Option<&ActionHandler> {
        self.handlers.get(&action)
    }

    pub fn contains(&self, action: ActionId) -> bool {
        self.handlers.contains_key(&action)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Run one frame of the avatar's current action.
    ///
    /// Returns `true` when a cancel or the handler requested a transition.
    pub fn execute(&self, ctx: &mut ActionContext<'_>) -> bool {
        let action = ctx.avatar.action;

        let cancelled = match action.group() {
            ActionGroup::Airborne => {
                if ctx.check_common_airborne_cancels() {
                    true
                } else {
                    ctx.play_far_fall_sound();
                    false
                }
            }
            ActionGroup::Moving => {
                ctx.check_common_moving_cancels() || ctx.update_quicksand(0.25)
            }
            ActionGroup::Stationary => {
                ctx.check_common_stationary_cancels() || ctx.update_quicksand(0.5)
            }
            _ => false,
        };
        if cancelled {
            return true;
        }

        let Some(handler) = self.get(action) else {
            log::warn!("no handler for action {:#010x}", action.0);
            return false;
        };
        let cancelled = (handler.run)(ctx);

        // Ground movement through shallow water leaves a wake instead of dust.
        if !cancelled
            && action.group() == ActionGroup::Moving
            && ctx.has_input(InputFlags::IN_WATER)
        {
            ctx.signals.particle(ParticleFlags::WAVE_TRAIL);
            ctx.signals.particles.set(ParticleFlags::DUST, false);
        }
        cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::super::context::tests::{flat_world, Harness};
    use super::*;
    use crate::collision::SurfaceType;

    #[test]
    fn test_default_table_covers_core_actions() {
        let table = ActionTable::default();
        for action in [
            ActionId::JUMP,
            ActionId::VERTICAL_WIND,
            ActionId::WALKING,
            ActionId::LONG_JUMP_LAND,
            ActionId::IDLE,
            ActionId::AIR_THROW_LAND,
            ActionId::LEDGE_GRAB,
            ActionId::WATER_PLUNGE,
        ] {
            assert!(table.contains(action), "missing {:#010x}", action.0);
        }
    }

    #[test]
    fn test_register_replaces() {
        fn noop(_: &mut ActionContext<'_>) -> bool {
            false
        }
        let mut table = ActionTable::empty();
        table.register(ActionId::IDLE, "a", noop);
        table.register(ActionId::IDLE, "b", noop);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(ActionId::IDLE).map(|h| h.name), Some("b"));
    }

    #[test]
    fn test_unknown_action_does_nothing() {
        let mut h = Harness::new(flat_world(SurfaceType::DEFAULT));
        h.avatar.action = ActionId::IDLE;
        let table = ActionTable::empty();
        assert!(!table.execute(&mut h.ctx()));
        assert_eq!(h.avatar.action, ActionId::IDLE);
    }

    #[test]
    fn test_airborne_cancel_runs_before_handler() {
        let mut h = Harness::new(flat_world(SurfaceType::DEFAULT));
        h.avatar.action = ActionId::FREEFALL;
        h.avatar.pos.y = 300.0;
        h.avatar.water_level = 1000.0;

        let table = ActionTable::default();
        assert!(table.execute(&mut h.ctx()));
        assert_eq!(h.avatar.action, ActionId::WATER_PLUNGE);
    }
}
