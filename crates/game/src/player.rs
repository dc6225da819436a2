//! Player entity and state.

use glam::Vec3;
use hopper_physics::{AvatarCommand, AvatarController, AvatarState, CollisionWorld};
use serde::{Deserialize, Serialize};

use crate::input::PlayerInput;
use crate::level::SpawnPoint;

/// Unique identifier for entities.
pub type EntityId = u32;

/// Health units per wedge of the health meter.
const HEALTH_PER_WEDGE: i16 = 0x100;

/// A player in the game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Unique player ID.
    pub id: EntityId,

    /// Player name/handle.
    pub name: String,

    /// Movement and action state.
    pub avatar: AvatarState,

    /// Deaths this session.
    pub deaths: u32,

    /// Warps taken this session.
    pub warps: u32,

    /// Input of the previous frame, for press detection.
    last_input: PlayerInput,
}

impl Player {
    /// Create a new player at the given spawn point.
    ///
    /// The avatar still needs [`respawn`](Self::respawn) to find its floor.
    pub fn new(id: EntityId, name: String, spawn: &SpawnPoint) -> Self {
        Self {
            id,
            name,
            avatar: AvatarState::new(spawn.position, spawn.yaw),
            deaths: 0,
            warps: 0,
            last_input: PlayerInput::default(),
        }
    }

    /// Get the player's current position.
    #[inline]
    pub fn position(&self) -> Vec3 {
        self.avatar.pos
    }

    /// Check if the player is alive.
    #[inline]
    pub fn is_alive(&self) -> bool {
        !self.avatar.is_dead()
    }

    /// Full wedges on the health meter, 0 to 8.
    pub fn health_wedges(&self) -> u8 {
        (self.avatar.health / HEALTH_PER_WEDGE).clamp(0, 8) as u8
    }

    /// Turn this frame's raw input into a command, remembering it for the
    /// next frame.
    pub fn command(&mut self, input: &PlayerInput) -> AvatarCommand {
        let command = input.to_command(&self.last_input);
        self.last_input = input.clone();
        command
    }

    /// Put the player back at a spawn point with full health.
    pub fn respawn(&mut self, controller: &AvatarController, world: &CollisionWorld, spawn: &SpawnPoint) {
        self.avatar = AvatarState::new(spawn.position, spawn.yaw);
        self.last_input = PlayerInput::default();
        controller.spawn_at(&mut self.avatar, spawn.position, world);
        log::info!("Player {} respawned at {:?}", self.id, spawn.position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;
    use hopper_physics::{ActionId, Angle};

    fn origin() -> SpawnPoint {
        SpawnPoint {
            position: Vec3::ZERO,
            yaw: Angle::ZERO,
            warp_node: 0,
        }
    }

    #[test]
    fn test_player_creation() {
        let player = Player::new(1, "Test".to_string(), &origin());
        assert!(player.is_alive());
        assert_eq!(player.health_wedges(), 8);
        assert_eq!(player.position(), Vec3::ZERO);
    }

    #[test]
    fn test_health_wedges() {
        let mut player = Player::new(1, "Test".to_string(), &origin());
        player.avatar.health = 0x3FF;
        assert_eq!(player.health_wedges(), 3);

        player.avatar.health = 0xFF;
        assert_eq!(player.health_wedges(), 0);
        assert!(!player.is_alive());
    }

    #[test]
    fn test_held_button_not_repressed() {
        let mut player = Player::new(1, "Test".to_string(), &origin());
        let mut input = PlayerInput::default();
        input.buttons.jump = true;

        assert!(player.command(&input).pressed.0 != 0);
        assert_eq!(player.command(&input).pressed.0, 0);
    }

    #[test]
    fn test_respawn() {
        let level = Level::test_arena();
        let controller = AvatarController::with_default_config();
        let mut player = Player::new(1, "Test".to_string(), &origin());
        player.avatar.health = 0xFF;
        player.avatar.force_action(ActionId::STANDING_DEATH, 0);

        let spawn = SpawnPoint {
            position: Vec3::new(100.0, 50.0, 100.0),
            yaw: Angle::HALF,
            warp_node: 0,
        };
        player.respawn(&controller, &level.collision, &spawn);

        assert!(player.is_alive());
        assert_eq!(player.avatar.action, ActionId::IDLE);
        assert_eq!(player.position(), Vec3::new(100.0, 0.0, 100.0));
    }
}
