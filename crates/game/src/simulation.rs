//! Game simulation - the main game loop.
//!
//! This module contains the deterministic game simulation. Every player is
//! advanced with the same controller, collision world and random stream, so
//! the same inputs replay to the same frames.

use glam::Vec3;
use hopper_physics::{AvatarController, FrameEnv, MovementConfig, SeededRandom, Signal, Signals};
use serde::{Deserialize, Serialize};

use crate::input::PlayerInput;
use crate::level::{Level, SpawnPoint};
use crate::player::{EntityId, Player};

/// Game simulation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Simulation tick rate (ticks per second).
    pub tick_rate: u32,

    /// Movement physics configuration.
    pub movement: MovementConfig,

    /// Seed of the gameplay random stream.
    pub seed: u16,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_rate: 30,
            movement: MovementConfig::default(),
            seed: 0,
        }
    }
}

impl SimulationConfig {
    /// Default tick rate with the movement fixes turned on.
    pub fn quality_of_life() -> Self {
        Self {
            movement: MovementConfig::quality_of_life(),
            ..Default::default()
        }
    }

    /// Get the time step per tick in seconds.
    pub fn delta_time(&self) -> f32 {
        1.0 / self.tick_rate as f32
    }
}

/// A signal raised by one player's avatar during a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerEvent {
    pub player: EntityId,
    pub signal: Signal,
}

/// The main game simulation.
#[derive(Debug)]
pub struct Simulation {
    /// Current frame/tick number.
    pub frame: u32,

    /// Simulation configuration.
    pub config: SimulationConfig,

    /// Current level.
    pub level: Level,

    /// All players in the game.
    pub players: Vec<Player>,

    controller: AvatarController,
    rng: SeededRandom,
    signals: Signals,

    /// Next entity ID to assign.
    next_entity_id: EntityId,
}

impl Simulation {
    /// Create a new simulation with the given configuration and level.
    pub fn new(config: SimulationConfig, level: Level) -> Self {
        let controller = AvatarController::new(config.movement.clone());
        let rng = SeededRandom::new(config.seed);

        Self {
            frame: 0,
            config,
            level,
            players: Vec::new(),
            controller,
            rng,
            signals: Signals::new(),
            next_entity_id: 1,
        }
    }

    /// Create a simulation with default configuration and test arena.
    pub fn test() -> Self {
        Self::new(SimulationConfig::default(), Level::test_arena())
    }

    /// Add a player to the simulation.
    ///
    /// Returns the player's ID.
    pub fn add_player(&mut self, name: &str) -> EntityId {
        let id = self.next_entity_id;
        self.next_entity_id += 1;

        let spawn_index = self.players.len() % self.level.spawn_points.len().max(1);
        let spawn = self.level.spawn(spawn_index).cloned().unwrap_or(SpawnPoint {
            position: Vec3::ZERO,
            yaw: Default::default(),
            warp_node: 0,
        });

        // Platforms have to be in place for the spawn to land on them.
        self.level.begin_frame(self.frame);

        let mut player = Player::new(id, name.to_string(), &spawn);
        player.respawn(&self.controller, &self.level.collision, &spawn);

        self.players.push(player);
        id
    }

    /// Remove a player from the simulation.
    pub fn remove_player(&mut self, player_id: EntityId) {
        self.players.retain(|p| p.id != player_id);
    }

    /// Get a player by ID.
    pub fn get_player(&self, player_id: EntityId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    /// Get a mutable reference to a player by ID.
    pub fn get_player_mut(&mut self, player_id: EntityId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == player_id)
    }

    /// Replace the action table's handler for one action, e.g. to take over
    /// a parked action.
    pub fn controller_mut(&mut self) -> &mut AvatarController {
        &mut self.controller
    }

    /// Advance the simulation by one tick.
    ///
    /// `inputs` is indexed by player position in the `players` array; missing
    /// entries read as no input. Returns every signal the avatars raised.
    pub fn tick(&mut self, inputs: &[PlayerInput]) -> Vec<PlayerEvent> {
        let frame = self.frame;

        // Riders move with their platform before it is re-inserted.
        for player in &mut self.players {
            let moved = self.level.platform_displacement(player.avatar.floor, frame);
            if moved != Vec3::ZERO && player.avatar.pos.y <= player.avatar.floor_height + 4.0 {
                player.avatar.pos += moved;
            }
        }
        self.level.begin_frame(frame);

        let mut events = Vec::new();
        let mut respawns = Vec::new();
        {
            let env = FrameEnv {
                world: &self.level.collision,
                area: &self.level.area,
                frame,
            };

            for (i, player) in self.players.iter_mut().enumerate() {
                let input = inputs.get(i).cloned().unwrap_or_default();
                let command = player.command(&input);

                self.controller.update(
                    &mut player.avatar,
                    &command,
                    &env,
                    &mut self.rng,
                    &mut self.signals,
                );

                for signal in self.signals.drain() {
                    match signal {
                        Signal::Warp { node } => {
                            log::debug!("Player {} warped to node {:#04x}", player.id, node);
                            player.warps += 1;
                            respawns.push((i, node));
                        }
                        Signal::Death => {
                            log::info!("Player {} died", player.id);
                            player.deaths += 1;
                            respawns.push((i, 0));
                        }
                        _ => {}
                    }
                    events.push(PlayerEvent {
                        player: player.id,
                        signal,
                    });
                }
            }
        }

        for (i, node) in respawns {
            let spawn = if node == 0 {
                self.level.spawn(0)
            } else {
                self.level.warp_destination(node)
            };
            if let (Some(spawn), Some(player)) = (spawn, self.players.get_mut(i)) {
                player.respawn(&self.controller, &self.level.collision, spawn);
            }
        }

        self.frame += 1;
        events
    }

    /// Get the delta time for this simulation.
    pub fn delta_time(&self) -> f32 {
        self.config.delta_time()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use glam::IVec3;
    use hopper_physics::{ActionId, Angle, CollisionConfig, SurfaceType};

    fn walk_forward() -> PlayerInput {
        PlayerInput {
            stick: (0.0, 70.0),
            camera_yaw: Angle::HALF,
            ..Default::default()
        }
    }

    #[test]
    fn test_simulation_creation() {
        let sim = Simulation::test();
        assert_eq!(sim.frame, 0);
        assert!(sim.players.is_empty());
        assert!((sim.delta_time() - 1.0 / 30.0).abs() < 1e-6);
    }

    #[test]
    fn test_add_player() {
        let mut sim = Simulation::test();

        let id = sim.add_player("Player1");
        assert!(id > 0);
        assert_eq!(sim.players.len(), 1);

        let player = sim.get_player(id).unwrap();
        assert_eq!(player.name, "Player1");
        assert!(player.is_alive());
        assert_eq!(player.avatar.action, ActionId::IDLE);
    }

    #[test]
    fn test_tick_advances_frame() {
        let mut sim = Simulation::test();
        sim.add_player("Test");

        sim.tick(&[PlayerInput::default()]);
        assert_eq!(sim.frame, 1);

        sim.tick(&[]);
        assert_eq!(sim.frame, 2);
    }

    #[test]
    fn test_movement_input() {
        let mut sim = Simulation::test();
        let id = sim.add_player("Test");

        let start_pos = sim.get_player(id).unwrap().position();
        for _ in 0..60 {
            sim.tick(&[walk_forward()]);
        }

        let end_pos = sim.get_player(id).unwrap().position();
        assert!(end_pos.z - start_pos.z > 500.0, "Player should have walked, end={:?}", end_pos);
    }

    #[test]
    fn test_determinism() {
        let inputs: Vec<_> = (0..120)
            .map(|i| {
                let mut input = walk_forward();
                input.stick.0 = if i % 40 < 20 { 30.0 } else { -30.0 };
                input.buttons.jump = i % 25 < 3;
                input.buttons.attack = i % 50 == 10;
                input
            })
            .collect();

        let run = || {
            let mut sim = Simulation::test();
            sim.add_player("Test");
            for input in &inputs {
                sim.tick(std::slice::from_ref(input));
            }
            sim.players.remove(0).avatar
        };

        let a = run();
        let b = run();
        assert_eq!(a.pos, b.pos);
        assert_eq!(a.action, b.action);
        assert_eq!(a.vel, b.vel);
    }

    #[test]
    fn test_death_respawns() {
        let mut sim = Simulation::test();
        let id = sim.add_player("Test");
        sim.get_player_mut(id).unwrap().avatar.health = 0xFF;

        let mut deaths = 0;
        for _ in 0..10 {
            deaths += sim
                .tick(&[])
                .iter()
                .filter(|e| e.player == id && e.signal == Signal::Death)
                .count();
        }

        let player = sim.get_player(id).unwrap();
        assert_eq!(deaths, 1);
        assert_eq!(player.deaths, 1);
        assert!(player.is_alive());
        assert_eq!(player.position(), Vec3::ZERO);
    }

    #[test]
    fn test_warp_floor_sends_to_destination() {
        let mut level = Level::new("warp", "Warp", CollisionConfig::default());
        level.add_quad(
            [
                IVec3::new(-500, 0, -500),
                IVec3::new(-500, 0, 500),
                IVec3::new(500, 0, 500),
                IVec3::new(500, 0, -500),
            ],
            SurfaceType::DEFAULT,
        );
        level.add_quad(
            [
                IVec3::new(1000, 0, -500),
                IVec3::new(1000, 0, 500),
                IVec3::new(2000, 0, 500),
                IVec3::new(2000, 0, -500),
            ],
            SurfaceType::WARP,
        );
        level.spawn_points.push(SpawnPoint {
            position: Vec3::new(1500.0, 0.0, 0.0),
            yaw: Angle::ZERO,
            warp_node: 0x0A,
        });
        level.spawn_points.push(SpawnPoint {
            position: Vec3::ZERO,
            yaw: Angle::ZERO,
            warp_node: 0xF3,
        });

        let mut sim = Simulation::new(SimulationConfig::default(), level);
        let id = sim.add_player("Test");
        let events = sim.tick(&[]);

        assert!(events.contains(&PlayerEvent {
            player: id,
            signal: Signal::Warp { node: 0xF3 },
        }));
        let player = sim.get_player(id).unwrap();
        assert_eq!(player.warps, 1);
        assert_eq!(player.position(), Vec3::ZERO);
    }

    #[test]
    fn test_platform_carries_rider() {
        let mut level = Level::test_arena();
        level.spawn_points.insert(
            0,
            SpawnPoint {
                position: Vec3::new(1700.0, 260.0, -300.0),
                yaw: Angle::ZERO,
                warp_node: 0,
            },
        );

        let mut sim = Simulation::new(SimulationConfig::default(), level);
        let id = sim.add_player("Rider");
        assert_eq!(sim.get_player(id).unwrap().avatar.action, ActionId::IDLE);

        for _ in 0..60 {
            sim.tick(&[]);
        }

        let player = sim.get_player(id).unwrap();
        assert!(player.position().y > 500.0, "rider at {:?}", player.position());
        assert_eq!(player.avatar.action, ActionId::IDLE);
    }
}
