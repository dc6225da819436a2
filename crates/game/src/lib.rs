//! Hopper Game Logic
//!
//! This crate wraps the physics core in a playable simulation:
//!
//! - Player state and input mapping
//! - Level construction and collision data loading
//! - Moving platforms re-inserted as dynamic surfaces every frame
//! - The tick loop that routes avatar signals (warps, deaths) back into the
//!   level
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                        Game Simulation                        │
//! │  ┌─────────┐    ┌────────────────┐    ┌────────────────────┐  │
//! │  │ Input   │───►│ Physics        │───►│ Signals            │  │
//! │  │ (stick, │    │ (actions,      │    │ (warps, deaths,    │  │
//! │  │ buttons)│    │  collision)    │    │  sounds, camera)   │  │
//! │  └─────────┘    └────────────────┘    └────────────────────┘  │
//! └───────────────────────────────────────────────────────────────┘
//! ```

pub mod collision_data;
pub mod input;
pub mod level;
pub mod player;
pub mod simulation;

// Re-export main types
pub use collision_data::{CollisionData, CollisionDataError};
pub use input::PlayerInput;
pub use level::{Level, MovingPlatform, SpawnPoint};
pub use player::{EntityId, Player};
pub use simulation::{PlayerEvent, Simulation, SimulationConfig};

// Re-export physics types for convenience
pub use hopper_physics::{
    AvatarCommand, AvatarController, AvatarState, CollisionConfig, CollisionWorld,
    MovementConfig, Signal,
};
