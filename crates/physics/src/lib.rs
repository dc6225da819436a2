//! Hopper Physics Engine
//!
//! A deterministic platformer physics core: triangle collision against a
//! uniform grid, quarter-step avatar integration and the action state
//! machine that drives an avatar through jumps, slides and landings.
//!
//! # Architecture
//!
//! The engine is split into three layers:
//!
//! - **Math**: wrapping 16-bit angles, lookup-table trigonometry, approach
//!   helpers and the gameplay random generator
//! - **Collision**: stores surfaces, answers floor/ceiling/wall/water/ray
//!   queries
//! - **Movement**: uses collision queries to step the avatar and runs its
//!   current action
//!
//! # Design Principles
//!
//! 1. **Determinism**: Same inputs always produce same outputs across platforms
//! 2. **Bounded work**: Every query and step finishes in a fixed amount of work
//! 3. **No failure paths**: Misses are sentinels, never errors or panics
//! 4. **Per-frame handles**: Surface ids are re-resolved every frame

pub mod collision;
pub mod math;
pub mod movement;

// Re-export commonly used types
pub use collision::{
    CollisionConfig, CollisionWorld, Surface, SurfaceFlags, SurfaceId, SurfaceRef, SurfaceType,
};
pub use math::{Angle, Orientation, SeededRandom};
pub use movement::{
    ActionId, ActionTable, AreaInfo, AvatarCommand, AvatarController, AvatarState, Buttons,
    FrameEnv, MovementConfig, Signal, Signals, Terrain,
};
