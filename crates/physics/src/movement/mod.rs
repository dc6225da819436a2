//! Avatar movement: the action state machine and the physics stepper.
//!
//! This module implements platformer movement with:
//!
//! - An action state machine with one handler per action
//! - Quarter-step ground and air integration against triangle collision
//! - Jumps, flips, dives, slides, knockbacks and landings
//! - Floor friction classes, slopes, quicksand and wind
//! - Health, fall damage and special floors
//!
//! # Design
//!
//! Movement is driven by the [`AvatarController`], which turns an
//! [`AvatarCommand`] into input flags and runs the current action of an
//! [`AvatarState`] through the collision world. Handlers receive an
//! [`ActionContext`] bundling the avatar with everything else they may read
//! or write, and report side effects through [`Signals`].
//!
//! All movement is deterministic: the same inputs and seed always produce
//! the same frames.

pub mod action;
pub mod actions;
pub mod animation;
mod config;
pub mod context;
mod controller;
pub mod signal;
mod state;
pub mod step;
mod transition;

pub use action::{ActionGroup, ActionId};
pub use actions::{ActionFn, ActionHandler, ActionTable};
pub use animation::{AnimId, AnimationCursor};
pub use config::MovementConfig;
pub use context::{ActionContext, AreaInfo, FloorClass, Terrain};
pub use controller::{AvatarController, FrameEnv, WARP_NODE_WARP_FLOOR};
pub use signal::{CameraShake, ParticleFlags, Signal, Signals, Sound};
pub use state::{
    AvatarCommand, AvatarFlags, AvatarState, BodyState, Buttons, Carrier, EyeState, HandState,
    HeldObject, InputFlags, InteractStatus, RenderState,
};
pub use step::{AirStep, AirStepFlags, GroundStep};
