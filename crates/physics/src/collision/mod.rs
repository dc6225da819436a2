//! Triangle collision for platformer movement.
//!
//! Geometry is a soup of triangles bucketed into a uniform XZ grid. Queries
//! look only at the cell containing the query point, so every surface is
//! listed in all cells it overlaps.
//!
//! # Key Types
//!
//! - [`CollisionWorld`]: surface store, partition and all queries
//! - [`Surface`]: one triangle with its plane and gameplay type
//! - [`SurfaceId`] / [`SurfaceRef`]: per-frame handles held by avatar state
//!
//! # Queries
//!
//! - `find_floor` / `find_ceil`: nearest floor below / ceiling above a point
//! - `find_wall_collisions`: push a point out of nearby walls
//! - `find_water_level`: top of the water under a point
//! - `find_surface_on_ray`: closest triangle along a segment
//!
//! A miss is never an error. Floors report [`FLOOR_LOWER_LIMIT`], ceilings
//! report [`CELL_HEIGHT_LIMIT`], and the surface is `None`.

mod config;
mod flags;
mod partition;
mod ray;
mod surface;
mod world;

pub use config::{CollisionConfig, CoordinateWidth};
pub use flags::{QueryFlags, RaycastFlags, SurfaceFlags};
pub use partition::{PartitionCell, SpatialPartition, SurfaceLifetime};
pub use ray::RayHit;
pub use surface::{Surface, SurfaceId, SurfaceKind, SurfaceRef, SurfaceType, WATER_PSEUDO_FLOOR};
pub use world::{
    CeilHit, CollisionWorld, FloorHit, WallCollisionData, CELL_HEIGHT_LIMIT, FLOOR_LOWER_LIMIT,
};
