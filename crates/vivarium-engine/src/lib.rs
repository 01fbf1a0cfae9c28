//! Vivarium Engine -- the tick loop that brings the ECS to life.
//!
//! This crate builds on [`vivarium_ecs`] to provide the simulation driver: a
//! [`World`](world::World) that owns the entities, runs an ordered pipeline of
//! [`System`](system::System)s every tick, removes dead entities, and keeps the
//! clock and statistics.
//!
//! # Quick Start
//!
//! ```
//! use vivarium_engine::prelude::*;
//!
//! let mut world = World::with_default_pipeline(WorldConfig {
//!     seed: 7,
//!     ..WorldConfig::default()
//! })
//! .unwrap();
//! world
//!     .add(
//!         Entity::new("walker")
//!             .with(MovementComponent::at(Vector::new(50.0, 50.0)))
//!             .with(DesireComponent::new(Desire::wander())),
//!     )
//!     .unwrap();
//!
//! world.run(100, Some(16.0)).unwrap();
//! assert_eq!(world.tick_count(), 100);
//! ```

#![deny(unsafe_code)]

pub mod snapshot;
pub mod stats;
pub mod system;
pub mod systems;
pub mod world;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

/// Re-export the ECS crate for convenience.
pub use vivarium_ecs;

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common engine usage.
pub mod prelude {
    // Re-export everything from the ECS prelude.
    pub use vivarium_ecs::prelude::*;

    // Engine-specific exports.
    pub use crate::snapshot::{BrainSnapshot, EnergySnapshot, EntitySnapshot, WorldSnapshot};
    pub use crate::stats::WorldStats;
    pub use crate::system::{FnSystem, System, SystemError, SystemFn, TickContext};
    pub use crate::systems::{
        builtin, default_pipeline, ActionSystem, BrainSystem, DesireSystem, EnergySystem,
        MovementSystem, SensorSystem, BUILTIN_NAMES,
    };
    pub use crate::world::{TickDiagnostics, TickReport, World, WorldConfig, WorldError};
}
