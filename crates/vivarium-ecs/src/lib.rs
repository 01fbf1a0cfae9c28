//! Vivarium ECS -- entities, typed components, and creature behavior data.
//!
//! An [`Entity`](entity::Entity) is an id, a soft-delete flag, a property bag
//! and a fixed set of optional component slots. Behavior lives in the
//! components: a [`Desire`](desire::Desire) is a long-running intention that
//! emits one-tick [`Action`](action::Action)s, a
//! [`BrainComponent`](brain::BrainComponent) picks desires from what the
//! entity's sensors detected, and a [`DietReasoner`](diet::DietReasoner)
//! decides what is edible.
//!
//! Entities never hold references to one another. Cross-entity links are
//! [`EntityId`](entity::EntityId)s resolved against the
//! [`EntityTable`](table::EntityTable) at the moment they are used.
//!
//! # Quick Start
//!
//! ```
//! use vivarium_ecs::prelude::*;
//!
//! let mut table = EntityTable::new();
//! table
//!     .insert(
//!         Entity::new("cow")
//!             .with(MovementComponent::at(Vector::new(0.0, 0.0)))
//!             .with(EnergyComponent::default()),
//!     )
//!     .unwrap();
//!
//! let cow = table.get(&EntityId::from("cow")).unwrap();
//! assert_eq!(cow.get::<EnergyComponent>().map(|e| e.current()), Some(100.0));
//! ```

#![deny(unsafe_code)]

pub mod action;
pub mod brain;
pub mod component;
pub mod desire;
pub mod diet;
pub mod entity;
pub mod location;
pub mod sensor;
pub mod table;
pub mod vector;

/// The simulation's deterministic PRNG.
pub type SimRng = rand_pcg::Pcg64;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by entity table and component operations.
#[derive(Debug, thiserror::Error)]
pub enum EcsError {
    /// An entity with this id is already registered.
    #[error("entity '{id}' already exists")]
    DuplicateEntity { id: entity::EntityId },

    /// No entity with this id is registered.
    #[error("entity '{id}' does not exist")]
    UnknownEntity { id: entity::EntityId },

    /// The entity lacks a component an operation requires.
    #[error("entity '{id}' has no {kind} component")]
    MissingComponent {
        id: entity::EntityId,
        kind: component::ComponentKind,
    },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::action::{Action, ActionComponent, ActionOutcome, GrabAction, MoveAction};
    pub use crate::brain::{BrainComponent, BrainSignals, Perception};
    pub use crate::component::{
        Component, ComponentKind, Components, EnergyComponent, MetaDataComponent,
        MovementComponent,
    };
    pub use crate::desire::{Desire, DesireComponent, DesireContext, MoveTo};
    pub use crate::diet::{diet_from_name, Carnivore, DietReasoner, Herbivore};
    pub use crate::entity::{Entity, EntityId, Properties};
    pub use crate::location::Location;
    pub use crate::sensor::{PositionIndex, RadialSensor, Sensor, SensorComponent};
    pub use crate::table::EntityTable;
    pub use crate::vector::Vector;
    pub use crate::{EcsError, SimRng};
}

// ---------------------------------------------------------------------------
// Integration Tests
// ---------------------------------------------------------------------------
