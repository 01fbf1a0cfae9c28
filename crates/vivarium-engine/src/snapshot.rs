//! Read-only world snapshots with BLAKE3 hashing.
//!
//! Provides [`WorldSnapshot`] -- a serializable view of the simulation state
//! (entities with their components, tick counter, clock, dt) for renderers
//! and tooling, plus a BLAKE3 content hash for determinism testing.
//!
//! # Usage
//!
//! ```
//! use vivarium_engine::prelude::*;
//!
//! let mut world = World::with_default_pipeline(WorldConfig::default()).unwrap();
//! world.run(10, Some(16.0)).unwrap();
//!
//! let snapshot = world.capture_snapshot();
//! assert_eq!(snapshot.tick, 10);
//! assert_eq!(snapshot.hash.len(), 64); // BLAKE3 hex digest
//! assert!(snapshot.verify());
//! assert_eq!(snapshot.hash, world.state_hash());
//! ```
//!
//! # What Is NOT Hashed
//!
//! - **Statistics** -- frame timing depends on the wall clock when no
//!   external dt is supplied.
//! - **Diagnostics** -- per-tick timing is transient.
//! - **RNG state** -- its effects show up in entity state (wander targets).
//!
//! Snapshots are exports only; a world cannot be restored from one.

use serde::{Deserialize, Serialize};
use vivarium_ecs::prelude::*;

use crate::stats::WorldStats;
use crate::world::World;

// ---------------------------------------------------------------------------
// Snapshot types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergySnapshot {
    pub current: f64,
    pub max: f64,
    pub rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrainSnapshot {
    pub diet: String,
    pub hunger_threshold: f64,
    pub signals: BrainSignals,
}

/// Everything a renderer needs to draw one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub id: EntityId,
    pub name: String,
    /// Metadata type, or `"entity"`.
    pub kind: String,
    pub remove: bool,
    pub position: Vector,
    pub velocity: Vector,
    pub size: f64,
    pub color: Option<String>,
    pub properties: Properties,
    pub components: Vec<ComponentKind>,
    pub energy: Option<EnergySnapshot>,
    pub desire: Option<Desire>,
    /// Human-readable form of `desire`.
    pub intention: Option<String>,
    pub detected: Vec<EntityId>,
    pub brain: Option<BrainSnapshot>,
}

impl EntitySnapshot {
    pub fn capture(entity: &Entity) -> Self {
        let desire = entity.get::<DesireComponent>().map(|d| d.desire.clone());
        Self {
            id: entity.id().clone(),
            name: entity.name().to_owned(),
            kind: entity.kind().to_owned(),
            remove: entity.remove,
            position: entity.position(),
            velocity: entity.velocity(),
            size: entity.size(),
            color: entity.properties.color().map(str::to_owned),
            properties: entity.properties.clone(),
            components: entity.component_kinds(),
            energy: entity.get::<EnergyComponent>().map(|e| EnergySnapshot {
                current: e.current(),
                max: e.max(),
                rate: e.rate(),
            }),
            intention: desire.as_ref().map(Desire::to_string),
            desire,
            detected: entity
                .get::<SensorComponent>()
                .map(|s| s.detected.iter().cloned().collect())
                .unwrap_or_default(),
            brain: entity.get::<BrainComponent>().map(|b| BrainSnapshot {
                diet: b.diet.name().to_owned(),
                hunger_threshold: b.hunger_threshold,
                signals: b.signals,
            }),
        }
    }
}

/// A serializable view of the whole world at the end of a tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub width: f64,
    pub height: f64,
    /// Number of ticks executed at the time of capture.
    pub tick: u64,
    pub clock: f64,
    /// `dt` the next tick will run with.
    pub dt: f64,
    /// Entities in id order.
    pub entities: Vec<EntitySnapshot>,
    pub stats: WorldStats,
    /// BLAKE3 hex digest (64 lowercase hex chars) of the serialized
    /// tick state and entities. Used for determinism verification.
    pub hash: String,
}

impl WorldSnapshot {
    /// Recompute the hash from the snapshot's data and compare.
    pub fn verify(&self) -> bool {
        compute_hash(self.tick, self.clock, self.dt, &self.entities) == self.hash
    }
}

// ---------------------------------------------------------------------------
// Hashing helpers
// ---------------------------------------------------------------------------

/// Compute the BLAKE3 hex digest of the hashable world state.
fn compute_hash(tick: u64, clock: f64, dt: f64, entities: &[EntitySnapshot]) -> String {
    // Serialize the hashable parts to a canonical JSON byte stream.
    #[derive(Serialize)]
    struct HashableState<'a> {
        tick: u64,
        clock: f64,
        dt: f64,
        entities: &'a [EntitySnapshot],
    }

    let hashable = HashableState {
        tick,
        clock,
        dt,
        entities,
    };

    let json_bytes = serde_json::to_vec(&hashable)
        .expect("WorldSnapshot state should always be JSON-serializable");

    blake3::hash(&json_bytes).to_hex().to_string()
}

// ---------------------------------------------------------------------------
// World snapshot methods
// ---------------------------------------------------------------------------

impl World {
    /// Capture a read-only snapshot of the current state.
    pub fn capture_snapshot(&self) -> WorldSnapshot {
        let entities = self.entity_snapshots();
        let hash = compute_hash(self.tick_count(), self.clock(), self.dt(), &entities);
        WorldSnapshot {
            width: self.width(),
            height: self.height(),
            tick: self.tick_count(),
            clock: self.clock(),
            dt: self.dt(),
            entities,
            stats: self.stats().clone(),
            hash,
        }
    }

    /// The BLAKE3 state hash, equal to `capture_snapshot().hash`.
    pub fn state_hash(&self) -> String {
        compute_hash(
            self.tick_count(),
            self.clock(),
            self.dt(),
            &self.entity_snapshots(),
        )
    }

    fn entity_snapshots(&self) -> Vec<EntitySnapshot> {
        self.entity_table().iter().map(EntitySnapshot::capture).collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::WorldConfig;

    fn world_with_creature() -> World {
        let mut world = World::with_default_pipeline(WorldConfig::default()).unwrap();
        world
            .add(
                Entity::new("cow")
                    .with(MetaDataComponent::new("Bessie", "creature"))
                    .with(MovementComponent::at(Vector::new(10.0, 10.0)))
                    .with(EnergyComponent::default())
                    .with(SensorComponent::radial(20.0))
                    .with(DesireComponent::new(Desire::wander()))
                    .with(BrainComponent::herbivore("cow"))
                    .with_properties(Properties::new().with("color", "brown")),
            )
            .unwrap();
        world
    }

    #[test]
    fn snapshot_exposes_renderer_fields() {
        let mut world = world_with_creature();
        world.update(Some(16.0)).unwrap();
        let snapshot = world.capture_snapshot();

        assert_eq!(snapshot.entities.len(), 1);
        let cow = &snapshot.entities[0];
        assert_eq!(cow.name, "Bessie");
        assert_eq!(cow.kind, "creature");
        assert_eq!(cow.color.as_deref(), Some("brown"));
        assert_eq!(cow.size, 2.0);
        assert_eq!(cow.intention.as_deref(), Some("wander"));
        assert_eq!(cow.brain.as_ref().map(|b| b.diet.as_str()), Some("herbivore"));
        assert!(cow.components.contains(&ComponentKind::Action));
    }

    #[test]
    fn hash_is_stable_and_verifiable() {
        let mut world = world_with_creature();
        world.run(5, Some(10.0)).unwrap();
        let a = world.capture_snapshot();
        let b = world.capture_snapshot();
        assert_eq!(a.hash, b.hash);
        assert!(a.verify());

        let mut tampered = a.clone();
        tampered.tick += 1;
        assert!(!tampered.verify());
    }

    #[test]
    fn hash_changes_as_world_advances() {
        let mut world = world_with_creature();
        let before = world.state_hash();
        world.update(Some(10.0)).unwrap();
        assert_ne!(before, world.state_hash());
    }

    #[test]
    fn snapshot_serializes_to_json() {
        let world = world_with_creature();
        let json = serde_json::to_string(&world.capture_snapshot()).unwrap();
        let back: WorldSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.entities[0].id, EntityId::from("cow"));
        assert_eq!(back.hash, world.state_hash());
    }
}
