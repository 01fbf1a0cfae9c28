//! The entity table: every registered entity keyed by id.
//!
//! Backed by a `BTreeMap` so iteration follows id order. Systems that need to
//! mutate one entity while reading others iterate over [`EntityTable::ids`]
//! (an owned snapshot of the keys) and look entities up one at a time.

use std::collections::BTreeMap;

use crate::component::MovementComponent;
use crate::entity::{Entity, EntityId};
use crate::sensor::PositionIndex;
use crate::vector::Vector;
use crate::EcsError;

/// Owned collection of entities, ordered by id.
#[derive(Debug, Clone, Default)]
pub struct EntityTable {
    entities: BTreeMap<EntityId, Entity>,
}

impl EntityTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity. Ids must be unique.
    pub fn insert(&mut self, entity: Entity) -> Result<(), EcsError> {
        if self.entities.contains_key(entity.id()) {
            return Err(EcsError::DuplicateEntity {
                id: entity.id().clone(),
            });
        }
        self.entities.insert(entity.id().clone(), entity);
        Ok(())
    }

    pub fn remove(&mut self, id: &EntityId) -> Option<Entity> {
        self.entities.remove(id)
    }

    pub fn get(&self, id: &EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn get_mut(&mut self, id: &EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id)
    }

    /// Like [`get`](Self::get) but reports a missing entity as an error.
    pub fn require(&self, id: &EntityId) -> Result<&Entity, EcsError> {
        self.get(id)
            .ok_or_else(|| EcsError::UnknownEntity { id: id.clone() })
    }

    pub fn require_mut(&mut self, id: &EntityId) -> Result<&mut Entity, EcsError> {
        self.entities
            .get_mut(id)
            .ok_or_else(|| EcsError::UnknownEntity { id: id.clone() })
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.entities.contains_key(id)
    }

    /// Registered and not marked for removal.
    ///
    /// Removal is deferred to the end of the tick, so an entity consumed
    /// earlier in the tick is still present but no longer live.
    pub fn is_live(&self, id: &EntityId) -> bool {
        self.entities.get(id).is_some_and(|e| !e.remove)
    }

    /// Position of a live entity.
    pub fn live_position(&self, id: &EntityId) -> Option<Vector> {
        self.entities
            .get(id)
            .filter(|e| !e.remove)
            .map(Entity::position)
    }

    /// The first live entity, in id order, within `id`'s `sensor_radius`
    /// property. Entities sharing its exact position are ignored.
    pub fn any_near(&self, id: &EntityId) -> Option<&Entity> {
        let me = self.entities.get(id)?;
        let radius = me.properties.sensor_radius();
        self.entities.values().find(|other| {
            let distance = me.distance(other);
            other.id() != id && !other.remove && distance > 0.0 && distance <= radius
        })
    }

    /// Owned snapshot of all ids, in iteration order.
    pub fn ids(&self) -> Vec<EntityId> {
        self.entities.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.values_mut()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Snapshot of the positions of every entity with a movement component.
    pub fn position_index(&self) -> PositionIndex {
        PositionIndex::from_entries(self.entities.values().filter_map(|e| {
            e.get::<MovementComponent>()
                .map(|m| (e.id().clone(), m.position))
        }))
    }

    /// Remove and return every entity whose `remove` flag is set.
    pub fn sweep_removed(&mut self) -> Vec<Entity> {
        let marked: Vec<EntityId> = self
            .entities
            .values()
            .filter(|e| e.remove)
            .map(|e| e.id().clone())
            .collect();
        marked
            .iter()
            .filter_map(|id| self.entities.remove(id))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn at(id: &str, x: f64, y: f64) -> Entity {
        Entity::new(id).with(MovementComponent::at(Vector::new(x, y)))
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut table = EntityTable::new();
        table.insert(Entity::new("a")).unwrap();
        let err = table.insert(Entity::new("a")).unwrap_err();
        assert!(matches!(err, EcsError::DuplicateEntity { .. }));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn iteration_is_ordered_by_id() {
        let mut table = EntityTable::new();
        for id in ["c", "a", "b"] {
            table.insert(Entity::new(id)).unwrap();
        }
        let ids: Vec<&str> = table.iter().map(|e| e.id().as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn marked_entities_are_not_live_until_swept() {
        let mut table = EntityTable::new();
        table.insert(at("a", 1.0, 1.0)).unwrap();
        table.insert(at("b", 2.0, 2.0)).unwrap();
        table.get_mut(&"a".into()).unwrap().mark_remove();

        assert!(table.contains(&"a".into()));
        assert!(!table.is_live(&"a".into()));
        assert_eq!(table.live_position(&"a".into()), None);
        assert_eq!(table.live_position(&"b".into()), Some(Vector::new(2.0, 2.0)));

        let removed = table.sweep_removed();
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].id().as_str(), "a");
        assert_eq!(table.ids(), vec![EntityId::from("b")]);
    }

    #[test]
    fn require_reports_unknown_entity() {
        let table = EntityTable::new();
        assert!(matches!(
            table.require(&"ghost".into()),
            Err(EcsError::UnknownEntity { .. })
        ));
    }

    #[test]
    fn position_index_skips_entities_without_movement() {
        let mut table = EntityTable::new();
        table.insert(at("a", 0.0, 0.0)).unwrap();
        table.insert(Entity::new("b")).unwrap();
        assert_eq!(table.position_index().len(), 1);
    }

    #[test]
    fn any_near_skips_self_coincident_and_consumed_entities() {
        let mut table = EntityTable::new();
        let me = at("me", 0.0, 0.0)
            .with_properties(crate::entity::Properties::new().with("sensor_radius", 5.0));
        table.insert(me).unwrap();
        table.insert(at("a_same_spot", 0.0, 0.0)).unwrap();
        table.insert(at("b_eaten", 1.0, 0.0)).unwrap();
        table.insert(at("c_near", 3.0, 4.0)).unwrap();
        table.insert(at("d_far", 6.0, 0.0)).unwrap();
        table.get_mut(&"b_eaten".into()).unwrap().mark_remove();

        let near = table.any_near(&"me".into()).map(|e| e.id().as_str());
        assert_eq!(near, Some("c_near"));
        assert!(table.any_near(&"ghost".into()).is_none());
    }
}
