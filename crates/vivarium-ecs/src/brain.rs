//! The decision policy of autonomous creatures.
//!
//! A [`BrainComponent`] turns what its creature currently senses into a
//! [`Perception`], then [`decide`](BrainComponent::decide)s whether the
//! creature should switch desire. Perception reads the detected set left by
//! the previous sensor pass; entities that have since disappeared are skipped.

use std::cmp::Ordering;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::component::EnergyComponent;
use crate::desire::Desire;
use crate::diet::{DietReasoner, Herbivore};
use crate::entity::{Entity, EntityId};
use crate::sensor::SensorComponent;
use crate::table::EntityTable;

/// Last computed brain inputs, kept for inspection and snapshots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BrainSignals {
    /// `1 - energy ratio`.
    pub hunger: f64,
    pub detected_entity: bool,
    pub detected_food: bool,
    pub detected_predator: bool,
    pub entity_in_grab_range: bool,
    pub food_in_grab_range: bool,
}

/// Everything the policy needs from one look at the surroundings.
///
/// All lists are ordered nearest first, ties broken by id.
#[derive(Debug, Clone, Default)]
pub struct Perception {
    pub signals: BrainSignals,
    pub hungry: bool,
    pub edibles: Vec<EntityId>,
    pub food_in_grab_range: Vec<EntityId>,
    pub predators: Vec<EntityId>,
}

#[derive(Debug, Clone)]
pub struct BrainComponent {
    /// The creature this brain drives.
    pub creature: EntityId,
    /// Absolute energy level below which the creature looks for food.
    pub hunger_threshold: f64,
    pub diet: Arc<dyn DietReasoner>,
    pub signals: BrainSignals,
}

impl BrainComponent {
    pub const DEFAULT_HUNGER_THRESHOLD: f64 = 50.0;

    pub fn new(
        creature: impl Into<EntityId>,
        hunger_threshold: f64,
        diet: Arc<dyn DietReasoner>,
    ) -> Self {
        Self {
            creature: creature.into(),
            hunger_threshold,
            diet,
            signals: BrainSignals::default(),
        }
    }

    /// A herbivore brain with the default threshold.
    pub fn herbivore(creature: impl Into<EntityId>) -> Self {
        Self::new(creature, Self::DEFAULT_HUNGER_THRESHOLD, Arc::new(Herbivore))
    }

    pub fn is_edible(&self, candidate: &Entity) -> bool {
        self.diet.is_edible(&self.creature, candidate)
    }

    /// Whether `other` carries a brain whose diet would eat `me`.
    pub fn is_predator_of(other: &Entity, me: &Entity) -> bool {
        other
            .get::<BrainComponent>()
            .is_some_and(|brain| brain.diet.is_edible(other.id(), me))
    }

    /// Read the creature's surroundings.
    ///
    /// Returns `None` when the creature itself is no longer in the table.
    pub fn perceive(&self, table: &EntityTable) -> Option<Perception> {
        let me = table.get(&self.creature)?;

        let mut detected: Vec<&Entity> = me
            .get::<SensorComponent>()
            .map(|sensor| {
                sensor
                    .detected
                    .iter()
                    .filter_map(|id| table.get(id))
                    .filter(|e| !e.remove)
                    .collect()
            })
            .unwrap_or_default();
        detected.sort_by(|a, b| nearest_first(me, a, b));

        let ids = |pred: &dyn Fn(&Entity) -> bool| -> Vec<EntityId> {
            detected
                .iter()
                .copied()
                .filter(|e| pred(*e))
                .map(|e| e.id().clone())
                .collect()
        };
        let edibles = ids(&|e| self.is_edible(e));
        let food_in_grab_range = ids(&|e| self.is_edible(e) && me.in_grab_range(e));
        let predators = ids(&|e| Self::is_predator_of(e, me));
        let entity_in_grab_range = detected.iter().any(|e| me.in_grab_range(e));

        let energy = me.get::<EnergyComponent>();
        let hunger = energy.map_or(0.0, |e| 1.0 - e.ratio());
        let hungry = energy.is_some_and(|e| e.current() < self.hunger_threshold);

        Some(Perception {
            signals: BrainSignals {
                hunger,
                detected_entity: !detected.is_empty(),
                detected_food: !edibles.is_empty(),
                detected_predator: !predators.is_empty(),
                entity_in_grab_range,
                food_in_grab_range: !food_in_grab_range.is_empty(),
            },
            hungry,
            edibles,
            food_in_grab_range,
            predators,
        })
    }

    /// Choose the creature's next desire, or `None` to keep the current one.
    ///
    /// A finished non-wander desire falls back to wandering. While wandering,
    /// food wins over fleeing: a hungry creature grabs the nearest edible in
    /// grab range (else the nearest visible one) before it considers
    /// predators.
    pub fn decide(
        &self,
        current: &Desire,
        current_satisfied: bool,
        perception: &Perception,
        grab_radius: f64,
    ) -> Option<Desire> {
        if !current.is_wander() {
            return current_satisfied.then(Desire::wander);
        }
        if perception.hungry {
            let target = perception
                .food_in_grab_range
                .first()
                .or_else(|| perception.edibles.first());
            if let Some(target) = target {
                return Some(Desire::grab(target.clone(), grab_radius));
            }
        }
        if !perception.predators.is_empty() {
            return Some(Desire::move_away(perception.predators.clone()));
        }
        None
    }
}

fn nearest_first(me: &Entity, a: &Entity, b: &Entity) -> Ordering {
    me.distance(a)
        .total_cmp(&me.distance(b))
        .then_with(|| a.id().cmp(b.id()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{MetaDataComponent, MovementComponent};
    use crate::diet::Carnivore;
    use crate::entity::Properties;
    use crate::vector::Vector;

    fn resource(id: &str, x: f64, y: f64) -> Entity {
        Entity::new(id)
            .with(MetaDataComponent::new(id, "resource"))
            .with(MovementComponent::at(Vector::new(x, y)))
    }

    fn cow(energy: f64, sees: &[&str]) -> Entity {
        let mut sensor = SensorComponent::radial(50.0);
        sensor.detected = sees.iter().map(|s| EntityId::from(*s)).collect();
        Entity::new("cow")
            .with(MetaDataComponent::new("cow", "creature"))
            .with(MovementComponent::at(Vector::new(0.0, 0.0)))
            .with(EnergyComponent::new(100.0, 0.0).with_current(energy))
            .with(sensor)
            .with(BrainComponent::herbivore("cow"))
            .with_properties(Properties::new().with("grab_radius", 2.0))
    }

    fn wolf(x: f64) -> Entity {
        Entity::new("wolf")
            .with(MetaDataComponent::new("wolf", "creature"))
            .with(MovementComponent::at(Vector::new(x, 0.0)))
            .with(BrainComponent::new("wolf", 50.0, Arc::new(Carnivore)))
    }

    fn table_with(entities: Vec<Entity>) -> EntityTable {
        let mut table = EntityTable::new();
        for e in entities {
            table.insert(e).unwrap();
        }
        table
    }

    fn brain(table: &EntityTable) -> &BrainComponent {
        table.get(&"cow".into()).unwrap().get::<BrainComponent>().unwrap()
    }

    #[test]
    fn perception_orders_edibles_by_distance_then_id() {
        let table = table_with(vec![
            cow(40.0, &["far", "b", "a", "wolf"]),
            resource("far", 30.0, 0.0),
            resource("b", 0.0, 1.0),
            resource("a", 1.0, 0.0),
            wolf(10.0),
        ]);
        let p = brain(&table).perceive(&table).unwrap();
        assert_eq!(p.edibles, vec![EntityId::from("a"), "b".into(), "far".into()]);
        assert_eq!(p.food_in_grab_range, vec![EntityId::from("a"), "b".into()]);
        assert_eq!(p.predators, vec![EntityId::from("wolf")]);
        assert!(p.hungry);
        assert!((p.signals.hunger - 0.6).abs() < 1e-12);
        assert!(p.signals.detected_entity && p.signals.food_in_grab_range);
    }

    #[test]
    fn hungry_wanderer_grabs_nearest_food_over_fleeing() {
        let table = table_with(vec![
            cow(40.0, &["grass", "wolf"]),
            resource("grass", 20.0, 0.0),
            wolf(5.0),
        ]);
        let b = brain(&table);
        let p = b.perceive(&table).unwrap();
        let next = b.decide(&Desire::wander(), false, &p, 2.0);
        assert_eq!(next, Some(Desire::grab("grass", 2.0)));
    }

    #[test]
    fn sated_wanderer_flees_predators() {
        let table = table_with(vec![
            cow(90.0, &["grass", "wolf"]),
            resource("grass", 20.0, 0.0),
            wolf(5.0),
        ]);
        let b = brain(&table);
        let p = b.perceive(&table).unwrap();
        assert!(!p.hungry);
        assert_eq!(
            b.decide(&Desire::wander(), false, &p, 2.0),
            Some(Desire::move_away(vec!["wolf".into()]))
        );
    }

    #[test]
    fn finished_desire_resets_to_wander_and_unfinished_is_kept() {
        let table = table_with(vec![cow(40.0, &[])]);
        let b = brain(&table);
        let p = b.perceive(&table).unwrap();
        assert_eq!(b.decide(&Desire::StayStill, true, &p, 2.0), Some(Desire::wander()));
        assert_eq!(b.decide(&Desire::grab("x", 2.0), false, &p, 2.0), None);
        assert_eq!(b.decide(&Desire::wander(), false, &p, 2.0), None);
    }

    #[test]
    fn vanished_detections_are_ignored() {
        let mut table = table_with(vec![
            cow(40.0, &["grass", "ghost"]),
            resource("grass", 1.0, 0.0),
        ]);
        table.get_mut(&"grass".into()).unwrap().mark_remove();
        let p = brain(&table).perceive(&table).unwrap();
        assert!(!p.signals.detected_entity);
        assert!(p.edibles.is_empty());
    }

    #[test]
    fn missing_creature_perceives_nothing() {
        let table = EntityTable::new();
        assert!(BrainComponent::herbivore("cow").perceive(&table).is_none());
    }
}
