//! Pluggable edibility predicates.

use std::fmt;
use std::sync::Arc;

use crate::entity::{Entity, EntityId};

/// Decides which entities a creature can eat.
pub trait DietReasoner: fmt::Debug + Send + Sync {
    /// Stable lowercase name (`"herbivore"`, `"carnivore"`).
    fn name(&self) -> &'static str;

    /// Whether `eater` may consume `candidate`.
    fn is_edible(&self, eater: &EntityId, candidate: &Entity) -> bool;
}

/// Eats resources.
#[derive(Debug, Clone, Copy, Default)]
pub struct Herbivore;

impl DietReasoner for Herbivore {
    fn name(&self) -> &'static str {
        "herbivore"
    }

    fn is_edible(&self, _eater: &EntityId, candidate: &Entity) -> bool {
        candidate.is_resource()
    }
}

/// Eats other creatures.
#[derive(Debug, Clone, Copy, Default)]
pub struct Carnivore;

impl DietReasoner for Carnivore {
    fn name(&self) -> &'static str {
        "carnivore"
    }

    fn is_edible(&self, eater: &EntityId, candidate: &Entity) -> bool {
        candidate.is_creature() && candidate.id() != eater
    }
}

/// Look up a diet by name, case-insensitively.
pub fn diet_from_name(name: &str) -> Option<Arc<dyn DietReasoner>> {
    match name.to_ascii_lowercase().as_str() {
        "herbivore" => Some(Arc::new(Herbivore)),
        "carnivore" => Some(Arc::new(Carnivore)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::MetaDataComponent;

    fn creature(id: &str) -> Entity {
        Entity::new(id).with(MetaDataComponent::new(id, "creature"))
    }

    fn resource(id: &str) -> Entity {
        Entity::new(id).with(MetaDataComponent::new(id, "resource"))
    }

    #[test]
    fn herbivore_eats_resources_only() {
        let me = EntityId::from("cow");
        assert!(Herbivore.is_edible(&me, &resource("grass")));
        assert!(!Herbivore.is_edible(&me, &creature("wolf")));
        assert!(!Herbivore.is_edible(&me, &Entity::new("rock")));
    }

    #[test]
    fn carnivore_eats_other_creatures() {
        let me = EntityId::from("wolf");
        assert!(Carnivore.is_edible(&me, &creature("cow")));
        assert!(!Carnivore.is_edible(&me, &creature("wolf")));
        assert!(!Carnivore.is_edible(&me, &resource("grass")));
    }

    #[test]
    fn lookup_by_name() {
        assert_eq!(diet_from_name("Carnivore").map(|d| d.name()), Some("carnivore"));
        assert_eq!(diet_from_name("herbivore").map(|d| d.name()), Some("herbivore"));
        assert!(diet_from_name("omnivore").is_none());
    }
}
