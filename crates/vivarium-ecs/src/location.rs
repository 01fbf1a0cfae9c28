//! Late-bound movement targets.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entity::EntityId;
use crate::table::EntityTable;
use crate::vector::Vector;

/// Where a desire wants to go: a fixed point, or wherever an entity is now.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    Point(Vector),
    Entity(EntityId),
}

impl Location {
    /// Current coordinates of the target.
    ///
    /// `None` when the referenced entity is gone or already marked for
    /// removal.
    pub fn resolve(&self, table: &EntityTable) -> Option<Vector> {
        match self {
            Location::Point(point) => Some(*point),
            Location::Entity(id) => table.live_position(id),
        }
    }

    pub fn entity(&self) -> Option<&EntityId> {
        match self {
            Location::Entity(id) => Some(id),
            Location::Point(_) => None,
        }
    }
}

impl From<Vector> for Location {
    fn from(point: Vector) -> Self {
        Location::Point(point)
    }
}

impl From<EntityId> for Location {
    fn from(id: EntityId) -> Self {
        Location::Entity(id)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Point(point) => write!(f, "{point}"),
            Location::Entity(id) => write!(f, "{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::MovementComponent;
    use crate::entity::Entity;

    #[test]
    fn entity_location_tracks_live_position() {
        let mut table = EntityTable::new();
        table
            .insert(Entity::new("food").with(MovementComponent::at(Vector::new(4.0, 2.0))))
            .unwrap();
        let loc = Location::from(EntityId::from("food"));
        assert_eq!(loc.resolve(&table), Some(Vector::new(4.0, 2.0)));

        table.get_mut(&"food".into()).unwrap().mark_remove();
        assert_eq!(loc.resolve(&table), None);
        assert_eq!(Location::from(EntityId::from("ghost")).resolve(&table), None);
    }

    #[test]
    fn point_always_resolves() {
        let loc = Location::from(Vector::new(1.0, 1.0));
        assert_eq!(loc.resolve(&EntityTable::new()), Some(Vector::new(1.0, 1.0)));
        assert_eq!(loc.entity(), None);
    }
}
