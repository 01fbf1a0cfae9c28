//! Entity identity, free-form properties, and the [`Entity`] aggregate.
//!
//! An entity is an [`EntityId`], a soft-delete flag, a bag of tunable
//! [`Properties`], and a typed [`Components`] store. There is no hierarchy of
//! entity kinds: a creature is simply an entity carrying a brain, sensors and
//! energy, a resource is one whose metadata says `"resource"`.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::component::{Component, ComponentKind, Components, MetaDataComponent, MovementComponent};
use crate::vector::Vector;

// ---------------------------------------------------------------------------
// EntityId
// ---------------------------------------------------------------------------

/// Unique, immutable entity identifier.
///
/// Ordered so that entity tables iterate deterministically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

/// Free-form tunables attached to an entity (`speed`, `size`, `diet`, ...).
///
/// Values are arbitrary JSON; the typed getters fall back to the documented
/// defaults when a key is absent or has the wrong type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Properties(BTreeMap<String, serde_json::Value>);

impl Properties {
    pub const SPEED: &'static str = "speed";
    pub const SIZE: &'static str = "size";
    pub const COLOR: &'static str = "color";
    pub const DIET: &'static str = "diet";
    pub const GRAB_RADIUS: &'static str = "grab_radius";
    pub const SENSOR_RADIUS: &'static str = "sensor_radius";
    pub const NAME: &'static str = "name";

    pub const DEFAULT_SPEED: f64 = 1.0;
    pub const DEFAULT_SIZE: f64 = 2.0;
    pub const DEFAULT_GRAB_RADIUS: f64 = 0.0;
    pub const DEFAULT_SENSOR_RADIUS: f64 = 7.0;
    pub const DEFAULT_DIET: &'static str = "herbivore";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(map: BTreeMap<String, serde_json::Value>) -> Self {
        Self(map)
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Builder form of [`set`](Self::set).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.0.get(key).and_then(serde_json::Value::as_f64)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(serde_json::Value::as_str)
    }

    pub fn speed(&self) -> f64 {
        self.get_f64(Self::SPEED).unwrap_or(Self::DEFAULT_SPEED)
    }

    pub fn size(&self) -> f64 {
        self.get_f64(Self::SIZE).unwrap_or(Self::DEFAULT_SIZE)
    }

    pub fn grab_radius(&self) -> f64 {
        self.get_f64(Self::GRAB_RADIUS)
            .unwrap_or(Self::DEFAULT_GRAB_RADIUS)
    }

    pub fn sensor_radius(&self) -> f64 {
        self.get_f64(Self::SENSOR_RADIUS)
            .unwrap_or(Self::DEFAULT_SENSOR_RADIUS)
    }

    pub fn diet(&self) -> &str {
        self.get_str(Self::DIET).unwrap_or(Self::DEFAULT_DIET)
    }

    pub fn color(&self) -> Option<&str> {
        self.get_str(Self::COLOR)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &serde_json::Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// An identity plus a composable set of components.
#[derive(Debug, Clone)]
pub struct Entity {
    id: EntityId,
    /// Soft-delete marker. The world sweeps marked entities at the end of the
    /// tick in which the flag was raised, never mid-tick.
    pub remove: bool,
    pub properties: Properties,
    components: Components,
}

impl Entity {
    pub fn new(id: impl Into<EntityId>) -> Self {
        Self {
            id: id.into(),
            remove: false,
            properties: Properties::default(),
            components: Components::default(),
        }
    }

    /// Builder: attach a component (replacing any of the same kind).
    pub fn with<C: Component>(mut self, component: C) -> Self {
        self.components.insert(component);
        self
    }

    /// Builder: replace the property bag.
    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    pub fn id(&self) -> &EntityId {
        &self.id
    }

    // -- components ---------------------------------------------------------

    pub fn get<C: Component>(&self) -> Option<&C> {
        self.components.get::<C>()
    }

    pub fn get_mut<C: Component>(&mut self) -> Option<&mut C> {
        self.components.get_mut::<C>()
    }

    /// Attach `component`, returning the one it replaced (if any).
    pub fn insert<C: Component>(&mut self, component: C) -> Option<C> {
        self.components.insert(component)
    }

    /// Detach and return the component of kind `C`.
    pub fn take<C: Component>(&mut self) -> Option<C> {
        self.components.take::<C>()
    }

    pub fn has<C: Component>(&self) -> bool {
        self.components.has::<C>()
    }

    /// Return the component of kind `C`, inserting `C::default()` first if absent.
    pub fn get_or_insert_default<C: Component + Default>(&mut self) -> &mut C {
        C::slot_mut(&mut self.components).get_or_insert_with(C::default)
    }

    pub fn component_kinds(&self) -> Vec<ComponentKind> {
        self.components.kinds()
    }

    // -- lifecycle ----------------------------------------------------------

    pub fn mark_remove(&mut self) {
        self.remove = true;
    }

    // -- derived views ------------------------------------------------------

    /// Current position, or the origin for entities without movement.
    pub fn position(&self) -> Vector {
        self.get::<MovementComponent>()
            .map(|m| m.position)
            .unwrap_or_default()
    }

    pub fn velocity(&self) -> Vector {
        self.get::<MovementComponent>()
            .map(|m| m.velocity)
            .unwrap_or_default()
    }

    pub fn distance(&self, other: &Entity) -> f64 {
        self.position().distance(other.position())
    }

    pub fn distance_to(&self, point: Vector) -> f64 {
        self.position().distance(point)
    }

    /// Display name: the `name` property, then metadata name, then the id.
    pub fn name(&self) -> &str {
        if let Some(name) = self.properties.get_str(Properties::NAME) {
            return name;
        }
        match self.get::<MetaDataComponent>() {
            Some(meta) if !meta.name.is_empty() => &meta.name,
            _ => self.id.as_str(),
        }
    }

    /// The metadata type, or `"entity"` when no metadata is attached.
    pub fn kind(&self) -> &str {
        self.get::<MetaDataComponent>()
            .map(|m| m.kind.as_str())
            .unwrap_or("entity")
    }

    pub fn is_resource(&self) -> bool {
        self.get::<MetaDataComponent>()
            .is_some_and(MetaDataComponent::is_resource)
    }

    pub fn is_creature(&self) -> bool {
        self.get::<MetaDataComponent>()
            .is_some_and(MetaDataComponent::is_creature)
    }

    pub fn size(&self) -> f64 {
        self.properties.size()
    }

    pub fn speed(&self) -> f64 {
        self.properties.speed()
    }

    pub fn grab_radius(&self) -> f64 {
        self.properties.grab_radius()
    }

    /// `true` when `other` lies within this entity's grab radius.
    pub fn in_grab_range(&self, other: &Entity) -> bool {
        self.distance(other) <= self.grab_radius()
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}, {})", self.kind(), self.id, self.position())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
