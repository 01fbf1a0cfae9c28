//! Typed component slots and the plain-data components.
//!
//! Every entity owns a [`Components`] store with exactly one optional slot per
//! [`ComponentKind`]. Access is through the [`Component`] trait, so lookups
//! are resolved at compile time and an entity can never hold two components
//! of the same kind: inserting into an occupied slot replaces the old value.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::action::ActionComponent;
use crate::brain::BrainComponent;
use crate::desire::DesireComponent;
use crate::sensor::SensorComponent;
use crate::vector::Vector;

// ---------------------------------------------------------------------------
// ComponentKind
// ---------------------------------------------------------------------------

/// The closed set of component kinds an entity can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Movement,
    Energy,
    MetaData,
    Sensor,
    Desire,
    Action,
    Brain,
}

impl ComponentKind {
    /// Stable lowercase name, used in logs and snapshots.
    pub fn name(self) -> &'static str {
        match self {
            ComponentKind::Movement => "movement",
            ComponentKind::Energy => "energy",
            ComponentKind::MetaData => "metadata",
            ComponentKind::Sensor => "sensor",
            ComponentKind::Desire => "desire",
            ComponentKind::Action => "action",
            ComponentKind::Brain => "brain",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Component trait + slot store
// ---------------------------------------------------------------------------

/// A type that occupies one slot of an entity's [`Components`] store.
pub trait Component: Clone + fmt::Debug + 'static {
    /// The slot this component type lives in.
    const KIND: ComponentKind;

    fn slot(store: &Components) -> &Option<Self>;

    fn slot_mut(store: &mut Components) -> &mut Option<Self>;
}

macro_rules! component_slots {
    ($($field:ident: $ty:ty => $kind:ident),* $(,)?) => {
        /// Per-entity component storage: one optional slot per kind.
        #[derive(Debug, Clone, Default)]
        pub struct Components {
            $($field: Option<$ty>,)*
        }

        impl Components {
            /// Kinds currently present, in declaration order.
            pub fn kinds(&self) -> Vec<ComponentKind> {
                let mut kinds = Vec::new();
                $(
                    if self.$field.is_some() {
                        kinds.push(ComponentKind::$kind);
                    }
                )*
                kinds
            }
        }

        $(
            impl Component for $ty {
                const KIND: ComponentKind = ComponentKind::$kind;

                #[inline]
                fn slot(store: &Components) -> &Option<Self> {
                    &store.$field
                }

                #[inline]
                fn slot_mut(store: &mut Components) -> &mut Option<Self> {
                    &mut store.$field
                }
            }
        )*
    };
}

component_slots! {
    movement: MovementComponent => Movement,
    energy: EnergyComponent => Energy,
    metadata: MetaDataComponent => MetaData,
    sensor: SensorComponent => Sensor,
    desire: DesireComponent => Desire,
    action: ActionComponent => Action,
    brain: BrainComponent => Brain,
}

impl Components {
    pub fn get<C: Component>(&self) -> Option<&C> {
        C::slot(self).as_ref()
    }

    pub fn get_mut<C: Component>(&mut self) -> Option<&mut C> {
        C::slot_mut(self).as_mut()
    }

    /// Store `component`, returning the one it replaced (if any).
    pub fn insert<C: Component>(&mut self, component: C) -> Option<C> {
        C::slot_mut(self).replace(component)
    }

    pub fn take<C: Component>(&mut self) -> Option<C> {
        C::slot_mut(self).take()
    }

    pub fn has<C: Component>(&self) -> bool {
        C::slot(self).is_some()
    }

    pub fn len(&self) -> usize {
        self.kinds().len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds().is_empty()
    }
}

// ---------------------------------------------------------------------------
// MovementComponent
// ---------------------------------------------------------------------------

/// Kinematic state. `acceleration` is carried but not integrated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovementComponent {
    pub position: Vector,
    pub velocity: Vector,
    pub acceleration: Vector,
}

impl MovementComponent {
    pub fn at(position: Vector) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn with_velocity(mut self, velocity: Vector) -> Self {
        self.velocity = velocity;
        self
    }
}

// ---------------------------------------------------------------------------
// EnergyComponent
// ---------------------------------------------------------------------------

/// Energy reserve of an entity.
///
/// `current` always stays within `[0, max]`: every mutator clamps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnergyComponent {
    current: f64,
    max: f64,
    rate: f64,
}

impl EnergyComponent {
    pub const DEFAULT_MAX: f64 = 100.0;
    pub const DEFAULT_RATE: f64 = 0.01;

    /// A full reserve of `max` that drains by `rate` per unit of `dt`.
    pub fn new(max: f64, rate: f64) -> Self {
        let max = max.max(0.0);
        Self {
            current: max,
            max,
            rate,
        }
    }

    /// Builder: start at `current` instead of full.
    pub fn with_current(mut self, current: f64) -> Self {
        self.set_current(current);
        self
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn set_rate(&mut self, rate: f64) {
        self.rate = rate;
    }

    /// Set the reserve, clamped into `[0, max]`.
    pub fn set_current(&mut self, value: f64) {
        self.current = value.clamp(0.0, self.max);
    }

    /// Remove `amount` (floored at zero). Returns the new reserve.
    pub fn drain(&mut self, amount: f64) -> f64 {
        self.set_current(self.current - amount);
        self.current
    }

    /// Add `amount` (capped at `max`). Returns the energy actually gained.
    pub fn restore(&mut self, amount: f64) -> f64 {
        let before = self.current;
        self.set_current(self.current + amount);
        self.current - before
    }

    /// `current / max`, or 0 for an empty-capacity reserve.
    pub fn ratio(&self) -> f64 {
        if self.max > 0.0 {
            self.current / self.max
        } else {
            0.0
        }
    }

    pub fn is_depleted(&self) -> bool {
        self.current <= 0.0
    }
}

impl Default for EnergyComponent {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX, Self::DEFAULT_RATE)
    }
}

impl fmt::Display for EnergyComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.current as i64, self.max as i64)
    }
}

// ---------------------------------------------------------------------------
// MetaDataComponent
// ---------------------------------------------------------------------------

/// Display name and coarse entity type (`"resource"`, `"creature"`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaDataComponent {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl MetaDataComponent {
    pub const RESOURCE: &'static str = "resource";
    pub const CREATURE: &'static str = "creature";

    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
        }
    }

    pub fn is_resource(&self) -> bool {
        self.kind.eq_ignore_ascii_case(Self::RESOURCE)
    }

    pub fn is_creature(&self) -> bool {
        self.kind.eq_ignore_ascii_case(Self::CREATURE)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
