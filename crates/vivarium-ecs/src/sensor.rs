//! Radial sensing and the position index it scans.
//!
//! A [`PositionIndex`] is a per-tick snapshot of every positioned entity.
//! Sensors query it through [`PositionIndex::within`]; the current index is a
//! linear scan, and a spatial index can replace it without touching callers.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::entity::EntityId;
use crate::vector::Vector;

// ---------------------------------------------------------------------------
// PositionIndex
// ---------------------------------------------------------------------------

/// Snapshot of entity positions, in id order.
#[derive(Debug, Clone, Default)]
pub struct PositionIndex {
    entries: Vec<(EntityId, Vector)>,
}

impl PositionIndex {
    pub fn from_entries(entries: impl IntoIterator<Item = (EntityId, Vector)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    pub fn position_of(&self, id: &EntityId) -> Option<Vector> {
        self.entries
            .iter()
            .find(|(candidate, _)| candidate == id)
            .map(|(_, pos)| *pos)
    }

    /// Ids of every indexed entity inside the closed disk around `center`.
    pub fn within(&self, center: Vector, radius: f64) -> impl Iterator<Item = &EntityId> + '_ {
        self.entries
            .iter()
            .filter(move |(_, pos)| center.distance(*pos) <= radius)
            .map(|(id, _)| id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Sensor
// ---------------------------------------------------------------------------

/// Detects entities within a fixed radius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadialSensor {
    pub radius: f64,
}

impl RadialSensor {
    pub fn new(radius: f64) -> Self {
        Self { radius }
    }
}

/// A sensing strategy owned by a [`SensorComponent`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Sensor {
    Radial(RadialSensor),
}

impl Sensor {
    pub fn radial(radius: f64) -> Self {
        Sensor::Radial(RadialSensor::new(radius))
    }

    /// Largest distance at which this sensor can detect anything.
    pub fn reach(&self) -> f64 {
        match self {
            Sensor::Radial(radial) => radial.radius,
        }
    }

    /// Add every entity this sensor detects from `me` at `origin` to `out`.
    pub fn scan(
        &self,
        me: &EntityId,
        origin: Vector,
        index: &PositionIndex,
        out: &mut BTreeSet<EntityId>,
    ) {
        match self {
            Sensor::Radial(radial) => {
                out.extend(
                    index
                        .within(origin, radial.radius)
                        .filter(|id| *id != me)
                        .cloned(),
                );
            }
        }
    }
}

// ---------------------------------------------------------------------------
// SensorComponent
// ---------------------------------------------------------------------------

/// The sensors an entity owns plus what they saw on the last scan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorComponent {
    pub sensors: Vec<Sensor>,
    /// Rebuilt from scratch on every scan.
    pub detected: BTreeSet<EntityId>,
}

impl SensorComponent {
    pub fn new(sensors: Vec<Sensor>) -> Self {
        Self {
            sensors,
            detected: BTreeSet::new(),
        }
    }

    pub fn radial(radius: f64) -> Self {
        Self::new(vec![Sensor::radial(radius)])
    }

    /// Replace `detected` with the union of all sensors' detections.
    pub fn rescan(&mut self, me: &EntityId, origin: Vector, index: &PositionIndex) {
        self.detected.clear();
        for sensor in &self.sensors {
            sensor.scan(me, origin, index, &mut self.detected);
        }
    }

    pub fn max_radius(&self) -> f64 {
        self.sensors.iter().map(Sensor::reach).fold(0.0, f64::max)
    }

    pub fn sees(&self, id: &EntityId) -> bool {
        self.detected.contains(id)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
