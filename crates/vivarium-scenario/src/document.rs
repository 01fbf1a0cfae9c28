//! The scenario document format.
//!
//! A scenario is JSON, either wrapped in a frame:
//!
//! ```json
//! { "frame": { "number": 0, "world": { "width": 200, "entities": [] } } }
//! ```
//!
//! or as the bare world object. These types mirror the file one to one; all
//! validation and reference resolution happens in [`crate::loader`].
//! Desires are kept as raw JSON because they may reference entities that are
//! declared later in the file.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Top level
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScenarioDocument {
    Frame { frame: FrameDocument },
    World(WorldDocument),
}

impl ScenarioDocument {
    /// Parse either form.
    ///
    /// Dispatches on the `frame` key instead of relying on untagged
    /// deserialization so that errors point at the offending field.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        let mut value: Value = serde_json::from_str(text)?;
        if let Some(frame) = value.get_mut("frame").map(Value::take) {
            return Ok(ScenarioDocument::Frame {
                frame: serde_json::from_value(frame)?,
            });
        }
        Ok(ScenarioDocument::World(serde_json::from_value(value)?))
    }

    /// Frame number and world, whichever form the file used.
    pub fn into_parts(self) -> (u64, WorldDocument) {
        match self {
            ScenarioDocument::Frame { frame } => (frame.number, frame.world),
            ScenarioDocument::World(world) => (0, world),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameDocument {
    #[serde(default)]
    pub number: u64,
    pub world: WorldDocument,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorldDocument {
    /// Optional, must be `"World"` when present.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default = "default_extent")]
    pub width: f64,
    #[serde(default = "default_extent")]
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub random_seed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_resolution: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_dt: Option<f64>,
    /// Pipeline override; the built-in pipeline when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub systems: Option<Vec<String>>,
    #[serde(default)]
    pub generators: Vec<GeneratorDocument>,
    #[serde(default)]
    pub entities: Vec<EntityDocument>,
}

fn default_extent() -> f64 {
    100.0
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDocument {
    /// `Entity`, `Resource` or `Creature`, case-insensitive.
    #[serde(rename = "type", default = "default_entity_type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<PositionDocument>,
    /// Shorthand for the `size` property.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
    #[serde(default)]
    pub sensors: Vec<SensorDocument>,
    /// A desire name or object, resolved once every entity is known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desire: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy: Option<EnergyDocument>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brain: Option<BrainDocument>,
}

fn default_entity_type() -> String {
    "Entity".to_owned()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PositionDocument {
    Point { x: f64, y: f64 },
    /// Only `"Somewhere"` (a uniformly random point) is recognized.
    Named(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorDocument {
    pub radius: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnergyDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrainDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hunger_threshold: Option<f64>,
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// Stamps out `quantity` entities from a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorDocument {
    #[serde(rename = "type", default = "default_entity_type")]
    pub kind: String,
    #[serde(default = "default_quantity")]
    pub quantity: usize,
    /// Defaults to `generated_<type>_`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_prefix: Option<String>,
    /// Any entity fields; string values may be `random(...)` expressions.
    #[serde(default)]
    pub template: serde_json::Map<String, Value>,
}

fn default_quantity() -> usize {
    10
}
