//! Vivarium Scenario -- declarative world descriptions.
//!
//! Reads a JSON scenario (world size, seed, optional system list, entity
//! generators and explicit entities) and builds a ready-to-run
//! [`World`](vivarium_engine::world::World). Every configuration or lookup
//! problem is reported as a [`ScenarioError`] before the first tick.
//!
//! # Modules
//!
//! - [`document`]: serde types mirroring the file format.
//! - [`loader`]: validation, reference resolution and world construction.
//! - [`generator`]: template expansion for bulk entities.
//! - [`random_param`]: `random(a, b, ...)` template values.
//!
//! # Example
//!
//! ```
//! use vivarium_scenario::{load_str, LoadOptions};
//!
//! let scenario = load_str(
//!     r#"{
//!         "width": 100, "height": 100, "random_seed": 7,
//!         "entities": [
//!             {"type": "Creature", "id": "cow", "position": {"x": 10, "y": 10},
//!              "desire": "Wander"},
//!             {"type": "Resource", "id": "grass", "position": {"x": 20, "y": 10}}
//!         ]
//!     }"#,
//!     &LoadOptions::default(),
//! )
//! .unwrap();
//!
//! assert_eq!(scenario.world.len(), 2);
//! ```

#![deny(unsafe_code)]

use std::path::PathBuf;

pub mod document;
pub mod generator;
pub mod loader;
pub mod random_param;

pub use loader::{load_path, load_str, LoadOptions, Scenario};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced while loading a scenario.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    /// The document is not valid JSON or does not match the format.
    #[error("invalid scenario document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot read scenario '{path}'")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A desire references an entity id that is not declared.
    #[error("entity with id '{id}' not found (referenced by '{referenced_by}')")]
    UnknownEntity { id: String, referenced_by: String },

    #[error("no desire named '{name}' (entity '{entity}')")]
    UnknownDesire { name: String, entity: String },

    #[error("no built-in system named '{name}'")]
    UnknownSystem { name: String },

    /// The same system appears twice in the `systems` list.
    #[error("system '{name}' listed more than once")]
    DuplicateSystem { name: String },

    #[error("no diet named '{name}' (entity '{entity}')")]
    UnknownDiet { name: String, entity: String },

    /// A `type` (or named position) that is not valid where it appears.
    #[error("type '{found}' is not compatible with {expected}")]
    InvalidType { found: String, expected: String },

    #[error("{context} needs a '{field}'")]
    Missing { field: String, context: String },

    #[error("invalid world setting {field} = {value}")]
    InvalidConfig { field: &'static str, value: f64 },

    #[error("invalid random parameter '{expression}': {reason}")]
    InvalidRandomParam { expression: String, reason: String },

    /// The world rejected an entity (duplicate id).
    #[error(transparent)]
    World(#[from] vivarium_engine::world::WorldError),
}
