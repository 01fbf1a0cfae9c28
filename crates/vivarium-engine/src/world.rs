//! The simulation world and its tick loop.
//!
//! A [`World`] owns the entity table, the ordered system pipeline, the
//! simulation clock and the seeded RNG. Each call to [`World::update`]:
//!
//! 1. Records the population at the start of the tick.
//! 2. Runs every registered system once, in registration order, each with
//!    mutable access to the entity table.
//! 3. Removes every entity whose `remove` flag was raised during the tick.
//! 4. Computes `dt` for the next tick from the caller-supplied frame time (or
//!    the wall-clock milliseconds the tick took), scaled by the configured
//!    time resolution, and advances the clock by it.
//!
//! With a fixed external `dt` and the same seed the loop is fully
//! deterministic: system order is fixed, entity iteration follows id order
//! and all randomness draws from the world's `Pcg64`.
//!
//! # Example
//!
//! ```
//! use vivarium_engine::prelude::*;
//!
//! let mut world = World::with_default_pipeline(WorldConfig::default()).unwrap();
//! world
//!     .add(Entity::new("rock").with(MovementComponent::at(Vector::new(5.0, 5.0))))
//!     .unwrap();
//!
//! world.run(10, Some(16.0)).unwrap();
//! assert_eq!(world.tick_count(), 10);
//! assert_eq!(world.stats().population, 1);
//! ```

use std::time::{Duration, Instant};

use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use vivarium_ecs::prelude::*;

use crate::stats::WorldStats;
use crate::system::{FnSystem, System, SystemError, SystemFn, TickContext};
use crate::systems;

/// Default scale from frame milliseconds to simulated time.
pub const DEFAULT_TIME_RESOLUTION: f64 = 0.001;

/// `dt` used by the very first tick, before any frame has been measured.
pub const DEFAULT_INITIAL_DT: f64 = 0.000_001;

// ---------------------------------------------------------------------------
// WorldConfig
// ---------------------------------------------------------------------------

/// Construction parameters of a [`World`].
///
/// Checked by [`validate`](Self::validate) when a world is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub width: f64,
    pub height: f64,
    /// Seed of the world RNG.
    pub seed: u64,
    /// Multiplier from frame time (ms) to simulated `dt`. Positive, finite.
    pub time_resolution: f64,
    /// `dt` of the first tick. Non-negative, finite.
    pub initial_dt: f64,
}

impl Default for WorldConfig {
    /// A 100x100 world seeded with 0.
    fn default() -> Self {
        Self {
            width: 100.0,
            height: 100.0,
            seed: 0,
            time_resolution: DEFAULT_TIME_RESOLUTION,
            initial_dt: DEFAULT_INITIAL_DT,
        }
    }
}

impl WorldConfig {
    /// Reject dimensions or a time resolution that are not positive and
    /// finite, and an `initial_dt` that is negative or not finite.
    pub fn validate(&self) -> Result<(), WorldError> {
        let positive = |field: &'static str, value: f64| {
            if value > 0.0 && value.is_finite() {
                Ok(())
            } else {
                Err(WorldError::InvalidConfig { field, value })
            }
        };
        positive("width", self.width)?;
        positive("height", self.height)?;
        positive("time_resolution", self.time_resolution)?;
        if !(self.initial_dt >= 0.0 && self.initial_dt.is_finite()) {
            return Err(WorldError::InvalidConfig {
                field: "initial_dt",
                value: self.initial_dt,
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Diagnostics / reports / errors
// ---------------------------------------------------------------------------

/// Timing diagnostics for the last tick.
#[derive(Debug, Clone, Default)]
pub struct TickDiagnostics {
    /// Wall-clock time per system (in order of execution).
    pub system_times: Vec<(String, Duration)>,
    /// Time spent removing marked entities.
    pub sweep_time: Duration,
    /// Total time for the tick.
    pub total_time: Duration,
}

/// Summary of one completed tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    /// Number of ticks completed, including this one.
    pub tick: u64,
    /// Entities removed at the end of this tick, in id order.
    pub removed: Vec<EntityId>,
    /// `dt` computed for the next tick.
    pub dt: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    #[error("invalid world setting {field} = {value}")]
    InvalidConfig { field: &'static str, value: f64 },

    /// A system with this name is already registered.
    #[error("duplicate system name '{name}'")]
    DuplicateSystem { name: String },

    #[error("entity '{id}' already exists")]
    DuplicateEntity { id: EntityId },

    #[error(transparent)]
    Ecs(EcsError),

    /// A system failed; the tick was aborted after the systems before it ran.
    #[error("system '{system}' failed")]
    SystemFailed {
        system: String,
        #[source]
        source: SystemError,
    },
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

pub struct World {
    config: WorldConfig,
    entities: EntityTable,
    systems: Vec<Box<dyn System>>,
    /// `dt` the next tick will run with.
    dt: f64,
    clock: f64,
    tick_counter: u64,
    rng: SimRng,
    stats: WorldStats,
    last_diagnostics: TickDiagnostics,
}

impl World {
    /// Create an empty world without systems.
    pub fn new(config: WorldConfig) -> Result<Self, WorldError> {
        config.validate()?;
        Ok(Self {
            rng: SimRng::seed_from_u64(config.seed),
            dt: config.initial_dt,
            stats: WorldStats {
                time_resolution: config.time_resolution,
                ..WorldStats::default()
            },
            config,
            entities: EntityTable::new(),
            systems: Vec::new(),
            clock: 0.0,
            tick_counter: 0,
            last_diagnostics: TickDiagnostics::default(),
        })
    }

    /// Create a world running the built-in pipeline: brain, sensor, desire,
    /// action, movement, energy.
    pub fn with_default_pipeline(config: WorldConfig) -> Result<Self, WorldError> {
        let mut world = Self::new(config)?;
        for system in systems::default_pipeline() {
            world.add_boxed_system(system)?;
        }
        Ok(world)
    }

    // -- entities -----------------------------------------------------------

    /// Register an entity. Ids must be unique.
    pub fn add(&mut self, entity: Entity) -> Result<(), WorldError> {
        self.entities.insert(entity).map_err(|err| match err {
            EcsError::DuplicateEntity { id } => WorldError::DuplicateEntity { id },
            other => WorldError::Ecs(other),
        })
    }

    /// Remove an entity immediately, outside the tick loop.
    pub fn remove(&mut self, id: &EntityId) -> Option<Entity> {
        self.entities.remove(id)
    }

    pub fn get(&self, id: &EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn get_mut(&mut self, id: &EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id)
    }

    /// All entities, in id order.
    pub fn entities(&self) -> Vec<&Entity> {
        self.entities.iter().collect()
    }

    pub fn entity_table(&self) -> &EntityTable {
        &self.entities
    }

    /// Mutable access to the entity table.
    ///
    /// Meant for setup and tests; during simulation state changes belong in
    /// systems.
    pub fn entity_table_mut(&mut self) -> &mut EntityTable {
        &mut self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// The first other live entity within `id`'s `sensor_radius` property.
    ///
    /// Entities sharing its exact position are ignored.
    pub fn any_near(&self, id: &EntityId) -> Option<&Entity> {
        self.entities.any_near(id)
    }

    // -- systems ------------------------------------------------------------

    /// Append a system to the pipeline. Names must be unique.
    pub fn add_system(&mut self, system: impl System + 'static) -> Result<(), WorldError> {
        self.add_boxed_system(Box::new(system))
    }

    /// Append a plain function as a named system.
    pub fn add_fn_system(&mut self, name: &str, func: SystemFn) -> Result<(), WorldError> {
        self.add_system(FnSystem::new(name, func))
    }

    pub fn add_boxed_system(&mut self, system: Box<dyn System>) -> Result<(), WorldError> {
        if self.systems.iter().any(|s| s.name() == system.name()) {
            return Err(WorldError::DuplicateSystem {
                name: system.name().to_owned(),
            });
        }
        self.systems.push(system);
        Ok(())
    }

    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    /// The names of all registered systems, in execution order.
    pub fn system_names(&self) -> Vec<&str> {
        self.systems.iter().map(|s| s.name()).collect()
    }

    // -- tick loop ----------------------------------------------------------

    /// Execute one tick.
    ///
    /// `external_dt` is the frame time in milliseconds; `None` uses the
    /// measured duration of this tick instead. Either way the value is scaled
    /// by the time resolution and becomes the `dt` of the *next* tick.
    ///
    /// A failing system aborts the tick: later systems do not run, nothing is
    /// swept and the clock does not advance. Changes made by earlier systems
    /// are kept.
    pub fn update(&mut self, external_dt: Option<f64>) -> Result<TickReport, WorldError> {
        let tick_start = Instant::now();
        self.stats.population = self.entities.len();

        let mut system_times = Vec::with_capacity(self.systems.len());
        let mut ctx = TickContext {
            tick: self.tick_counter,
            dt: self.dt,
            bounds: Vector::new(self.config.width, self.config.height),
            rng: &mut self.rng,
        };
        for system in &mut self.systems {
            let sys_start = Instant::now();
            system
                .run(&mut self.entities, &mut ctx)
                .map_err(|source| WorldError::SystemFailed {
                    system: system.name().to_owned(),
                    source,
                })?;
            system_times.push((system.name().to_owned(), sys_start.elapsed()));
        }

        let sweep_start = Instant::now();
        let removed: Vec<EntityId> = self
            .entities
            .sweep_removed()
            .into_iter()
            .map(|entity| {
                tracing::info!(id = %entity.id(), name = entity.name(), "entity removed");
                entity.id().clone()
            })
            .collect();
        self.stats.removed_count += removed.len() as u64;
        let sweep_time = sweep_start.elapsed();

        self.tick_counter += 1;

        let frame_time = match external_dt {
            Some(dt) => dt,
            None => tick_start.elapsed().as_secs_f64() * 1000.0,
        };
        self.stats.record_frame(frame_time, external_dt.is_some());
        self.dt = frame_time * self.config.time_resolution;
        self.clock += self.dt;
        self.stats.simulation_clock = self.clock;

        self.last_diagnostics = TickDiagnostics {
            system_times,
            sweep_time,
            total_time: tick_start.elapsed(),
        };

        Ok(TickReport {
            tick: self.tick_counter,
            removed,
            dt: self.dt,
        })
    }

    /// Run `ticks` ticks with the same `external_dt`, stopping at the first
    /// failure. Returns the ids removed across all ticks.
    pub fn run(
        &mut self,
        ticks: u64,
        external_dt: Option<f64>,
    ) -> Result<Vec<EntityId>, WorldError> {
        let mut removed = Vec::new();
        for _ in 0..ticks {
            removed.extend(self.update(external_dt)?.removed);
        }
        Ok(removed)
    }

    // -- accessors ----------------------------------------------------------

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn width(&self) -> f64 {
        self.config.width
    }

    pub fn height(&self) -> f64 {
        self.config.height
    }

    /// `dt` the next tick will run with.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Simulated time elapsed.
    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_counter
    }

    pub fn stats(&self) -> &WorldStats {
        &self.stats
    }

    /// Diagnostics from the last tick (timing per system).
    pub fn last_diagnostics(&self) -> &TickDiagnostics {
        &self.last_diagnostics
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("config", &self.config)
            .field("entities", &self.entities.len())
            .field("systems", &self.system_names())
            .field("tick", &self.tick_counter)
            .field("clock", &self.clock)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
