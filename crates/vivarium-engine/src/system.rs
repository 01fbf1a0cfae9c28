//! The [`System`] trait and per-tick context.
//!
//! A system is a named pass over the whole entity table. The world runs its
//! systems once per tick in registration order, handing each one mutable
//! access to the table plus a [`TickContext`] carrying the tick's `dt`, the
//! world bounds and the world's seeded RNG.
//!
//! Stateless systems can be plain functions registered through
//! [`World::add_fn_system`](crate::world::World::add_fn_system).

use vivarium_ecs::prelude::*;

// ---------------------------------------------------------------------------
// TickContext
// ---------------------------------------------------------------------------

/// Shared state for one tick, passed to every system in turn.
pub struct TickContext<'a> {
    /// Zero-based number of the tick being executed.
    pub tick: u64,
    /// Simulated time advanced by this tick.
    pub dt: f64,
    /// World extent (`width`, `height`).
    pub bounds: Vector,
    /// The world's deterministic RNG. All randomness in systems draws from it.
    pub rng: &'a mut SimRng,
}

impl TickContext<'_> {
    /// Borrow the parts of this context a desire needs.
    pub fn desire_context(&mut self) -> DesireContext<'_> {
        DesireContext::new(self.bounds, self.rng)
    }
}

// ---------------------------------------------------------------------------
// SystemError
// ---------------------------------------------------------------------------

/// Failure raised by a system. Aborts the tick.
#[derive(Debug, thiserror::Error)]
pub enum SystemError {
    #[error(transparent)]
    Ecs(#[from] EcsError),

    #[error("{0}")]
    Failed(String),
}

// ---------------------------------------------------------------------------
// System
// ---------------------------------------------------------------------------

/// A pass over the entity table executed once per tick.
pub trait System {
    /// Unique name within a world, used in logs and diagnostics.
    fn name(&self) -> &str;

    fn run(
        &mut self,
        entities: &mut EntityTable,
        ctx: &mut TickContext<'_>,
    ) -> Result<(), SystemError>;
}

/// A stateless system function.
pub type SystemFn = fn(&mut EntityTable, &mut TickContext<'_>) -> Result<(), SystemError>;

/// Adapter that gives a [`SystemFn`] a name.
#[derive(Debug)]
pub struct FnSystem {
    name: String,
    func: SystemFn,
}

impl FnSystem {
    pub fn new(name: impl Into<String>, func: SystemFn) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl System for FnSystem {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(
        &mut self,
        entities: &mut EntityTable,
        ctx: &mut TickContext<'_>,
    ) -> Result<(), SystemError> {
        (self.func)(entities, ctx)
    }
}
