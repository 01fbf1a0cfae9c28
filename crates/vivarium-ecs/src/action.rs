//! One-tick physical commands produced by desires.
//!
//! An [`Action`] is queued in an entity's [`ActionComponent`] by the desire
//! system and consumed by the action system on the same tick. Actions only
//! touch state through the [`EntityTable`]; a target that has vanished turns
//! the action into a no-op.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::component::{ComponentKind, EnergyComponent, MovementComponent};
use crate::entity::{Entity, EntityId};
use crate::table::EntityTable;
use crate::vector::Vector;
use crate::EcsError;

/// Energy gained by a successful grab.
pub const GRAB_ENERGY: f64 = 50.0;

// ---------------------------------------------------------------------------
// Action variants
// ---------------------------------------------------------------------------

/// Steer along `direction` at the actor's cruising speed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveAction {
    pub direction: Vector,
    /// Energy per unit of speed.
    pub unit_cost: f64,
    /// Distance left to the destination. A move never travels further than
    /// this in one tick.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining: Option<f64>,
}

impl MoveAction {
    pub const DEFAULT_UNIT_COST: f64 = 0.01;

    pub fn new(direction: Vector) -> Self {
        Self {
            direction,
            unit_cost: Self::DEFAULT_UNIT_COST,
            remaining: None,
        }
    }

    /// Speed the actor will have after this move.
    ///
    /// The actor keeps its current speed, but never drops below its `speed`
    /// property. With a `remaining` distance the speed is capped so that a
    /// step of `dt` stops on the destination. A zero direction stops the
    /// actor.
    pub fn resulting_speed(&self, actor: &Entity, dt: f64) -> f64 {
        if self.direction.is_zero() {
            return 0.0;
        }
        let cruise = actor.velocity().size().max(actor.speed());
        match self.remaining {
            Some(remaining) if dt > 0.0 => cruise.min(remaining / dt),
            _ => cruise,
        }
    }
}

/// Consume `target`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrabAction {
    pub target: EntityId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    Move(MoveAction),
    Grab(GrabAction),
}

/// What applying an action did.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    Moved { velocity: Vector },
    Grabbed { target: EntityId, gained: f64 },
    /// The target was missing or already consumed.
    Skipped,
}

impl Action {
    pub fn move_towards(direction: Vector) -> Self {
        Action::Move(MoveAction::new(direction))
    }

    /// Move towards a destination `remaining` units away without overshooting.
    pub fn move_within(direction: Vector, remaining: f64) -> Self {
        Action::Move(MoveAction {
            remaining: Some(remaining),
            ..MoveAction::new(direction)
        })
    }

    pub fn grab(target: impl Into<EntityId>) -> Self {
        Action::Grab(GrabAction {
            target: target.into(),
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Action::Move(_) => "move",
            Action::Grab(_) => "grab",
        }
    }

    /// Energy the actor must hold to perform this action over a tick of `dt`.
    pub fn energy_cost(&self, actor: &Entity, dt: f64) -> f64 {
        match self {
            Action::Move(mv) => mv.unit_cost * mv.resulting_speed(actor, dt),
            Action::Grab(_) => 0.0,
        }
    }

    /// Whether `actor` has the components this action works on.
    pub fn applies_to(&self, actor: &Entity) -> bool {
        match self {
            Action::Move(_) => actor.has::<MovementComponent>(),
            Action::Grab(_) => true,
        }
    }

    /// Apply the action on behalf of `actor` for a tick of `dt`.
    pub fn run(
        &self,
        actor: &EntityId,
        table: &mut EntityTable,
        dt: f64,
    ) -> Result<ActionOutcome, EcsError> {
        match self {
            Action::Move(mv) => {
                let entity = table.require_mut(actor)?;
                let speed = mv.resulting_speed(entity, dt);
                let movement = entity.get_mut::<MovementComponent>().ok_or_else(|| {
                    EcsError::MissingComponent {
                        id: actor.clone(),
                        kind: ComponentKind::Movement,
                    }
                })?;
                movement.velocity = mv.direction.unit().mul(speed);
                Ok(ActionOutcome::Moved {
                    velocity: movement.velocity,
                })
            }
            Action::Grab(grab) => {
                if !table.contains(actor) {
                    return Err(EcsError::UnknownEntity { id: actor.clone() });
                }
                if !table.is_live(&grab.target) {
                    return Ok(ActionOutcome::Skipped);
                }
                if let Some(target) = table.get_mut(&grab.target) {
                    target.mark_remove();
                }
                let gained = table
                    .get_mut(actor)
                    .and_then(|e| e.get_mut::<EnergyComponent>())
                    .map(|energy| energy.restore(GRAB_ENERGY))
                    .unwrap_or(0.0);
                Ok(ActionOutcome::Grabbed {
                    target: grab.target.clone(),
                    gained,
                })
            }
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Move(mv) => write!(f, "Move({})", mv.direction),
            Action::Grab(grab) => write!(f, "Grab({})", grab.target),
        }
    }
}

// ---------------------------------------------------------------------------
// ActionComponent
// ---------------------------------------------------------------------------

/// At most one action waiting to be applied this tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionComponent {
    pub pending: Option<Action>,
}

impl ActionComponent {
    pub fn set(&mut self, action: Action) {
        self.pending = Some(action);
    }

    pub fn take(&mut self) -> Option<Action> {
        self.pending.take()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
