//! High-level intentions and their translation into actions.
//!
//! A [`Desire`] is what an entity is trying to do over many ticks. Each tick
//! the desire system calls [`Desire::run`], which may emit one [`Action`] for
//! the action system to apply. Composite desires own their sub-intentions by
//! value: [`Desire::Grab`] approaches through a [`MoveTo`], and
//! [`Desire::Wander`] walks a chain of short [`MoveTo`] legs.
//!
//! Desires never hold references to other entities, only [`EntityId`]s that
//! are resolved against the [`EntityTable`] on every call. A target that
//! disappears simply stops resolving.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::entity::{Entity, EntityId};
use crate::location::Location;
use crate::sensor::SensorComponent;
use crate::table::EntityTable;
use crate::vector::Vector;
use crate::SimRng;

/// How close a [`MoveTo`] must get before it counts as arrived.
///
/// A `MoveTo` caps its last step at the remaining distance, so arrival only
/// has to absorb floating-point drift. A [`Desire::Grab`] reaches at least
/// this far as well.
pub const DEFAULT_ARRIVAL_TOLERANCE: f64 = 0.5;

/// Default length of a single wander leg.
pub const DEFAULT_MAX_STRIDE: f64 = 30.0;

// ---------------------------------------------------------------------------
// DesireContext
// ---------------------------------------------------------------------------

/// World state a desire may consult besides the entity table.
pub struct DesireContext<'a> {
    /// World extent: positions lie in `[0, bounds.x) x [0, bounds.y)`.
    pub bounds: Vector,
    pub rng: &'a mut SimRng,
}

impl<'a> DesireContext<'a> {
    pub fn new(bounds: Vector, rng: &'a mut SimRng) -> Self {
        Self { bounds, rng }
    }

    /// A uniformly random point inside the world bounds.
    pub fn random_point(&mut self) -> Vector {
        Vector::new(
            sample_axis(self.rng, self.bounds.x),
            sample_axis(self.rng, self.bounds.y),
        )
    }
}

fn sample_axis(rng: &mut SimRng, extent: f64) -> f64 {
    if extent > 0.0 {
        rng.gen_range(0.0..extent)
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// MoveTo
// ---------------------------------------------------------------------------

/// Head straight for a [`Location`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveTo {
    pub location: Location,
    /// Keep following the target after reaching it.
    #[serde(default)]
    pub never_satisfied: bool,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

fn default_tolerance() -> f64 {
    DEFAULT_ARRIVAL_TOLERANCE
}

impl MoveTo {
    pub fn new(location: impl Into<Location>) -> Self {
        Self {
            location: location.into(),
            never_satisfied: false,
            tolerance: DEFAULT_ARRIVAL_TOLERANCE,
        }
    }

    /// A `MoveTo` that never reports itself satisfied.
    pub fn endless(location: impl Into<Location>) -> Self {
        Self {
            never_satisfied: true,
            ..Self::new(location)
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Step towards the target, stopping on it rather than overshooting.
    pub fn run(&self, me: &Entity, table: &EntityTable) -> Option<Action> {
        let target = self.location.resolve(table)?;
        let offset = Vector::from_points(me.position(), target);
        Some(Action::move_within(offset, offset.size()))
    }

    pub fn satisfied(&self, me: &Entity, table: &EntityTable) -> bool {
        if self.never_satisfied {
            return false;
        }
        match self.location.resolve(table) {
            Some(target) => me.position().approx_eq(target, self.tolerance),
            None => true,
        }
    }
}

// ---------------------------------------------------------------------------
// Desire
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Desire {
    /// Roam the world in legs of at most `max_stride`. Never satisfied.
    Wander {
        max_stride: f64,
        current: Option<MoveTo>,
    },
    MoveTo(MoveTo),
    /// Wander until another entity comes within `sensor_radius`, then chase
    /// it. The chase is dropped once the quarry leaves sensor range or
    /// vanishes; a resource caught within grab reach is grabbed. Never
    /// satisfied.
    WanderFollow {
        max_stride: f64,
        current: Option<MoveTo>,
        quarry: Option<EntityId>,
    },
    /// Approach `resource` and consume it once within `grab_radius` (or the
    /// approach's arrival tolerance, whichever is larger).
    Grab {
        resource: EntityId,
        grab_radius: f64,
        approach: MoveTo,
        done: bool,
    },
    #[default]
    StayStill,
    /// Flee from every listed threat at once.
    MoveAway { threats: Vec<EntityId> },
}

impl Desire {
    pub fn wander() -> Self {
        Self::wander_with_stride(DEFAULT_MAX_STRIDE)
    }

    pub fn wander_with_stride(max_stride: f64) -> Self {
        Desire::Wander {
            max_stride,
            current: None,
        }
    }

    pub fn wander_follow() -> Self {
        Self::wander_follow_with_stride(DEFAULT_MAX_STRIDE)
    }

    pub fn wander_follow_with_stride(max_stride: f64) -> Self {
        Desire::WanderFollow {
            max_stride,
            current: None,
            quarry: None,
        }
    }

    pub fn move_to(location: impl Into<Location>) -> Self {
        Desire::MoveTo(MoveTo::new(location))
    }

    /// Chase `target` indefinitely.
    pub fn follow(target: impl Into<EntityId>) -> Self {
        Desire::MoveTo(MoveTo::endless(Location::Entity(target.into())))
    }

    pub fn grab(resource: impl Into<EntityId>, grab_radius: f64) -> Self {
        let resource = resource.into();
        Desire::Grab {
            approach: MoveTo::new(Location::Entity(resource.clone())),
            resource,
            grab_radius,
            done: false,
        }
    }

    pub fn move_away(threats: Vec<EntityId>) -> Self {
        Desire::MoveAway { threats }
    }

    /// Variant name, as used in scenario files.
    pub fn kind(&self) -> &'static str {
        match self {
            Desire::Wander { .. } => "Wander",
            Desire::MoveTo(_) => "MoveTo",
            Desire::WanderFollow { .. } => "WanderFollow",
            Desire::Grab { .. } => "Grab",
            Desire::StayStill => "StayStill",
            Desire::MoveAway { .. } => "MoveAway",
        }
    }

    pub fn is_wander(&self) -> bool {
        matches!(self, Desire::Wander { .. })
    }

    /// Advance the intention by one tick, possibly emitting an action.
    pub fn run(
        &mut self,
        me: &EntityId,
        table: &EntityTable,
        ctx: &mut DesireContext<'_>,
    ) -> Option<Action> {
        let entity = table.get(me)?;
        match self {
            Desire::StayStill => None,
            Desire::MoveTo(move_to) => move_to.run(entity, table),
            Desire::Wander {
                max_stride,
                current,
            } => wander_step(entity, table, *max_stride, current, ctx),
            Desire::WanderFollow {
                max_stride,
                current,
                quarry,
            } => {
                if quarry.is_none() {
                    *quarry = table.any_near(me).map(|near| near.id().clone());
                }
                if let Some(target) = quarry.clone() {
                    match chase(entity, table, &target) {
                        Chase::Pursue(action) => return action,
                        Chase::Catch => {
                            *quarry = None;
                            *current = None;
                            return Some(Action::grab(target));
                        }
                        Chase::GiveUp => {
                            tracing::debug!(entity = %me, %target, "lost quarry, wandering");
                            *quarry = None;
                            *current = None;
                        }
                    }
                }
                wander_step(entity, table, *max_stride, current, ctx)
            }
            Desire::Grab {
                resource,
                grab_radius,
                approach,
                done,
            } => {
                if *done {
                    return None;
                }
                let Some(target) = table.live_position(resource) else {
                    tracing::warn!(
                        entity = %me,
                        target = %resource,
                        "grab target vanished, abandoning"
                    );
                    *done = true;
                    return None;
                };
                if entity.distance_to(target) <= grab_radius.max(approach.tolerance) {
                    *done = true;
                    Some(Action::grab(resource.clone()))
                } else {
                    approach.run(entity, table)
                }
            }
            Desire::MoveAway { threats } => {
                let origin = entity.position();
                let away = threats
                    .iter()
                    .filter_map(|id| table.live_position(id))
                    .fold(Vector::zero(), |acc, threat| {
                        acc + Vector::from_points(threat, origin).unit()
                    });
                if away.is_zero() {
                    None
                } else {
                    Some(Action::move_towards(away.unit()))
                }
            }
        }
    }

    /// Whether the intention has been fulfilled (or can no longer be pursued).
    pub fn satisfied(&self, me: &EntityId, table: &EntityTable) -> bool {
        let Some(entity) = table.get(me) else {
            return true;
        };
        match self {
            Desire::StayStill => true,
            Desire::Wander { .. } | Desire::WanderFollow { .. } => false,
            Desire::MoveTo(move_to) => move_to.satisfied(entity, table),
            Desire::Grab { resource, done, .. } => *done || !table.is_live(resource),
            Desire::MoveAway { threats } => match entity.get::<SensorComponent>() {
                Some(sensor) => !threats.iter().any(|t| sensor.sees(t)),
                None => true,
            },
        }
    }
}

/// Follow the current wander leg, starting a new one once it is reached.
fn wander_step(
    entity: &Entity,
    table: &EntityTable,
    max_stride: f64,
    current: &mut Option<MoveTo>,
    ctx: &mut DesireContext<'_>,
) -> Option<Action> {
    let exhausted = current
        .as_ref()
        .map_or(true, |leg| leg.satisfied(entity, table));
    if exhausted {
        *current = Some(next_leg(entity.position(), max_stride, ctx));
    }
    current.as_ref()?.run(entity, table)
}

enum Chase {
    Pursue(Option<Action>),
    Catch,
    GiveUp,
}

fn chase(entity: &Entity, table: &EntityTable, target: &EntityId) -> Chase {
    let Some(position) = table.live_position(target) else {
        return Chase::GiveUp;
    };
    let distance = entity.distance_to(position);
    if distance > entity.properties.sensor_radius() {
        return Chase::GiveUp;
    }
    if distance <= entity.grab_radius().max(DEFAULT_ARRIVAL_TOLERANCE) {
        // Only resources can be eaten; anything else is let go.
        return if table.get(target).is_some_and(Entity::is_resource) {
            Chase::Catch
        } else {
            Chase::GiveUp
        };
    }
    Chase::Pursue(MoveTo::new(Location::Entity(target.clone())).run(entity, table))
}

/// Pick a random destination and clamp the leg to `max_stride`.
fn next_leg(origin: Vector, max_stride: f64, ctx: &mut DesireContext<'_>) -> MoveTo {
    let somewhere = ctx.random_point();
    let step = Vector::from_points(origin, somewhere);
    let destination = if step.size() > max_stride {
        origin + step.unit().mul(max_stride)
    } else {
        somewhere
    };
    MoveTo::new(destination)
}

impl fmt::Display for Desire {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Desire::Wander { .. } => f.write_str("wander"),
            Desire::WanderFollow {
                quarry: Some(id), ..
            } => write!(f, "wander, following {id}"),
            Desire::WanderFollow { .. } => f.write_str("wander, looking around"),
            Desire::MoveTo(MoveTo {
                location: Location::Entity(id),
                never_satisfied: true,
                ..
            }) => write!(f, "follow {id}"),
            Desire::MoveTo(move_to) => write!(f, "move to {}", move_to.location),
            Desire::Grab { resource, .. } => write!(f, "grab {resource}"),
            Desire::StayStill => f.write_str("stay still"),
            Desire::MoveAway { threats } => {
                f.write_str("move away from ")?;
                for (i, id) in threats.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{id}")?;
                }
                Ok(())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// DesireComponent
// ---------------------------------------------------------------------------

/// Holds the single active desire of an entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DesireComponent {
    pub desire: Desire,
}

impl DesireComponent {
    pub fn new(desire: Desire) -> Self {
        Self { desire }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::component::MovementComponent;
    use rand::SeedableRng;

    fn at(id: &str, x: f64, y: f64) -> Entity {
        Entity::new(id).with(MovementComponent::at(Vector::new(x, y)))
    }

    fn table_with(entities: Vec<Entity>) -> EntityTable {
        let mut table = EntityTable::new();
        for e in entities {
            table.insert(e).unwrap();
        }
        table
    }

    fn direction(action: Option<Action>) -> Vector {
        match action {
            Some(Action::Move(mv)) => mv.direction.unit(),
            other => panic!("expected a move, got {other:?}"),
        }
    }

    #[test]
    fn stay_still_emits_nothing_and_is_satisfied() {
        let table = table_with(vec![at("a", 0.0, 0.0)]);
        let mut rng = SimRng::seed_from_u64(1);
        let mut ctx = DesireContext::new(Vector::new(100.0, 100.0), &mut rng);
        let mut desire = Desire::StayStill;
        assert!(desire.run(&"a".into(), &table, &mut ctx).is_none());
        assert!(desire.satisfied(&"a".into(), &table));
    }

    #[test]
    fn move_to_points_at_target_and_arrives_within_tolerance() {
        let mut table = table_with(vec![at("a", 0.0, 0.0)]);
        let mut rng = SimRng::seed_from_u64(1);
        let mut ctx = DesireContext::new(Vector::new(100.0, 100.0), &mut rng);
        let mut desire = Desire::move_to(Vector::new(0.0, 10.0));

        let dir = direction(desire.run(&"a".into(), &table, &mut ctx));
        assert_eq!(dir, Vector::new(0.0, 1.0));
        assert!(!desire.satisfied(&"a".into(), &table));

        table
            .get_mut(&"a".into())
            .unwrap()
            .get_mut::<MovementComponent>()
            .unwrap()
            .position = Vector::new(0.2, 9.7);
        assert!(desire.satisfied(&"a".into(), &table));
    }

    #[test]
    fn move_to_unresolvable_target_is_satisfied_unless_endless() {
        let table = table_with(vec![at("a", 0.0, 0.0)]);
        let mut rng = SimRng::seed_from_u64(1);
        let mut ctx = DesireContext::new(Vector::new(100.0, 100.0), &mut rng);

        let mut desire = Desire::move_to(EntityId::from("ghost"));
        assert!(desire.run(&"a".into(), &table, &mut ctx).is_none());
        assert!(desire.satisfied(&"a".into(), &table));

        let follow = Desire::follow("ghost");
        assert!(!follow.satisfied(&"a".into(), &table));
        assert_eq!(follow.to_string(), "follow ghost");
    }

    #[test]
    fn wander_picks_legs_inside_stride() {
        let table = table_with(vec![at("a", 50.0, 50.0)]);
        let mut rng = SimRng::seed_from_u64(7);
        let mut ctx = DesireContext::new(Vector::new(100.0, 100.0), &mut rng);
        let mut desire = Desire::wander_with_stride(5.0);

        assert!(desire.run(&"a".into(), &table, &mut ctx).is_some());
        let Desire::Wander {
            current: Some(leg), ..
        } = &desire
        else {
            panic!("wander should hold a leg");
        };
        let Location::Point(dest) = leg.location else {
            panic!("wander legs target points");
        };
        assert!(dest.distance(Vector::new(50.0, 50.0)) <= 5.0 + 1e-9);
        assert!(!desire.satisfied(&"a".into(), &table));
    }

    #[test]
    fn wander_is_deterministic_per_seed() {
        let table = table_with(vec![at("a", 50.0, 50.0)]);
        let run = |seed| {
            let mut rng = SimRng::seed_from_u64(seed);
            let mut ctx = DesireContext::new(Vector::new(100.0, 100.0), &mut rng);
            let mut desire = Desire::wander();
            desire.run(&"a".into(), &table, &mut ctx);
            desire
        };
        assert_eq!(run(3), run(3));
    }

    #[test]
    fn grab_approaches_then_grabs_once() {
        let mut table = table_with(vec![at("a", 0.0, 0.0), at("food", 10.0, 0.0)]);
        let mut rng = SimRng::seed_from_u64(1);
        let mut ctx = DesireContext::new(Vector::new(100.0, 100.0), &mut rng);
        let mut desire = Desire::grab("food", 1.0);

        assert_eq!(direction(desire.run(&"a".into(), &table, &mut ctx)), Vector::new(1.0, 0.0));
        assert!(!desire.satisfied(&"a".into(), &table));

        table
            .get_mut(&"a".into())
            .unwrap()
            .get_mut::<MovementComponent>()
            .unwrap()
            .position = Vector::new(9.5, 0.0);
        assert_eq!(
            desire.run(&"a".into(), &table, &mut ctx),
            Some(Action::grab("food"))
        );
        assert!(desire.satisfied(&"a".into(), &table));
        assert!(desire.run(&"a".into(), &table, &mut ctx).is_none());
    }

    #[test]
    fn move_to_never_steps_past_the_target() {
        let table = table_with(vec![at("a", 0.0, 0.0)]);
        let mut rng = SimRng::seed_from_u64(1);
        let mut ctx = DesireContext::new(Vector::new(100.0, 100.0), &mut rng);
        let action = Desire::move_to(Vector::new(3.0, 4.0)).run(&"a".into(), &table, &mut ctx);
        match action {
            Some(Action::Move(mv)) => assert_eq!(mv.remaining, Some(5.0)),
            other => panic!("expected a move, got {other:?}"),
        }
    }

    #[test]
    fn grab_with_zero_radius_reaches_within_arrival_tolerance() {
        let table = table_with(vec![at("a", 14.8, 10.1), at("food", 15.0, 10.3)]);
        let mut rng = SimRng::seed_from_u64(1);
        let mut ctx = DesireContext::new(Vector::new(100.0, 100.0), &mut rng);
        let mut desire = Desire::grab("food", 0.0);
        assert_eq!(
            desire.run(&"a".into(), &table, &mut ctx),
            Some(Action::grab("food"))
        );
        assert!(desire.satisfied(&"a".into(), &table));
    }

    fn resource_at(id: &str, x: f64, y: f64) -> Entity {
        at(id, x, y).with(crate::component::MetaDataComponent::new(id, "resource"))
    }

    fn follower(x: f64, y: f64) -> Entity {
        at("a", x, y).with_properties(
            crate::entity::Properties::new()
                .with("sensor_radius", 10.0)
                .with("grab_radius", 1.0),
        )
    }

    #[test]
    fn wander_follow_chases_what_comes_near_and_grabs_resources() {
        let mut table = table_with(vec![follower(0.0, 0.0), resource_at("berry", 6.0, 8.0)]);
        let mut rng = SimRng::seed_from_u64(1);
        let mut ctx = DesireContext::new(Vector::new(100.0, 100.0), &mut rng);
        let mut desire = Desire::wander_follow();

        let dir = direction(desire.run(&"a".into(), &table, &mut ctx));
        assert!(dir.approx_eq(Vector::new(0.6, 0.8), 1e-12));
        assert_eq!(desire.to_string(), "wander, following berry");
        assert!(!desire.satisfied(&"a".into(), &table));

        table
            .get_mut(&"a".into())
            .unwrap()
            .get_mut::<MovementComponent>()
            .unwrap()
            .position = Vector::new(5.5, 7.5);
        assert_eq!(
            desire.run(&"a".into(), &table, &mut ctx),
            Some(Action::grab("berry"))
        );
        assert!(matches!(desire, Desire::WanderFollow { quarry: None, .. }));
    }

    #[test]
    fn wander_follow_gives_up_on_quarry_out_of_range() {
        let mut table = table_with(vec![follower(0.0, 0.0), at("bird", 3.0, 0.0)]);
        let mut rng = SimRng::seed_from_u64(1);
        let mut ctx = DesireContext::new(Vector::new(100.0, 100.0), &mut rng);
        let mut desire = Desire::wander_follow();

        desire.run(&"a".into(), &table, &mut ctx);
        assert!(matches!(
            &desire,
            Desire::WanderFollow { quarry: Some(q), .. } if q.as_str() == "bird"
        ));

        table
            .get_mut(&"bird".into())
            .unwrap()
            .get_mut::<MovementComponent>()
            .unwrap()
            .position = Vector::new(50.0, 0.0);
        assert!(desire.run(&"a".into(), &table, &mut ctx).is_some());
        assert!(matches!(
            desire,
            Desire::WanderFollow {
                quarry: None,
                current: Some(_),
                ..
            }
        ));
        assert_eq!(desire.to_string(), "wander, looking around");
    }

    #[test]
    fn grab_of_vanished_target_is_abandoned() {
        let mut table = table_with(vec![at("a", 0.0, 0.0), at("food", 10.0, 0.0)]);
        let mut rng = SimRng::seed_from_u64(1);
        let mut ctx = DesireContext::new(Vector::new(100.0, 100.0), &mut rng);
        let mut desire = Desire::grab("food", 1.0);

        table.get_mut(&"food".into()).unwrap().mark_remove();
        assert!(desire.satisfied(&"a".into(), &table));
        assert!(desire.run(&"a".into(), &table, &mut ctx).is_none());
        assert!(matches!(desire, Desire::Grab { done: true, .. }));
    }

    #[test]
    fn move_away_sums_unit_vectors() {
        let table = table_with(vec![
            at("a", 0.0, 0.0),
            at("t1", -1.0, 0.0),
            at("t2", 0.0, -5.0),
        ]);
        let mut rng = SimRng::seed_from_u64(1);
        let mut ctx = DesireContext::new(Vector::new(100.0, 100.0), &mut rng);
        let mut desire = Desire::move_away(vec!["t1".into(), "t2".into(), "gone".into()]);
        let dir = direction(desire.run(&"a".into(), &table, &mut ctx));
        let expected = Vector::new(1.0, 1.0).unit();
        assert_eq!(dir, expected);
    }

    #[test]
    fn move_away_satisfied_when_threats_out_of_sight() {
        let mut sensor = SensorComponent::radial(10.0);
        sensor.detected.insert("wolf".into());
        let table = table_with(vec![
            at("a", 0.0, 0.0).with(sensor),
            at("b", 0.0, 0.0),
        ]);
        let desire = Desire::move_away(vec!["wolf".into()]);
        assert!(!desire.satisfied(&"a".into(), &table));
        // No sensor: nothing can be seen.
        assert!(desire.satisfied(&"b".into(), &table));
    }

    #[test]
    fn display_is_human_readable() {
        assert_eq!(Desire::wander().to_string(), "wander");
        assert_eq!(Desire::grab("apple", 1.0).to_string(), "grab apple");
        assert_eq!(
            Desire::move_away(vec!["w1".into(), "w2".into()]).to_string(),
            "move away from w1, w2"
        );
        assert_eq!(Desire::move_to(Vector::new(1.0, 2.0)).to_string(), "move to Vec(1.00, 2.00)");
        assert_eq!(Desire::StayStill.kind(), "StayStill");
    }
}
