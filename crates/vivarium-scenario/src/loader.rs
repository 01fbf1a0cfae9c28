//! Builds a [`World`] from a scenario document.
//!
//! Loading happens in two passes. The first pass validates every entity
//! (explicit ones first, then generated ones in generator order), builds its
//! components and registers it. The second pass attaches desires, so a desire
//! may reference any entity in the file regardless of declaration order.
//!
//! Defaults per entity type:
//!
//! | type | desire | energy | sensors | brain |
//! |---|---|---|---|---|
//! | `Entity` | `Wander` | default reserve | as declared | none |
//! | `Resource` | `StayStill` | only if declared | as declared | none |
//! | `Creature` | `StayStill` | default reserve | radial 50 if none | `properties.diet` |
//!
//! Entities without a `position` (or with `"Somewhere"`) are placed uniformly
//! at random. Placement and generator parameters draw from a `Pcg64` seeded
//! with the world seed, separate from the world's own RNG.

use std::path::Path;

use rand::{Rng, SeedableRng};
use serde_json::Value;
use vivarium_engine::prelude::*;

use crate::document::{
    EnergyDocument, EntityDocument, PositionDocument, ScenarioDocument, WorldDocument,
};
use crate::ScenarioError;

/// Sensor radius given to creatures that declare no sensors.
pub const DEFAULT_CREATURE_SENSOR_RADIUS: f64 = 50.0;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Settings that take precedence over the document.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Overrides the document's `random_seed`.
    pub seed: Option<u64>,
}

/// A loaded scenario, ready to tick.
#[derive(Debug)]
pub struct Scenario {
    /// Frame number from the document (0 for a bare world).
    pub frame: u64,
    pub world: World,
}

/// Read and load a scenario file.
pub fn load_path(
    path: impl AsRef<Path>,
    options: &LoadOptions,
) -> Result<Scenario, ScenarioError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| ScenarioError::Io {
        path: path.to_owned(),
        source,
    })?;
    tracing::info!(path = %path.display(), "loading scenario");
    load_str(&text, options)
}

/// Load a scenario from JSON text.
pub fn load_str(text: &str, options: &LoadOptions) -> Result<Scenario, ScenarioError> {
    load_document(ScenarioDocument::from_json(text)?, options)
}

/// Build the world described by `document`.
pub fn load_document(
    document: ScenarioDocument,
    options: &LoadOptions,
) -> Result<Scenario, ScenarioError> {
    let (frame, document) = document.into_parts();
    if let Some(kind) = &document.kind {
        if !kind.eq_ignore_ascii_case("world") {
            return Err(ScenarioError::InvalidType {
                found: kind.clone(),
                expected: "World".to_owned(),
            });
        }
    }

    let config = world_config(&document, options)?;
    let mut rng = SimRng::seed_from_u64(config.seed);
    let mut world = World::new(config).map_err(setup_error)?;
    install_systems(&mut world, document.systems.as_deref())?;

    let WorldDocument {
        generators,
        mut entities,
        ..
    } = document;
    for generator in &generators {
        entities.extend(generator.generate(&mut rng)?);
    }

    let mut desires = Vec::with_capacity(entities.len());
    for doc in entities {
        let kind = EntityKind::parse(&doc.kind)?;
        let id = doc.id.clone().ok_or_else(|| ScenarioError::Missing {
            field: "id".to_owned(),
            context: format!("{} entry", doc.kind),
        })?;
        let entity = build_entity(&id, kind, &doc, &world, &mut rng)?;
        tracing::debug!(%id, kind = kind.name(), position = %entity.position(), "entity loaded");
        world.add(entity)?;
        desires.push((id, kind, doc.desire));
    }

    for (id, kind, desire) in desires {
        let desire = match desire {
            Some(value) => parse_desire(&value, &id, &world)?,
            None => kind.default_desire(),
        };
        if let Some(entity) = world.get_mut(&EntityId::from(id)) {
            entity.insert(DesireComponent::new(desire));
        }
    }

    tracing::info!(
        frame,
        entities = world.len(),
        generators = generators.len(),
        systems = ?world.system_names(),
        seed = world.config().seed,
        "scenario loaded"
    );
    Ok(Scenario { frame, world })
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

fn world_config(
    document: &WorldDocument,
    options: &LoadOptions,
) -> Result<WorldConfig, ScenarioError> {
    let defaults = WorldConfig::default();
    let config = WorldConfig {
        width: document.width,
        height: document.height,
        seed: options.seed.or(document.random_seed).unwrap_or(defaults.seed),
        time_resolution: document.time_resolution.unwrap_or(defaults.time_resolution),
        initial_dt: document.initial_dt.unwrap_or(defaults.initial_dt),
    };

    config.validate().map_err(setup_error)?;
    Ok(config)
}

/// Report world setup failures in the scenario's own terms.
fn setup_error(err: WorldError) -> ScenarioError {
    match err {
        WorldError::InvalidConfig { field, value } => ScenarioError::InvalidConfig { field, value },
        WorldError::DuplicateSystem { name } => ScenarioError::DuplicateSystem { name },
        other => ScenarioError::World(other),
    }
}

fn install_systems(world: &mut World, names: Option<&[String]>) -> Result<(), ScenarioError> {
    let Some(names) = names else {
        for system in default_pipeline() {
            world.add_boxed_system(system).map_err(setup_error)?;
        }
        return Ok(());
    };

    for name in names {
        let system = builtin(name).ok_or_else(|| ScenarioError::UnknownSystem {
            name: name.clone(),
        })?;
        world.add_boxed_system(system).map_err(setup_error)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntityKind {
    Entity,
    Resource,
    Creature,
}

impl EntityKind {
    fn parse(text: &str) -> Result<Self, ScenarioError> {
        match text.to_ascii_lowercase().as_str() {
            "entity" => Ok(EntityKind::Entity),
            "resource" => Ok(EntityKind::Resource),
            "creature" => Ok(EntityKind::Creature),
            _ => Err(ScenarioError::InvalidType {
                found: text.to_owned(),
                expected: "Entity, Resource or Creature".to_owned(),
            }),
        }
    }

    /// Value stored in the metadata component.
    fn name(self) -> &'static str {
        match self {
            EntityKind::Entity => "entity",
            EntityKind::Resource => MetaDataComponent::RESOURCE,
            EntityKind::Creature => MetaDataComponent::CREATURE,
        }
    }

    fn default_desire(self) -> Desire {
        match self {
            EntityKind::Entity => Desire::wander(),
            EntityKind::Resource | EntityKind::Creature => Desire::StayStill,
        }
    }
}

fn build_entity(
    id: &str,
    kind: EntityKind,
    doc: &EntityDocument,
    world: &World,
    rng: &mut SimRng,
) -> Result<Entity, ScenarioError> {
    let position = match &doc.position {
        None => somewhere(world, rng),
        Some(PositionDocument::Point { x, y }) => Vector::new(*x, *y),
        Some(PositionDocument::Named(name)) if name.eq_ignore_ascii_case("somewhere") => {
            somewhere(world, rng)
        }
        Some(PositionDocument::Named(name)) => {
            return Err(ScenarioError::InvalidType {
                found: name.clone(),
                expected: "a position ({\"x\", \"y\"} or \"Somewhere\")".to_owned(),
            })
        }
    };

    let mut properties = Properties::from_map(doc.properties.clone());
    if let Some(size) = doc.size {
        properties.set(Properties::SIZE, size);
    }
    let name = properties.get_str(Properties::NAME).unwrap_or(id).to_owned();

    let mut entity = Entity::new(id)
        .with(MetaDataComponent::new(name, kind.name()))
        .with(MovementComponent::at(position));

    let mut sensors = Vec::with_capacity(doc.sensors.len());
    for sensor in &doc.sensors {
        if !(sensor.radius >= 0.0 && sensor.radius.is_finite()) {
            return Err(ScenarioError::InvalidConfig {
                field: "sensor radius",
                value: sensor.radius,
            });
        }
        sensors.push(Sensor::radial(sensor.radius));
    }
    if !sensors.is_empty() {
        entity = entity.with(SensorComponent::new(sensors));
    } else if kind == EntityKind::Creature {
        entity = entity.with(SensorComponent::radial(DEFAULT_CREATURE_SENSOR_RADIUS));
    }

    match (&doc.energy, kind) {
        (Some(energy), _) => entity = entity.with(energy_component(energy)),
        (None, EntityKind::Resource) => {}
        (None, _) => entity = entity.with(EnergyComponent::default()),
    }

    if kind == EntityKind::Creature {
        let diet = diet_from_name(properties.diet()).ok_or_else(|| ScenarioError::UnknownDiet {
            name: properties.diet().to_owned(),
            entity: id.to_owned(),
        })?;
        let threshold = doc
            .brain
            .as_ref()
            .and_then(|b| b.hunger_threshold)
            .unwrap_or(BrainComponent::DEFAULT_HUNGER_THRESHOLD);
        entity = entity.with(BrainComponent::new(id, threshold, diet));
    }

    Ok(entity.with_properties(properties))
}

fn somewhere(world: &World, rng: &mut SimRng) -> Vector {
    Vector::new(
        rng.gen_range(0.0..world.width()),
        rng.gen_range(0.0..world.height()),
    )
}

fn energy_component(doc: &EnergyDocument) -> EnergyComponent {
    let energy = EnergyComponent::new(
        doc.max.unwrap_or(EnergyComponent::DEFAULT_MAX),
        doc.rate.unwrap_or(EnergyComponent::DEFAULT_RATE),
    );
    match doc.current {
        Some(current) => energy.with_current(current),
        None => energy,
    }
}

// ---------------------------------------------------------------------------
// Desires
// ---------------------------------------------------------------------------

/// Parse a desire given either as a bare name (`"Wander"`) or as an object
/// with a `type` field. Names are case-insensitive.
fn parse_desire(value: &Value, owner: &str, world: &World) -> Result<Desire, ScenarioError> {
    let (name, fields) = match value {
        Value::String(name) => (name.as_str(), None),
        Value::Object(map) => {
            let name = map
                .get("type")
                .and_then(Value::as_str)
                .ok_or_else(|| missing("type", format!("desire of '{owner}'")))?;
            (name, Some(map))
        }
        other => {
            return Err(ScenarioError::InvalidType {
                found: other.to_string(),
                expected: "a desire name or object".to_owned(),
            })
        }
    };
    let field = |key: &str| fields.and_then(|map| map.get(key));
    let id_field = |key: &str, context: &str| {
        field(key)
            .and_then(Value::as_str)
            .ok_or_else(|| missing(key, format!("{context} desire of '{owner}'")))
    };

    match name.to_ascii_lowercase().as_str() {
        "wander" => Ok(match field("max_stride").and_then(Value::as_f64) {
            Some(stride) => Desire::wander_with_stride(stride),
            None => Desire::wander(),
        }),
        "wanderfollow" => Ok(match field("max_stride").and_then(Value::as_f64) {
            Some(stride) => Desire::wander_follow_with_stride(stride),
            None => Desire::wander_follow(),
        }),
        "staystill" => Ok(Desire::StayStill),
        "moveto" => {
            let location = field("location")
                .ok_or_else(|| missing("location", format!("MoveTo desire of '{owner}'")))?;
            let location = parse_location(location, owner, world)?;
            let never_satisfied = field("never_satisfied")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            Ok(Desire::MoveTo(if never_satisfied {
                MoveTo::endless(location)
            } else {
                MoveTo::new(location)
            }))
        }
        "follow" => {
            let target = resolve(id_field("entity", "Follow")?, owner, world)?;
            Ok(Desire::follow(target))
        }
        "grab" => {
            let resource = resolve(id_field("resource", "Grab")?, owner, world)?;
            let grab_radius = world
                .get(&EntityId::from(owner))
                .map_or(0.0, Entity::grab_radius);
            Ok(Desire::grab(resource, grab_radius))
        }
        "moveaway" => {
            let from = field("from")
                .and_then(Value::as_array)
                .ok_or_else(|| missing("from", format!("MoveAway desire of '{owner}'")))?;
            let threats = from
                .iter()
                .map(|threat| match threat.as_str() {
                    Some(id) => resolve(id, owner, world),
                    None => Err(ScenarioError::InvalidType {
                        found: threat.to_string(),
                        expected: "an entity id".to_owned(),
                    }),
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Desire::move_away(threats))
        }
        _ => Err(ScenarioError::UnknownDesire {
            name: name.to_owned(),
            entity: owner.to_owned(),
        }),
    }
}

/// `"id"`, `{"type": "Entity", "location": "id"}` or `{"x", "y"}`.
fn parse_location(value: &Value, owner: &str, world: &World) -> Result<Location, ScenarioError> {
    match value {
        Value::String(id) => Ok(Location::Entity(resolve(id, owner, world)?)),
        Value::Object(map) => {
            let is_entity = map
                .get("type")
                .and_then(Value::as_str)
                .is_some_and(|t| t.eq_ignore_ascii_case("entity"));
            if is_entity {
                let id = map
                    .get("location")
                    .and_then(Value::as_str)
                    .ok_or_else(|| missing("location", format!("entity location of '{owner}'")))?;
                return Ok(Location::Entity(resolve(id, owner, world)?));
            }
            let coord = |axis: &str| {
                map.get(axis)
                    .and_then(Value::as_f64)
                    .ok_or_else(|| missing(axis, format!("point location of '{owner}'")))
            };
            Ok(Location::Point(Vector::new(coord("x")?, coord("y")?)))
        }
        other => Err(ScenarioError::InvalidType {
            found: other.to_string(),
            expected: "a location".to_owned(),
        }),
    }
}

fn resolve(id: &str, owner: &str, world: &World) -> Result<EntityId, ScenarioError> {
    let id = EntityId::from(id);
    if world.get(&id).is_some() {
        Ok(id)
    } else {
        Err(ScenarioError::UnknownEntity {
            id: id.to_string(),
            referenced_by: owner.to_owned(),
        })
    }
}

fn missing(field: &str, context: String) -> ScenarioError {
    ScenarioError::Missing {
        field: field.to_owned(),
        context,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn load(value: Value) -> Result<Scenario, ScenarioError> {
        load_str(&value.to_string(), &LoadOptions::default())
    }

    fn desire_of(world: &World, id: &str) -> Desire {
        world
            .get(&id.into())
            .and_then(|e| e.get::<DesireComponent>())
            .map(|d| d.desire.clone())
            .unwrap()
    }

    #[test]
    fn bare_world_uses_defaults() {
        let scenario = load(json!({})).unwrap();
        assert_eq!(scenario.frame, 0);
        assert_eq!(scenario.world.width(), 100.0);
        assert_eq!(scenario.world.config().seed, 0);
        assert_eq!(
            scenario.world.system_names(),
            vec!["brain", "sensor", "desire", "action", "movement", "energy"]
        );
    }

    #[test]
    fn frame_number_and_seed_override() {
        let doc = json!({"frame": {"number": 12, "world": {"random_seed": 3}}});
        let scenario = load(doc.clone()).unwrap();
        assert_eq!(scenario.frame, 12);
        assert_eq!(scenario.world.config().seed, 3);

        let scenario = load_str(&doc.to_string(), &LoadOptions { seed: Some(99) }).unwrap();
        assert_eq!(scenario.world.config().seed, 99);
    }

    #[test]
    fn per_type_defaults() {
        let scenario = load(json!({"entities": [
            {"type": "Entity", "id": "drifter", "position": {"x": 1, "y": 1}},
            {"type": "resource", "id": "grass", "position": {"x": 2, "y": 2}},
            {"type": "CREATURE", "id": "cow", "position": {"x": 3, "y": 3},
             "properties": {"name": "Bessie"}}
        ]}))
        .unwrap();
        let world = &scenario.world;

        assert!(desire_of(world, "drifter").is_wander());
        assert_eq!(desire_of(world, "grass"), Desire::StayStill);
        assert_eq!(desire_of(world, "cow"), Desire::StayStill);

        let grass = world.get(&"grass".into()).unwrap();
        assert!(grass.is_resource());
        assert!(grass.get::<EnergyComponent>().is_none());

        let cow = world.get(&"cow".into()).unwrap();
        assert!(cow.is_creature());
        assert_eq!(cow.name(), "Bessie");
        assert_eq!(
            cow.get::<SensorComponent>().unwrap().max_radius(),
            DEFAULT_CREATURE_SENSOR_RADIUS
        );
        let brain = cow.get::<BrainComponent>().unwrap();
        assert_eq!(brain.creature, EntityId::from("cow"));
        assert_eq!(brain.diet.name(), "herbivore");
        assert!(cow.get::<EnergyComponent>().is_some());
    }

    #[test]
    fn energy_brain_and_size_are_applied() {
        let scenario = load(json!({"entities": [{
            "type": "Creature", "id": "wolf", "size": 7,
            "properties": {"diet": "Carnivore"},
            "energy": {"max": 80, "current": 30, "rate": 0.5},
            "brain": {"hunger_threshold": 60},
            "sensors": [{"radius": 10}, {"radius": 25}]
        }]}))
        .unwrap();
        let wolf = scenario.world.get(&"wolf".into()).unwrap();
        let energy = wolf.get::<EnergyComponent>().unwrap();
        assert_eq!((energy.current(), energy.max(), energy.rate()), (30.0, 80.0, 0.5));
        assert_eq!(wolf.get::<BrainComponent>().unwrap().hunger_threshold, 60.0);
        assert_eq!(wolf.get::<BrainComponent>().unwrap().diet.name(), "carnivore");
        assert_eq!(wolf.get::<SensorComponent>().unwrap().max_radius(), 25.0);
        assert_eq!(wolf.size(), 7.0);
    }

    #[test]
    fn somewhere_lands_inside_the_world() {
        let scenario = load(json!({"width": 40, "height": 20, "entities": [
            {"id": "a", "position": "Somewhere"},
            {"id": "b"}
        ]}))
        .unwrap();
        for entity in scenario.world.entities() {
            let p = entity.position();
            assert!((0.0..40.0).contains(&p.x) && (0.0..20.0).contains(&p.y), "{p}");
        }
    }

    #[test]
    fn desires_resolve_forward_references() {
        let scenario = load(json!({"entities": [
            {"type": "Creature", "id": "cow", "desire": {"type": "Grab", "resource": "grass"},
             "properties": {"grab_radius": 3}},
            {"id": "dog", "desire": {"type": "Follow", "entity": "cow"}},
            {"id": "cat", "desire": {"type": "MoveTo", "location": {"x": 5, "y": 6}}},
            {"id": "bee", "desire": {"type": "moveto",
                                     "location": {"type": "Entity", "location": "grass"},
                                     "never_satisfied": true}},
            {"id": "ant", "desire": {"type": "MoveAway", "from": ["dog", "cat"]}},
            {"id": "owl", "desire": {"type": "Wander", "max_stride": 5}},
            {"id": "fox", "desire": {"type": "WanderFollow", "max_stride": 2}},
            {"id": "elk", "desire": "wanderfollow"},
            {"type": "Resource", "id": "grass", "position": {"x": 0, "y": 0}}
        ]}))
        .unwrap();
        let world = &scenario.world;

        assert_eq!(desire_of(world, "cow"), Desire::grab("grass", 3.0));
        assert_eq!(desire_of(world, "dog").to_string(), "follow cow");
        assert_eq!(desire_of(world, "cat"), Desire::move_to(Vector::new(5.0, 6.0)));
        assert_eq!(
            desire_of(world, "bee"),
            Desire::MoveTo(MoveTo::endless(Location::Entity("grass".into())))
        );
        assert_eq!(desire_of(world, "ant").to_string(), "move away from dog, cat");
        assert_eq!(desire_of(world, "owl"), Desire::wander_with_stride(5.0));
        assert_eq!(desire_of(world, "fox"), Desire::wander_follow_with_stride(2.0));
        assert_eq!(desire_of(world, "elk"), Desire::wander_follow());
    }

    #[test]
    fn fails_fast_on_bad_references_and_types() {
        let cases = [
            (
                json!({"entities": [
                    {"id": "dog", "desire": {"type": "Follow", "entity": "ghost"}}
                ]}),
                "UnknownEntity",
            ),
            (json!({"entities": [{"id": "dog", "desire": "Dance"}]}), "UnknownDesire"),
            (json!({"entities": [{"id": "dog", "desire": {"type": "Grab"}}]}), "Missing"),
            (json!({"entities": [{"type": "Plant", "id": "fern"}]}), "InvalidType"),
            (json!({"entities": [{"id": "x", "position": "Anywhere"}]}), "InvalidType"),
            (json!({"entities": [{"position": {"x": 1, "y": 1}}]}), "Missing"),
            (
                json!({"entities": [
                    {"type": "Creature", "id": "c", "properties": {"diet": "rocks"}}
                ]}),
                "UnknownDiet",
            ),
            (json!({"systems": ["Brain", "Render"]}), "UnknownSystem"),
            (json!({"systems": ["energy", "EnergySystem"]}), "DuplicateSystem"),
            (json!({"width": -5}), "InvalidConfig"),
            (json!({"type": "Galaxy"}), "InvalidType"),
            (json!({"entities": [{"id": "a"}, {"id": "a"}]}), "World"),
        ];
        for (doc, expected) in cases {
            let err = load(doc.clone()).unwrap_err();
            let variant = format!("{err:?}");
            assert!(variant.starts_with(expected), "{doc} gave {variant}");
        }
    }

    #[test]
    fn system_list_is_honored() {
        let scenario = load(json!({"systems": ["MovementSystem", "energy"]})).unwrap();
        assert_eq!(scenario.world.system_names(), vec!["movement", "energy"]);

        let scenario = load(json!({"systems": []})).unwrap();
        assert_eq!(scenario.world.system_count(), 0);
    }

    #[test]
    fn generated_entities_follow_explicit_ones() {
        let scenario = load(json!({
            "random_seed": 4,
            "generators": [{"type": "Resource", "quantity": 5, "id_prefix": "grass_",
                            "template": {"properties": {"size": "random(1, 3)"}}}],
            "entities": [{"type": "Creature", "id": "cow",
                          "desire": {"type": "Grab", "resource": "grass_4"}}]
        }))
        .unwrap();
        let world = &scenario.world;
        assert_eq!(world.len(), 6);
        for i in 0..5 {
            let grass = world.get(&format!("grass_{i}").into()).unwrap();
            assert!(grass.is_resource());
            assert!((1.0..=3.0).contains(&grass.size()));
        }
        assert_eq!(desire_of(world, "cow").to_string(), "grab grass_4");
    }
}
