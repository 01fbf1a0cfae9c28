//! The built-in systems and the default pipeline.
//!
//! | order | system | reads | writes |
//! |---|---|---|---|
//! | 1 | [`BrainSystem`] | brain, sensor (previous tick), energy | desire, brain signals |
//! | 2 | [`SensorSystem`] | movement | sensor detections |
//! | 3 | [`DesireSystem`] | desire, movement | desire state, pending action |
//! | 4 | [`ActionSystem`] | pending action, energy | movement, energy, removal marks |
//! | 5 | [`MovementSystem`] | movement | position |
//! | 6 | [`EnergySystem`] | energy | energy, velocity, removal marks |

mod action;
mod brain;
mod desire;
mod energy;
mod movement;
mod sensor;

pub use action::ActionSystem;
pub use brain::BrainSystem;
pub use desire::DesireSystem;
pub use energy::EnergySystem;
pub use movement::MovementSystem;
pub use sensor::SensorSystem;

use crate::system::System;

/// Names of the built-in systems, in pipeline order.
pub const BUILTIN_NAMES: [&str; 6] = ["brain", "sensor", "desire", "action", "movement", "energy"];

/// Fresh instances of all built-in systems, in pipeline order.
pub fn default_pipeline() -> Vec<Box<dyn System>> {
    BUILTIN_NAMES
        .iter()
        .filter_map(|name| builtin(name))
        .collect()
}

/// Look up a built-in system by name.
///
/// Matching ignores case and an optional `System` suffix, so `"brain"`,
/// `"Brain"` and `"BrainSystem"` all name the same system.
pub fn builtin(name: &str) -> Option<Box<dyn System>> {
    let lower = name.trim().to_ascii_lowercase();
    let base = lower.strip_suffix("system").unwrap_or(&lower);
    let system: Box<dyn System> = match base {
        "brain" => Box::new(BrainSystem),
        "sensor" => Box::new(SensorSystem),
        "desire" => Box::new(DesireSystem),
        "action" => Box::new(ActionSystem),
        "movement" => Box::new(MovementSystem),
        "energy" => Box::new(EnergySystem),
        _ => return None,
    };
    Some(system)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_lookup_is_lenient() {
        for name in ["brain", "Brain", "BrainSystem", "brainsystem", " energy "] {
            assert!(builtin(name).is_some(), "{name} should resolve");
        }
        assert_eq!(builtin("MovementSystem").map(|s| s.name().to_owned()), Some("movement".into()));
        assert!(builtin("render").is_none());
        assert!(builtin("system").is_none());
    }

    #[test]
    fn default_pipeline_matches_names() {
        let names: Vec<String> = default_pipeline().iter().map(|s| s.name().to_owned()).collect();
        assert_eq!(names, BUILTIN_NAMES);
    }
}
