use vivarium_ecs::prelude::*;

use crate::system::{System, SystemError, TickContext};

/// Lets every creature with a brain reconsider its desire.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrainSystem;

impl System for BrainSystem {
    fn name(&self) -> &str {
        "brain"
    }

    fn run(
        &mut self,
        entities: &mut EntityTable,
        _ctx: &mut TickContext<'_>,
    ) -> Result<(), SystemError> {
        for id in entities.ids() {
            let Some(brain) = entities.get(&id).and_then(|e| e.get::<BrainComponent>()) else {
                continue;
            };
            let Some(perception) = brain.perceive(entities) else {
                continue;
            };
            let creature = brain.creature.clone();
            let Some(body) = entities.get(&creature) else {
                continue;
            };
            let current = body
                .get::<DesireComponent>()
                .map(|d| d.desire.clone())
                .unwrap_or_default();
            let satisfied = current.satisfied(&creature, entities);
            let next = brain.decide(&current, satisfied, &perception, body.grab_radius());
            let name = body.name().to_owned();

            if let Some(brain) = entities
                .get_mut(&id)
                .and_then(|e| e.get_mut::<BrainComponent>())
            {
                brain.signals = perception.signals;
            }

            let Some(next) = next else {
                continue;
            };
            if !current.is_wander() && satisfied {
                tracing::info!(
                    creature = %name,
                    desire = %current,
                    "creature satisfied its desire"
                );
            }
            tracing::info!(creature = %name, desire = %next, "creature decided");
            if let Some(body) = entities.get_mut(&creature) {
                body.get_or_insert_default::<DesireComponent>().desire = next;
            }
        }
        Ok(())
    }
}
