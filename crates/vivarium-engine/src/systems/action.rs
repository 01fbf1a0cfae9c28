use vivarium_ecs::prelude::*;

use crate::system::{System, SystemError, TickContext};

/// Applies pending actions, charging their energy cost.
///
/// An entity with an energy reserve must hold at least the action's cost or
/// the action is dropped; a successful action is debited `cost * dt`.
/// Entities without a reserve act for free. An action the entity cannot
/// perform (a move without a movement component) is skipped without charge.
/// The pending slot is emptied either way.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActionSystem;

impl System for ActionSystem {
    fn name(&self) -> &str {
        "action"
    }

    fn run(
        &mut self,
        entities: &mut EntityTable,
        ctx: &mut TickContext<'_>,
    ) -> Result<(), SystemError> {
        for id in entities.ids() {
            let Some(entity) = entities.get_mut(&id) else {
                continue;
            };
            let Some(action) = entity
                .get_mut::<ActionComponent>()
                .and_then(ActionComponent::take)
            else {
                continue;
            };

            if !action.applies_to(entity) {
                tracing::debug!(entity = %id, %action, "entity cannot perform action, skipped");
                continue;
            }

            let cost = action.energy_cost(entity, ctx.dt);
            if let Some(energy) = entity.get_mut::<EnergyComponent>() {
                if energy.current() < cost {
                    tracing::debug!(
                        entity = %id,
                        action = action.name(),
                        cost,
                        energy = energy.current(),
                        "not enough energy, action dropped"
                    );
                    continue;
                }
                energy.drain(cost * ctx.dt);
            }

            match action.run(&id, entities, ctx.dt)? {
                ActionOutcome::Grabbed { target, gained } => {
                    tracing::info!(entity = %id, %target, gained, "grabbed");
                }
                ActionOutcome::Skipped => {
                    tracing::debug!(entity = %id, %action, "action target gone, skipped");
                }
                ActionOutcome::Moved { .. } => {}
            }
        }
        Ok(())
    }
}
