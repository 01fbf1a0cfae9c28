use vivarium_ecs::prelude::*;

use crate::system::{System, SystemError, TickContext};

/// Runs each entity's desire and queues the action it emits.
///
/// The desire is moved out of its component while it runs so it can read the
/// whole table, then put back.
#[derive(Debug, Clone, Copy, Default)]
pub struct DesireSystem;

impl System for DesireSystem {
    fn name(&self) -> &str {
        "desire"
    }

    fn run(
        &mut self,
        entities: &mut EntityTable,
        ctx: &mut TickContext<'_>,
    ) -> Result<(), SystemError> {
        for id in entities.ids() {
            let Some(component) = entities
                .get_mut(&id)
                .and_then(|e| e.get_mut::<DesireComponent>())
            else {
                continue;
            };
            let mut desire = std::mem::take(&mut component.desire);

            let action = desire.run(&id, entities, &mut ctx.desire_context());

            let entity = entities.require_mut(&id)?;
            entity.get_or_insert_default::<DesireComponent>().desire = desire;
            if let Some(action) = action {
                entity.get_or_insert_default::<ActionComponent>().set(action);
            }
        }
        Ok(())
    }
}
