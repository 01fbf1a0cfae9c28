use vivarium_ecs::prelude::*;

use crate::system::{System, SystemError, TickContext};

/// Integrates velocity into position.
#[derive(Debug, Clone, Copy, Default)]
pub struct MovementSystem;

impl System for MovementSystem {
    fn name(&self) -> &str {
        "movement"
    }

    fn run(
        &mut self,
        entities: &mut EntityTable,
        ctx: &mut TickContext<'_>,
    ) -> Result<(), SystemError> {
        for entity in entities.iter_mut() {
            if let Some(movement) = entity.get_mut::<MovementComponent>() {
                movement.position = movement.position + movement.velocity * ctx.dt;
            }
        }
        Ok(())
    }
}
