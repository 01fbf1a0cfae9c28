use vivarium_ecs::prelude::*;

use crate::system::{System, SystemError, TickContext};

/// Drains every energy reserve by `rate * dt` and kills the depleted.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnergySystem;

impl System for EnergySystem {
    fn name(&self) -> &str {
        "energy"
    }

    fn run(
        &mut self,
        entities: &mut EntityTable,
        ctx: &mut TickContext<'_>,
    ) -> Result<(), SystemError> {
        for entity in entities.iter_mut() {
            let Some(energy) = entity.get_mut::<EnergyComponent>() else {
                continue;
            };
            let remaining = energy.drain(energy.rate() * ctx.dt);
            tracing::trace!(entity = %entity.id(), remaining, "energy drained");
            if remaining > 0.0 {
                continue;
            }

            if let Some(movement) = entity.get_mut::<MovementComponent>() {
                movement.velocity = Vector::zero();
            }
            if !entity.remove {
                tracing::debug!(entity = %entity.id(), name = entity.name(), "out of energy");
            }
            entity.mark_remove();
        }
        Ok(())
    }
}
