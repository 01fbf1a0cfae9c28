use vivarium_ecs::prelude::*;

use crate::system::{System, SystemError, TickContext};

/// Rebuilds every sensor's detected set from a snapshot of positions.
#[derive(Debug, Clone, Copy, Default)]
pub struct SensorSystem;

impl System for SensorSystem {
    fn name(&self) -> &str {
        "sensor"
    }

    fn run(
        &mut self,
        entities: &mut EntityTable,
        _ctx: &mut TickContext<'_>,
    ) -> Result<(), SystemError> {
        let index = entities.position_index();
        for entity in entities.iter_mut() {
            let id = entity.id().clone();
            let origin = entity.position();
            if let Some(sensor) = entity.get_mut::<SensorComponent>() {
                sensor.rescan(&id, origin, &index);
            }
        }
        Ok(())
    }
}
