//! Aggregate world statistics.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Running statistics, updated at the end of every tick.
///
/// Frame times are in milliseconds: either the caller-supplied `dt` or the
/// measured wall-clock duration of the tick, before scaling by the world's
/// time resolution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldStats {
    /// Entity count at the start of the last tick.
    pub population: usize,
    /// Entities removed since the world was created.
    pub removed_count: u64,
    /// Last measured tick duration, when no external dt was given.
    pub internal_dt: f64,
    /// Last caller-supplied dt.
    pub external_dt: f64,
    pub simulation_clock: f64,
    pub time_resolution: f64,
    pub frame_count: u64,
    pub frame_time_acc: f64,
}

impl WorldStats {
    /// Record one finished frame.
    pub(crate) fn record_frame(&mut self, frame_time: f64, external: bool) {
        if external {
            self.external_dt = frame_time;
        } else {
            self.internal_dt = frame_time;
        }
        self.frame_time_acc += frame_time;
        self.frame_count += 1;
    }

    pub fn avg_frame_time(&self) -> f64 {
        if self.frame_count == 0 {
            0.0
        } else {
            self.frame_time_acc / self.frame_count as f64
        }
    }

    /// Frames per second implied by [`avg_frame_time`](Self::avg_frame_time).
    pub fn avg_frame_rate(&self) -> f64 {
        1000.0 / (self.avg_frame_time() + 1e-7)
    }
}

impl fmt::Display for WorldStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            concat!(
                "population={} removed={} frames={} clock={:.2} ",
                "avg_frame_time={:.2}ms avg_frame_rate={:.1}Hz",
            ),
            self.population,
            self.removed_count,
            self.frame_count,
            self.simulation_clock,
            self.avg_frame_time(),
            self.avg_frame_rate(),
        )
    }
}
