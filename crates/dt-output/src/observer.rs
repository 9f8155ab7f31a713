//! `SimOutputObserver<W>` — bridges `SimObserver` to an `OutputWriter`.

use dt_core::Tick;
use dt_sim::SimObserver;
use dt_world::WorldState;

use crate::row::{ObservationGroup, ObservationRecord};
use crate::writer::OutputWriter;
use crate::OutputError;

/// A [`SimObserver`] that turns every live agent's post-sync state into
/// [`ObservationRecord`]s and hands them to any [`OutputWriter`] backend
/// (CSV, SQLite, Parquet, …).
///
/// Errors from the writer are stored internally because `SimObserver`
/// methods have no return value. After `sim.run()` returns, check for
/// errors with [`take_error`][Self::take_error].
pub struct SimOutputObserver<W: OutputWriter> {
    writer: W,
    cycle_time_ms: u32,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    /// Create an observer backed by `writer`, using `config` for
    /// tick-to-milliseconds conversion.
    pub fn new(writer: W, config: &dt_core::SimConfig) -> Self {
        Self {
            writer,
            cycle_time_ms: config.global_cycle_time_ms,
            last_error: None,
        }
    }

    /// Take the stored write error (if any) after `sim.run()` returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the sim).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn time_ms(&self, time: Tick) -> u64 {
        time.0 * self.cycle_time_ms as u64
    }

    fn store_err(&mut self, result: crate::OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }

    fn records_for(&self, time_ms: u64, world: &WorldState) -> Vec<ObservationRecord> {
        let mut records = Vec::new();
        for agent in world.agents() {
            let vehicle_fields: &[(&str, String)] = &[
                ("x", agent.state.x.to_string()),
                ("y", agent.state.y.to_string()),
                ("yaw", agent.state.yaw.to_string()),
                ("velocity", agent.state.velocity.to_string()),
                ("acceleration", agent.state.acceleration.to_string()),
            ];
            for (key, value) in vehicle_fields {
                records.push(ObservationRecord {
                    time_ms,
                    agent_id: agent.id,
                    group: ObservationGroup::Vehicle,
                    key: (*key).to_string(),
                    value: value.clone(),
                });
            }

            records.push(ObservationRecord {
                time_ms,
                agent_id: agent.id,
                group: ObservationGroup::Trace,
                key: "position".to_string(),
                value: format!("{:.3},{:.3}", agent.state.x, agent.state.y),
            });

            if let Some(road_id) = agent.located.road_id {
                let road_fields: &[(&str, String)] = &[
                    ("road_id", road_id.0.to_string()),
                    ("lane_id", agent.located.main_lane_id.unwrap_or(0).to_string()),
                    ("s", agent.located.s.to_string()),
                    ("t", agent.located.t.to_string()),
                ];
                for (key, value) in road_fields {
                    records.push(ObservationRecord {
                        time_ms,
                        agent_id: agent.id,
                        group: ObservationGroup::RoadPosition,
                        key: (*key).to_string(),
                        value: value.clone(),
                    });
                }
            }
        }
        records
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_cycle_end(&mut self, time: Tick, world: &WorldState) {
        let records = self.records_for(self.time_ms(time), world);
        if !records.is_empty() {
            let result = self.writer.write_records(&records);
            self.store_err(result);
        }
    }

    fn on_sim_end(&mut self, _final_time: Tick) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
