//! Spawn-admission tunables (§6 parameter table, §4.5 design constants).

/// The `{timeToBrake, minSpawningDistance, assumedBrakeAcceleration,
/// assumedFrontDeceleration, maxHoldbackTime, velocityReductionStep}`
/// parameter bag named in §6 for this component.
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpawnAdmissionParams {
    /// Reaction / time-to-brake, seconds. Default `1.0` (§4.5).
    pub ttb_s: f64,
    /// Minimum free space ahead of the spawn point, metres. Default `1.0`.
    pub min_spawning_distance_m: f64,
    /// Assumed full-braking deceleration of the spawning agent, m/s²
    /// (negative). Default `-6.0`.
    pub assumed_brake_acceleration_ego: f64,
    /// Assumed braking deceleration of a lead vehicle, m/s² (negative).
    /// Default `-10.0`.
    pub assumed_front_deceleration: f64,
    /// Upper bound on a hold-back delay, milliseconds. Default `5000`.
    pub max_holdback_time_ms: u64,
    /// Velocity decrement applied per admission retry, m/s. Default
    /// `10 km/h`.
    pub velocity_reduction_step_mps: f64,
}

impl Default for SpawnAdmissionParams {
    fn default() -> Self {
        Self {
            ttb_s: 1.0,
            min_spawning_distance_m: 1.0,
            assumed_brake_acceleration_ego: -6.0,
            assumed_front_deceleration: -10.0,
            max_holdback_time_ms: 5000,
            velocity_reduction_step_mps: 10.0 / 3.6,
        }
    }
}
