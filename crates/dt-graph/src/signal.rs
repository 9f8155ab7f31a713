//! The signal catalog (§3, §6): typed payloads that flow across one
//! component-graph channel during one cycle.
//!
//! "Sender mints, receiver reads immutably; discarded at end of cycle"
//! (§3). Every variant is `Clone` — a receiver gets an owned copy of the
//! value its upstream minted, never a reference that could outlive the
//! cycle (§9 "avoid long-lived references between agents").

/// Tag carried on a `DynamicsSignal` describing a dynamics component's
/// activation state.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ComponentState {
    Disabled,
    Armed,
    Acting,
}

/// The longitudinal/lateral dynamics state a `Dynamics` component mints
/// each cycle (§3, §6).
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DynamicsSignal {
    pub component_state: ComponentState,
    pub acceleration: f64,
    pub velocity: f64,
    pub x: f64,
    pub y: f64,
    pub yaw: f64,
    pub yaw_rate: f64,
    pub steering_wheel_angle: f64,
    /// Distance traveled during this cycle (§3 "travel-distance delta").
    pub travel_distance: f64,
}

#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SteeringSignal {
    pub steering_wheel_angle: f64,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GearSignal {
    Reverse,
    Neutral,
    Drive(u8),
}

#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LongitudinalSignal {
    pub acc_pedal: f64,
    pub brake_pedal: f64,
    pub gear: GearSignal,
}

/// A single moving or stationary object detected in the sensor's local
/// (vehicle-relative) frame.
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DetectedObject {
    pub relative_x: f64,
    pub relative_y: f64,
    pub relative_velocity: f64,
    pub is_stationary: bool,
}

#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SensorDataSignal {
    pub objects: Vec<DetectedObject>,
}

/// The signal catalog (§3/§6 "Signal catalog (minimum)").
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Signal {
    ScalarF64(f64),
    ScalarI64(i64),
    ScalarBool(bool),
    VectorF64(Vec<f64>),
    VectorI64(Vec<i64>),
    VectorBool(Vec<bool>),
    Dynamics(DynamicsSignal),
    Steering(SteeringSignal),
    Longitudinal(LongitudinalSignal),
    SensorData(SensorDataSignal),
}

impl Signal {
    /// A short tag naming the variant, used in `InvalidSignalType` error
    /// messages without requiring `Signal: Debug`-formatting the payload.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Signal::ScalarF64(_) => "ScalarF64",
            Signal::ScalarI64(_) => "ScalarI64",
            Signal::ScalarBool(_) => "ScalarBool",
            Signal::VectorF64(_) => "VectorF64",
            Signal::VectorI64(_) => "VectorI64",
            Signal::VectorBool(_) => "VectorBool",
            Signal::Dynamics(_) => "Dynamics",
            Signal::Steering(_) => "Steering",
            Signal::Longitudinal(_) => "Longitudinal",
            Signal::SensorData(_) => "SensorData",
        }
    }
}
