//! Representative PCM-study priority defaults (§4.3). Smaller value ⇒
//! earlier trigger.

pub const INIT_AGENT: i32 = 0;
pub const DYNAMICS_COLLISION: i32 = 1;
pub const DYNAMICS: i32 = 3;
pub const ALGORITHM_SELECTOR: i32 = 100;
pub const ALGORITHM_TRAJECTORY: i32 = 150;
pub const SENSOR_COLLISION: i32 = 201;
pub const EGO_SENSOR: i32 = 203;
