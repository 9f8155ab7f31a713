//! Spawn Admission (C5, §4.5): decides whether a candidate agent may enter
//! the simulation this cycle, and at what velocity.
//!
//! The scheduler proposes a [`SpawnBlueprint`] per spawn point per cycle;
//! [`SpawnAdmission::evaluate`] returns a [`SpawnDecision`] — admit outright,
//! admit at a reduced velocity, hold back for a delay, reject, or (for the
//! mandatory Ego/Scenario agents) abort the run entirely.
//!
//! | module       | contents                                             |
//! |--------------|-------------------------------------------------------|
//! | `params`     | `SpawnAdmissionParams` tunables                      |
//! | `crash`      | `will_crash`, `full_braking_distance`, corridor test |
//! | `blueprint`  | `SpawnBlueprint`, `SpawnDecision`                    |
//! | `admission`  | `SpawnAdmission::evaluate`                           |
//! | `error`      | `SpawnError`                                          |
//!
//! # Features
//! - `serde`: derives `Serialize`/`Deserialize` on `SpawnAdmissionParams`.

mod admission;
mod blueprint;
mod crash;
mod error;
mod params;

pub use admission::SpawnAdmission;
pub use blueprint::{SpawnBlueprint, SpawnDecision};
pub use crash::{corridors_overlap, full_braking_distance, will_crash};
pub use error::{SpawnError, SpawnResult};
pub use params::SpawnAdmissionParams;
