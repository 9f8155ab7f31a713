//! `dt-world` — World State (C1, §4.1): the canonical repository for the
//! road network, the agent/traffic-object registry, and the deferred update
//! queue every component trigger mutates through.
//!
//! Generalizes the teacher's `dt-agent` (SoA `AgentStore`) into an
//! array-of-structs registry keyed by stable integer ids (§9) — the spec's
//! per-agent record (vehicle model, dynamic state, localized view) is a
//! fairly heavyweight struct, not a handful of independently-enableable
//! scalar columns, so AoS is the natural fit here.
//!
//! # Crate layout
//!
//! | Module     | Contents                                               |
//! |------------|----------------------------------------------------------|
//! | [`agent`]  | `Agent`, `AgentCategory`, `VehicleModelParameters`, `DynamicState`, `Located` |
//! | [`object`] | `TrafficObject` (immutable after construction)         |
//! | [`update`] | `AgentUpdate`, `UpdateQueue` (the deferred-update discipline) |
//! | [`world`]  | `WorldState` — registry, sync, and spatial query surface |
//! | [`error`]  | `WorldError`, `WorldResult<T>`                        |
//!
//! # Feature flags
//!
//! | Flag      | Effect                                                  |
//! |-----------|------------------------------------------------------------|
//! | `serde`   | Derives `Serialize`/`Deserialize` on data-model types.  |
//! | `fx-hash` | Backs the per-lane agent index (`WorldState`'s lane membership map) with `rustc_hash::FxHashMap` instead of `std::collections::HashMap`. The index is rebuilt wholesale every `sync_global_data` and each bucket is kept sorted, so this only affects hashing speed, never iteration order. |

pub mod agent;
pub mod error;
pub mod object;
pub mod update;
pub mod world;

#[cfg(test)]
mod tests;

pub use agent::{Agent, AgentCategory, BoundaryPoint, CollisionPartner, DynamicState, Gear, Located, VehicleModelParameters};
pub use error::{WorldError, WorldResult};
pub use object::{ObjectDimension, Pose, RoadCoordinate, TrafficObject};
pub use update::{AgentUpdate, UpdateQueue};
pub use world::WorldState;
