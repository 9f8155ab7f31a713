//! `dt-core` — foundational types for the cycle-driven reconstruction
//! framework.
//!
//! This crate is a dependency of every other `dt-*` crate. It intentionally
//! has no `dt-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module        | Contents                                                |
//! |---------------|-----------------------------------------------------------|
//! | [`ids`]       | `AgentId`, `RoadId`, `LaneSectionId`, `GeometryElementId`, `ComponentId`, `TrafficObjectId` |
//! | [`geo`]       | `Point2D`, `OrientedBox`, boundary sampling, clothoid/Fresnel helpers |
//! | [`time`]      | `Tick`, `SimClock`, `SimConfig`                         |
//! | [`rng`]       | `AgentRng` (per-agent), `SimRng` (global)               |
//! | [`error`]     | `DtError`, `DtResult`                                   |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{DtError, DtResult};
pub use geo::{BoundarySample, OrientedBox, Point2D, PointKind};
pub use ids::{AgentId, ComponentId, GeometryElementId, LaneSectionId, RoadId, TrafficObjectId};
pub use rng::{AgentRng, SimRng};
pub use time::{SimClock, SimConfig, Tick};
