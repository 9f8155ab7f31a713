//! `dt-road` — road network reference-line geometry, lane sections, and
//! spatial indexing for the PCM reconstruction core.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`network`] | `Road`, `LaneSection`, `Lane`, `RoadNetwork`, `RoadNetworkBuilder` |
//! | [`error`]   | `RoadError`, `RoadResult<T>`                               |
//!
//! OpenDRIVE XML parsing is out of scope (spec §1) — this crate only defines
//! the in-memory model a parser would populate via [`RoadNetworkBuilder`].
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public types.           |

pub mod error;
pub mod network;


pub use error::{RoadError, RoadResult};
pub use network::{
    GeometryEntry, GeometrySegment, Lane, LaneSection, LaneType, LaneValidity, PlacedSegment,
    Road, RoadNetwork, RoadNetworkBuilder, RoadObject, RoadSignal, SignalKind, WidthPoly,
};
