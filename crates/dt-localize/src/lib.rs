//! `dt-localize` — projects an agent's oriented bounding box onto the road
//! network's lane geometry, producing road coordinates, lane membership,
//! and lane remainders.
//!
//! There is no teacher analogue for this crate — it is grounded in
//! `examples/original_source/.../World_OSI/Localization/{PolygonSampler,
//! LocalizationCache}.h` and reuses `dt-road`'s `rstar` spatial index the
//! same way `dt-road::network` builds it.
//!
//! # Crate layout
//!
//! | Module     | Contents                                         |
//! |------------|---------------------------------------------------|
//! | [`cache`]  | `LocalizationIndex`, the per-segment sample cache |
//! | [`locate`] | `localize`, `LocalizationResult`, `RoadPosition`  |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                            |
//! |---------|----------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on result types.|

pub mod cache;
pub mod locate;

#[cfg(test)]
mod tests;

pub use cache::LocalizationIndex;
pub use locate::{localize, LocalizationResult, RoadPosition};
