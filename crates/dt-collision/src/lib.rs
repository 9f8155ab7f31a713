//! `dt-collision` — Collision Dynamics (§4.6): the one concrete `Component`
//! implementation named in scope (§1 treats every other behavior component
//! as pluggable and out of scope).
//!
//! `CollisionComponent` latches onto an agent's `collision_partners` set the
//! moment it grows, recomputes the inelastic-momentum combination over every
//! partner recorded so far, and decelerates the agent to a stop at a fixed
//! `−10 m/s²` thereafter — reproducing
//! `Dynamics_Collision/dynamics_collisionImplementation.cpp`'s `Trigger()`.

mod component;

#[cfg(test)]
mod tests;

pub use component::CollisionComponent;
