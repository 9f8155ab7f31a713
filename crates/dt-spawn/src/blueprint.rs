//! A candidate agent proposed for admission (§4.5) and the admission
//! outcome.

use dt_core::{OrientedBox, Point2D, RoadId};
use dt_world::{AgentCategory, VehicleModelParameters, WorldState};

/// A candidate agent's placement and vehicle model, proposed to
/// [`crate::SpawnAdmission::evaluate`]. Everything needed by the §4.5
/// decision procedure, corridor test, and — on admission — to construct the
/// actual `Agent`.
#[derive(Clone, Debug)]
pub struct SpawnBlueprint {
    pub category: AgentCategory,
    pub road_id: RoadId,
    pub lane_id: i32,
    /// Road-coordinate `s` of the reference point (§3's rear-axle
    /// convention), matching `spawnParameter.distance` in the source.
    pub s: f64,
    pub velocity: f64,
    pub model: VehicleModelParameters,
}

impl SpawnBlueprint {
    /// The proposed oriented footprint at this blueprint's placement,
    /// aligned with the road reference line's heading at `s` (a spawn
    /// candidate always enters parallel to its lane).
    pub fn oriented_box(&self, world: &WorldState) -> OrientedBox {
        let (point, heading) = world
            .network()
            .road(self.road_id)
            .map(|road| road.evaluate(self.s))
            .unwrap_or((Point2D::new(0.0, 0.0), 0.0));
        OrientedBox::new(
            point,
            heading,
            self.model.distance_reference_point_to_leading_edge,
            self.model.length - self.model.distance_reference_point_to_leading_edge,
            self.model.width * 0.5,
        )
    }

    #[inline]
    pub fn leading_edge_s(&self) -> f64 {
        self.s + self.model.distance_reference_point_to_leading_edge
    }

    #[inline]
    pub fn rear_edge_s(&self) -> f64 {
        self.leading_edge_s() - self.model.length
    }
}

/// The outcome of one [`crate::SpawnAdmission::evaluate`] call.
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum SpawnDecision {
    /// Admit the agent at `velocity` (possibly reduced from the blueprint's
    /// requested velocity).
    Admit { velocity: f64 },
    /// Retry admission after `after_ms` milliseconds have elapsed (§4.5
    /// hold-back); the caller re-evaluates with the same blueprint once
    /// that much simulation time has passed.
    HoldBack { after_ms: u64 },
    /// No placement keeps the scenario collision-free; a `Common` agent
    /// spawn is simply dropped (§4.5 point 1's "scenario incomplete" for
    /// non-mandatory agents).
    Reject,
    /// An Ego/Scenario agent bypasses admission control entirely (§4.5
    /// point 3) and is placed at `velocity` unconditionally.
    Mandatory { velocity: f64 },
    /// A mandatory (Ego/Scenario) agent could not be placed on the road
    /// network at all; the run must abort (§4.5 point 3, §7
    /// `IncompleteScenario`).
    Abort,
}
