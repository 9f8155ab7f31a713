//! Agent data model (§3): vehicle parameters, dynamic state, and the
//! localized road view.

use dt_core::{AgentId, OrientedBox, Point2D, RoadId};

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AgentCategory {
    Ego,
    Scenario,
    Common,
}

/// Static, per-agent vehicle dimensions and limits (§3).
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VehicleModelParameters {
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub wheelbase: f64,
    pub weight: f64,
    pub moment_of_inertia_yaw: f64,
    pub max_velocity: f64,
    pub friction_coefficient: f64,
    pub distance_reference_point_to_leading_edge: f64,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Gear {
    Reverse,
    Neutral,
    Drive(u8),
}

/// Mutable per-cycle vehicle state (§3).
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DynamicState {
    pub x: f64,
    pub y: f64,
    pub yaw: f64,
    pub velocity: f64,
    pub acceleration: f64,
    pub yaw_rate: f64,
    pub steering_wheel_angle: f64,
    pub gear: Gear,
    pub accelerator_pedal: f64,
    pub brake_pedal: f64,
    pub indicator_left: bool,
    pub indicator_right: bool,
    pub brake_light: bool,
    pub head_light: bool,
    pub distance_traveled: f64,
}

impl Default for DynamicState {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            yaw: 0.0,
            velocity: 0.0,
            acceleration: 0.0,
            yaw_rate: 0.0,
            steering_wheel_angle: 0.0,
            gear: Gear::Neutral,
            accelerator_pedal: 0.0,
            brake_pedal: 0.0,
            indicator_left: false,
            indicator_right: false,
            brake_light: false,
            head_light: false,
            distance_traveled: 0.0,
        }
    }
}

/// A road-coordinate point on one side of an agent's footprint — the
/// outermost sample that produced a given lane remainder.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundaryPoint {
    pub s: f64,
    pub t: f64,
}

/// The agent's localized road view, refreshed every `sync_global_data` by
/// `dt-localize` (§4.1/§4.2).
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Located {
    pub road_id: Option<RoadId>,
    pub main_lane_id: Option<i32>,
    pub secondary_covered_lane_ids: Vec<i32>,
    pub s: f64,
    pub t: f64,
    pub hdg: f64,
    pub left_boundary: BoundaryPoint,
    pub right_boundary: BoundaryPoint,
    pub left_remainder: f64,
    pub right_remainder: f64,
}

/// A symmetric collision-partner record (§3 invariant: "collision sets are
/// symmetric").
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CollisionPartner {
    pub agent: AgentId,
    pub is_fixed_object: bool,
    pub partner_mass: f64,
    pub partner_velocity: f64,
    pub partner_heading: f64,
}

/// One vehicle in the simulation. Concrete (not type-erased) since §3 names
/// its fields explicitly — application-defined *extension* state would live
/// in a side map keyed by `AgentId`, not bolted onto this struct.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Agent {
    pub id: AgentId,
    pub category: AgentCategory,
    pub model: VehicleModelParameters,
    pub state: DynamicState,
    pub located: Located,
    pub collision_partners: Vec<CollisionPartner>,
    pub valid: bool,
}

impl Agent {
    pub fn new(id: AgentId, category: AgentCategory, model: VehicleModelParameters, state: DynamicState) -> Self {
        Self {
            id,
            category,
            model,
            state,
            located: Located::default(),
            collision_partners: Vec::new(),
            valid: true,
        }
    }

    /// The body-frame reference point (rear-axle midpoint convention, §3's
    /// "Reference point") in world coordinates.
    #[inline]
    pub fn reference_point(&self) -> Point2D {
        Point2D::new(self.state.x, self.state.y)
    }

    /// The agent's oriented footprint (§4.2 step 1), built from the vehicle
    /// model's length/width and `distance_reference_point_to_leading_edge`.
    pub fn oriented_box(&self) -> OrientedBox {
        let dist_ref_to_front = self.model.distance_reference_point_to_leading_edge;
        let dist_ref_to_rear = self.model.length - dist_ref_to_front;
        OrientedBox::new(
            self.reference_point(),
            self.state.yaw,
            dist_ref_to_front,
            dist_ref_to_rear,
            self.model.width * 0.5,
        )
    }

    /// Whether `partner` is already recorded as a collision partner.
    pub fn has_collision_partner(&self, partner: AgentId) -> bool {
        self.collision_partners.iter().any(|p| p.agent == partner)
    }

    /// Road-coordinate `s` of the agent's leading (front) edge, used by
    /// spawn admission's opponent search (§4.5).
    #[inline]
    pub fn leading_edge_s(&self) -> f64 {
        self.located.s + self.model.distance_reference_point_to_leading_edge
    }

    /// Road-coordinate `s` of the agent's rear edge.
    #[inline]
    pub fn rear_edge_s(&self) -> f64 {
        self.leading_edge_s() - self.model.length
    }
}
