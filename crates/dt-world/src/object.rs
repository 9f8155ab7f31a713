//! Static traffic objects (§3 `TrafficObject`): obstacles, parking spaces,
//! guard rails. Immutable after construction — there are no `&mut`
//! accessors, only a constructor and getters.

use dt_core::{OrientedBox, Point2D, RoadId, TrafficObjectId};

/// Dimensions of a static object's footprint.
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjectDimension {
    pub length: f64,
    pub width: f64,
    pub height: f64,
}

/// World-frame pose of a static object.
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub yaw: f64,
}

/// A static traffic object's road-coordinate location, resolved once at
/// construction (§4.2's localization is still run for objects, but the
/// result is cached here rather than refreshed every cycle — objects never
/// move, so their lane membership cannot change).
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoadCoordinate {
    pub road_id: RoadId,
    pub lane_id: i32,
    pub s: f64,
    pub t: f64,
}

/// A static obstacle, parking space, or guard rail (§3 `TrafficObject`).
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrafficObject {
    pub id: TrafficObjectId,
    pub dimension: ObjectDimension,
    pub pose: Pose,
    pub road_coordinate: RoadCoordinate,
}

impl TrafficObject {
    pub fn new(
        id: TrafficObjectId,
        dimension: ObjectDimension,
        pose: Pose,
        road_coordinate: RoadCoordinate,
    ) -> Self {
        Self { id, dimension, pose, road_coordinate }
    }

    #[inline]
    pub fn position(&self) -> Point2D {
        Point2D::new(self.pose.x, self.pose.y)
    }

    pub fn oriented_box(&self) -> OrientedBox {
        OrientedBox::new(
            self.position(),
            self.pose.yaw,
            self.dimension.length * 0.5,
            self.dimension.length * 0.5,
            self.dimension.width * 0.5,
        )
    }
}
