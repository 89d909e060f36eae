//! Core data models: grid coordinates, aircraft and trajectory estimates.

use serde::{Deserialize, Serialize};

use crate::spatial::grid_bearing;

/// Unique identifier of an aircraft.
pub type PlaneId = u32;

/// Integer cell coordinates. May lie outside the grid (predictions overshoot
/// edges near boundary aircraft).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPoint {
    pub x: i32,
    pub y: i32,
}

impl GridPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Step by `(dx, dy)`, pinned at the edge of the coordinate range.
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }
}

/// A probability-weighted cell for one predicted second.
///
/// A negative weight marks the end of a second; see [`PositionEstimate::SENTINEL`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionEstimate {
    pub x: i32,
    pub y: i32,
    pub weight: f64,
}

impl PositionEstimate {
    /// Time-step delimiter: advance the time counter, deposit nothing.
    pub const SENTINEL: PositionEstimate = PositionEstimate {
        x: 0,
        y: 0,
        weight: -1.0,
    };

    pub const fn new(x: i32, y: i32, weight: f64) -> Self {
        Self { x, y, weight }
    }

    pub fn at(point: GridPoint, weight: f64) -> Self {
        Self::new(point.x, point.y, weight)
    }

    pub fn is_sentinel(&self) -> bool {
        self.weight < 0.0
    }

    pub fn point(&self) -> GridPoint {
        GridPoint::new(self.x, self.y)
    }
}

/// Read-only view of an aircraft as the danger grid needs it.
pub trait Aircraft {
    fn id(&self) -> PlaneId;

    /// Current cell.
    fn location(&self) -> GridPoint;

    /// Current bearing in degrees (0 = north, clockwise positive).
    fn bearing(&self) -> f64;

    /// Next waypoint.
    fn destination(&self) -> GridPoint;

    fn final_destination(&self) -> GridPoint;

    /// Bearing in degrees from the current cell to the final destination.
    fn bearing_to_destination(&self) -> f64 {
        grid_bearing(self.location(), self.final_destination())
    }
}

/// Plain aircraft record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub id: PlaneId,
    pub location: GridPoint,
    pub bearing_deg: f64,
    pub destination: GridPoint,
    pub final_destination: GridPoint,
}

impl Plane {
    /// Create a plane flying straight at its final destination.
    pub fn new(id: PlaneId, location: GridPoint, final_destination: GridPoint) -> Self {
        Self {
            id,
            location,
            bearing_deg: grid_bearing(location, final_destination),
            destination: final_destination,
            final_destination,
        }
    }

    /// Route through an intermediate waypoint first.
    pub fn with_waypoint(mut self, waypoint: GridPoint) -> Self {
        self.destination = waypoint;
        self.bearing_deg = grid_bearing(self.location, waypoint);
        self
    }

    pub fn with_bearing(mut self, bearing_deg: f64) -> Self {
        self.bearing_deg = bearing_deg;
        self
    }
}

impl Aircraft for Plane {
    fn id(&self) -> PlaneId {
        self.id
    }

    fn location(&self) -> GridPoint {
        self.location
    }

    fn bearing(&self) -> f64 {
        self.bearing_deg
    }

    fn destination(&self) -> GridPoint {
        self.destination
    }

    fn final_destination(&self) -> GridPoint {
        self.final_destination
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_is_not_a_deposit() {
        assert!(PositionEstimate::SENTINEL.is_sentinel());
        assert!(!PositionEstimate::new(3, 4, 0.0).is_sentinel());
    }

    #[test]
    fn offset_saturates_at_coordinate_limits() {
        let edge = GridPoint::new(i32::MAX, i32::MIN);
        assert_eq!(edge.offset(1, -1), edge);
        assert_eq!(edge.offset(-1, 1), GridPoint::new(i32::MAX - 1, i32::MIN + 1));
        assert_eq!(GridPoint::new(2, 3).offset(-1, 1), GridPoint::new(1, 4));
    }

    #[test]
    fn plane_bearing_follows_route() {
        let plane = Plane::new(1, GridPoint::new(5, 5), GridPoint::new(5, 0));
        assert!(plane.bearing().abs() < 1e-9);
        assert_eq!(plane.destination(), plane.final_destination());

        let plane = plane.with_waypoint(GridPoint::new(9, 5));
        assert!((plane.bearing() - 90.0).abs() < 1e-9);
        assert_eq!(plane.destination(), GridPoint::new(9, 5));
        assert!(plane.bearing_to_destination().abs() < 1e-9);

        let plane = plane.with_bearing(270.0);
        assert_eq!(plane.bearing(), 270.0);
        assert_eq!(plane.destination(), GridPoint::new(9, 5));
    }
}
