//! Spatial math for building the static map: geodesic distance and bearing,
//! lat/lon to grid projection, and euclidean helpers on grid cells.

use serde::{Deserialize, Serialize};

use crate::error::{GridError, GridResult};
use crate::models::GridPoint;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

const METERS_TO_FEET: f64 = 3.280_839_895_013_12;

/// Units accepted by [`distance_in`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    #[default]
    Meters,
    Kilometers,
    Feet,
    Yards,
    Miles,
    Attoparsecs,
}

impl DistanceUnit {
    pub fn from_meters(self, meters: f64) -> f64 {
        match self {
            DistanceUnit::Meters => meters,
            DistanceUnit::Kilometers => meters / 1000.0,
            DistanceUnit::Feet => meters * METERS_TO_FEET,
            DistanceUnit::Yards => meters * METERS_TO_FEET / 3.0,
            DistanceUnit::Miles => meters * METERS_TO_FEET / 5280.0,
            DistanceUnit::Attoparsecs => meters * 32.407_764_9,
        }
    }
}

/// Great-circle distance in meters between two points in decimal degrees.
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Great-circle distance in the requested unit.
pub fn distance_in(lat1: f64, lon1: f64, lat2: f64, lon2: f64, unit: DistanceUnit) -> f64 {
    unit.from_meters(haversine_distance(lat1, lon1, lat2, lon2))
}

/// Initial bearing from point 1 to point 2 in degrees, 0 = north, in (-180, 180].
pub fn bearing_deg(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_lambda = (lon2 - lon1).to_radians();

    let x = delta_lambda.sin() * phi2.cos();
    let y = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta_lambda.cos();

    x.atan2(y).to_degrees()
}

/// Destination reached from a start point after `distance_m` along `bearing_deg`.
pub fn offset_by_bearing(lat: f64, lon: f64, distance_m: f64, bearing_deg: f64) -> (f64, f64) {
    if distance_m.abs() <= f64::EPSILON {
        return (lat, lon);
    }

    let bearing_rad = bearing_deg.to_radians();
    let lat1 = lat.to_radians();
    let lon1 = lon.to_radians();
    let angular_distance = distance_m / EARTH_RADIUS_M;

    let sin_lat2 = lat1.sin() * angular_distance.cos()
        + lat1.cos() * angular_distance.sin() * bearing_rad.cos();
    let lat2 = sin_lat2.clamp(-1.0, 1.0).asin();

    let y = bearing_rad.sin() * angular_distance.sin() * lat1.cos();
    let x = angular_distance.cos() - lat1.sin() * sin_lat2;
    let lon2 = (lon1 + y.atan2(x) + std::f64::consts::PI).rem_euclid(2.0 * std::f64::consts::PI)
        - std::f64::consts::PI;

    (lat2.to_degrees(), lon2.to_degrees())
}

/// Meters per degree of latitude at a given latitude (WGS84 approximation).
pub fn meters_per_deg_lat(lat_deg: f64) -> f64 {
    let lat_rad = lat_deg.to_radians();
    111_132.954 - 559.822 * (2.0 * lat_rad).cos() + 1.175 * (4.0 * lat_rad).cos()
        - 0.0023 * (6.0 * lat_rad).cos()
}

/// Meters per degree of longitude at a given latitude (WGS84 approximation).
pub fn meters_per_deg_lon(lat_deg: f64) -> f64 {
    let lat_rad = lat_deg.to_radians();
    111_412.84 * lat_rad.cos() - 93.5 * (3.0 * lat_rad).cos() + 0.118 * (5.0 * lat_rad).cos()
}

/// Number of squares needed to cover `length_m` at `resolution_m` per square.
pub fn squares_for(length_m: f64, resolution_m: f64) -> usize {
    (length_m / resolution_m).ceil().max(0.0) as usize
}

/// `(dx, dy)` from one cell to another. Widened so cells at opposite ends
/// of the `i32` range do not overflow.
pub(crate) fn cell_delta(from: GridPoint, to: GridPoint) -> (f64, f64) {
    let dx = i64::from(to.x) - i64::from(from.x);
    let dy = i64::from(to.y) - i64::from(from.y);
    (dx as f64, dy as f64)
}

/// Euclidean distance between two cells, in grid units.
pub fn grid_distance(from: GridPoint, to: GridPoint) -> f64 {
    let (dx, dy) = cell_delta(from, to);
    dx.hypot(dy)
}

/// Bearing in degrees from one cell to another, 0 = north (`y - 1`),
/// clockwise positive, in [0, 360). Identical cells give 0.
pub fn grid_bearing(from: GridPoint, to: GridPoint) -> f64 {
    if from == to {
        return 0.0;
    }
    let (dx, dy) = cell_delta(from, to);
    let deg = dx.atan2(-dy).to_degrees();
    if deg < 0.0 {
        deg + 360.0
    } else {
        deg
    }
}

/// A rectangular flyable field anchored at its upper-left (north-west) corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoField {
    pub upper_left_lat: f64,
    pub upper_left_lon: f64,
    pub width_m: f64,
    pub height_m: f64,
    pub resolution_m: f64,
}

impl GeoField {
    pub fn new(
        upper_left_lat: f64,
        upper_left_lon: f64,
        width_m: f64,
        height_m: f64,
        resolution_m: f64,
    ) -> GridResult<Self> {
        let field = Self {
            upper_left_lat,
            upper_left_lon,
            width_m,
            height_m,
            resolution_m,
        };
        if field.width_in_squares() == 0 || field.height_in_squares() == 0 {
            return Err(GridError::DegenerateDimensions {
                width: width_m,
                height: height_m,
                resolution: resolution_m,
            });
        }
        Ok(field)
    }

    /// Build a field from its corner and its extent in degrees.
    pub fn from_degrees(
        upper_left_lat: f64,
        upper_left_lon: f64,
        width_deg_lon: f64,
        height_deg_lat: f64,
        resolution_m: f64,
    ) -> GridResult<Self> {
        let width_m = (width_deg_lon * meters_per_deg_lon(upper_left_lat)).abs();
        let height_m = (height_deg_lat * meters_per_deg_lat(upper_left_lat)).abs();
        Self::new(upper_left_lat, upper_left_lon, width_m, height_m, resolution_m)
    }

    pub fn width_in_squares(&self) -> usize {
        if !(self.resolution_m > 0.0) {
            return 0;
        }
        squares_for(self.width_m, self.resolution_m)
    }

    pub fn height_in_squares(&self) -> usize {
        if !(self.resolution_m > 0.0) {
            return 0;
        }
        squares_for(self.height_m, self.resolution_m)
    }

    /// Project a lat/lon onto the grid. Points outside the field produce
    /// out-of-range (possibly negative) cells rather than an error.
    pub fn to_grid(&self, lat: f64, lon: f64) -> GridPoint {
        let east_m = (lon - self.upper_left_lon) * meters_per_deg_lon(self.upper_left_lat);
        let south_m = (self.upper_left_lat - lat) * meters_per_deg_lat(self.upper_left_lat);
        GridPoint::new(
            (east_m / self.resolution_m).floor() as i32,
            (south_m / self.resolution_m).floor() as i32,
        )
    }

    /// Lat/lon of the center of a cell.
    pub fn to_lat_lon(&self, point: GridPoint) -> (f64, f64) {
        let east_m = (point.x as f64 + 0.5) * self.resolution_m;
        let south_m = (point.y as f64 + 0.5) * self.resolution_m;
        (
            self.upper_left_lat - south_m / meters_per_deg_lat(self.upper_left_lat),
            self.upper_left_lon + east_m / meters_per_deg_lon(self.upper_left_lat),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_known_distance() {
        // ~111km between these points (1 degree latitude)
        let dist = haversine_distance(0.0, 0.0, 1.0, 0.0);
        assert!((dist - 111_194.0).abs() < 100.0);
        let km = distance_in(0.0, 0.0, 1.0, 0.0, DistanceUnit::Kilometers);
        assert!((km - 111.194).abs() < 0.1);
    }

    #[test]
    fn test_haversine_same_point() {
        let dist = haversine_distance(37.244956, -115.808173, 37.244956, -115.808173);
        assert!(dist < 0.001);
    }

    #[test]
    fn offset_then_measure_round_trips() {
        let (lat, lon) = offset_by_bearing(37.24, -115.80, 250.0, 90.0);
        assert!((haversine_distance(37.24, -115.80, lat, lon) - 250.0).abs() < 0.5);
        assert!((bearing_deg(37.24, -115.80, lat, lon) - 90.0).abs() < 0.1);
    }

    #[test]
    fn grid_bearing_cardinals() {
        let origin = GridPoint::new(5, 5);
        assert_eq!(grid_bearing(origin, GridPoint::new(5, 0)), 0.0);
        assert_eq!(grid_bearing(origin, GridPoint::new(9, 5)), 90.0);
        assert_eq!(grid_bearing(origin, GridPoint::new(5, 9)), 180.0);
        assert_eq!(grid_bearing(origin, GridPoint::new(1, 5)), 270.0);
        assert!((grid_bearing(origin, GridPoint::new(6, 4)) - 45.0).abs() < 1e-9);
        assert_eq!(grid_bearing(origin, origin), 0.0);
    }

    #[test]
    fn grid_distance_is_euclidean() {
        assert_eq!(grid_distance(GridPoint::new(3, 4), GridPoint::new(0, 0)), 5.0);
    }

    #[test]
    fn grid_math_spans_the_full_coordinate_range() {
        let west = GridPoint::new(i32::MIN, 0);
        let east = GridPoint::new(i32::MAX, 0);
        assert_eq!(grid_distance(west, east), u32::MAX as f64);
        assert_eq!(grid_bearing(west, east), 90.0);
        assert_eq!(grid_bearing(GridPoint::new(0, i32::MAX), GridPoint::new(0, i32::MIN)), 0.0);
    }

    #[test]
    fn field_squares_round_up() {
        let field = GeoField::new(37.0, -115.0, 500.0, 401.0, 10.0).unwrap();
        assert_eq!(field.width_in_squares(), 50);
        assert_eq!(field.height_in_squares(), 41);
        assert!(GeoField::new(37.0, -115.0, 500.0, 400.0, 0.0).is_err());
    }

    #[test]
    fn projection_round_trips_cell_centers() {
        let field = GeoField::from_degrees(37.244956, -115.808173, 0.005653, 0.004516, 5.0).unwrap();
        assert_eq!(field.to_grid(37.244956, -115.808173), GridPoint::new(0, 0));
        let cell = GridPoint::new(17, 42);
        let (lat, lon) = field.to_lat_lon(cell);
        assert_eq!(field.to_grid(lat, lon), cell);
    }
}
