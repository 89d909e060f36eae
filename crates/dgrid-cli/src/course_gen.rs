//! Random course generation over the fixed 500 m test field.

use anyhow::{ensure, Result};
use dgrid_core::{Course, CourseWaypoint, GeoField, PlaneId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const FIELD_UPPER_LEFT_LAT: f64 = 37.244956;
pub const FIELD_UPPER_LEFT_LON: f64 = -115.808173;
pub const FIELD_WIDTH_DEG_LON: f64 = 0.005653;
pub const FIELD_HEIGHT_DEG_LAT: f64 = 0.004516;

// Random offsets are drawn in billionths of a degree, just inside the field.
const LON_STEPS: u32 = 5_652_999;
const LAT_STEPS: u32 = 4_515_999;
const STEPS_PER_DEG: f64 = 1_000_000_000.0;

/// The test field at the given square size.
pub fn test_field(resolution_m: f64) -> dgrid_core::GridResult<GeoField> {
    GeoField::from_degrees(
        FIELD_UPPER_LEFT_LAT,
        FIELD_UPPER_LEFT_LON,
        FIELD_WIDTH_DEG_LON,
        FIELD_HEIGHT_DEG_LAT,
        resolution_m,
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseSettings {
    pub seed: u64,
    pub planes: u32,
    pub waypoints: u32,
    /// Inclusive lower altitude bound
    pub min_alt: u32,
    /// Exclusive upper altitude bound
    pub max_alt: u32,
}

impl Default for CourseSettings {
    fn default() -> Self {
        Self {
            seed: 803,
            planes: 32,
            waypoints: 20,
            min_alt: 1400,
            max_alt: 1401,
        }
    }
}

/// Generate a course: a starting position for every plane, then each
/// plane's waypoints grouped by id. The same settings always produce the
/// same course.
pub fn generate_course(settings: &CourseSettings) -> Result<Course> {
    ensure!(
        (1..10_000).contains(&settings.planes),
        "plane count must be in [1, 10000), got {}",
        settings.planes
    );
    ensure!(settings.waypoints >= 1, "need at least one waypoint per plane");
    ensure!(
        settings.max_alt > settings.min_alt,
        "altitude range [{}, {}) is empty",
        settings.min_alt,
        settings.max_alt
    );

    let mut rng = StdRng::seed_from_u64(settings.seed);
    let mut course = Course {
        comments: header(settings),
        waypoints: Vec::with_capacity(settings.planes as usize * (settings.waypoints as usize + 1)),
    };

    for id in 0..settings.planes {
        course.waypoints.push(random_waypoint(&mut rng, id, settings));
    }
    for id in 0..settings.planes {
        for _ in 0..settings.waypoints {
            course.waypoints.push(random_waypoint(&mut rng, id, settings));
        }
    }
    Ok(course)
}

fn random_waypoint(rng: &mut StdRng, plane_id: PlaneId, settings: &CourseSettings) -> CourseWaypoint {
    let lon_offset = rng.random_range(0..LON_STEPS) as f64 / STEPS_PER_DEG;
    let lat_offset = rng.random_range(0..LAT_STEPS) as f64 / STEPS_PER_DEG;
    CourseWaypoint {
        plane_id,
        latitude: FIELD_UPPER_LEFT_LAT - lat_offset,
        longitude: FIELD_UPPER_LEFT_LON + lon_offset,
        altitude: rng.random_range(settings.min_alt..settings.max_alt) as f64,
    }
}

fn header(settings: &CourseSettings) -> Vec<String> {
    vec![
        " A generated course file".to_string(),
        " All points are located in the 500 m test field.".to_string(),
        " Data format:".to_string(),
        "     planeID latitude longitude altitude".to_string(),
        String::new(),
        " A '#' begins a commented line and blank lines are allowed.".to_string(),
        " Files are parsed in order: every aircraft's starting position".to_string(),
        " comes first, then the waypoints grouped by aircraft ID.".to_string(),
        String::new(),
        " Settings:".to_string(),
        format!("     Random seed {}", settings.seed),
        format!("     Number of planes {}", settings.planes),
        format!("     Number of waypoints {}", settings.waypoints),
        format!(
            "     Altitude between {} and {}",
            settings.min_alt, settings.max_alt
        ),
        format!(
            "     Latitude between {} and {}",
            FIELD_UPPER_LEFT_LAT - FIELD_HEIGHT_DEG_LAT,
            FIELD_UPPER_LEFT_LAT
        ),
        format!(
            "     Longitude between {} and {}",
            FIELD_UPPER_LEFT_LON,
            FIELD_UPPER_LEFT_LON + FIELD_WIDTH_DEG_LON
        ),
    ]
}
