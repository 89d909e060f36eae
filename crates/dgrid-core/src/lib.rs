pub mod bearing;
pub mod config;
pub mod cost;
pub mod course;
pub mod error;
pub mod field;
pub mod fleet;
pub mod grid;
pub mod layer;
pub mod models;
pub mod spatial;
pub mod trajectory;

pub use bearing::Octant;
pub use config::{DangerScale, GridConfig, SpreadPolicy, MAX_HORIZON_SECS};
pub use cost::{DistanceCostFuser, DEFAULT_DANGER_WEIGHT};
pub use course::{Course, CourseWaypoint};
pub use error::{GridError, GridResult};
pub use field::FieldSpreader;
pub use fleet::build_fleet_grids;
pub use grid::DangerGrid;
pub use layer::{Cell, SpatialLayer};
pub use models::{Aircraft, GridPoint, Plane, PlaneId, PositionEstimate};
pub use spatial::{grid_bearing, grid_distance, haversine_distance, DistanceUnit, GeoField};
pub use trajectory::{Trajectory, TrajectoryPredictor};
