//! Fusing a goal-distance heuristic into the danger grid.
//!
//! After fusion each future layer holds `danger_weight * danger + distance`
//! to the goal, which is what a planner minimizes. Fusion replaces the
//! layers it touches; the raw danger is gone afterwards.

use tracing::debug;

use crate::error::{GridError, GridResult};
use crate::grid::DangerGrid;
use crate::layer::SpatialLayer;
use crate::models::GridPoint;
use crate::spatial::grid_distance;

/// Weight of the danger term when none is given.
pub const DEFAULT_DANGER_WEIGHT: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceCostFuser {
    pub goal: GridPoint,
    pub danger_weight: f64,
}

impl DistanceCostFuser {
    pub fn new(goal: GridPoint, danger_weight: f64) -> GridResult<Self> {
        if !danger_weight.is_finite() || danger_weight < 0.0 {
            return Err(GridError::InvalidConfig(format!(
                "danger_weight must be finite and non-negative, got {danger_weight}"
            )));
        }
        Ok(Self {
            goal,
            danger_weight,
        })
    }

    /// Straight-line distance to the goal for every square of `template`.
    pub fn distance_layer(&self, template: &SpatialLayer) -> GridResult<SpatialLayer> {
        let mut distances = template.empty_like();
        for y in 0..template.height_in_squares() {
            for x in 0..template.width_in_squares() {
                let here = GridPoint::new(x as i32, y as i32);
                distances.set_danger_at(x, y, grid_distance(here, self.goal))?;
            }
        }
        Ok(distances)
    }

    /// A new layer holding `danger_weight * danger + distance` per square.
    pub fn fuse(&self, layer: &SpatialLayer, distances: &SpatialLayer) -> GridResult<SpatialLayer> {
        let mut fused = layer.clone();
        for (x, y, danger) in layer.iter() {
            let distance = distances.get_danger_at(x, y)?;
            fused.set_danger_at(x, y, self.danger_weight * danger + distance)?;
        }
        Ok(fused)
    }
}

impl DangerGrid {
    /// Fold the distance to `(goal_x, goal_y)` into every layer from the
    /// present up to (not including) the look-ahead horizon, and keep a
    /// distance-only layer for [`get_dist_cost_at`](Self::get_dist_cost_at).
    /// Can only be done once per grid.
    pub fn calculate_distance_costs(
        &mut self,
        goal_x: usize,
        goal_y: usize,
        danger_weight: f64,
    ) -> GridResult<()> {
        if self.distance_costs.is_some() {
            return Err(GridError::DistanceCostsAlreadyApplied);
        }
        let (Ok(x), Ok(y)) = (i32::try_from(goal_x), i32::try_from(goal_y)) else {
            return Err(GridError::InvalidConfig(format!(
                "goal ({goal_x}, {goal_y}) does not fit in grid coordinates"
            )));
        };
        let fuser = DistanceCostFuser::new(GridPoint::new(x, y), danger_weight)?;
        let distances = fuser.distance_layer(&self.layers[0])?;

        let present = self.config.look_behind as usize;
        let fused_slots = present..present + self.config.look_ahead as usize;
        let rebuilt = self
            .layers
            .iter()
            .enumerate()
            .map(|(slot, layer)| {
                if fused_slots.contains(&slot) {
                    fuser.fuse(layer, &distances)
                } else {
                    Ok(layer.clone())
                }
            })
            .collect::<GridResult<Vec<_>>>()?;

        self.layers = rebuilt;
        self.distance_costs = Some(distances);
        debug!(
            goal_x,
            goal_y,
            danger_weight,
            layers = fused_slots.len(),
            "fused distance costs"
        );
        Ok(())
    }

    /// [`calculate_distance_costs`](Self::calculate_distance_costs) with
    /// [`DEFAULT_DANGER_WEIGHT`].
    pub fn calculate_default_distance_costs(
        &mut self,
        goal_x: usize,
        goal_y: usize,
    ) -> GridResult<()> {
        self.calculate_distance_costs(goal_x, goal_y, DEFAULT_DANGER_WEIGHT)
    }

    /// Distance-only cost of a square; available after
    /// [`calculate_distance_costs`](Self::calculate_distance_costs).
    pub fn get_dist_cost_at(&self, x: usize, y: usize) -> GridResult<f64> {
        self.distance_costs
            .as_ref()
            .ok_or(GridError::DistanceCostsUnavailable)?
            .get_danger_at(x, y)
    }

    pub fn distance_costs(&self) -> Option<&SpatialLayer> {
        self.distance_costs.as_ref()
    }

    pub fn has_distance_costs(&self) -> bool {
        self.distance_costs.is_some()
    }
}
