//! Tuning parameters for danger grid construction.

use serde::{Deserialize, Serialize};

use crate::error::{GridError, GridResult};

/// Largest `look_ahead + look_behind` a grid accepts. Keeps every signed
/// time offset and layer index representable.
pub const MAX_HORIZON_SECS: u32 = 100_000;

/// Which neighbors of a deposit receive the spread ("field") danger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpreadPolicy {
    /// All 8 neighbors, regardless of heading.
    #[default]
    Isotropic8,
    /// The 5 neighbors within 90 degrees of the aircraft's bearing octant.
    BearingGated5,
}

/// How raw predicted weights are scaled across the prediction horizon.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum DangerScale {
    /// Every offset uses the full plane danger.
    #[default]
    Constant,
    /// Linear decay from the full plane danger at offset 0 down to
    /// `floor * plane_danger` at the look-ahead horizon.
    Linear { floor: f64 },
}

/// Configuration for a [`DangerGrid`](crate::grid::DangerGrid).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Seconds of future layers
    pub look_ahead: u32,
    /// Seconds of past layers
    pub look_behind: u32,
    /// Fraction of a deposit spread into each neighbor
    pub field_weight: f64,
    /// Upper bound on either weight of a predicted step
    pub danger_ceiling: f64,
    /// Majority weight above which prediction continues from the majority cell
    pub branch_threshold: f64,
    /// Multiplier on the grid diagonal (in squares) giving the plane danger
    pub plane_danger_scale: f64,
    /// Seconds the final destination keeps being marked after arrival
    pub goal_linger_secs: u32,
    /// Raw weight of each goal-linger estimate
    pub goal_linger_weight: f64,
    pub spread_policy: SpreadPolicy,
    pub danger_scale: DangerScale,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            look_ahead: 20,
            look_behind: 2,
            field_weight: 0.7,
            danger_ceiling: 0.4,
            branch_threshold: 0.3,
            plane_danger_scale: 2.5,
            goal_linger_secs: 3,
            goal_linger_weight: 1.0,
            spread_policy: SpreadPolicy::Isotropic8,
            danger_scale: DangerScale::Constant,
        }
    }
}

impl GridConfig {
    /// Number of time layers a grid built from this configuration holds.
    pub fn layer_count(&self) -> usize {
        (self.look_ahead as usize)
            .saturating_add(self.look_behind as usize)
            .saturating_add(1)
    }

    pub fn validate(&self) -> GridResult<()> {
        if self.look_ahead == 0 {
            return Err(GridError::InvalidConfig("look_ahead must be at least 1".into()));
        }
        let horizon = self.look_ahead.checked_add(self.look_behind);
        if !horizon.is_some_and(|h| h <= MAX_HORIZON_SECS) {
            return Err(GridError::InvalidConfig(format!(
                "look_ahead + look_behind must be at most {MAX_HORIZON_SECS}, got {} + {}",
                self.look_ahead, self.look_behind
            )));
        }
        check_unit("field_weight", self.field_weight)?;
        check_unit("branch_threshold", self.branch_threshold)?;
        if !(self.danger_ceiling > 0.0 && self.danger_ceiling <= 1.0) {
            return Err(GridError::InvalidConfig(format!(
                "danger_ceiling must be in (0, 1], got {}",
                self.danger_ceiling
            )));
        }
        if !self.plane_danger_scale.is_finite() || self.plane_danger_scale <= 0.0 {
            return Err(GridError::InvalidConfig(format!(
                "plane_danger_scale must be positive, got {}",
                self.plane_danger_scale
            )));
        }
        if !self.goal_linger_weight.is_finite() || self.goal_linger_weight < 0.0 {
            return Err(GridError::InvalidConfig(format!(
                "goal_linger_weight must be non-negative, got {}",
                self.goal_linger_weight
            )));
        }
        if let DangerScale::Linear { floor } = self.danger_scale {
            check_unit("danger_scale.floor", floor)?;
        }
        Ok(())
    }
}

fn check_unit(name: &str, value: f64) -> GridResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(GridError::InvalidConfig(format!(
            "{name} must be in [0, 1], got {value}"
        )))
    }
}
