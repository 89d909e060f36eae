//! Spreading of deposited danger into neighboring squares.
//!
//! A predicted position is never exact, and aircraft need separation
//! anyway, so every deposit also leaves a fraction of itself around the
//! square it landed in.

use crate::bearing::Octant;
use crate::config::{GridConfig, SpreadPolicy};
use crate::layer::SpatialLayer;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpreader {
    pub field_weight: f64,
    pub policy: SpreadPolicy,
}

impl FieldSpreader {
    pub fn new(config: &GridConfig) -> Self {
        Self {
            field_weight: config.field_weight,
            policy: config.spread_policy,
        }
    }

    /// Neighbor directions that receive spread danger for a given heading.
    ///
    /// `Isotropic8` ignores the heading. `BearingGated5` keeps the heading
    /// octant and the two octants on either side of it, so nothing spreads
    /// behind the aircraft.
    pub fn directions(&self, heading: Octant) -> Vec<Octant> {
        match self.policy {
            SpreadPolicy::Isotropic8 => Octant::ALL.to_vec(),
            SpreadPolicy::BearingGated5 => (-2..=2).map(|step| heading.rotate(step)).collect(),
        }
    }

    /// Add `field_weight * deposit` to each selected neighbor of `(x, y)`.
    /// Neighbors off the map are skipped. Returns how many landed.
    pub fn spread(
        &self,
        layer: &mut SpatialLayer,
        x: i64,
        y: i64,
        deposit: f64,
        heading: Octant,
    ) -> usize {
        let amount = deposit * self.field_weight;
        let mut landed = 0;
        for dir in self.directions(heading) {
            let (dx, dy) = dir.offset();
            if layer.safely_add_danger_at(x + dx as i64, y + dy as i64, amount) {
                landed += 1;
            }
        }
        landed
    }
}
