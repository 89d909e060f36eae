//! The danger grid: one [`SpatialLayer`] per second from `-look_behind` to
//! `+look_ahead`, filled with the predicted positions of every aircraft
//! except the owner.
//!
//! Construction does all the work. Each other aircraft deposits the full
//! plane danger at its current square at offset 0, then each predicted
//! estimate deposits `weight * danger_rating` at its square and second and
//! spreads a fraction of that into the neighbors.

use std::fs::File;
use std::io::{self, BufWriter};
use std::ops::Index;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::bearing::Octant;
use crate::config::{DangerScale, GridConfig};
use crate::error::{GridError, GridResult};
use crate::field::FieldSpreader;
use crate::layer::SpatialLayer;
use crate::models::{Aircraft, PlaneId};
use crate::trajectory::TrajectoryPredictor;

/// Outcome of depositing one aircraft.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DepositStats {
    pub deposited: usize,
    pub off_map: usize,
    pub beyond_horizon: usize,
}

#[derive(Debug, Clone)]
pub struct DangerGrid {
    pub(crate) config: GridConfig,
    pub(crate) owner: PlaneId,
    pub(crate) plane_danger: f64,
    pub(crate) danger_ratings: Vec<f64>,
    pub(crate) layers: Vec<SpatialLayer>,
    pub(crate) distance_costs: Option<SpatialLayer>,
}

impl DangerGrid {
    /// Build the grid for `owner` over a `width x height` field with square
    /// cells of `resolution`.
    pub fn new<A: Aircraft>(
        aircraft: &[A],
        width: f64,
        height: f64,
        resolution: f64,
        owner: PlaneId,
        config: GridConfig,
    ) -> GridResult<Self> {
        let map = SpatialLayer::new(width, height, resolution)?;
        Self::from_layer(aircraft, &map, owner, config)
    }

    /// Build the grid using the dimensions of an existing map. The map's own
    /// danger values are not copied.
    pub fn from_layer<A: Aircraft>(
        aircraft: &[A],
        map: &SpatialLayer,
        owner: PlaneId,
        config: GridConfig,
    ) -> GridResult<Self> {
        config.validate()?;

        let width = map.width_in_squares() as f64;
        let height = map.height_in_squares() as f64;
        let plane_danger = width.hypot(height) * config.plane_danger_scale;
        let danger_ratings = danger_ratings(&config, plane_danger);
        let layers = vec![map.empty_like(); config.layer_count()];

        let mut grid = Self {
            config,
            owner,
            plane_danger,
            danger_ratings,
            layers,
            distance_costs: None,
        };

        let predictor = TrajectoryPredictor::new(&grid.config);
        let spreader = FieldSpreader::new(&grid.config);
        let mut totals = DepositStats::default();
        let mut others = 0;
        for plane in aircraft.iter().filter(|a| a.id() != owner) {
            let stats = grid.deposit_aircraft(plane, &predictor, &spreader);
            totals.deposited += stats.deposited;
            totals.off_map += stats.off_map;
            totals.beyond_horizon += stats.beyond_horizon;
            others += 1;
        }

        debug!(
            owner,
            aircraft = others,
            plane_danger,
            layers = grid.layers.len(),
            deposited = totals.deposited,
            off_map = totals.off_map,
            beyond_horizon = totals.beyond_horizon,
            "danger grid built"
        );
        Ok(grid)
    }

    fn deposit_aircraft<A: Aircraft + ?Sized>(
        &mut self,
        aircraft: &A,
        predictor: &TrajectoryPredictor,
        spreader: &FieldSpreader,
    ) -> DepositStats {
        let mut stats = DepositStats::default();
        let look_ahead = self.config.look_ahead;
        let present = self.config.look_behind as usize;

        let location = aircraft.location();
        let now = &mut self.layers[present];
        let (x, y) = (i64::from(location.x), i64::from(location.y));
        if !now.safely_occupy(x, y, self.plane_danger, aircraft.id()) {
            warn!(
                plane = aircraft.id(),
                x = location.x,
                y = location.y,
                "aircraft is outside the grid"
            );
        }

        let trajectory = predictor.predict_aircraft(aircraft, look_ahead);
        let heading = Octant::from_bearing(aircraft.bearing());

        for timed in trajectory.timed() {
            if timed.seconds > look_ahead {
                stats.beyond_horizon += 1;
                continue;
            }
            let slot = timed.seconds as usize + present;
            let deposit = timed.estimate.weight * self.danger_ratings[slot];
            let (x, y) = (timed.estimate.x as i64, timed.estimate.y as i64);

            let layer = &mut self.layers[slot];
            if !layer.safely_add_danger_at(x, y, deposit) {
                stats.off_map += 1;
                continue;
            }
            let octant = if timed.goal_linger {
                trajectory.linger_octant
            } else {
                heading
            };
            spreader.spread(layer, x, y, deposit, octant);
            stats.deposited += 1;
        }
        stats
    }

    // The horizon is capped at MAX_HORIZON_SECS on construction, so both
    // bounds fit in an i32.
    fn slot(&self, seconds: i32) -> GridResult<usize> {
        let min = -(self.config.look_behind as i32);
        let max = self.config.look_ahead as i32;
        if seconds < min || seconds > max {
            return Err(GridError::TimeOutOfRange { seconds, min, max });
        }
        Ok((seconds - min) as usize)
    }

    pub fn get_danger_at(&self, x: usize, y: usize, seconds: i32) -> GridResult<f64> {
        self.layers[self.slot(seconds)?].get_danger_at(x, y)
    }

    pub fn add_danger_at(&mut self, x: usize, y: usize, seconds: i32, danger: f64) -> GridResult<()> {
        check_danger(danger)?;
        let slot = self.slot(seconds)?;
        self.layers[slot].add_danger_at(x, y, danger)
    }

    pub fn set_danger_at(&mut self, x: usize, y: usize, seconds: i32, danger: f64) -> GridResult<()> {
        check_danger(danger)?;
        let slot = self.slot(seconds)?;
        self.layers[slot].set_danger_at(x, y, danger)
    }

    /// Aircraft registered at `(x, y)` at the present second.
    pub fn planes_at(&self, x: usize, y: usize) -> GridResult<&[PlaneId]> {
        self.layers[self.config.look_behind as usize].planes_at(x, y)
    }

    pub fn width_in_squares(&self) -> usize {
        self.layers[0].width_in_squares()
    }

    pub fn height_in_squares(&self) -> usize {
        self.layers[0].height_in_squares()
    }

    /// Prediction horizon in seconds.
    pub fn time_in_secs(&self) -> u32 {
        self.config.look_ahead
    }

    pub fn look_behind(&self) -> u32 {
        self.config.look_behind
    }

    pub fn resolution(&self) -> f64 {
        self.layers[0].resolution()
    }

    pub fn owner(&self) -> PlaneId {
        self.owner
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Danger deposited at an aircraft's current square.
    pub fn plane_danger(&self) -> f64 {
        self.plane_danger
    }

    /// Scale applied to predicted weights at a given second.
    pub fn danger_rating(&self, seconds: i32) -> GridResult<f64> {
        Ok(self.danger_ratings[self.slot(seconds)?])
    }

    pub fn layer(&self, seconds: i32) -> GridResult<&SpatialLayer> {
        Ok(&self.layers[self.slot(seconds)?])
    }

    /// All layers, oldest first.
    pub fn danger_space(&self) -> &[SpatialLayer] {
        &self.layers
    }

    pub fn render(&self, seconds: i32) -> GridResult<String> {
        Ok(self.layer(seconds)?.render())
    }

    pub fn render_scaled(&self, seconds: i32) -> GridResult<String> {
        Ok(self.layer(seconds)?.render_scaled())
    }

    pub fn write_csv<W: io::Write>(&self, seconds: i32, writer: W) -> GridResult<()> {
        self.layer(seconds)?.write_csv(writer)
    }

    /// Write every layer to `dir/<prefix>_t<seconds>.csv`.
    pub fn export_csv(&self, dir: &Path, prefix: &str) -> GridResult<Vec<PathBuf>> {
        let min = -(self.config.look_behind as i32);
        let mut written = Vec::with_capacity(self.layers.len());
        for (slot, layer) in self.layers.iter().enumerate() {
            let seconds = min + slot as i32;
            let path = dir.join(format!("{prefix}_t{seconds}.csv"));
            layer.write_csv(BufWriter::new(File::create(&path)?))?;
            written.push(path);
        }
        debug!(files = written.len(), dir = %dir.display(), "exported danger layers");
        Ok(written)
    }
}

impl Index<(usize, usize, i32)> for DangerGrid {
    type Output = f64;

    /// Panics on an out-of-range second or cell; use
    /// [`DangerGrid::get_danger_at`] for a checked read.
    fn index(&self, (x, y, seconds): (usize, usize, i32)) -> &f64 {
        let slot = match self.slot(seconds) {
            Ok(slot) => slot,
            Err(e) => panic!("{e}"),
        };
        let layer = &self.layers[slot];
        match layer.danger_ref(x, y) {
            Some(danger) => danger,
            None => panic!(
                "cell ({x}, {y}) outside {}x{} grid",
                layer.width_in_squares(),
                layer.height_in_squares()
            ),
        }
    }
}

fn check_danger(danger: f64) -> GridResult<()> {
    if danger.is_finite() && danger >= 0.0 {
        Ok(())
    } else {
        Err(GridError::InvalidDanger(danger))
    }
}

/// Per-slot scale for predicted weights, indexed by `seconds + look_behind`.
fn danger_ratings(config: &GridConfig, plane_danger: f64) -> Vec<f64> {
    let look_behind = config.look_behind as i32;
    let look_ahead = config.look_ahead as f64;
    (0..config.layer_count())
        .map(|slot| {
            let seconds = slot as i32 - look_behind;
            match config.danger_scale {
                DangerScale::Constant => plane_danger,
                DangerScale::Linear { floor } if seconds > 0 => {
                    let progress = seconds as f64 / look_ahead;
                    plane_danger * (1.0 - (1.0 - floor) * progress)
                }
                DangerScale::Linear { .. } => plane_danger,
            }
        })
        .collect()
}
