//! A single two-dimensional map of danger values.
//!
//! Each square holds a danger value and the ids of any aircraft currently in
//! it. The danger grid stacks one of these per second of look-behind and
//! look-ahead.

use std::io;

use serde::{Deserialize, Serialize};

use crate::error::{GridError, GridResult};
use crate::models::PlaneId;
use crate::spatial::squares_for;

/// Danger values closer to zero than this render as empty.
const EMPTY_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub danger: f64,
    pub occupants: Vec<PlaneId>,
}

/// One `width x height` grid of cells, stored row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialLayer {
    width_m: f64,
    height_m: f64,
    resolution: f64,
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl SpatialLayer {
    /// Create an empty layer covering `width_m x height_m` with square cells
    /// of `resolution` (any unit, as long as all three agree).
    pub fn new(width_m: f64, height_m: f64, resolution: f64) -> GridResult<Self> {
        let degenerate = || GridError::DegenerateDimensions {
            width: width_m,
            height: height_m,
            resolution,
        };
        if !(resolution > 0.0) || !width_m.is_finite() || !height_m.is_finite() {
            return Err(degenerate());
        }
        let width = squares_for(width_m, resolution);
        let height = squares_for(height_m, resolution);
        if width == 0 || height == 0 {
            return Err(degenerate());
        }
        Ok(Self {
            width_m,
            height_m,
            resolution,
            width,
            height,
            cells: vec![Cell::default(); width * height],
        })
    }

    /// An empty layer with the same dimensions as this one.
    pub fn empty_like(&self) -> Self {
        Self {
            width_m: self.width_m,
            height_m: self.height_m,
            resolution: self.resolution,
            width: self.width,
            height: self.height,
            cells: vec![Cell::default(); self.width * self.height],
        }
    }

    pub fn width_in_squares(&self) -> usize {
        self.width
    }

    pub fn height_in_squares(&self) -> usize {
        self.height
    }

    pub fn width_in_meters(&self) -> f64 {
        self.width_m
    }

    pub fn height_in_meters(&self) -> f64 {
        self.height_m
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Whether two layers share width, height and resolution.
    pub fn same_shape(&self, other: &SpatialLayer) -> bool {
        self.width == other.width
            && self.height == other.height
            && self.resolution == other.resolution
    }

    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    fn index(&self, x: usize, y: usize) -> GridResult<usize> {
        if x < self.width && y < self.height {
            Ok(y * self.width + x)
        } else {
            Err(GridError::CellOutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            })
        }
    }

    pub fn get_danger_at(&self, x: usize, y: usize) -> GridResult<f64> {
        let idx = self.index(x, y)?;
        Ok(self.cells[idx].danger)
    }

    pub fn set_danger_at(&mut self, x: usize, y: usize, danger: f64) -> GridResult<()> {
        let idx = self.index(x, y)?;
        self.cells[idx].danger = danger;
        Ok(())
    }

    pub fn add_danger_at(&mut self, x: usize, y: usize, danger: f64) -> GridResult<()> {
        let idx = self.index(x, y)?;
        self.cells[idx].danger += danger;
        Ok(())
    }

    /// Add danger if `(x, y)` is on the map; otherwise do nothing.
    /// Returns whether the deposit landed.
    pub fn safely_add_danger_at(&mut self, x: i64, y: i64, danger: f64) -> bool {
        if !self.contains(x, y) {
            return false;
        }
        let idx = y as usize * self.width + x as usize;
        self.cells[idx].danger += danger;
        true
    }

    /// Register an aircraft as occupying `(x, y)`.
    pub fn add_plane_at(&mut self, x: usize, y: usize, id: PlaneId) -> GridResult<()> {
        let idx = self.index(x, y)?;
        register(&mut self.cells[idx], id);
        Ok(())
    }

    /// Add `danger` at `(x, y)` and register `id` there. Returns false and
    /// leaves the layer untouched when the cell is off the grid.
    pub fn safely_occupy(&mut self, x: i64, y: i64, danger: f64, id: PlaneId) -> bool {
        if !self.contains(x, y) {
            return false;
        }
        let idx = y as usize * self.width + x as usize;
        let cell = &mut self.cells[idx];
        cell.danger += danger;
        register(cell, id);
        true
    }

    pub fn planes_at(&self, x: usize, y: usize) -> GridResult<&[PlaneId]> {
        let idx = self.index(x, y)?;
        Ok(&self.cells[idx].occupants)
    }

    pub(crate) fn danger_ref(&self, x: usize, y: usize) -> Option<&f64> {
        self.index(x, y).ok().map(|idx| &self.cells[idx].danger)
    }

    /// Iterate `(x, y, danger)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .map(move |(idx, cell)| (idx % width, idx / width, cell.danger))
    }

    pub fn max_danger(&self) -> f64 {
        self.cells.iter().map(|c| c.danger).fold(0.0, f64::max)
    }

    /// Text rendering, one row per line with north at the top: `-` for empty
    /// squares, the danger with two decimals otherwise.
    pub fn render(&self) -> String {
        self.render_with(|danger| format!("{danger:.2}"))
    }

    /// Text rendering with each value multiplied by 100 and rounded, for
    /// cost surfaces whose values are far above 1.
    pub fn render_scaled(&self) -> String {
        self.render_with(|danger| format!("{:.0}", danger * 100.0))
    }

    fn render_with(&self, format_value: impl Fn(f64) -> String) -> String {
        let mut out = String::new();
        for row in self.cells.chunks(self.width) {
            let line: Vec<String> = row
                .iter()
                .map(|cell| {
                    if cell.danger.abs() < EMPTY_EPSILON {
                        "-".to_string()
                    } else {
                        format_value(cell.danger)
                    }
                })
                .collect();
            out.push_str(&line.join(" "));
            out.push('\n');
        }
        out
    }

    /// Write `x,y,danger` rows (with a header) for every non-empty cell.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> GridResult<()> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(["x", "y", "danger"])?;
        for (x, y, danger) in self.iter() {
            if danger.abs() < EMPTY_EPSILON {
                continue;
            }
            csv.write_record(&[x.to_string(), y.to_string(), danger.to_string()])?;
        }
        csv.flush()?;
        Ok(())
    }
}

fn register(cell: &mut Cell, id: PlaneId) {
    if !cell.occupants.contains(&id) {
        cell.occupants.push(id);
    }
}
