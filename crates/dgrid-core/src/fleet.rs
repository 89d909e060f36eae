//! One danger grid per aircraft, each built from that aircraft's point of
//! view over the same read-only aircraft list.
//!
//! With the `parallel` feature the grids are built on the rayon pool; each
//! grid owns its layers, so no coordination is needed.

use tracing::debug;

use crate::config::GridConfig;
use crate::error::GridResult;
use crate::grid::DangerGrid;
use crate::layer::SpatialLayer;
use crate::models::Aircraft;

/// Build a grid for every aircraft in `aircraft`, in list order.
pub fn build_fleet_grids<A: Aircraft + Sync>(
    aircraft: &[A],
    map: &SpatialLayer,
    config: &GridConfig,
) -> GridResult<Vec<DangerGrid>> {
    config.validate()?;

    #[cfg(not(feature = "parallel"))]
    let grids = aircraft
        .iter()
        .map(|owner| DangerGrid::from_layer(aircraft, map, owner.id(), config.clone()))
        .collect::<GridResult<Vec<_>>>()?;

    #[cfg(feature = "parallel")]
    let grids = {
        use rayon::prelude::*;

        aircraft
            .par_iter()
            .map(|owner| DangerGrid::from_layer(aircraft, map, owner.id(), config.clone()))
            .collect::<GridResult<Vec<_>>>()?
    };

    debug!(grids = grids.len(), "built fleet danger grids");
    Ok(grids)
}
