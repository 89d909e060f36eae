//! Builds the danger grid for one aircraft of a course file and dumps it.
//!
//! Layers go to stdout; logs go to stderr.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use dgrid_cli::config;
use dgrid_cli::course_gen::test_field;
use dgrid_core::{Course, DangerGrid, SpatialLayer, DEFAULT_DANGER_WEIGHT};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Danger grid inspector
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Course file to load
    course: PathBuf,

    /// Plane whose point of view the grid is built from
    #[arg(long, default_value_t = 0)]
    owner: u32,

    /// Square size in meters
    #[arg(long, default_value_t = 10.0)]
    resolution: f64,

    /// JSON grid configuration (DGRID_* environment variables override it)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seconds to print; all layers when omitted
    #[arg(long = "time", allow_negative_numbers = true)]
    times: Vec<i32>,

    /// Fuse the distance to this goal square, given as X,Y
    #[arg(long, value_parser = parse_cell)]
    goal: Option<(usize, usize)>,

    /// Weight of the danger term when fusing distance costs
    #[arg(long, default_value_t = DEFAULT_DANGER_WEIGHT)]
    danger_weight: f64,

    /// Print values x100 rounded, for fused cost surfaces
    #[arg(long)]
    scaled: bool,

    /// Also write every layer as CSV into this directory
    #[arg(long)]
    csv_dir: Option<PathBuf>,

    /// Log as JSON lines
    #[arg(long)]
    log_json: bool,
}

fn parse_cell(raw: &str) -> Result<(usize, usize), String> {
    let (x, y) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got {raw:?}"))?;
    let x = x.trim().parse().map_err(|_| format!("bad x in {raw:?}"))?;
    let y = y.trim().parse().map_err(|_| format!("bad y in {raw:?}"))?;
    Ok((x, y))
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("dgrid_core=info".parse()?)
                .add_directive("danger_dump=info".parse()?),
        )
        .with(
            args.log_json
                .then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)),
        )
        .with(
            (!args.log_json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)),
        )
        .init();

    let grid_config = config::load(args.config.as_deref())?;
    let course = Course::read(&args.course)
        .with_context(|| format!("loading course {}", args.course.display()))?;

    let field = test_field(args.resolution)?;
    let planes = course.planes(&field);
    if !planes.iter().any(|p| p.id == args.owner) {
        bail!("plane {} is not in {}", args.owner, args.course.display());
    }
    tracing::info!(
        planes = planes.len(),
        width = field.width_in_squares(),
        height = field.height_in_squares(),
        "loaded course"
    );

    let map = SpatialLayer::new(field.width_m, field.height_m, field.resolution_m)?;
    let mut grid = DangerGrid::from_layer(&planes, &map, args.owner, grid_config)?;

    if let Some((goal_x, goal_y)) = args.goal {
        grid.calculate_distance_costs(goal_x, goal_y, args.danger_weight)?;
    }

    let times: Vec<i32> = if args.times.is_empty() {
        (-(grid.look_behind() as i32)..=grid.time_in_secs() as i32).collect()
    } else {
        args.times.clone()
    };
    for seconds in times {
        let rendered = if args.scaled {
            grid.render_scaled(seconds)?
        } else {
            grid.render(seconds)?
        };
        println!("t = {seconds}s");
        println!("{rendered}");
    }

    if let Some(dir) = &args.csv_dir {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        let prefix = format!("plane_{}", args.owner);
        let written = grid.export_csv(dir, &prefix)?;
        tracing::info!(files = written.len(), dir = %dir.display(), "wrote CSV layers");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_goal_cells() {
        assert_eq!(parse_cell("3,4"), Ok((3, 4)));
        assert_eq!(parse_cell(" 10 , 0 "), Ok((10, 0)));
        assert!(parse_cell("3").is_err());
        assert!(parse_cell("-1,2").is_err());
    }
}
