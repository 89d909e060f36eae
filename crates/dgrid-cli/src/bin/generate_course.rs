//! Writes a random course file for the 500 m test field.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use dgrid_cli::{generate_course, CourseSettings};

/// Seeded random course generator
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Random seed
    #[arg(long, default_value_t = 803)]
    seed: u64,

    /// Number of planes (ids start at 0)
    #[arg(long, default_value_t = 32)]
    planes: u32,

    /// Waypoints per plane
    #[arg(long, default_value_t = 20)]
    waypoints: u32,

    /// Minimum altitude (inclusive)
    #[arg(long, default_value_t = 1400)]
    min_alt: u32,

    /// Maximum altitude (exclusive)
    #[arg(long, default_value_t = 1401)]
    max_alt: u32,

    /// Output file; defaults to final_<planes>_500m.course
    #[arg(long, short)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let settings = CourseSettings {
        seed: args.seed,
        planes: args.planes,
        waypoints: args.waypoints,
        min_alt: args.min_alt,
        max_alt: args.max_alt,
    };
    let path = args
        .output
        .unwrap_or_else(|| PathBuf::from(format!("final_{}_500m.course", args.planes)));

    let course = generate_course(&settings)?;
    let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    course
        .write(BufWriter::new(file))
        .with_context(|| format!("writing {}", path.display()))?;

    println!(
        "Wrote {} planes x {} waypoints (seed {}) to {}",
        settings.planes,
        settings.waypoints,
        settings.seed,
        path.display()
    );
    Ok(())
}
