//! Danger grid CLI - command line tools around the danger grid engine.
//!
//! This crate provides the binaries:
//! - generate_course: seeded random course file generator
//! - danger_dump: builds a danger grid from a course file and dumps its layers

pub mod config;
pub mod course_gen;

pub use course_gen::{generate_course, CourseSettings};
