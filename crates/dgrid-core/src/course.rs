//! Course files.
//!
//! A course is a plain-text list of waypoints, one per line:
//!
//! ```text
//! # comment
//! planeID latitude longitude altitude
//! ```
//!
//! Fields are whitespace separated, `#` starts a comment line and blank
//! lines are ignored. Lines are read in order: the first line for a plane is
//! its starting position, the rest are its waypoints.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GridError, GridResult};
use crate::models::{Plane, PlaneId};
use crate::spatial::GeoField;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CourseWaypoint {
    pub plane_id: PlaneId,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Course {
    /// Comment text, without the leading `#`.
    pub comments: Vec<String>,
    pub waypoints: Vec<CourseWaypoint>,
}

impl Course {
    pub fn parse(text: &str) -> GridResult<Self> {
        let mut course = Course::default();
        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(comment) = line.strip_prefix('#') {
                course.comments.push(comment.to_string());
                continue;
            }
            course.waypoints.push(parse_waypoint(line, idx + 1)?);
        }
        Ok(course)
    }

    pub fn read(path: &Path) -> GridResult<Self> {
        Self::parse(&fs::read_to_string(path)?)
    }

    /// Comments first, then one tab-separated line per waypoint.
    pub fn write<W: io::Write>(&self, mut writer: W) -> GridResult<()> {
        for comment in &self.comments {
            writeln!(writer, "#{comment}")?;
        }
        if !self.comments.is_empty() {
            writeln!(writer)?;
        }
        for wp in &self.waypoints {
            writeln!(
                writer,
                "{}\t\t{}\t{}\t{}",
                wp.plane_id, wp.latitude, wp.longitude, wp.altitude
            )?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Plane ids in order of first appearance.
    pub fn plane_ids(&self) -> Vec<PlaneId> {
        let mut ids = Vec::new();
        for wp in &self.waypoints {
            if !ids.contains(&wp.plane_id) {
                ids.push(wp.plane_id);
            }
        }
        ids
    }

    /// Every line belonging to one plane, in file order.
    pub fn route(&self, id: PlaneId) -> Vec<&CourseWaypoint> {
        self.waypoints.iter().filter(|wp| wp.plane_id == id).collect()
    }

    /// Project each plane onto `field`: first line is the current location,
    /// second the next waypoint, last the final destination. A plane with a
    /// single line sits on its goal.
    pub fn planes(&self, field: &GeoField) -> Vec<Plane> {
        self.plane_ids()
            .into_iter()
            .filter_map(|id| {
                let route = self.route(id);
                let cell = |wp: &CourseWaypoint| field.to_grid(wp.latitude, wp.longitude);
                let start = cell(*route.first()?);
                let goal = cell(*route.last()?);
                let next = route.get(1).map(|wp| cell(*wp)).unwrap_or(goal);
                Some(Plane::new(id, start, goal).with_waypoint(next))
            })
            .collect()
    }
}

fn parse_waypoint(line: &str, line_no: usize) -> GridResult<CourseWaypoint> {
    let err = |message: String| GridError::CourseParse {
        line: line_no,
        message,
    };
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 4 {
        return Err(err(format!("expected 4 fields, found {}", fields.len())));
    }
    let plane_id = fields[0]
        .parse::<PlaneId>()
        .map_err(|_| err(format!("bad plane id {:?}", fields[0])))?;
    let number = |name: &str, raw: &str| -> GridResult<f64> {
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| err(format!("bad {name} {raw:?}")))
    };
    Ok(CourseWaypoint {
        plane_id,
        latitude: number("latitude", fields[1])?,
        longitude: number("longitude", fields[2])?,
        altitude: number("altitude", fields[3])?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# Data format:
#     planeID latitude longitude altitude

0\t\t37.244\t-115.808\t1400
1\t\t37.243\t-115.807\t1400

# Plane ID == 0
0 37.2420 -115.8060 1400
0 37.2410 -115.8050 1400
";

    #[test]
    fn parses_comments_blanks_and_waypoints() {
        let course = Course::parse(SAMPLE).unwrap();
        assert_eq!(course.waypoints.len(), 4);
        assert_eq!(course.comments.len(), 3);
        assert_eq!(course.plane_ids(), vec![0, 1]);
        assert_eq!(course.route(0).len(), 3);
        assert_eq!(course.route(0)[2].longitude, -115.805);
    }

    #[test]
    fn reports_the_offending_line() {
        let err = Course::parse("# ok\n\n3 37.2 -115.8\n").unwrap_err();
        assert!(matches!(err, GridError::CourseParse { line: 3, .. }));
        let err = Course::parse("x 37.2 -115.8 1400\n").unwrap_err();
        assert!(matches!(err, GridError::CourseParse { line: 1, .. }));
        assert!(Course::parse("1 NaN -115.8 1400\n").is_err());
    }

    #[test]
    fn written_course_parses_back() {
        let course = Course::parse(SAMPLE).unwrap();
        let mut buf = Vec::new();
        course.write(&mut buf).unwrap();
        let reread = Course::parse(&String::from_utf8(buf).unwrap()).unwrap();
        assert_eq!(reread, course);
    }

    #[test]
    fn planes_use_first_second_and_last_lines() {
        let field = GeoField::new(37.245, -115.809, 500.0, 500.0, 10.0).unwrap();
        let course = Course::parse(SAMPLE).unwrap();
        let planes = course.planes(&field);
        assert_eq!(planes.len(), 2);

        let first = &planes[0];
        assert_eq!(first.location, field.to_grid(37.244, -115.808));
        assert_eq!(first.destination, field.to_grid(37.242, -115.806));
        assert_eq!(first.final_destination, field.to_grid(37.241, -115.805));

        let lone = &planes[1];
        assert_eq!(lone.destination, lone.final_destination);
        assert_eq!(lone.location, lone.final_destination);
    }
}
