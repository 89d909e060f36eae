//! Trajectory prediction.
//!
//! An aircraft is assumed to fly toward its target one square per second.
//! Each second the straight-line angle to the target is bracketed by the two
//! nearest 45 degree grid directions, and the probability mass is split
//! between the neighbor squares in those directions. Prediction then
//! continues from one of the two squares, so the output is a single chain of
//! seconds with two weighted candidates per second.
//!
//! Angles here are signed: 0 is north (`y - 1`), positive is east of north,
//! negative west of north, and due south is +180.

use tracing::trace;

use crate::bearing::Octant;
use crate::config::GridConfig;
use crate::models::{Aircraft, GridPoint, PositionEstimate};
use crate::spatial::cell_delta;

/// Signed angle in degrees from `from` to `to`, in (-180, 180].
/// `None` when the two cells coincide.
pub fn leg_angle(from: GridPoint, to: GridPoint) -> Option<f64> {
    let (dx, dy) = cell_delta(from, to);
    if dx == 0.0 && dy == 0.0 {
        return None;
    }
    let distance = dx.hypot(dy);
    let lateral = (dx.abs() / distance).asin().to_degrees();

    let mut angle = if to.y < from.y { lateral } else { 180.0 - lateral };
    if dx < 0.0 {
        angle = -angle;
    }
    Some(angle)
}

/// The two 45 degree grid directions bracketing `angle`.
///
/// Non-negative angles use the eastern brackets; each bracket is closed on
/// its lower bound, so 0 gives (0, 45) and 90 gives (90, 135).
pub fn neighboring_angles(angle: f64) -> (i32, i32) {
    if angle >= 0.0 {
        if angle < 45.0 {
            (0, 45)
        } else if angle < 90.0 {
            (45, 90)
        } else if angle < 135.0 {
            (90, 135)
        } else {
            (135, 180)
        }
    } else if angle > -45.0 {
        (0, -45)
    } else if angle > -90.0 {
        (-45, -90)
    } else if angle > -135.0 {
        (-90, -135)
    } else {
        (-135, -180)
    }
}

/// Order a bracket as `(closest, other)`. Ties go to the second bracket.
pub fn closest_bracket(angle: f64, (first, second): (i32, i32)) -> (i32, i32) {
    if (angle - first as f64).abs() >= (angle - second as f64).abs() {
        (second, first)
    } else {
        (first, second)
    }
}

/// Fraction of the step's mass that belongs to the `closest` direction.
pub fn split_weight(angle: f64, closest: i32, other: i32) -> f64 {
    let closest_f = closest as f64;
    if angle.abs() > closest_f.abs() && closest != 0 {
        closest_f / angle
    } else if closest != 0 {
        angle / closest_f
    } else {
        // closest is due north: measure against the other bracket instead
        1.0 - angle / other as f64
    }
}

/// Directions receiving the majority and the remainder for a bracket pair.
pub fn placement(closest: i32, other: i32) -> (Octant, Octant) {
    use Octant::*;
    match (closest, other) {
        (0, 45) => (N, NE),
        (45, 0) => (NE, N),
        (45, 90) => (NE, E),
        (90, 45) => (E, NE),
        (90, 135) => (E, SE),
        (135, 90) => (SE, E),
        (135, 180) => (SE, S),
        (0, -45) => (N, NW),
        (-45, 0) => (NW, N),
        (-45, -90) => (NW, W),
        (-90, -45) => (W, NW),
        (-90, -135) => (W, SW),
        (-135, -90) => (SW, W),
        (-135, -180) => (SW, S),
        (c, o) if c + o > 0 => (S, SE),
        _ => (S, SW),
    }
}

/// One predicted second: the majority candidate and the remainder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub angle: f64,
    pub closest: i32,
    pub other: i32,
    pub majority: PositionEstimate,
    pub minority: PositionEstimate,
}

/// A predicted estimate tagged with the second it belongs to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedEstimate {
    /// Seconds into the future, starting at 1.
    pub seconds: u32,
    pub estimate: PositionEstimate,
    /// Part of the post-arrival goal marking.
    pub goal_linger: bool,
}

/// Full prediction for one aircraft: both legs followed by the goal linger.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    /// Estimates with a sentinel after every second.
    pub estimates: Vec<PositionEstimate>,
    /// Index in `estimates` where the goal-linger estimates begin.
    pub linger_from: usize,
    /// Octant of the bearing to the final destination.
    pub linger_octant: Octant,
}

impl Trajectory {
    /// Number of seconds covered (sentinel count).
    pub fn seconds(&self) -> u32 {
        self.estimates.iter().filter(|e| e.is_sentinel()).count() as u32
    }

    /// Deposit-bearing estimates with their second, sentinels consumed.
    pub fn timed(&self) -> impl Iterator<Item = TimedEstimate> + '_ {
        let mut seconds = 1;
        self.estimates
            .iter()
            .enumerate()
            .filter_map(move |(idx, estimate)| {
                if estimate.is_sentinel() {
                    seconds += 1;
                    return None;
                }
                Some(TimedEstimate {
                    seconds,
                    estimate: *estimate,
                    goal_linger: idx >= self.linger_from,
                })
            })
    }
}

/// Predicts probable future squares of an aircraft.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectoryPredictor {
    pub danger_ceiling: f64,
    pub branch_threshold: f64,
    pub goal_linger_secs: u32,
    pub goal_linger_weight: f64,
}

impl Default for TrajectoryPredictor {
    fn default() -> Self {
        Self::new(&GridConfig::default())
    }
}

impl TrajectoryPredictor {
    pub fn new(config: &GridConfig) -> Self {
        Self {
            danger_ceiling: config.danger_ceiling,
            branch_threshold: config.branch_threshold,
            goal_linger_secs: config.goal_linger_secs,
            goal_linger_weight: config.goal_linger_weight,
        }
    }

    /// Predict the next second from `from` toward `target`.
    /// `None` once the target is reached.
    pub fn step(&self, from: GridPoint, target: GridPoint) -> Option<Step> {
        let angle = leg_angle(from, target)?;
        let (closest, other) = closest_bracket(angle, neighboring_angles(angle));
        let weight = split_weight(angle, closest, other);

        let majority_weight = weight.clamp(0.0, self.danger_ceiling);
        let minority_weight = (1.0 - weight).clamp(0.0, self.danger_ceiling);

        let (major_dir, minor_dir) = placement(closest, other);
        let (mdx, mdy) = major_dir.offset();
        let (odx, ody) = minor_dir.offset();

        Some(Step {
            angle,
            closest,
            other,
            majority: PositionEstimate::at(from.offset(mdx, mdy), majority_weight),
            minority: PositionEstimate::at(from.offset(odx, ody), minority_weight),
        })
    }

    /// Predict one leg, at most `max_steps` seconds long. Every second
    /// contributes two estimates followed by a sentinel. A zero-length leg
    /// yields nothing.
    pub fn predict_leg(
        &self,
        start: GridPoint,
        target: GridPoint,
        max_steps: u32,
    ) -> Vec<PositionEstimate> {
        let mut estimates = Vec::new();
        self.extend_leg(&mut estimates, start, target, max_steps);
        estimates
    }

    /// Returns the number of seconds appended.
    fn extend_leg(
        &self,
        out: &mut Vec<PositionEstimate>,
        start: GridPoint,
        target: GridPoint,
        max_steps: u32,
    ) -> u32 {
        let mut current = start;
        let mut steps = 0;
        while steps < max_steps {
            let Some(step) = self.step(current, target) else {
                break;
            };
            out.push(step.majority);
            out.push(step.minority);
            out.push(PositionEstimate::SENTINEL);
            steps += 1;

            current = if step.majority.weight > self.branch_threshold {
                step.majority.point()
            } else {
                step.minority.point()
            };
        }
        trace!(
            "leg ({}, {}) -> ({}, {}): {} step(s), ended at ({}, {})",
            start.x,
            start.y,
            target.x,
            target.y,
            steps,
            current.x,
            current.y
        );
        steps
    }

    /// Predict an aircraft's next `horizon` seconds: current location to its
    /// next waypoint, then on to its final destination, then the goal linger
    /// marking the destination for a few more seconds.
    pub fn predict_aircraft<A: Aircraft + ?Sized>(&self, aircraft: &A, horizon: u32) -> Trajectory {
        let mut estimates = Vec::new();
        let waypoint = aircraft.destination();
        let goal = aircraft.final_destination();

        let used = self.extend_leg(&mut estimates, aircraft.location(), waypoint, horizon);
        self.extend_leg(&mut estimates, waypoint, goal, horizon.saturating_sub(used));

        let linger_from = estimates.len();
        for _ in 0..self.goal_linger_secs {
            estimates.push(PositionEstimate::at(goal, self.goal_linger_weight));
            estimates.push(PositionEstimate::SENTINEL);
        }

        Trajectory {
            estimates,
            linger_from,
            linger_octant: Octant::from_bearing(aircraft.bearing_to_destination()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Plane;

    const EPS: f64 = 1e-9;

    fn p(x: i32, y: i32) -> GridPoint {
        GridPoint::new(x, y)
    }

    #[test]
    fn leg_angle_cardinals() {
        let origin = p(5, 5);
        assert_eq!(leg_angle(origin, p(5, 0)), Some(0.0));
        assert_eq!(leg_angle(origin, p(9, 5)), Some(90.0));
        assert_eq!(leg_angle(origin, p(5, 9)), Some(180.0));
        assert_eq!(leg_angle(origin, p(1, 5)), Some(-90.0));
        assert_eq!(leg_angle(origin, origin), None);
        let ne = leg_angle(origin, p(7, 3)).unwrap();
        assert!((ne - 45.0).abs() < EPS);
        let sw = leg_angle(origin, p(3, 7)).unwrap();
        assert!((sw + 135.0).abs() < EPS);
    }

    #[test]
    fn leg_angle_across_the_coordinate_range() {
        assert_eq!(leg_angle(p(i32::MIN, 0), p(i32::MAX, 0)), Some(90.0));
        assert_eq!(leg_angle(p(0, i32::MIN), p(0, i32::MAX)), Some(180.0));
    }

    #[test]
    fn bracket_boundaries() {
        assert_eq!(neighboring_angles(0.0), (0, 45));
        assert_eq!(neighboring_angles(44.9), (0, 45));
        assert_eq!(neighboring_angles(45.0), (45, 90));
        assert_eq!(neighboring_angles(89.999), (45, 90));
        assert_eq!(neighboring_angles(90.0), (90, 135));
        assert_eq!(neighboring_angles(180.0), (135, 180));
        assert_eq!(neighboring_angles(-0.5), (0, -45));
        assert_eq!(neighboring_angles(-45.0), (-45, -90));
        assert_eq!(neighboring_angles(-180.0), (-135, -180));
    }

    #[test]
    fn closest_prefers_second_on_tie() {
        assert_eq!(closest_bracket(22.5, (0, 45)), (45, 0));
        assert_eq!(closest_bracket(10.0, (0, 45)), (0, 45));
        assert_eq!(closest_bracket(-30.0, (0, -45)), (-45, 0));
        assert_eq!(closest_bracket(90.0, (90, 135)), (90, 135));
    }

    #[test]
    fn split_weight_branches() {
        // |angle| > |closest|
        assert!((split_weight(50.0, 45, 90) - 0.9).abs() < EPS);
        // |angle| <= |closest|
        assert!((split_weight(30.0, 45, 0) - 30.0 / 45.0).abs() < EPS);
        // closest == 0 avoids dividing by it
        assert!((split_weight(0.0, 0, 45) - 1.0).abs() < EPS);
        assert!((split_weight(9.0, 0, 45) - 0.8).abs() < EPS);
        assert!((split_weight(-9.0, 0, -45) - 0.8).abs() < EPS);
    }

    #[test]
    fn placement_table_covers_every_pair() {
        use Octant::*;
        let cases = [
            ((0, 45), (N, NE)),
            ((45, 0), (NE, N)),
            ((45, 90), (NE, E)),
            ((90, 45), (E, NE)),
            ((90, 135), (E, SE)),
            ((135, 90), (SE, E)),
            ((135, 180), (SE, S)),
            ((180, 135), (S, SE)),
            ((0, -45), (N, NW)),
            ((-45, 0), (NW, N)),
            ((-45, -90), (NW, W)),
            ((-90, -45), (W, NW)),
            ((-90, -135), (W, SW)),
            ((-135, -90), (SW, W)),
            ((-135, -180), (SW, S)),
            ((-180, -135), (S, SW)),
        ];
        for ((closest, other), expected) in cases {
            assert_eq!(placement(closest, other), expected, "({closest}, {other})");
        }
    }

    #[test]
    fn zero_length_leg_is_empty() {
        let predictor = TrajectoryPredictor::default();
        assert!(predictor.predict_leg(p(3, 3), p(3, 3), 20).is_empty());
    }

    #[test]
    fn due_north_puts_majority_north() {
        let predictor = TrajectoryPredictor::default();
        let step = predictor.step(p(5, 5), p(5, 0)).unwrap();
        assert_eq!(step.closest, 0);
        assert_eq!(step.majority.point(), p(5, 4));
        assert_eq!(step.minority.point(), p(6, 4));
        assert!((step.majority.weight - 0.4).abs() < EPS);
        assert!(step.minority.weight.abs() < EPS);
        assert!(step.majority.weight.is_finite() && step.minority.weight.is_finite());
    }

    #[test]
    fn weights_never_exceed_ceiling() {
        let predictor = TrajectoryPredictor::default();
        let origin = p(10, 10);
        for x in 0..=20 {
            for y in 0..=20 {
                let Some(step) = predictor.step(origin, p(x, y)) else {
                    continue;
                };
                for weight in [step.majority.weight, step.minority.weight] {
                    assert!((0.0..=0.4 + EPS).contains(&weight), "({x}, {y}): {weight}");
                }
            }
        }
    }

    #[test]
    fn legs_reach_their_target() {
        let predictor = TrajectoryPredictor::default();
        let origin = p(10, 10);
        for x in 0..=20 {
            for y in 0..=20 {
                let target = p(x, y);
                let estimates = predictor.predict_leg(origin, target, 40);
                let seconds = estimates.iter().filter(|e| e.is_sentinel()).count();
                let chebyshev = (x - 10).abs().max((y - 10).abs()) as usize;
                assert_eq!(seconds, chebyshev, "target ({x}, {y})");
                if chebyshev > 0 {
                    let last_majority = estimates[estimates.len() - 3];
                    assert_eq!(last_majority.point(), target);
                }
            }
        }
    }

    #[test]
    fn leg_respects_step_budget() {
        let predictor = TrajectoryPredictor::default();
        let estimates = predictor.predict_leg(p(0, 10), p(0, 0), 4);
        assert_eq!(estimates.len(), 12);
        assert_eq!(estimates[9].point(), p(0, 6));
    }

    #[test]
    fn low_majority_continues_from_remainder() {
        let predictor = TrajectoryPredictor {
            danger_ceiling: 0.2,
            ..TrajectoryPredictor::default()
        };
        // About 63 degrees: majority NE, remainder E. A majority of 0.2 is
        // under the branch threshold so the chain continues from E.
        let estimates = predictor.predict_leg(p(0, 4), p(4, 2), 2);
        assert_eq!(estimates[0].point(), p(1, 3));
        assert_eq!(estimates[1].point(), p(1, 4));
        assert!((estimates[0].weight - 0.2).abs() < EPS);
        assert_eq!(estimates[3].point(), p(2, 3));
        assert_eq!(estimates[4].point(), p(2, 4));
    }

    #[test]
    fn aircraft_prediction_chains_legs_and_lingers() {
        let predictor = TrajectoryPredictor::default();
        let plane = Plane::new(1, p(0, 0), p(3, 3)).with_waypoint(p(2, 0));
        let trajectory = predictor.predict_aircraft(&plane, 20);

        // 2 seconds to the waypoint, 3 to the goal, 3 lingering.
        assert_eq!(trajectory.seconds(), 8);
        let timed: Vec<_> = trajectory.timed().collect();
        let second_leg_start = timed.iter().find(|t| t.seconds == 3).unwrap();
        assert_eq!(second_leg_start.estimate.point(), p(2, 1));

        let linger: Vec<_> = timed.iter().filter(|t| t.goal_linger).collect();
        assert_eq!(linger.len(), 3);
        assert_eq!(
            linger.iter().map(|t| t.seconds).collect::<Vec<_>>(),
            vec![6, 7, 8]
        );
        assert!(linger
            .iter()
            .all(|t| t.estimate.point() == p(3, 3) && t.estimate.weight == 1.0));
        assert_eq!(trajectory.linger_octant, Octant::SE);
    }

    #[test]
    fn horizon_is_shared_between_legs() {
        let predictor = TrajectoryPredictor::default();
        let plane = Plane::new(1, p(0, 10), p(10, 0)).with_waypoint(p(0, 0));
        let trajectory = predictor.predict_aircraft(&plane, 12);
        let non_linger = trajectory.estimates[..trajectory.linger_from]
            .iter()
            .filter(|e| e.is_sentinel())
            .count();
        assert_eq!(non_linger, 12);
    }
}
