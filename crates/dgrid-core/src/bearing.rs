//! Compass octants used to pick which neighboring squares lie ahead of an
//! aircraft.

use serde::{Deserialize, Serialize};

/// One of the 8 compass directions, each covering a 45 degree sector.
///
/// Grid convention: north is `y - 1`, east is `x + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Octant {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl Octant {
    pub const ALL: [Octant; 8] = [
        Octant::N,
        Octant::NE,
        Octant::E,
        Octant::SE,
        Octant::S,
        Octant::SW,
        Octant::W,
        Octant::NW,
    ];

    /// Bucket a bearing in degrees (0 = north, clockwise positive).
    ///
    /// Sectors are half-open on the low side: `(-22.5, 22.5]` is N,
    /// `(22.5, 67.5]` is NE, and so on. Any finite bearing is accepted,
    /// including negative values and values beyond a full turn.
    pub fn from_bearing(bearing_deg: f64) -> Self {
        let normalized = bearing_deg.rem_euclid(360.0);
        let sector = ((normalized - 22.5) / 45.0).ceil() as i64;
        Self::from_index(sector.rem_euclid(8) as usize)
    }

    fn from_index(index: usize) -> Self {
        Self::ALL[index % 8]
    }

    fn index(self) -> usize {
        self as usize
    }

    /// Rotate clockwise by `steps` octants (negative rotates counter-clockwise).
    pub fn rotate(self, steps: i32) -> Self {
        Self::from_index((self.index() as i32 + steps).rem_euclid(8) as usize)
    }

    pub fn reverse(self) -> Self {
        self.rotate(4)
    }

    /// Cell offset `(dx, dy)` of the neighbor in this direction.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Octant::N => (0, -1),
            Octant::NE => (1, -1),
            Octant::E => (1, 0),
            Octant::SE => (1, 1),
            Octant::S => (0, 1),
            Octant::SW => (-1, 1),
            Octant::W => (-1, 0),
            Octant::NW => (-1, -1),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Octant::N => "N",
            Octant::NE => "NE",
            Octant::E => "E",
            Octant::SE => "SE",
            Octant::S => "S",
            Octant::SW => "SW",
            Octant::W => "W",
            Octant::NW => "NW",
        }
    }
}

impl std::fmt::Display for Octant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buckets_sector_boundaries() {
        assert_eq!(Octant::from_bearing(0.0), Octant::N);
        assert_eq!(Octant::from_bearing(22.5), Octant::N);
        assert_eq!(Octant::from_bearing(22.6), Octant::NE);
        assert_eq!(Octant::from_bearing(67.5), Octant::NE);
        assert_eq!(Octant::from_bearing(90.0), Octant::E);
        assert_eq!(Octant::from_bearing(180.0), Octant::S);
        assert_eq!(Octant::from_bearing(270.0), Octant::W);
        assert_eq!(Octant::from_bearing(337.5), Octant::NW);
        assert_eq!(Octant::from_bearing(337.6), Octant::N);
    }

    #[test]
    fn buckets_negative_and_wrapped_bearings() {
        assert_eq!(Octant::from_bearing(-22.4), Octant::N);
        assert_eq!(Octant::from_bearing(-45.0), Octant::NW);
        assert_eq!(Octant::from_bearing(-90.0), Octant::W);
        assert_eq!(Octant::from_bearing(-315.0), Octant::NE);
        assert_eq!(Octant::from_bearing(450.0), Octant::E);
    }

    #[test]
    fn reverse_and_rotate() {
        assert_eq!(Octant::N.reverse(), Octant::S);
        assert_eq!(Octant::SE.reverse(), Octant::NW);
        assert_eq!(Octant::NW.rotate(1), Octant::N);
        assert_eq!(Octant::N.rotate(-2), Octant::W);
    }

    #[test]
    fn offsets_are_unit_neighbors() {
        for octant in Octant::ALL {
            let (dx, dy) = octant.offset();
            assert!(dx.abs() <= 1 && dy.abs() <= 1 && (dx, dy) != (0, 0));
            let (rx, ry) = octant.reverse().offset();
            assert_eq!((dx + rx, dy + ry), (0, 0));
        }
        assert_eq!(Octant::SW.to_string(), "SW");
    }
}
