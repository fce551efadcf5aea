//! Fixed-point geographic coordinates.

use std::fmt;

/// Fixed-point scale: one unit is 1e-7 of a degree.
const SCALE: f64 = 10_000_000.0;

/// A geographic coordinate pair stored as 32-bit fixed-point values.
///
/// `x` is longitude and `y` is latitude, each scaled by 1e-7 degrees.
/// The sentinel value [`Location::UNDEFINED_COORDINATE`] in either axis
/// marks the location as undefined; node references inside ways carry
/// undefined locations until a location store fills them in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Location {
    x: i32,
    y: i32,
}

impl Location {
    /// Sentinel marking an axis as not set.
    pub const UNDEFINED_COORDINATE: i32 = i32::MAX;

    /// Build a location from raw fixed-point coordinates.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Build a location from degree values.
    ///
    /// Values are rounded to the fixed-point grid. Degrees outside the
    /// representable range saturate at the axis limits.
    pub fn from_degrees(lon: f64, lat: f64) -> Self {
        Self {
            x: (lon * SCALE).round() as i32,
            y: (lat * SCALE).round() as i32,
        }
    }

    /// The undefined location.
    pub const fn undefined() -> Self {
        Self {
            x: Self::UNDEFINED_COORDINATE,
            y: Self::UNDEFINED_COORDINATE,
        }
    }

    /// Whether both axes hold real coordinates.
    pub fn is_defined(&self) -> bool {
        self.x != Self::UNDEFINED_COORDINATE && self.y != Self::UNDEFINED_COORDINATE
    }

    /// Raw fixed-point longitude.
    pub fn x(&self) -> i32 {
        self.x
    }

    /// Raw fixed-point latitude.
    pub fn y(&self) -> i32 {
        self.y
    }

    /// Longitude in degrees.
    pub fn lon(&self) -> f64 {
        f64::from(self.x) / SCALE
    }

    /// Latitude in degrees.
    pub fn lat(&self) -> f64 {
        f64::from(self.y) / SCALE
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::undefined()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_defined() {
            write!(f, "({},{})", self.lon(), self.lat())
        } else {
            f.write_str("(undefined)")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn degrees_round_to_the_fixed_point_grid() {
        let loc = Location::from_degrees(9.43929, 52.51053);
        assert_eq!(loc.x(), 94_392_900);
        assert_eq!(loc.y(), 525_105_300);
        assert!((loc.lon() - 9.43929).abs() < 1e-9);
        assert!((loc.lat() - 52.51053).abs() < 1e-9);
    }

    #[test]
    fn default_is_undefined() {
        let loc = Location::default();
        assert!(!loc.is_defined());
        assert_eq!(loc.x(), Location::UNDEFINED_COORDINATE);
        assert_eq!(loc.to_string(), "(undefined)");
    }

    #[test]
    fn one_undefined_axis_is_undefined() {
        let loc = Location::new(100, Location::UNDEFINED_COORDINATE);
        assert!(!loc.is_defined());
    }

    #[test]
    fn out_of_range_degrees_saturate() {
        let loc = Location::from_degrees(1e300, -1e300);
        assert_eq!(loc.x(), i32::MAX);
        assert_eq!(loc.y(), i32::MIN);
    }

    proptest! {
        #[test]
        fn degree_round_trip_stays_on_grid(
            x in -1_800_000_000i32..=1_800_000_000,
            y in -900_000_000i32..=900_000_000,
        ) {
            let loc = Location::new(x, y);
            let back = Location::from_degrees(loc.lon(), loc.lat());
            prop_assert_eq!(back, loc);
        }
    }
}
