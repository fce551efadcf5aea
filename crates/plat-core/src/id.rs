//! Strongly-typed object identifiers.

use std::fmt;

/// Identifies an OpenStreetMap object.
///
/// Identifiers are signed: negative values denote locally created
/// objects that have not been uploaded, as produced by most editors.
/// Derived objects such as areas use the magnitude's low bit to record
/// provenance, so the sign must survive all arithmetic on the id.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub i64);

impl ObjectId {
    /// The absolute value of the id as an unsigned integer.
    ///
    /// Well-defined for `i64::MIN`, unlike `i64::abs`.
    pub fn magnitude(self) -> u64 {
        self.0.unsigned_abs()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ObjectId {
    fn from(v: i64) -> Self {
        Self(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magnitude_handles_extremes() {
        assert_eq!(ObjectId(0).magnitude(), 0);
        assert_eq!(ObjectId(-7).magnitude(), 7);
        assert_eq!(ObjectId(i64::MIN).magnitude(), 1u64 << 63);
    }

    #[test]
    fn display_keeps_the_sign() {
        assert_eq!(ObjectId(-42).to_string(), "-42");
        assert_eq!(ObjectId(17).to_string(), "17");
    }
}
