//! `Position` and `Offset`: integer-aligned voxel coordinates
//!
//! Every cell a tracker can observe is addressed by an integer triple within
//! some grid. World bindings frequently hand around floating-point vectors,
//! so conversion from floats is fallible: a non-integer component is a
//! caller precondition violation, not something to round away.

use std::fmt;
use std::ops::{Add, Index, Neg, Sub};

use crate::track_error::TrackError;

/// Integer cell coordinate within one grid.
#[derive(
    Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[repr(transparent)]
pub struct Position(pub [i32; 3]);

/// Integer displacement between cells. Also the wire form of a direction:
/// the inbound direction handed to filter hooks is an `Offset`.
#[derive(
    Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[repr(transparent)]
pub struct Offset(pub [i32; 3]);

impl Position {
    /// Construct from integer components.
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Position([x, y, z])
    }

    /// Construct from floating-point components.
    ///
    /// Returns an error on the first component that is not exactly an
    /// integer (or does not fit in `i32`).
    pub fn try_from_f64(x: f64, y: f64, z: f64) -> Result<Self, TrackError> {
        let mut out = [0i32; 3];
        for (slot, (axis, value)) in out
            .iter_mut()
            .zip([('x', x), ('y', y), ('z', z)])
        {
            if value.fract() != 0.0 || value < i32::MIN as f64 || value > i32::MAX as f64 {
                return Err(TrackError::NonIntegerCoordinate { axis, value });
            }
            *slot = value as i32;
        }
        Ok(Position(out))
    }

    /// X component.
    #[inline]
    pub const fn x(&self) -> i32 {
        self.0[0]
    }
    /// Y component.
    #[inline]
    pub const fn y(&self) -> i32 {
        self.0[1]
    }
    /// Z component.
    #[inline]
    pub const fn z(&self) -> i32 {
        self.0[2]
    }
}

impl Offset {
    /// Construct from integer components.
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Offset([x, y, z])
    }

    /// The zero displacement.
    pub const ZERO: Offset = Offset([0, 0, 0]);

    /// Six axis-aligned unit offsets (full 3D face adjacency).
    pub const CARDINAL_6: [Offset; 6] = [
        Offset([1, 0, 0]),
        Offset([-1, 0, 0]),
        Offset([0, 1, 0]),
        Offset([0, -1, 0]),
        Offset([0, 0, 1]),
        Offset([0, 0, -1]),
    ];

    /// Four axis-aligned unit offsets in the XZ plane.
    pub const HORIZONTAL_4: [Offset; 4] = [
        Offset([1, 0, 0]),
        Offset([-1, 0, 0]),
        Offset([0, 0, 1]),
        Offset([0, 0, -1]),
    ];
}

impl Add<Offset> for Position {
    type Output = Position;
    #[inline]
    fn add(self, rhs: Offset) -> Position {
        Position([
            self.0[0] + rhs.0[0],
            self.0[1] + rhs.0[1],
            self.0[2] + rhs.0[2],
        ])
    }
}

impl Sub for Position {
    type Output = Offset;
    #[inline]
    fn sub(self, rhs: Position) -> Offset {
        Offset([
            self.0[0] - rhs.0[0],
            self.0[1] - rhs.0[1],
            self.0[2] - rhs.0[2],
        ])
    }
}

impl Neg for Offset {
    type Output = Offset;
    #[inline]
    fn neg(self) -> Offset {
        Offset([-self.0[0], -self.0[1], -self.0[2]])
    }
}

impl Index<usize> for Position {
    type Output = i32;
    #[inline]
    fn index(&self, i: usize) -> &i32 {
        &self.0[i]
    }
}

impl Index<usize> for Offset {
    type Output = i32;
    #[inline]
    fn index(&self, i: usize) -> &i32 {
        &self.0[i]
    }
}

impl From<[i32; 3]> for Position {
    #[inline]
    fn from(v: [i32; 3]) -> Self {
        Position(v)
    }
}

impl From<[i32; 3]> for Offset {
    #[inline]
    fn from(v: [i32; 3]) -> Self {
        Offset(v)
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.0[0], self.0[1], self.0[2])
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.0[0], self.0[1], self.0[2])
    }
}

impl fmt::Debug for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{},{}]", self.0[0], self.0[1], self.0[2])
    }
}

#[cfg(test)]
mod layout_tests {
    //! Compile-time assertion that the coordinate newtypes stay transparent.
    use super::*;
    use static_assertions::assert_eq_size;

    assert_eq_size!(Position, [i32; 3]);
    assert_eq_size!(Offset, [i32; 3]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_conversion_accepts_aligned() {
        let p = Position::try_from_f64(1.0, -4.0, 0.0).unwrap();
        assert_eq!(p, Position::new(1, -4, 0));
    }

    #[test]
    fn float_conversion_rejects_fractional() {
        let err = Position::try_from_f64(1.0, 2.5, 0.0).unwrap_err();
        assert_eq!(
            err,
            TrackError::NonIntegerCoordinate {
                axis: 'y',
                value: 2.5
            }
        );
    }

    #[test]
    fn float_conversion_rejects_overflow() {
        assert!(Position::try_from_f64(1e12, 0.0, 0.0).is_err());
    }

    #[test]
    fn add_offset_and_difference() {
        let p = Position::new(2, 2, 0);
        let q = p + Offset::new(-1, 0, 0);
        assert_eq!(q, Position::new(1, 2, 0));
        assert_eq!(p - q, Offset::new(1, 0, 0));
        assert_eq!(-(p - q), Offset::new(-1, 0, 0));
    }

    #[test]
    fn json_roundtrip() -> Result<(), Box<dyn std::error::Error>> {
        let p = Position::new(1, -2, 3);
        let s = serde_json::to_string(&p)?;
        let p2: Position = serde_json::from_str(&s)?;
        assert_eq!(p2, p);
        Ok(())
    }
}
