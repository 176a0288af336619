//! Moves between touching squares.

use std::hash::Hash;

use crate::location::Location;

/// A single move between orthogonally touching squares.
pub trait Step: Sized + Copy + PartialEq + Eq + Hash + Ord + PartialOrd + 'static {
    /// Attempt the step from `location` in the direction specified by `self` and return the resultant [`Location`].
    ///
    /// The result may be off the board; check with [`Location::in_bounds`].
    fn attempt_from(&self, location: Location) -> Location;
    /// The static array of all "forward" directions.
    ///
    /// Forward directions are those whose destination compares greater than the origin under the ordering of [`Location`].
    /// Walking only forward steps visits every adjacency exactly once.
    const FORWARD_VARIANTS: &'static [Self];
}

/// The four-way step of a rectangular board.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub enum SquareStep {
    /// Toward FINISH's row.
    Up,
    /// Toward START's row.
    Down,
    /// Toward the left edge.
    Left,
    /// Toward the right edge.
    Right,
}

impl Step for SquareStep {
    fn attempt_from(&self, location: Location) -> Location {
        match self {
            Self::Up => location.offset_by((0, 1)),
            Self::Down => location.offset_by((0, -1)),
            Self::Left => location.offset_by((-1, 0)),
            Self::Right => location.offset_by((1, 0)),
        }
    }

    const FORWARD_VARIANTS: &'static [Self] = &[Self::Right, Self::Up];
}
