use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

pub(crate) type Coord = usize;

/// Number of columns (and rows) on the board.
pub const BOARD_SIDE: Coord = 10;
/// Number of squares that carry a picture: everything except START and FINISH.
pub const INTERIOR_SQUARES: usize = 98;

#[derive(Clone, Eq, Hash, Copy, PartialEq, Ord, PartialOrd, Debug)]
/// A location `(x, y)` on the board. `x` is the physical column counted from the left and `y` is the row counted from the bottom,
/// so square 1 sits at `Location(0, 0)` and square 100 at `Location(0, 9)`.
pub struct Location(pub Coord, pub Coord);

impl Location {
    /// Index into a row-major array whose first row is the top of the board.
    pub(crate) fn as_index(&self) -> (Coord, Coord) {
        (BOARD_SIDE - 1 - self.1, self.0)
    }

    pub(crate) fn offset_by(self, rhs: (isize, isize)) -> Self {
        Self(self.0.wrapping_add_signed(rhs.0), self.1.wrapping_add_signed(rhs.1))
    }

    /// Whether this location lies on the board at all.
    pub fn in_bounds(&self) -> bool {
        self.0 < BOARD_SIDE && self.1 < BOARD_SIDE
    }
}

/// A square number which is not on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("square {0} is not on a 10x10 board")]
pub struct InvalidSquare(pub u8);

/// A numbered square, 1 (START) through 100 (FINISH).
///
/// Numbering is serpentine: it runs left to right along the bottom row, then right to left along the next, and so on.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd, Debug, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Square(u8);

impl Square {
    /// The START square, which never carries a picture.
    pub const START: Self = Self(1);
    /// The FINISH square, which never carries a picture.
    pub const FINISH: Self = Self(100);

    /// Returns [`None`] for anything outside `1..=100`.
    pub fn new(number: u8) -> Option<Self> {
        (1..=100).contains(&number).then_some(Self(number))
    }

    /// For board data written into the source. Panics (at compile time, in a const) outside `1..=100`.
    pub(crate) const fn literal(number: u8) -> Self {
        assert!(number >= 1 && number <= 100, "square out of range");
        Self(number)
    }

    /// The number printed on the square.
    pub fn number(self) -> u8 {
        self.0
    }

    /// Squares 2 through 99.
    pub fn is_interior(self) -> bool {
        self != Self::START && self != Self::FINISH
    }

    /// Position in the placement order, where square 2 is slot 0 and square 99 is slot 97.
    pub fn slot(self) -> Option<usize> {
        self.is_interior().then(|| self.0 as usize - 2)
    }

    /// Inverse of [`slot`](Self::slot).
    pub fn from_slot(slot: usize) -> Option<Self> {
        (slot < INTERIOR_SQUARES).then(|| Self(slot as u8 + 2))
    }

    /// Physical position of this square.
    pub fn location(self) -> Location {
        let idx = self.0 as Coord - 1;
        let row = idx / BOARD_SIDE;
        let col_in_row = idx % BOARD_SIDE;
        let col = if row % 2 == 1 { BOARD_SIDE - 1 - col_in_row } else { col_in_row };

        Location(col, row)
    }

    /// Inverse of [`location`](Self::location).
    pub fn from_location(location: Location) -> Option<Self> {
        if !location.in_bounds() {
            return None;
        }

        let Location(col, row) = location;
        let col_in_row = if row % 2 == 1 { BOARD_SIDE - 1 - col } else { col };
        Some(Self((row * BOARD_SIDE + col_in_row + 1) as u8))
    }

    /// Every interior square in ascending order.
    pub fn interior() -> impl Iterator<Item = Self> {
        (2..=99).map(Self)
    }
}

impl TryFrom<u8> for Square {
    type Error = InvalidSquare;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(InvalidSquare(value))
    }
}

impl From<Square> for u8 {
    fn from(value: Square) -> Self {
        value.0
    }
}

impl Display for Square {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
