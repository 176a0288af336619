//! Canvas geometry of the printed board.

use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

use crate::location::{Square, BOARD_SIDE};

/// An axis-aligned rectangle in canvas pixels; `y` grows downward.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub w: f64,
    /// Height.
    pub h: f64,
}

impl Rect {
    /// A rectangle with top-left corner `(x, y)`.
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// The centre point.
    pub fn center(&self) -> Point {
        Point::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }
}

/// A point in canvas pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal, growing rightwards.
    pub x: f64,
    /// Vertical, growing downwards.
    pub y: f64,
}

impl Point {
    /// The point `(x, y)`.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean length when read as a vector.
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// The vector rotated a quarter turn: `(-y, x)`.
    pub fn perpendicular(self) -> Self {
        Self::new(-self.y, self.x)
    }

    /// Linear interpolation toward `other`.
    pub fn lerp(self, other: Self, t: f64) -> Self {
        self + (other - self) * t
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

/// Pixel geometry of the printed sheet: a header band above a square board.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardLayout {
    /// Full canvas width.
    pub canvas_width: u32,
    /// Full canvas height.
    pub canvas_height: u32,
    /// Band reserved for the title and target list.
    pub header: Rect,
    /// The 10x10 grid itself.
    pub board: Rect,
}

impl Default for BoardLayout {
    fn default() -> Self {
        let header = Rect::new(20.0, 20.0, 940.0, 190.0);
        Self {
            canvas_width: 980,
            canvas_height: 1180,
            header,
            board: Rect::new(40.0, header.y + header.h + 30.0, 900.0, 900.0),
        }
    }
}

impl BoardLayout {
    /// Side length of one square.
    pub fn cell(&self) -> f64 {
        self.board.w / BOARD_SIDE as f64
    }

    /// Where `square` is drawn.
    pub fn square_rect(&self, square: Square) -> Rect {
        let location = square.location();
        let cell = self.cell();
        Rect::new(
            self.board.x + location.0 as f64 * cell,
            self.board.y + (BOARD_SIDE - 1 - location.1) as f64 * cell,
            cell,
            cell,
        )
    }

    /// Centre of `square`.
    pub fn center_of(&self, square: Square) -> Point {
        self.square_rect(square).center()
    }

    /// Largest icon drawn in a square.
    pub fn icon_base_size(&self) -> f64 {
        56.0_f64.min(self.cell() - 20.0)
    }
}
