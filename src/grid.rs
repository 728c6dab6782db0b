// src/grid.rs
//! Grid cells and map calibration.
//!
//! The game world is an unbounded integer lattice. A [`Calibration`] pins a
//! background image onto a rectangle of that lattice so cells can be turned
//! into pixels (and back). Cells outside the calibrated box are still valid
//! claim data; they are simply not drawn.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One exterior cell, `(x, y)`, y growing northwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Parse two decimal strings (optionally signed). Overflow yields `None`.
    pub fn parse_pair(x: &str, y: &str) -> Option<Self> {
        Some(Self::new(x.trim().parse().ok()?, y.trim().parse().ok()?))
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.x, self.y)
    }
}

impl From<(i32, i32)> for Cell {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl From<Cell> for (i32, i32) {
    fn from(c: Cell) -> Self {
        (c.x, c.y)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalibrationError {
    #[error("degenerate map corners: x_left ({x_left}) must be < x_right ({x_right}) and y_bottom ({y_bottom}) < y_top ({y_top})")]
    Degenerate { x_left: i32, x_right: i32, y_bottom: i32, y_top: i32 },

    #[error("map corners must be four integers \"x_left x_right y_bottom y_top\", got {0:?}")]
    Malformed(String),
}

/// Grid box covered by the background map.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Calibration {
    x_left: i32,
    x_right: i32,
    y_bottom: i32,
    y_top: i32,
}

impl Calibration {
    /// Corners of the Tamriel Rebuilt claims map.
    pub const TAMRIEL_REBUILT: Calibration = Calibration { x_left: -42, x_right: 61, y_bottom: -64, y_top: 38 };

    pub fn new(x_left: i32, x_right: i32, y_bottom: i32, y_top: i32) -> Result<Self, CalibrationError> {
        if x_left >= x_right || y_bottom >= y_top {
            return Err(CalibrationError::Degenerate { x_left, x_right, y_bottom, y_top });
        }
        Ok(Self { x_left, x_right, y_bottom, y_top })
    }

    pub fn x_left(&self) -> i32 { self.x_left }
    pub fn x_right(&self) -> i32 { self.x_right }
    pub fn y_bottom(&self) -> i32 { self.y_bottom }
    pub fn y_top(&self) -> i32 { self.y_top }

    /// Width of the box in cells.
    pub fn span_x(&self) -> f32 {
        (self.x_right - self.x_left) as f32
    }

    /// Height of the box in cells.
    pub fn span_y(&self) -> f32 {
        (self.y_top - self.y_bottom) as f32
    }

    /// Width / height of the calibrated box; used to size the output.
    pub fn aspect(&self) -> f32 {
        self.span_x() / self.span_y()
    }

    /// Whether the cell lies inside the calibrated box, corners included.
    pub fn contains(&self, cell: Cell) -> bool {
        (self.x_left..=self.x_right).contains(&cell.x) && (self.y_bottom..=self.y_top).contains(&cell.y)
    }

    /// Pixel position of a cell centre on an image of `width` × `height`.
    ///
    /// The image's left edge sits half a cell before `x_left` and its top
    /// edge half a cell below `y_top`; each cell occupies one unit square
    /// centred on its coordinates.
    pub fn cell_to_pixel(&self, cell: Cell, width: f32, height: f32) -> (f32, f32) {
        let left = self.x_left as f32 - 0.5;
        let top = self.y_top as f32 - 0.5;
        let px = (cell.x as f32 - left) / self.span_x() * width;
        let py = (top - cell.y as f32) / self.span_y() * height;
        (px, py)
    }

    /// Inverse of [`cell_to_pixel`](Self::cell_to_pixel), rounded to the nearest cell.
    pub fn pixel_to_cell(&self, px: f32, py: f32, width: f32, height: f32) -> Cell {
        let left = self.x_left as f32 - 0.5;
        let top = self.y_top as f32 - 0.5;
        let x = left + px / width * self.span_x();
        let y = top - py / height * self.span_y();
        Cell::new(x.round() as i32, y.round() as i32)
    }
}

impl FromStr for Calibration {
    type Err = CalibrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let nums: Vec<i32> = s
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|p| !p.is_empty())
            .map(|p| p.parse::<i32>())
            .collect::<Result<_, _>>()
            .map_err(|_| CalibrationError::Malformed(s.to_string()))?;

        match nums.as_slice() {
            [xl, xr, yb, yt] => Calibration::new(*xl, *xr, *yb, *yt),
            _ => Err(CalibrationError::Malformed(s.to_string())),
        }
    }
}

impl fmt::Display for Calibration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.x_left, self.x_right, self.y_bottom, self.y_top)
    }
}
