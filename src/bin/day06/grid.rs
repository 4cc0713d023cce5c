use std::fmt::{self, Display, Formatter};
use std::ops::RangeInclusive;

use ndarray::iter::AxisIter;
use ndarray::prelude::*;
use thiserror::Error;

/// The lights are numbered 0..SIDE in each direction.
pub const SIDE: usize = 1000;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum GridError {
    #[error("inverted range {start}..={end} in the {axis} coordinate")]
    Inverted {
        axis: &'static str,
        start: usize,
        end: usize,
    },
    #[error("rectangle {rect} lies outside the {rows}x{cols} grid")]
    OutOfBounds {
        rect: Rectangle,
        rows: usize,
        cols: usize,
    },
}

/// An inclusive block of lights; a pair like 0,0 through 2,2 covers
/// nine lights.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct Rectangle {
    pub rows: RangeInclusive<usize>,
    pub cols: RangeInclusive<usize>,
}

fn convert_to_range(
    axis: &'static str,
    start: usize,
    end: usize,
) -> Result<RangeInclusive<usize>, GridError> {
    if start <= end {
        Ok(start..=end)
    } else {
        Err(GridError::Inverted { axis, start, end })
    }
}

impl Rectangle {
    /// Builds the rectangle with corners `from` and `to`, each given as
    /// (row, column).
    pub fn from_corners(from: (usize, usize), to: (usize, usize)) -> Result<Rectangle, GridError> {
        Ok(Rectangle {
            rows: convert_to_range("row", from.0, to.0)?,
            cols: convert_to_range("column", from.1, to.1)?,
        })
    }

    pub fn row_count(&self) -> usize {
        self.rows.end() - self.rows.start() + 1
    }

    pub fn col_count(&self) -> usize {
        self.cols.end() - self.cols.start() + 1
    }

    pub fn area(&self) -> usize {
        self.row_count() * self.col_count()
    }

    #[cfg(test)]
    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.rows.contains(&row) && self.cols.contains(&col)
    }
}

impl Display for Rectangle {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{} through {},{}",
            self.rows.start(),
            self.cols.start(),
            self.rows.end(),
            self.cols.end()
        )
    }
}

#[test]
fn test_rectangle_from_corners() {
    let r = Rectangle::from_corners((0, 0), (2, 2)).expect("valid corners");
    assert_eq!(r.rows, 0..=2);
    assert_eq!(r.cols, 0..=2);
    assert_eq!(r.area(), 9);
    assert_eq!(r.to_string(), "0,0 through 2,2");

    assert_eq!(
        Rectangle::from_corners((5, 1), (4, 3)),
        Err(GridError::Inverted {
            axis: "row",
            start: 5,
            end: 4
        })
    );
    assert_eq!(
        Rectangle::from_corners((1, 9), (4, 3)),
        Err(GridError::Inverted {
            axis: "column",
            start: 9,
            end: 3
        })
    );
}

#[test]
fn test_single_column_rectangle() {
    // "toggle 0,0 through 999,0" holds the column fixed.
    let r = Rectangle::from_corners((0, 0), (999, 0)).expect("valid corners");
    assert_eq!(r.row_count(), 1000);
    assert_eq!(r.col_count(), 1);
    assert!(r.contains(500, 0));
    assert!(!r.contains(500, 1));
}

/// A dense grid of lights, all off to begin with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    lights: Array2<bool>,
}

impl Grid {
    pub fn new(rows: usize, cols: usize) -> Grid {
        Grid {
            lights: Array2::from_elem((rows, cols), false),
        }
    }

    pub fn square(side: usize) -> Grid {
        Grid::new(side, side)
    }

    pub fn nrows(&self) -> usize {
        self.lights.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.lights.ncols()
    }

    #[cfg(test)]
    pub fn get(&self, row: usize, col: usize) -> Option<bool> {
        self.lights.get((row, col)).copied()
    }

    #[cfg(test)]
    pub fn set(&mut self, row: usize, col: usize, lit: bool) -> Result<(), GridError> {
        match self.lights.get_mut((row, col)) {
            Some(light) => {
                *light = lit;
                Ok(())
            }
            None => Err(GridError::OutOfBounds {
                rect: Rectangle {
                    rows: row..=row,
                    cols: col..=col,
                },
                rows: self.nrows(),
                cols: self.ncols(),
            }),
        }
    }

    pub fn check_bounds(&self, rect: &Rectangle) -> Result<(), GridError> {
        if *rect.rows.end() < self.nrows() && *rect.cols.end() < self.ncols() {
            Ok(())
        } else {
            Err(GridError::OutOfBounds {
                rect: rect.clone(),
                rows: self.nrows(),
                cols: self.ncols(),
            })
        }
    }

    /// Mutable view of just the lights inside `rect`.
    pub fn region_mut(&mut self, rect: &Rectangle) -> Result<ArrayViewMut2<'_, bool>, GridError> {
        self.check_bounds(rect)?;
        Ok(self.lights.slice_mut(s![rect.rows.clone(), rect.cols.clone()]))
    }

    pub fn rows(&self) -> AxisIter<'_, bool, Ix1> {
        self.lights.outer_iter()
    }
}

impl Display for Grid {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            for lit in row.iter() {
                f.write_str(if *lit { "#" } else { "." })?;
            }
            f.write_str("\n")?;
        }
        Ok(())
    }
}

#[test]
fn test_new_grid_is_dark() {
    let grid = Grid::square(SIDE);
    assert_eq!(grid.nrows(), SIDE);
    assert_eq!(grid.ncols(), SIDE);
    assert!(grid.rows().all(|row| row.iter().all(|lit| !*lit)));
}

#[test]
fn test_display() {
    let mut grid = Grid::new(2, 3);
    grid.set(0, 1, true).expect("in bounds");
    grid.set(1, 2, true).expect("in bounds");
    assert_eq!(grid.to_string(), ".#.\n..#\n");
}

#[test]
fn test_check_bounds() {
    let grid = Grid::square(10);
    let inside = Rectangle::from_corners((0, 0), (9, 9)).expect("valid corners");
    assert_eq!(grid.check_bounds(&inside), Ok(()));

    let outside = Rectangle::from_corners((0, 0), (9, 10)).expect("valid corners");
    assert!(matches!(
        grid.check_bounds(&outside),
        Err(GridError::OutOfBounds {
            rows: 10,
            cols: 10,
            ..
        })
    ));
    assert_eq!(grid.get(10, 0), None);
}

#[test]
fn test_region_mut_covers_only_rectangle() {
    let mut grid = Grid::square(5);
    let rect = Rectangle::from_corners((1, 2), (3, 3)).expect("valid corners");
    let mut region = grid.region_mut(&rect).expect("in bounds");
    assert_eq!(region.dim(), (3, 2));
    region.fill(true);
    for r in 0..5 {
        for c in 0..5 {
            assert_eq!(grid.get(r, c), Some(rect.contains(r, c)));
        }
    }
}
