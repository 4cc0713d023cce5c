use rayon::prelude::*;
use tracing::{event, Level};

use crate::grid::Grid;

/// Counts the lit lights, with one task per row.  Every row's partial
/// count is collected before the total is formed.
pub fn count_lit(grid: &Grid) -> usize {
    let partials: Vec<usize> = grid
        .rows()
        .into_par_iter()
        .map(|row| row.iter().filter(|lit| **lit).count())
        .collect();
    debug_assert_eq!(partials.len(), grid.nrows());
    let total: usize = partials.iter().sum();
    event!(
        Level::TRACE,
        "counted {} lit lights from {} row(s)",
        total,
        partials.len(),
    );
    total
}

/// Single-threaded version of `count_lit`.
#[cfg(test)]
fn count_lit_sequential(grid: &Grid) -> usize {
    grid.rows()
        .map(|row| row.iter().filter(|lit| **lit).count())
        .sum()
}

#[test]
fn test_count_empty_grid() {
    let grid = Grid::square(100);
    assert_eq!(count_lit(&grid), 0);
    assert_eq!(count_lit(&Grid::new(0, 0)), 0);
}

#[test]
fn test_count_scattered_lights() {
    let mut grid = Grid::new(97, 53);
    let mut expected = 0;
    // A deterministic scatter with several lights in some rows and none
    // in others.
    for r in 0..97 {
        for c in 0..53 {
            if (r * 31 + c * 17) % 11 == 0 && r % 5 != 3 {
                grid.set(r, c, true).expect("in bounds");
                expected += 1;
            }
        }
    }
    assert!(expected > 0);
    assert_eq!(count_lit(&grid), expected);
    assert_eq!(count_lit_sequential(&grid), expected);
}

#[test]
fn test_count_is_stable_across_runs() {
    let mut grid = Grid::square(200);
    for i in 0..200 {
        grid.set(i, (i * 7) % 200, true).expect("in bounds");
        grid.set(199 - i, i, true).expect("in bounds");
    }
    let first = count_lit(&grid);
    assert_eq!(first, count_lit_sequential(&grid));
    for _ in 0..20 {
        assert_eq!(count_lit(&grid), first);
    }
}
