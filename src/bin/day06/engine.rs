//! Applies one instruction to the grid, splitting the affected rows
//! between parallel workers.
//!
//! The rectangle's rows are cut into contiguous chunks of
//! `ceil(rows / workers)` rows.  Each chunk is a mutable view over only
//! its own rows, so the workers cannot touch each other's lights and need
//! no locking.  `apply` returns once every chunk is finished.

use std::time::Instant;

use ndarray::prelude::*;
use rayon::prelude::*;
use tracing::{event, Level};

use crate::grid::{Grid, GridError};
use crate::instruction::{Instruction, Operation};

/// The number of chunks to aim for when the caller has no preference.
pub fn default_workers() -> usize {
    rayon::current_num_threads()
}

/// Rows per chunk when `span` rows are shared between `workers`.  The
/// final chunk may be shorter.
pub fn chunk_rows(span: usize, workers: usize) -> usize {
    let workers = workers.max(1);
    ((span + workers - 1) / workers).max(1)
}

#[test]
fn test_chunk_rows() {
    assert_eq!(chunk_rows(1000, 8), 125);
    assert_eq!(chunk_rows(1000, 3), 334);
    assert_eq!(chunk_rows(2, 8), 1);
    assert_eq!(chunk_rows(1, 1), 1);
    assert_eq!(chunk_rows(7, 0), 7);
}

fn apply_to_rows(operation: Operation, mut rows: ArrayViewMut2<'_, bool>) {
    rows.map_inplace(|lit| *lit = operation.apply(*lit));
}

/// Applies `instruction` to `grid` using up to `workers` parallel chunks.
/// Returns the number of chunks used.
pub fn apply(grid: &mut Grid, instruction: &Instruction, workers: usize) -> Result<usize, GridError> {
    let start = Instant::now();
    let rect = &instruction.rectangle;
    let mut region = grid.region_mut(rect)?;
    let chunk = chunk_rows(rect.row_count(), workers);
    let chunks: Vec<ArrayViewMut2<'_, bool>> =
        region.axis_chunks_iter_mut(Axis(0), chunk).collect();
    let count = chunks.len();
    let operation = instruction.operation;
    chunks
        .into_par_iter()
        .for_each(|rows| apply_to_rows(operation, rows));
    event!(
        Level::TRACE,
        "{} ({} lights) over {} chunk(s) of up to {} row(s) took {:?}",
        instruction,
        rect.area(),
        count,
        chunk,
        start.elapsed(),
    );
    Ok(count)
}

#[cfg(test)]
use crate::count::count_lit as lit_count;

#[cfg(test)]
fn parse(s: &str) -> Instruction {
    match Instruction::try_from(s) {
        Ok(instruction) => instruction,
        Err(e) => {
            panic!("bad test instruction '{}': {}", s, e);
        }
    }
}

#[cfg(test)]
fn apply_one_light_at_a_time(grid: &mut Grid, instruction: &Instruction) {
    let rect = &instruction.rectangle;
    for r in rect.rows.clone() {
        for c in rect.cols.clone() {
            let lit = grid.get(r, c).expect("test rectangle should be in bounds");
            grid.set(r, c, instruction.operation.apply(lit))
                .expect("test rectangle should be in bounds");
        }
    }
}

#[test]
fn test_chunks_never_overrun_rectangle() {
    let mut grid = Grid::square(20);
    // 3 rows shared between 8 workers: one row each, three chunks.
    let chunks = apply(&mut grid, &parse("turn on 5,2 through 7,4"), 8).expect("in bounds");
    assert_eq!(chunks, 3);
    assert_eq!(lit_count(&grid), 9);
    for r in 0..20 {
        for c in 0..20 {
            assert_eq!(
                grid.get(r, c),
                Some((5..=7).contains(&r) && (2..=4).contains(&c))
            );
        }
    }
}

#[test]
fn test_uneven_final_chunk() {
    let mut grid = Grid::square(20);
    // 10 rows over 4 workers: chunks of 3, 3, 3 and 1.
    let chunks = apply(&mut grid, &parse("toggle 10,0 through 19,19"), 4).expect("in bounds");
    assert_eq!(chunks, 4);
    assert_eq!(lit_count(&grid), 200);
}

#[test]
fn test_chunking_does_not_change_result() {
    let program = [
        "turn on 0,0 through 63,63",
        "toggle 3,5 through 60,17",
        "turn off 10,10 through 12,50",
        "toggle 0,0 through 63,0",
        "turn on 31,31 through 32,32",
        "toggle 1,1 through 62,62",
    ];
    let instructions: Vec<Instruction> = program.iter().map(|s| parse(s)).collect();

    let mut expected = Grid::square(64);
    for instruction in &instructions {
        apply_one_light_at_a_time(&mut expected, instruction);
    }

    for workers in [1, 2, 3, 7, 16, 64, 100] {
        let mut grid = Grid::square(64);
        for instruction in &instructions {
            apply(&mut grid, instruction, workers).expect("in bounds");
        }
        assert_eq!(grid, expected, "result differs with {} workers", workers);
    }
}

#[test]
fn test_set_is_idempotent() {
    for text in ["turn on 2,3 through 40,41", "turn off 2,3 through 40,41"] {
        let instruction = parse(text);
        let mut once = Grid::square(50);
        apply(&mut once, &parse("toggle 0,0 through 49,24"), 4).expect("in bounds");
        let mut twice = once.clone();
        apply(&mut once, &instruction, 4).expect("in bounds");
        apply(&mut twice, &instruction, 4).expect("in bounds");
        apply(&mut twice, &instruction, 4).expect("in bounds");
        assert_eq!(once, twice, "{} is not idempotent", text);
    }
}

#[test]
fn test_invert_is_an_involution() {
    let mut grid = Grid::square(50);
    apply(&mut grid, &parse("turn on 0,0 through 20,49"), 3).expect("in bounds");
    let before = grid.clone();
    let toggle = parse("toggle 10,10 through 30,30");
    apply(&mut grid, &toggle, 5).expect("in bounds");
    assert_ne!(grid, before);
    apply(&mut grid, &toggle, 2).expect("in bounds");
    assert_eq!(grid, before);
}

#[test]
fn test_apply_to_rows_uses_operation() {
    let mut block = Array2::from_shape_fn((3, 4), |(r, c)| (r + c) % 2 == 0);
    let original = block.clone();
    apply_to_rows(Operation::Invert, block.view_mut());
    assert_eq!(block, original.mapv(|lit| !lit));
    apply_to_rows(Operation::SetOff, block.view_mut());
    assert!(block.iter().all(|lit| !*lit));
    apply_to_rows(Operation::SetOn, block.view_mut());
    assert!(block.iter().all(|lit| *lit));
}

#[test]
fn test_out_of_bounds_is_rejected_untouched() {
    let mut grid = Grid::square(12);
    let before = grid.clone();
    let result = apply(&mut grid, &parse("turn on 0,0 through 10,12"), 4);
    assert!(matches!(result, Err(GridError::OutOfBounds { .. })));
    assert_eq!(grid, before);
}

#[test]
fn test_full_grid_and_middle_four() {
    let mut grid = Grid::square(crate::grid::SIDE);
    apply(&mut grid, &parse("turn on 0,0 through 999,999"), default_workers()).expect("in bounds");
    assert_eq!(lit_count(&grid), 1_000_000);
    apply(&mut grid, &parse("turn off 499,499 through 500,500"), default_workers())
        .expect("in bounds");
    assert_eq!(lit_count(&grid), 1_000_000 - 4);
    for (r, c) in [(499, 499), (499, 500), (500, 499), (500, 500)] {
        assert_eq!(grid.get(r, c), Some(false));
    }
}
