use std::time::Instant;

use tracing::{event, span, Level};

use crate::count::count_lit;
use crate::engine;
use crate::error::Error;
use crate::grid::{Grid, GridError};
use crate::instruction::Instruction;

pub trait LightSwitcher {
    fn count_lights_on(&self) -> usize;
    fn obey(&mut self, instruction: &Instruction) -> Result<(), GridError>;
}

/// Owns the grid and applies instructions to it one at a time, each one
/// spread over `workers` chunks.
pub struct Driver {
    grid: Grid,
    workers: usize,
}

impl Driver {
    pub fn new(grid: Grid, workers: usize) -> Driver {
        Driver { grid, workers }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }
}

impl LightSwitcher for Driver {
    fn count_lights_on(&self) -> usize {
        count_lit(&self.grid)
    }

    fn obey(&mut self, instruction: &Instruction) -> Result<(), GridError> {
        engine::apply(&mut self.grid, instruction, self.workers).map(|_| ())
    }
}

/// Obeys every instruction in order and then counts the lights.  Each
/// instruction has finished before the next one starts, since later
/// instructions override earlier ones where they overlap.
pub fn run_all<T: LightSwitcher>(instructions: &[Instruction], lights: &mut T) -> Result<usize, Error> {
    let start = Instant::now();
    for (index, instruction) in instructions.iter().enumerate() {
        let span = span!(Level::DEBUG, "obey", index = index + 1, instruction = %instruction);
        let _enter = span.enter();
        if let Err(source) = lights.obey(instruction) {
            return Err(Error::Rejected {
                index: index + 1,
                instruction: instruction.clone(),
                source,
            });
        }
    }
    event!(
        Level::DEBUG,
        "processing {} instruction(s) took {:?}",
        instructions.len(),
        start.elapsed(),
    );
    let start = Instant::now();
    let count = lights.count_lights_on();
    event!(Level::DEBUG, "counting took {:?}", start.elapsed());
    Ok(count)
}

#[cfg(test)]
mod reference {
    use std::collections::HashSet;

    use super::LightSwitcher;
    use crate::grid::{GridError, Rectangle};
    use crate::instruction::{Instruction, Operation};

    /// Keeps the set of lit lights, one light at a time.
    pub struct Lights {
        side: usize,
        on: HashSet<(usize, usize)>,
    }

    impl Lights {
        pub fn new(side: usize) -> Lights {
            Lights {
                side,
                on: HashSet::new(),
            }
        }

        pub fn is_on(&self, row: usize, col: usize) -> bool {
            self.on.contains(&(row, col))
        }
    }

    fn all(range: &Rectangle) -> Vec<(usize, usize)> {
        let mut result = Vec::with_capacity(range.area());
        for r in range.rows.clone() {
            for c in range.cols.clone() {
                result.push((r, c));
            }
        }
        result
    }

    impl LightSwitcher for Lights {
        fn count_lights_on(&self) -> usize {
            self.on.len()
        }

        fn obey(&mut self, instruction: &Instruction) -> Result<(), GridError> {
            let rect = &instruction.rectangle;
            if *rect.rows.end() >= self.side || *rect.cols.end() >= self.side {
                return Err(GridError::OutOfBounds {
                    rect: rect.clone(),
                    rows: self.side,
                    cols: self.side,
                });
            }
            for p in all(rect) {
                match instruction.operation {
                    Operation::SetOn => {
                        self.on.insert(p);
                    }
                    Operation::SetOff => {
                        self.on.remove(&p);
                    }
                    Operation::Invert => {
                        if !self.on.remove(&p) {
                            self.on.insert(p);
                        }
                    }
                }
            }
            Ok(())
        }
    }
}

#[cfg(test)]
fn parse_all(lines: &[&str]) -> Vec<Instruction> {
    lines
        .iter()
        .map(|line| match Instruction::try_from(*line) {
            Ok(instruction) => instruction,
            Err(e) => {
                panic!("bad test instruction '{}': {}", line, e);
            }
        })
        .collect()
}

#[cfg(test)]
fn new_driver(side: usize, workers: usize) -> Driver {
    Driver::new(Grid::square(side), workers)
}

#[test]
fn test_worked_example() {
    let instructions = parse_all(&[
        "turn on 0,0 through 999,999",
        "toggle 0,0 through 999,0",
        "turn off 499,499 through 500,500",
    ]);
    let mut driver = new_driver(crate::grid::SIDE, engine::default_workers());
    assert_eq!(run_all(&instructions, &mut driver).ok(), Some(998_996));
}

#[test]
fn test_toggle_first_column() {
    let instructions = parse_all(&["toggle 0,0 through 999,0"]);
    let mut driver = new_driver(crate::grid::SIDE, 8);
    assert_eq!(run_all(&instructions, &mut driver).ok(), Some(1000));
    for r in [0, 1, 500, 999] {
        assert_eq!(driver.grid().get(r, 0), Some(true));
        assert_eq!(driver.grid().get(r, 1), Some(false));
    }
}

#[test]
fn test_order_matters() {
    let forwards = parse_all(&["turn on 0,0 through 2,2", "turn off 1,1 through 1,1"]);
    let mut driver = new_driver(10, 4);
    assert_eq!(run_all(&forwards, &mut driver).ok(), Some(8));

    let backwards = parse_all(&["turn off 1,1 through 1,1", "turn on 0,0 through 2,2"]);
    let mut driver = new_driver(10, 4);
    assert_eq!(run_all(&backwards, &mut driver).ok(), Some(9));
}

#[test]
fn test_agrees_with_reference() {
    let instructions = parse_all(&[
        "turn off 66,5 through 98,19",
        "turn off 34,30 through 63,85",
        "turn off 19,13 through 46,19",
        "toggle 32,55 through 97,95",
        "toggle 53,78 through 68,94",
        "turn on 22,19 through 59,39",
        "turn on 24,12 through 70,29",
        "turn on 31,32 through 45,79",
        "toggle 0,0 through 99,0",
        "toggle 0,0 through 0,99",
        "turn off 49,49 through 50,50",
    ]);
    let mut reference = reference::Lights::new(100);
    let expected = run_all(&instructions, &mut reference).expect("in bounds");
    for workers in [1, 3, 16, 200] {
        let mut driver = new_driver(100, workers);
        assert_eq!(
            run_all(&instructions, &mut driver).expect("in bounds"),
            expected
        );
        for r in 0..100 {
            for c in 0..100 {
                assert_eq!(driver.grid().get(r, c), Some(reference.is_on(r, c)));
            }
        }
    }
}

#[test]
fn test_rejected_instruction_stops_the_run() {
    let instructions = parse_all(&[
        "turn on 0,0 through 9,9",
        "toggle 5,5 through 10,10",
        "turn off 0,0 through 9,9",
    ]);
    let mut driver = new_driver(10, 4);
    match run_all(&instructions, &mut driver) {
        Err(Error::Rejected {
            index: 2,
            source: GridError::OutOfBounds { .. },
            ..
        }) => (),
        other => {
            panic!("expected instruction 2 to be rejected, got {:?}", other);
        }
    }
    // The first instruction was applied; the rejected one touched nothing.
    assert_eq!(driver.count_lights_on(), 100);
}

#[test]
fn test_no_instructions() {
    let mut driver = new_driver(crate::grid::SIDE, 4);
    assert_eq!(run_all(&[], &mut driver).ok(), Some(0));
}
