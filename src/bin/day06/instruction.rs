use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, digit1},
    combinator::{map_res, value},
    sequence::separated_pair,
    IResult,
};
use tracing::{event, Level};

use crate::error::Error;
use crate::grid::{GridError, Rectangle};

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Operation {
    SetOn,
    SetOff,
    Invert,
}

impl Operation {
    /// The new state of a single light that was `lit`.
    pub fn apply(self, lit: bool) -> bool {
        match self {
            Operation::SetOn => true,
            Operation::SetOff => false,
            Operation::Invert => !lit,
        }
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::SetOn => "turn on",
            Operation::SetOff => "turn off",
            Operation::Invert => "toggle",
        })
    }
}

#[test]
fn test_operation_apply() {
    for lit in [false, true] {
        assert!(Operation::SetOn.apply(lit));
        assert!(!Operation::SetOff.apply(lit));
        assert_eq!(Operation::Invert.apply(lit), !lit);
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Instruction {
    pub operation: Operation,
    pub rectangle: Rectangle,
}

impl Display for Instruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.operation, self.rectangle)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
pub enum ParseError {
    #[error("does not look like a light instruction: '{0}'")]
    Unrecognised(String),
    #[error("unexpected trailing junk: '{0}'")]
    TrailingJunk(String),
    #[error(transparent)]
    Rectangle(#[from] GridError),
}

type Corner = (usize, usize);

fn usize_parser(input: &str) -> IResult<&str, usize> {
    map_res(digit1, FromStr::from_str)(input)
}

fn parse_corner(input: &str) -> IResult<&str, Corner> {
    separated_pair(usize_parser, char(','), usize_parser)(input)
}

fn parse_operation(input: &str) -> IResult<&str, Operation> {
    alt((
        value(Operation::SetOn, tag("turn on")),
        value(Operation::SetOff, tag("turn off")),
        value(Operation::Invert, tag("toggle")),
    ))(input)
}

fn parse_corners(input: &str) -> IResult<&str, (Corner, Corner)> {
    separated_pair(parse_corner, tag(" through "), parse_corner)(input)
}

pub fn parse_instruction(input: &str) -> IResult<&str, (Operation, (Corner, Corner))> {
    separated_pair(parse_operation, char(' '), parse_corners)(input)
}

#[test]
fn test_parse_instruction() {
    assert_eq!(
        parse_instruction("turn off 660,55 through 986,197"),
        Ok(("", (Operation::SetOff, ((660, 55), (986, 197)))))
    );
    assert_eq!(
        parse_instruction("toggle 322,558 through 977,958 and more"),
        Ok((" and more", (Operation::Invert, ((322, 558), (977, 958)))))
    );
    assert!(parse_instruction("turn sideways 1,1 through 2,2").is_err());
}

impl TryFrom<&str> for Instruction {
    type Error = ParseError;
    fn try_from(s: &str) -> Result<Instruction, ParseError> {
        match parse_instruction(s) {
            Ok(("", (operation, (from, to)))) => Ok(Instruction {
                operation,
                rectangle: Rectangle::from_corners(from, to)?,
            }),
            Ok((tail, _)) => Err(ParseError::TrailingJunk(tail.to_string())),
            Err(_) => Err(ParseError::Unrecognised(s.to_string())),
        }
    }
}

#[test]
fn test_instruction_try_from() {
    assert_eq!(
        Instruction::try_from("turn on 0,0 through 999,999"),
        Ok(Instruction {
            operation: Operation::SetOn,
            rectangle: Rectangle {
                rows: 0..=999,
                cols: 0..=999
            }
        })
    );
    assert_eq!(
        Instruction::try_from("toggle 0,0 through 999,0").map(|i| i.rectangle.area()),
        Ok(1000)
    );
    assert_eq!(
        Instruction::try_from("toggle 1,2 through 3,4 please"),
        Err(ParseError::TrailingJunk(" please".to_string()))
    );
    assert!(matches!(
        Instruction::try_from("turn off 9,0 through 1,0"),
        Err(ParseError::Rectangle(GridError::Inverted { axis: "row", .. }))
    ));
}

#[test]
fn test_malformed_lines_are_errors() {
    // None of these may be dropped or read as zero.
    for line in [
        "",
        "switch on 1,1 through 2,2",
        "turn on 1,x through 2,2",
        "turn on 1,1 2,2",
        "turn on -1,1 through 2,2",
        "turn on 1,1 through 99999999999999999999999,2",
    ] {
        assert!(
            matches!(
                Instruction::try_from(line),
                Err(ParseError::Unrecognised(_))
            ),
            "expected '{}' to be rejected",
            line
        );
    }
}

#[test]
fn test_display_round_trip() {
    let text = "turn off 499,499 through 500,500";
    let instruction = Instruction::try_from(text).expect("valid instruction");
    assert_eq!(instruction.to_string(), text);
}

/// Parses one instruction per line, in order.  Blank lines are ignored.
/// A malformed line is an error unless `lenient` is set, in which case it
/// is logged and skipped.
pub fn parse_instructions(input: &str, lenient: bool) -> Result<Vec<Instruction>, Error> {
    let mut result = Vec::new();
    for (n, line) in input.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match Instruction::try_from(line) {
            Ok(instruction) => result.push(instruction),
            Err(e) if lenient => {
                event!(Level::WARN, "ignoring line {}: {}", n + 1, e);
            }
            Err(source) => {
                return Err(Error::BadLine { line: n + 1, source });
            }
        }
    }
    Ok(result)
}

#[test]
fn test_parse_instructions_keeps_order() {
    let input = "turn on 0,0 through 2,2\r\n\nturn off 1,1 through 1,1\n  toggle 0,0 through 0,0  \n";
    let instructions = parse_instructions(input, false).expect("valid input");
    let ops: Vec<Operation> = instructions.iter().map(|i| i.operation).collect();
    assert_eq!(
        ops,
        vec![Operation::SetOn, Operation::SetOff, Operation::Invert]
    );
}

#[test]
fn test_parse_instructions_strict_reports_line() {
    let input = "turn on 0,0 through 2,2\n\nturn up 1,1 through 1,1\n";
    match parse_instructions(input, false) {
        Err(Error::BadLine {
            line: 3,
            source: ParseError::Unrecognised(_),
        }) => (),
        other => {
            panic!("expected a bad line 3, got {:?}", other);
        }
    }
}

#[test]
fn test_parse_instructions_lenient_skips() {
    let input = "turn on 0,0 through 2,2\nturn up 1,1 through 1,1\ntoggle 5,5 through 4,4\ntoggle 1,1 through 1,1\n";
    let instructions = parse_instructions(input, true).expect("lenient parse");
    assert_eq!(instructions.len(), 2);
    assert_eq!(instructions[1].to_string(), "toggle 1,1 through 1,1");
}
