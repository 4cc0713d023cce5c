use std::fs;
use std::io;
use std::io::prelude::*;
use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::{event, Level};
use tracing_subscriber::prelude::*;

mod count;
mod driver;
mod engine;
mod error;
mod grid;
mod instruction;

use driver::{run_all, Driver};
use error::Error;
use grid::{Grid, SIDE};
use instruction::parse_instructions;

/// Follow the light-grid instructions and count the lights left on.
#[derive(Parser, Debug)]
#[command(name = "day06")]
#[command(about = "Follow light-grid instructions and count the lit lights", long_about = None)]
struct Cli {
    /// Instruction file (standard input if omitted)
    input: Option<PathBuf>,

    /// Print the grid after the count, '#' for lit and '.' for dark
    #[arg(long)]
    show: bool,

    /// Skip malformed lines instead of failing
    #[arg(long)]
    lenient: bool,

    /// Number of worker threads (default: one per CPU)
    #[arg(short, long)]
    threads: Option<usize>,
}

fn read_input(path: Option<&Path>) -> Result<String, Error> {
    match path {
        Some(path) => {
            event!(Level::DEBUG, "reading instructions from {}", path.display());
            Ok(fs::read_to_string(path)?)
        }
        None => {
            let mut input = String::new();
            io::stdin().read_to_string(&mut input)?;
            Ok(input)
        }
    }
}

fn run(cli: &Cli) -> Result<usize, Error> {
    if let Some(n) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()?;
    }
    let input = read_input(cli.input.as_deref())?;
    let instructions = parse_instructions(&input, cli.lenient)?;
    let workers = engine::default_workers();
    event!(
        Level::INFO,
        "{} instruction(s) for a {}x{} grid using {} worker(s)",
        instructions.len(),
        SIDE,
        SIDE,
        workers,
    );
    let mut driver = Driver::new(Grid::square(SIDE), workers);
    let count = run_all(&instructions, &mut driver)?;
    println!("Day 06: {} lights are lit", count);
    if cli.show {
        print!("{}", driver.grid());
    }
    Ok(count)
}

fn init_logging() -> Result<(), Error> {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(io::stderr);
    let filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new("info"))?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()?;
    Ok(())
}

fn main() {
    if let Err(e) = init_logging() {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

#[test]
fn test_cli_defaults() {
    let cli = Cli::parse_from(["day06"]);
    assert_eq!(cli.input, None);
    assert!(!cli.show);
    assert!(!cli.lenient);
    assert_eq!(cli.threads, None);
}

#[test]
fn test_cli_options() {
    let cli = Cli::parse_from(["day06", "--show", "--lenient", "-t", "3", "lights.txt"]);
    assert_eq!(cli.input, Some(PathBuf::from("lights.txt")));
    assert!(cli.show);
    assert!(cli.lenient);
    assert_eq!(cli.threads, Some(3));
}

#[test]
fn test_grid_size_is_fixed() {
    assert!(Cli::try_parse_from(["day06", "--side", "4000000000"]).is_err());
}

#[test]
fn test_missing_input_file_is_an_error() {
    let result = read_input(Some(Path::new("/nonexistent/day06/lights.txt")));
    assert!(matches!(result, Err(Error::Io(_))));
}

#[test]
fn test_logging_then_run_worked_example() {
    assert!(init_logging().is_ok());

    let path = std::env::temp_dir().join(format!("day06-worked-example-{}.txt", std::process::id()));
    fs::write(
        &path,
        "turn on 0,0 through 999,999\ntoggle 0,0 through 999,0\nturn off 499,499 through 500,500\n",
    )
    .expect("should be able to write a temporary file");
    let cli = Cli::parse_from([PathBuf::from("day06"), path.clone()]);
    let result = run(&cli);
    let _ = fs::remove_file(&path);
    assert_eq!(result.ok(), Some(998_996));
}
