//! UM32 virtual machine interpreter.
//!
//! Executes a UM32 program image from the command line.
//!
//! # Usage
//! ```text
//! um32 <program.um>
//! ```
//!
//! # Arguments
//! - `program.um`: Program image of big-endian 32-bit instruction words
//!
//! # Environment
//! - `UM32_LOG`: diagnostic verbosity (`info`, `warn`, or `error`; default `warn`)
//!
//! # Exit status
//! Zero after a clean halt; each fault kind maps to its own stable nonzero
//! code, reported together with a single diagnostic line on stderr.

use std::env;
use std::process;
use um32::machine::console::StdConsole;
use um32::machine::program::Program;
use um32::machine::vm::Machine;
use um32::utils::log::{self, Level};
use um32::{error, info, warn};

const USAGE: &str = "\
UM32 Virtual Machine

USAGE:
    {program} <program.um>

ARGS:
    <program.um>    Program image: big-endian 32-bit instruction words

OPTIONS:
    -h, --help      Print this help message

ENVIRONMENT:
    UM32_LOG    Diagnostic verbosity: info, warn, or error (default: warn)
";

fn main() {
    log::init(log_level_from_env());

    let args: Vec<String> = env::args().collect();
    let program_name = args.first().map(String::as_str).unwrap_or("um32");

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage(program_name);
        process::exit(0);
    }
    if args.len() > 2 {
        eprintln!("Unexpected argument: {}\n", args[2]);
        print_usage(program_name);
        process::exit(1);
    }

    let path = &args[1];
    let program = match Program::from_file(path) {
        Ok(program) => program,
        Err(e) => {
            error!("failed to load {path}: {e}");
            process::exit(e.exit_code());
        }
    };
    info!("loaded {} words from {}", program.len(), path);
    if program.is_empty() {
        warn!("program image is empty");
    }

    let mut machine = Machine::new(program, StdConsole::new());
    if let Err(e) = machine.run() {
        error!("{e}");
        process::exit(e.exit_code());
    }
}

/// Reads the diagnostic level from `UM32_LOG`, defaulting to warnings.
fn log_level_from_env() -> Level {
    env::var("UM32_LOG")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(Level::Warn)
}

/// Prints usage information to stderr.
fn print_usage(program: &str) {
    eprintln!("{}", USAGE.replace("{program}", program));
}
