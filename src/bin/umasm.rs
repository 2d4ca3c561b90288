//! Assembler and disassembler CLI for UM32 program images.
//!
//! # Usage
//! ```text
//! umasm asm <input.ums> [OPTIONS]
//! umasm dis <input.um>
//! ```
//!
//! # Examples
//! ```text
//! umasm asm hello.ums
//! umasm asm hello.ums -o hello.um
//! umasm dis hello.um
//! ```

use std::env;
use std::fs;
use std::path::Path;
use std::process;
use um32::machine::assembler::{assemble_file, disassemble};
use um32::machine::program::Program;

const USAGE: &str = "\
UM32 Assembler

USAGE:
    {program} asm <input.ums> [OPTIONS]
    {program} dis <input.um>

COMMANDS:
    asm    Assemble source into a program image
    dis    Disassemble a program image to stdout

OPTIONS:
    -o, --output <file>    Output file path (defaults to `<input>.um`)
    -h, --help             Print this help message
";

fn main() {
    let args: Vec<String> = env::args().collect();
    let program_name = args.first().map(String::as_str).unwrap_or("umasm");

    if args.len() >= 2 && (args[1] == "--help" || args[1] == "-h") {
        print_usage(program_name);
        process::exit(0);
    }
    if args.len() < 3 {
        print_usage(program_name);
        process::exit(1);
    }

    match args[1].as_str() {
        "asm" => run_asm(&args[2..]),
        "dis" => run_dis(&args[2..]),
        other => {
            eprintln!("Unknown command: {}\n", other);
            print_usage(program_name);
            process::exit(1);
        }
    }
}

fn run_asm(args: &[String]) {
    let input_path = &args[0];
    let mut output_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            k @ ("--output" | "-o") => {
                i += 1;
                if i >= args.len() {
                    eprintln!("{k} requires an argument");
                    process::exit(1);
                }
                output_path = Some(args[i].clone());
                i += 1;
            }
            other => {
                eprintln!("Unexpected argument: {}", other);
                process::exit(1);
            }
        }
    }

    if !Path::new(input_path).exists() {
        eprintln!("Input file does not exist: {}", input_path);
        process::exit(1);
    }

    let output_path = output_path.unwrap_or_else(|| {
        let p = Path::new(input_path);
        let stem = p.file_stem().unwrap_or_default().to_string_lossy();
        let parent = p.parent().unwrap_or(Path::new("."));
        parent
            .join(format!("{}.um", stem))
            .to_string_lossy()
            .into_owned()
    });

    if let Some(parent) = Path::new(&output_path).parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        eprintln!("Output directory does not exist: {}", parent.display());
        process::exit(1);
    }

    let words = match assemble_file(input_path) {
        Ok(words) => words,
        Err(e) => {
            eprintln!("Assembly failed: {}", e);
            process::exit(1);
        }
    };

    let mut bytes = Vec::with_capacity(words.len() * 4);
    for word in &words {
        bytes.extend_from_slice(&word.to_be_bytes());
    }

    if let Err(e) = fs::write(&output_path, bytes) {
        eprintln!("Failed to write output file: {}", e);
        process::exit(1);
    }

    println!(
        "Assembled {} -> {} ({} words)",
        input_path,
        output_path,
        words.len()
    );
}

fn run_dis(args: &[String]) {
    if args.len() > 1 {
        eprintln!("Unexpected argument: {}", args[1]);
        process::exit(1);
    }

    let program = match Program::from_file(&args[0]) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("Failed to read program: {}", e);
            process::exit(1);
        }
    };

    print!("{}", disassemble(program.words()));
}

/// Prints usage information to stderr.
fn print_usage(program: &str) {
    eprintln!("{}", USAGE.replace("{program}", program));
}
