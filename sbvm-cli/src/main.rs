//! SBVM CLI: assemble, run, and disassemble stack machine programs.
//!
//! Exit codes:
//! - 0: Success
//! - 1: Usage/input/decode/assembly error
//! - 2: Step budget exhausted (`run --max-steps`)
//! - 3: Runtime error

mod commands;

use std::process;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "assemble" => commands::assemble(&args[2..]),
        "run" => commands::run(&args[2..]),
        "disassemble" => commands::disassemble(&args[2..]),
        "--help" | "-h" | "help" => {
            print_usage();
            process::exit(0);
        }
        other => {
            eprintln!("error: unknown command '{other}'");
            eprintln!();
            print_usage();
            process::exit(1);
        }
    };

    if let Err(code) = result {
        process::exit(code);
    }
}

fn print_usage() {
    eprintln!("Usage: sbvm <command> [args]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  assemble <input.sbvm> [-o output.sbvmb]          Assemble text to binary");
    eprintln!("  run <input> [--trace] [--max-steps N]            Execute a text or binary program");
    eprintln!("  disassemble <input.sbvmb>                        Disassemble binary to text");
}
