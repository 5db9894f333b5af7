//! CLI command implementations.

use std::fs;

use sbvm_common::Program;
use sbvm_vm::Cpu;

/// Assemble a .sbvm text file to .sbvmb binary.
pub fn assemble(args: &[String]) -> Result<(), i32> {
    if args.is_empty() {
        eprintln!("error: assemble requires an input file");
        eprintln!("Usage: sbvm assemble <input.sbvm> [-o output.sbvmb]");
        return Err(1);
    }

    let input = &args[0];

    // Parse -o flag
    let output = if args.len() >= 3 && args[1] == "-o" {
        args[2].clone()
    } else if input.ends_with(".sbvm") {
        format!("{input}b")
    } else {
        format!("{input}.sbvmb")
    };

    let program = read_text(input)?;
    let bytes = program.encode();

    fs::write(&output, &bytes).map_err(|e| {
        eprintln!("error: cannot write '{output}': {e}");
        1
    })?;

    eprintln!(
        "assembled {} words ({} bytes) -> {output}",
        program.len(),
        bytes.len()
    );
    Ok(())
}

/// Options accepted by `run` after the input path.
struct RunOptions {
    trace: bool,
    max_steps: Option<u64>,
}

fn parse_run_options(args: &[String]) -> Result<RunOptions, i32> {
    let mut options = RunOptions {
        trace: false,
        max_steps: None,
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--trace" => options.trace = true,
            "--max-steps" => {
                let Some(value) = args.get(i + 1) else {
                    eprintln!("error: --max-steps requires a value");
                    return Err(1);
                };
                let steps = value.parse().map_err(|_| {
                    eprintln!("error: invalid step count '{value}'");
                    1
                })?;
                options.max_steps = Some(steps);
                i += 1;
            }
            other => {
                eprintln!("error: unknown option '{other}'");
                return Err(1);
            }
        }
        i += 1;
    }

    Ok(options)
}

/// Execute a program, assembling it first if it is a .sbvm text file.
pub fn run(args: &[String]) -> Result<(), i32> {
    if args.is_empty() {
        eprintln!("error: run requires an input file");
        eprintln!("Usage: sbvm run <input> [--trace] [--max-steps N]");
        return Err(1);
    }

    let input = &args[0];
    let options = parse_run_options(&args[1..])?;
    let program = if input.ends_with(".sbvm") {
        read_text(input)?
    } else {
        read_binary(input)?
    };

    let mut cpu = Cpu::new(program).map_err(|e| {
        eprintln!("runtime error: {e}");
        3
    })?;

    let outcome = if options.trace {
        run_traced(&mut cpu, options.max_steps)
    } else {
        match options.max_steps {
            Some(max_steps) => cpu.run_bounded(max_steps),
            None => cpu.run().map(|()| true),
        }
    };

    match outcome {
        Ok(true) => {
            println!("stack: {:?}", cpu.stack());
            println!("variables: {:?}", cpu.current_frame().variables());
            Ok(())
        }
        Ok(false) => {
            eprintln!(
                "error: step budget exhausted at address {}",
                cpu.instruction_address()
            );
            Err(2)
        }
        Err(e) => {
            eprintln!("runtime error: {e}");
            Err(3)
        }
    }
}

/// Step the machine, writing one line per instruction to stderr.
fn run_traced(cpu: &mut Cpu, max_steps: Option<u64>) -> Result<bool, sbvm_vm::InvalidProgram> {
    let mut steps = 0;
    while !cpu.is_halted() {
        if max_steps == Some(steps) {
            return Ok(false);
        }
        // An undecodable instruction is reported by `step` itself.
        if let Ok(decoded) = cpu.peek_instruction() {
            let operand = decoded.operand.map(|v| format!(" {v}")).unwrap_or_default();
            eprintln!(
                "[{}] {}{operand} | {:?}",
                decoded.address,
                decoded.opcode.mnemonic(),
                cpu.stack()
            );
        }
        cpu.step()?;
        steps += 1;
    }
    Ok(true)
}

/// Disassemble a .sbvmb binary to text.
pub fn disassemble(args: &[String]) -> Result<(), i32> {
    if args.is_empty() {
        eprintln!("error: disassemble requires an input file");
        eprintln!("Usage: sbvm disassemble <input.sbvmb>");
        return Err(1);
    }

    let input = &args[0];
    let program = read_binary(input)?;
    let text = sbvm_assembler::disassemble(&program).map_err(|e| {
        eprintln!("error: {e}");
        1
    })?;
    print!("{text}");
    Ok(())
}

fn read_text(path: &str) -> Result<Program, i32> {
    let text = fs::read_to_string(path).map_err(|e| {
        eprintln!("error: cannot read '{path}': {e}");
        1
    })?;

    sbvm_assembler::assemble_text(&text).map_err(|e| {
        eprintln!("error: {e}");
        1
    })
}

fn read_binary(path: &str) -> Result<Program, i32> {
    let bytes = fs::read(path).map_err(|e| {
        eprintln!("error: cannot read '{path}': {e}");
        1
    })?;

    Program::decode(&bytes).map_err(|e| {
        eprintln!("error: invalid binary: {e}");
        1
    })
}
