//! SBVM virtual machine: executes flat instruction memory.
//!
//! The VM is a stack-based machine with:
//! - An operand stack of `i32` values
//! - A frame stack: one root frame plus one frame per active CALL, each
//!   holding sparse local variables
//! - An instruction address into immutable instruction memory
//!
//! # Usage
//!
//! ```
//! use sbvm_common::{Opcode, Program};
//! use sbvm_vm::run;
//!
//! let program = Program::new(vec![
//!     Opcode::Push as i32, 40,
//!     Opcode::Push as i32, 2,
//!     Opcode::Add as i32,
//!     Opcode::Halt as i32,
//! ]);
//!
//! let cpu = run(&program).unwrap();
//! assert_eq!(cpu.stack(), vec![42]);
//! ```

pub mod error;
pub mod execute;
pub mod frame;
pub mod machine;

pub use error::InvalidProgram;
pub use frame::Frame;
pub use machine::Cpu;

use sbvm_common::Program;

/// Execute a program until HALT and return the halted machine.
///
/// The returned [`Cpu`] exposes the final operand stack and the current
/// frame's variables.
///
/// # Errors
///
/// Returns [`InvalidProgram`] if the program is empty or execution hits any
/// fatal condition (stack underflow, bad jump target, RET with no active
/// call, unknown instruction, ...).
pub fn run(program: &Program) -> Result<Cpu, InvalidProgram> {
    let mut cpu = Cpu::new(program.clone())?;
    cpu.run()?;
    Ok(cpu)
}
