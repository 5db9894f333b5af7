//! Decode errors for SBVM instruction memory.

use thiserror::Error;

/// Errors that occur while decoding bytes or walking instruction memory
/// outside the VM (disassembly, tracing).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// A word at a decode position is not an opcode.
    #[error("unknown opcode {value}{}", fmt_at(.at))]
    UnknownOpcode { value: i32, at: Option<usize> },

    /// An opcode that takes an inline word is the last word of the program.
    #[error("{opcode} at address {at} is missing its operand")]
    TruncatedOperand { opcode: &'static str, at: usize },

    /// A decode started past the last word.
    #[error("address {at} is past the end of the program")]
    EndOfProgram { at: usize },

    /// A jump or call target does not start an instruction.
    #[error("target {target} of the jump at address {at} does not start an instruction")]
    MisalignedTarget { target: i32, at: usize },

    /// Byte stream length is not a multiple of 4.
    #[error("invalid byte stream length: {0} (must be multiple of 4)")]
    InvalidLength(usize),
}

fn fmt_at(at: &Option<usize>) -> String {
    match at {
        Some(at) => format!(" at address {at}"),
        None => String::new(),
    }
}
