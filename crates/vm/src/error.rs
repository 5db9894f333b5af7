//! Runtime errors for the SBVM engine.
//!
//! Every violated precondition surfaces as one [`InvalidProgram`] variant.
//! Variants carry the address of the offending opcode (`at`) and, where it
//! helps, the opcode mnemonic. None of them is recoverable: the machine that
//! produced one must be discarded.

use thiserror::Error;

/// Errors that occur while constructing or stepping a [`crate::Cpu`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidProgram {
    /// Instruction memory must hold at least one word.
    #[error("a program must contain at least one instruction")]
    EmptyProgram,

    /// `step` was called after HALT.
    #[error("a halted machine cannot execute (halted at address {at})")]
    Halted { at: usize },

    /// The instruction address ran past the last word.
    #[error("unexpected end of program at address {at}")]
    UnexpectedEnd { at: usize },

    /// An opcode that takes an inline word is the last word of the program.
    #[error("{opcode} at address {at} is missing its operand")]
    MissingOperand { opcode: &'static str, at: usize },

    /// Not enough values on the operand stack for the opcode.
    #[error("stack underflow: {opcode} needs {needed} value(s), found {depth} at address {at}")]
    StackUnderflow {
        opcode: &'static str,
        needed: usize,
        depth: usize,
        at: usize,
    },

    /// JMP, JIF or CALL target outside instruction memory.
    #[error("invalid jump address {address} for {opcode} at address {at}")]
    InvalidJumpAddress {
        opcode: &'static str,
        address: i32,
        at: usize,
    },

    /// RET with only the root frame on the frame stack.
    #[error("RET at address {at} with no active call")]
    NoActiveCall { at: usize },

    /// A decode position holds a value that is not an opcode.
    #[error("unknown instruction {value} at address {at}")]
    UnknownInstruction { value: i32, at: usize },

    /// LOAD or STORE with a negative variable slot.
    #[error("invalid variable slot {slot} at address {at}")]
    InvalidVariable { slot: i32, at: usize },

    /// DIV with a zero divisor.
    #[error("division by zero at address {at}")]
    DivisionByZero { at: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formats() {
        assert_eq!(
            InvalidProgram::EmptyProgram.to_string(),
            "a program must contain at least one instruction"
        );
        assert_eq!(
            InvalidProgram::StackUnderflow {
                opcode: "ADD",
                needed: 2,
                depth: 1,
                at: 4
            }
            .to_string(),
            "stack underflow: ADD needs 2 value(s), found 1 at address 4"
        );
        assert_eq!(
            InvalidProgram::InvalidJumpAddress {
                opcode: "JMP",
                address: 99,
                at: 0
            }
            .to_string(),
            "invalid jump address 99 for JMP at address 0"
        );
        assert_eq!(
            InvalidProgram::NoActiveCall { at: 3 }.to_string(),
            "RET at address 3 with no active call"
        );
        assert_eq!(
            InvalidProgram::UnknownInstruction { value: 77, at: 0 }.to_string(),
            "unknown instruction 77 at address 0"
        );
    }
}
