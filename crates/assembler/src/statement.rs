//! Parsed assembly statements: the assembler's input.

use sbvm_common::Opcode;

/// One parsed line item of an assembly program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// `name:` binds `name` to the address of the next emitted word.
    Label(String),
    /// An opcode with no operand (HALT, ADD, ..., RET).
    Nullary(Opcode),
    /// PUSH, LOAD or STORE with a literal operand.
    Immediate(Opcode, i32),
    /// JMP, JIF or CALL with a symbolic target.
    LabelRef(Opcode, String),
}

impl Statement {
    pub fn label(name: impl Into<String>) -> Self {
        Statement::Label(name.into())
    }

    pub fn op(opcode: Opcode) -> Self {
        Statement::Nullary(opcode)
    }

    pub fn imm(opcode: Opcode, value: i32) -> Self {
        Statement::Immediate(opcode, value)
    }

    pub fn jump(opcode: Opcode, label: impl Into<String>) -> Self {
        Statement::LabelRef(opcode, label.into())
    }
}
