//! Opcode definitions for the SBVM instruction set.
//!
//! The numeric values are a stable contract between the assembler and the
//! VM. Instruction memory carries no tags: whether a word is an opcode or an
//! operand is decided purely by its position after the last decoded opcode.

use crate::error::DecodeError;

/// Identifies the operation to perform.
///
/// The `#[repr(i32)]` attribute pins each variant to its word value.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// Stop the machine.
    Halt = 1,
    /// Push the inline operand.
    Push = 2,
    /// Pop n2, pop n1, push n1 + n2.
    Add = 3,
    /// Pop n2, pop n1, push n1 - n2.
    Sub = 4,
    /// Pop n2, pop n1, push n1 * n2.
    Mul = 5,
    /// Pop n2, pop n1, push n1 / n2 (truncating).
    Div = 6,
    /// Pop n, push 1 if n is zero, else 0.
    Not = 7,
    /// Logical AND over the 0/non-zero convention.
    And = 8,
    /// Logical OR over the 0/non-zero convention.
    Or = 9,
    /// Discard the top of stack.
    Pop = 10,
    /// Duplicate the top of stack.
    Dup = 11,
    /// Push 1 if n1 == n2.
    IsEq = 12,
    /// Push 1 if n1 >= n2.
    IsGe = 13,
    /// Push 1 if n1 > n2.
    IsGt = 14,
    /// Unconditional jump to the inline address.
    Jmp = 15,
    /// Pop a condition, jump to the inline address if it is non-zero.
    Jif = 16,
    /// Push the current frame's variable at the inline slot.
    Load = 17,
    /// Pop into the current frame's variable at the inline slot.
    Store = 18,
    /// Push a new frame and jump to the inline address.
    Call = 19,
    /// Pop the current frame and resume at its return address.
    Ret = 20,
}

/// What, if anything, follows an opcode in instruction memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// The opcode stands alone.
    None,
    /// A literal value or variable slot (PUSH, LOAD, STORE).
    Immediate,
    /// An absolute instruction address (JMP, JIF, CALL).
    Address,
}

/// All valid opcodes, in encoding order. Useful for exhaustive testing.
pub const ALL_OPCODES: [Opcode; 20] = [
    Opcode::Halt,
    Opcode::Push,
    Opcode::Add,
    Opcode::Sub,
    Opcode::Mul,
    Opcode::Div,
    Opcode::Not,
    Opcode::And,
    Opcode::Or,
    Opcode::Pop,
    Opcode::Dup,
    Opcode::IsEq,
    Opcode::IsGe,
    Opcode::IsGt,
    Opcode::Jmp,
    Opcode::Jif,
    Opcode::Load,
    Opcode::Store,
    Opcode::Call,
    Opcode::Ret,
];

impl TryFrom<i32> for Opcode {
    type Error = DecodeError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Opcode::Halt),
            2 => Ok(Opcode::Push),
            3 => Ok(Opcode::Add),
            4 => Ok(Opcode::Sub),
            5 => Ok(Opcode::Mul),
            6 => Ok(Opcode::Div),
            7 => Ok(Opcode::Not),
            8 => Ok(Opcode::And),
            9 => Ok(Opcode::Or),
            10 => Ok(Opcode::Pop),
            11 => Ok(Opcode::Dup),
            12 => Ok(Opcode::IsEq),
            13 => Ok(Opcode::IsGe),
            14 => Ok(Opcode::IsGt),
            15 => Ok(Opcode::Jmp),
            16 => Ok(Opcode::Jif),
            17 => Ok(Opcode::Load),
            18 => Ok(Opcode::Store),
            19 => Ok(Opcode::Call),
            20 => Ok(Opcode::Ret),
            _ => Err(DecodeError::UnknownOpcode { value, at: None }),
        }
    }
}

impl Opcode {
    /// Returns the assembly mnemonic for this opcode.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Opcode::Halt => "HALT",
            Opcode::Push => "PUSH",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::Div => "DIV",
            Opcode::Not => "NOT",
            Opcode::And => "AND",
            Opcode::Or => "OR",
            Opcode::Pop => "POP",
            Opcode::Dup => "DUP",
            Opcode::IsEq => "ISEQ",
            Opcode::IsGe => "ISGE",
            Opcode::IsGt => "ISGT",
            Opcode::Jmp => "JMP",
            Opcode::Jif => "JIF",
            Opcode::Load => "LOAD",
            Opcode::Store => "STORE",
            Opcode::Call => "CALL",
            Opcode::Ret => "RET",
        }
    }

    /// Look up an opcode by its uppercase mnemonic.
    pub fn from_mnemonic(mnemonic: &str) -> Option<Opcode> {
        ALL_OPCODES
            .iter()
            .find(|op| op.mnemonic() == mnemonic)
            .copied()
    }

    /// The kind of inline word that follows this opcode.
    pub fn operand(&self) -> Operand {
        match self {
            Opcode::Push | Opcode::Load | Opcode::Store => Operand::Immediate,
            Opcode::Jmp | Opcode::Jif | Opcode::Call => Operand::Address,
            _ => Operand::None,
        }
    }

    /// Number of words this instruction occupies, opcode included.
    pub fn width(&self) -> usize {
        match self.operand() {
            Operand::None => 1,
            Operand::Immediate | Operand::Address => 2,
        }
    }
}
