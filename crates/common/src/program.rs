//! Instruction memory for SBVM.
//!
//! A program is a flat sequence of signed 32-bit words: opcodes interleaved
//! with their inline operands and jump addresses. Binary files (.sbvmb) are
//! raw concatenations of little-endian words with no header.

use crate::error::DecodeError;
use crate::opcode::Opcode;

/// Size of one word in the byte encoding.
pub const WORD_SIZE: usize = 4;

/// An SBVM program: a sequence of words.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Program {
    /// The instruction memory.
    pub words: Vec<i32>,
}

impl Program {
    /// Create a new program from a vector of words.
    pub fn new(words: Vec<i32>) -> Self {
        Self { words }
    }

    /// Encode the entire program to bytes.
    ///
    /// Each word becomes 4 little-endian bytes. The result length is always
    /// `words.len() * 4`.
    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.words.len() * WORD_SIZE);
        for word in &self.words {
            bytes.extend_from_slice(&word.to_le_bytes());
        }
        bytes
    }

    /// Decode a byte slice into a program.
    ///
    /// The byte slice length must be a multiple of 4. Words are not checked
    /// against the opcode table: only execution knows which words are
    /// opcodes.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        if bytes.len() % WORD_SIZE != 0 {
            return Err(DecodeError::InvalidLength(bytes.len()));
        }

        let words = bytes
            .chunks_exact(WORD_SIZE)
            .map(|chunk| i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect();

        Ok(Self { words })
    }

    /// Word at `address`, if in range.
    pub fn get(&self, address: usize) -> Option<i32> {
        self.words.get(address).copied()
    }

    /// Whether `address` is a valid index into this program.
    pub fn contains(&self, address: i32) -> bool {
        address >= 0 && (address as usize) < self.words.len()
    }

    /// Number of words in the program.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Returns true if the program has no words.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl From<Vec<i32>> for Program {
    fn from(words: Vec<i32>) -> Self {
        Self::new(words)
    }
}

impl FromIterator<i32> for Program {
    fn from_iter<I: IntoIterator<Item = i32>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// One decoded instruction, as seen by a linear walk of instruction memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoded {
    /// Address of the opcode word.
    pub address: usize,
    /// The operation.
    pub opcode: Opcode,
    /// The inline word, for opcodes that take one.
    pub operand: Option<i32>,
}

impl Decoded {
    /// Address of the next instruction in a linear walk.
    pub fn next_address(&self) -> usize {
        self.address + self.opcode.width()
    }
}

/// Decode the instruction starting at `address`.
///
/// This is the same positional rule the VM applies: the word at `address`
/// is an opcode, and the word after it is its operand if it takes one.
pub fn decode_at(program: &Program, address: usize) -> Result<Decoded, DecodeError> {
    let word = program
        .get(address)
        .ok_or(DecodeError::EndOfProgram { at: address })?;
    let opcode = Opcode::try_from(word).map_err(|_| DecodeError::UnknownOpcode {
        value: word,
        at: Some(address),
    })?;

    let operand = if opcode.width() == 2 {
        let value = program
            .get(address + 1)
            .ok_or(DecodeError::TruncatedOperand {
                opcode: opcode.mnemonic(),
                at: address,
            })?;
        Some(value)
    } else {
        None
    };

    Ok(Decoded {
        address,
        opcode,
        operand,
    })
}
