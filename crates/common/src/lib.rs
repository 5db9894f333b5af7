//! SBVM common types and instruction encoding.
//!
//! This crate provides the vocabulary shared by the assembler and the VM:
//!
//! - [`Opcode`]: the 20 operations and their stable word values
//! - [`Operand`]: what kind of inline word follows an opcode
//! - [`Program`]: flat instruction memory and its byte encoding
//! - [`DecodeError`]: errors from decoding bytes or walking memory
//!
//! # Dependencies
//!
//! This crate depends only on `thiserror`.

pub mod error;
pub mod opcode;
pub mod program;

// Re-export commonly used types at the crate root.
pub use error::DecodeError;
pub use opcode::{Opcode, Operand};
pub use program::{decode_at, Decoded, Program};

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Byte encoding preserves every word, including negative ones.
        #[test]
        fn program_roundtrip(words in prop::collection::vec(any::<i32>(), 0..64)) {
            let program = Program::new(words);
            let bytes = program.encode();
            prop_assert_eq!(bytes.len(), program.len() * 4);
            let decoded = Program::decode(&bytes).unwrap();
            prop_assert_eq!(program, decoded);
        }

        /// Any byte slice either decodes (and re-encodes identically) or is
        /// rejected for its length.
        #[test]
        fn random_bytes_decode(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
            match Program::decode(&bytes) {
                Ok(program) => prop_assert_eq!(program.encode(), bytes),
                Err(e) => prop_assert_eq!(e, DecodeError::InvalidLength(bytes.len())),
            }
        }

        /// Every i32 either names an opcode or is reported as unknown.
        #[test]
        fn every_word_resolves(word in any::<i32>()) {
            match Opcode::try_from(word) {
                Ok(op) => prop_assert_eq!(op as i32, word),
                Err(e) => prop_assert_eq!(e, DecodeError::UnknownOpcode { value: word, at: None }),
            }
        }
    }
}
