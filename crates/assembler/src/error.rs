//! Error types for the SBVM assembler.

use thiserror::Error;

/// Errors produced while parsing assembly text or resolving labels.
///
/// Parse errors carry the 1-based source line. Resolution errors name the
/// label, since statements handed to [`crate::assemble`] carry no source
/// positions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AsmError {
    /// A jump or call names a label that is never declared.
    #[error("unresolved label '{label}'")]
    UnresolvedLabel { label: String },

    /// The same label is declared twice.
    #[error("label '{label}' declared at address {first} and again at address {second}")]
    DuplicateLabel {
        label: String,
        first: usize,
        second: usize,
    },

    /// A statement's opcode does not take the operand shape it was given.
    #[error("statement {index}: {opcode} cannot be used in this form")]
    OperandMismatch { opcode: &'static str, index: usize },

    /// A label resolves to an address that does not fit in a word.
    #[error("label '{label}' at address {address} is out of word range")]
    AddressOverflow { label: String, address: usize },

    /// An unrecognized opcode mnemonic was encountered.
    #[error("line {line}: unknown opcode '{token}'")]
    UnknownOpcode { line: usize, token: String },

    /// An opcode that needs an operand had none.
    #[error("line {line}: {opcode} expects an argument")]
    MissingArgument { line: usize, opcode: &'static str },

    /// A numeric literal could not be parsed or does not fit in a word.
    #[error("line {line}: invalid number '{token}'")]
    InvalidNumber { line: usize, token: String },

    /// A label declaration with a malformed name.
    #[error("line {line}: invalid label '{token}'")]
    InvalidLabel { line: usize, token: String },

    /// A token appeared where it was not expected.
    #[error("line {line}: unexpected token '{token}'")]
    UnexpectedToken { line: usize, token: String },
}
