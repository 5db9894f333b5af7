//! SBVM assembler: statements or text to flat instruction memory.
//!
//! Assembly is two passes over the statement list. Pass 1 emits every word
//! and records where each label lands, writing a placeholder wherever a
//! jump or call names a label. Pass 2 patches each placeholder with the
//! label's address. Labels may be referenced before or after they are
//! declared.
//!
//! # Usage
//!
//! ```
//! use sbvm_assembler::{assemble_text, disassemble};
//!
//! let text = "JMP end\nPUSH 1\nend:\nHALT\n";
//! let program = assemble_text(text).unwrap();
//! assert_eq!(program.words, vec![15, 4, 2, 1, 1]);
//! assert_eq!(disassemble(&program).unwrap(), "JMP L4\nPUSH 1\nL4:\nHALT\n");
//! ```
//!
//! # Roundtrip Guarantee
//!
//! `assemble_text(disassemble(program)) == program` holds for every program
//! whose jump targets land on instruction boundaries.

pub mod error;
pub mod statement;

mod disassembler;
mod lexer;
mod parser;

pub use disassembler::disassemble;
pub use error::AsmError;
pub use statement::Statement;

use std::collections::HashMap;

use lexer::tokenize_line;
use parser::parse_line;
use sbvm_common::{Opcode, Operand, Program};

/// Word written where a label address will go, until pass 2 patches it.
const UNRESOLVED_ADDRESS: i32 = -1;

/// Assemble statements into a program.
///
/// # Errors
///
/// - [`AsmError::DuplicateLabel`] if a label is declared twice
/// - [`AsmError::OperandMismatch`] if an opcode is used in the wrong
///   statement form (e.g. `Nullary(PUSH)`)
/// - [`AsmError::UnresolvedLabel`] if a reference names an undeclared label
pub fn assemble(statements: &[Statement]) -> Result<Program, AsmError> {
    let mut words = Vec::new();
    let mut labels: HashMap<&str, usize> = HashMap::new();
    let mut references: Vec<(&str, usize)> = Vec::new();

    // Pass 1: emit words, record label addresses and placeholder positions.
    for (index, statement) in statements.iter().enumerate() {
        match statement {
            Statement::Label(name) => {
                if let Some(&first) = labels.get(name.as_str()) {
                    return Err(AsmError::DuplicateLabel {
                        label: name.clone(),
                        first,
                        second: words.len(),
                    });
                }
                labels.insert(name.as_str(), words.len());
            }
            Statement::Nullary(opcode) => {
                check_form(*opcode, Operand::None, index)?;
                words.push(*opcode as i32);
            }
            Statement::Immediate(opcode, value) => {
                check_form(*opcode, Operand::Immediate, index)?;
                words.push(*opcode as i32);
                words.push(*value);
            }
            Statement::LabelRef(opcode, label) => {
                check_form(*opcode, Operand::Address, index)?;
                words.push(*opcode as i32);
                references.push((label.as_str(), words.len()));
                words.push(UNRESOLVED_ADDRESS);
            }
        }
    }

    // Pass 2: patch every placeholder.
    for (label, position) in references {
        let address = *labels.get(label).ok_or_else(|| AsmError::UnresolvedLabel {
            label: label.to_string(),
        })?;
        words[position] = i32::try_from(address).map_err(|_| AsmError::AddressOverflow {
            label: label.to_string(),
            address,
        })?;
    }

    Ok(Program::new(words))
}

fn check_form(opcode: Opcode, expected: Operand, index: usize) -> Result<(), AsmError> {
    if opcode.operand() == expected {
        Ok(())
    } else {
        Err(AsmError::OperandMismatch {
            opcode: opcode.mnemonic(),
            index,
        })
    }
}

/// Parse assembly text into statements.
///
/// Returns the first error encountered, tagged with its 1-based line.
pub fn parse(text: &str) -> Result<Vec<Statement>, AsmError> {
    let mut statements = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line_num = idx + 1;
        let tokens = tokenize_line(line, line_num)?;
        statements.extend(parse_line(&tokens, line_num)?);
    }
    Ok(statements)
}

/// Parse and assemble text in one step.
pub fn assemble_text(text: &str) -> Result<Program, AsmError> {
    assemble(&parse(text)?)
}
