//! Disassembler: flat program → assembly text.
//!
//! Output format is flat text, one instruction or label per line. No
//! indentation, no comments, no blank lines. Jump and call targets become
//! synthetic `L<address>` labels.

use std::collections::BTreeSet;
use std::fmt::Write;

use sbvm_common::{decode_at, DecodeError, Decoded, Operand, Program};

/// Disassemble a program into assembly text.
///
/// Instructions are decoded by position from address 0. Every jump or call
/// target must fall on an instruction boundary or on the end of the program.
pub fn disassemble(program: &Program) -> Result<String, DecodeError> {
    let mut instructions = Vec::new();
    let mut address = 0;
    while address < program.len() {
        let decoded = decode_at(program, address)?;
        address = decoded.next_address();
        instructions.push(decoded);
    }

    let starts: BTreeSet<usize> = instructions.iter().map(|d| d.address).collect();
    let mut targets = BTreeSet::new();
    for decoded in &instructions {
        if decoded.opcode.operand() != Operand::Address {
            continue;
        }
        let Some(target) = decoded.operand else {
            continue;
        };
        match usize::try_from(target) {
            Ok(t) if t == program.len() || starts.contains(&t) => {
                targets.insert(t);
            }
            _ => {
                return Err(DecodeError::MisalignedTarget {
                    target,
                    at: decoded.address,
                })
            }
        }
    }

    let mut out = String::new();
    for decoded in &instructions {
        if targets.contains(&decoded.address) {
            let _ = writeln!(out, "L{}:", decoded.address);
        }
        write_instruction(&mut out, decoded);
    }
    if targets.contains(&program.len()) {
        let _ = writeln!(out, "L{}:", program.len());
    }

    Ok(out)
}

fn write_instruction(out: &mut String, decoded: &Decoded) {
    let mnemonic = decoded.opcode.mnemonic();
    let _ = match (decoded.opcode.operand(), decoded.operand) {
        (Operand::Address, Some(target)) => writeln!(out, "{mnemonic} L{target}"),
        (Operand::Immediate, Some(value)) => writeln!(out, "{mnemonic} {value}"),
        _ => writeln!(out, "{mnemonic}"),
    };
}
