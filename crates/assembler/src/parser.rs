//! Parser for SBVM assembly tokens → statements.
//!
//! Dispatches on the opcode's operand kind to the correct argument pattern.

use crate::error::AsmError;
use crate::lexer::Token;
use crate::statement::Statement;
use sbvm_common::{Opcode, Operand};

fn token_text(token: &Token) -> String {
    match token {
        Token::LabelDef(name) => format!("{name}:"),
        Token::Ident(s) => s.clone(),
        Token::Number(n) => n.to_string(),
    }
}

/// Parse the tokens of a single line into statements.
///
/// A line holds any number of leading label declarations followed by at
/// most one instruction. Blank lines yield no statements.
pub(crate) fn parse_line(tokens: &[Token], line_num: usize) -> Result<Vec<Statement>, AsmError> {
    let mut statements = Vec::new();
    let mut rest = tokens;

    while let Some((Token::LabelDef(name), tail)) = rest.split_first() {
        statements.push(Statement::Label(name.clone()));
        rest = tail;
    }

    let Some((first, args)) = rest.split_first() else {
        return Ok(statements);
    };

    let mnemonic = match first {
        Token::Ident(s) => s,
        other => {
            return Err(AsmError::UnexpectedToken {
                line: line_num,
                token: token_text(other),
            })
        }
    };

    let opcode = Opcode::from_mnemonic(&mnemonic.to_ascii_uppercase()).ok_or_else(|| {
        AsmError::UnknownOpcode {
            line: line_num,
            token: mnemonic.clone(),
        }
    })?;

    let statement = match opcode.operand() {
        Operand::None => Statement::Nullary(opcode),
        Operand::Immediate => Statement::Immediate(opcode, expect_i32(args, line_num, opcode)?),
        Operand::Address => Statement::LabelRef(opcode, expect_label(args, line_num, opcode)?),
    };

    let consumed = if opcode.width() == 1 { 0 } else { 1 };
    expect_end(&args[consumed..], line_num)?;

    statements.push(statement);
    Ok(statements)
}

fn expect_end(args: &[Token], line_num: usize) -> Result<(), AsmError> {
    match args.first() {
        None => Ok(()),
        Some(token) => Err(AsmError::UnexpectedToken {
            line: line_num,
            token: token_text(token),
        }),
    }
}

fn expect_i32(args: &[Token], line_num: usize, opcode: Opcode) -> Result<i32, AsmError> {
    match args.first() {
        Some(Token::Number(n)) => i32::try_from(*n).map_err(|_| AsmError::InvalidNumber {
            line: line_num,
            token: n.to_string(),
        }),
        Some(other) => Err(AsmError::UnexpectedToken {
            line: line_num,
            token: token_text(other),
        }),
        None => Err(AsmError::MissingArgument {
            line: line_num,
            opcode: opcode.mnemonic(),
        }),
    }
}

fn expect_label(args: &[Token], line_num: usize, opcode: Opcode) -> Result<String, AsmError> {
    match args.first() {
        Some(Token::Ident(name)) => Ok(name.clone()),
        Some(other) => Err(AsmError::UnexpectedToken {
            line: line_num,
            token: token_text(other),
        }),
        None => Err(AsmError::MissingArgument {
            line: line_num,
            opcode: opcode.mnemonic(),
        }),
    }
}
