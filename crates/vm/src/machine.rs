//! VM state management: instruction memory, operand stack, frame stack.

use crate::error::InvalidProgram;
use crate::frame::Frame;
use sbvm_common::{decode_at, DecodeError, Decoded, Opcode, Program};

/// The SBVM CPU.
///
/// Owns its instruction memory for the lifetime of the run. Starts in the
/// Running state at address 0 with an empty operand stack and a single root
/// frame; HALT moves it to the terminal Halted state.
#[derive(Debug, Clone)]
pub struct Cpu {
    /// Immutable instruction memory.
    pub(crate) program: Program,
    /// Address of the next word to fetch.
    pub(crate) ip: usize,
    /// Address of the opcode currently executing, for error reports.
    pub(crate) op_address: usize,
    /// Set by HALT, never cleared.
    pub(crate) halted: bool,
    /// Operand stack, top is the last element.
    pub(crate) stack: Vec<i32>,
    /// Frame stack, never empty. The first element is the root frame.
    pub(crate) frames: Vec<Frame>,
}

impl Cpu {
    /// Create a machine ready to execute `program` from address 0.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidProgram::EmptyProgram`] if the program has no words.
    pub fn new(program: impl Into<Program>) -> Result<Self, InvalidProgram> {
        let program = program.into();
        if program.is_empty() {
            return Err(InvalidProgram::EmptyProgram);
        }

        Ok(Self {
            program,
            ip: 0,
            op_address: 0,
            halted: false,
            stack: Vec::new(),
            frames: vec![Frame::root()],
        })
    }

    /// Address of the next word to be fetched.
    pub fn instruction_address(&self) -> usize {
        self.ip
    }

    /// Whether HALT has executed.
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Address of the HALT instruction that stopped the machine, if halted.
    pub fn halt_address(&self) -> Option<usize> {
        self.halted.then_some(self.op_address)
    }

    /// Operand stack contents, top of stack first.
    pub fn stack(&self) -> Vec<i32> {
        self.stack.iter().rev().copied().collect()
    }

    /// Number of values on the operand stack.
    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    /// The innermost frame: the root frame when no call is active.
    pub fn current_frame(&self) -> &Frame {
        // `frames` is never empty; the root frame is never popped.
        &self.frames[self.frames.len() - 1]
    }

    /// Number of active calls (0 at top level).
    pub fn call_depth(&self) -> usize {
        self.frames.len() - 1
    }

    /// The instruction memory being executed.
    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Decode the instruction at the current address without executing it.
    pub fn peek_instruction(&self) -> Result<Decoded, DecodeError> {
        decode_at(&self.program, self.ip)
    }

    /// Fetch the word at the instruction address and advance past it.
    pub(crate) fn fetch(&mut self) -> Result<i32, InvalidProgram> {
        let word = self
            .program
            .get(self.ip)
            .ok_or(InvalidProgram::UnexpectedEnd { at: self.ip })?;
        self.ip += 1;
        Ok(word)
    }

    /// Fetch the inline word following `opcode`.
    pub(crate) fn fetch_operand(&mut self, opcode: Opcode) -> Result<i32, InvalidProgram> {
        self.fetch().map_err(|_| InvalidProgram::MissingOperand {
            opcode: opcode.mnemonic(),
            at: self.op_address,
        })
    }

    /// Fetch a jump target following `opcode` and check it lies inside
    /// instruction memory.
    pub(crate) fn fetch_target(&mut self, opcode: Opcode) -> Result<usize, InvalidProgram> {
        let address = self.fetch_operand(opcode)?;
        if !self.program.contains(address) {
            return Err(InvalidProgram::InvalidJumpAddress {
                opcode: opcode.mnemonic(),
                address,
                at: self.op_address,
            });
        }
        Ok(address as usize)
    }

    /// Fetch a variable slot following `opcode`.
    pub(crate) fn fetch_slot(&mut self, opcode: Opcode) -> Result<u32, InvalidProgram> {
        let slot = self.fetch_operand(opcode)?;
        u32::try_from(slot).map_err(|_| InvalidProgram::InvalidVariable {
            slot,
            at: self.op_address,
        })
    }

    /// Check that at least `needed` values are on the stack, before any of
    /// them is popped.
    pub(crate) fn require(&self, opcode: Opcode, needed: usize) -> Result<(), InvalidProgram> {
        if self.stack.len() < needed {
            return Err(self.underflow(opcode, needed));
        }
        Ok(())
    }

    /// Pop the top of stack.
    pub(crate) fn pop(&mut self, opcode: Opcode) -> Result<i32, InvalidProgram> {
        let underflow = self.underflow(opcode, 1);
        self.stack.pop().ok_or(underflow)
    }

    /// Top of stack without popping it.
    pub(crate) fn peek(&self, opcode: Opcode) -> Result<i32, InvalidProgram> {
        self.stack
            .last()
            .copied()
            .ok_or_else(|| self.underflow(opcode, 1))
    }

    pub(crate) fn push(&mut self, value: i32) {
        self.stack.push(value);
    }

    pub(crate) fn current_frame_mut(&mut self) -> &mut Frame {
        let top = self.frames.len() - 1;
        &mut self.frames[top]
    }

    fn underflow(&self, opcode: Opcode, needed: usize) -> InvalidProgram {
        InvalidProgram::StackUnderflow {
            opcode: opcode.mnemonic(),
            needed,
            depth: self.stack.len(),
            at: self.op_address,
        }
    }
}
