//! Fetch-decode-execute loop and opcode dispatch.

use crate::error::InvalidProgram;
use crate::frame::Frame;
use crate::machine::Cpu;
use sbvm_common::Opcode;

fn to_bool(n: i32) -> bool {
    n != 0
}

fn to_int(b: bool) -> i32 {
    if b {
        1
    } else {
        0
    }
}

impl Cpu {
    /// Execute until HALT or error.
    ///
    /// There is no bound on the number of steps: a program that never
    /// halts makes this loop forever. Use [`Cpu::run_bounded`] to cap it.
    pub fn run(&mut self) -> Result<(), InvalidProgram> {
        while !self.halted {
            self.step()?;
        }
        Ok(())
    }

    /// Execute at most `max_steps` instructions.
    ///
    /// Returns `Ok(true)` once the machine has halted, `Ok(false)` if the
    /// budget ran out first. A machine that is already halted returns
    /// `Ok(true)` without stepping.
    pub fn run_bounded(&mut self, max_steps: u64) -> Result<bool, InvalidProgram> {
        let mut steps = 0;
        while !self.halted {
            if steps == max_steps {
                return Ok(false);
            }
            self.step()?;
            steps += 1;
        }
        Ok(true)
    }

    /// Execute a single instruction.
    pub fn step(&mut self) -> Result<(), InvalidProgram> {
        if self.halted {
            return Err(InvalidProgram::Halted { at: self.ip });
        }

        self.op_address = self.ip;
        let word = self.fetch()?;
        let opcode = Opcode::try_from(word).map_err(|_| InvalidProgram::UnknownInstruction {
            value: word,
            at: self.op_address,
        })?;

        match opcode {
            Opcode::Halt => self.halted = true,
            Opcode::Push => {
                let value = self.fetch_operand(opcode)?;
                self.push(value);
            }
            Opcode::Pop => {
                self.pop(opcode)?;
            }
            Opcode::Dup => {
                let top = self.peek(opcode)?;
                self.push(top);
            }
            Opcode::Not => {
                let n = self.pop(opcode)?;
                self.push(to_int(!to_bool(n)));
            }

            Opcode::Add
            | Opcode::Sub
            | Opcode::Mul
            | Opcode::Div
            | Opcode::And
            | Opcode::Or
            | Opcode::IsEq
            | Opcode::IsGe
            | Opcode::IsGt => self.exec_binary(opcode)?,

            Opcode::Load => {
                let slot = self.fetch_slot(opcode)?;
                let value = self.current_frame().variable(slot);
                self.push(value);
            }
            Opcode::Store => {
                let slot = self.fetch_slot(opcode)?;
                let value = self.pop(opcode)?;
                self.current_frame_mut().set_variable(slot, value);
            }

            Opcode::Jmp => {
                self.ip = self.fetch_target(opcode)?;
            }
            Opcode::Jif => {
                let target = self.fetch_target(opcode)?;
                if to_bool(self.pop(opcode)?) {
                    self.ip = target;
                }
            }
            Opcode::Call => {
                let target = self.fetch_target(opcode)?;
                // Resume just past the CALL operand.
                self.frames.push(Frame::new(self.ip));
                self.ip = target;
            }
            Opcode::Ret => self.exec_ret()?,
        }

        Ok(())
    }

    /// Pop n2 then n1 (n1 is the deeper operand) and push `n1 op n2`.
    fn exec_binary(&mut self, opcode: Opcode) -> Result<(), InvalidProgram> {
        self.require(opcode, 2)?;
        let n2 = self.stack[self.stack.len() - 1];
        let n1 = self.stack[self.stack.len() - 2];

        let result = match opcode {
            Opcode::Add => n1.wrapping_add(n2),
            Opcode::Sub => n1.wrapping_sub(n2),
            Opcode::Mul => n1.wrapping_mul(n2),
            Opcode::Div => {
                if n2 == 0 {
                    return Err(InvalidProgram::DivisionByZero {
                        at: self.op_address,
                    });
                }
                n1.wrapping_div(n2)
            }
            Opcode::And => to_int(to_bool(n1) && to_bool(n2)),
            Opcode::Or => to_int(to_bool(n1) || to_bool(n2)),
            Opcode::IsEq => to_int(n1 == n2),
            Opcode::IsGe => to_int(n1 >= n2),
            Opcode::IsGt => to_int(n1 > n2),
            _ => unreachable!("{} is not a binary opcode", opcode.mnemonic()),
        };

        self.stack.truncate(self.stack.len() - 2);
        self.push(result);
        Ok(())
    }

    fn exec_ret(&mut self) -> Result<(), InvalidProgram> {
        if self.frames.len() == 1 {
            return Err(InvalidProgram::NoActiveCall {
                at: self.op_address,
            });
        }
        // The callee's variables go with its frame.
        if let Some(frame) = self.frames.pop() {
            self.ip = frame.return_address();
        }
        Ok(())
    }
}
