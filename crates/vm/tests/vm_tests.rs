//! Integration tests for the SBVM engine.
//!
//! Organized by instruction group, then complete programs.

use sbvm_common::{Opcode, Program};
use sbvm_vm::{run, Cpu, InvalidProgram};

// ============================================================
// Helper functions
// ============================================================

const HALT: i32 = Opcode::Halt as i32;
const PUSH: i32 = Opcode::Push as i32;
const ADD: i32 = Opcode::Add as i32;
const SUB: i32 = Opcode::Sub as i32;
const MUL: i32 = Opcode::Mul as i32;
const DIV: i32 = Opcode::Div as i32;
const NOT: i32 = Opcode::Not as i32;
const AND: i32 = Opcode::And as i32;
const OR: i32 = Opcode::Or as i32;
const POP: i32 = Opcode::Pop as i32;
const DUP: i32 = Opcode::Dup as i32;
const ISEQ: i32 = Opcode::IsEq as i32;
const ISGE: i32 = Opcode::IsGe as i32;
const ISGT: i32 = Opcode::IsGt as i32;
const JMP: i32 = Opcode::Jmp as i32;
const JIF: i32 = Opcode::Jif as i32;
const LOAD: i32 = Opcode::Load as i32;
const STORE: i32 = Opcode::Store as i32;
const CALL: i32 = Opcode::Call as i32;
const RET: i32 = Opcode::Ret as i32;

/// Run to HALT, panicking on any error.
fn run_words(words: &[i32]) -> Cpu {
    run(&Program::new(words.to_vec())).unwrap_or_else(|e| panic!("execution failed: {e}"))
}

/// Run and return the error, panicking if the program halts cleanly.
fn run_err(words: &[i32]) -> InvalidProgram {
    match run(&Program::new(words.to_vec())) {
        Ok(cpu) => panic!("expected an error, halted with stack {:?}", cpu.stack()),
        Err(e) => e,
    }
}

/// Run to HALT and check the final address and stack (top first).
fn assert_halts_at(words: &[i32], address: usize, stack: &[i32]) -> Cpu {
    let cpu = run_words(words);
    assert!(cpu.is_halted());
    assert_eq!(cpu.instruction_address(), address, "final address");
    assert_eq!(cpu.stack(), stack, "final stack");
    cpu
}

// ============================================================
// Stack instructions
// ============================================================

#[test]
fn halt_only() {
    assert_halts_at(&[HALT], 1, &[]);
}

#[test]
fn push_then_halt() {
    let mut cpu = Cpu::new(vec![PUSH, 42, HALT]).unwrap();
    cpu.step().unwrap();
    assert_eq!(cpu.instruction_address(), 2);
    assert!(!cpu.is_halted());
    assert_eq!(cpu.stack(), vec![42]);
    cpu.step().unwrap();
    assert!(cpu.is_halted());
}

#[test]
fn push_push_then_halt() {
    assert_halts_at(&[PUSH, 42, PUSH, 68, HALT], 5, &[68, 42]);
}

#[test]
fn push_needs_an_operand() {
    assert_eq!(
        run_err(&[PUSH]),
        InvalidProgram::MissingOperand {
            opcode: "PUSH",
            at: 0
        }
    );
}

#[test]
fn pop_discards_top() {
    assert_halts_at(&[PUSH, 42, POP, HALT], 4, &[]);
}

#[test]
fn pop_needs_one_item() {
    assert_eq!(
        run_err(&[POP]),
        InvalidProgram::StackUnderflow {
            opcode: "POP",
            needed: 1,
            depth: 0,
            at: 0
        }
    );
}

#[test]
fn dup_copies_top() {
    assert_halts_at(&[PUSH, 42, DUP, HALT], 4, &[42, 42]);
}

#[test]
fn dup_needs_one_item() {
    assert!(matches!(
        run_err(&[DUP]),
        InvalidProgram::StackUnderflow { opcode: "DUP", .. }
    ));
}

#[test]
fn missing_halt_runs_off_the_end() {
    assert_eq!(
        run_err(&[PUSH, 1]),
        InvalidProgram::UnexpectedEnd { at: 2 }
    );
}

#[test]
fn unknown_instruction() {
    assert_eq!(
        run_err(&[PUSH, 1, 99]),
        InvalidProgram::UnknownInstruction { value: 99, at: 2 }
    );
}

#[test]
fn zero_is_not_an_instruction() {
    assert_eq!(
        run_err(&[0]),
        InvalidProgram::UnknownInstruction { value: 0, at: 0 }
    );
}

// ============================================================
// Arithmetic
// ============================================================

#[test]
fn add_two_numbers() {
    assert_halts_at(&[PUSH, 1, PUSH, 2, ADD, HALT], 6, &[3]);
}

#[test]
fn sub_uses_push_order() {
    assert_halts_at(&[PUSH, 1, PUSH, 2, SUB, HALT], 6, &[-1]);
}

#[test]
fn mul_two_numbers() {
    assert_halts_at(&[PUSH, 5, PUSH, 2, MUL, HALT], 6, &[10]);
}

#[test]
fn div_truncates() {
    assert_halts_at(&[PUSH, 8, PUSH, 3, DIV, HALT], 6, &[2]);
    assert_halts_at(&[PUSH, -7, PUSH, 2, DIV, HALT], 6, &[-3]);
}

#[test]
fn add_wraps_on_overflow() {
    assert_halts_at(&[PUSH, i32::MAX, PUSH, 1, ADD, HALT], 6, &[i32::MIN]);
}

#[test]
fn div_by_zero_is_fatal() {
    assert_eq!(
        run_err(&[PUSH, 8, PUSH, 0, DIV, HALT]),
        InvalidProgram::DivisionByZero { at: 4 }
    );
}

#[test]
fn every_binary_op_needs_two_items() {
    for op in [ADD, SUB, MUL, DIV, AND, OR, ISEQ, ISGE, ISGT] {
        let mut cpu = Cpu::new(vec![PUSH, 7, op, HALT]).unwrap();
        cpu.step().unwrap();
        let err = cpu.step().unwrap_err();
        assert!(
            matches!(
                err,
                InvalidProgram::StackUnderflow {
                    needed: 2,
                    depth: 1,
                    at: 2,
                    ..
                }
            ),
            "op {op}: {err:?}"
        );
        // The lone operand survives the failed instruction.
        assert_eq!(cpu.stack(), vec![7], "op {op} mutated the stack");
    }
}

// ============================================================
// Boolean logic and comparison
// ============================================================

#[test]
fn not_of_zero_is_one() {
    assert_halts_at(&[PUSH, 0, NOT, HALT], 4, &[1]);
}

#[test]
fn not_of_non_zero_is_zero() {
    assert_halts_at(&[PUSH, 5, NOT, HALT], 4, &[0]);
}

#[test]
fn not_needs_one_item() {
    assert!(matches!(
        run_err(&[NOT, HALT]),
        InvalidProgram::StackUnderflow { opcode: "NOT", .. }
    ));
}

#[test]
fn and_truth_table() {
    assert_halts_at(&[PUSH, 1, PUSH, 1, AND, HALT], 6, &[1]);
    assert_halts_at(&[PUSH, 1, PUSH, 0, AND, HALT], 6, &[0]);
    assert_halts_at(&[PUSH, 0, PUSH, 0, AND, HALT], 6, &[0]);
}

#[test]
fn or_truth_table() {
    assert_halts_at(&[PUSH, 1, PUSH, 0, OR, HALT], 6, &[1]);
    assert_halts_at(&[PUSH, 0, PUSH, 0, OR, HALT], 6, &[0]);
}

#[test]
fn booleans_are_normalized() {
    assert_halts_at(&[PUSH, 7, PUSH, -3, AND, HALT], 6, &[1]);
    assert_halts_at(&[PUSH, 0, PUSH, 42, OR, HALT], 6, &[1]);
}

#[test]
fn comparisons() {
    assert_halts_at(&[PUSH, 8, PUSH, 2, ISEQ, HALT], 6, &[0]);
    assert_halts_at(&[PUSH, 2, PUSH, 2, ISEQ, HALT], 6, &[1]);
    assert_halts_at(&[PUSH, 3, PUSH, 2, ISGE, HALT], 6, &[1]);
    assert_halts_at(&[PUSH, 2, PUSH, 2, ISGE, HALT], 6, &[1]);
    assert_halts_at(&[PUSH, 1, PUSH, 2, ISGE, HALT], 6, &[0]);
    assert_halts_at(&[PUSH, 3, PUSH, 2, ISGT, HALT], 6, &[1]);
    assert_halts_at(&[PUSH, 2, PUSH, 2, ISGT, HALT], 6, &[0]);
}

// ============================================================
// Jumps
// ============================================================

#[test]
fn unconditional_jump() {
    // address:  0    1  2     3    4
    assert_halts_at(&[JMP, 3, HALT, JMP, 2], 3, &[]);
}

#[test]
fn jump_needs_an_operand() {
    assert_eq!(
        run_err(&[JMP]),
        InvalidProgram::MissingOperand {
            opcode: "JMP",
            at: 0
        }
    );
}

#[test]
fn jump_target_must_be_in_range() {
    assert_eq!(
        run_err(&[JMP, 2]),
        InvalidProgram::InvalidJumpAddress {
            opcode: "JMP",
            address: 2,
            at: 0
        }
    );
    assert_eq!(
        run_err(&[PUSH, 1, JIF, -1]),
        InvalidProgram::InvalidJumpAddress {
            opcode: "JIF",
            address: -1,
            at: 2
        }
    );
    assert!(matches!(
        run_err(&[CALL, 100, HALT]),
        InvalidProgram::InvalidJumpAddress { opcode: "CALL", .. }
    ));
}

#[test]
fn conditional_jump() {
    // address:  0     1  2    3  4    5     6  7    8  9
    // Hitting the POP at 4 would underflow.
    assert_halts_at(&[PUSH, 1, JIF, 5, POP, PUSH, 0, JIF, 4, HALT], 10, &[]);
}

#[test]
fn conditional_jump_needs_an_operand() {
    assert!(matches!(
        run_err(&[PUSH, 1, JIF]),
        InvalidProgram::MissingOperand { opcode: "JIF", .. }
    ));
}

#[test]
fn conditional_jump_needs_one_item() {
    assert!(matches!(
        run_err(&[JIF, 0, HALT]),
        InvalidProgram::StackUnderflow { opcode: "JIF", .. }
    ));
}

// ============================================================
// Variables
// ============================================================

#[test]
fn load_of_unwritten_slot_is_zero() {
    let cpu = assert_halts_at(&[LOAD, 0, HALT], 3, &[0]);
    assert!(cpu.current_frame().variables().is_empty());
}

#[test]
fn repeated_load_of_unwritten_slot_is_zero() {
    assert_halts_at(&[LOAD, 9, LOAD, 9, LOAD, 9, HALT], 7, &[0, 0, 0]);
}

#[test]
fn store_variable() {
    let cpu = assert_halts_at(&[PUSH, 42, STORE, 0, HALT], 5, &[]);
    assert_eq!(cpu.current_frame().variable(0), 42);
}

#[test]
fn store_then_load() {
    let cpu = assert_halts_at(&[PUSH, 42, STORE, 0, LOAD, 0, HALT], 7, &[42]);
    assert_eq!(cpu.current_frame().variable(0), 42);
}

#[test]
fn load_and_store_need_an_operand() {
    assert!(matches!(
        run_err(&[LOAD]),
        InvalidProgram::MissingOperand { opcode: "LOAD", .. }
    ));
    assert!(matches!(
        run_err(&[STORE]),
        InvalidProgram::MissingOperand { opcode: "STORE", .. }
    ));
}

#[test]
fn store_needs_one_item() {
    assert!(matches!(
        run_err(&[STORE, 0, HALT]),
        InvalidProgram::StackUnderflow { opcode: "STORE", .. }
    ));
}

#[test]
fn negative_slot_is_rejected() {
    assert_eq!(
        run_err(&[PUSH, 1, STORE, -2, HALT]),
        InvalidProgram::InvalidVariable { slot: -2, at: 2 }
    );
    assert_eq!(
        run_err(&[LOAD, -1, HALT]),
        InvalidProgram::InvalidVariable { slot: -1, at: 0 }
    );
}

// ============================================================
// Calls
// ============================================================

#[test]
fn call_resumes_after_operand() {
    // address:  0     1  2     3     4  5    6  7
    let words = [CALL, 3, HALT, PUSH, 7, STORE, 0, RET];
    let mut cpu = Cpu::new(words.to_vec()).unwrap();

    cpu.step().unwrap();
    assert_eq!(cpu.instruction_address(), 3);
    assert_eq!(cpu.call_depth(), 1);
    assert_eq!(cpu.current_frame().return_address(), 2);

    cpu.run().unwrap();
    assert_eq!(cpu.instruction_address(), 3);
    assert_eq!(cpu.call_depth(), 0);
    // The callee's slot 0 went away with its frame.
    assert_eq!(cpu.current_frame().variable(0), 0);
}

#[test]
fn callee_variables_do_not_leak_into_caller() {
    // Caller stores 1 in slot 0, callee stores 2 in slot 0 and returns.
    let words = [
        PUSH, 1, STORE, 0, // 0
        CALL, 9, // 4
        LOAD, 0, HALT, // 6
        PUSH, 2, STORE, 0, RET, // 9
    ];
    let cpu = assert_halts_at(&words, 9, &[1]);
    assert_eq!(cpu.current_frame().variable(0), 1);
}

#[test]
fn nested_calls_unwind_in_order() {
    // main: CALL f; HALT   f: CALL g; PUSH 2; RET   g: PUSH 1; RET
    let words = [
        CALL, 3, HALT, // 0
        CALL, 8, PUSH, 2, RET, // 3
        PUSH, 1, RET, // 8
    ];
    assert_halts_at(&words, 3, &[2, 1]);
}

#[test]
fn ret_without_call_is_fatal() {
    assert_eq!(run_err(&[RET]), InvalidProgram::NoActiveCall { at: 0 });
}

#[test]
fn recursion_depth_is_unbounded_until_ret() {
    // Count down from 5 recursively, leaving every value on the stack.
    let words = [
        PUSH, 5, CALL, 5, HALT, // 0
        DUP, JIF, 9, RET, // 5: return once n == 0
        DUP, PUSH, 1, SUB, CALL, 5, RET, // 9: recurse on n - 1
    ];
    let cpu = run_words(&words);
    assert_eq!(cpu.stack(), vec![0, 1, 2, 3, 4, 5]);
}

// ============================================================
// Machine state
// ============================================================

#[test]
fn empty_program_cannot_be_constructed() {
    assert_eq!(
        Cpu::new(Program::default()).unwrap_err(),
        InvalidProgram::EmptyProgram
    );
}

#[test]
fn step_after_halt_is_an_error() {
    let mut cpu = Cpu::new(vec![HALT]).unwrap();
    cpu.step().unwrap();
    assert_eq!(cpu.step(), Err(InvalidProgram::Halted { at: 1 }));
    // run() has nothing left to step.
    assert_eq!(cpu.run(), Ok(()));
}

#[test]
fn program_is_not_mutated_by_execution() {
    let words = vec![PUSH, 3, STORE, 0, LOAD, 0, HALT];
    let cpu = run_words(&words);
    assert_eq!(cpu.program().words, words);
}

// ============================================================
// Complete programs
// ============================================================

/// if (a > b) c = a; else c = b;  with a, b, c in slots 0, 1, 2.
#[test]
fn if_else_program() {
    let words = [
        PUSH, 6, STORE, 0, // a = 6
        PUSH, 4, STORE, 1, // b = 4
        LOAD, 0, LOAD, 1, ISGT, // a > b
        JIF, 21, // 13
        LOAD, 1, STORE, 2, // else: c = b
        JMP, 25, // 19
        LOAD, 0, STORE, 2, // 21: if: c = a
        HALT, // 25
    ];
    let cpu = assert_halts_at(&words, 26, &[]);
    let frame = cpu.current_frame();
    assert_eq!(
        (frame.variable(0), frame.variable(1), frame.variable(2)),
        (6, 4, 6)
    );
}

/// Multiply a by b through repeated addition.
#[test]
fn multiplication_by_repeated_addition() {
    let words = [
        PUSH, 6, STORE, 0, // a = 6
        PUSH, 4, STORE, 1, // b = 4
        PUSH, 0, STORE, 2, // total = 0
        LOAD, 1, PUSH, 1, ISGE, NOT, // 12: !(b >= 1)
        JIF, 36, // 18
        LOAD, 0, LOAD, 2, ADD, STORE, 2, // total += a
        LOAD, 1, PUSH, 1, SUB, STORE, 1, // b -= 1
        JMP, 12, // 34
        HALT, // 36
    ];
    let cpu = assert_halts_at(&words, 37, &[]);
    let frame = cpu.current_frame();
    assert_eq!(
        (frame.variable(0), frame.variable(1), frame.variable(2)),
        (6, 0, 24)
    );
}

/// max(a, b) as a called function.
#[test]
fn max_of_two_arguments() {
    let words = [
        PUSH, 6, PUSH, 4, CALL, 7, HALT, // 0
        STORE, 1, STORE, 0, // 7: b, a
        LOAD, 0, LOAD, 1, ISGE, // a >= b
        JIF, 21, // 16
        LOAD, 1, RET, // 18: else
        LOAD, 0, RET, // 21: if
    ];
    let cpu = assert_halts_at(&words, 7, &[6]);
    assert_eq!(cpu.call_depth(), 0);
    assert!(cpu.current_frame().variables().is_empty());
}

#[test]
fn max_of_two_arguments_picks_second() {
    let words = [
        PUSH, 3, PUSH, 11, CALL, 7, HALT, STORE, 1, STORE, 0, LOAD, 0, LOAD, 1, ISGE, JIF, 21,
        LOAD, 1, RET, LOAD, 0, RET,
    ];
    assert_halts_at(&words, 7, &[11]);
}
