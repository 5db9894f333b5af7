//! Call frames: one per active call, plus the root frame.

use std::collections::BTreeMap;

/// One call activation.
///
/// Variables are sparse: a slot that was never written reads as 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    /// Instruction index to resume at after RET. Never consumed for the
    /// root frame.
    return_address: usize,
    /// Written variable slots.
    variables: BTreeMap<u32, i32>,
}

impl Frame {
    /// Create a frame that returns to `return_address`.
    pub fn new(return_address: usize) -> Self {
        Self {
            return_address,
            variables: BTreeMap::new(),
        }
    }

    /// The bottom frame of every machine, representing the top-level
    /// program rather than a call.
    pub fn root() -> Self {
        Self::new(0)
    }

    /// Address execution resumes at when this frame is popped.
    pub fn return_address(&self) -> usize {
        self.return_address
    }

    /// Value of `slot`, or 0 if it was never written.
    pub fn variable(&self, slot: u32) -> i32 {
        self.variables.get(&slot).copied().unwrap_or(0)
    }

    /// Write `value` into `slot`.
    pub fn set_variable(&mut self, slot: u32, value: i32) {
        self.variables.insert(slot, value);
    }

    /// Written slots in ascending order.
    pub fn variables(&self) -> &BTreeMap<u32, i32> {
        &self.variables
    }
}
