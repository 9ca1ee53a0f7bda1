use crate::vm::ExecError;

/// Call stack depth of the original COSMAC VIP interpreter.
///
/// The stack is unbounded by default; pass this (or any other bound) to
/// [`CallStack::with_limit`] to emulate the hardware limit.
pub const CLASSIC_STACK_DEPTH: usize = 16;

/// Return-address stack for `2NNN` / `00EE`.
#[derive(Debug, Default)]
pub struct CallStack {
    frames: Vec<u16>,
    limit: Option<usize>,
}

impl CallStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// A stack that refuses to grow past `limit` frames.
    pub fn with_limit(limit: usize) -> Self {
        CallStack {
            frames: Vec::with_capacity(limit),
            limit: Some(limit),
        }
    }

    pub fn push(&mut self, addr: u16) -> Result<(), ExecError> {
        if let Some(limit) = self.limit
            && self.frames.len() >= limit
        {
            return Err(ExecError::StackOverflow { limit });
        }

        self.frames.push(addr);
        Ok(())
    }

    /// Pops the most recent return address. An empty stack means the
    /// program returned without a matching call, which is fatal.
    pub fn pop(&mut self, pc: u16) -> Result<u16, ExecError> {
        self.frames.pop().ok_or(ExecError::StackUnderflow { pc })
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// The stored return addresses, oldest first.
    pub fn frames(&self) -> &[u16] {
        &self.frames
    }
}
