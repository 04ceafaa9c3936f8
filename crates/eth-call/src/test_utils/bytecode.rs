//! A small assembler for the contracts used in tests.

use alloy_primitives::{ruint::UintTryFrom, Bytes, U256};
use revm::bytecode::opcode::{CODECOPY, DUP1, MSTORE, PUSH0, PUSH1, PUSH2, RETURN, REVERT};

/// Assembles EVM bytecode one instruction at a time.
#[derive(Debug, Default, Clone)]
pub struct BytecodeBuilder {
    code: Vec<u8>,
}

impl BytecodeBuilder {
    /// Finishes the bytecode.
    pub fn build(self) -> Bytes {
        self.code.into()
    }

    /// Current length, i.e. the offset of the next instruction.
    pub fn len(&self) -> usize {
        self.code.len()
    }

    /// Whether nothing has been emitted yet.
    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// Emits one opcode.
    pub fn op(mut self, opcode: u8) -> Self {
        self.code.push(opcode);
        self
    }

    /// Emits raw bytes.
    pub fn raw(mut self, bytes: impl AsRef<[u8]>) -> Self {
        self.code.extend_from_slice(bytes.as_ref());
        self
    }

    /// Pushes `bytes` as-is, using the PUSH of matching width.
    pub fn push_bytes(mut self, bytes: impl AsRef<[u8]>) -> Self {
        let bytes = bytes.as_ref();
        assert!(bytes.len() <= 32, "push wider than a word");
        self.code.push(PUSH0 + bytes.len() as u8);
        self.code.extend_from_slice(bytes);
        self
    }

    /// Pushes `value` with the narrowest PUSH, `PUSH0` for zero.
    pub fn push<T>(self, value: T) -> Self
    where
        U256: UintTryFrom<T>,
    {
        let value = U256::from(value);
        let bytes = value.to_be_bytes_trimmed_vec();
        self.push_bytes(bytes)
    }

    /// Pushes a code offset as a fixed-width `PUSH2`, so jump targets can be computed up front.
    pub fn push_offset(mut self, offset: usize) -> Self {
        assert!(offset <= u16::MAX as usize, "code offset wider than two bytes");
        self.code.push(PUSH2);
        self.code.extend_from_slice(&(offset as u16).to_be_bytes());
        self
    }

    /// Writes `bytes` to memory at `offset`, one word at a time.
    pub fn mstore(self, offset: usize, bytes: impl AsRef<[u8]>) -> Self {
        bytes.as_ref().chunks(32).enumerate().fold(self, |this, (i, chunk)| {
            let mut word = [0u8; 32];
            word[..chunk.len()].copy_from_slice(chunk);
            this.push_bytes(word).push(offset + i * 32).op(MSTORE)
        })
    }

    /// Returns the word on top of the stack.
    pub fn return_top(self) -> Self {
        self.op(PUSH0).op(MSTORE).op(PUSH1).op(32).op(PUSH0).op(RETURN)
    }

    /// Reverts with `data`.
    pub fn revert_with_data(self, data: impl AsRef<[u8]>) -> Self {
        let len = data.as_ref().len();
        self.mstore(0, data).push(len).op(PUSH0).op(REVERT)
    }
}

/// Wraps `runtime` in init code that deploys it unchanged.
pub fn initcode(runtime: impl AsRef<[u8]>) -> Bytes {
    let runtime = runtime.as_ref();
    // PUSH2 len, DUP1, PUSH2 offset, PUSH0, CODECOPY, PUSH0, RETURN
    const PREFIX_LEN: usize = 11;
    let prefix = BytecodeBuilder::default()
        .push_offset(runtime.len())
        .op(DUP1)
        .push_offset(PREFIX_LEN)
        .op(PUSH0)
        .op(CODECOPY)
        .op(PUSH0)
        .op(RETURN);
    debug_assert_eq!(prefix.len(), PREFIX_LEN);
    prefix.raw(runtime).build()
}
