//! Runtime bytecode of the contracts exercised by tests.

use alloy_primitives::{Bytes, U256};
use alloy_sol_types::{sol, Panic, Revert, SolCall, SolError};
use revm::bytecode::opcode::{
    ADD, BLOCKHASH, CALLDATALOAD, CALLER, DUP1, EQ, INVALID, ISZERO, JUMP, JUMPDEST, JUMPI, MUL,
    NUMBER, PUSH0, SHR, SLOAD, SSTORE, SUB,
};

use super::BytecodeBuilder;

sol! {
    /// The interface of [`multiplier`].
    interface IMultiplier {
        function multiply(uint256 a) external pure returns (uint256);
    }
}

/// A contract whose `multiply(uint256 a)` returns `factor * a`.
///
/// Any other selector reverts with `Error("unknown selector")`.
pub fn multiplier(factor: u64) -> Bytes {
    let body =
        BytecodeBuilder::default().push(4u64).op(CALLDATALOAD).push(factor).op(MUL).return_top();
    let dispatch = BytecodeBuilder::default()
        .op(PUSH0)
        .op(CALLDATALOAD)
        .push(0xe0u64)
        .op(SHR)
        .push_bytes(IMultiplier::multiplyCall::SELECTOR)
        .op(EQ)
        .op(ISZERO);
    // PUSH2 <fallback> JUMPI
    let fallback = dispatch.len() + 4 + body.len();
    dispatch
        .push_offset(fallback)
        .op(JUMPI)
        .raw(body.build())
        .op(JUMPDEST)
        .revert_with_data(Revert { reason: "unknown selector".to_string() }.abi_encode())
        .build()
}

/// A contract that always reverts with `Error(reason)`.
pub fn reverter(reason: &str) -> Bytes {
    BytecodeBuilder::default()
        .revert_with_data(Revert { reason: reason.to_string() }.abi_encode())
        .build()
}

/// A contract that always reverts with `Panic(code)`.
pub fn panicker(code: u64) -> Bytes {
    let data = Panic { code: U256::from(code) }.abi_encode();
    BytecodeBuilder::default().revert_with_data(data).build()
}

/// A contract that always reverts with the given raw data.
pub fn raw_reverter(data: impl AsRef<[u8]>) -> Bytes {
    BytecodeBuilder::default().revert_with_data(data).build()
}

/// A contract that loops until it runs out of gas.
pub fn infinite_loop() -> Bytes {
    BytecodeBuilder::default().op(JUMPDEST).op(PUSH0).op(JUMP).build()
}

/// A contract that executes the designated invalid opcode.
pub fn invalid_opcode() -> Bytes {
    BytecodeBuilder::default().op(INVALID).build()
}

/// A contract that pops from an empty stack.
pub fn stack_underflow() -> Bytes {
    BytecodeBuilder::default().op(ADD).build()
}

/// A contract that increments slot 0 and returns the new value.
pub fn counter() -> Bytes {
    BytecodeBuilder::default()
        .op(PUSH0)
        .op(SLOAD)
        .push(1u64)
        .op(ADD)
        .op(DUP1)
        .op(PUSH0)
        .op(SSTORE)
        .return_top()
        .build()
}

/// A contract that returns its caller as a word.
pub fn caller_echo() -> Bytes {
    BytecodeBuilder::default().op(CALLER).return_top().build()
}

/// A contract that returns the number of the block it executes in.
pub fn block_number() -> Bytes {
    BytecodeBuilder::default().op(NUMBER).return_top().build()
}

/// A contract that returns `BLOCKHASH(NUMBER - distance)`.
pub fn ancestor_hash(distance: u64) -> Bytes {
    BytecodeBuilder::default().push(distance).op(NUMBER).op(SUB).op(BLOCKHASH).return_top().build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiplier_selector_is_pushed() {
        let code = multiplier(7);
        let selector = IMultiplier::multiplyCall::SELECTOR;
        assert!(code.windows(4).any(|window| window == selector));
        assert_eq!(selector, [0xc6, 0x88, 0x8f, 0xa1]);
    }
}
