//! C1 — instruction call-stack decoding.

pub mod call_stack;
pub mod types;
pub mod utils;

pub use call_stack::get_instruction_call_stack;
pub use types::{
    AccountKey, InnerInstructions, InstructionId, InstructionTree, ParsedInstruction,
    ParsedTransactionInput, RawInstruction, TokenBalance,
};
