//! C6/C7 — DEX swap catalog matching, native-SOL inference, and resolution.

pub mod catalog;
pub mod model;
pub mod parser;
pub mod resolver;
pub mod sol_infer;

pub use catalog::{get_program, is_recognized, DexProgram, InstructionMatcher, PoolAccountIndex};
pub use model::{PoolAddresses, Swap, TransferAccountAddresses};
pub use parser::parse_swap;
pub use resolver::{resolve_swap, resolve_swap_paths};
pub use sol_infer::{InferredTransfer, NativeSolTransferInference};
