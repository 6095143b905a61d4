//! Native-SOL transfer inference (spec §4.6, ported from `sol_infer.py`).
//!
//! Some DEX programs move SOL as a raw system-program lamport transfer nested
//! inside the swap instruction's own inner instructions (or encoded directly
//! in the swap instruction's own data) rather than through an SPL-token
//! transfer the generic parsers would already catch. These two strategies
//! recover that leg so it still shows up as an edge in the graph.

use crate::instruction::types::{InstructionId, InstructionTree};
use crate::instruction::utils::{decode_discriminator, decode_instruction_data};
use crate::swap::model::{Swap, TransferAccountAddresses};

pub struct InferredTransfer {
    pub accounts: TransferAccountAddresses,
    pub amount: i128,
}

/// Strategy for recovering a swap's native-SOL leg.
#[derive(Debug, Clone)]
pub enum NativeSolTransferInference {
    /// Find a nested inner instruction of `program_address` whose
    /// discriminator matches, then unpack the SOL amount out of its data
    /// using `format` (little-endian: an opaque prefix of `prefix_len` bytes,
    /// then a `u64` amount).
    InnerInstruction {
        program_address: &'static str,
        discriminator: &'static str,
        prefix_len: usize,
    },
    /// Unpack the SOL amount directly out of the swap instruction's own data.
    SwapInstruction { prefix_len: usize },
}

impl NativeSolTransferInference {
    pub fn infer(
        &self,
        tree: &InstructionTree,
        swap_instruction_id: InstructionId,
        swap: &Swap,
    ) -> Option<InferredTransfer> {
        let pool_source = match &swap.pool_addresses {
            crate::swap::model::PoolAddresses::Pair(pair) => pair.source.clone(),
            _ => return None,
        };
        let accounts = TransferAccountAddresses {
            source: pool_source,
            destination: swap.user_destination().to_string(),
        };

        match self {
            NativeSolTransferInference::InnerInstruction { program_address, discriminator, prefix_len } => {
                let swap_node = tree.get(swap_instruction_id);
                for &child_id in &swap_node.children {
                    let child = tree.get(child_id);
                    if child.program_address != *program_address {
                        continue;
                    }
                    let Some(data) = &child.data else { continue };
                    let Ok(bytes) = decode_instruction_data(data) else { continue };
                    let found = decode_discriminator(&bytes, discriminator.len() / 2);
                    if found != *discriminator {
                        continue;
                    }
                    let amount = unpack_u64_after_prefix(&bytes, *prefix_len)?;
                    return Some(InferredTransfer { accounts, amount });
                }
                None
            }
            NativeSolTransferInference::SwapInstruction { prefix_len } => {
                let node = tree.get(swap_instruction_id);
                let data = node.data.as_ref()?;
                let bytes = decode_instruction_data(data).ok()?;
                let amount = unpack_u64_after_prefix(&bytes, *prefix_len)?;
                Some(InferredTransfer { accounts, amount })
            }
        }
    }
}

fn unpack_u64_after_prefix(bytes: &[u8], prefix_len: usize) -> Option<i128> {
    let start = prefix_len;
    let end = start + 8;
    if bytes.len() < end {
        return None;
    }
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[start..end]);
    Some(u64::from_le_bytes(buf) as i128)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unpack_reads_little_endian_u64_after_prefix() {
        let mut bytes = vec![0xAA; 48];
        bytes.extend_from_slice(&1_500_000u64.to_le_bytes());
        assert_eq!(unpack_u64_after_prefix(&bytes, 48), Some(1_500_000));
    }

    #[test]
    fn unpack_returns_none_on_short_buffer() {
        let bytes = vec![0u8; 10];
        assert_eq!(unpack_u64_after_prefix(&bytes, 48), None);
    }
}
