//! Compute Budget Program: `SetComputeUnitPrice` (discriminator `0x03`).

use crate::constants::COMPUTE_BUDGET_PROGRAM;
use crate::instruction::types::{InstructionId, InstructionTree, ParsedInstruction};
use crate::instruction::utils::{decode_discriminator, decode_instruction_data};
use crate::transaction::TransactionContext;

use super::InstructionParser;

pub struct ComputeBudgetSetComputeUnitPriceParser;

impl InstructionParser for ComputeBudgetSetComputeUnitPriceParser {
    fn can_parse(&self, instruction: &ParsedInstruction) -> bool {
        if instruction.program_address != COMPUTE_BUDGET_PROGRAM {
            return false;
        }
        let Some(data) = &instruction.data else { return false };
        let Ok(bytes) = decode_instruction_data(data) else { return false };
        decode_discriminator(&bytes, 1) == "03"
    }

    fn parse(&self, tree: &InstructionTree, instruction_id: InstructionId, ctx: &mut TransactionContext, _swap_parent_id: Option<u32>) {
        let instruction = tree.get(instruction_id);
        let Some(data) = &instruction.data else { return };
        let Ok(bytes) = decode_instruction_data(data) else { return };
        if bytes.len() < 9 {
            return;
        }
        let mut buf = [0u8; 8];
        buf.copy_from_slice(&bytes[1..9]);
        let micro_lamport = u64::from_le_bytes(buf) as i128;
        ctx.compute_priority_fee(micro_lamport);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_set_compute_unit_price_discriminator() {
        let mut bytes = vec![0x03u8];
        bytes.extend_from_slice(&500u64.to_le_bytes());
        let data = bs58::encode(bytes).into_string();
        let instruction = ParsedInstruction {
            program_address: COMPUTE_BUDGET_PROGRAM.to_string(),
            program_name: None,
            accounts: vec![],
            parsed: None,
            data: Some(data),
            stack_height: 1,
            parent: None,
            children: vec![],
        };
        let parser = ComputeBudgetSetComputeUnitPriceParser;
        assert!(parser.can_parse(&instruction));
    }
}
