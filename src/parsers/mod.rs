//! C5 — the instruction-parser registry (spec §4.5, ported from
//! `instruction_parsers.py`'s strategy-pattern parser list).
//!
//! Each parser recognizes one instruction shape (by program name + `parsed`
//! type) and turns it into account-version updates and a graph edge.
//! `parse_transfer` tries each registered parser in turn and stops at the
//! first match — order only matters in that no two parsers ever recognize
//! the same instruction.

mod common;
mod compute_budget;
mod stake;
mod system;
mod token;

use std::sync::OnceLock;

use crate::instruction::types::{InstructionId, InstructionTree, ParsedInstruction};
use crate::transaction::TransactionContext;

/// One instruction-recognition strategy.
pub trait InstructionParser: Send + Sync {
    fn can_parse(&self, instruction: &ParsedInstruction) -> bool;
    fn parse(
        &self,
        tree: &InstructionTree,
        instruction_id: InstructionId,
        ctx: &mut TransactionContext,
        swap_parent_id: Option<u32>,
    );
}

fn registry() -> &'static [Box<dyn InstructionParser>] {
    static REGISTRY: OnceLock<Vec<Box<dyn InstructionParser>>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        vec![
            Box::new(system::SystemTransferParser),
            Box::new(token::TokenTransferParser),
            Box::new(token::TokenTransferCheckedParser),
            Box::new(system::CreateAccountParser),
            Box::new(token::CloseAccountParser),
            Box::new(token::BurnParser),
            Box::new(token::MintToParser),
            Box::new(token::SyncNativeParser),
            Box::new(system::SystemAssignParser),
            Box::new(stake::StakeInitializeParser),
            Box::new(stake::StakeWithdrawParser),
            Box::new(stake::StakeSplitParser),
            Box::new(stake::StakeAuthorizeParser),
            Box::new(token::AssociatedTokenAccountCreateParser),
            Box::new(compute_budget::ComputeBudgetSetComputeUnitPriceParser),
        ]
    })
}

/// Tries every registered parser against `instruction_id` in order, applying
/// the first one that recognizes it. Returns whether any parser matched.
pub fn parse_transfer(
    tree: &InstructionTree,
    instruction_id: InstructionId,
    ctx: &mut TransactionContext,
    swap_parent_id: Option<u32>,
) -> bool {
    let instruction = tree.get(instruction_id);
    for parser in registry() {
        if parser.can_parse(instruction) {
            parser.parse(tree, instruction_id, ctx, swap_parent_id);
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrecognized_instruction_is_not_parsed() {
        let mut tree = InstructionTree::default();
        tree.nodes.push(crate::instruction::types::ParsedInstruction {
            program_address: "unknown-program".into(),
            program_name: Some("unknown".into()),
            accounts: vec![],
            parsed: None,
            data: None,
            stack_height: 1,
            parent: None,
            children: vec![],
        });
        let mut ctx = TransactionContext::new(1, "sig".into(), Default::default(), None, 0, "payer".into(), 0, Vec::new(), None);
        assert!(!parse_transfer(&tree, 0, &mut ctx, None));
    }
}
