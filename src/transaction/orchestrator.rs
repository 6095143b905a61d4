//! C8 — the top-level orchestrator (spec §4.8, ported from
//! `transaction_parser_service.py::parse_transaction` /
//! `instruction_parser_service.py` / `_process_instructions`).
//!
//! Ties together every earlier stage: account bootstrapping (C2), the
//! instruction call-stack decoder (C1), the parser registry and swap
//! detector (C5/C6) walked recursively over that tree, fee-transfer
//! synthesis, and swap resolution (C7).

use std::collections::HashSet;

use tracing::info;

use crate::account::{build_accounts_from_transaction, AccountType};
use crate::graph::add_fee_transfers;
use crate::instruction::{get_instruction_call_stack, InstructionId, InstructionTree, ParsedTransactionInput};
use crate::parsers::parse_transfer;
use crate::swap::{parse_swap, resolve_swap_paths};

use super::TransactionContext;

/// Parses one transaction end to end, returning the populated
/// [`TransactionContext`]. If the transaction failed on-chain (`err` is
/// set), accounts are still bootstrapped but no instructions are processed —
/// there is no reliable post-state to build a graph from.
pub fn parse_transaction(input: &ParsedTransactionInput) -> TransactionContext {
    let signer_wallets: HashSet<String> = input
        .account_keys
        .iter()
        .filter(|k| k.signer)
        .map(|k| k.pubkey.clone())
        .collect();
    let account_addresses: Vec<String> = input.account_keys.iter().map(|k| k.pubkey.clone()).collect();
    let fee_payer = account_addresses.first().cloned().unwrap_or_default();

    let mut account_repository = crate::account::AccountRepository::new();
    build_accounts_from_transaction(
        &mut account_repository,
        &input.pre_token_balances,
        &input.pre_balances,
        &account_addresses,
        &signer_wallets,
        &input.signature,
    );

    let tree = match get_instruction_call_stack(input) {
        Ok(tree) => tree,
        Err(e) => {
            tracing::warn!(signature = %input.signature, error = %e, "failed to decode instruction call stack");
            InstructionTree::default()
        }
    };

    let mut ctx = TransactionContext::new(
        input.slot,
        input.signature.clone(),
        signer_wallets,
        input.block_time,
        input.fee as i128,
        fee_payer,
        input.compute_units_consumed,
        tree.nodes.clone(),
        input.err.clone(),
    );
    ctx.account_repository = account_repository;

    if ctx.err.is_some() {
        info!(signature = %ctx.transaction_signature, err = ?ctx.err, "transaction erred, skipping graph construction");
        return ctx;
    }

    for &root in &tree.roots {
        process_instructions(&tree, root, &mut ctx, None, None);
    }

    add_fee_transfers(&mut ctx);
    resolve_swap_paths(&mut ctx);

    ctx
}

/// Recursively walks one instruction and its descendants, mirroring
/// `_process_instructions`'s per-call local `parent_swap_id` /
/// `parent_router_swap_id` — neither ever escapes to a sibling instruction,
/// only down to children.
fn process_instructions(
    tree: &InstructionTree,
    instruction_id: InstructionId,
    ctx: &mut TransactionContext,
    parent_swap_id: Option<u32>,
    parent_router_swap_id: Option<u32>,
) {
    let instruction = tree.get(instruction_id);
    let program_address = instruction.program_address.clone();
    let children = instruction.children.clone();

    if let Some(account) = ctx.account_repository.get_account(&program_address) {
        account.borrow_mut().set_type(AccountType::Program);
    }

    let mut parent_router_swap_id = parent_router_swap_id;
    let transfer_parsed = parse_transfer(tree, instruction_id, ctx, parent_swap_id);

    let inner_parent_swap_id = if !transfer_parsed {
        match parse_swap(tree, instruction_id, ctx, parent_router_swap_id) {
            Some(swap_id) => {
                if ctx.get_swap(swap_id).is_some_and(|s| s.router) {
                    parent_router_swap_id = Some(swap_id);
                }
                Some(swap_id)
            }
            None => parent_swap_id,
        }
    } else {
        parent_swap_id
    };

    for child in children {
        process_instructions(tree, child, ctx, inner_parent_swap_id, parent_router_swap_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::types::{AccountKey, InnerInstructions, RawInstruction};
    use serde_json::json;

    fn transfer_instruction(source: &str, destination: &str, lamports: u64) -> RawInstruction {
        RawInstruction {
            program_id: "11111111111111111111111111111111".into(),
            program_name: Some("system".into()),
            accounts: vec![],
            parsed: Some(json!({
                "type": "transfer",
                "info": {
                    "source": source,
                    "destination": destination,
                    "lamports": lamports,
                }
            })),
            data: None,
            stack_height: None,
        }
    }

    #[test]
    fn erred_transaction_skips_graph_construction() {
        let input = ParsedTransactionInput {
            slot: 1,
            block_time: None,
            signature: "sig".into(),
            err: Some("InstructionError".into()),
            fee: 5000,
            compute_units_consumed: 0,
            account_keys: vec![AccountKey { pubkey: "payer".into(), signer: true }],
            pre_balances: vec![1_000_000],
            post_balances: vec![990_000],
            pre_token_balances: vec![],
            post_token_balances: vec![],
            instructions: vec![transfer_instruction("payer", "dest", 1000)],
            inner_instructions: vec![],
        };

        let ctx = parse_transaction(&input);
        assert!(ctx.err.is_some());
        assert_eq!(ctx.graph.nodes().len(), 0);
    }

    #[test]
    fn simple_transfer_produces_fee_and_transfer_edges() {
        let input = ParsedTransactionInput {
            slot: 1,
            block_time: Some(100),
            signature: "sig".into(),
            err: None,
            fee: 5000,
            compute_units_consumed: 0,
            account_keys: vec![
                AccountKey { pubkey: "payer".into(), signer: true },
                AccountKey { pubkey: "dest".into(), signer: false },
            ],
            pre_balances: vec![1_000_000, 0],
            post_balances: vec![994_000, 1000],
            pre_token_balances: vec![],
            post_token_balances: vec![],
            instructions: vec![transfer_instruction("payer", "dest", 1000)],
            inner_instructions: vec![],
        };

        let ctx = parse_transaction(&input);
        assert!(ctx.err.is_none());
        let edges = ctx.graph.edges();
        assert!(edges.iter().any(|(_, _, data)| matches!(data.transfer_type, crate::graph::TransferType::Transfer)));
        assert!(edges.iter().any(|(_, _, data)| matches!(data.transfer_type, crate::graph::TransferType::Fee)));
    }

    #[test]
    fn inner_instructions_recurse_with_parent_swap_tracking() {
        let mut input = ParsedTransactionInput {
            slot: 1,
            block_time: None,
            signature: "sig".into(),
            err: None,
            fee: 5000,
            compute_units_consumed: 0,
            account_keys: vec![
                AccountKey { pubkey: "payer".into(), signer: true },
                AccountKey { pubkey: "dest".into(), signer: false },
            ],
            pre_balances: vec![1_000_000, 0],
            post_balances: vec![993_000, 1000],
            pre_token_balances: vec![],
            post_token_balances: vec![],
            instructions: vec![RawInstruction {
                program_id: "router".into(),
                program_name: None,
                accounts: vec![],
                parsed: None,
                data: None,
                stack_height: None,
            }],
            inner_instructions: vec![],
        };
        input.inner_instructions = vec![InnerInstructions {
            index: 0,
            instructions: vec![transfer_instruction("payer", "dest", 1000).with_stack_height(2)],
        }];

        let ctx = parse_transaction(&input);
        assert!(ctx.err.is_none());
        let edges = ctx.graph.edges();
        assert!(edges.iter().any(|(_, _, data)| matches!(data.transfer_type, crate::graph::TransferType::Transfer)));
    }

    trait WithStackHeight {
        fn with_stack_height(self, h: u32) -> Self;
    }
    impl WithStackHeight for RawInstruction {
        fn with_stack_height(mut self, h: u32) -> Self {
            self.stack_height = Some(h);
            self
        }
    }
}
