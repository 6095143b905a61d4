//! Per-transaction parse state (spec §4.7, ported from
//! `models/transaction_context.py`).

use std::collections::HashSet;

use tracing::warn;

use crate::account::AccountRepository;
use crate::graph::TransactionGraph;
use crate::instruction::types::ParsedInstruction;
use crate::swap::{Swap, TransferAccountAddresses, PoolAddresses};

const MAX_REASONABLE_PRIORITY_FEE: i128 = 1_000_000_000;

/// Everything the instruction-parser registry (C5) and swap resolver (C7)
/// thread through while walking one transaction's instruction tree.
pub struct TransactionContext {
    pub slot: u64,
    pub transaction_signature: String,
    pub graph: TransactionGraph,
    pub account_repository: AccountRepository,
    pub signer_wallets: HashSet<String>,
    pub block_time: Option<i64>,
    pub fee: i128,
    pub fee_payer: String,
    pub compute_units_consumed: u64,
    pub priority_fee: i128,
    pub swaps: Vec<Swap>,
    pub swap_id_counter: u32,
    pub instructions: Vec<ParsedInstruction>,
    pub isomorphic_group: Option<u32>,
    pub err: Option<String>,
}

impl TransactionContext {
    pub fn new(
        slot: u64,
        transaction_signature: String,
        signer_wallets: HashSet<String>,
        block_time: Option<i64>,
        fee: i128,
        fee_payer: String,
        compute_units_consumed: u64,
        instructions: Vec<ParsedInstruction>,
        err: Option<String>,
    ) -> Self {
        TransactionContext {
            slot,
            transaction_signature,
            graph: TransactionGraph::new(),
            account_repository: AccountRepository::new(),
            signer_wallets,
            block_time,
            fee,
            fee_payer,
            compute_units_consumed,
            priority_fee: 0,
            swaps: Vec::new(),
            swap_id_counter: 0,
            instructions,
            isomorphic_group: None,
            err,
        }
    }

    /// `priority_fee = microLamportsPerCu * computeUnitsConsumed / 1_000_000`,
    /// capped at 1 SOL with a warning (the original treats a larger value as
    /// evidence of a parsing error rather than a real fee).
    pub fn compute_priority_fee(&mut self, micro_lamport: i128) {
        if micro_lamport == 0 || self.compute_units_consumed == 0 {
            self.priority_fee = 0;
            return;
        }

        self.priority_fee = (micro_lamport * self.compute_units_consumed as i128) / 1_000_000;
        if self.priority_fee > MAX_REASONABLE_PRIORITY_FEE {
            warn!(
                computed = %self.priority_fee,
                cap = MAX_REASONABLE_PRIORITY_FEE,
                "computed priority fee exceeds reasonable maximum, capping"
            );
            self.priority_fee = MAX_REASONABLE_PRIORITY_FEE;
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add_swap(
        &mut self,
        router: bool,
        program_address: String,
        program_name: String,
        instruction_name: String,
        user_addresses: TransferAccountAddresses,
        pool_addresses: PoolAddresses,
        parent_router_swap_id: Option<u32>,
    ) -> u32 {
        self.swap_id_counter += 1;
        let id = self.swap_id_counter;
        self.swaps.push(Swap {
            id,
            router,
            program_address,
            program_name,
            instruction_name,
            user_addresses,
            pool_addresses,
            parent_router_swap_id,
            program_account_vertex: None,
            fee: 0,
        });
        id
    }

    /// Swap ids are 1-indexed, matching how they're handed out.
    pub fn get_swap(&self, id: u32) -> Option<&Swap> {
        self.swaps.get((id - 1) as usize)
    }

    pub fn get_swap_mut(&mut self, id: u32) -> Option<&mut Swap> {
        self.swaps.get_mut((id - 1) as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> TransactionContext {
        TransactionContext::new(1, "sig".into(), HashSet::new(), None, 5000, "payer".into(), 100_000, Vec::new(), None)
    }

    #[test]
    fn priority_fee_is_zero_with_no_compute_units() {
        let mut ctx = context();
        ctx.compute_units_consumed = 0;
        ctx.compute_priority_fee(500);
        assert_eq!(ctx.priority_fee, 0);
    }

    #[test]
    fn priority_fee_caps_at_one_sol() {
        let mut ctx = context();
        ctx.compute_units_consumed = 1_400_000;
        ctx.compute_priority_fee(i128::from(u64::MAX));
        assert_eq!(ctx.priority_fee, MAX_REASONABLE_PRIORITY_FEE);
    }

    #[test]
    fn swaps_are_retrieved_one_indexed() {
        let mut ctx = context();
        let id = ctx.add_swap(
            false,
            "prog".into(),
            "pumpfun".into(),
            "buy".into(),
            TransferAccountAddresses { source: "a".into(), destination: "b".into() },
            PoolAddresses::None,
            None,
        );
        assert_eq!(id, 1);
        assert_eq!(ctx.get_swap(1).unwrap().program_name, "pumpfun");
        assert!(ctx.get_swap(2).is_none());
    }
}
