//! Property test: however transfers are chained, the value-flow graph the
//! orchestrator builds must stay acyclic (spec §4.4's re-versioning guard).

use proptest::prelude::*;
use serde_json::json;

use solana_tx_graph::instruction::{AccountKey, ParsedTransactionInput, RawInstruction};
use solana_tx_graph::transaction::parse_transaction;

const ADDRESSES: [&str; 4] = ["W1", "W2", "W3", "W4"];

fn transfer(source: &str, destination: &str, lamports: u64) -> RawInstruction {
    RawInstruction {
        program_id: "11111111111111111111111111111111111111111".to_string(),
        program_name: Some("system".to_string()),
        accounts: vec![source.to_string(), destination.to_string()],
        parsed: Some(json!({
            "type": "transfer",
            "info": { "source": source, "destination": destination, "lamports": lamports },
        })),
        data: None,
        stack_height: None,
    }
}

fn build_input(transfers: &[(usize, usize, u64)]) -> ParsedTransactionInput {
    let account_keys: Vec<AccountKey> = ADDRESSES
        .iter()
        .enumerate()
        .map(|(i, addr)| AccountKey { pubkey: addr.to_string(), signer: i == 0 })
        .collect();
    let pre_balances = vec![10_000_000_000u64; ADDRESSES.len()];

    let instructions = transfers
        .iter()
        .map(|&(src, dst, lamports)| transfer(ADDRESSES[src], ADDRESSES[dst], lamports))
        .collect();

    ParsedTransactionInput {
        slot: 1,
        block_time: None,
        signature: "sig-proptest".to_string(),
        err: None,
        fee: 5000,
        compute_units_consumed: 100_000,
        account_keys,
        pre_balances: pre_balances.clone(),
        post_balances: pre_balances,
        pre_token_balances: Vec::new(),
        post_token_balances: Vec::new(),
        instructions,
        inner_instructions: Vec::new(),
    }
}

fn graph_is_acyclic(graph: &solana_tx_graph::graph::TransactionGraph) -> bool {
    let nodes = graph.nodes();
    for a in &nodes {
        for b in &nodes {
            if a != b && graph.has_path(a, b) && graph.has_path(b, a) {
                return false;
            }
        }
    }
    true
}

proptest! {
    #[test]
    fn transfer_chains_never_introduce_a_cycle(
        transfers in prop::collection::vec(
            (0usize..ADDRESSES.len(), 0usize..ADDRESSES.len(), 1u64..1_000_000u64),
            0..12,
        )
    ) {
        let transfers: Vec<_> = transfers.into_iter().filter(|&(s, d, _)| s != d).collect();
        let input = build_input(&transfers);
        let ctx = parse_transaction(&input);
        prop_assert!(graph_is_acyclic(&ctx.graph));
    }
}
