//! C10 — the frontend-facing graph serializer (spec §4.10, ported from
//! `services/graph_service.py`).
//!
//! Flattens a [`TransactionContext`] (or a whole [`Graphspace`]) into the
//! plain `nodes` / `links` / `transactions` shape an external caller can
//! hand straight to a visualization layer, deriving two things the raw graph
//! doesn't carry directly: whether an account address is a valid ed25519
//! curve point (a wallet can sign for it), and a per-mint USD price ratio
//! propagated outward from swap edges touching a reference coin.

use std::collections::HashMap;
use std::str::FromStr;

use serde::Serialize;
use solana_sdk::pubkey::Pubkey;
use tracing::warn;

use crate::account::{AccountType, AccountVertex};
use crate::constants::reference_coin_price;
use crate::graph::TransferType;
use crate::graphspace::Graphspace;
use crate::transaction::TransactionContext;

#[derive(Debug, Clone, Serialize)]
pub struct NodeData {
    pub account_vertex: AccountVertex,
    pub mint_address: Option<String>,
    pub owner: Option<String>,
    pub authorities: Vec<String>,
    pub balance_token: i128,
    pub balance_lamport: i128,
    pub account_type: AccountType,
    pub is_pool: bool,
    pub is_on_curve: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkData {
    pub key: u64,
    pub program_address: String,
    pub source_account_vertex: AccountVertex,
    pub target_account_vertex: AccountVertex,
    pub amount_source: i128,
    pub amount_destination: i128,
    pub transfer_type: TransferType,
    pub transaction_signature: String,
    pub swap_id: Option<u32>,
    pub swap_parent_id: Option<u32>,
    pub parent_router_swap_id: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SwapData {
    pub id: u32,
    pub program_address: String,
    pub router: bool,
    pub instruction_name: String,
    pub user_source: String,
    pub user_destination: String,
    pub pool_addresses: Vec<String>,
    pub fee: i128,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionData {
    pub fee: i128,
    pub priority_fee: i128,
    pub signers: Vec<String>,
    pub swaps: Vec<SwapData>,
    pub mint_usd_price_ratio: HashMap<String, f64>,
    pub isomorphic_group: Option<u32>,
    pub timestamp_millis: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct GraphData {
    pub transactions: HashMap<String, TransactionData>,
    pub nodes: Vec<NodeData>,
    pub links: Vec<LinkData>,
}

fn is_on_curve(address: &str, account_type: AccountType) -> bool {
    if matches!(account_type, AccountType::Burn | AccountType::Fee | AccountType::MintTo | AccountType::Unknown) {
        return false;
    }
    Pubkey::from_str(address).map(|p| p.is_on_curve()).unwrap_or(false)
}

fn nodes_for(context: &TransactionContext) -> Vec<NodeData> {
    let mut nodes = Vec::new();
    for address in context.account_repository.get_all_addresses() {
        for version in 0.. {
            let Some(v) = context.account_repository.get_version(address, version) else { break };
            let vertex = v.get_vertex();
            if !context.graph.has_node(&vertex) {
                continue;
            }
            let account = v.account.borrow();
            nodes.push(NodeData {
                account_vertex: vertex,
                mint_address: account.mint_address.clone(),
                owner: v.owner.clone(),
                authorities: account.authorities().to_vec(),
                balance_token: v.balance_token,
                balance_lamport: v.balance_lamport,
                account_type: account.account_type,
                is_pool: account.is_pool,
                is_on_curve: is_on_curve(address, account.account_type),
            });
        }
    }
    nodes
}

fn links_for(context: &TransactionContext) -> Vec<LinkData> {
    let swap_ids: std::collections::HashSet<u32> = context.swaps.iter().map(|s| s.id).collect();
    let mut edges = context.graph.edges();
    edges.sort_by_key(|(_, _, data)| data.key);

    edges
        .into_iter()
        .map(|(source, target, data)| LinkData {
            key: data.key,
            program_address: data.program_address.clone(),
            source_account_vertex: source,
            target_account_vertex: target,
            amount_source: data.amount_source,
            amount_destination: data.amount_destination,
            transfer_type: data.transfer_type,
            transaction_signature: context.transaction_signature.clone(),
            swap_id: matches!(data.transfer_type, TransferType::Swap).then_some(data.swap_id).flatten(),
            swap_parent_id: data.swap_parent_id.filter(|id| swap_ids.contains(id)),
            parent_router_swap_id: data.parent_router_swap_id.filter(|id| swap_ids.contains(id)),
        })
        .collect()
}

fn swaps_for(context: &TransactionContext) -> Vec<SwapData> {
    context
        .swaps
        .iter()
        .map(|swap| SwapData {
            id: swap.id,
            program_address: swap.program_address.clone(),
            router: swap.router,
            instruction_name: swap.instruction_name.clone(),
            user_source: swap.user_source().to_string(),
            user_destination: swap.user_destination().to_string(),
            pool_addresses: if swap.router { Vec::new() } else { swap.pool_addresses_list() },
            fee: swap.fee,
        })
        .collect()
}

/// Propagates USD price ratios outward from the reference coins along SWAP
/// edges until no swap can contribute a new mint, capped at `2 * swap_count`
/// iterations (ported from `_derive_usd_price_ratio`).
fn derive_mint_usd_price_ratio(context: &TransactionContext, sol_usd_price: f64) -> HashMap<String, f64> {
    let swap_edges: Vec<_> = context
        .graph
        .edges()
        .into_iter()
        .filter(|(_, _, data)| matches!(data.transfer_type, TransferType::Swap))
        .collect();

    let mut prices: HashMap<String, f64> = HashMap::new();
    for address in context.account_repository.get_all_addresses() {
        if let Some(account) = context.account_repository.get_account(address) {
            if let Some(mint) = &account.borrow().mint_address {
                if let Some(price) = reference_coin_price(mint, sol_usd_price) {
                    prices.entry(mint.clone()).or_insert(price);
                }
            }
        }
    }

    let max_iterations = swap_edges.len() * 2;
    let mut iterations = 0;
    let mut made_progress = true;
    while made_progress && iterations < max_iterations {
        made_progress = false;
        iterations += 1;

        for (source, destination, data) in &swap_edges {
            if data.amount_source <= 0 || data.amount_destination <= 0 {
                continue;
            }
            let Some(mint_source) = mint_of(context, &source.address) else { continue };
            let Some(mint_destination) = mint_of(context, &destination.address) else { continue };

            let source_known = prices.contains_key(&mint_source);
            let dest_known = prices.contains_key(&mint_destination);

            if source_known && !dest_known {
                let price = prices[&mint_source] * data.amount_source as f64 / data.amount_destination as f64;
                prices.insert(mint_destination, price);
                made_progress = true;
            } else if dest_known && !source_known {
                let price = prices[&mint_destination] * data.amount_destination as f64 / data.amount_source as f64;
                prices.insert(mint_source, price);
                made_progress = true;
            }
        }
    }

    if iterations >= max_iterations && made_progress {
        warn!(
            signature = %context.transaction_signature,
            unresolved = swap_edges.len(),
            "mint USD price-ratio derivation hit its iteration cap"
        );
    }

    prices
}

fn mint_of(context: &TransactionContext, address: &str) -> Option<String> {
    context.account_repository.get_account(address)?.borrow().mint_address.clone()
}

fn transaction_data(context: &TransactionContext, sol_usd_price: f64) -> TransactionData {
    TransactionData {
        fee: context.fee,
        priority_fee: context.priority_fee,
        signers: context.signer_wallets.iter().cloned().collect(),
        swaps: swaps_for(context),
        mint_usd_price_ratio: derive_mint_usd_price_ratio(context, sol_usd_price),
        isomorphic_group: context.isomorphic_group,
        timestamp_millis: context.block_time.map(|t| t * 1000),
    }
}

/// Serializes one transaction context, given the USD price of SOL at its
/// block time (fetched out-of-band via [`crate::external::SolPriceFetcher`]).
pub fn get_graph_data(context: &TransactionContext, sol_usd_price: f64) -> GraphData {
    let mut graph_data = GraphData::default();
    graph_data.nodes.extend(nodes_for(context));
    graph_data.links.extend(links_for(context));
    graph_data
        .transactions
        .insert(context.transaction_signature.clone(), transaction_data(context, sol_usd_price));
    graph_data
}

/// Serializes a whole graphspace. `sol_usd_prices` maps each context's
/// block-time-in-millis to the batch-fetched SOL price for that timestamp.
pub fn get_graph_data_from_graphspace(graphspace: &Graphspace, sol_usd_prices: &HashMap<i64, f64>) -> GraphData {
    let mut graph_data = GraphData::default();
    for context in graphspace.transaction_contexts.values() {
        graph_data.nodes.extend(nodes_for(context));
        graph_data.links.extend(links_for(context));
        let timestamp = context.block_time.map(|t| t * 1000).unwrap_or(0);
        let sol_usd_price = sol_usd_prices.get(&timestamp).copied().unwrap_or(0.0);
        graph_data
            .transactions
            .insert(context.transaction_signature.clone(), transaction_data(context, sol_usd_price));
    }
    graph_data
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn base_context() -> TransactionContext {
        TransactionContext::new(1, "sig".into(), HashSet::new(), Some(1_700_000_000), 5000, "payer".into(), 0, Vec::new(), None)
    }

    #[test]
    fn empty_context_serializes_with_no_nodes_or_links() {
        let context = base_context();
        let data = get_graph_data(&context, 150.0);
        assert!(data.nodes.is_empty());
        assert!(data.links.is_empty());
        assert_eq!(data.transactions.len(), 1);
    }

    #[test]
    fn stable_mint_seeds_price_at_one() {
        let context = base_context();
        let prices = derive_mint_usd_price_ratio(&context, 150.0);
        assert!(prices.is_empty());
    }

    #[test]
    fn unrecognized_account_type_is_never_on_curve() {
        assert!(!is_on_curve("So11111111111111111111111111111111111111112", AccountType::Unknown));
    }
}
