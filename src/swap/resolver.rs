//! C7 — collapsing a detected swap's subgraph into one `SWAP` edge (spec
//! §4.7, ported from `services/swap_resolver_service.py`).
//!
//! A swap instruction's individual legs (transfers into and out of the pool,
//! any intermediate router hops) are already in the graph by the time this
//! runs. Resolution finds the pool-facing endpoints of that subgraph and
//! replaces the internal detail with a single edge carrying amount_in,
//! amount_out, and fee — the view a consumer of the graph actually wants.

use tracing::warn;

use crate::account::AccountVertex;
use crate::graph::{TransferProperties, TransferType};
use crate::swap::model::PoolAddresses;
use crate::transaction::TransactionContext;

/// Resolves every non-router swap recorded on `ctx`. Router swaps have no
/// pool legs of their own — only the child swaps they dispatch to do — so
/// they're skipped here, same as the original.
pub fn resolve_swap_paths(ctx: &mut TransactionContext) {
    let swap_ids: Vec<u32> = ctx.swaps.iter().filter(|s| !s.router).map(|s| s.id).collect();
    for swap_id in swap_ids {
        resolve_swap(ctx, swap_id);
    }
}

/// Resolves one swap. A no-op (with a warning) if the swap's legs can't be
/// found or connected — a best-effort pass, not a hard invariant the rest of
/// the pipeline depends on.
pub fn resolve_swap(ctx: &mut TransactionContext, swap_id: u32) {
    let Some(swap) = ctx.get_swap(swap_id).cloned() else {
        return;
    };

    let Some(subgraph) = ctx.graph.create_subgraph_for_swap(swap_id) else {
        warn!(swap_id, "no edges found for swap, skipping resolution");
        return;
    };

    let user_source_vertex = subgraph
        .get_nodes_by_address(swap.user_source())
        .into_iter()
        .min_by_key(|v| v.version);
    let user_dest_vertex = subgraph
        .get_nodes_by_address(swap.user_destination())
        .into_iter()
        .max_by_key(|v| v.version);
    let (Some(user_source_vertex), Some(user_dest_vertex)) = (user_source_vertex, user_dest_vertex) else {
        warn!(
            swap_id,
            tx = %ctx.transaction_signature,
            "user vertices not found for swap"
        );
        return;
    };

    let mut swap_pools: Vec<AccountVertex> = Vec::new();
    match &swap.pool_addresses {
        PoolAddresses::Pair(pair) => {
            swap_pools.extend(subgraph.get_nodes_by_address(&pair.destination));
            swap_pools.extend(subgraph.get_nodes_by_address(&pair.source));
        }
        PoolAddresses::Many(addresses) => {
            swap_pools.extend(
                subgraph
                    .nodes()
                    .into_iter()
                    .filter(|v| addresses.contains(&v.address)),
            );
        }
        PoolAddresses::None => {}
    }

    let mut pool_dest_vertices = Vec::new();
    let mut pool_source_vertices = Vec::new();
    for pool in &swap_pools {
        ctx.account_repository.set_is_pool(&pool.address);
        if subgraph.has_path(&user_source_vertex, pool) {
            pool_dest_vertices.push(pool.clone());
        }
        if subgraph.has_path(pool, &user_dest_vertex) {
            pool_source_vertices.push(pool.clone());
        }
    }

    let pool_dest_vertex = pool_dest_vertices.iter().max_by_key(|v| v.version).cloned();
    let pool_source_vertex = pool_source_vertices.iter().min_by_key(|v| v.version).cloned();
    let (Some(pool_dest_vertex), Some(pool_source_vertex)) = (pool_dest_vertex, pool_source_vertex) else {
        warn!(
            swap_id,
            user_source = %user_source_vertex.address,
            user_destination = %user_dest_vertex.address,
            tx = %ctx.transaction_signature,
            "pool vertices not found for swap"
        );
        return;
    };

    let Some(path_a) = subgraph.shortest_path(&user_source_vertex, &pool_dest_vertex) else {
        warn!(swap_id, tx = %ctx.transaction_signature, "no path from user source to pool destination");
        return;
    };
    if path_a.len() < 2 {
        warn!(swap_id, tx = %ctx.transaction_signature, "path from user to pool too short");
        return;
    }
    let last_leg = subgraph.get_edge_data(&path_a[path_a.len() - 2], &path_a[path_a.len() - 1]);
    let amount_in: i128 = last_leg.iter().map(|data| data.amount_destination).sum();
    let swap_transfer_key = last_leg.first().map(|data| data.key + 1).unwrap_or(1);

    let Some(path_b) = subgraph.shortest_path(&pool_source_vertex, &user_dest_vertex) else {
        warn!(swap_id, tx = %ctx.transaction_signature, "no path from pool source to user destination");
        return;
    };
    if path_b.len() < 2 {
        warn!(swap_id, tx = %ctx.transaction_signature, "path from pool to user too short");
        return;
    }
    let first_leg = subgraph.get_edge_data(&path_b[0], &path_b[1]);
    let real_swap_amount_out: i128 = first_leg.iter().map(|data| data.amount_source).sum();

    // amount_out = net inflow to the user's destination account from every
    // other account in the subgraph (transfers where the destination account
    // is on both sides don't count).
    let mut amount_out: i128 = 0;
    for (source, target, data) in subgraph.edges() {
        if source.address == swap.user_destination() && target.address != swap.user_destination() {
            amount_out -= data.amount_source;
        }
        if target.address == swap.user_destination() && source.address != swap.user_destination() {
            amount_out += data.amount_source;
        }
    }

    let fee = real_swap_amount_out - amount_out;
    if let Some(swap_mut) = ctx.get_swap_mut(swap_id) {
        swap_mut.fee = fee;
    }

    ctx.graph.add_edge(
        &pool_dest_vertex,
        &pool_source_vertex,
        TransferProperties::new(TransferType::Swap, swap.program_address.clone(), amount_in, amount_out)
            .with_swap_id(Some(swap_id)),
        Some(swap_transfer_key),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::AccountType;
    use crate::graph::{prepare_destination_account_version, prepare_source_account_version};
    use crate::swap::model::TransferAccountAddresses;
    use std::collections::HashSet;

    fn context() -> TransactionContext {
        TransactionContext::new(1, "sig".into(), HashSet::new(), None, 5000, "payer".into(), 100_000, Vec::new(), None)
    }

    #[test]
    fn resolve_swap_collapses_legs_into_one_swap_edge() {
        let mut ctx = context();
        let sig = ctx.transaction_signature.clone();
        ctx.account_repository.create_account("alice_in", AccountType::Wallet, &sig, None, 1_000, 0);
        ctx.account_repository.create_account("alice_out", AccountType::Wallet, &sig, None, 0, 0);
        ctx.account_repository.create_account("pool", AccountType::Token, &sig, None, 0, 0);

        let swap_id = ctx.add_swap(
            false,
            "prog".into(),
            "test-dex".into(),
            "swap".into(),
            TransferAccountAddresses { source: "alice_in".into(), destination: "alice_out".into() },
            PoolAddresses::Pair(TransferAccountAddresses { source: "pool".into(), destination: "pool".into() }),
            None,
        );

        let src1 = prepare_source_account_version(&mut ctx, "alice_in", Some(100), None, None, None, None, None, None, None);
        let dst1 = prepare_destination_account_version(&mut ctx, &src1, "pool", Some(100), None, None, None, None);
        ctx.graph.add_edge(
            &src1.get_vertex(),
            &dst1.get_vertex(),
            TransferProperties::new(TransferType::Transfer, "prog", 100, 100).with_swap_parent(Some(swap_id)),
            None,
        );

        let src2 = prepare_source_account_version(&mut ctx, "pool", Some(90), None, None, None, None, None, None, None);
        let dst2 = prepare_destination_account_version(&mut ctx, &src2, "alice_out", Some(90), None, None, None, None);
        ctx.graph.add_edge(
            &src2.get_vertex(),
            &dst2.get_vertex(),
            TransferProperties::new(TransferType::Transfer, "prog", 90, 90).with_swap_parent(Some(swap_id)),
            None,
        );

        resolve_swap(&mut ctx, swap_id);

        assert_eq!(ctx.get_swap(swap_id).unwrap().fee, 0);
        let pool_vertex = AccountVertex { address: "pool".into(), version: 0, transaction_signature: sig };
        let swap_edges = ctx.graph.get_edge_data(&pool_vertex, &pool_vertex);
        let swap_edge = swap_edges
            .iter()
            .find(|data| data.transfer_type == TransferType::Swap)
            .expect("resolved swap edge present");
        assert_eq!(swap_edge.amount_source, 100);
        assert_eq!(swap_edge.amount_destination, 90);
        assert_eq!(swap_edge.swap_id, Some(swap_id));
    }

    #[test]
    fn resolve_swap_paths_skips_router_swaps() {
        let mut ctx = context();
        let sig = ctx.transaction_signature.clone();
        ctx.account_repository.create_account("user", AccountType::Wallet, &sig, None, 0, 0);
        ctx.add_swap(
            true,
            "router".into(),
            "jupiter".into(),
            "route".into(),
            TransferAccountAddresses { source: "user".into(), destination: "user".into() },
            PoolAddresses::None,
            None,
        );
        resolve_swap_paths(&mut ctx);
        assert_eq!(ctx.graph.edge_count(), 0);
    }
}
