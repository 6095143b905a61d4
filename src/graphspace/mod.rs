//! C9 — the graphspace composer (spec §4.9, ported from
//! `models/graphspace.py` / `services/graph_service.py::analyse_isomorphic_transactions`).
//!
//! Merges several transactions' graphs into one, ordered chronologically
//! (slot, then intra-block signature position for transactions sharing a
//! slot), and groups transactions whose graph shape recurs (the same DEX
//! route taken by many wallets in a block looks identical once addresses are
//! erased) so a caller can render one of them as a representative.

use std::collections::HashMap;

use petgraph::graph::UnGraph;

use crate::account::AccountVertex;
use crate::graph::{TransactionGraph, TransferProperties, TransferType};
use crate::transaction::TransactionContext;

/// A set of transaction contexts merged into a single graph, in chronological
/// order.
pub struct Graphspace {
    pub transaction_contexts: HashMap<String, TransactionContext>,
    pub graph: TransactionGraph,
}

impl Graphspace {
    /// Builds the merged graph from `contexts`, keyed by signature.
    ///
    /// `block_signature_order` supplies, for any slot containing more than
    /// one of these transactions, the full in-block signature order (fetched
    /// out-of-band — see [`crate::external::BlockSignatureFetcher`]); slots
    /// absent from the map fall back to the contexts' relative input order.
    /// When `link_transactions` is set, a [`TransferType::NewTransaction`]
    /// edge is added from each account's last version in one transaction to
    /// its first version in the next, chaining per-account state across the
    /// whole graphspace.
    pub fn build(
        contexts: Vec<TransactionContext>,
        block_signature_order: &HashMap<u64, Vec<String>>,
        link_transactions: bool,
    ) -> Self {
        let ordered = order_contexts(contexts, block_signature_order);

        let mut graph = TransactionGraph::new();
        for context in &ordered {
            graph.add_graph(&context.graph);
        }
        if link_transactions {
            link_transaction_graphs(&mut graph, &ordered);
        }

        let transaction_contexts = ordered
            .into_iter()
            .map(|ctx| (ctx.transaction_signature.clone(), ctx))
            .collect();

        Graphspace { transaction_contexts, graph }
    }

    /// Assigns every transaction whose graph shape (addresses erased, parallel
    /// edges collapsed) matches another's to a shared 1-indexed isomorphic
    /// group. Transactions with no match keep `isomorphic_group = None`.
    pub fn analyse_isomorphic_transactions(&mut self) {
        let shapes: Vec<(String, UnGraph<(), ()>)> = self
            .transaction_contexts
            .iter()
            .map(|(sig, ctx)| (sig.clone(), shape_graph(&ctx.graph)))
            .collect();

        let mut assigned: HashMap<String, u32> = HashMap::new();
        let mut next_group = 0u32;

        for (i, (sig_a, graph_a)) in shapes.iter().enumerate() {
            if assigned.contains_key(sig_a) {
                continue;
            }
            for (sig_b, graph_b) in shapes.iter().skip(i + 1) {
                if assigned.contains_key(sig_b) {
                    continue;
                }
                if petgraph::algo::is_isomorphic(graph_a, graph_b) {
                    if !assigned.contains_key(sig_a) {
                        next_group += 1;
                        assigned.insert(sig_a.clone(), next_group);
                    }
                    assigned.insert(sig_b.clone(), assigned[sig_a]);
                }
            }
        }

        for (sig, group) in assigned {
            if let Some(ctx) = self.transaction_contexts.get_mut(&sig) {
                ctx.isomorphic_group = Some(group);
            }
        }
    }
}

fn order_contexts(
    contexts: Vec<TransactionContext>,
    block_signature_order: &HashMap<u64, Vec<String>>,
) -> Vec<TransactionContext> {
    let mut by_slot: HashMap<u64, Vec<TransactionContext>> = HashMap::new();
    let mut slot_order: Vec<u64> = Vec::new();
    for ctx in contexts {
        if !by_slot.contains_key(&ctx.slot) {
            slot_order.push(ctx.slot);
        }
        by_slot.entry(ctx.slot).or_default().push(ctx);
    }
    slot_order.sort_unstable();

    let mut ordered = Vec::new();
    for slot in slot_order {
        let mut group = by_slot.remove(&slot).unwrap_or_default();
        if group.len() > 1 {
            if let Some(block_order) = block_signature_order.get(&slot) {
                group.sort_by_key(|ctx| {
                    block_order
                        .iter()
                        .position(|sig| sig == &ctx.transaction_signature)
                        .unwrap_or(usize::MAX)
                });
            }
        }
        ordered.extend(group);
    }
    ordered
}

/// Links, per address, its terminal version in one transaction to its
/// version-0 node in the next context (in composed order) whose graph
/// touches that same address — not necessarily the immediately adjacent
/// transaction (ported from `_link_transaction_graphs`).
fn link_transaction_graphs(graph: &mut TransactionGraph, ordered: &[TransactionContext]) {
    let mut pending: HashMap<String, AccountVertex> = HashMap::new();

    for context in ordered {
        let pre: HashMap<String, AccountVertex> = context
            .account_repository
            .get_pre_state_accounts()
            .into_iter()
            .map(|v| (v.address(), v.get_vertex()))
            .collect();

        for (address, terminal) in pending.drain().collect::<Vec<_>>() {
            if let Some(entry) = pre.get(&address) {
                graph.add_edge(&terminal, entry, TransferProperties::new(TransferType::NewTransaction, "", 0, 0), None);
            } else {
                pending.insert(address, terminal);
            }
        }

        for post in context.account_repository.get_post_state_accounts() {
            pending.insert(post.address(), post.get_vertex());
        }
    }
}

/// Collapses a transaction graph's parallel edges between the same address
/// pair into one, erases account identity (version, balances, signature),
/// and drops direction — the shape two independently-versioned but
/// structurally identical swaps share (ported from `convert_dag_to_cyclicgraph`).
fn shape_graph(graph: &TransactionGraph) -> UnGraph<(), ()> {
    let mut shape = UnGraph::<(), ()>::new_undirected();
    let mut index: HashMap<String, petgraph::graph::NodeIndex> = HashMap::new();
    let mut seen: std::collections::HashSet<(String, String)> = std::collections::HashSet::new();

    let mut node_for = |address: &str, shape: &mut UnGraph<(), ()>, index: &mut HashMap<String, petgraph::graph::NodeIndex>| {
        *index.entry(address.to_string()).or_insert_with(|| shape.add_node(()))
    };

    for (source, target, _) in graph.edges() {
        let key = (source.address.clone(), target.address.clone());
        if !seen.insert(key) {
            continue;
        }
        let src = node_for(&source.address, &mut shape, &mut index);
        let dst = node_for(&target.address, &mut shape, &mut index);
        shape.add_edge(src, dst, ());
    }

    for vertex in isolated(graph) {
        node_for(&vertex.address, &mut shape, &mut index);
    }

    shape
}

fn isolated(graph: &TransactionGraph) -> Vec<AccountVertex> {
    graph.isolated_nodes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn context(slot: u64, sig: &str) -> TransactionContext {
        TransactionContext::new(slot, sig.into(), HashSet::new(), Some(100), 5000, "payer".into(), 0, Vec::new(), None)
    }

    #[test]
    fn contexts_are_ordered_by_slot() {
        let contexts = vec![context(5, "later"), context(1, "earlier")];
        let ordered = order_contexts(contexts, &HashMap::new());
        assert_eq!(ordered[0].transaction_signature, "earlier");
        assert_eq!(ordered[1].transaction_signature, "later");
    }

    #[test]
    fn same_slot_uses_block_signature_order_when_given() {
        let contexts = vec![context(1, "b"), context(1, "a")];
        let mut block_order = HashMap::new();
        block_order.insert(1u64, vec!["a".to_string(), "b".to_string()]);
        let ordered = order_contexts(contexts, &block_order);
        assert_eq!(ordered[0].transaction_signature, "a");
        assert_eq!(ordered[1].transaction_signature, "b");
    }

    #[test]
    fn merging_two_contexts_unions_their_graphs() {
        use crate::account::AccountVertex;

        let mut ctx_a = context(1, "a");
        let va = AccountVertex { address: "x".into(), version: 0, transaction_signature: "a".into() };
        let vb = AccountVertex { address: "y".into(), version: 0, transaction_signature: "a".into() };
        ctx_a.graph.add_edge(&va, &vb, TransferProperties::new(TransferType::Transfer, "p", 1, 1), None);

        let space = Graphspace::build(vec![ctx_a], &HashMap::new(), false);
        assert_eq!(space.graph.edge_count(), 1);
        assert_eq!(space.transaction_contexts.len(), 1);
    }

    #[test]
    fn isomorphic_single_transfer_graphs_share_a_group() {
        use crate::account::AccountVertex;

        let mut ctx_a = context(1, "a");
        let va = AccountVertex { address: "x1".into(), version: 0, transaction_signature: "a".into() };
        let vb = AccountVertex { address: "y1".into(), version: 0, transaction_signature: "a".into() };
        ctx_a.graph.add_edge(&va, &vb, TransferProperties::new(TransferType::Transfer, "p", 1, 1), None);

        let mut ctx_b = context(2, "b");
        let vc = AccountVertex { address: "x2".into(), version: 0, transaction_signature: "b".into() };
        let vd = AccountVertex { address: "y2".into(), version: 0, transaction_signature: "b".into() };
        ctx_b.graph.add_edge(&vc, &vd, TransferProperties::new(TransferType::Transfer, "p", 1, 1), None);

        let mut space = Graphspace::build(vec![ctx_a, ctx_b], &HashMap::new(), false);
        space.analyse_isomorphic_transactions();

        let group_a = space.transaction_contexts["a"].isomorphic_group;
        let group_b = space.transaction_contexts["b"].isomorphic_group;
        assert!(group_a.is_some());
        assert_eq!(group_a, group_b);
    }
}
