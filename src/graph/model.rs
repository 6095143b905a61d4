//! Transaction value-flow graph (spec §4.3, ported from `models/graph.py`).
//!
//! networkx's `MultiDiGraph` allows multiple parallel edges between the same
//! pair of nodes, each addressable by an automatically-assigned key. petgraph
//! has no equivalent — `StableDiGraph` already supports parallel edges
//! structurally, but doesn't hand out a stable integer key for each one, so
//! [`TransferProperties::key`] carries that identity explicitly, assigned the
//! same way the original does (10, 20, 30, ... per transaction).

use std::collections::HashMap;

use petgraph::algo::{astar, has_path_connecting};
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::Serialize;

use crate::account::AccountVertex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TransferType {
    Transfer,
    CreateAccount,
    CloseAccount,
    Burn,
    MintTo,
    NativeSol,
    Swap,
    SwapIncoming,
    SwapOutgoing,
    Fee,
    Authorize,
    PriorityFee,
    Split,
    TransferChecked,
    Withdraw,
    NewTransaction,
}

/// Edge weight: one value transfer between two account vertices.
#[derive(Debug, Clone)]
pub struct TransferProperties {
    pub transfer_type: TransferType,
    pub program_address: String,
    pub amount_source: i128,
    pub amount_destination: i128,
    pub swap_id: Option<u32>,
    pub swap_parent_id: Option<u32>,
    pub parent_router_swap_id: Option<u32>,
    pub key: u64,
}

impl TransferProperties {
    pub fn new(
        transfer_type: TransferType,
        program_address: impl Into<String>,
        amount_source: i128,
        amount_destination: i128,
    ) -> Self {
        TransferProperties {
            transfer_type,
            program_address: program_address.into(),
            amount_source,
            amount_destination,
            swap_id: None,
            swap_parent_id: None,
            parent_router_swap_id: None,
            key: 0,
        }
    }

    pub fn with_swap_parent(mut self, swap_parent_id: Option<u32>) -> Self {
        self.swap_parent_id = swap_parent_id;
        self
    }

    pub fn with_parent_router_swap(mut self, parent_router_swap_id: Option<u32>) -> Self {
        self.parent_router_swap_id = parent_router_swap_id;
        self
    }

    pub fn with_swap_id(mut self, swap_id: Option<u32>) -> Self {
        self.swap_id = swap_id;
        self
    }
}

/// A transaction's value-flow graph: account vertices as nodes, transfers as
/// (possibly parallel) directed edges.
#[derive(Debug, Default)]
pub struct TransactionGraph {
    graph: StableDiGraph<AccountVertex, TransferProperties>,
    index: HashMap<AccountVertex, NodeIndex>,
    next_key: u64,
}

impl TransactionGraph {
    pub fn new() -> Self {
        TransactionGraph {
            graph: StableDiGraph::new(),
            index: HashMap::new(),
            next_key: 10,
        }
    }

    pub fn add_node(&mut self, vertex: &AccountVertex) -> NodeIndex {
        if let Some(idx) = self.index.get(vertex) {
            return *idx;
        }
        let idx = self.graph.add_node(vertex.clone());
        self.index.insert(vertex.clone(), idx);
        idx
    }

    pub fn has_node(&self, vertex: &AccountVertex) -> bool {
        self.index.contains_key(vertex)
    }

    pub fn has_path(&self, source: &AccountVertex, target: &AccountVertex) -> bool {
        let (Some(&src), Some(&dst)) = (self.index.get(source), self.index.get(target)) else {
            return false;
        };
        has_path_connecting(&self.graph, src, dst, None)
    }

    /// Adds an edge, assigning the next auto-incrementing key if `key` is
    /// `None`. Returns the key actually used.
    pub fn add_edge(
        &mut self,
        source: &AccountVertex,
        target: &AccountVertex,
        mut properties: TransferProperties,
        key: Option<u64>,
    ) -> u64 {
        let key = key.unwrap_or_else(|| {
            let k = self.next_key;
            self.next_key += 10;
            k
        });
        properties.key = key;

        let src = self.add_node(source);
        let dst = self.add_node(target);
        self.graph.add_edge(src, dst, properties);
        key
    }

    pub fn get_edge_data(&self, source: &AccountVertex, target: &AccountVertex) -> Vec<&TransferProperties> {
        let (Some(&src), Some(&dst)) = (self.index.get(source), self.index.get(target)) else {
            return Vec::new();
        };
        self.graph
            .edges_connecting(src, dst)
            .map(|e| e.weight())
            .collect()
    }

    /// All edges, as `(source, target, properties)` triples.
    pub fn edges(&self) -> Vec<(AccountVertex, AccountVertex, &TransferProperties)> {
        self.graph
            .edge_references()
            .map(|e| {
                (
                    self.graph[e.source()].clone(),
                    self.graph[e.target()].clone(),
                    e.weight(),
                )
            })
            .collect()
    }

    pub fn get_edges_by_swap_parent(&self, swap_id: u32) -> Vec<(AccountVertex, AccountVertex, &TransferProperties)> {
        self.edges()
            .into_iter()
            .filter(|(_, _, data)| data.swap_parent_id == Some(swap_id))
            .collect()
    }

    pub fn nodes(&self) -> Vec<AccountVertex> {
        self.index.keys().cloned().collect()
    }

    pub fn get_nodes_by_address(&self, address: &str) -> Vec<AccountVertex> {
        self.index.keys().filter(|v| v.address == address).cloned().collect()
    }

    pub fn isolated_nodes(&self) -> Vec<AccountVertex> {
        self.index
            .iter()
            .filter(|(_, idx)| {
                self.graph.edges_directed(**idx, Direction::Outgoing).count() == 0
                    && self.graph.edges_directed(**idx, Direction::Incoming).count() == 0
            })
            .map(|(vertex, _)| vertex.clone())
            .collect()
    }

    pub fn remove_nodes(&mut self, vertices: &[AccountVertex]) {
        for vertex in vertices {
            if let Some(idx) = self.index.remove(vertex) {
                self.graph.remove_node(idx);
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Shortest (unweighted) path between two vertices, if one exists.
    pub fn shortest_path(&self, source: &AccountVertex, target: &AccountVertex) -> Option<Vec<AccountVertex>> {
        let (&src, &dst) = (self.index.get(source)?, self.index.get(target)?);
        let (_, path) = astar(&self.graph, src, |n| n == dst, |_| 1, |_| 0)?;
        Some(path.into_iter().map(|idx| self.graph[idx].clone()).collect())
    }

    /// Builds a standalone graph containing only the edges recorded against
    /// `swap_id` as their `swap_parent_id`, and the vertices those edges
    /// touch. `None` if the swap has no edges yet (resolution hasn't run, or
    /// the swap never produced any transfers).
    pub fn create_subgraph_for_swap(&self, swap_id: u32) -> Option<TransactionGraph> {
        let edges: Vec<_> = self
            .edges()
            .into_iter()
            .filter(|(_, _, data)| data.swap_parent_id == Some(swap_id))
            .collect();
        if edges.is_empty() {
            return None;
        }
        let mut sub = TransactionGraph::new();
        for (source, target, data) in edges {
            let key = data.key;
            sub.add_edge(&source, &target, data.clone(), Some(key));
        }
        Some(sub)
    }

    /// Unions `other` into `self`, reusing nodes that already exist by
    /// vertex identity and re-keying `other`'s edges so they never collide
    /// with `self`'s existing keys.
    pub fn add_graph(&mut self, other: &TransactionGraph) {
        for (source, target, properties) in other.edges() {
            let mut properties = properties.clone();
            properties.key = 0;
            self.add_edge(&source, &target, properties, None);
        }
        for vertex in other.index.keys() {
            self.add_node(vertex);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertex(address: &str, version: u32) -> AccountVertex {
        AccountVertex {
            address: address.to_string(),
            version,
            transaction_signature: "sig".to_string(),
        }
    }

    #[test]
    fn add_edge_assigns_increasing_keys() {
        let mut graph = TransactionGraph::new();
        let a = vertex("a", 0);
        let b = vertex("b", 0);
        let k1 = graph.add_edge(&a, &b, TransferProperties::new(TransferType::Transfer, "prog", 1, 1), None);
        let k2 = graph.add_edge(&a, &b, TransferProperties::new(TransferType::Transfer, "prog", 1, 1), None);
        assert_eq!(k1, 10);
        assert_eq!(k2, 20);
        assert_eq!(graph.get_edge_data(&a, &b).len(), 2);
    }

    #[test]
    fn has_path_detects_reachability() {
        let mut graph = TransactionGraph::new();
        let a = vertex("a", 0);
        let b = vertex("b", 0);
        let c = vertex("c", 0);
        graph.add_edge(&a, &b, TransferProperties::new(TransferType::Transfer, "prog", 1, 1), None);
        graph.add_edge(&b, &c, TransferProperties::new(TransferType::Transfer, "prog", 1, 1), None);
        assert!(graph.has_path(&a, &c));
        assert!(!graph.has_path(&c, &a));
    }

    #[test]
    fn isolated_nodes_have_no_edges() {
        let mut graph = TransactionGraph::new();
        let a = vertex("a", 0);
        let b = vertex("b", 0);
        graph.add_node(&a);
        graph.add_node(&b);
        graph.add_edge(&a, &b, TransferProperties::new(TransferType::Transfer, "prog", 1, 1), None);
        let isolated = graph.isolated_nodes();
        assert!(isolated.is_empty());

        let c = vertex("c", 0);
        graph.add_node(&c);
        assert_eq!(graph.isolated_nodes(), vec![c]);
    }
}
