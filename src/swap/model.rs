//! Swap record (spec §4.6, ported from `models/swap.py`).

use crate::account::AccountVertex;

/// A (source, destination) address pair — the user-facing legs of a swap, or
/// the pool-facing legs, depending on which field of [`Swap`] it populates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferAccountAddresses {
    pub source: String,
    pub destination: String,
}

/// Either a single pool leg pair, or a tuple of every pool account touched by
/// a multi-pool matcher (e.g. Meteora's 3-pool stable swap).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolAddresses {
    Pair(TransferAccountAddresses),
    Many(Vec<String>),
    None,
}

/// A detected swap instruction, prior to (or after) resolution into a single
/// collapsed `SWAP` edge by [`crate::swap::resolver`].
#[derive(Debug, Clone)]
pub struct Swap {
    pub id: u32,
    pub router: bool,
    pub program_address: String,
    pub program_name: String,
    pub instruction_name: String,
    pub user_addresses: TransferAccountAddresses,
    pub pool_addresses: PoolAddresses,
    pub parent_router_swap_id: Option<u32>,
    pub program_account_vertex: Option<AccountVertex>,
    pub fee: i128,
}

impl Swap {
    pub fn is_child_swap(&self) -> bool {
        self.parent_router_swap_id.is_some()
    }

    pub fn pool_addresses_list(&self) -> Vec<String> {
        match &self.pool_addresses {
            PoolAddresses::Pair(pair) => vec![pair.source.clone(), pair.destination.clone()],
            PoolAddresses::Many(addresses) => addresses.clone(),
            PoolAddresses::None => Vec::new(),
        }
    }

    pub fn user_source(&self) -> &str {
        &self.user_addresses.source
    }

    pub fn user_destination(&self) -> &str {
        &self.user_addresses.destination
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_addresses_list_flattens_pair() {
        let swap = Swap {
            id: 1,
            router: false,
            program_address: "prog".into(),
            program_name: "pumpfun".into(),
            instruction_name: "buy".into(),
            user_addresses: TransferAccountAddresses { source: "u1".into(), destination: "u2".into() },
            pool_addresses: PoolAddresses::Pair(TransferAccountAddresses { source: "p1".into(), destination: "p2".into() }),
            parent_router_swap_id: None,
            program_account_vertex: None,
            fee: 0,
        };
        assert_eq!(swap.pool_addresses_list(), vec!["p1".to_string(), "p2".to_string()]);
        assert!(!swap.is_child_swap());
    }
}
