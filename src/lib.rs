// Solana Transaction Graph Reconstruction
//
// Turns a parsed Solana transaction into a directed value-flow graph: every
// account version is a node, every transfer (plain, DEX swap leg, burn/mint,
// fee) is an edge. Swap legs routed through a DEX program get collapsed into
// a single SWAP edge once the whole transaction has been walked, and graphs
// from several transactions can be composed into one graphspace for
// block/wallet-level views.

pub mod account;
pub mod constants;
pub mod error;
pub mod external;
pub mod graph;
pub mod graphspace;
pub mod instruction;
pub mod parsers;
pub mod serializer;
pub mod swap;
pub mod transaction;

pub mod config;

pub use error::{GraphError, Result};
pub use transaction::{parse_transaction, TransactionContext};
