//! C3/C4 — the transaction value-flow graph and the account-version
//! preparation that keeps it acyclic.

pub mod builder;
pub mod model;

pub use builder::{
    add_fee_transfers, burn, compute_priority_fee, mint_to, prepare_destination_account_version,
    prepare_source_account_version, prepare_swap_program_account,
};
pub use model::{TransactionGraph, TransferProperties, TransferType};
