//! C2 — account identity, versioning, and bootstrapping from transaction state.

pub mod factory;
pub mod model;
pub mod repository;

pub use factory::{build_accounts_from_transaction, create_fee_account};
pub use model::{Account, AccountType, AccountVersion, AccountVertex};
pub use repository::AccountRepository;
