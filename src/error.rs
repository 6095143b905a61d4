use thiserror::Error;

/// Errors recorded on a [`crate::transaction::TransactionContext`] while building
/// a transaction graph.
///
/// Every variant here is non-fatal to the overall parse except
/// [`GraphError::MalformedInstruction`], which aborts instruction processing for
/// that transaction (the caller still gets an account snapshot and fee edges).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("malformed inner-instruction stack height sequence: {0}")]
    MalformedInstruction(String),

    #[error("swap {0} could not be resolved")]
    UnresolvedSwap(u32),

    #[error("native SOL transfer inference failed for swap {0}")]
    InferenceFailed(u32),

    #[error("price derivation hit its iteration cap with {0} mints unresolved")]
    PriceDerivationIncomplete(usize),

    #[error("transaction carried a non-null err: {0}")]
    TransactionErred(String),

    #[error("account not found: {0}")]
    AccountNotFound(String),

    #[error("account version not found: {address} v{version}")]
    VersionNotFound { address: String, version: u32 },

    #[error("failed to decode transaction input: {0}")]
    Decode(String),
}

pub type Result<T> = std::result::Result<T, GraphError>;
