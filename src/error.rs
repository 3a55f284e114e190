//! Error types for the sales ledger.

use crate::record::{ProductId, SalesmanId};
use thiserror::Error;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors that can occur while loading, saving, querying or driving the ledger.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Failed to read or write the data file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reading or writing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A line of the data file is not `salesman,product,amount`
    #[error("Malformed record at line {line}: {message}")]
    MalformedRecord { line: u64, message: String },

    /// No salesman with this ID is known
    #[error("Salesman {0} has no sales records")]
    SalesmanNotFound(SalesmanId),

    /// The salesman exists but has no record for this product
    #[error("Salesman {salesman} has no sales records for product {product}")]
    ProductNotFound {
        salesman: SalesmanId,
        product: ProductId,
    },

    /// A sum left the representable amount range
    #[error("Amount overflow: {0} is out of range")]
    AmountOverflow(String),

    /// A shell command could not be understood
    #[error("Invalid command: {0}")]
    InvalidCommand(String),
}

impl LedgerError {
    /// Returns `true` for the negative query results (missing salesman or product).
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            LedgerError::SalesmanNotFound(_) | LedgerError::ProductNotFound { .. }
        )
    }
}
