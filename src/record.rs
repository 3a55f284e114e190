//! Row model of the data file.

use crate::amount::Amount;
use crate::error::{LedgerError, Result};
use csv::StringRecord;
use serde::{Deserialize, Serialize};

/// Salesman identifier.
pub type SalesmanId = i32;

/// Product identifier.
pub type ProductId = i32;

/// One line of the data file: `salesman,product,amount`.
///
/// The file has no header row; fields are matched by position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    /// Salesman the sale is booked against.
    pub salesman: SalesmanId,

    /// Product that was sold.
    pub product: ProductId,

    /// Sales amount.
    pub amount: Amount,
}

impl SalesRecord {
    /// Number of comma-separated fields in every line.
    pub const FIELDS: usize = 3;

    /// Creates a new record.
    pub fn new(salesman: SalesmanId, product: ProductId, amount: Amount) -> Self {
        SalesRecord {
            salesman,
            product,
            amount,
        }
    }

    /// Decodes a raw CSV row, rejecting anything that is not exactly two
    /// integers followed by one decimal number.
    pub fn from_csv(raw: &StringRecord, line: u64) -> Result<Self> {
        if raw.len() != Self::FIELDS {
            return Err(LedgerError::MalformedRecord {
                line,
                message: format!("expected {} fields, found {}", Self::FIELDS, raw.len()),
            });
        }

        raw.deserialize(None)
            .map_err(|e| LedgerError::MalformedRecord {
                line,
                message: e.to_string(),
            })
    }
}
