//! # Sales Ledger
//!
//! Tracks sales amounts per salesman and product, answers aggregate queries
//! and persists the data set to a flat `salesman,product,amount` text file.
//!
//! ## Design Principles
//!
//! - **Checked arithmetic**: Amounts are finite `f64`; overflow is an error
//! - **Additive entry**: Recording the same salesman/product pair again sums
//! - **Strict loading**: One malformed line rejects the whole file
//! - **Deterministic output**: Reports and the saved file are sorted by ID
//!
//! ## Example
//!
//! ```
//! use sales_ledger::{Amount, SalesLedger};
//! use std::io::Cursor;
//! use std::str::FromStr;
//!
//! let data = "1,100,50.0\n1,100,25.0\n2,100,10.0\n";
//! let mut ledger = SalesLedger::from_reader(Cursor::new(data)).unwrap();
//! assert_eq!(ledger.totals_by_product().unwrap()[&100], Amount::from_str("85.0").unwrap());
//!
//! let removed = ledger.delete_sale(1, 100).unwrap();
//! assert_eq!(removed.to_string(), "75.0");
//! assert!(ledger.products_for_person(1).unwrap().is_empty());
//! ```

pub mod amount;
pub mod error;
pub mod ledger;
pub mod record;
pub mod shell;

pub use amount::{Amount, ParseAmountError};
pub use error::{LedgerError, Result};
pub use ledger::{LoadOutcome, ProductReport, SalesLedger};
pub use record::{ProductId, SalesRecord, SalesmanId};
pub use shell::{Command, Session};
