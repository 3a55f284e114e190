//! The in-memory sales ledger and its data file contract.
//!
//! Cells are keyed by `(salesman, product)` in a single ordered map. A separate
//! roster remembers every salesman the ledger has seen, so a salesman whose
//! last product was deleted keeps showing up in per-person reports with a zero
//! total. Such a salesman cannot be written to the data file, which has no way
//! to express a salesman without products, and is therefore gone after the
//! next save and load.

use crate::amount::Amount;
use crate::error::{LedgerError, Result};
use crate::record::{ProductId, SalesRecord, SalesmanId};
use csv::{ReaderBuilder, WriterBuilder};
use log::{debug, info, warn};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Sales amounts accumulated per salesman and product.
///
/// # Ordering
///
/// Every report and the saved file are ordered by ascending salesman ID, then
/// product ID.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SalesLedger {
    /// Accumulated amount per `(salesman, product)` cell.
    cells: BTreeMap<(SalesmanId, ProductId), Amount>,

    /// Every salesman seen, including those whose cells were all deleted.
    salesmen: BTreeSet<SalesmanId>,
}

/// Result of opening the data file.
#[derive(Debug)]
pub enum LoadOutcome {
    /// The file was read completely.
    Loaded(SalesLedger),

    /// The file could not be opened; the session starts with an empty ledger.
    Unavailable {
        ledger: SalesLedger,
        reason: io::Error,
    },
}

impl LoadOutcome {
    /// Returns the ledger, empty if the file was unavailable.
    pub fn into_ledger(self) -> SalesLedger {
        match self {
            LoadOutcome::Loaded(ledger) => ledger,
            LoadOutcome::Unavailable { ledger, .. } => ledger,
        }
    }

    /// Returns `true` if the data file could not be opened.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, LoadOutcome::Unavailable { .. })
    }
}

/// Per-salesman breakdown of a single product.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductReport {
    /// One row per known salesman, zero where the product was never sold.
    pub rows: Vec<(SalesmanId, Amount)>,

    /// Sum of all rows.
    pub total: Amount,
}

impl SalesLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        SalesLedger::default()
    }

    /// Reads a ledger from `salesman,product,amount` lines.
    ///
    /// Repeated `(salesman, product)` pairs are summed. Blank lines are
    /// skipped. Fields are taken literally: no quoting, and IDs must not carry
    /// surrounding whitespace. The first malformed line, or a line whose sum
    /// overflows, aborts the whole load.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = ReaderBuilder::new()
            .has_headers(false)
            .quoting(false)
            .flexible(true)
            .from_reader(reader);

        let mut ledger = SalesLedger::new();
        let mut raw = csv::StringRecord::new();
        while csv_reader.read_record(&mut raw)? {
            let line = raw.position().map(|p| p.line()).unwrap_or(0);
            let record = SalesRecord::from_csv(&raw, line)?;
            ledger
                .record_sale(record.salesman, record.product, record.amount)
                .map_err(|e| LedgerError::MalformedRecord {
                    line,
                    message: e.to_string(),
                })?;
        }

        Ok(ledger)
    }

    /// Loads the ledger from a data file.
    ///
    /// A file that cannot be opened is not an error: the caller gets an empty
    /// ledger tagged [`LoadOutcome::Unavailable`]. Malformed content is.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<LoadOutcome> {
        let path = path.as_ref();
        let file = match File::open(path) {
            Ok(file) => file,
            Err(reason) => {
                warn!(
                    "Data file {} unavailable ({}), starting with an empty ledger",
                    path.display(),
                    reason
                );
                return Ok(LoadOutcome::Unavailable {
                    ledger: SalesLedger::new(),
                    reason,
                });
            }
        };

        let ledger = SalesLedger::from_reader(BufReader::new(file))?;
        info!(
            "Loaded {} sales records for {} salesmen from {}",
            ledger.len(),
            ledger.salesmen.len(),
            path.display()
        );
        Ok(LoadOutcome::Loaded(ledger))
    }

    /// Writes every cell as a `salesman,product,amount` line.
    ///
    /// Salesmen without any cell produce no output.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);

        for (&(salesman, product), &amount) in &self.cells {
            csv_writer.serialize(SalesRecord::new(salesman, product, amount))?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Overwrites the data file with the current ledger.
    ///
    /// On failure the in-memory ledger is left untouched.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)?;
        self.write_to(BufWriter::new(file))?;
        info!("Saved {} sales records to {}", self.len(), path.display());
        Ok(())
    }

    /// Adds `amount` to the `(salesman, product)` cell, creating it if needed.
    ///
    /// If the new cell value would overflow, the ledger is left unchanged and
    /// [`LedgerError::AmountOverflow`] is returned.
    pub fn record_sale(
        &mut self,
        salesman: SalesmanId,
        product: ProductId,
        amount: Amount,
    ) -> Result<()> {
        let current = self.amount(salesman, product).unwrap_or(Amount::ZERO);
        let updated = current.checked_add(amount).ok_or_else(|| {
            LedgerError::AmountOverflow(format!(
                "sales of salesman {} for product {}",
                salesman, product
            ))
        })?;

        self.salesmen.insert(salesman);
        self.cells.insert((salesman, product), updated);
        debug!(
            "Recorded {} for salesman {} product {}, now {}",
            amount, salesman, product, updated
        );
        Ok(())
    }

    /// Removes the `(salesman, product)` cell and returns its amount.
    ///
    /// The salesman stays known even when this was the last product.
    pub fn delete_sale(&mut self, salesman: SalesmanId, product: ProductId) -> Result<Amount> {
        if !self.salesmen.contains(&salesman) {
            return Err(LedgerError::SalesmanNotFound(salesman));
        }

        let amount = self
            .cells
            .remove(&(salesman, product))
            .ok_or(LedgerError::ProductNotFound { salesman, product })?;

        debug!(
            "Deleted {} for salesman {} product {}",
            amount, salesman, product
        );
        Ok(amount)
    }

    /// Total sales of every known salesman, zero for those without products.
    pub fn totals_by_person(&self) -> Result<Vec<(SalesmanId, Amount)>> {
        self.salesmen
            .iter()
            .map(|&salesman| -> Result<(SalesmanId, Amount)> {
                let total = checked_total(self.products_of(salesman).map(|(_, a)| a), || {
                    format!("total of salesman {}", salesman)
                })?;
                Ok((salesman, total))
            })
            .collect()
    }

    /// Every product sold by `salesman` with its amount.
    ///
    /// A known salesman without products yields an empty list, an unknown one
    /// [`LedgerError::SalesmanNotFound`].
    pub fn products_for_person(&self, salesman: SalesmanId) -> Result<Vec<(ProductId, Amount)>> {
        if !self.salesmen.contains(&salesman) {
            return Err(LedgerError::SalesmanNotFound(salesman));
        }
        Ok(self.products_of(salesman).collect())
    }

    /// Total sales of every product across all salesmen.
    pub fn totals_by_product(&self) -> Result<BTreeMap<ProductId, Amount>> {
        let mut totals = BTreeMap::new();
        for (&(_, product), &amount) in &self.cells {
            let total = totals.entry(product).or_insert(Amount::ZERO);
            *total = total.checked_add(amount).ok_or_else(|| {
                LedgerError::AmountOverflow(format!("total of product {}", product))
            })?;
        }
        Ok(totals)
    }

    /// Amount of `product` for every known salesman, plus the grand total.
    ///
    /// An unknown product is not an error: it reports zero everywhere. The
    /// only failure is a grand total that overflows.
    pub fn persons_for_product(&self, product: ProductId) -> Result<ProductReport> {
        let rows: Vec<_> = self
            .salesmen
            .iter()
            .map(|&salesman| {
                let amount = self.amount(salesman, product).unwrap_or(Amount::ZERO);
                (salesman, amount)
            })
            .collect();
        let total = checked_total(rows.iter().map(|&(_, amount)| amount), || {
            format!("total of product {}", product)
        })?;

        Ok(ProductReport { rows, total })
    }

    /// Amount stored for a single cell.
    pub fn amount(&self, salesman: SalesmanId, product: ProductId) -> Option<Amount> {
        self.cells.get(&(salesman, product)).copied()
    }

    /// Known salesmen in ascending order.
    pub fn salesmen(&self) -> impl Iterator<Item = SalesmanId> + '_ {
        self.salesmen.iter().copied()
    }

    /// Number of `(salesman, product)` cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` if the ledger holds no cells and knows no salesmen.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty() && self.salesmen.is_empty()
    }

    fn products_of(&self, salesman: SalesmanId) -> impl Iterator<Item = (ProductId, Amount)> + '_ {
        self.cells
            .range((salesman, ProductId::MIN)..=(salesman, ProductId::MAX))
            .map(|(&(_, product), &amount)| (product, amount))
    }
}

/// Sums `amounts`, naming the total via `what` if it overflows.
fn checked_total<I, F>(amounts: I, what: F) -> Result<Amount>
where
    I: IntoIterator<Item = Amount>,
    F: FnOnce() -> String,
{
    amounts
        .into_iter()
        .try_fold(Amount::ZERO, Amount::checked_add)
        .ok_or_else(|| LedgerError::AmountOverflow(what()))
}
