//! Line-oriented command session driving a [`SalesLedger`].
//!
//! Reads one command per line, runs it against the ledger and prints a text
//! report. Commands execute strictly in input order on the calling thread, so
//! the ledger never sees two operations at once. The ledger is written back
//! to its data file when the session ends.

use crate::amount::Amount;
use crate::error::{LedgerError, Result};
use crate::ledger::SalesLedger;
use crate::record::{ProductId, SalesmanId};
use log::{debug, warn};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::str::FromStr;

/// Printed after every report.
pub const SEPARATOR: &str = "_________________";

const HELP: &str = "\
Commands:
  totals                              total sales per salesman
  person <salesman>                   sales of one salesman per product
  products                            total sales per product
  product <product>                   sales of one product per salesman
  add <salesman> <product> <amount>   record a sale
  delete <salesman> <product>         delete a sales record
  save                                write the ledger to the data file
  help                                show this list
  exit | quit                         save and leave";

/// A parsed shell command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Total sales of every salesman.
    TotalsByPerson,

    /// Product breakdown of one salesman.
    Person(SalesmanId),

    /// Total sales of every product.
    TotalsByProduct,

    /// Salesman breakdown of one product.
    Product(ProductId),

    /// Record a sale.
    Add {
        salesman: SalesmanId,
        product: ProductId,
        amount: Amount,
    },

    /// Delete a sales record.
    Delete {
        salesman: SalesmanId,
        product: ProductId,
    },

    /// Write the ledger to the data file without leaving.
    Save,

    /// Print the command list.
    Help,

    /// Save and end the session.
    Exit,
}

impl FromStr for Command {
    type Err = LedgerError;

    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let name = words
            .next()
            .ok_or_else(|| LedgerError::InvalidCommand("empty command".to_string()))?
            .to_lowercase();
        let args: Vec<&str> = words.collect();

        let command = match (name.as_str(), args.as_slice()) {
            ("totals", []) => Command::TotalsByPerson,
            ("person", [salesman]) => Command::Person(parse_id("salesman", salesman)?),
            ("products", []) => Command::TotalsByProduct,
            ("product", [product]) => Command::Product(parse_id("product", product)?),
            ("add", [salesman, product, amount]) => Command::Add {
                salesman: parse_id("salesman", salesman)?,
                product: parse_id("product", product)?,
                amount: Amount::from_str(amount).map_err(|_| {
                    LedgerError::InvalidCommand(format!("'{}' is not a valid amount", amount))
                })?,
            },
            ("delete", [salesman, product]) => Command::Delete {
                salesman: parse_id("salesman", salesman)?,
                product: parse_id("product", product)?,
            },
            ("save", []) => Command::Save,
            ("help", []) => Command::Help,
            ("exit" | "quit", []) => Command::Exit,
            ("totals" | "person" | "products" | "product" | "add" | "delete" | "save" | "help"
            | "exit" | "quit", _) => {
                return Err(LedgerError::InvalidCommand(format!(
                    "wrong number of arguments for '{}', try 'help'",
                    name
                )))
            }
            _ => {
                return Err(LedgerError::InvalidCommand(format!(
                    "unknown command '{}', try 'help'",
                    name
                )))
            }
        };

        Ok(command)
    }
}

fn parse_id(field: &str, value: &str) -> Result<i32> {
    value.parse().map_err(|_| {
        LedgerError::InvalidCommand(format!("'{}' is not a valid {} ID", value, field))
    })
}

/// An interactive session over one ledger and its data file.
pub struct Session {
    ledger: SalesLedger,
    store: PathBuf,
}

impl Session {
    /// Creates a session that saves `ledger` back to `store`.
    pub fn new<P: Into<PathBuf>>(ledger: SalesLedger, store: P) -> Self {
        Session {
            ledger,
            store: store.into(),
        }
    }

    /// The ledger in its current state.
    pub fn ledger(&self) -> &SalesLedger {
        &self.ledger
    }

    /// Runs commands from `input` until `exit` or end of input, then saves.
    ///
    /// Unparseable or non-UTF-8 lines and failed mid-session saves are
    /// reported on `output` and the session continues. If reading input or
    /// writing output fails, the ledger is still saved before that error is
    /// returned. A failed final save is returned as well.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> Result<()> {
        let session = self.run_commands(input, &mut output);
        if let Err(e) = &session {
            warn!("Session ended early: {}", e);
        }

        self.ledger.save(&self.store)?;
        session?;
        writeln!(output, "Saved to {}", self.store.display())?;
        output.flush()?;
        Ok(())
    }

    fn run_commands<R: BufRead, W: Write>(&mut self, mut input: R, output: &mut W) -> Result<()> {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                return Ok(());
            }

            let line = match std::str::from_utf8(&buf) {
                Ok(line) => line.trim(),
                Err(e) => {
                    debug!("Rejected non-UTF-8 input: {}", e);
                    let err = LedgerError::InvalidCommand("input is not valid UTF-8".to_string());
                    writeln!(output, "Error: {}", err)?;
                    continue;
                }
            };
            if line.is_empty() {
                continue;
            }

            let command = match Command::from_str(line) {
                Ok(command) => command,
                Err(e) => {
                    debug!("Rejected input {:?}: {}", line, e);
                    writeln!(output, "Error: {}", e)?;
                    continue;
                }
            };

            if command == Command::Exit {
                return Ok(());
            }
            self.execute(command, output)?;
        }
    }

    /// Runs a single command and writes its report.
    ///
    /// Missing salesmen or products and overflowing totals are part of the
    /// report; only failures to write `output` are returned.
    pub fn execute<W: Write>(&mut self, command: Command, output: &mut W) -> Result<()> {
        match self.report(command, output) {
            Ok(()) => {}
            Err(e) if e.is_not_found() => writeln!(output, "{}.", e)?,
            Err(e @ LedgerError::AmountOverflow(_)) => writeln!(output, "Error: {}", e)?,
            Err(e) => return Err(e),
        }

        writeln!(output, "{}", SEPARATOR)?;
        Ok(())
    }

    fn report<W: Write>(&mut self, command: Command, output: &mut W) -> Result<()> {
        match command {
            Command::TotalsByPerson => {
                let totals = self.ledger.totals_by_person()?;
                writeln!(output, "Total sales per salesman:")?;
                for (salesman, total) in totals {
                    writeln!(output, "Salesman {}: {}", salesman, total)?;
                }
            }
            Command::Person(salesman) => {
                let products = self.ledger.products_for_person(salesman)?;
                writeln!(output, "Sales of salesman {}:", salesman)?;
                for (product, amount) in products {
                    writeln!(output, "Product {}: {}", product, amount)?;
                }
            }
            Command::TotalsByProduct => {
                let totals = self.ledger.totals_by_product()?;
                writeln!(output, "Total sales per product:")?;
                for (product, total) in totals {
                    writeln!(output, "Product {}: {}", product, total)?;
                }
            }
            Command::Product(product) => {
                let report = self.ledger.persons_for_product(product)?;
                writeln!(output, "Sales of product {}:", product)?;
                for (salesman, amount) in report.rows {
                    writeln!(output, "Salesman {}: {}", salesman, amount)?;
                }
                writeln!(output, "Total sales: {}", report.total)?;
            }
            Command::Add {
                salesman,
                product,
                amount,
            } => {
                self.ledger.record_sale(salesman, product, amount)?;
                writeln!(
                    output,
                    "Recorded {} for salesman {} product {}.",
                    amount, salesman, product
                )?;
            }
            Command::Delete { salesman, product } => {
                let amount = self.ledger.delete_sale(salesman, product)?;
                writeln!(
                    output,
                    "Deleted sales of product {} for salesman {}.",
                    product, salesman
                )?;
                writeln!(output, "Deleted amount: {}", amount)?;
            }
            Command::Save => match self.ledger.save(&self.store) {
                Ok(()) => writeln!(
                    output,
                    "Saved {} records to {}",
                    self.ledger.len(),
                    self.store.display()
                )?,
                Err(e) => {
                    warn!("Save to {} failed: {}", self.store.display(), e);
                    writeln!(output, "Error: save failed: {}", e)?;
                }
            },
            Command::Help => writeln!(output, "{}", HELP)?,
            Command::Exit => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor};
    use tempfile::tempdir;

    /// Output whose reader has gone away.
    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "reader closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn amount(s: &str) -> Amount {
        Amount::from_str(s).unwrap()
    }

    fn execute(session: &mut Session, command: Command) -> String {
        let mut output = Vec::new();
        session.execute(command, &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    fn sample_session() -> Session {
        let ledger =
            SalesLedger::from_reader(Cursor::new("1,100,50.0\n1,100,25.0\n2,100,10.0\n")).unwrap();
        Session::new(ledger, "unused.txt")
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::from_str("totals").unwrap(), Command::TotalsByPerson);
        assert_eq!(Command::from_str("PERSON 7").unwrap(), Command::Person(7));
        assert_eq!(Command::from_str("product -2").unwrap(), Command::Product(-2));
        assert_eq!(
            Command::from_str("  add 1  2 3.5 ").unwrap(),
            Command::Add {
                salesman: 1,
                product: 2,
                amount: amount("3.5")
            }
        );
        assert_eq!(
            Command::from_str("delete 1 2").unwrap(),
            Command::Delete {
                salesman: 1,
                product: 2
            }
        );
        assert_eq!(Command::from_str("quit").unwrap(), Command::Exit);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        let err = Command::from_str("person abc").unwrap_err();
        assert!(err.to_string().contains("'abc' is not a valid salesman ID"));

        let err = Command::from_str("add 1 2 much").unwrap_err();
        assert!(err.to_string().contains("'much' is not a valid amount"));

        let err = Command::from_str("add 1 2 NaN").unwrap_err();
        assert!(err.to_string().contains("'NaN' is not a valid amount"));

        let err = Command::from_str("delete 1").unwrap_err();
        assert!(err.to_string().contains("wrong number of arguments"));

        let err = Command::from_str("launch").unwrap_err();
        assert!(err.to_string().contains("unknown command 'launch'"));
    }

    #[test]
    fn test_totals_report() {
        let mut session = sample_session();
        let output = execute(&mut session, Command::TotalsByPerson);
        assert_eq!(
            output,
            "Total sales per salesman:\nSalesman 1: 75.0\nSalesman 2: 10.0\n_________________\n"
        );
    }

    #[test]
    fn test_person_report_and_not_found() {
        let mut session = sample_session();
        let output = execute(&mut session, Command::Person(1));
        assert!(output.contains("Product 100: 75.0"));

        let output = execute(&mut session, Command::Person(3));
        assert!(output.starts_with("Salesman 3 has no sales records."));
    }

    #[test]
    fn test_product_report_includes_total() {
        let mut session = sample_session();
        let output = execute(&mut session, Command::Product(100));
        assert!(output.contains("Salesman 1: 75.0\nSalesman 2: 10.0\nTotal sales: 85.0\n"));

        let output = execute(&mut session, Command::Product(5));
        assert!(output.contains("Salesman 1: 0.0\nSalesman 2: 0.0\nTotal sales: 0.0\n"));
    }

    #[test]
    fn test_delete_then_delete_again() {
        let mut session = sample_session();
        let output = execute(
            &mut session,
            Command::Delete {
                salesman: 1,
                product: 100,
            },
        );
        assert!(output.contains("Deleted amount: 75.0"));

        let output = execute(
            &mut session,
            Command::Delete {
                salesman: 1,
                product: 100,
            },
        );
        assert!(output.contains("Salesman 1 has no sales records for product 100."));
    }

    #[test]
    fn test_run_saves_on_exit_and_ignores_rest() {
        let dir = tempdir().unwrap();
        let store = dir.path().join("data.txt");
        let mut session = Session::new(SalesLedger::new(), &store);

        let input = "add 1 100 5.0\nbogus\nexit\nadd 2 200 1.0\n";
        let mut output = Vec::new();
        session.run(Cursor::new(input), &mut output).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("Error: Invalid command: unknown command 'bogus'"));
        assert_eq!(std::fs::read_to_string(&store).unwrap(), "1,100,5.0\n");
        assert_eq!(session.ledger().amount(2, 200), None);
    }

    #[test]
    fn test_save_failure_keeps_session_alive() {
        let dir = tempdir().unwrap();
        let store = dir.path().join("missing").join("data.txt");
        let mut session = Session::new(SalesLedger::new(), &store);

        let output = execute(&mut session, Command::Save);
        assert!(output.contains("Error: save failed"));
    }

    #[test]
    fn test_non_utf8_line_is_reported_and_session_continues() {
        let dir = tempdir().unwrap();
        let store = dir.path().join("data.txt");
        let mut session = Session::new(SalesLedger::new(), &store);

        let input: &[u8] = b"add 1 1 5.0\n\xff\xfe\nadd 1 2 1.0\nexit\n";
        let mut output = Vec::new();
        session.run(input, &mut output).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("Error: Invalid command: input is not valid UTF-8"));
        assert_eq!(
            std::fs::read_to_string(&store).unwrap(),
            "1,1,5.0\n1,2,1.0\n"
        );
    }

    #[test]
    fn test_closed_output_still_saves() {
        let dir = tempdir().unwrap();
        let store = dir.path().join("data.txt");
        let mut session = Session::new(SalesLedger::new(), &store);

        let result = session.run(Cursor::new("add 1 1 5.0\ntotals\n"), ClosedPipe);

        assert!(matches!(result, Err(LedgerError::Io(_))));
        assert_eq!(std::fs::read_to_string(&store).unwrap(), "1,1,5.0\n");
    }

    #[test]
    fn test_overflow_is_reported_not_fatal() {
        let ledger = SalesLedger::from_reader(Cursor::new(
            "1,1,1.7976931348623157E308\n2,1,1.7976931348623157E308\n",
        ))
        .unwrap();
        let mut session = Session::new(ledger, "unused.txt");

        let output = execute(
            &mut session,
            Command::Add {
                salesman: 1,
                product: 1,
                amount: amount("1.7976931348623157E308"),
            },
        );
        assert_eq!(
            output,
            "Error: Amount overflow: sales of salesman 1 for product 1 is out of range\n_________________\n"
        );

        let output = execute(&mut session, Command::TotalsByProduct);
        assert!(output.starts_with("Error: Amount overflow: total of product 1"));

        let output = execute(&mut session, Command::TotalsByPerson);
        assert!(output.contains("Salesman 2: 1.7976931348623157e308"));
    }
}
