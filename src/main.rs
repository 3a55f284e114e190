//! Sales Ledger CLI
//!
//! Loads the data file, runs commands read from standard input and saves the
//! ledger back when the session ends.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- data.txt
//! ```
//!
//! # Environment Variables
//!
//! - `SALES_LEDGER_FILE`: Data file used when no path argument is given
//! - `RUST_LOG`: Set to `debug` or `warn` to control logging verbosity

use sales_ledger::{LoadOutcome, Result, SalesLedger, Session};
use std::env;
use std::io;
use std::path::PathBuf;
use std::process;

/// Data file used when neither an argument nor the environment names one.
const DEFAULT_STORE: &str = "data.txt";

/// Environment variable naming the data file.
const STORE_ENV: &str = "SALES_LEDGER_FILE";

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let store = store_path();

    let ledger = match SalesLedger::load(&store)? {
        LoadOutcome::Unavailable { ledger, reason } => {
            eprintln!(
                "Warning: cannot read {} ({}), starting with an empty ledger",
                store.display(),
                reason
            );
            ledger
        }
        LoadOutcome::Loaded(ledger) => ledger,
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut session = Session::new(ledger, store);
    session.run(stdin.lock(), stdout.lock())
}

fn store_path() -> PathBuf {
    env::args()
        .nth(1)
        .or_else(|| env::var(STORE_ENV).ok())
        .unwrap_or_else(|| DEFAULT_STORE.to_string())
        .into()
}
