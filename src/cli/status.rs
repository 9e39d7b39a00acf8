use std::path::PathBuf;

use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::resolve_ledger;
use crate::error::Result;
use crate::fmt::thousands;
use crate::settings::{load_settings, save_settings};
use crate::store::RecordStore;

/// Validate a ledger file and remember it as the default.
pub fn init(file: &str) -> Result<()> {
    let path = PathBuf::from(file);
    let store = RecordStore::load(&path)?;

    let canonical = std::fs::canonicalize(&path).unwrap_or(path);
    let mut settings = load_settings();
    settings.ledger_path = canonical.to_string_lossy().to_string();
    save_settings(&settings)?;

    println!(
        "{} {} transactions loaded from {}",
        "Ledger OK:".green().bold(),
        thousands(store.len()),
        canonical.display()
    );
    if store.is_empty() {
        eprintln!("{}", "Warning: ledger contains no transactions".yellow());
    }
    if let Some((first, last)) = store.date_span() {
        println!("Covering {first} to {last}");
    }
    println!("Saved as the default ledger.");
    Ok(())
}

/// Show ledger metadata and the discovered vocabulary of each column.
pub fn run(ledger: Option<&str>) -> Result<()> {
    let path = resolve_ledger(ledger)?;
    let store = RecordStore::load(&path)?;

    let mut table = Table::new();
    table.set_header(vec!["Ledger", "Value"]);
    table.add_row(vec![Cell::new("Path"), Cell::new(store.path().display())]);
    table.add_row(vec![Cell::new("Checksum"), Cell::new(store.checksum())]);
    table.add_row(vec![
        Cell::new("Transactions"),
        Cell::new(thousands(store.len())),
    ]);
    if let Some((first, last)) = store.date_span() {
        table.add_row(vec![Cell::new("First date"), Cell::new(first)]);
        table.add_row(vec![Cell::new("Last date"), Cell::new(last)]);
    }
    println!("Ledger Status\n{table}");

    let mut vocab = Table::new();
    vocab.set_header(vec!["Column", "Distinct Values"]);
    for (field, size) in store.vocabulary_sizes() {
        vocab.add_row(vec![Cell::new(field.name()), Cell::new(thousands(size))]);
    }
    println!("\nColumn Vocabularies\n{vocab}");
    Ok(())
}
