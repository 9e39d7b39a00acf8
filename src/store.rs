use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use sha2::{Digest, Sha256};

use crate::error::{LensError, Result};
use crate::models::{Field, Transaction, ALL_FIELDS};

// ---------------------------------------------------------------------------
// Parsing helpers
// ---------------------------------------------------------------------------

pub fn parse_amount(raw: &str) -> f64 {
    let s = raw.replace(',', "").replace('"', "").replace('$', "");
    let s = s.trim();
    if let Some(inner) = s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        return -inner.trim().parse::<f64>().unwrap_or(0.0);
    }
    s.parse().unwrap_or(0.0)
}

/// Parse a ledger date field into a timestamp. Accepts ISO datetimes,
/// ISO dates, and MM/DD/YYYY; date-only values land on midnight.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(ts);
        }
    }
    for fmt in ["%Y-%m-%d", "%m/%d/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

fn compute_checksum(file_path: &Path) -> Result<String> {
    let data = std::fs::read(file_path)?;
    let mut hasher = Sha256::new();
    hasher.update(&data);
    Ok(hex::encode(hasher.finalize()))
}

// ---------------------------------------------------------------------------
// RecordStore
// ---------------------------------------------------------------------------

const REQUIRED_COLUMNS: &[&str] = &[
    "date",
    "amount",
    "category",
    "merchant",
    "payment_method",
    "account_type",
    "transaction_type",
];

/// The loaded ledger. Constructed once per process and passed by reference;
/// callers get read-only slices or independent copies, never a mutable alias.
#[derive(Debug)]
pub struct RecordStore {
    path: PathBuf,
    checksum: String,
    rows: Vec<Transaction>,
}

impl RecordStore {
    /// Load and normalize a ledger CSV. Any row whose date field cannot be
    /// parsed aborts the load.
    pub fn load(path: &Path) -> Result<RecordStore> {
        let checksum = compute_checksum(path)?;
        let file = std::fs::File::open(path)?;
        let mut rdr = csv::Reader::from_reader(std::io::BufReader::new(file));

        let headers = rdr.headers()?.clone();
        let mut indices = [0usize; 7];
        for (slot, &name) in REQUIRED_COLUMNS.iter().enumerate() {
            indices[slot] = headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or(LensError::MissingColumn(name))?;
        }
        let [idx_date, idx_amount, idx_category, idx_merchant, idx_payment, idx_account, idx_type] =
            indices;

        let mut rows = Vec::new();
        for (i, result) in rdr.records().enumerate() {
            let record = result?;
            // header is line 1
            let line = i + 2;
            let raw_date = record.get(idx_date).unwrap_or("");
            let timestamp = parse_timestamp(raw_date).ok_or(LensError::MalformedRecord {
                row: line,
                value: raw_date.to_string(),
            })?;
            rows.push(Transaction {
                timestamp,
                amount: parse_amount(record.get(idx_amount).unwrap_or("")),
                category: record.get(idx_category).unwrap_or("").trim().to_string(),
                merchant: record.get(idx_merchant).unwrap_or("").trim().to_string(),
                payment_method: record.get(idx_payment).unwrap_or("").trim().to_string(),
                account_type: record.get(idx_account).unwrap_or("").trim().to_string(),
                transaction_type: record.get(idx_type).unwrap_or("").trim().to_string(),
            });
        }

        Ok(RecordStore {
            path: path.to_path_buf(),
            checksum,
            rows,
        })
    }

    pub fn records(&self) -> &[Transaction] {
        &self.rows
    }

    /// An independent copy, safe to filter and reshape without aliasing the
    /// cached table.
    pub fn view(&self) -> Vec<Transaction> {
        self.rows.clone()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn checksum(&self) -> &str {
        &self.checksum
    }

    /// Earliest and latest record dates, if the ledger is non-empty.
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.rows.iter().map(|t| t.timestamp.date()).min()?;
        let last = self.rows.iter().map(|t| t.timestamp.date()).max()?;
        Some((first, last))
    }

    /// Distinct values of a categorical column, sorted. The selector
    /// vocabulary is discovered from data, not a fixed schema.
    pub fn vocabulary(&self, field: Field) -> Vec<String> {
        let set: BTreeSet<&str> = self.rows.iter().map(|t| field.get(t)).collect();
        set.into_iter().map(|s| s.to_string()).collect()
    }

    /// Vocabulary sizes for every categorical column, in declaration order.
    pub fn vocabulary_sizes(&self) -> Vec<(Field, usize)> {
        ALL_FIELDS
            .iter()
            .map(|f| (*f, self.vocabulary(*f).len()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "transaction_id,date,amount,category,merchant,payment_method,account_type,transaction_type\n";

    fn write_ledger(dir: &Path, name: &str, rows: &[&str]) -> PathBuf {
        let path = dir.join(name);
        let mut content = String::from(HEADER);
        for row in rows {
            content.push_str(row);
            content.push('\n');
        }
        std::fs::write(&path, &content).unwrap();
        path
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1,234.56"), 1234.56);
        assert_eq!(parse_amount("\"500.00\""), 500.0);
        assert_eq!(parse_amount("  -42.50  "), -42.5);
        assert_eq!(parse_amount("$99.95"), 99.95);
        assert_eq!(parse_amount("(500.00)"), -500.0);
        assert_eq!(parse_amount("not_a_number"), 0.0);
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let midnight = NaiveDate::from_ymd_opt(2025, 1, 15)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(parse_timestamp("2025-01-15"), Some(midnight));
        assert_eq!(parse_timestamp("01/15/2025"), Some(midnight));
        assert_eq!(
            parse_timestamp("2025-01-15 13:45:00").map(|t| t.date()),
            Some(midnight.date())
        );
        assert_eq!(
            parse_timestamp("2025-01-15T13:45:00").map(|t| t.date()),
            Some(midnight.date())
        );
        assert_eq!(parse_timestamp("15th of January"), None);
        assert_eq!(parse_timestamp("2025-02-30"), None);
    }

    #[test]
    fn test_load_parses_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_ledger(
            dir.path(),
            "ledger.csv",
            &[
                "1,2025-01-15,123.45,Groceries,Costco,credit_card,personal,purchase",
                "2,2025-01-16,-5.00,Groceries,Costco,credit_card,personal,refund",
            ],
        );
        let store = RecordStore::load(&path).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.records()[0].amount, 123.45);
        assert_eq!(store.records()[0].merchant, "Costco");
        assert_eq!(store.records()[1].transaction_type, "refund");
        assert_eq!(store.path(), path.as_path());
        assert_eq!(store.checksum().len(), 64);
    }

    #[test]
    fn test_load_rejects_malformed_date() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_ledger(
            dir.path(),
            "ledger.csv",
            &[
                "1,2025-01-15,10.00,A,M,card,personal,purchase",
                "2,not-a-date,20.00,A,M,card,personal,purchase",
            ],
        );
        let err = RecordStore::load(&path).unwrap_err();
        match err {
            LensError::MalformedRecord { row, value } => {
                assert_eq!(row, 3);
                assert_eq!(value, "not-a-date");
            }
            other => panic!("expected MalformedRecord, got {other}"),
        }
    }

    #[test]
    fn test_load_rejects_missing_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.csv");
        std::fs::write(&path, "date,amount,category\n2025-01-15,10.00,A\n").unwrap();
        let err = RecordStore::load(&path).unwrap_err();
        assert!(matches!(err, LensError::MissingColumn("merchant")));
    }

    #[test]
    fn test_view_is_independent() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_ledger(
            dir.path(),
            "ledger.csv",
            &["1,2025-01-15,10.00,A,M,card,personal,purchase"],
        );
        let store = RecordStore::load(&path).unwrap();
        let mut view = store.view();
        view[0].amount = 999.0;
        view.clear();
        assert_eq!(store.len(), 1);
        assert_eq!(store.records()[0].amount, 10.0);
    }

    #[test]
    fn test_date_span_and_vocabulary() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_ledger(
            dir.path(),
            "ledger.csv",
            &[
                "1,2025-03-01,10.00,Travel,Delta,credit_card,business,purchase",
                "2,2025-01-15,20.00,Groceries,Costco,debit_card,personal,purchase",
            ],
        );
        let store = RecordStore::load(&path).unwrap();
        let (first, last) = store.date_span().unwrap();
        assert_eq!(first, NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
        assert_eq!(last, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        assert_eq!(store.vocabulary(Field::Category), vec!["Groceries", "Travel"]);
        assert_eq!(store.vocabulary(Field::PaymentMethod).len(), 2);
    }
}
