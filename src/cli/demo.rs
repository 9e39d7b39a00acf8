use std::path::PathBuf;

use chrono::{Datelike, Local, NaiveDate};
use colored::Colorize;

use crate::error::Result;

struct DemoTxn {
    date: String,
    amount: f64,
    category: &'static str,
    merchant: &'static str,
    payment: &'static str,
    account: &'static str,
    txn_type: &'static str,
}

/// Subscriptions and utilities generated every month.
struct RecurringTxn {
    day: u32,
    merchant: &'static str,
    category: &'static str,
    payment: &'static str,
    account: &'static str,
    amount: f64,
}

const RECURRING: &[RecurringTxn] = &[
    RecurringTxn { day: 1, merchant: "NETFLIX", category: "Entertainment", payment: "credit_card", account: "personal", amount: 15.49 },
    RecurringTxn { day: 1, merchant: "SPOTIFY", category: "Entertainment", payment: "credit_card", account: "personal", amount: 10.99 },
    RecurringTxn { day: 5, merchant: "ADOBE CREATIVE CLOUD", category: "Software", payment: "credit_card", account: "business", amount: 54.99 },
    RecurringTxn { day: 5, merchant: "GITHUB", category: "Software", payment: "credit_card", account: "business", amount: 21.00 },
    RecurringTxn { day: 8, merchant: "COMCAST", category: "Utilities", payment: "bank_transfer", account: "personal", amount: 89.99 },
    RecurringTxn { day: 12, merchant: "VERIZON WIRELESS", category: "Utilities", payment: "bank_transfer", account: "personal", amount: 72.40 },
];

/// One-off purchases rotated across months.
struct RotatingTxn {
    day: u32,
    merchant: &'static str,
    category: &'static str,
    payment: &'static str,
    account: &'static str,
    amount: f64,
}

const ROTATING: &[RotatingTxn] = &[
    RotatingTxn { day: 3, merchant: "COSTCO", category: "Groceries", payment: "debit_card", account: "personal", amount: 187.33 },
    RotatingTxn { day: 7, merchant: "WHOLE FOODS", category: "Groceries", payment: "credit_card", account: "personal", amount: 94.18 },
    RotatingTxn { day: 10, merchant: "CHIPOTLE", category: "Dining", payment: "mobile_wallet", account: "personal", amount: 23.75 },
    RotatingTxn { day: 14, merchant: "STARBUCKS", category: "Dining", payment: "mobile_wallet", account: "personal", amount: 11.20 },
    RotatingTxn { day: 16, merchant: "UBER", category: "Travel", payment: "credit_card", account: "business", amount: 38.60 },
    RotatingTxn { day: 19, merchant: "DELTA AIR LINES", category: "Travel", payment: "credit_card", account: "business", amount: 412.00 },
    RotatingTxn { day: 22, merchant: "STAPLES", category: "Office", payment: "debit_card", account: "business", amount: 67.23 },
    RotatingTxn { day: 25, merchant: "COSTCO", category: "Groceries", payment: "debit_card", account: "personal", amount: 146.90 },
    RotatingTxn { day: 27, merchant: "STARBUCKS", category: "Dining", payment: "mobile_wallet", account: "personal", amount: 14.35 },
    RotatingTxn { day: 28, merchant: "WHOLE FOODS", category: "Groceries", payment: "credit_card", account: "personal", amount: 121.47 },
];

/// Clamp a day to the last valid day of the given year/month.
fn clamp_day(year: i32, month: u32, day: u32) -> u32 {
    let last_day = NaiveDate::from_ymd_opt(year, month + 1, 1)
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year + 1, 1, 1).unwrap())
        .pred_opt()
        .unwrap()
        .day();
    day.min(last_day)
}

fn make_date(year: i32, month: u32, day: u32) -> String {
    let d = clamp_day(year, month, day);
    format!("{year:04}-{month:02}-{d:02}")
}

fn round_cents(val: f64) -> f64 {
    (val * 100.0).round() / 100.0
}

/// Build 18 months of demo transactions ending at the current month. The
/// data is deterministic: variation comes from the month index, not an RNG.
fn generate_transactions() -> Vec<DemoTxn> {
    let today = Local::now().date_naive();
    let mut txns = Vec::new();

    for i in 0..18u32 {
        let months_ago = 17 - i;
        let target = today - chrono::Months::new(months_ago);
        let year = target.year();
        let month = target.month();
        let idx = i as usize;
        // +/- up to ~3% swing keyed off the month index
        let vary = 1.0 + ((idx % 7) as f64 - 3.0) * 0.01;

        for r in RECURRING {
            txns.push(DemoTxn {
                date: make_date(year, month, r.day),
                amount: r.amount,
                category: r.category,
                merchant: r.merchant,
                payment: r.payment,
                account: r.account,
                txn_type: "subscription",
            });
        }

        // four rotating purchases per month, offset by the month index
        for j in 0..4 {
            let r = &ROTATING[(idx * 3 + j) % ROTATING.len()];
            txns.push(DemoTxn {
                date: make_date(year, month, r.day),
                amount: round_cents(r.amount * vary),
                category: r.category,
                merchant: r.merchant,
                payment: r.payment,
                account: r.account,
                txn_type: "purchase",
            });
        }

        // quarterly hardware purchase — a deliberate high-value outlier
        if idx % 3 == 0 {
            txns.push(DemoTxn {
                date: make_date(year, month, 15),
                amount: round_cents(2400.0 * vary),
                category: "Office",
                merchant: "DELL TECHNOLOGIES",
                payment: "bank_transfer",
                account: "business",
                txn_type: "purchase",
            });
        }

        // an occasional refund keeps negative amounts in the ledger
        if idx % 3 == 1 {
            txns.push(DemoTxn {
                date: make_date(year, month, 21),
                amount: round_cents(-45.80 * vary),
                category: "Groceries",
                merchant: "COSTCO",
                payment: "debit_card",
                account: "personal",
                txn_type: "refund",
            });
        }

        // sub-dollar processing fee
        txns.push(DemoTxn {
            date: make_date(year, month, 2),
            amount: 0.75,
            category: "Utilities",
            merchant: "ACH PROCESSING",
            payment: "bank_transfer",
            account: "business",
            txn_type: "fee",
        });
    }

    txns.sort_by(|a, b| a.date.cmp(&b.date));
    txns
}

pub fn run(output: Option<&str>) -> Result<()> {
    let path = PathBuf::from(output.unwrap_or("sample_ledger.csv"));
    let txns = generate_transactions();

    let mut content =
        String::from("date,amount,category,merchant,payment_method,account_type,transaction_type\n");
    for t in &txns {
        content.push_str(&format!(
            "{},{:.2},{},{},{},{},{}\n",
            t.date, t.amount, t.category, t.merchant, t.payment, t.account, t.txn_type
        ));
    }
    std::fs::write(&path, &content)?;

    println!(
        "Wrote {} sample transactions to {}",
        txns.len(),
        path.display()
    );
    println!("\nTry:");
    println!("  {}", format!("ledgerlens init {}", path.display()).bold());
    println!("  {}", "ledgerlens summary".bold());
    println!("  {}", "ledgerlens timeline --freq monthly".bold());
    println!("  {}", "ledgerlens benford --include-negatives-zeros".bold());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_deterministic() {
        let a = generate_transactions();
        let b = generate_transactions();
        assert_eq!(a.len(), b.len());
        assert!(a.iter().zip(&b).all(|(x, y)| x.date == y.date && x.amount == y.amount));
    }

    #[test]
    fn test_generate_covers_anomaly_inputs() {
        let txns = generate_transactions();
        assert!(txns.iter().any(|t| t.amount < 0.0), "needs refunds");
        assert!(
            txns.iter().any(|t| t.amount > 0.0 && t.amount < 1.0),
            "needs sub-dollar amounts"
        );
        assert!(txns.iter().any(|t| t.amount > 1000.0), "needs outliers");
    }

    #[test]
    fn test_demo_writes_loadable_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.csv");
        run(Some(path.to_str().unwrap())).unwrap();
        let store = crate::store::RecordStore::load(&path).unwrap();
        assert!(store.len() > 100);
        assert!(store.date_span().is_some());
    }

    #[test]
    fn test_clamp_day_handles_short_months() {
        assert_eq!(clamp_day(2025, 2, 28), 28);
        assert_eq!(clamp_day(2025, 2, 31), 28);
        assert_eq!(clamp_day(2024, 2, 31), 29);
        assert_eq!(clamp_day(2025, 12, 31), 31);
    }
}
