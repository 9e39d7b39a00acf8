pub mod demo;
pub mod report;
pub mod status;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;

use crate::error::{LensError, Result};
use crate::filters::FilterSet;
use crate::settings::load_settings;

#[derive(Parser)]
#[command(name = "ledgerlens", about = "Transaction-ledger analytics for anomaly screening.")]
pub struct Cli {
    /// Ledger CSV path (overrides the configured ledger)
    #[arg(long, global = true)]
    pub ledger: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a ledger CSV and remember it as the default.
    Init {
        /// Path to the ledger CSV
        file: String,
    },
    /// Write a sample ledger to explore ledgerlens without real data.
    Demo {
        /// Output path (default: sample_ledger.csv)
        #[arg(long)]
        output: Option<String>,
    },
    /// Show ledger metadata and discovered column vocabularies.
    Status,
    /// Total, average, and count of the filtered transactions.
    Summary {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Transaction totals over time with a mean reference value.
    Timeline {
        /// Bucket size: daily, weekly, monthly
        #[arg(long)]
        freq: Option<String>,
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Average amount and transaction count by day of the week.
    Weekdays {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Top 5 categories by total amount, segmented by a second column.
    Categories {
        /// Segment column: payment_method, account_type, transaction_type
        #[arg(long, default_value = "payment_method")]
        segment: String,
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Monthly transaction counts and totals for the top 10 merchants.
    Merchants {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Distribution of transaction amounts.
    Histogram {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Least-squares trend of amount against time, with the points
    /// furthest above the line.
    Trend {
        /// Grouping column shown with each outlier: category, merchant,
        /// payment_method, account_type, transaction_type
        #[arg(long, default_value = "category")]
        group: String,
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Observed leading-digit distribution vs Benford's Law.
    Benford {
        /// Count negative amounts and amounts below 1 in sentinel buckets
        #[arg(long = "include-negatives-zeros")]
        include_negatives_zeros: bool,
        #[command(flatten)]
        filters: FilterArgs,
    },
}

#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    /// Start date: YYYY-MM-DD (used together with --to)
    #[arg(long = "from")]
    pub from_date: Option<String>,
    /// End date: YYYY-MM-DD, inclusive (used together with --from)
    #[arg(long = "to")]
    pub to_date: Option<String>,
    /// Restrict to a category (repeatable)
    #[arg(long = "category")]
    pub categories: Vec<String>,
    /// Restrict to a payment method (repeatable)
    #[arg(long = "payment-method")]
    pub payment_methods: Vec<String>,
    /// Restrict to an account type (repeatable)
    #[arg(long = "account-type")]
    pub account_types: Vec<String>,
    /// Restrict to a transaction type (repeatable)
    #[arg(long = "transaction-type")]
    pub transaction_types: Vec<String>,
}

impl FilterArgs {
    /// Build the filter pipeline parameters. A partial or unparseable date
    /// range degrades to "no restriction" with a warning, it never errors.
    pub fn to_filter_set(&self) -> FilterSet {
        let date_range = match (self.parse_date(&self.from_date), self.parse_date(&self.to_date)) {
            (Some(from), Some(to)) => Some((from, to)),
            (None, None) if self.from_date.is_none() && self.to_date.is_none() => None,
            _ => {
                eprintln!(
                    "{}",
                    "Warning: ignoring date filter (needs both --from and --to as YYYY-MM-DD)"
                        .yellow()
                );
                None
            }
        };
        FilterSet {
            date_range,
            categories: self.categories.clone(),
            payment_methods: self.payment_methods.clone(),
            account_types: self.account_types.clone(),
            transaction_types: self.transaction_types.clone(),
        }
    }

    fn parse_date(&self, raw: &Option<String>) -> Option<NaiveDate> {
        raw.as_deref()
            .and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok())
    }
}

/// The ledger to analyze: the --ledger override, else the configured path.
pub(crate) fn resolve_ledger(override_path: Option<&str>) -> Result<PathBuf> {
    if let Some(p) = override_path {
        return Ok(PathBuf::from(p));
    }
    let settings = load_settings();
    if settings.ledger_path.is_empty() {
        return Err(LensError::Settings(
            "no ledger configured — run `ledgerlens init <file.csv>` or pass --ledger".to_string(),
        ));
    }
    Ok(PathBuf::from(settings.ledger_path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_args_full_range() {
        let args = FilterArgs {
            from_date: Some("2025-01-01".to_string()),
            to_date: Some("2025-01-31".to_string()),
            ..Default::default()
        };
        let set = args.to_filter_set();
        let (from, to) = set.date_range.unwrap();
        assert_eq!(from, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(to, NaiveDate::from_ymd_opt(2025, 1, 31).unwrap());
    }

    #[test]
    fn test_filter_args_partial_range_fails_open() {
        let args = FilterArgs {
            from_date: Some("2025-01-01".to_string()),
            ..Default::default()
        };
        assert!(args.to_filter_set().date_range.is_none());
    }

    #[test]
    fn test_filter_args_malformed_range_fails_open() {
        let args = FilterArgs {
            from_date: Some("01/01/2025".to_string()),
            to_date: Some("soon".to_string()),
            ..Default::default()
        };
        assert!(args.to_filter_set().date_range.is_none());
    }
}
