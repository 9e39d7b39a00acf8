use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::analytics::{self, Frequency};
use crate::anomaly;
use crate::cli::{resolve_ledger, FilterArgs};
use crate::error::{LensError, Result};
use crate::fmt::{money, pct, thousands};
use crate::models::{field_by_key, Field, Transaction};
use crate::settings::load_settings;
use crate::store::RecordStore;

fn load_filtered(ledger: Option<&str>, filters: &FilterArgs) -> Result<Vec<Transaction>> {
    let store = RecordStore::load(&resolve_ledger(ledger)?)?;
    // filter an independent copy, never the cached table itself
    let view = store.view();
    Ok(filters.to_filter_set().apply(&view))
}

const NO_MATCHES: &str = "No transactions match the active filters.";

// ---------------------------------------------------------------------------
// summary
// ---------------------------------------------------------------------------

pub fn summary(ledger: Option<&str>, filters: &FilterArgs) -> Result<()> {
    let rows = load_filtered(ledger, filters)?;
    let s = analytics::summarize(&rows);
    let scope = if filters.to_filter_set().is_unrestricted() {
        "All Transactions"
    } else {
        "Filtered Transactions"
    };

    let mut table = Table::new();
    table.set_header(vec!["Metric", "Value"]);
    table.add_row(vec![
        Cell::new("Total Transaction Amount"),
        Cell::new(money(s.total)),
    ]);
    table.add_row(vec![
        Cell::new("Average Transaction Amount"),
        Cell::new(money(s.mean)),
    ]);
    table.add_row(vec![
        Cell::new("Number of Transactions"),
        Cell::new(thousands(s.count)),
    ]);
    println!("Summary of {scope}\n{table}");
    Ok(())
}

// ---------------------------------------------------------------------------
// timeline
// ---------------------------------------------------------------------------

pub fn timeline(ledger: Option<&str>, freq: Option<&str>, filters: &FilterArgs) -> Result<()> {
    let configured = load_settings().default_frequency;
    let key = freq.unwrap_or(configured.as_str());
    let frequency = analytics::frequency_by_key(key)
        .ok_or_else(|| LensError::UnknownFrequency(key.to_string()))?;

    let rows = load_filtered(ledger, filters)?;
    if rows.is_empty() {
        println!("{NO_MATCHES}");
        return Ok(());
    }
    let ts = analytics::resample(&rows, frequency);

    let date_fmt = match ts.frequency {
        Frequency::Monthly => "%Y-%m",
        _ => "%Y-%m-%d",
    };
    let mut table = Table::new();
    table.set_header(vec![ts.frequency.label(), "Total"]);
    for (bucket, total) in &ts.points {
        let amt = if *total >= ts.mean {
            money(*total).green().to_string()
        } else {
            money(*total)
        };
        table.add_row(vec![Cell::new(bucket.format(date_fmt)), Cell::new(amt)]);
    }
    println!("{} Transactions\n{table}", ts.frequency.label());
    println!(
        "\n{} mean amount: {} over {} periods",
        ts.frequency.label(),
        money(ts.mean).bold(),
        ts.points.len()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// weekdays
// ---------------------------------------------------------------------------

pub fn weekdays(ledger: Option<&str>, filters: &FilterArgs) -> Result<()> {
    let rows = load_filtered(ledger, filters)?;
    if rows.is_empty() {
        println!("{NO_MATCHES}");
        return Ok(());
    }
    let profile = analytics::weekday_profile(&rows);

    let mut table = Table::new();
    table.set_header(vec!["Day", "Average Amount", "Transactions"]);
    for ((day, mean), (_, count)) in profile.means.iter().zip(&profile.counts) {
        let avg = if profile.max_mean_days.contains(day) {
            money(*mean).green().bold().to_string()
        } else {
            money(*mean)
        };
        let cnt = if profile.max_count_days.contains(day) {
            thousands(*count).green().bold().to_string()
        } else {
            thousands(*count)
        };
        table.add_row(vec![Cell::new(day), Cell::new(avg), Cell::new(cnt)]);
    }
    println!("By Day of the Week\n{table}");
    println!("\nHighest average: {}", profile.max_mean_days.join(", "));
    println!("Most transactions: {}", profile.max_count_days.join(", "));
    Ok(())
}

// ---------------------------------------------------------------------------
// categories
// ---------------------------------------------------------------------------

pub fn categories(ledger: Option<&str>, segment: &str, filters: &FilterArgs) -> Result<()> {
    let secondary =
        field_by_key(segment).ok_or_else(|| LensError::UnknownColumn(segment.to_string()))?;
    let rows = load_filtered(ledger, filters)?;
    if rows.is_empty() {
        println!("{NO_MATCHES}");
        return Ok(());
    }
    let groups =
        analytics::top_segmented(&rows, Field::Category, secondary, analytics::TOP_GROUPS);

    let mut table = Table::new();
    table.set_header(vec!["Category", "Amount"]);
    for group in &groups {
        table.add_row(vec![
            Cell::new(group.key.bold()),
            Cell::new(money(group.total).bold()),
        ]);
        for (seg, total) in &group.segments {
            table.add_row(vec![
                Cell::new(format!("  {seg}")),
                Cell::new(money(*total)),
            ]);
        }
    }
    println!(
        "Top {} Categories by Total Amount, Segmented by {}\n{table}",
        groups.len(),
        secondary.name()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// merchants
// ---------------------------------------------------------------------------

pub fn merchants(ledger: Option<&str>, filters: &FilterArgs) -> Result<()> {
    let rows = load_filtered(ledger, filters)?;
    if rows.is_empty() {
        println!("{NO_MATCHES}");
        return Ok(());
    }
    let matrix = analytics::merchant_matrix(&rows, analytics::TOP_MERCHANTS);

    let mut header = vec!["Merchant".to_string()];
    header.extend(matrix.months.iter().map(|m| m.format("%b %Y").to_string()));

    let mut counts = Table::new();
    counts.set_header(header.clone());
    for (m, row) in matrix.merchants.iter().zip(&matrix.counts) {
        let mut cells = vec![Cell::new(m)];
        cells.extend(row.iter().map(|c| Cell::new(thousands(*c))));
        counts.add_row(cells);
    }
    println!(
        "Top {} Merchants — Transactions per Month\n{counts}",
        matrix.merchants.len()
    );

    let mut totals = Table::new();
    totals.set_header(header);
    for (m, row) in matrix.merchants.iter().zip(&matrix.totals) {
        let mut cells = vec![Cell::new(m)];
        cells.extend(row.iter().map(|t| Cell::new(money(*t))));
        totals.add_row(cells);
    }
    println!("\nTop {} Merchants — Amount per Month\n{totals}", matrix.merchants.len());
    println!(
        "\nMany small transactions with a low total can indicate payments split to dodge \
         approval limits; few transactions with a high total can indicate unapproved large purchases."
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// histogram
// ---------------------------------------------------------------------------

pub fn histogram(ledger: Option<&str>, filters: &FilterArgs) -> Result<()> {
    let rows = load_filtered(ledger, filters)?;
    if rows.is_empty() {
        println!("{NO_MATCHES}");
        return Ok(());
    }
    let bins = analytics::histogram(&rows, analytics::AMOUNT_BINS);

    let mut table = Table::new();
    table.set_header(vec!["Amount Range", "Count"]);
    for bin in &bins {
        table.add_row(vec![
            Cell::new(format!("{} to {}", money(bin.lo), money(bin.hi))),
            Cell::new(thousands(bin.count)),
        ]);
    }
    println!("Distribution of Transaction Amounts\n{table}");
    Ok(())
}

// ---------------------------------------------------------------------------
// trend
// ---------------------------------------------------------------------------

pub fn trend(ledger: Option<&str>, group: &str, filters: &FilterArgs) -> Result<()> {
    let field = field_by_key(group).ok_or_else(|| LensError::UnknownColumn(group.to_string()))?;
    let rows = load_filtered(ledger, filters)?;

    let x: Vec<f64> = rows.iter().map(anomaly::date_ordinal).collect();
    let y: Vec<f64> = rows.iter().map(|t| t.amount).collect();
    let fit = match anomaly::fit_line(&x, &y) {
        Ok(fit) => fit,
        Err(LensError::InsufficientData(_)) => {
            println!("Not enough data to fit a trend line (need at least two points on distinct dates).");
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    let direction = if fit.slope >= 0.0 { "rising" } else { "falling" };
    println!(
        "Best-fit line: {} per day ({direction})\n",
        money(fit.slope).bold()
    );

    // outlier flagging lives here, not in the fit itself
    let mut outliers: Vec<(usize, f64)> = fit
        .fitted
        .iter()
        .enumerate()
        .map(|(i, f)| (i, y[i] - f))
        .filter(|(_, r)| *r > 0.0)
        .collect();
    outliers.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    outliers.truncate(5);

    if outliers.is_empty() {
        println!("No points above the trend line.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Date", field.name(), "Amount", "Trend", "Above Trend"]);
    for (i, residual) in &outliers {
        let t = &rows[*i];
        table.add_row(vec![
            Cell::new(t.timestamp.date().format("%Y-%m-%d")),
            Cell::new(field.get(t)),
            Cell::new(money(t.amount).red().to_string()),
            Cell::new(money(fit.fitted[*i])),
            Cell::new(money(*residual)),
        ]);
    }
    println!("High-Value Points Above the Trend Line\n{table}");
    Ok(())
}

// ---------------------------------------------------------------------------
// benford
// ---------------------------------------------------------------------------

pub fn benford(ledger: Option<&str>, include_negatives_zeros: bool, filters: &FilterArgs) -> Result<()> {
    let rows = load_filtered(ledger, filters)?;
    let dist = match anomaly::digit_distribution(&rows, include_negatives_zeros) {
        Ok(dist) => dist,
        Err(LensError::EmptyDataset(_)) => {
            println!("No amounts qualify for leading-digit analysis with the active filters.");
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    let mut table = Table::new();
    table.set_header(vec!["First Digit", "Benford", "Observed", "Count"]);
    for bucket in &dist.buckets {
        let deviation = (bucket.observed - bucket.expected).abs() > 5.0;
        let observed = if deviation {
            pct(bucket.observed).yellow().to_string()
        } else {
            pct(bucket.observed)
        };
        table.add_row(vec![
            Cell::new(bucket.label),
            Cell::new(pct(bucket.expected)),
            Cell::new(observed),
            Cell::new(thousands(bucket.count)),
        ]);
    }
    println!("Benford's Law vs Observed First Digits\n{table}");
    println!(
        "\n{} amounts analyzed. Large gaps between observed and expected \
         percentages are a screening signal, not proof of anomaly.",
        thousands(dist.total)
    );
    if include_negatives_zeros {
        println!("Digit -1 counts negative amounts (refunds/credits); digit 0 counts amounts below $1.");
    }
    Ok(())
}
