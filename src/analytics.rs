use std::collections::BTreeMap;

use chrono::{Datelike, Duration, Months, NaiveDate};

use crate::models::{Field, Transaction};

/// Top-N cutoff for the segmented category ranking.
pub const TOP_GROUPS: usize = 5;
/// Top-N cutoff for the merchant matrices.
pub const TOP_MERCHANTS: usize = 10;
/// Bin count for the amount histogram.
pub const AMOUNT_BINS: usize = 20;

// ---------------------------------------------------------------------------
// Time-series resampling
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Daily => "Daily",
            Self::Weekly => "Weekly",
            Self::Monthly => "Monthly",
        }
    }

    /// Start of the calendar bucket containing `date`. Weeks start on
    /// Monday; months are calendar months, not fixed 30-day windows.
    pub fn bucket_start(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Self::Daily => date,
            Self::Weekly => date - Duration::days(date.weekday().num_days_from_monday() as i64),
            Self::Monthly => date.with_day(1).unwrap(),
        }
    }

    /// Start of the bucket after the one starting at `bucket`.
    pub fn advance(&self, bucket: NaiveDate) -> NaiveDate {
        match self {
            Self::Daily => bucket + Duration::days(1),
            Self::Weekly => bucket + Duration::days(7),
            Self::Monthly => bucket + Months::new(1),
        }
    }
}

pub fn frequency_by_key(key: &str) -> Option<Frequency> {
    match key {
        "daily" => Some(Frequency::Daily),
        "weekly" => Some(Frequency::Weekly),
        "monthly" => Some(Frequency::Monthly),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct TimeSeries {
    pub frequency: Frequency,
    /// (bucket start, summed amount), one entry per bucket in range with no
    /// gaps.
    pub points: Vec<(NaiveDate, f64)>,
    /// Arithmetic mean of the bucket totals — over periods, not raw records.
    pub mean: f64,
}

/// Bucket amounts into consecutive calendar periods. Buckets with no
/// matching records appear with a 0 total.
pub fn resample(rows: &[Transaction], frequency: Frequency) -> TimeSeries {
    let mut sums: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for t in rows {
        *sums.entry(frequency.bucket_start(t.timestamp.date())).or_default() += t.amount;
    }

    let mut points = Vec::new();
    if let (Some(&first), Some(&last)) = (sums.keys().next(), sums.keys().next_back()) {
        let mut bucket = first;
        while bucket <= last {
            points.push((bucket, sums.get(&bucket).copied().unwrap_or(0.0)));
            bucket = frequency.advance(bucket);
        }
    }

    let mean = if points.is_empty() {
        0.0
    } else {
        points.iter().map(|(_, v)| v).sum::<f64>() / points.len() as f64
    };

    TimeSeries {
        frequency,
        points,
        mean,
    }
}

// ---------------------------------------------------------------------------
// Summary metrics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct LedgerSummary {
    pub total: f64,
    pub mean: f64,
    pub count: usize,
}

pub fn summarize(rows: &[Transaction]) -> LedgerSummary {
    let count = rows.len();
    let total: f64 = rows.iter().map(|t| t.amount).sum();
    let mean = if count == 0 { 0.0 } else { total / count as f64 };
    LedgerSummary { total, mean, count }
}

// ---------------------------------------------------------------------------
// Weekday profile
// ---------------------------------------------------------------------------

/// Fixed weekday rank table: index is the sort rank, 0 = Monday.
pub const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

#[derive(Debug, Clone)]
pub struct WeekdayProfile {
    /// Mean amount per weekday in Monday→Sunday order; 0 when no records.
    pub means: Vec<(&'static str, f64)>,
    /// Record count per weekday in Monday→Sunday order.
    pub counts: Vec<(&'static str, usize)>,
    /// Every weekday whose mean ties the maximum (cent tolerance).
    pub max_mean_days: Vec<&'static str>,
    /// Every weekday whose count ties the maximum (exact).
    pub max_count_days: Vec<&'static str>,
}

fn cents(val: f64) -> i64 {
    (val * 100.0).round() as i64
}

/// Aggregate by day of week. All seven weekdays always appear; ties for the
/// maxima are collected as sets, never broken arbitrarily. Weekdays without
/// records do not compete for either maximum.
pub fn weekday_profile(rows: &[Transaction]) -> WeekdayProfile {
    let mut sums = [0.0f64; 7];
    let mut counts = [0usize; 7];
    for t in rows {
        let rank = t.timestamp.date().weekday().num_days_from_monday() as usize;
        sums[rank] += t.amount;
        counts[rank] += 1;
    }

    let means: Vec<f64> = (0..7)
        .map(|i| if counts[i] == 0 { 0.0 } else { sums[i] / counts[i] as f64 })
        .collect();

    let max_mean = (0..7)
        .filter(|&i| counts[i] > 0)
        .map(|i| cents(means[i]))
        .max();
    let max_mean_days = match max_mean {
        Some(m) => (0..7)
            .filter(|&i| counts[i] > 0 && cents(means[i]) == m)
            .map(|i| WEEKDAYS[i])
            .collect(),
        None => Vec::new(),
    };

    let max_count = counts.iter().copied().filter(|&c| c > 0).max();
    let max_count_days = match max_count {
        Some(m) => (0..7)
            .filter(|&i| counts[i] == m)
            .map(|i| WEEKDAYS[i])
            .collect(),
        None => Vec::new(),
    };

    WeekdayProfile {
        means: (0..7).map(|i| (WEEKDAYS[i], means[i])).collect(),
        counts: (0..7).map(|i| (WEEKDAYS[i], counts[i])).collect(),
        max_mean_days,
        max_count_days,
    }
}

// ---------------------------------------------------------------------------
// Segmented top-N ranking
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SegmentedGroup {
    pub key: String,
    pub total: f64,
    /// (secondary value, summed amount), sorted by secondary value.
    pub segments: Vec<(String, f64)>,
}

/// Rank primary-column groups by summed amount, keep the top `n`, and break
/// each kept group down by the secondary column. Groups outside the top `n`
/// are excluded entirely — there is no "other" bucket. Ties in the ranking
/// keep the primary keys' sort order (the descending sort is stable over a
/// key-ordered map).
pub fn top_segmented(
    rows: &[Transaction],
    primary: Field,
    secondary: Field,
    n: usize,
) -> Vec<SegmentedGroup> {
    let mut sums: BTreeMap<String, f64> = BTreeMap::new();
    for t in rows {
        *sums.entry(primary.get(t).to_string()).or_default() += t.amount;
    }

    let mut ranked: Vec<(String, f64)> = sums.into_iter().collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    ranked.truncate(n);

    let mut pairs: BTreeMap<(String, String), f64> = BTreeMap::new();
    for t in rows {
        let key = primary.get(t);
        if !ranked.iter().any(|(k, _)| k == key) {
            continue;
        }
        *pairs
            .entry((key.to_string(), secondary.get(t).to_string()))
            .or_default() += t.amount;
    }

    ranked
        .into_iter()
        .map(|(key, total)| {
            let segments = pairs
                .iter()
                .filter(|((k, _), _)| *k == key)
                .map(|((_, seg), v)| (seg.clone(), *v))
                .collect();
            SegmentedGroup { key, total, segments }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Amount histogram
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct HistogramBin {
    pub lo: f64,
    pub hi: f64,
    pub count: usize,
}

/// Equal-width bins over [min, max] of the amounts. A single distinct value
/// collapses to one bin; an empty view yields no bins.
pub fn histogram(rows: &[Transaction], bins: usize) -> Vec<HistogramBin> {
    if rows.is_empty() || bins == 0 {
        return Vec::new();
    }
    let min = rows.iter().map(|t| t.amount).fold(f64::INFINITY, f64::min);
    let max = rows.iter().map(|t| t.amount).fold(f64::NEG_INFINITY, f64::max);
    if min == max {
        return vec![HistogramBin {
            lo: min,
            hi: max,
            count: rows.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for t in rows {
        let idx = (((t.amount - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lo: min + width * i as f64,
            hi: min + width * (i + 1) as f64,
            count,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Merchant monthly matrices
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct MerchantMatrix {
    /// Top merchants by total transaction count, highest first.
    pub merchants: Vec<String>,
    /// Every calendar month in range, zero-filled.
    pub months: Vec<NaiveDate>,
    /// counts[m][i] = transactions for merchants[m] in months[i].
    pub counts: Vec<Vec<usize>>,
    /// totals[m][i] = summed amount for merchants[m] in months[i].
    pub totals: Vec<Vec<f64>>,
}

/// Cross the top `n` merchants (ranked by overall transaction count, ties by
/// name order) with every calendar month in the filtered range.
pub fn merchant_matrix(rows: &[Transaction], n: usize) -> MerchantMatrix {
    let mut cells: BTreeMap<(String, NaiveDate), (usize, f64)> = BTreeMap::new();
    let mut overall: BTreeMap<String, usize> = BTreeMap::new();
    for t in rows {
        let month = Frequency::Monthly.bucket_start(t.timestamp.date());
        let cell = cells.entry((t.merchant.clone(), month)).or_insert((0, 0.0));
        cell.0 += 1;
        cell.1 += t.amount;
        *overall.entry(t.merchant.clone()).or_default() += 1;
    }

    let mut ranked: Vec<(String, usize)> = overall.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(n);
    let merchants: Vec<String> = ranked.into_iter().map(|(m, _)| m).collect();

    let mut months = Vec::new();
    let month_keys: Vec<NaiveDate> = cells.keys().map(|(_, m)| *m).collect();
    if let (Some(&first), Some(&last)) = (month_keys.iter().min(), month_keys.iter().max()) {
        let mut month = first;
        while month <= last {
            months.push(month);
            month = Frequency::Monthly.advance(month);
        }
    }

    let counts = merchants
        .iter()
        .map(|m| {
            months
                .iter()
                .map(|mo| cells.get(&(m.clone(), *mo)).map_or(0, |c| c.0))
                .collect()
        })
        .collect();
    let totals = merchants
        .iter()
        .map(|m| {
            months
                .iter()
                .map(|mo| cells.get(&(m.clone(), *mo)).map_or(0.0, |c| c.1))
                .collect()
        })
        .collect();

    MerchantMatrix {
        merchants,
        months,
        counts,
        totals,
    }
}
