use chrono::NaiveDate;

use crate::models::Transaction;

// ---------------------------------------------------------------------------
// Filter stages
// ---------------------------------------------------------------------------
//
// Every stage is a pure (table, parameter) -> table function returning a
// fresh Vec. Stages are independent column predicates, so application order
// does not change the result. An absent or empty parameter passes all rows
// through (fail-open): clearing a selector means "no restriction", never
// "nothing".

fn retain<F>(rows: &[Transaction], pred: F) -> Vec<Transaction>
where
    F: Fn(&Transaction) -> bool,
{
    rows.iter().filter(|&t| pred(t)).cloned().collect()
}

fn member(rows: &[Transaction], allowed: &[String], get: fn(&Transaction) -> &str) -> Vec<Transaction> {
    if allowed.is_empty() {
        return rows.to_vec();
    }
    retain(rows, |t| allowed.iter().any(|a| a == get(t)))
}

/// Retain records timestamped within [start 00:00:00, end 23:59:59].
pub fn filter_dates(rows: &[Transaction], range: Option<(NaiveDate, NaiveDate)>) -> Vec<Transaction> {
    let Some((start, end)) = range else {
        return rows.to_vec();
    };
    let lo = start.and_hms_opt(0, 0, 0).unwrap();
    let hi = end.and_hms_opt(23, 59, 59).unwrap();
    retain(rows, |t| t.timestamp >= lo && t.timestamp <= hi)
}

pub fn filter_category(rows: &[Transaction], allowed: &[String]) -> Vec<Transaction> {
    member(rows, allowed, |t| &t.category)
}

pub fn filter_payment(rows: &[Transaction], allowed: &[String]) -> Vec<Transaction> {
    member(rows, allowed, |t| &t.payment_method)
}

pub fn filter_account(rows: &[Transaction], allowed: &[String]) -> Vec<Transaction> {
    member(rows, allowed, |t| &t.account_type)
}

pub fn filter_transaction(rows: &[Transaction], allowed: &[String]) -> Vec<Transaction> {
    member(rows, allowed, |t| &t.transaction_type)
}

// ---------------------------------------------------------------------------
// FilterSet
// ---------------------------------------------------------------------------

/// The active filter parameters, applied as a sequential pipeline.
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub categories: Vec<String>,
    pub payment_methods: Vec<String>,
    pub account_types: Vec<String>,
    pub transaction_types: Vec<String>,
}

impl FilterSet {
    pub fn apply(&self, rows: &[Transaction]) -> Vec<Transaction> {
        let rows = filter_dates(rows, self.date_range);
        let rows = filter_category(&rows, &self.categories);
        let rows = filter_payment(&rows, &self.payment_methods);
        let rows = filter_account(&rows, &self.account_types);
        filter_transaction(&rows, &self.transaction_types)
    }

    pub fn is_unrestricted(&self) -> bool {
        self.date_range.is_none()
            && self.categories.is_empty()
            && self.payment_methods.is_empty()
            && self.account_types.is_empty()
            && self.transaction_types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn txn(date: &str, category: &str, payment: &str) -> Transaction {
        Transaction {
            timestamp: crate::store::parse_timestamp(date).unwrap(),
            amount: 10.0,
            category: category.to_string(),
            merchant: "M".to_string(),
            payment_method: payment.to_string(),
            account_type: "personal".to_string(),
            transaction_type: "purchase".to_string(),
        }
    }

    fn sample() -> Vec<Transaction> {
        vec![
            txn("2025-01-15", "Groceries", "credit_card"),
            txn("2025-01-31 23:59:59", "Travel", "debit_card"),
            txn("2025-02-01", "Travel", "credit_card"),
        ]
    }

    fn strings(vals: &[&str]) -> Vec<String> {
        vals.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_parameter_is_fail_open() {
        let rows = sample();
        assert_eq!(filter_category(&rows, &[]), rows);
        assert_eq!(filter_payment(&rows, &[]), rows);
        assert_eq!(filter_account(&rows, &[]), rows);
        assert_eq!(filter_transaction(&rows, &[]), rows);
        assert_eq!(filter_dates(&rows, None), rows);
    }

    #[test]
    fn test_full_universe_parameter_is_identity() {
        let rows = sample();
        let all_cats = strings(&["Groceries", "Travel"]);
        assert_eq!(filter_category(&rows, &all_cats), rows);
        let all_payments = strings(&["credit_card", "debit_card"]);
        assert_eq!(filter_payment(&rows, &all_payments), rows);
    }

    #[test]
    fn test_category_membership() {
        let rows = sample();
        let filtered = filter_category(&rows, &strings(&["Travel"]));
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|t| t.category == "Travel"));
    }

    #[test]
    fn test_date_range_end_day_is_inclusive() {
        let rows = sample();
        let range = Some((
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
        ));
        let filtered = filter_dates(&rows, range);
        // 23:59:59 on the end date stays; midnight the next day is out.
        assert_eq!(filtered.len(), 2);
        let last = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        assert!(filtered.iter().any(|t| t.timestamp.date() == last));
    }

    #[test]
    fn test_date_range_excludes_next_midnight() {
        let rows = vec![txn("2025-02-01 00:00:00", "Travel", "credit_card")];
        let range = Some((
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
        ));
        assert!(filter_dates(&rows, range).is_empty());
    }

    #[test]
    fn test_stages_do_not_mutate_input() {
        let rows = sample();
        let before = rows.clone();
        let _ = filter_category(&rows, &strings(&["Travel"]));
        let _ = filter_dates(&rows, Some((
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
        )));
        assert_eq!(rows, before);
    }

    #[test]
    fn test_stage_order_is_commutative() {
        let rows = sample();
        let cats = strings(&["Travel"]);
        let pays = strings(&["credit_card"]);
        let a = filter_payment(&filter_category(&rows, &cats), &pays);
        let b = filter_category(&filter_payment(&rows, &pays), &cats);
        assert_eq!(a, b);
    }

    #[test]
    fn test_filter_set_pipeline() {
        let rows = sample();
        let set = FilterSet {
            date_range: Some((
                NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
            )),
            categories: strings(&["Travel"]),
            payment_methods: strings(&["credit_card"]),
            ..Default::default()
        };
        let filtered = set.apply(&rows);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].timestamp.date(), NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());
        assert!(!set.is_unrestricted());
        assert!(FilterSet::default().is_unrestricted());
    }
}
