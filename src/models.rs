use chrono::NaiveDateTime;

/// One ledger row. Negative amounts are refunds/credits.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub timestamp: NaiveDateTime,
    pub amount: f64,
    pub category: String,
    pub merchant: String,
    pub payment_method: String,
    pub account_type: String,
    pub transaction_type: String,
}

/// Categorical columns of the ledger — enum dispatch instead of stringly
/// column names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Category,
    Merchant,
    PaymentMethod,
    AccountType,
    TransactionType,
}

impl Field {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::Merchant => "merchant",
            Self::PaymentMethod => "payment_method",
            Self::AccountType => "account_type",
            Self::TransactionType => "transaction_type",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Category => "Category",
            Self::Merchant => "Merchant",
            Self::PaymentMethod => "Payment Method",
            Self::AccountType => "Account Type",
            Self::TransactionType => "Transaction Type",
        }
    }

    pub fn get<'a>(&self, txn: &'a Transaction) -> &'a str {
        match self {
            Self::Category => &txn.category,
            Self::Merchant => &txn.merchant,
            Self::PaymentMethod => &txn.payment_method,
            Self::AccountType => &txn.account_type,
            Self::TransactionType => &txn.transaction_type,
        }
    }
}

pub const ALL_FIELDS: &[Field] = &[
    Field::Category,
    Field::Merchant,
    Field::PaymentMethod,
    Field::AccountType,
    Field::TransactionType,
];

pub fn field_by_key(key: &str) -> Option<Field> {
    ALL_FIELDS.iter().find(|f| f.key() == key).copied()
}
