use chrono::NaiveDateTime;
use num_traits::Zero;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Semantic classification of a payment, independent of the source
/// institution's vocabulary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentType {
    #[default]
    Undefined,
    Card,
    Transaction,
    MobileOperator,
    Fees,
    Saving,
}

impl PaymentType {
    /// Resolves an institution's type string against its ordered lookup
    /// table. Unmatched strings classify as [`PaymentType::Undefined`];
    /// that is not an error condition.
    pub fn classify(table: &[(&str, PaymentType)], raw: &str) -> PaymentType {
        match table.iter().find(|(label, _)| *label == raw) {
            Some((_, payment_type)) => *payment_type,
            None => {
                if !raw.is_empty() {
                    log::debug!("unclassified transaction type: {raw:?}");
                }
                PaymentType::Undefined
            }
        }
    }
}

/// One monetary movement, normalized from a notification email or an
/// export row.
///
/// `price` always uses `.` as the decimal separator regardless of the
/// source locale; the sign convention follows the source (outgoing
/// transfers are negative where the source distinguishes direction).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub transaction_type: PaymentType,
    pub price: Decimal,
    /// Counterparty account, `number[-number]/bankcode` where applicable
    pub account: Option<String>,
    /// Own account in the same format
    pub account_from: Option<String>,
    pub constant_symbol: Option<String>,
    /// Variable symbol with leading zeros stripped
    pub variable_symbol: Option<String>,
    pub specific_symbol: Option<String>,
    /// Counterparty name as stated by the source
    pub detail_from: Option<String>,
    pub description: Option<String>,
    pub message: Option<String>,
    pub place: Option<String>,
    pub date: NaiveDateTime,
}

impl Payment {
    /// Fresh record carrying only its default date. Strategies fill the
    /// remaining fields as recognized lines or columns are encountered.
    pub fn at(date: NaiveDateTime) -> Self {
        Payment {
            transaction_type: PaymentType::default(),
            price: Decimal::ZERO,
            account: None,
            account_from: None,
            constant_symbol: None,
            variable_symbol: None,
            specific_symbol: None,
            detail_from: None,
            description: None,
            message: None,
            place: None,
            date,
        }
    }

    /// A record is only worth yielding once an amount was actually seen.
    pub fn has_price(&self) -> bool {
        !self.price.is_zero()
    }
}

/// One account snapshot. When several snapshots are produced for the same
/// account within one parse run, only the latest-dated one is retained.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub account: Option<String>,
    pub account_from: Option<String>,
    pub balance: Option<Decimal>,
    pub currency: Option<String>,
    pub date: Option<NaiveDateTime>,
}

impl Balance {
    /// True when `other` is a more recent snapshot than `self`.
    pub fn is_older_than(&self, other: &Balance) -> bool {
        match (self.date, other.date) {
            (Some(mine), Some(theirs)) => mine < theirs,
            (None, Some(_)) => true,
            _ => false,
        }
    }
}
