use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::TransactionId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransactionError {
    #[error("transaction amount must be > 0")]
    ZeroAmount,

    #[error("transaction counterparty cannot be empty")]
    EmptySecondParty,

    #[error("unknown spend category {raw:?}")]
    UnknownCategory { raw: String },

    #[error("unknown payment provider {raw:?}")]
    UnknownProvider { raw: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentProvider {
    Cash,
    #[serde(rename = "SWD Pay")]
    SwdPay,
}

impl PaymentProvider {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            PaymentProvider::Cash => "Cash",
            PaymentProvider::SwdPay => "SWD Pay",
        }
    }
}

impl fmt::Display for PaymentProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PaymentProvider {
    type Err = TransactionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', '_'], " ").as_str() {
            "cash" => Ok(PaymentProvider::Cash),
            "swd pay" | "swdpay" | "swd" => Ok(PaymentProvider::SwdPay),
            _ => Err(TransactionError::UnknownProvider { raw: s.to_owned() }),
        }
    }
}

/// Spending category. Ordering follows the declaration order, which is also
/// the display order of reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SpendCategory {
    Food,
    Entertainment,
    Shopping,
    Transport,
    Others,
}

impl SpendCategory {
    pub const ALL: [SpendCategory; 5] = [
        SpendCategory::Food,
        SpendCategory::Entertainment,
        SpendCategory::Shopping,
        SpendCategory::Transport,
        SpendCategory::Others,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            SpendCategory::Food => "Food",
            SpendCategory::Entertainment => "Entertainment",
            SpendCategory::Shopping => "Shopping",
            SpendCategory::Transport => "Transport",
            SpendCategory::Others => "Others",
        }
    }
}

impl fmt::Display for SpendCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SpendCategory {
    type Err = TransactionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        SpendCategory::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(needle))
            .ok_or_else(|| TransactionError::UnknownCategory { raw: s.to_owned() })
    }
}

/// A single payment. Amounts are whole currency units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    id: TransactionId,
    amount: u64,
    timestamp: DateTime<Utc>,
    second_party: String,
    provider: PaymentProvider,
    category: SpendCategory,
}

impl Transaction {
    /// # Errors
    ///
    /// Returns `TransactionError` if the amount is zero or the counterparty is blank.
    pub fn new(
        id: TransactionId,
        amount: u64,
        timestamp: DateTime<Utc>,
        second_party: impl Into<String>,
        provider: PaymentProvider,
        category: SpendCategory,
    ) -> Result<Self, TransactionError> {
        if amount == 0 {
            return Err(TransactionError::ZeroAmount);
        }
        let second_party: String = second_party.into();
        let second_party = second_party.trim().to_owned();
        if second_party.is_empty() {
            return Err(TransactionError::EmptySecondParty);
        }
        Ok(Self {
            id,
            amount,
            timestamp,
            second_party,
            provider,
            category,
        })
    }

    #[must_use]
    pub fn id(&self) -> TransactionId {
        self.id
    }

    #[must_use]
    pub fn amount(&self) -> u64 {
        self.amount
    }

    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    #[must_use]
    pub fn second_party(&self) -> &str {
        &self.second_party
    }

    #[must_use]
    pub fn provider(&self) -> PaymentProvider {
        self.provider
    }

    #[must_use]
    pub fn category(&self) -> SpendCategory {
        self.category
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn rejects_zero_amount_and_blank_party() {
        let id = TransactionId::from_random_bytes([1; 16]);
        let err = Transaction::new(
            id,
            0,
            fixed_now(),
            "ANC 1",
            PaymentProvider::SwdPay,
            SpendCategory::Food,
        )
        .unwrap_err();
        assert_eq!(err, TransactionError::ZeroAmount);

        let err = Transaction::new(
            id,
            40,
            fixed_now(),
            " ",
            PaymentProvider::Cash,
            SpendCategory::Food,
        )
        .unwrap_err();
        assert_eq!(err, TransactionError::EmptySecondParty);
    }

    #[test]
    fn parses_labels() {
        assert_eq!("SWD Pay".parse::<PaymentProvider>().unwrap(), PaymentProvider::SwdPay);
        assert_eq!("swd-pay".parse::<PaymentProvider>().unwrap(), PaymentProvider::SwdPay);
        assert_eq!("cash".parse::<PaymentProvider>().unwrap(), PaymentProvider::Cash);
        assert!("card".parse::<PaymentProvider>().is_err());

        assert_eq!("transport".parse::<SpendCategory>().unwrap(), SpendCategory::Transport);
        assert!("rent".parse::<SpendCategory>().is_err());
    }
}
