use chrono::NaiveDate;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

use super::date::{DateError, DateFormat, DateParser, DateValue};
use super::money::Money;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        RecordId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single deposit or payment.
///
/// `date` is the day as it was written in the source and `date_value` its
/// position on the timeline. Both are fixed at construction so they cannot
/// drift apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub date: String,
    pub amount: Money,
    pub date_value: DateValue,
}

impl Record {
    pub fn parse(
        id: impl Into<String>,
        date: &str,
        amount: Money,
        dates: &DateParser,
    ) -> Result<Self, DateError> {
        let day = dates.parse(date)?;
        Ok(Record {
            id: RecordId::new(id),
            date: date.to_string(),
            amount,
            date_value: DateValue::from_date(day),
        })
    }

    /// Builds a record from a known day, writing `date` as zero-padded
    /// `DD<sep>MM<sep>YYYY`.
    pub fn from_parts(id: impl Into<String>, day: NaiveDate, amount: Money, format: &DateFormat) -> Self {
        let sep = format.separator;
        Record {
            id: RecordId::new(id),
            date: day.format(&format!("%d{sep}%m{sep}%Y")).to_string(),
            amount,
            date_value: DateValue::from_date(day),
        }
    }
}

/// How a payment was settled.
///
/// A zero payment is `Matched(vec![])`: the empty subset sums to zero. That is
/// a different fact from `Unmatched`, even though both export with no deposit
/// columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    Matched(Vec<Record>),
    Unmatched,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub payment: Record,
    pub outcome: MatchOutcome,
}

impl MatchResult {
    pub fn matched(payment: Record, deposits: Vec<Record>) -> Self {
        MatchResult {
            payment,
            outcome: MatchOutcome::Matched(deposits),
        }
    }

    pub fn unmatched(payment: Record) -> Self {
        MatchResult {
            payment,
            outcome: MatchOutcome::Unmatched,
        }
    }

    pub fn is_matched(&self) -> bool {
        matches!(self.outcome, MatchOutcome::Matched(_))
    }

    pub fn deposits(&self) -> &[Record] {
        match &self.outcome {
            MatchOutcome::Matched(deposits) => deposits,
            MatchOutcome::Unmatched => &[],
        }
    }

    pub fn deposit_total(&self) -> Money {
        self.deposits().iter().map(|d| d.amount).sum()
    }
}

/// Serialises to the flat `{ payment, deposits }` shape.
impl Serialize for MatchResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("MatchResult", 2)?;
        state.serialize_field("payment", &self.payment)?;
        state.serialize_field("deposits", self.deposits())?;
        state.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    #[error("Record {id} has a negative amount: {amount}")]
    NegativeAmount { id: RecordId, amount: Money },
    #[error("Deposit {0} was allocated twice in one run")]
    DepositReused(RecordId),
}
