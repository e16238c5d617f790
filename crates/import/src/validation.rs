use remesa_core::{parse_amount, DateParser};
use std::fmt;

/// One row as read from a file, before any typing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// 1-based position among data rows.
    pub line: usize,
    pub id: Option<String>,
    pub date: String,
    pub amount: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Date,
    Amount,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Date => write!(f, "date"),
            Field::Amount => write!(f, "amount"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub line: usize,
    pub field: Field,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}: {}: {}", self.line, self.field, self.message)
    }
}

/// Checks every row's shape and returns all problems found. An empty result
/// means every row can be parsed into a record.
pub fn validate_rows(rows: &[RawRow], dates: &DateParser) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for row in rows {
        if let Err(e) = dates.parse(&row.date) {
            issues.push(ValidationIssue {
                line: row.line,
                field: Field::Date,
                message: e.to_string(),
            });
        }

        match parse_amount(&row.amount) {
            Ok(amount) if amount.is_negative() => issues.push(ValidationIssue {
                line: row.line,
                field: Field::Amount,
                message: format!("must be zero or greater, got {}", row.amount.trim()),
            }),
            Ok(_) => {}
            Err(e) => issues.push(ValidationIssue {
                line: row.line,
                field: Field::Amount,
                message: e.to_string(),
            }),
        }
    }

    issues
}
