use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    #[error("Date does not match DD{sep}MM{sep}YYYY: {value}")]
    Shape { value: String, sep: char },
    #[error("Not a calendar day: {0}")]
    OutOfCalendar(String),
}

/// Day/month/year layout with a configurable separator, e.g. `15/01/2024`.
/// The day may have one or two digits; month and year are fixed width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateFormat {
    pub separator: char,
}

impl Default for DateFormat {
    fn default() -> Self {
        Self { separator: '/' }
    }
}

impl DateFormat {
    pub fn new(separator: char) -> Self {
        Self { separator }
    }

    /// Compiles the shape check for this layout. Build one per import and
    /// reuse it for every row.
    pub fn parser(&self) -> DateParser {
        let sep = regex::escape(&self.separator.to_string());
        // Escaped input cannot produce an invalid pattern.
        let shape = Regex::new(&format!(r"^[0-9]{{1,2}}{sep}[0-9]{{2}}{sep}[0-9]{{4}}$"))
            .expect("date shape pattern");
        DateParser { format: *self, shape }
    }
}

/// A [`DateFormat`] with its shape pattern compiled.
#[derive(Debug, Clone)]
pub struct DateParser {
    format: DateFormat,
    shape: Regex,
}

impl DateParser {
    pub fn format(&self) -> DateFormat {
        self.format
    }

    pub fn validate(&self, value: &str) -> bool {
        self.shape.is_match(value)
    }

    /// True when every value has the date shape; an empty slice passes.
    pub fn validate_dates(&self, values: &[&str]) -> bool {
        values.iter().all(|v| self.validate(v))
    }

    pub fn parse(&self, value: &str) -> Result<NaiveDate, DateError> {
        let sep = self.format.separator;
        if !self.validate(value) {
            return Err(DateError::Shape {
                value: value.to_string(),
                sep,
            });
        }

        let mut parts = value.split(sep);
        let mut next = || parts.next().and_then(|p| p.parse::<u32>().ok());
        let (day, month, year) = match (next(), next(), next()) {
            (Some(d), Some(m), Some(y)) => (d, m, y),
            _ => return Err(DateError::OutOfCalendar(value.to_string())),
        };

        NaiveDate::from_ymd_opt(year as i32, month, day)
            .ok_or_else(|| DateError::OutOfCalendar(value.to_string()))
    }
}

/// Position of a calendar day on a totally ordered timeline: days counted
/// from 0001-01-01 (day 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateValue(pub i64);

impl DateValue {
    pub fn from_date(date: NaiveDate) -> Self {
        DateValue(i64::from(date.num_days_from_ce()))
    }
}

impl fmt::Display for DateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // ── validate ──────────────────────────────────────────────────────────────

    #[test]
    fn validate_accepts_one_or_two_digit_day() {
        let fmt = DateFormat::default().parser();
        assert!(fmt.validate("01/02/2024"));
        assert!(fmt.validate("1/02/2024"));
    }

    #[test]
    fn validate_rejects_short_month_and_year() {
        let fmt = DateFormat::default().parser();
        assert!(!fmt.validate("01/2/2024"));
        assert!(!fmt.validate("01/02/24"));
        assert!(!fmt.validate("2024-02-01"));
        assert!(!fmt.validate(" 01/02/2024"));
    }

    #[test]
    fn validate_with_custom_separator() {
        let fmt = DateFormat::new('-').parser();
        assert!(fmt.validate("15-01-2024"));
        assert!(!fmt.validate("15/01/2024"));

        // '.' is a regex metacharacter and must match literally.
        let dotted = DateFormat::new('.').parser();
        assert!(dotted.validate("15.01.2024"));
        assert!(!dotted.validate("15x01x2024"));
    }

    #[test]
    fn validate_dates_requires_every_value() {
        let fmt = DateFormat::default().parser();
        assert!(fmt.validate_dates(&["01/02/2024", "2/03/2024"]));
        assert!(!fmt.validate_dates(&["01/02/2024", "bad"]));
        assert!(fmt.validate_dates(&[]));
    }

    #[test]
    fn validate_rejects_non_ascii_digits() {
        let fmt = DateFormat::default().parser();
        assert!(!fmt.validate("١٥/٠١/٢٠٢٤"));
        assert!(!fmt.validate("１５/01/2024"));
    }

    // ── parse ─────────────────────────────────────────────────────────────────

    #[test]
    fn parse_day_month_year() {
        let fmt = DateFormat::default().parser();
        assert_eq!(fmt.parse("01/02/2024").unwrap(), date(2024, 2, 1));
        assert_eq!(fmt.parse("9/12/2023").unwrap(), date(2023, 12, 9));
    }

    #[test]
    fn parse_rejects_impossible_day() {
        let fmt = DateFormat::default().parser();
        assert!(matches!(fmt.parse("31/02/2024"), Err(DateError::OutOfCalendar(_))));
        assert!(matches!(fmt.parse("01/13/2024"), Err(DateError::OutOfCalendar(_))));
    }

    #[test]
    fn parse_rejects_bad_shape() {
        let fmt = DateFormat::default().parser();
        assert!(matches!(fmt.parse("2024-02-01"), Err(DateError::Shape { .. })));
        assert!(matches!(fmt.parse("١٥/٠١/٢٠٢٤"), Err(DateError::Shape { sep: '/', .. })));
    }

    #[test]
    fn parser_keeps_its_format() {
        assert_eq!(DateFormat::new('.').parser().format(), DateFormat::new('.'));
    }

    // ── DateValue ─────────────────────────────────────────────────────────────

    #[test]
    fn date_value_follows_calendar_order() {
        let a = DateValue::from_date(date(2024, 2, 1));
        let b = DateValue::from_date(date(2024, 2, 2));
        let c = DateValue::from_date(date(2025, 1, 1));
        assert!(a < b && b < c);
        assert_eq!(b.0 - a.0, 1);
    }

    #[test]
    fn date_value_of_day_one() {
        assert_eq!(DateValue::from_date(date(1, 1, 1)), DateValue(1));
    }
}
