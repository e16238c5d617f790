use remesa_core::{parse_amount, AmountError, DateError, DateFormat, DateParser, Record};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Read;
use thiserror::Error;

use crate::validation::{validate_rows, RawRow, ValidationIssue};

/// Describes how to read one file of records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvImportProfile {
    pub name: String,
    pub delimiter: String,
    pub has_header: bool,
    pub date_column: usize,
    pub amount_column: usize,
    /// Column carrying a stable identifier. When absent, ids are
    /// `{id_prefix}{row}`.
    pub id_column: Option<usize>,
    pub id_prefix: String,
    pub date_separator: char,
}

impl Default for CsvImportProfile {
    fn default() -> Self {
        Self {
            name: "Unnamed Profile".to_string(),
            delimiter: ",".to_string(),
            has_header: true,
            date_column: 0,
            amount_column: 1,
            id_column: None,
            id_prefix: "row-".to_string(),
            date_separator: '/',
        }
    }
}

impl CsvImportProfile {
    pub fn deposits() -> Self {
        Self {
            name: "deposits".to_string(),
            id_prefix: "d".to_string(),
            ..Self::default()
        }
    }

    pub fn payments() -> Self {
        Self {
            name: "payments".to_string(),
            id_prefix: "p".to_string(),
            ..Self::default()
        }
    }

    pub fn date_format(&self) -> DateFormat {
        DateFormat::new(self.date_separator)
    }

    pub(crate) fn delimiter_byte(&self) -> u8 {
        self.delimiter.as_bytes().first().copied().unwrap_or(b',')
    }
}

#[derive(Error, Debug)]
pub enum CsvError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("Missing required column: {0}")]
    MissingColumn(String),
    #[error("Invalid rows: {}", join_issues(.0))]
    Validation(Vec<ValidationIssue>),
    #[error("Invalid date format: {0}")]
    InvalidDate(#[from] DateError),
    #[error("Invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),
    #[error("Duplicate id: {0}")]
    DuplicateId(String),
    #[error("No data rows")]
    NoDataRows,
}

fn join_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

pub struct CsvImporter;

impl CsvImporter {
    pub fn read_rows<R: Read>(
        reader: &mut csv::Reader<R>,
        profile: &CsvImportProfile,
    ) -> Result<Vec<RawRow>, CsvError> {
        let mut rows = Vec::new();

        for result in reader.records() {
            let record = result?;

            if record.iter().all(|field| field.trim().is_empty()) {
                continue;
            }

            let line = rows.len() + 1;
            let field = |col: usize, name: &str| {
                record
                    .get(col)
                    .map(|s| s.trim().to_string())
                    .ok_or_else(|| CsvError::MissingColumn(format!("{name} column {col} (row {line})")))
            };

            let date = field(profile.date_column, "date")?;
            let amount = field(profile.amount_column, "amount")?;
            let id = profile
                .id_column
                .map(|col| field(col, "id"))
                .transpose()?
                .filter(|s| !s.is_empty());

            rows.push(RawRow { line, id, date, amount });
        }

        if rows.is_empty() {
            return Err(CsvError::NoDataRows);
        }

        Ok(rows)
    }

    /// Converts rows that already passed validation.
    pub fn to_records(
        rows: Vec<RawRow>,
        profile: &CsvImportProfile,
        dates: &DateParser,
    ) -> Result<Vec<Record>, CsvError> {
        let mut seen = HashSet::new();
        let mut records = Vec::with_capacity(rows.len());

        for row in rows {
            let id = row
                .id
                .unwrap_or_else(|| format!("{}{}", profile.id_prefix, row.line));
            if !seen.insert(id.clone()) {
                return Err(CsvError::DuplicateId(id));
            }
            let amount = parse_amount(&row.amount)?;
            records.push(Record::parse(id, &row.date, amount, dates)?);
        }

        Ok(records)
    }

    pub fn detect_columns<R: Read>(reader: &mut csv::Reader<R>) -> Result<Vec<String>, CsvError> {
        let mut headers = Vec::new();

        if let Some(result) = reader.records().next() {
            let record = result?;
            headers = record.iter().map(|s| s.to_string()).collect();
        }

        Ok(headers)
    }
}

pub fn parse<R: Read>(
    reader: &mut csv::Reader<R>,
    profile: &CsvImportProfile,
) -> Result<Vec<Record>, CsvError> {
    let rows = CsvImporter::read_rows(reader, profile)?;

    let dates = profile.date_format().parser();
    let issues = validate_rows(&rows, &dates);
    if !issues.is_empty() {
        tracing::warn!(profile = %profile.name, count = issues.len(), "rows failed validation");
        return Err(CsvError::Validation(issues));
    }

    let records = CsvImporter::to_records(rows, profile, &dates)?;
    tracing::debug!(profile = %profile.name, count = records.len(), "records imported");
    Ok(records)
}

pub fn import_records<R: Read>(data: R, profile: &CsvImportProfile) -> Result<Vec<Record>, CsvError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(profile.has_header)
        .delimiter(profile.delimiter_byte())
        .flexible(true)
        .from_reader(data);

    parse(&mut reader, profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use remesa_core::Money;

    // ── import_records ────────────────────────────────────────────────────────

    #[test]
    fn import_basic() {
        let data = b"date,amount\n01/02/2024,5.00\n02/02/2024,3\n";
        let records = import_records(data.as_ref(), &CsvImportProfile::deposits()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id.as_str(), "d1");
        assert_eq!(records[0].amount, Money::from_cents(500));
        assert_eq!(records[1].id.as_str(), "d2");
        assert_eq!(records[1].amount, Money::from_cents(300));
        assert!(records[0].date_value < records[1].date_value);
    }

    #[test]
    fn import_with_id_column_and_semicolons() {
        let data = b"ref;date;amount\nA-1;15-01-2024;10.50\nA-2;16-01-2024;0.99\n";
        let profile = CsvImportProfile {
            delimiter: ";".to_string(),
            id_column: Some(0),
            date_column: 1,
            amount_column: 2,
            date_separator: '-',
            ..CsvImportProfile::payments()
        };
        let records = import_records(data.as_ref(), &profile).unwrap();
        assert_eq!(records[0].id.as_str(), "A-1");
        assert_eq!(records[0].date, "15-01-2024");
        assert_eq!(records[1].amount, Money::from_cents(99));
    }

    #[test]
    fn import_without_header() {
        let data = b"01/02/2024,1.00\n";
        let profile = CsvImportProfile {
            has_header: false,
            ..CsvImportProfile::payments()
        };
        let records = import_records(data.as_ref(), &profile).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id.as_str(), "p1");
    }

    #[test]
    fn blank_rows_are_skipped() {
        let data = b"date,amount\n01/02/2024,1.00\n,\n02/02/2024,2.00\n";
        let records = import_records(data.as_ref(), &CsvImportProfile::deposits()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].id.as_str(), "d2");
    }

    #[test]
    fn invalid_rows_are_terminal() {
        let data = b"date,amount\n2024-02-01,1.00\n01/02/2024,-3\n";
        let err = import_records(data.as_ref(), &CsvImportProfile::deposits()).unwrap_err();
        match err {
            CsvError::Validation(issues) => assert_eq!(issues.len(), 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn many_rows_share_one_parser() {
        let mut data = String::from("date,amount\n");
        for i in 0..5_000 {
            data.push_str(&format!("{:02}/02/2024,{}.00\n", i % 28 + 1, i));
        }
        let records = import_records(data.as_bytes(), &CsvImportProfile::deposits()).unwrap();
        assert_eq!(records.len(), 5_000);
        assert_eq!(records[4_999].id.as_str(), "d5000");
    }

    #[test]
    fn missing_column_errors() {
        let data = b"date,amount\n01/02/2024\n";
        let err = import_records(data.as_ref(), &CsvImportProfile::deposits()).unwrap_err();
        assert!(matches!(err, CsvError::MissingColumn(_)));
    }

    #[test]
    fn duplicate_ids_error() {
        let data = b"id,date,amount\nx,01/02/2024,1\nx,02/02/2024,2\n";
        let profile = CsvImportProfile {
            id_column: Some(0),
            date_column: 1,
            amount_column: 2,
            ..CsvImportProfile::deposits()
        };
        let err = import_records(data.as_ref(), &profile).unwrap_err();
        assert!(matches!(err, CsvError::DuplicateId(id) if id == "x"));
    }

    #[test]
    fn no_data_rows_errors() {
        let data = b"date,amount\n";
        let result = import_records(data.as_ref(), &CsvImportProfile::deposits());
        assert!(matches!(result, Err(CsvError::NoDataRows)));
    }

    // ── detect_columns ────────────────────────────────────────────────────────

    #[test]
    fn detect_columns_reads_first_row() {
        let data = b"fecha,monto\n01/02/2024,1\n";
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(data.as_ref());
        let headers = CsvImporter::detect_columns(&mut reader).unwrap();
        assert_eq!(headers, vec!["fecha", "monto"]);
    }
}
