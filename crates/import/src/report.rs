use remesa_core::MatchResult;
use serde::{Deserialize, Serialize};
use std::io::Write;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportProfile {
    pub delimiter: String,
    pub has_header: bool,
}

impl Default for ReportProfile {
    fn default() -> Self {
        Self {
            delimiter: ",".to_string(),
            has_header: true,
        }
    }
}

impl ReportProfile {
    pub(crate) fn delimiter_byte(&self) -> u8 {
        self.delimiter.as_bytes().first().copied().unwrap_or(b',')
    }
}

/// One exported line. Payment columns are filled only on the first line of
/// each match, so a payment funded by three deposits spans three lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub date: String,
    pub total: String,
    #[serde(rename = "deposit date")]
    pub deposit_date: String,
    pub deposit: String,
}

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}

pub fn flatten(results: &[MatchResult]) -> Vec<ReportRow> {
    results
        .iter()
        .flat_map(|r| {
            let payment_date = r.payment.date.clone();
            let total = r.payment.amount.to_string();

            if r.deposits().is_empty() {
                return vec![ReportRow {
                    date: payment_date,
                    total,
                    deposit_date: String::new(),
                    deposit: String::new(),
                }];
            }

            r.deposits()
                .iter()
                .enumerate()
                .map(|(i, d)| ReportRow {
                    date: if i == 0 { payment_date.clone() } else { String::new() },
                    total: if i == 0 { total.clone() } else { String::new() },
                    deposit_date: d.date.clone(),
                    deposit: d.amount.to_string(),
                })
                .collect()
        })
        .collect()
}

pub fn write_report<W: Write>(
    out: W,
    results: &[MatchResult],
    profile: &ReportProfile,
) -> Result<(), ReportError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(profile.has_header)
        .delimiter(profile.delimiter_byte())
        .from_writer(out);

    let rows = flatten(results);
    for row in &rows {
        writer.serialize(row)?;
    }
    // An empty run still gets its header line.
    if rows.is_empty() && profile.has_header {
        writer.write_record(["date", "total", "deposit date", "deposit"])?;
    }
    writer.flush()?;

    tracing::debug!(rows = rows.len(), "report written");
    Ok(())
}
