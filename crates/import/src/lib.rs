pub mod config;
pub mod csv;
pub mod match_engine;
pub mod report;
pub mod validation;

pub use config::{ConfigError, ReconcileConfig};
pub use csv::{CsvError, CsvImportProfile, CsvImporter};
pub use match_engine::{find_deposits, summarize, ReconcileSummary, ReconciliationEngine};
pub use report::{ReportError, ReportProfile, ReportRow};
pub use validation::{Field, RawRow, ValidationIssue};

pub mod import {
    use crate::*;
    use remesa_core::{MatchResult, ReconcileError, Record};

    pub fn import_records<R: std::io::Read>(
        data: R,
        profile: &CsvImportProfile,
    ) -> Result<Vec<Record>, CsvError> {
        crate::csv::import_records(data, profile)
    }

    pub fn reconcile(deposits: &[Record], payments: &[Record]) -> Result<Vec<MatchResult>, ReconcileError> {
        ReconciliationEngine::new().reconcile(deposits, payments)
    }

    pub fn export_report<W: std::io::Write>(
        out: W,
        results: &[MatchResult],
        profile: &ReportProfile,
    ) -> Result<(), ReportError> {
        crate::report::write_report(out, results, profile)
    }
}
