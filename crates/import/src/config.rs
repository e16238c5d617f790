use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::csv::CsvImportProfile;
use crate::report::ReportProfile;

/// Everything needed to read both inputs and write the report. Missing
/// sections fall back to the defaults.
///
/// ```toml
/// [deposits]
/// delimiter = ";"
/// date_separator = "-"
///
/// [report]
/// has_header = false
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    pub deposits: CsvImportProfile,
    pub payments: CsvImportProfile,
    pub report: ReportProfile,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            deposits: CsvImportProfile::deposits(),
            payments: CsvImportProfile::payments(),
            report: ReportProfile::default(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("{0}: delimiter must be a single byte, got {1:?}")]
    Delimiter(&'static str, String),
}

impl ReconcileConfig {
    pub fn from_toml(toml_content: &str) -> Result<Self, ConfigError> {
        let config: ReconcileConfig = toml::from_str(toml_content)?;
        config.check()?;
        Ok(config)
    }

    /// Applies one date separator to both inputs.
    pub fn with_date_separator(mut self, separator: char) -> Self {
        self.deposits.date_separator = separator;
        self.payments.date_separator = separator;
        self
    }

    fn check(&self) -> Result<(), ConfigError> {
        for (name, delimiter) in [
            ("deposits", &self.deposits.delimiter),
            ("payments", &self.payments.delimiter),
            ("report", &self.report.delimiter),
        ] {
            if delimiter.len() != 1 {
                return Err(ConfigError::Delimiter(name, delimiter.clone()));
            }
        }
        Ok(())
    }
}
