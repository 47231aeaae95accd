//! Configured record filters

use glob::{MatchOptions, Pattern};
use miette::{IntoDiagnostic, Result, WrapErr};
use sqlimpact_core::ModificationRecord;

use crate::config::Config;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Drops modification records by table name
#[derive(Debug, Default)]
pub struct RecordFilter {
    exclude: Vec<Pattern>,
    skip_temp_tables: bool,
}

impl RecordFilter {
    pub fn from_config(config: &Config) -> Result<Self> {
        let exclude = config
            .exclude
            .iter()
            .map(|pattern| {
                Pattern::new(pattern)
                    .into_diagnostic()
                    .wrap_err_with(|| format!("invalid exclude pattern '{}'", pattern))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            exclude,
            skip_temp_tables: config.skip_temp_tables,
        })
    }

    pub fn excludes(&self, record: &ModificationRecord) -> bool {
        (self.skip_temp_tables && record.table.starts_with('#'))
            || self
                .exclude
                .iter()
                .any(|pattern| pattern.matches_with(&record.table, MATCH_OPTIONS))
    }

    pub fn apply(&self, records: Vec<ModificationRecord>) -> Vec<ModificationRecord> {
        let before = records.len();
        let kept: Vec<_> = records
            .into_iter()
            .filter(|record| !self.excludes(record))
            .collect();
        if kept.len() != before {
            tracing::info!(dropped = before - kept.len(), "filtered modification records");
        }
        kept
    }
}
