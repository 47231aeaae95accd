//! Output formatting

use std::io::Write;

use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use sqlimpact_core::{AnalysisError, ModificationRecord, ProcedureSignature, SyntaxError};

use crate::args::OutputFormat;

/// Error object of the line-delimited format
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct ErrorRecord {
    category: &'static str,
    message: String,
}

/// Output formatter for analysis results
pub struct OutputFormatter {
    format: OutputFormat,
    file_name: String,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat, file_name: String) -> Self {
        Self { format, file_name }
    }

    pub fn print_modifications(&self, records: &[ModificationRecord]) -> Result<()> {
        let mut out = std::io::stdout().lock();
        match self.format {
            OutputFormat::Json => print_json(&mut out, &records),
            OutputFormat::Ndjson => records
                .iter()
                .try_for_each(|record| print_ndjson(&mut out, record)),
            OutputFormat::Human => print_modification_table(&mut out, records),
        }
    }

    pub fn print_signature(&self, signature: &ProcedureSignature) -> Result<()> {
        let mut out = std::io::stdout().lock();
        match self.format {
            OutputFormat::Json => print_json(&mut out, signature),
            OutputFormat::Ndjson => print_ndjson(&mut out, signature),
            OutputFormat::Human => print_signature_listing(&mut out, signature),
        }
    }

    /// Report a failed analysis; only the line-delimited format uses stdout
    pub fn print_error(&self, error: &AnalysisError, source: &str) -> Result<()> {
        match self.format {
            OutputFormat::Json => {
                for message in error_messages(error) {
                    eprintln!("{}", message);
                }
                Ok(())
            }
            OutputFormat::Ndjson => {
                let category = match error {
                    AnalysisError::Syntax { .. } => "InvalidArgument",
                    AnalysisError::DuplicateDefinition { .. } => "InvalidData",
                };
                let mut out = std::io::stdout().lock();
                error_messages(error).into_iter().try_for_each(|message| {
                    print_ndjson(&mut out, &ErrorRecord { category, message })
                })
            }
            OutputFormat::Human => {
                self.print_human_error(error, source);
                Ok(())
            }
        }
    }

    fn print_human_error(&self, error: &AnalysisError, source: &str) {
        let errors = error.syntax_errors();
        if errors.is_empty() {
            eprintln!("\x1b[31merror\x1b[0m[{}]: {}", error.code(), error);
            eprintln!("  --> {}", self.file_name);
            eprintln!();
            return;
        }

        for syntax_error in errors {
            self.print_syntax_error(error.code(), syntax_error, source);
        }
        eprintln!(
            "Found {} syntax error(s) in {}",
            errors.len(),
            self.file_name
        );
    }

    fn print_syntax_error(&self, code: &str, error: &SyntaxError, source: &str) {
        let (line, col) = (error.line(), error.column());
        eprintln!("\x1b[31merror\x1b[0m[{}]: {}", code, error.message);
        eprintln!("  --> {}:{}:{}", self.file_name, line, col);

        if let Some(source_line) = get_source_line(source, line) {
            eprintln!("   |");
            eprintln!("{:>3} | {}", line, source_line);
            let padding = " ".repeat(col.saturating_sub(1));
            eprintln!("   | {}^", padding);
        }

        eprintln!();
    }
}

/// `<message> Line:<line>:<column>` per syntax error, or the failure itself
fn error_messages(error: &AnalysisError) -> Vec<String> {
    match error {
        AnalysisError::Syntax { errors } => errors.iter().map(ToString::to_string).collect(),
        other => vec![other.to_string()],
    }
}

fn print_json<T: Serialize + ?Sized>(out: &mut impl Write, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).into_diagnostic()?;
    writeln!(out, "{}", json).into_diagnostic()
}

fn print_ndjson<T: Serialize + ?Sized>(out: &mut impl Write, value: &T) -> Result<()> {
    let json = serde_json::to_string(value).into_diagnostic()?;
    writeln!(out, "{}", json).into_diagnostic()
}

fn print_modification_table(out: &mut impl Write, records: &[ModificationRecord]) -> Result<()> {
    if records.is_empty() {
        return writeln!(out, "No modifications").into_diagnostic();
    }

    let width = records
        .iter()
        .map(|record| record.table.len())
        .max()
        .unwrap_or(0)
        .max("Table".len());

    writeln!(out, "{:<6}  {:<width$}  Columns", "Action", "Table").into_diagnostic()?;
    for record in records {
        let columns = record
            .columns
            .as_ref()
            .map(|columns| columns.join(", "))
            .unwrap_or_default();
        let line = format!("{:<6}  {:<width$}  {}", record.action, record.table, columns);
        writeln!(out, "{}", line.trim_end()).into_diagnostic()?;
    }

    Ok(())
}

fn print_signature_listing(out: &mut impl Write, signature: &ProcedureSignature) -> Result<()> {
    let Some(name) = &signature.name else {
        return writeln!(out, "No procedure definition").into_diagnostic();
    };

    writeln!(out, "Procedure: {}", name).into_diagnostic()?;
    if signature.parameters.is_empty() {
        writeln!(out, "  (no parameters)").into_diagnostic()?;
    }
    for parameter in &signature.parameters {
        writeln!(out, "  - {}", parameter).into_diagnostic()?;
    }

    Ok(())
}

/// Get a specific line from source (1-indexed)
fn get_source_line(source: &str, line: usize) -> Option<&str> {
    source.lines().nth(line.saturating_sub(1))
}
