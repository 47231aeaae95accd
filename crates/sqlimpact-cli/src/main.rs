//! sqlimpact CLI - T-SQL script impact analysis

mod args;
mod config;
mod filter;
mod output;

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use miette::{IntoDiagnostic, Result, WrapErr};
use sqlimpact_core::Analyzer;
use tracing::Level;

use crate::args::{Args, Command, OutputFormat};
use crate::config::Config;
use crate::filter::RecordFilter;
use crate::output::OutputFormatter;

/// Exit status of a script that failed analysis (-1 as an unsigned byte)
const ANALYSIS_FAILED: u8 = 255;

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose, args.quiet);

    match run(args) {
        Ok(has_errors) => {
            if has_errors {
                ExitCode::from(ANALYSIS_FAILED)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("Error: {:?}", e);
            ExitCode::from(2)
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::ERROR,
        (false, 0) => Level::WARN,
        (false, 1) => Level::INFO,
        (false, 2) => Level::DEBUG,
        (false, _) => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: Args) -> Result<bool> {
    let analyzer = Analyzer::new();

    match args.command {
        Command::Modifications {
            file,
            output,
            exclude,
            skip_temp_tables,
        } => {
            let config = Config::load(output.config.as_deref())?.merge_with_args(
                output.format,
                &exclude,
                skip_temp_tables,
            );
            let filter = RecordFilter::from_config(&config)?;
            let formatter = OutputFormatter::new(config.output_format(), display_name(&file));

            let content = read_source(&file)?;
            match analyzer.modifications(&content) {
                Ok(records) => {
                    let records = filter.apply(records);
                    tracing::info!(records = records.len(), "modifications extracted");
                    formatter.print_modifications(&records)?;
                    Ok(false)
                }
                Err(e) => {
                    formatter.print_error(&e, &content)?;
                    Ok(true)
                }
            }
        }

        Command::Signature { file, output } => {
            let config = Config::load(output.config.as_deref())?.merge_with_args(
                output.format,
                &[],
                false,
            );
            let formatter = OutputFormatter::new(config.output_format(), display_name(&file));

            let content = read_source(&file)?;
            match analyzer.signature(&content) {
                Ok(signature) => {
                    formatter.print_signature(&signature)?;
                    Ok(false)
                }
                Err(e) => {
                    formatter.print_error(&e, &content)?;
                    Ok(true)
                }
            }
        }

        Command::Parse { file } => {
            // Parse and display the tree (for debugging)
            let content = read_source(&file)?;

            match analyzer.parse(&content) {
                Ok(script) => {
                    for (i, node) in script.nodes.iter().enumerate() {
                        println!("Node {}:", i + 1);
                        println!("{:#?}", node);
                        println!();
                    }
                    Ok(false)
                }
                Err(e) => {
                    OutputFormatter::new(OutputFormat::Human, display_name(&file))
                        .print_error(&e, &content)?;
                    Ok(true)
                }
            }
        }
    }
}

/// Read a script from a file, or from standard input for `-`
fn read_source(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        return std::io::read_to_string(std::io::stdin())
            .into_diagnostic()
            .wrap_err("failed to read standard input");
    }

    std::fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to read {}", path.display()))
}

fn display_name(path: &Path) -> String {
    if path == Path::new("-") {
        "<stdin>".to_string()
    } else {
        path.display().to_string()
    }
}
