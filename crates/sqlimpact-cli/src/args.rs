//! CLI argument definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "sqlimpact")]
#[command(
    author,
    version,
    about = "Report the tables T-SQL scripts modify and the procedures they define"
)]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// List insert, update and delete targets of a script
    Modifications {
        /// Script to analyze (`-` reads standard input)
        file: PathBuf,

        #[command(flatten)]
        output: OutputArgs,

        /// Drop records whose table matches this glob (repeatable)
        #[arg(long = "exclude", value_name = "PATTERN")]
        exclude: Vec<String>,

        /// Drop records targeting #temporary tables
        #[arg(long)]
        skip_temp_tables: bool,
    },

    /// Show the name and parameters of the procedure a script defines
    Signature {
        /// Script to analyze (`-` reads standard input)
        file: PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Parse a script and display its tree (for debugging)
    Parse {
        /// Script to parse (`-` reads standard input)
        file: PathBuf,
    },
}

#[derive(clap::Args)]
pub struct OutputArgs {
    /// Output format [default: json]
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Configuration file (defaults to the nearest sqlimpact.toml)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Indented JSON document
    #[default]
    Json,
    /// One JSON object per line, errors included
    Ndjson,
    /// Human-readable listing
    Human,
}
