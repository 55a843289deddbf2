use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Sets the level of tracing.
    #[arg(short, long, global = true)]
    pub trace: Option<TraceLevel>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search filings metadata over a range of years, grouped by company.
    ///
    /// Missing companies or file types are prompted for when a terminal is attached.
    Search {
        /// Company id(s) to search for.
        #[arg(short, long = "company")]
        companies: Vec<i64>,

        /// File type label(s) or id(s), e.g. `10-K`, `AR`, `432`.
        #[arg(short, long = "file-type")]
        file_types: Vec<String>,

        #[arg(long, default_value_t = 2020)]
        start_year: i32,

        #[arg(long, default_value_t = 2023)]
        end_year: i32,

        /// Read the search criteria from a JSON file instead.
        #[arg(long, conflicts_with_all = ["companies", "file_types", "start_year", "end_year"])]
        criteria: Option<PathBuf>,

        /// Drop repeated filings per company.
        #[arg(long)]
        dedup: bool,

        /// Write the results to a JSON file.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Request timeout in seconds (overrides CIQ_TIMEOUT_SECS).
        #[arg(long)]
        timeout: Option<u64>,

        /// Delay between requests in milliseconds (overrides CIQ_PACING_MS).
        #[arg(long)]
        pacing: Option<u64>,
    },

    /// Summarise a filings report export (CSV) by country and file type.
    Report {
        /// CSV export with `country`, `year`, `filetype` and `iso3` columns.
        path: PathBuf,

        /// Year to show; defaults to the latest year in the report.
        #[arg(short, long)]
        year: Option<i32>,

        /// File types to include; defaults to all.
        #[arg(short, long = "file-type")]
        file_types: Vec<String>,
    },

    /// List the known filing types.
    FileTypes,
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
#[clap(rename_all = "UPPERCASE")]
pub enum TraceLevel {
    DEBUG,
    ERROR,
    INFO,
    TRACE,
    WARN,
}

// -- TESTS --
