//! CLI module for deep-research
//!
//! Provides command-line interface parsing for the deep-research binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod init;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::utils::DEFAULT_CONFIG_FILE;

/// deep-research - iterative web research with local or hosted LLMs
#[derive(Parser, Debug)]
#[command(
    name = "deep-research",
    version,
    about = "Turn a question into a cited research report",
    long_about = "Plans web searches, summarizes the most relevant page snippets, loops until\n\
                  the evidence is sufficient (at most three passes), then drafts several\n\
                  candidate reports and keeps the one that scores best.",
    after_help = "EXAMPLES:\n    \
                  deep-research init                          # Write deep-research.toml\n    \
                  deep-research run \"Is fusion power near?\"   # Research a question\n    \
                  deep-research run \"...\" --output report.md  # Also save the report\n    \
                  deep-research config --validate             # Check the configuration"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE, global = true)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Research a question and print the final report
    Run {
        /// The question to research
        query: String,

        /// Also save the report as a markdown file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write a default configuration file
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite existing files
        #[arg(short, long)]
        force: bool,

        /// LLM provider to configure (ollama or openai)
        #[arg(long, default_value = "ollama")]
        provider: String,
    },

    /// Show the effective configuration
    Config {
        /// Only validate the configuration file
        #[arg(long)]
        validate: bool,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Exit code of an interrupted run (128 + SIGINT)
pub const CANCELLED_EXIT_CODE: u8 = 130;

/// How a `run` invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// The report was printed
    Completed,
    /// Interrupted before a report existed
    Cancelled,
}

impl RunStatus {
    pub fn code(self) -> u8 {
        match self {
            RunStatus::Completed => 0,
            RunStatus::Cancelled => CANCELLED_EXIT_CODE,
        }
    }
}

impl From<RunStatus> for ExitCode {
    fn from(status: RunStatus) -> Self {
        ExitCode::from(status.code())
    }
}

/// Markdown document for a saved report: the query as title, then the report.
pub fn report_markdown(query: &str, report: &str) -> String {
    format!("# {}\n\n{}\n", query.trim(), report.trim_end())
}
