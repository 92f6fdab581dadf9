//! [Command-line interface](Cli) (CLI) of the main binary.

use crate::pipeline::{AnalyzeArgs, LookupArgs, ParseArgs};
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

// ----------------------------------------------------------------------------
// CLI Entry Point
// ----------------------------------------------------------------------------

/// The command-line interface (CLI).
/// ---
/// The CLI is intended for parsing user input from the command-line in the main function.
/// ```no_run
/// use clap::Parser;
/// let args = varlens::Cli::parse();
/// ```
/// Here is a manual example of setting the command-line input:
/// ```rust
/// use clap::Parser;
/// use varlens::{cli::Command, Cli};
///
/// let input = ["varlens", "analyze", "--input", "sample.vcf", "--output-dir", "output", "--offline"];
/// let args = Cli::parse_from(input);
/// match args.command {
///     Command::Analyze(args) => {
///         assert!(args.offline);
///         assert_eq!(args.chunk_size, 50);
///         assert_eq!(args.annotation_url, "https://myvariant.info/v1");
///     }
///     _ => panic!("expected analyze"),
/// }
/// ```
#[derive(Debug, Deserialize, Parser, Serialize)]
#[clap(name = "varlens", author, version)]
#[clap(about = "varlens parses, annotates, and summarizes genetic variants.")]
pub struct Cli {
    #[clap(subcommand)]
    /// Pass CLI arguments to a particular [Command].
    #[clap(help = "Set the command.")]
    pub command: Command,

    /// Set the output [Verbosity] level.
    #[clap(short = 'v', long)]
    #[clap(value_enum, default_value_t = Verbosity::default())]
    #[clap(hide_possible_values = false)]
    #[clap(global = true)]
    #[clap(help = "Set the output verbosity level.")]
    pub verbosity: Verbosity,
}

/// CLI [commands](#variants). Used to decide which runtime [Command](#variants) the CLI arguments should be passed to.
#[derive(Debug, Deserialize, Serialize, Subcommand)]
pub enum Command {
    /// Detect the input format and list parsed variants.
    /// ## Examples
    /// ```rust
    /// use clap::Parser;
    /// use varlens::{cli::Command, Cli};
    ///
    /// let args = Cli::parse_from(["varlens", "parse", "-i", "sample.txt", "-o", "parsed.json"]);
    /// assert!(matches!(args.command, Command::Parse(_)));
    /// ```
    #[clap(about = "Detect the input format and list parsed variants.")]
    Parse(ParseArgs),

    /// Look up variants in the offline knowledge base.
    #[clap(about = "Look up variants in the offline knowledge base.")]
    Lookup(LookupArgs),

    /// Parse, annotate, and summarize variants.
    #[clap(about = "Parse, annotate, and summarize variants.")]
    Analyze(AnalyzeArgs),
}

// -----------------------------------------------------------------------------
// Verbosity
// -----------------------------------------------------------------------------

/// The output verbosity level.
#[derive(Clone, Debug, Default, Deserialize, Serialize, ValueEnum)]
pub enum Verbosity {
    #[default]
    Info,
    Warn,
    Debug,
    Error,
}

impl Display for Verbosity {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        // lowercase for RUST_LOG
        let lowercase = format!("{:?}", self).to_lowercase();
        write!(f, "{lowercase}")
    }
}
