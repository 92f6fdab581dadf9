//! Arguments of the `parse`, `lookup`, and `analyze` commands.

use crate::{ai, enrich, fetch::RetryPolicy};
#[cfg(feature = "cli")]
use clap::Parser;
use color_eyre::eyre::{Report, Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ----------------------------------------------------------------------------
// AnalyzeArgs
// ----------------------------------------------------------------------------

/// Parse, enrich, and summarize variants, falling back to the offline knowledge base.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[cfg_attr(feature = "cli", derive(Parser))]
pub struct AnalyzeArgs {
    /// Input file (VCF, 23andMe export, or free text).
    ///
    /// Use '-' to read from stdin.
    #[cfg_attr(feature = "cli", clap(short = 'i', long, required = true))]
    pub input: PathBuf,

    /// Output directory.
    ///
    /// If the directory does not exist, it will be created.
    #[cfg_attr(feature = "cli", clap(short = 'o', long, required = true))]
    pub output_dir: PathBuf,

    /// Base URL of the variant annotation service.
    #[cfg_attr(feature = "cli", arg(long, default_value_t = AnalyzeArgs::default().annotation_url))]
    pub annotation_url: String,

    /// Base URL of the generative-AI service.
    #[cfg_attr(feature = "cli", arg(long, default_value_t = AnalyzeArgs::default().ai_url))]
    pub ai_url: String,

    /// Generative-AI model.
    #[cfg_attr(feature = "cli", arg(short = 'm', long, default_value_t = AnalyzeArgs::default().model))]
    pub model: String,

    /// Maximum number of identifiers per annotation request.
    #[cfg_attr(feature = "cli", arg(short = 'c', long, default_value_t = AnalyzeArgs::default().chunk_size))]
    pub chunk_size: usize,

    /// Maximum number of attempts per request.
    #[cfg_attr(feature = "cli", arg(short = 'a', long, default_value_t = AnalyzeArgs::default().max_attempts))]
    pub max_attempts: u32,

    /// Time limit of each request attempt, in seconds.
    #[cfg_attr(feature = "cli", arg(short = 't', long, default_value_t = AnalyzeArgs::default().timeout))]
    pub timeout: u64,

    /// Skip the annotation and AI services, use the offline knowledge base only.
    #[cfg_attr(feature = "cli", arg(long, default_value_t = AnalyzeArgs::default().offline))]
    pub offline: bool,
}

impl Default for AnalyzeArgs {
    fn default() -> Self {
        AnalyzeArgs {
            input: PathBuf::new(),
            output_dir: PathBuf::new(),
            annotation_url: enrich::DEFAULT_URL.to_string(),
            ai_url: ai::DEFAULT_URL.to_string(),
            model: ai::DEFAULT_MODEL.to_string(),
            chunk_size: enrich::DEFAULT_CHUNK_SIZE,
            max_attempts: 3,
            timeout: 15,
            offline: false,
        }
    }
}

impl AnalyzeArgs {
    /// The [`RetryPolicy`] for these arguments, with the default backoff.
    ///
    /// ```rust
    /// use varlens::pipeline::AnalyzeArgs;
    /// use std::time::Duration;
    ///
    /// let args = AnalyzeArgs { max_attempts: 5, timeout: 30, ..Default::default() };
    /// let policy = args.retry_policy();
    /// assert_eq!(policy.max_attempts, 5);
    /// assert_eq!(policy.timeout, Duration::from_secs(30));
    /// assert_eq!(policy.base_delay, Duration::from_millis(1000));
    /// ```
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            timeout: Duration::from_secs(self.timeout),
            ..Default::default()
        }
    }

    /// Reads [`AnalyzeArgs`] from a JSON file.
    pub fn read<P>(path: &P) -> Result<AnalyzeArgs, Report>
    where
        P: AsRef<Path> + Debug,
    {
        let input = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read analyze arguments: {path:?}."))?;
        let args = serde_json::from_str(&input)
            .wrap_err_with(|| format!("Failed to deserialize analyze arguments: {input}"))?;
        Ok(args)
    }

    /// Write [`AnalyzeArgs`] to a JSON file.
    pub fn write<P>(&self, path: &P) -> Result<(), Report>
    where
        P: AsRef<Path> + Debug,
    {
        crate::utils::write_json(self, path)
            .wrap_err_with(|| format!("Failed to write analyze arguments: {path:?}"))
    }
}

// ----------------------------------------------------------------------------
// ParseArgs
// ----------------------------------------------------------------------------

/// Detect the input format and list the variants it contains.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[cfg_attr(feature = "cli", derive(Parser))]
pub struct ParseArgs {
    /// Input file (VCF or 23andMe export).
    ///
    /// Use '-' to read from stdin.
    #[cfg_attr(feature = "cli", clap(short = 'i', long, required = true))]
    pub input: PathBuf,

    /// Write parsed variants to this JSON file.
    #[cfg_attr(feature = "cli", clap(short = 'o', long))]
    pub output: Option<PathBuf>,
}

// ----------------------------------------------------------------------------
// LookupArgs
// ----------------------------------------------------------------------------

/// Look up variant identifiers in the offline knowledge base.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[cfg_attr(feature = "cli", derive(Parser))]
pub struct LookupArgs {
    /// Input file of any format.
    ///
    /// Use '-' to read from stdin.
    #[cfg_attr(feature = "cli", clap(short = 'i', long, required = true))]
    pub input: PathBuf,

    /// Write the analysis result to this JSON file.
    #[cfg_attr(feature = "cli", clap(short = 'o', long))]
    pub output: Option<PathBuf>,
}
