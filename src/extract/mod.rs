//! Extract variant identifiers from unstructured or semi-structured text.


use color_eyre::eyre::{Report, Result, WrapErr};
use itertools::Itertools;
use regex::Regex;

/// Regular expression matching a variant identifier, case-insensitive.
///
/// The identifier (group 1) may be joined to surrounding text by punctuation or
/// `_`, but not run on from a preceding letter or digit.
pub const IDENTIFIER_PATTERN: &str = r"(?i)(?:^|[^a-z0-9])(rs\d+)";

// ----------------------------------------------------------------------------
// Traits
// ----------------------------------------------------------------------------

/// Returns the variant identifiers mentioned in raw input text.
///
/// Implemented by [`PatternExtractor`] (local, deterministic) and
/// [`GeminiClient`](crate::ai::GeminiClient) (AI-assisted).
#[allow(async_fn_in_trait)]
pub trait IdentifierExtractor {
    async fn extract(&self, raw: &str) -> Result<Vec<String>, Report>;
}

// ----------------------------------------------------------------------------
// Pattern Extractor
// ----------------------------------------------------------------------------

/// Finds identifiers with a regular expression scan of the input.
#[derive(Clone, Debug)]
pub struct PatternExtractor {
    pattern: Regex,
}

impl PatternExtractor {
    /// Returns a new [`PatternExtractor`] for [`IDENTIFIER_PATTERN`].
    pub fn new() -> Result<Self, Report> {
        let pattern = Regex::new(IDENTIFIER_PATTERN)
            .wrap_err_with(|| format!("Failed to compile identifier pattern: {IDENTIFIER_PATTERN}"))?;
        Ok(PatternExtractor { pattern })
    }

    /// Returns every identifier in `raw`, lowercased and de-duplicated in order of first occurrence.
    ///
    /// ## Examples
    ///
    /// ```rust
    /// use varlens::extract::PatternExtractor;
    ///
    /// let extractor = PatternExtractor::new()?;
    /// let found = extractor.scan("BRAF rs113488022, COMT RS4680 and rs113488022 again");
    /// assert_eq!(found, ["rs113488022", "rs4680"]);
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn scan(&self, raw: &str) -> Vec<String> {
        self.pattern
            .captures_iter(raw)
            .filter_map(|captures| captures.get(1))
            .map(|m| m.as_str().to_lowercase())
            .unique()
            .collect()
    }
}

impl IdentifierExtractor for PatternExtractor {
    async fn extract(&self, raw: &str) -> Result<Vec<String>, Report> {
        Ok(self.scan(raw))
    }
}
