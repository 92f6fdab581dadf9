//! Extraction of variants from a 23andMe raw data export.
//!
//! The export is tab-separated: `rsid`, `chromosome`, `position`, `genotype`.
//! Alleles are not reference-aware, so zygosity is always [`Zygosity::Unknown`]
//! and left to a reference-aware resolver.

use crate::{ParsedVariant, Zygosity};
use log::debug;

/// Minimum number of columns in a 23andMe data line.
pub const MIN_COLUMNS: usize = 4;

/// Genotype reported by 23andMe for a position that could not be called.
pub const NO_CALL: &str = "--";

/// Returns the variants in a 23andMe export, dropping comments and no-calls.
///
/// ## Examples
///
/// ```rust
/// use varlens_parse::{twentythree, Zygosity};
///
/// let variants = twentythree::parse("rs762551  15  75041917  CC\nrs4680  22  19951271  --\n");
/// assert_eq!(variants.len(), 1);
/// assert_eq!(variants[0].genotype, "CC");
/// assert!(variants[0].reference_allele.is_empty());
/// ```
pub fn parse(raw: &str) -> Vec<ParsedVariant> {
    let mut malformed = 0;
    let mut no_calls = 0;

    let variants = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < MIN_COLUMNS {
                malformed += 1;
                return None;
            }
            if fields[3] == NO_CALL {
                no_calls += 1;
                return None;
            }
            Some(ParsedVariant {
                identifier: fields[0].to_string(),
                chromosome: fields[1].to_string(),
                position: fields[2].to_string(),
                genotype: fields[3].to_string(),
                zygosity: Zygosity::Unknown,
                ..Default::default()
            })
        })
        .collect();

    debug!("Skipped 23andMe records: {malformed} malformed, {no_calls} no-call.");

    variants
}
