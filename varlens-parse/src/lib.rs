#![doc = include_str!("../README.md")]

mod genotype;
pub mod twentythree;
pub mod vcf;

#[cfg(test)]
mod tests;

#[doc(inline)]
pub use genotype::classify;

use log::debug;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fmt::{Display, Formatter};

/// Every standard variant identifier starts with this prefix (ex. `rs762551`).
pub const IDENTIFIER_PREFIX: &str = "rs";

// ----------------------------------------------------------------------------
// Format
// ----------------------------------------------------------------------------

/// Input [`Format`] recognised by [`detect`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum Format {
    /// Variant Call Format, with or without `##` meta lines.
    #[serde(rename = "vcf")]
    Vcf,
    /// 23andMe raw data export.
    #[serde(rename = "23andme")]
    TwentyThreeAndMe,
    /// Anything else, ex. a pasted list of identifiers or free text.
    #[default]
    #[serde(rename = "unstructured")]
    Unstructured,
}

impl Display for Format {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Format::Vcf => String::from("vcf"),
            Format::TwentyThreeAndMe => String::from("23andme"),
            Format::Unstructured => String::from("unstructured"),
        };

        write!(f, "{}", name)
    }
}

// ----------------------------------------------------------------------------
// Zygosity
// ----------------------------------------------------------------------------

/// Whether a variant allele is carried on one or both chromosome copies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Zygosity {
    Heterozygous,
    Homozygous,
    #[default]
    Unknown,
}

impl Display for Zygosity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Zygosity::Heterozygous => String::from("HETEROZYGOUS"),
            Zygosity::Homozygous => String::from("HOMOZYGOUS"),
            Zygosity::Unknown => String::from("UNKNOWN"),
        };

        write!(f, "{}", name)
    }
}

// ----------------------------------------------------------------------------
// Parsed Variant
// ----------------------------------------------------------------------------

/// A candidate variant record extracted from a structured input file.
///
/// Wildtype (`0/0`) and no-call (`./.`, `.`, `--`) records never become a
/// [`ParsedVariant`], they are dropped while parsing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedVariant {
    /// Variant identifier (ex. `rs28929474`), may be empty.
    pub identifier: String,
    pub chromosome: String,
    pub position: String,
    /// Empty when the format does not expose it (ex. 23andMe).
    pub reference_allele: String,
    /// Empty when the format does not expose it (ex. 23andMe).
    pub alternate_allele: String,
    /// The raw genotype call (ex. `0/1`, `AG`), empty if the record had none.
    pub genotype: String,
    pub zygosity: Zygosity,
}

// ----------------------------------------------------------------------------
// Functions
// ----------------------------------------------------------------------------

/// Returns the [`Format`] of raw input text.
///
/// VCF is checked first, then 23andMe. Anything else is [`Format::Unstructured`].
///
/// ## Examples
///
/// ```rust
/// use varlens_parse::{detect, Format};
///
/// assert_eq!(detect("##fileformat=VCFv4.2\n"), Format::Vcf);
/// assert_eq!(detect("#CHROM\tPOS\tID\tREF\tALT\n"), Format::Vcf);
/// assert_eq!(detect("# rsid\tchromosome\tposition\tgenotype\n"), Format::TwentyThreeAndMe);
/// assert_eq!(detect("I carry rs762551 and rs4680"), Format::Unstructured);
/// ```
pub fn detect(raw: &str) -> Format {
    let is_vcf = raw.contains("##fileformat=VCF")
        || raw.lines().any(|line| line.contains("#CHROM") && line.contains("POS"));

    if is_vcf {
        Format::Vcf
    } else if raw.contains("# rsid") && raw.contains("genotype") {
        Format::TwentyThreeAndMe
    } else {
        Format::Unstructured
    }
}

/// Returns the candidate variants found in raw input text.
///
/// Unstructured text yields no records, identifier extraction from free
/// text is handled elsewhere. Malformed lines are skipped, this never fails.
///
/// ## Examples
///
/// ```rust
/// use varlens_parse::{parse, Zygosity};
///
/// let input = "# rsid\tchromosome\tposition\tgenotype\nrs762551\t15\t75041917\tCC\nrs4680\t22\t19951271\t--\n";
/// let variants = parse(input);
///
/// assert_eq!(variants.len(), 1);
/// assert_eq!(variants[0].identifier, "rs762551");
/// assert_eq!(variants[0].zygosity, Zygosity::Unknown);
/// ```
pub fn parse(raw: &str) -> Vec<ParsedVariant> {
    let format = detect(raw);
    let variants = match format {
        Format::Vcf => vcf::parse(raw),
        Format::TwentyThreeAndMe => twentythree::parse(raw),
        Format::Unstructured => Vec::new(),
    };
    debug!("Parsed {} variants from {format} input.", variants.len());
    variants
}
