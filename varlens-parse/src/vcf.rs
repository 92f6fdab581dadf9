//! Zygosity-aware extraction of variants from [VCF](https://samtools.github.io/hts-specs/VCFv4.2.pdf) text.
//!
//! Only the first sample column is read, additional samples are ignored.

use crate::{classify, ParsedVariant, Zygosity, IDENTIFIER_PREFIX};
use log::debug;
use std::collections::HashMap;

/// Minimum number of columns in a VCF data line (CHROM through INFO).
pub const MIN_COLUMNS: usize = 8;

// ----------------------------------------------------------------------------
// Header
// ----------------------------------------------------------------------------

/// Column positions read from the `#CHROM` header line.
///
/// Columns are looked up by name, so reordered files still parse. Before a
/// header line is seen (or for names it lacks) the standard VCF positions are used.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Header {
    columns: HashMap<String, usize>,
}

impl Header {
    /// Returns a [`Header`] built from a `#CHROM` line.
    ///
    /// ## Examples
    ///
    /// ```rust
    /// use varlens_parse::vcf::Header;
    ///
    /// let header = Header::from_line("#CHROM\tPOS\tREF\tID\tALT\tQUAL\tFILTER\tINFO");
    /// assert_eq!(header.index("ID"), 3);
    /// assert_eq!(header.index("REF"), 2);
    /// assert_eq!(header.index("FORMAT"), 8);
    /// ```
    pub fn from_line(line: &str) -> Self {
        let columns = line
            .trim_start_matches('#')
            .split_whitespace()
            .enumerate()
            .map(|(i, name)| (name.to_string(), i))
            .collect();
        Header { columns }
    }

    /// Returns the index of a named column, falling back to its standard VCF position.
    pub fn index(&self, name: &str) -> usize {
        match self.columns.get(name) {
            Some(i) => *i,
            None => default_index(name),
        }
    }
}

fn default_index(name: &str) -> usize {
    match name {
        "CHROM" => 0,
        "POS" => 1,
        "ID" => 2,
        "REF" => 3,
        "ALT" => 4,
        "QUAL" => 5,
        "FILTER" => 6,
        "INFO" => 7,
        _ => 8,
    }
}

// ----------------------------------------------------------------------------
// Skip
// ----------------------------------------------------------------------------

/// Why a data line did not produce a [`ParsedVariant`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Skip {
    /// Fewer than [`MIN_COLUMNS`] columns.
    Malformed,
    /// ID was empty or not a standard identifier.
    MissingIdentifier,
    /// Wildtype or no-call genotype.
    NoCall,
}

// ----------------------------------------------------------------------------
// Functions
// ----------------------------------------------------------------------------

/// Parse a single VCF data line using the column positions in `header`.
///
/// ## Examples
///
/// ```rust
/// use varlens_parse::vcf::{parse_line, Header, Skip};
/// use varlens_parse::Zygosity;
///
/// let header = Header::default();
/// let variant = parse_line("14\t94378610\trs28929474\tC\tT\t.\tPASS\t.\tGT:DP\t0/1:30", &header).unwrap();
/// assert_eq!(variant.zygosity, Zygosity::Heterozygous);
///
/// let wildtype = parse_line("1\t100\trs111033441\tA\tG\t.\tPASS\t.\tGT\t0/0", &header);
/// assert_eq!(wildtype, Err(Skip::NoCall));
/// ```
pub fn parse_line(line: &str, header: &Header) -> Result<ParsedVariant, Skip> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < MIN_COLUMNS {
        return Err(Skip::Malformed);
    }

    let column = |name: &str| fields.get(header.index(name)).copied().unwrap_or_default();

    let identifier = column("ID");
    if identifier.is_empty() || !identifier.starts_with(IDENTIFIER_PREFIX) {
        return Err(Skip::MissingIdentifier);
    }

    // single sample, directly after FORMAT
    let format_i = header.index("FORMAT");
    let (genotype, zygosity) = match (fields.get(format_i), fields.get(format_i + 1)) {
        (Some(format), Some(sample)) => match format.split(':').position(|key| key == "GT") {
            Some(gt_i) => match sample.split(':').nth(gt_i) {
                Some(gt) => (gt, classify(gt).ok_or(Skip::NoCall)?),
                None => ("", Zygosity::Unknown),
            },
            None => ("", Zygosity::Unknown),
        },
        _ => ("", Zygosity::Unknown),
    };

    let variant = ParsedVariant {
        identifier: identifier.to_string(),
        chromosome: column("CHROM").to_string(),
        position: column("POS").to_string(),
        reference_allele: column("REF").to_string(),
        alternate_allele: column("ALT").to_string(),
        genotype: genotype.to_string(),
        zygosity,
    };

    Ok(variant)
}

/// Returns the variants in VCF text, dropping meta lines, wildtype and no-call records.
pub fn parse(raw: &str) -> Vec<ParsedVariant> {
    let mut header = Header::default();
    let mut variants = Vec::new();
    let mut skipped: HashMap<Skip, usize> = HashMap::new();

    for line in raw.lines().map(str::trim).filter(|line| !line.is_empty()) {
        if line.starts_with("##") {
            continue;
        } else if line.starts_with("#CHROM") {
            header = Header::from_line(line);
            continue;
        } else if line.starts_with('#') {
            continue;
        }

        match parse_line(line, &header) {
            Ok(variant) => variants.push(variant),
            Err(reason) => *skipped.entry(reason).or_default() += 1,
        }
    }

    if !skipped.is_empty() {
        debug!("Skipped VCF records: {skipped:?}");
    }

    variants
}
