use crate::Zygosity;

/// Classify a VCF genotype (`GT`) call into a [`Zygosity`].
///
/// Returns [`None`] for wildtype and no-call genotypes, which must be dropped.
///
/// | Genotype                         | Result                         |
/// |----------------------------------|--------------------------------|
/// | `0/0`, `0\|0`, `./.`, `.`        | [`None`]                       |
/// | `0/1`, `0\|1`, `1/0`, `1\|0`     | [`Zygosity::Heterozygous`]     |
/// | `1/1`, `1\|1`                    | [`Zygosity::Homozygous`]       |
/// | other, with an allele `1` or `2` | [`Zygosity::Heterozygous`]     |
/// | anything else                    | [`Zygosity::Unknown`]          |
///
/// ## Examples
///
/// ```rust
/// use varlens_parse::{classify, Zygosity};
///
/// assert_eq!(classify("0/0"), None);
/// assert_eq!(classify("./."), None);
/// assert_eq!(classify("0|1"), Some(Zygosity::Heterozygous));
/// assert_eq!(classify("1/1"), Some(Zygosity::Homozygous));
/// assert_eq!(classify("1/2"), Some(Zygosity::Heterozygous));
/// assert_eq!(classify("0/3"), Some(Zygosity::Unknown));
/// ```
pub fn classify(genotype: &str) -> Option<Zygosity> {
    match genotype {
        "0/0" | "0|0" | "./." | "." => None,
        "0/1" | "0|1" | "1/0" | "1|0" => Some(Zygosity::Heterozygous),
        "1/1" | "1|1" => Some(Zygosity::Homozygous),
        other if other.contains(|c: char| c == '1' || c == '2') => Some(Zygosity::Heterozygous),
        _ => Some(Zygosity::Unknown),
    }
}
