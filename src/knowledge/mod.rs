//! Offline knowledge base of high-impact variants, with deterministic summary and risk synthesis.
//!
//! The knowledge base needs no network access and cannot fail once constructed.
//! It is the recovery path when the annotation or AI services are unavailable.

pub mod records;
#[cfg(test)]
mod tests;

#[doc(inline)]
pub use records::{OfflineKnowledgeRecord, Payload, RECORDS};

use crate::extract::PatternExtractor;
use crate::variant::{AnalysisResult, EnrichedVariant, RiskLevel, RiskScore};
use color_eyre::eyre::{Report, Result};
use itertools::Itertools;
use log::debug;
use std::collections::HashMap;

/// Summary used when no known variants were found.
pub const NO_FINDINGS: &str =
    "No critical variants were found. None of the submitted variants match the offline knowledge base.";
/// Risk points added for each oncology variant.
pub const ONCOLOGY_WEIGHT: usize = 30;
/// Risk points added for every variant.
pub const VARIANT_WEIGHT: usize = 5;
pub const MIN_SCORE: usize = 10;
pub const MAX_SCORE: usize = 99;

// ----------------------------------------------------------------------------
// Knowledge Base
// ----------------------------------------------------------------------------

/// Lookup of the compiled-in [`RECORDS`] by identifier.
#[derive(Clone, Debug)]
pub struct KnowledgeBase {
    extractor: PatternExtractor,
    index: HashMap<&'static str, &'static OfflineKnowledgeRecord>,
}

impl KnowledgeBase {
    /// Returns a new [`KnowledgeBase`] over [`RECORDS`].
    pub fn new() -> Result<Self, Report> {
        let index = RECORDS.iter().map(|record| (record.identifier, record)).collect();
        Ok(KnowledgeBase { extractor: PatternExtractor::new()?, index })
    }

    /// Returns the record for `identifier`, case-insensitive.
    ///
    /// ```rust
    /// use varlens::knowledge::KnowledgeBase;
    /// use varlens::variant::Category;
    ///
    /// let knowledge = KnowledgeBase::new()?;
    /// let record = knowledge.get("RS113488022").unwrap();
    /// assert_eq!(record.gene, "BRAF");
    /// assert_eq!(record.category(), Category::Oncology);
    /// assert!(knowledge.get("rs1").is_none());
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn get(&self, identifier: &str) -> Option<&'static OfflineKnowledgeRecord> {
        self.index.get(identifier.to_ascii_lowercase().as_str()).copied()
    }

    /// Identifiers mentioned anywhere in raw input, in order of first occurrence.
    pub fn scan(&self, raw: &str) -> Vec<String> {
        self.extractor.scan(raw)
    }

    /// Scan raw input for identifiers and synthesize a result from those that are known.
    ///
    /// ## Examples
    ///
    /// ```rust
    /// use varlens::knowledge::KnowledgeBase;
    /// use varlens::variant::RiskLevel;
    ///
    /// let knowledge = KnowledgeBase::new()?;
    /// let result = knowledge.lookup("BRAF rs113488022, KRAS rs121913529, CYP2C19 rs4244285, rs1");
    ///
    /// assert_eq!(result.variants.len(), 3);
    /// assert_eq!(result.oncology.len(), 2);
    /// assert_eq!(result.pharmacogenomics.len(), 1);
    /// assert_eq!(result.risk.overall, 75);
    /// assert_eq!(result.risk.level, RiskLevel::High);
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn lookup(&self, raw: &str) -> AnalysisResult {
        let identifiers = self.scan(raw);
        let variants = identifiers
            .iter()
            .filter_map(|identifier| self.get(identifier))
            .map(OfflineKnowledgeRecord::to_variant)
            .collect_vec();
        debug!("Offline lookup matched {} of {} identifiers.", variants.len(), identifiers.len());
        self.synthesize(&variants)
    }

    /// Build an [`AnalysisResult`] from variants.
    ///
    /// Every variant is listed. Known variants are also routed into exactly one
    /// of the pharmacogenomic, oncology, or trait lists by their category.
    pub fn synthesize(&self, variants: &[EnrichedVariant]) -> AnalysisResult {
        let mut result = AnalysisResult { variants: variants.to_vec(), ..Default::default() };

        for record in variants.iter().filter_map(|variant| self.get(&variant.identifier)) {
            if let Some(profile) = record.to_oncology() {
                result.oncology.push(profile);
            } else if let Some(profile) = record.to_pharma() {
                result.pharmacogenomics.push(profile);
            } else if let Some(profile) = record.to_trait() {
                result.traits.push(profile);
            }
        }

        result.risk = risk_score(result.oncology.len(), variants.len());
        result.summary = summarize(&result);
        result
    }
}

// ----------------------------------------------------------------------------
// Synthesis
// ----------------------------------------------------------------------------

/// Heuristic risk score from the number of oncology variants and all variants.
///
/// `min(99, max(10, 30 * oncology + 5 * variants))`. This is a coarse screening
/// signal and not a clinical score.
///
/// ```rust
/// use varlens::knowledge::risk_score;
/// use varlens::variant::RiskLevel;
///
/// assert_eq!(risk_score(0, 0).overall, 10);
/// assert_eq!(risk_score(2, 3).overall, 75);
/// assert_eq!(risk_score(4, 4).level, RiskLevel::Critical);
/// assert_eq!(risk_score(4, 4).overall, 99);
/// ```
pub fn risk_score(oncology: usize, variants: usize) -> RiskScore {
    let accumulator = ONCOLOGY_WEIGHT * oncology;
    let overall = (accumulator + VARIANT_WEIGHT * variants).clamp(MIN_SCORE, MAX_SCORE) as u8;
    RiskScore { overall, level: RiskLevel::from_score(overall) }
}

fn summarize(result: &AnalysisResult) -> String {
    if result.variants.is_empty() {
        return NO_FINDINGS.to_string();
    }

    let genes = result.variants.iter().map(EnrichedVariant::label).unique().join(", ");
    let mut summary = format!(
        "Identified {} variant(s) of interest affecting {genes}. Overall risk is {} ({}/99).",
        result.variants.len(),
        result.risk.level,
        result.risk.overall,
    );

    if !result.oncology.is_empty() {
        let genes = result.oncology.iter().map(|p| p.gene.as_str()).unique().join(", ");
        summary.push_str(&format!(" Cancer-associated variants were found in {genes}."));
    }
    if !result.pharmacogenomics.is_empty() {
        let genes = result.pharmacogenomics.iter().map(|p| p.gene.as_str()).unique().join(", ");
        summary.push_str(&format!(
            " Pharmacogenomic alert: variants in {genes} may change how some medications work. Review before prescribing."
        ));
    }

    summary
}
