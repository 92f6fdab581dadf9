//! Normalised variant records and the [`AnalysisResult`] handed to presentation layers.

use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fmt::{Display, Formatter};
use strum::EnumIter;

#[doc(inline)]
pub use varlens_parse::IDENTIFIER_PREFIX;

/// Clinical significance used when no source reports one.
pub const NOT_REPORTED: &str = "Not Reported";

/// Returns true if `identifier` is a standard variant identifier that may be sent to a remote service.
///
/// ## Examples
///
/// ```rust
/// use varlens::variant::is_identifier;
///
/// assert!(is_identifier("rs12345"));
/// assert!(!is_identifier("notarsid"));
/// assert!(!is_identifier("rs"));
/// assert!(!is_identifier(""));
/// ```
pub fn is_identifier(identifier: &str) -> bool {
    identifier.starts_with(IDENTIFIER_PREFIX) && identifier.len() > IDENTIFIER_PREFIX.len()
}

// ----------------------------------------------------------------------------
// Enriched Variant
// ----------------------------------------------------------------------------

/// A variant annotated with clinical significance, pathogenicity scores and population frequency.
///
/// Missing values stay [`None`], they are never coerced to zero.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedVariant {
    /// Variant identifier (ex. `rs113488022`).
    pub identifier: String,
    /// Clinical significance (ex. "Pathogenic"), [`NOT_REPORTED`] if absent upstream.
    #[serde(default = "not_reported")]
    pub clinical_significance: String,
    #[serde(default)]
    pub condition: Option<String>,
    /// Allele frequency in the general population (0.0 - 1.0).
    #[serde(default)]
    pub population_frequency: Option<f64>,
    /// CADD phred-scaled score.
    #[serde(default)]
    pub pathogenicity_score: Option<f64>,
    /// REVEL score.
    #[serde(default)]
    pub secondary_pathogenicity_score: Option<f64>,
    #[serde(default)]
    pub gene_symbol: Option<String>,
    /// HGVS protein change (ex. `p.Val600Glu`).
    #[serde(default)]
    pub protein_change: Option<String>,
}

fn not_reported() -> String {
    NOT_REPORTED.to_string()
}

impl Default for EnrichedVariant {
    fn default() -> Self {
        Self::new("")
    }
}

impl EnrichedVariant {
    /// Returns a new [`EnrichedVariant`] with no annotations.
    ///
    /// ```rust
    /// use varlens::variant::{EnrichedVariant, NOT_REPORTED};
    ///
    /// let variant = EnrichedVariant::new("rs4680");
    /// assert_eq!(variant.clinical_significance, NOT_REPORTED);
    /// assert_eq!(variant.population_frequency, None);
    /// ```
    pub fn new(identifier: impl Into<String>) -> Self {
        EnrichedVariant {
            identifier: identifier.into(),
            clinical_significance: not_reported(),
            condition: None,
            population_frequency: None,
            pathogenicity_score: None,
            secondary_pathogenicity_score: None,
            gene_symbol: None,
            protein_change: None,
        }
    }

    /// Returns the gene symbol, or the identifier if no gene is known.
    pub fn label(&self) -> &str {
        self.gene_symbol.as_deref().unwrap_or(&self.identifier)
    }
}

// ----------------------------------------------------------------------------
// Category
// ----------------------------------------------------------------------------

/// The profile a known variant is routed into.
#[derive(Clone, Copy, Debug, EnumIter, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Oncology,
    Pharma,
    Trait,
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Category::Oncology => String::from("ONCOLOGY"),
            Category::Pharma => String::from("PHARMA"),
            Category::Trait => String::from("TRAIT"),
        };

        write!(f, "{}", name)
    }
}

// ----------------------------------------------------------------------------
// Profiles
// ----------------------------------------------------------------------------

/// A variant that changes how a drug is metabolised or tolerated.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PharmaProfile {
    pub identifier: String,
    pub gene: String,
    /// Metaboliser phenotype (ex. "Poor metabolizer").
    pub phenotype: String,
    pub drugs: Vec<String>,
    pub recommendation: String,
}

/// A variant in a cancer-associated gene.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OncologyProfile {
    pub identifier: String,
    pub gene: String,
    /// How the variant contributes to tumour development.
    pub mechanism: String,
    pub associated_cancers: Vec<String>,
}

/// A variant associated with a phenotype or inherited condition.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TraitProfile {
    pub identifier: String,
    pub gene: String,
    pub name: String,
    pub description: String,
}

// ----------------------------------------------------------------------------
// Risk
// ----------------------------------------------------------------------------

/// Banded overall risk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    #[default]
    Low,
    Moderate,
    High,
    Critical,
}

impl RiskLevel {
    /// Returns the [`RiskLevel`] band of an overall score.
    ///
    /// ```rust
    /// use varlens::variant::RiskLevel;
    ///
    /// assert_eq!(RiskLevel::from_score(81), RiskLevel::Critical);
    /// assert_eq!(RiskLevel::from_score(80), RiskLevel::High);
    /// assert_eq!(RiskLevel::from_score(51), RiskLevel::High);
    /// assert_eq!(RiskLevel::from_score(50), RiskLevel::Low);
    /// ```
    pub fn from_score(score: u8) -> Self {
        match score {
            s if s > 80 => RiskLevel::Critical,
            s if s > 50 => RiskLevel::High,
            _ => RiskLevel::Low,
        }
    }
}

impl Display for RiskLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RiskLevel::Low => String::from("LOW"),
            RiskLevel::Moderate => String::from("MODERATE"),
            RiskLevel::High => String::from("HIGH"),
            RiskLevel::Critical => String::from("CRITICAL"),
        };

        write!(f, "{}", name)
    }
}

/// Overall risk score (0 - 99) and its [`RiskLevel`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RiskScore {
    pub overall: u8,
    pub level: RiskLevel,
}

// ----------------------------------------------------------------------------
// Analysis Result
// ----------------------------------------------------------------------------

/// The stable result shape consumed by dashboards and reports.
///
/// Produced by the AI summarizer on the online path, or synthesized from the
/// offline knowledge base.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub summary: String,
    #[serde(default)]
    pub variants: Vec<EnrichedVariant>,
    #[serde(default)]
    pub pharmacogenomics: Vec<PharmaProfile>,
    #[serde(default)]
    pub oncology: Vec<OncologyProfile>,
    #[serde(default)]
    pub traits: Vec<TraitProfile>,
    #[serde(default)]
    pub risk: RiskScore,
}

impl AnalysisResult {
    /// Number of profiles routed into a [`Category`].
    pub fn count(&self, category: Category) -> usize {
        match category {
            Category::Oncology => self.oncology.len(),
            Category::Pharma => self.pharmacogenomics.len(),
            Category::Trait => self.traits.len(),
        }
    }
}
