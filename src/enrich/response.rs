//! Raw annotation-service responses, normalised into [`EnrichedVariant`].
//!
//! Every nested field of the remote service may arrive as a single value or as an
//! array (one element per transcript, submission, or source). Those fields are
//! held as [`OneOrMany`] and collapsed by taking the first element. Values of an
//! unexpected type are read as absent rather than failing the whole response.

use crate::variant::{EnrichedVariant, NOT_REPORTED};
use color_eyre::eyre::{Report, Result, WrapErr};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

// ----------------------------------------------------------------------------
// One Or Many
// ----------------------------------------------------------------------------

/// A response value that is either a single item or an array of items.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    /// An array of items.
    Many(Vec<T>),
    /// A single item.
    One(T),
}

impl<T> OneOrMany<T> {
    /// Returns the single item, or the first item of an array.
    ///
    /// ## Examples
    ///
    /// ```rust
    /// use varlens::enrich::OneOrMany;
    ///
    /// let many: OneOrMany<f64> = serde_json::from_str("[0.7, 0.9]")?;
    /// assert_eq!(many.first(), Some(&0.7));
    ///
    /// let one: OneOrMany<f64> = serde_json::from_str("0.5")?;
    /// assert_eq!(one.first(), Some(&0.5));
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn first(&self) -> Option<&T> {
        match self {
            OneOrMany::One(item) => Some(item),
            OneOrMany::Many(items) => items.first(),
        }
    }

    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }
}

/// An optional response field that may be a single value or an array.
pub type Field<T> = Option<OneOrMany<T>>;

/// Deserialize a field, reading a value of the wrong shape as [`None`].
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

fn first<T>(field: &Field<T>) -> Option<&T> {
    field.as_ref().and_then(OneOrMany::first)
}

// ----------------------------------------------------------------------------
// Raw Records
// ----------------------------------------------------------------------------

/// One hit of a variant query, as returned by the annotation service.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawHit {
    /// The identifier this hit answers, present on batch queries.
    #[serde(deserialize_with = "lenient")]
    pub query: Option<String>,
    /// Set by the service when the queried identifier is unknown.
    #[serde(deserialize_with = "lenient")]
    pub notfound: Option<bool>,
    /// The service's own genomic identifier (ex. `chr7:g.140453136A>T`).
    #[serde(rename = "_id", deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub clinvar: Field<RawClinvar>,
    #[serde(deserialize_with = "lenient")]
    pub dbsnp: Field<RawDbsnp>,
    #[serde(deserialize_with = "lenient")]
    pub cadd: Field<RawCadd>,
    #[serde(deserialize_with = "lenient")]
    pub dbnsfp: Field<RawDbnsfp>,
    #[serde(deserialize_with = "lenient")]
    pub gnomad_genome: Field<RawGnomad>,
    #[serde(deserialize_with = "lenient")]
    pub gnomad_exome: Field<RawGnomad>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawClinvar {
    #[serde(deserialize_with = "lenient")]
    pub rcv: Field<RawRcv>,
    #[serde(deserialize_with = "lenient")]
    pub gene: Field<RawGene>,
}

/// A ClinVar record (submission) for the variant.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawRcv {
    #[serde(deserialize_with = "lenient")]
    pub clinical_significance: Field<String>,
    #[serde(deserialize_with = "lenient")]
    pub conditions: Field<RawCondition>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawCondition {
    #[serde(deserialize_with = "lenient")]
    pub name: Field<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawGene {
    #[serde(alias = "genename", deserialize_with = "lenient")]
    pub symbol: Field<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawDbsnp {
    #[serde(deserialize_with = "lenient")]
    pub rsid: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub gene: Field<RawGene>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawCadd {
    #[serde(deserialize_with = "lenient")]
    pub phred: Field<f64>,
    #[serde(deserialize_with = "lenient")]
    pub gene: Field<RawGene>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawDbnsfp {
    #[serde(deserialize_with = "lenient")]
    pub revel: Field<RawRevel>,
    #[serde(deserialize_with = "lenient")]
    pub hgvsp: Field<String>,
    #[serde(deserialize_with = "lenient")]
    pub genename: Field<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawRevel {
    #[serde(deserialize_with = "lenient")]
    pub score: Field<f64>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawGnomad {
    #[serde(deserialize_with = "lenient")]
    pub af: Field<RawAlleleFrequency>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawAlleleFrequency {
    #[serde(deserialize_with = "lenient")]
    pub af: Field<f64>,
}

// ----------------------------------------------------------------------------
// Normalisation
// ----------------------------------------------------------------------------

/// Parse a response body holding one hit or an array of hits.
pub fn parse_hits(body: &str) -> Result<Vec<RawHit>, Report> {
    let hits: OneOrMany<RawHit> = serde_json::from_str(body)
        .wrap_err("Failed to parse annotation response.")?;
    Ok(hits.into_vec())
}

impl RawHit {
    /// True if the service flagged the queried identifier as unknown.
    pub fn is_not_found(&self) -> bool {
        self.notfound.unwrap_or(false)
    }

    /// Normalise into an [`EnrichedVariant`], or [`None`] if the hit is flagged not found.
    ///
    /// The identifier is taken from the hit's query, then its dbSNP record, then
    /// `fallback` (when non-empty), then the service's own id. Where a field holds
    /// several annotations, the first one is used.
    ///
    /// ## Examples
    ///
    /// ```rust
    /// use varlens::enrich::RawHit;
    ///
    /// let hit: RawHit = serde_json::from_str(r#"{
    ///     "_id": "chr7:g.140453136A>T",
    ///     "cadd": {"phred": 32.0, "gene": [{"genename": "BRAF"}, {"genename": "OTHER"}]}
    /// }"#)?;
    /// let variant = hit.into_variant("rs113488022").unwrap();
    /// assert_eq!(variant.identifier, "rs113488022");
    /// assert_eq!(variant.gene_symbol.as_deref(), Some("BRAF"));
    /// assert_eq!(variant.pathogenicity_score, Some(32.0));
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn into_variant(self, fallback: &str) -> Option<EnrichedVariant> {
        if self.is_not_found() {
            return None;
        }

        let dbsnp = first(&self.dbsnp);
        let clinvar = first(&self.clinvar);
        let cadd = first(&self.cadd);
        let dbnsfp = first(&self.dbnsfp);
        let rcv = clinvar.and_then(|c| first(&c.rcv));

        let identifier = self
            .query
            .clone()
            .or_else(|| dbsnp.and_then(|d| d.rsid.clone()))
            .or_else(|| (!fallback.is_empty()).then(|| fallback.to_string()))
            .or_else(|| self.id.clone())
            .unwrap_or_default();

        let clinical_significance = rcv
            .and_then(|r| first(&r.clinical_significance))
            .cloned()
            .unwrap_or_else(|| NOT_REPORTED.to_string());

        let condition = rcv
            .and_then(|r| first(&r.conditions))
            .and_then(|c| first(&c.name))
            .cloned();

        let population_frequency = [&self.gnomad_genome, &self.gnomad_exome]
            .into_iter()
            .find_map(|gnomad| first(gnomad).and_then(|g| first(&g.af)).and_then(|af| first(&af.af)))
            .copied();

        let gene_symbol = clinvar
            .and_then(|c| first(&c.gene))
            .and_then(|g| first(&g.symbol))
            .or_else(|| dbsnp.and_then(|d| first(&d.gene)).and_then(|g| first(&g.symbol)))
            .or_else(|| cadd.and_then(|c| first(&c.gene)).and_then(|g| first(&g.symbol)))
            .or_else(|| dbnsfp.and_then(|d| first(&d.genename)))
            .cloned();

        Some(EnrichedVariant {
            identifier,
            clinical_significance,
            condition,
            population_frequency,
            pathogenicity_score: cadd.and_then(|c| first(&c.phred)).copied(),
            secondary_pathogenicity_score: dbnsfp
                .and_then(|d| first(&d.revel))
                .and_then(|r| first(&r.score))
                .copied(),
            gene_symbol,
            protein_change: dbnsfp.and_then(|d| first(&d.hgvsp)).cloned(),
        })
    }
}
