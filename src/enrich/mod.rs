//! Annotate variant identifiers with a remote variant-annotation service.

pub mod response;

#[doc(inline)]
pub use response::{parse_hits, OneOrMany, RawHit};

use crate::fetch::{flatten, request_batch, ChunkOutcome, FetchClient};
use crate::variant::{is_identifier, EnrichedVariant};
use color_eyre::eyre::{eyre, Report, Result};
use color_eyre::Help;
use itertools::Itertools;
use log::{debug, info};

/// Default annotation service.
pub const DEFAULT_URL: &str = "https://myvariant.info/v1";
/// Default number of identifiers per batch request.
pub const DEFAULT_CHUNK_SIZE: usize = 50;
/// Annotation fields requested from the service.
pub const FIELDS: &str = "clinvar.rcv.clinical_significance,clinvar.rcv.conditions.name,\
clinvar.gene.symbol,dbsnp.rsid,dbsnp.gene.symbol,cadd.phred,cadd.gene.genename,\
dbnsfp.revel.score,dbnsfp.hgvsp,dbnsfp.genename,gnomad_genome.af.af,gnomad_exome.af.af";
/// Query scope that matches hits by variant identifier.
const SCOPES: &str = "dbsnp.rsid";

/// Variants from all successful chunks, de-duplicated by identifier.
pub fn collect_found(outcomes: Vec<ChunkOutcome<String, EnrichedVariant>>) -> Vec<EnrichedVariant> {
    flatten(outcomes)
        .into_iter()
        .unique_by(|variant| variant.identifier.clone())
        .collect()
}

// ----------------------------------------------------------------------------
// Enrichment Service
// ----------------------------------------------------------------------------

/// Looks up clinical significance, pathogenicity scores and population frequency
/// for variant identifiers.
///
/// Identifiers without the standard prefix are dropped before any request is made.
#[derive(Clone, Debug)]
pub struct EnrichmentService {
    fetch: FetchClient,
    base_url: String,
    chunk_size: usize,
}

impl EnrichmentService {
    /// Returns a new [`EnrichmentService`].
    ///
    /// ```rust
    /// use varlens::enrich::{EnrichmentService, DEFAULT_URL};
    /// use varlens::fetch::{FetchClient, RetryPolicy};
    ///
    /// let fetch = FetchClient::new(RetryPolicy::default())?;
    /// let service = EnrichmentService::new(fetch, DEFAULT_URL, 50);
    /// assert_eq!(service.base_url(), "https://myvariant.info/v1");
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn new(fetch: FetchClient, base_url: &str, chunk_size: usize) -> Self {
        EnrichmentService {
            fetch,
            base_url: base_url.trim_end_matches('/').to_string(),
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Annotate a single identifier.
    ///
    /// Returns [`None`] for invalid identifiers, client errors (ex. 404) and hits
    /// flagged as not found. Transient failures that outlast the retry policy are errors.
    pub async fn enrich_one(&self, identifier: &str) -> Result<Option<EnrichedVariant>, Report> {
        if !is_identifier(identifier) {
            debug!("Skipping invalid identifier: {identifier:?}");
            return Ok(None);
        }

        let url = format!("{}/variant/{identifier}", self.base_url);
        let fetched = self
            .fetch
            .request_with_retry(|client| client.get(&url).query(&[("fields", FIELDS)]))
            .await?;

        if !fetched.is_success() {
            debug!("No annotation for {identifier}: {}", fetched.status);
            return Ok(None);
        }

        let variant = parse_hits(&fetched.body)?
            .into_iter()
            .find_map(|hit| hit.into_variant(identifier));
        Ok(variant)
    }

    /// Annotate many identifiers, keeping only those found.
    ///
    /// Output order follows chunk order, and within a chunk whatever order the
    /// service returns. Index results by [`EnrichedVariant::identifier`].
    pub async fn enrich_batch(&self, identifiers: &[String]) -> Vec<EnrichedVariant> {
        let outcomes = self.enrich_batch_detailed(identifiers).await;
        collect_found(outcomes)
    }

    /// Annotate many identifiers, returning the outcome of each chunk.
    ///
    /// Identifiers are filtered by prefix and de-duplicated, then split into chunks
    /// of at most [`chunk_size`](Self::chunk_size) that are queried concurrently.
    /// Hits that cannot be attributed to a queried identifier are dropped.
    /// A failed chunk is reported as [`ChunkOutcome::Failed`] and does not affect
    /// its siblings.
    pub async fn enrich_batch_detailed(&self, identifiers: &[String]) -> Vec<ChunkOutcome<String, EnrichedVariant>> {
        let valid = identifiers
            .iter()
            .filter(|identifier| is_identifier(identifier))
            .unique()
            .cloned()
            .collect_vec();

        let skipped = identifiers.len() - valid.len();
        if skipped > 0 {
            debug!("Skipping {skipped} invalid or duplicate identifiers.");
        }
        if valid.is_empty() {
            return Vec::new();
        }

        info!(
            "Querying {} identifiers in {} chunks: {}",
            valid.len(),
            valid.len().div_ceil(self.chunk_size),
            self.base_url
        );
        request_batch(&valid, self.chunk_size, |chunk| self.query_chunk(chunk)).await
    }

    /// Query one chunk of identifiers with a single form-encoded POST.
    async fn query_chunk(&self, chunk: Vec<String>) -> Result<Vec<EnrichedVariant>, Report> {
        let url = format!("{}/query", self.base_url);
        let query = chunk.join(",");
        let form = [("q", query.as_str()), ("scopes", SCOPES), ("fields", FIELDS)];

        let fetched = self
            .fetch
            .request_with_retry(|client| client.post(&url).form(&form))
            .await?;

        if !fetched.is_success() {
            return Err(eyre!("Annotation query failed: {url}"))
                .suggestion(format!("Status code: {}", fetched.status));
        }

        // A hit that does not echo its identifier can only be attributed in a chunk of one.
        let fallback = match chunk.as_slice() {
            [identifier] => identifier.as_str(),
            _ => "",
        };
        let variants = parse_hits(&fetched.body)?
            .into_iter()
            .filter_map(|hit| hit.into_variant(fallback))
            .filter(|variant| {
                let valid = is_identifier(&variant.identifier);
                if !valid {
                    debug!("Dropping hit without a matching identifier: {:?}", variant.identifier);
                }
                valid
            })
            .collect_vec();
        debug!("Chunk of {} identifiers returned {} variants.", chunk.len(), variants.len());
        Ok(variants)
    }
}
