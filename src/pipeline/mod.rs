//! Orchestrate parsing, identifier extraction, enrichment and summarization, with offline fallback.
//!
//! ```text
//! INIT -> PARSING -> EXTRACTING_IDENTIFIERS -> QUERYING_REMOTE -> ENRICHED --------> DONE
//!                                          \                  \-> OFFLINE_FALLBACK -/
//!                                           \-------------------> OFFLINE_FALLBACK -/
//! ```
//!
//! The fallback is terminal for a run: once entered, the online path is not retried.

pub mod args;
pub mod run;

#[doc(inline)]
pub use args::{AnalyzeArgs, LookupArgs, ParseArgs};

use crate::ai::Summarizer;
use crate::enrich::{collect_found, EnrichmentService};
use crate::extract::IdentifierExtractor;
use crate::fetch::ChunkOutcome;
use crate::knowledge::KnowledgeBase;
use crate::variant::{is_identifier, AnalysisResult, EnrichedVariant};
use chrono::{DateTime, Utc};
use itertools::Itertools;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use varlens_parse::{detect, parse, Format, ParsedVariant};

/// Fallback reason when the caller asked for an offline run.
pub const OFFLINE_REQUESTED: &str = "offline mode requested";
/// Fallback reason when the input mentions no identifiers.
pub const NO_IDENTIFIERS: &str = "no variant identifiers found";

// ----------------------------------------------------------------------------
// Stage
// ----------------------------------------------------------------------------

/// Phase of an analysis run, reported to the status callback on every transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    Init,
    Parsing,
    ExtractingIdentifiers,
    QueryingRemote,
    Enriched,
    OfflineFallback,
    Done,
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            Stage::Init => String::from("Starting analysis."),
            Stage::Parsing => String::from("Parsing input."),
            Stage::ExtractingIdentifiers => String::from("Extracting variant identifiers."),
            Stage::QueryingRemote => String::from("Querying variant annotation service."),
            Stage::Enriched => String::from("Variants enriched."),
            Stage::OfflineFallback => String::from("Using offline knowledge base."),
            Stage::Done => String::from("Analysis complete."),
        };

        write!(f, "{}", message)
    }
}

// ----------------------------------------------------------------------------
// Analysis
// ----------------------------------------------------------------------------

/// Where the variants and result of an [`Analysis`] came from.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum Provenance {
    /// Annotation service and summarizer.
    Remote,
    /// Offline knowledge base, with the reason the remote path was abandoned.
    Offline { reason: String },
}

impl Provenance {
    pub fn is_offline(&self) -> bool {
        matches!(self, Provenance::Offline { .. })
    }
}

/// Output of one analysis run.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub format: Format,
    pub parsed: Vec<ParsedVariant>,
    pub identifiers: Vec<String>,
    pub variants: Vec<EnrichedVariant>,
    pub result: AnalysisResult,
    pub provenance: Provenance,
    pub created: DateTime<Utc>,
}

// ----------------------------------------------------------------------------
// Orchestrator
// ----------------------------------------------------------------------------

/// Runs an analysis over borrowed, pre-built collaborators.
///
/// `X` extracts identifiers from unstructured input, `S` produces the final result
/// from enriched variants. Any failure of the remote path ends in the offline
/// [`KnowledgeBase`], so [`analyze`](Self::analyze) always returns an [`Analysis`].
#[derive(Debug)]
pub struct Orchestrator<'a, X, S> {
    pub enrichment: &'a EnrichmentService,
    pub extractor: &'a X,
    pub summarizer: &'a S,
    pub knowledge: &'a KnowledgeBase,
    /// Skip the remote path entirely.
    pub offline: bool,
}

impl<'a, X, S> Orchestrator<'a, X, S>
where
    X: IdentifierExtractor,
    S: Summarizer,
{
    pub fn new(
        enrichment: &'a EnrichmentService,
        extractor: &'a X,
        summarizer: &'a S,
        knowledge: &'a KnowledgeBase,
    ) -> Self {
        Orchestrator { enrichment, extractor, summarizer, knowledge, offline: false }
    }

    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    /// Analyze raw input, calling `on_status` at every [`Stage`] transition.
    pub async fn analyze<F>(&self, raw: &str, mut on_status: F) -> Analysis
    where
        F: FnMut(Stage),
    {
        on_status(Stage::Init);

        on_status(Stage::Parsing);
        let format = detect(raw);
        let parsed = parse(raw);
        debug!("Detected {format} input with {} variants.", parsed.len());

        on_status(Stage::ExtractingIdentifiers);
        let identifiers = self.identifiers(raw, &parsed).await;

        let remote = match &identifiers {
            _ if self.offline => Err(OFFLINE_REQUESTED.to_string()),
            Ok(identifiers) if identifiers.is_empty() => Err(NO_IDENTIFIERS.to_string()),
            Ok(identifiers) => {
                on_status(Stage::QueryingRemote);
                self.query_remote(identifiers, &parsed).await
            }
            Err(reason) => Err(reason.clone()),
        };

        let (result, provenance) = match remote {
            Ok(result) => {
                on_status(Stage::Enriched);
                (result, Provenance::Remote)
            }
            Err(reason) => {
                warn!("Falling back to offline knowledge base: {reason}");
                on_status(Stage::OfflineFallback);
                let result = match parsed.is_empty() {
                    true => self.knowledge.lookup(raw),
                    false => self.knowledge.lookup(&identifiers.as_deref().unwrap_or_default().join("\n")),
                };
                (result, Provenance::Offline { reason })
            }
        };

        on_status(Stage::Done);
        Analysis {
            format,
            parsed,
            identifiers: identifiers.unwrap_or_default(),
            variants: result.variants.clone(),
            result,
            provenance,
            created: Utc::now(),
        }
    }

    /// Identifiers from parsed records, or from the extractor when the input is unstructured.
    ///
    /// In offline mode unstructured input is scanned locally.
    async fn identifiers(&self, raw: &str, parsed: &[ParsedVariant]) -> Result<Vec<String>, String> {
        if !parsed.is_empty() {
            let identifiers = parsed
                .iter()
                .map(|variant| variant.identifier.clone())
                .filter(|identifier| is_identifier(identifier))
                .unique()
                .collect_vec();
            return Ok(identifiers);
        }
        if self.offline {
            return Ok(self.knowledge.scan(raw));
        }
        self.extractor
            .extract(raw)
            .await
            .map_err(|e| format!("identifier extraction failed: {e}"))
    }

    /// Enrich and summarize. Fails if every chunk failed or the summarizer fails.
    async fn query_remote(
        &self,
        identifiers: &[String],
        parsed: &[ParsedVariant],
    ) -> Result<AnalysisResult, String> {
        let outcomes = self.enrichment.enrich_batch_detailed(identifiers).await;

        if outcomes.is_empty() {
            return Err(NO_IDENTIFIERS.to_string());
        }
        if outcomes.iter().all(ChunkOutcome::is_failed) {
            let reason = outcomes
                .iter()
                .find_map(|outcome| match outcome {
                    ChunkOutcome::Failed { reason, .. } => Some(reason.as_str()),
                    ChunkOutcome::Success { .. } => None,
                })
                .unwrap_or_default();
            return Err(format!("variant annotation service unavailable: {reason}"));
        }

        let missing = outcomes
            .iter()
            .filter(|outcome| outcome.is_failed())
            .flat_map(ChunkOutcome::identifiers)
            .join(", ");
        if !missing.is_empty() {
            warn!("Annotation failed for {missing}, continuing with partial results.");
        }

        let variants = collect_found(outcomes);
        debug!("Annotation service found {} of {} identifiers.", variants.len(), identifiers.len());

        self.summarizer
            .summarize(&variants, parsed)
            .await
            .map_err(|e| format!("summary failed: {e}"))
    }
}
