//! Generative-AI summarization and identifier extraction.
//!
//! The model is an opaque collaborator: it receives the enriched variants and is
//! expected to answer with JSON in the shape of [`AnalysisResult`]. Model output is
//! parsed defensively with [`parse_model_json`].

#[cfg(test)]
mod tests;

use crate::extract::IdentifierExtractor;
use crate::fetch::FetchClient;
use crate::knowledge::KnowledgeBase;
use crate::variant::{is_identifier, AnalysisResult, EnrichedVariant};
use color_eyre::eyre::{eyre, Report, Result, WrapErr};
use color_eyre::Help;
use indoc::formatdoc;
use itertools::Itertools;
use log::{debug, info};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use varlens_parse::ParsedVariant;

/// Default generative-AI service.
pub const DEFAULT_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Default model.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
/// Environment variable holding the API key.
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";
/// Message shown to the user when a model response cannot be parsed.
pub const PARSE_ERROR: &str = "The AI response could not be parsed. The analysis may be too large or was interrupted; try again with fewer variants.";

// ----------------------------------------------------------------------------
// Response Parsing
// ----------------------------------------------------------------------------

/// Parse JSON produced by a language model.
///
/// 1. Markdown code fences are stripped.
/// 1. Top-level JSON objects and arrays are located by bracket matching, ignoring surrounding prose.
/// 1. Each is parsed in order, then again with trailing commas removed. The first success wins.
///
/// If no candidate can be parsed, the error carries [`PARSE_ERROR`].
///
/// ## Examples
///
/// ```rust
/// use varlens::ai::parse_model_json;
///
/// let text = "Here you go:\n```json\n{\"genes\": [\"BRAF\", \"KRAS\",],}\n```";
/// let value: serde_json::Value = parse_model_json(text)?;
/// assert_eq!(value["genes"][1], "KRAS");
///
/// let value: serde_json::Value = parse_model_json("Based on [ClinVar] data: {\"summary\": \"ok\"}")?;
/// assert_eq!(value["summary"], "ok");
///
/// let result = parse_model_json::<serde_json::Value>("{\"summary\": \"cut off");
/// assert!(result.is_err());
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn parse_model_json<T>(text: &str) -> Result<T, Report>
where
    T: DeserializeOwned,
{
    let stripped = strip_fences(text);
    let trailing_comma = Regex::new(r",\s*([}\]])").wrap_err("Failed to compile trailing comma pattern.")?;
    let mut candidates = json_candidates(stripped);
    if candidates.is_empty() {
        candidates.push(stripped);
    }

    let mut last_error = eyre!("Model response is empty.");
    for candidate in candidates {
        match serde_json::from_str(candidate) {
            Ok(value) => return Ok(value),
            Err(e) => debug!("Model response candidate is not valid JSON, attempting repair: {e}"),
        }
        let repaired = trailing_comma.replace_all(candidate, "$1");
        match serde_json::from_str(&repaired) {
            Ok(value) => return Ok(value),
            Err(e) => last_error = eyre!(e),
        }
    }

    Err(last_error.wrap_err(PARSE_ERROR))
}

/// Remove a surrounding markdown code fence, with or without a language tag.
pub fn strip_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(inner) = text.strip_prefix("```") else {
        return text;
    };
    let inner = inner.trim_start_matches(|c: char| c.is_ascii_alphanumeric()).trim_end();
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

/// Returns the outermost JSON object or array in `text`.
///
/// Prose may contain brackets of its own, so the first top-level bracketed region
/// that is valid JSON is preferred. Otherwise the first region is returned, for repair.
pub fn outermost_json(text: &str) -> Option<&str> {
    let candidates = json_candidates(text);
    candidates
        .iter()
        .find(|candidate| serde_json::from_str::<serde_json::Value>(candidate).is_ok())
        .or_else(|| candidates.first())
        .copied()
}

/// Returns every top-level bracketed region of `text`, in order.
fn json_candidates(text: &str) -> Vec<&str> {
    let mut candidates = Vec::new();
    let mut offset = 0;
    while let Some(start) = text[offset..].find(|c: char| c == '{' || c == '[') {
        let candidate = balanced(&text[offset + start..]);
        candidates.push(candidate);
        offset += start + candidate.len();
    }
    candidates
}

/// Returns the bracketed region at the start of `text`.
///
/// Brackets inside string literals are ignored. An unbalanced region runs to the end of `text`.
fn balanced(text: &str) -> &str {
    let mut depth = 0_usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => (),
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' | '[' => depth += 1,
            '}' | ']' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return &text[..=i];
                }
            }
            _ => (),
        }
    }

    text
}

// ----------------------------------------------------------------------------
// Summarizer
// ----------------------------------------------------------------------------

/// Produces the final [`AnalysisResult`] from enriched variants.
#[allow(async_fn_in_trait)]
pub trait Summarizer {
    async fn summarize(
        &self,
        variants: &[EnrichedVariant],
        parsed: &[ParsedVariant],
    ) -> Result<AnalysisResult, Report>;
}

/// Deterministic summarizer backed by the [`KnowledgeBase`], no network access.
#[derive(Clone, Debug)]
pub struct TemplateSummarizer {
    knowledge: KnowledgeBase,
}

impl TemplateSummarizer {
    pub fn new(knowledge: KnowledgeBase) -> Self {
        TemplateSummarizer { knowledge }
    }
}

impl Summarizer for TemplateSummarizer {
    async fn summarize(
        &self,
        variants: &[EnrichedVariant],
        _parsed: &[ParsedVariant],
    ) -> Result<AnalysisResult, Report> {
        Ok(self.knowledge.synthesize(variants))
    }
}

// ----------------------------------------------------------------------------
// Gemini Client
// ----------------------------------------------------------------------------

/// Client for the Gemini `generateContent` API.
///
/// Construct once at start up and pass by reference.
#[derive(Clone)]
pub struct GeminiClient {
    fetch: FetchClient,
    base_url: String,
    model: String,
    api_key: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Candidate {
    content: Content,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Part {
    text: Option<String>,
}

/// Per-variant context sent to the model.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VariantContext<'a> {
    #[serde(flatten)]
    variant: &'a EnrichedVariant,
    #[serde(skip_serializing_if = "Option::is_none")]
    zygosity: Option<String>,
}

impl GeminiClient {
    pub fn new(fetch: FetchClient, base_url: &str, model: &str, api_key: &str) -> Self {
        GeminiClient {
            fetch,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Reads the API key from [`API_KEY_VAR`], returns [`None`] if it is unset or empty.
    pub fn from_env(fetch: FetchClient, base_url: &str, model: &str) -> Option<Self> {
        let api_key = std::env::var(API_KEY_VAR).ok().filter(|key| !key.trim().is_empty())?;
        Some(GeminiClient::new(fetch, base_url, model, api_key.trim()))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send a prompt and return the concatenated text of the first candidate.
    pub async fn generate(&self, prompt: &str) -> Result<String, Report> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = json!({
            "contents": [{"role": "user", "parts": [{"text": prompt}]}],
            "generationConfig": {"responseMimeType": "application/json", "temperature": 0.2},
        });

        debug!("Prompting {} with {} characters.", self.model, prompt.len());
        let fetched = self
            .fetch
            .request_with_retry(|client| {
                client.post(&url).header("x-goog-api-key", &self.api_key).json(&body)
            })
            .await?;

        if !fetched.is_success() {
            return Err(eyre!("AI request failed: {url}"))
                .suggestion(format!("Status code: {}", fetched.status));
        }

        let response: GenerateResponse = serde_json::from_str(&fetched.body)
            .wrap_err("Failed to parse AI service response.")?;
        let text = response
            .candidates
            .into_iter()
            .next()
            .map(|candidate| candidate.content.parts.into_iter().filter_map(|part| part.text).join(""))
            .unwrap_or_default();

        Ok(text)
    }
}

impl Summarizer for GeminiClient {
    async fn summarize(
        &self,
        variants: &[EnrichedVariant],
        parsed: &[ParsedVariant],
    ) -> Result<AnalysisResult, Report> {
        let context = variants
            .iter()
            .map(|variant| VariantContext {
                variant,
                zygosity: parsed
                    .iter()
                    .find(|p| p.identifier.eq_ignore_ascii_case(&variant.identifier))
                    .map(|p| p.zygosity.to_string()),
            })
            .collect_vec();
        let context = serde_json::to_string_pretty(&context)
            .wrap_err("Failed to serialize variant context.")?;

        let prompt = formatdoc! {"
            You are a clinical genomics assistant. Interpret the annotated variants below.

            Respond with a single JSON object and nothing else, using exactly these keys:
            - summary: string, a plain-language overview for a clinician.
            - variants: array of the input variant objects, unchanged.
            - pharmacogenomics: array of {{identifier, gene, phenotype, drugs (array of strings), recommendation}}.
            - oncology: array of {{identifier, gene, mechanism, associatedCancers (array of strings)}}.
            - traits: array of {{identifier, gene, name, description}}.
            - risk: {{overall (integer 0-99), level (one of LOW, MODERATE, HIGH, CRITICAL)}}.

            Route each variant into at most one of pharmacogenomics, oncology, or traits.

            Variants:
            {context}
        ", context = context};

        info!("Requesting AI summary of {} variants from {}.", variants.len(), self.model);
        let text = self.generate(&prompt).await?;
        let mut result: AnalysisResult = parse_model_json(&text)?;
        if result.variants.is_empty() {
            result.variants = variants.to_vec();
        }
        Ok(result)
    }
}

impl IdentifierExtractor for GeminiClient {
    async fn extract(&self, raw: &str) -> Result<Vec<String>, Report> {
        let prompt = formatdoc! {"
            Extract every dbSNP variant identifier (rs followed by digits) mentioned in the text below.
            Where a gene and protein change are given without an identifier, supply the identifier if it is well known.

            Respond with a JSON array of strings and nothing else.

            Text:
            {raw}
        ", raw = raw};

        let text = self.generate(&prompt).await?;
        let identifiers: Vec<String> = parse_model_json(&text)?;
        let identifiers = identifiers
            .into_iter()
            .map(|identifier| identifier.trim().to_lowercase())
            .filter(|identifier| is_identifier(identifier))
            .unique()
            .collect_vec();
        debug!("AI extraction found {} identifiers.", identifiers.len());
        Ok(identifiers)
    }
}
