use crate::ai::{outermost_json, parse_model_json, strip_fences, GeminiClient, Summarizer, TemplateSummarizer, PARSE_ERROR};
use crate::extract::IdentifierExtractor;
use crate::fetch::{FetchClient, RetryPolicy};
use crate::knowledge::KnowledgeBase;
use crate::variant::{AnalysisResult, EnrichedVariant, RiskLevel};
use color_eyre::eyre::{Report, Result};
use indoc::indoc;
use serde_json::{json, Value};
use std::time::Duration;
use varlens_parse::{ParsedVariant, Zygosity};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ----------------------------------------------------------------------------
// Response Parsing

#[test]
fn fences_are_stripped() {
    assert_eq!(strip_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
    assert_eq!(strip_fences("```\n[1, 2]\n```  "), "[1, 2]");
    assert_eq!(strip_fences("  {\"a\": 1} "), "{\"a\": 1}");
}

#[test]
fn outermost_value_ignores_prose_and_strings() {
    let text = r#"Sure! {"summary": "braces } and ] inside", "nested": {"list": [1, {"b": 2}]}} Hope this helps {x}"#;
    assert_eq!(
        outermost_json(text),
        Some(r#"{"summary": "braces } and ] inside", "nested": {"list": [1, {"b": 2}]}}"#)
    );
    assert_eq!(outermost_json("result: [\"rs1\", \"rs2\"] done"), Some("[\"rs1\", \"rs2\"]"));
    assert_eq!(outermost_json(r#"{"quote": "a \" } b"}"#), Some(r#"{"quote": "a \" } b"}"#));
    assert_eq!(outermost_json("no json here"), None);
}

#[test]
fn bracketed_prose_before_payload() -> Result<(), Report> {
    let text = r#"Based on [ClinVar] data: {"summary": "ok", "variants": []}"#;
    assert_eq!(outermost_json(text), Some(r#"{"summary": "ok", "variants": []}"#));

    let result: AnalysisResult = parse_model_json(text)?;
    assert_eq!(result.summary, "ok");

    let text = "See [1] and [2]: {\"summary\": \"repaired\", \"traits\": [],}";
    let result: AnalysisResult = parse_model_json(text)?;
    assert_eq!(result.summary, "repaired");
    Ok(())
}

#[test]
fn trailing_commas_are_repaired() -> Result<(), Report> {
    let text = indoc! {r#"
        ```json
        {
            "summary": "Two variants.",
            "risk": {"overall": 60, "level": "HIGH",},
            "traits": [],
        }
        ```
    "#};
    let result: AnalysisResult = parse_model_json(text)?;
    assert_eq!(result.summary, "Two variants.");
    assert_eq!(result.risk.overall, 60);
    assert_eq!(result.risk.level, RiskLevel::High);
    Ok(())
}

#[test]
fn unrepairable_response_is_user_facing_error() {
    for text in ["", "I cannot help with that.", "{\"summary\": \"interrupt", "[1, 2,, 3]"] {
        let error = parse_model_json::<Value>(text).expect_err(text);
        assert_eq!(error.to_string(), PARSE_ERROR, "{text:?}");
    }
}

#[test]
fn missing_summary_is_invalid() {
    let error = parse_model_json::<AnalysisResult>("{\"variants\": []}").expect_err("summary is required");
    assert_eq!(error.to_string(), PARSE_ERROR);
}

// ----------------------------------------------------------------------------
// Summarizers

fn gemini(server: &MockServer) -> Result<GeminiClient, Report> {
    let policy = RetryPolicy {
        max_attempts: 2,
        base_delay: Duration::from_millis(1),
        max_jitter: Duration::ZERO,
        timeout: Duration::from_secs(5),
    };
    Ok(GeminiClient::new(FetchClient::new(policy)?, &server.uri(), "test-model", "secret"))
}

fn candidate(text: &str) -> Value {
    json!({"candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}]})
}

#[tokio::test]
async fn template_summarizer_uses_knowledge_base() -> Result<(), Report> {
    let summarizer = TemplateSummarizer::new(KnowledgeBase::new()?);
    let variants = vec![EnrichedVariant::new("rs113488022"), EnrichedVariant::new("rs1")];
    let result = summarizer.summarize(&variants, &[]).await?;

    assert_eq!(result.variants.len(), 2);
    assert_eq!(result.oncology.len(), 1);
    assert_eq!(result.risk.overall, 40);
    Ok(())
}

#[tokio::test]
async fn gemini_summary() -> Result<(), Report> {
    let server = MockServer::start().await;
    let text = "```json\n{\"summary\": \"BRAF V600E detected.\", \"risk\": {\"overall\": 70, \"level\": \"HIGH\"},}\n```";
    Mock::given(method("POST"))
        .and(path("/models/test-model:generateContent"))
        .and(header("x-goog-api-key", "secret"))
        .and(body_string_contains("HETEROZYGOUS"))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate(text)))
        .expect(1)
        .mount(&server)
        .await;

    let client = gemini(&server)?;
    let variants = vec![EnrichedVariant::new("rs113488022")];
    let parsed = vec![ParsedVariant {
        identifier: "rs113488022".to_string(),
        genotype: "0/1".to_string(),
        zygosity: Zygosity::Heterozygous,
        ..Default::default()
    }];
    let result = client.summarize(&variants, &parsed).await?;

    assert_eq!(result.summary, "BRAF V600E detected.");
    assert_eq!(result.risk.level, RiskLevel::High);
    assert_eq!(result.variants, variants);
    server.verify().await;
    Ok(())
}

#[tokio::test]
async fn gemini_garbled_summary_is_error() -> Result<(), Report> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate("{\"summary\": \"The analysis of")))
        .mount(&server)
        .await;

    let client = gemini(&server)?;
    let error = client.summarize(&[EnrichedVariant::new("rs1")], &[]).await.expect_err("truncated");
    assert_eq!(error.to_string(), PARSE_ERROR);
    Ok(())
}

#[tokio::test]
async fn gemini_unavailable_is_error() -> Result<(), Report> {
    let server = MockServer::start().await;
    Mock::given(method("POST")).respond_with(ResponseTemplate::new(503)).expect(2).mount(&server).await;

    let client = gemini(&server)?;
    assert!(client.generate("hello").await.is_err());
    server.verify().await;
    Ok(())
}

#[tokio::test]
async fn gemini_rejected_key_is_error() -> Result<(), Report> {
    let server = MockServer::start().await;
    Mock::given(method("POST")).respond_with(ResponseTemplate::new(403)).expect(1).mount(&server).await;

    let client = gemini(&server)?;
    assert!(client.generate("hello").await.is_err());
    server.verify().await;
    Ok(())
}

#[tokio::test]
async fn gemini_extracts_identifiers() -> Result<(), Report> {
    let server = MockServer::start().await;
    let text = "[\"rs113488022\", \"RS4680\", \"BRCA1\", \"rs113488022\", \"rs\"]";
    Mock::given(method("POST"))
        .and(path("/models/test-model:generateContent"))
        .and(body_string_contains("BRAF V600E"))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate(text)))
        .mount(&server)
        .await;

    let client = gemini(&server)?;
    let identifiers = client.extract("Patient has BRAF V600E and COMT rs4680").await?;
    assert_eq!(identifiers, ["rs113488022", "rs4680"]);
    Ok(())
}
