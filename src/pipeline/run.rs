//! Command entry points: read input, run the requested stage(s), write outputs.

use crate::ai::{GeminiClient, TemplateSummarizer};
use crate::enrich::EnrichmentService;
use crate::extract::PatternExtractor;
use crate::fetch::FetchClient;
use crate::knowledge::KnowledgeBase;
use crate::pipeline::{Analysis, AnalyzeArgs, LookupArgs, Orchestrator, ParseArgs, Provenance, Stage};
use crate::utils::{read_input, write_json};
use crate::variant::{AnalysisResult, Category};
use color_eyre::eyre::{Report, Result};
use log::{info, warn};
use strum::IntoEnumIterator;
use tabled::Table;
use varlens_parse::{detect, parse, ParsedVariant};

/// Parse variants from a file, print them as a table, and optionally write them as JSON.
///
/// ## Examples
///
/// ```rust
/// use varlens::pipeline::{run, ParseArgs};
///
/// let dir = tempfile::tempdir()?;
/// let input = dir.path().join("sample.txt");
/// std::fs::write(&input, "# rsid\tchromosome\tposition\tgenotype\nrs762551\t15\t75041917\tCC\n")?;
///
/// let args = ParseArgs { input, output: Some(dir.path().join("parsed.json")) };
/// let variants = run::parse_file(&args)?;
/// assert_eq!(variants.len(), 1);
/// assert!(dir.path().join("parsed.json").exists());
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn parse_file(args: &ParseArgs) -> Result<Vec<ParsedVariant>, Report> {
    let raw = read_input(&args.input)?;
    let format = detect(&raw);
    let variants = parse(&raw);
    info!("Detected {format} input with {} variants: {:?}", variants.len(), args.input);

    println!("{}", variant_table(&variants));

    if let Some(output) = &args.output {
        info!("Writing parsed variants: {output:?}");
        write_json(&variants, output)?;
    }

    Ok(variants)
}

/// Look up identifiers in the offline knowledge base and print the result.
pub fn lookup_file(args: &LookupArgs) -> Result<AnalysisResult, Report> {
    let raw = read_input(&args.input)?;
    let knowledge = KnowledgeBase::new()?;
    let result = knowledge.lookup(&raw);

    println!("{}", category_table(&result));
    println!("{}", serde_json::to_string_pretty(&result)?);

    if let Some(output) = &args.output {
        info!("Writing analysis result: {output:?}");
        write_json(&result, output)?;
    }

    Ok(result)
}

/// Run the full analysis and write `analysis.json` and `analyze_args.json` to the output directory.
///
/// The AI service is used when its API key is set in the environment, otherwise
/// identifiers are extracted by pattern and the result is synthesized locally.
pub async fn analyze(args: &AnalyzeArgs) -> Result<Analysis, Report> {
    let raw = read_input(&args.input)?;

    let fetch = FetchClient::new(args.retry_policy())?;
    let enrichment = EnrichmentService::new(fetch.clone(), &args.annotation_url, args.chunk_size);
    let knowledge = KnowledgeBase::new()?;
    let on_status = |stage: Stage| info!("{stage}");

    let analysis = match GeminiClient::from_env(fetch, &args.ai_url, &args.model) {
        Some(gemini) => {
            info!("Using AI model: {}", gemini.model());
            Orchestrator::new(&enrichment, &gemini, &gemini, &knowledge)
                .offline(args.offline)
                .analyze(&raw, on_status)
                .await
        }
        None => {
            if !args.offline {
                warn!("{} is not set, summaries will be generated locally.", crate::ai::API_KEY_VAR);
            }
            let extractor = PatternExtractor::new()?;
            let summarizer = TemplateSummarizer::new(knowledge.clone());
            Orchestrator::new(&enrichment, &extractor, &summarizer, &knowledge)
                .offline(args.offline)
                .analyze(&raw, on_status)
                .await
        }
    };

    if let Provenance::Offline { reason } = &analysis.provenance {
        info!("Result generated offline: {reason}");
    }
    info!("{}", analysis.result.summary);

    let output_path = args.output_dir.join("analysis.json");
    info!("Writing analysis: {output_path:?}");
    write_json(&analysis, &output_path)?;

    let args_path = args.output_dir.join("analyze_args.json");
    info!("Writing analyze arguments: {args_path:?}");
    args.write(&args_path)?;

    Ok(analysis)
}

// ----------------------------------------------------------------------------
// Tables

fn variant_table(variants: &[ParsedVariant]) -> Table {
    let mut builder = tabled::builder::Builder::default();
    builder.push_record(["Identifier", "Chromosome", "Position", "Ref", "Alt", "Genotype", "Zygosity"]);
    for variant in variants {
        builder.push_record([
            variant.identifier.clone(),
            variant.chromosome.clone(),
            variant.position.clone(),
            variant.reference_allele.clone(),
            variant.alternate_allele.clone(),
            variant.genotype.clone(),
            variant.zygosity.to_string(),
        ]);
    }
    builder.build()
}

fn category_table(result: &AnalysisResult) -> Table {
    let mut builder = tabled::builder::Builder::default();
    builder.push_record(["Category", "Variants"]);
    for category in Category::iter() {
        builder.push_record([category.to_string(), result.count(category).to_string()]);
    }
    builder.push_record(["RISK".to_string(), format!("{} ({})", result.risk.level, result.risk.overall)]);
    builder.build()
}
