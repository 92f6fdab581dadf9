use crate::knowledge::{risk_score, KnowledgeBase, Payload, NO_FINDINGS, RECORDS};
use crate::variant::{Category, EnrichedVariant, RiskLevel};
use color_eyre::eyre::{Report, Result};
use indoc::indoc;
use itertools::Itertools;
use strum::IntoEnumIterator;

#[test]
fn records_are_unique_and_lowercase() {
    assert_eq!(RECORDS.iter().map(|r| r.identifier).unique().count(), RECORDS.len());
    assert!(RECORDS.iter().all(|r| r.identifier.starts_with("rs")));
    assert!(RECORDS.iter().all(|r| r.identifier == r.identifier.to_ascii_lowercase()));
}

#[test]
fn every_category_has_records() {
    for category in Category::iter() {
        assert!(RECORDS.iter().any(|r| r.category() == category), "no {category} records");
    }
}

#[test]
fn lookup_is_deterministic() -> Result<(), Report> {
    let knowledge = KnowledgeBase::new()?;
    let input = indoc! {"
        Patient report
        BRCA1 rs80357906 detected, also RS4244285 and rs4680.
        Repeat mention: rs80357906
    "};
    let first = knowledge.lookup(input);
    let second = KnowledgeBase::new()?.lookup(input);
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn lookup_routes_each_variant_once() -> Result<(), Report> {
    let knowledge = KnowledgeBase::new()?;
    let result = knowledge.lookup("rs80357906 rs4244285 rs4680 rs80357906 rs999999999");

    let identifiers: Vec<_> = result.variants.iter().map(|v| v.identifier.as_str()).collect();
    assert_eq!(identifiers, ["rs80357906", "rs4244285", "rs4680"]);

    assert_eq!(result.oncology.len(), 1);
    assert_eq!(result.oncology[0].gene, "BRCA1");
    assert_eq!(result.pharmacogenomics.len(), 1);
    assert_eq!(result.pharmacogenomics[0].gene, "CYP2C19");
    assert!(result.pharmacogenomics[0].drugs.contains(&"Clopidogrel".to_string()));
    assert_eq!(result.traits.len(), 1);
    assert_eq!(result.traits[0].gene, "COMT");

    let routed = result.oncology.len() + result.pharmacogenomics.len() + result.traits.len();
    assert_eq!(routed, result.variants.len());
    Ok(())
}

#[test]
fn lookup_without_matches() -> Result<(), Report> {
    let knowledge = KnowledgeBase::new()?;
    for input in ["", "no identifiers here", "rs1 rs2 rs3"] {
        let result = knowledge.lookup(input);
        assert_eq!(result.summary, NO_FINDINGS);
        assert!(result.variants.is_empty());
        assert!(result.pharmacogenomics.is_empty());
        assert!(result.oncology.is_empty());
        assert!(result.traits.is_empty());
        assert_eq!(result.risk.overall, 10);
        assert_eq!(result.risk.level, RiskLevel::Low);
    }
    Ok(())
}

#[test]
fn summary_lists_genes_and_alerts() -> Result<(), Report> {
    let knowledge = KnowledgeBase::new()?;
    let result = knowledge.lookup("rs113488022 rs1799853 rs9923231");
    assert!(result.summary.contains("BRAF"));
    assert!(result.summary.contains("Pharmacogenomic alert"));
    assert!(result.summary.contains("CYP2C9, VKORC1"));

    let result = knowledge.lookup("rs4680");
    assert!(!result.summary.contains("Pharmacogenomic alert"));
    Ok(())
}

#[test]
fn risk_score_bands() {
    let cases = [
        ((0, 0), 10, RiskLevel::Low),
        ((0, 1), 10, RiskLevel::Low),
        ((0, 3), 15, RiskLevel::Low),
        ((1, 1), 35, RiskLevel::Low),
        ((1, 4), 50, RiskLevel::Low),
        ((1, 5), 55, RiskLevel::High),
        ((2, 4), 80, RiskLevel::High),
        ((2, 5), 85, RiskLevel::Critical),
        ((10, 10), 99, RiskLevel::Critical),
    ];
    for ((oncology, variants), overall, level) in cases {
        let score = risk_score(oncology, variants);
        assert_eq!(score.overall, overall, "{oncology} oncology of {variants}");
        assert_eq!(score.level, level, "{oncology} oncology of {variants}");
    }
}

#[test]
fn synthesize_lists_unknown_variants_without_routing() -> Result<(), Report> {
    let knowledge = KnowledgeBase::new()?;
    let mut unknown = EnrichedVariant::new("rs55555");
    unknown.gene_symbol = Some("GENE9".to_string());
    let known = RECORDS.iter().find(|r| r.identifier == "rs28934578").map(|r| r.to_variant());
    let variants: Vec<_> = known.into_iter().chain([unknown]).collect();

    let result = knowledge.synthesize(&variants);
    assert_eq!(result.variants.len(), 2);
    assert_eq!(result.oncology.len(), 1);
    assert!(result.pharmacogenomics.is_empty() && result.traits.is_empty());
    assert_eq!(result.risk.overall, 40);
    assert!(result.summary.contains("TP53, GENE9"));
    Ok(())
}

#[test]
fn payload_matches_profile() {
    for record in RECORDS {
        let routes = [
            record.to_oncology().is_some(),
            record.to_pharma().is_some(),
            record.to_trait().is_some(),
        ];
        assert_eq!(routes.iter().filter(|r| **r).count(), 1, "{}", record.identifier);
        if let Payload::Pharma { drugs, .. } = record.payload {
            assert!(!drugs.is_empty(), "{}", record.identifier);
        }
    }
}
