//! Compiled-in reference records for well-characterised, high-impact variants.

use crate::variant::{Category, EnrichedVariant, OncologyProfile, PharmaProfile, TraitProfile};

/// A known variant and its category-specific annotation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OfflineKnowledgeRecord {
    pub identifier: &'static str,
    pub gene: &'static str,
    pub clinical_significance: &'static str,
    pub condition: &'static str,
    pub protein_change: Option<&'static str>,
    pub population_frequency: Option<f64>,
    pub payload: Payload,
}

/// Category-specific annotation of an [`OfflineKnowledgeRecord`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Payload {
    Oncology {
        mechanism: &'static str,
        cancers: &'static [&'static str],
    },
    Pharma {
        phenotype: &'static str,
        drugs: &'static [&'static str],
        recommendation: &'static str,
    },
    Trait {
        name: &'static str,
        description: &'static str,
    },
}

impl OfflineKnowledgeRecord {
    /// The [`Category`], derived from the payload.
    pub fn category(&self) -> Category {
        match self.payload {
            Payload::Oncology { .. } => Category::Oncology,
            Payload::Pharma { .. } => Category::Pharma,
            Payload::Trait { .. } => Category::Trait,
        }
    }

    pub fn to_variant(&self) -> EnrichedVariant {
        EnrichedVariant {
            clinical_significance: self.clinical_significance.to_string(),
            condition: Some(self.condition.to_string()),
            population_frequency: self.population_frequency,
            gene_symbol: Some(self.gene.to_string()),
            protein_change: self.protein_change.map(String::from),
            ..EnrichedVariant::new(self.identifier)
        }
    }

    pub fn to_oncology(&self) -> Option<OncologyProfile> {
        match self.payload {
            Payload::Oncology { mechanism, cancers } => Some(OncologyProfile {
                identifier: self.identifier.to_string(),
                gene: self.gene.to_string(),
                mechanism: mechanism.to_string(),
                associated_cancers: cancers.iter().map(|c| c.to_string()).collect(),
            }),
            _ => None,
        }
    }

    pub fn to_pharma(&self) -> Option<PharmaProfile> {
        match self.payload {
            Payload::Pharma { phenotype, drugs, recommendation } => Some(PharmaProfile {
                identifier: self.identifier.to_string(),
                gene: self.gene.to_string(),
                phenotype: phenotype.to_string(),
                drugs: drugs.iter().map(|d| d.to_string()).collect(),
                recommendation: recommendation.to_string(),
            }),
            _ => None,
        }
    }

    pub fn to_trait(&self) -> Option<TraitProfile> {
        match self.payload {
            Payload::Trait { name, description } => Some(TraitProfile {
                identifier: self.identifier.to_string(),
                gene: self.gene.to_string(),
                name: name.to_string(),
                description: description.to_string(),
            }),
            _ => None,
        }
    }
}

// ----------------------------------------------------------------------------
// Records
// ----------------------------------------------------------------------------

/// Shorthand for an oncology record.
const fn oncology(
    identifier: &'static str,
    gene: &'static str,
    protein_change: &'static str,
    condition: &'static str,
    mechanism: &'static str,
    cancers: &'static [&'static str],
) -> OfflineKnowledgeRecord {
    OfflineKnowledgeRecord {
        identifier,
        gene,
        clinical_significance: "Pathogenic",
        condition,
        protein_change: Some(protein_change),
        population_frequency: None,
        payload: Payload::Oncology { mechanism, cancers },
    }
}

const fn pharma(
    identifier: &'static str,
    gene: &'static str,
    protein_change: Option<&'static str>,
    phenotype: &'static str,
    drugs: &'static [&'static str],
    recommendation: &'static str,
) -> OfflineKnowledgeRecord {
    OfflineKnowledgeRecord {
        identifier,
        gene,
        clinical_significance: "Drug Response",
        condition: phenotype,
        protein_change,
        population_frequency: None,
        payload: Payload::Pharma { phenotype, drugs, recommendation },
    }
}

const fn phenotype(
    identifier: &'static str,
    gene: &'static str,
    clinical_significance: &'static str,
    protein_change: Option<&'static str>,
    name: &'static str,
    description: &'static str,
) -> OfflineKnowledgeRecord {
    OfflineKnowledgeRecord {
        identifier,
        gene,
        clinical_significance,
        condition: name,
        protein_change,
        population_frequency: None,
        payload: Payload::Trait { name, description },
    }
}

/// Every record known to the offline knowledge base. Identifiers are unique.
pub const RECORDS: &[OfflineKnowledgeRecord] = &[
    // Oncology
    oncology(
        "rs80357906",
        "BRCA1",
        "p.Gln1756fs",
        "Hereditary breast and ovarian cancer syndrome",
        "Frameshift truncates BRCA1 and disables homologous recombination repair.",
        &["Breast", "Ovarian"],
    ),
    oncology(
        "rs80357713",
        "BRCA1",
        "p.Glu23fs",
        "Hereditary breast and ovarian cancer syndrome",
        "Founder frameshift (185delAG) producing a truncated, non-functional BRCA1.",
        &["Breast", "Ovarian", "Pancreatic"],
    ),
    oncology(
        "rs80359550",
        "BRCA2",
        "p.Ser1982fs",
        "Hereditary breast and ovarian cancer syndrome",
        "Founder frameshift (6174delT) that abolishes BRCA2 DNA repair function.",
        &["Breast", "Ovarian", "Prostate", "Pancreatic"],
    ),
    oncology(
        "rs113488022",
        "BRAF",
        "p.Val600Glu",
        "Melanoma and other solid tumours",
        "Constitutively activates BRAF kinase and MAPK signalling.",
        &["Melanoma", "Colorectal", "Thyroid"],
    ),
    oncology(
        "rs121913529",
        "KRAS",
        "p.Gly12Asp",
        "Solid tumours",
        "Locks KRAS in its GTP-bound active state, driving proliferation.",
        &["Pancreatic", "Colorectal", "Lung"],
    ),
    oncology(
        "rs121434568",
        "EGFR",
        "p.Leu858Arg",
        "Non-small cell lung cancer",
        "Activates the EGFR tyrosine kinase and confers sensitivity to EGFR inhibitors.",
        &["Lung"],
    ),
    oncology(
        "rs28934578",
        "TP53",
        "p.Arg175His",
        "Li-Fraumeni syndrome",
        "Disrupts TP53 DNA binding with dominant-negative loss of tumour suppression.",
        &["Breast", "Sarcoma", "Brain", "Adrenocortical"],
    ),
    // Pharmacogenomics
    pharma(
        "rs4244285",
        "CYP2C19",
        Some("*2"),
        "Poor metabolizer",
        &["Clopidogrel", "Omeprazole", "Citalopram"],
        "Consider an alternative antiplatelet agent to clopidogrel.",
    ),
    pharma(
        "rs4986893",
        "CYP2C19",
        Some("*3"),
        "Poor metabolizer",
        &["Clopidogrel", "Omeprazole"],
        "Consider an alternative antiplatelet agent to clopidogrel.",
    ),
    pharma(
        "rs12248560",
        "CYP2C19",
        Some("*17"),
        "Rapid metabolizer",
        &["Omeprazole", "Escitalopram"],
        "Proton pump inhibitor doses may need to be increased.",
    ),
    pharma(
        "rs1799853",
        "CYP2C9",
        Some("*2"),
        "Intermediate metabolizer",
        &["Warfarin", "Phenytoin", "Celecoxib"],
        "Start warfarin at a reduced dose and monitor INR closely.",
    ),
    pharma(
        "rs1057910",
        "CYP2C9",
        Some("*3"),
        "Poor metabolizer",
        &["Warfarin", "Phenytoin", "Celecoxib"],
        "Reduce warfarin and phenytoin doses.",
    ),
    pharma(
        "rs9923231",
        "VKORC1",
        None,
        "Increased warfarin sensitivity",
        &["Warfarin"],
        "Lower warfarin maintenance dose is typically required.",
    ),
    pharma(
        "rs3892097",
        "CYP2D6",
        Some("*4"),
        "Poor metabolizer",
        &["Codeine", "Tramadol", "Tamoxifen"],
        "Avoid codeine and tramadol; consider alternatives to tamoxifen.",
    ),
    pharma(
        "rs4149056",
        "SLCO1B1",
        Some("p.Val174Ala"),
        "Decreased transporter function",
        &["Simvastatin", "Atorvastatin"],
        "Use a lower statin dose or an alternative statin to limit myopathy risk.",
    ),
    pharma(
        "rs762551",
        "CYP1A2",
        Some("*1F"),
        "Rapid metabolizer",
        &["Caffeine", "Clozapine"],
        "Standard dosing; caffeine is cleared quickly.",
    ),
    pharma(
        "rs1800460",
        "TPMT",
        Some("p.Ala154Thr"),
        "Intermediate metabolizer",
        &["Azathioprine", "Mercaptopurine", "Thioguanine"],
        "Reduce thiopurine starting dose.",
    ),
    pharma(
        "rs3918290",
        "DPYD",
        Some("*2A"),
        "Poor metabolizer",
        &["Fluorouracil", "Capecitabine"],
        "Avoid fluoropyrimidines or substantially reduce the dose.",
    ),
    // Traits and inherited conditions
    phenotype(
        "rs429358",
        "APOE",
        "Risk Factor",
        Some("p.Cys130Arg"),
        "APOE e4 allele",
        "Associated with increased risk of late-onset Alzheimer's disease.",
    ),
    phenotype(
        "rs7412",
        "APOE",
        "Protective",
        Some("p.Arg176Cys"),
        "APOE e2 allele",
        "Associated with reduced Alzheimer's risk and altered lipid levels.",
    ),
    phenotype(
        "rs1801133",
        "MTHFR",
        "Risk Factor",
        Some("p.Ala222Val"),
        "Reduced MTHFR activity",
        "Lower folate metabolism enzyme activity and raised homocysteine.",
    ),
    phenotype(
        "rs4680",
        "COMT",
        "Benign",
        Some("p.Val158Met"),
        "COMT Val158Met",
        "Influences dopamine breakdown in the prefrontal cortex.",
    ),
    phenotype(
        "rs1815739",
        "ACTN3",
        "Benign",
        Some("p.Arg577Ter"),
        "ACTN3 R577X",
        "Alpha-actinin-3 deficiency in fast-twitch muscle fibres.",
    ),
    phenotype(
        "rs4988235",
        "MCM6",
        "Benign",
        None,
        "Lactase persistence",
        "Regulates lactase expression into adulthood.",
    ),
    phenotype(
        "rs12913832",
        "HERC2",
        "Benign",
        None,
        "Eye colour",
        "Major determinant of blue versus brown eye colour.",
    ),
    phenotype(
        "rs28929474",
        "SERPINA1",
        "Pathogenic",
        Some("p.Glu366Lys"),
        "Alpha-1 antitrypsin deficiency (PiZ)",
        "Misfolded alpha-1 antitrypsin raises lung and liver disease risk.",
    ),
    phenotype(
        "rs334",
        "HBB",
        "Pathogenic",
        Some("p.Glu7Val"),
        "Sickle cell trait",
        "Haemoglobin S; carriers are protected against severe malaria.",
    ),
    phenotype(
        "rs1800562",
        "HFE",
        "Pathogenic",
        Some("p.Cys282Tyr"),
        "Hereditary haemochromatosis",
        "Increased intestinal iron absorption and iron overload.",
    ),
    phenotype(
        "rs113993960",
        "CFTR",
        "Pathogenic",
        Some("p.Phe508del"),
        "Cystic fibrosis (F508del)",
        "Misfolded CFTR chloride channel; carriers are usually unaffected.",
    ),
];
