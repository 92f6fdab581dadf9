use crate::{detect, parse, twentythree, vcf, Format, ParsedVariant, Zygosity};
use indoc::indoc;

const VCF: &str = indoc! {"
    ##fileformat=VCFv4.2
    ##source=test
    #CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tSAMPLE
    1\t100\trs111033441\tA\tG\t.\tPASS\t.\tGT\t0/0
    14\t94378610\trs28929474\tC\tT\t.\tPASS\t.\tGT\t0/1
"};

#[test]
fn vcf_wildtype_and_heterozygous() {
    let observed = parse(VCF);
    let expected = vec![ParsedVariant {
        identifier: "rs28929474".to_string(),
        chromosome: "14".to_string(),
        position: "94378610".to_string(),
        reference_allele: "C".to_string(),
        alternate_allele: "T".to_string(),
        genotype: "0/1".to_string(),
        zygosity: Zygosity::Heterozygous,
    }];
    assert_eq!(expected, observed);
}

#[test]
fn vcf_no_calls_are_dropped() {
    for genotype in ["0/0", "0|0", "./.", "."] {
        let input = format!(
            "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tS1\n1\t100\trs111033441\tA\tG\t.\tPASS\t.\tGT:DP\t{genotype}:12\n"
        );
        assert!(parse(&input).is_empty(), "{genotype} should be dropped");
    }
}

#[test]
fn vcf_zygosity_mapping() {
    let cases = [
        ("0/1", Zygosity::Heterozygous),
        ("1|0", Zygosity::Heterozygous),
        ("1/1", Zygosity::Homozygous),
        ("1|1", Zygosity::Homozygous),
        ("1/2", Zygosity::Heterozygous),
        ("0/2", Zygosity::Heterozygous),
    ];
    for (genotype, expected) in cases {
        let input = format!("##fileformat=VCFv4.2\n1\t100\trs1\tA\tG\t.\tPASS\t.\tGT\t{genotype}\n");
        let observed = parse(&input);
        assert_eq!(observed.len(), 1);
        assert_eq!(observed[0].zygosity, expected, "genotype {genotype}");
    }
}

#[test]
fn vcf_genotype_subfield_lookup() {
    let input = indoc! {"
        ##fileformat=VCFv4.2
        1\t100\trs1\tA\tG\t.\tPASS\t.\tGT:DP\t0/1:30
        1\t200\trs2\tA\tG\t.\tPASS\t.\tDP:GT\t30:1/1
    "};
    let observed: Vec<_> = parse(input).into_iter().map(|v| (v.identifier, v.zygosity)).collect();
    let expected = vec![
        ("rs1".to_string(), Zygosity::Heterozygous),
        ("rs2".to_string(), Zygosity::Homozygous),
    ];
    assert_eq!(expected, observed);
}

#[test]
fn vcf_missing_sample_is_unknown() {
    let input = indoc! {"
        ##fileformat=VCFv4.2
        1\t100\trs1\tA\tG\t.\tPASS\t.
        1\t200\trs2\tA\tG\t.\tPASS\t.\tDP\t30
    "};
    let observed = parse(input);
    assert_eq!(observed.len(), 2);
    assert!(observed.iter().all(|v| v.zygosity == Zygosity::Unknown));
    assert!(observed.iter().all(|v| v.genotype.is_empty()));
}

#[test]
fn vcf_reordered_columns() {
    let input = indoc! {"
        #CHROM\tPOS\tREF\tALT\tID\tQUAL\tFILTER\tINFO\tFORMAT\tSAMPLE
        7\t140753336\tA\tT\trs113488022\t.\tPASS\t.\tGT\t1/1
    "};
    let observed = parse(input);
    assert_eq!(observed.len(), 1);
    assert_eq!(observed[0].identifier, "rs113488022");
    assert_eq!(observed[0].reference_allele, "A");
    assert_eq!(observed[0].alternate_allele, "T");
    assert_eq!(observed[0].zygosity, Zygosity::Homozygous);
}

#[test]
fn vcf_skips_malformed_and_unidentified() {
    let input = indoc! {"
        ##fileformat=VCFv4.2
        1\t100\trs1
        1\t200\t.\tA\tG\t.\tPASS\t.\tGT\t0/1
        1\t300\tCOSV123\tA\tG\t.\tPASS\t.\tGT\t0/1
        1\t400\trs4\tA\tG\t.\tPASS\t.\tGT\t0/1
    "};
    let observed = parse(input);
    assert_eq!(observed.len(), 1);
    assert_eq!(observed[0].identifier, "rs4");
}

#[test]
fn vcf_parse_line_skip_reasons() {
    let header = vcf::Header::default();
    assert_eq!(vcf::parse_line("1\t100", &header), Err(vcf::Skip::Malformed));
    assert_eq!(
        vcf::parse_line("1\t100\t.\tA\tG\t.\tPASS\t.", &header),
        Err(vcf::Skip::MissingIdentifier)
    );
    assert_eq!(
        vcf::parse_line("1\t100\trs1\tA\tG\t.\tPASS\t.\tGT\t./.", &header),
        Err(vcf::Skip::NoCall)
    );
}

#[test]
fn twentythree_single_line() {
    let observed = twentythree::parse("rs762551  15  75041917  CC");
    let expected = vec![ParsedVariant {
        identifier: "rs762551".to_string(),
        chromosome: "15".to_string(),
        position: "75041917".to_string(),
        genotype: "CC".to_string(),
        zygosity: Zygosity::Unknown,
        ..Default::default()
    }];
    assert_eq!(expected, observed);
}

#[test]
fn twentythree_export() {
    let input = indoc! {"
        # This data file generated by 23andMe
        # rsid\tchromosome\tposition\tgenotype

        rs4477212\t1\t82154\tAA
        rs3094315\t1\t752566\t--
        rs3131972\t1\t752721
        i3000001\t1\t1000000\tAG
    "};
    assert_eq!(detect(input), Format::TwentyThreeAndMe);

    let observed: Vec<_> = parse(input).into_iter().map(|v| v.identifier).collect();
    assert_eq!(observed, vec!["rs4477212", "i3000001"]);
}

#[test]
fn unstructured_yields_nothing() {
    let input = "Patient carries rs113488022 (BRAF V600E) and rs4680.";
    assert_eq!(detect(input), Format::Unstructured);
    assert!(parse(input).is_empty());
    assert!(parse("").is_empty());
}

#[test]
fn header_without_meta_is_vcf() {
    let input = "#CHROM POS ID REF ALT QUAL FILTER INFO\n1 100 rs1 A G . PASS .\n";
    assert_eq!(detect(input), Format::Vcf);
    assert_eq!(parse(input).len(), 1);
}

#[test]
fn parse_is_pure() {
    assert_eq!(parse(VCF), parse(VCF));
}
