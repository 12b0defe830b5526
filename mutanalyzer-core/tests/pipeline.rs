use mutanalyzer_core::pathogenicity::PathogenicityScorer;
use mutanalyzer_core::types::{PolyphenPrediction, SiftPrediction};
use mutanalyzer_core::{
    AlignedPair, AnalysisConfig, AnalysisError, AnalysisSession, CodonMapper, CodonTranslator,
    Effect, EffectClassifier, GeneticCode, GenomicRange, Region, RegionIndex, Severity,
    Translation, VariantCaller, VariantType,
};

fn exons(ranges: &[(usize, usize)]) -> RegionIndex {
    RegionIndex::build(
        ranges
            .iter()
            .map(|&(s, e)| GenomicRange::new(s, e).expect("valid range"))
            .collect(),
    )
}

fn run(reference: &str, sample: &str, regions: RegionIndex) -> AnalysisSession {
    let pair = AlignedPair::new(reference.as_bytes(), sample.as_bytes()).expect("valid pair");
    AnalysisSession::run(pair, regions, &AnalysisConfig::default()).expect("analysis")
}

/// Translator that fails the test if the classifier asks it anything.
struct NoLookup;

impl CodonTranslator for NoLookup {
    fn translate(&self, codon: &[u8]) -> Translation {
        panic!("unexpected codon lookup for {:?}", String::from_utf8_lossy(codon));
    }
}

#[test]
fn exonic_snp_is_missense() {
    let session = run("ATGCGT", "ATGAGT", exons(&[(1, 6)]));
    let variants = session.variants();
    assert_eq!(variants.len(), 1);

    let v = &variants[0];
    assert_eq!(v.variant_type, VariantType::Snp);
    assert_eq!(v.position, 4);
    assert_eq!(v.ref_allele, "C");
    assert_eq!(v.alt_allele, "A");
    assert_eq!(v.region, Region::Exon);
    assert_eq!(v.effect, Effect::Missense);
    assert_eq!(v.severity, Severity::Medium);
    assert!(!v.frameshift);
    assert!(v.sift.is_none());
    assert!(v.polyphen.is_none());
}

#[test]
fn missense_snp_gets_pathogenicity_scores() {
    let session = run("ATGCGT", "ATGAGT", exons(&[(1, 6)])).with_pathogenicity();
    let v = &session.variants()[0];

    let sift = v.sift.expect("sift populated");
    assert!((sift.score - 0.40).abs() < 1e-9);
    assert_eq!(sift.prediction, SiftPrediction::Tolerated);

    let polyphen = v.polyphen.expect("polyphen populated");
    assert_eq!(polyphen.score, 110.0);
    assert_eq!(polyphen.prediction, PolyphenPrediction::ProbablyDamaging);
}

#[test]
fn exonic_two_base_insertion_shifts_frame() {
    let session = run("ATG--GCA", "ATGTTGCA", exons(&[(1, 6)]));
    let variants = session.variants();
    assert_eq!(variants.len(), 1);

    let v = &variants[0];
    assert_eq!(v.variant_type, VariantType::Insertion);
    assert_eq!(v.position, 3);
    assert_eq!(v.alt_allele, "TT");
    assert_eq!(v.len(), 2);
    assert_eq!(v.region, Region::Exon);
    assert_eq!(v.effect, Effect::FrameshiftInsertion);
    assert!(v.frameshift);
    assert_eq!(v.severity, Severity::High);
}

#[test]
fn exonic_codon_deletion_is_in_frame() {
    let session = run("ATGCGTACC", "ATG---ACC", exons(&[(1, 9)]));
    let variants = session.variants();
    assert_eq!(variants.len(), 1);

    let v = &variants[0];
    assert_eq!(v.variant_type, VariantType::Deletion);
    assert_eq!(v.position, 4);
    assert_eq!(v.ref_allele, "CGT");
    assert_eq!(v.len(), 3);
    assert_eq!(v.effect, Effect::InFrameDeletion);
    assert!(!v.frameshift);
    assert_eq!(v.severity, Severity::Medium);
}

#[test]
fn intronic_snp_skips_codon_lookup() {
    let pair = AlignedPair::new(b"ATGCGT", b"ATGAGT").unwrap();
    let regions = RegionIndex::with_introns(Vec::new(), vec![GenomicRange::new(1, 6).unwrap()]);
    let mapper = CodonMapper::new(&pair);
    let classifier = EffectClassifier::new(&regions, &mapper, &NoLookup);

    let variants = classifier.annotate_all(VariantCaller::new().call(&pair));
    assert_eq!(variants.len(), 1);
    assert_eq!(variants[0].region, Region::Intron);
    assert_eq!(variants[0].effect, Effect::Intronic);
    assert_eq!(variants[0].severity, Severity::Minimal);
}

#[test]
fn pathogenicity_is_idempotent_and_selective() {
    // Missense SNP at 4 plus an in-frame deletion downstream.
    let session = run("ATGCGTACCGGA", "ATGAGTACC---", exons(&[(1, 12)]));
    let pair = session.pair().clone();
    let mut variants = session.into_variants();
    assert_eq!(variants.len(), 2);

    let mapper = CodonMapper::new(&pair);
    let code = GeneticCode::standard();
    let scorer = PathogenicityScorer::new(&mapper, &code);

    scorer.score(&mut variants);
    let once = variants.clone();
    scorer.score(&mut variants);
    assert_eq!(variants, once);

    assert!(variants[0].sift.is_some());
    assert!(variants[1].sift.is_none());
    assert!(variants[1].polyphen.is_none());
}

#[test]
fn rerun_replaces_previous_results() {
    let first = run("ATGCGT", "ATGAGT", exons(&[(1, 6)]));
    let second = run("ATGCGT", "ATGCGT", exons(&[(1, 6)]));
    assert_eq!(first.summary().total, 1);
    assert_eq!(second.summary().total, 0);
    assert!(second.variants().is_empty());
}

#[test]
fn unequal_lengths_are_rejected() {
    let err = AlignedPair::new(b"ATGCGT", b"ATGAG").unwrap_err();
    assert!(matches!(err, AnalysisError::InputValidation(_)));
}

#[test]
fn empty_pair_is_rejected() {
    let err = AlignedPair::new(b"", b"").unwrap_err();
    assert!(matches!(err, AnalysisError::InputValidation(_)));
}

#[test]
fn unresolvable_codon_degrades_single_variant() {
    // First SNP sits in an N-containing codon; second one is clean.
    let session = run("ANGCGT", "ACGAGT", exons(&[(1, 6)]));
    let effects: Vec<Effect> = session.variants().iter().map(|v| v.effect).collect();
    assert_eq!(effects, vec![Effect::Unknown, Effect::Missense]);
    assert_eq!(session.variants()[0].severity, Severity::Minimal);
}

#[test]
fn intergenic_variants_are_generic() {
    let session = run("ATGCGTACCGGA", "ATGAGTA--GGA", RegionIndex::build(Vec::new()));
    let variants = session.variants();
    assert_eq!(variants[0].effect, Effect::Substitution);
    assert_eq!(variants[0].severity, Severity::Low);
    assert_eq!(variants[1].effect, Effect::Deletion);
    assert_eq!(variants[1].severity, Severity::Medium);
    assert!(!variants[1].frameshift);
}
