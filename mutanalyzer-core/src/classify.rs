//! Region- and frame-aware consequence classification.

use serde::{Deserialize, Serialize};

use crate::codon::CodonMapper;
use crate::region::RegionIndex;
use crate::translate::{CodonTranslator, Translation};
use crate::types::{Effect, Position, RawVariant, Region, SequenceSide, Severity, Variant, VariantType};

/// Effect fields assigned to one raw variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub region: Region,
    pub effect: Effect,
    pub severity: Severity,
    pub frameshift: bool,
}

/// Reference and sample translations of the codon hit by a SNP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodonChange {
    pub reference: Translation,
    pub alternate: Translation,
}

impl CodonChange {
    /// Resolve both codons around `position` and translate them.
    pub fn resolve<T: CodonTranslator + ?Sized>(
        mapper: &CodonMapper<'_>,
        translator: &T,
        position: Position,
    ) -> Self {
        let ref_codon = mapper.codon_at(position, SequenceSide::Reference);
        let alt_codon = mapper.codon_at(position, SequenceSide::Sample);
        Self {
            reference: translator.translate(&ref_codon),
            alternate: translator.translate(&alt_codon),
        }
    }

    /// Silent, nonsense or missense; `Unknown` when either side is unresolved.
    pub fn effect(&self) -> (Effect, Severity) {
        if !self.reference.is_resolved() || !self.alternate.is_resolved() {
            return (Effect::Unknown, Severity::Minimal);
        }
        if self.reference == self.alternate {
            (Effect::Silent, Severity::Low)
        } else if self.alternate == Translation::Stop {
            (Effect::Nonsense, Severity::High)
        } else {
            (Effect::Missense, Severity::Medium)
        }
    }
}

pub struct EffectClassifier<'a, T: CodonTranslator + ?Sized> {
    regions: &'a RegionIndex,
    mapper: &'a CodonMapper<'a>,
    translator: &'a T,
}

impl<'a, T: CodonTranslator + ?Sized> EffectClassifier<'a, T> {
    pub fn new(regions: &'a RegionIndex, mapper: &'a CodonMapper<'a>, translator: &'a T) -> Self {
        Self {
            regions,
            mapper,
            translator,
        }
    }

    pub fn classify(&self, variant: &RawVariant) -> Classification {
        let region = self.regions.classify(variant.position);
        let (effect, severity, frameshift) = match (region, variant.variant_type) {
            (Region::Exon, VariantType::Snp) => {
                let (effect, severity) =
                    CodonChange::resolve(self.mapper, self.translator, variant.position).effect();
                if effect == Effect::Unknown {
                    log::debug!(
                        "Codon at position {} could not be translated; marking as Unknown",
                        variant.position
                    );
                }
                (effect, severity, false)
            }
            (Region::Exon, kind) => frame_effect(kind, variant.len()),
            (Region::Intron, VariantType::Snp) => (Effect::Intronic, Severity::Minimal, false),
            (_, VariantType::Snp) => (Effect::Substitution, Severity::Low, false),
            (_, VariantType::Insertion) => (Effect::Insertion, Severity::Medium, false),
            (_, VariantType::Deletion) => (Effect::Deletion, Severity::Medium, false),
        };

        Classification {
            region,
            effect,
            severity,
            frameshift,
        }
    }

    /// Classify and assemble the full variant record.
    pub fn annotate(&self, variant: RawVariant) -> Variant {
        let c = self.classify(&variant);
        Variant {
            position: variant.position,
            variant_type: variant.variant_type,
            ref_allele: variant.ref_allele,
            alt_allele: variant.alt_allele,
            region: c.region,
            effect: c.effect,
            frameshift: c.frameshift,
            severity: c.severity,
            sift: None,
            polyphen: None,
        }
    }

    pub fn annotate_all(&self, variants: Vec<RawVariant>) -> Vec<Variant> {
        variants.into_iter().map(|v| self.annotate(v)).collect()
    }
}

/// In-frame vs frameshift rule for coding indels.
pub fn frame_effect(kind: VariantType, length: usize) -> (Effect, Severity, bool) {
    let in_frame = length % 3 == 0;
    match (kind, in_frame) {
        (VariantType::Insertion, true) => (Effect::InFrameInsertion, Severity::Medium, false),
        (VariantType::Insertion, false) => (Effect::FrameshiftInsertion, Severity::High, true),
        (VariantType::Deletion, true) => (Effect::InFrameDeletion, Severity::Medium, false),
        (VariantType::Deletion, false) => (Effect::FrameshiftDeletion, Severity::High, true),
        (VariantType::Snp, _) => (Effect::Substitution, Severity::Low, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caller::VariantCaller;
    use crate::translate::GeneticCode;
    use crate::types::{AlignedPair, GenomicRange};

    fn exons(ranges: &[(usize, usize)]) -> RegionIndex {
        RegionIndex::build(
            ranges
                .iter()
                .map(|&(s, e)| GenomicRange::new(s, e).unwrap())
                .collect(),
        )
    }

    fn classify_all(reference: &str, sample: &str, regions: &RegionIndex) -> Vec<Variant> {
        let pair = AlignedPair::new(reference.as_bytes(), sample.as_bytes()).unwrap();
        let mapper = CodonMapper::new(&pair);
        let code = GeneticCode::standard();
        let classifier = EffectClassifier::new(regions, &mapper, &code);
        classifier.annotate_all(VariantCaller::new().call(&pair))
    }

    #[test]
    fn test_missense() {
        let variants = classify_all("ATGCGT", "ATGAGT", &exons(&[(1, 6)]));
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].effect, Effect::Missense);
        assert_eq!(variants[0].severity, Severity::Medium);
        assert!(!variants[0].frameshift);
    }

    #[test]
    fn test_silent() {
        // CGT -> CGC, both Arg.
        let variants = classify_all("ATGCGT", "ATGCGC", &exons(&[(1, 6)]));
        assert_eq!(variants[0].effect, Effect::Silent);
        assert_eq!(variants[0].severity, Severity::Low);
    }

    #[test]
    fn test_nonsense() {
        // CGA -> TGA, Arg to stop.
        let variants = classify_all("ATGCGA", "ATGTGA", &exons(&[(1, 6)]));
        assert_eq!(variants[0].effect, Effect::Nonsense);
        assert_eq!(variants[0].severity, Severity::High);
    }

    #[test]
    fn test_unknown_when_codon_has_ambiguous_base() {
        let variants = classify_all("ATGCNT", "ATGANT", &exons(&[(1, 6)]));
        assert_eq!(variants[0].effect, Effect::Unknown);
        assert_eq!(variants[0].severity, Severity::Minimal);
    }

    #[test]
    fn test_mitochondrial_code_changes_outcome() {
        // TGG -> TGA: nonsense in the standard code, silent (Trp) in vertebrate mito.
        let pair = AlignedPair::new(b"ATGTGG", b"ATGTGA").unwrap();
        let regions = exons(&[(1, 6)]);
        let mapper = CodonMapper::new(&pair);
        let raw = VariantCaller::new().call(&pair);

        let standard = GeneticCode::standard();
        let c = EffectClassifier::new(&regions, &mapper, &standard).classify(&raw[0]);
        assert_eq!(c.effect, Effect::Nonsense);

        let mito = GeneticCode::from_id(crate::translate::GeneticCodeId::VertebrateMitochondrial);
        let c = EffectClassifier::new(&regions, &mapper, &mito).classify(&raw[0]);
        assert_eq!(c.effect, Effect::Silent);
    }

    #[test]
    fn test_intronic_snp() {
        let variants = classify_all("ATGCGTAAACCC", "ATGCGTAAACGC", &exons(&[(1, 3), (12, 12)]));
        assert_eq!(variants[0].region, Region::Intron);
        assert_eq!(variants[0].effect, Effect::Intronic);
        assert_eq!(variants[0].severity, Severity::Minimal);
    }

    #[test]
    fn test_intronic_indel_is_generic() {
        let variants = classify_all("ATGCGTAAACCC", "ATGCG-AAACCC", &exons(&[(1, 3), (12, 12)]));
        assert_eq!(variants[0].effect, Effect::Deletion);
        assert_eq!(variants[0].severity, Severity::Medium);
        assert!(!variants[0].frameshift);
    }

    #[test]
    fn test_intergenic() {
        let regions = exons(&[]);
        let snp = classify_all("ATGCGT", "ATGAGT", &regions);
        assert_eq!(snp[0].region, Region::Intergenic);
        assert_eq!(snp[0].effect, Effect::Substitution);
        assert_eq!(snp[0].severity, Severity::Low);

        let ins = classify_all("ATG-CGT", "ATGACGT", &regions);
        assert_eq!(ins[0].effect, Effect::Insertion);
        assert_eq!(ins[0].severity, Severity::Medium);
        assert!(!ins[0].frameshift);
    }

    #[test]
    fn test_frame_rule() {
        for length in 1..50 {
            let (effect, _, frameshift) = frame_effect(VariantType::Deletion, length);
            if length % 3 == 0 {
                assert_eq!(effect, Effect::InFrameDeletion);
                assert!(!frameshift);
            } else {
                assert_eq!(effect, Effect::FrameshiftDeletion);
                assert!(frameshift);
            }
        }
    }
}
