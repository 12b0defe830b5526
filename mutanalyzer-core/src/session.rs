//! One analysis run as an immutable value, plus background job submission.

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, TryRecvError};
use serde::{Deserialize, Serialize};
use std::thread;
use std::time::Duration;

use crate::align::{AlignConfig, PairwiseAligner, PairwiseAlignment, SequenceAligner};
use crate::caller::VariantCaller;
use crate::classify::EffectClassifier;
use crate::codon::{CodonMapper, CodonPhase};
use crate::error::{AnalysisError, AnalysisResult};
use crate::pathogenicity::PathogenicityScorer;
use crate::region::{RegionHit, RegionIndex};
use crate::sequence::ungapped;
use crate::translate::{GeneticCode, GeneticCodeId};
use crate::types::{AlignedPair, GenomicRange, Region, Severity, Variant, VariantType};

/// Session-level choices applied uniformly to every variant in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub genetic_code: GeneticCodeId,
    #[serde(default)]
    pub codon_phase: CodonPhase,
    #[serde(default)]
    pub alignment: AlignConfig,
}

/// Totals consumed by reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantSummary {
    pub total: usize,
    pub snps: usize,
    pub insertions: usize,
    pub deletions: usize,
    pub exonic: usize,
    pub intronic: usize,
    pub intergenic: usize,
    pub frameshifts: usize,
    pub missense: usize,
    pub low: usize,
    pub minimal: usize,
    pub medium: usize,
    pub high: usize,
    pub sift_scored: usize,
    pub polyphen_scored: usize,
}

impl VariantSummary {
    pub fn from_variants(variants: &[Variant]) -> Self {
        let mut summary = Self {
            total: variants.len(),
            ..Self::default()
        };
        for v in variants {
            match v.variant_type {
                VariantType::Snp => summary.snps += 1,
                VariantType::Insertion => summary.insertions += 1,
                VariantType::Deletion => summary.deletions += 1,
            }
            match v.region {
                Region::Exon => summary.exonic += 1,
                Region::Intron => summary.intronic += 1,
                Region::Intergenic => summary.intergenic += 1,
            }
            match v.severity {
                Severity::Low => summary.low += 1,
                Severity::Minimal => summary.minimal += 1,
                Severity::Medium => summary.medium += 1,
                Severity::High => summary.high += 1,
            }
            summary.frameshifts += usize::from(v.frameshift);
            summary.missense += usize::from(v.is_missense_snp());
            summary.sift_scored += usize::from(v.sift.is_some());
            summary.polyphen_scored += usize::from(v.polyphen.is_some());
        }
        summary
    }
}

/// Frame-0 translations of both ungapped sequences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProteinComparison {
    pub reference: String,
    pub sample: String,
    /// 0-based residue indices that differ, including positions present in
    /// only one of the two proteins.
    pub changed: Vec<usize>,
}

impl ProteinComparison {
    pub fn new(pair: &AlignedPair, code: &GeneticCode) -> Self {
        let reference = code.translate_sequence(&ungapped(pair.reference()));
        let sample = code.translate_sequence(&ungapped(pair.sample()));
        let changed = (0..reference.len().max(sample.len()))
            .filter(|&i| reference.get(i) != sample.get(i))
            .collect();
        Self {
            reference: String::from_utf8_lossy(&reference).into_owned(),
            sample: String::from_utf8_lossy(&sample).into_owned(),
            changed,
        }
    }

    pub fn is_identical(&self) -> bool {
        self.changed.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSession {
    pair: AlignedPair,
    regions: RegionIndex,
    genetic_code: GeneticCodeId,
    codon_phase: CodonPhase,
    variants: Vec<Variant>,
    summary: VariantSummary,
}

impl AnalysisSession {
    /// Call and classify every variant in `pair`.
    ///
    /// Fails only on invalid input. Variants whose codon cannot be resolved
    /// are kept with an `Unknown` effect.
    pub fn run(
        pair: AlignedPair,
        regions: RegionIndex,
        config: &AnalysisConfig,
    ) -> AnalysisResult<Self> {
        if pair.is_empty() {
            return Err(AnalysisError::validation("aligned pair is empty"));
        }

        let code = GeneticCode::from_id(config.genetic_code);
        let raw = VariantCaller::new().call(&pair);
        let variants = {
            let mapper = CodonMapper::with_phase(&pair, &regions, config.codon_phase);
            EffectClassifier::new(&regions, &mapper, &code).annotate_all(raw)
        };
        let summary = VariantSummary::from_variants(&variants);

        log::info!(
            "Classified {} variants ({} SNPs, {} insertions, {} deletions; {} high severity)",
            summary.total,
            summary.snps,
            summary.insertions,
            summary.deletions,
            summary.high
        );

        Ok(Self {
            pair,
            regions,
            genetic_code: config.genetic_code,
            codon_phase: config.codon_phase,
            variants,
            summary,
        })
    }

    /// Populate pathogenicity scores on missense SNPs.
    ///
    /// Scores are recomputed from scratch, so applying this twice is a no-op.
    pub fn with_pathogenicity(mut self) -> Self {
        let code = GeneticCode::from_id(self.genetic_code);
        {
            let mapper = CodonMapper::with_phase(&self.pair, &self.regions, self.codon_phase);
            PathogenicityScorer::new(&mapper, &code).score(&mut self.variants);
        }
        self.summary = VariantSummary::from_variants(&self.variants);
        self
    }

    pub fn pair(&self) -> &AlignedPair {
        &self.pair
    }

    pub fn regions(&self) -> &RegionIndex {
        &self.regions
    }

    pub fn genetic_code(&self) -> GeneticCodeId {
        self.genetic_code
    }

    pub fn codon_phase(&self) -> CodonPhase {
        self.codon_phase
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    pub fn summary(&self) -> &VariantSummary {
        &self.summary
    }

    pub fn into_variants(self) -> Vec<Variant> {
        self.variants
    }

    /// Exon or intron number and bounds for a variant's anchor.
    pub fn locate(&self, variant: &Variant) -> RegionHit {
        self.regions.locate(variant.position)
    }

    pub fn protein_comparison(&self) -> ProteinComparison {
        ProteinComparison::new(&self.pair, &GeneticCode::from_id(self.genetic_code))
    }
}

/// Raw inputs for an align-then-analyse job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub reference: Vec<u8>,
    pub sample: Vec<u8>,
    pub exons: Vec<GenomicRange>,
    pub config: AnalysisConfig,
    pub pathogenicity: bool,
}

/// Output of a completed job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    pub alignment: PairwiseAlignment,
    pub session: AnalysisSession,
}

/// Align and analyse on the calling thread.
pub fn analyze(request: AnalysisRequest) -> AnalysisResult<AnalysisOutcome> {
    let aligner = PairwiseAligner::new(request.config.alignment);
    let alignment = aligner.align(&request.reference, &request.sample)?;
    let regions = RegionIndex::build(request.exons);

    let session = AnalysisSession::run(alignment.pair.clone(), regions, &request.config)?;
    let session = if request.pathogenicity {
        session.with_pathogenicity()
    } else {
        session
    };
    Ok(AnalysisOutcome { alignment, session })
}

/// Handle to an analysis running on a worker thread.
pub struct AnalysisJob {
    receiver: Receiver<AnalysisResult<AnalysisOutcome>>,
}

impl AnalysisJob {
    /// Block until the job finishes.
    pub fn wait(self) -> AnalysisResult<AnalysisOutcome> {
        self.receiver
            .recv()
            .unwrap_or_else(|_| Err(worker_lost()))
    }

    /// Block for at most `timeout`; `None` if the job is still running.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<AnalysisResult<AnalysisOutcome>> {
        match self.receiver.recv_timeout(timeout) {
            Ok(result) => Some(result),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(Err(worker_lost())),
        }
    }

    /// Non-blocking poll.
    pub fn try_result(&self) -> Option<AnalysisResult<AnalysisOutcome>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(worker_lost())),
        }
    }
}

fn worker_lost() -> AnalysisError {
    AnalysisError::WorkerFailure("analysis worker terminated without a result".to_string())
}

/// Submit `request` to a dedicated worker thread.
pub fn spawn_analysis(request: AnalysisRequest) -> AnalysisResult<AnalysisJob> {
    let (tx, rx) = bounded(1);
    thread::Builder::new()
        .name("analysis".to_string())
        .spawn(move || {
            let _ = tx.send(analyze(request));
        })?;
    Ok(AnalysisJob { receiver: rx })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Effect;

    fn exons(ranges: &[(usize, usize)]) -> RegionIndex {
        RegionIndex::build(
            ranges
                .iter()
                .map(|&(s, e)| GenomicRange::new(s, e).unwrap())
                .collect(),
        )
    }

    #[test]
    fn test_run_and_summarise() {
        let pair = AlignedPair::new(b"ATGCGTACCGGA", b"ATGAGTA--GGA").unwrap();
        let session = AnalysisSession::run(pair, exons(&[(1, 12)]), &AnalysisConfig::default())
            .unwrap();

        let summary = session.summary();
        assert_eq!(summary.total, 2);
        assert_eq!(summary.snps, 1);
        assert_eq!(summary.deletions, 1);
        assert_eq!(summary.exonic, 2);
        assert_eq!(summary.frameshifts, 1);
        assert_eq!(summary.missense, 1);
        assert_eq!(summary.sift_scored, 0);
    }

    #[test]
    fn test_with_pathogenicity_updates_summary() {
        let pair = AlignedPair::new(b"ATGCGT", b"ATGAGT").unwrap();
        let session = AnalysisSession::run(pair, exons(&[(1, 6)]), &AnalysisConfig::default())
            .unwrap()
            .with_pathogenicity();
        assert_eq!(session.summary().sift_scored, 1);
        assert_eq!(session.summary().polyphen_scored, 1);

        let again = session.clone().with_pathogenicity();
        assert_eq!(again, session);
    }

    #[test]
    fn test_locate_reports_exon_number() {
        let pair = AlignedPair::new(b"ATGCGTACCGGA", b"ATGCGTACCGCA").unwrap();
        let session =
            AnalysisSession::run(pair, exons(&[(1, 3), (7, 12)]), &AnalysisConfig::default())
                .unwrap();
        let hit = session.locate(&session.variants()[0]);
        assert_eq!(hit.region, Region::Exon);
        assert_eq!(hit.ordinal, Some(2));
    }

    #[test]
    fn test_protein_comparison() {
        let pair = AlignedPair::new(b"ATGCGTTAA", b"ATGAGTTAA").unwrap();
        let session =
            AnalysisSession::run(pair, exons(&[(1, 9)]), &AnalysisConfig::default()).unwrap();
        let protein = session.protein_comparison();
        assert_eq!(protein.reference, "MR*");
        assert_eq!(protein.sample, "MS*");
        assert_eq!(protein.changed, vec![1]);
    }

    #[test]
    fn test_protein_comparison_length_change() {
        let pair = AlignedPair::new(b"ATGCGTTAA", b"ATG---TAA").unwrap();
        let protein = ProteinComparison::new(&pair, &GeneticCode::standard());
        assert_eq!(protein.reference, "MR*");
        assert_eq!(protein.sample, "M*");
        assert_eq!(protein.changed, vec![1, 2]);
    }

    #[test]
    fn test_config_defaults_from_empty_toml_like_json() {
        let config: AnalysisConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, AnalysisConfig::default());
        assert_eq!(config.alignment.gap_open, -10);
    }

    #[test]
    fn test_spawned_job_matches_direct_run() {
        let request = AnalysisRequest {
            reference: b"ATGCGTACC".to_vec(),
            sample: b"ATGAGTACC".to_vec(),
            exons: vec![GenomicRange::new(1, 9).unwrap()],
            config: AnalysisConfig::default(),
            pathogenicity: true,
        };
        let direct = analyze(request.clone()).unwrap();
        let spawned = spawn_analysis(request).unwrap().wait().unwrap();
        assert_eq!(direct, spawned);

        let variants = spawned.session.variants();
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].effect, Effect::Missense);
        assert!(variants[0].polyphen.is_some());
    }

    #[test]
    fn test_dead_worker_is_not_an_alignment_error() {
        let (tx, rx) = bounded::<AnalysisResult<AnalysisOutcome>>(1);
        let worker = thread::spawn(move || {
            let _tx = tx;
            panic!("classifier fault");
        });
        assert!(worker.join().is_err());

        let job = AnalysisJob { receiver: rx };
        assert!(matches!(
            job.try_result(),
            Some(Err(AnalysisError::WorkerFailure(_)))
        ));
        let err = job.wait().unwrap_err();
        assert!(matches!(err, AnalysisError::WorkerFailure(_)));
        assert!(!err.is_alignment_error());
    }
}
