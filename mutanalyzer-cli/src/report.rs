//! Text and JSON reports for a finished analysis session

use chrono::{DateTime, Local};
use mutanalyzer_core::{
    AnalysisSession, CodonPhase, GeneticCodeId, GenomicRange, PairwiseAlignment,
    ProteinComparison, Region, Variant, VariantSummary,
};
use serde::Serialize;
use std::io::{self, Write};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Widest allele shown in the variant table before it is abbreviated.
const ALLELE_COLUMN: usize = 8;

pub struct Report<'a> {
    session: &'a AnalysisSession,
    alignment: Option<&'a PairwiseAlignment>,
    generated_at: DateTime<Local>,
    protein_comparison: bool,
    width: usize,
}

impl<'a> Report<'a> {
    pub fn new(session: &'a AnalysisSession) -> Self {
        Self {
            session,
            alignment: None,
            generated_at: Local::now(),
            protein_comparison: true,
            width: 80,
        }
    }

    /// Attach the aligner output so the report can show score and identity.
    pub fn with_alignment(mut self, alignment: &'a PairwiseAlignment) -> Self {
        self.alignment = Some(alignment);
        self
    }

    pub fn with_protein_comparison(mut self, enabled: bool) -> Self {
        self.protein_comparison = enabled;
        self
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width.max(1);
        self
    }

    pub fn write_text<W: Write>(&self, out: &mut W) -> io::Result<()> {
        self.write_summary(out)?;
        self.write_variant_table(out)?;
        self.write_context(out)?;
        if self.protein_comparison {
            self.write_proteins(out)?;
        }
        Ok(())
    }

    pub fn write_json<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let report = JsonReport {
            generated_at: self.generated_at,
            genetic_code: self.session.genetic_code(),
            codon_phase: self.session.codon_phase(),
            alignment: self.alignment.map(AlignmentInfo::from),
            summary: self.session.summary(),
            exons: self.session.regions().exons(),
            introns: self.session.regions().introns(),
            variants: self
                .session
                .variants()
                .iter()
                .map(|variant| VariantRecord {
                    variant,
                    context: self.context(variant),
                })
                .collect(),
            protein: self
                .protein_comparison
                .then(|| self.session.protein_comparison()),
        };
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)
    }

    fn write_summary<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let s = self.session.summary();
        let pair = self.session.pair();
        let regions = self.session.regions();

        writeln!(out, "MUTATION ANALYSIS SUMMARY")?;
        writeln!(out, "Generated: {}", self.generated_at.format(TIMESTAMP_FORMAT))?;
        writeln!(out)?;

        if s.total == 0 {
            writeln!(out, "No mutations detected.")?;
            writeln!(out)?;
        } else {
            writeln!(out, "MUTATION COUNTS:")?;
            writeln!(out, "   Total Mutations: {}", s.total)?;
            writeln!(out, "   • SNPs: {}", s.snps)?;
            writeln!(out, "   • Insertions: {}", s.insertions)?;
            writeln!(out, "   • Deletions: {}", s.deletions)?;
            writeln!(out)?;
            writeln!(out, "GENOMIC LOCATION:")?;
            writeln!(out, "   • Exonic: {}", s.exonic)?;
            writeln!(out, "   • Intronic: {}", s.intronic)?;
            writeln!(out, "   • Intergenic: {}", s.intergenic)?;
            writeln!(out, "   • Frameshifts: {}", s.frameshifts)?;
            writeln!(out)?;
            writeln!(out, "SEVERITY DISTRIBUTION:")?;
            writeln!(out, "   • High: {}", s.high)?;
            writeln!(out, "   • Medium: {}", s.medium)?;
            writeln!(out, "   • Minimal: {}", s.minimal)?;
            writeln!(out, "   • Low: {}", s.low)?;
            writeln!(out)?;
            writeln!(out, "PATHOGENICITY PREDICTIONS:")?;
            writeln!(out, "   • Missense Mutations: {}", s.missense)?;
            writeln!(out, "   • With SIFT Scores: {}", s.sift_scored)?;
            writeln!(out, "   • With PolyPhen-2 Scores: {}", s.polyphen_scored)?;
            writeln!(out)?;
        }

        writeln!(out, "ALIGNMENT INFO:")?;
        writeln!(out, "   Reference Length: {} bp", pair.reference_length())?;
        writeln!(out, "   Sample Length: {} bp", pair.sample_length())?;
        writeln!(out, "   Alignment Columns: {}", pair.len())?;
        if let Some(alignment) = self.alignment {
            writeln!(out, "   Mode: {}", alignment.mode)?;
            writeln!(out, "   Score: {}", alignment.score)?;
            writeln!(out, "   Identity: {:.2}%", alignment.identity() * 100.0)?;
        }
        writeln!(out, "   Genetic Code: {}", self.session.genetic_code())?;
        writeln!(out, "   Exons Analyzed: {}", regions.exon_count())?;
        writeln!(out, "   Introns Analyzed: {}", regions.intron_count())?;
        writeln!(out)
    }

    fn write_variant_table<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let variants = self.session.variants();
        if variants.is_empty() {
            return Ok(());
        }

        writeln!(out, "VARIANTS:")?;
        writeln!(
            out,
            "{:>10}  {:<8}  {:<8}  {:<9}  {:<10}  {:<20}  {:<10}  {:<8}  {:<22}  {}",
            "Position", "Ref", "Alt", "Type", "Region", "Effect", "Frameshift", "Severity",
            "SIFT", "PolyPhen"
        )?;
        for v in variants {
            writeln!(
                out,
                "{:>10}  {:<8}  {:<8}  {:<9}  {:<10}  {:<20}  {:<10}  {:<8}  {:<22}  {}",
                v.position,
                abbreviate(&v.ref_allele),
                abbreviate(&v.alt_allele),
                v.variant_type.to_string(),
                v.region.to_string(),
                v.effect.label(),
                if v.frameshift { "Yes" } else { "No" },
                v.severity.to_string(),
                v.sift.map_or_else(|| "-".to_string(), |s| s.to_string()),
                v.polyphen.map_or_else(|| "-".to_string(), |p| p.to_string()),
            )?;
        }
        writeln!(out)
    }

    fn write_context<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let located: Vec<_> = self
            .session
            .variants()
            .iter()
            .filter_map(|v| self.context(v).map(|context| (v, context)))
            .collect();
        if located.is_empty() {
            return Ok(());
        }

        writeln!(out, "GENOMIC CONTEXT:")?;
        for (v, context) in located {
            writeln!(
                out,
                "   {} {}>{} at {}: {}",
                v.variant_type,
                abbreviate(&v.ref_allele),
                abbreviate(&v.alt_allele),
                v.position,
                context
            )?;
        }
        writeln!(out)
    }

    fn write_proteins<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let proteins = self.session.protein_comparison();

        writeln!(out, "PROTEIN COMPARISON:")?;
        writeln!(out, "Reference Protein:")?;
        write_wrapped(out, &proteins.reference, self.width)?;
        writeln!(out, "Sample Protein:")?;
        write_wrapped(out, &proteins.sample, self.width)?;
        if proteins.is_identical() {
            writeln!(out, "Proteins are identical.")?;
        } else {
            let changed: Vec<String> =
                proteins.changed.iter().map(|i| (i + 1).to_string()).collect();
            writeln!(out, "Changed residues: {}", changed.join(", "))?;
        }
        writeln!(out)?;

        writeln!(out, "Pathogenicity Predictions (Missense Mutations):")?;
        let missense: Vec<&Variant> = self
            .session
            .variants()
            .iter()
            .filter(|v| v.is_missense_snp())
            .collect();
        if missense.is_empty() {
            writeln!(out, "No missense mutations detected.")?;
        }
        for v in missense {
            writeln!(
                out,
                "Pos {}: {}>{} - SIFT: {}, PolyPhen: {}",
                v.position,
                v.ref_allele,
                v.alt_allele,
                v.sift.map_or_else(|| "-".to_string(), |s| s.to_string()),
                v.polyphen.map_or_else(|| "-".to_string(), |p| p.to_string()),
            )?;
        }
        Ok(())
    }

    /// "Exon #2 (120-180)" style label, `None` for intergenic variants.
    fn context(&self, variant: &Variant) -> Option<String> {
        let hit = self.session.locate(variant);
        match (hit.region, hit.ordinal, hit.range) {
            (Region::Intergenic, _, _) => None,
            (region, Some(ordinal), Some(range)) => Some(format!(
                "{} #{} ({}-{})",
                region, ordinal, range.start, range.end
            )),
            _ => None,
        }
    }
}

fn abbreviate(allele: &str) -> String {
    if allele.len() <= ALLELE_COLUMN {
        allele.to_string()
    } else {
        format!("{}..", &allele[..ALLELE_COLUMN - 2])
    }
}

fn write_wrapped<W: Write>(out: &mut W, text: &str, width: usize) -> io::Result<()> {
    if text.is_empty() {
        return writeln!(out, "(empty)");
    }
    for chunk in text.as_bytes().chunks(width) {
        out.write_all(chunk)?;
        writeln!(out)?;
    }
    Ok(())
}

#[derive(Serialize)]
struct AlignmentInfo {
    mode: String,
    score: i32,
    identity: f64,
    columns: usize,
}

impl From<&PairwiseAlignment> for AlignmentInfo {
    fn from(alignment: &PairwiseAlignment) -> Self {
        Self {
            mode: alignment.mode.to_string(),
            score: alignment.score,
            identity: alignment.identity(),
            columns: alignment.pair.len(),
        }
    }
}

#[derive(Serialize)]
struct VariantRecord<'a> {
    #[serde(flatten)]
    variant: &'a Variant,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<String>,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: DateTime<Local>,
    genetic_code: GeneticCodeId,
    codon_phase: CodonPhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    alignment: Option<AlignmentInfo>,
    summary: &'a VariantSummary,
    exons: &'a [GenomicRange],
    introns: &'a [GenomicRange],
    variants: Vec<VariantRecord<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    protein: Option<ProteinComparison>,
}
