//! A genome from a multiparent population, stored as founder-labelled
//! haplotype segments indexed per chromosome.
//!
//! Segments are inserted and never removed. Queries return segments in
//! ascending start order, which the recombination walk relies on: it streams
//! the combined maternal/paternal order of a chromosome and keeps the last
//! segment seen for each phase.

use std::collections::BTreeMap;
use std::fmt;

use log::{debug, warn};

use crate::error::GenomeError;
use crate::founder::{Founder, FounderLabel};
use crate::interval::{IntervalIndex, Position};
use crate::reference::{ploidy, Chromosome, Sex};
use crate::segment::{HaplotypeSegment, Phase};

/// Per-insertion settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddOptions {
    /// Reject founder labels outside the founder set.
    pub validate_founder: bool,
}

impl Default for AddOptions {
    fn default() -> Self {
        AddOptions {
            validate_founder: true,
        }
    }
}

impl AddOptions {
    pub fn unchecked() -> Self {
        AddOptions {
            validate_founder: false,
        }
    }
}

/// Observed overlap count differing from the expected copy number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PloidyMismatch {
    pub chrom: Chromosome,
    pub sex: Sex,
    pub expected: usize,
    pub observed: usize,
}

impl fmt::Display for PloidyMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} overlapping segments on {} where {} expected for sex {}",
            self.observed, self.chrom, self.expected, self.sex
        )
    }
}

/// Founders at one locus, one slot per chromosome copy. Diploid genotypes
/// list the maternal copy first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Genotype(Vec<Option<FounderLabel>>);

impl Genotype {
    pub fn slots(&self) -> &[Option<FounderLabel>] {
        &self.0
    }

    pub fn ploidy(&self) -> usize {
        self.0.len()
    }

    /// Known founders in slot order, `None` for unassigned slots.
    pub fn founders(&self) -> Vec<Option<Founder>> {
        self.0
            .iter()
            .map(|slot| slot.as_ref().and_then(FounderLabel::founder))
            .collect()
    }

    pub fn into_inner(self) -> Vec<Option<FounderLabel>> {
        self.0
    }
}

impl fmt::Display for Genotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, slot) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            match slot {
                Some(label) => write!(f, "{}", label)?,
                None => f.write_str("NA")?,
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Genome {
    id: String,
    sex: Sex,
    blocks: BTreeMap<Chromosome, IntervalIndex<HaplotypeSegment>>,
    ploidy_check: bool,
}

impl Genome {
    pub fn new(id: impl Into<String>, sex: Sex) -> Self {
        Genome {
            id: id.into(),
            sex,
            blocks: Chromosome::all().map(|c| (c, IntervalIndex::new())).collect(),
            ploidy_check: false,
        }
    }

    /// Log a warning whenever a range query returns a segment count that
    /// differs from the expected ploidy.
    pub fn with_ploidy_check(mut self, enabled: bool) -> Self {
        self.ploidy_check = enabled;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn sex(&self) -> Sex {
        self.sex
    }

    /// Total number of stored segments.
    pub fn len(&self) -> usize {
        self.blocks.values().map(IntervalIndex::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.values().all(IntervalIndex::is_empty)
    }

    /// Copy number expected for `chrom` given this genome's sex.
    pub fn expected_ploidy(&self, chrom: Chromosome) -> usize {
        ploidy(self.sex, chrom)
    }

    /// Check raw segment fields without inserting anything. Returns the
    /// parsed chromosome on success.
    pub fn validate(
        chrom: &str,
        start: Position,
        end: Position,
        founder: Option<&str>,
        options: AddOptions,
    ) -> Result<Chromosome, GenomeError> {
        let chromosome = check_interval(chrom, start, end).map_err(|reason| {
            GenomeError::InvalidInterval {
                chrom: chrom.to_string(),
                start,
                end,
                reason,
            }
        })?;
        if let Some(raw) = founder {
            if options.validate_founder && Founder::lookup(raw).is_none() {
                return Err(GenomeError::UnknownFounder(raw.to_string()));
            }
        }
        Ok(chromosome)
    }

    /// Add a segment from raw fields. Founder labels are stored by their
    /// canonical code when they resolve to a founder.
    pub fn add_segment(
        &mut self,
        chrom: &str,
        start: Position,
        end: Position,
        phase: Phase,
        founder: Option<&str>,
        options: AddOptions,
    ) -> Result<(), GenomeError> {
        let chromosome = Genome::validate(chrom, start, end, founder, options)?;
        let label = founder.map(FounderLabel::new);
        self.store(HaplotypeSegment::new(chromosome, start, end, phase, label));
        Ok(())
    }

    /// Insert a prebuilt segment after checking its coordinates.
    pub fn insert_segment(&mut self, segment: HaplotypeSegment) -> Result<(), GenomeError> {
        if let Err(reason) = check_coords(segment.start, segment.end) {
            return Err(GenomeError::InvalidInterval {
                chrom: segment.chrom.to_string(),
                start: segment.start,
                end: segment.end,
                reason,
            });
        }
        self.store(segment);
        Ok(())
    }

    /// Copy every segment of `other` into this genome.
    pub fn merge_from(&mut self, other: &Genome) {
        for segment in other.segments() {
            self.store(segment.clone());
        }
    }

    fn store(&mut self, segment: HaplotypeSegment) {
        debug!("{} <- {}", self.id, segment);
        self.blocks.entry(segment.chrom).or_default().insert(segment);
    }

    /// Segments overlapping [start, end) on `chrom`, ascending by start.
    /// Reversed bounds are swapped; equal bounds query a single position.
    pub fn get_segments(
        &self,
        chrom: &str,
        start: Position,
        end: Position,
    ) -> Result<Vec<&HaplotypeSegment>, GenomeError> {
        let (chromosome, start, end) = resolve_query(chrom, start, end)?;
        Ok(self.overlapping(chromosome, start, end))
    }

    fn overlapping(
        &self,
        chrom: Chromosome,
        start: Position,
        end: Position,
    ) -> Vec<&HaplotypeSegment> {
        let olaps: Vec<&HaplotypeSegment> = match self.blocks.get(&chrom) {
            Some(index) => index.query(start, end).collect(),
            None => Vec::new(),
        };
        if self.ploidy_check {
            if let Some(mismatch) = self.check_ploidy(chrom, olaps.len()) {
                warn!("{}: {}:{}-{}: {}", self.id, chrom, start, end, mismatch);
            }
        }
        olaps
    }

    /// Compare an observed overlap count against the expected ploidy.
    pub fn check_ploidy(&self, chrom: Chromosome, observed: usize) -> Option<PloidyMismatch> {
        let expected = self.expected_ploidy(chrom);
        (expected != observed).then_some(PloidyMismatch {
            chrom,
            sex: self.sex,
            expected,
            observed,
        })
    }

    /// All segments of one chromosome, ascending by start.
    pub fn chromosome_segments(
        &self,
        chrom: Chromosome,
    ) -> impl Iterator<Item = &HaplotypeSegment> + '_ {
        self.blocks
            .get(&chrom)
            .into_iter()
            .flat_map(|index| index.iter())
    }

    /// Founders covering `position`, one slot per expected chromosome copy.
    ///
    /// On diploid chromosomes the maternal segment fills slot 0 and the
    /// paternal segment slot 1; segments of unknown phase then fill whichever
    /// slots are still empty, in start order. Other ploidies fill slots in
    /// start order. Slots nothing covers stay unassigned.
    pub fn genotype_at(&self, chrom: &str, position: Position) -> Result<Genotype, GenomeError> {
        let (chromosome, _, _) = resolve_query(chrom, position, position)?;
        let segments = self.overlapping(chromosome, position, position);
        let ploidy = self.expected_ploidy(chromosome);
        let mut slots: Vec<Option<FounderLabel>> = vec![None; ploidy];
        let mut filled = vec![false; ploidy];

        if ploidy == 2 {
            for segment in &segments {
                if let Some(i) = segment.phase.index() {
                    slots[i] = segment.founder.clone();
                    filled[i] = true;
                }
            }
            for segment in segments.iter().filter(|s| s.phase.index().is_none()) {
                match filled.iter().position(|&f| !f) {
                    Some(i) => {
                        slots[i] = segment.founder.clone();
                        filled[i] = true;
                    }
                    None => break,
                }
            }
        } else {
            for (slot, segment) in slots.iter_mut().zip(&segments) {
                *slot = segment.founder.clone();
            }
            if segments.len() > ploidy {
                debug!(
                    "{}: {} segments at {}:{} for ploidy {}",
                    self.id,
                    segments.len(),
                    chromosome,
                    position,
                    ploidy
                );
            }
        }
        Ok(Genotype(slots))
    }

    /// Every segment, chromosome by chromosome in reference order. Each call
    /// starts a fresh traversal.
    pub fn segments(&self) -> impl Iterator<Item = &HaplotypeSegment> + '_ {
        self.blocks.values().flat_map(|index| index.iter())
    }

    /// Breakpoints between consecutive segments of the same phase, per
    /// chromosome. Segments of unknown phase are ignored entirely. Each call
    /// starts a fresh traversal.
    pub fn recombinations(&self) -> impl Iterator<Item = HaplotypeSegment> + '_ {
        self.blocks.values().flat_map(|index| {
            let mut last: [Option<&HaplotypeSegment>; 2] = [None, None];
            index.iter().filter_map(move |segment| {
                let slot = segment.phase.index()?;
                let previous = last[slot].replace(segment)?;
                Some(HaplotypeSegment::breakpoint(previous, segment))
            })
        })
    }
}

fn check_coords(start: Position, end: Position) -> Result<(), &'static str> {
    if start < 0 {
        Err("negative start")
    } else if end < start {
        Err("end before start")
    } else {
        Ok(())
    }
}

fn check_interval(chrom: &str, start: Position, end: Position) -> Result<Chromosome, &'static str> {
    let chromosome = chrom
        .parse::<Chromosome>()
        .map_err(|_| "unknown chromosome")?;
    check_coords(start, end)?;
    Ok(chromosome)
}

fn resolve_query(
    chrom: &str,
    start: Position,
    end: Position,
) -> Result<(Chromosome, Position, Position), GenomeError> {
    let (start, end) = if end < start { (end, start) } else { (start, end) };
    let chromosome =
        check_interval(chrom, start, end).map_err(|reason| GenomeError::InvalidQuery {
            chrom: chrom.to_string(),
            start,
            end,
            reason,
        })?;
    Ok((chromosome, start, end))
}

impl fmt::Display for Genome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Genome of individual '{}'", self.id)?;
        writeln!(f)?;
        writeln!(f, "Haplotype segments")?;
        writeln!(f, "---------------------")?;
        for (chrom, index) in &self.blocks {
            write!(f, "  {}:", chrom)?;
            if index.is_empty() {
                writeln!(f)?;
                continue;
            }
            for b in index {
                writeln!(f, "\t      {}:({}, {})", b.founder_label(), b.start, b.end)?;
            }
        }
        writeln!(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::{ATTR_FROM, ATTR_TO};

    fn cc001() -> Genome {
        let mut g = Genome::new("CC001/Unc", Sex::Unknown);
        g.add_segment("chr1", 0, 100_000, Phase::Maternal, Some("A"), AddOptions::default())
            .unwrap();
        g.add_segment("chr1", 100_000, 200_000, Phase::Maternal, Some("C"), AddOptions::default())
            .unwrap();
        g.add_segment("chr1", 0, 100_000, Phase::Paternal, Some("B"), AddOptions::default())
            .unwrap();
        g
    }

    #[test]
    fn test_added_segment_is_found() {
        let g = cc001();
        let hits = g.get_segments("chr1", 150_000, 160_000).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].founder, Some(FounderLabel::Known(Founder::C)));
        assert_eq!(g.len(), 3);
    }

    #[test]
    fn test_reversed_query_is_swapped() {
        let g = cc001();
        let forward = g.get_segments("chr1", 50_000, 150_000).unwrap();
        let reversed = g.get_segments("chr1", 150_000, 50_000).unwrap();
        assert_eq!(forward, reversed);
        assert_eq!(forward.len(), 3);
    }

    #[test]
    fn test_invalid_inserts() {
        let mut g = Genome::new("x", Sex::Unknown);
        let err = g
            .add_segment("chr23", 0, 10, Phase::Maternal, None, AddOptions::unchecked())
            .unwrap_err();
        assert!(matches!(err, GenomeError::InvalidInterval { .. }));
        let err = g
            .add_segment("chr1", -1, 10, Phase::Maternal, None, AddOptions::default())
            .unwrap_err();
        assert!(matches!(err, GenomeError::InvalidInterval { reason: "negative start", .. }));
        let err = g
            .add_segment("chr1", 10, 9, Phase::Maternal, None, AddOptions::default())
            .unwrap_err();
        assert!(matches!(err, GenomeError::InvalidInterval { .. }));
        let err = g
            .add_segment("chr1", 0, 10, Phase::Maternal, Some("Z"), AddOptions::default())
            .unwrap_err();
        assert_eq!(err, GenomeError::UnknownFounder("Z".to_string()));
        assert!(g.is_empty());
    }

    #[test]
    fn test_unchecked_founder_is_stored_verbatim() {
        let mut g = Genome::new("x", Sex::Unknown);
        g.add_segment("chr3", 0, 10, Phase::Paternal, Some("AxB"), AddOptions::unchecked())
            .unwrap();
        let hits = g.get_segments("chr3", 5, 5).unwrap();
        assert_eq!(hits[0].founder_label(), "AxB");
    }

    #[test]
    fn test_strain_name_is_canonicalised() {
        let mut g = Genome::new("x", Sex::Unknown);
        g.add_segment("chr3", 0, 10, Phase::Paternal, Some("PWK/PhJ"), AddOptions::default())
            .unwrap();
        let gt = g.genotype_at("chr3", 0).unwrap();
        assert_eq!(gt.to_string(), "NA G");
    }

    #[test]
    fn test_invalid_query() {
        let g = cc001();
        assert!(matches!(
            g.get_segments("chrQ", 0, 10),
            Err(GenomeError::InvalidQuery { .. })
        ));
        assert!(matches!(
            g.get_segments("chr1", -5, 10),
            Err(GenomeError::InvalidQuery { .. })
        ));
        assert!(g.genotype_at("chr1", -1).is_err());
    }

    #[test]
    fn test_genotype_at() {
        let g = cc001();
        let gt = g.genotype_at("chr1", 500).unwrap();
        assert_eq!(gt.founders(), vec![Some(Founder::A), Some(Founder::B)]);
        let gt = g.genotype_at("chr1", 150_000).unwrap();
        assert_eq!(gt.founders(), vec![Some(Founder::C), None]);
        assert_eq!(gt.to_string(), "C NA");
        // block boundary belongs to the block that starts there
        let gt = g.genotype_at("chr1", 100_000).unwrap();
        assert_eq!(gt.founders(), vec![Some(Founder::C), None]);
    }

    #[test]
    fn test_genotype_unknown_phase_fills_empty_slot() {
        let mut g = Genome::new("x", Sex::Unknown);
        g.add_segment("chr5", 0, 100, Phase::Unknown, Some("E"), AddOptions::default())
            .unwrap();
        g.add_segment("chr5", 50, 150, Phase::Maternal, Some("D"), AddOptions::default())
            .unwrap();
        let gt = g.genotype_at("chr5", 75).unwrap();
        assert_eq!(gt.founders(), vec![Some(Founder::D), Some(Founder::E)]);
    }

    #[test]
    fn test_genotype_ploidy_by_sex() {
        let mut g = Genome::new("m", Sex::Male);
        g.add_segment("chrX", 0, 100, Phase::Maternal, Some("F"), AddOptions::default())
            .unwrap();
        assert_eq!(g.genotype_at("chrX", 10).unwrap().founders(), vec![Some(Founder::F)]);
        assert_eq!(g.genotype_at("chrM", 10).unwrap().ploidy(), 1);
        assert_eq!(g.genotype_at("chr19", 10).unwrap().ploidy(), 2);
        assert_eq!(g.genotype_at("chrY", 10).unwrap().ploidy(), 0);
        let f = Genome::new("f", Sex::Female);
        assert_eq!(f.genotype_at("chrX", 10).unwrap().to_string(), "NA");
        assert_eq!(f.genotype_at("chrY", 10).unwrap().ploidy(), 0);
        let u = Genome::new("u", Sex::Unknown);
        assert_eq!(u.genotype_at("chrX", 10).unwrap().ploidy(), 2);
        assert_eq!(u.genotype_at("chrY", 10).unwrap().ploidy(), 1);
    }

    #[test]
    fn test_recombinations() {
        let g = cc001();
        let recombs: Vec<HaplotypeSegment> = g.recombinations().collect();
        assert_eq!(recombs.len(), 1);
        let r = &recombs[0];
        assert_eq!(r.chrom, Chromosome::Autosome(1));
        assert_eq!((r.start, r.end), (100_000, 100_000));
        assert_eq!(r.phase, Phase::Maternal);
        assert_eq!(r.attribute(ATTR_FROM), Some("A"));
        assert_eq!(r.attribute(ATTR_TO), Some("C"));
        // restartable
        assert_eq!(g.recombinations().count(), 1);
    }

    #[test]
    fn test_unknown_phase_does_not_break_chain() {
        let mut g = Genome::new("x", Sex::Unknown);
        let opts = AddOptions::default();
        g.add_segment("chr2", 0, 100, Phase::Paternal, Some("H"), opts).unwrap();
        g.add_segment("chr2", 100, 200, Phase::Unknown, Some("A"), opts).unwrap();
        g.add_segment("chr2", 200, 300, Phase::Paternal, Some("H"), opts).unwrap();
        let recombs: Vec<HaplotypeSegment> = g.recombinations().collect();
        assert_eq!(recombs.len(), 1);
        assert_eq!((recombs[0].start, recombs[0].end), (100, 200));
        assert_eq!(recombs[0].attribute(ATTR_FROM), Some("H"));
        assert_eq!(recombs[0].attribute(ATTR_TO), Some("H"));
    }

    #[test]
    fn test_recombination_chain_resets_per_chromosome() {
        let mut g = Genome::new("x", Sex::Unknown);
        let opts = AddOptions::default();
        g.add_segment("chr1", 0, 100, Phase::Maternal, Some("A"), opts).unwrap();
        g.add_segment("chr2", 0, 100, Phase::Maternal, Some("B"), opts).unwrap();
        assert_eq!(g.recombinations().count(), 0);
    }

    #[test]
    fn test_segments_in_reference_order() {
        let mut g = Genome::new("x", Sex::Unknown);
        let opts = AddOptions::default();
        g.add_segment("chrX", 0, 10, Phase::Maternal, Some("A"), opts).unwrap();
        g.add_segment("chr10", 0, 10, Phase::Maternal, Some("A"), opts).unwrap();
        g.add_segment("chr2", 5, 10, Phase::Maternal, Some("A"), opts).unwrap();
        g.add_segment("chr2", 0, 5, Phase::Maternal, Some("A"), opts).unwrap();
        let order: Vec<String> = g
            .segments()
            .map(|s| format!("{}:{}", s.chrom, s.start))
            .collect();
        assert_eq!(order, vec!["chr2:0", "chr2:5", "chr10:0", "chrX:0"]);
    }

    #[test]
    fn test_empty_genome_iterates_nothing() {
        let g = Genome::new("empty", Sex::Female);
        assert_eq!(g.segments().count(), 0);
        assert_eq!(g.recombinations().count(), 0);
        assert!(g.to_string().contains("  chrM:\n"));
    }

    #[test]
    fn test_zero_width_segment_is_found() {
        let mut g = Genome::new("x", Sex::Unknown);
        let opts = AddOptions::default();
        g.add_segment("chr1", 5, 5, Phase::Maternal, Some("A"), opts).unwrap();
        g.add_segment("chr1", 0, 0, Phase::Maternal, Some("B"), opts).unwrap();
        assert_eq!(g.len(), 2);
        assert_eq!(g.get_segments("chr1", 5, 5).unwrap().len(), 1);
        assert_eq!(g.get_segments("chr1", 0, 0).unwrap().len(), 1);
        assert_eq!(g.get_segments("chr1", 0, 10).unwrap().len(), 2);
        assert!(g.get_segments("chr1", 6, 10).unwrap().is_empty());
        assert_eq!(g.segments().count(), 2);
        assert_eq!(g.chromosome_segments(Chromosome::Autosome(1)).count(), 2);
        let recombs: Vec<HaplotypeSegment> = g.recombinations().collect();
        assert_eq!(recombs.len(), 1);
        assert_eq!(recombs[0].attribute(ATTR_FROM), Some("B"));
        assert_eq!(recombs[0].attribute(ATTR_TO), Some("A"));
    }

    #[test]
    fn test_check_ploidy() {
        let g = cc001().with_ploidy_check(true);
        assert_eq!(g.check_ploidy(Chromosome::Autosome(1), 2), None);
        let mismatch = g.check_ploidy(Chromosome::Autosome(1), 1).unwrap();
        assert_eq!((mismatch.expected, mismatch.observed), (2, 1));
        // the diagnostic never turns into an error
        assert_eq!(g.get_segments("chr1", 150_000, 150_000).unwrap().len(), 1);
    }

    #[test]
    fn test_insert_segment_checks_coordinates() {
        let mut g = Genome::new("x", Sex::Unknown);
        let bad = HaplotypeSegment::new(Chromosome::Y, 10, 5, Phase::Unknown, None);
        assert!(g.insert_segment(bad).is_err());
        let good = HaplotypeSegment::new(Chromosome::Y, 5, 10, Phase::Unknown, None);
        g.insert_segment(good).unwrap();
        assert_eq!(g.chromosome_segments(Chromosome::Y).count(), 1);
    }
}
